//! Progress reporting around the compositor's passes.

use std::fmt;
use std::sync::mpsc::Sender;
use std::time::Duration;

use tracing::info;

/// The three joint bilateral passes of a detail transfer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterPass {
    /// Ambient filtered against itself.
    AmbientBase,
    /// Ambient filtered against the flash image.
    AmbientNoiseReduced,
    /// Flash filtered against itself.
    FlashBase,
}

impl FilterPass {
    /// Short step name used in timings.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AmbientBase => "a_base",
            Self::AmbientNoiseReduced => "a_nr",
            Self::FlashBase => "f_base",
        }
    }
}

impl fmt::Display for FilterPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AmbientBase => "ambient base",
            Self::AmbientNoiseReduced => "noise-reduced ambient",
            Self::FlashBase => "flash base",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    PassStarted(FilterPass),
    PassFinished { pass: FilterPass, elapsed: Duration },
    MaskBuilt { masked_pixels: usize },
    Finished { total: Duration },
}

/// Receives progress events from the compositor. Implemented for closures,
/// for [`ChannelProgress`] and for the no-op [`NoProgress`].
pub trait ProgressSink {
    fn report(&self, event: ProgressEvent);
}

impl<F: Fn(ProgressEvent)> ProgressSink for F {
    fn report(&self, event: ProgressEvent) {
        self(event)
    }
}

pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Forwards events over a channel. A dropped receiver is not an error.
pub struct ChannelProgress(pub Sender<ProgressEvent>);

impl ProgressSink for ChannelProgress {
    fn report(&self, event: ProgressEvent) {
        let _ = self.0.send(event);
    }
}

/// Writes every event to the log at info level.
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::PassStarted(pass) => info!("Calculating {} image...", pass),
            ProgressEvent::PassFinished { pass, elapsed } => info!(
                step = pass.name(),
                ms = elapsed.as_secs_f64() * 1000.0,
                "Finished {} image",
                pass
            ),
            ProgressEvent::MaskBuilt { masked_pixels } => {
                info!(masked_pixels, "Artifact mask built")
            }
            ProgressEvent::Finished { total } => {
                info!(ms = total.as_secs_f64() * 1000.0, "Composite finished")
            }
        }
    }
}
