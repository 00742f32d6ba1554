use thiserror::Error;

#[derive(Error, Debug)]
pub enum FusionError {
    #[error("Invalid input `{argument}`: {reason}")]
    InvalidInput { argument: String, reason: String },

    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },

    #[error("Degenerate arithmetic: {0}")]
    ArithmeticDegenerate(String),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FusionError {
    pub fn invalid_input(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// Stable snake_case name used in status records.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::ShapeMismatch { .. } => "shape_mismatch",
            Self::ArithmeticDegenerate(_) => "arithmetic_degenerate",
            Self::InputReadError(_) => "input_read",
            Self::OutputWriteError(_) => "output_write",
            Self::DecodeError(_) => "decode",
            Self::EncodeError(_) => "encode",
            Self::InvalidDimensions(_, _) => "invalid_dimensions",
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::IoError(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, FusionError>;
