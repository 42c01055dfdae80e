// Error kinds shared by every tool operation.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimeError {
    #[error("Invalid timezone: {0}. Use list_timezones to see available options")]
    InvalidTimezone(String),

    #[error("Failed to parse {input:?} with format {format:?}")]
    Parse { input: String, format: String },

    #[error("Value out of range: {0}")]
    Range(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl TimeError {
    pub fn parse(input: &str, format: &str) -> Self {
        TimeError::Parse {
            input: input.to_string(),
            format: format.to_string(),
        }
    }

    /// Argument deserialization failures map to JSON-RPC invalid params;
    /// everything else is reported as a failed tool result.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, TimeError::InvalidArgument(_))
    }
}
