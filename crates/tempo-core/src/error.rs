use thiserror::Error;

#[derive(Error, Debug)]
pub enum TempoError {
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),

    #[error("Weekday is required for weekly schedules")]
    MissingWeekday,

    #[error("Invalid weekday: {0} (expected 0-6, Monday = 0)")]
    InvalidWeekday(u32),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ticker is already running")]
    AlreadyRunning,

    #[error("Handler error: {0}")]
    Handler(#[from] anyhow::Error),
}

impl TempoError {
    /// True for errors raised while validating construction-time input.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInterval(_)
                | Self::InvalidPeriod(_)
                | Self::InvalidTimeFormat(_)
                | Self::MissingWeekday
                | Self::InvalidWeekday(_)
                | Self::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TempoError>;
