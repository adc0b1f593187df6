/// Result alias that carries the custom [`ColumnVjError`] type.
pub type Result<T> = std::result::Result<T, ColumnVjError>;

/// Common error type for the core crate.
///
/// Nothing on the per-frame path produces one of these. They surface from
/// one-time setup: loading configuration, opening the MIDI ports and
/// acquiring the microphone.
#[derive(Debug, thiserror::Error)]
pub enum ColumnVjError {
    /// Free-form message for failures that do not deserve their own variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// Configuration parsed but describes an unusable rig.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// The microphone could not be acquired or started.
    #[error("audio device error: {0}")]
    AudioDevice(String),
    /// The control surface ports could not be opened.
    #[error("MIDI error: {0}")]
    Midi(String),
    /// Spectrum transform failure.
    #[error("fft error: {0}")]
    Fft(#[from] realfft::FftError),
}

impl ColumnVjError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for ColumnVjError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for ColumnVjError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
