use std::fmt;

/// Coarse classification of a [`WeatherError`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UpstreamStatus,
    DecodeFailure,
    ShapeMismatch,
    TemplateCompile,
    RenderFailure,
    Transport,
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::UpstreamStatus => "upstream status",
            ErrorKind::DecodeFailure => "decode failure",
            ErrorKind::ShapeMismatch => "shape mismatch",
            ErrorKind::TemplateCompile => "template compile",
            ErrorKind::RenderFailure => "render failure",
            ErrorKind::Transport => "transport",
            ErrorKind::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// The provider answered with something other than 200 OK. The body is not parsed.
    #[error("weather provider responded with status {status}")]
    UpstreamStatus { status: u16 },

    #[error("failed to decode weather response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Two parallel series in one response disagree on length.
    #[error("series `{field}` has {actual} entries, expected {expected}")]
    ShapeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("template `{name}` is invalid: {source}")]
    TemplateCompile {
        name: &'static str,
        #[source]
        source: minijinja::Error,
    },

    #[error("template `{name}` failed to render: {source}")]
    Render {
        name: &'static str,
        #[source]
        source: minijinja::Error,
    },

    #[error("weather request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("weather request was cancelled")]
    Cancelled,
}

impl WeatherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::UpstreamStatus { .. } => ErrorKind::UpstreamStatus,
            WeatherError::Decode(_) => ErrorKind::DecodeFailure,
            WeatherError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            WeatherError::TemplateCompile { .. } => ErrorKind::TemplateCompile,
            WeatherError::Render { .. } => ErrorKind::RenderFailure,
            WeatherError::Transport(_) => ErrorKind::Transport,
            WeatherError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
