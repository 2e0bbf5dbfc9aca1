/// Shared error type used across all SoundRelay crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("payload: {0}")]
    Payload(String),

    #[error("device: {0}")]
    Device(String),

    #[error("backend: {0}")]
    Backend(String),

    #[error("config: {0}")]
    Config(String),
}

impl Error {
    /// Whether this failure sits on the critical path and must be answered
    /// with a full reconnect (probe + login) before the capture loop may
    /// continue.
    ///
    /// Backend and config errors never escalate: the backend is a side
    /// channel, and a bad config is not a connectivity problem.
    pub fn requires_reconnect(&self) -> bool {
        match self {
            Error::Json(_)
            | Error::Http(_)
            | Error::Timeout(_)
            | Error::Auth(_)
            | Error::Payload(_)
            | Error::Device(_) => true,
            Error::Backend(_) | Error::Config(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_path_errors_require_reconnect() {
        assert!(Error::Http("connection refused".into()).requires_reconnect());
        assert!(Error::Timeout("5s".into()).requires_reconnect());
        assert!(Error::Auth("401".into()).requires_reconnect());
        assert!(Error::Payload("missing imager".into()).requires_reconnect());
        assert!(Error::Device("status 500".into()).requires_reconnect());
    }

    #[test]
    fn peripheral_errors_do_not_escalate() {
        assert!(!Error::Backend("502".into()).requires_reconnect());
        assert!(!Error::Config("bad port".into()).requires_reconnect());
    }
}
