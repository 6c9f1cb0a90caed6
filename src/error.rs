//! Error types for the board client.
//!
//! Every failure the client can hit ends up as a [`ClientError`]. The
//! controller never surfaces these directly to the user; it logs the detail
//! and shows a short notification instead.

/// Errors that can occur while talking to the task API or setting up the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("request failed: {method} {url} returned {status}")]
    RequestFailed {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    /// The request never completed or the response could not be decoded.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A task title was empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for client results.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_request_failed() {
        let err = ClientError::RequestFailed {
            method: "PUT",
            url: "http://localhost:8000/api/tasks/7".into(),
            status: 404,
            body: "{\"detail\":\"Task not found\"}".into(),
        };
        assert_eq!(
            err.to_string(),
            "request failed: PUT http://localhost:8000/api/tasks/7 returned 404"
        );
    }

    #[test]
    fn display_empty_title() {
        assert_eq!(
            ClientError::EmptyTitle.to_string(),
            "task title must not be empty"
        );
    }

    #[test]
    fn display_config() {
        let err = ClientError::Config("base_url must not be empty".into());
        assert_eq!(err.to_string(), "config error: base_url must not be empty");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientError>();
    }
}
