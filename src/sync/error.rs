use thiserror::Error;

/// Failures of the local and remote stores.
///
/// None of these escape [`super::SyncController`]: remote errors become the
/// user-facing `last_error` message and local ones are logged and treated as
/// an absent backup.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The request never completed or the server answered with a non-success
    /// status.
    #[error("network error: {0}")]
    Network(String),

    /// The response body was not valid JSON, or a fetch answered something
    /// other than a JSON object.
    #[error("invalid response from remote store: {0}")]
    Protocol(serde_json::Error),

    /// The document could not be serialized for upload.
    #[error("could not encode document: {0}")]
    Encode(serde_json::Error),

    /// The remote store answered `{"status": "error"}`.
    #[error("remote store reported an error: {0}")]
    Remote(String),

    /// The local backup exists but does not parse.
    #[error("corrupt local backup: {0}")]
    LocalParse(serde_json::Error),
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{").unwrap_err()
    }

    #[test]
    fn encode_failure_is_not_reported_as_bad_response() {
        let encode = SyncError::Encode(json_error()).to_string();
        let protocol = SyncError::Protocol(json_error()).to_string();
        assert!(encode.starts_with("could not encode document"), "{encode}");
        assert!(protocol.starts_with("invalid response"), "{protocol}");
    }
}
