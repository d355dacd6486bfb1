use thiserror::Error;

/// Failures scoped to a single role lookup, switch or credential fetch.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("duplicate role alias: {0}")]
    DuplicateRole(String),

    #[error("failed to parse body: {0}")]
    MalformedRequest(String),

    #[error("failed to assume role: {0}")]
    AssumeRole(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::UnknownRole("missing".to_string()).to_string(),
            "unknown role: missing"
        );
        assert_eq!(
            Error::MalformedRequest("EOF while parsing".to_string()).to_string(),
            "failed to parse body: EOF while parsing"
        );
        assert_eq!(
            Error::AssumeRole("access denied".to_string()).to_string(),
            "failed to assume role: access denied"
        );
    }
}
