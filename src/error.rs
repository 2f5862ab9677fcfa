pub type ScrubResult<T> = Result<T, ScrubError>;

#[derive(thiserror::Error, Debug)]
pub enum ScrubError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("resource error: {0}")]
    Resource(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScrubError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            ScrubError::configuration("x")
                .to_string()
                .contains("configuration error:")
        );
        assert!(
            ScrubError::resource("x")
                .to_string()
                .contains("resource error:")
        );
        assert!(
            ScrubError::serde("x")
                .to_string()
                .contains("serialization error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = ScrubError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
