use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid platform bounds: radius must be positive, got {radius}")]
    InvalidBounds { radius: f64 },

    #[error("Invalid platform bounds: center, radius and fall threshold must be finite")]
    NonFiniteBounds,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Scenario error: {0}")]
    Scenario(String),
}

impl TrackerError {
    /// True for errors raised while validating bounds or configuration values.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TrackerError::InvalidBounds { .. }
                | TrackerError::NonFiniteBounds
                | TrackerError::InvalidConfig(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_flagged() {
        assert!(TrackerError::InvalidBounds { radius: 0.0 }.is_configuration());
        assert!(TrackerError::NonFiniteBounds.is_configuration());
        assert!(TrackerError::InvalidConfig("x".into()).is_configuration());
        assert!(!TrackerError::Scenario("x".into()).is_configuration());
    }

    #[test]
    fn test_json_error_converts() {
        let err: TrackerError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, TrackerError::Json(_)));
        assert!(err.to_string().starts_with("JSON error"));
    }
}
