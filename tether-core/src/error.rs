use thiserror::Error;

/// Errors raised before any request reaches the gateway.
#[derive(Error, Debug)]
pub enum TetherError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflicting scope: \"{first}\" and \"{second}\" cannot both be set")]
    ConflictingScope {
        first: &'static str,
        second: &'static str,
    },

    #[error("Invalid config_json: {0}")]
    InvalidConfigJson(#[source] serde_json::Error),

    #[error("Resource has no stored id")]
    MissingId,

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TetherError {
    /// True for errors the operator fixes by editing the declaration.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TetherError::Validation(_)
                | TetherError::ConflictingScope { .. }
                | TetherError::InvalidConfigJson(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicting_scope_names_both_fields() {
        let err = TetherError::ConflictingScope {
            first: "service",
            second: "route",
        };
        assert_eq!(
            err.to_string(),
            "Conflicting scope: \"service\" and \"route\" cannot both be set"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn invalid_config_json_is_validation() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not valid}").unwrap_err();
        let err = TetherError::InvalidConfigJson(parse_err);
        assert!(err.is_validation());
        assert!(err.to_string().starts_with("Invalid config_json:"));
    }

    #[test]
    fn io_error_is_not_validation() {
        let err: TetherError = std::io::Error::other("disk gone").into();
        assert!(!err.is_validation());
    }
}
