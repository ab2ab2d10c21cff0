use std::fmt;

use thiserror::Error;

/// Shader stage a compile diagnostic belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Every failure that keeps the grid from animating.
///
/// None of these are retried: they describe a broken environment or a bad
/// configuration, and the loop either never starts or stops on the spot.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("canvas does not provide a `{0}` drawing context")]
    ContextUnsupported(&'static str),

    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("shader program failed to link: {0}")]
    Link(String),

    #[error("shader program has no active `{0}` attribute")]
    MissingAttribute(&'static str),

    #[error("shader program has no active `{0}` uniform")]
    MissingUniform(&'static str),

    #[error("drawing context was lost")]
    ContextLost,

    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },

    #[error("malformed configuration: {0}")]
    ConfigSyntax(#[from] serde_json::Error),

    #[error("{0}")]
    Dom(String),
}

pub type Result<T, E = GridError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_names_the_stage() {
        let err = GridError::Compile {
            stage: ShaderStage::Fragment,
            log: "ERROR: 0:3: 'vec5' : undeclared identifier".into(),
        };
        let message = err.to_string();
        assert!(message.starts_with("fragment shader failed to compile"));
        assert!(message.contains("vec5"));
    }

    #[test]
    fn invalid_config_names_the_field() {
        let err = GridError::InvalidConfig {
            field: "proximityRange",
            reason: "must be greater than zero",
        };
        assert_eq!(
            err.to_string(),
            "invalid configuration: `proximityRange` must be greater than zero"
        );
    }
}
