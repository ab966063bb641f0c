use std::fmt;

/// Errors raised by the PEP algebra, the context registry and the evaluation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum PepError {
    /// Parameter with both or neither of name/expression; basis with an expression;
    /// composite without one.
    Construction(String),
    /// a Parameter leaf absent from the resolution map
    Resolution(String),
    UnsupportedOperation(String),
    /// no current context, or a handle from another context or generation
    MissingContext(String),
    Tag(String),
    /// an operand that does not fit the evaluation mode
    Usage(String),
    Internal(String),
    Config(String),
}

impl fmt::Display for PepError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PepError::Construction(msg) => write!(f, "Construction error: {}", msg),
            PepError::Resolution(msg) => write!(f, "Resolution error: {}", msg),
            PepError::UnsupportedOperation(msg) => write!(f, "Unsupported operation: {}", msg),
            PepError::MissingContext(msg) => write!(f, "Missing context: {}", msg),
            PepError::Tag(msg) => write!(f, "Tag error: {}", msg),
            PepError::Usage(msg) => write!(f, "Usage error: {}", msg),
            PepError::Internal(msg) => write!(f, "Internal error: {}", msg),
            PepError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}
//////////////////////////////////TRAITS AND IMPLEMENTATIONS/////////////////////////////////
impl std::error::Error for PepError {}

impl From<std::io::Error> for PepError {
    fn from(err: std::io::Error) -> Self {
        PepError::Config(err.to_string())
    }
}

pub type PepResult<T> = Result<T, PepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = PepError::Tag("object has no tag".to_string());
        assert_eq!(err.to_string(), "Tag error: object has no tag");
        let err = PepError::UnsupportedOperation("polynomial × polynomial".to_string());
        assert!(err.to_string().starts_with("Unsupported operation"));
    }

    #[test]
    fn test_io_error_becomes_config_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.txt");
        match PepError::from(io) {
            PepError::Config(msg) => assert!(msg.contains("missing.txt")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
