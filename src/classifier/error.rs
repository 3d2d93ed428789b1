use std::fmt;

/// Represents the different types of errors that can occur while building the
/// classifier. Prediction itself is infallible: malformed input is answered
/// with a uniform distribution rather than an error.
#[derive(Debug)]
pub enum ClassifierError {
    /// The class vocabulary is missing, empty, or malformed
    VocabularyError(String),
    /// Error occurred during the build phase
    BuildError(String),
    /// Error occurred due to invalid input parameters
    ValidationError(String),
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VocabularyError(msg) => write!(f, "Vocabulary error: {}", msg),
            Self::BuildError(msg) => write!(f, "Build error: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ClassifierError {}
