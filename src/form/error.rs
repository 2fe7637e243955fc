use std::fmt;

use crate::path::codec::CodecError;

#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    /// No control is bound to this path
    UnknownControl(String),

    /// No optional group is declared at this path
    UnknownGroup(String),

    /// The operation does not apply to this kind of control
    KindMismatch { path: String, expected: &'static str },

    /// Value is not one of the enumerated options
    InvalidChoice { path: String, value: String, options: Vec<String> },

    /// Numeric control given text that is not a number
    NotANumber { path: String, value: String },

    /// Array sub-field index past the declared length
    CellOutOfRange { path: String, index: usize, length: usize },

    /// Serialized values could not be nested back together
    Codec(CodecError),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::UnknownControl(path) => write!(f, "no control at '{}'", path),
            FormError::UnknownGroup(path) => write!(f, "no optional group at '{}'", path),
            FormError::KindMismatch { path, expected } => {
                write!(f, "control '{}' is not {}", path, expected)
            }
            FormError::InvalidChoice { path, value, options } => write!(
                f,
                "'{}' is not a valid choice for '{}' (options: {})",
                value,
                path,
                options.join(", ")
            ),
            FormError::NotANumber { path, value } => {
                write!(f, "'{}' is not a number (control '{}')", value, path)
            }
            FormError::CellOutOfRange { path, index, length } => write!(
                f,
                "index {} out of range for '{}' ({} sub-fields)",
                index, path, length
            ),
            FormError::Codec(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for FormError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormError::Codec(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CodecError> for FormError {
    fn from(e: CodecError) -> Self {
        FormError::Codec(e)
    }
}
