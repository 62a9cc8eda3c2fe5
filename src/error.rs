use thiserror::Error;

/// Failures raised by schema declaration and record access.
///
/// Declaration-time errors (`InvalidName`, `DuplicateAttribute`) abort the
/// declaring call and leave the schema untouched. Access errors
/// (`UnknownAttribute`, `OutOfRange`) are per-call; callers may catch them
/// and fall back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RekordError {
    #[error("Invalid attribute name: {0:?}")]
    InvalidName(String),

    #[error("Duplicate attribute: {0}")]
    DuplicateAttribute(String),

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Index {index} out of range for {len} attributes")]
    OutOfRange { index: isize, len: usize },
}

pub type Result<T> = std::result::Result<T, RekordError>;
