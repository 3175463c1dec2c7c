use super::Error;

/// Error when rows and objects cannot be converted into one another.
///
/// This occurs when:
/// - A required constructor parameter has no matching column
/// - An accessor is read without a getter or written without a setter
/// - No table matches a type
/// - A strict binding finds a member without a column
#[derive(Debug)]
pub(super) struct MappingError {
    message: Box<str>,
}

impl std::error::Error for MappingError {}

impl core::fmt::Display for MappingError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "mapping failed: {}", self.message)
    }
}

impl Error {
    /// Creates a mapping error.
    pub fn mapping(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Mapping(MappingError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a mapping error.
    pub fn is_mapping(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::Mapping(_)))
    }
}
