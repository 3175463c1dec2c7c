use super::Error;

/// Error when a type's members cannot be turned into an accessor table.
///
/// This occurs when:
/// - Two members canonicalize to the same name with conflicting mutability
/// - A type has neither a constructor nor a default instantiator
/// - A constructor parameter names a member that does not exist
///
/// Raised eagerly the first time the type is resolved and never cached.
#[derive(Debug)]
pub(super) struct UnresolvableTypeError {
    type_name: Box<str>,
    message: Box<str>,
}

impl std::error::Error for UnresolvableTypeError {}

impl core::fmt::Display for UnresolvableTypeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "cannot resolve type `{}`: {}", self.type_name, self.message)
    }
}

impl Error {
    /// Creates an unresolvable type error.
    pub fn unresolvable_type(type_name: impl Into<String>, message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnresolvableType(UnresolvableTypeError {
            type_name: type_name.into().into(),
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an unresolvable type error.
    pub fn is_unresolvable_type(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::UnresolvableType(_)))
    }
}
