use super::Error;

/// Error when the number of placeholders in a statement does not match the
/// number of bound values, or a list placeholder is bound to a non-list value.
#[derive(Debug)]
pub(super) enum BindingError {
    Count { placeholders: usize, values: usize },
    NotAList { position: usize },
}

impl std::error::Error for BindingError {}

impl core::fmt::Display for BindingError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            BindingError::Count {
                placeholders,
                values,
            } => write!(f, "{placeholders} placeholders but {values} values bound"),
            BindingError::NotAList { position } => write!(
                f,
                "list placeholder at parameter {position} is not bound to a list value"
            ),
        }
    }
}

impl Error {
    /// Creates a binding error for a placeholder/value count mismatch.
    pub fn binding(placeholders: usize, values: usize) -> Error {
        Error::from(super::ErrorKind::Binding(BindingError::Count {
            placeholders,
            values,
        }))
    }

    /// Creates a binding error for a list placeholder bound to a scalar.
    ///
    /// `position` is the zero-based index of the offending parameter.
    pub fn binding_not_a_list(position: usize) -> Error {
        Error::from(super::ErrorKind::Binding(BindingError::NotAList { position }))
    }

    /// Returns `true` if this error is a binding error.
    pub fn is_binding(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::Binding(_)))
    }
}
