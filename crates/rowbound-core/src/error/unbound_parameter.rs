use super::Error;

/// Error when named placeholders remain in a statement after binding.
#[derive(Debug)]
pub(super) struct UnboundParameterError {
    names: Vec<String>,
}

impl std::error::Error for UnboundParameterError {}

impl core::fmt::Display for UnboundParameterError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "unbound parameter(s) remain in sql: {}",
            self.names.join(", ")
        )
    }
}

impl Error {
    /// Creates an unbound parameter error naming the leftover placeholders.
    pub fn unbound_parameter(names: Vec<String>) -> Error {
        Error::from(super::ErrorKind::UnboundParameter(UnboundParameterError {
            names,
        }))
    }

    /// Returns `true` if this error is an unbound parameter error.
    pub fn is_unbound_parameter(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::UnboundParameter(_)))
    }
}
