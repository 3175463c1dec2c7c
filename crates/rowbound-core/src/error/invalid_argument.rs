use super::Error;

/// Error when a caller passes an argument the operation cannot accept.
#[derive(Debug)]
pub(super) struct InvalidArgumentError {
    index: Option<usize>,
    message: Box<str>,
}

impl std::error::Error for InvalidArgumentError {}

impl core::fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self.index {
            Some(index) => write!(f, "invalid argument at index {index}: {}", self.message),
            None => write!(f, "invalid argument: {}", self.message),
        }
    }
}

impl Error {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidArgument(InvalidArgumentError {
            index: None,
            message: message.into().into(),
        }))
    }

    /// Creates an invalid argument error pointing at one element of an input
    /// sequence.
    pub fn invalid_argument_at(index: usize, message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidArgument(InvalidArgumentError {
            index: Some(index),
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid argument error.
    pub fn is_invalid_argument(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::InvalidArgument(_)))
    }

    /// Returns the input index named by an invalid argument error.
    pub fn invalid_argument_index(&self) -> Option<usize> {
        self.chain().find_map(|err| match err.kind() {
            super::ErrorKind::InvalidArgument(err) => err.index,
            _ => None,
        })
    }
}
