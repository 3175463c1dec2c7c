use super::Connection;
use crate::Result;

/// Hands out connections.
///
/// Pooling policy belongs to the implementation; callers only acquire a
/// connection and drop it when the scope ends.
pub trait Pool: Send + Sync + 'static {
    fn acquire(&self) -> Result<Box<dyn Connection>>;
}

impl<P: Pool + ?Sized> Pool for Box<P> {
    fn acquire(&self) -> Result<Box<dyn Connection>> {
        (**self).acquire()
    }
}
