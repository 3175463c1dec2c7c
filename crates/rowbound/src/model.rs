use rowbound_core::schema::TypeDescriptor;

/// A type that can be mapped to and from table rows.
///
/// Usually implemented with `#[derive(Model)]`. A hand-written
/// implementation returns a [`TypeDescriptor`] built with its builder
/// methods.
pub trait Model: Sized + 'static {
    /// Describes the members of the type and how instances are created.
    ///
    /// Called once per type and [`Context`](crate::Context); the resolved
    /// form is cached.
    fn descriptor() -> TypeDescriptor<Self>;
}
