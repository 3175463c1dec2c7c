mod num;

mod primitive;
pub use primitive::Primitive;

mod value;
pub use value::Value;
