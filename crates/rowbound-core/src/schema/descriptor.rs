//! Type descriptors.
//!
//! A [`TypeDescriptor`] is the structured description of a mapped type: its
//! members, how each member is read and written, the markers attached to
//! them, and how new instances are created. `#[derive(Model)]` generates one;
//! types that cannot use the derive build one by hand.
//!
//! ```ignore
//! TypeDescriptor::new("Point")
//!     .member(Member::property("x").with_get(|p: &Point| p.x().into()))
//!     .member(Member::property("y").with_get(|p: &Point| p.y().into()))
//!     .constructor(Constructor::new(
//!         [CtorParam::required("x"), CtorParam::required("y")],
//!         |args| Ok(Point::new(i64::load(args[0].clone())?, i64::load(args[1].clone())?)),
//!     ))
//! ```

use crate::{stmt::Value, Result};
use std::{fmt, sync::Arc};

/// Reads one member.
pub type Getter<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// Writes one member.
pub type Setter<T> = Arc<dyn Fn(&mut T, Value) -> Result<()> + Send + Sync>;

/// Builds an instance from constructor arguments in parameter order.
pub type Build<T> = Arc<dyn Fn(Vec<Value>) -> Result<T> + Send + Sync>;

/// Creates a default instance, to be populated through setters.
pub type Instantiate<T> = Arc<dyn Fn() -> T + Send + Sync>;

pub struct TypeDescriptor<T> {
    /// Type name used for table name guessing and error messages
    pub type_name: &'static str,

    /// Explicit table name marker
    pub table: Option<String>,

    /// Members in declaration order
    pub members: Vec<Member<T>>,

    /// Constructor used to create instances, if any
    pub constructor: Option<Constructor<T>>,

    /// Default instantiator, used when there is no constructor
    pub instantiate: Option<Instantiate<T>>,
}

pub struct Member<T> {
    /// Member name as declared
    pub name: String,

    pub kind: MemberKind<T>,

    pub markers: Markers,
}

/// How a member is accessed.
pub enum MemberKind<T> {
    /// A public field: always readable and writable
    Field { get: Getter<T>, set: Setter<T> },

    /// A getter and/or setter pair
    Property {
        get: Option<Getter<T>>,
        set: Option<Setter<T>>,
    },
}

/// Declarative markers attached to a member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers {
    /// Maps the member to this column instead of its own name
    pub column: Option<String>,

    /// Excludes the member from mapping
    pub skip: bool,
}

pub struct Constructor<T> {
    pub params: Vec<CtorParam<T>>,
    pub build: Build<T>,
}

/// One constructor parameter, matched to a column by name.
pub struct CtorParam<T> {
    pub name: String,

    /// Required parameters fail mapping when their column is absent;
    /// optional ones receive `NULL`.
    pub required: bool,

    /// Reads the value back from an instance, when the type exposes it
    pub get: Option<Getter<T>>,
}

impl<T> TypeDescriptor<T> {
    pub fn new(type_name: &'static str) -> TypeDescriptor<T> {
        TypeDescriptor {
            type_name,
            table: None,
            members: vec![],
            constructor: None,
            instantiate: None,
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn member(mut self, member: Member<T>) -> Self {
        self.members.push(member);
        self
    }

    pub fn field(
        self,
        name: impl Into<String>,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
        set: impl Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.member(Member::field(name, get, set))
    }

    pub fn constructor(mut self, constructor: Constructor<T>) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn instantiate(mut self, instantiate: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.instantiate = Some(Arc::new(instantiate));
        self
    }
}

impl<T: Default + 'static> TypeDescriptor<T> {
    /// Instantiates through `Default` before applying setters.
    pub fn with_default(self) -> Self {
        self.instantiate(T::default)
    }
}

impl<T> Member<T> {
    pub fn field(
        name: impl Into<String>,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
        set: impl Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    ) -> Member<T> {
        Member {
            name: name.into(),
            kind: MemberKind::Field {
                get: Arc::new(get),
                set: Arc::new(set),
            },
            markers: Markers::default(),
        }
    }

    /// A property with neither getter nor setter; add them with
    /// [`Member::with_get`] and [`Member::with_set`].
    pub fn property(name: impl Into<String>) -> Member<T> {
        Member {
            name: name.into(),
            kind: MemberKind::Property {
                get: None,
                set: None,
            },
            markers: Markers::default(),
        }
    }

    pub fn with_get(mut self, f: impl Fn(&T) -> Value + Send + Sync + 'static) -> Self {
        match &mut self.kind {
            MemberKind::Field { get, .. } => *get = Arc::new(f),
            MemberKind::Property { get, .. } => *get = Some(Arc::new(f)),
        }
        self
    }

    pub fn with_set(
        mut self,
        f: impl Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        match &mut self.kind {
            MemberKind::Field { set, .. } => *set = Arc::new(f),
            MemberKind::Property { set, .. } => *set = Some(Arc::new(f)),
        }
        self
    }

    /// Renames the member to `column`.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.markers.column = Some(column.into());
        self
    }

    /// Excludes the member from mapping.
    pub fn skip(mut self) -> Self {
        self.markers.skip = true;
        self
    }

    /// The name the member maps to: the column marker if present, otherwise
    /// the declared name.
    pub fn mapped_name(&self) -> &str {
        self.markers.column.as_deref().unwrap_or(&self.name)
    }

    pub fn getter(&self) -> Option<&Getter<T>> {
        match &self.kind {
            MemberKind::Field { get, .. } => Some(get),
            MemberKind::Property { get, .. } => get.as_ref(),
        }
    }

    pub fn setter(&self) -> Option<&Setter<T>> {
        match &self.kind {
            MemberKind::Field { set, .. } => Some(set),
            MemberKind::Property { set, .. } => set.as_ref(),
        }
    }
}

impl<T> Constructor<T> {
    pub fn new(
        params: impl IntoIterator<Item = CtorParam<T>>,
        build: impl Fn(Vec<Value>) -> Result<T> + Send + Sync + 'static,
    ) -> Constructor<T> {
        Constructor {
            params: params.into_iter().collect(),
            build: Arc::new(build),
        }
    }
}

impl<T> CtorParam<T> {
    pub fn required(name: impl Into<String>) -> CtorParam<T> {
        CtorParam {
            name: name.into(),
            required: true,
            get: None,
        }
    }

    pub fn optional(name: impl Into<String>) -> CtorParam<T> {
        CtorParam {
            name: name.into(),
            required: false,
            get: None,
        }
    }

    pub fn with_getter(mut self, get: impl Fn(&T) -> Value + Send + Sync + 'static) -> Self {
        self.get = Some(Arc::new(get));
        self
    }
}

impl<T> fmt::Debug for TypeDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("table", &self.table)
            .field("members", &self.members)
            .field(
                "constructor",
                &self
                    .constructor
                    .as_ref()
                    .map(|ctor| ctor.params.iter().map(|p| &p.name).collect::<Vec<_>>()),
            )
            .field("instantiate", &self.instantiate.is_some())
            .finish()
    }
}

impl<T> fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            MemberKind::Field { .. } => "field",
            MemberKind::Property { .. } => "property",
        };

        f.debug_struct("Member")
            .field("name", &self.name)
            .field("kind", &kind)
            .field("readable", &self.getter().is_some())
            .field("writable", &self.setter().is_some())
            .field("markers", &self.markers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::Primitive;

    #[derive(Debug, Default, PartialEq)]
    struct Counter {
        hits: i64,
    }

    #[test]
    fn default_instantiator_then_setters() {
        let descriptor = TypeDescriptor::<Counter>::new("Counter")
            .field(
                "hits",
                |c| Value::from(c.hits),
                |c, v| {
                    c.hits = i64::load(v)?;
                    Ok(())
                },
            )
            .with_default();

        let instantiate = descriptor.instantiate.as_ref().unwrap();
        let mut counter = instantiate();
        assert_eq!(counter, Counter::default());

        let set = descriptor.members[0].setter().unwrap();
        set(&mut counter, Value::from(3i64)).unwrap();
        assert_eq!(counter.hits, 3);
    }
}
