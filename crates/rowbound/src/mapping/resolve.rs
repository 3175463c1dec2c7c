use rowbound_core::{
    name::{CanonicalName, Canonicalizer},
    schema::descriptor::{
        Build, Getter, Instantiate, Member, MemberKind, Setter, TypeDescriptor,
    },
    stmt::Value,
    Error, Result,
};

use indexmap::IndexMap;
use std::{collections::HashMap, fmt};

/// Reads and/or writes one member of `T`.
pub enum Accessor<T> {
    Field {
        get: Getter<T>,
        set: Setter<T>,
    },
    Property {
        get: Option<Getter<T>>,
        set: Option<Setter<T>>,
    },

    /// A constructor parameter with no matching member. It can only be
    /// written by creating the instance.
    ConstructorSlot {
        index: usize,
        get: Option<Getter<T>>,
    },
}

/// The resolved accessor table of a type.
pub struct ResolvedType<T> {
    type_name: &'static str,

    /// Table name marker
    table: Option<String>,

    /// One accessor per canonical name, in declaration order
    accessors: IndexMap<CanonicalName, Accessor<T>>,

    creation: Creation<T>,
}

pub(crate) enum Creation<T> {
    Constructor {
        /// Parameters in call order
        params: Vec<CtorSlot>,

        /// Canonical parameter name to call position
        positions: HashMap<CanonicalName, usize>,

        build: Build<T>,
    },
    Instantiate(Instantiate<T>),
}

#[derive(Debug, Clone)]
pub(crate) struct CtorSlot {
    pub(crate) name: CanonicalName,
    pub(crate) required: bool,
}

/// Resolution strategies, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Strategy {
    Marker,
    Property,
    Field,
}

impl<T> Accessor<T> {
    pub fn is_readable(&self) -> bool {
        match self {
            Accessor::Field { .. } => true,
            Accessor::Property { get, .. } | Accessor::ConstructorSlot { get, .. } => {
                get.is_some()
            }
        }
    }

    pub fn is_writable(&self) -> bool {
        match self {
            Accessor::Field { .. } => true,
            Accessor::Property { set, .. } => set.is_some(),
            Accessor::ConstructorSlot { .. } => false,
        }
    }

    fn getter(&self) -> Option<&Getter<T>> {
        match self {
            Accessor::Field { get, .. } => Some(get),
            Accessor::Property { get, .. } | Accessor::ConstructorSlot { get, .. } => get.as_ref(),
        }
    }

    fn setter(&self) -> Option<&Setter<T>> {
        match self {
            Accessor::Field { set, .. } => Some(set),
            Accessor::Property { set, .. } => set.as_ref(),
            Accessor::ConstructorSlot { .. } => None,
        }
    }

    /// Reads the member. `name` is used for the error message only.
    pub fn get(&self, obj: &T, name: &CanonicalName) -> Result<Value> {
        match self.getter() {
            Some(get) => Ok(get(obj)),
            None => Err(Error::mapping(format!("member `{name}` has no getter"))),
        }
    }

    /// Writes the member. `name` is used for the error message only.
    pub fn set(&self, obj: &mut T, value: Value, name: &CanonicalName) -> Result<()> {
        match self.setter() {
            Some(set) => set(obj, value),
            None => Err(Error::mapping(format!("member `{name}` has no setter"))),
        }
    }
}

impl<T> ResolvedType<T> {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The explicit table name, if the type declares one.
    pub fn table_marker(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn accessor(&self, name: &CanonicalName) -> Option<&Accessor<T>> {
        self.accessors.get(name)
    }

    pub fn accessors(&self) -> impl ExactSizeIterator<Item = (&CanonicalName, &Accessor<T>)> {
        self.accessors.iter()
    }

    pub fn contains(&self, name: &CanonicalName) -> bool {
        self.accessors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }

    /// Reads a member by canonical name.
    pub fn get(&self, obj: &T, name: &CanonicalName) -> Result<Value> {
        match self.accessors.get(name) {
            Some(accessor) => accessor.get(obj, name),
            None => Err(Error::mapping(format!(
                "type `{}` has no member `{name}`",
                self.type_name
            ))),
        }
    }

    pub(crate) fn accessor_index(&self, name: &CanonicalName) -> Option<usize> {
        self.accessors.get_index_of(name)
    }

    pub(crate) fn accessor_at(&self, index: usize) -> Option<(&CanonicalName, &Accessor<T>)> {
        self.accessors.get_index(index)
    }

    pub(crate) fn creation(&self) -> &Creation<T> {
        &self.creation
    }
}

/// Resolves `descriptor` into one accessor per canonical member name.
///
/// When several members map to the same name, the strongest strategy wins:
/// a renaming marker, then a getter/setter property, then a plain field.
/// Constructor parameters with no member become
/// [`Accessor::ConstructorSlot`]s.
pub fn resolve<T>(descriptor: TypeDescriptor<T>, names: &Canonicalizer) -> Result<ResolvedType<T>> {
    let TypeDescriptor {
        type_name,
        table,
        members,
        constructor,
        instantiate,
    } = descriptor;

    let mut winners: IndexMap<CanonicalName, (Strategy, Member<T>)> = IndexMap::new();

    for member in members {
        if member.markers.skip {
            continue;
        }

        let name = names.canonicalize(member.mapped_name());
        let strategy = strategy_of(&member);

        let Some((current, existing)) = winners.get(&name) else {
            winners.insert(name, (strategy, member));
            continue;
        };

        if strategy < *current {
            winners.insert(name, (strategy, member));
        } else if strategy == *current {
            if access_of(&member) != access_of(existing) {
                return Err(Error::unresolvable_type(
                    type_name,
                    format!(
                        "members `{}` and `{}` both map to `{name}` with different mutability",
                        existing.name, member.name
                    ),
                ));
            }

            tracing::debug!(
                target: "rowbound::mapping",
                type_name,
                kept = %existing.name,
                ignored = %member.name,
                "duplicate member name"
            );
        }
    }

    let mut accessors: IndexMap<CanonicalName, Accessor<T>> = winners
        .into_iter()
        .map(|(name, (_, member))| {
            let accessor = match member.kind {
                MemberKind::Field { get, set } => Accessor::Field { get, set },
                MemberKind::Property { get, set } => Accessor::Property { get, set },
            };
            (name, accessor)
        })
        .collect();

    let creation = match (constructor, instantiate) {
        (Some(constructor), _) => {
            let mut params = Vec::with_capacity(constructor.params.len());
            let mut positions = HashMap::new();

            for (index, param) in constructor.params.into_iter().enumerate() {
                let name = names.canonicalize(&param.name);

                if positions.insert(name.clone(), index).is_some() {
                    return Err(Error::unresolvable_type(
                        type_name,
                        format!("constructor parameter `{name}` declared twice"),
                    ));
                }

                if !accessors.contains_key(&name) {
                    accessors.insert(
                        name.clone(),
                        Accessor::ConstructorSlot {
                            index,
                            get: param.get,
                        },
                    );
                }

                params.push(CtorSlot {
                    name,
                    required: param.required,
                });
            }

            Creation::Constructor {
                params,
                positions,
                build: constructor.build,
            }
        }
        (None, Some(instantiate)) => Creation::Instantiate(instantiate),
        (None, None) => {
            return Err(Error::unresolvable_type(
                type_name,
                "no constructor and no default instantiator",
            ))
        }
    };

    Ok(ResolvedType {
        type_name,
        table,
        accessors,
        creation,
    })
}

fn strategy_of<T>(member: &Member<T>) -> Strategy {
    if member.markers.column.is_some() {
        return Strategy::Marker;
    }

    match member.kind {
        MemberKind::Property { .. } => Strategy::Property,
        MemberKind::Field { .. } => Strategy::Field,
    }
}

fn access_of<T>(member: &Member<T>) -> (bool, bool) {
    (member.getter().is_some(), member.setter().is_some())
}

impl<T> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Field { .. } => f.write_str("Field"),
            Accessor::Property { get, set } => f
                .debug_struct("Property")
                .field("get", &get.is_some())
                .field("set", &set.is_some())
                .finish(),
            Accessor::ConstructorSlot { index, get } => f
                .debug_struct("ConstructorSlot")
                .field("index", index)
                .field("get", &get.is_some())
                .finish(),
        }
    }
}

impl<T> fmt::Debug for ResolvedType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedType")
            .field("type_name", &self.type_name)
            .field("table", &self.table)
            .field("accessors", &self.accessors)
            .finish()
    }
}
