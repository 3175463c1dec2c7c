use crate::{
    config::Config,
    log::Logger,
    mapping::{resolve, table_name, Intent, ObjectParameters, ResolvedType, TableBinding},
    Model,
};

use dashmap::DashMap;
use rowbound_core::{
    driver::Connection,
    name::{CanonicalName, Canonicalizer},
    schema::{DbMetadata, TableMetadata},
    Error, Result,
};
use rowbound_sql::{Flavor, NamedParameterSql, ParameterizedSql};

use std::{
    any::{Any, TypeId},
    sync::{Arc, RwLock},
};

type Cached = Arc<dyn Any + Send + Sync>;

/// A type, and the table it was bound to when the caller named one.
type BindingKey = (TypeId, Option<CanonicalName>);

/// Shared mapping state.
///
/// Holds the configuration and every cache the mapping layer builds: the
/// canonical name table, resolved accessor tables and table bindings. A
/// context is cheap to share through an `Arc` and safe to use from many
/// connections at once.
pub struct Context {
    config: Config,

    names: Canonicalizer,

    logger: Logger,

    /// Resolved accessor tables by type
    resolved: DashMap<TypeId, Cached>,

    /// Table bindings by type and explicit table
    bindings: DashMap<BindingKey, Cached>,

    /// Metadata snapshot the bindings were built from
    metadata: RwLock<Option<Arc<DbMetadata>>>,
}

impl Context {
    pub fn new(config: Config) -> Result<Context> {
        config.validate()?;

        Ok(Context {
            names: Canonicalizer::new(config.canonical_policy),
            logger: Logger::new(&config.log),
            config,
            resolved: DashMap::new(),
            bindings: DashMap::new(),
            metadata: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn names(&self) -> &Canonicalizer {
        &self.names
    }

    pub fn canonicalize(&self, raw: &str) -> CanonicalName {
        self.names.canonicalize(raw)
    }

    pub(crate) fn logger(&self) -> &Logger {
        &self.logger
    }

    /// The accessor table of `T`, resolved on first use.
    ///
    /// Failures are not cached; every call for an unresolvable type fails
    /// again.
    pub fn resolve<T: Model>(&self) -> Result<Arc<ResolvedType<T>>> {
        let key = TypeId::of::<T>();

        if let Some(cached) = self.resolved.get(&key) {
            return downcast(cached.clone());
        }

        let resolved = resolve::resolve(T::descriptor(), &self.names)?;
        self.logger.mapping(format_args!(
            "resolved `{}` with {} accessor(s)",
            resolved.type_name(),
            resolved.len()
        ));

        let cached = self
            .resolved
            .entry(key)
            .or_insert_with(|| Arc::new(resolved) as Cached)
            .clone();
        downcast(cached)
    }

    /// The table binding of `T`, checked for `intent`.
    ///
    /// The binding is built from the connection's metadata on first use and
    /// cached for the lifetime of the context.
    pub fn binding<T: Model>(
        &self,
        conn: &mut dyn Connection,
        intent: Intent,
    ) -> Result<Arc<TableBinding<T>>> {
        self.bind::<T>(conn, None, intent)
    }

    /// The binding of `T` to `table`, which need not be the table `T` maps
    /// to. Cached separately for every table.
    pub fn binding_on<T: Model>(
        &self,
        conn: &mut dyn Connection,
        table: &str,
        intent: Intent,
    ) -> Result<Arc<TableBinding<T>>> {
        self.bind::<T>(conn, Some(table), intent)
    }

    /// The metadata of the table named `table`, matched canonically.
    pub fn table_metadata(
        &self,
        conn: &mut dyn Connection,
        table: &str,
    ) -> Result<TableMetadata> {
        let metadata = self.metadata(conn)?;
        let found = table_name::find_table(&metadata, table, Some(table), &self.names)?;
        Ok(found.clone())
    }

    fn bind<T: Model>(
        &self,
        conn: &mut dyn Connection,
        table: Option<&str>,
        intent: Intent,
    ) -> Result<Arc<TableBinding<T>>> {
        let key = (TypeId::of::<T>(), table.map(|table| self.names.canonicalize(table)));

        let binding = match self.bindings.get(&key).map(|cached| cached.clone()) {
            Some(cached) => downcast::<TableBinding<T>>(cached)?,
            None => {
                let resolved = self.resolve::<T>()?;
                let metadata = self.metadata(conn)?;
                let flavor = self
                    .config
                    .flavor
                    .unwrap_or_else(|| Flavor::from_product_name(&metadata.product_name));
                let strict = self.config.strict_member_mapping;

                let binding = match table {
                    Some(table) => TableBinding::bind_on(
                        resolved,
                        Some(table),
                        &metadata,
                        &self.names,
                        flavor,
                        strict,
                    )?,
                    None => TableBinding::bind(resolved, &metadata, &self.names, flavor, strict)?,
                };

                self.logger.mapping(format_args!(
                    "bound `{}` to table `{}` ({} column(s))",
                    binding.resolved().type_name(),
                    binding.table_name(),
                    binding.columns().len()
                ));

                let cached = self
                    .bindings
                    .entry(key)
                    .or_insert_with(|| Arc::new(binding) as Cached)
                    .clone();
                downcast(cached)?
            }
        };

        binding.require(intent)?;
        Ok(binding)
    }

    /// Drops every table binding and the metadata snapshot, so the next
    /// binding request reads fresh metadata.
    pub fn invalidate_bindings(&self) {
        self.bindings.clear();
        if let Ok(mut metadata) = self.metadata.write() {
            *metadata = None;
        }
    }

    /// Starts named SQL using the configured placeholder syntax.
    pub fn named<'a>(&self, sql: impl Into<String>) -> NamedParameterSql<'a> {
        NamedParameterSql::new(sql).placeholder(self.config.placeholder.clone())
    }

    /// Parses named SQL, strictly if the configuration asks for it.
    pub fn parse_named(&self, sql: &NamedParameterSql<'_>) -> Result<ParameterizedSql> {
        if self.config.strict_named_parameters {
            sql.parse_strict()
        } else {
            sql.parse()
        }
    }

    /// Exposes the members of `obj` as named parameters.
    pub fn parameters<'a, T: Model>(&'a self, obj: &'a T) -> Result<ObjectParameters<'a, T>> {
        Ok(ObjectParameters::new(obj, self.resolve::<T>()?, &self.names))
    }

    fn metadata(&self, conn: &mut dyn Connection) -> Result<Arc<DbMetadata>> {
        if let Some(metadata) = self.read_metadata() {
            return Ok(metadata);
        }

        let snapshot = Arc::new(conn.metadata()?);

        let mut slot = self
            .metadata
            .write()
            .map_err(|_| Error::mapping("metadata cache lock poisoned"))?;
        Ok(slot.get_or_insert(snapshot).clone())
    }

    fn read_metadata(&self) -> Option<Arc<DbMetadata>> {
        self.metadata.read().ok()?.clone()
    }
}

fn downcast<T: Send + Sync + 'static>(cached: Cached) -> Result<Arc<T>> {
    cached
        .downcast::<T>()
        .map_err(|_| Error::mapping("cached entry has an unexpected type"))
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("resolved", &self.resolved.len())
            .field("bindings", &self.bindings.len())
            .finish()
    }
}
