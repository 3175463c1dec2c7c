//! Mapping configuration.
//!
//! A [`Config`] is fixed when the [`Context`](crate::Context) is created.
//! Build one in code:
//!
//! ```
//! use rowbound::config::{Config, MultiRowStrategy};
//!
//! let config = Config::new()
//!     .multi_row_strategy(MultiRowStrategy::SimpleBatch)
//!     .batch_size(100);
//! ```
//!
//! or load it from TOML, where every key is optional:
//!
//! ```toml
//! canonical_policy = "upper_snake"
//! multi_row_strategy = "multi_row_and_batch"
//! multi_row_size = 16
//! flavor = "postgresql"
//! log = ["execute_update", "multi_row"]
//!
//! [placeholder]
//! prefix = "${"
//! suffix = "}"
//! ```

use rowbound_core::{name::CanonicalPolicy, Error, Result};
use rowbound_sql::{Flavor, NamedPlaceholder};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// How column and member names are compared
    pub canonical_policy: CanonicalPolicy,

    /// How multi-object inserts and merges are executed
    pub multi_row_strategy: MultiRowStrategy,

    /// Rows queued per native batch flush
    pub batch_size: usize,

    /// Value tuples per multi-row statement
    pub multi_row_size: usize,

    /// Multi-row statements queued per native batch flush, for
    /// [`MultiRowStrategy::MultiRowAndBatch`]
    pub batch_size_with_multi_row: usize,

    /// SQL dialect for merge statements. Guessed from the database product
    /// name when unset.
    pub flavor: Option<Flavor>,

    /// Syntax of named placeholders
    pub placeholder: NamedPlaceholder,

    /// Fail binding when a mapped member has no matching column
    pub strict_member_mapping: bool,

    /// Fail named parsing when a placeholder is left unresolved
    pub strict_named_parameters: bool,

    /// Enabled log categories
    pub log: Vec<LogCategory>,
}

/// Execution strategy for multi-object writes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiRowStrategy {
    /// One statement with several value tuples per chunk
    #[default]
    MultiRow,

    /// One single-row statement executed through the driver's native batch
    SimpleBatch,

    /// Multi-row statements, several per native batch
    MultiRowAndBatch,
}

/// Groups of log events that can be switched on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogCategory {
    /// Queries returning rows
    ExecuteQuery,

    /// Statements returning an affected row count
    ExecuteUpdate,

    /// Chunk progress of multi-object writes
    MultiRow,

    /// Accessor resolution, table binding and row mapping
    Mapping,
}

impl LogCategory {
    pub const ALL: [LogCategory; 4] = [
        LogCategory::ExecuteQuery,
        LogCategory::ExecuteUpdate,
        LogCategory::MultiRow,
        LogCategory::Mapping,
    ];
}

impl Default for Config {
    fn default() -> Self {
        Config {
            canonical_policy: CanonicalPolicy::default(),
            multi_row_strategy: MultiRowStrategy::default(),
            batch_size: 32,
            multi_row_size: 32,
            batch_size_with_multi_row: 5,
            flavor: None,
            placeholder: NamedPlaceholder::default(),
            strict_member_mapping: false,
            strict_named_parameters: false,
            log: LogCategory::ALL.to_vec(),
        }
    }
}

impl Config {
    /// Create a new Config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(src: &str) -> Result<Config> {
        let config: Config = toml::from_str(src)
            .map_err(|err| Error::invalid_argument(format!("invalid configuration: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn canonical_policy(mut self, policy: CanonicalPolicy) -> Self {
        self.canonical_policy = policy;
        self
    }

    pub fn multi_row_strategy(mut self, strategy: MultiRowStrategy) -> Self {
        self.multi_row_strategy = strategy;
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn multi_row_size(mut self, size: usize) -> Self {
        self.multi_row_size = size;
        self
    }

    pub fn batch_size_with_multi_row(mut self, size: usize) -> Self {
        self.batch_size_with_multi_row = size;
        self
    }

    pub fn flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = Some(flavor);
        self
    }

    pub fn placeholder(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.placeholder = NamedPlaceholder::new(prefix, suffix);
        self
    }

    pub fn strict_member_mapping(mut self, strict: bool) -> Self {
        self.strict_member_mapping = strict;
        self
    }

    pub fn strict_named_parameters(mut self, strict: bool) -> Self {
        self.strict_named_parameters = strict;
        self
    }

    /// Replaces the enabled log categories.
    pub fn log(mut self, categories: impl IntoIterator<Item = LogCategory>) -> Self {
        self.log = categories.into_iter().collect();
        self
    }

    /// Checks sizes and placeholder syntax.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("batch_size", self.batch_size),
            ("multi_row_size", self.multi_row_size),
            ("batch_size_with_multi_row", self.batch_size_with_multi_row),
        ] {
            if value == 0 {
                return Err(Error::invalid_argument(format!(
                    "`{name}` must be greater than zero"
                )));
            }
        }

        self.placeholder.validate()
    }
}
