// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-backed datatype registry.
//!
//! The registry owns every [`Datatype`] it hands out. Descriptors are built
//! lazily from the FOM on first lookup, stored in a per-kind identity map and
//! shared as `Arc`s afterwards.
//!
//! ## Locking
//!
//! - Cache hits take the state read lock only.
//! - Cache misses take the construction lock, re-check the cache and build.
//!   A thread that loses a race for the same name receives the winner's
//!   descriptor, so each `(kind, name)` is constructed at most once.
//! - `initialize` and `reset` take the construction lock and then the state
//!   write lock, so lookups never observe a half-loaded schema.

mod builder;

use crate::config::{ConfigError, RegistryConfig};
use crate::error::{LookupError, SchemaError};
use crate::model::{Datatype, DatatypeKind, DatatypeRef};
use crate::schema::SchemaDocument;
use builder::Builder;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Instant;

/// Lookup statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that had to construct.
    pub misses: u64,
    /// Descriptors constructed, nested ones included.
    pub constructions: u64,
    pub last_miss_ns: u64,
}

/// Cyclic reference met while constructing a datatype.
///
/// The datatype at `name` was referenced while it was still under
/// construction; the referencing descriptor holds an unresolved reference
/// at that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub name: String,
    /// Names under construction, outermost first, ending with `name`.
    pub path: Vec<String>,
}

impl CycleReport {
    pub fn to_error(&self) -> LookupError {
        LookupError::CyclicReference {
            name: self.name.clone(),
            path: self.path.clone(),
        }
    }
}

type Cache = DashMap<String, Arc<Datatype>>;

/// One identity map per declarable kind.
#[derive(Debug, Default)]
struct KindCaches {
    basic: Cache,
    simple: Cache,
    enumerated: Cache,
    array: Cache,
    fixed_record: Cache,
    variant_record: Cache,
}

impl KindCaches {
    fn for_kind(&self, kind: DatatypeKind) -> Option<&Cache> {
        match kind {
            DatatypeKind::Basic => Some(&self.basic),
            DatatypeKind::Simple => Some(&self.simple),
            DatatypeKind::Enumerated => Some(&self.enumerated),
            DatatypeKind::Array => Some(&self.array),
            DatatypeKind::FixedRecord => Some(&self.fixed_record),
            DatatypeKind::VariantRecord => Some(&self.variant_record),
            DatatypeKind::Unresolved => None,
        }
    }

    fn get(&self, kind: DatatypeKind, name: &str) -> Option<Arc<Datatype>> {
        self.for_kind(kind)?.get(name).map(|e| Arc::clone(e.value()))
    }

    /// Insert unless present; returns the cached descriptor.
    fn insert(&self, datatype: Arc<Datatype>) -> Arc<Datatype> {
        match self.for_kind(datatype.kind()) {
            Some(cache) => Arc::clone(
                cache
                    .entry(datatype.name().to_string())
                    .or_insert(datatype)
                    .value(),
            ),
            None => datatype,
        }
    }

    fn len(&self) -> usize {
        DatatypeKind::CLASSIFIED
            .iter()
            .filter_map(|&k| self.for_kind(k))
            .map(DashMap::len)
            .sum()
    }
}

struct LoadedSchema {
    document: SchemaDocument,
    caches: KindCaches,
}

impl LoadedSchema {
    /// Concrete kind for a lookup; `Unresolved` means "any kind".
    fn concrete_kind(&self, kind: DatatypeKind, name: &str) -> Result<DatatypeKind, LookupError> {
        if kind != DatatypeKind::Unresolved {
            return Ok(kind);
        }
        self.document
            .find_any(name)
            .map(|(kind, _)| kind)
            .ok_or_else(|| LookupError::not_found(DatatypeKind::Unresolved, name))
    }
}

/// Datatype registry backed by one FOM schema document.
///
/// Share it with `Arc<DatatypeRegistry>`; every method takes `&self`.
pub struct DatatypeRegistry {
    config: RegistryConfig,
    state: RwLock<Option<LoadedSchema>>,
    build_lock: Mutex<()>,
    stats: RwLock<RegistryStats>,
    cycles: Mutex<Vec<CycleReport>>,
}

impl Default for DatatypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DatatypeRegistry {
    /// Create an uninitialized registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(RegistryConfig::default())
    }

    /// Create an uninitialized registry with `config`.
    ///
    /// Fails with [`ConfigError::Invalid`] when `config` does not validate.
    pub fn with_config(config: RegistryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: RegistryConfig) -> Self {
        Self {
            config,
            state: RwLock::new(None),
            build_lock: Mutex::new(()),
            stats: RwLock::new(RegistryStats::default()),
            cycles: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Parse `schema_text` and make it the backing schema.
    ///
    /// A second call while initialized is a no-op that returns `Ok(())`
    /// without parsing; call [`reset`](Self::reset) first to switch
    /// schemas. On a parse failure the registry stays uninitialized.
    pub fn initialize(&self, schema_text: &str) -> Result<(), SchemaError> {
        {
            let _build = self.build_lock.lock();
            let mut state = self.state.write();
            if state.is_some() {
                log::debug!("datatype registry already initialized, keeping current schema");
                return Ok(());
            }

            let document = SchemaDocument::parse(schema_text)?;
            log::info!(
                "datatype registry initialized ({} declarations)",
                document.len()
            );
            *state = Some(LoadedSchema {
                document,
                caches: KindCaches::default(),
            });
        }

        if self.config.eager {
            // Only fails when a concurrent reset dropped the schema again.
            if let Ok(resolved) = self.resolve_all() {
                log::debug!("eagerly resolved {} datatypes", resolved);
            }
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state.read().is_some()
    }

    /// Drop the schema, every cached descriptor, statistics and cycle
    /// reports.
    pub fn reset(&self) {
        let _build = self.build_lock.lock();
        let previous = self.state.write().take();
        *self.stats.write() = RegistryStats::default();
        self.cycles.lock().clear();
        if previous.is_some() {
            log::info!("datatype registry reset");
        }
    }

    /// Datatype of an object class attribute.
    ///
    /// `kind_hint` is the schema tag of the datatype class (`basicData`,
    /// `simpleData`, ...); unknown tags resolve `name` across all kinds.
    pub fn get_attribute_datatype(
        &self,
        name: &str,
        kind_hint: &str,
    ) -> Result<Arc<Datatype>, LookupError> {
        self.get_datatype(name, DatatypeKind::from_tag(kind_hint))
    }

    /// Datatype of an interaction class parameter.
    ///
    /// Same resolution as [`get_attribute_datatype`](Self::get_attribute_datatype).
    pub fn get_parameter_datatype(
        &self,
        name: &str,
        kind_hint: &str,
    ) -> Result<Arc<Datatype>, LookupError> {
        self.get_datatype(name, DatatypeKind::from_tag(kind_hint))
    }

    /// Resolve `(kind, name)`, constructing it on a cache miss.
    pub fn get_datatype(
        &self,
        name: &str,
        kind: DatatypeKind,
    ) -> Result<Arc<Datatype>, LookupError> {
        if let Some(hit) = self.try_peek(name, kind)? {
            self.record_hit();
            log::trace!("datatype cache hit: {} '{}'", hit.kind(), name);
            return Ok(hit);
        }

        let _build = self.build_lock.lock();
        let state = self.state.read();
        let loaded = state.as_ref().ok_or(LookupError::NotInitialized)?;
        let kind = loaded.concrete_kind(kind, name)?;

        // Another thread may have built it while we waited.
        if let Some(hit) = loaded.caches.get(kind, name) {
            self.record_hit();
            return Ok(hit);
        }

        let start = Instant::now();
        let mut builder = Builder::new(&loaded.document, &loaded.caches, self.config.max_depth);
        let result = builder.resolve(kind, name);
        let outcome = builder.finish();

        self.record_miss(start, outcome.constructed);
        for cycle in outcome.cycles {
            log::warn!("{}", cycle.to_error());
            if self.config.record_cycles {
                self.cycles.lock().push(cycle);
            }
        }

        if let Err(e) = &result {
            log::debug!("failed to resolve {} '{}': {}", kind, name, e);
        }
        result
    }

    /// Follow a nested datatype reference.
    ///
    /// Unresolved (cycle-point) references are looked up again by name, so
    /// they resolve to the descriptor that was under construction.
    pub fn resolve(&self, reference: &DatatypeRef) -> Result<Arc<Datatype>, LookupError> {
        self.get_datatype(&reference.name, reference.kind)
    }

    /// Resolve every declared datatype.
    ///
    /// Individual failures are logged and skipped. Returns the number of
    /// datatypes resolved.
    pub fn resolve_all(&self) -> Result<usize, LookupError> {
        let declarations: Vec<(DatatypeKind, String)> = {
            let state = self.state.read();
            let loaded = state.as_ref().ok_or(LookupError::NotInitialized)?;
            loaded
                .document
                .declarations()
                .map(|(kind, name)| (kind, name.to_string()))
                .collect()
        };

        let mut resolved = 0;
        for (kind, name) in declarations {
            match self.get_datatype(&name, kind) {
                Ok(_) => resolved += 1,
                Err(e) => log::warn!("could not resolve {} '{}': {}", kind, name, e),
            }
        }
        Ok(resolved)
    }

    /// Names declared with `kind`, in document order.
    pub fn declared(&self, kind: DatatypeKind) -> Result<Vec<String>, LookupError> {
        let state = self.state.read();
        let loaded = state.as_ref().ok_or(LookupError::NotInitialized)?;
        Ok(loaded.document.declared(kind).map(str::to_string).collect())
    }

    /// Number of cached descriptors across all kinds.
    pub fn cached_len(&self) -> usize {
        self.state
            .read()
            .as_ref()
            .map_or(0, |loaded| loaded.caches.len())
    }

    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        *self.stats.read()
    }

    /// Cyclic references recorded since the last reset.
    pub fn cycle_reports(&self) -> Vec<CycleReport> {
        self.cycles.lock().clone()
    }

    fn try_peek(
        &self,
        name: &str,
        kind: DatatypeKind,
    ) -> Result<Option<Arc<Datatype>>, LookupError> {
        let state = self.state.read();
        let loaded = state.as_ref().ok_or(LookupError::NotInitialized)?;
        let kind = loaded.concrete_kind(kind, name)?;
        Ok(loaded.caches.get(kind, name))
    }

    fn record_hit(&self) {
        let mut stats = self.stats.write();
        stats.hits = stats.hits.saturating_add(1);
    }

    fn record_miss(&self, start: Instant, constructed: u64) {
        let mut stats = self.stats.write();
        stats.misses = stats.misses.saturating_add(1);
        stats.constructions = stats.constructions.saturating_add(constructed);
        stats.last_miss_ns = start.elapsed().as_nanos() as u64;
    }
}
