//! Name → calendar registry.
//!
//! Calendar types implement [`CalendarKind`] and are registered under their
//! type name, or under their aliases when they declare any. Registration
//! builds and validates the definition once; lookups hand out the shared
//! [`RegisteredCalendar`].
//!
//! The process-wide instance is created on first use of
//! [`Registry::global`] and holds every built-in exchange. A registry
//! created with [`Registry::child`] sees its parent's calendars and forwards
//! its own registrations to the parent.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use mc_core::errors::{Error, Result};
use tracing::{debug, warn};

use crate::definition::CalendarDefinition;
use crate::market_calendar::{CalendarOptions, MarketCalendar};

/// A registrable calendar type.
pub trait CalendarKind: fmt::Debug + Send + Sync + 'static {
    /// Name the type registers under when it declares no aliases.
    fn type_name(&self) -> &str;

    /// Names to register under instead of the type name. `None` and an
    /// empty list both mean "use the explicit name".
    fn aliases(&self) -> Option<Vec<String>> {
        None
    }

    /// Build the calendar definition.
    fn definition(&self) -> Result<CalendarDefinition>;
}

/// A calendar type together with its validated definition.
#[derive(Debug)]
pub struct RegisteredCalendar {
    kind: Box<dyn CalendarKind>,
    definition: Arc<CalendarDefinition>,
}

impl RegisteredCalendar {
    /// The registered type.
    pub fn kind(&self) -> &dyn CalendarKind {
        self.kind.as_ref()
    }

    /// The shared definition.
    pub fn definition(&self) -> &Arc<CalendarDefinition> {
        &self.definition
    }

    /// Create a calendar instance.
    pub fn instantiate(&self, options: CalendarOptions) -> MarketCalendar {
        MarketCalendar::new(Arc::clone(&self.definition), options)
    }
}

/// Build `kind`'s definition and the names it registers under.
fn prepare<K: CalendarKind>(kind: K, name: &str) -> Result<(Vec<String>, Arc<RegisteredCalendar>)> {
    let definition = kind.definition()?;
    let names = match kind.aliases() {
        Some(aliases) if !aliases.is_empty() => aliases,
        _ => vec![name.to_owned()],
    };
    if let Some(blank) = names.iter().find(|n| n.trim().is_empty()) {
        return Err(Error::Configuration(format!(
            "{}: cannot register under the name {blank:?}",
            definition.name()
        )));
    }
    let entry = Arc::new(RegisteredCalendar {
        kind: Box::new(kind),
        definition: Arc::new(definition),
    });
    Ok((names, entry))
}

type Entries = BTreeMap<String, Arc<RegisteredCalendar>>;

/// A table of registered calendars.
#[derive(Debug, Default)]
pub struct Registry {
    entries: RwLock<Entries>,
    parent: Option<Arc<Registry>>,
}

static GLOBAL: OnceLock<Arc<Registry>> = OnceLock::new();

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty registry layered on `parent`.
    pub fn child(parent: Arc<Registry>) -> Self {
        Self {
            entries: RwLock::default(),
            parent: Some(parent),
        }
    }

    /// A fresh registry holding the built-in exchanges.
    pub fn with_builtins() -> Result<Self> {
        let registry = Self::new();
        crate::exchanges::register_builtins(&registry)?;
        Ok(registry)
    }

    /// The process-wide registry, built on first use.
    ///
    /// # Panics
    /// If a built-in exchange fails validation.
    pub fn global() -> Arc<Registry> {
        let registry = GLOBAL.get_or_init(|| match Registry::with_builtins() {
            Ok(registry) => Arc::new(registry),
            Err(err) => panic!("built-in calendar failed validation: {err}"),
        });
        Arc::clone(registry)
    }

    /// Register `kind` under its type name (or its aliases).
    pub fn register<K: CalendarKind>(&self, kind: K) -> Result<Arc<RegisteredCalendar>> {
        let name = kind.type_name().to_owned();
        self.register_as(kind, &name)
    }

    /// Register `kind` under its aliases, or under `name` when it declares
    /// none.
    ///
    /// The definition is built first; a malformed calendar is never
    /// registered. A later registration under the same name replaces the
    /// earlier one.
    pub fn register_as<K: CalendarKind>(&self, kind: K, name: &str) -> Result<Arc<RegisteredCalendar>> {
        let (names, entry) = prepare(kind, name)?;
        self.insert(&names, &entry);
        debug!(calendar = %entry.definition.name(), names = ?names, "registered calendar");
        Ok(entry)
    }

    /// Register every calendar in `kinds`, or none of them.
    ///
    /// Each definition is built and each name checked before anything is
    /// inserted. Returns the names the calendars were registered under.
    pub fn register_all<K, I>(&self, kinds: I) -> Result<Vec<String>>
    where
        K: CalendarKind,
        I: IntoIterator<Item = K>,
    {
        let prepared = kinds
            .into_iter()
            .map(|kind| {
                let name = kind.type_name().to_owned();
                prepare(kind, &name)
            })
            .collect::<Result<Vec<_>>>()?;
        let mut registered = Vec::new();
        for (names, entry) in &prepared {
            self.insert(names, entry);
            debug!(calendar = %entry.definition.name(), names = ?names, "registered calendar");
            registered.extend(names.iter().cloned());
        }
        Ok(registered)
    }

    fn insert(&self, names: &[String], entry: &Arc<RegisteredCalendar>) {
        {
            let mut entries = self.write();
            for name in names {
                entries.insert(name.clone(), Arc::clone(entry));
            }
        }
        if let Some(parent) = &self.parent {
            parent.insert(names, entry);
        }
    }

    /// Look up `name` here, then in the parent chain.
    ///
    /// # Errors
    /// [`Error::NotFound`] listing every visible name.
    pub fn resolve(&self, name: &str) -> Result<Arc<RegisteredCalendar>> {
        match self.lookup(name) {
            Some(entry) => Ok(entry),
            None => {
                let available = self.names();
                warn!(calendar = name, registered = available.len(), "unknown calendar");
                Err(Error::not_found("calendar", name, available))
            }
        }
    }

    fn lookup(&self, name: &str) -> Option<Arc<RegisteredCalendar>> {
        if let Some(entry) = self.read().get(name) {
            return Some(Arc::clone(entry));
        }
        self.parent.as_ref().and_then(|p| p.lookup(name))
    }

    /// Resolve `name` and instantiate it with `options`.
    pub fn create(&self, name: &str, options: CalendarOptions) -> Result<MarketCalendar> {
        Ok(self.resolve(name)?.instantiate(options))
    }

    /// Every visible name and alias.
    pub fn names(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self.read().keys().cloned().collect();
        if let Some(parent) = &self.parent {
            names.extend(parent.names());
        }
        names
    }

    /// Return `true` if `name` resolves.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Instantiate the calendar registered globally under `name`.
pub fn get_calendar(name: &str, options: CalendarOptions) -> Result<MarketCalendar> {
    Registry::global().create(name, options)
}

/// Names registered in the global registry.
pub fn calendar_names() -> BTreeSet<String> {
    Registry::global().names()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_table::hm;

    #[derive(Debug)]
    struct Plain(&'static str);

    impl CalendarKind for Plain {
        fn type_name(&self) -> &str {
            self.0
        }

        fn definition(&self) -> Result<CalendarDefinition> {
            CalendarDefinition::builder(self.0)
                .open_time(hm(9, 0)?)
                .close_time(hm(17, 0)?)
                .build()
        }
    }

    #[test]
    fn register_and_resolve() {
        let registry = Registry::new();
        registry.register(Plain("XTST")).unwrap();
        assert!(registry.contains("XTST"));
        let cal = registry.create("XTST", CalendarOptions::default()).unwrap();
        assert_eq!(cal.definition().name(), "XTST");
    }

    #[test]
    fn explicit_name_without_aliases() {
        let registry = Registry::new();
        registry.register_as(Plain("XTST"), "Test Exchange").unwrap();
        assert!(registry.contains("Test Exchange"));
        assert!(!registry.contains("XTST"));
    }

    #[test]
    fn blank_name_is_rejected() {
        let registry = Registry::new();
        let err = registry.register_as(Plain("XTST"), " ").unwrap_err();
        assert!(err.is_configuration());
        assert!(registry.names().is_empty());
    }

    #[test]
    fn global_holds_builtins() {
        assert!(calendar_names().contains("EUREX"));
        assert!(get_calendar("EUREX", CalendarOptions::default()).is_ok());
        assert!(Arc::ptr_eq(&Registry::global(), &Registry::global()));
    }
}
