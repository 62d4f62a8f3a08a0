//! Hot Registry
//!
//! Per-module records of accepted dependencies and the callbacks to run
//! when they change, plus the prune (dispose) table.

use super::update::LoadedModule;
use rustc_hash::FxHashMap as HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Arguments handed to a hot callback, one slot per dependency
pub type ModuleSlots = [Option<Arc<LoadedModule>>];

/// Callback invoked with freshly fetched dependencies
pub type HotCallbackFn = Rc<dyn Fn(&ModuleSlots)>;

/// Dispose callback recorded by `prune`
pub type PruneCallback = Box<dyn FnOnce()>;

/// Callback registered against an ordered list of dependency paths
#[derive(Clone)]
pub struct HotCallback {
    pub deps: Vec<String>,
    func: HotCallbackFn,
}

impl HotCallback {
    pub fn new(deps: Vec<String>, func: HotCallbackFn) -> Self {
        Self { deps, func }
    }

    /// A callback qualifies when any of its deps is being updated
    pub fn qualifies<'a>(&self, mut updated: impl Iterator<Item = &'a String>) -> bool {
        updated.any(|path| self.deps.contains(path))
    }

    pub fn call(&self, modules: &ModuleSlots) {
        (self.func)(modules)
    }
}

impl fmt::Debug for HotCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotCallback")
            .field("deps", &self.deps)
            .finish_non_exhaustive()
    }
}

/// A module that registered interest in hot updates
#[derive(Debug, Clone)]
pub struct HotModule {
    pub id: String,
    pub callbacks: Vec<HotCallback>,
}

impl HotModule {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            callbacks: Vec::new(),
        }
    }
}

/// Module path → hot module record
#[derive(Debug, Default)]
pub struct HotRegistry {
    modules: HashMap<String, HotModule>,
}

impl HotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop callbacks held for a previous instance of `path`
    pub fn reset(&mut self, path: &str) {
        if let Some(module) = self.modules.get_mut(path) {
            module.callbacks.clear();
        }
    }

    /// Append a callback, creating the module record on first use
    pub fn register(&mut self, path: &str, callback: HotCallback) {
        self.modules
            .entry(path.to_string())
            .or_insert_with(|| HotModule::new(path))
            .callbacks
            .push(callback);
    }

    pub fn get(&self, path: &str) -> Option<&HotModule> {
        self.modules.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }

    pub fn callback_count(&self, path: &str) -> usize {
        self.modules.get(path).map_or(0, |m| m.callbacks.len())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Module path → dispose callback
///
/// Entries are only recorded here. Running them belongs to whatever
/// decides a module is gone, which calls [`PruneRegistry::take`].
#[derive(Default)]
pub struct PruneRegistry {
    callbacks: HashMap<String, PruneCallback>,
}

impl PruneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `callback`, replacing any earlier one for `path`
    pub fn insert(&mut self, path: &str, callback: PruneCallback) {
        self.callbacks.insert(path.to_string(), callback);
    }

    pub fn take(&mut self, path: &str) -> Option<PruneCallback> {
        self.callbacks.remove(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.callbacks.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl fmt::Debug for PruneRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PruneRegistry")
            .field("callbacks", &format!("<{} callbacks>", self.callbacks.len()))
            .finish()
    }
}
