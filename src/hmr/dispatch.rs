//! Update Dispatcher
//!
//! Turns one update record into a [`PendingUpdate`]: the callbacks that care
//! about the change plus the freshly fetched modules they will receive.
//! Resolution and effects are split so a caller can hold, batch or drop a
//! pending update before anything runs; [`Dispatcher::dispatch`] applies it
//! straight away.

use super::loader::ModuleLoader;
use super::registry::{HotCallback, HotRegistry};
use super::update::{LoadedModule, Update, UpdateKind};
use futures_util::future::join_all;
use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// How to resolve updates whose boundary is an ancestor of the changed module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropagationPolicy {
    /// Re-fetch only the changed module; no dependency walk
    #[default]
    ChangedOnly,
    /// Resolve nothing, so no callback runs
    Ignore,
}

/// Fetched modules of one batch, keyed by path
pub type ModuleMap = HashMap<String, Arc<LoadedModule>>;

/// Resolved update waiting to be applied
pub struct PendingUpdate {
    summary: String,
    callbacks: Vec<HotCallback>,
    modules: ModuleMap,
}

impl PendingUpdate {
    pub fn new(summary: impl Into<String>, callbacks: Vec<HotCallback>, modules: ModuleMap) -> Self {
        Self {
            summary: summary.into(),
            callbacks,
            modules,
        }
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Fetched module for `path`, if its load succeeded
    pub fn module(&self, path: &str) -> Option<&Arc<LoadedModule>> {
        self.modules.get(path)
    }

    /// Run every qualifying callback with its deps mapped to fetched modules
    /// and return how many ran.
    ///
    /// Deps whose fetch failed are passed as `None`.
    pub fn apply(self) -> usize {
        for callback in &self.callbacks {
            let args: Vec<Option<Arc<LoadedModule>>> = callback
                .deps
                .iter()
                .map(|dep| self.modules.get(dep).cloned())
                .collect();
            callback.call(&args);
        }
        if self.callbacks.is_empty() {
            tracing::debug!("no callback accepted {}", self.summary);
        } else {
            tracing::info!("hot updated: {}", self.summary);
        }
        self.callbacks.len()
    }
}

impl fmt::Debug for PendingUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingUpdate")
            .field("summary", &self.summary)
            .field("callbacks", &self.callbacks.len())
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Resolves update records against the hot registry
pub struct Dispatcher<L> {
    modules: Rc<RefCell<HotRegistry>>,
    loader: Rc<L>,
    policy: PropagationPolicy,
}

impl<L> Clone for Dispatcher<L> {
    fn clone(&self) -> Self {
        Self {
            modules: Rc::clone(&self.modules),
            loader: Rc::clone(&self.loader),
            policy: self.policy,
        }
    }
}

impl<L: ModuleLoader> Dispatcher<L> {
    pub fn new(modules: Rc<RefCell<HotRegistry>>, loader: Rc<L>, policy: PropagationPolicy) -> Self {
        Self {
            modules,
            loader,
            policy,
        }
    }

    pub fn policy(&self) -> PropagationPolicy {
        self.policy
    }

    /// Module identities that must be re-fetched for `update`
    pub fn modules_to_update(&self, update: &Update) -> Vec<String> {
        if update.is_self_update() {
            return vec![update.path.clone()];
        }
        match self.policy {
            PropagationPolicy::ChangedOnly => vec![update.path.clone()],
            PropagationPolicy::Ignore => Vec::new(),
        }
    }

    /// Resolve and fetch, without running any callback.
    ///
    /// Returns `None` when nothing registered interest in `update.path`.
    pub async fn fetch_update(&self, update: &Update) -> Option<PendingUpdate> {
        if update.kind == UpdateKind::CssUpdate {
            tracing::debug!(path = %update.path, "css update for linked stylesheet, skipping");
            return None;
        }

        let to_update = self.modules_to_update(update);
        let callbacks: Vec<HotCallback> = {
            let registry = self.modules.borrow();
            let Some(module) = registry.get(&update.path) else {
                tracing::debug!(path = %update.path, "no hot module registered, ignoring update");
                return None;
            };
            module
                .callbacks
                .iter()
                .filter(|callback| callback.qualifies(to_update.iter()))
                .cloned()
                .collect()
        };

        let modules = self.load_batch(&to_update, update.timestamp).await;
        Some(PendingUpdate::new(update.summary(), callbacks, modules))
    }

    /// Load every path concurrently and wait for all of them.
    ///
    /// A failed load is logged and left out of the map; the batch itself
    /// never fails.
    pub async fn load_batch(&self, paths: &[String], version: u64) -> ModuleMap {
        let loads = paths
            .iter()
            .map(|path| async move { (path, self.loader.load(path, version).await) });

        let mut modules = ModuleMap::default();
        for (path, result) in join_all(loads).await {
            match result {
                Ok(module) => {
                    modules.insert(path.clone(), Arc::new(module));
                }
                Err(e) => tracing::warn!(path = %path, "failed to fetch updated module: {}", e),
            }
        }
        modules
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Resolve, fetch and immediately apply
    pub async fn dispatch(&self, update: &Update) {
        if let Some(pending) = self.fetch_update(update).await {
            pending.apply();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::hmr::registry::ModuleSlots;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingLoader {
        calls: RefCell<Vec<(String, u64)>>,
    }

    impl ModuleLoader for CountingLoader {
        async fn load(&self, path: &str, version: u64) -> Result<LoadedModule> {
            self.calls.borrow_mut().push((path.to_string(), version));
            if path.contains("broken") {
                return Err(Error::fetch(path, "status 500"));
            }
            Ok(LoadedModule::new(path, version, format!("// {}", path)))
        }
    }

    fn setup(policy: PropagationPolicy) -> (Dispatcher<CountingLoader>, Rc<RefCell<HotRegistry>>, Rc<CountingLoader>) {
        let modules = Rc::new(RefCell::new(HotRegistry::new()));
        let loader = Rc::new(CountingLoader::default());
        (
            Dispatcher::new(Rc::clone(&modules), Rc::clone(&loader), policy),
            modules,
            loader,
        )
    }

    fn counter_callback(deps: &[&str], hits: &Rc<Cell<usize>>) -> HotCallback {
        let hits = Rc::clone(hits);
        HotCallback::new(
            deps.iter().map(|d| d.to_string()).collect(),
            Rc::new(move |_: &ModuleSlots| hits.set(hits.get() + 1)),
        )
    }

    #[test]
    fn test_modules_to_update() {
        let (changed_only, _, _) = setup(PropagationPolicy::ChangedOnly);
        let (ignore, _, _) = setup(PropagationPolicy::Ignore);
        let self_update = Update::js("/a.js", "/a.js", 1);
        let propagated = Update::js("/dep.js", "/a.js", 1);

        assert_eq!(changed_only.modules_to_update(&self_update), vec!["/a.js"]);
        assert_eq!(ignore.modules_to_update(&self_update), vec!["/a.js"]);
        assert_eq!(changed_only.modules_to_update(&propagated), vec!["/dep.js"]);
        assert!(ignore.modules_to_update(&propagated).is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_unqualified_callbacks_filtered() {
        let (dispatcher, modules, _) = setup(PropagationPolicy::ChangedOnly);
        let hits = Rc::new(Cell::new(0));
        modules.borrow_mut().register("/a.js", counter_callback(&["/a.js"], &hits));
        modules.borrow_mut().register("/a.js", counter_callback(&["/other.js"], &hits));

        let pending = dispatcher.fetch_update(&Update::js("/a.js", "/a.js", 5)).await.unwrap();
        assert_eq!(pending.callback_count(), 1);
        assert_eq!(pending.apply(), 1);
        assert_eq!(hits.get(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_pending_update_dropped_runs_nothing() {
        let (dispatcher, modules, loader) = setup(PropagationPolicy::ChangedOnly);
        let hits = Rc::new(Cell::new(0));
        modules.borrow_mut().register("/a.js", counter_callback(&["/a.js"], &hits));

        let pending = dispatcher.fetch_update(&Update::js("/a.js", "/a.js", 5)).await;
        drop(pending);

        assert_eq!(loader.calls.borrow().len(), 1);
        assert_eq!(hits.get(), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_propagated_update_summary() {
        let (dispatcher, modules, loader) = setup(PropagationPolicy::ChangedOnly);
        let hits = Rc::new(Cell::new(0));
        modules.borrow_mut().register("/dep.js", counter_callback(&["/dep.js"], &hits));

        let pending = dispatcher
            .fetch_update(&Update::js("/dep.js", "/app.js", 9))
            .await
            .unwrap();

        assert_eq!(pending.summary(), "/app.js via /dep.js");
        assert_eq!(*loader.calls.borrow(), vec![("/dep.js".to_string(), 9)]);
        pending.apply();
        assert_eq!(hits.get(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_ignore_policy_fetches_nothing() {
        let (dispatcher, modules, loader) = setup(PropagationPolicy::Ignore);
        let hits = Rc::new(Cell::new(0));
        modules.borrow_mut().register("/dep.js", counter_callback(&["/dep.js"], &hits));

        dispatcher.dispatch(&Update::js("/dep.js", "/app.js", 9)).await;

        assert!(loader.calls.borrow().is_empty());
        assert_eq!(hits.get(), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_apply_without_callbacks_runs_nothing() {
        let (dispatcher, modules, _) = setup(PropagationPolicy::Ignore);
        let hits = Rc::new(Cell::new(0));
        modules.borrow_mut().register("/dep.js", counter_callback(&["/dep.js"], &hits));

        let pending = dispatcher
            .fetch_update(&Update::js("/dep.js", "/app.js", 9))
            .await
            .unwrap();
        assert_eq!(pending.callback_count(), 0);
        assert_eq!(pending.apply(), 0);
        assert_eq!(hits.get(), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_css_update_skipped() {
        let (dispatcher, modules, loader) = setup(PropagationPolicy::ChangedOnly);
        let hits = Rc::new(Cell::new(0));
        modules.borrow_mut().register("/a.css", counter_callback(&["/a.css"], &hits));

        assert!(dispatcher.fetch_update(&Update::css("/a.css", 3)).await.is_none());
        assert!(loader.calls.borrow().is_empty());
        assert_eq!(hits.get(), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_failed_fetch_leaves_slot_empty() {
        let (dispatcher, modules, _) = setup(PropagationPolicy::ChangedOnly);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        modules.borrow_mut().register(
            "/broken.js",
            HotCallback::new(
                vec!["/broken.js".to_string()],
                Rc::new(move |slots: &ModuleSlots| sink.borrow_mut().push(slots.len())),
            ),
        );

        let pending = dispatcher
            .fetch_update(&Update::js("/broken.js", "/broken.js", 1))
            .await
            .unwrap();
        assert!(pending.module("/broken.js").is_none());
        pending.apply();

        assert_eq!(*seen.borrow(), vec![1]);
    }
}
