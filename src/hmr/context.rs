//! Module hot context (available to application code as `import.meta.hot`)

use super::registry::{HotCallback, HotRegistry, ModuleSlots, PruneRegistry};
use super::update::LoadedModule;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Capability object scoped to one module path
pub struct HotContext {
    owner: String,
    modules: Rc<RefCell<HotRegistry>>,
    prunes: Rc<RefCell<PruneRegistry>>,
}

impl HotContext {
    /// Creating a context discards callbacks of any previous instance of `owner`.
    pub(crate) fn create(
        owner: impl Into<String>,
        modules: Rc<RefCell<HotRegistry>>,
        prunes: Rc<RefCell<PruneRegistry>>,
    ) -> Self {
        let owner = owner.into();
        modules.borrow_mut().reset(&owner);
        Self {
            owner,
            modules,
            prunes,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Accept updates to this module without a handler
    pub fn accept(&self) {
        self.accept_self(|_| {});
    }

    /// Accept updates to this module; `callback` receives the new instance
    pub fn accept_self<F>(&self, callback: F)
    where
        F: Fn(Option<&Arc<LoadedModule>>) + 'static,
    {
        let func = Rc::new(move |modules: &ModuleSlots| {
            callback(modules.first().and_then(Option::as_ref))
        });
        self.modules.borrow_mut().register(
            &self.owner,
            HotCallback::new(vec![self.owner.clone()], func),
        );
    }

    /// Accept updates from named dependencies
    ///
    /// Not supported yet: the call is recorded in the log and otherwise
    /// has no effect.
    pub fn accept_deps<F>(&self, deps: &[&str], _callback: F)
    where
        F: Fn(&ModuleSlots) + 'static,
    {
        tracing::debug!(
            owner = %self.owner,
            ?deps,
            "dependency accept is not supported, ignoring"
        );
    }

    /// Record a dispose callback for when this module is pruned
    pub fn prune<F>(&self, callback: F)
    where
        F: FnOnce() + 'static,
    {
        self.prunes
            .borrow_mut()
            .insert(&self.owner, Box::new(callback));
    }
}

impl fmt::Debug for HotContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotContext")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registries() -> (Rc<RefCell<HotRegistry>>, Rc<RefCell<PruneRegistry>>) {
        (
            Rc::new(RefCell::new(HotRegistry::new())),
            Rc::new(RefCell::new(PruneRegistry::new())),
        )
    }

    #[test]
    fn test_accept_registers_self_dependency() {
        let (modules, prunes) = registries();
        let hot = HotContext::create("/src/app.js", Rc::clone(&modules), prunes);

        hot.accept();

        let modules = modules.borrow();
        let module = modules.get("/src/app.js").unwrap();
        assert_eq!(module.callbacks.len(), 1);
        assert_eq!(module.callbacks[0].deps, vec!["/src/app.js".to_string()]);
    }

    #[test]
    fn test_context_without_accept_registers_nothing() {
        let (modules, prunes) = registries();
        let _hot = HotContext::create("/src/app.js", Rc::clone(&modules), prunes);

        assert!(modules.borrow().is_empty());
    }

    #[test]
    fn test_accept_deps_has_no_effect() {
        let (modules, prunes) = registries();
        let hot = HotContext::create("/src/app.js", Rc::clone(&modules), prunes);

        hot.accept_deps(&["/src/a.js", "/src/b.js"], |_| {});

        assert!(modules.borrow().is_empty());
    }

    #[test]
    fn test_recreate_clears_callbacks() {
        let (modules, prunes) = registries();
        let first = HotContext::create("/src/app.js", Rc::clone(&modules), Rc::clone(&prunes));
        first.accept();
        first.accept();
        assert_eq!(modules.borrow().callback_count("/src/app.js"), 2);

        let _second = HotContext::create("/src/app.js", Rc::clone(&modules), prunes);
        assert_eq!(modules.borrow().callback_count("/src/app.js"), 0);
    }

    #[test]
    fn test_prune_is_recorded_not_run() {
        let (modules, prunes) = registries();
        let hot = HotContext::create("/src/app.js", modules, Rc::clone(&prunes));
        let ran = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&ran);

        hot.prune(move || *flag.borrow_mut() = true);

        assert!(prunes.borrow().contains("/src/app.js"));
        assert!(!*ran.borrow());
    }
}
