//! Hot runtime context
//!
//! Owns every registry the client mutates. One instance lives for the whole
//! page/process; tests build a fresh one each.

use crate::config::ClientConfig;
use crate::hmr::{
    Dispatcher, HotContext, HotRegistry, ModuleLoader, PendingUpdate, PruneCallback,
    PruneRegistry, Update,
};
use crate::style::StyleRegistry;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

/// Single-threaded runtime state shared by the connection and application code
pub struct HotRuntime<L> {
    modules: Rc<RefCell<HotRegistry>>,
    prunes: Rc<RefCell<PruneRegistry>>,
    styles: RefCell<StyleRegistry>,
    dispatcher: Dispatcher<L>,
    config: ClientConfig,
}

impl<L: ModuleLoader> HotRuntime<L> {
    pub fn new(loader: L) -> Self {
        Self::with_config(loader, ClientConfig::default())
    }

    pub fn with_config(loader: L, config: ClientConfig) -> Self {
        let modules = Rc::new(RefCell::new(HotRegistry::new()));
        let dispatcher = Dispatcher::new(Rc::clone(&modules), Rc::new(loader), config.propagation);
        Self {
            modules,
            prunes: Rc::new(RefCell::new(PruneRegistry::new())),
            styles: RefCell::new(StyleRegistry::new()),
            dispatcher,
            config,
        }
    }

    /// Hand a hot context to the module at `owner_path`
    pub fn create_hot_context(&self, owner_path: &str) -> HotContext {
        HotContext::create(owner_path, Rc::clone(&self.modules), Rc::clone(&self.prunes))
    }

    pub fn update_style(&self, id: &str, content: &str) {
        self.styles.borrow_mut().update_style(id, content);
    }

    pub fn remove_style(&self, id: &str) {
        self.styles.borrow_mut().remove_style(id);
    }

    pub async fn fetch_update(&self, update: &Update) -> Option<PendingUpdate> {
        self.dispatcher.fetch_update(update).await
    }

    pub async fn dispatch(&self, update: &Update) {
        self.dispatcher.dispatch(update).await
    }

    /// Dispose callback recorded for `path`, removed from the table
    pub fn take_prune(&self, path: &str) -> Option<PruneCallback> {
        self.prunes.borrow_mut().take(path)
    }

    pub fn has_prune(&self, path: &str) -> bool {
        self.prunes.borrow().contains(path)
    }

    pub fn loader(&self) -> &L {
        self.dispatcher.loader()
    }

    pub fn dispatcher(&self) -> Dispatcher<L> {
        self.dispatcher.clone()
    }

    pub fn modules(&self) -> Ref<'_, HotRegistry> {
        self.modules.borrow()
    }

    pub fn styles(&self) -> Ref<'_, StyleRegistry> {
        self.styles.borrow()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl<L> fmt::Debug for HotRuntime<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotRuntime")
            .field("modules", &self.modules)
            .field("prunes", &self.prunes)
            .field("styles", &self.styles)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
