//! Shared test helpers for integration tests

use quickhot::{Error, HotRuntime, LoadedModule, ModuleLoader, Result};
use std::cell::RefCell;
use std::collections::HashSet;
use std::time::Duration;

/// Loader that records every request and fails for configured paths
#[derive(Default)]
pub struct MockLoader {
    pub calls: RefCell<Vec<(String, u64)>>,
    failing: HashSet<String>,
    delay: Option<Duration>,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make loads of `path` fail
    #[allow(dead_code)]
    pub fn failing(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    /// Suspend every load for `delay` before answering
    #[allow(dead_code)]
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl ModuleLoader for MockLoader {
    async fn load(&self, path: &str, version: u64) -> Result<LoadedModule> {
        self.calls.borrow_mut().push((path.to_string(), version));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(path) {
            return Err(Error::fetch(path, "status 404"));
        }
        Ok(LoadedModule::new(path, version, format!("export default '{}@{}'", path, version)))
    }
}

/// Fresh runtime backed by a default mock loader
#[allow(dead_code)]
pub fn runtime() -> HotRuntime<MockLoader> {
    HotRuntime::new(MockLoader::new())
}
