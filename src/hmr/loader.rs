//! Versioned module loading
//!
//! Re-fetching a module must bypass anything cached by path alone, so every
//! load carries the update's timestamp as a freshness token. Over HTTP the
//! token travels as the `t` query parameter.

use super::update::LoadedModule;
use crate::error::{Error, Result};
use std::fmt::Write;

/// Loads a module body at a given freshness token
#[allow(async_fn_in_trait)]
pub trait ModuleLoader {
    async fn load(&self, path: &str, version: u64) -> Result<LoadedModule>;
}

/// Build the cache-busting fetch URL for `dep`
///
/// One leading `/` of the module path is dropped, the token goes first in
/// the query and any query the module path already had is kept after it.
pub fn versioned_url(base: &str, dep: &str, timestamp: u64) -> String {
    let (path, query) = match dep.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (dep, None),
    };
    let path = path.strip_prefix('/').unwrap_or(path);

    let mut url = String::with_capacity(base.len() + dep.len() + 24);
    url.push_str(base);
    if !base.ends_with('/') {
        url.push('/');
    }
    url.push_str(path);
    let _ = write!(url, "?t={}", timestamp);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('&');
        url.push_str(query);
    }
    url
}

/// Fetches module bodies from the dev server over HTTP
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: reqwest::Client,
    base: String,
}

impl HttpLoader {
    pub fn new(base: impl Into<String>) -> Result<Self> {
        let base = base.into();
        url::Url::parse(&base)?;
        Ok(Self {
            client: reqwest::Client::new(),
            base,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

impl ModuleLoader for HttpLoader {
    async fn load(&self, path: &str, version: u64) -> Result<LoadedModule> {
        let url = versioned_url(&self.base, path, version);
        tracing::debug!(%url, "fetching module");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::fetch(path, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(path, format!("status {}", status.as_u16())));
        }

        let source = response.text().await.map_err(|e| Error::fetch(path, e))?;
        Ok(LoadedModule::new(path, version, source))
    }
}
