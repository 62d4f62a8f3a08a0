//! Hot Module Replacement
//!
//! Client side of the dev server's hot update protocol. Modules register
//! interest through a [`HotContext`]; when the server reports a change the
//! [`Dispatcher`] works out which callbacks qualify, re-fetches the changed
//! modules through a [`ModuleLoader`] and hands them over.
//!
//! # Example
//! ```text
//! // In /src/counter.js
//! import.meta.hot.accept((newModule) => {
//!   render(newModule.default);
//! });
//!
//! // Server sends
//! {"type":"update","updates":[
//!   {"type":"js-update","path":"/src/counter.js",
//!    "acceptedPath":"/src/counter.js","timestamp":1700000000000}]}
//!
//! // Client fetches /src/counter.js?t=1700000000000 and runs the callback
//! ```

mod context;
mod dispatch;
mod loader;
mod registry;
mod update;

pub use context::HotContext;
pub use dispatch::{Dispatcher, ModuleMap, PendingUpdate, PropagationPolicy};
pub use loader::{versioned_url, HttpLoader, ModuleLoader};
pub use registry::{
    HotCallback, HotCallbackFn, HotModule, HotRegistry, ModuleSlots, PruneCallback, PruneRegistry,
};
pub use update::{LoadedModule, Update, UpdateKind};
