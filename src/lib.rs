//! Quickhot: a hot module replacement client runtime written in Rust
//!
//! Quickhot listens to a development server's update channel and swaps
//! running modules in place. Application code registers interest through a
//! [`HotContext`]; when a module changes the runtime re-fetches it with a
//! freshness token and hands the new instance to the registered callbacks.
//!
//! # Quick Start
//!
//! ```no_run
//! use quickhot::{HmrClient, HotRuntime, HttpLoader};
//! use std::rc::Rc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> quickhot::Result<()> {
//!     let runtime = Rc::new(HotRuntime::new(HttpLoader::new("http://localhost:3000/")?));
//!
//!     runtime.create_hot_context("/src/main.js").accept_self(|module| {
//!         println!("main.js updated: {:?}", module.map(|m| m.version));
//!     });
//!
//!     let client = HmrClient::new(runtime);
//!     let local = tokio::task::LocalSet::new();
//!     let result = local.run_until(client.run()).await;
//!     result
//! }
//! ```
//!
//! # Module Overview
//!
//! Message flow: [`client`] → [`hmr`] (dispatcher, registry, loader) → application callbacks
//!
//! | Category | Modules |
//! |----------|---------|
//! | **Core** | [`hmr`], [`runtime`], [`style`] |
//! | **Transport** | [`client`] |
//! | **Support** | [`config`], [`logging`], [`error`](Error) |
pub mod client;
pub mod config;
pub mod hmr;
pub mod logging;
pub mod runtime;
pub mod style;

mod error;

pub use client::{HmrClient, ServerMessage};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use hmr::{HotContext, HttpLoader, LoadedModule, ModuleLoader, PendingUpdate, Update, UpdateKind};
pub use runtime::HotRuntime;
pub use style::StyleRegistry;

/// Quickhot version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
