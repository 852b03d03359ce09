//! Core container implementation for vial DI.
//!
//! Two independent flavors share the same vocabulary:
//! - [`SyncContainer`] resolves on the calling thread
//! - [`AsyncContainer`] resolves asynchronously and coalesces concurrent
//!   singleton construction (feature `async`)

#[cfg(feature = "async")]
pub mod async_container;
pub mod container;
pub mod error;
pub mod inject;
pub mod key;
pub mod module;
pub mod registry;
pub mod scope;

#[cfg(feature = "async")]
pub use async_container::{AsyncContainer, FailurePolicy};
pub use container::{SyncContainer, prelude};
pub use error::{Result, VialError};
pub use inject::{Arguments, Constructor, Injectable};
pub use key::TypeKey;
pub use module::{Module, ProviderMethod};
pub use scope::Scope;
