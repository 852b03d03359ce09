//! # vial — a minimal dependency injection container
//!
//! Register providers under a type, pick a [`Scope`] for each, then
//! resolve object graphs either synchronously with [`SyncContainer`] or
//! asynchronously with [`AsyncContainer`]. Types opt into constructor
//! injection through [`Injectable`], and related providers can be grouped
//! into a [`Module`].
//!
//! ```rust
//! use std::sync::Arc;
//! use vial::prelude::*;
//!
//! struct Greeter { greeting: String }
//!
//! let mut container = SyncContainer::new();
//! container.singleton(|| Greeter { greeting: "hello".into() });
//!
//! let greeter: Arc<Greeter> = container.resolve().unwrap();
//! assert_eq!(greeter.greeting, "hello");
//! ```

pub use vial_container::*;
pub use vial_support::*;
