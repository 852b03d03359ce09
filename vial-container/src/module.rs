//! Modules — objects whose provider methods become bindings.
//!
//! A module groups related providers, the way a Laravel ServiceProvider
//! or a DIshka Provider class does. Instead of scanning annotations at
//! runtime, a module answers one explicit query: "which provider methods
//! do you have?". Each answer is a [`ProviderMethod`] naming the produced
//! type, the scope markers attached to the method, and how to call it on
//! the module instance.
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//! use vial_container::module::{Module, ProviderMethod};
//!
//! struct Config { url: String }
//! struct Connection { url: String }
//!
//! struct DatabaseModule { url: String }
//!
//! impl DatabaseModule {
//!     fn config(&self) -> Option<Config> {
//!         Some(Config { url: self.url.clone() })
//!     }
//!
//!     fn connection(&self) -> Option<Connection> {
//!         Some(Connection { url: self.url.clone() })
//!     }
//! }
//!
//! impl Module for DatabaseModule {
//!     fn provider_methods(self: Arc<Self>) -> Vec<ProviderMethod> {
//!         vec![
//!             ProviderMethod::new(&self, "config", Self::config),
//!             ProviderMethod::new(&self, "connection", Self::connection).transient(),
//!         ]
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, VialError};
use crate::key::TypeKey;
use crate::registry::Instance;
use crate::scope::Scope;

type Invoker = Arc<dyn Fn() -> Option<Instance> + Send + Sync>;

/// A source of provider methods.
///
/// Implementors list their provider methods in
/// [`provider_methods`](Module::provider_methods). The container calls it
/// once per `load_modules` and keeps the module alive through the
/// returned descriptors.
pub trait Module: Send + Sync + 'static {
    /// Describes every provider method of this module.
    fn provider_methods(self: Arc<Self>) -> Vec<ProviderMethod>;

    /// Human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Descriptor of one provider method on a module instance.
#[derive(Clone)]
pub struct ProviderMethod {
    key: TypeKey,
    name: &'static str,
    markers: Vec<Scope>,
    invoke: Invoker,
}

impl ProviderMethod {
    /// Describes `method` as a provider of `T`, called on `module`.
    ///
    /// Returning `None` from the method at resolve time is reported as
    /// [`VialError::ProviderReturnedNull`](crate::error::VialError::ProviderReturnedNull).
    pub fn new<M, T>(module: &Arc<M>, name: &'static str, method: fn(&M) -> Option<T>) -> Self
    where
        M: Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let receiver = Arc::clone(module);
        Self {
            key: TypeKey::of::<T>(),
            name,
            markers: Vec::new(),
            invoke: Arc::new(move || method(&receiver).map(|value| Arc::new(value) as Instance)),
        }
    }

    /// Attaches a scope marker.
    pub fn marked(mut self, scope: Scope) -> Self {
        self.markers.push(scope);
        self
    }

    /// Attaches the `Singleton` marker.
    pub fn singleton(self) -> Self {
        self.marked(Scope::Singleton)
    }

    /// Attaches the `Scoped` marker.
    pub fn scoped(self) -> Self {
        self.marked(Scope::Scoped)
    }

    /// Attaches the `Transient` marker.
    pub fn transient(self) -> Self {
        self.marked(Scope::Transient)
    }

    /// The type this method provides.
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// The method name given at description time.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Markers in attachment order.
    pub fn markers(&self) -> &[Scope] {
        &self.markers
    }

    /// The effective scope: highest-priority marker, `Singleton` if none.
    pub fn scope(&self) -> Scope {
        Scope::from_markers(&self.markers)
    }

    /// Calls the method on its module instance.
    pub fn invoke(&self) -> Option<Instance> {
        (self.invoke)()
    }

    /// Calls the method and requires a value.
    pub fn provide(&self) -> Result<Instance> {
        self.invoke().ok_or(VialError::ProviderReturnedNull {
            key: self.key,
            method: self.name,
        })
    }
}

impl fmt::Debug for ProviderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderMethod")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("markers", &self.markers)
            .finish()
    }
}
