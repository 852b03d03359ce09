//! # SyncContainer — synchronous resolution
//!
//! An explicitly constructed registry of bindings that resolves instances
//! on the calling thread.
//!
//! ```text
//! register / load_modules  ──>  Registry  ──resolve()──>  Arc<T>
//!                                   │
//!                               inject::<T>()
//!                                   │
//!                                   ▼
//!                         resolve each parameter, then T
//! ```
//!
//! # Examples
//! ```rust
//! use std::sync::Arc;
//! use vial_container::prelude::*;
//!
//! struct Config { url: String }
//! struct Database { url: String }
//!
//! impl Injectable for Database {
//!     fn constructor() -> Option<Constructor<Self>> {
//!         Some(
//!             Constructor::new(|args| {
//!                 let config: Arc<Config> = args.next()?;
//!                 Ok(Database { url: config.url.clone() })
//!             })
//!             .param::<Config>(),
//!         )
//!     }
//! }
//!
//! let mut container = SyncContainer::new();
//! container
//!     .singleton(|| Config { url: "postgres://localhost".into() })
//!     .register_injectable::<Database>(Scope::Singleton);
//!
//! let db: Arc<Database> = container.resolve().expect("Failed to resolve");
//! assert_eq!(db.url, "postgres://localhost");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{Result, VialError};
use crate::inject::Injectable;
use crate::key::TypeKey;
use crate::module::Module;
use crate::registry::{Binding, Instance, Registry, downcast};
use crate::scope::Scope;

/// Provider as stored by [`SyncContainer`].
///
/// Receives the container so factories can resolve or inject.
pub type SyncProvider = Arc<dyn Fn(&SyncContainer) -> Result<Instance> + Send + Sync>;

// ═══════════════════════════════════════════
// SyncContainer
// ═══════════════════════════════════════════

/// Synchronous dependency injection container.
///
/// Singletons are built at most once: each singleton key owns a
/// [`OnceCell`], so threads racing on the first resolve block on the cell
/// instead of invoking the provider twice. A singleton provider that
/// resolves its own key deadlocks; cycles are not detected.
pub struct SyncContainer {
    registry: Registry<SyncProvider>,
    singletons: Mutex<HashMap<TypeKey, Arc<OnceCell<Instance>>>>,
}

impl SyncContainer {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            singletons: Mutex::new(HashMap::new()),
        }
    }

    // ── Registration ──

    /// Binds `T` to a zero-argument provider.
    ///
    /// Replaces any earlier binding for `T`. A singleton already built for
    /// `T` stays cached.
    pub fn register<T, F>(&mut self, provider: F, scope: Scope) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register_with(move |_| Ok(provider()), scope)
    }

    /// Binds `T` to a factory that may use the container and may fail.
    pub fn register_with<T, F>(&mut self, factory: F, scope: Scope) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&SyncContainer) -> Result<T> + Send + Sync + 'static,
    {
        let provider: SyncProvider = Arc::new(move |container: &SyncContainer| -> Result<Instance> {
            Ok(Arc::new(factory(container)?))
        });
        self.registry.register(TypeKey::of::<T>(), provider, scope);
        self
    }

    /// Binds `T` to its own designated constructor.
    ///
    /// Same as `register_with(|c| c.inject::<T>(), scope)`.
    pub fn register_injectable<T: Injectable>(&mut self, scope: Scope) -> &mut Self {
        self.register_with(|container| container.inject::<T>(), scope)
    }

    /// Shorthand for `register(provider, Scope::Singleton)`.
    pub fn singleton<T, F>(&mut self, provider: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register(provider, Scope::Singleton)
    }

    /// Shorthand for `register(provider, Scope::Scoped)`.
    pub fn scoped<T, F>(&mut self, provider: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register(provider, Scope::Scoped)
    }

    /// Shorthand for `register(provider, Scope::Transient)`.
    pub fn transient<T, F>(&mut self, provider: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register(provider, Scope::Transient)
    }

    // ── Modules ──

    /// Registers every provider method of every module.
    ///
    /// Later methods overwrite earlier bindings for the same type.
    #[instrument(skip_all, name = "load_modules")]
    pub fn load_modules<I>(&mut self, modules: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn Module>>,
    {
        for module in modules {
            let name = module.name().to_owned();
            let methods = module.provider_methods();
            debug!(module = %name, methods = methods.len(), "Loading module");

            for method in methods {
                let key = method.key();
                let scope = method.scope();
                trace!(module = %name, method = method.name(), key = %key, "Harvested provider method");
                let provider: SyncProvider = Arc::new(move |_: &SyncContainer| method.provide());
                self.registry.register(key, provider, scope);
            }
        }
        self
    }

    /// Registers a single module.
    pub fn load_module<M: Module>(&mut self, module: M) -> &mut Self {
        self.load_modules([Arc::new(module) as Arc<dyn Module>])
    }

    // ── Resolution ──

    /// Resolves `T` according to its binding's scope.
    ///
    /// ```rust,ignore
    /// let db: Arc<Database> = container.resolve()?;
    /// ```
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let key = TypeKey::of::<T>();
        downcast(key, self.resolve_key(&key)?)
    }

    /// Resolves a type-erased instance for `key`.
    pub fn resolve_key(&self, key: &TypeKey) -> Result<Instance> {
        trace!(key = %key, "Resolving");
        let binding = self.registry.require(key)?;

        if binding.scope.is_cached() {
            self.resolve_singleton(binding)
        } else {
            (binding.provider)(self)
        }
    }

    /// Builds a new `T` from its designated constructor.
    ///
    /// Each parameter is resolved in declaration order. The result is
    /// never registered or cached.
    #[instrument(skip(self), name = "inject", fields(ty = %TypeKey::of::<T>()))]
    pub fn inject<T: Injectable>(&self) -> Result<T> {
        let key = TypeKey::of::<T>();
        let constructor = T::constructor().ok_or(VialError::NoConstructor { key })?;

        let arguments = constructor
            .parameters()
            .iter()
            .map(|param| self.resolve_key(param).map_err(|err| err.required_by(key)))
            .collect::<Result<Vec<_>>>()?;

        debug!(arguments = arguments.len(), "Invoking constructor");
        constructor.construct(key, arguments)
    }

    // ── Introspection ──

    /// Returns `true` if `T` has a binding.
    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.registry.contains(&TypeKey::of::<T>())
    }

    /// Returns the scope `T` is bound with.
    pub fn scope_of<T: ?Sized + 'static>(&self) -> Option<Scope> {
        self.registry.get(&TypeKey::of::<T>()).map(|binding| binding.scope)
    }

    /// Returns the number of bindings.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    // ── Internal ──

    fn resolve_singleton(&self, binding: &Binding<SyncProvider>) -> Result<Instance> {
        let cell = {
            let mut singletons = self.singletons.lock();
            Arc::clone(singletons.entry(binding.key).or_default())
        };

        if let Some(instance) = cell.get() {
            trace!(key = %binding.key, "Singleton cache hit");
            return Ok(Arc::clone(instance));
        }

        cell.get_or_try_init(|| self.construct_singleton(binding))
            .map(Arc::clone)
    }

    fn construct_singleton(&self, binding: &Binding<SyncProvider>) -> Result<Instance> {
        match (binding.provider)(self) {
            Ok(instance) => {
                info!(key = %binding.key, "Constructed singleton");
                Ok(instance)
            }
            Err(err) => {
                warn!(key = %binding.key, error = %err, "Singleton construction failed");
                Err(err)
            }
        }
    }
}

impl Default for SyncContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SyncContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncContainer")
            .field("registered", &self.registry.len())
            .field("singletons", &self.singletons.lock().len())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::SyncContainer;
    #[cfg(feature = "async")]
    pub use crate::async_container::{AsyncContainer, FailurePolicy};
    pub use crate::error::{Result, VialError};
    pub use crate::inject::{Arguments, Constructor, Injectable};
    pub use crate::key::TypeKey;
    pub use crate::module::{Module, ProviderMethod};
    pub use crate::scope::Scope;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
