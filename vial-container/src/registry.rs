//! Binding registry shared by both container flavors.
//!
//! The registry maps a [`TypeKey`] to a [`Binding`]: the provider that
//! knows how to create an instance and the [`Scope`] controlling reuse.
//! The provider type is a parameter because the synchronous and the
//! asynchronous container store differently shaped factories.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};
use vial_support::rendering::suggest_similar;

use crate::error::{Result, VialError};
use crate::key::TypeKey;
use crate::scope::Scope;

/// A type-erased instance as stored and passed around by the containers.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Maximum number of "did you mean" entries attached to an error.
const MAX_SUGGESTIONS: usize = 3;

/// Registered provider and scope for one type.
pub struct Binding<P> {
    pub key: TypeKey,
    pub provider: P,
    pub scope: Scope,
}

impl<P: Clone> Clone for Binding<P> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            provider: self.provider.clone(),
            scope: self.scope,
        }
    }
}

impl<P> std::fmt::Debug for Binding<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Stores one binding per type; registering again replaces it.
pub struct Registry<P> {
    bindings: HashMap<TypeKey, Binding<P>>,
}

impl<P> Registry<P> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Inserts a binding, returning the one it replaced.
    pub fn register(&mut self, key: TypeKey, provider: P, scope: Scope) -> Option<Binding<P>> {
        let previous = self.bindings.insert(key, Binding { key, provider, scope });
        match previous {
            Some(ref old) => debug!(
                key = %key,
                scope = %scope,
                previous_scope = %old.scope,
                "Overwrote binding"
            ),
            None => debug!(key = %key, scope = %scope, "Registered binding"),
        }
        previous
    }

    /// Looks up the binding for `key`.
    pub fn get(&self, key: &TypeKey) -> Option<&Binding<P>> {
        trace!(key = %key, "Looking up binding");
        self.bindings.get(key)
    }

    /// Looks up the binding for `key`, failing with
    /// [`VialError::UnregisteredType`] when there is none.
    pub fn require(&self, key: &TypeKey) -> Result<&Binding<P>> {
        self.bindings
            .get(key)
            .ok_or_else(|| VialError::unregistered(*key, self.suggestions_for(key)))
    }

    /// Returns `true` if `key` has a binding.
    pub fn contains(&self, key: &TypeKey) -> bool {
        self.bindings.contains_key(key)
    }

    /// Returns the number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Registered type names close to `key`, best match first.
    fn suggestions_for(&self, key: &TypeKey) -> Vec<String> {
        let available: Vec<&str> = self.bindings.keys().map(TypeKey::type_name).collect();
        suggest_similar(key.type_name(), &available, MAX_SUGGESTIONS)
    }
}

impl<P> Default for Registry<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Recovers the concrete type of an [`Instance`].
pub(crate) fn downcast<T: Send + Sync + 'static>(key: TypeKey, instance: Instance) -> Result<Arc<T>> {
    instance.downcast::<T>().map_err(|_| VialError::TypeMismatch {
        key,
        expected: type_name::<T>(),
    })
}
