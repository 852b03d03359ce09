//! # AsyncContainer — asynchronous resolution with single-flight singletons
//!
//! Same contract as [`SyncContainer`](crate::container::SyncContainer), but
//! `resolve` and `inject` are `async` and may run concurrently.
//!
//! Singleton construction is coalesced per [`TypeKey`]:
//!
//! ```text
//! resolve::<Db>()  ──miss──>  spawn provider  ──>  Shared handle stored
//! resolve::<Db>()  ──hit───>  await same handle ─┐
//! resolve::<Db>()  ──hit───>  await same handle ─┴─>  same Arc<Db> (or same error)
//! ```
//!
//! The provider runs as a spawned tokio task, so it completes even if every
//! caller that triggered it is dropped. Resolution must therefore happen
//! inside a tokio runtime.
//!
//! # Examples
//! ```rust
//! use std::sync::Arc;
//! use vial_container::prelude::*;
//!
//! struct Config { url: String }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let container = AsyncContainer::new();
//! container.register(|| async { Config { url: "postgres://localhost".into() } }, Scope::Singleton);
//!
//! let a: Arc<Config> = container.resolve().await?;
//! let b: Arc<Config> = container.resolve().await?;
//! assert!(Arc::ptr_eq(&a, &b));
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::{BoxFuture, Shared, try_join_all};
use futures::{FutureExt, TryFutureExt};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{Result, VialError};
use crate::inject::Injectable;
use crate::key::TypeKey;
use crate::module::Module;
use crate::registry::{Binding, Instance, Registry, downcast};
use crate::scope::Scope;

/// Provider as stored by [`AsyncContainer`].
///
/// Receives a handle to the container so factories can resolve or inject.
pub type AsyncProvider =
    Arc<dyn Fn(AsyncContainer) -> BoxFuture<'static, Result<Instance>> + Send + Sync>;

type SingletonTask = Shared<BoxFuture<'static, Result<Instance>>>;

/// What happens to a singleton whose construction failed.
///
/// Callers already waiting on the failed construction all receive the
/// same error either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Forget the failure; the next `resolve` starts a new construction.
    #[default]
    Retry,
    /// Keep the failure; every later `resolve` returns the same error.
    Remember,
}

/// One singleton construction, in flight or finished.
#[derive(Clone)]
struct Flight {
    id: u64,
    task: SingletonTask,
}

struct Inner {
    registry: RwLock<Registry<AsyncProvider>>,
    singletons: DashMap<TypeKey, Flight>,
    next_flight: AtomicU64,
    failure_policy: FailurePolicy,
}

// ═══════════════════════════════════════════
// AsyncContainer
// ═══════════════════════════════════════════

/// Asynchronous dependency injection container.
///
/// Cloning is cheap and yields a handle to the same registry and caches.
/// Registration is expected to finish before concurrent resolution starts.
#[derive(Clone)]
pub struct AsyncContainer {
    inner: Arc<Inner>,
}

impl AsyncContainer {
    /// Creates an empty container using [`FailurePolicy::Retry`].
    pub fn new() -> Self {
        Self::with_failure_policy(FailurePolicy::default())
    }

    /// Creates an empty container with the given failure policy.
    pub fn with_failure_policy(failure_policy: FailurePolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: RwLock::new(Registry::new()),
                singletons: DashMap::new(),
                next_flight: AtomicU64::new(0),
                failure_policy,
            }),
        }
    }

    /// The policy applied to failed singleton constructions.
    pub fn failure_policy(&self) -> FailurePolicy {
        self.inner.failure_policy
    }

    // ── Registration ──

    /// Binds `T` to a zero-argument async provider.
    ///
    /// Replaces any earlier binding for `T`. A singleton already built (or
    /// being built) for `T` stays cached.
    pub fn register<T, F, Fut>(&self, provider: F, scope: Scope) -> &Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        self.register_with(move |_| provider().map(Ok), scope)
    }

    /// Binds `T` to an async factory that may use the container and may fail.
    pub fn register_with<T, F, Fut>(&self, factory: F, scope: Scope) -> &Self
    where
        T: Send + Sync + 'static,
        F: Fn(AsyncContainer) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let provider: AsyncProvider = Arc::new(move |container: AsyncContainer| {
            factory(container)
                .map_ok(|value| Arc::new(value) as Instance)
                .boxed()
        });
        self.inner
            .registry
            .write()
            .register(TypeKey::of::<T>(), provider, scope);
        self
    }

    /// Binds `T` to its own designated constructor.
    ///
    /// Same as `register_with(|c| async move { c.inject::<T>().await }, scope)`.
    pub fn register_injectable<T: Injectable>(&self, scope: Scope) -> &Self {
        self.register_with(
            |container: AsyncContainer| async move { container.inject::<T>().await },
            scope,
        )
    }

    // ── Modules ──

    /// Registers every provider method of every module.
    ///
    /// Later methods overwrite earlier bindings for the same type.
    #[instrument(skip_all, name = "load_modules")]
    pub fn load_modules<I>(&self, modules: I) -> &Self
    where
        I: IntoIterator<Item = Arc<dyn Module>>,
    {
        // Modules may query this container while listing their methods.
        let harvested: Vec<(String, Vec<_>)> = modules
            .into_iter()
            .map(|module| (module.name().to_owned(), module.provider_methods()))
            .collect();

        let mut registry = self.inner.registry.write();
        for (name, methods) in harvested {
            debug!(module = %name, methods = methods.len(), "Loading module");

            for method in methods {
                let key = method.key();
                let scope = method.scope();
                trace!(module = %name, method = method.name(), key = %key, "Harvested provider method");
                let provider: AsyncProvider = Arc::new(move |_: AsyncContainer| {
                    futures::future::ready(method.provide()).boxed()
                });
                registry.register(key, provider, scope);
            }
        }
        drop(registry);
        self
    }

    /// Registers a single module.
    pub fn load_module<M: Module>(&self, module: M) -> &Self {
        self.load_modules([Arc::new(module) as Arc<dyn Module>])
    }

    // ── Resolution ──

    /// Resolves `T` according to its binding's scope.
    ///
    /// # Errors
    /// Besides binding and provider failures, resolving a singleton that is
    /// not yet built outside a tokio runtime returns
    /// [`VialError::NoRuntime`].
    pub async fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let key = TypeKey::of::<T>();
        downcast(key, self.resolve_key(&key).await?)
    }

    /// Resolves a type-erased instance for `key`.
    pub async fn resolve_key(&self, key: &TypeKey) -> Result<Instance> {
        trace!(key = %key, "Resolving");
        let binding = self.binding(key)?;

        if binding.scope.is_cached() {
            self.resolve_singleton(binding).await
        } else {
            (binding.provider)(self.clone()).await
        }
    }

    /// Builds a new `T` from its designated constructor.
    ///
    /// Parameters are resolved concurrently; the constructor runs once all
    /// of them are available and receives them in declaration order. The
    /// result is never registered or cached.
    ///
    /// # Errors
    /// Fails with [`VialError::NoConstructor`] when `T` declares none, and
    /// with the first parameter resolution error otherwise.
    #[instrument(skip(self), name = "inject", fields(ty = %TypeKey::of::<T>()))]
    pub async fn inject<T: Injectable>(&self) -> Result<T> {
        let key = TypeKey::of::<T>();
        let constructor = T::constructor().ok_or(VialError::NoConstructor { key })?;

        let arguments = try_join_all(
            constructor
                .parameters()
                .iter()
                .map(|param| self.resolve_key(param).map_err(move |err| err.required_by(key))),
        )
        .await?;

        debug!(arguments = arguments.len(), "Invoking constructor");
        constructor.construct(key, arguments)
    }

    // ── Introspection ──

    /// Returns `true` if `T` has a binding.
    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.inner.registry.read().contains(&TypeKey::of::<T>())
    }

    /// Returns the scope `T` is bound with.
    pub fn scope_of<T: ?Sized + 'static>(&self) -> Option<Scope> {
        self.inner
            .registry
            .read()
            .get(&TypeKey::of::<T>())
            .map(|binding| binding.scope)
    }

    /// Returns the number of bindings.
    pub fn len(&self) -> usize {
        self.inner.registry.read().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.registry.read().is_empty()
    }

    // ── Internal ──

    /// Copies the binding out so no lock is held across `.await`.
    fn binding(&self, key: &TypeKey) -> Result<Binding<AsyncProvider>> {
        self.inner.registry.read().require(key).cloned()
    }

    async fn resolve_singleton(&self, binding: Binding<AsyncProvider>) -> Result<Instance> {
        self.join_or_start(binding)?.task.await
    }

    fn join_or_start(&self, binding: Binding<AsyncProvider>) -> Result<Flight> {
        match self.inner.singletons.entry(binding.key) {
            Entry::Occupied(entry) => {
                trace!(key = %binding.key, "Joining singleton construction");
                Ok(entry.get().clone())
            }
            Entry::Vacant(entry) => {
                let id = self.inner.next_flight.fetch_add(1, Ordering::Relaxed);
                let flight = Flight {
                    id,
                    task: spawn_construction(binding, id, self.clone())?,
                };
                entry.insert(flight.clone());
                Ok(flight)
            }
        }
    }

    /// Drops flight `id` for `key` if it is still the current one.
    fn forget_flight(&self, key: &TypeKey, id: u64) {
        if self
            .inner
            .singletons
            .remove_if(key, |_, current| current.id == id)
            .is_some()
        {
            debug!(key = %key, "Forgot failed singleton construction");
        }
    }
}

/// Runs a singleton provider as a detached task and wraps its handle so
/// every waiter observes the same outcome.
///
/// Under [`FailurePolicy::Retry`] the task itself forgets a failed flight,
/// so a later `resolve` starts over even if nobody awaited the failure.
fn spawn_construction(
    binding: Binding<AsyncProvider>,
    id: u64,
    container: AsyncContainer,
) -> Result<SingletonTask> {
    let key = binding.key;
    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|_| VialError::NoRuntime { key })?;
    debug!(key = %key, flight = id, "Starting singleton construction");

    let handle = runtime.spawn(async move {
        let owner = container.clone();
        let result = AssertUnwindSafe((binding.provider)(container))
            .catch_unwind()
            .await
            .unwrap_or(Err(VialError::ProviderPanicked { key }));

        match result {
            Ok(_) => info!(key = %key, "Constructed singleton"),
            Err(ref err) => {
                warn!(key = %key, error = %err, "Singleton construction failed");
                if owner.inner.failure_policy == FailurePolicy::Retry {
                    owner.forget_flight(&key, id);
                }
            }
        }
        result
    });

    let task = async move {
        match handle.await {
            Ok(result) => result,
            Err(join_error) => {
                warn!(key = %key, error = %join_error, "Singleton construction task aborted");
                Err(VialError::ProviderPanicked { key })
            }
        }
    };
    Ok(task.boxed().shared())
}

impl Default for AsyncContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AsyncContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncContainer")
            .field("registered", &self.len())
            .field("singletons", &self.inner.singletons.len())
            .field("failure_policy", &self.inner.failure_policy)
            .finish()
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inject::Constructor;
    use crate::module::ProviderMethod;
    use futures::future::join_all;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    struct Slow {
        serial: u32,
    }

    /// Registers a provider that sleeps before building `Slow`, counting calls.
    fn slow_singleton(container: &AsyncContainer, delay: Duration) -> Arc<AtomicU32> {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        container.register(
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    let serial = counter.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(delay).await;
                    Slow { serial }
                }
            },
            Scope::Singleton,
        );
        calls
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_singleton_resolution_builds_once() {
        let container = AsyncContainer::new();
        let calls = slow_singleton(&container, Duration::from_millis(50));

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let container = container.clone();
                tokio::spawn(async move { container.resolve::<Slow>().await })
            })
            .collect();

        let resolved: Vec<Arc<Slow>> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolved.len(), 10);
        assert!(resolved.iter().all(|s| Arc::ptr_eq(s, &resolved[0])));
        assert_eq!(resolved[0].serial, 0);
    }

    #[tokio::test]
    async fn sequential_singleton_resolution_returns_same_instance() {
        let container = AsyncContainer::new();
        let calls = slow_singleton(&container, Duration::from_millis(1));

        let a: Arc<Slow> = container.resolve().await.unwrap();
        let b: Arc<Slow> = container.resolve().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_and_scoped_are_never_cached() {
        let container = AsyncContainer::new();
        let calls = Arc::new(AtomicU32::new(0));
        for scope in [Scope::Transient, Scope::Scoped] {
            let counter = Arc::clone(&calls);
            container.register(
                move || {
                    let serial = counter.fetch_add(1, Ordering::SeqCst);
                    async move { Slow { serial } }
                },
                scope,
            );

            let a: Arc<Slow> = container.resolve().await.unwrap();
            let b: Arc<Slow> = container.resolve().await.unwrap();
            let c: Arc<Slow> = container.resolve().await.unwrap();
            assert!(!Arc::ptr_eq(&a, &b));
            assert!(!Arc::ptr_eq(&b, &c));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn resolve_not_registered() {
        let container = AsyncContainer::new();
        assert!(matches!(
            container.resolve::<Slow>().await,
            Err(VialError::UnregisteredType(ref err)) if err.requested == TypeKey::of::<Slow>()
        ));
    }

    /// Registers a singleton whose first construction fails after a delay.
    fn failing_once(container: &AsyncContainer) -> Arc<AtomicU32> {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        container.register_with::<Slow, _, _>(
            move |_| {
                let counter = Arc::clone(&counter);
                async move {
                    let serial = counter.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    if serial == 0 {
                        Err(VialError::construction(TypeKey::of::<Slow>(), "database offline"))
                    } else {
                        Ok(Slow { serial })
                    }
                }
            },
            Scope::Singleton,
        );
        calls
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn coalesced_callers_share_failure_then_retry() {
        let container = AsyncContainer::new();
        let calls = failing_once(&container);

        let results = join_all((0..5).map(|_| container.resolve::<Slow>())).await;
        assert!(results
            .iter()
            .all(|r| matches!(r, Err(VialError::ConstructionFailed { .. }))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let recovered: Arc<Slow> = container.resolve().await.unwrap();
        assert_eq!(recovered.serial, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn remembered_failure_is_not_retried() {
        let container = AsyncContainer::with_failure_policy(FailurePolicy::Remember);
        let calls = failing_once(&container);

        assert!(container.resolve::<Slow>().await.is_err());
        assert!(matches!(
            container.resolve::<Slow>().await,
            Err(VialError::ConstructionFailed { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn abandoned_construction_runs_to_completion() {
        let container = AsyncContainer::new();
        let calls = slow_singleton(&container, Duration::from_millis(30));

        let abandoned =
            tokio::time::timeout(Duration::from_millis(1), container.resolve::<Slow>()).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(60)).await;
        let slow: Arc<Slow> = container.resolve().await.unwrap();
        assert_eq!(slow.serial, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn abandoned_failure_is_retried() {
        let container = AsyncContainer::new();
        let calls = failing_once(&container);

        let abandoned =
            tokio::time::timeout(Duration::from_millis(1), container.resolve::<Slow>()).await;
        assert!(abandoned.is_err());

        // The failed construction finishes with nobody awaiting it.
        tokio::time::sleep(Duration::from_millis(60)).await;
        let recovered: Arc<Slow> = container.resolve().await.unwrap();
        assert_eq!(recovered.serial, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn abandoned_failure_is_remembered_when_asked() {
        let container = AsyncContainer::with_failure_policy(FailurePolicy::Remember);
        let calls = failing_once(&container);

        let abandoned =
            tokio::time::timeout(Duration::from_millis(1), container.resolve::<Slow>()).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(matches!(
            container.resolve::<Slow>().await,
            Err(VialError::ConstructionFailed { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn panicked_singleton_is_retried() {
        let container = AsyncContainer::new();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        container.register(
            move || {
                let serial = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    assert!(serial > 0, "first construction blows up");
                    Slow { serial }
                }
            },
            Scope::Singleton,
        );

        assert!(matches!(
            container.resolve::<Slow>().await,
            Err(VialError::ProviderPanicked { .. })
        ));
        let recovered: Arc<Slow> = container.resolve().await.unwrap();
        assert_eq!(recovered.serial, 1);
    }

    #[test]
    fn singleton_outside_runtime_is_an_error() {
        let container = AsyncContainer::new();
        let calls = slow_singleton(&container, Duration::from_millis(1));

        let outside = futures::executor::block_on(container.resolve::<Slow>());
        assert!(matches!(outside, Err(VialError::NoRuntime { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let inside = runtime.block_on(container.resolve::<Slow>());
        assert_eq!(inside.unwrap().serial, 0);
    }

    #[test]
    fn transient_resolves_without_runtime() {
        let container = AsyncContainer::new();
        container.register(|| async { Right }, Scope::Transient);
        assert!(futures::executor::block_on(container.resolve::<Right>()).is_ok());
    }

    #[tokio::test]
    async fn panicking_provider_is_reported() {
        let container = AsyncContainer::new();
        container.register(
            || async { Option::<Slow>::None.expect("provider blew up") },
            Scope::Singleton,
        );

        assert!(matches!(
            container.resolve::<Slow>().await,
            Err(VialError::ProviderPanicked { .. })
        ));
    }

    #[tokio::test]
    async fn overwriting_singleton_keeps_cached_instance() {
        let container = AsyncContainer::new();
        container.register(|| async { Slow { serial: 1 } }, Scope::Singleton);
        let first: Arc<Slow> = container.resolve().await.unwrap();

        container.register(|| async { Slow { serial: 2 } }, Scope::Singleton);
        let second: Arc<Slow> = container.resolve().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.serial, 1);
    }

    // ── inject ──

    struct Left;
    struct Right;

    struct Recorder {
        left: Arc<Left>,
        right: Arc<Right>,
    }

    impl Injectable for Recorder {
        fn constructor() -> Option<Constructor<Self>> {
            Some(
                Constructor::new(|args| Ok(Recorder { left: args.next()?, right: args.next()? }))
                    .param::<Left>()
                    .param::<Right>(),
            )
        }
    }

    struct Opaque;

    impl Injectable for Opaque {
        fn constructor() -> Option<Constructor<Self>> {
            None
        }
    }

    fn left_right() -> AsyncContainer {
        let container = AsyncContainer::new();
        container
            .register(
                || async {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Left
                },
                Scope::Singleton,
            )
            .register(|| async { Right }, Scope::Singleton);
        container
    }

    #[tokio::test]
    async fn inject_resolves_parameters_positionally() {
        let container = left_right();
        let recorder = container.inject::<Recorder>().await.unwrap();

        let left: Arc<Left> = container.resolve().await.unwrap();
        let right: Arc<Right> = container.resolve().await.unwrap();
        assert!(Arc::ptr_eq(&recorder.left, &left));
        assert!(Arc::ptr_eq(&recorder.right, &right));
    }

    #[tokio::test]
    async fn inject_without_constructor_fails() {
        let container = AsyncContainer::new();
        assert!(matches!(
            container.inject::<Opaque>().await,
            Err(VialError::NoConstructor { .. })
        ));
    }

    #[tokio::test]
    async fn inject_missing_parameter_fails() {
        let container = AsyncContainer::new();
        container.register(|| async { Left }, Scope::Singleton);

        match container.inject::<Recorder>().await {
            Err(VialError::UnregisteredType(err)) => {
                assert_eq!(err.requested, TypeKey::of::<Right>());
                assert_eq!(err.required_by, vec![TypeKey::of::<Recorder>()]);
            }
            other => panic!("Expected UnregisteredType, got: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn injectable_registration_follows_scope() {
        let container = left_right();
        container.register_injectable::<Recorder>(Scope::Singleton);

        let (a, b) = tokio::join!(container.resolve::<Recorder>(), container.resolve::<Recorder>());
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    }

    // ── modules ──

    struct Greeting(&'static str);
    struct Ticket(u32);

    struct AppModule {
        issued: AtomicU32,
    }

    impl AppModule {
        fn greeting(&self) -> Option<Greeting> {
            Some(Greeting("hi"))
        }

        fn ticket(&self) -> Option<Ticket> {
            Some(Ticket(self.issued.fetch_add(1, Ordering::SeqCst)))
        }

        fn missing(&self) -> Option<Left> {
            None
        }
    }

    impl Module for AppModule {
        fn provider_methods(self: Arc<Self>) -> Vec<ProviderMethod> {
            vec![
                ProviderMethod::new(&self, "greeting", Self::greeting),
                ProviderMethod::new(&self, "ticket", Self::ticket).transient(),
                ProviderMethod::new(&self, "missing", Self::missing),
            ]
        }
    }

    #[tokio::test]
    async fn load_modules_applies_scopes() {
        let container = AsyncContainer::new();
        container.load_module(AppModule { issued: AtomicU32::new(0) });

        assert_eq!(container.scope_of::<Greeting>(), Some(Scope::Singleton));
        assert_eq!(container.scope_of::<Ticket>(), Some(Scope::Transient));

        let g1: Arc<Greeting> = container.resolve().await.unwrap();
        let g2: Arc<Greeting> = container.resolve().await.unwrap();
        assert!(Arc::ptr_eq(&g1, &g2));
        assert_eq!(g1.0, "hi");

        let t1: Arc<Ticket> = container.resolve().await.unwrap();
        let t2: Arc<Ticket> = container.resolve().await.unwrap();
        assert_eq!((t1.0, t2.0), (0, 1));

        assert!(matches!(
            container.resolve::<Left>().await,
            Err(VialError::ProviderReturnedNull { method: "missing", .. })
        ));
    }

    struct ReflectiveModule {
        container: AsyncContainer,
    }

    impl ReflectiveModule {
        fn ticket(&self) -> Option<Ticket> {
            Some(Ticket(0))
        }
    }

    impl Module for ReflectiveModule {
        fn provider_methods(self: Arc<Self>) -> Vec<ProviderMethod> {
            // Offers a ticket only when none is bound yet.
            if self.container.is_registered::<Ticket>() {
                return Vec::new();
            }
            vec![ProviderMethod::new(&self, "ticket", Self::ticket).transient()]
        }
    }

    #[test]
    fn module_may_query_container_while_loading() {
        let container = AsyncContainer::new();
        container.load_module(ReflectiveModule { container: container.clone() });
        assert_eq!(container.scope_of::<Ticket>(), Some(Scope::Transient));

        container.register(|| async { Ticket(7) }, Scope::Singleton);
        container.load_module(ReflectiveModule { container: container.clone() });
        assert_eq!(container.scope_of::<Ticket>(), Some(Scope::Singleton));
    }

    #[test]
    fn debug_display() {
        let container = AsyncContainer::new();
        container.register(|| async { 1i32 }, Scope::Transient);

        let debug = format!("{container:?}");
        assert!(debug.contains("AsyncContainer"));
        assert!(debug.contains("registered: 1"));
        assert!(debug.contains("Retry"));
    }
}
