//! Constructor injection.
//!
//! Rust has no runtime constructor discovery, so a type opts in by
//! implementing [`Injectable`] and returning its designated
//! [`Constructor`]: the ordered list of dependency types plus a function
//! that builds the value from the resolved arguments.
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//! use vial_container::inject::{Constructor, Injectable};
//!
//! struct Database;
//! struct Logger;
//!
//! struct UserRepository {
//!     db: Arc<Database>,
//!     logger: Arc<Logger>,
//! }
//!
//! impl Injectable for UserRepository {
//!     fn constructor() -> Option<Constructor<Self>> {
//!         Some(
//!             Constructor::new(|args| {
//!                 Ok(UserRepository { db: args.next()?, logger: args.next()? })
//!             })
//!             .param::<Database>()
//!             .param::<Logger>(),
//!         )
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, VialError};
use crate::key::TypeKey;
use crate::registry::{Instance, downcast};

type BuildFn<T> = Box<dyn FnOnce(&mut Arguments) -> Result<T> + Send>;

/// A type that can be built by `inject`.
pub trait Injectable: Sized + Send + Sync + 'static {
    /// The designated constructor, or `None` if the type has none.
    fn constructor() -> Option<Constructor<Self>>;
}

/// Designated constructor of `T`: parameter types in declaration order and
/// the function invoked with their resolved values.
pub struct Constructor<T> {
    parameters: Vec<TypeKey>,
    build: BuildFn<T>,
}

impl<T: 'static> Constructor<T> {
    /// Creates a constructor with no parameters yet.
    pub fn new(build: impl FnOnce(&mut Arguments) -> Result<T> + Send + 'static) -> Self {
        Self {
            parameters: Vec::new(),
            build: Box::new(build),
        }
    }

    /// Appends a parameter of type `A`.
    pub fn param<A: Send + Sync + 'static>(mut self) -> Self {
        self.parameters.push(TypeKey::of::<A>());
        self
    }

    /// Parameter types in declaration order.
    pub fn parameters(&self) -> &[TypeKey] {
        &self.parameters
    }

    /// Runs the build function over `values`, which must line up with
    /// [`parameters`](Self::parameters).
    pub(crate) fn construct(self, owner: TypeKey, values: Vec<Instance>) -> Result<T> {
        let mut arguments = Arguments {
            owner,
            values: self.parameters.into_iter().zip(values).collect(),
            position: 0,
        };
        (self.build)(&mut arguments)
    }
}

impl<T> fmt::Debug for Constructor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Resolved constructor arguments, consumed positionally.
pub struct Arguments {
    owner: TypeKey,
    values: Vec<(TypeKey, Instance)>,
    position: usize,
}

impl Arguments {
    /// Takes the next argument as `Arc<A>`.
    ///
    /// # Errors
    /// [`VialError::MissingArgument`] past the last declared parameter,
    /// [`VialError::TypeMismatch`] if `A` is not the declared type.
    pub fn next<A: Send + Sync + 'static>(&mut self) -> Result<Arc<A>> {
        let position = self.position;
        let (key, instance) = self
            .values
            .get(position)
            .cloned()
            .ok_or(VialError::MissingArgument { key: self.owner, position })?;
        self.position += 1;
        downcast::<A>(key, instance)
    }

    /// Number of arguments not yet taken.
    pub fn remaining(&self) -> usize {
        self.values.len() - self.position
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("owner", &self.owner)
            .field("position", &self.position)
            .field("len", &self.values.len())
            .finish()
    }
}
