//! Instance-reuse scopes.
//!
//! - [`Scope::Singleton`] — one instance for the lifetime of the container
//! - [`Scope::Scoped`] — a fresh instance from its factory on every resolve
//! - [`Scope::Transient`] — a fresh instance on every resolve
//!
//! # Ordering
//! Scopes are ordered `Singleton > Scoped > Transient`. When a provider
//! method carries several scope markers, the greatest one wins.
use std::fmt;

/// Determines whether a resolved instance is reused.
///
/// # Examples
/// ```
/// use vial_container::scope::Scope;
///
/// assert!(Scope::Singleton > Scope::Scoped);
/// assert!(Scope::Scoped > Scope::Transient);
/// assert_eq!(Scope::default(), Scope::Singleton);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// Provider invoked at most once; every resolver observes the same instance.
    #[default]
    Singleton,

    /// Provider invoked on every resolve.
    ///
    /// There is no ambient request or session boundary in this container;
    /// the tag records the caller's intent and behaves like `Transient`.
    Scoped,

    /// Provider invoked on every resolve, never cached.
    Transient,
}

impl Scope {
    /// Returns `true` if resolved instances are cached.
    ///
    /// Only Singleton caches; Scoped is always fresh via its factory.
    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, Scope::Singleton)
    }

    /// Picks the scope from a set of attached markers.
    ///
    /// The highest-priority marker wins (`Singleton > Scoped > Transient`);
    /// with no markers the default `Singleton` applies.
    ///
    /// ```
    /// use vial_container::scope::Scope;
    ///
    /// assert_eq!(Scope::from_markers(&[]), Scope::Singleton);
    /// assert_eq!(Scope::from_markers(&[Scope::Transient]), Scope::Transient);
    /// assert_eq!(Scope::from_markers(&[Scope::Transient, Scope::Scoped]), Scope::Scoped);
    /// ```
    pub fn from_markers(markers: &[Scope]) -> Scope {
        markers.iter().copied().max().unwrap_or_default()
    }

    #[inline]
    fn priority(&self) -> u8 {
        match self {
            Scope::Singleton => 2,
            Scope::Scoped => 1,
            Scope::Transient => 0,
        }
    }
}

impl PartialOrd for Scope {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scope {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Singleton => write!(f, "Singleton"),
            Scope::Scoped => write!(f, "Scoped"),
            Scope::Transient => write!(f, "Transient"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_ordering() {
        assert!(Scope::Singleton > Scope::Scoped);
        assert!(Scope::Scoped > Scope::Transient);
        assert!(Scope::Singleton > Scope::Transient);
    }

    #[test]
    fn only_singleton_is_cached() {
        assert!(Scope::Singleton.is_cached());
        assert!(!Scope::Scoped.is_cached());
        assert!(!Scope::Transient.is_cached());
    }

    #[test]
    fn markers_pick_highest_priority() {
        assert_eq!(Scope::from_markers(&[]), Scope::Singleton);
        assert_eq!(
            Scope::from_markers(&[Scope::Transient, Scope::Singleton]),
            Scope::Singleton
        );
        assert_eq!(
            Scope::from_markers(&[Scope::Scoped, Scope::Transient]),
            Scope::Scoped
        );
    }

    #[test]
    fn scope_display() {
        assert_eq!(format!("{}", Scope::Singleton), "Singleton");
        assert_eq!(format!("{}", Scope::Scoped), "Scoped");
        assert_eq!(format!("{}", Scope::Transient), "Transient");
    }
}
