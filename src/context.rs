//! Execution Context
//!
//! An immutable carrier passed explicitly through the command call chain.
//! Each `with_value` produces a derived context that shares its parent's
//! entries; nothing already handed out is ever mutated, so a context can be
//! cloned into concurrent work without locking.
//!
//! Entries are keyed by their Rust type. Lookup walks from the most recently
//! attached entry towards the root and returns the first match.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

struct Entry {
    key: TypeId,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

/// Immutable, cheaply clonable key-value context
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Entry>>,
}

impl Context {
    /// Empty root context
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a new context carrying `value`, shadowing any earlier `T`
    pub fn with_value<T: Any + Send + Sync>(&self, value: T) -> Context {
        Context {
            head: Some(Arc::new(Entry {
                key: TypeId::of::<T>(),
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Most recently attached value of type `T`, if any
    pub fn value<T: Any + Send + Sync>(&self) -> Option<&T> {
        let key = TypeId::of::<T>();
        self.entries()
            .find(|entry| entry.key == key)
            .and_then(|entry| entry.value.downcast_ref::<T>())
    }

    /// Number of entries in this lineage, shadowed ones included
    pub fn depth(&self) -> usize {
        self.entries().count()
    }

    /// True when both contexts are the same derivation
    pub fn same_as(&self, other: &Context) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    fn entries(&self) -> impl Iterator<Item = &Entry> {
        std::iter::successors(self.head.as_deref(), |entry| entry.parent.as_deref())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("depth", &self.depth())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct RequestId(u64);

    #[derive(Debug, PartialEq)]
    struct Tenant(&'static str);

    #[test]
    fn test_background_is_empty() {
        let ctx = Context::background();
        assert_eq!(ctx.depth(), 0);
        assert!(ctx.value::<RequestId>().is_none());
    }

    #[test]
    fn test_derive_does_not_touch_parent() {
        let root = Context::background();
        let child = root.with_value(RequestId(7));

        assert!(root.value::<RequestId>().is_none());
        assert_eq!(child.value::<RequestId>(), Some(&RequestId(7)));
    }

    #[test]
    fn test_lookup_returns_most_recent() {
        let ctx = Context::background()
            .with_value(RequestId(1))
            .with_value(Tenant("acme"))
            .with_value(RequestId(2));

        assert_eq!(ctx.value::<RequestId>(), Some(&RequestId(2)));
        assert_eq!(ctx.value::<Tenant>(), Some(&Tenant("acme")));
        assert_eq!(ctx.depth(), 3);
    }

    #[test]
    fn test_sibling_lineages_are_independent() {
        let root = Context::background().with_value(Tenant("shared"));
        let a = root.with_value(RequestId(1));
        let b = root.with_value(RequestId(2));

        assert_eq!(a.value::<RequestId>(), Some(&RequestId(1)));
        assert_eq!(b.value::<RequestId>(), Some(&RequestId(2)));
        assert_eq!(a.value::<Tenant>(), b.value::<Tenant>());
        assert!(!a.same_as(&b));
    }

    #[test]
    fn test_clone_is_same_derivation() {
        let ctx = Context::background().with_value(RequestId(3));
        let copy = ctx.clone();
        assert!(ctx.same_as(&copy));
        assert!(Context::background().same_as(&Context::default()));
    }
}
