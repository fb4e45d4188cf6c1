//! Process-scoped registry for self-referential memoized recursion.
//!
//! A recursive pure function cannot capture "the cache" the way a call site
//! can: every recursive step must also go through the cache, but the
//! function's own signature has no cache parameter. The registry closes the
//! loop by mapping a function's identity (its address) to the label and
//! backend it was registered with, so the function body can call itself via
//! [`Registry::call_memoized`] using only its own identity.
//!
//! The registry is an explicit, instantiable object: tests create isolated
//! registries; applications typically keep one in a `thread_local`. Entries
//! are never removed: a registration lives for the rest of the process, and
//! the first registration for an identity wins.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use memocache_core::{CacheResult, HashArgs, RegistryError};

use crate::memoize::{Memoized, Producer};
use crate::traits::{CacheBackend, CacheValue};

/// A function identity usable as a registry key.
///
/// Implemented for `fn`-pointer types of arity 0 through 8; the identity is
/// the pointer's address. Two caveats, documented rather than fixed: the
/// same item must be cast to the same pointer type at every site, and
/// distinct functions whose bodies compile to identical code may be folded
/// to one address by the linker.
pub trait FnIdentity: Copy {
    /// The address identifying this function.
    fn address(self) -> usize;
}

macro_rules! impl_fn_identity {
    ($($ty:ident),*) => {
        impl<Ret, $($ty),*> FnIdentity for fn($($ty),*) -> Ret {
            fn address(self) -> usize {
                self as usize
            }
        }
    };
}

impl_fn_identity!();
impl_fn_identity!(A0);
impl_fn_identity!(A0, A1);
impl_fn_identity!(A0, A1, A2);
impl_fn_identity!(A0, A1, A2, A3);
impl_fn_identity!(A0, A1, A2, A3, A4);
impl_fn_identity!(A0, A1, A2, A3, A4, A5);
impl_fn_identity!(A0, A1, A2, A3, A4, A5, A6);
impl_fn_identity!(A0, A1, A2, A3, A4, A5, A6, A7);

/// What a function identity was registered with.
struct Registration<C> {
    label: String,
    cache: Rc<C>,
}

impl<C> Clone for Registration<C> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            cache: Rc::clone(&self.cache),
        }
    }
}

/// Table mapping function identities to their `(label, backend)` pair.
///
/// Shares the backend by `Rc`, so a registered backend cannot be dropped
/// out from under the registry. Unsynchronized, like the backends it
/// points at: single-threaded use only.
pub struct Registry<C> {
    entries: RefCell<HashMap<usize, Registration<C>>>,
}

impl<C: CacheBackend> Registry<C> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Register `f` with a label and backend.
    ///
    /// The first registration for an identity wins; later registrations of
    /// the same identity are silent no-ops, whatever label or backend they
    /// carry. Entries are never removed.
    pub fn register<F: FnIdentity>(&self, f: F, label: impl Into<String>, cache: Rc<C>) {
        let address = f.address();
        let mut entries = self.entries.borrow_mut();
        if entries.contains_key(&address) {
            return;
        }
        let label = label.into();
        tracing::info!(label = %label, address, "registering function with cache");
        entries.insert(address, Registration { label, cache });
    }

    /// Whether `f` has been registered.
    pub fn is_registered<F: FnIdentity>(&self, f: F) -> bool {
        self.entries.borrow().contains_key(&f.address())
    }

    /// Call `f` through the backend it was registered with.
    ///
    /// Performs the same hit/miss logic as the facade, with `f` itself as
    /// the producer on a miss, which is what lets `f`'s own body recurse
    /// through this method.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotRegistered`] if `f` was never registered; the
    /// call never falls back to uncached execution.
    pub fn call_memoized<F, A, R>(&self, f: F, args: A) -> CacheResult<R>
    where
        F: FnIdentity + Producer<A, R>,
        A: HashArgs,
        R: CacheValue,
    {
        let address = f.address();
        let registration = self
            .entries
            .borrow()
            .get(&address)
            .cloned()
            .ok_or(RegistryError::NotRegistered { address })?;
        // The table borrow is already released: the producer below may
        // recurse straight back into this method.
        registration
            .cache
            .invoke(&registration.label, &args, || f.produce(&args))
    }

    /// Register `f` (first registration wins) and return its memoizing
    /// wrapper in one step.
    pub fn memoize<'c, F: FnIdentity>(
        &self,
        cache: &'c Rc<C>,
        label: impl Into<String>,
        f: F,
    ) -> Memoized<'c, C, F> {
        let label = label.into();
        self.register(f, label.clone(), Rc::clone(cache));
        Memoized::new(&**cache, label, f)
    }
}

impl<C: CacheBackend> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}
