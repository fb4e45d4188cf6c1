//! Call-wrapping decorators.
//!
//! [`Memoized`] makes a `(backend, label, function)` triple callable with
//! just the arguments, so call sites read like calls to the unwrapped
//! function. [`Traced`] brackets a call with begin/end events. Both hold an
//! owned copy of the function value; composition is wrapping a wrapper.

use memocache_core::{CacheResult, HashArgs};

use crate::traits::{CacheBackend, CacheValue};

/// Applies a function to a tuple of arguments.
///
/// Implemented for every `Fn` of arity 0 through 8 over a cloneable
/// argument tuple. This is the seam that lets wrappers and the recursion
/// registry hold a plain function value and invoke it with arguments
/// supplied later.
pub trait Producer<A, R> {
    /// Call the function with the given arguments.
    fn produce(&self, args: &A) -> R;
}

impl<Func, Ret> Producer<(), Ret> for Func
where
    Func: Fn() -> Ret,
{
    fn produce(&self, _args: &()) -> Ret {
        (self)()
    }
}

macro_rules! impl_producer {
    ($($ty:ident => $idx:tt),+) => {
        impl<Func, Ret, $($ty),+> Producer<($($ty,)+), Ret> for Func
        where
            Func: Fn($($ty),+) -> Ret,
            $($ty: Clone,)+
        {
            fn produce(&self, args: &($($ty,)+)) -> Ret {
                (self)($(args.$idx.clone()),+)
            }
        }
    };
}

impl_producer!(A0 => 0);
impl_producer!(A0 => 0, A1 => 1);
impl_producer!(A0 => 0, A1 => 1, A2 => 2);
impl_producer!(A0 => 0, A1 => 1, A2 => 2, A3 => 3);
impl_producer!(A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4);
impl_producer!(A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5);
impl_producer!(A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5, A6 => 6);
impl_producer!(A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5, A6 => 6, A7 => 7);

/// Memoizing wrapper: a captured `(backend, label, function)` triple.
///
/// `call(args)` is equivalent to invoking the backend facade with the
/// captured label and function. The wrapper owns its label and function
/// value and borrows the backend, which stays shareable across wrappers.
pub struct Memoized<'c, C, F> {
    cache: &'c C,
    label: String,
    func: F,
}

impl<'c, C: CacheBackend, F> Memoized<'c, C, F> {
    /// Wrap `func` so calls route through `cache` under `label`.
    pub fn new(cache: &'c C, label: impl Into<String>, func: F) -> Self {
        Self {
            cache,
            label: label.into(),
            func,
        }
    }

    /// The label calls are cached under.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Call the wrapped function through the cache.
    pub fn call<A, R>(&self, args: A) -> CacheResult<R>
    where
        A: HashArgs,
        R: CacheValue,
        F: Producer<A, R>,
    {
        self.cache
            .invoke(&self.label, &args, || self.func.produce(&args))
    }
}

/// Lifecycle-logging wrapper: emits `begin`/`end` events around a call.
///
/// Composes with [`Memoized`] by wrapping a closure that forwards to it.
pub struct Traced<F> {
    label: String,
    func: F,
}

impl<F> Traced<F> {
    /// Wrap `func`, tagging its lifecycle events with `label`.
    pub fn new(label: impl Into<String>, func: F) -> Self {
        Self {
            label: label.into(),
            func,
        }
    }

    /// Call the wrapped function, bracketed by begin/end events.
    pub fn call<A, R>(&self, args: A) -> R
    where
        F: Producer<A, R>,
    {
        tracing::info!(label = %self.label, "begin");
        let ret = self.func.produce(&args);
        tracing::info!(label = %self.label, "end");
        ret
    }
}

/// Invoke a function through a cache, labelled with the function's own name.
///
/// `cached!(cache, func, args...)` expands to a facade `invoke` whose label is
/// the stringified function expression; arguments are evaluated exactly
/// once. [`CacheBackend`] must be in scope at the call site.
///
/// ```ignore
/// let result: u64 = cached!(cache, fib, 10)?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $func:expr $(, $arg:expr)* $(,)?) => {{
        let args = ($($arg,)*);
        let func = &$func;
        $cache.invoke(stringify!($func), &args, || {
            $crate::memoize::Producer::produce(func, &args)
        })
    }};
}
