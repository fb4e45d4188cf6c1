//! Call fingerprinting.
//!
//! A [`Fingerprint`] identifies a memoized call: the label plus the ordered
//! argument values, folded into a single comparable key. The same label and
//! the same argument values always produce the same fingerprint, within one
//! process and across process restarts, which is what lets the persistent
//! backend recognize an entry written by an earlier run.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// 64-bit golden-ratio constant used by the combine step.
const GOLDEN_RATIO: u64 = 0x9e37_79b9_7f4a_7c15;

/// Order-sensitive combine step.
///
/// Folding `(seed, x)` then `(result, y)` differs from folding `(seed, y)`
/// then `(result, x)`, so argument order is part of a call's identity.
fn combine(seed: u64, h: u64) -> u64 {
    seed ^ h
        .wrapping_add(GOLDEN_RATIO)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

/// A [`Hasher`] with a stable digest.
///
/// Backed by BLAKE3, with every integer write forced to little-endian bytes
/// so the digest does not depend on platform endianness. The std
/// `DefaultHasher` is only guaranteed stable within a single build, which
/// would silently orphan persistent cache entries between recompiles.
pub struct StableHasher {
    inner: blake3::Hasher,
}

impl StableHasher {
    /// Create a fresh hasher.
    pub fn new() -> Self {
        Self {
            inner: blake3::Hasher::new(),
        }
    }
}

impl Default for StableHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for StableHasher {
    fn finish(&self) -> u64 {
        let digest = self.inner.finalize();
        let mut out = [0u8; 8];
        out.copy_from_slice(&digest.as_bytes()[..8]);
        u64::from_le_bytes(out)
    }

    fn write(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    fn write_u8(&mut self, i: u8) {
        self.inner.update(&[i]);
    }

    fn write_u16(&mut self, i: u16) {
        self.inner.update(&i.to_le_bytes());
    }

    fn write_u32(&mut self, i: u32) {
        self.inner.update(&i.to_le_bytes());
    }

    fn write_u64(&mut self, i: u64) {
        self.inner.update(&i.to_le_bytes());
    }

    fn write_u128(&mut self, i: u128) {
        self.inner.update(&i.to_le_bytes());
    }

    fn write_usize(&mut self, i: usize) {
        // Widen to u64 so 32- and 64-bit targets agree on length prefixes.
        self.inner.update(&(i as u64).to_le_bytes());
    }

    fn write_i8(&mut self, i: i8) {
        self.write_u8(i as u8);
    }

    fn write_i16(&mut self, i: i16) {
        self.write_u16(i as u16);
    }

    fn write_i32(&mut self, i: i32) {
        self.write_u32(i as u32);
    }

    fn write_i64(&mut self, i: i64) {
        self.write_u64(i as u64);
    }

    fn write_i128(&mut self, i: i128) {
        self.write_u128(i as u128);
    }

    fn write_isize(&mut self, i: isize) {
        self.write_usize(i as usize);
    }
}

/// Stable 64-bit hash of a single value via its [`Hash`] impl.
fn stable_hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = StableHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// An ordered argument tuple that can be folded into a fingerprint.
///
/// Implemented for tuples of arity 0 through 8 whose elements are [`Hash`].
/// Each element contributes separately, left to right, through the combine
/// step, so `(a, b)` and `(b, a)` fingerprint differently. An argument type
/// without a `Hash` impl is rejected at compile time; for such types use
/// [`Fingerprint::from_raw`] instead.
pub trait HashArgs {
    /// Fold every argument, left to right, into `seed`.
    fn fold_into(&self, seed: &mut u64);
}

impl HashArgs for () {
    fn fold_into(&self, _seed: &mut u64) {}
}

macro_rules! impl_hash_args {
    ($($ty:ident => $idx:tt),+) => {
        impl<$($ty: Hash),+> HashArgs for ($($ty,)+) {
            fn fold_into(&self, seed: &mut u64) {
                $(*seed = combine(*seed, stable_hash_of(&self.$idx));)+
            }
        }
    };
}

impl_hash_args!(A0 => 0);
impl_hash_args!(A0 => 0, A1 => 1);
impl_hash_args!(A0 => 0, A1 => 1, A2 => 2);
impl_hash_args!(A0 => 0, A1 => 1, A2 => 2, A3 => 3);
impl_hash_args!(A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4);
impl_hash_args!(A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5);
impl_hash_args!(A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5, A6 => 6);
impl_hash_args!(A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5, A6 => 6, A7 => 7);

/// Deterministic key for one memoized call.
///
/// # Derivation
///
/// Starting from seed 0, the label is folded first, then each argument in
/// order, all through the same combine step. The result is equatable,
/// orderable, hashable, and rendered in decimal by `Display` (the form used
/// in persistent entry file names).
///
/// # Collisions
///
/// Fingerprints are NOT collision-free, and collisions are NOT detected: two
/// distinct logical calls that map to the same fingerprint will silently
/// share a cache entry. The only mitigation is choosing labels and argument
/// encodings that distinguish the calls.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Compute the fingerprint of `(label, args…)`.
    pub fn compute<A: HashArgs>(label: &str, args: &A) -> Self {
        let mut seed = combine(0, stable_hash_of(label));
        args.fold_into(&mut seed);
        Fingerprint(seed)
    }

    /// Wrap a caller-asserted key, bypassing hashing entirely.
    ///
    /// This is the escape hatch for argument types that are not hashable.
    /// No uniqueness validation is performed; a raw key that collides with
    /// another entry under the same label silently shares that entry.
    pub const fn from_raw(raw: u64) -> Self {
        Fingerprint(raw)
    }

    /// The inner key value.
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_inputs_same_fingerprint() {
        let a = Fingerprint::compute("fib", &(10u64,));
        let b = Fingerprint::compute("fib", &(10u64,));
        assert_eq!(a, b);
    }

    #[test]
    fn test_argument_order_changes_fingerprint() {
        let ab = Fingerprint::compute("pair", &(1u32, 2u32));
        let ba = Fingerprint::compute("pair", &(2u32, 1u32));
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_label_changes_fingerprint() {
        let fib = Fingerprint::compute("fib", &(10u64,));
        let fact = Fingerprint::compute("fact", &(10u64,));
        assert_ne!(fib, fact);
    }

    #[test]
    fn test_no_args_still_keyed_by_label() {
        let a = Fingerprint::compute("alpha", &());
        let b = Fingerprint::compute("beta", &());
        assert_eq!(a, Fingerprint::compute("alpha", &()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_string_and_str_arguments_agree() {
        let owned = Fingerprint::compute("greet", &("hello".to_string(),));
        let borrowed = Fingerprint::compute("greet", &("hello",));
        assert_eq!(owned, borrowed);
    }

    #[test]
    fn test_raw_key_round_trip() {
        let key = Fingerprint::from_raw(28725);
        assert_eq!(key.as_raw(), 28725);
        assert_eq!(key.to_string(), "28725");
    }

    #[test]
    fn test_mixed_argument_types() {
        let a = Fingerprint::compute("mixed", &(1u8, "x", vec![1u64, 2]));
        let b = Fingerprint::compute("mixed", &(1u8, "x", vec![1u64, 2]));
        let c = Fingerprint::compute("mixed", &(1u8, "x", vec![2u64, 1]));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
