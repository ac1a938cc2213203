//! # Digest Module
//!
//! The two digest primitives consumed by the pipeline stages.
//!
//! The pipeline treats both primitives as opaque, deterministic
//! string-to-string functions. `fast` may be called with unbounded
//! concurrency; `slow` models a scarce backend resource and must only be
//! invoked while holding a [`Quota`](crate::core::quota::Quota) permit.
//! The stages enforce that discipline; the trait itself carries no
//! synchronization.

/// A pair of deterministic digest primitives.
///
/// Implementations must be pure: the same input always produces the same
/// output, with no observable side effects. This is what makes the final
/// pipeline result reproducible.
pub trait Digester: Send + Sync {
    /// The unrestricted primitive. Cheap, safe to call from any number of
    /// threads at once.
    fn fast(&self, data: &str) -> String;

    /// The rate-limited primitive. Callers must hold a quota permit for
    /// the duration of the call.
    fn slow(&self, data: &str) -> String;
}

// Distinct seeds keep the two primitives from colliding on equal input.
const FAST_SEED: u64 = 0x5157_4aa0_9f3c_21b7;
const SLOW_SEED: u64 = 0xd6e8_fe1c_0b44_7a92;

/// Production digester backed by xxh3.
///
/// Not cryptographic - the pipeline only needs determinism and spread.
#[derive(Debug, Default, Clone, Copy)]
pub struct Xxh3Digester;

impl Digester for Xxh3Digester {
    fn fast(&self, data: &str) -> String {
        format!(
            "{:016x}",
            xxhash_rust::xxh3::xxh3_64_with_seed(data.as_bytes(), FAST_SEED)
        )
    }

    fn slow(&self, data: &str) -> String {
        format!(
            "{:016x}",
            xxhash_rust::xxh3::xxh3_64_with_seed(data.as_bytes(), SLOW_SEED)
        )
    }
}

/// Digester where both primitives are the identity function.
///
/// Useful for demos and for tests that want to assert on the exact shape
/// of stage outputs without hashing getting in the way.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityDigester;

impl Digester for IdentityDigester {
    fn fast(&self, data: &str) -> String {
        data.to_string()
    }

    fn slow(&self, data: &str) -> String {
        data.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xxh3_is_deterministic() {
        let digester = Xxh3Digester;
        assert_eq!(digester.fast("42"), digester.fast("42"));
        assert_eq!(digester.slow("42"), digester.slow("42"));
    }

    #[test]
    fn fast_and_slow_differ_on_equal_input() {
        let digester = Xxh3Digester;
        assert_ne!(digester.fast("42"), digester.slow("42"));
    }

    #[test]
    fn xxh3_output_is_fixed_width_hex() {
        let digest = Xxh3Digester.fast("anything");
        assert_eq!(digest.len(), 16);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn identity_returns_input() {
        let digester = IdentityDigester;
        assert_eq!(digester.fast("0"), "0");
        assert_eq!(digester.slow("abc"), "abc");
    }
}
