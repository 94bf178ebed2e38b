//! Cache Key Module
//!
//! Structural keys built from a closed set of dependency types. The name and
//! every dependency are length-prefixed and the dependencies type-tagged, so
//! two different `(name, deps)` pairs can never produce the same key.

use std::fmt::Write;
use std::hash::{Hash, Hasher};

use sha2::{Digest, Sha256};

// == Key Part ==
/// One dependency contributing to a cache key.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyPart {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<KeyPart>),
}

impl KeyPart {
    fn encode_into(&self, out: &mut String) {
        match self {
            KeyPart::Str(s) => {
                let _ = write!(out, "s{}:{}", s.len(), s);
            }
            KeyPart::Int(i) => {
                let _ = write!(out, "i{i};");
            }
            KeyPart::Float(f) => {
                // -0.0 and 0.0 compare equal, so they share a key
                let bits = if *f == 0.0 { 0 } else { f.to_bits() };
                let _ = write!(out, "f{bits:016x};");
            }
            KeyPart::Bool(b) => out.push_str(if *b { "b1" } else { "b0" }),
            KeyPart::List(parts) => {
                let _ = write!(out, "l{}[", parts.len());
                for part in parts {
                    part.encode_into(out);
                }
                out.push(']');
            }
        }
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::Str(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::Str(value)
    }
}

impl From<&String> for KeyPart {
    fn from(value: &String) -> Self {
        KeyPart::Str(value.clone())
    }
}

impl From<bool> for KeyPart {
    fn from(value: bool) -> Self {
        KeyPart::Bool(value)
    }
}

impl From<f64> for KeyPart {
    fn from(value: f64) -> Self {
        KeyPart::Float(value)
    }
}

macro_rules! int_key_part {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for KeyPart {
                fn from(value: $ty) -> Self {
                    KeyPart::Int(i64::from(value))
                }
            }
        )*
    };
}

int_key_part!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for KeyPart {
    fn from(value: usize) -> Self {
        // Values past i64::MAX wrap; dependency counters never get there
        KeyPart::Int(value as i64)
    }
}

impl From<u64> for KeyPart {
    fn from(value: u64) -> Self {
        KeyPart::Int(value as i64)
    }
}

impl<T: Into<KeyPart>> From<Vec<T>> for KeyPart {
    fn from(values: Vec<T>) -> Self {
        KeyPart::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<KeyPart>> From<Option<T>> for KeyPart {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => KeyPart::List(vec![v.into()]),
            None => KeyPart::List(Vec::new()),
        }
    }
}

// == Cache Key ==
/// Builds the cache key for `name` under the given dependencies.
pub fn cache_key(name: &str, deps: &[KeyPart]) -> String {
    let mut out = String::with_capacity(name.len() + 16 * deps.len() + 8);
    let _ = write!(out, "{}:{}|", name.len(), name);
    for dep in deps {
        dep.encode_into(&mut out);
    }
    out
}

// == Fingerprint ==
/// Hashes a collection into a single dependency (hex SHA-256).
///
/// Stable within a process, which is as long as any cache entry lives.
pub fn fingerprint<T: Hash>(items: &[T]) -> KeyPart {
    let mut hasher = DigestHasher(Sha256::new());
    items.hash(&mut hasher);
    KeyPart::Str(format!("{:x}", hasher.0.finalize()))
}

/// Feeds `Hash` output into a SHA-256 digest.
struct DigestHasher(Sha256);

impl Hasher for DigestHasher {
    fn write(&mut self, bytes: &[u8]) {
        Digest::update(&mut self.0, bytes);
    }

    fn finish(&self) -> u64 {
        self.0
            .clone()
            .finalize()
            .iter()
            .take(8)
            .fold(0, |acc, byte| (acc << 8) | u64::from(*byte))
    }
}

/// Shorthand for building a `Vec<KeyPart>` from mixed values.
#[macro_export]
macro_rules! deps {
    () => { ::std::vec::Vec::<$crate::cache::KeyPart>::new() };
    ($($dep:expr),+ $(,)?) => {
        ::std::vec![$($crate::cache::KeyPart::from($dep)),+]
    };
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_includes_name() {
        let key = cache_key("tasks", &[KeyPart::from("open")]);
        assert!(key.starts_with("5:tasks|"));
        assert!(key.contains("open"));
    }

    #[test]
    fn test_name_and_deps_boundary_do_not_collide() {
        assert_ne!(cache_key("x|s1:", &[]), cache_key("x", &deps!["|"]));
        assert_ne!(cache_key("ab", &[]), cache_key("a", &deps!["b"]));
    }

    #[test]
    fn test_same_deps_same_key() {
        let a = cache_key("filter", &deps!["x", 1, true]);
        let b = cache_key("filter", &deps!["x", 1, true]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_types_do_not_collide() {
        let as_str = cache_key("k", &deps!["1"]);
        let as_int = cache_key("k", &deps![1]);
        let as_bool = cache_key("k", &deps![true]);
        assert_ne!(as_str, as_int);
        assert_ne!(as_int, as_bool);
    }

    #[test]
    fn test_string_boundaries_do_not_collide() {
        let split_one = cache_key("k", &deps!["ab", "c"]);
        let split_two = cache_key("k", &deps!["a", "bc"]);
        let nested = cache_key("k", &[KeyPart::List(deps!["ab", "c"])]);
        assert_ne!(split_one, split_two);
        assert_ne!(split_one, nested);
    }

    #[test]
    fn test_list_order_matters() {
        let forward = cache_key("k", &[KeyPart::from(vec![1, 2])]);
        let backward = cache_key("k", &[KeyPart::from(vec![2, 1])]);
        assert_ne!(forward, backward);
    }

    #[test]
    fn test_negative_zero_matches_zero() {
        assert_eq!(cache_key("k", &deps![0.0]), cache_key("k", &deps![-0.0]));
        assert_ne!(cache_key("k", &deps![0.5]), cache_key("k", &deps![0.25]));
    }

    #[test]
    fn test_option_parts() {
        let none: Option<&str> = None;
        assert_ne!(cache_key("k", &deps![Some("a")]), cache_key("k", &deps![none]));
    }

    #[test]
    fn test_fingerprint_tracks_contents() {
        assert_eq!(fingerprint(&[1, 2, 3]), fingerprint(&[1, 2, 3]));
        assert_ne!(fingerprint(&[1, 2, 3]), fingerprint(&[3, 2, 1]));
        assert_ne!(fingerprint(&["ab", "c"]), fingerprint(&["a", "bc"]));
        match fingerprint(&[1u8]) {
            KeyPart::Str(digest) => assert_eq!(digest.len(), 64),
            other => panic!("unexpected fingerprint {other:?}"),
        }
        assert_eq!(deps![].len(), 0);
    }
}
