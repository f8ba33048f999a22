//! Content hasher
//!
//! Stable digests over canonicalized structures. Used for transcript
//! hashes, snapshot input/output/step hashes, tool registry fingerprints,
//! and as the stages of the snapshot chain hash.
//!
//! # Guarantees
//!
//! - Identical logical content yields an identical digest across runs,
//!   processes and platforms.
//! - Object key order never affects the digest.
//! - `hash_value(x) == hash_value(canonicalize(x))`.

mod canonical;
mod digest;
mod errors;

pub use canonical::{canonical_json, canonicalize, FLOAT_DECIMALS};
pub use digest::{chain_hash, Digest, CHAIN_DOMAIN, DIGEST_PREFIX, HASH_ALGORITHM};
pub use errors::{HashError, HashErrorCode, HashResult};

use serde::Serialize;

/// Hash any serializable value through its canonical JSON encoding.
pub fn hash_value<T: Serialize + ?Sized>(value: &T) -> HashResult<Digest> {
    let bytes = canonical_json(value)?;
    Ok(Digest::of_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_digest_stable_under_key_reordering() {
        let a: serde_json::Value =
            serde_json::from_str(r#"{"title":"t","actions":["a","b"],"meta":{"x":1,"y":2}}"#)
                .unwrap();
        let b: serde_json::Value =
            serde_json::from_str(r#"{"meta":{"y":2,"x":1},"actions":["a","b"],"title":"t"}"#)
                .unwrap();
        assert_eq!(hash_value(&a).unwrap(), hash_value(&b).unwrap());
    }

    #[test]
    fn test_hash_equals_hash_of_canonical_form() {
        let value = json!({"z": 0.30000000000000004, "a": [1.0, {"k": -0.0}]});
        assert_eq!(
            hash_value(&value).unwrap(),
            hash_value(&canonicalize(&value)).unwrap()
        );
    }

    #[test]
    fn test_struct_and_map_with_same_content_agree() {
        #[derive(Serialize)]
        struct Spec<'a> {
            title: &'a str,
            context: &'a str,
        }

        let from_struct = hash_value(&Spec {
            title: "t",
            context: "c",
        })
        .unwrap();
        let from_map = hash_value(&json!({"context": "c", "title": "t"})).unwrap();
        assert_eq!(from_struct, from_map);
    }

    #[test]
    fn test_different_content_differs() {
        assert_ne!(
            hash_value(&json!({"a": 1})).unwrap(),
            hash_value(&json!({"a": 2})).unwrap()
        );
    }

    #[test]
    fn test_huge_float_does_not_collide_with_zero() {
        let zero = hash_value(&json!({"b": 0})).unwrap();
        assert_ne!(hash_value(&json!({"b": 1e300})).unwrap(), zero);
        assert_ne!(hash_value(&json!({"b": -1e300})).unwrap(), zero);
        assert_ne!(
            hash_value(&json!({"b": 1e300})).unwrap(),
            hash_value(&json!({"b": 2e300})).unwrap()
        );
    }
}
