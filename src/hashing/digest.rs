//! SHA-256 digests and the chain fold
//!
//! Digests are written as `sha256:<64 lowercase hex>`.
//!
//! The chain hash binds an ordered sequence of stage digests:
//!
//! ```text
//! h0     = sha256("tribunal-chain-v1")
//! h(i+1) = sha256(h(i) || "|" || stage(i))
//! ```
//!
//! Every call produces a fresh value; digests are never mutated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use super::errors::{HashError, HashResult};

/// Algorithm prefix carried by every digest string.
pub const DIGEST_PREFIX: &str = "sha256:";

/// Name of the digest algorithm, as recorded in snapshot environments.
pub const HASH_ALGORITHM: &str = "sha256";

/// Domain separator seeding every chain fold.
pub const CHAIN_DOMAIN: &str = "tribunal-chain-v1";

/// A SHA-256 content digest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest {
    hex: String,
}

impl Digest {
    /// Digest raw bytes.
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self {
            hex: format!("{:x}", hasher.finalize()),
        }
    }

    /// The lowercase hex body without the algorithm prefix.
    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// First 12 hex characters, for log lines and tables.
    pub fn short(&self) -> &str {
        &self.hex[..12]
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", DIGEST_PREFIX, self.hex)
    }
}

impl FromStr for Digest {
    type Err = HashError;

    fn from_str(s: &str) -> HashResult<Self> {
        let hex = s
            .strip_prefix(DIGEST_PREFIX)
            .ok_or_else(|| HashError::malformed_digest(s))?;

        let well_formed = hex.len() == 64
            && hex
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        if !well_formed {
            return Err(HashError::malformed_digest(s));
        }

        Ok(Self {
            hex: hex.to_string(),
        })
    }
}

impl TryFrom<String> for Digest {
    type Error = HashError;

    fn try_from(value: String) -> HashResult<Self> {
        value.parse()
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.to_string()
    }
}

/// Fold an ordered sequence of stage digests into one chain digest.
pub fn chain_hash<'a, I>(stages: I) -> Digest
where
    I: IntoIterator<Item = &'a Digest>,
{
    stages
        .into_iter()
        .fold(Digest::of_bytes(CHAIN_DOMAIN.as_bytes()), |acc, stage| {
            let mut link = Vec::with_capacity(129);
            link.extend_from_slice(acc.hex.as_bytes());
            link.push(b'|');
            link.extend_from_slice(stage.hex.as_bytes());
            Digest::of_bytes(&link)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        let digest = Digest::of_bytes(b"abc");
        assert_eq!(
            digest.hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert!(digest.to_string().starts_with("sha256:ba7816bf"));
    }

    #[test]
    fn test_parse_round_trip_and_rejects() {
        let digest = Digest::of_bytes(b"x");
        let parsed: Digest = digest.to_string().parse().unwrap();
        assert_eq!(parsed, digest);

        assert!("md5:abcd".parse::<Digest>().is_err());
        assert!("sha256:XYZ".parse::<Digest>().is_err());
        assert!(format!("sha256:{}", "A".repeat(64)).parse::<Digest>().is_err());
    }

    #[test]
    fn test_serde_uses_prefixed_string() {
        let digest = Digest::of_bytes(b"x");
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", digest));
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
    }

    #[test]
    fn test_chain_is_order_sensitive() {
        let a = Digest::of_bytes(b"a");
        let b = Digest::of_bytes(b"b");
        assert_ne!(chain_hash([&a, &b]), chain_hash([&b, &a]));
        assert_eq!(chain_hash([&a, &b]), chain_hash(vec![&a, &b]));
    }

    #[test]
    fn test_empty_chain_is_domain_seed() {
        let empty: [&Digest; 0] = [];
        assert_eq!(chain_hash(empty), Digest::of_bytes(CHAIN_DOMAIN.as_bytes()));
    }
}
