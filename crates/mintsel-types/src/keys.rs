//! Fixed-size key, signature and hash types.
//!
//! All of them serialize as lowercase hex strings and display as hex,
//! shortened where a full dump would only clutter logs.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha512};

use crate::{MintselError, Result};

macro_rules! hex_bytes_type {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Number of bytes.
            pub const LEN: usize = $len;

            #[must_use]
            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            #[must_use]
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// First four bytes as hex, for log fields.
            #[must_use]
            pub fn short(&self) -> String {
                hex::encode(&self.0[..4])
            }

            /// Parse from a hex string of exactly the right length.
            pub fn from_hex(s: &str) -> Result<Self> {
                let bytes = hex::decode(s).map_err(|e| MintselError::InvalidKey {
                    reason: format!("{}: {e}", stringify!($name)),
                })?;
                let array: [u8; $len] = bytes.try_into().map_err(|_| MintselError::InvalidKey {
                    reason: format!("{}: expected {} bytes", stringify!($name), $len),
                })?;
                Ok(Self(array))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}..)", stringify!($name), self.short())
            }
        }

        impl FromStr for $name {
            type Err = MintselError;

            fn from_str(s: &str) -> Result<Self> {
                Self::from_hex(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&hex::encode(self.0))
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_bytes_type!(
    /// An Ed25519 public key (exchange master key or auditor key).
    EddsaPublicKey,
    32
);

hex_bytes_type!(
    /// An Ed25519 signature.
    EddsaSignature,
    64
);

hex_bytes_type!(
    /// A SHA-512 digest.
    HashCode,
    64
);

/// The exchange's long-term signing key.
pub type MasterPublicKey = EddsaPublicKey;

impl EddsaPublicKey {
    /// Decode into a dalek verifying key.
    ///
    /// # Errors
    /// `InvalidKey` if the bytes are not a valid curve point.
    pub fn to_verifying_key(&self) -> Result<VerifyingKey> {
        VerifyingKey::from_bytes(&self.0).map_err(|e| MintselError::InvalidKey {
            reason: e.to_string(),
        })
    }
}

impl From<VerifyingKey> for EddsaPublicKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}

impl From<ed25519_dalek::Signature> for EddsaSignature {
    fn from(sig: ed25519_dalek::Signature) -> Self {
        Self(sig.to_bytes())
    }
}

impl EddsaSignature {
    #[must_use]
    pub fn to_dalek(&self) -> ed25519_dalek::Signature {
        ed25519_dalek::Signature::from_bytes(&self.0)
    }
}

impl HashCode {
    /// SHA-512 over `data`.
    #[must_use]
    pub fn digest(data: &[u8]) -> Self {
        let out = Sha512::digest(data);
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&out);
        Self(bytes)
    }

    /// SHA-512 over a string followed by a terminating zero byte.
    #[must_use]
    pub fn digest_zero_terminated(s: &str) -> Self {
        let mut hasher = Sha512::new();
        hasher.update(s.as_bytes());
        hasher.update([0u8]);
        let out = hasher.finalize();
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&out);
        Self(bytes)
    }

    /// The first 32 bytes of the digest.
    #[must_use]
    pub fn truncated(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.0[..32]);
        out
    }
}

/// Serde adapter for variable-length byte strings encoded as hex.
pub mod hex_vec {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::SigningKey;

    use super::*;

    #[test]
    fn hex_roundtrip() {
        let key = EddsaPublicKey([0xAB; 32]);
        let parsed: EddsaPublicKey = key.to_string().parse().unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn wrong_length_rejected() {
        let err = EddsaSignature::from_hex("abcd").unwrap_err();
        assert!(matches!(err, MintselError::InvalidKey { .. }));
        assert!(HashCode::from_hex("zz").is_err());
    }

    #[test]
    fn serde_as_hex_string() {
        let sig = EddsaSignature([7; 64]);
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json, format!("\"{}\"", "07".repeat(64)));
        let back: EddsaSignature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }

    #[test]
    fn debug_is_short() {
        let h = HashCode([0x11; 64]);
        assert_eq!(format!("{h:?}"), "HashCode(11111111..)");
    }

    #[test]
    fn verifying_key_conversion() {
        let signing = SigningKey::from_bytes(&[3u8; 32]);
        let public = EddsaPublicKey::from(signing.verifying_key());
        assert_eq!(public.to_verifying_key().unwrap(), signing.verifying_key());
    }

    #[test]
    fn digest_zero_terminated_differs_from_plain() {
        assert_ne!(HashCode::digest(b"iban"), HashCode::digest_zero_terminated("iban"));
        assert_eq!(HashCode::digest(b"iban\0"), HashCode::digest_zero_terminated("iban"));
    }
}
