//! Capability-typed handles for encrypted material.
//!
//! Ciphertexts and proofs travel through the ledger as distinct opaque
//! types rather than raw byte strings, so a decryption proof cannot be
//! passed where a ciphertext is expected. Only the cipher collaborator
//! behind [`crate::ThresholdCipher`] is allowed to interpret the bytes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Render an opaque blob as a short hex prefix for logs and debugging.
fn hex_prefix(bytes: &[u8]) -> String {
    const PREFIX: usize = 8;
    if bytes.len() <= PREFIX {
        hex::encode(bytes)
    } else {
        format!("{}..", hex::encode(&bytes[..PREFIX]))
    }
}

macro_rules! opaque_handle {
    ($(#[$doc:meta])* $name:ident, $tag:literal) => {
        $(#[$doc])*
        #[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(#[serde(with = "serde_bytes")] Vec<u8>);

        impl $name {
            /// Wrap raw collaborator-produced bytes
            pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
                Self(bytes.into())
            }

            /// Borrow the raw bytes (for the cipher collaborator only)
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// Length of the underlying blob in bytes
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Whether the blob is empty
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "({})"), hex_prefix(&self.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", hex_prefix(&self.0))
            }
        }
    };
}

opaque_handle!(
    /// Opaque reference to an encrypted 32-bit score.
    ///
    /// The ledger stores these verbatim and never inspects them; their
    /// position in a `(survey, department)` lane is the only identity the
    /// ledger attaches to them.
    Ciphertext,
    "Ciphertext"
);

opaque_handle!(
    /// Proof that a ciphertext is well-formed, produced alongside it by
    /// `encrypt_and_prove` and consumed by `validate_ciphertext`.
    EncryptionProof,
    "EncryptionProof"
);

opaque_handle!(
    /// Evidence that a claimed clear value corresponds to a stored
    /// ciphertext, checked by `check_decryption_proof`.
    DecryptionProof,
    "DecryptionProof"
);
