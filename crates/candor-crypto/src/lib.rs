//! Cryptographic collaborator boundary for the Candor response ledger.
//!
//! The ledger never produces or interprets ciphertexts; it only holds them
//! and asks a collaborator to vouch for them. This crate defines that
//! boundary:
//!
//! - [`handles`]: capability-typed opaque blobs (`Ciphertext`,
//!   `EncryptionProof`, `DecryptionProof`) whose contents are meaningful
//!   only to the cipher implementation behind the trait
//! - [`cipher`]: the [`ThresholdCipher`] and [`ScoreEncryptor`] traits plus
//!   the fixed-width clear-score codec
//! - [`clock`]: the injectable [`TimeSource`] the ledger reads once per
//!   operation
//!
//! Production deployments wire in a real threshold cryptosystem; tests use
//! the deterministic mock from `candor-testkit`.

pub mod cipher;
pub mod clock;
pub mod handles;

pub use cipher::{decode_clear_score, encode_clear_score, ScoreEncryptor, ThresholdCipher};
pub use clock::{SimulatedTimeSource, SystemTimeSource, TimeSource};
pub use handles::{Ciphertext, DecryptionProof, EncryptionProof};
