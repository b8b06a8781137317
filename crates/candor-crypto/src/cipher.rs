//! Cipher collaborator traits and the clear-score codec.

use crate::handles::{Ciphertext, DecryptionProof, EncryptionProof};
use candor_core::{CandorError, Result};

/// Width of an encoded clear score in bytes.
pub const CLEAR_SCORE_WIDTH: usize = 4;

/// The cryptographic gate consumed by the ledger.
///
/// Implementations live outside the core. Both checks are modeled as
/// synchronous calls that can fail but never suspend; the ledger invokes
/// them inside its per-survey critical section, before any state mutation
/// is committed.
pub trait ThresholdCipher: Send + Sync {
    /// Check that a ciphertext is well-formed.
    ///
    /// Must return `true` for any ciphertext the ledger accepts at
    /// submission time.
    fn validate_ciphertext(&self, ciphertext: &Ciphertext, proof: &EncryptionProof) -> bool;

    /// Check a decryption proof binding `clear_bytes` to the given
    /// ciphertexts.
    ///
    /// This is the sole cryptographic gate of verification: a `true` here
    /// authorizes the ledger to accept `clear_bytes` as the authoritative
    /// cleartext for the referenced ciphertexts.
    fn check_decryption_proof(
        &self,
        ciphertexts: &[Ciphertext],
        clear_bytes: &[u8],
        proof: &DecryptionProof,
    ) -> bool;
}

/// Producer side of the cipher collaborator.
///
/// Used by callers ahead of `submit`; the ledger itself only validates and
/// never encrypts.
pub trait ScoreEncryptor: Send + Sync {
    /// Encrypt a score and produce its well-formedness proof.
    fn encrypt_and_prove(&self, value: u32) -> (Ciphertext, EncryptionProof);
}

/// Decode a claimed clear score from its wire form.
///
/// Scores travel as exactly [`CLEAR_SCORE_WIDTH`] big-endian bytes; any
/// other length is rejected as [`CandorError::MalformedClearValue`].
pub fn decode_clear_score(bytes: &[u8]) -> Result<u32> {
    let fixed: [u8; CLEAR_SCORE_WIDTH] = bytes
        .try_into()
        .map_err(|_| CandorError::MalformedClearValue { len: bytes.len() })?;
    Ok(u32::from_be_bytes(fixed))
}

/// Encode a clear score into its wire form.
pub fn encode_clear_score(value: u32) -> [u8; CLEAR_SCORE_WIDTH] {
    value.to_be_bytes()
}
