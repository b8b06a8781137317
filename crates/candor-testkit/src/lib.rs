//! Deterministic collaborators for exercising the Candor ledger in tests.
//!
//! The centerpiece is [`MockThresholdCipher`], a keyed mock of the
//! threshold cryptosystem: good enough to produce ciphertexts the ledger
//! accepts, decryption proofs that pass or fail on demand, and nothing
//! more. It is test scaffolding, not a cryptosystem; it makes no security
//! claims.
//!
//! [`test_ledger`] wires a ledger to the mock, a simulated clock, and an
//! in-memory event log so tests control every collaborator.

use candor_crypto::{
    encode_clear_score, Ciphertext, DecryptionProof, EncryptionProof, ScoreEncryptor,
    SimulatedTimeSource, ThresholdCipher,
};
use candor_ledger::{MemoryEventLog, SurveyLedger};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

const NONCE_LEN: usize = 8;
const SCORE_LEN: usize = 4;
const MAC_LEN: usize = 16;
const CIPHERTEXT_LEN: usize = NONCE_LEN + SCORE_LEN + MAC_LEN;

/// Keyed mock of the threshold cipher collaborator.
///
/// Ciphertexts are `nonce ‖ masked-score ‖ mac`; proofs are keyed blake3
/// bindings over the exact bytes they authorize. Everything is derived
/// from the seed, so the same seed reproduces the same transcripts.
pub struct MockThresholdCipher {
    key: [u8; 32],
    nonces: Mutex<StdRng>,
}

impl MockThresholdCipher {
    /// Create a mock cipher with a deterministic key and nonce stream.
    pub fn new(seed: u64) -> Self {
        MockThresholdCipher {
            key: *blake3::hash(&seed.to_le_bytes()).as_bytes(),
            nonces: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn tag(&self, domain: &[u8], data: &[u8]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new_keyed(&self.key);
        hasher.update(domain);
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    fn keystream(&self, nonce: &[u8]) -> [u8; SCORE_LEN] {
        let tag = self.tag(b"mask", nonce);
        let mut out = [0u8; SCORE_LEN];
        out.copy_from_slice(&tag[..SCORE_LEN]);
        out
    }

    /// Recover the score from a mock ciphertext, if it is well-formed.
    pub fn decrypt(&self, ciphertext: &Ciphertext) -> Option<u32> {
        let bytes = ciphertext.as_bytes();
        if bytes.len() != CIPHERTEXT_LEN {
            return None;
        }
        let (body, mac) = bytes.split_at(NONCE_LEN + SCORE_LEN);
        if mac != &self.tag(b"mac", body)[..MAC_LEN] {
            return None;
        }
        let (nonce, masked) = body.split_at(NONCE_LEN);
        let keystream = self.keystream(nonce);
        let mut clear = [0u8; SCORE_LEN];
        for (i, byte) in masked.iter().enumerate() {
            clear[i] = byte ^ keystream[i];
        }
        Some(u32::from_be_bytes(clear))
    }

    /// Produce the decryption proof binding `clear_bytes` to a ciphertext.
    ///
    /// The binding is over whatever bytes the caller supplies, correct or
    /// not, so tests can mint proofs for wrong or undecodable clear values
    /// and watch the ledger reject them.
    pub fn prove_decryption(&self, ciphertext: &Ciphertext, clear_bytes: &[u8]) -> DecryptionProof {
        self.prove_batch_decryption(std::slice::from_ref(ciphertext), clear_bytes)
    }

    /// Batch form of [`prove_decryption`](Self::prove_decryption).
    pub fn prove_batch_decryption(
        &self,
        ciphertexts: &[Ciphertext],
        clear_bytes: &[u8],
    ) -> DecryptionProof {
        DecryptionProof::from_bytes(self.tag(b"dec", &binding(ciphertexts, clear_bytes)).to_vec())
    }
}

fn binding(ciphertexts: &[Ciphertext], clear_bytes: &[u8]) -> Vec<u8> {
    let mut data = Vec::new();
    for ciphertext in ciphertexts {
        data.extend_from_slice(ciphertext.as_bytes());
    }
    data.extend_from_slice(clear_bytes);
    data
}

impl ScoreEncryptor for MockThresholdCipher {
    fn encrypt_and_prove(&self, value: u32) -> (Ciphertext, EncryptionProof) {
        let nonce: [u8; NONCE_LEN] = self.nonces.lock().gen();
        let keystream = self.keystream(&nonce);
        let clear = encode_clear_score(value);

        let mut body = Vec::with_capacity(CIPHERTEXT_LEN);
        body.extend_from_slice(&nonce);
        for (i, byte) in clear.iter().enumerate() {
            body.push(byte ^ keystream[i]);
        }
        let mac = self.tag(b"mac", &body);
        body.extend_from_slice(&mac[..MAC_LEN]);

        let ciphertext = Ciphertext::from_bytes(body);
        let proof = EncryptionProof::from_bytes(self.tag(b"wf", ciphertext.as_bytes()).to_vec());
        (ciphertext, proof)
    }
}

impl ThresholdCipher for MockThresholdCipher {
    fn validate_ciphertext(&self, ciphertext: &Ciphertext, proof: &EncryptionProof) -> bool {
        self.decrypt(ciphertext).is_some()
            && proof.as_bytes() == self.tag(b"wf", ciphertext.as_bytes()).as_slice()
    }

    fn check_decryption_proof(
        &self,
        ciphertexts: &[Ciphertext],
        clear_bytes: &[u8],
        proof: &DecryptionProof,
    ) -> bool {
        if ciphertexts.is_empty() {
            return false;
        }
        if proof.as_bytes() != self.tag(b"dec", &binding(ciphertexts, clear_bytes)).as_slice() {
            return false;
        }
        // Cross-check the actual decryptions when the payload has the
        // expected width. Odd-width payloads pass on the binding alone,
        // which lets tests drive the ledger's own decoding guard.
        if clear_bytes.len() == SCORE_LEN * ciphertexts.len() {
            for (ciphertext, chunk) in ciphertexts.iter().zip(clear_bytes.chunks(SCORE_LEN)) {
                match self.decrypt(ciphertext) {
                    Some(value) if encode_clear_score(value) == *chunk => {}
                    _ => return false,
                }
            }
        }
        true
    }
}

/// A ledger wired to deterministic collaborators.
pub struct TestLedger {
    /// The ledger under test
    pub ledger: SurveyLedger,
    /// Manually driven clock shared with the ledger
    pub clock: Arc<SimulatedTimeSource>,
    /// In-memory event trail shared with the ledger
    pub events: Arc<MemoryEventLog>,
    /// The mock cipher shared with the ledger
    pub cipher: Arc<MockThresholdCipher>,
}

/// Build a simulated clock starting at `start_time`.
pub fn test_clock(start_time: u64) -> Arc<SimulatedTimeSource> {
    Arc::new(SimulatedTimeSource::new(start_time))
}

/// Wire a fresh ledger to a mock cipher, simulated clock, and memory log.
pub fn test_ledger(start_time: u64) -> TestLedger {
    let clock = test_clock(start_time);
    let events = Arc::new(MemoryEventLog::new());
    let cipher = Arc::new(MockThresholdCipher::new(0x5eed));
    let ledger = SurveyLedger::new(cipher.clone(), clock.clone(), events.clone());
    TestLedger {
        ledger,
        clock,
        events,
        cipher,
    }
}
