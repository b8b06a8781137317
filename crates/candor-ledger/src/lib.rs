//! Encrypted response ledger with threshold-decryption verification.
//!
//! An organization collects sentiment scores as ciphertexts, stores them in
//! append-only per-`(survey, department)` lanes, and later accepts a clear
//! score as authoritative only once an externally supplied decryption proof
//! passes the cipher collaborator's check, exactly once per response.
//!
//! The ledger is a single owned aggregate, [`SurveyLedger`]. Its state is
//! reachable only through the public operations, which preserves the
//! structural invariants directly:
//!
//! - a survey identifier is created at most once and closed at most once
//! - lane indices are dense, zero-based, and stable after append
//! - a response's `verified` flag transitions `false → true` at most once
//! - every successful creation, submission, and verification appends one
//!   entry to the event log within the same critical section as the
//!   mutation it records
//!
//! # Concurrency
//!
//! Each public operation executes as one atomic unit per survey: an outer
//! read-write lock guards the survey map, and every survey owns an inner
//! read-write lock over its metadata, lanes, and counter. Operations on
//! distinct surveys proceed in parallel; operations on the same survey are
//! linearizable. Collaborator calls (clock, cipher) complete before any
//! mutation commits, so no partial state is ever visible.

pub mod events;
pub mod registry;
pub mod responses;
mod verify;

pub use candor_core::{
    CandorError, DepartmentId, QuestionId, ResponseIndex, Result, SurveyId,
};
pub use events::{EventKind, EventRecord, EventSink, MemoryEventLog};
pub use registry::SurveyMetadata;
pub use responses::ResponseDetail;

use candor_crypto::{ThresholdCipher, TimeSource};
use parking_lot::RwLock;
use responses::EncryptedResponse;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Per-survey shared state: one writer at a time, torn reads impossible.
pub(crate) type SurveyCell = Arc<RwLock<SurveyState>>;

/// Everything the ledger tracks for one survey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SurveyState {
    /// Name, window, and open/closed flag
    pub(crate) meta: SurveyMetadata,
    /// Append-only response lanes keyed by department
    pub(crate) lanes: BTreeMap<DepartmentId, Vec<EncryptedResponse>>,
    /// Responses ever appended across all lanes; never decremented
    pub(crate) response_count: u64,
}

impl SurveyState {
    pub(crate) fn new(meta: SurveyMetadata) -> Self {
        SurveyState {
            meta,
            lanes: BTreeMap::new(),
            response_count: 0,
        }
    }

    /// Borrow a lane, treating an absent department as an empty lane.
    pub(crate) fn lane(&self, department: DepartmentId) -> &[EncryptedResponse] {
        self.lanes.get(&department).map_or(&[], Vec::as_slice)
    }
}

/// The encrypted response ledger.
///
/// Owns all survey metadata, response lanes, and counters; collaborators
/// (cipher, clock, event sink) are injected at construction and shared
/// behind `Arc`, so clones of the handles can be wired into transports
/// without aliasing the state itself.
pub struct SurveyLedger {
    surveys: RwLock<HashMap<SurveyId, SurveyCell>>,
    cipher: Arc<dyn ThresholdCipher>,
    clock: Arc<dyn TimeSource>,
    events: Arc<dyn EventSink>,
}

impl SurveyLedger {
    /// Create an empty ledger wired to the given collaborators.
    pub fn new(
        cipher: Arc<dyn ThresholdCipher>,
        clock: Arc<dyn TimeSource>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        SurveyLedger {
            surveys: RwLock::new(HashMap::new()),
            cipher,
            clock,
            events,
        }
    }

    /// Number of surveys ever created.
    pub fn survey_count(&self) -> usize {
        self.surveys.read().len()
    }

    pub(crate) fn surveys(&self) -> &RwLock<HashMap<SurveyId, SurveyCell>> {
        &self.surveys
    }

    pub(crate) fn cipher(&self) -> &dyn ThresholdCipher {
        &*self.cipher
    }

    pub(crate) fn sink(&self) -> &dyn EventSink {
        &*self.events
    }

    /// Look up a survey's cell without holding the map lock afterwards.
    pub(crate) fn cell(&self, survey: SurveyId) -> Option<SurveyCell> {
        self.surveys.read().get(&survey).cloned()
    }

    /// Read the clock collaborator. Called at most once per operation.
    pub(crate) fn read_clock(&self) -> Result<u64> {
        self.clock.current_timestamp()
    }
}

impl std::fmt::Debug for SurveyLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurveyLedger")
            .field("surveys", &self.surveys.read().len())
            .finish_non_exhaustive()
    }
}
