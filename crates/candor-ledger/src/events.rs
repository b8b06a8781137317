//! Append-only domain event trail.
//!
//! Every successful creation, submission, and verification appends exactly
//! one record, in the order the operations complete. The ledger appends
//! while still holding the survey's write lock, so an observer can never
//! see a state change without its event or an event without its state
//! change. Sinks are infallible from the ledger's perspective.

use candor_core::{DepartmentId, QuestionId, ResponseIndex, SurveyId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A survey was registered and opened
    SurveyCreated {
        /// Survey name as stored
        name: String,
        /// Window start
        start_time: u64,
        /// Window end
        end_time: u64,
    },
    /// An encrypted response was appended to a lane
    ResponseSubmitted {
        /// Lane the response landed in
        department_id: DepartmentId,
        /// Question the response answers
        question_id: QuestionId,
        /// Position assigned at append time
        index: ResponseIndex,
    },
    /// A response was promoted to verified
    ResponseVerified {
        /// Lane holding the response
        department_id: DepartmentId,
        /// Question carried on the verification call
        question_id: QuestionId,
        /// Position of the verified response
        index: ResponseIndex,
        /// The decoded, now-authoritative score
        score: u32,
    },
}

/// One entry in the trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Survey the operation targeted
    pub survey_id: SurveyId,
    /// Clock reading of the originating operation
    pub at: u64,
    /// What happened
    pub kind: EventKind,
}

/// Where the ledger appends events.
///
/// Implementations must not fail the originating operation; a sink that
/// drops or duplicates entries breaks observers, not the ledger.
pub trait EventSink: Send + Sync {
    /// Record one event
    fn append(&self, record: EventRecord);
}

/// In-memory sink for tests and polling observers.
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    entries: Mutex<Vec<EventRecord>>,
}

impl MemoryEventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy out the whole trail in append order
    pub fn snapshot(&self) -> Vec<EventRecord> {
        self.entries.lock().clone()
    }

    /// Copy out everything appended at or after `offset`
    pub fn events_since(&self, offset: usize) -> Vec<EventRecord> {
        let entries = self.entries.lock();
        entries.get(offset..).unwrap_or(&[]).to_vec()
    }

    /// Number of entries appended so far
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the trail is empty
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl EventSink for MemoryEventLog {
    fn append(&self, record: EventRecord) {
        self.entries.lock().push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(survey: u64, at: u64) -> EventRecord {
        EventRecord {
            survey_id: SurveyId(survey),
            at,
            kind: EventKind::ResponseSubmitted {
                department_id: DepartmentId(1),
                question_id: QuestionId(2),
                index: ResponseIndex(0),
            },
        }
    }

    #[test]
    fn appends_preserve_order() {
        let log = MemoryEventLog::new();
        log.append(record(1, 10));
        log.append(record(2, 20));
        log.append(record(1, 30));

        let trail = log.snapshot();
        assert_eq!(trail.len(), 3);
        assert_eq!(
            trail.iter().map(|e| e.at).collect::<Vec<_>>(),
            vec![10, 20, 30]
        );
    }

    #[test]
    fn events_since_slices_the_tail() {
        let log = MemoryEventLog::new();
        for at in [10, 20, 30] {
            log.append(record(1, at));
        }

        assert_eq!(log.events_since(0).len(), 3);
        assert_eq!(log.events_since(2)[0].at, 30);
        assert!(log.events_since(3).is_empty());
        assert!(log.events_since(99).is_empty());
    }

    #[test]
    fn records_round_trip_through_serde() {
        let event = EventRecord {
            survey_id: SurveyId(1),
            at: 150,
            kind: EventKind::ResponseVerified {
                department_id: DepartmentId(1),
                question_id: QuestionId(7),
                index: ResponseIndex(0),
                score: 8,
            },
        };
        let json = serde_json::to_string(&event).expect("serialize");
        let back: EventRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(event, back);
    }
}
