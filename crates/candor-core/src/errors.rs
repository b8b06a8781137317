//! Error taxonomy for ledger operations.
//!
//! Every failure a Candor operation can surface is a variant here. All of
//! them are ordinary, expected outcomes: callers branch on the variant, not
//! on the message text. A failed operation commits no state, so retrying
//! the whole operation is always safe from the ledger's point of view.

use crate::identifiers::{DepartmentId, ResponseIndex, SurveyId};
use serde::{Deserialize, Serialize};

/// Unified error type for all Candor ledger operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum CandorError {
    /// A survey with this identifier already exists
    #[error("{survey} already exists")]
    DuplicateSurvey {
        /// The identifier that was re-used
        survey: SurveyId,
    },

    /// The submission window is empty or inverted
    #[error("invalid window: end {end} <= start {start}")]
    InvalidTimeRange {
        /// Requested window start
        start: u64,
        /// Requested window end
        end: u64,
    },

    /// The survey is closed or was never created
    #[error("{survey} is not accepting responses")]
    SurveyInactive {
        /// The survey that rejected the submission
        survey: SurveyId,
    },

    /// The submission arrived outside the survey's window
    #[error("submission at {now} is outside window [{start}, {end}]")]
    OutOfWindow {
        /// Clock reading for the rejected operation
        now: u64,
        /// Window start
        start: u64,
        /// Window end
        end: u64,
    },

    /// The ciphertext failed well-formedness validation
    #[error("ciphertext rejected by well-formedness check")]
    InvalidEncryptedInput,

    /// The response index points past the end of its lane
    #[error("index {index} out of range for {survey}/{department} (lane holds {len})")]
    IndexOutOfRange {
        /// Survey the lookup targeted
        survey: SurveyId,
        /// Department lane the lookup targeted
        department: DepartmentId,
        /// The out-of-range index
        index: ResponseIndex,
        /// Current lane length
        len: u64,
    },

    /// The response was already promoted to verified
    #[error("response {survey}/{department}/{index} is already verified")]
    AlreadyVerified {
        /// Survey holding the response
        survey: SurveyId,
        /// Department lane holding the response
        department: DepartmentId,
        /// Position of the response in its lane
        index: ResponseIndex,
    },

    /// The decryption proof failed the cryptographic check
    #[error("decryption proof rejected")]
    InvalidDecryptionProof,

    /// The claimed clear value could not be decoded
    #[error("clear value bytes could not be decoded ({len} bytes)")]
    MalformedClearValue {
        /// Length of the rejected byte string
        len: usize,
    },

    /// The response has not been verified yet
    #[error("response {survey}/{department}/{index} is not verified yet")]
    NotYetVerified {
        /// Survey holding the response
        survey: SurveyId,
        /// Department lane holding the response
        department: DepartmentId,
        /// Position of the response in its lane
        index: ResponseIndex,
    },

    /// The survey is already closed (or was never created)
    #[error("{survey} is already closed")]
    SurveyAlreadyClosed {
        /// The survey the closure targeted
        survey: SurveyId,
    },

    /// Closure was attempted before the window elapsed
    #[error("{survey} is still in progress until {end}")]
    SurveyStillInProgress {
        /// The survey the closure targeted
        survey: SurveyId,
        /// Window end that has not passed yet
        end: u64,
    },

    /// The time source failed to produce a timestamp
    #[error("clock failure: {message}")]
    Clock {
        /// Description of the time-source failure
        message: String,
    },
}

impl CandorError {
    /// Create a clock failure error
    pub fn clock(message: impl Into<String>) -> Self {
        Self::Clock {
            message: message.into(),
        }
    }
}

/// Standard Result type for Candor operations
pub type Result<T> = std::result::Result<T, CandorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_survey() {
        let err = CandorError::DuplicateSurvey {
            survey: SurveyId(9),
        };
        assert_eq!(err.to_string(), "survey-9 already exists");
    }

    #[test]
    fn errors_are_matchable() {
        let err = CandorError::IndexOutOfRange {
            survey: SurveyId(1),
            department: DepartmentId(2),
            index: ResponseIndex(5),
            len: 3,
        };
        assert!(matches!(err, CandorError::IndexOutOfRange { len: 3, .. }));
    }

    #[test]
    fn errors_round_trip_through_serde() {
        let err = CandorError::OutOfWindow {
            now: 250,
            start: 100,
            end: 200,
        };
        let json = serde_json::to_string(&err).expect("serialize");
        let back: CandorError = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(err, back);
    }
}
