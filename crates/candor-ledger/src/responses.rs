//! Append-only response lanes.
//!
//! Each `(survey, department)` pair owns an ordered lane of encrypted
//! responses. A response's position is assigned at append time and never
//! changes; indices are dense, zero-based, and handed back to the caller
//! for later verification lookups.

use crate::events::{EventKind, EventRecord};
use candor_core::{CandorError, DepartmentId, QuestionId, ResponseIndex, Result, SurveyId};
use candor_crypto::{Ciphertext, EncryptionProof};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One stored response.
///
/// Created once per submission, mutated exactly once by verification
/// (setting `clear_score` and flipping `verified`), never deleted or
/// reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct EncryptedResponse {
    /// Opaque handle to the encrypted score
    pub(crate) ciphertext: Ciphertext,
    /// Department the response was filed under (also the lane key)
    pub(crate) department_id: DepartmentId,
    /// Question the response answers; accepted as given
    pub(crate) question_id: QuestionId,
    /// Clock reading at append time
    pub(crate) submitted_at: u64,
    /// One-way flag, flipped by the verification engine
    pub(crate) verified: bool,
    /// Decoded score; absent until verified, immutable afterwards
    pub(crate) clear_score: Option<u32>,
}

/// Owned snapshot of a stored response, as returned by
/// [`SurveyLedger::get`](crate::SurveyLedger::get).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseDetail {
    /// Opaque handle to the encrypted score
    pub ciphertext: Ciphertext,
    /// Department the response was filed under
    pub department_id: DepartmentId,
    /// Question the response answers
    pub question_id: QuestionId,
    /// Clock reading at append time
    pub submitted_at: u64,
    /// Whether a decryption proof has been accepted for this response
    pub verified: bool,
    /// The authoritative clear score, present iff `verified`
    pub clear_score: Option<u32>,
}

impl From<&EncryptedResponse> for ResponseDetail {
    fn from(response: &EncryptedResponse) -> Self {
        ResponseDetail {
            ciphertext: response.ciphertext.clone(),
            department_id: response.department_id,
            question_id: response.question_id,
            submitted_at: response.submitted_at,
            verified: response.verified,
            clear_score: response.clear_score,
        }
    }
}

/// Build the lookup error for a lane miss.
pub(crate) fn out_of_range(
    survey: SurveyId,
    department: DepartmentId,
    index: ResponseIndex,
    len: u64,
) -> CandorError {
    CandorError::IndexOutOfRange {
        survey,
        department,
        index,
        len,
    }
}

impl crate::SurveyLedger {
    /// Append an encrypted response to its `(survey, department)` lane.
    ///
    /// The submission is gated three ways, in order: the survey must be
    /// active ([`CandorError::SurveyInactive`], which an unknown survey
    /// also reports), the clock must read inside the submission window
    /// ([`CandorError::OutOfWindow`]), and the cipher collaborator must
    /// vouch for the ciphertext ([`CandorError::InvalidEncryptedInput`]).
    ///
    /// On success the response is appended unverified, the survey's
    /// counter is incremented, a `ResponseSubmitted` event is recorded,
    /// and the response's dense zero-based lane index is returned for
    /// later verification lookups.
    pub fn submit(
        &self,
        survey: SurveyId,
        department: DepartmentId,
        question: QuestionId,
        ciphertext: Ciphertext,
        proof: &EncryptionProof,
    ) -> Result<ResponseIndex> {
        let now = self.read_clock()?;
        let cell = self
            .cell(survey)
            .ok_or(CandorError::SurveyInactive { survey })?;
        let mut state = cell.write();

        if !state.meta.active {
            return Err(CandorError::SurveyInactive { survey });
        }
        if !state.meta.window_contains(now) {
            return Err(CandorError::OutOfWindow {
                now,
                start: state.meta.start_time,
                end: state.meta.end_time,
            });
        }
        if !self.cipher().validate_ciphertext(&ciphertext, proof) {
            return Err(CandorError::InvalidEncryptedInput);
        }

        let lane = state.lanes.entry(department).or_default();
        let index = ResponseIndex::new(lane.len() as u64);
        lane.push(EncryptedResponse {
            ciphertext,
            department_id: department,
            question_id: question,
            submitted_at: now,
            verified: false,
            clear_score: None,
        });
        state.response_count += 1;

        self.sink().append(EventRecord {
            survey_id: survey,
            at: now,
            kind: EventKind::ResponseSubmitted {
                department_id: department,
                question_id: question,
                index,
            },
        });
        debug!(survey = %survey, department = %department, index = %index, "response appended");
        Ok(index)
    }

    /// Fetch a stored response by lane position.
    ///
    /// Fails with [`CandorError::IndexOutOfRange`] past the lane end; an
    /// unknown survey or department reads as an empty lane. No side
    /// effects.
    pub fn get(
        &self,
        survey: SurveyId,
        department: DepartmentId,
        index: ResponseIndex,
    ) -> Result<ResponseDetail> {
        let cell = self
            .cell(survey)
            .ok_or_else(|| out_of_range(survey, department, index, 0))?;
        let state = cell.read();
        let lane = state.lane(department);
        lane.get(index.value() as usize)
            .map(ResponseDetail::from)
            .ok_or_else(|| out_of_range(survey, department, index, lane.len() as u64))
    }

    /// Responses ever appended for a survey, across all departments.
    ///
    /// O(1); 0 for a survey that was never created.
    pub fn count(&self, survey: SurveyId) -> u64 {
        self.cell(survey)
            .map_or(0, |cell| cell.read().response_count)
    }

    /// Length of one `(survey, department)` lane.
    ///
    /// 0 for an unknown survey or department.
    pub fn lane_len(&self, survey: SurveyId, department: DepartmentId) -> u64 {
        self.cell(survey)
            .map_or(0, |cell| cell.read().lane(department).len() as u64)
    }
}
