//! Verification engine: exactly-once promotion of a response from
//! unverified to verified.
//!
//! A caller presents a claimed clear value and a decryption proof for a
//! stored response. The cipher collaborator is the sole cryptographic
//! gate; the engine's own job is the exactly-once guarantee. All checks
//! and the final mutation run under the survey cell's write lock, so
//! concurrent attempts on the same response serialize: one wins, the rest
//! observe `AlreadyVerified`, and no reader ever sees `verified = true`
//! with an absent score.

use crate::events::{EventKind, EventRecord};
use crate::responses::out_of_range;
use candor_core::{CandorError, DepartmentId, QuestionId, ResponseIndex, Result, SurveyId};
use candor_crypto::{decode_clear_score, DecryptionProof};
use std::slice;
use tracing::debug;

impl crate::SurveyLedger {
    /// Accept a clear value as authoritative for a stored response.
    ///
    /// Checked in order:
    ///
    /// 1. the index must lie inside its lane
    ///    ([`CandorError::IndexOutOfRange`])
    /// 2. the response must not have been verified before
    ///    ([`CandorError::AlreadyVerified`]); a response is promoted at
    ///    most once, no matter how many attempts race
    /// 3. the cipher collaborator must accept the proof against the stored
    ///    ciphertext handle ([`CandorError::InvalidDecryptionProof`])
    /// 4. `clear_bytes` must decode as a 32-bit score
    ///    ([`CandorError::MalformedClearValue`])
    ///
    /// On success the score and the `verified` flag are set together, a
    /// `ResponseVerified` event carrying the decoded score is appended in
    /// the same critical section, and the score is returned. Any failure
    /// leaves the response untouched.
    pub fn verify(
        &self,
        survey: SurveyId,
        department: DepartmentId,
        question: QuestionId,
        index: ResponseIndex,
        clear_bytes: &[u8],
        proof: &DecryptionProof,
    ) -> Result<u32> {
        let now = self.read_clock()?;
        let cell = self
            .cell(survey)
            .ok_or_else(|| out_of_range(survey, department, index, 0))?;
        let mut state = cell.write();

        let lane = state
            .lanes
            .get_mut(&department)
            .ok_or_else(|| out_of_range(survey, department, index, 0))?;
        let len = lane.len() as u64;
        let response = lane
            .get_mut(index.value() as usize)
            .ok_or_else(|| out_of_range(survey, department, index, len))?;

        if response.verified {
            return Err(CandorError::AlreadyVerified {
                survey,
                department,
                index,
            });
        }
        if !self.cipher().check_decryption_proof(
            slice::from_ref(&response.ciphertext),
            clear_bytes,
            proof,
        ) {
            return Err(CandorError::InvalidDecryptionProof);
        }
        let score = decode_clear_score(clear_bytes)?;

        response.clear_score = Some(score);
        response.verified = true;

        self.sink().append(EventRecord {
            survey_id: survey,
            at: now,
            kind: EventKind::ResponseVerified {
                department_id: department,
                question_id: question,
                index,
                score,
            },
        });
        debug!(survey = %survey, department = %department, index = %index, "response verified");
        Ok(score)
    }

    /// Read the authoritative score of a verified response.
    ///
    /// Fails with [`CandorError::IndexOutOfRange`] for a bad position and
    /// [`CandorError::NotYetVerified`] until a `verify` call has
    /// succeeded; afterwards it returns the decoded score from that call,
    /// forever. Read-only.
    pub fn read_verified(
        &self,
        survey: SurveyId,
        department: DepartmentId,
        index: ResponseIndex,
    ) -> Result<u32> {
        let cell = self
            .cell(survey)
            .ok_or_else(|| out_of_range(survey, department, index, 0))?;
        let state = cell.read();
        let lane = state.lane(department);
        let response = lane
            .get(index.value() as usize)
            .ok_or_else(|| out_of_range(survey, department, index, lane.len() as u64))?;

        match (response.verified, response.clear_score) {
            (true, Some(score)) => Ok(score),
            _ => Err(CandorError::NotYetVerified {
                survey,
                department,
                index,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{CandorError, DepartmentId, QuestionId, ResponseIndex, SurveyId};
    use assert_matches::assert_matches;
    use candor_crypto::{encode_clear_score, DecryptionProof, ScoreEncryptor, TimeSource};
    use candor_testkit::{test_ledger, TestLedger};

    const DEPT: DepartmentId = DepartmentId(1);
    const QUESTION: QuestionId = QuestionId(7);

    fn ledger_with_response(score: u32) -> (TestLedger, ResponseIndex) {
        let harness = test_ledger(150);
        harness
            .ledger
            .create_survey(SurveyId(1), "pulse", 100, 200)
            .expect("create");
        let (ct, proof) = harness.cipher.encrypt_and_prove(score);
        let index = harness
            .ledger
            .submit(SurveyId(1), DEPT, QUESTION, ct, &proof)
            .expect("submit");
        (harness, index)
    }

    fn valid_proof(harness: &TestLedger, index: ResponseIndex, score: u32) -> DecryptionProof {
        let detail = harness.ledger.get(SurveyId(1), DEPT, index).expect("get");
        harness
            .cipher
            .prove_decryption(&detail.ciphertext, &encode_clear_score(score))
    }

    #[test]
    fn verify_promotes_and_returns_the_score() {
        let (harness, index) = ledger_with_response(8);
        let proof = valid_proof(&harness, index, 8);

        let score = harness
            .ledger
            .verify(SurveyId(1), DEPT, QUESTION, index, &encode_clear_score(8), &proof)
            .expect("verify");
        assert_eq!(score, 8);

        let detail = harness.ledger.get(SurveyId(1), DEPT, index).expect("get");
        assert!(detail.verified);
        assert_eq!(detail.clear_score, Some(8));
        assert_eq!(
            harness.ledger.read_verified(SurveyId(1), DEPT, index),
            Ok(8)
        );
    }

    #[test]
    fn verify_is_exactly_once() {
        let (harness, index) = ledger_with_response(8);
        let proof = valid_proof(&harness, index, 8);
        let clear = encode_clear_score(8);

        harness
            .ledger
            .verify(SurveyId(1), DEPT, QUESTION, index, &clear, &proof)
            .expect("first verify");

        // the same valid proof is rejected on every later attempt
        assert_matches!(
            harness
                .ledger
                .verify(SurveyId(1), DEPT, QUESTION, index, &clear, &proof),
            Err(CandorError::AlreadyVerified { .. })
        );
        // as is an invalid one; the already-verified check comes first
        assert_matches!(
            harness.ledger.verify(
                SurveyId(1),
                DEPT,
                QUESTION,
                index,
                &clear,
                &DecryptionProof::from_bytes(vec![0u8; 4]),
            ),
            Err(CandorError::AlreadyVerified { .. })
        );
        // and the stored score is unchanged
        assert_eq!(
            harness.ledger.read_verified(SurveyId(1), DEPT, index),
            Ok(8)
        );
    }

    #[test]
    fn verify_rejects_bad_proofs_and_wrong_values() {
        let (harness, index) = ledger_with_response(8);

        // garbage proof bytes
        assert_matches!(
            harness.ledger.verify(
                SurveyId(1),
                DEPT,
                QUESTION,
                index,
                &encode_clear_score(8),
                &DecryptionProof::from_bytes(vec![0u8; 32]),
            ),
            Err(CandorError::InvalidDecryptionProof)
        );

        // a proof honestly bound to the wrong clear value
        let wrong_proof = valid_proof(&harness, index, 9);
        assert_matches!(
            harness.ledger.verify(
                SurveyId(1),
                DEPT,
                QUESTION,
                index,
                &encode_clear_score(9),
                &wrong_proof,
            ),
            Err(CandorError::InvalidDecryptionProof)
        );

        // the response is still unverified afterwards
        assert_matches!(
            harness.ledger.read_verified(SurveyId(1), DEPT, index),
            Err(CandorError::NotYetVerified { .. })
        );
    }

    #[test]
    fn verify_rejects_malformed_clear_values() {
        let (harness, index) = ledger_with_response(8);
        // bind a proof to a 3-byte clear string: the proof check passes,
        // decoding does not
        let detail = harness.ledger.get(SurveyId(1), DEPT, index).expect("get");
        let short = [0u8, 0, 8];
        let proof = harness.cipher.prove_decryption(&detail.ciphertext, &short);

        assert_matches!(
            harness
                .ledger
                .verify(SurveyId(1), DEPT, QUESTION, index, &short, &proof),
            Err(CandorError::MalformedClearValue { len: 3 })
        );
        // failed decoding commits nothing
        assert_matches!(
            harness.ledger.read_verified(SurveyId(1), DEPT, index),
            Err(CandorError::NotYetVerified { .. })
        );
    }

    #[test]
    fn verify_rejects_unknown_positions() {
        let (harness, _) = ledger_with_response(8);
        let proof = DecryptionProof::from_bytes(vec![0u8; 32]);

        assert_matches!(
            harness.ledger.verify(
                SurveyId(1),
                DEPT,
                QUESTION,
                ResponseIndex(5),
                &encode_clear_score(8),
                &proof,
            ),
            Err(CandorError::IndexOutOfRange { len: 1, .. })
        );
        assert_matches!(
            harness.ledger.verify(
                SurveyId(9),
                DEPT,
                QUESTION,
                ResponseIndex(0),
                &encode_clear_score(8),
                &proof,
            ),
            Err(CandorError::IndexOutOfRange { len: 0, .. })
        );
    }

    #[test]
    fn read_verified_guards_unverified_responses() {
        let (harness, index) = ledger_with_response(8);
        assert_matches!(
            harness.ledger.read_verified(SurveyId(1), DEPT, index),
            Err(CandorError::NotYetVerified { .. })
        );
        assert_matches!(
            harness.ledger.read_verified(SurveyId(1), DEPT, ResponseIndex(3)),
            Err(CandorError::IndexOutOfRange { len: 1, .. })
        );
    }

    #[test]
    fn verification_works_after_survey_closure() {
        let (harness, index) = ledger_with_response(8);
        harness.clock.set_time(300).expect("clock");
        harness.ledger.close_survey(SurveyId(1)).expect("close");

        // closure gates submissions, not verification
        let proof = valid_proof(&harness, index, 8);
        let score = harness
            .ledger
            .verify(SurveyId(1), DEPT, QUESTION, index, &encode_clear_score(8), &proof)
            .expect("verify after close");
        assert_eq!(score, 8);
    }
}
