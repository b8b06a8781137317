//! Property tests for ordering, counting, and window-gating semantics.

use candor_crypto::{encode_clear_score, ScoreEncryptor, TimeSource};
use candor_ledger::{CandorError, DepartmentId, QuestionId, ResponseIndex, SurveyId};
use candor_testkit::test_ledger;
use proptest::prelude::*;
use std::collections::BTreeMap;

const S1: SurveyId = SurveyId(1);

proptest! {
    /// N submissions produce dense zero-based indices per lane, and the
    /// survey counter equals the sum across all lanes.
    #[test]
    fn indices_are_dense_and_count_sums_lanes(
        submissions in proptest::collection::vec((0u32..4, 0u32..3, 0u32..=10), 1..40)
    ) {
        let harness = test_ledger(150);
        harness.ledger.create_survey(S1, "props", 100, 200).expect("create");

        let mut expected_lanes: BTreeMap<u32, u64> = BTreeMap::new();
        for (department, question, score) in submissions {
            let (ciphertext, proof) = harness.cipher.encrypt_and_prove(score);
            let index = harness
                .ledger
                .submit(S1, DepartmentId(department), QuestionId(question), ciphertext, &proof)
                .expect("submit");

            let lane = expected_lanes.entry(department).or_default();
            prop_assert_eq!(index, ResponseIndex(*lane));
            *lane += 1;
        }

        let total: u64 = expected_lanes.values().sum();
        prop_assert_eq!(harness.ledger.count(S1), total);
        for (department, len) in expected_lanes {
            prop_assert_eq!(harness.ledger.lane_len(S1, DepartmentId(department)), len);
        }
    }

    /// A submission succeeds iff the clock reads inside `[start, end]`.
    #[test]
    fn window_gating_is_exact(
        start in 0u64..1_000,
        len in 1u64..1_000,
        now in 0u64..3_000,
    ) {
        let end = start + len;
        let harness = test_ledger(0);
        harness.ledger.create_survey(S1, "window", start, end).expect("create");
        harness.clock.set_time(now).expect("clock");

        let inside = start <= now && now <= end;
        prop_assert_eq!(harness.ledger.is_submission_window_open(S1, now), inside);

        let (ciphertext, proof) = harness.cipher.encrypt_and_prove(5);
        let result = harness
            .ledger
            .submit(S1, DepartmentId(0), QuestionId(0), ciphertext, &proof);
        if inside {
            prop_assert_eq!(result, Ok(ResponseIndex(0)));
        } else {
            prop_assert_eq!(result, Err(CandorError::OutOfWindow { now, start, end }));
        }
    }

    /// Whatever score was encrypted and proven is exactly what verification
    /// decodes, stores, and returns forever after.
    #[test]
    fn verification_reveals_the_proven_score(score in any::<u32>()) {
        let harness = test_ledger(150);
        harness.ledger.create_survey(S1, "reveal", 100, 200).expect("create");

        let (ciphertext, proof) = harness.cipher.encrypt_and_prove(score);
        let index = harness
            .ledger
            .submit(S1, DepartmentId(1), QuestionId(1), ciphertext.clone(), &proof)
            .expect("submit");

        let clear = encode_clear_score(score);
        let decryption_proof = harness.cipher.prove_decryption(&ciphertext, &clear);
        let revealed = harness
            .ledger
            .verify(S1, DepartmentId(1), QuestionId(1), index, &clear, &decryption_proof)
            .expect("verify");

        prop_assert_eq!(revealed, score);
        prop_assert_eq!(harness.ledger.read_verified(S1, DepartmentId(1), index), Ok(score));
    }

    /// Survey creation accepts exactly the windows with `end > start`.
    #[test]
    fn creation_accepts_exactly_forward_windows(start in 0u64..2_000, end in 0u64..2_000) {
        let harness = test_ledger(0);
        let result = harness.ledger.create_survey(S1, "window-check", start, end);
        if end > start {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result, Err(CandorError::InvalidTimeRange { start, end }));
        }
    }
}
