//! Survey registry: existence, submission windows, and open/closed state.
//!
//! A survey is created at most once, mutated only by the one-way close
//! transition, and never deleted. The registry is the gate every
//! submission passes through: responses are accepted only while the survey
//! is active and the clock reads inside `[start_time, end_time]`.

use crate::events::{EventKind, EventRecord};
use crate::{SurveyCell, SurveyState};
use candor_core::{CandorError, Result, SurveyId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Metadata stored per survey.
///
/// `name` and the window are immutable once set; `active` makes a single
/// one-way transition `true → false` via [`SurveyLedger::close_survey`].
///
/// [`SurveyLedger::close_survey`]: crate::SurveyLedger::close_survey
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyMetadata {
    /// Human-readable survey name
    pub name: String,
    /// First instant (inclusive) at which submissions are accepted
    pub start_time: u64,
    /// Last instant (inclusive) at which submissions are accepted
    pub end_time: u64,
    /// Whether the survey still accepts submissions (window permitting)
    pub active: bool,
}

impl SurveyMetadata {
    /// True iff `now` falls inside the submission window.
    pub(crate) fn window_contains(&self, now: u64) -> bool {
        self.start_time <= now && now <= self.end_time
    }
}

impl crate::SurveyLedger {
    /// Register a new survey and open it for submissions.
    ///
    /// Fails with [`CandorError::DuplicateSurvey`] if `survey` was created
    /// before, and with [`CandorError::InvalidTimeRange`] unless
    /// `end_time > start_time`. On success the survey starts `active` and
    /// a `SurveyCreated` event is appended; there are no other side
    /// effects.
    pub fn create_survey(
        &self,
        survey: SurveyId,
        name: impl Into<String>,
        start_time: u64,
        end_time: u64,
    ) -> Result<()> {
        let now = self.read_clock()?;
        let mut surveys = self.surveys().write();
        if surveys.contains_key(&survey) {
            return Err(CandorError::DuplicateSurvey { survey });
        }
        if end_time <= start_time {
            return Err(CandorError::InvalidTimeRange {
                start: start_time,
                end: end_time,
            });
        }

        let meta = SurveyMetadata {
            name: name.into(),
            start_time,
            end_time,
            active: true,
        };
        let record = EventRecord {
            survey_id: survey,
            at: now,
            kind: EventKind::SurveyCreated {
                name: meta.name.clone(),
                start_time,
                end_time,
            },
        };
        let cell: SurveyCell = Arc::new(RwLock::new(SurveyState::new(meta)));
        surveys.insert(survey, cell);
        self.sink().append(record);

        info!(survey = %survey, start_time, end_time, "survey created");
        Ok(())
    }

    /// Close a survey for good.
    ///
    /// Fails with [`CandorError::SurveyAlreadyClosed`] if the survey is
    /// already inactive (an identifier that was never created has no live
    /// state and reports the same), and with
    /// [`CandorError::SurveyStillInProgress`] while the clock has not
    /// passed `end_time`. There is no reopen operation.
    pub fn close_survey(&self, survey: SurveyId) -> Result<()> {
        let now = self.read_clock()?;
        let cell = self
            .cell(survey)
            .ok_or(CandorError::SurveyAlreadyClosed { survey })?;
        let mut state = cell.write();

        if !state.meta.active {
            return Err(CandorError::SurveyAlreadyClosed { survey });
        }
        if now <= state.meta.end_time {
            return Err(CandorError::SurveyStillInProgress {
                survey,
                end: state.meta.end_time,
            });
        }

        state.meta.active = false;
        info!(survey = %survey, "survey closed");
        Ok(())
    }

    /// Pure predicate: would a submission at `now` be accepted?
    ///
    /// True iff the survey exists, is active, and `now` lies inside its
    /// window. Never mutates.
    pub fn is_submission_window_open(&self, survey: SurveyId, now: u64) -> bool {
        self.cell(survey).is_some_and(|cell| {
            let state = cell.read();
            state.meta.active && state.meta.window_contains(now)
        })
    }

    /// Snapshot a survey's metadata, if it exists.
    pub fn survey(&self, survey: SurveyId) -> Option<SurveyMetadata> {
        self.cell(survey).map(|cell| cell.read().meta.clone())
    }
}
