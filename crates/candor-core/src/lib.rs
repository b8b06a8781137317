//! Shared vocabulary for the Candor encrypted response ledger.
//!
//! This crate holds the identifier newtypes and the closed error taxonomy
//! used across every Candor operation. It deliberately contains no state
//! and no collaborator interfaces; those live in `candor-crypto` and
//! `candor-ledger`.

mod errors;
pub mod identifiers;

pub use errors::{CandorError, Result};
pub use identifiers::{DepartmentId, QuestionId, ResponseIndex, SurveyId};
