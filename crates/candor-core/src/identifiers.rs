//! Identifier newtypes for surveys, departments, questions, and response
//! positions.
//!
//! All identifiers are caller-supplied and accepted as given; the ledger
//! never validates them against an external registry. The newtypes exist so
//! that a department cannot be passed where a survey is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-supplied key for a survey.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SurveyId(pub u64);

impl SurveyId {
    /// Create a survey id from its raw value
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for SurveyId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for SurveyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "survey-{}", self.0)
    }
}

/// Department identifier scoping a response lane within a survey.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct DepartmentId(pub u32);

impl From<u32> for DepartmentId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dept-{}", self.0)
    }
}

/// Question identifier carried on a response.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct QuestionId(pub u32);

impl From<u32> for QuestionId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "question-{}", self.0)
    }
}

/// Dense, zero-based position of a response within its
/// `(survey, department)` lane.
///
/// Indices are assigned in strict submission order and are never reused or
/// skipped, so an index handed out by `submit` stays valid for the lifetime
/// of the ledger.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ResponseIndex(pub u64);

impl ResponseIndex {
    /// First position in a lane
    pub const ZERO: Self = Self(0);

    /// Create an index from its raw value
    pub fn new(index: u64) -> Self {
        Self(index)
    }

    /// Get the raw value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The position following this one
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u64> for ResponseIndex {
    fn from(index: u64) -> Self {
        Self(index)
    }
}

impl fmt::Display for ResponseIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
