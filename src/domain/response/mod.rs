//! Answers: project responses on a 0..5 scale and public responses
//! restricted to No / Partial / Yes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{
    non_blank, ProjectId, PublicAssessmentId, QuestionId, RespondentId, Timestamp,
    ValidationError,
};

/// Integer maturity score given in a project questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct ProjectScore(u8);

impl ProjectScore {
    pub const MIN: i32 = 0;
    pub const MAX: i32 = 5;

    pub fn new(value: i32) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::out_of_range("score", Self::MIN, Self::MAX, value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i32> for ProjectScore {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProjectScore> for i32 {
    fn from(score: ProjectScore) -> i32 {
        score.0 as i32
    }
}

/// Answer to a public (light) question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum PublicAnswer {
    No,
    Partial,
    Yes,
}

impl PublicAnswer {
    pub fn from_value(value: i32) -> Result<Self, ValidationError> {
        match value {
            0 => Ok(PublicAnswer::No),
            3 => Ok(PublicAnswer::Partial),
            5 => Ok(PublicAnswer::Yes),
            other => Err(ValidationError::not_allowed("value", "0, 3, 5", other)),
        }
    }

    pub fn value(&self) -> u8 {
        match self {
            PublicAnswer::No => 0,
            PublicAnswer::Partial => 3,
            PublicAnswer::Yes => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PublicAnswer::No => "No",
            PublicAnswer::Partial => "Partial",
            PublicAnswer::Yes => "Yes",
        }
    }
}

impl fmt::Display for PublicAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<i32> for PublicAnswer {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<PublicAnswer> for i32 {
    fn from(answer: PublicAnswer) -> i32 {
        answer.value() as i32
    }
}

/// The current collaborative answer for one (project, question).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectResponse {
    pub project_id: ProjectId,
    pub question_id: QuestionId,
    /// Member who wrote the current value.
    pub respondent_id: RespondentId,
    pub score: ProjectScore,
    pub comment: Option<String>,
    pub answered_at: Timestamp,
}

/// A write against a project answer. `score == None` un-answers.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseWrite {
    pub project_id: ProjectId,
    pub question_id: QuestionId,
    pub respondent_id: RespondentId,
    pub score: Option<ProjectScore>,
    pub comment: Option<String>,
    pub at: Timestamp,
}

impl ResponseWrite {
    pub fn new(
        project_id: ProjectId,
        question_id: QuestionId,
        respondent_id: RespondentId,
        score: Option<i32>,
        comment: Option<String>,
        at: Timestamp,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            project_id,
            question_id,
            respondent_id,
            score: score.map(ProjectScore::new).transpose()?,
            comment: non_blank(comment),
            at,
        })
    }
}

/// Outcome of applying a [`ResponseWrite`] to the stored row.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// Row created or replaced.
    Stored(ProjectResponse),
    /// Row removed.
    Deleted,
    /// Un-answer on a question that had no answer.
    Unchanged,
    /// A newer answer is already stored; the write was dropped.
    Superseded(ProjectResponse),
}

/// Applies last-write-wins to the stored row of one (project, question).
///
/// Deletion is unconditional. A value write replaces the row only if it is
/// not older than the stored one, so replaying two writes in either order
/// leaves the value carried by the later timestamp.
pub fn apply_write(current: Option<&ProjectResponse>, write: &ResponseWrite) -> WriteOutcome {
    match (current, write.score) {
        (None, None) => WriteOutcome::Unchanged,
        (Some(_), None) => WriteOutcome::Deleted,
        (Some(existing), Some(_)) if existing.answered_at.is_after(&write.at) => {
            WriteOutcome::Superseded(existing.clone())
        }
        (_, Some(score)) => WriteOutcome::Stored(ProjectResponse {
            project_id: write.project_id,
            question_id: write.question_id,
            respondent_id: write.respondent_id,
            score,
            comment: write.comment.clone(),
            answered_at: write.at,
        }),
    }
}

/// An answer inside a public assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicResponse {
    pub public_assessment_id: PublicAssessmentId,
    pub question_id: QuestionId,
    pub value: PublicAnswer,
    pub answered_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(score: Option<i32>, respondent: i64, at: Timestamp) -> ResponseWrite {
        ResponseWrite::new(
            ProjectId::new(1),
            QuestionId::new(1),
            RespondentId::new(respondent),
            score,
            None,
            at,
        )
        .unwrap()
    }

    fn stored(outcome: WriteOutcome) -> ProjectResponse {
        match outcome {
            WriteOutcome::Stored(row) | WriteOutcome::Superseded(row) => row,
            other => panic!("expected a row, got {:?}", other),
        }
    }

    #[test]
    fn project_score_bounds() {
        assert!(ProjectScore::new(0).is_ok());
        assert!(ProjectScore::new(5).is_ok());
        assert_eq!(
            ProjectScore::new(6),
            Err(ValidationError::out_of_range("score", 0, 5, 6))
        );
        assert!(ProjectScore::new(-1).is_err());
    }

    #[test]
    fn public_answer_accepts_only_no_partial_yes() {
        assert_eq!(PublicAnswer::from_value(0).unwrap(), PublicAnswer::No);
        assert_eq!(PublicAnswer::from_value(3).unwrap(), PublicAnswer::Partial);
        assert_eq!(PublicAnswer::from_value(5).unwrap(), PublicAnswer::Yes);
        for bad in [1, 2, 4, 6, -3] {
            assert!(PublicAnswer::from_value(bad).is_err());
        }
    }

    #[test]
    fn public_answer_deserializes_from_integer() {
        let answer: PublicAnswer = serde_json::from_str("3").unwrap();
        assert_eq!(answer, PublicAnswer::Partial);
        assert!(serde_json::from_str::<PublicAnswer>("4").is_err());
    }

    #[test]
    fn unanswer_deletes_only_when_present() {
        let t = Timestamp::now();
        assert_eq!(apply_write(None, &write(None, 1, t)), WriteOutcome::Unchanged);
        let row = stored(apply_write(None, &write(Some(3), 1, t)));
        assert_eq!(apply_write(Some(&row), &write(None, 1, t)), WriteOutcome::Deleted);
    }

    #[test]
    fn later_write_wins_in_either_order() {
        let early = Timestamp::now();
        let late = early.plus_seconds(10);
        let a = write(Some(2), 1, early);
        let b = write(Some(4), 2, late);

        let forward = stored(apply_write(Some(&stored(apply_write(None, &a))), &b));
        let backward = stored(apply_write(Some(&stored(apply_write(None, &b))), &a));

        assert_eq!(forward.score.value(), 4);
        assert_eq!(backward.score.value(), 4);
        assert_eq!(forward.respondent_id, RespondentId::new(2));
    }

    #[test]
    fn write_rejects_out_of_range_score() {
        let err = ResponseWrite::new(
            ProjectId::new(1),
            QuestionId::new(1),
            RespondentId::new(1),
            Some(9),
            None,
            Timestamp::now(),
        )
        .unwrap_err();
        assert_eq!(err.field(), "score");
    }
}
