//! Judgments: one worker's answer-set for one unit of work
//!
//! A single tagged [`JudgmentAnswer`] covers every task kind; photo-change
//! questions are described by the [`PhotoChangeQuestion`] schema.

pub mod answer;
pub mod entities;
pub mod photo_change;

pub use answer::Answer;
pub use entities::{CorrelationKey, Judgment, JudgmentAnswer, TaskKind};
pub use photo_change::{InvalidPattern, PhotoChangeAnswers, PhotoChangeQuestion};
