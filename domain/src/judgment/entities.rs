//! Judgment entities

use super::photo_change::PhotoChangeAnswers;
use crate::core::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Kind of crowd task a judgment answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    RateTranscription,
    Categorization,
    PhotoChange,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::RateTranscription => "rate_transcription",
            TaskKind::Categorization => "categorization",
            TaskKind::PhotoChange => "photo_change",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "rate_transcription" | "rates" => Ok(TaskKind::RateTranscription),
            "categorization" | "categories" => Ok(TaskKind::Categorization),
            "photo_change" => Ok(TaskKind::PhotoChange),
            other => Err(DomainError::InvalidTaskKind(other.to_string())),
        }
    }
}

/// Key that groups judgments of the same work unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrelationKey {
    /// A single photo asset
    Asset(String),
    /// A new photo compared against the old one
    AssetPair { new_asset_id: String, old_asset_id: String },
}

impl std::fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorrelationKey::Asset(id) => write!(f, "{id}"),
            CorrelationKey::AssetPair {
                new_asset_id,
                old_asset_id,
            } => write!(f, "{new_asset_id}/{old_asset_id}"),
        }
    }
}

/// What a worker answered, by task kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JudgmentAnswer {
    /// Free-form transcription of a rate sign
    Rate {
        #[serde(default)]
        text: String,
        #[serde(default)]
        no_rates_present: bool,
    },
    /// Multi-select of category labels
    Category {
        #[serde(default)]
        labels: BTreeSet<String>,
        #[serde(default)]
        does_not_match: bool,
    },
    /// Comparison of a new photo with the previous one
    PhotoChange {
        new_asset_id: String,
        old_asset_id: String,
        #[serde(default)]
        answers: PhotoChangeAnswers,
    },
}

/// One worker's answer-set for one unit of work.
///
/// Judgments are fetched from the marketplace and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgment {
    pub work_unit_id: String,
    /// Unique per judgment; used to accept or reject it
    pub assignment_id: String,
    pub worker_id: String,
    pub submitted_at: DateTime<Utc>,
    pub answer: JudgmentAnswer,
}

impl Judgment {
    pub fn task_kind(&self) -> TaskKind {
        match self.answer {
            JudgmentAnswer::Rate { .. } => TaskKind::RateTranscription,
            JudgmentAnswer::Category { .. } => TaskKind::Categorization,
            JudgmentAnswer::PhotoChange { .. } => TaskKind::PhotoChange,
        }
    }

    /// Photo-change judgments correlate on the asset pair; everything else
    /// on the work unit.
    pub fn correlation_key(&self) -> CorrelationKey {
        match &self.answer {
            JudgmentAnswer::PhotoChange {
                new_asset_id,
                old_asset_id,
                ..
            } => CorrelationKey::AssetPair {
                new_asset_id: new_asset_id.clone(),
                old_asset_id: old_asset_id.clone(),
            },
            _ => CorrelationKey::Asset(self.work_unit_id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judgment::answer::Answer;

    fn judgment(answer: JudgmentAnswer) -> Judgment {
        Judgment {
            work_unit_id: "asset-1".to_string(),
            assignment_id: "A1".to_string(),
            worker_id: "W1".to_string(),
            submitted_at: DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            answer,
        }
    }

    #[test]
    fn test_task_kind_and_key() {
        let rate = judgment(JudgmentAnswer::Rate {
            text: "1 hr $3".to_string(),
            no_rates_present: false,
        });
        assert_eq!(rate.task_kind(), TaskKind::RateTranscription);
        assert_eq!(rate.correlation_key(), CorrelationKey::Asset("asset-1".into()));

        let change = judgment(JudgmentAnswer::PhotoChange {
            new_asset_id: "new".to_string(),
            old_asset_id: "old".to_string(),
            answers: PhotoChangeAnswers::default(),
        });
        assert_eq!(change.task_kind(), TaskKind::PhotoChange);
        assert_eq!(change.correlation_key().to_string(), "new/old");
    }

    #[test]
    fn test_task_kind_from_str() {
        assert_eq!("rates".parse::<TaskKind>().unwrap(), TaskKind::RateTranscription);
        assert_eq!("photo-change".parse::<TaskKind>().unwrap(), TaskKind::PhotoChange);
        assert!("bogus".parse::<TaskKind>().is_err());
    }

    #[test]
    fn test_deserialize_tagged_answers() {
        let json = r#"{
            "work_unit_id": "asset-9",
            "assignment_id": "A9",
            "worker_id": "W9",
            "submitted_at": "2024-03-01T10:00:00Z",
            "answer": {
                "kind": "photo_change",
                "new_asset_id": "n",
                "old_asset_id": "o",
                "answers": {"same_sign": "yes", "new_has_extra_rates": "no",
                            "old_has_extra_rates": "no", "same_prices": "yes"}
            }
        }"#;
        let parsed: Judgment = serde_json::from_str(json).unwrap();
        match parsed.answer {
            JudgmentAnswer::PhotoChange { answers, .. } => {
                assert_eq!(answers.same_sign, Answer::Yes);
                assert_eq!(answers.same_prices, Answer::Yes);
            }
            other => panic!("unexpected answer {other:?}"),
        }

        let json = r#"{"kind": "category", "labels": ["rates", "hours"]}"#;
        let answer: JudgmentAnswer = serde_json::from_str(json).unwrap();
        assert_eq!(
            answer,
            JudgmentAnswer::Category {
                labels: BTreeSet::from(["hours".to_string(), "rates".to_string()]),
                does_not_match: false,
            }
        );
    }
}
