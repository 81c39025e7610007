//! Directory-backed marketplace
//!
//! Stands in for the crowd-task marketplace API with exported files:
//!
//! - `<dir>/<batch_id>.json`: array of submitted judgments
//! - `<dir>/<batch_id>.settled.json`: accept/reject verdicts written back

use crate::storage::{read_json, write_json_atomic};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ratecard_application::ports::marketplace::{MarketplaceError, MarketplaceGateway};
use ratecard_domain::Judgment;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Verdict recorded for one assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettledAssignment {
    pub verdict: Verdict,
    pub feedback: String,
    pub settled_at: DateTime<Utc>,
}

pub struct FileMarketplace {
    dir: PathBuf,
    /// assignment_id -> batch_id, filled by `list_judgments`
    assignments: Mutex<HashMap<String, String>>,
}

impl FileMarketplace {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            assignments: Mutex::new(HashMap::new()),
        }
    }

    pub fn batch_path(&self, batch_id: &str) -> PathBuf {
        self.dir.join(format!("{batch_id}.json"))
    }

    pub fn settled_path(&self, batch_id: &str) -> PathBuf {
        self.dir.join(format!("{batch_id}.settled.json"))
    }

    /// Verdicts written so far for a batch
    pub async fn settled(
        &self,
        batch_id: &str,
    ) -> Result<BTreeMap<String, SettledAssignment>, MarketplaceError> {
        load(&self.settled_path(batch_id)).await
    }

    async fn settle(
        &self,
        assignment_id: &str,
        verdict: Verdict,
        feedback: &str,
    ) -> Result<(), MarketplaceError> {
        // Held for the whole read-modify-write so verdicts never interleave.
        let assignments = self.assignments.lock().await;
        let batch_id = assignments.get(assignment_id).ok_or_else(|| {
            MarketplaceError::Other(format!("unknown assignment: {assignment_id}"))
        })?;

        let path = self.settled_path(batch_id);
        let mut settled = load(&path).await?;
        if settled.contains_key(assignment_id) {
            return Err(MarketplaceError::AlreadyTerminal(assignment_id.to_string()));
        }

        settled.insert(
            assignment_id.to_string(),
            SettledAssignment {
                verdict,
                feedback: feedback.to_string(),
                settled_at: Utc::now(),
            },
        );
        write_json_atomic(&path, &settled)
            .await
            .map_err(|e| MarketplaceError::Transient(format!("{}: {}", path.display(), e)))?;

        debug!("{} {:?} in batch {}", assignment_id, verdict, batch_id);
        Ok(())
    }
}

async fn load(path: &Path) -> Result<BTreeMap<String, SettledAssignment>, MarketplaceError> {
    read_json(path)
        .await
        .map(Option::unwrap_or_default)
        .map_err(|e| MarketplaceError::Other(format!("{}: {}", path.display(), e)))
}

#[async_trait]
impl MarketplaceGateway for FileMarketplace {
    async fn list_judgments(&self, batch_id: &str) -> Result<Vec<Judgment>, MarketplaceError> {
        let path = self.batch_path(batch_id);
        let judgments: Vec<Judgment> = match read_json(&path).await {
            Ok(Some(judgments)) => judgments,
            Ok(None) => return Err(MarketplaceError::BatchNotFound(batch_id.to_string())),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(MarketplaceError::Other(format!(
                    "{}: {}",
                    path.display(),
                    e
                )));
            }
            Err(e) => {
                return Err(MarketplaceError::Transient(format!(
                    "{}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let mut assignments = self.assignments.lock().await;
        for judgment in &judgments {
            assignments.insert(judgment.assignment_id.clone(), batch_id.to_string());
        }

        info!("Loaded {} judgments from {}", judgments.len(), path.display());
        Ok(judgments)
    }

    async fn accept(&self, assignment_id: &str, feedback: &str) -> Result<(), MarketplaceError> {
        self.settle(assignment_id, Verdict::Accepted, feedback).await
    }

    async fn reject(&self, assignment_id: &str, feedback: &str) -> Result<(), MarketplaceError> {
        self.settle(assignment_id, Verdict::Rejected, feedback).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATCH: &str = r#"[
        {
            "work_unit_id": "asset-1",
            "assignment_id": "A1",
            "worker_id": "W1",
            "submitted_at": "2024-03-01T10:00:00Z",
            "answer": {"kind": "rate", "text": "Evenings $11"}
        },
        {
            "work_unit_id": "asset-1",
            "assignment_id": "A2",
            "worker_id": "W2",
            "submitted_at": "2024-03-01T10:05:00Z",
            "answer": {"kind": "rate", "no_rates_present": true}
        }
    ]"#;

    fn marketplace_with_batch() -> (tempfile::TempDir, FileMarketplace) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("batch-1.json"), BATCH).unwrap();
        let marketplace = FileMarketplace::new(dir.path());
        (dir, marketplace)
    }

    #[tokio::test]
    async fn test_list_judgments() {
        let (_dir, marketplace) = marketplace_with_batch();

        let judgments = marketplace.list_judgments("batch-1").await.unwrap();

        assert_eq!(judgments.len(), 2);
        assert_eq!(judgments[0].assignment_id, "A1");
    }

    #[tokio::test]
    async fn test_missing_batch() {
        let (_dir, marketplace) = marketplace_with_batch();

        let result = marketplace.list_judgments("batch-2").await;
        assert_eq!(
            result.unwrap_err(),
            MarketplaceError::BatchNotFound("batch-2".to_string())
        );
    }

    #[tokio::test]
    async fn test_verdicts_are_written_back() {
        let (_dir, marketplace) = marketplace_with_batch();
        marketplace.list_judgments("batch-1").await.unwrap();

        marketplace.accept("A1", "Approved").await.unwrap();
        marketplace.reject("A2", "Nope").await.unwrap();

        let settled = marketplace.settled("batch-1").await.unwrap();
        assert_eq!(settled["A1"].verdict, Verdict::Accepted);
        assert_eq!(settled["A1"].feedback, "Approved");
        assert_eq!(settled["A2"].verdict, Verdict::Rejected);
    }

    #[tokio::test]
    async fn test_second_settlement_is_already_terminal() {
        let (dir, marketplace) = marketplace_with_batch();
        marketplace.list_judgments("batch-1").await.unwrap();
        marketplace.accept("A1", "Approved").await.unwrap();

        // A fresh adapter (next run) sees the verdict on disk.
        let next_run = FileMarketplace::new(dir.path());
        next_run.list_judgments("batch-1").await.unwrap();
        let result = next_run.reject("A1", "Changed my mind").await;

        assert!(result.unwrap_err().is_already_terminal());
    }

    #[tokio::test]
    async fn test_unknown_assignment() {
        let (_dir, marketplace) = marketplace_with_batch();

        let result = marketplace.accept("A1", "Approved").await;
        assert!(matches!(result, Err(MarketplaceError::Other(_))));
    }
}
