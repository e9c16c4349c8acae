use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::models::submission::{SavedProgress, Submission};

/// Transient marker holding resume context between the dashboard and
/// the coding/interview steps.
pub const CURRENT_SUBMISSION_KEY: &str = "current-submission";

pub fn submission_key(id: &str) -> String {
    format!("submission:{}", id)
}

pub fn progress_key(test_id: &str, problem_id: &str) -> String {
    format!("progress:{}:{}", test_id, problem_id)
}

/// String-key to JSON-value record store backed by one file per key.
///
/// There is no schema version tag and no locking: readers discard
/// absent or malformed entries, and concurrent writers to the same key
/// race read-modify-write with last-write-wins.
#[derive(Clone, Debug)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root.join(format!("{}.json", name))
    }

    /// Typed read. Absent keys and records that fail to decode both
    /// yield `None`; corrupt records are logged and left in place.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key);
        let raw = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(_) => return None,
        };
        match serde_json::from_slice(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding malformed record");
                None
            }
        }
    }

    /// Atomic write: the full record lands under the key or nothing
    /// does (temp file + rename).
    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let raw = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_with_prefix<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>> {
        let mut out = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
            Err(e) => return Err(e.into()),
        };
        let file_prefix = self
            .path_for(prefix)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.starts_with(&file_prefix) || !name.ends_with(".json") {
                continue;
            }
            if let Ok(raw) = tokio::fs::read(entry.path()).await {
                match serde_json::from_slice(&raw) {
                    Ok(value) => out.push(value),
                    Err(e) => tracing::warn!(file = name, error = %e, "Skipping malformed record"),
                }
            }
        }
        Ok(out)
    }
}

/// Typed repository over the record store for submissions, saved
/// progress, and the transient current-submission marker.
#[derive(Clone, Debug)]
pub struct SubmissionStore {
    store: RecordStore,
}

impl SubmissionStore {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub async fn get_submission(&self, id: &str) -> Option<Submission> {
        self.store.get(&submission_key(id)).await
    }

    pub async fn put_submission(&self, submission: &Submission) -> Result<()> {
        self.store
            .put(&submission_key(&submission.id), submission)
            .await
    }

    pub async fn list_submissions(&self) -> Result<Vec<Submission>> {
        let mut subs: Vec<Submission> = self.store.list_with_prefix("submission:").await?;
        subs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(subs)
    }

    pub async fn get_progress(&self, test_id: &str, problem_id: &str) -> Option<SavedProgress> {
        self.store.get(&progress_key(test_id, problem_id)).await
    }

    pub async fn put_progress(
        &self,
        test_id: &str,
        problem_id: &str,
        progress: &SavedProgress,
    ) -> Result<()> {
        self.store
            .put(&progress_key(test_id, problem_id), progress)
            .await
    }

    pub async fn clear_progress(&self, test_id: &str, problem_id: &str) -> Result<()> {
        self.store.delete(&progress_key(test_id, problem_id)).await
    }

    pub async fn get_current(&self) -> Option<Submission> {
        self.store.get(CURRENT_SUBMISSION_KEY).await
    }

    pub async fn put_current(&self, submission: &Submission) -> Result<()> {
        self.store.put(CURRENT_SUBMISSION_KEY, submission).await
    }

    pub async fn clear_current(&self) -> Result<()> {
        self.store.delete(CURRENT_SUBMISSION_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submission::TestResult;
    use chrono::Utc;

    fn temp_store() -> (tempfile::TempDir, SubmissionStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SubmissionStore::new(RecordStore::new(dir.path()));
        (dir, store)
    }

    #[tokio::test]
    async fn round_trips_a_submission() {
        let (_dir, store) = temp_store();
        let submission = Submission {
            id: "sub-1".into(),
            resume_text: "ten years of Rust".into(),
            resume_skills: vec!["rust".into(), "sql".into()],
            coding_score: 75,
            coding_results: vec![TestResult {
                test_case_id: 1,
                passed: true,
                output: "Passed".into(),
            }],
            created_at: Some(Utc::now()),
            ..Default::default()
        };
        store.put_submission(&submission).await.unwrap();

        let loaded = store.get_submission("sub-1").await.expect("present");
        assert_eq!(loaded.coding_score, 75);
        assert_eq!(loaded.resume_skills, submission.resume_skills);
        assert!(loaded.interview_score.is_none());
    }

    #[tokio::test]
    async fn absent_and_malformed_records_are_discarded() {
        let (dir, store) = temp_store();
        assert!(store.get_submission("missing").await.is_none());

        let path = dir.path().join("submission_bad.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();
        let got: Option<Submission> = RecordStore::new(dir.path()).get("submission:bad").await;
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn progress_is_scoped_per_test_and_problem() {
        let (_dir, store) = temp_store();
        let progress = SavedProgress {
            code: "var f = function() {};".into(),
            language: "javascript".into(),
        };
        store.put_progress("t1", "p1", &progress).await.unwrap();

        assert!(store.get_progress("t1", "p1").await.is_some());
        assert!(store.get_progress("t1", "p2").await.is_none());

        store.clear_progress("t1", "p1").await.unwrap();
        assert!(store.get_progress("t1", "p1").await.is_none());
    }

    #[tokio::test]
    async fn listing_skips_non_submission_keys() {
        let (_dir, store) = temp_store();
        store
            .put_submission(&Submission {
                id: "a".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .put_progress(
                "t1",
                "p1",
                &SavedProgress {
                    code: String::new(),
                    language: "javascript".into(),
                },
            )
            .await
            .unwrap();

        let listed = store.list_submissions().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "a");
    }
}
