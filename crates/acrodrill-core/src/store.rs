//! Progress store backends: in-memory and one-directory-per-user JSON files.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::progress::{
    HistoryMap, ProgressMap, ProgressRecord, QuestionHistoryEntry, SwipeDirection,
};
use crate::traits::{ProgressStore, QuestionOutcome};

#[derive(Debug, Default, Clone)]
struct UserData {
    progress: ProgressMap,
    history: HistoryMap,
}

fn apply_outcomes(history: &mut HistoryMap, outcomes: &[QuestionOutcome], now: DateTime<Utc>) {
    for outcome in outcomes {
        history
            .entry(outcome.question_id.clone())
            .or_insert_with(|| QuestionHistoryEntry::new(outcome.question_id.clone()))
            .record(outcome.correct, now);
    }
}

fn progress_entry<'a>(progress: &'a mut ProgressMap, item_id: &str) -> &'a mut ProgressRecord {
    progress
        .entry(item_id.to_string())
        .or_insert_with(|| ProgressRecord::new(item_id))
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-local store, used by tests and one-shot sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, UserData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load_progress(&self, user: &str) -> anyhow::Result<ProgressMap> {
        let users = self.users.lock().await;
        Ok(users
            .get(user)
            .map(|u| u.progress.clone())
            .unwrap_or_default())
    }

    async fn record_swipe(
        &self,
        user: &str,
        item_id: &str,
        direction: SwipeDirection,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ProgressRecord> {
        let mut users = self.users.lock().await;
        let data = users.entry(user.to_string()).or_default();
        let record = progress_entry(&mut data.progress, item_id);
        record.record_swipe(direction, now);
        Ok(record.clone())
    }

    async fn record_test_answer(
        &self,
        user: &str,
        item_id: &str,
        correct: bool,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ProgressRecord> {
        let mut users = self.users.lock().await;
        let data = users.entry(user.to_string()).or_default();
        let record = progress_entry(&mut data.progress, item_id);
        record.record_test_answer(correct, now);
        Ok(record.clone())
    }

    async fn load_history(&self, user: &str) -> anyhow::Result<HistoryMap> {
        let users = self.users.lock().await;
        Ok(users
            .get(user)
            .map(|u| u.history.clone())
            .unwrap_or_default())
    }

    async fn record_question_results(
        &self,
        user: &str,
        outcomes: &[QuestionOutcome],
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let mut users = self.users.lock().await;
        let data = users.entry(user.to_string()).or_default();
        apply_outcomes(&mut data.history, outcomes, now);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON file store
// ---------------------------------------------------------------------------

const PROGRESS_FILE: &str = "progress.json";
const HISTORY_FILE: &str = "history.json";

/// Stores each user under `<root>/<user>/{progress,history}.json`.
///
/// Writes are serialized through one lock and land via a temp-file rename.
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn user_dir(&self, user: &str) -> Result<PathBuf, StoreError> {
        let valid = !user.is_empty()
            && !user.starts_with('.')
            && user
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));
        if !valid {
            return Err(StoreError::InvalidUser(user.to_string()));
        }
        Ok(self.root.join(user))
    }

    async fn read_map<T>(&self, path: &Path) -> Result<HashMap<String, T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    async fn write_map<T: Serialize>(
        &self,
        path: &Path,
        map: &HashMap<String, T>,
    ) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let sorted: BTreeMap<&String, &T> = map.iter().collect();
        let json = serde_json::to_vec_pretty(&sorted).map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn update_progress(
        &self,
        user: &str,
        item_id: &str,
        apply: impl FnOnce(&mut ProgressRecord) + Send,
    ) -> anyhow::Result<ProgressRecord> {
        let path = self.user_dir(user)?.join(PROGRESS_FILE);
        let _guard = self.write_lock.lock().await;
        let mut progress: ProgressMap = self.read_map(&path).await?;
        let record = progress_entry(&mut progress, item_id);
        apply(record);
        let updated = record.clone();
        self.write_map(&path, &progress).await?;
        tracing::debug!(user, item = item_id, mastery = %updated.mastery, "progress updated");
        Ok(updated)
    }
}

#[async_trait]
impl ProgressStore for JsonFileStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn load_progress(&self, user: &str) -> anyhow::Result<ProgressMap> {
        let path = self.user_dir(user)?.join(PROGRESS_FILE);
        Ok(self.read_map(&path).await?)
    }

    async fn record_swipe(
        &self,
        user: &str,
        item_id: &str,
        direction: SwipeDirection,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ProgressRecord> {
        self.update_progress(user, item_id, |r| r.record_swipe(direction, now))
            .await
    }

    async fn record_test_answer(
        &self,
        user: &str,
        item_id: &str,
        correct: bool,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ProgressRecord> {
        self.update_progress(user, item_id, |r| r.record_test_answer(correct, now))
            .await
    }

    async fn load_history(&self, user: &str) -> anyhow::Result<HistoryMap> {
        let path = self.user_dir(user)?.join(HISTORY_FILE);
        Ok(self.read_map(&path).await?)
    }

    async fn record_question_results(
        &self,
        user: &str,
        outcomes: &[QuestionOutcome],
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let path = self.user_dir(user)?.join(HISTORY_FILE);
        let _guard = self.write_lock.lock().await;
        let mut history: HistoryMap = self.read_map(&path).await?;
        apply_outcomes(&mut history, outcomes, now);
        self.write_map(&path, &history).await?;
        tracing::info!(user, questions = outcomes.len(), "question history recorded");
        Ok(())
    }
}
