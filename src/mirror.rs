use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

/// File-backed mirror of per-user progress facts, keyed the way the web
/// client keyed its local storage: `{user_id}_completedQuizzes`,
/// `{user_id}_completedQuests`, `{user_id}_lastQuestReset`.
///
/// The database is the source of truth; the mirror is written best-effort on
/// every progress change and read only when the database is unavailable.
#[derive(Debug, Clone)]
pub struct LocalMirror {
    dir: PathBuf,
}

impl LocalMirror {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        LocalMirror { dir: dir.into() }
    }

    fn key_path(&self, user_id: Uuid, key: &str) -> PathBuf {
        self.dir.join(format!("{user_id}_{key}.json"))
    }

    async fn read_json<T: DeserializeOwned + Default>(&self, path: &Path) -> T {
        match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                tracing::debug!("discarding unreadable mirror file {}: {err}", path.display());
                T::default()
            }),
            Err(_) => T::default(),
        }
    }

    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec(value)?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    pub async fn completed_quizzes(&self, user_id: Uuid) -> Vec<String> {
        self.read_json(&self.key_path(user_id, "completedQuizzes")).await
    }

    pub async fn completed_quests(&self, user_id: Uuid) -> Vec<String> {
        self.read_json(&self.key_path(user_id, "completedQuests")).await
    }

    pub async fn last_quest_reset(&self, user_id: Uuid) -> Option<String> {
        self.read_json(&self.key_path(user_id, "lastQuestReset")).await
    }

    pub async fn store_completed_quizzes(&self, user_id: Uuid, quiz_ids: &[String]) -> Result<()> {
        self.write_json(&self.key_path(user_id, "completedQuizzes"), &quiz_ids).await
    }

    pub async fn store_completed_quests(&self, user_id: Uuid, quest_ids: &[String]) -> Result<()> {
        self.write_json(&self.key_path(user_id, "completedQuests"), &quest_ids).await
    }

    pub async fn store_last_quest_reset(&self, user_id: Uuid, reset_date: &str) -> Result<()> {
        self.write_json(&self.key_path(user_id, "lastQuestReset"), &Some(reset_date.to_string()))
            .await
    }

    pub async fn push_completed_quiz(&self, user_id: Uuid, quiz_id: &str) -> Result<()> {
        let mut quizzes = self.completed_quizzes(user_id).await;
        if !quizzes.iter().any(|q| q == quiz_id) {
            quizzes.push(quiz_id.to_string());
            self.store_completed_quizzes(user_id, &quizzes).await?;
        }
        Ok(())
    }

    pub async fn push_completed_quest(&self, user_id: Uuid, quest_id: &str) -> Result<()> {
        let mut quests = self.completed_quests(user_id).await;
        if !quests.iter().any(|q| q == quest_id) {
            quests.push(quest_id.to_string());
            self.store_completed_quests(user_id, &quests).await?;
        }
        Ok(())
    }

    /// Start a new daily window: clear quest completions and stamp the date.
    pub async fn reset_quests(&self, user_id: Uuid, reset_date: &str) -> Result<()> {
        self.store_completed_quests(user_id, &[]).await?;
        self.store_last_quest_reset(user_id, reset_date).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn push_and_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = LocalMirror::new(dir.path());
        let user = Uuid::new_v4();

        assert!(mirror.completed_quizzes(user).await.is_empty());

        mirror.push_completed_quiz(user, "dailyTasks-easy").await.unwrap();
        mirror.push_completed_quiz(user, "dailyTasks-easy").await.unwrap();
        mirror.push_completed_quiz(user, "simpleTasks-hard").await.unwrap();

        assert_eq!(
            mirror.completed_quizzes(user).await,
            vec!["dailyTasks-easy".to_string(), "simpleTasks-hard".to_string()]
        );
    }

    #[tokio::test]
    async fn reset_clears_quests_and_stamps_date() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = LocalMirror::new(dir.path());
        let user = Uuid::new_v4();

        mirror.push_completed_quest(user, "quest6").await.unwrap();
        assert_eq!(mirror.completed_quests(user).await, vec!["quest6".to_string()]);

        mirror.reset_quests(user, "2025-03-01").await.unwrap();
        assert!(mirror.completed_quests(user).await.is_empty());
        assert_eq!(mirror.last_quest_reset(user).await.as_deref(), Some("2025-03-01"));
    }

    #[tokio::test]
    async fn corrupt_files_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = LocalMirror::new(dir.path());
        let user = Uuid::new_v4();

        let path = dir.path().join(format!("{user}_completedQuests.json"));
        tokio::fs::write(&path, b"not json").await.unwrap();
        assert!(mirror.completed_quests(user).await.is_empty());
    }
}
