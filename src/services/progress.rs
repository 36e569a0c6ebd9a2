use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::domain::leveling::Progress;
use crate::domain::quests::{self, CompletionEvent, DailyQuest, QuestBook};
use crate::mirror::LocalMirror;

/// What a quiz completion did to the user's progress. `synced` is false when
/// the store could not be updated and the local mirror carried the change;
/// the operation itself never fails.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOutcome {
    pub progress: Progress,
    pub levels_gained: i32,
    pub earned_xp: i32,
    pub completed_quests: Vec<DailyQuest>,
    pub synced: bool,
}

/// Reconciles quiz/quest completions and XP against the store, mirroring
/// every change to the local fallback. Store and mirror form a two-tier
/// setup: Postgres is the source of truth, the mirror covers outages.
pub struct ProgressLedger {
    pool: PgPool,
    mirror: Arc<LocalMirror>,
    quest_book: Arc<QuestBook>,
}

impl ProgressLedger {
    pub fn new(pool: PgPool, mirror: Arc<LocalMirror>, quest_book: Arc<QuestBook>) -> Self {
        ProgressLedger {
            pool,
            mirror,
            quest_book,
        }
    }

    /// Record a finished quiz: append the completion fact, fire daily quests,
    /// grant XP through the leveling rule, and persist the new counters.
    pub async fn complete_quiz(
        &self,
        user_id: Uuid,
        quiz_id: &str,
        category: &str,
        score: i32,
        earned_xp: i32,
    ) -> CompletionOutcome {
        let today = quests::reset_key(Utc::now());
        self.ensure_window(user_id, &today).await;

        let mut synced = true;

        if let Err(err) =
            db::insert_quiz_completion(&self.pool, user_id, quiz_id, score, earned_xp, &today).await
        {
            tracing::warn!("failed to record quiz completion for {user_id}: {err}");
            synced = false;
        }
        if let Err(err) = self.mirror.push_completed_quiz(user_id, quiz_id).await {
            tracing::debug!("mirror quiz write failed for {user_id}: {err}");
        }

        let already_done: HashSet<String> =
            match db::quest_ids_for_day(&self.pool, user_id, &today).await {
                Ok(ids) => ids.into_iter().collect(),
                Err(err) => {
                    tracing::warn!("quest lookup failed for {user_id}, using mirror: {err}");
                    synced = false;
                    self.mirror.completed_quests(user_id).await.into_iter().collect()
                }
            };

        let distinct_quizzes_today =
            match db::distinct_quiz_count_for_day(&self.pool, user_id, &today).await {
                Ok(count) => count.max(0) as u32,
                Err(err) => {
                    // The mirror keeps no per-day quiz facts, so only this
                    // completion is counted; streak quests wait for the store.
                    tracing::warn!("quiz count lookup failed for {user_id}: {err}");
                    synced = false;
                    1
                }
            };

        let event = CompletionEvent {
            category: category.to_string(),
            score,
            distinct_quizzes_today,
        };

        let mut completed_quests: Vec<DailyQuest> = Vec::new();
        for quest in self.quest_book.newly_completed(&event, &already_done) {
            let inserted =
                match db::insert_quest_completion(&self.pool, user_id, &quest.id, &today).await {
                    Ok(inserted) => inserted,
                    Err(err) => {
                        // `already_done` came from the mirror in this case, so
                        // membership was checked there.
                        tracing::warn!("failed to record quest {} for {user_id}: {err}", quest.id);
                        synced = false;
                        true
                    }
                };
            if let Err(err) = self.mirror.push_completed_quest(user_id, &quest.id).await {
                tracing::debug!("mirror quest write failed for {user_id}: {err}");
            }
            if inserted {
                completed_quests.push(quest.clone());
            }
        }

        let total_earned =
            earned_xp.max(0) + completed_quests.iter().map(|q| q.xp_reward).sum::<i32>();

        let (progress, levels_gained) = match db::get_profile(&self.pool, user_id).await {
            Ok(Some(profile)) => {
                let mut progress = profile.progress();
                let gained = progress.gain(total_earned);
                if let Err(err) = db::update_progress(&self.pool, user_id, progress).await {
                    tracing::warn!("failed to persist progress for {user_id}: {err}");
                    synced = false;
                }
                (progress, gained)
            }
            Ok(None) => {
                tracing::warn!("no profile for {user_id}, progress not applied");
                synced = false;
                (Progress::starting(), 0)
            }
            Err(err) => {
                tracing::warn!("profile lookup failed for {user_id}: {err}");
                synced = false;
                (Progress::starting(), 0)
            }
        };

        CompletionOutcome {
            progress,
            levels_gained,
            earned_xp: total_earned,
            completed_quests,
            synced,
        }
    }

    /// Quest ids completed in the current daily window.
    pub async fn completed_quests_today(&self, user_id: Uuid) -> HashSet<String> {
        let today = quests::reset_key(Utc::now());
        self.ensure_window(user_id, &today).await;
        match db::quest_ids_for_day(&self.pool, user_id, &today).await {
            Ok(ids) => ids.into_iter().collect(),
            Err(err) => {
                tracing::debug!("quest lookup failed for {user_id}, using mirror: {err}");
                self.mirror.completed_quests(user_id).await.into_iter().collect()
            }
        }
    }

    /// Session-start reconciliation: roll the daily window if the calendar
    /// day changed, push mirror-only quest facts into the store, then refresh
    /// the mirror from the store. Everything here is best-effort.
    pub async fn sync_on_login(&self, user_id: Uuid) {
        let today = quests::reset_key(Utc::now());
        self.ensure_window(user_id, &today).await;

        for quest_id in self.mirror.completed_quests(user_id).await {
            if let Err(err) =
                db::insert_quest_completion(&self.pool, user_id, &quest_id, &today).await
            {
                tracing::debug!("reconcile paused, store unavailable: {err}");
                return;
            }
        }

        match db::quest_ids_for_day(&self.pool, user_id, &today).await {
            Ok(ids) => {
                if let Err(err) = self.mirror.store_completed_quests(user_id, &ids).await {
                    tracing::debug!("mirror refresh failed for {user_id}: {err}");
                }
            }
            Err(err) => tracing::debug!("quest refresh failed for {user_id}: {err}"),
        }

        match db::all_completed_quiz_ids(&self.pool, user_id).await {
            Ok(ids) => {
                if let Err(err) = self.mirror.store_completed_quizzes(user_id, &ids).await {
                    tracing::debug!("mirror refresh failed for {user_id}: {err}");
                }
            }
            Err(err) => tracing::debug!("quiz refresh failed for {user_id}: {err}"),
        }
    }

    /// Drop mirrored quest completions from previous days. The store needs no
    /// reset: its facts are keyed by reset_date.
    async fn ensure_window(&self, user_id: Uuid, today: &str) {
        let last = self.mirror.last_quest_reset(user_id).await;
        if last.as_deref() != Some(today) {
            if let Err(err) = self.mirror.reset_quests(user_id, today).await {
                tracing::debug!("daily quest reset failed for {user_id}: {err}");
            }
        }
    }
}
