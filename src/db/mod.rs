use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::leveling::Progress;

#[derive(Debug, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub email: String,
    pub hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct ProfileRow {
    pub user_id: Uuid,
    pub name: String,
    pub level: i32,
    pub xp: i32,
    pub xp_to_next_level: i32,
    pub personal_info: Option<serde_json::Value>,
}

impl ProfileRow {
    pub fn progress(&self) -> Progress {
        Progress {
            level: self.level,
            xp: self.xp,
            xp_to_next_level: self.xp_to_next_level,
        }
    }
}

/// Create the account and its profile in one transaction so a failed profile
/// insert cannot leave a user without progress counters.
pub async fn create_user(
    pool: &PgPool,
    id: Uuid,
    email: &str,
    hash: &str,
    name: &str,
    progress: Progress,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO users (id, email, hash, name)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(hash)
    .bind(name)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO user_profiles (user_id, name, level, xp, xp_to_next_level)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(progress.level)
    .bind(progress.xp)
    .bind(progress.xp_to_next_level)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, email, hash, name, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, email, hash, name, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<Option<ProfileRow>> {
    let profile = sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT user_id, name, level, xp, xp_to_next_level, personal_info
        FROM user_profiles
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(profile)
}

pub async fn update_progress(pool: &PgPool, user_id: Uuid, progress: Progress) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE user_profiles
        SET level = $2,
            xp = $3,
            xp_to_next_level = $4,
            updated_at = NOW()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(progress.level)
    .bind(progress.xp)
    .bind(progress.xp_to_next_level)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn set_personal_info(
    pool: &PgPool,
    user_id: Uuid,
    personal_info: &serde_json::Value,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE user_profiles
        SET personal_info = $2,
            updated_at = NOW()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(personal_info)
    .execute(pool)
    .await?;
    Ok(())
}

// ========== Completion facts ==========

pub async fn insert_quiz_completion(
    pool: &PgPool,
    user_id: Uuid,
    quiz_id: &str,
    score: i32,
    earned_xp: i32,
    reset_date: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_quiz_completions (user_id, quiz_id, score, earned_xp, reset_date)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .bind(score)
    .bind(earned_xp)
    .bind(reset_date)
    .execute(pool)
    .await?;
    Ok(())
}

/// Returns whether a row was actually inserted; a quest already recorded for
/// this window leaves the table untouched.
pub async fn insert_quest_completion(
    pool: &PgPool,
    user_id: Uuid,
    quest_id: &str,
    reset_date: &str,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO user_quest_completions (user_id, quest_id, reset_date)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, quest_id, reset_date) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(quest_id)
    .bind(reset_date)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn quest_ids_for_day(
    pool: &PgPool,
    user_id: Uuid,
    reset_date: &str,
) -> Result<Vec<String>> {
    let ids = sqlx::query_scalar::<_, String>(
        r#"
        SELECT quest_id
        FROM user_quest_completions
        WHERE user_id = $1
          AND reset_date = $2
        ORDER BY completed_at ASC
        "#,
    )
    .bind(user_id)
    .bind(reset_date)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

pub async fn distinct_quiz_count_for_day(
    pool: &PgPool,
    user_id: Uuid,
    reset_date: &str,
) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(DISTINCT quiz_id)
        FROM user_quiz_completions
        WHERE user_id = $1
          AND reset_date = $2
        "#,
    )
    .bind(user_id)
    .bind(reset_date)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn all_completed_quiz_ids(pool: &PgPool, user_id: Uuid) -> Result<Vec<String>> {
    let ids = sqlx::query_scalar::<_, String>(
        r#"
        SELECT DISTINCT quiz_id
        FROM user_quiz_completions
        WHERE user_id = $1
        ORDER BY quiz_id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

/// Cheap connectivity probe for the status endpoint.
pub async fn ping(pool: &PgPool) -> Result<()> {
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}
