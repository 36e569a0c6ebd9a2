use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::catalog::QuizCatalog;
use crate::domain::quests::QuestBook;
use crate::middleware::RateLimiter;
use crate::services::ai::AiService;
use crate::services::bank::QuestionBank;
use crate::services::generator::QuestionProvider;
use crate::services::progress::ProgressLedger;

/// Everything a request handler needs, wired once at startup. Catalog and
/// quest book are explicit configuration records here rather than globals.
pub struct AppState {
    pub pool: PgPool,
    pub catalog: Arc<QuizCatalog>,
    pub quest_book: Arc<QuestBook>,
    pub bank: QuestionBank,
    pub provider: Arc<QuestionProvider>,
    pub ai: Option<Arc<AiService>>,
    pub ledger: Arc<ProgressLedger>,
    pub generator_configured: bool,
    /// Bearer token required by the generation endpoint, when one is set.
    pub generate_token: Option<String>,
    pub session_key: Vec<u8>,
    pub auth_limiter: RateLimiter,
}

pub type SharedState = Arc<AppState>;
