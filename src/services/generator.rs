use anyhow::{bail, Result};
use serde::Serialize;

use crate::config::GeneratorConfig;
use crate::domain::models::{Difficulty, PersonalInfo, Question, RawQuestion};
use crate::services::bank::{QuestionBank, QUESTIONS_PER_QUIZ};

/// Payload sent to the remote question generator. Personal info is attached
/// only when the survey produced something; empty sub-fields are omitted by
/// the model's serialization.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    category: &'a str,
    difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    personal_info: Option<&'a PersonalInfo>,
}

/// The question-loading pipeline: one timed request to the remote generator,
/// and the bank for everything that can go wrong. Results are never cached;
/// each load attempt regenerates from scratch.
pub struct QuestionProvider {
    http: reqwest::Client,
    config: GeneratorConfig,
    bank: QuestionBank,
}

impl QuestionProvider {
    pub fn new(config: GeneratorConfig, bank: QuestionBank) -> Self {
        QuestionProvider {
            http: reqwest::Client::new(),
            config,
            bank,
        }
    }

    /// Always returns a playable, non-empty question set.
    pub async fn load(
        &self,
        category: &str,
        difficulty: Difficulty,
        personal_info: Option<&PersonalInfo>,
    ) -> Vec<Question> {
        let Some((endpoint, token)) = self.config.credentials() else {
            tracing::debug!("question generator not configured, serving bank questions");
            return self.bank.questions(category, difficulty, QUESTIONS_PER_QUIZ);
        };

        match self
            .fetch_remote(endpoint, token, category, difficulty, personal_info)
            .await
        {
            Ok(questions) => questions,
            Err(err) => {
                tracing::warn!("remote question generation failed ({err}), serving bank questions");
                self.bank.questions(category, difficulty, QUESTIONS_PER_QUIZ)
            }
        }
    }

    async fn fetch_remote(
        &self,
        endpoint: &str,
        token: &str,
        category: &str,
        difficulty: Difficulty,
        personal_info: Option<&PersonalInfo>,
    ) -> Result<Vec<Question>> {
        let payload = GenerateRequest {
            category,
            difficulty,
            personal_info: personal_info.filter(|info| !info.is_empty()),
        };

        let url = format!(
            "{}/functions/v1/generate-questions",
            endpoint.trim_end_matches('/')
        );
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .timeout(self.config.timeout)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            bail!("generator responded with {status}");
        }

        let raw: Vec<RawQuestion> = response.json().await?;
        if raw.is_empty() {
            bail!("generator returned an empty question set");
        }

        let questions: Vec<Question> = raw
            .into_iter()
            .enumerate()
            .map(|(index, q)| Question {
                id: format!("{category}-{}-{index}", difficulty.as_str()),
                text: q.text,
                options: q.options,
                correct_answer: q.correct_answer,
                difficulty,
                xp_reward: difficulty.question_xp(),
            })
            .collect();

        // Not rejected, the client renders what it got; noted for diagnostics.
        let inconsistent = questions.iter().filter(|q| !q.is_consistent()).count();
        if inconsistent > 0 {
            tracing::debug!("{inconsistent} remote questions have answers outside their options");
        }

        Ok(questions)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::routing::post;
    use axum::{Json, Router};

    use super::*;

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn provider_for(endpoint: String, timeout: Duration) -> QuestionProvider {
        QuestionProvider::new(
            GeneratorConfig {
                endpoint: Some(endpoint),
                token: Some("stub-token-0123456789abcdef0123".to_string()),
                timeout,
            },
            QuestionBank::default(),
        )
    }

    fn assert_playable(questions: &[Question]) {
        assert_eq!(questions.len(), QUESTIONS_PER_QUIZ);
        for q in questions {
            assert_eq!(q.options.len(), 4);
            assert!(q.is_consistent());
        }
    }

    #[tokio::test]
    async fn unconfigured_generator_short_circuits_to_bank() {
        let provider = QuestionProvider::new(GeneratorConfig::default(), QuestionBank::default());
        let questions = provider.load("dailyTasks", Difficulty::Easy, None).await;
        assert_playable(&questions);
        assert!(questions.iter().all(|q| q.xp_reward == 10));
    }

    #[tokio::test]
    async fn unreachable_endpoint_falls_back_to_bank() {
        // Nothing listens on port 9; the connection attempt itself fails.
        let provider = provider_for("http://127.0.0.1:9".to_string(), Duration::from_secs(2));
        let questions = provider.load("dailyTasks", Difficulty::Easy, None).await;
        assert_playable(&questions);
        assert!(questions.iter().all(|q| q.xp_reward == 10 && q.options.len() == 4));
    }

    #[tokio::test]
    async fn server_error_falls_back_to_bank() {
        let stub = Router::new().route(
            "/functions/v1/generate-questions",
            post(|| async { axum::http::StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let endpoint = spawn_stub(stub).await;

        let provider = provider_for(endpoint, Duration::from_secs(2));
        let questions = provider.load("placesRecognition", Difficulty::Medium, None).await;
        assert_playable(&questions);
    }

    #[tokio::test]
    async fn empty_array_falls_back_to_bank() {
        let stub = Router::new().route(
            "/functions/v1/generate-questions",
            post(|| async { Json(Vec::<RawQuestion>::new()) }),
        );
        let endpoint = spawn_stub(stub).await;

        let provider = provider_for(endpoint, Duration::from_secs(2));
        let questions = provider.load("simpleTasks", Difficulty::Easy, None).await;
        assert_playable(&questions);
    }

    #[tokio::test]
    async fn malformed_body_falls_back_to_bank() {
        let stub = Router::new().route(
            "/functions/v1/generate-questions",
            post(|| async { "this is not json" }),
        );
        let endpoint = spawn_stub(stub).await;

        let provider = provider_for(endpoint, Duration::from_secs(2));
        let questions = provider.load("importantDates", Difficulty::Hard, None).await;
        assert_playable(&questions);
    }

    #[tokio::test]
    async fn slow_generator_times_out_to_bank() {
        let stub = Router::new().route(
            "/functions/v1/generate-questions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(Vec::<RawQuestion>::new())
            }),
        );
        let endpoint = spawn_stub(stub).await;

        let provider = provider_for(endpoint, Duration::from_millis(100));
        let questions = provider.load("dailyTasks", Difficulty::Easy, None).await;
        assert_playable(&questions);
    }

    #[tokio::test]
    async fn remote_questions_get_ids_and_rewards() {
        let stub = Router::new().route(
            "/functions/v1/generate-questions",
            post(|| async {
                Json(vec![RawQuestion {
                    text: "Which of these is warm?".to_string(),
                    options: vec!["Sun".into(), "Snow".into(), "Ice".into(), "Hail".into()],
                    correct_answer: "Sun".to_string(),
                }])
            }),
        );
        let endpoint = spawn_stub(stub).await;

        let provider = provider_for(endpoint, Duration::from_secs(2));
        let questions = provider.load("dailyTasks", Difficulty::Medium, None).await;
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, "dailyTasks-medium-0");
        assert_eq!(questions[0].xp_reward, 20);
        assert!(questions[0].is_consistent());
    }
}
