use anyhow::{anyhow, bail, Result};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent,
    CreateChatCompletionRequestArgs, Role,
};
use async_openai::{config::OpenAIConfig, Client};
use tokio::time::{sleep, Duration};

use crate::domain::models::{Difficulty, PersonalInfo, Question, RawQuestion};

const SYSTEM_PROMPT: &str = "You are a helpful assistant that generates personalized quiz \
questions for memory training and cognitive health. Always return valid JSON arrays of \
question objects.";

/// Chat-model question generation behind the `/functions/v1/generate-questions`
/// endpoint. Callers fall back to the bank on any error.
#[derive(Clone)]
pub struct AiService {
    client: Client<OpenAIConfig>,
    model: String,
}

impl AiService {
    pub fn new(api_key: String, model: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(config);
        Self { client, model }
    }

    pub async fn generate_questions(
        &self,
        category: &str,
        difficulty: Difficulty,
        personal_info: Option<&PersonalInfo>,
        count: usize,
    ) -> Result<Vec<Question>> {
        let prompt = build_prompt(category, difficulty, personal_info, count);
        let mut retries = 0;

        loop {
            let messages = vec![
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    role: Role::System,
                    content: SYSTEM_PROMPT.to_string(),
                    name: None,
                }),
                ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                    role: Role::User,
                    content: ChatCompletionRequestUserMessageContent::Text(prompt.clone()),
                    name: None,
                }),
            ];

            let request = CreateChatCompletionRequestArgs::default()
                .model(self.model.as_str())
                .messages(messages)
                .temperature(0.7)
                .build()?;

            match self.client.chat().create(request).await {
                Ok(resp) => {
                    let content = resp
                        .choices
                        .first()
                        .and_then(|c| c.message.content.clone())
                        .unwrap_or_default();
                    return parse_generated(&content, category, difficulty);
                }
                Err(err) => {
                    retries += 1;
                    if retries > 3 {
                        return Err(anyhow!("question generation failed: {err}"));
                    }
                    sleep(Duration::from_millis(500 * retries)).await;
                }
            }
        }
    }
}

fn parse_generated(content: &str, category: &str, difficulty: Difficulty) -> Result<Vec<Question>> {
    let json = extract_json_array(content)
        .ok_or_else(|| anyhow!("model reply contains no JSON array"))?;
    let raw: Vec<RawQuestion> = serde_json::from_str(json)?;
    if raw.is_empty() {
        bail!("model returned an empty question array");
    }

    Ok(raw
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
        .collect())
}

/// Models wrap replies in prose or code fences often enough that we cut out
/// the outermost array before parsing.
fn extract_json_array(content: &str) -> Option<&str> {
    let start = content.find('[')?;
    let end = content.rfind(']')?;
    (end > start).then(|| &content[start..=end])
}

pub fn build_prompt(
    category: &str,
    difficulty: Difficulty,
    personal_info: Option<&PersonalInfo>,
    count: usize,
) -> String {
    let mut prompt = format!(
        "Generate {count} multiple-choice questions about {category} with {} difficulty level \
for memory training and cognitive exercises.",
        difficulty.as_str()
    );

    if let Some(info) = personal_info.filter(|info| !info.is_empty()) {
        prompt.push_str("\n\nPersonalization context:\n");
        if info.age > 0 {
            prompt.push_str(&format!("- Age: {} years old\n", info.age));
        }
        if !info.interests.is_empty() {
            prompt.push_str(&format!("- Interests: {}\n", info.interests.join(", ")));
        }
        if !info.family_members.is_empty() {
            let family: Vec<String> = info
                .family_members
                .iter()
                .map(|m| format!("{} ({})", m.name, m.relation))
                .collect();
            prompt.push_str(&format!("- Family: {}\n", family.join(", ")));
        }
        if !info.daily_routine.is_empty() {
            prompt.push_str(&format!(
                "- Daily routine includes: {}\n",
                info.daily_routine.join(", ")
            ));
        }
        if !info.favorite_locations.is_empty() {
            prompt.push_str(&format!(
                "- Favorite places: {}\n",
                info.favorite_locations.join(", ")
            ));
        }
        if !info.important_dates.is_empty() {
            let dates: Vec<String> = info
                .important_dates
                .iter()
                .map(|d| format!("{} ({})", d.description, d.date))
                .collect();
            prompt.push_str(&format!("- Important dates: {}\n", dates.join(", ")));
        }
        prompt.push_str(
            "\nPlease incorporate this personal information naturally into the questions when relevant.",
        );
    }

    let category_instructions = match category {
        "familyRecognition" => {
            "Focus on family relationships, social connections, and interpersonal recognition. \
Include questions about maintaining relationships and remembering important people."
        }
        "simpleTasks" => {
            "Focus on basic problem-solving, safety awareness, and simple cognitive tasks. \
Include practical life skills and decision-making scenarios."
        }
        "importantDates" => {
            "Focus on dates, holidays, schedules, and temporal relationships. Include questions \
about calendar awareness and remembering occasions."
        }
        "placesRecognition" => {
            "Focus on recognizing places and their purposes. Include questions about everyday \
destinations and what people do there."
        }
        // dailyTasks and anything unknown.
        _ => {
            "Focus on everyday activities, self-care, household tasks, and daily routines. \
Questions should be practical and relevant to independent living."
        }
    };
    prompt.push_str(&format!("\n\n{category_instructions}"));

    let difficulty_instructions = match difficulty {
        Difficulty::Easy => {
            "Keep questions simple and straightforward. Use clear language and obvious correct answers."
        }
        Difficulty::Medium => {
            "Make questions moderately challenging with some complexity. Include scenarios that \
require basic reasoning."
        }
        Difficulty::Hard => {
            "Create challenging questions that require deeper thinking and complex reasoning. \
Include multi-step scenarios."
        }
    };
    prompt.push_str(&format!(
        "\n\nDifficulty level ({}): {difficulty_instructions}",
        difficulty.as_str()
    ));

    prompt.push_str(&format!(
        "\n\nFormat each question as a JSON object with:\n\
- text: the question text (personalized when possible)\n\
- options: array of exactly 4 possible answers\n\
- correctAnswer: the correct answer (must exactly match one of the options)\n\n\
Return a valid JSON array of {count} question objects. Ensure all questions are appropriate \
for memory training and cognitive health."
    ));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::FamilyMember;

    #[test]
    fn prompt_includes_only_provided_personal_fields() {
        let info = PersonalInfo {
            age: 68,
            interests: vec!["gardening".into(), "chess".into()],
            ..Default::default()
        };
        let prompt = build_prompt("dailyTasks", Difficulty::Easy, Some(&info), 8);

        assert!(prompt.contains("Age: 68 years old"));
        assert!(prompt.contains("Interests: gardening, chess"));
        assert!(!prompt.contains("Family:"));
        assert!(!prompt.contains("Daily routine includes:"));
    }

    #[test]
    fn empty_survey_adds_no_personal_context() {
        let prompt = build_prompt("dailyTasks", Difficulty::Hard, Some(&PersonalInfo::default()), 8);
        assert!(!prompt.contains("Personalization context"));
        assert!(prompt.contains("hard difficulty level"));
    }

    #[test]
    fn family_members_are_listed_with_relations() {
        let info = PersonalInfo {
            family_members: vec![FamilyMember {
                name: "Miguel".into(),
                relation: "son".into(),
                birth_date: None,
            }],
            ..Default::default()
        };
        let prompt = build_prompt("familyRecognition", Difficulty::Medium, Some(&info), 8);
        assert!(prompt.contains("Miguel (son)"));
        assert!(prompt.contains("family relationships"));
    }

    #[test]
    fn fenced_replies_still_parse() {
        let content = "Here you go:\n```json\n[{\"text\":\"Q?\",\"options\":[\"A\",\"B\",\"C\",\"D\"],\"correctAnswer\":\"A\"}]\n```";
        let questions = parse_generated(content, "dailyTasks", Difficulty::Easy).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer, "A");
        assert_eq!(questions[0].xp_reward, 10);
    }

    #[test]
    fn prose_without_an_array_is_an_error() {
        assert!(parse_generated("Sorry, I cannot help.", "dailyTasks", Difficulty::Easy).is_err());
        assert!(parse_generated("[]", "dailyTasks", Difficulty::Easy).is_err());
    }
}
