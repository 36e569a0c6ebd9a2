use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The predicate a quest actually checks. Quests used to be matched by
/// substring-searching their display text; the kind is now carried as data so
/// renaming a quest cannot silently break its trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QuestKind {
    /// Fires on the first quiz of the given category finished today.
    CategoryClear { category: String },
    /// Fires on any quiz finished with a 100% score.
    PerfectScore,
    /// Fires once at least `required` distinct quizzes were finished today.
    Streak { required: u32 },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub xp_reward: i32,
    pub kind: QuestKind,
}

/// Facts about a single quiz completion that quest predicates run against.
#[derive(Debug, Clone)]
pub struct CompletionEvent {
    pub category: String,
    pub score: i32,
    /// Distinct quizzes finished in the current window, this one included.
    pub distinct_quizzes_today: u32,
}

impl QuestKind {
    fn matches(&self, event: &CompletionEvent) -> bool {
        match self {
            QuestKind::CategoryClear { category } => event.category == *category,
            QuestKind::PerfectScore => event.score == 100,
            QuestKind::Streak { required } => event.distinct_quizzes_today >= *required,
        }
    }
}

/// The configured set of daily quests. Built once at startup and passed
/// through the shared state rather than living in a module-level global.
#[derive(Debug, Clone)]
pub struct QuestBook {
    quests: Vec<DailyQuest>,
}

impl QuestBook {
    pub fn standard() -> Self {
        let category = |id: &str, title: &str, description: &str, cat: &str| DailyQuest {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            xp_reward: 50,
            kind: QuestKind::CategoryClear { category: cat.into() },
        };

        QuestBook {
            quests: vec![
                category("quest1", "Daily Tasks Master", "Complete a Daily Tasks quiz", "dailyTasks"),
                category("quest2", "Simple Tasks Expert", "Complete a Simple Tasks quiz", "simpleTasks"),
                category(
                    "quest3",
                    "Family Recognition",
                    "Complete a Family Recognition quiz",
                    "familyRecognition",
                ),
                category("quest4", "Date Keeper", "Complete an Important Dates quiz", "importantDates"),
                category(
                    "quest5",
                    "Place Finder",
                    "Complete a Places Recognition quiz",
                    "placesRecognition",
                ),
                DailyQuest {
                    id: "quest6".into(),
                    title: "Perfect Score".into(),
                    description: "Get 100% on any quiz today".into(),
                    xp_reward: 100,
                    kind: QuestKind::PerfectScore,
                },
                DailyQuest {
                    id: "quest7".into(),
                    title: "Memory Marathon".into(),
                    description: "Complete 3 different quizzes today".into(),
                    xp_reward: 75,
                    kind: QuestKind::Streak { required: 3 },
                },
            ],
        }
    }

    pub fn all(&self) -> &[DailyQuest] {
        &self.quests
    }

    /// Quests newly satisfied by this event. A quest already completed in the
    /// current window never re-fires, so repeated delivery of the same
    /// completion grants nothing twice.
    pub fn newly_completed<'a>(
        &'a self,
        event: &CompletionEvent,
        already_done: &HashSet<String>,
    ) -> Vec<&'a DailyQuest> {
        self.quests
            .iter()
            .filter(|quest| !already_done.contains(&quest.id) && quest.kind.matches(event))
            .collect()
    }
}

/// Daily windows are keyed by the calendar date, compared as strings. A
/// session spanning midnight keeps its stale window until the next check.
pub fn reset_key(now: DateTime<Utc>) -> String {
    now.date_naive().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(category: &str, score: i32, distinct: u32) -> CompletionEvent {
        CompletionEvent {
            category: category.to_string(),
            score,
            distinct_quizzes_today: distinct,
        }
    }

    #[test]
    fn category_quest_fires_once_per_window() {
        let book = QuestBook::standard();
        let mut done = HashSet::new();

        let first = book.newly_completed(&event("dailyTasks", 60, 1), &done);
        assert_eq!(first.iter().map(|q| q.id.as_str()).collect::<Vec<_>>(), vec!["quest1"]);

        done.insert("quest1".to_string());
        let second = book.newly_completed(&event("dailyTasks", 60, 2), &done);
        assert!(second.is_empty());
    }

    #[test]
    fn perfect_score_requires_exactly_hundred() {
        let book = QuestBook::standard();
        let done: HashSet<String> = ["quest1".to_string()].into_iter().collect();

        let at_99 = book.newly_completed(&event("dailyTasks", 99, 2), &done);
        assert!(at_99.iter().all(|q| q.id != "quest6"));

        let at_100 = book.newly_completed(&event("dailyTasks", 100, 2), &done);
        assert!(at_100.iter().any(|q| q.id == "quest6"));
    }

    #[test]
    fn streak_fires_at_three_distinct_quizzes() {
        let book = QuestBook::standard();
        let done: HashSet<String> =
            ["quest1", "quest2", "quest3"].iter().map(|s| s.to_string()).collect();

        assert!(book
            .newly_completed(&event("importantDates", 40, 2), &done)
            .iter()
            .all(|q| q.id != "quest7"));
        assert!(book
            .newly_completed(&event("importantDates", 40, 3), &done)
            .iter()
            .any(|q| q.id == "quest7"));
    }

    #[test]
    fn unknown_category_matches_no_category_quest() {
        let book = QuestBook::standard();
        let done = HashSet::new();
        let fired = book.newly_completed(&event("somethingElse", 50, 1), &done);
        assert!(fired.is_empty());
    }
}
