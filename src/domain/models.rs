use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// XP granted per correctly answered question at this tier.
    pub fn question_xp(&self) -> i32 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 20,
            Difficulty::Hard => 30,
        }
    }

    /// Headline XP shown on the quiz card for this tier.
    pub fn quiz_xp(&self) -> i32 {
        match self {
            Difficulty::Easy => 50,
            Difficulty::Medium => 100,
            Difficulty::Hard => 150,
        }
    }
}

impl TryFrom<&str> for Difficulty {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub difficulty: Difficulty,
    pub xp_reward: i32,
}

impl Question {
    /// Holds for every bank question; remote-sourced questions are not
    /// rejected on violation, the client simply renders what it got.
    pub fn is_consistent(&self) -> bool {
        self.options.contains(&self.correct_answer)
    }
}

/// Raw question shape as produced by a generator (remote or AI). Ids and
/// rewards are filled in by the caller from category, difficulty and index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestion {
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub difficulty: Difficulty,
    pub xp_reward: i32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub quizzes: Vec<Quiz>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub name: String,
    pub relation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateKind {
    Birthday,
    Anniversary,
    Holiday,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportantDate {
    pub date: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: DateKind,
}

/// One-time survey answers. Every field is optional in spirit: zero age and
/// empty lists mean "not provided" and are omitted from generation payloads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub age: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub family_members: Vec<FamilyMember>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub daily_routine: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub important_dates: Vec<ImportantDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub favorite_locations: Vec<String>,
}

fn is_zero(age: &i32) -> bool {
    *age <= 0
}

impl PersonalInfo {
    pub fn is_empty(&self) -> bool {
        self.age <= 0
            && self.interests.is_empty()
            && self.family_members.is_empty()
            && self.daily_routine.is_empty()
            && self.important_dates.is_empty()
            && self.favorite_locations.is_empty()
    }

    pub fn has_interest(&self, interest: &str) -> bool {
        self.interests.iter().any(|i| i.eq_ignore_ascii_case(interest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_round_trip() {
        for d in Difficulty::ALL {
            assert_eq!(Difficulty::try_from(d.as_str()), Ok(d));
        }
        assert!(Difficulty::try_from("impossible").is_err());
    }

    #[test]
    fn empty_fields_are_omitted_from_payloads() {
        let info = PersonalInfo {
            age: 0,
            interests: vec!["gardening".into()],
            ..Default::default()
        };
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("age").is_none());
        assert!(json.get("familyMembers").is_none());
        assert_eq!(json["interests"][0], "gardening");
    }

    #[test]
    fn personal_info_emptiness() {
        assert!(PersonalInfo::default().is_empty());
        let info = PersonalInfo {
            age: 72,
            ..Default::default()
        };
        assert!(!info.is_empty());
    }
}
