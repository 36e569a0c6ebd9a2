use crate::domain::models::{Category, Difficulty, Quiz};

/// The themed quiz catalog: five categories, each with an easy, medium and
/// hard tier. Question lists stay empty here; every load attempt replaces
/// them wholesale through the question provider.
#[derive(Debug, Clone)]
pub struct QuizCatalog {
    categories: Vec<Category>,
}

struct CategorySeed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    icon: &'static str,
    // Quiz titles and descriptions for the easy/medium/hard tiers.
    tiers: [(&'static str, &'static str); 3],
}

const CATEGORY_SEEDS: &[CategorySeed] = &[
    CategorySeed {
        id: "dailyTasks",
        title: "Daily Tasks",
        description: "Practice remembering everyday activities and their steps.",
        icon: "Home",
        tiers: [
            ("Basic Daily Activities", "Simple questions about common daily activities"),
            ("Intermediate Daily Activities", "Moderate questions about daily routines"),
            ("Advanced Daily Activities", "Challenging questions about complex daily tasks"),
        ],
    },
    CategorySeed {
        id: "simpleTasks",
        title: "Simple Tasks",
        description: "Learn and practice basic concepts and skills.",
        icon: "BookOpen",
        tiers: [
            ("Basic Concepts", "Simple questions about basic concepts"),
            ("Intermediate Concepts", "Moderate questions about common concepts"),
            ("Advanced Concepts", "Challenging questions about various concepts"),
        ],
    },
    CategorySeed {
        id: "familyRecognition",
        title: "Family Recognition",
        description: "Practice remembering family members and relationships.",
        icon: "Users",
        tiers: [
            ("Basic Family Relations", "Simple questions about immediate family members"),
            ("Extended Family Relations", "Moderate questions about extended family relationships"),
            ("Complex Family Relations", "Challenging questions about complex family relationships"),
        ],
    },
    CategorySeed {
        id: "importantDates",
        title: "Important Dates",
        description: "Remember important dates, holidays, and occasions.",
        icon: "Calendar",
        tiers: [
            ("Major Holidays", "Simple questions about major holidays and dates"),
            ("Seasonal Events", "Moderate questions about seasonal events and dates"),
            ("Special Occasions", "Challenging questions about special occasions and dates"),
        ],
    },
    CategorySeed {
        id: "placesRecognition",
        title: "Places Recognition",
        description: "Practice identifying different places and their purposes.",
        icon: "Brain",
        tiers: [
            ("Common Places", "Simple questions about common places"),
            ("Public Spaces", "Moderate questions about public spaces and buildings"),
            ("Specific Locations", "Challenging questions about specific locations and their functions"),
        ],
    },
];

impl QuizCatalog {
    pub fn standard() -> Self {
        let categories = CATEGORY_SEEDS
            .iter()
            .map(|seed| Category {
                id: seed.id.to_string(),
                title: seed.title.to_string(),
                description: seed.description.to_string(),
                icon: seed.icon.to_string(),
                quizzes: Difficulty::ALL
                    .iter()
                    .zip(seed.tiers.iter())
                    .map(|(&difficulty, &(title, description))| Quiz {
                        id: format!("{}-{}", seed.id, difficulty.as_str()),
                        title: title.to_string(),
                        description: description.to_string(),
                        icon: seed.icon.to_string(),
                        difficulty,
                        xp_reward: difficulty.quiz_xp(),
                        questions: Vec::new(),
                    })
                    .collect(),
            })
            .collect();
        QuizCatalog { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Resolve a quiz id like `dailyTasks-easy` to its category and quiz.
    pub fn find_quiz(&self, quiz_id: &str) -> Option<(&Category, &Quiz)> {
        self.categories.iter().find_map(|category| {
            category
                .quizzes
                .iter()
                .find(|quiz| quiz.id == quiz_id)
                .map(|quiz| (category, quiz))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_five_categories_with_three_tiers() {
        let catalog = QuizCatalog::standard();
        assert_eq!(catalog.categories().len(), 5);
        for category in catalog.categories() {
            assert_eq!(category.quizzes.len(), 3);
            let difficulties: Vec<_> = category.quizzes.iter().map(|q| q.difficulty).collect();
            assert_eq!(difficulties, Difficulty::ALL.to_vec());
        }
    }

    #[test]
    fn find_quiz_resolves_category() {
        let catalog = QuizCatalog::standard();
        let (category, quiz) = catalog.find_quiz("familyRecognition-hard").unwrap();
        assert_eq!(category.id, "familyRecognition");
        assert_eq!(quiz.difficulty, Difficulty::Hard);
        assert_eq!(quiz.xp_reward, 150);

        assert!(catalog.find_quiz("familyRecognition-extreme").is_none());
    }
}
