use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::domain::models::{Difficulty, PersonalInfo, Question};

/// How many questions a single quiz load serves.
pub const QUESTIONS_PER_QUIZ: usize = 8;

struct SeedQuestion {
    text: &'static str,
    options: [&'static str; 4],
    answer: &'static str,
}

const DAILY_TASKS: &[SeedQuestion] = &[
    SeedQuestion {
        text: "What is typically the first thing you do after waking up?",
        options: ["Brush teeth", "Make coffee", "Check phone", "Take a shower"],
        answer: "Brush teeth",
    },
    SeedQuestion {
        text: "Which appliance would you use to heat up leftovers quickly?",
        options: ["Oven", "Microwave", "Stovetop", "Toaster"],
        answer: "Microwave",
    },
    SeedQuestion {
        text: "What do you need to do before crossing a street?",
        options: ["Look both ways", "Run quickly", "Close your eyes", "Call someone"],
        answer: "Look both ways",
    },
    SeedQuestion {
        text: "Which item would you use to write a shopping list?",
        options: ["Pen and paper", "Fork", "Remote control", "Soap"],
        answer: "Pen and paper",
    },
    SeedQuestion {
        text: "What is the correct order for washing dishes?",
        options: ["Rinse, soap, dry", "Dry, soap, rinse", "Soap, rinse, dry", "Soap, dry, rinse"],
        answer: "Soap, rinse, dry",
    },
    SeedQuestion {
        text: "Which of these would you use to pay at a grocery store?",
        options: ["Credit card", "Toothbrush", "Remote control", "Pillow"],
        answer: "Credit card",
    },
    SeedQuestion {
        text: "What should you do with trash?",
        options: ["Put it in a trash bin", "Leave it on the floor", "Put it in the refrigerator", "Hide it"],
        answer: "Put it in a trash bin",
    },
    SeedQuestion {
        text: "What should you do before going to bed?",
        options: ["Brush teeth", "Go for a run", "Cook breakfast", "Start cleaning"],
        answer: "Brush teeth",
    },
    SeedQuestion {
        text: "How do you answer a ringing telephone?",
        options: ["Say hello", "Hang up immediately", "Stay silent", "Yell loudly"],
        answer: "Say hello",
    },
    SeedQuestion {
        text: "What do you need to do when your hands are dirty?",
        options: ["Wash them", "Touch food", "Touch your face", "Wipe them on furniture"],
        answer: "Wash them",
    },
];

const SIMPLE_TASKS: &[SeedQuestion] = &[
    SeedQuestion {
        text: "Which tool would you use to hammer a nail?",
        options: ["Hammer", "Screwdriver", "Wrench", "Pliers"],
        answer: "Hammer",
    },
    SeedQuestion {
        text: "What comes after Thursday in the days of the week?",
        options: ["Friday", "Monday", "Saturday", "Wednesday"],
        answer: "Friday",
    },
    SeedQuestion {
        text: "Which season comes after winter?",
        options: ["Spring", "Summer", "Fall", "Winter again"],
        answer: "Spring",
    },
    SeedQuestion {
        text: "Which of these is a color?",
        options: ["Blue", "Water", "Dog", "Telephone"],
        answer: "Blue",
    },
    SeedQuestion {
        text: "What do you use to tell time?",
        options: ["Clock", "Fork", "Pillow", "Shoe"],
        answer: "Clock",
    },
    SeedQuestion {
        text: "Which of these is a fruit?",
        options: ["Apple", "Carrot", "Potato", "Broccoli"],
        answer: "Apple",
    },
    SeedQuestion {
        text: "What number comes after 9?",
        options: ["10", "8", "11", "5"],
        answer: "10",
    },
    SeedQuestion {
        text: "Which month has Christmas?",
        options: ["December", "July", "March", "September"],
        answer: "December",
    },
    SeedQuestion {
        text: "Which of these animals has wings?",
        options: ["Bird", "Cat", "Fish", "Dog"],
        answer: "Bird",
    },
    SeedQuestion {
        text: "What do you wear on your feet?",
        options: ["Shoes", "Hat", "Gloves", "Scarf"],
        answer: "Shoes",
    },
];

const FAMILY_RECOGNITION: &[SeedQuestion] = &[
    SeedQuestion {
        text: "Who is typically the child of your sister or brother?",
        options: ["Niece or nephew", "Cousin", "Grandchild", "Parent"],
        answer: "Niece or nephew",
    },
    SeedQuestion {
        text: "What relation is your father's father to you?",
        options: ["Grandfather", "Uncle", "Cousin", "Brother"],
        answer: "Grandfather",
    },
    SeedQuestion {
        text: "What do you call your mother's sister?",
        options: ["Aunt", "Grandmother", "Cousin", "Niece"],
        answer: "Aunt",
    },
    SeedQuestion {
        text: "Who is the daughter of your son or daughter?",
        options: ["Granddaughter", "Niece", "Cousin", "Sister"],
        answer: "Granddaughter",
    },
    SeedQuestion {
        text: "What relation is your spouse's father to you?",
        options: ["Father-in-law", "Uncle", "Grandfather", "Brother"],
        answer: "Father-in-law",
    },
    SeedQuestion {
        text: "What do you call your parent's brother?",
        options: ["Uncle", "Cousin", "Grandfather", "Nephew"],
        answer: "Uncle",
    },
    SeedQuestion {
        text: "What relation is your brother's wife to you?",
        options: ["Sister-in-law", "Aunt", "Niece", "Cousin"],
        answer: "Sister-in-law",
    },
    SeedQuestion {
        text: "What relation is your mother's mother to you?",
        options: ["Grandmother", "Aunt", "Sister", "Cousin"],
        answer: "Grandmother",
    },
    SeedQuestion {
        text: "What do you call the children of your aunt or uncle?",
        options: ["Cousins", "Siblings", "Nieces/Nephews", "Grandchildren"],
        answer: "Cousins",
    },
    SeedQuestion {
        text: "What relation is your child's spouse to you?",
        options: ["Son/Daughter-in-law", "Niece/Nephew", "Cousin", "Grandchild"],
        answer: "Son/Daughter-in-law",
    },
];

const IMPORTANT_DATES: &[SeedQuestion] = &[
    SeedQuestion {
        text: "When is New Year's Day?",
        options: ["January 1st", "December 25th", "July 4th", "October 31st"],
        answer: "January 1st",
    },
    SeedQuestion {
        text: "What holiday is celebrated on December 25th?",
        options: ["Christmas", "Thanksgiving", "Easter", "Valentine's Day"],
        answer: "Christmas",
    },
    SeedQuestion {
        text: "Which holiday involves giving thanks and eating turkey?",
        options: ["Thanksgiving", "Christmas", "Easter", "Halloween"],
        answer: "Thanksgiving",
    },
    SeedQuestion {
        text: "When is Independence Day in the United States?",
        options: ["July 4th", "January 1st", "December 25th", "October 31st"],
        answer: "July 4th",
    },
    SeedQuestion {
        text: "Which holiday involves costumes and trick-or-treating?",
        options: ["Halloween", "Easter", "Valentine's Day", "Thanksgiving"],
        answer: "Halloween",
    },
    SeedQuestion {
        text: "When is Valentine's Day?",
        options: ["February 14th", "March 17th", "April 1st", "May 5th"],
        answer: "February 14th",
    },
    SeedQuestion {
        text: "What do we celebrate on Easter?",
        options: ["Resurrection of Jesus", "Independence", "New Year", "Labor Day"],
        answer: "Resurrection of Jesus",
    },
    SeedQuestion {
        text: "Which month has 28 days (or 29 in leap years)?",
        options: ["February", "April", "June", "September"],
        answer: "February",
    },
    SeedQuestion {
        text: "What season comes after summer?",
        options: ["Fall", "Winter", "Spring", "Another summer"],
        answer: "Fall",
    },
    SeedQuestion {
        text: "How many months are in a year?",
        options: ["12", "10", "6", "24"],
        answer: "12",
    },
];

const PLACES_RECOGNITION: &[SeedQuestion] = &[
    SeedQuestion {
        text: "Where would you go to borrow books?",
        options: ["Library", "Grocery store", "Bank", "Restaurant"],
        answer: "Library",
    },
    SeedQuestion {
        text: "Where would you go to deposit money?",
        options: ["Bank", "Hospital", "School", "Post Office"],
        answer: "Bank",
    },
    SeedQuestion {
        text: "Where would you go to buy groceries?",
        options: ["Supermarket", "Library", "Movie theater", "Gas station"],
        answer: "Supermarket",
    },
    SeedQuestion {
        text: "Where would you go if you were sick?",
        options: ["Hospital", "Restaurant", "School", "Mall"],
        answer: "Hospital",
    },
    SeedQuestion {
        text: "Where would you go to watch a movie?",
        options: ["Movie theater", "Library", "Church", "Gym"],
        answer: "Movie theater",
    },
    SeedQuestion {
        text: "Where would you go to mail a letter?",
        options: ["Post Office", "Bank", "Restaurant", "Pharmacy"],
        answer: "Post Office",
    },
    SeedQuestion {
        text: "Where would you go to buy medicine?",
        options: ["Pharmacy", "Library", "Grocery store", "Movie theater"],
        answer: "Pharmacy",
    },
    SeedQuestion {
        text: "Where would you go to worship?",
        options: ["Church/Temple/Mosque", "Restaurant", "Bank", "School"],
        answer: "Church/Temple/Mosque",
    },
    SeedQuestion {
        text: "Where would you go to exercise?",
        options: ["Gym", "Library", "Restaurant", "Post Office"],
        answer: "Gym",
    },
    SeedQuestion {
        text: "Where would you go to have a meal prepared for you?",
        options: ["Restaurant", "Bank", "Library", "Gas station"],
        answer: "Restaurant",
    },
];

/// Unknown categories fall back to the daily-tasks pool.
fn pool_for(category: &str) -> &'static [SeedQuestion] {
    match category {
        "dailyTasks" => DAILY_TASKS,
        "simpleTasks" => SIMPLE_TASKS,
        "familyRecognition" => FAMILY_RECOGNITION,
        "importantDates" => IMPORTANT_DATES,
        "placesRecognition" => PLACES_RECOGNITION,
        _ => DAILY_TASKS,
    }
}

struct Draft {
    text: String,
    options: Vec<String>,
    answer: String,
}

/// The hand-authored question bank served whenever remote generation is not
/// configured or fails. Stateless; pools live in this module as constants.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuestionBank;

impl QuestionBank {
    pub fn questions(&self, category: &str, difficulty: Difficulty, count: usize) -> Vec<Question> {
        self.personalized(category, difficulty, count, None)
    }

    /// Like [`QuestionBank::questions`] but with best-effort phrasing tweaks
    /// drawn from the survey. Tweaks never change what a question asks, so
    /// the stored answer stays correct.
    pub fn personalized(
        &self,
        category: &str,
        difficulty: Difficulty,
        count: usize,
        info: Option<&PersonalInfo>,
    ) -> Vec<Question> {
        let pool = pool_for(category);
        let mut drafts: Vec<Draft> = pool
            .iter()
            .map(|seed| Draft {
                text: seed.text.to_string(),
                options: seed.options.iter().map(|o| o.to_string()).collect(),
                answer: seed.answer.to_string(),
            })
            .collect();

        if let Some(info) = info.filter(|p| !p.is_empty()) {
            apply_personal_touches(category, &mut drafts, info);
        }

        // Pools are sized above QUESTIONS_PER_QUIZ; synthesized filler keeps
        // the never-fewer-than-requested guarantee if one ever shrinks.
        let mut filler = 0;
        while drafts.len() < count {
            drafts.push(synthesized_question(filler));
            filler += 1;
        }

        let mut rng = thread_rng();
        drafts.shuffle(&mut rng);
        drafts.truncate(count);

        drafts
            .into_iter()
            .enumerate()
            .map(|(index, mut draft)| {
                draft.options.shuffle(&mut rng);
                Question {
                    id: format!("{category}-{}-{index}", difficulty.as_str()),
                    text: draft.text,
                    options: draft.options,
                    correct_answer: draft.answer,
                    difficulty,
                    xp_reward: difficulty.question_xp(),
                }
            })
            .collect()
    }
}

fn synthesized_question(n: usize) -> Draft {
    let base = 10 + n as i64;
    Draft {
        text: format!("What number comes right after {base}?"),
        options: vec![
            (base + 1).to_string(),
            (base - 1).to_string(),
            (base + 2).to_string(),
            (base + 10).to_string(),
        ],
        answer: (base + 1).to_string(),
    }
}

fn apply_personal_touches(category: &str, drafts: &mut [Draft], info: &PersonalInfo) {
    match category {
        "dailyTasks" => {
            if !info.daily_routine.is_empty() {
                drafts[0].text =
                    "Thinking of your own morning routine, what is typically the first thing you do after waking up?"
                        .to_string();
            }
            if info.has_interest("cooking")
                || info.favorite_locations.iter().any(|l| l.eq_ignore_ascii_case("kitchen"))
            {
                drafts[1].text =
                    "In the kitchen, which appliance would you use to heat up leftovers quickly?".to_string();
            }
        }
        "familyRecognition" => {
            if let Some(member) = info.family_members.first() {
                drafts[0].text = format!(
                    "Think of your family, like {} your {}. Who is typically the child of your sister or brother?",
                    member.name, member.relation
                );
            }
        }
        "importantDates" => {
            if !info.important_dates.is_empty() {
                drafts[0].text = format!(
                    "You keep track of {} important dates. When is New Year's Day?",
                    info.important_dates.len()
                );
            }
        }
        "placesRecognition" => {
            if let Some(place) = info.favorite_locations.first() {
                drafts[0].text =
                    format!("You mentioned visiting {place}. Where would you go to borrow books?");
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::domain::models::FamilyMember;

    const CATEGORIES: [&str; 5] = [
        "dailyTasks",
        "simpleTasks",
        "familyRecognition",
        "importantDates",
        "placesRecognition",
    ];

    #[test]
    fn every_pair_yields_consistent_questions() {
        let bank = QuestionBank::default();
        for category in CATEGORIES {
            for difficulty in Difficulty::ALL {
                let questions = bank.questions(category, difficulty, QUESTIONS_PER_QUIZ);
                assert_eq!(questions.len(), QUESTIONS_PER_QUIZ);
                for q in &questions {
                    assert_eq!(q.options.len(), 4, "{}: {}", category, q.text);
                    assert!(q.is_consistent(), "{}: {}", category, q.text);
                    let distinct: BTreeSet<_> = q.options.iter().collect();
                    assert_eq!(distinct.len(), 4, "{}: {}", category, q.text);
                    assert_eq!(q.xp_reward, difficulty.question_xp());
                }
            }
        }
    }

    #[test]
    fn shuffle_is_a_permutation_of_the_pool() {
        let bank = QuestionBank::default();
        let questions = bank.questions("placesRecognition", Difficulty::Medium, QUESTIONS_PER_QUIZ);

        for q in &questions {
            let seed = PLACES_RECOGNITION
                .iter()
                .find(|s| s.text == q.text)
                .expect("question not drawn from the pool");
            let mut got: Vec<_> = q.options.clone();
            let mut expected: Vec<String> = seed.options.iter().map(|o| o.to_string()).collect();
            got.sort();
            expected.sort();
            assert_eq!(got, expected);
        }

        // Drawn without replacement.
        let texts: BTreeSet<_> = questions.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts.len(), questions.len());
    }

    #[test]
    fn unknown_category_uses_default_pool() {
        let bank = QuestionBank::default();
        let questions = bank.questions("somethingNew", Difficulty::Easy, QUESTIONS_PER_QUIZ);
        assert_eq!(questions.len(), QUESTIONS_PER_QUIZ);
        for q in &questions {
            assert!(
                DAILY_TASKS.iter().any(|s| s.text == q.text),
                "expected default pool question, got: {}",
                q.text
            );
            assert!(q.id.starts_with("somethingNew-easy-"));
        }
    }

    #[test]
    fn oversized_requests_are_padded() {
        let bank = QuestionBank::default();
        let questions = bank.questions("dailyTasks", Difficulty::Hard, 14);
        assert_eq!(questions.len(), 14);
        for q in &questions {
            assert!(q.is_consistent());
        }
    }

    #[test]
    fn personal_touches_keep_answers_valid() {
        let bank = QuestionBank::default();
        let info = PersonalInfo {
            age: 70,
            family_members: vec![FamilyMember {
                name: "Rosa".into(),
                relation: "daughter".into(),
                birth_date: None,
            }],
            favorite_locations: vec!["the park".into()],
            ..Default::default()
        };

        for category in CATEGORIES {
            let questions =
                bank.personalized(category, Difficulty::Easy, QUESTIONS_PER_QUIZ, Some(&info));
            for q in &questions {
                assert!(q.is_consistent(), "{}: {}", category, q.text);
            }
        }

        let family = bank.personalized("familyRecognition", Difficulty::Easy, 10, Some(&info));
        assert!(family.iter().any(|q| q.text.contains("Rosa")));
    }
}
