//! 测试用目录与答复数据

use survey_core::{Choice, Disease, Question};
use survey_database::MemorySurveyStore;

use crate::catalog::CatalogCache;

pub const MALARIA_GENDER: &str = "Are you Male or Female?";
pub const MALARIA_AGE: &str = "Are you older than 35 years old?";
pub const MALARIA_CLIMATE: &str = "Do you think climate change affects malaria?";
pub const MALARIA_FACILITY: &str = "Do you live near a health facility?";
pub const CHOLERA_GENDER: &str = "Are you Male or Female? (cholera)";
pub const CHOLERA_AGE: &str = "Are you older than 35 years old? (cholera)";
pub const CHOLERA_TREATED: &str = "Were you treated for cholera last year?";
pub const CHOLERA_FAMILY: &str = "There are more than four in my family";
pub const HEAT_WEATHER: &str = "Do weather conditions affect your work?";
pub const HEAT_TIPS: &str = "Have you received prevention tips?";
pub const HEAT_SEASON: &str = "Is it hotter during the rainy season?";

const DISEASES: &[(i64, &str)] = &[(1, "Malaria"), (2, "Cholera"), (3, "Heat Stress")];

const QUESTIONS: &[(i64, i64, &str, i32)] = &[
    (10, 1, MALARIA_GENDER, 1),
    (11, 1, MALARIA_AGE, 2),
    (12, 1, MALARIA_CLIMATE, 3),
    (13, 1, MALARIA_FACILITY, 4),
    (20, 2, CHOLERA_GENDER, 1),
    (21, 2, CHOLERA_AGE, 2),
    (22, 2, CHOLERA_TREATED, 3),
    (23, 2, CHOLERA_FAMILY, 4),
    (30, 3, HEAT_WEATHER, 1),
    (31, 3, HEAT_TIPS, 2),
    (32, 3, HEAT_SEASON, 3),
];

const CHOICES: &[(i64, i64, &str, i32)] = &[
    (101, 10, "Male", 1),
    (102, 10, "Female", 2),
    (201, 20, "Male", 1),
    (202, 20, "Female", 2),
    (221, 22, "Yes", 1),
    (222, 22, "No", 2),
];

/// (disease_id, question_id, choice_id, count)
const RESPONSES: &[(i64, i64, i64, usize)] = &[
    (1, 10, 101, 5),
    (1, 10, 102, 3),
    (2, 20, 201, 4),
    (1, 11, 1, 2),
    (2, 21, 2, 1),
];

pub fn store() -> MemorySurveyStore {
    let mut store = MemorySurveyStore::new();
    for (id, name) in DISEASES {
        store = store.with_disease(*id, name);
    }
    for (id, disease_id, text, order) in QUESTIONS {
        store = store.with_question(*id, *disease_id, text, *order);
    }
    for (id, question_id, text, order) in CHOICES {
        store = store.with_choice(*id, *question_id, text, *order);
    }
    for (disease_id, question_id, choice_id, count) in RESPONSES {
        store = store.with_responses(*disease_id, *question_id, *choice_id, *count);
    }
    store
}

pub fn catalog() -> CatalogCache {
    CatalogCache::from_parts(
        DISEASES
            .iter()
            .map(|(id, name)| Disease { id: *id, name: name.to_string() })
            .collect(),
        QUESTIONS
            .iter()
            .map(|(id, disease_id, text, order)| Question {
                id: *id,
                disease_id: *disease_id,
                text: text.to_string(),
                order: *order,
            })
            .collect(),
        CHOICES
            .iter()
            .map(|(id, question_id, text, order)| Choice {
                id: *id,
                question_id: *question_id,
                text: text.to_string(),
                order: *order,
            })
            .collect(),
    )
}
