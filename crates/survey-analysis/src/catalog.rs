//! 目录缓存
//!
//! 会话开始时从存储加载一次疾病、问题和选项，之后只读。加载顺序固定为目录顺序，
//! 保证相同输入下的系列顺序和配色可复现。

use std::collections::HashMap;

use survey_core::{Choice, Disease, DiseaseId, Question, QuestionId, Result, SurveyStore};
use tracing::info;

/// 疾病、问题、选项的只读快照
#[derive(Debug, Clone, Default)]
pub struct CatalogCache {
    diseases: Vec<Disease>,
    questions: HashMap<DiseaseId, Vec<Question>>,
    choices: HashMap<QuestionId, Vec<Choice>>,
}

impl CatalogCache {
    /// 从存储加载完整目录，任何存储错误都直接返回
    pub async fn load(store: &dyn SurveyStore) -> Result<Self> {
        let diseases = store.list_active_diseases().await?;
        let mut questions = HashMap::new();
        let mut choices = HashMap::new();

        for disease in &diseases {
            let disease_questions = store.list_active_questions(disease.id).await?;
            for question in &disease_questions {
                choices.insert(question.id, store.list_choices(question.id).await?);
            }
            questions.insert(disease.id, disease_questions);
        }

        info!(
            "Catalog loaded: {} diseases, {} questions",
            diseases.len(),
            choices.len()
        );
        Ok(Self { diseases, questions, choices })
    }

    /// 由已有数据构建目录，问题和选项会按顺序重新排序
    pub fn from_parts(diseases: Vec<Disease>, questions: Vec<Question>, choices: Vec<Choice>) -> Self {
        let mut by_disease: HashMap<DiseaseId, Vec<Question>> = HashMap::new();
        for question in questions {
            by_disease.entry(question.disease_id).or_default().push(question);
        }
        for list in by_disease.values_mut() {
            list.sort_by_key(|q| (q.order, q.id));
        }

        let mut by_question: HashMap<QuestionId, Vec<Choice>> = HashMap::new();
        for choice in choices {
            by_question.entry(choice.question_id).or_default().push(choice);
        }
        for list in by_question.values_mut() {
            list.sort_by_key(|c| (c.order, c.id));
        }

        Self {
            diseases,
            questions: by_disease,
            choices: by_question,
        }
    }

    pub fn diseases(&self) -> &[Disease] {
        &self.diseases
    }

    pub fn disease_names(&self) -> Vec<String> {
        self.diseases.iter().map(|d| d.name.clone()).collect()
    }

    pub fn disease(&self, id: DiseaseId) -> Option<&Disease> {
        self.diseases.iter().find(|d| d.id == id)
    }

    /// 按名称查找疾病，不区分大小写
    pub fn find_disease(&self, name: &str) -> Option<&Disease> {
        let needle = name.trim().to_lowercase();
        self.diseases.iter().find(|d| d.name.to_lowercase() == needle)
    }

    /// 某疾病的问题，按 `order` 排序
    pub fn questions_for(&self, disease_id: DiseaseId) -> &[Question] {
        self.questions.get(&disease_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.values().flatten().find(|q| q.id == id)
    }

    /// 已存储的选项；未存储时返回 `None`
    pub fn choices_for(&self, question_id: QuestionId) -> Option<&[Choice]> {
        self.choices
            .get(&question_id)
            .filter(|c| !c.is_empty())
            .map(Vec::as_slice)
    }

    /// 给定问题集合的选项映射，供聚合使用
    pub fn choices_by_question(&self, question_ids: &[QuestionId]) -> HashMap<QuestionId, Vec<Choice>> {
        question_ids
            .iter()
            .filter_map(|id| self.choices_for(*id).map(|c| (*id, c.to_vec())))
            .collect()
    }

    /// 在给定疾病下查找原文与变量完全相同的问题ID，按疾病顺序、问题顺序返回
    pub fn question_ids_for(&self, disease_ids: &[DiseaseId], variables: &[String]) -> Vec<QuestionId> {
        let mut ids = Vec::new();
        for disease_id in disease_ids {
            for question in self.questions_for(*disease_id) {
                if variables.iter().any(|v| *v == question.text) && !ids.contains(&question.id) {
                    ids.push(question.id);
                }
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn test_load_from_store() {
        let store = fixtures::store();
        let catalog = CatalogCache::load(&store).await.unwrap();

        assert_eq!(catalog.diseases().len(), 3);
        assert_eq!(catalog.questions_for(1).len(), 4);
        assert_eq!(catalog.choices_for(10).map(|c| c.len()), Some(2));
        assert!(catalog.choices_for(11).is_none());
    }

    #[test]
    fn test_choices_by_question_skips_questions_without_choices() {
        let catalog = fixtures::catalog();
        let choices = catalog.choices_by_question(&[10, 11, 22]);

        assert_eq!(choices.len(), 2);
        assert_eq!(choices[&10].len(), 2);
        assert_eq!(choices[&22][0].text, "Yes");
        assert!(!choices.contains_key(&11));
    }

    #[tokio::test]
    async fn test_load_propagates_storage_errors() {
        let store = fixtures::store();
        store.set_unavailable(true);
        assert!(CatalogCache::load(&store).await.is_err());
    }

    #[test]
    fn test_find_disease_is_case_insensitive() {
        let catalog = fixtures::catalog();
        assert_eq!(catalog.find_disease("MALARIA").map(|d| d.id), Some(1));
        assert_eq!(catalog.find_disease(" heat stress ").map(|d| d.name.as_str()), Some("Heat Stress"));
        assert!(catalog.find_disease("dengue").is_none());
    }

    #[test]
    fn test_question_ids_follow_catalog_order() {
        let catalog = fixtures::catalog();
        let variables = vec![
            fixtures::MALARIA_CLIMATE.to_string(),
            fixtures::MALARIA_GENDER.to_string(),
        ];
        assert_eq!(catalog.question_ids_for(&[1], &variables), vec![10, 12]);
        assert!(catalog.question_ids_for(&[2], &variables).is_empty());
    }
}
