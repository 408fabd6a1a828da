//! 内存存储
//!
//! 在内存中保存一份调查数据快照，供测试和演示使用，语义与PostgreSQL实现一致：
//! 问题按 `order` 排序，选项按选项顺序排序，答复按疾病与问题集合过滤。

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use survey_core::{
    Choice, ChoiceId, Disease, DiseaseId, Question, QuestionId, ResponseRecord, Result, SurveyError,
    SurveyStore,
};

/// 内存调查数据存储
#[derive(Debug, Default)]
pub struct MemorySurveyStore {
    diseases: Vec<Disease>,
    questions: Vec<Question>,
    choices: Vec<Choice>,
    responses: Vec<ResponseRecord>,
    unavailable: AtomicBool,
}

impl MemorySurveyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_disease(mut self, id: DiseaseId, name: &str) -> Self {
        self.diseases.push(Disease { id, name: name.to_string() });
        self
    }

    pub fn with_question(mut self, id: QuestionId, disease_id: DiseaseId, text: &str, order: i32) -> Self {
        self.questions.push(Question {
            id,
            disease_id,
            text: text.to_string(),
            order,
        });
        self
    }

    pub fn with_choice(mut self, id: ChoiceId, question_id: QuestionId, text: &str, order: i32) -> Self {
        self.choices.push(Choice {
            id,
            question_id,
            text: text.to_string(),
            order,
        });
        self
    }

    /// 追加 `count` 条相同的答复，答复者ID依次递增
    pub fn with_responses(mut self, disease_id: DiseaseId, question_id: QuestionId, choice_id: ChoiceId, count: usize) -> Self {
        let start = self.responses.len() as i64 + 1;
        for offset in 0..count as i64 {
            self.responses.push(ResponseRecord {
                responder_id: start + offset,
                disease_id,
                question_id,
                choice_id,
            });
        }
        self
    }

    /// 模拟存储故障：之后的所有查询都返回数据库错误
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(SurveyError::Database("store unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SurveyStore for MemorySurveyStore {
    async fn list_active_diseases(&self) -> Result<Vec<Disease>> {
        self.check_available()?;
        Ok(self.diseases.clone())
    }

    async fn list_active_questions(&self, disease_id: DiseaseId) -> Result<Vec<Question>> {
        self.check_available()?;
        let mut questions: Vec<Question> = self
            .questions
            .iter()
            .filter(|q| q.disease_id == disease_id)
            .cloned()
            .collect();
        questions.sort_by_key(|q| (q.order, q.id));
        Ok(questions)
    }

    async fn list_choices(&self, question_id: QuestionId) -> Result<Vec<Choice>> {
        self.check_available()?;
        let mut choices: Vec<Choice> = self
            .choices
            .iter()
            .filter(|c| c.question_id == question_id)
            .cloned()
            .collect();
        choices.sort_by_key(|c| (c.order, c.id));
        Ok(choices)
    }

    async fn list_responses(
        &self,
        disease_ids: &[DiseaseId],
        question_ids: &[QuestionId],
    ) -> Result<Vec<ResponseRecord>> {
        self.check_available()?;
        Ok(self
            .responses
            .iter()
            .filter(|r| disease_ids.contains(&r.disease_id) && question_ids.contains(&r.question_id))
            .copied()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemorySurveyStore {
        MemorySurveyStore::new()
            .with_disease(1, "Malaria")
            .with_disease(2, "Cholera")
            .with_question(11, 1, "Second question", 2)
            .with_question(10, 1, "First question", 1)
            .with_question(20, 2, "Cholera question", 1)
            .with_choice(102, 10, "No", 2)
            .with_choice(101, 10, "Yes", 1)
            .with_responses(1, 10, 101, 3)
            .with_responses(2, 20, 1, 2)
            .with_responses(1, 11, 1, 1)
    }

    #[tokio::test]
    async fn test_questions_sorted_by_order() {
        let questions = store().list_active_questions(1).await.unwrap();
        let ids: Vec<_> = questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[tokio::test]
    async fn test_choices_sorted_by_order() {
        let choices = store().list_choices(10).await.unwrap();
        assert_eq!(choices[0].text, "Yes");
        assert_eq!(choices[1].text, "No");
        assert!(store().list_choices(11).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_responses_filtered_by_both_sets() {
        let store = store();
        assert_eq!(store.list_responses(&[1], &[10]).await.unwrap().len(), 3);
        assert_eq!(store.list_responses(&[1, 2], &[10, 20]).await.unwrap().len(), 5);
        assert!(store.list_responses(&[2], &[10]).await.unwrap().is_empty());
        assert!(store.list_responses(&[], &[10]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_store_errors() {
        let store = store();
        store.set_unavailable(true);
        let err = store.list_active_diseases().await.unwrap_err();
        assert!(matches!(err, SurveyError::Database(_)));
    }
}
