//! 存储协作方接口
//!
//! 疾病、问题、选项、答复的持久化由外部关系库负责，本模块只定义查询契约。

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Choice, Disease, DiseaseId, Question, QuestionId, ResponseRecord};

/// 调查数据只读存储
#[async_trait]
pub trait SurveyStore: Send + Sync {
    /// 所有启用的疾病
    async fn list_active_diseases(&self) -> Result<Vec<Disease>>;

    /// 某疾病下启用的问题，按 `order` 排序
    async fn list_active_questions(&self, disease_id: DiseaseId) -> Result<Vec<Question>>;

    /// 某问题的选项，按选项顺序排序
    async fn list_choices(&self, question_id: QuestionId) -> Result<Vec<Choice>>;

    /// 疾病与问题同时落在给定集合内的答复
    async fn list_responses(
        &self,
        disease_ids: &[DiseaseId],
        question_ids: &[QuestionId],
    ) -> Result<Vec<ResponseRecord>>;
}
