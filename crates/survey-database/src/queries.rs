//! 数据库查询操作

use async_trait::async_trait;
use survey_core::{
    Choice, Disease, DiseaseId, Question, QuestionId, ResponseRecord, Result, SurveyError,
    SurveyStore,
};

use crate::connection::DatabasePool;
use crate::models::*;

/// 数据库查询操作接口
#[derive(Debug, Clone)]
pub struct DatabaseQueries {
    pool: DatabasePool,
}

impl DatabaseQueries {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// 创建数据库表
    pub async fn create_tables(&self) -> Result<()> {
        let pool = self.pool.pool();

        // 创建疾病表
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS diseases (
                disease_id BIGSERIAL PRIMARY KEY,
                disease_name VARCHAR(255) NOT NULL,
                description TEXT,
                image_path VARCHAR(512),
                is_active BOOLEAN NOT NULL DEFAULT TRUE
            )
        "#).execute(pool).await.map_err(|e| SurveyError::Database(e.to_string()))?;

        // 创建问题表
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS questions (
                id BIGSERIAL PRIMARY KEY,
                disease_id BIGINT NOT NULL REFERENCES diseases(disease_id),
                question_text TEXT NOT NULL,
                "order" INTEGER NOT NULL DEFAULT 0,
                is_active BOOLEAN NOT NULL DEFAULT TRUE
            )
        "#).execute(pool).await.map_err(|e| SurveyError::Database(e.to_string()))?;

        // 创建选项表
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS choices (
                id BIGSERIAL PRIMARY KEY,
                question_id BIGINT NOT NULL REFERENCES questions(id),
                choice_text VARCHAR(255) NOT NULL,
                choice_order INTEGER NOT NULL DEFAULT 0
            )
        "#).execute(pool).await.map_err(|e| SurveyError::Database(e.to_string()))?;

        // 创建答复表
        sqlx::query(r#"
            CREATE TABLE IF NOT EXISTS responses (
                id BIGSERIAL PRIMARY KEY,
                responder_id BIGINT NOT NULL,
                disease_id BIGINT NOT NULL REFERENCES diseases(disease_id),
                question_id BIGINT NOT NULL REFERENCES questions(id),
                choice_id BIGINT NOT NULL
            )
        "#).execute(pool).await.map_err(|e| SurveyError::Database(e.to_string()))?;

        // 创建索引以优化查询性能
        self.create_indexes().await?;

        tracing::info!("Database tables created successfully");
        Ok(())
    }

    /// 创建数据库索引
    async fn create_indexes(&self) -> Result<()> {
        let pool = self.pool.pool();

        let indexes = vec![
            "CREATE INDEX IF NOT EXISTS idx_questions_disease_id ON questions(disease_id)",
            "CREATE INDEX IF NOT EXISTS idx_choices_question_id ON choices(question_id)",
            "CREATE INDEX IF NOT EXISTS idx_responses_disease_question ON responses(disease_id, question_id)",
        ];

        for index_sql in indexes {
            sqlx::query(index_sql)
                .execute(pool)
                .await
                .map_err(|e| SurveyError::Database(e.to_string()))?;
        }

        tracing::info!("Database indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl SurveyStore for DatabaseQueries {
    async fn list_active_diseases(&self) -> Result<Vec<Disease>> {
        let results = sqlx::query_as::<_, DbDisease>(
            "SELECT disease_id, disease_name FROM diseases WHERE is_active = TRUE ORDER BY disease_id"
        )
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| SurveyError::Database(e.to_string()))?;

        Ok(results.into_iter().map(Disease::from).collect())
    }

    async fn list_active_questions(&self, disease_id: DiseaseId) -> Result<Vec<Question>> {
        let results = sqlx::query_as::<_, DbQuestion>(r#"
            SELECT id, disease_id, question_text, "order" AS sort_order
            FROM questions
            WHERE disease_id = $1 AND is_active = TRUE
            ORDER BY "order", id
        "#)
        .bind(disease_id)
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| SurveyError::Database(e.to_string()))?;

        Ok(results.into_iter().map(Question::from).collect())
    }

    async fn list_choices(&self, question_id: QuestionId) -> Result<Vec<Choice>> {
        let results = sqlx::query_as::<_, DbChoice>(
            "SELECT id, question_id, choice_text, choice_order FROM choices WHERE question_id = $1 ORDER BY choice_order, id"
        )
        .bind(question_id)
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| SurveyError::Database(e.to_string()))?;

        Ok(results.into_iter().map(Choice::from).collect())
    }

    async fn list_responses(
        &self,
        disease_ids: &[DiseaseId],
        question_ids: &[QuestionId],
    ) -> Result<Vec<ResponseRecord>> {
        if disease_ids.is_empty() || question_ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = sqlx::query_as::<_, DbResponse>(r#"
            SELECT r.responder_id, r.disease_id, r.question_id, r.choice_id
            FROM responses r
            WHERE r.disease_id = ANY($1) AND r.question_id = ANY($2)
            ORDER BY r.id
        "#)
        .bind(disease_ids)
        .bind(question_ids)
        .fetch_all(self.pool.pool())
        .await
        .map_err(|e| SurveyError::Database(e.to_string()))?;

        tracing::debug!("Fetched {} response rows", results.len());
        Ok(results.into_iter().map(ResponseRecord::from).collect())
    }
}
