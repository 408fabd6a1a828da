//! 数据库模型

use sqlx::FromRow;
use survey_core::models::*;

// 数据库表模型 - 使用FromRow trait用于SQL查询

/// 数据库疾病表
#[derive(Debug, FromRow)]
pub struct DbDisease {
    pub disease_id: i64,
    pub disease_name: String,
}

impl From<DbDisease> for Disease {
    fn from(db_disease: DbDisease) -> Self {
        Disease {
            id: db_disease.disease_id,
            name: db_disease.disease_name,
        }
    }
}

/// 数据库问题表
#[derive(Debug, FromRow)]
pub struct DbQuestion {
    pub id: i64,
    pub disease_id: i64,
    pub question_text: String,
    pub sort_order: i32, // 列名为 "order"，查询时起别名
}

impl From<DbQuestion> for Question {
    fn from(db_question: DbQuestion) -> Self {
        Question {
            id: db_question.id,
            disease_id: db_question.disease_id,
            text: db_question.question_text,
            order: db_question.sort_order,
        }
    }
}

/// 数据库选项表
#[derive(Debug, FromRow)]
pub struct DbChoice {
    pub id: i64,
    pub question_id: i64,
    pub choice_text: String,
    pub choice_order: i32,
}

impl From<DbChoice> for Choice {
    fn from(db_choice: DbChoice) -> Self {
        Choice {
            id: db_choice.id,
            question_id: db_choice.question_id,
            text: db_choice.choice_text,
            order: db_choice.choice_order,
        }
    }
}

/// 数据库答复表
#[derive(Debug, FromRow)]
pub struct DbResponse {
    pub responder_id: i64,
    pub disease_id: i64,
    pub question_id: i64,
    pub choice_id: i64,
}

impl From<DbResponse> for ResponseRecord {
    fn from(db_response: DbResponse) -> Self {
        ResponseRecord {
            responder_id: db_response.responder_id,
            disease_id: db_response.disease_id,
            question_id: db_response.question_id,
            choice_id: db_response.choice_id,
        }
    }
}
