//! 错误定义模块

use std::fmt;

use thiserror::Error;

/// 调查分析系统统一错误类型
#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("数据库错误: {0}")]
    Database(String),

    /// 抽取服务调用失败（网络、HTTP状态、超时）
    #[error("抽取服务错误: {0}")]
    Service(String),

    /// 抽取服务返回了无法解析的内容
    #[error("抽取结果格式错误: {0}")]
    MalformedExtraction(String),

    /// 模型路径与启发式路径均未得到可用结果
    #[error("{0}")]
    ExtractionFailure(ExtractionFailure),

    #[error("验证错误: {0}")]
    Validation(String),
}

impl SurveyError {
    /// 模型路径上可通过启发式回退恢复的错误：服务故障、格式错误、校验后无可用结果
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SurveyError::Service(_) | SurveyError::MalformedExtraction(_) | SurveyError::ExtractionFailure(_)
        )
    }

    pub fn no_diseases(suggestions: Vec<String>) -> Self {
        SurveyError::ExtractionFailure(ExtractionFailure {
            kind: FailureKind::NoDiseases,
            suggestions,
        })
    }

    pub fn no_variables(suggestions: Vec<String>) -> Self {
        SurveyError::ExtractionFailure(ExtractionFailure {
            kind: FailureKind::NoVariables,
            suggestions,
        })
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for SurveyError {
    fn from(err: sqlx::Error) -> Self {
        SurveyError::Database(err.to_string())
    }
}

/// 抽取失败的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NoDiseases,
    NoVariables,
}

/// 抽取失败详情，附带可提示给用户的有效示例
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionFailure {
    pub kind: FailureKind,
    pub suggestions: Vec<String>,
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subject = match self.kind {
            FailureKind::NoDiseases => "diseases found",
            FailureKind::NoVariables => "variables",
        };
        if self.suggestions.is_empty() {
            write!(f, "No valid {}.", subject)
        } else {
            write!(f, "No valid {}. Try: {}.", subject, self.suggestions.join(", "))
        }
    }
}

/// 调查分析系统统一结果类型
pub type Result<T> = std::result::Result<T, SurveyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_messages_distinguish_kind() {
        let err = SurveyError::no_diseases(vec!["Malaria".into(), "Cholera".into()]);
        assert_eq!(err.to_string(), "No valid diseases found. Try: Malaria, Cholera.");

        let err = SurveyError::no_variables(vec!["age".into(), "gender".into()]);
        assert_eq!(err.to_string(), "No valid variables. Try: age, gender.");
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(SurveyError::Service("timeout".into()).is_recoverable());
        assert!(SurveyError::MalformedExtraction("bad json".into()).is_recoverable());
        assert!(!SurveyError::Database("down".into()).is_recoverable());
        assert!(SurveyError::no_diseases(vec![]).is_recoverable());
        assert!(!SurveyError::Validation("empty".into()).is_recoverable());
    }
}
