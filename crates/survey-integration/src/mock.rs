//! 模拟抽取服务

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use survey_core::{Result, SurveyError};

use crate::completion::CompletionService;

#[derive(Debug, Clone)]
enum Behavior {
    Reply(String),
    Fail(String),
    Hang,
}

/// 按预设行为响应的抽取服务
#[derive(Debug)]
pub struct MockCompletionService {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl MockCompletionService {
    /// 每次调用都返回给定文本
    pub fn replying(text: &str) -> Self {
        Self::with_behavior(Behavior::Reply(text.to_string()))
    }

    /// 每次调用都返回服务错误
    pub fn failing(message: &str) -> Self {
        Self::with_behavior(Behavior::Fail(message.to_string()))
    }

    /// 调用永不返回，用于验证调用方超时
    pub fn hanging() -> Self {
        Self::with_behavior(Behavior::Hang)
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionService for MockCompletionService {
    async fn complete(&self, _prompt: &str, _system_instruction: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Fail(message) => Err(SurveyError::Service(message.clone())),
            Behavior::Hang => std::future::pending().await,
        }
    }
}
