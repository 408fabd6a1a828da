//! # 调查集成模块
//!
//! 提供与外部语言模型抽取服务的集成：
//! - `CompletionService` 协作方接口
//! - 兼容 OpenAI chat-completions 协议的HTTP客户端
//! - 可编排行为的模拟服务，用于测试和演示

pub mod completion;
pub mod mock;

pub use completion::{Authentication, ChatCompletionClient, CompletionConfig, CompletionService};
pub use mock::MockCompletionService;
