//! # 调查管理模块
//!
//! 提供分层配置管理：内置默认值、配置文件、`SURVEY_` 前缀的环境变量依次覆盖，加载后统一验证。

pub mod config;

pub use config::{
    AnalysisConfig, AppConfig, ConfigManager, DatabaseConfig, ExtractionConfig, LoggingConfig,
};
