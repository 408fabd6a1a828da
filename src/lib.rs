//! # 疾病调查对比分析
//!
//! 汇总各子crate的公共接口：
//!
//! - `survey_core`: 领域模型、错误类型与存储接口
//! - `survey_database`: PostgreSQL 与内存存储实现
//! - `survey_integration`: 外部抽取服务客户端
//! - `survey_analysis`: 目录缓存、变量映射、查询抽取与答复聚合

pub use survey_analysis;
pub use survey_core;
pub use survey_database;
pub use survey_integration;

pub use survey_analysis::{AnalysisEngine, AnalysisReport, ComparisonReport, ExtractorOptions};
pub use survey_core::{ChartType, Result, SurveyError};
