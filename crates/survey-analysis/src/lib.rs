//! # 调查分析模块
//!
//! 把分析人员的自由文本（如 "cholera vs climate change by gender"）转换为可绘图的聚合结果：
//! - 目录缓存：会话级的疾病、问题、选项只读快照
//! - 关键词规则表：变量映射与启发式回退共用的有序规则
//! - 变量映射：把松散的变量短语解析为某疾病下的规范问题原文
//! - 查询抽取：调用外部抽取服务并逐字段校验，失败时走启发式回退
//! - 答复聚合：按（问题，选项）生成系列，按疾病计数，确定性配色

pub mod aggregator;
pub mod catalog;
pub mod engine;
pub mod extractor;
pub mod mapper;
pub mod rules;

// 重新导出主要类型
pub use aggregator::{ResponseAggregator, PALETTE};
pub use catalog::CatalogCache;
pub use engine::{AnalysisEngine, AnalysisOutcome, AnalysisReport, ComparisonReport};
pub use extractor::{Extraction, ExtractionSource, ExtractorOptions, QueryExtractor};
pub use mapper::{VariableMapper, DEFAULT_FUZZY_THRESHOLD};
pub use rules::{KeywordRule, Trigger, KEYWORD_RULES};

#[cfg(test)]
pub(crate) mod fixtures;
