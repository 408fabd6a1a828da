//! # 调查数据库模块
//!
//! 负责疾病、问题、选项和答复数据的读取，提供PostgreSQL连接池与 `SurveyStore` 的实现，
//! 以及用于测试和演示的内存存储。

pub mod connection;
pub mod memory;
pub mod models;
pub mod queries;

// 重新导出主要类型
pub use connection::DatabasePool;
pub use memory::MemorySurveyStore;
pub use queries::DatabaseQueries;
