//! # Survey Core
//!
//! 调查分析系统的核心模块，提供基础数据结构、错误定义、存储接口和通用工具。

pub mod color;
pub mod error;
pub mod models;
pub mod store;
pub mod utils;

pub use color::Rgb;
pub use error::{ExtractionFailure, FailureKind, Result, SurveyError};
pub use models::*;
pub use store::SurveyStore;
