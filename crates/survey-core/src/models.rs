//! 核心数据模型定义

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

pub type DiseaseId = i64;
pub type QuestionId = i64;
pub type ChoiceId = i64;
pub type ResponderId = i64;

/// 疾病（只读参考数据）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disease {
    pub id: DiseaseId,
    pub name: String,
}

/// 问卷问题，隶属于唯一的疾病
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub disease_id: DiseaseId,
    pub text: String,
    pub order: i32, // 同一疾病内的展示顺序
}

/// 问题选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub question_id: QuestionId,
    pub text: String,
    pub order: i32,
}

impl Choice {
    /// 未存储选项的问题在聚合时使用的默认三选项
    pub fn default_set(question_id: QuestionId) -> Vec<Choice> {
        ["Male", "Female", "Other"]
            .iter()
            .enumerate()
            .map(|(idx, text)| Choice {
                id: idx as ChoiceId + 1,
                question_id,
                text: (*text).to_string(),
                order: idx as i32 + 1,
            })
            .collect()
    }
}

/// 问卷答复（事实表的一行）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub responder_id: ResponderId,
    pub disease_id: DiseaseId,
    pub question_id: QuestionId,
    pub choice_id: ChoiceId,
}

/// 图表类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
    Doughnut,
    Bubble,
}

impl ChartType {
    pub const ALL: [ChartType; 5] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Pie,
        ChartType::Doughnut,
        ChartType::Bubble,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Doughnut => "doughnut",
            ChartType::Bubble => "bubble",
        }
    }

    /// 解析图表类型，缺失或无法识别时使用给定默认值
    pub fn parse_or(value: Option<&str>, default: ChartType) -> ChartType {
        value.and_then(|v| v.parse().ok()).unwrap_or(default)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bar" => Ok(ChartType::Bar),
            "line" => Ok(ChartType::Line),
            "pie" => Ok(ChartType::Pie),
            "doughnut" => Ok(ChartType::Doughnut),
            "bubble" => Ok(ChartType::Bubble),
            other => Err(format!("unknown chart type: {}", other)),
        }
    }
}

/// 从自由文本中抽取出的结构化查询（按请求生成，不持久化）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedQuery {
    /// 目录中的疾病名称（已校正大小写）
    pub diseases: Vec<String>,
    /// 规范化后的问题原文
    pub variables: Vec<String>,
    pub chart_type: ChartType,
}

/// 图表中的一个数据系列：某问题的某个选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    /// "{问题}: {选项}"
    pub label: String,
    /// 与 `ChartDataset::labels` 一一对应
    pub values: Vec<u64>,
    pub color: Rgb,
    pub question: String,
    pub border_width: u32,
}

impl ChartSeries {
    pub fn is_all_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0)
    }
}

/// 可直接用于绘图的聚合结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    /// 疾病名称，按请求顺序
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
    /// 所有请求问题的原文（即使对应系列已被剔除）
    pub question_texts: Vec<String>,
}

impl ChartDataset {
    /// 没有任何系列时视为“无数据”
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
