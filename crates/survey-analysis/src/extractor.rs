//! 查询抽取
//!
//! 主路径调用外部抽取服务，把返回文本当作不可信数据逐字段校验；服务出错、超时、
//! 返回格式错误、或校验后没有可用的疾病/变量时，改走基于关键词的启发式回退。
//! 只有两条路径都失败时才向调用方报告 `ExtractionFailure`。

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use survey_core::utils::normalize_phrase;
use survey_core::{ChartType, Disease, ExtractedQuery, Result, SurveyError};
use survey_integration::CompletionService;
use tracing::{debug, error, info, warn};

use crate::catalog::CatalogCache;
use crate::mapper::{VariableMapper, DEFAULT_FUZZY_THRESHOLD};
use crate::rules;

/// 抽取选项
#[derive(Debug, Clone)]
pub struct ExtractorOptions {
    /// 调用方对抽取服务施加的超时
    pub timeout: Duration,
    pub fuzzy_threshold: usize,
    pub default_chart_type: ChartType,
    /// 关闭时直接走启发式路径
    pub model_enabled: bool,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            default_chart_type: ChartType::Bar,
            model_enabled: true,
        }
    }
}

/// 抽取结果的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionSource {
    Model,
    Heuristic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub query: ExtractedQuery,
    pub source: ExtractionSource,
}

/// 抽取服务返回的原始结构，字段均未经校验
#[derive(Debug, Deserialize)]
struct RawExtraction {
    diseases: Vec<String>,
    variables: Vec<String>,
    #[serde(rename = "chartType", default)]
    chart_type: Option<serde_json::Value>,
}

/// 查询抽取器
pub struct QueryExtractor<'a> {
    catalog: &'a CatalogCache,
    service: &'a dyn CompletionService,
    options: &'a ExtractorOptions,
}

impl<'a> QueryExtractor<'a> {
    pub fn new(catalog: &'a CatalogCache, service: &'a dyn CompletionService, options: &'a ExtractorOptions) -> Self {
        Self { catalog, service, options }
    }

    /// 从自由文本抽取结构化查询。
    ///
    /// `requested_chart` 是分析人员显式选择的图表类型，优先于模型给出的类型。
    pub async fn extract(&self, text: &str, requested_chart: Option<ChartType>) -> Result<Extraction> {
        if text.trim().is_empty() {
            return Err(SurveyError::Validation("Please enter a description.".to_string()));
        }

        if self.options.model_enabled {
            match self.extract_with_model(text, requested_chart).await {
                Ok(query) => {
                    info!(diseases = ?query.diseases, variables = query.variables.len(), "Extraction resolved by model");
                    return Ok(Extraction { query, source: ExtractionSource::Model });
                }
                Err(e) if e.is_recoverable() => {
                    warn!(reason = %e, "Model extraction unusable, falling back to keyword heuristics")
                }
                Err(e) => {
                    error!(error = %e, "Model extraction failed");
                    return Err(e);
                }
            }
        }

        let query = self.extract_with_heuristics(text, requested_chart)?;
        info!(diseases = ?query.diseases, variables = query.variables.len(), "Extraction resolved by heuristics");
        Ok(Extraction { query, source: ExtractionSource::Heuristic })
    }

    async fn extract_with_model(&self, text: &str, requested_chart: Option<ChartType>) -> Result<ExtractedQuery> {
        let instruction = system_instruction(self.catalog);
        let completion = tokio::time::timeout(self.options.timeout, self.service.complete(text, &instruction))
            .await
            .map_err(|_| SurveyError::Service(format!("completion timed out after {:?}", self.options.timeout)))??;

        let raw = parse_completion(&completion)?;

        let diseases = self.validate_diseases(&raw.diseases);
        if diseases.is_empty() {
            return Err(self.no_diseases());
        }

        let variables = self.resolve_variables(&diseases, &raw.variables);
        if variables.is_empty() {
            return Err(self.no_variables());
        }

        let suggested = raw.chart_type.as_ref().and_then(|v| v.as_str());
        let chart_type = requested_chart
            .unwrap_or_else(|| ChartType::parse_or(suggested, self.options.default_chart_type));

        Ok(ExtractedQuery {
            diseases: diseases.iter().map(|d| d.name.clone()).collect(),
            variables,
            chart_type,
        })
    }

    fn extract_with_heuristics(&self, text: &str, requested_chart: Option<ChartType>) -> Result<ExtractedQuery> {
        let normalized = normalize_phrase(text);

        let diseases: Vec<&Disease> = self
            .catalog
            .diseases()
            .iter()
            .filter(|d| normalized.contains(&d.name.to_lowercase()))
            .collect();
        if diseases.is_empty() {
            return Err(self.no_diseases());
        }

        let tokens: Vec<String> = rules::candidate_tokens(&normalized)
            .into_iter()
            .map(String::from)
            .collect();
        debug!(?tokens, "Keyword tokens found in input");

        let variables = self.resolve_variables(&diseases, &tokens);
        if variables.is_empty() {
            return Err(self.no_variables());
        }

        Ok(ExtractedQuery {
            diseases: diseases.iter().map(|d| d.name.clone()).collect(),
            variables,
            chart_type: requested_chart.unwrap_or(self.options.default_chart_type),
        })
    }

    /// 按目录校验疾病名称（不区分大小写），保留首次出现的顺序
    fn validate_diseases(&self, names: &[String]) -> Vec<&'a Disease> {
        let mut diseases: Vec<&'a Disease> = Vec::new();
        for name in names {
            match self.catalog.find_disease(name) {
                Some(disease) if !diseases.iter().any(|d| d.id == disease.id) => diseases.push(disease),
                Some(_) => {}
                None => debug!(name = name.as_str(), "Dropping unknown disease"),
            }
        }
        diseases
    }

    /// 对每个疾病映射全部变量，只保留解析到该疾病真实问题的结果，按首次出现的顺序取并集
    fn resolve_variables(&self, diseases: &[&Disease], variables: &[String]) -> Vec<String> {
        let mapper = VariableMapper::new(self.catalog).with_threshold(self.options.fuzzy_threshold);
        let mut resolved: Vec<String> = Vec::new();

        for disease in diseases {
            for variable in variables {
                match mapper.resolve(variable, disease.id) {
                    Some(question) if !resolved.contains(&question.text) => resolved.push(question.text.clone()),
                    Some(_) => {}
                    None => debug!(variable = variable.as_str(), disease = disease.name.as_str(), "Dropping unresolved variable"),
                }
            }
        }
        resolved
    }

    fn no_diseases(&self) -> SurveyError {
        SurveyError::no_diseases(self.catalog.disease_names())
    }

    fn no_variables(&self) -> SurveyError {
        SurveyError::no_variables(rules::vocabulary().into_iter().map(String::from).collect())
    }
}

/// 抽取服务的系统指令
pub fn system_instruction(catalog: &CatalogCache) -> String {
    let quoted = |items: &[String]| {
        items
            .iter()
            .map(|s| format!("\"{}\"", s))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let diseases = catalog.disease_names();
    let variables: Vec<String> = rules::vocabulary().into_iter().map(String::from).collect();
    let chart_types: Vec<&str> = ChartType::ALL.iter().map(|c| c.as_str()).collect();

    format!(
        "Extract:\n\
         - Diseases (e.g., [{diseases}])\n\
         - Variables (e.g., [{variables}])\n\
         - Chart type (one of {charts}; default bar)\n\
         Return JSON with \"diseases\", \"variables\", \"chartType\". Use empty arrays for missing data. \
         Only include valid diseases ({names}). Ensure valid JSON. \
         Normalize \"climat change\" to \"climate change\". \
         If a variable is invalid, suggest the closest match from the provided examples.",
        diseases = quoted(diseases.as_slice()),
        variables = quoted(variables.as_slice()),
        charts = chart_types.join(", "),
        names = diseases.join(", "),
    )
}

fn fenced_block() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("static regex"))
}

/// 截取补全文本中的JSON主体：优先取代码块，其次取最外层花括号
fn json_body(text: &str) -> &str {
    if let Some(body) = fenced_block().captures(text).and_then(|c| c.get(1)) {
        return body.as_str().trim();
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text.trim(),
    }
}

fn parse_completion(text: &str) -> Result<RawExtraction> {
    serde_json::from_str(json_body(text)).map_err(|e| SurveyError::MalformedExtraction(e.to_string()))
}
