//! 分析引擎
//!
//! 对外暴露两个入口：自由文本分析 `analyze` 和显式选择对比 `compare_selected`。
//! 每个请求顺序执行抽取与聚合，只共享只读的目录缓存。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use survey_core::{
    ChartDataset, ChartType, DiseaseId, ExtractedQuery, QuestionId, Result, SurveyError, SurveyStore,
};
use survey_integration::CompletionService;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::aggregator::ResponseAggregator;
use crate::catalog::CatalogCache;
use crate::extractor::{ExtractionSource, ExtractorOptions, QueryExtractor};

/// 分析结果的展示状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Chart,
    /// 查询有效但没有匹配的答复
    NoData,
}

/// 自由文本分析报告
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub query: ExtractedQuery,
    pub source: ExtractionSource,
    pub chart: ChartDataset,
}

impl AnalysisReport {
    pub fn outcome(&self) -> AnalysisOutcome {
        if self.chart.is_empty() {
            AnalysisOutcome::NoData
        } else {
            AnalysisOutcome::Chart
        }
    }
}

/// 显式选择对比报告
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub chart_type: ChartType,
    pub chart: ChartDataset,
}

/// 分析引擎
pub struct AnalysisEngine {
    store: Arc<dyn SurveyStore>,
    service: Arc<dyn CompletionService>,
    catalog: CatalogCache,
    options: ExtractorOptions,
}

impl AnalysisEngine {
    /// 创建引擎并加载会话目录
    pub async fn new(
        store: Arc<dyn SurveyStore>,
        service: Arc<dyn CompletionService>,
        options: ExtractorOptions,
    ) -> Result<Self> {
        let catalog = CatalogCache::load(store.as_ref()).await?;
        Ok(Self::with_catalog(store, service, catalog, options))
    }

    pub fn with_catalog(
        store: Arc<dyn SurveyStore>,
        service: Arc<dyn CompletionService>,
        catalog: CatalogCache,
        options: ExtractorOptions,
    ) -> Self {
        Self {
            store,
            service,
            catalog,
            options,
        }
    }

    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    /// 自由文本分析：抽取结构化查询，再聚合对应答复
    pub async fn analyze(&self, text: &str, chart_type: Option<ChartType>) -> Result<AnalysisReport> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("analyze", %request_id);

        self.run_analysis(request_id, text, chart_type)
            .instrument(span)
            .await
    }

    async fn run_analysis(
        &self,
        request_id: Uuid,
        text: &str,
        chart_type: Option<ChartType>,
    ) -> Result<AnalysisReport> {
        info!("Analyzing input: {}", text);

        let extraction = QueryExtractor::new(&self.catalog, self.service.as_ref(), &self.options)
            .extract(text, chart_type)
            .await?;

        let disease_ids: Vec<DiseaseId> = extraction
            .query
            .diseases
            .iter()
            .filter_map(|name| self.catalog.find_disease(name).map(|d| d.id))
            .collect();
        let question_ids = self.catalog.question_ids_for(&disease_ids, &extraction.query.variables);

        let chart = self.chart_for(&disease_ids, &question_ids).await?;

        Ok(AnalysisReport {
            request_id,
            generated_at: Utc::now(),
            query: extraction.query,
            source: extraction.source,
            chart,
        })
    }

    /// 显式选择对比：直接按疾病和问题ID聚合
    pub async fn compare_selected(
        &self,
        disease_ids: &[DiseaseId],
        question_ids: &[QuestionId],
        chart_type: ChartType,
    ) -> Result<ComparisonReport> {
        if disease_ids.is_empty() || question_ids.is_empty() {
            return Err(SurveyError::Validation(
                "Please select at least one disease and one question.".to_string(),
            ));
        }

        let disease_ids = dedup(disease_ids);
        let question_ids = dedup(question_ids);
        info!(
            diseases = ?disease_ids,
            questions = ?question_ids,
            %chart_type,
            "Comparing selected diseases"
        );

        let chart = self.chart_for(&disease_ids, &question_ids).await?;
        Ok(ComparisonReport { chart_type, chart })
    }

    async fn chart_for(&self, disease_ids: &[DiseaseId], question_ids: &[QuestionId]) -> Result<ChartDataset> {
        let responses = self
            .store
            .list_responses(disease_ids, question_ids)
            .await
            .map_err(|e| {
                error!("Failed to load responses: {}", e);
                e
            })?;

        let choices = self.catalog.choices_by_question(question_ids);
        let chart = ResponseAggregator::new(&self.catalog).aggregate(disease_ids, question_ids, &responses, &choices);

        if chart.is_empty() {
            warn!("No data available for the selected criteria");
        }
        Ok(chart)
    }
}

/// 去重并保留首次出现的顺序
fn dedup<T: Copy + PartialEq>(ids: &[T]) -> Vec<T> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    unique
}
