//! 显式对比演示程序
//!
//! 按疾病和问题ID直接聚合答复，并展示问题配色与选项明暗变化。

use std::sync::Arc;

use anyhow::Result;
use survey_analytics::survey_database::MemorySurveyStore;
use survey_analytics::survey_integration::MockCompletionService;
use survey_analytics::{AnalysisEngine, ChartType, ExtractorOptions};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("📊 显式对比演示");
    println!("================================");

    let store = MemorySurveyStore::new()
        .with_disease(1, "Malaria")
        .with_disease(2, "Cholera")
        .with_question(10, 1, "Are you Male or Female?", 1)
        .with_question(11, 1, "How old are you?", 2)
        .with_question(20, 2, "Are you Male or Female?", 1)
        .with_question(21, 2, "How old are you?", 2)
        .with_choice(101, 10, "Male", 1)
        .with_choice(102, 10, "Female", 2)
        .with_responses(1, 10, 101, 7)
        .with_responses(1, 10, 102, 9)
        .with_responses(1, 11, 1, 2)
        .with_responses(2, 21, 2, 4)
        .with_responses(2, 21, 3, 1);

    let options = ExtractorOptions {
        model_enabled: false,
        ..ExtractorOptions::default()
    };
    let engine = AnalysisEngine::new(
        Arc::new(store),
        Arc::new(MockCompletionService::failing("unused")),
        options,
    )
    .await?;

    let report = engine.compare_selected(&[1, 2], &[10, 11, 21], ChartType::Bar).await?;

    println!("\n疾病: {}", report.chart.labels.join(", "));
    for series in &report.chart.series {
        println!("  {:<40} {} {:?}", series.label, series.color, series.values);
    }

    // 未选择任何问题时返回校验错误
    if let Err(e) = engine.compare_selected(&[1], &[], ChartType::Line).await {
        println!("\n⚠️  {}", e);
    }

    Ok(())
}
