//! 启发式回退演示程序
//!
//! 抽取服务不可用或超时时，自由文本查询仍然通过关键词规则得到图表数据。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use survey_analytics::survey_database::MemorySurveyStore;
use survey_analytics::survey_integration::MockCompletionService;
use survey_analytics::{AnalysisEngine, ExtractorOptions, SurveyError};
use tracing::info;

fn sample_store() -> MemorySurveyStore {
    MemorySurveyStore::new()
        .with_disease(1, "Malaria")
        .with_disease(2, "Cholera")
        .with_question(10, 1, "Are you Male or Female?", 1)
        .with_question(11, 1, "How old are you?", 2)
        .with_question(12, 1, "Have you noticed climate change in your area?", 3)
        .with_question(20, 2, "Are you Male or Female?", 1)
        .with_question(21, 2, "Were you treated for cholera last year?", 2)
        .with_choice(101, 10, "Male", 1)
        .with_choice(102, 10, "Female", 2)
        .with_choice(201, 20, "Male", 1)
        .with_choice(202, 20, "Female", 2)
        .with_responses(1, 10, 101, 5)
        .with_responses(1, 10, 102, 3)
        .with_responses(2, 20, 201, 4)
        .with_responses(2, 20, 202, 6)
        .with_responses(1, 12, 1, 2)
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("🩺 启发式回退演示");
    println!("================================");

    let store = Arc::new(sample_store());
    let options = ExtractorOptions {
        timeout: Duration::from_millis(200),
        ..ExtractorOptions::default()
    };

    // 抽取服务直接报错
    let engine = AnalysisEngine::new(
        store.clone(),
        Arc::new(MockCompletionService::failing("service offline")),
        options.clone(),
    )
    .await?;

    for text in [
        "compare malaria and cholera by gender",
        "malaria and climat change",
        "dengue by gender",
        "cholera and income",
    ] {
        println!("\n📝 查询: {}", text);
        match engine.analyze(text, None).await {
            Ok(report) => {
                info!(source = ?report.source, outcome = ?report.outcome(), "Analysis finished");
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Err(SurveyError::ExtractionFailure(failure)) => println!("⚠️  {}", failure),
            Err(e) => return Err(e.into()),
        }
    }

    // 抽取服务无响应，超时后回退
    println!("\n⏰ 抽取服务无响应...");
    let engine = AnalysisEngine::new(store, Arc::new(MockCompletionService::hanging()), options).await?;
    let report = engine.analyze("cholera gender", None).await?;
    println!("来源: {:?}, 系列数: {}", report.source, report.chart.series.len());

    Ok(())
}
