//! 调查分析命令行程序

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use survey_admin::{AppConfig, ConfigManager};
use survey_analysis::{AnalysisEngine, ExtractorOptions};
use survey_core::{ChartType, DiseaseId, QuestionId, SurveyError};
use survey_database::{DatabasePool, DatabaseQueries};
use survey_integration::{Authentication, ChatCompletionClient, CompletionConfig};
use tracing::{error, info, warn};

/// 调查分析命令行参数
#[derive(Parser, Debug)]
#[command(name = "survey-server")]
#[command(about = "疾病调查问卷对比分析")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别（覆盖配置文件）
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 分析自由文本查询
    Analyze {
        /// 查询文本，例如 "compare malaria and cholera by gender"
        text: String,

        /// 图表类型：bar、line、pie、doughnut、bubble
        #[arg(long)]
        chart_type: Option<ChartType>,
    },
    /// 按疾病和问题ID直接对比
    Compare {
        /// 疾病ID，逗号分隔
        #[arg(long, value_delimiter = ',', required = true)]
        diseases: Vec<DiseaseId>,

        /// 问题ID，逗号分隔
        #[arg(long, value_delimiter = ',', required = true)]
        questions: Vec<QuestionId>,

        /// 图表类型，默认取配置值
        #[arg(long)]
        chart_type: Option<ChartType>,
    },
}

fn extractor_options(config: &AppConfig) -> ExtractorOptions {
    ExtractorOptions {
        timeout: config.extraction.timeout(),
        fuzzy_threshold: config.analysis.fuzzy_threshold,
        default_chart_type: config.analysis.default_chart_type,
        model_enabled: config.extraction.enabled,
    }
}

fn completion_config(config: &AppConfig) -> CompletionConfig {
    let authentication = match &config.extraction.api_key {
        Some(token) => Authentication::BearerToken { token: token.clone() },
        None => Authentication::None,
    };

    CompletionConfig {
        base_url: config.extraction.base_url.clone(),
        authentication,
        model: config.extraction.model.clone(),
        temperature: config.extraction.temperature,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = ConfigManager::load(args.config.as_deref())?;

    // 初始化日志
    let log_level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    info!("启动调查分析...");
    if config.extraction.enabled && config.extraction.api_key.is_none() {
        warn!("No API key configured for the extraction service; requests may be rejected");
    }

    let pool = DatabasePool::connect(
        &config.database.connection_string,
        config.database.max_connections,
        config.database.connect_timeout(),
    )
    .await
    .context("Failed to connect to database")?;

    let store = Arc::new(DatabaseQueries::new(pool));
    let service = Arc::new(ChatCompletionClient::new(completion_config(&config)));
    let engine = AnalysisEngine::new(store, service, extractor_options(&config))
        .await
        .context("Failed to load survey catalog")?;

    let output = match args.command {
        Command::Analyze { text, chart_type } => match engine.analyze(&text, chart_type).await {
            Ok(report) => serde_json::to_string_pretty(&report)?,
            Err(SurveyError::ExtractionFailure(failure)) => {
                error!("{}", failure);
                return Err(SurveyError::ExtractionFailure(failure).into());
            }
            Err(e) => {
                error!("Analysis failed: {}", e);
                return Err(e.into());
            }
        },
        Command::Compare {
            diseases,
            questions,
            chart_type,
        } => {
            let chart_type = chart_type.unwrap_or(config.analysis.default_chart_type);
            let report = engine
                .compare_selected(&diseases, &questions, chart_type)
                .await
                .map_err(|e| {
                    error!("Comparison failed: {}", e);
                    e
                })?;
            serde_json::to_string_pretty(&report)?
        }
    };

    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compare_command() {
        let args = Args::try_parse_from([
            "survey-server",
            "compare",
            "--diseases",
            "1,2",
            "--questions",
            "10,11",
            "--chart-type",
            "pie",
        ])
        .unwrap();

        match args.command {
            Command::Compare {
                diseases,
                questions,
                chart_type,
            } => {
                assert_eq!(diseases, vec![1, 2]);
                assert_eq!(questions, vec![10, 11]);
                assert_eq!(chart_type, Some(ChartType::Pie));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_analyze_command() {
        let args = Args::try_parse_from(["survey-server", "-l", "debug", "analyze", "malaria by gender"]).unwrap();
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(matches!(
            args.command,
            Command::Analyze { ref text, chart_type: None } if text == "malaria by gender"
        ));
    }

    #[test]
    fn test_compare_accepts_doughnut() {
        let args = Args::try_parse_from([
            "survey-server",
            "compare",
            "--diseases",
            "1",
            "--questions",
            "10",
            "--chart-type",
            "doughnut",
        ])
        .unwrap();

        assert!(matches!(
            args.command,
            Command::Compare { chart_type: Some(ChartType::Doughnut), .. }
        ));
    }

    #[test]
    fn test_rejects_unknown_chart_type() {
        assert!(Args::try_parse_from(["survey-server", "analyze", "x", "--chart-type", "donut"]).is_err());
    }

    #[test]
    fn test_config_conversions() {
        let mut config = AppConfig::default();
        config.extraction.api_key = Some("secret".to_string());
        config.extraction.enabled = false;
        config.analysis.fuzzy_threshold = 7;

        let options = extractor_options(&config);
        assert!(!options.model_enabled);
        assert_eq!(options.fuzzy_threshold, 7);
        assert_eq!(options.timeout, config.extraction.timeout());

        let completion = completion_config(&config);
        assert!(matches!(completion.authentication, Authentication::BearerToken { ref token } if token == "secret"));
        assert_eq!(completion.model, "gpt-4o");
    }
}
