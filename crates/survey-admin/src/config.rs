//! 配置管理
//!
//! 提供统一的配置加载和验证功能

use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use survey_core::ChartType;
use tracing::{error, info};

/// 系统完整配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 数据库配置
    pub database: DatabaseConfig,
    /// 抽取服务配置
    pub extraction: ExtractionConfig,
    /// 分析配置
    pub analysis: AnalysisConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 连接字符串
    pub connection_string: String,
    /// 最大连接数
    pub max_connections: u32,
    /// 连接超时时间（秒）
    pub connect_timeout_secs: u64,
}

/// 抽取服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// 是否调用外部抽取服务，关闭时只使用关键词启发式
    pub enabled: bool,
    /// 服务基础URL
    pub base_url: String,
    /// Bearer令牌
    pub api_key: Option<String>,
    /// 模型名称
    pub model: String,
    /// 采样温度
    pub temperature: f32,
    /// 调用超时时间（秒），超时后走启发式回退
    pub timeout_secs: u64,
}

/// 分析配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 模糊匹配阈值，最小编辑距离须严格小于该值
    pub fuzzy_threshold: usize,
    /// 默认图表类型
    pub default_chart_type: ChartType,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别或过滤表达式
    pub level: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection_string: "postgres://localhost/survey".to_string(),
            max_connections: 5,
            connect_timeout_secs: 10,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            timeout_secs: 20,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 10,
            default_chart_type: ChartType::Bar,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl ExtractionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 加载配置：默认值 → 配置文件（可选）→ 环境变量
    ///
    /// 环境变量形如 `SURVEY_DATABASE__CONNECTION_STRING`、`SURVEY_EXTRACTION__TIMEOUT_SECS`。
    pub fn load(config_path: Option<&str>) -> Result<AppConfig> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&AppConfig::default()).context("Failed to build default configuration")?,
        );

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("SURVEY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration sources")?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Self::validate(&config)?;
        match config_path {
            Some(path) => info!("Configuration loaded successfully from: {}", path),
            None => info!("Configuration loaded from defaults and environment"),
        }
        Ok(config)
    }

    /// 从TOML文本加载配置（覆盖默认值），不读取环境变量
    pub fn from_toml_str(content: &str) -> Result<AppConfig> {
        let settings = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .context("Failed to parse configuration")?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<()> {
        let checks: [(&str, bool, &str); 5] = [
            (
                "database.connection_string",
                !config.database.connection_string.trim().is_empty(),
                "connection string must not be empty",
            ),
            (
                "database.max_connections",
                config.database.max_connections > 0,
                "at least one connection is required",
            ),
            (
                "extraction.timeout_secs",
                config.extraction.timeout_secs > 0,
                "timeout must be positive",
            ),
            (
                "extraction.base_url",
                !config.extraction.enabled || !config.extraction.base_url.trim().is_empty(),
                "base URL is required when extraction is enabled",
            ),
            (
                "analysis.fuzzy_threshold",
                config.analysis.fuzzy_threshold > 0,
                "threshold must be greater than zero",
            ),
        ];

        for (field, ok, message) in checks {
            if !ok {
                error!("Configuration validation failed for {}: {}", field, message);
                return Err(anyhow::anyhow!("Invalid configuration {}: {}", field, message));
            }
        }

        info!("Configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(ConfigManager::validate(&config).is_ok());
        assert_eq!(config.analysis.fuzzy_threshold, 10);
        assert_eq!(config.analysis.default_chart_type, ChartType::Bar);
        assert_eq!(config.extraction.timeout(), Duration::from_secs(20));
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let config = ConfigManager::from_toml_str(
            r#"
            [extraction]
            enabled = false
            timeout_secs = 5

            [analysis]
            fuzzy_threshold = 6
            default_chart_type = "line"
            "#,
        )
        .unwrap();

        assert!(!config.extraction.enabled);
        assert_eq!(config.extraction.timeout_secs, 5);
        assert_eq!(config.analysis.fuzzy_threshold, 6);
        assert_eq!(config.analysis.default_chart_type, ChartType::Line);
        // 未指定的字段保留默认值
        assert_eq!(config.extraction.model, "gpt-4o");
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ConfigManager::from_toml_str("[analysis]\nfuzzy_threshold = 0").is_err());
        assert!(ConfigManager::from_toml_str("[extraction]\ntimeout_secs = 0").is_err());
        assert!(ConfigManager::from_toml_str("[database]\nconnection_string = \"\"").is_err());
        assert!(ConfigManager::from_toml_str("[analysis]\ndefault_chart_type = \"donut\"").is_err());
    }
}
