use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// 应用配置
///
/// 所有默认值在进程启动时一次性解析，运行期间不再回退判断。
/// 加载顺序：内置默认值 → TOML 配置文件 → `REMINDER__` 前缀环境变量。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub notifier: NotifierConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite 连接串，默认 `sqlite://reminder.db`
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub bind_address: String,
    pub cors_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// 通知回调地址，未配置时仅记录日志
    pub webhook_url: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://reminder.db".to_string(),
                max_connections: 5,
                min_connections: 1,
                connection_timeout_seconds: 30,
            },
            api: ApiConfig {
                bind_address: "0.0.0.0:8080".to_string(),
                cors_enabled: true,
            },
            notifier: NotifierConfig {
                webhook_url: None,
                timeout_seconds: 10,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                log_format: "pretty".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// 加载配置
    ///
    /// `config_path` 指定时文件必须存在；未指定时按默认路径查找，
    /// 找不到也不报错，使用内置默认值。
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder()
            .set_default("database.url", "sqlite://reminder.db")?
            .set_default("database.max_connections", 5)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connection_timeout_seconds", 30)?
            .set_default("api.bind_address", "0.0.0.0:8080")?
            .set_default("api.cors_enabled", true)?
            .set_default("notifier.timeout_seconds", 10)?
            .set_default("observability.log_level", "info")?
            .set_default("observability.log_format", "pretty")?;

        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        } else {
            let default_paths = ["config/reminder.toml", "reminder.toml"];
            for path in &default_paths {
                if Path::new(path).exists() {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                    break;
                }
            }
        }

        let config: AppConfig = builder
            .add_source(
                Environment::with_prefix("REMINDER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("解析配置失败")?;

        config.validate()?;
        Ok(config)
    }

    /// 校验配置一致性
    pub fn validate(&self) -> Result<()> {
        if !self.database.url.starts_with("sqlite:") {
            return Err(anyhow::anyhow!(
                "database.url 必须以 sqlite: 开头: {}",
                self.database.url
            ));
        }
        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!("database.max_connections 必须大于 0"));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(anyhow::anyhow!(
                "database.min_connections 不能大于 max_connections"
            ));
        }
        self.api
            .bind_address
            .parse::<SocketAddr>()
            .with_context(|| format!("api.bind_address 无效: {}", self.api.bind_address))?;
        if self.notifier.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("notifier.timeout_seconds 必须大于 0"));
        }
        match self.observability.log_format.as_str() {
            "pretty" | "json" => {}
            other => return Err(anyhow::anyhow!("observability.log_format 无效: {other}")),
        }
        Ok(())
    }
}
