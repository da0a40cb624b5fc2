use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Arg, Command};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reminder_api::{create_routes, AppState};
use reminder_core::services::{NotifyService, TaskService};
use reminder_core::AppConfig;
use reminder_infrastructure::database::sqlite::{
    run_migrations, SqliteScheduleRepository, SqliteTaskRepository,
};
use reminder_infrastructure::database::create_pool;
use reminder_infrastructure::build_notifier;

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let matches = Command::new("reminder-scheduler")
        .version("0.1.0")
        .about("任务提醒调度系统")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式")
                .value_parser(["json", "pretty"]),
        )
        .get_matches();

    // 加载配置，命令行参数覆盖配置文件中的日志设置
    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let config = AppConfig::load(config_path).context("加载配置失败")?;

    let log_level = matches
        .get_one::<String>("log-level")
        .cloned()
        .unwrap_or_else(|| config.observability.log_level.clone());
    let log_format = matches
        .get_one::<String>("log-format")
        .cloned()
        .unwrap_or_else(|| config.observability.log_format.clone());
    init_logging(&log_level, &log_format);

    info!("启动任务提醒调度系统");
    if let Some(path) = config_path {
        info!("配置文件: {path}");
    }

    // 初始化数据库
    let pool = create_pool(&config.database).await?;
    run_migrations(&pool).await?;

    // 组装仓储与服务
    let task_repo = Arc::new(SqliteTaskRepository::new(pool.clone()));
    let schedule_repo = Arc::new(SqliteScheduleRepository::new(pool));
    let notifier = build_notifier(&config.notifier)?;

    let state = AppState {
        task_service: Arc::new(TaskService::new(task_repo.clone(), schedule_repo.clone())),
        notify_service: Arc::new(NotifyService::new(task_repo, schedule_repo, notifier)),
    };

    let mut app = create_routes(state).layer(TraceLayer::new_for_http());
    if config.api.cors_enabled {
        app = app.layer(CorsLayer::permissive());
    }

    let listener = TcpListener::bind(&config.api.bind_address)
        .await
        .with_context(|| format!("监听地址失败: {}", config.api.bind_address))?;
    info!("API服务器监听于 http://{}", config.api.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API服务器运行失败")?;

    info!("服务已退出");
    Ok(())
}

/// 初始化日志系统
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("监听关闭信号失败: {e}");
        return;
    }
    info!("收到关闭信号，开始优雅关闭...");
}
