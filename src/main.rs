use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod rules;
mod services;
mod utils;

use config::Config;
use rules::{ConfigRuleSource, RuleStore};
use services::{create_notifier, create_window_enumerator, list_windows, Watcher};

#[derive(Parser, Debug)]
#[command(name = "lurkwind")]
#[command(about = "Наблюдает за окнами рабочего стола и применяет правила по заголовку и классу")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "lurkwind.toml")]
    config: String,

    /// Режим сухого запуска (симулированный рабочий стол)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (по умолчанию из конфигурации)
    #[arg(long)]
    log_level: Option<String>,

    /// Вывести список окон и выйти
    #[arg(long)]
    list_windows: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Конфигурация нужна раньше логирования: в ней уровень и формат
    let config = Arc::new(Config::load(&args.config)?);

    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;

    info!("Запуск lurkwind v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - используется симулированный рабочий стол");
    }

    let windows = create_window_enumerator(&config, args.dry_run)?;

    if args.list_windows {
        for line in list_windows(windows.as_ref())? {
            println!("{}", line);
        }
        return Ok(());
    }

    let rules = RuleStore::new(config.rule_list()?);
    let notifier = create_notifier(&config, args.dry_run).await;
    let watcher = Watcher::new(config.clone(), windows, notifier, rules)
        .with_rule_source(ConfigRuleSource::new(&args.config));

    info!("Все компоненты инициализированы");

    let watcher_handle = tokio::spawn(async move {
        if let Err(e) = watcher.run().await {
            error!("Ошибка в Watcher: {}", e);
        }
    });

    // Ожидание сигнала завершения
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Получен сигнал завершения (Ctrl+C)");
        }
        Err(err) => {
            error!("Ошибка при ожидании сигнала завершения: {}", err);
        }
    }

    info!("Завершение работы...");

    watcher_handle.abort();

    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    match tokio::time::timeout(shutdown_timeout, watcher_handle).await {
        Ok(_) => info!("Watcher завершил работу корректно"),
        Err(_) => warn!("Таймаут при завершении Watcher"),
    }

    info!("lurkwind завершил работу");
    Ok(())
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);

    if format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }

    Ok(())
}
