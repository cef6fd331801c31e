mod command;
mod dbus;

pub use command::CommandNotifier;
pub use dbus::DBusNotifier;

use crate::config::Config;
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

/// Получатель сводных уведомлений.
///
/// Отправка "выстрелил и забыл": ошибки только логируются.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn show(&self, text: &str, timeout: Duration);
}

/// Пишет уведомления в лог (dry-run и запасной вариант)
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn show(&self, text: &str, timeout: Duration) {
        for line in text.lines() {
            info!("[УВЕДОМЛЕНИЕ {}мс] {}", timeout.as_millis(), line);
        }
    }
}

/// Factory function to create a notification sink; falls back to the log when
/// the configured method is unavailable
pub async fn create_notifier(config: &Config, dry_run: bool) -> Box<dyn NotificationSink> {
    if dry_run {
        return Box::new(LogNotifier);
    }

    let app_name = config.notification.app_name.as_str();
    let created: Result<Box<dyn NotificationSink>> = match config.notification.method.as_str() {
        "dbus" => DBusNotifier::connect(app_name)
            .await
            .map(|n| Box::new(n) as Box<dyn NotificationSink>),
        "notify-send" => CommandNotifier::new(app_name).map(|n| Box::new(n) as Box<dyn NotificationSink>),
        _ => Ok(Box::new(LogNotifier)),
    };

    match created {
        Ok(sink) => sink,
        Err(e) => {
            warn!(
                "Способ уведомления '{}' недоступен: {}, переключаемся на лог",
                config.notification.method, e
            );
            Box::new(LogNotifier)
        }
    }
}
