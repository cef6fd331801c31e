use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::rules::{Action, RuleList};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub watcher: WatcherConfig,
    pub notification: NotificationConfig,
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatcherConfig {
    pub polling_interval_ms: u64,
    pub backend: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub method: String,
    pub timeout_ms: u64,
    pub app_name: String,
}

/// Правило в том виде, в каком его хранит файл конфигурации
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleConfig {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    pub action: Action,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            polling_interval_ms: 1000,
            backend: "auto".to_string(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            method: "dbus".to_string(),
            timeout_ms: 5000,
            app_name: "lurkwind".to_string(),
        }
    }
}

impl WatcherConfig {
    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }
}

impl NotificationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("LURK_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация настроек наблюдателя
        if self.watcher.polling_interval_ms < 100 {
            anyhow::bail!("polling_interval_ms должно быть минимум 100");
        }

        match self.watcher.backend.as_str() {
            "auto" | "x11" | "win32" => {}
            _ => anyhow::bail!("Неверный бэкенд окон: {}", self.watcher.backend),
        }

        // Валидация уведомлений
        match self.notification.method.as_str() {
            "dbus" | "notify-send" | "log" => {}
            _ => anyhow::bail!(
                "Неверный способ уведомления: {}",
                self.notification.method
            ),
        }

        if self.notification.timeout_ms == 0 {
            anyhow::bail!("timeout_ms должно быть больше 0");
        }

        // Шаблоны проверяем сразу, а не при первом совпадении
        self.rule_list()
            .context("Некорректное правило в конфигурации")?;

        Ok(())
    }

    pub fn rule_list(&self) -> crate::error::Result<RuleList> {
        RuleList::from_config(&self.rules)
    }
}
