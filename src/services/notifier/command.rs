use crate::error::{LurkError, Result};
use crate::utils::command::tool_command;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use super::NotificationSink;

/// Уведомления через `notify-send` (libnotify)
pub struct CommandNotifier {
    program: String,
    app_name: String,
}

impl CommandNotifier {
    pub fn new(app_name: &str) -> Result<Self> {
        let program = which::which("notify-send")
            .map_err(|e| LurkError::ServiceUnavailable(format!("notify-send не найден: {}", e)))?;

        Ok(Self::with_program(&program.to_string_lossy(), app_name))
    }

    fn with_program(program: &str, app_name: &str) -> Self {
        Self {
            program: program.to_string(),
            app_name: app_name.to_string(),
        }
    }
}

/// Аргументы `notify-send`: имя приложения служит и заголовком уведомления
fn notify_send_args(app_name: &str, text: &str, timeout: Duration) -> Vec<String> {
    vec![
        "-a".to_string(),
        app_name.to_string(),
        "-t".to_string(),
        timeout.as_millis().to_string(),
        app_name.to_string(),
        text.to_string(),
    ]
}

#[async_trait]
impl NotificationSink for CommandNotifier {
    async fn show(&self, text: &str, timeout: Duration) {
        let args = notify_send_args(&self.app_name, text, timeout);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let mut command = Command::from(tool_command(&self.program, &args));
        command.stdout(Stdio::null()).stderr(Stdio::null());

        // notify-send завершается сразу после передачи уведомления демону
        match command.status().await {
            Ok(status) if status.success() => debug!("notify-send завершился успешно"),
            Ok(status) => warn!("notify-send вернул ошибку: {}", status),
            Err(e) => warn!("Не удалось запустить notify-send: {}", e),
        }
    }
}
