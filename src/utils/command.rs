use crate::error::{LurkError, Result};
use std::collections::HashMap;
use std::process::Command;
use tracing::debug;

/// Переменные окружения сеанса пользователя, если процесс запущен через sudo
fn build_env_overrides() -> HashMap<String, String> {
    let mut env_vars = HashMap::new();

    if std::env::var("USER").unwrap_or_default() == "root" {
        if let Ok(sudo_user) = std::env::var("SUDO_USER") {
            if let Ok(output) = Command::new("id").args(["-u", &sudo_user]).output() {
                if let Ok(uid_str) = String::from_utf8(output.stdout) {
                    let uid = uid_str.trim();
                    let user_runtime_dir = format!("/run/user/{}", uid);
                    let dbus_address = format!("unix:path={}/bus", user_runtime_dir);

                    debug!("Подставляем переменные окружения для пользователя {}: uid={}", sudo_user, uid);
                    env_vars.insert("DBUS_SESSION_BUS_ADDRESS".to_string(), dbus_address);
                    env_vars.insert("XDG_RUNTIME_DIR".to_string(), user_runtime_dir);
                    env_vars.insert("USER".to_string(), sudo_user);
                }
            }
        }
    }

    if let Ok(display_var) = std::env::var("DISPLAY") {
        env_vars.insert("DISPLAY".to_string(), display_var);
    }

    env_vars
}

/// Команда внешней утилиты; под sudo запускается от имени исходного пользователя
pub fn tool_command(program: &str, args: &[&str]) -> Command {
    let mut cmd = match std::env::var("SUDO_USER") {
        Ok(sudo_user) => {
            let mut cmd = Command::new("sudo");
            cmd.args(["-E", "-u", &sudo_user, program]);
            cmd.args(args);
            cmd
        }
        Err(_) => {
            let mut cmd = Command::new(program);
            cmd.args(args);
            cmd
        }
    };

    for (key, value) in build_env_overrides() {
        cmd.env(key, value);
    }

    cmd
}

/// Запускает утилиту и возвращает её stdout
pub fn run_tool(program: &str, args: &[&str]) -> Result<String> {
    let output = tool_command(program, args)
        .output()
        .map_err(|e| LurkError::ServiceUnavailable(format!("{} не найден: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("{} {:?} вернул ошибку: {}", program, args, stderr.trim());
        return Err(LurkError::Internal(format!(
            "{} вернул ошибку: {}",
            program,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
