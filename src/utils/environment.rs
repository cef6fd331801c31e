use crate::error::{LurkError, Result};
use tracing::{info, warn};

/// Утилиты, без которых X11-бэкенд не работает
pub const X11_TOOLS: &[&str] = &["wmctrl", "xdotool", "xprop", "xwininfo"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionType {
    X11,
    Wayland,
    Unknown,
}

pub fn detect_session_type() -> SessionType {
    if let Ok(session) = std::env::var("XDG_SESSION_TYPE") {
        match session.as_str() {
            "wayland" => return SessionType::Wayland,
            "x11" => return SessionType::X11,
            _ => {}
        }
    }

    if std::env::var("WAYLAND_DISPLAY").is_ok() {
        return SessionType::Wayland;
    }

    if std::env::var("DISPLAY").is_ok() {
        return SessionType::X11;
    }

    SessionType::Unknown
}

/// Проверить окружение перед запуском X11-бэкенда
pub fn check_x11_environment() -> Result<()> {
    info!("Проверка окружения X11...");

    match detect_session_type() {
        SessionType::X11 => {}
        SessionType::Wayland => {
            warn!("Сеанс Wayland: будут видны только окна XWayland");
        }
        SessionType::Unknown => {
            warn!("Тип сеанса не определён, переменная DISPLAY не задана");
        }
    }

    let missing = missing_tools(X11_TOOLS);
    if !missing.is_empty() {
        return Err(LurkError::ServiceUnavailable(format!(
            "не найдены утилиты: {}. Установите пакеты wmctrl, xdotool и x11-utils",
            missing.join(", ")
        )));
    }

    info!("Окружение X11 проверено");
    Ok(())
}

pub fn missing_tools<'a>(tools: &[&'a str]) -> Vec<&'a str> {
    tools
        .iter()
        .copied()
        .filter(|tool| which::which(tool).is_err())
        .collect()
}
