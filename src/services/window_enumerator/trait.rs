use crate::config::Config;
use crate::error::{LurkError, Result};
use crate::lurk_error;
use crate::events::{ExtendedStyleFlags, ReorderFlags, StyleFlags, WindowHandle, WindowInfo, ZBand};
use std::collections::HashSet;
use tracing::info;

/// Доступ к окнам верхнего уровня текущего сеанса.
///
/// Все вызовы синхронные и ограничены по времени самой ОС.
pub trait WindowEnumerator: Send + Sync {
    /// Вызывает `visit` для каждого окна в порядке ОС, пока `visit` не вернёт `false`
    fn enumerate(&self, visit: &mut dyn FnMut(WindowHandle) -> bool) -> Result<()>;

    /// Заголовок окна; пустая строка, если недоступен
    fn title(&self, handle: WindowHandle) -> String;

    fn class_name(&self, handle: WindowHandle) -> String;

    fn style_flags(&self, handle: WindowHandle) -> StyleFlags;

    fn extended_style_flags(&self, handle: WindowHandle) -> ExtendedStyleFlags;

    fn set_extended_style_flags(&self, handle: WindowHandle, flags: ExtendedStyleFlags) -> Result<()>;

    fn reorder(&self, handle: WindowHandle, band: ZBand, flags: ReorderFlags) -> Result<()>;

    /// Снимок всех окон в порядке перечисления, без повторов
    fn snapshot(&self) -> Result<Vec<WindowHandle>> {
        let mut seen = HashSet::new();
        let mut handles = Vec::new();
        self.enumerate(&mut |handle| {
            if seen.insert(handle) {
                handles.push(handle);
            }
            true
        })?;
        Ok(handles)
    }

    fn window_info(&self, handle: WindowHandle) -> WindowInfo {
        WindowInfo::new(self.title(handle)).with_class(self.class_name(handle))
    }
}

/// Factory function to create an appropriate window enumerator based on the dry_run flag
pub fn create_window_enumerator(
    config: &Config,
    dry_run: bool,
) -> Result<Box<dyn WindowEnumerator>> {
    if dry_run {
        info!("Используем симулированный рабочий стол (dry-run)");
        return Ok(Box::new(super::dry_run::DryRunEnumerator::new()));
    }

    match config.watcher.backend.as_str() {
        "auto" => create_native_enumerator(),
        "x11" => create_x11_enumerator(),
        "win32" => create_win32_enumerator(),
        other => Err(lurk_error!(internal, "Неизвестный бэкенд окон: {}", other)),
    }
}

#[cfg(windows)]
fn create_native_enumerator() -> Result<Box<dyn WindowEnumerator>> {
    create_win32_enumerator()
}

#[cfg(not(windows))]
fn create_native_enumerator() -> Result<Box<dyn WindowEnumerator>> {
    create_x11_enumerator()
}

#[cfg(windows)]
fn create_win32_enumerator() -> Result<Box<dyn WindowEnumerator>> {
    info!("Используем Win32 API");
    Ok(Box::new(super::win32::Win32Enumerator::new()))
}

#[cfg(not(windows))]
fn create_win32_enumerator() -> Result<Box<dyn WindowEnumerator>> {
    Err(LurkError::ServiceUnavailable(
        "бэкенд win32 доступен только в Windows".to_string(),
    ))
}

#[cfg(unix)]
fn create_x11_enumerator() -> Result<Box<dyn WindowEnumerator>> {
    let enumerator = super::x11::X11Enumerator::new()?;
    info!("Используем X11 утилиты (wmctrl, xdotool, xprop, xwininfo)");
    Ok(Box::new(enumerator))
}

#[cfg(not(unix))]
fn create_x11_enumerator() -> Result<Box<dyn WindowEnumerator>> {
    Err(LurkError::ServiceUnavailable(
        "бэкенд x11 недоступен на этой платформе".to_string(),
    ))
}
