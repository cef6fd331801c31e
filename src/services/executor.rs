use crate::debug_if_enabled;
use crate::error::{LurkError, Result};
use crate::events::{ExtendedStyleFlags, ReorderFlags, StyleFlags, WindowHandle, WindowInfo, ZBand};
use crate::rules::Action;
use crate::services::window_enumerator::WindowEnumerator;
use tracing::{error, info};

/// Исполнитель действий одного тика.
///
/// Копит строки уведомлений и ошибки перестановки; в конце тика `finish`
/// склеивает строки в одно сообщение.
pub struct ActionExecutor<'a> {
    windows: &'a dyn WindowEnumerator,
    buffer: Vec<String>,
    raised: usize,
    failures: Vec<LurkError>,
}

/// Итог исполнения действий за тик
#[derive(Debug, Default)]
pub struct ExecutionSummary {
    /// Все строки уведомлений, по одной на строку
    pub message: Option<String>,
    pub notified: usize,
    pub raised: usize,
    pub failures: Vec<LurkError>,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(windows: &'a dyn WindowEnumerator) -> Self {
        Self {
            windows,
            buffer: Vec::new(),
            raised: 0,
            failures: Vec::new(),
        }
    }

    /// Ошибка перестановки не прерывает тик, а только запоминается
    pub fn execute(&mut self, handle: WindowHandle, window: &WindowInfo, action: Action) {
        match action {
            Action::DoNothing => {}
            Action::Notify => self.notify(window),
            Action::MoveToFront => match self.move_to_front(handle) {
                Ok(true) => {
                    info!("Окно {} {} поднято наверх", handle, window);
                    self.raised += 1;
                }
                Ok(false) => {
                    debug_if_enabled!("Окно {} невидимо, перестановка пропущена", handle);
                }
                Err(e) => {
                    error!("Не удалось поднять окно {} {}: {}", handle, window, e);
                    self.failures.push(e);
                }
            },
        }
    }

    pub fn notify(&mut self, window: &WindowInfo) {
        self.buffer.push(format!("{} appeared.", window.title));
    }

    /// Поднимает окно в начало его полосы z-порядка без изменения размера,
    /// позиции и фокуса. Возвращает `false` для невидимого окна.
    pub fn move_to_front(&self, handle: WindowHandle) -> Result<bool> {
        if !self.windows.style_flags(handle).contains(StyleFlags::VISIBLE) {
            return Ok(false);
        }

        let original = self.windows.extended_style_flags(handle);
        let flags = ReorderFlags::restack();

        // Одной перестановкой нельзя и снять, и вернуть "поверх всех"
        self.windows.reorder(handle, ZBand::NotTopmost, flags)?;
        self.windows.reorder(handle, ZBand::Topmost, flags)?;

        let mut restored = self.windows.extended_style_flags(handle);
        restored.set(
            ExtendedStyleFlags::TOPMOST,
            original.contains(ExtendedStyleFlags::TOPMOST),
        );
        self.windows.set_extended_style_flags(handle, restored)?;

        Ok(true)
    }

    pub fn finish(self) -> ExecutionSummary {
        let notified = self.buffer.len();
        let message = if self.buffer.is_empty() {
            None
        } else {
            Some(self.buffer.join("\n"))
        };

        ExecutionSummary {
            message,
            notified,
            raised: self.raised,
            failures: self.failures,
        }
    }
}
