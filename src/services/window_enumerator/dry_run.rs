use crate::error::{LurkError, Result};
use crate::lurk_error;
use crate::events::{ExtendedStyleFlags, ReorderFlags, StyleFlags, WindowHandle, WindowInfo, ZBand};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::info;

use super::r#trait::WindowEnumerator;

/// Окно симулированного рабочего стола
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedWindow {
    pub info: WindowInfo,
    pub style: StyleFlags,
    pub ex_style: ExtendedStyleFlags,
}

impl SimulatedWindow {
    pub fn new(title: &str, class: &str) -> Self {
        Self {
            info: WindowInfo::new(title.to_string()).with_class(class.to_string()),
            style: StyleFlags::VISIBLE,
            ex_style: ExtendedStyleFlags::empty(),
        }
    }

    pub fn hidden(mut self) -> Self {
        self.style.remove(StyleFlags::VISIBLE);
        self
    }

    pub fn topmost(mut self) -> Self {
        self.ex_style.insert(ExtendedStyleFlags::TOPMOST);
        self
    }
}

/// Обращение к z-порядку, записанное симулятором
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopCall {
    Reorder(WindowHandle, ZBand, ReorderFlags),
    SetExtendedStyle(WindowHandle, ExtendedStyleFlags),
}

#[derive(Debug, Default)]
struct DesktopState {
    windows: HashMap<WindowHandle, SimulatedWindow>,
    // Индекс 0 - верх стопки
    stacking: Vec<WindowHandle>,
    calls: Vec<DesktopCall>,
    enumeration_fails: bool,
    failing_reorders: HashSet<WindowHandle>,
}

impl DesktopState {
    fn is_topmost(&self, handle: &WindowHandle) -> bool {
        self.windows
            .get(handle)
            .is_some_and(|w| w.ex_style.contains(ExtendedStyleFlags::TOPMOST))
    }

    fn topmost_count(&self) -> usize {
        self.stacking.iter().filter(|h| self.is_topmost(h)).count()
    }

    /// Стабильно разделяет стопку: сначала окна "поверх всех", затем остальные
    fn normalize(&mut self) {
        let (mut top, rest): (Vec<_>, Vec<_>) = self
            .stacking
            .iter()
            .copied()
            .partition(|h| self.is_topmost(h));
        top.extend(rest);
        self.stacking = top;
    }

    fn raise_within_band(&mut self, handle: WindowHandle) {
        self.stacking.retain(|h| *h != handle);
        let index = if self.is_topmost(&handle) {
            0
        } else {
            self.topmost_count()
        };
        self.stacking.insert(index, handle);
    }
}

/// Симулированный рабочий стол в памяти.
///
/// Ведёт себя как оконная система: перечисляет окна сверху вниз по z-порядку,
/// держит полосу "поверх всех" над остальными окнами и записывает все вызовы
/// изменения z-порядка. Клоны разделяют одно состояние.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDesktop {
    state: Arc<Mutex<DesktopState>>,
}

impl SimulatedDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Открывает окно поверх остальных окон его полосы
    pub fn open(&self, handle: WindowHandle, window: SimulatedWindow) {
        let mut state = self.state.lock();
        state.windows.insert(handle, window);
        state.raise_within_band(handle);
    }

    pub fn close(&self, handle: WindowHandle) {
        let mut state = self.state.lock();
        state.windows.remove(&handle);
        state.stacking.retain(|h| *h != handle);
    }

    #[cfg(test)]
    pub fn contains(&self, handle: WindowHandle) -> bool {
        self.state.lock().windows.contains_key(&handle)
    }

    pub fn window(&self, handle: WindowHandle) -> Option<SimulatedWindow> {
        self.state.lock().windows.get(&handle).cloned()
    }

    #[cfg(test)]
    pub fn stacking_order(&self) -> Vec<WindowHandle> {
        self.state.lock().stacking.clone()
    }

    #[cfg(test)]
    pub fn calls(&self) -> Vec<DesktopCall> {
        self.state.lock().calls.clone()
    }

    #[cfg(test)]
    pub fn fail_enumeration(&self, fail: bool) {
        self.state.lock().enumeration_fails = fail;
    }

    #[cfg(test)]
    pub fn fail_reorder(&self, handle: WindowHandle) {
        self.state.lock().failing_reorders.insert(handle);
    }
}

impl WindowEnumerator for SimulatedDesktop {
    fn enumerate(&self, visit: &mut dyn FnMut(WindowHandle) -> bool) -> Result<()> {
        // Копия стопки: visit не должен видеть изменения во время обхода
        let (fails, stacking) = {
            let state = self.state.lock();
            (state.enumeration_fails, state.stacking.clone())
        };
        if fails {
            return Err(lurk_error!(enumeration, "симулированный сбой перечисления"));
        }
        for handle in stacking {
            if !visit(handle) {
                break;
            }
        }
        Ok(())
    }

    fn title(&self, handle: WindowHandle) -> String {
        self.window(handle).map(|w| w.info.title).unwrap_or_default()
    }

    fn class_name(&self, handle: WindowHandle) -> String {
        self.window(handle).map(|w| w.info.class).unwrap_or_default()
    }

    fn style_flags(&self, handle: WindowHandle) -> StyleFlags {
        self.window(handle).map(|w| w.style).unwrap_or_default()
    }

    fn extended_style_flags(&self, handle: WindowHandle) -> ExtendedStyleFlags {
        self.window(handle).map(|w| w.ex_style).unwrap_or_default()
    }

    fn set_extended_style_flags(&self, handle: WindowHandle, flags: ExtendedStyleFlags) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(DesktopCall::SetExtendedStyle(handle, flags));
        let window = state
            .windows
            .get_mut(&handle)
            .ok_or_else(|| LurkError::restack(handle, "окно не существует"))?;
        window.ex_style = flags;
        state.normalize();
        Ok(())
    }

    fn reorder(&self, handle: WindowHandle, band: ZBand, flags: ReorderFlags) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(DesktopCall::Reorder(handle, band, flags));
        if state.failing_reorders.contains(&handle) {
            return Err(LurkError::restack(handle, "симулированный отказ"));
        }
        let window = state
            .windows
            .get_mut(&handle)
            .ok_or_else(|| LurkError::restack(handle, "окно не существует"))?;
        match band {
            ZBand::Topmost => window.ex_style.insert(ExtendedStyleFlags::TOPMOST),
            ZBand::NotTopmost => window.ex_style.remove(ExtendedStyleFlags::TOPMOST),
        }
        state.raise_within_band(handle);
        Ok(())
    }
}

/// Перечислитель для режима сухого запуска.
///
/// Каждый вызов `enumerate` продвигает сценарий: периодически появляются окна
/// загрузок, всплывают кратковременные подсказки, старые окна закрываются.
pub struct DryRunEnumerator {
    desktop: SimulatedDesktop,
    step: Mutex<u64>,
}

const DOWNLOAD_BASE: u64 = 0x2000;
const TOOLTIP_BASE: u64 = 0x3000;

impl DryRunEnumerator {
    pub fn new() -> Self {
        let desktop = SimulatedDesktop::new();
        desktop.open(WindowHandle::new(0x1001), SimulatedWindow::new("Terminal - dry_run", "DryRunTerminal"));
        desktop.open(WindowHandle::new(0x1002), SimulatedWindow::new("Browser - dry_run", "DryRunBrowser"));
        desktop.open(WindowHandle::new(0x1003), SimulatedWindow::new("Clock - dry_run", "DryRunClock").topmost());
        desktop.open(WindowHandle::new(0x1004), SimulatedWindow::new("Tray - dry_run", "DryRunTray").hidden());
        Self {
            desktop,
            step: Mutex::new(0),
        }
    }

    fn advance_script(&self) {
        let step = {
            let mut step = self.step.lock();
            *step += 1;
            *step
        };

        if step % 5 == 0 {
            let n = step / 5;
            let handle = WindowHandle::new(DOWNLOAD_BASE + n);
            info!("Dry-run: открываем окно загрузки {}", handle);
            self.desktop.open(
                handle,
                SimulatedWindow::new(&format!("Download #{} - dry_run", n), "DryRun"),
            );
        }

        if step % 5 == 3 && step > 5 {
            let handle = WindowHandle::new(DOWNLOAD_BASE + step / 5);
            info!("Dry-run: закрываем окно загрузки {}", handle);
            self.desktop.close(handle);
        }

        // Подсказка живёт ровно один интервал и не должна попасть под правила
        if step % 7 == 0 {
            self.desktop.open(
                WindowHandle::new(TOOLTIP_BASE + step),
                SimulatedWindow::new("Tooltip - dry_run", "DryRunTooltip"),
            );
        }
        if step % 7 == 1 && step > 7 {
            self.desktop.close(WindowHandle::new(TOOLTIP_BASE + step - 1));
        }
    }
}

impl Default for DryRunEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowEnumerator for DryRunEnumerator {
    fn enumerate(&self, visit: &mut dyn FnMut(WindowHandle) -> bool) -> Result<()> {
        self.advance_script();
        self.desktop.enumerate(visit)
    }

    fn title(&self, handle: WindowHandle) -> String {
        self.desktop.title(handle)
    }

    fn class_name(&self, handle: WindowHandle) -> String {
        self.desktop.class_name(handle)
    }

    fn style_flags(&self, handle: WindowHandle) -> StyleFlags {
        self.desktop.style_flags(handle)
    }

    fn extended_style_flags(&self, handle: WindowHandle) -> ExtendedStyleFlags {
        self.desktop.extended_style_flags(handle)
    }

    fn set_extended_style_flags(&self, handle: WindowHandle, flags: ExtendedStyleFlags) -> Result<()> {
        info!("[DRY RUN] Расширенный стиль {} -> {:?}", handle, flags);
        self.desktop.set_extended_style_flags(handle, flags)
    }

    fn reorder(&self, handle: WindowHandle, band: ZBand, flags: ReorderFlags) -> Result<()> {
        info!("[DRY RUN] Перестановка {} в полосу {} ({:?})", handle, band, flags);
        self.desktop.reorder(handle, band, flags)
    }
}
