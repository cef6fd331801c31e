use crate::debug_if_enabled;
use crate::error::{LurkError, Result};
use crate::events::{ExtendedStyleFlags, ReorderFlags, StyleFlags, WindowHandle, ZBand};
use crate::trace_if_enabled;
use crate::utils::{environment, run_tool};
use once_cell::sync::Lazy;
use regex::Regex;

use super::r#trait::WindowEnumerator;

static WMCTRL_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*0x([0-9a-fA-F]+)\s").expect("valid wmctrl regex"));
static WM_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"=\s*"([^"]*)"(?:\s*,\s*"([^"]*)")?"#).expect("valid WM_CLASS regex"));

/// X11 через wmctrl, xdotool, xprop и xwininfo.
///
/// "Поверх всех" соответствует `_NET_WM_STATE_ABOVE`, видимость - `IsViewable`.
pub struct X11Enumerator;

impl X11Enumerator {
    pub fn new() -> Result<Self> {
        environment::check_x11_environment()?;
        Ok(Self)
    }

    fn hex_id(handle: WindowHandle) -> String {
        format!("0x{:x}", handle.value())
    }

    fn set_above(&self, handle: WindowHandle, above: bool) -> Result<()> {
        let action = if above { "add,above" } else { "remove,above" };
        run_tool("wmctrl", &["-i", "-r", &Self::hex_id(handle), "-b", action])
            .map(|_| ())
            .map_err(|e| LurkError::restack(handle, e.to_string()))
    }
}

impl WindowEnumerator for X11Enumerator {
    fn enumerate(&self, visit: &mut dyn FnMut(WindowHandle) -> bool) -> Result<()> {
        let stdout = run_tool("wmctrl", &["-l"]).map_err(|e| LurkError::Enumeration(e.to_string()))?;

        for handle in parse_wmctrl_list(&stdout) {
            if !visit(handle) {
                break;
            }
        }
        Ok(())
    }

    fn title(&self, handle: WindowHandle) -> String {
        match run_tool("xdotool", &["getwindowname", &handle.value().to_string()]) {
            Ok(stdout) => stdout.trim_end_matches('\n').to_string(),
            Err(e) => {
                debug_if_enabled!("Заголовок окна {} недоступен: {}", handle, e);
                String::new()
            }
        }
    }

    fn class_name(&self, handle: WindowHandle) -> String {
        match run_tool("xprop", &["-id", &Self::hex_id(handle), "WM_CLASS"]) {
            Ok(stdout) => parse_wm_class(&stdout).unwrap_or_default(),
            Err(e) => {
                debug_if_enabled!("Класс окна {} недоступен: {}", handle, e);
                String::new()
            }
        }
    }

    fn style_flags(&self, handle: WindowHandle) -> StyleFlags {
        match run_tool("xwininfo", &["-id", &Self::hex_id(handle)]) {
            Ok(stdout) => parse_map_state(&stdout),
            Err(_) => StyleFlags::empty(),
        }
    }

    fn extended_style_flags(&self, handle: WindowHandle) -> ExtendedStyleFlags {
        match run_tool("xprop", &["-id", &Self::hex_id(handle), "_NET_WM_STATE"]) {
            Ok(stdout) => parse_wm_state(&stdout),
            Err(_) => ExtendedStyleFlags::empty(),
        }
    }

    fn set_extended_style_flags(&self, handle: WindowHandle, flags: ExtendedStyleFlags) -> Result<()> {
        let current = self.extended_style_flags(handle);
        let want_above = flags.contains(ExtendedStyleFlags::TOPMOST);
        if current.contains(ExtendedStyleFlags::TOPMOST) == want_above {
            return Ok(());
        }
        self.set_above(handle, want_above)
    }

    fn reorder(&self, handle: WindowHandle, band: ZBand, flags: ReorderFlags) -> Result<()> {
        // wmctrl и windowraise не меняют геометрию и не активируют окно
        trace_if_enabled!("reorder {} -> {} ({:?})", handle, band, flags);
        self.set_above(handle, band == ZBand::Topmost)?;
        run_tool("xdotool", &["windowraise", &handle.value().to_string()])
            .map(|_| ())
            .map_err(|e| LurkError::restack(handle, e.to_string()))
    }
}

fn parse_wmctrl_list(stdout: &str) -> Vec<WindowHandle> {
    stdout
        .lines()
        .filter_map(|line| WMCTRL_LINE.captures(line))
        .filter_map(|caps| u64::from_str_radix(&caps[1], 16).ok())
        .map(WindowHandle::new)
        .collect()
}

/// Второе поле WM_CLASS - класс приложения; первое - имя экземпляра
fn parse_wm_class(stdout: &str) -> Option<String> {
    let caps = WM_CLASS.captures(stdout)?;
    caps.get(2)
        .or_else(|| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn parse_map_state(stdout: &str) -> StyleFlags {
    let viewable = stdout
        .lines()
        .any(|line| line.trim() == "Map State: IsViewable");
    if viewable {
        StyleFlags::VISIBLE
    } else {
        StyleFlags::empty()
    }
}

fn parse_wm_state(stdout: &str) -> ExtendedStyleFlags {
    let above = stdout
        .split(|c: char| c == ',' || c.is_whitespace())
        .any(|atom| atom == "_NET_WM_STATE_ABOVE");
    if above {
        ExtendedStyleFlags::TOPMOST
    } else {
        ExtendedStyleFlags::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wmctrl_list() {
        let stdout = "0x03a00003  0 host Untitled - Notepad\n\
                      0x04200007 -1 host Desktop\n\
                      garbage line\n";
        assert_eq!(
            parse_wmctrl_list(stdout),
            vec![WindowHandle::new(0x03a00003), WindowHandle::new(0x04200007)]
        );
    }

    #[test]
    fn test_parse_wm_class() {
        assert_eq!(
            parse_wm_class("WM_CLASS(STRING) = \"gnome-terminal-server\", \"Gnome-terminal\"\n"),
            Some("Gnome-terminal".to_string())
        );
        assert_eq!(
            parse_wm_class("WM_CLASS(STRING) = \"xclock\"\n"),
            Some("xclock".to_string())
        );
        assert_eq!(parse_wm_class("WM_CLASS:  not found.\n"), None);
    }

    #[test]
    fn test_parse_map_state() {
        let viewable = "xwininfo: Window id: 0x3a00003 \"Notepad\"\n  Map State: IsViewable\n";
        let unmapped = "xwininfo: Window id: 0x3a00003 \"Notepad\"\n  Map State: IsUnMapped\n";
        assert_eq!(parse_map_state(viewable), StyleFlags::VISIBLE);
        assert_eq!(parse_map_state(unmapped), StyleFlags::empty());
    }

    #[test]
    fn test_parse_wm_state() {
        assert_eq!(
            parse_wm_state("_NET_WM_STATE(ATOM) = _NET_WM_STATE_ABOVE, _NET_WM_STATE_STICKY\n"),
            ExtendedStyleFlags::TOPMOST
        );
        assert_eq!(
            parse_wm_state("_NET_WM_STATE(ATOM) = _NET_WM_STATE_MAXIMIZED_VERT\n"),
            ExtendedStyleFlags::empty()
        );
        assert_eq!(parse_wm_state("_NET_WM_STATE:  not found.\n"), ExtendedStyleFlags::empty());
    }
}
