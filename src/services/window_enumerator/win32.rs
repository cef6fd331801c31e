use crate::error::{LurkError, Result};
use crate::events::{ExtendedStyleFlags, ReorderFlags, StyleFlags, WindowHandle, ZBand};
use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;
use windows_sys::core::BOOL;
use windows_sys::Win32::Foundation::{GetLastError, SetLastError, HWND, LPARAM};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetClassNameW, GetWindowLongW, GetWindowTextLengthW, GetWindowTextW, SetWindowLongW,
    SetWindowPos, GWL_EXSTYLE, GWL_STYLE, HWND_NOTOPMOST, HWND_TOPMOST,
};

use super::r#trait::WindowEnumerator;

/// Окна верхнего уровня через user32
pub struct Win32Enumerator;

impl Win32Enumerator {
    pub fn new() -> Self {
        Self
    }

    fn hwnd(handle: WindowHandle) -> HWND {
        handle.value() as isize as HWND
    }
}

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let handles = &mut *(lparam as *mut Vec<WindowHandle>);
    handles.push(WindowHandle::new(hwnd as isize as u64));
    1
}

fn wide_to_string(buffer: &[u16]) -> String {
    OsString::from_wide(buffer).to_string_lossy().into_owned()
}

impl WindowEnumerator for Win32Enumerator {
    fn enumerate(&self, visit: &mut dyn FnMut(WindowHandle) -> bool) -> Result<()> {
        // Сначала собираем список целиком: visit не вызывается внутри EnumWindows
        let mut handles: Vec<WindowHandle> = Vec::new();
        let ok = unsafe {
            EnumWindows(
                Some(collect_window),
                &mut handles as *mut Vec<WindowHandle> as LPARAM,
            )
        };
        if ok == 0 {
            let code = unsafe { GetLastError() };
            return Err(LurkError::Enumeration(format!("EnumWindows завершился с кодом {}", code)));
        }

        for handle in handles {
            if !visit(handle) {
                break;
            }
        }
        Ok(())
    }

    fn title(&self, handle: WindowHandle) -> String {
        let hwnd = Self::hwnd(handle);
        let len = unsafe { GetWindowTextLengthW(hwnd) };
        if len <= 0 {
            return String::new();
        }

        let mut buffer = vec![0u16; len as usize + 1];
        let copied = unsafe { GetWindowTextW(hwnd, buffer.as_mut_ptr(), buffer.len() as i32) };
        if copied <= 0 {
            return String::new();
        }
        wide_to_string(&buffer[..copied as usize])
    }

    fn class_name(&self, handle: WindowHandle) -> String {
        let mut buffer = [0u16; 256];
        let copied =
            unsafe { GetClassNameW(Self::hwnd(handle), buffer.as_mut_ptr(), buffer.len() as i32) };
        if copied <= 0 {
            return String::new();
        }
        wide_to_string(&buffer[..copied as usize])
    }

    fn style_flags(&self, handle: WindowHandle) -> StyleFlags {
        let style = unsafe { GetWindowLongW(Self::hwnd(handle), GWL_STYLE) };
        StyleFlags::from_bits_truncate(style as u32)
    }

    fn extended_style_flags(&self, handle: WindowHandle) -> ExtendedStyleFlags {
        let ex_style = unsafe { GetWindowLongW(Self::hwnd(handle), GWL_EXSTYLE) };
        ExtendedStyleFlags::from_bits_truncate(ex_style as u32)
    }

    fn set_extended_style_flags(&self, handle: WindowHandle, flags: ExtendedStyleFlags) -> Result<()> {
        let hwnd = Self::hwnd(handle);
        // Остальные биты стиля не трогаем
        let current = unsafe { GetWindowLongW(hwnd, GWL_EXSTYLE) } as u32;
        let mask = ExtendedStyleFlags::all().bits();
        let value = (current & !mask) | flags.bits();

        // 0 - допустимое прежнее значение, поэтому ошибку различаем по GetLastError
        let previous = unsafe {
            SetLastError(0);
            SetWindowLongW(hwnd, GWL_EXSTYLE, value as i32)
        };
        if previous == 0 {
            let code = unsafe { GetLastError() };
            if code != 0 {
                return Err(LurkError::restack(handle, format!("SetWindowLongW: код {}", code)));
            }
        }
        Ok(())
    }

    fn reorder(&self, handle: WindowHandle, band: ZBand, flags: ReorderFlags) -> Result<()> {
        let insert_after = match band {
            ZBand::Topmost => HWND_TOPMOST,
            ZBand::NotTopmost => HWND_NOTOPMOST,
        };
        let ok = unsafe { SetWindowPos(Self::hwnd(handle), insert_after, 0, 0, 0, 0, flags.bits()) };
        if ok == 0 {
            let code = unsafe { GetLastError() };
            return Err(LurkError::restack(handle, format!("SetWindowPos: код {}", code)));
        }
        Ok(())
    }
}
