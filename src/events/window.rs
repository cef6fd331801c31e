use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Идентификатор окна верхнего уровня, выданный ОС
///
/// Стабилен всё время жизни окна, сравнивается только по значению.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowHandle(pub u64);

impl WindowHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Информация об окне
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowInfo {
    pub title: String,
    pub class: String,
}

impl WindowInfo {
    pub fn new(title: String) -> Self {
        Self {
            title,
            class: String::new(),
        }
    }

    pub fn with_class(mut self, class: String) -> Self {
        self.class = class;
        self
    }
}

impl fmt::Display for WindowInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.class.is_empty() {
            write!(f, "\"{}\"", self.title)
        } else {
            write!(f, "\"{}\" ({})", self.title, self.class)
        }
    }
}

bitflags! {
    /// Флаги стиля окна
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u32 {
        const VISIBLE = 0x1000_0000;
    }
}

bitflags! {
    /// Расширенные флаги стиля окна
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ExtendedStyleFlags: u32 {
        /// Окно "поверх всех"
        const TOPMOST = 0x0000_0008;
    }
}

bitflags! {
    /// Флаги запроса на изменение z-порядка
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ReorderFlags: u32 {
        const NO_SIZE = 0x0001;
        const NO_MOVE = 0x0002;
        const NO_ACTIVATE = 0x0010;
        const ASYNC = 0x4000;
    }
}

impl ReorderFlags {
    /// Перестановка без изменения размера, позиции и фокуса
    pub fn restack() -> Self {
        Self::NO_SIZE | Self::NO_MOVE | Self::NO_ACTIVATE | Self::ASYNC
    }
}

/// Полоса z-порядка, в которую помещается окно
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZBand {
    /// Верх полосы "поверх всех"
    Topmost,
    /// Сразу под полосой "поверх всех"
    NotTopmost,
}

impl fmt::Display for ZBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZBand::Topmost => write!(f, "topmost"),
            ZBand::NotTopmost => write!(f, "not-topmost"),
        }
    }
}
