use crate::events::WindowHandle;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LurkError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка D-Bus: {0}")]
    DBus(#[from] zbus::Error),

    #[error("Не удалось перечислить окна: {0}")]
    Enumeration(String),

    #[error("Некорректный шаблон '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Не удалось изменить z-порядок окна {handle}: {reason}")]
    Restack { handle: WindowHandle, reason: String },

    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl LurkError {
    pub fn restack(handle: WindowHandle, reason: impl Into<String>) -> Self {
        LurkError::Restack {
            handle,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LurkError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! lurk_error {
    (enumeration, $($arg:tt)*) => {
        $crate::error::LurkError::Enumeration(format!($($arg)*))
    };
    (service_unavailable, $($arg:tt)*) => {
        $crate::error::LurkError::ServiceUnavailable(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::LurkError::Internal(format!($($arg)*))
    };
}
