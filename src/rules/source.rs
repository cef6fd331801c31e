use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::{LurkError, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{error, info, warn};

use super::engine::RuleList;
use super::store::RuleStore;

/// Источник правил: файл конфигурации, перечитываемый при изменении.
///
/// Новый список попадает в [`RuleStore`] только если все шаблоны скомпилировались.
pub struct ConfigRuleSource {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl ConfigRuleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let last_modified = modified_time(&path);
        Self { path, last_modified }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Перечитывает файл, если он изменился. Возвращает `true`, если список заменён.
    pub fn poll(&mut self, store: &RuleStore) -> bool {
        let modified = modified_time(&self.path);
        if modified == self.last_modified {
            return false;
        }
        self.last_modified = modified;

        if modified.is_none() {
            warn!("Файл правил {:?} недоступен, сохраняем текущий список", self.path);
            return false;
        }

        debug_if_enabled!("Файл правил {:?} изменился, перечитываем", self.path);

        match self.load() {
            Ok(rules) => {
                info!("Загружено {} правил из {:?}", rules.len(), self.path);
                store.replace(rules);
                true
            }
            Err(e) => {
                error!("Новый список правил отклонён, используется прежний: {}", e);
                false
            }
        }
    }

    fn load(&self) -> Result<RuleList> {
        let config = Config::load(&self.path).map_err(LurkError::Config)?;
        RuleList::from_config(&config.rules)
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
