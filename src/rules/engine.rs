use crate::config::RuleConfig;
use crate::error::Result;
use crate::events::WindowInfo;
use smallvec::SmallVec;
use tracing::warn;

use super::rule::{Action, Rule};

/// Действия, сработавшие для одного окна (обычно их немного)
pub type TriggeredActions = SmallVec<[Action; 4]>;

/// Упорядоченный неизменяемый список правил.
///
/// Порядок в списке задаёт порядок проверки. Список не меняется после сборки,
/// его целиком заменяют через [`super::RuleStore`].
#[derive(Debug, Clone, Default)]
pub struct RuleList {
    rules: Vec<Rule>,
}

impl RuleList {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Собирает список из конфигурации; первый некорректный шаблон отклоняет весь список.
    ///
    /// Записи без шаблонов заголовка и класса считаются удалёнными и пропускаются.
    pub fn from_config(entries: &[RuleConfig]) -> Result<Self> {
        let rules = entries
            .iter()
            .enumerate()
            .filter(|(index, entry)| {
                let blank = is_blank(entry.title.as_deref()) && is_blank(entry.class.as_deref());
                if blank {
                    warn!("Правило #{} без шаблонов заголовка и класса пропущено", index + 1);
                }
                !blank
            })
            .map(|(_, entry)| Rule::new(entry.title.as_deref(), entry.class.as_deref(), entry.action))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Проверяет все правила по порядку, без остановки на первом совпадении.
    ///
    /// Каждое совпавшее правило добавляет своё действие, включая повторы.
    pub fn evaluate(&self, window: &WindowInfo) -> TriggeredActions {
        self.rules
            .iter()
            .filter(|rule| rule.matches(window))
            .map(Rule::action)
            .collect()
    }
}

fn is_blank(pattern: Option<&str>) -> bool {
    pattern.map_or(true, str::is_empty)
}
