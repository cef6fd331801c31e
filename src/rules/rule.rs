use crate::error::{LurkError, Result};
use crate::events::WindowInfo;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Действие, которое выполняется при совпадении правила
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Правило отключено, но не удалено
    #[serde(alias = "DoNothing")]
    DoNothing,
    #[serde(alias = "MoveToFront")]
    MoveToFront,
    #[serde(alias = "Notify")]
    Notify,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::DoNothing => write!(f, "do_nothing"),
            Action::MoveToFront => write!(f, "move_to_front"),
            Action::Notify => write!(f, "notify"),
        }
    }
}

/// Правило: шаблоны заголовка и класса плюс действие.
///
/// Отсутствующий шаблон совпадает с любой строкой.
#[derive(Debug, Clone)]
pub struct Rule {
    title_pattern: Option<Regex>,
    class_pattern: Option<Regex>,
    action: Action,
}

impl Rule {
    /// Компилирует шаблоны сразу; пустая строка считается отсутствующим шаблоном
    pub fn new(title_pattern: Option<&str>, class_pattern: Option<&str>, action: Action) -> Result<Self> {
        Ok(Self {
            title_pattern: compile_pattern(title_pattern)?,
            class_pattern: compile_pattern(class_pattern)?,
            action,
        })
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn title_pattern(&self) -> Option<&str> {
        self.title_pattern.as_ref().map(Regex::as_str)
    }

    pub fn class_pattern(&self) -> Option<&str> {
        self.class_pattern.as_ref().map(Regex::as_str)
    }

    pub fn matches(&self, window: &WindowInfo) -> bool {
        let title_ok = self
            .title_pattern
            .as_ref()
            .map_or(true, |re| re.is_match(&window.title));
        let class_ok = self
            .class_pattern
            .as_ref()
            .map_or(true, |re| re.is_match(&window.class));
        title_ok && class_ok
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "title={} class={} -> {}",
            self.title_pattern().unwrap_or("*"),
            self.class_pattern().unwrap_or("*"),
            self.action
        )
    }
}

fn compile_pattern(pattern: Option<&str>) -> Result<Option<Regex>> {
    match pattern {
        None => Ok(None),
        Some(p) if p.is_empty() => Ok(None),
        Some(p) => Regex::new(p)
            .map(Some)
            .map_err(|source| LurkError::InvalidPattern {
                pattern: p.to_string(),
                source,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(title: &str, class: &str) -> WindowInfo {
        WindowInfo::new(title.to_string()).with_class(class.to_string())
    }

    #[test]
    fn test_absent_patterns_match_everything() {
        let rule = Rule::new(None, None, Action::Notify).unwrap();
        assert!(rule.matches(&window("", "")));
        assert!(rule.matches(&window("Anything", "AnyClass")));
    }

    #[test]
    fn test_both_patterns_must_match() {
        let rule = Rule::new(Some("^Download"), Some("Chrome"), Action::MoveToFront).unwrap();
        assert!(rule.matches(&window("Downloads", "Chrome_WidgetWin_1")));
        assert!(!rule.matches(&window("Downloads", "Firefox")));
        assert!(!rule.matches(&window("My Downloads", "Chrome_WidgetWin_1")));
    }

    #[test]
    fn test_empty_pattern_is_wildcard() {
        let rule = Rule::new(Some(""), Some("Notepad"), Action::Notify).unwrap();
        assert_eq!(rule.title_pattern(), None);
        assert!(rule.matches(&window("Untitled - Notepad", "Notepad")));
    }

    #[test]
    fn test_invalid_pattern_fails_at_construction() {
        let err = Rule::new(Some("(unclosed"), None, Action::Notify).unwrap_err();
        match err {
            LurkError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("unexpected error: {other}"),
        }

        assert!(Rule::new(None, Some("[a-"), Action::DoNothing).is_err());
    }

    #[test]
    fn test_action_deserializes_both_spellings() {
        #[derive(Deserialize)]
        struct Wrapper {
            action: Action,
        }

        let snake: Wrapper = toml_value("action = \"move_to_front\"");
        let pascal: Wrapper = toml_value("action = \"Notify\"");
        assert_eq!(snake.action, Action::MoveToFront);
        assert_eq!(pascal.action, Action::Notify);
    }

    fn toml_value<T: serde::de::DeserializeOwned>(source: &str) -> T {
        use figment::providers::{Format, Toml};
        figment::Figment::new()
            .merge(Toml::string(source))
            .extract()
            .unwrap()
    }
}
