use parking_lot::RwLock;
use std::sync::Arc;

use super::engine::RuleList;

/// Текущий снимок списка правил.
///
/// Замена списка подменяет `Arc` целиком, поэтому тик видит либо старый список,
/// либо новый, но никогда не частично отредактированный.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    current: Arc<RwLock<Arc<RuleList>>>,
}

impl RuleStore {
    pub fn new(rules: RuleList) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(rules))),
        }
    }

    pub fn snapshot(&self) -> Arc<RuleList> {
        self.current.read().clone()
    }

    /// Возвращает предыдущий снимок
    pub fn replace(&self, rules: RuleList) -> Arc<RuleList> {
        std::mem::replace(&mut *self.current.write(), Arc::new(rules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Action, Rule};

    #[test]
    fn test_snapshot_survives_replace() {
        let store = RuleStore::new(RuleList::new(vec![
            Rule::new(None, Some("Notepad"), Action::Notify).unwrap(),
        ]));

        let before = store.snapshot();
        let previous = store.replace(RuleList::default());

        assert_eq!(before.len(), 1);
        assert!(Arc::ptr_eq(&before, &previous));
        assert!(store.snapshot().is_empty());
    }
}
