use crate::events::WindowHandle;
use std::collections::HashSet;

/// Состояние дебаунса окон между тиками.
///
/// Окно становится пригодным для проверки правилами только на тике, следующем
/// за тиком его первого появления, и только если оно всё ещё существует.
/// Заголовок и класс только что созданного окна могут быть ещё не заполнены.
///
/// Инвариант: `freshly_observed ⊆ all_windows`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tracker {
    all_windows: HashSet<WindowHandle>,
    freshly_observed: HashSet<WindowHandle>,
}

impl Tracker {
    /// Первое перечисление: все окна считаются уже существующими
    pub fn seed(snapshot: &[WindowHandle]) -> Self {
        Self {
            all_windows: snapshot.iter().copied().collect(),
            freshly_observed: HashSet::new(),
        }
    }

    /// Переход на следующий тик.
    ///
    /// Возвращает окна, пригодные для проверки (в порядке снимка), и новое состояние.
    pub fn advance(&self, snapshot: &[WindowHandle]) -> (Vec<WindowHandle>, Tracker) {
        let all_windows: HashSet<WindowHandle> = snapshot.iter().copied().collect();

        let freshly_observed = all_windows
            .difference(&self.all_windows)
            .copied()
            .collect();

        let mut emitted = HashSet::new();
        let eligible = snapshot
            .iter()
            .copied()
            .filter(|h| self.freshly_observed.contains(h) && emitted.insert(*h))
            .collect();

        (
            eligible,
            Tracker {
                all_windows,
                freshly_observed,
            },
        )
    }

    pub fn window_count(&self) -> usize {
        self.all_windows.len()
    }

    pub fn pending(&self) -> impl Iterator<Item = &WindowHandle> {
        self.freshly_observed.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handles(raw: &[u64]) -> Vec<WindowHandle> {
        raw.iter().copied().map(WindowHandle::new).collect()
    }

    #[test]
    fn test_seed_has_no_eligible_windows() {
        let tracker = Tracker::seed(&handles(&[1, 2, 3]));
        let (eligible, next) = tracker.advance(&handles(&[1, 2, 3]));

        assert!(eligible.is_empty());
        assert_eq!(next.pending().count(), 0);
        assert_eq!(next.window_count(), 3);
    }

    #[test]
    fn test_new_window_eligible_only_on_next_tick() {
        let t0 = Tracker::seed(&handles(&[1]));

        let (eligible, t1) = t0.advance(&handles(&[1, 2]));
        assert!(eligible.is_empty());
        assert_eq!(t1.pending().copied().collect::<Vec<_>>(), handles(&[2]));

        let (eligible, t2) = t1.advance(&handles(&[1, 2]));
        assert_eq!(eligible, handles(&[2]));

        // Только один раз
        let (eligible, _) = t2.advance(&handles(&[1, 2]));
        assert!(eligible.is_empty());
    }

    #[test]
    fn test_window_gone_before_evaluation_is_skipped() {
        let t0 = Tracker::seed(&handles(&[1]));
        let (_, t1) = t0.advance(&handles(&[1, 7]));
        let (eligible, t2) = t1.advance(&handles(&[1]));

        assert!(eligible.is_empty());
        let (eligible, _) = t2.advance(&handles(&[1, 7]));
        assert!(eligible.is_empty(), "reappearing handle restarts the debounce");
    }

    #[test]
    fn test_eligible_follows_snapshot_order() {
        let t0 = Tracker::seed(&[]);
        let (_, t1) = t0.advance(&handles(&[5, 3, 9]));
        let (eligible, _) = t1.advance(&handles(&[9, 4, 5, 3]));

        assert_eq!(eligible, handles(&[9, 5, 3]));
    }

    #[test]
    fn test_fresh_is_subset_of_all() {
        let t0 = Tracker::seed(&handles(&[1, 2]));
        let (_, t1) = t0.advance(&handles(&[2, 3, 4]));

        assert!(t1.pending().all(|h| t1.all_windows.contains(h)));
        let mut fresh: Vec<_> = t1.pending().copied().collect();
        fresh.sort();
        assert_eq!(fresh, handles(&[3, 4]));
    }
}
