use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::Result;
use crate::rules::{ConfigRuleSource, RuleStore};
use crate::services::executor::ActionExecutor;
use crate::services::notifier::NotificationSink;
use crate::services::tracker::Tracker;
use crate::services::window_enumerator::WindowEnumerator;
use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

/// Итог одного тика
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub windows: usize,
    pub eligible: usize,
    pub notified: usize,
    pub raised: usize,
    pub restack_failures: usize,
}

/// Периодический наблюдатель за окнами.
///
/// Каждый тик: перечисление → дебаунс → правила → действия → уведомление.
pub struct Watcher {
    config: Arc<Config>,
    windows: Box<dyn WindowEnumerator>,
    notifier: Box<dyn NotificationSink>,
    rules: RuleStore,
    rule_source: Option<ConfigRuleSource>,
    tracker: Option<Tracker>,
    ticks: u64,
}

impl Watcher {
    pub fn new(
        config: Arc<Config>,
        windows: Box<dyn WindowEnumerator>,
        notifier: Box<dyn NotificationSink>,
        rules: RuleStore,
    ) -> Self {
        info!(
            "Инициализация Watcher: {} правил, интервал {}мс",
            rules.snapshot().len(),
            config.watcher.polling_interval_ms
        );
        if rules.snapshot().is_empty() {
            warn!("Список правил пуст - никакие действия выполняться не будут");
        }
        for rule in rules.snapshot().iter() {
            info!("Правило: {}", rule);
        }

        Self {
            config,
            windows,
            notifier,
            rules,
            rule_source: None,
            tracker: None,
            ticks: 0,
        }
    }

    pub fn with_rule_source(mut self, source: ConfigRuleSource) -> Self {
        info!("Правила будут перечитываться из {:?}", source.path());
        self.rule_source = Some(source);
        self
    }

    #[cfg(test)]
    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    pub async fn run(mut self) -> Result<()> {
        let mut ticker = interval(self.config.watcher.polling_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Watcher запущен");

        loop {
            ticker.tick().await;

            if let Some(source) = self.rule_source.as_mut() {
                source.poll(&self.rules);
            }

            match self.tick().await {
                Ok(report) => {
                    if report.eligible > 0 {
                        info!(
                            "Тик #{}: новых окон {}, уведомлений {}, поднято {}, ошибок {}",
                            self.ticks,
                            report.eligible,
                            report.notified,
                            report.raised,
                            report.restack_failures
                        );
                    }
                }
                Err(e) => {
                    warn!("Тик #{} пропущен: {}", self.ticks, e);
                }
            }
        }
    }

    /// Один тик наблюдения.
    ///
    /// При ошибке перечисления состояние дебаунса не меняется, чтобы окна
    /// не считались исчезнувшими.
    pub async fn tick(&mut self) -> Result<TickReport> {
        self.ticks += 1;

        let snapshot = self.windows.snapshot()?;

        let Some(tracker) = self.tracker.as_ref() else {
            info!("Начальное перечисление: {} окон", snapshot.len());
            self.tracker = Some(Tracker::seed(&snapshot));
            return Ok(TickReport {
                windows: snapshot.len(),
                ..TickReport::default()
            });
        };

        let (eligible, next) = tracker.advance(&snapshot);
        debug_if_enabled!(
            "Окон: {}, ожидают проверки: {}, проверяются сейчас: {}",
            next.window_count(),
            next.pending().count(),
            eligible.len()
        );
        self.tracker = Some(next);

        let mut report = TickReport {
            windows: snapshot.len(),
            eligible: eligible.len(),
            ..TickReport::default()
        };

        if eligible.is_empty() {
            return Ok(report);
        }

        let rules = self.rules.snapshot();
        let mut executor = ActionExecutor::new(self.windows.as_ref());

        for handle in eligible {
            let window = self.windows.window_info(handle);
            let actions = rules.evaluate(&window);
            debug_if_enabled!("Окно {} {}: сработало {} правил", handle, window, actions.len());

            for action in actions {
                executor.execute(handle, &window, action);
            }
        }

        let summary = executor.finish();
        report.notified = summary.notified;
        report.raised = summary.raised;
        report.restack_failures = summary.failures.len();

        if let Some(message) = summary.message {
            self.notifier
                .show(&message, self.config.notification.timeout())
                .await;
        }

        Ok(report)
    }
}

/// Однократное перечисление окон для `--list-windows`
pub fn list_windows(windows: &dyn WindowEnumerator) -> Result<Vec<String>> {
    use crate::events::{ExtendedStyleFlags, StyleFlags};

    let lines = windows
        .snapshot()?
        .into_iter()
        .map(|handle| {
            let info = windows.window_info(handle);
            let visible = windows.style_flags(handle).contains(StyleFlags::VISIBLE);
            let topmost = windows
                .extended_style_flags(handle)
                .contains(ExtendedStyleFlags::TOPMOST);
            format!(
                "{}  {:<30} {}{} {}",
                handle,
                info.class,
                if visible { 'V' } else { '-' },
                if topmost { 'T' } else { '-' },
                info.title
            )
        })
        .collect();

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ExtendedStyleFlags, WindowHandle};
    use crate::rules::{Action, Rule, RuleList};
    use crate::services::notifier::testing::RecordingNotifier;
    use crate::services::window_enumerator::{DesktopCall, SimulatedDesktop, SimulatedWindow};
    use std::time::Duration;

    fn h(raw: u64) -> WindowHandle {
        WindowHandle::new(raw)
    }

    fn watcher(desktop: &SimulatedDesktop, notifier: &RecordingNotifier, rules: Vec<Rule>) -> Watcher {
        Watcher::new(
            Arc::new(Config::default()),
            Box::new(desktop.clone()),
            Box::new(notifier.clone()),
            RuleStore::new(RuleList::new(rules)),
        )
    }

    fn base_desktop() -> SimulatedDesktop {
        let desktop = SimulatedDesktop::new();
        desktop.open(h(1), SimulatedWindow::new("Terminal", "XTerm"));
        desktop.open(h(2), SimulatedWindow::new("Clock", "XClock").topmost());
        desktop
    }

    #[tokio::test]
    async fn test_notepad_scenario() {
        let desktop = base_desktop();
        let notifier = RecordingNotifier::default();
        let mut watcher = watcher(
            &desktop,
            &notifier,
            vec![Rule::new(None, Some("Notepad"), Action::Notify).unwrap()],
        );

        for _ in 1..=4 {
            watcher.tick().await.unwrap();
        }

        // Тик 5: окно появилось, но ещё не проверяется
        desktop.open(h(10), SimulatedWindow::new("Untitled - Notepad", "Notepad"));
        let report = watcher.tick().await.unwrap();
        assert_eq!(report.eligible, 0);
        assert_eq!(report.notified, 0);
        assert!(notifier.shown().is_empty());

        // Тик 6: ровно одна строка
        let report = watcher.tick().await.unwrap();
        assert_eq!(report.eligible, 1);
        assert_eq!(report.notified, 1);
        assert_eq!(
            notifier.shown(),
            vec![("Untitled - Notepad appeared.".to_string(), Duration::from_secs(5))]
        );

        watcher.tick().await.unwrap();
        assert_eq!(notifier.shown().len(), 1);
    }

    #[tokio::test]
    async fn test_download_scenario_raises_without_pinning() {
        let desktop = base_desktop();
        let notifier = RecordingNotifier::default();
        let mut watcher = watcher(
            &desktop,
            &notifier,
            vec![Rule::new(Some("^Download"), None, Action::MoveToFront).unwrap()],
        );

        watcher.tick().await.unwrap();
        desktop.open(h(20), SimulatedWindow::new("Downloads", "Chrome"));
        // Другое окно перекрывает загрузки до проверки
        desktop.open(h(21), SimulatedWindow::new("Editor", "Code"));
        watcher.tick().await.unwrap();

        let report = watcher.tick().await.unwrap();
        assert_eq!(report.raised, 1);
        assert_eq!(desktop.stacking_order(), vec![h(2), h(20), h(21), h(1)]);
        assert!(!desktop
            .extended_style_flags(h(20))
            .contains(ExtendedStyleFlags::TOPMOST));
        assert!(notifier.shown().is_empty());
    }

    #[tokio::test]
    async fn test_transient_window_never_triggers() {
        let desktop = base_desktop();
        let notifier = RecordingNotifier::default();
        let mut watcher = watcher(
            &desktop,
            &notifier,
            vec![
                Rule::new(None, None, Action::Notify).unwrap(),
                Rule::new(None, None, Action::MoveToFront).unwrap(),
            ],
        );

        watcher.tick().await.unwrap();
        desktop.open(h(30), SimulatedWindow::new("Tooltip", "tooltips_class32"));
        watcher.tick().await.unwrap();
        desktop.close(h(30));
        let report = watcher.tick().await.unwrap();

        assert_eq!(report.eligible, 0);
        assert!(notifier.shown().is_empty());
        assert!(desktop.calls().is_empty());
    }

    #[tokio::test]
    async fn test_move_and_notify_run_in_same_tick() {
        let desktop = base_desktop();
        let notifier = RecordingNotifier::default();
        let mut watcher = watcher(
            &desktop,
            &notifier,
            vec![
                Rule::new(Some("Setup"), None, Action::MoveToFront).unwrap(),
                Rule::new(None, Some("Installer"), Action::Notify).unwrap(),
                Rule::new(Some("Setup"), None, Action::Notify).unwrap(),
            ],
        );

        watcher.tick().await.unwrap();
        desktop.open(h(40), SimulatedWindow::new("Setup Wizard", "Installer"));
        watcher.tick().await.unwrap();
        let report = watcher.tick().await.unwrap();

        assert_eq!(report.raised, 1);
        assert_eq!(report.notified, 2);
        assert_eq!(
            notifier.shown()[0].0,
            "Setup Wizard appeared.\nSetup Wizard appeared."
        );
    }

    #[tokio::test]
    async fn test_enumeration_failure_keeps_tracker_state() {
        let desktop = base_desktop();
        let notifier = RecordingNotifier::default();
        let mut watcher = watcher(
            &desktop,
            &notifier,
            vec![Rule::new(None, Some("Notepad"), Action::Notify).unwrap()],
        );

        watcher.tick().await.unwrap();
        desktop.open(h(10), SimulatedWindow::new("Untitled - Notepad", "Notepad"));
        watcher.tick().await.unwrap();

        desktop.fail_enumeration(true);
        assert!(watcher.tick().await.is_err());

        desktop.fail_enumeration(false);
        let report = watcher.tick().await.unwrap();
        assert_eq!(report.eligible, 1);
        assert_eq!(notifier.shown().len(), 1);
    }

    #[tokio::test]
    async fn test_first_enumeration_failure_delays_seeding() {
        let desktop = base_desktop();
        let notifier = RecordingNotifier::default();
        let mut watcher = watcher(&desktop, &notifier, vec![Rule::new(None, None, Action::Notify).unwrap()]);

        desktop.fail_enumeration(true);
        assert!(watcher.tick().await.is_err());
        desktop.fail_enumeration(false);

        // Уже открытые окна не считаются новыми
        watcher.tick().await.unwrap();
        let report = watcher.tick().await.unwrap();
        assert_eq!(report.windows, 2);
        assert_eq!(report.eligible, 0);
        assert!(notifier.shown().is_empty());
    }

    #[tokio::test]
    async fn test_empty_rule_list_never_fires() {
        let desktop = base_desktop();
        let notifier = RecordingNotifier::default();
        let mut watcher = watcher(&desktop, &notifier, Vec::new());

        watcher.tick().await.unwrap();
        for raw in 50..55 {
            desktop.open(h(raw), SimulatedWindow::new("Anything", "Any"));
            watcher.tick().await.unwrap();
        }
        watcher.tick().await.unwrap();

        assert!(notifier.shown().is_empty());
        assert!(desktop.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rule_swap_applies_to_next_tick() {
        let desktop = base_desktop();
        let notifier = RecordingNotifier::default();
        let mut watcher = watcher(&desktop, &notifier, Vec::new());

        watcher.tick().await.unwrap();
        desktop.open(h(60), SimulatedWindow::new("Untitled - Notepad", "Notepad"));
        watcher.tick().await.unwrap();

        watcher
            .rules()
            .replace(RuleList::new(vec![Rule::new(None, Some("Notepad"), Action::Notify).unwrap()]));
        watcher.tick().await.unwrap();

        assert_eq!(notifier.shown().len(), 1);
    }

    #[tokio::test]
    async fn test_restack_failure_does_not_stop_other_windows() {
        let desktop = base_desktop();
        let notifier = RecordingNotifier::default();
        let mut watcher = watcher(
            &desktop,
            &notifier,
            vec![
                Rule::new(Some("^Download"), None, Action::MoveToFront).unwrap(),
                Rule::new(Some("^Download"), None, Action::Notify).unwrap(),
            ],
        );

        watcher.tick().await.unwrap();
        desktop.open(h(70), SimulatedWindow::new("Download A", "Chrome"));
        desktop.open(h(71), SimulatedWindow::new("Download B", "Chrome"));
        desktop.fail_reorder(h(71));
        watcher.tick().await.unwrap();

        let report = watcher.tick().await.unwrap();
        assert_eq!(report.eligible, 2);
        assert_eq!(report.raised, 1);
        assert_eq!(report.restack_failures, 1);
        assert_eq!(report.notified, 2);
        assert!(desktop
            .calls()
            .contains(&DesktopCall::SetExtendedStyle(h(70), ExtendedStyleFlags::empty())));
        assert!(desktop.contains(h(71)));
    }

    #[test]
    fn test_list_windows_formats_every_window() {
        let desktop = base_desktop();
        desktop.open(h(3), SimulatedWindow::new("Tray", "TrayWnd").hidden());

        let lines = list_windows(&desktop).unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("0x00000002"));
        assert!(lines[0].contains("VT Clock"));
        assert!(lines.iter().any(|l| l.contains("-- Tray")));
    }
}
