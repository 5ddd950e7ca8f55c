fn main() {
    println!("Run `cargo test -p scenarios` to execute end-to-end tray scenarios.");
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use buckytray_app_menu::{
        ActionSink, Anchor, AppMenuSync, AppRecord, ApplicationLister, Dispatch, FetchVerdict,
        ListFuture, MenuCommand, MenuEvent, MenuSyncConfig, SystemAction,
    };
    use buckytray_probe::{BuckyPaths, NodeConfigLister, ProcessOracle, TargetState};
    use buckytray_status::{
        HealthOracle, OracleError, OracleFuture, ScanConfig, Status, StatusScanner,
    };
    use buckytray_tray::{MenuItem, TrayConfig, TrayHandle, TrayUpdate};
    use tokio::sync::mpsc;

    const HOME: &str = "http://127.0.0.1:3180/index.html";

    // ------------------------------------------------------------------
    // Shared fakes
    // ------------------------------------------------------------------

    /// Oracle answering from a script; the last entry repeats.
    struct ScriptedOracle {
        script: Mutex<VecDeque<Result<Status, OracleError>>>,
    }

    impl ScriptedOracle {
        fn new(script: Vec<Result<Status, OracleError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
            }
        }
    }

    impl HealthOracle for ScriptedOracle {
        fn query(&self) -> OracleFuture<'_> {
            let mut script = self.script.lock().unwrap();
            let next = if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap()
            };
            Box::pin(async move { next })
        }
    }

    /// Lister whose n-th call sleeps `delays[n]` and returns `lists[n]`.
    struct DelayedLister {
        calls: Mutex<VecDeque<(Duration, Vec<AppRecord>)>>,
    }

    impl ApplicationLister for DelayedLister {
        fn list(&self) -> ListFuture<'_> {
            let next = self.calls.lock().unwrap().pop_front();
            Box::pin(async move {
                let (delay, apps) = next.unwrap_or_default();
                tokio::time::sleep(delay).await;
                Ok(apps)
            })
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        actions: Mutex<Vec<SystemAction>>,
    }

    impl RecordingSink {
        fn push(&self, action: SystemAction) {
            self.actions.lock().unwrap().push(action);
        }
    }

    impl ActionSink for RecordingSink {
        fn start_system(&self) {
            self.push(SystemAction::StartSystem);
        }
        fn stop_system(&self) {
            self.push(SystemAction::StopSystem);
        }
        fn start_app(&self, app_id: &str) {
            self.push(SystemAction::StartApp(app_id.into()));
        }
        fn stop_app(&self, app_id: &str) {
            self.push(SystemAction::StopApp(app_id.into()));
        }
        fn open_url(&self, url: &str) {
            self.push(SystemAction::OpenUrl(url.into()));
        }
    }

    fn app(id: &str) -> AppRecord {
        AppRecord {
            id: id.into(),
            display_name: id.into(),
            icon_ref: String::new(),
            home_page_url: HOME.into(),
            is_running: true,
        }
    }

    async fn next_event(events: &mut mpsc::Receiver<MenuEvent>) -> MenuEvent {
        tokio::time::timeout(Duration::from_secs(30), events.recv())
            .await
            .expect("timed out waiting for menu event")
            .expect("event channel closed")
    }

    fn record_changes() -> (
        Arc<Mutex<Vec<(Status, Status)>>>,
        buckytray_status::StatusChangeFn,
    ) {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);
        let callback = Box::new(move |new: Status, old: Status| sink.lock().unwrap().push((new, old)));
        (changes, callback)
    }

    // ------------------------------------------------------------------
    // Status scanning
    // ------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn failures_rotate_then_success_settles() {
        let oracle = Arc::new(ScriptedOracle::new(vec![
            Err(OracleError::Unavailable("down".into())),
            Err(OracleError::Unavailable("down".into())),
            Ok(Status::Running),
        ]));
        let scanner = StatusScanner::new(oracle, ScanConfig::default());
        let (changes, callback) = record_changes();

        scanner.start(callback).await;
        tokio::time::sleep(Duration::from_secs(10)).await;
        scanner.stop().await;

        assert_eq!(
            *changes.lock().unwrap(),
            vec![
                (Status::Failed, Status::NotInstall),
                (Status::Running, Status::Failed),
            ]
        );
        assert_eq!(scanner.current_status(), Status::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_failures_visit_every_status() {
        let oracle = Arc::new(ScriptedOracle::new(vec![Err(OracleError::Timeout(
            Duration::from_secs(3),
        ))]));
        let scanner = StatusScanner::new(oracle, ScanConfig::default());
        let (changes, callback) = record_changes();

        scanner.start(callback).await;
        // Unstable cadence is one query per second.
        tokio::time::sleep(Duration::from_millis(5_200)).await;
        scanner.stop().await;

        let changes = changes.lock().unwrap();
        assert!(changes.len() >= Status::ALL.len());
        let mut seen: Vec<Status> = changes.iter().map(|(new, _)| *new).collect();
        for pair in seen.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
        seen.sort_by_key(|s| s.index());
        seen.dedup();
        assert_eq!(seen, Status::ALL.to_vec());
    }

    #[tokio::test(start_paused = true)]
    async fn uninstalled_machine_stays_silent() {
        let tmp = tempfile::tempdir().unwrap();
        let oracle = Arc::new(ProcessOracle::new(
            BuckyPaths::new(tmp.path()),
            vec!["node_daemon".into()],
        ));
        let scanner = StatusScanner::new(oracle, ScanConfig::default());
        let (changes, callback) = record_changes();

        scanner.start(callback).await;
        tokio::time::sleep(Duration::from_secs(10)).await;
        scanner.stop().await;

        assert!(changes.lock().unwrap().is_empty());
        assert_eq!(scanner.current_status(), Status::NotInstall);
    }

    // ------------------------------------------------------------------
    // Application list sync
    // ------------------------------------------------------------------

    async fn final_snapshot_for(delays: [u64; 2]) -> Vec<String> {
        let lister = Arc::new(DelayedLister {
            calls: Mutex::new(
                vec![
                    (Duration::from_millis(delays[0]), vec![app("A")]),
                    (Duration::from_millis(delays[1]), vec![app("A"), app("B")]),
                ]
                .into(),
            ),
        });
        let (tray, _event_tx, mut updates) = TrayHandle::new(TrayConfig::default());
        let mut sync = AppMenuSync::spawn(
            Arc::clone(&lister) as Arc<dyn ApplicationLister>,
            Arc::new(tray.presenter()),
            Arc::new(RecordingSink::default()),
            MenuSyncConfig {
                home_page_url: HOME.into(),
                list_timeout: Duration::from_secs(5),
            },
        );
        let mut events = sync.take_events().unwrap();

        // Make sure the first fetch owns the first scripted reply.
        sync.request_popup(Anchor::default(), true).await.unwrap();
        while lister.calls.lock().unwrap().len() > 1 {
            tokio::task::yield_now().await;
        }
        sync.request_popup(Anchor::default(), true).await.unwrap();

        let mut settled = 0;
        while settled < 2 {
            if let MenuEvent::FetchSettled { .. } = next_event(&mut events).await {
                settled += 1;
            }
        }

        let ids = sync
            .working_snapshot()
            .ids()
            .into_iter()
            .map(String::from)
            .collect();

        // Exactly one menu for the burst of requests.
        assert!(matches!(updates.try_recv(), Ok(TrayUpdate::ShowMenu { .. })));
        assert!(updates.try_recv().is_err());

        sync.shutdown().await;
        ids
    }

    #[tokio::test(start_paused = true)]
    async fn newest_list_wins_in_order() {
        assert_eq!(final_snapshot_for([10, 300]).await, vec!["A", "B"]);
    }

    #[tokio::test(start_paused = true)]
    async fn newest_list_wins_out_of_order() {
        assert_eq!(final_snapshot_for([300, 10]).await, vec!["A", "B"]);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_during_fetch_drops_completion() {
        let lister = Arc::new(DelayedLister {
            calls: Mutex::new(vec![(Duration::from_millis(200), vec![app("late")])].into()),
        });
        let (tray, _event_tx, mut updates) = TrayHandle::new(TrayConfig::default());
        let mut sync = AppMenuSync::spawn(
            lister,
            Arc::new(tray.presenter()),
            Arc::new(RecordingSink::default()),
            MenuSyncConfig::default(),
        );
        let mut events = sync.take_events().unwrap();

        sync.request_popup(Anchor::default(), true).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        sync.shutdown().await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(sync.working_snapshot().is_empty());
        assert!(updates.try_recv().is_err());
        assert!(events.try_recv().is_err());
    }

    // ------------------------------------------------------------------
    // Node config to menu to action
    // ------------------------------------------------------------------

    fn write_node_config(dir: &Path) -> PathBuf {
        let path = dir.join("ood1_node_config.json");
        std::fs::write(
            &path,
            r#"{
                "revision": 1,
                "apps": {
                    "files": { "target_state": "Running", "display_name": "Files" },
                    "chat": { "target_state": "Stopped" }
                }
            }"#,
        )
        .unwrap();
        path
    }

    /// Answers the next menu by clicking `label` inside the `submenu`.
    async fn click(
        updates: &mut mpsc::UnboundedReceiver<TrayUpdate>,
        submenu: &str,
        label: &str,
    ) -> MenuCommand {
        let update = tokio::time::timeout(Duration::from_secs(5), updates.recv())
            .await
            .expect("no menu shown")
            .expect("tray closed");
        let (items, reply) = match update {
            TrayUpdate::ShowMenu { items, reply, .. } => (items, reply),
            other => panic!("expected a menu, got {other:?}"),
        };
        let parent: &MenuItem = items
            .iter()
            .find(|i| i.label == submenu)
            .unwrap_or_else(|| panic!("no submenu {submenu}"));
        let command = parent
            .children
            .iter()
            .find(|i| i.label == label)
            .and_then(|i| i.command)
            .unwrap_or_else(|| panic!("no entry {label} in {submenu}"));
        reply.send(Some(command)).unwrap();
        command
    }

    #[tokio::test]
    async fn node_config_drives_menu_and_actions() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_node_config(tmp.path());
        let lister = Arc::new(NodeConfigLister::new(&path, HOME));
        let sink = Arc::new(RecordingSink::default());

        let (tray, _event_tx, mut updates) = TrayHandle::new(TrayConfig::default());
        let mut sync = AppMenuSync::spawn(
            Arc::clone(&lister) as Arc<dyn ApplicationLister>,
            Arc::new(tray.presenter()),
            Arc::clone(&sink) as Arc<dyn ActionSink>,
            MenuSyncConfig {
                home_page_url: HOME.into(),
                list_timeout: Duration::from_secs(5),
            },
        );
        let mut events = sync.take_events().unwrap();

        // Files runs, so its submenu offers Stop.
        sync.request_popup(Anchor::new(100, 100), true).await.unwrap();
        click(&mut updates, "Files", "Stop").await;
        loop {
            if let MenuEvent::Selected { dispatch, .. } = next_event(&mut events).await {
                assert_eq!(
                    dispatch,
                    Dispatch::Action(SystemAction::StopApp("files".into()))
                );
                break;
            }
        }

        // Apply the action the way the agent does and reopen the menu.
        lister
            .set_app_target_state("files", TargetState::Stopped)
            .await
            .unwrap();
        sync.request_popup(Anchor::new(100, 100), true).await.unwrap();
        click(&mut updates, "Files", "Start").await;
        loop {
            if let MenuEvent::Selected { dispatch, .. } = next_event(&mut events).await {
                assert_eq!(
                    dispatch,
                    Dispatch::Action(SystemAction::StartApp("files".into()))
                );
                break;
            }
        }

        assert_eq!(
            *sink.actions.lock().unwrap(),
            vec![
                SystemAction::StopApp("files".into()),
                SystemAction::StartApp("files".into()),
            ]
        );
        sync.shutdown().await;
    }

    #[tokio::test]
    async fn failed_fetch_still_opens_menu() {
        let tmp = tempfile::tempdir().unwrap();
        let lister = Arc::new(NodeConfigLister::new(tmp.path().join("missing.json"), HOME));

        let (tray, _event_tx, mut updates) = TrayHandle::new(TrayConfig::default());
        let mut sync = AppMenuSync::spawn(
            lister,
            Arc::new(tray.presenter()),
            Arc::new(RecordingSink::default()),
            MenuSyncConfig::default(),
        );
        let mut events = sync.take_events().unwrap();

        sync.request_popup(Anchor::default(), false).await.unwrap();
        assert!(matches!(
            next_event(&mut events).await,
            MenuEvent::FetchSettled {
                verdict: FetchVerdict::Failed(_),
                ..
            }
        ));

        let update = updates.recv().await.unwrap();
        let TrayUpdate::ShowMenu { items, .. } = update else {
            panic!("expected a menu");
        };
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Home page", "", "Start", "About", "Exit"]);
        sync.shutdown().await;
    }
}
