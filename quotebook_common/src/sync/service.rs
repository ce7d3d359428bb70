//! Merge/push operations and the periodic sync service.
//!
//! Network calls run without holding the store lock; the merge itself runs
//! under the lock, so overlapping fetches cannot append the same record twice.
//! Under the lock the store is reloaded first, so records written meanwhile by
//! another process sharing the storage are merged into, not overwritten.
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crossbeam_channel::Sender;
use log::{error, info, warn};

use crate::config::SyncConfig;
use crate::error::QuoteError;
use crate::quote::Quote;
use crate::result::Result;
use crate::storage::KeyValueStore;
use crate::store::QuoteStore;
use crate::sync::remote::{NewPost, RemoteClient, RemotePost};
use crate::sync::scheduler::ScheduledTask;

/// Store shared between the sync tasks and their owner.
pub type SharedStore<S> = Arc<Mutex<QuoteStore<S>>>;

/// Outcome of one push round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushReport {
    /// Records the endpoint accepted.
    pub sent: usize,
    /// Records that failed; they are not retried.
    pub failed: usize,
}

/// Notification emitted by [`SyncService`] after each run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A fetch completed and added this many new quotes.
    Merged(usize),
    /// A push round completed.
    Pushed(PushReport),
    /// A run failed; local state is unchanged.
    Failed(String),
}

/// Appends the posts whose mapped id is not yet present in `store`.
///
/// `store` is reloaded before the ids are compared. Duplicates inside `posts`
/// are dropped too. Saves only when something was added and returns the
/// number of new quotes.
pub fn merge_remote<S>(store: &mut QuoteStore<S>, posts: Vec<RemotePost>) -> Result<usize>
where
    S: KeyValueStore,
{
    store.reload()?;
    let mut known: HashSet<u64> = store.ids().collect();
    let fresh: Vec<Quote> = posts
        .into_iter()
        .filter(|post| known.insert(post.local_id()))
        .map(RemotePost::into_quote)
        .collect();

    let added = fresh.len();
    if added > 0 {
        store.extend(fresh)?;
    }
    Ok(added)
}

/// Sends every local quote in `quotes` to `remote`, one request each.
///
/// Failures are logged and counted; nothing is retried.
pub fn push_local<R>(quotes: &[Quote], remote: &R, user_id: u64) -> PushReport
where
    R: RemoteClient + ?Sized,
{
    let mut report = PushReport::default();
    for quote in quotes.iter().filter(|q| q.is_local()) {
        match remote.push(&NewPost::from_quote(quote, user_id)) {
            Ok(()) => report.sent += 1,
            Err(e) => {
                warn!("Failed to push quote {:?}: {}", quote.text, e);
                report.failed += 1;
            }
        }
    }
    report
}

/// Fetches one batch and merges it into the shared store.
pub fn fetch_and_merge<S, R>(store: &SharedStore<S>, remote: &R, limit: usize) -> Result<usize>
where
    S: KeyValueStore,
    R: RemoteClient + ?Sized,
{
    let posts = remote.fetch_batch(limit)?;
    let mut store = store.lock()?;
    merge_remote(&mut store, posts)
}

/// Pushes a snapshot of the shared store's local quotes, taken right after a
/// reload.
pub fn push_all<S, R>(store: &SharedStore<S>, remote: &R, user_id: u64) -> Result<PushReport>
where
    S: KeyValueStore,
    R: RemoteClient + ?Sized,
{
    let snapshot: Vec<Quote> = {
        let mut store = store.lock()?;
        store.reload()?;
        store.quotes().iter().filter(|q| q.is_local()).cloned().collect()
    };
    Ok(push_local(&snapshot, remote, user_id))
}

/// Hands `event` to the service owner.
fn report(events: &Sender<SyncEvent>, event: SyncEvent) -> Result<()> {
    events
        .send(event)
        .map_err(|e| QuoteError::ChannelSend(format!("sync event {:?} dropped", e.into_inner())))
}

/// Runs fetch-and-merge and push on their own intervals.
pub struct SyncService {
    fetch_task: ScheduledTask,
    push_task: Option<ScheduledTask>,
}

impl SyncService {
    /// Starts the fetch task (running once immediately) and, when `push` is
    /// set, the push task. Every run reports a [`SyncEvent`] on `events`.
    pub fn start<S, R>(
        store: SharedStore<S>,
        remote: Arc<R>,
        config: &SyncConfig,
        push: bool,
        events: Sender<SyncEvent>,
    ) -> Result<Self>
    where
        S: KeyValueStore + Send + 'static,
        R: RemoteClient + 'static,
    {
        let fetch_task = {
            let store = Arc::clone(&store);
            let remote = Arc::clone(&remote);
            let events = events.clone();
            let limit = config.batch_size;
            ScheduledTask::every("sync-fetch", config.fetch_interval, true, move || {
                let event = match fetch_and_merge(&store, remote.as_ref(), limit) {
                    Ok(added) => {
                        if added > 0 {
                            info!("Quotes synced with server: {} new", added);
                        }
                        SyncEvent::Merged(added)
                    }
                    Err(e) => {
                        error!("Failed to sync with server: {}", e);
                        SyncEvent::Failed(e.to_string())
                    }
                };
                if let Err(e) = report(&events, event) {
                    warn!("{}", e);
                }
            })?
        };

        let push_task = if push {
            let user_id = config.user_id;
            Some(ScheduledTask::every("sync-push", config.push_interval, false, move || {
                let event = match push_all(&store, remote.as_ref(), user_id) {
                    Ok(report) => {
                        info!("Pushed {} quotes ({} failed)", report.sent, report.failed);
                        SyncEvent::Pushed(report)
                    }
                    Err(e) => {
                        error!("Failed to push quotes: {}", e);
                        SyncEvent::Failed(e.to_string())
                    }
                };
                if let Err(e) = report(&events, event) {
                    warn!("{}", e);
                }
            })?)
        } else {
            None
        };

        Ok(Self {
            fetch_task,
            push_task,
        })
    }

    /// Cancels both tasks and waits for them to finish.
    pub fn stop(self) {
        self.fetch_task.cancel();
        if let Some(task) = self.push_task {
            task.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::REMOTE_ID_BASE;
    use crate::storage::{FailingStore, FileStore, MemoryStore, StorageKey};
    use crossbeam_channel::unbounded;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeRemote {
        posts: Vec<RemotePost>,
        pushed: Mutex<Vec<NewPost>>,
        fail_fetch: bool,
        reject_title: Option<String>,
    }

    impl RemoteClient for FakeRemote {
        fn fetch_batch(&self, limit: usize) -> Result<Vec<RemotePost>> {
            if self.fail_fetch {
                return Err(QuoteError::Format("network down".into()));
            }
            Ok(self.posts.iter().take(limit).cloned().collect())
        }

        fn push(&self, post: &NewPost) -> Result<()> {
            if self.reject_title.as_deref() == Some(post.title.as_str()) {
                return Err(QuoteError::Format("rejected".into()));
            }
            self.pushed.lock()?.push(post.clone());
            Ok(())
        }
    }

    fn post(id: u64, title: &str) -> RemotePost {
        RemotePost {
            id,
            user_id: 1,
            title: title.to_string(),
            body: String::new(),
        }
    }

    fn empty_store() -> QuoteStore<MemoryStore> {
        let mut storage = MemoryStore::new();
        storage.set(StorageKey::Quotes, "[]").unwrap();
        QuoteStore::load(storage).unwrap()
    }

    #[test]
    fn test_merge_skips_existing_ids() {
        let mut store = empty_store();
        assert_eq!(merge_remote(&mut store, vec![post(1, "one"), post(2, "two")]).unwrap(), 2);
        assert_eq!(
            merge_remote(&mut store, vec![post(2, "two again"), post(3, "three")]).unwrap(),
            1
        );

        let ids: Vec<u64> = store.ids().collect();
        assert_eq!(ids, vec![REMOTE_ID_BASE + 1, REMOTE_ID_BASE + 2, REMOTE_ID_BASE + 3]);
        assert_eq!(store.quotes()[1].text, "two");
    }

    #[test]
    fn test_merge_never_duplicates_ids() {
        let mut store = empty_store();
        let batch = vec![post(5, "a"), post(5, "b"), post(6, "c"), post(6, "d")];
        assert_eq!(merge_remote(&mut store, batch.clone()).unwrap(), 2);
        assert_eq!(merge_remote(&mut store, batch).unwrap(), 0);

        let ids: Vec<u64> = store.ids().collect();
        let unique: HashSet<u64> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn test_merge_nothing_new_does_not_save() {
        let mut store = empty_store();
        store.storage_mut().remove(StorageKey::Quotes).unwrap();
        assert_eq!(merge_remote(&mut store, Vec::new()).unwrap(), 0);
        assert_eq!(store.storage().get(StorageKey::Quotes).unwrap(), None);
    }

    #[test]
    fn test_push_only_local_quotes() {
        let mut store = empty_store();
        store.add("Mine", "Local").unwrap();
        merge_remote(&mut store, vec![post(9, "theirs")]).unwrap();
        let shared: SharedStore<MemoryStore> = Arc::new(Mutex::new(store));

        let remote = FakeRemote::default();
        let report = push_all(&shared, &remote, 1).unwrap();
        assert_eq!(report, PushReport { sent: 1, failed: 0 });

        let pushed = remote.pushed.lock().unwrap();
        assert_eq!(
            pushed.as_slice(),
            &[NewPost {
                title: "Mine".into(),
                body: "Local".into(),
                user_id: 1
            }]
        );
    }

    #[test]
    fn test_push_counts_failures() {
        let quotes = vec![
            Quote::new("ok", "x").unwrap(),
            Quote::new("bad", "x").unwrap(),
        ];
        let remote = FakeRemote {
            reject_title: Some("bad".into()),
            ..Default::default()
        };
        let report = push_local(&quotes, &remote, 1);
        assert_eq!(report, PushReport { sent: 1, failed: 1 });
    }

    #[test]
    fn test_fetch_failure_leaves_store_unchanged() {
        let shared: SharedStore<MemoryStore> = Arc::new(Mutex::new(empty_store()));
        let remote = FakeRemote {
            fail_fetch: true,
            ..Default::default()
        };
        assert!(fetch_and_merge(&shared, &remote, 5).is_err());
        assert!(shared.lock().unwrap().is_empty());
    }

    #[test]
    fn test_fetch_respects_limit() {
        let shared: SharedStore<MemoryStore> = Arc::new(Mutex::new(empty_store()));
        let remote = FakeRemote {
            posts: (1..=10).map(|i| post(i, "p")).collect(),
            ..Default::default()
        };
        assert_eq!(fetch_and_merge(&shared, &remote, 5).unwrap(), 5);
        assert_eq!(shared.lock().unwrap().len(), 5);
    }

    #[test]
    fn test_service_reports_events_and_stops() {
        let shared: SharedStore<MemoryStore> = Arc::new(Mutex::new(empty_store()));
        shared.lock().unwrap().add("Mine", "Local").unwrap();
        let remote = Arc::new(FakeRemote {
            posts: vec![post(1, "one"), post(2, "two")],
            ..Default::default()
        });
        let config = SyncConfig {
            fetch_interval: Duration::from_millis(20),
            push_interval: Duration::from_millis(20),
            ..Default::default()
        };
        let (events_tx, events_rx) = unbounded();

        let service = SyncService::start(
            Arc::clone(&shared),
            Arc::clone(&remote),
            &config,
            true,
            events_tx,
        )
        .unwrap();

        let mut merged = 0;
        let mut pushed = false;
        while merged < 2 || !pushed {
            match events_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                SyncEvent::Merged(n) => merged += n,
                SyncEvent::Pushed(report) => pushed = report.sent > 0,
                SyncEvent::Failed(msg) => panic!("unexpected failure: {msg}"),
            }
        }
        service.stop();

        assert_eq!(merged, 2);
        assert_eq!(shared.lock().unwrap().len(), 3);
        assert!(remote.pushed.lock().unwrap().iter().all(|p| p.title == "Mine"));
    }

    #[test]
    fn test_failed_save_leaves_merge_unapplied() {
        let json = r#"[{"text":"kept","category":"Life"}]"#;
        let mut store = QuoteStore::load(FailingStore {
            quotes: Some(json.to_string()),
        })
        .unwrap();

        assert!(merge_remote(&mut store, vec![post(1, "one")]).is_err());
        assert_eq!(store.len(), 1);
        assert!(!store.contains_id(REMOTE_ID_BASE + 1));
    }

    #[test]
    fn test_sync_keeps_changes_from_another_process() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let daemon = QuoteStore::load(FileStore::open(&path).unwrap()).unwrap();
        let shared: SharedStore<FileStore> = Arc::new(Mutex::new(daemon));

        let mut cli = QuoteStore::load(FileStore::open(&path).unwrap()).unwrap();
        cli.add("Written by the CLI", "Local").unwrap();
        crate::filter::save_selected(
            cli.storage_mut(),
            &crate::filter::CategoryFilter::Category("Local".into()),
        )
        .unwrap();

        let remote = FakeRemote {
            posts: vec![post(1, "one")],
            ..Default::default()
        };
        assert_eq!(fetch_and_merge(&shared, &remote, 5).unwrap(), 1);

        let on_disk = FileStore::open(&path).unwrap();
        assert_eq!(
            on_disk.get(StorageKey::SelectedCategory).unwrap().as_deref(),
            Some("Local")
        );
        let reopened = QuoteStore::load(on_disk).unwrap();
        assert!(reopened.quotes().iter().any(|q| q.text == "Written by the CLI"));
        assert!(reopened.contains_id(REMOTE_ID_BASE + 1));

        let report = push_all(&shared, &remote, 1).unwrap();
        assert_eq!(report.failed, 0);
        let pushed = remote.pushed.lock().unwrap();
        assert!(pushed.iter().any(|p| p.title == "Written by the CLI"));
    }

    #[test]
    fn test_report_fails_once_receiver_is_gone() {
        let (events_tx, events_rx) = unbounded();
        report(&events_tx, SyncEvent::Merged(1)).unwrap();
        assert_eq!(events_rx.recv().unwrap(), SyncEvent::Merged(1));

        drop(events_rx);
        let err = report(&events_tx, SyncEvent::Merged(2)).unwrap_err();
        assert!(matches!(err, QuoteError::ChannelSend(_)));
    }
}
