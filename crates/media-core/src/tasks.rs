//! Per-call media task tracking
//!
//! Each call may own one background media task. The task is cancelled when
//! the call is deregistered, when a new task is spawned for the same call,
//! or when the whole manager shuts down.

use std::future::Future;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

struct CallTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Tracks cancellable media tasks keyed by session id
pub struct MediaTaskManager {
    tasks: DashMap<String, CallTask>,
    root: CancellationToken,
    shutdown_timeout: Duration,
}

impl MediaTaskManager {
    pub fn new() -> Self {
        Self::with_shutdown_timeout(Duration::from_secs(5))
    }

    pub fn with_shutdown_timeout(shutdown_timeout: Duration) -> Self {
        Self {
            tasks: DashMap::new(),
            root: CancellationToken::new(),
            shutdown_timeout,
        }
    }

    /// Run `future` as the media task of `session_id`
    ///
    /// A task already running for the same session is cancelled first.
    pub fn spawn<F>(&self, session_id: &str, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.retain(|_, task| !task.handle.is_finished());

        let token = self.root.child_token();
        let cancelled = token.clone();
        let id = session_id.to_string();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = future => {
                    debug!(session_id = %id, "Media task completed");
                }
                _ = cancelled.cancelled() => {
                    debug!(session_id = %id, "Media task cancelled");
                }
            }
        });

        if let Some(previous) = self
            .tasks
            .insert(session_id.to_string(), CallTask { token, handle })
        {
            debug!(session_id = %session_id, "Replacing running media task");
            previous.token.cancel();
        }
    }

    /// Cancel the media task of `session_id`; returns whether one was tracked
    pub fn cancel(&self, session_id: &str) -> bool {
        match self.tasks.remove(session_id) {
            Some((_, task)) => {
                task.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Number of tasks still running
    pub fn active_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|entry| !entry.handle.is_finished())
            .count()
    }

    /// Cancel every task and wait for them to stop
    pub async fn shutdown(&self) {
        self.root.cancel();

        let ids: Vec<String> = self.tasks.iter().map(|entry| entry.key().clone()).collect();
        let handles: Vec<_> = ids
            .into_iter()
            .filter_map(|id| self.tasks.remove(&id))
            .map(|(_, task)| task.handle)
            .collect();
        let count = handles.len();

        match tokio::time::timeout(self.shutdown_timeout, futures::future::join_all(handles)).await {
            Ok(_) => debug!(count, "Media tasks stopped"),
            Err(_) => warn!(
                count,
                "Media tasks did not stop within {:?}", self.shutdown_timeout
            ),
        }
    }
}

impl Default for MediaTaskManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MediaTaskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaTaskManager")
            .field("tracked", &self.tasks.len())
            .finish()
    }
}
