//! Planning sessions.
//!
//! Each session follows one source/destination pair in its own tokio task,
//! re-planning on a fixed interval. The task owns the session's planning
//! state and live-traffic history; everyone else reads published snapshots.

use crate::planner::{PlannerError, PlanningSession, PlanningState, RoutePlanner};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Identity of a running session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub source: String,
    pub destination: String,
    pub created_at: DateTime<Utc>,
}

/// The latest published result of a session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSnapshot {
    pub state: Option<PlanningState>,
    pub ticks: u64,
    pub last_error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

struct SessionHandle {
    info: SessionInfo,
    cancel: CancellationToken,
    task: JoinHandle<()>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

/// Starts, tracks and stops planning sessions.
pub struct SessionManager {
    planner: Arc<RoutePlanner>,
    tick_interval: Duration,
    sessions: DashMap<Uuid, SessionHandle>,
    shutdown: CancellationToken,
}

impl SessionManager {
    pub fn new(planner: Arc<RoutePlanner>, tick_interval: Duration) -> Self {
        Self::with_cancel_token(planner, tick_interval, CancellationToken::new())
    }

    /// Sessions are cancelled when `shutdown` is.
    pub fn with_cancel_token(
        planner: Arc<RoutePlanner>,
        tick_interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            planner,
            tick_interval,
            sessions: DashMap::new(),
            shutdown,
        }
    }

    pub fn planner(&self) -> &Arc<RoutePlanner> {
        &self.planner
    }

    /// Start following `source` → `destination`. The first tick runs
    /// immediately.
    pub fn start(&self, source: &str, destination: &str) -> Result<SessionInfo, PlannerError> {
        let session = PlanningSession::new(Arc::clone(&self.planner), source, destination)?;
        let info = SessionInfo {
            id: Uuid::new_v4(),
            source: source.to_string(),
            destination: destination.to_string(),
            created_at: Utc::now(),
        };

        let cancel = self.shutdown.child_token();
        let (tx, rx) = watch::channel(SessionSnapshot::default());
        let task = Self::spawn(session, info.id, self.tick_interval, cancel.clone(), tx);

        tracing::info!(
            session_id = %info.id,
            source,
            destination,
            tick_interval_ms = self.tick_interval.as_millis() as u64,
            "Planning session started"
        );

        self.sessions.insert(
            info.id,
            SessionHandle {
                info: info.clone(),
                cancel,
                task,
                snapshot: rx,
            },
        );
        self.update_gauge();

        Ok(info)
    }

    fn spawn(
        mut session: PlanningSession,
        id: Uuid,
        tick_interval: Duration,
        cancel: CancellationToken,
        tx: watch::Sender<SessionSnapshot>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!(session_id = %id, "Planning session stopping");
                        break;
                    }
                    _ = interval.tick() => {
                        let result = session.tick().await.map(|state| state.clone());
                        let ticks = session.ticks();
                        tx.send_modify(|snapshot| {
                            snapshot.updated_at = Some(Utc::now());
                            match result {
                                Ok(state) => {
                                    snapshot.state = Some(state);
                                    snapshot.ticks = ticks;
                                    snapshot.last_error = None;
                                }
                                Err(e) => {
                                    tracing::warn!(session_id = %id, error = %e, "Planning tick failed");
                                    snapshot.last_error = Some(e.to_string());
                                }
                            }
                        });
                    }
                }
            }
        })
    }

    /// Latest snapshot of a session, `None` when the id is unknown.
    pub fn snapshot(&self, id: &Uuid) -> Option<SessionSnapshot> {
        self.sessions
            .get(id)
            .map(|handle| handle.snapshot.borrow().clone())
    }

    pub fn info(&self, id: &Uuid) -> Option<SessionInfo> {
        self.sessions.get(id).map(|handle| handle.info.clone())
    }

    /// Running sessions, oldest first.
    pub fn list(&self) -> Vec<SessionInfo> {
        let mut sessions: Vec<SessionInfo> = self
            .sessions
            .iter()
            .map(|entry| entry.info.clone())
            .collect();
        sessions.sort_by_key(|s| s.created_at);
        sessions
    }

    /// Wait until a session has published at least `ticks` results.
    pub async fn wait_for_ticks(&self, id: &Uuid, ticks: u64) -> Option<SessionSnapshot> {
        let mut rx = self.sessions.get(id)?.snapshot.clone();
        let snapshot = rx.wait_for(|s| s.ticks >= ticks).await.ok()?;
        Some(snapshot.clone())
    }

    /// Cancel a session and wait for its current tick to finish.
    pub async fn stop(&self, id: &Uuid) -> bool {
        let Some((_, handle)) = self.sessions.remove(id) else {
            return false;
        };
        self.update_gauge();
        handle.cancel.cancel();
        if let Err(e) = handle.task.await {
            tracing::warn!(session_id = %id, error = %e, "Planning session task failed");
        }
        tracing::info!(session_id = %id, "Planning session stopped");
        true
    }

    /// Stop every session.
    pub async fn shutdown(&self) {
        let ids: Vec<Uuid> = self.sessions.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            self.stop(&id).await;
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn update_gauge(&self) {
        metrics::gauge!("roadsage_sessions_active").set(self.sessions.len() as f64);
    }
}
