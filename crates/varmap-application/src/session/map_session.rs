//! Map screen session controller.
//!
//! Owns the UI state snapshot, mirrors the engine's observables into it and
//! writes the restart-durable part through to the session state store on every
//! transition.

use crate::reconciliation::ReconciliationEngine;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use varmap_core::point::Point;
use varmap_core::session_state::{
    PendingAddDialog, SessionState, SessionStateRepository, StateEntry, keys,
};

/// Everything a map screen renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UiState {
    /// Persisted across restarts.
    pub session: SessionState,
    pub points: Vec<Point>,
    pub is_syncing: bool,
    pub location_granted: bool,
    pub is_programmatic_move: bool,
}

pub struct MapSession {
    engine: Arc<ReconciliationEngine>,
    state_store: Arc<dyn SessionStateRepository>,
    ui: watch::Sender<UiState>,
    /// Serializes persisted transitions so the store and the snapshot agree.
    transition_lock: Mutex<()>,
}

impl MapSession {
    /// Restores the persisted session and seeds the transient fields from the
    /// engine.
    pub async fn hydrate(
        engine: Arc<ReconciliationEngine>,
        state_store: Arc<dyn SessionStateRepository>,
    ) -> Result<Arc<Self>> {
        let session = load_session(state_store.as_ref())
            .await
            .context("Failed to restore session state")?;

        let ui = UiState {
            session,
            points: engine.points().borrow().clone(),
            is_syncing: engine.is_syncing(),
            ..UiState::default()
        };
        tracing::debug!(
            center_lat = ui.session.center_lat,
            center_lon = ui.session.center_lon,
            "Session hydrated"
        );

        Ok(Arc::new(Self {
            engine,
            state_store,
            ui: watch::Sender::new(ui),
            transition_lock: Mutex::new(()),
        }))
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.ui.subscribe()
    }

    pub fn snapshot(&self) -> UiState {
        self.ui.borrow().clone()
    }

    /// Mirrors the engine's points and syncing flag into the UI state until
    /// the engine shuts down.
    pub fn bind(self: &Arc<Self>) -> JoinHandle<()> {
        let session = Arc::clone(self);
        let mut points = self.engine.points();
        let mut syncing = self.engine.syncing();
        let shutdown = self.engine.shutdown_token();

        // Changes between hydrate and subscribe are not signalled as new.
        self.ui.send_modify(|ui| {
            ui.points = points.borrow_and_update().clone();
            ui.is_syncing = *syncing.borrow_and_update();
        });

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    changed = points.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let list = points.borrow_and_update().clone();
                        session.ui.send_modify(|ui| ui.points = list);
                    }
                    changed = syncing.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let flag = *syncing.borrow_and_update();
                        session.ui.send_modify(|ui| ui.is_syncing = flag);
                    }
                }
            }
            tracing::debug!("UI state binding stopped");
        })
    }

    pub async fn set_center(&self, lat: f64, lon: f64) -> Result<()> {
        self.transition(|s| {
            s.center_lat = lat;
            s.center_lon = lon;
            SessionState::center_entries(lat, lon)
        })
        .await
    }

    pub async fn open_chat(&self, open: bool) -> Result<()> {
        self.transition(|s| {
            s.chat_open = open;
            s.chat_entries()
        })
        .await
    }

    pub async fn set_input_message(&self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        self.transition(|s| {
            s.chat_input = text;
            s.chat_entries()
        })
        .await
    }

    /// Appends the trimmed input to the transcript and clears the input.
    /// Blank input is ignored.
    pub async fn send_message(&self) -> Result<()> {
        self.transition(|s| {
            let message = s.chat_input.trim().to_string();
            if message.is_empty() {
                return Vec::new();
            }
            s.chat_transcript.push(message);
            s.chat_input.clear();
            s.chat_entries()
        })
        .await
    }

    pub async fn show_add_point_dialog(&self, lat: f64, lon: f64) -> Result<()> {
        let dialog = PendingAddDialog {
            latitude: lat,
            longitude: lon,
        };
        self.transition(|s| {
            s.pending_add_dialog = Some(dialog);
            SessionState::pending_dialog_entries(Some(dialog))
        })
        .await
    }

    pub async fn hide_add_point_dialog(&self) -> Result<()> {
        self.transition(|s| {
            s.pending_add_dialog = None;
            SessionState::pending_dialog_entries(None)
        })
        .await
    }

    /// Stores a copy of `point` as the selection, or clears it.
    pub async fn select_point(&self, point: Option<Point>) -> Result<()> {
        self.transition(|s| {
            let entries = SessionState::selected_point_entries(point.as_ref());
            s.selected_point = point;
            entries
        })
        .await
    }

    /// Adds a point named `name` at the pending dialog's coordinate.
    ///
    /// Without a pending dialog this does nothing and returns `None`.
    /// Otherwise the dialog is closed, the point is stored locally, and the
    /// handle of the background push is returned.
    pub async fn add_point(
        &self,
        name: impl Into<String>,
    ) -> Result<Option<JoinHandle<varmap_core::Result<usize>>>> {
        let Some(dialog) = self.ui.borrow().session.pending_add_dialog else {
            tracing::debug!("No pending dialog, ignoring add");
            return Ok(None);
        };

        self.hide_add_point_dialog().await?;

        let point = Point::new(name, dialog.latitude, dialog.longitude);
        let push = self
            .engine
            .add_local(point)
            .await
            .context("Failed to store point locally")?;
        Ok(Some(push))
    }

    /// Pulls once. Progress is visible through `is_syncing`; a failure is
    /// logged and returned.
    pub async fn manual_sync(&self) -> Result<()> {
        if let Err(e) = self.engine.manual_sync().await {
            tracing::warn!("Manual sync failed: {}", e);
            return Err(e).context("Manual sync failed");
        }
        Ok(())
    }

    pub fn set_location_granted(&self, granted: bool) {
        self.ui.send_modify(|ui| ui.location_granted = granted);
    }

    pub fn start_programmatic_move(&self) {
        self.ui.send_modify(|ui| ui.is_programmatic_move = true);
    }

    pub fn end_programmatic_move(&self) {
        self.ui.send_modify(|ui| ui.is_programmatic_move = false);
    }

    /// Applies `change` to a copy of the persisted state, saves the entries it
    /// returns, and publishes the copy. A failed save publishes nothing.
    async fn transition<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut SessionState) -> Vec<StateEntry>,
    {
        let _guard = self.transition_lock.lock().await;

        let mut next = self.ui.borrow().session.clone();
        let entries = change(&mut next);
        self.state_store
            .set_many(entries)
            .await
            .context("Failed to persist session state")?;

        self.ui.send_modify(|ui| ui.session = next);
        Ok(())
    }
}

async fn load_session(store: &dyn SessionStateRepository) -> varmap_core::Result<SessionState> {
    let defaults = SessionState::default();

    let center_lat = store.get(keys::CENTER_LAT).await?;
    let center_lon = store.get(keys::CENTER_LON).await?;
    let chat_open = store.get(keys::CHAT_OPEN).await?;
    let chat_input = store.get(keys::CHAT_INPUT).await?;
    let messages = store.get(keys::MESSAGES).await?;

    let selected_point = SessionState::decode_selected_point(
        store.get(keys::SELECTED_NAME).await?.as_ref(),
        store.get(keys::SELECTED_LAT).await?.as_ref(),
        store.get(keys::SELECTED_LON).await?.as_ref(),
    );
    let pending_add_dialog = SessionState::decode_pending_dialog(
        store.get(keys::ADD_LAT).await?.as_ref(),
        store.get(keys::ADD_LON).await?.as_ref(),
    );

    Ok(SessionState {
        center_lat: center_lat
            .and_then(|v| v.as_f64())
            .unwrap_or(defaults.center_lat),
        center_lon: center_lon
            .and_then(|v| v.as_f64())
            .unwrap_or(defaults.center_lon),
        chat_open: chat_open
            .and_then(|v| v.as_bool())
            .unwrap_or(defaults.chat_open),
        chat_input: chat_input
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or(defaults.chat_input),
        chat_transcript: messages
            .and_then(|v| v.as_list().map(<[String]>::to_vec))
            .unwrap_or(defaults.chat_transcript),
        selected_point,
        pending_add_dialog,
    })
}
