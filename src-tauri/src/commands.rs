//! Tauri commands for IPC with frontend

use chrono::Local;
use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager};
use tauri_plugin_clipboard_manager::ClipboardExt;

use crate::error::{AppError, AppResult};
use crate::history_manager::{format_entry_time, HistoryEntry};
use crate::nav_items::{NavItem, NAV_ITEMS};
use crate::session::{Clipboard, DirectorySaver, QrSession};
use crate::settings::{self, AppSettings};
use crate::storage::FileStore;
use crate::view_state::ViewSnapshot;

/// Session shared by all commands. Each command applies one transition
/// under the lock; cosmetic delays run with the lock released.
pub struct SessionState {
    inner: tokio::sync::Mutex<QrSession<FileStore>>,
}

impl SessionState {
    pub fn new(session: QrSession<FileStore>) -> Self {
        Self {
            inner: tokio::sync::Mutex::new(session),
        }
    }
}

type State<'a> = tauri::State<'a, SessionState>;

/// History row as shown in the overlay
#[derive(Debug, Clone, Serialize)]
pub struct HistoryItemView {
    pub id: i64,
    pub url: String,
    pub time_label: String,
}

fn history_view(entries: &[HistoryEntry]) -> Vec<HistoryItemView> {
    let now = Local::now();
    entries
        .iter()
        .map(|entry| HistoryItemView {
            id: entry.id,
            url: entry.url.clone(),
            time_label: format_entry_time(&entry.created_at, &now),
        })
        .collect()
}

fn emit_view(app_handle: &AppHandle, snapshot: &ViewSnapshot) {
    let _ = app_handle.emit("view-changed", snapshot);
}

fn emit_history(app_handle: &AppHandle, entries: &[HistoryEntry]) {
    let _ = app_handle.emit("history-changed", history_view(entries));
}

/// Clipboard backed by the clipboard-manager plugin
struct PluginClipboard<'a> {
    app_handle: &'a AppHandle,
}

impl Clipboard for PluginClipboard<'_> {
    fn write_text(&mut self, text: &str) -> AppResult<()> {
        self.app_handle
            .clipboard()
            .write_text(text.to_string())
            .map_err(|e| AppError::Clipboard(e.to_string()))
    }
}

/// Get application settings
#[tauri::command]
pub async fn get_settings(state: State<'_>) -> Result<AppSettings, String> {
    Ok(state.inner.lock().await.settings().clone())
}

/// Save application settings
#[tauri::command]
pub async fn save_settings(new_settings: AppSettings, state: State<'_>) -> Result<(), String> {
    settings::save_settings(&new_settings)?;
    state.inner.lock().await.update_settings(new_settings);
    Ok(())
}

#[tauri::command]
pub async fn get_view_state(state: State<'_>) -> Result<ViewSnapshot, String> {
    Ok(state.inner.lock().await.snapshot())
}

/// Input field changed
#[tauri::command]
pub async fn set_url(url: String, state: State<'_>) -> Result<ViewSnapshot, String> {
    let mut session = state.inner.lock().await;
    session.set_url(url);
    Ok(session.snapshot())
}

/// Submit the input. Returns the final state once the generate delay is over.
#[tauri::command]
pub async fn generate(app_handle: AppHandle, state: State<'_>) -> Result<ViewSnapshot, String> {
    let (token, delay) = {
        let mut session = state.inner.lock().await;
        let Some(token) = session.begin_submit() else {
            return Ok(session.snapshot());
        };
        emit_view(&app_handle, &session.snapshot());
        (token, session.settings().timings.generate_delay())
    };

    tokio::time::sleep(delay).await;

    let mut session = state.inner.lock().await;
    if session.complete_submit(token) {
        emit_history(&app_handle, session.history());
    }
    let snapshot = session.snapshot();
    emit_view(&app_handle, &snapshot);
    Ok(snapshot)
}

/// Close the result card. The input is cleared once the transition is over.
#[tauri::command]
pub async fn reset_view(app_handle: AppHandle, state: State<'_>) -> Result<ViewSnapshot, String> {
    let mut session = state.inner.lock().await;
    let Some(token) = session.begin_reset() else {
        return Ok(session.snapshot());
    };
    let delay = session.settings().timings.reset_delay();
    let snapshot = session.snapshot();
    drop(session);

    let handle = app_handle.clone();
    tauri::async_runtime::spawn(async move {
        tokio::time::sleep(delay).await;
        let state = handle.state::<SessionState>();
        let mut session = state.inner.lock().await;
        if session.finish_reset(token) {
            emit_view(&handle, &session.snapshot());
        }
    });

    Ok(snapshot)
}

#[tauri::command]
pub async fn copy_link(app_handle: AppHandle, state: State<'_>) -> Result<ViewSnapshot, String> {
    let mut session = state.inner.lock().await;
    let mut clipboard = PluginClipboard {
        app_handle: &app_handle,
    };
    let copied = session.copy_link(&mut clipboard).map_err(|e| e.to_string())?;
    let snapshot = session.snapshot();

    if copied {
        // Tell the frontend when the feedback window is over
        let window = session.settings().timings.copy_feedback();
        let handle = app_handle.clone();
        tauri::async_runtime::spawn(async move {
            tokio::time::sleep(window).await;
            let state = handle.state::<SessionState>();
            let session = state.inner.lock().await;
            emit_view(&handle, &session.snapshot());
        });
    }

    Ok(snapshot)
}

/// Download the current QR image. Returns the saved path, if any.
#[tauri::command]
pub async fn download_qr(state: State<'_>) -> Result<Option<String>, String> {
    let session = state.inner.lock().await;
    let mut saver = DirectorySaver::new(session.settings().resolved_download_dir());
    let path = session.download(&mut saver).await.map_err(|e| e.to_string())?;
    Ok(path.map(|p| p.display().to_string()))
}

#[tauri::command]
pub async fn open_history(app_handle: AppHandle, state: State<'_>) -> Result<Vec<HistoryItemView>, String> {
    let mut session = state.inner.lock().await;
    session.open_history();
    emit_view(&app_handle, &session.snapshot());
    Ok(history_view(session.history()))
}

#[tauri::command]
pub async fn close_history(app_handle: AppHandle, state: State<'_>) -> Result<ViewSnapshot, String> {
    let mut session = state.inner.lock().await;
    session.close_history();
    let snapshot = session.snapshot();
    emit_view(&app_handle, &snapshot);
    Ok(snapshot)
}

#[tauri::command]
pub async fn get_history(state: State<'_>) -> Result<Vec<HistoryItemView>, String> {
    Ok(history_view(state.inner.lock().await.history()))
}

#[tauri::command]
pub async fn select_history_entry(id: i64, state: State<'_>) -> Result<ViewSnapshot, String> {
    let mut session = state.inner.lock().await;
    if !session.select_entry(id) {
        return Err("History entry not found".to_string());
    }
    Ok(session.snapshot())
}

#[tauri::command]
pub async fn delete_history_entry(id: i64, state: State<'_>) -> Result<Vec<HistoryItemView>, String> {
    let mut session = state.inner.lock().await;
    Ok(history_view(session.delete_entry(id)))
}

#[tauri::command]
pub async fn clear_history(state: State<'_>) -> Result<Vec<HistoryItemView>, String> {
    let mut session = state.inner.lock().await;
    Ok(history_view(session.clear_history()))
}

#[tauri::command]
pub fn get_nav_items() -> Vec<NavItem> {
    NAV_ITEMS.to_vec()
}

#[tauri::command]
pub fn get_diagnostics() -> String {
    crate::logger::get_all_logs()
}

/// Treat shared text as pasted input followed by a submit.
pub async fn handle_share_link(app_handle: AppHandle, link: String) {
    let (token, delay) = {
        let state = app_handle.state::<SessionState>();
        let mut session = state.inner.lock().await;
        let Some(token) = session.receive_share(&link) else {
            return;
        };
        emit_view(&app_handle, &session.snapshot());
        (token, session.settings().timings.generate_delay())
    };

    tokio::time::sleep(delay).await;

    let state = app_handle.state::<SessionState>();
    let mut session = state.inner.lock().await;
    if session.complete_submit(token) {
        emit_history(&app_handle, session.history());
    }
    emit_view(&app_handle, &session.snapshot());
}
