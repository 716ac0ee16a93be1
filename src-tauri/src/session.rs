//! One generator session: history store, view state, image client and
//! settings, plus the timers and side effects that connect them.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::history_manager::{HistoryEntry, HistoryStore};
use crate::qr_service::{self, QrImageClient};
use crate::settings::AppSettings;
use crate::share;
use crate::storage::KeyValueStore;
use crate::view_state::{Panel, ResetToken, SubmitToken, ViewSnapshot, ViewState};

/// System clipboard, write-only
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> AppResult<()>;
}

/// Somewhere downloaded images end up
pub trait FileSaver {
    fn save(&mut self, name: &str, bytes: &[u8]) -> AppResult<PathBuf>;
}

/// Saves files into one directory, creating it if needed
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileSaver for DirectorySaver {
    fn save(&mut self, name: &str, bytes: &[u8]) -> AppResult<PathBuf> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| AppError::FileSave(format!("{}: {}", self.dir.display(), e)))?;
        let path = self.dir.join(name);
        fs::write(&path, bytes)
            .map_err(|e| AppError::FileSave(format!("{}: {}", path.display(), e)))?;
        Ok(path)
    }
}

pub struct QrSession<S> {
    history: HistoryStore<S>,
    view: ViewState,
    images: QrImageClient,
    settings: AppSettings,
}

impl<S: KeyValueStore> QrSession<S> {
    pub fn new(settings: AppSettings, storage: S) -> Self {
        let history = HistoryStore::with_capacity(storage, settings.history.capacity);
        app_log!("[Session] Loaded {} history entries", history.list().len());
        Self {
            history,
            view: ViewState::new(),
            images: QrImageClient::new(),
            settings,
        }
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.history.list()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.view.snapshot()
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Image-service and timing settings take effect immediately. A new
    /// history capacity applies from the next start.
    pub fn update_settings(&mut self, settings: AppSettings) {
        self.settings = settings;
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.view.set_url(url);
    }

    pub fn begin_submit(&mut self) -> Option<SubmitToken> {
        self.view.begin_generate()
    }

    /// Resolve the submit `token` belongs to: build the image URL from the
    /// submitted text, show the result and record the text in the history.
    /// A stale token changes nothing.
    pub fn complete_submit(&mut self, token: SubmitToken) -> bool {
        let qr = &self.settings.qr;
        match self
            .view
            .complete_generate(token, |text| qr_service::image_url(qr, text))
        {
            Some(url) => {
                self.history.add(&url);
                true
            }
            None => false,
        }
    }

    /// Submit the current text and wait out the generate delay.
    pub async fn submit(&mut self) -> bool {
        let Some(token) = self.begin_submit() else {
            return false;
        };
        tokio::time::sleep(self.settings.timings.generate_delay()).await;
        self.complete_submit(token)
    }

    pub fn begin_reset(&mut self) -> Option<ResetToken> {
        self.view.begin_reset()
    }

    pub fn finish_reset(&mut self, token: ResetToken) -> bool {
        self.view.finish_reset(token)
    }

    /// Go back to the Input panel and clear it after the reset delay.
    pub async fn reset(&mut self) -> bool {
        let Some(token) = self.begin_reset() else {
            return false;
        };
        tokio::time::sleep(self.settings.timings.reset_delay()).await;
        self.finish_reset(token)
    }

    /// Copy the current text. The copied flag turns itself off after the
    /// feedback window.
    pub fn copy_link(&mut self, clipboard: &mut impl Clipboard) -> AppResult<bool> {
        if self.view.panel() != Panel::Result {
            return Ok(false);
        }
        if let Err(e) = clipboard.write_text(self.view.url()) {
            app_warn!("[Session] {}", e);
            return Err(e);
        }
        Ok(self.view.mark_copied(self.settings.timings.copy_feedback()))
    }

    /// Fetch the displayed image and save it as `qrcode-<millis>.png`.
    pub async fn download(&self, saver: &mut impl FileSaver) -> AppResult<Option<PathBuf>> {
        let image_ref = self.view.image_ref();
        if self.view.panel() != Panel::Result || image_ref.is_empty() {
            return Ok(None);
        }

        let result = match self.images.fetch(image_ref).await {
            Ok(bytes) => saver.save(&qr_service::download_file_name(Utc::now()), &bytes),
            Err(e) => Err(e),
        };
        match result {
            Ok(path) => {
                app_log!("[Session] Saved QR image to {}", path.display());
                Ok(Some(path))
            }
            Err(e) => {
                app_warn!("[Session] Download failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn open_history(&mut self) {
        self.view.open_history();
    }

    pub fn close_history(&mut self) {
        self.view.close_history();
    }

    /// Show a past entry again. Returns false for an unknown id.
    pub fn select_entry(&mut self, id: i64) -> bool {
        let Some(entry) = self.history.get(id) else {
            return false;
        };
        let url = entry.url.clone();
        let image_ref = qr_service::image_url(&self.settings.qr, &url);
        self.view.select_entry(url, image_ref);
        true
    }

    pub fn delete_entry(&mut self, id: i64) -> &[HistoryEntry] {
        self.history.remove(id)
    }

    pub fn clear_history(&mut self) -> &[HistoryEntry] {
        self.history.clear()
    }

    /// Handle a `qrscan://share?text=…` link: put the text in the input and
    /// start a submit. The caller completes it after the generate delay. A
    /// submit that was already running is superseded.
    pub fn receive_share(&mut self, link: &str) -> Option<SubmitToken> {
        let Some(text) = share::shared_text(link) else {
            app_warn!("[Session] Ignoring deep link {}", link);
            return None;
        };
        self.view.present_shared(text);
        self.begin_submit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[derive(Default)]
    struct RecordingClipboard {
        written: Vec<String>,
        fail: bool,
    }

    impl Clipboard for RecordingClipboard {
        fn write_text(&mut self, text: &str) -> AppResult<()> {
            if self.fail {
                return Err(AppError::Clipboard("no clipboard".into()));
            }
            self.written.push(text.to_string());
            Ok(())
        }
    }

    fn session() -> QrSession<MemoryStore> {
        QrSession::new(AppSettings::default(), MemoryStore::new())
    }

    #[test]
    fn complete_submit_records_history() {
        let mut s = session();
        s.set_url("https://a.com");
        let token = s.begin_submit().unwrap();
        assert!(s.complete_submit(token));

        assert_eq!(s.history()[0].url, "https://a.com");
        assert!(s.view().image_ref().contains("data=https%3A%2F%2Fa.com"));
    }

    #[test]
    fn copy_failure_leaves_flag_off() {
        let mut s = session();
        s.set_url("https://a.com");
        let token = s.begin_submit().unwrap();
        s.complete_submit(token);

        let mut clipboard = RecordingClipboard {
            fail: true,
            ..Default::default()
        };
        assert!(s.copy_link(&mut clipboard).is_err());
        assert!(!s.view().is_copied());
    }

    #[test]
    fn copy_writes_url() {
        let mut s = session();
        s.set_url("https://a.com");
        let token = s.begin_submit().unwrap();
        s.complete_submit(token);

        let mut clipboard = RecordingClipboard::default();
        assert!(s.copy_link(&mut clipboard).unwrap());
        assert_eq!(clipboard.written, vec!["https://a.com".to_string()]);
        assert!(s.view().is_copied());
    }

    #[test]
    fn copy_on_input_panel_does_nothing() {
        let mut s = session();
        let mut clipboard = RecordingClipboard::default();
        assert!(!s.copy_link(&mut clipboard).unwrap());
        assert!(clipboard.written.is_empty());
    }

    #[test]
    fn select_entry_shows_result_without_adding() {
        let mut s = session();
        for url in ["https://a.com", "https://b.com"] {
            s.set_url(url);
            let token = s.begin_submit().unwrap();
            s.complete_submit(token);
            s.begin_reset();
        }
        let a_id = s.history()[1].id;
        s.open_history();

        assert!(s.select_entry(a_id));
        assert_eq!(s.view().panel(), Panel::Result);
        assert!(!s.view().show_history());
        assert_eq!(s.view().url(), "https://a.com");
        assert_eq!(s.history()[0].url, "https://b.com");
    }

    #[test]
    fn select_unknown_entry_is_ignored() {
        let mut s = session();
        s.open_history();
        assert!(!s.select_entry(42));
        assert!(s.view().show_history());
    }

    #[test]
    fn delete_and_clear_keep_overlay() {
        let mut s = session();
        s.set_url("https://a.com");
        let token = s.begin_submit().unwrap();
        s.complete_submit(token);
        s.open_history();

        let id = s.history()[0].id;
        assert!(s.delete_entry(id).is_empty());
        assert!(s.clear_history().is_empty());
        assert!(s.view().show_history());
        assert_eq!(s.view().panel(), Panel::Result);
    }

    #[test]
    fn share_link_starts_generation() {
        let mut s = session();
        let token = s
            .receive_share("qrscan://share?text=https%3A%2F%2Fshared.dev")
            .unwrap();
        assert!(s.view().is_loading());
        assert_eq!(s.view().url(), "https://shared.dev");

        assert!(s.complete_submit(token));
        assert_eq!(s.history()[0].url, "https://shared.dev");
    }

    #[test]
    fn bad_share_link_is_ignored() {
        let mut s = session();
        assert!(s.receive_share("https://example.com/?text=x").is_none());
        assert!(!s.view().is_loading());
    }

    #[test]
    fn directory_saver_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut saver = DirectorySaver::new(dir.path().join("downloads"));
        let path = saver.save("qrcode-1.png", b"png").unwrap();
        assert_eq!(fs::read(path).unwrap(), b"png");
    }
}
