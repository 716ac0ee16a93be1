//! Panel state of the generator screen
//!
//! The base machine is `Input <-> Result`. The history list is an overlay
//! that can sit on top of either panel without changing it.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Input,
    Result,
}

/// Issued by [`ViewState::begin_reset`]; only the latest one may finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetToken(u64);

/// Issued by [`ViewState::begin_generate`]. Any later transition makes it
/// stale, so an old generate timer cannot finish a newer submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitToken(u64);

#[derive(Debug, Clone)]
pub struct ViewState {
    panel: Panel,
    show_history: bool,
    url: String,
    image_ref: String,
    /// Text captured at submit time while a generation is running
    pending: Option<String>,
    copied_until: Option<Instant>,
    epoch: u64,
}

/// What the frontend renders from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSnapshot {
    pub panel: Panel,
    pub show_history: bool,
    pub url: String,
    pub image_ref: String,
    pub is_loading: bool,
    pub is_copied: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            panel: Panel::Input,
            show_history: false,
            url: String::new(),
            image_ref: String::new(),
            pending: None,
            copied_until: None,
            epoch: 0,
        }
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn show_history(&self) -> bool {
        self.show_history
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn image_ref(&self) -> &str {
        &self.image_ref
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_copied(&self) -> bool {
        self.copied_until
            .map(|until| Instant::now() < until)
            .unwrap_or(false)
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            panel: self.panel,
            show_history: self.show_history,
            url: self.url.clone(),
            image_ref: self.image_ref.clone(),
            is_loading: self.is_loading(),
            is_copied: self.is_copied(),
        }
    }

    /// Text typed into the input field. Edits made while loading do not
    /// change what the pending submit generates.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Submit the input. Returns `None` (and changes nothing) when the text is
    /// blank, a generation is already running, or the Result panel is shown.
    pub fn begin_generate(&mut self) -> Option<SubmitToken> {
        if self.panel != Panel::Input || self.is_loading() || self.url.trim().is_empty() {
            return None;
        }
        self.pending = Some(self.url.clone());
        self.epoch += 1;
        Some(SubmitToken(self.epoch))
    }

    /// Finish the submit `token` belongs to and switch to the Result panel.
    /// The image reference is built from the submitted text, which also
    /// replaces whatever was typed meanwhile. Returns that text, or `None`
    /// when the token is stale or nothing was pending.
    pub fn complete_generate(
        &mut self,
        token: SubmitToken,
        image_ref: impl FnOnce(&str) -> String,
    ) -> Option<String> {
        if token.0 != self.epoch {
            return None;
        }
        let submitted = self.pending.take()?;
        self.image_ref = image_ref(&submitted);
        self.url = submitted.clone();
        self.panel = Panel::Result;
        Some(submitted)
    }

    /// Leave the Result panel. The text and image are cleared later by
    /// [`finish_reset`](Self::finish_reset), once the transition is over.
    pub fn begin_reset(&mut self) -> Option<ResetToken> {
        if self.panel != Panel::Result {
            return None;
        }
        self.panel = Panel::Input;
        self.copied_until = None;
        self.epoch += 1;
        Some(ResetToken(self.epoch))
    }

    /// Returns false when a newer transition made `token` stale.
    pub fn finish_reset(&mut self, token: ResetToken) -> bool {
        if token.0 != self.epoch || self.panel != Panel::Input || self.is_loading() {
            return false;
        }
        self.url.clear();
        self.image_ref.clear();
        true
    }

    /// Start the copy feedback window. Ignored outside the Result panel.
    pub fn mark_copied(&mut self, window: Duration) -> bool {
        if self.panel != Panel::Result {
            return false;
        }
        self.copied_until = Some(Instant::now() + window);
        true
    }

    pub fn open_history(&mut self) {
        self.show_history = true;
    }

    pub fn close_history(&mut self) {
        self.show_history = false;
    }

    /// Show a past entry on the Result panel and hide the overlay.
    pub fn select_entry(&mut self, url: String, image_ref: String) {
        self.url = url;
        self.image_ref = image_ref;
        self.show_history = false;
        self.pending = None;
        self.copied_until = None;
        self.panel = Panel::Result;
        self.epoch += 1;
    }

    /// Put shared text into the Input panel as if the user had pasted it.
    pub fn present_shared(&mut self, text: String) {
        self.url = text;
        self.image_ref.clear();
        self.show_history = false;
        self.pending = None;
        self.copied_until = None;
        self.panel = Panel::Input;
        self.epoch += 1;
    }
}
