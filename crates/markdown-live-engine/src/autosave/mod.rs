/*!
 * # Autosave
 *
 * A debounced save scheduler. It never touches storage itself: the caller
 * feeds it change observations and clock readings, and it answers with the
 * [`SaveRequest`] to run. The outcome of running it comes back through
 * [`AutosaveCoordinator::complete`].
 *
 * ```text
 * observe_change ──► (debounce) ──► poll ──► SaveRequest ──► store ──► complete
 *                                                                         │
 *       Idle ──► Saving ──► Saved ──(display timer)──► Idle               │
 *                      └──► Error ◄───────────────────────────────────────┘
 * ```
 *
 * Only one save is in flight at a time. Changes that become due while a
 * save is running collapse into a single follow-up carrying the newest
 * content, which becomes due as soon as the running save completes.
 */

use std::fmt;
use std::time::{Duration, Instant};

use crate::models::{DocumentId, DocumentUpdate, UserId};
use crate::store::{DocumentStore, StoreError};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1500);
pub const DEFAULT_SAVED_DISPLAY: Duration = Duration::from_millis(2000);
pub const DEFAULT_TITLE: &str = "Untitled Document";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SaveStatus::Idle => "",
            SaveStatus::Saving => "Saving...",
            SaveStatus::Saved => "Saved",
            SaveStatus::Error => "Save failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveOptions {
    pub debounce: Duration,
    /// How long `Saved` stays visible before dropping back to `Idle`
    pub saved_display: Duration,
    /// Title given to documents created by autosave
    pub default_title: String,
}

impl Default for AutosaveOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            saved_display: DEFAULT_SAVED_DISPLAY,
            default_title: DEFAULT_TITLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    Create { user_id: UserId, title: String },
    Update { id: DocumentId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub target: SaveTarget,
    pub content: String,
}

impl SaveRequest {
    /// Run the request against `store`, returning the saved document's id
    pub fn execute(&self, store: &mut dyn DocumentStore) -> Result<DocumentId, StoreError> {
        match &self.target {
            SaveTarget::Create { user_id, title } => store.create(user_id, title, &self.content),
            SaveTarget::Update { id } => store
                .update(*id, DocumentUpdate::content(self.content.as_str()))
                .map(|()| *id),
        }
    }
}

#[derive(Debug)]
struct InFlight {
    content: String,
    /// Document generation the save was issued for
    generation: u64,
}

#[derive(Debug)]
pub struct AutosaveCoordinator {
    options: AutosaveOptions,
    status: SaveStatus,
    current_document: Option<DocumentId>,
    /// Bumped whenever the current document is switched
    generation: u64,
    pending: Option<String>,
    deadline: Option<Instant>,
    in_flight: Option<InFlight>,
    follow_up: Option<String>,
    last_saved: Option<String>,
    saved_until: Option<Instant>,
}

impl Default for AutosaveCoordinator {
    fn default() -> Self {
        Self::new(AutosaveOptions::default())
    }
}

impl AutosaveCoordinator {
    pub fn new(options: AutosaveOptions) -> Self {
        Self {
            options,
            status: SaveStatus::Idle,
            current_document: None,
            generation: 0,
            pending: None,
            deadline: None,
            in_flight: None,
            follow_up: None,
            last_saved: None,
            saved_until: None,
        }
    }

    pub fn options(&self) -> &AutosaveOptions {
        &self.options
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    pub fn current_document(&self) -> Option<DocumentId> {
        self.current_document
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether a save is scheduled but not yet issued
    pub fn has_pending(&self) -> bool {
        self.pending.is_some() || self.follow_up.is_some()
    }

    /// When the next `poll` could do something, if ever
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.deadline, self.saved_until) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// The buffer changed: restart the debounce window with `content`
    pub fn observe_change(&mut self, content: &str, now: Instant) {
        self.pending = Some(content.to_string());
        self.deadline = Some(now + self.options.debounce);
    }

    /// Make `content` due immediately, skipping the debounce window
    pub fn trigger_now(&mut self, content: &str, now: Instant) {
        self.pending = Some(content.to_string());
        self.deadline = Some(now);
    }

    /// Drop whatever is scheduled. A save already in flight still completes.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
        self.follow_up = None;
    }

    /// Switch which document saves go to. `None` means the next save creates
    /// a new document.
    pub fn set_current_document(&mut self, id: Option<DocumentId>) {
        self.cancel();
        self.current_document = id;
        self.last_saved = None;
        self.generation += 1;
    }

    /// Record `content` as already persisted so identical content is not
    /// written again
    pub fn mark_persisted(&mut self, content: &str) {
        self.last_saved = Some(content.to_string());
    }

    /// Advance timers and hand out a save request once the debounce window
    /// has elapsed.
    pub fn poll(&mut self, now: Instant, user: Option<&UserId>) -> Option<SaveRequest> {
        if let Some(until) = self.saved_until
            && now >= until
        {
            self.saved_until = None;
            if self.status == SaveStatus::Saved {
                self.status = SaveStatus::Idle;
            }
        }

        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        let content = self.pending.take()?;

        if content.trim().is_empty() {
            log::debug!("Autosave skipped: document is blank");
            return None;
        }
        let Some(user) = user else {
            log::debug!("Autosave skipped: nobody is signed in");
            return None;
        };
        // `last_saved` is stale while a save runs; compare after completion
        if self.in_flight.is_some() {
            log::debug!("Autosave deferred: a save is already running");
            self.follow_up = Some(content);
            return None;
        }
        if self.last_saved.as_deref() == Some(content.as_str()) {
            log::debug!("Autosave skipped: content unchanged since last save");
            return None;
        }

        let target = match self.current_document {
            Some(id) => SaveTarget::Update { id },
            None => SaveTarget::Create {
                user_id: user.clone(),
                title: self.options.default_title.clone(),
            },
        };
        self.status = SaveStatus::Saving;
        self.saved_until = None;
        self.in_flight = Some(InFlight {
            content: content.clone(),
            generation: self.generation,
        });
        log::debug!("Autosave issued: {target:?} ({} bytes)", content.len());
        Some(SaveRequest { target, content })
    }

    /// Report how the last issued request went
    pub fn complete(&mut self, result: Result<DocumentId, StoreError>, now: Instant) {
        let Some(in_flight) = self.in_flight.take() else {
            log::warn!("Autosave completion with no save in flight");
            return;
        };
        let same_document = in_flight.generation == self.generation;

        match result {
            Ok(id) => {
                if same_document {
                    self.current_document = Some(id);
                    self.last_saved = Some(in_flight.content);
                }
                self.status = SaveStatus::Saved;
                self.saved_until = Some(now + self.options.saved_display);
                log::debug!("Autosave finished for {id}");
            }
            Err(e) => {
                self.status = SaveStatus::Error;
                self.saved_until = None;
                log::error!("Autosave failed: {e}");
            }
        }

        if let Some(follow_up) = self.follow_up.take()
            && self.pending.is_none()
        {
            self.pending = Some(follow_up);
            self.deadline = Some(now);
        }
    }

    /// Run `request` synchronously against `store`
    pub fn save_now(
        &mut self,
        request: &SaveRequest,
        store: &mut dyn DocumentStore,
        now: Instant,
    ) -> SaveStatus {
        let result = request.execute(store);
        self.complete(result, now);
        self.status
    }
}
