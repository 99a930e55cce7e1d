/*!
 * # Editor Session
 *
 * All editor state in one place. Every change to the buffer goes through a
 * session method, and afterwards:
 *
 * 1. history observes the new content (skipped once after undo/redo),
 * 2. search re-scans,
 * 3. autosave restarts its debounce window.
 *
 * Collaborators (store, auth, uploader) are passed into the methods that
 * need them rather than owned, so a front end decides their lifetimes.
 */

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, AuthProvider, Credentials};
use crate::autosave::{AutosaveCoordinator, AutosaveOptions, SaveStatus};
use crate::editing::{
    Buffer, Direction, EditError, Formatting, History, Motion, Patch, Reveal, SearchMode,
    SearchState, Statistics, motion,
};
use crate::io::{self, IoError};
use crate::models::{Document, DocumentId, DocumentUpdate, UserId};
use crate::preview;
use crate::store::{DocumentStore, StoreError};
use crate::templates;
use crate::upload::{self, ImageUploader, UploadError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("Title cannot be empty")]
    EmptyTitle,
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),
    #[error("Sign in to manage documents")]
    NotSignedIn,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Split,
    Editor,
    Preview,
}

impl ViewMode {
    pub fn next(self) -> Self {
        match self {
            ViewMode::Split => ViewMode::Editor,
            ViewMode::Editor => ViewMode::Preview,
            ViewMode::Preview => ViewMode::Split,
        }
    }
}

/// Which panes are visible
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub mode: ViewMode,
    pub editor_fullscreen: bool,
    pub preview_fullscreen: bool,
    pub search_bar_open: bool,
}

impl ViewState {
    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
        match mode {
            ViewMode::Editor => self.preview_fullscreen = false,
            ViewMode::Preview => self.editor_fullscreen = false,
            ViewMode::Split => {
                self.editor_fullscreen = false;
                self.preview_fullscreen = false;
            }
        }
    }

    pub fn toggle_editor_fullscreen(&mut self) {
        self.editor_fullscreen = !self.editor_fullscreen;
        self.preview_fullscreen = false;
    }

    pub fn toggle_preview_fullscreen(&mut self) {
        self.preview_fullscreen = !self.preview_fullscreen;
        self.editor_fullscreen = false;
    }

    pub fn shows_editor(&self) -> bool {
        !self.preview_fullscreen && (self.editor_fullscreen || self.mode != ViewMode::Preview)
    }

    pub fn shows_preview(&self) -> bool {
        !self.editor_fullscreen && (self.preview_fullscreen || self.mode != ViewMode::Editor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub autosave: AutosaveOptions,
    pub search_mode: SearchMode,
    pub line_height: u32,
    pub view: ViewMode,
}

impl SessionOptions {
    pub fn new() -> Self {
        Self {
            line_height: 20,
            ..Default::default()
        }
    }
}

#[derive(Debug)]
pub struct EditorSession {
    buffer: Buffer,
    history: History,
    search: SearchState,
    autosave: AutosaveCoordinator,
    view: ViewState,
    title: Option<String>,
    documents: Vec<Document>,
    notifications: Vec<Notification>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(SessionOptions::new())
    }
}

impl EditorSession {
    pub fn new(options: SessionOptions) -> Self {
        let mut view = ViewState::default();
        view.set_mode(options.view);
        Self {
            buffer: Buffer::new(),
            history: History::new(""),
            search: SearchState::new(options.search_mode, options.line_height),
            autosave: AutosaveCoordinator::new(options.autosave),
            view,
            title: None,
            documents: Vec::new(),
            notifications: Vec::new(),
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn autosave(&self) -> &AutosaveCoordinator {
        &self.autosave
    }

    pub fn save_status(&self) -> SaveStatus {
        self.autosave.status()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub fn current_document(&self) -> Option<DocumentId> {
        self.autosave.current_document()
    }

    pub fn title(&self) -> &str {
        self.title
            .as_deref()
            .unwrap_or(&self.autosave.options().default_title)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::of(&self.buffer.text())
    }

    pub fn preview_html(&self) -> String {
        preview::render_html(&self.buffer.text())
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NotificationLevel::Info => log::info!("{message}"),
            NotificationLevel::Error => log::warn!("{message}"),
        }
        self.notifications.push(Notification { level, message });
    }

    /// Turn a failed operation into an error notification
    pub fn report<T>(&mut self, result: Result<T, SessionError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.notify(NotificationLevel::Error, e.to_string());
                None
            }
        }
    }

    /// Replace the selection with `text` and put the caret after it
    pub fn insert_text(&mut self, text: &str, now: Instant) -> Result<Patch, SessionError> {
        let selection = self.buffer.selection();
        let patch = self
            .buffer
            .insert_at(selection.start, text, selection.end - selection.start)?;
        self.buffer.set_cursor(selection.start + text.len())?;
        Ok(self.after_edit(patch, now))
    }

    /// Delete the selection, or the character before the caret
    pub fn backspace(&mut self, now: Instant) -> Result<Option<Patch>, SessionError> {
        let selection = self.buffer.selection();
        let start = if selection.is_empty() {
            motion::resolve(&self.buffer.text(), selection.start, Motion::Left)
        } else {
            selection.start
        };
        self.delete_range(start, selection.end, now)
    }

    /// Delete the selection, or the character after the caret
    pub fn delete_forward(&mut self, now: Instant) -> Result<Option<Patch>, SessionError> {
        let selection = self.buffer.selection();
        let end = if selection.is_empty() {
            motion::resolve(&self.buffer.text(), selection.end, Motion::Right)
        } else {
            selection.end
        };
        self.delete_range(selection.start, end, now)
    }

    fn delete_range(
        &mut self,
        start: usize,
        end: usize,
        now: Instant,
    ) -> Result<Option<Patch>, SessionError> {
        if start == end {
            return Ok(None);
        }
        let patch = self.buffer.insert_at(start, "", end - start)?;
        self.buffer.set_cursor(start)?;
        Ok(Some(self.after_edit(patch, now)))
    }

    pub fn move_cursor(&mut self, motion: Motion) {
        let target = motion::resolve(&self.buffer.text(), self.buffer.cursor(), motion);
        if let Err(e) = self.buffer.set_cursor(target) {
            log::warn!("Cursor motion {motion:?} produced an invalid offset: {e}");
        }
    }

    pub fn set_selection(&mut self, range: std::ops::Range<usize>) -> Result<(), SessionError> {
        Ok(self.buffer.set_selection(range)?)
    }

    /// Replace the whole document, e.g. when pasting over everything
    pub fn set_content(&mut self, text: &str, now: Instant) -> Patch {
        let patch = self.buffer.set_content(text);
        self.after_edit(patch, now)
    }

    pub fn apply_formatting(
        &mut self,
        formatting: Formatting,
        now: Instant,
    ) -> Result<Patch, SessionError> {
        let patch = self.buffer.apply_formatting(formatting)?;
        Ok(self.after_edit(patch, now))
    }

    pub fn undo(&mut self, now: Instant) -> Option<Patch> {
        let restored = self.history.undo()?;
        let patch = self.buffer.set_content(&restored.to_string());
        Some(self.after_edit(patch, now))
    }

    pub fn redo(&mut self, now: Instant) -> Option<Patch> {
        let restored = self.history.redo()?;
        let patch = self.buffer.set_content(&restored.to_string());
        Some(self.after_edit(patch, now))
    }

    fn after_edit(&mut self, mut patch: Patch, now: Instant) -> Patch {
        let text = self.buffer.text();
        self.history.record_if_changed(self.buffer.rope());
        self.search.rescan(&text);
        self.autosave.observe_change(&text, now);
        patch.new_selection = self.buffer.selection();
        patch
    }

    /// Load new content without it counting as an edit
    fn load(&mut self, content: &str) {
        self.buffer = Buffer::from_text(content);
        self.buffer.selection = 0..0;
        self.history.reset(content);
        self.search.rescan(content);
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.search.set_query(query, &self.buffer.text());
    }

    pub fn set_search_mode(&mut self, mode: SearchMode) {
        self.search.set_mode(mode, &self.buffer.text());
    }

    /// Move to the next/previous match and select it
    pub fn navigate_search(&mut self, direction: Direction) -> Option<Reveal> {
        let reveal = self.search.navigate(direction)?;
        if let Err(e) = self.buffer.set_selection(reveal.range.clone()) {
            log::warn!("Search match {:?} no longer fits the buffer: {e}", reveal.range);
            return None;
        }
        Some(reveal)
    }

    /// Closing the search bar also clears the query
    pub fn toggle_search_bar(&mut self) {
        self.view.search_bar_open = !self.view.search_bar_open;
        if !self.view.search_bar_open {
            self.search.clear();
        }
    }

    /// Drive autosave. Call regularly from the event loop.
    pub fn tick(
        &mut self,
        now: Instant,
        store: &mut dyn DocumentStore,
        auth: &dyn AuthProvider,
    ) -> SaveStatus {
        let Some(request) = self.autosave.poll(now, auth.current_user()) else {
            return self.autosave.status();
        };
        let created = self.autosave.current_document().is_none();
        let status = self.autosave.save_now(&request, store, now);

        if created
            && status == SaveStatus::Saved
            && let Some(user) = auth.current_user()
            && let Err(e) = self.refresh_documents(store, user)
        {
            log::warn!("Could not refresh documents after first save: {e}");
        }
        status
    }

    /// Save the current content on the next tick, skipping the debounce
    pub fn save_immediately(
        &mut self,
        now: Instant,
        store: &mut dyn DocumentStore,
        auth: &dyn AuthProvider,
    ) -> SaveStatus {
        if auth.current_user().is_none() {
            self.notify(NotificationLevel::Error, SessionError::NotSignedIn.to_string());
            return self.autosave.status();
        }
        self.autosave.trigger_now(&self.buffer.text(), now);
        self.tick(now, store, auth)
    }

    pub fn refresh_documents(
        &mut self,
        store: &dyn DocumentStore,
        user: &UserId,
    ) -> Result<&[Document], SessionError> {
        self.documents = store.list_by_user(user)?;
        if let Some(id) = self.current_document()
            && let Some(doc) = self.documents.iter().find(|doc| doc.id == id)
        {
            self.title = Some(doc.title.clone());
        }
        Ok(&self.documents)
    }

    pub fn open_document(
        &mut self,
        store: &dyn DocumentStore,
        id: DocumentId,
    ) -> Result<(), SessionError> {
        let document = store.get(id)?;
        self.autosave.set_current_document(Some(id));
        self.autosave.mark_persisted(&document.content);
        self.load(&document.content);
        self.title = Some(document.title);
        log::debug!("Opened document {id}");
        Ok(())
    }

    /// Start an empty, not yet persisted document
    pub fn new_document(&mut self) {
        self.autosave.set_current_document(None);
        self.load("");
        self.title = None;
    }

    pub fn delete_document(
        &mut self,
        store: &mut dyn DocumentStore,
        id: DocumentId,
    ) -> Result<(), SessionError> {
        store.delete(id)?;
        self.documents.retain(|doc| doc.id != id);
        if self.current_document() == Some(id) {
            self.autosave.set_current_document(None);
            self.title = None;
        }
        Ok(())
    }

    pub fn rename_document(
        &mut self,
        store: &mut dyn DocumentStore,
        id: DocumentId,
        title: &str,
    ) -> Result<(), SessionError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SessionError::EmptyTitle);
        }
        store.update(id, DocumentUpdate::title(title))?;
        if let Some(doc) = self.documents.iter_mut().find(|doc| doc.id == id) {
            doc.title = title.to_string();
        }
        if self.current_document() == Some(id) {
            self.title = Some(title.to_string());
        }
        Ok(())
    }

    pub fn sign_in(
        &mut self,
        auth: &mut dyn AuthProvider,
        store: &dyn DocumentStore,
        credentials: Credentials,
    ) -> Result<UserId, SessionError> {
        let user = auth.sign_in(credentials)?;
        self.refresh_documents(store, &user)?;
        Ok(user)
    }

    pub fn sign_out(&mut self, auth: &mut dyn AuthProvider) {
        auth.sign_out();
        self.documents.clear();
        self.autosave.set_current_document(None);
        self.title = None;
    }

    /// Replace the buffer with a built-in template
    pub fn apply_template(&mut self, id: &str, now: Instant) -> Result<Patch, SessionError> {
        let template =
            templates::find(id).ok_or_else(|| SessionError::UnknownTemplate(id.to_string()))?;
        Ok(self.set_content(template.content, now))
    }

    pub fn import_file(&mut self, path: &Path, now: Instant) -> Result<Patch, SessionError> {
        let content = io::import_markdown(path)?;
        Ok(self.set_content(&content, now))
    }

    pub fn export_file(&self, path: &Path) -> Result<(), SessionError> {
        io::export_markdown(path, &self.buffer.text())?;
        Ok(())
    }

    /// Upload an image and reference it at the caret. Failures become an
    /// error notification and leave the buffer untouched.
    pub fn insert_uploaded_image(
        &mut self,
        uploader: &mut dyn ImageUploader,
        file_name: &str,
        bytes: &[u8],
        now: Instant,
    ) -> Result<Patch, SessionError> {
        let url = match uploader.upload(file_name, bytes) {
            Ok(url) => url,
            Err(e) => {
                let error = SessionError::from(e);
                self.notify(
                    NotificationLevel::Error,
                    format!("Image upload failed: {error}"),
                );
                return Err(error);
            }
        };
        // Insert at the caret rather than over the selection
        self.buffer.set_cursor(self.buffer.cursor())?;
        let image = upload::image_markdown(file_name, &url);
        self.insert_text(&format!("{image}\n"), now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::LocalAuth;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    struct FailingUploader;

    impl ImageUploader for FailingUploader {
        fn upload(&mut self, _file_name: &str, _bytes: &[u8]) -> Result<String, UploadError> {
            Err(UploadError::UnsupportedType("broken.png".into()))
        }
    }

    struct FixedUploader;

    impl ImageUploader for FixedUploader {
        fn upload(&mut self, file_name: &str, _bytes: &[u8]) -> Result<String, UploadError> {
            Ok(format!("https://img.example/{file_name}"))
        }
    }

    fn later(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    #[test]
    fn test_typing_records_history_and_moves_caret() {
        let t0 = Instant::now();
        let mut session = EditorSession::default();

        session.insert_text("ab", t0).unwrap();
        session.insert_text("c", t0).unwrap();

        assert_eq!(session.text(), "abc");
        assert_eq!(session.buffer().cursor(), 3);
        assert_eq!(session.history().undo_depth(), 3);
    }

    #[test]
    fn test_typing_replaces_selection() {
        let t0 = Instant::now();
        let mut session = EditorSession::default();
        session.set_content("hello world", t0);
        session.set_selection(0..5).unwrap();

        session.insert_text("bye", t0).unwrap();

        assert_eq!(session.text(), "bye world");
        assert_eq!(session.buffer().selection(), 3..3);
    }

    #[test]
    fn test_backspace_and_delete() {
        let t0 = Instant::now();
        let mut session = EditorSession::default();
        session.set_content("héllo", t0);
        session.set_selection(3..3).unwrap();

        session.backspace(t0).unwrap();
        assert_eq!(session.text(), "hllo");
        assert_eq!(session.buffer().cursor(), 1);

        session.delete_forward(t0).unwrap();
        assert_eq!(session.text(), "hlo");

        session.move_cursor(Motion::DocumentStart);
        assert!(session.backspace(t0).unwrap().is_none());
    }

    #[test]
    fn test_undo_redo_through_session() {
        let t0 = Instant::now();
        let mut session = EditorSession::default();
        session.set_content("hello world", t0);
        session.set_selection(6..11).unwrap();
        session.apply_formatting(Formatting::Bold, t0).unwrap();
        assert_eq!(session.text(), "hello **world**");
        let depth = session.history().undo_depth();

        session.undo(t0).unwrap();
        assert_eq!(session.text(), "hello world");
        assert_eq!(session.history().undo_depth(), depth - 1);

        session.redo(t0).unwrap();
        assert_eq!(session.text(), "hello **world**");
        assert_eq!(session.history().undo_depth(), depth);
    }

    #[test]
    fn test_undo_at_bottom_is_noop() {
        let mut session = EditorSession::default();

        assert!(session.undo(Instant::now()).is_none());
        assert_eq!(session.history().undo_depth(), 1);
    }

    #[test]
    fn test_search_navigation_selects_match() {
        let t0 = Instant::now();
        let mut session = EditorSession::default();
        session.set_content("cat bat hat", t0);
        session.set_search_query("at");

        let reveal = session.navigate_search(Direction::Next).unwrap();

        assert_eq!(reveal.range, 5..7);
        assert_eq!(session.buffer().selection(), 5..7);
    }

    #[test]
    fn test_edit_rescans_search() {
        let t0 = Instant::now();
        let mut session = EditorSession::default();
        session.set_content("one", t0);
        session.set_search_query("o");
        assert_eq!(session.search().matches().len(), 1);

        session.insert_text(" two", t0).unwrap();

        assert_eq!(session.search().matches().len(), 2);
    }

    #[test]
    fn test_closing_search_bar_clears_query() {
        let t0 = Instant::now();
        let mut session = EditorSession::default();
        session.set_content("abc", t0);
        session.toggle_search_bar();
        session.set_search_query("b");

        session.toggle_search_bar();

        assert!(!session.view().search_bar_open);
        assert_eq!(session.search().query(), "");
        assert!(session.search().matches().is_empty());
    }

    #[test]
    fn test_view_mode_rules() {
        let mut view = ViewState::default();
        view.toggle_editor_fullscreen();
        assert!(view.shows_editor());
        assert!(!view.shows_preview());

        view.toggle_preview_fullscreen();
        assert!(!view.editor_fullscreen);
        assert!(view.preview_fullscreen);

        view.set_mode(ViewMode::Split);
        assert!(!view.preview_fullscreen);
        assert!(view.shows_editor() && view.shows_preview());

        view.set_mode(ViewMode::Editor);
        assert!(!view.shows_preview());
        assert_eq!(view.mode.next(), ViewMode::Preview);
    }

    #[test]
    fn test_autosave_creates_document_and_lists_it() {
        let t0 = Instant::now();
        let mut store = MemoryStore::new();
        let auth = LocalAuth::signed_in("alice").unwrap();
        let mut session = EditorSession::default();

        session.set_content("# Notes", t0);
        assert_eq!(session.tick(later(t0, 100), &mut store, &auth), SaveStatus::Idle);
        assert_eq!(session.tick(later(t0, 1500), &mut store, &auth), SaveStatus::Saved);

        assert_eq!(store.len(), 1);
        assert_eq!(session.documents().len(), 1);
        assert_eq!(session.title(), "Untitled Document");
        assert!(session.current_document().is_some());
    }

    #[test]
    fn test_no_user_never_saves() {
        let t0 = Instant::now();
        let mut store = MemoryStore::new();
        let auth = LocalAuth::new();
        let mut session = EditorSession::default();

        session.set_content("draft", t0);
        let status = session.tick(later(t0, 10_000), &mut store, &auth);

        assert_eq!(status, SaveStatus::Idle);
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_immediately_requires_user() {
        let t0 = Instant::now();
        let mut store = MemoryStore::new();
        let mut session = EditorSession::default();
        session.set_content("draft", t0);

        session.save_immediately(t0, &mut store, &LocalAuth::new());
        assert!(store.is_empty());
        assert_eq!(session.take_notifications().len(), 1);

        let status = session.save_immediately(t0, &mut store, &LocalAuth::signed_in("bob").unwrap());
        assert_eq!(status, SaveStatus::Saved);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_open_document_resets_history_and_does_not_resave() {
        let t0 = Instant::now();
        let mut store = MemoryStore::new();
        let auth = LocalAuth::signed_in("alice").unwrap();
        let alice = UserId::new("alice");
        let id = store.create(&alice, "Existing", "stored text").unwrap();
        let mut session = EditorSession::default();
        session.set_content("scratch", t0);

        session.open_document(&store, id).unwrap();
        session.tick(later(t0, 5000), &mut store, &auth);

        assert_eq!(session.text(), "stored text");
        assert_eq!(session.title(), "Existing");
        assert_eq!(session.buffer().cursor(), 0);
        assert_eq!(session.history().undo_depth(), 1);
        assert_eq!(session.current_document(), Some(id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_edits_after_open_update_that_document() {
        let t0 = Instant::now();
        let mut store = MemoryStore::new();
        let auth = LocalAuth::signed_in("alice").unwrap();
        let id = store.create(&UserId::new("alice"), "Doc", "v1").unwrap();
        let mut session = EditorSession::default();
        session.open_document(&store, id).unwrap();

        session.move_cursor(Motion::DocumentEnd);
        session.insert_text("+", t0).unwrap();
        session.tick(later(t0, 1500), &mut store, &auth);

        assert_eq!(store.get(id).unwrap().content, "v1+");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_new_document_clears_state() {
        let t0 = Instant::now();
        let mut session = EditorSession::default();
        session.set_content("old", t0);

        session.new_document();

        assert_eq!(session.text(), "");
        assert!(session.current_document().is_none());
        assert!(!session.history().can_undo());
        assert!(!session.autosave().has_pending());
    }

    #[test]
    fn test_delete_open_document_detaches_it() {
        let mut store = MemoryStore::new();
        let alice = UserId::new("alice");
        let id = store.create(&alice, "Doc", "text").unwrap();
        let mut session = EditorSession::default();
        session.refresh_documents(&store, &alice).unwrap();
        session.open_document(&store, id).unwrap();

        session.delete_document(&mut store, id).unwrap();

        assert!(session.current_document().is_none());
        assert!(session.documents().is_empty());
        assert_eq!(session.text(), "text");
    }

    #[test]
    fn test_rename_document() {
        let mut store = MemoryStore::new();
        let alice = UserId::new("alice");
        let id = store.create(&alice, "Old", "").unwrap();
        let mut session = EditorSession::default();
        session.refresh_documents(&store, &alice).unwrap();
        session.open_document(&store, id).unwrap();

        assert!(matches!(
            session.rename_document(&mut store, id, "   "),
            Err(SessionError::EmptyTitle)
        ));
        session.rename_document(&mut store, id, "  New  ").unwrap();

        assert_eq!(session.title(), "New");
        assert_eq!(session.documents()[0].title, "New");
        assert_eq!(store.get(id).unwrap().title, "New");
    }

    #[test]
    fn test_sign_in_loads_documents_and_sign_out_clears() {
        let mut store = MemoryStore::new();
        store.create(&UserId::new("alice"), "Doc", "x").unwrap();
        let mut auth = LocalAuth::new();
        let mut session = EditorSession::default();

        assert!(matches!(
            session.sign_in(&mut auth, &store, Credentials::new(" ")),
            Err(SessionError::Auth(AuthError::InvalidCredentials))
        ));
        session
            .sign_in(&mut auth, &store, Credentials::new("alice"))
            .unwrap();
        assert_eq!(session.documents().len(), 1);

        session.sign_out(&mut auth);
        assert!(session.documents().is_empty());
        assert!(auth.current_user().is_none());
    }

    #[test]
    fn test_apply_template() {
        let t0 = Instant::now();
        let mut session = EditorSession::default();

        session.apply_template("todo-list", t0).unwrap();

        assert!(session.text().starts_with("# Todo"));
        assert!(session.history().can_undo());
        assert!(session.autosave().has_pending());
        assert!(matches!(
            session.apply_template("nope", t0),
            Err(SessionError::UnknownTemplate(_))
        ));
    }

    #[test]
    fn test_uploaded_image_inserted_at_caret() {
        let t0 = Instant::now();
        let mut session = EditorSession::default();
        session.set_content("ab", t0);
        session.set_selection(1..1).unwrap();

        session
            .insert_uploaded_image(&mut FixedUploader, "cat.png", b"", t0)
            .unwrap();

        assert_eq!(session.text(), "a![cat.png](https://img.example/cat.png)\nb");
    }

    #[test]
    fn test_uploaded_image_with_spaces_still_renders() {
        let t0 = Instant::now();
        let mut session = EditorSession::default();

        session
            .insert_uploaded_image(&mut FixedUploader, "my cat.png", b"", t0)
            .unwrap();

        assert_eq!(
            session.text(),
            "![my cat.png](<https://img.example/my cat.png>)\n"
        );
        let html = session.preview_html();
        assert!(html.contains("<img"), "{html}");
        assert!(html.contains(r#"alt="my cat.png""#), "{html}");
    }

    #[test]
    fn test_failed_upload_notifies_and_keeps_buffer() {
        let t0 = Instant::now();
        let mut session = EditorSession::default();
        session.set_content("ab", t0);

        let result = session.insert_uploaded_image(&mut FailingUploader, "cat.png", b"", t0);

        assert!(result.is_err());
        assert_eq!(session.text(), "ab");
        let notifications = session.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].level, NotificationLevel::Error);
    }

    #[test]
    fn test_report_turns_errors_into_notifications() {
        let mut session = EditorSession::default();

        let value = session.report::<()>(Err(SessionError::EmptyTitle));

        assert!(value.is_none());
        assert_eq!(session.notifications()[0].message, "Title cannot be empty");
    }

    #[test]
    fn test_statistics_and_preview() {
        let t0 = Instant::now();
        let mut session = EditorSession::default();
        session.set_content("# Hi\n\nthere", t0);

        assert_eq!(session.statistics().words, 3);
        assert_eq!(session.preview_html(), "<h1>Hi</h1>\n<p>there</p>\n");
    }
}
