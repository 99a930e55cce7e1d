use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use markdown_live_engine::{
    AuthProvider, Direction, DocumentId, EditorSession, FileStore, Formatting, LocalAssetUploader,
    LocalAuth, Motion, NotificationLevel, SearchMode, SessionError, templates,
};
use ratatui::widgets::ListState;

/// What keyboard input is currently feeding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Editing,
    Search,
    Documents,
    Prompt { kind: PromptKind, input: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Import,
    Export,
    Template,
    UploadImage,
    Rename(DocumentId),
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::Import => "Import markdown file",
            PromptKind::Export => "Export to",
            PromptKind::Template => "Template",
            PromptKind::UploadImage => "Image file",
            PromptKind::Rename(_) => "New title",
        }
    }
}

pub struct App {
    pub session: EditorSession,
    pub store: FileStore,
    pub auth: LocalAuth,
    pub uploader: LocalAssetUploader,
    pub mode: Mode,
    pub documents_state: ListState,
    /// Last notification shown in the status bar
    pub message: Option<(NotificationLevel, String)>,
    /// First visible editor line
    pub scroll: u16,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        session: EditorSession,
        store: FileStore,
        auth: LocalAuth,
        uploader: LocalAssetUploader,
    ) -> Self {
        let mut app = Self {
            session,
            store,
            auth,
            uploader,
            mode: Mode::Editing,
            documents_state: ListState::default(),
            message: None,
            scroll: 0,
            should_quit: false,
        };
        app.refresh_documents();
        app
    }

    pub fn auth_user_label(&self) -> Option<&str> {
        self.auth.current_user().map(|user| user.as_str())
    }

    pub fn tick(&mut self, now: Instant) {
        self.session.tick(now, &mut self.store, &self.auth);
        self.collect_notifications();
    }

    /// Persist anything still waiting in the debounce window
    pub fn flush_pending(&mut self, now: Instant) {
        if self.session.autosave().has_pending() && self.auth.current_user().is_some() {
            self.session
                .save_immediately(now, &mut self.store, &self.auth);
        }
    }

    fn collect_notifications(&mut self) {
        if let Some(last) = self.session.take_notifications().pop() {
            self.message = Some((last.level, last.message));
        }
    }

    fn report<T>(&mut self, result: Result<T, SessionError>) -> Option<T> {
        let value = self.session.report(result);
        self.collect_notifications();
        value
    }

    fn info(&mut self, message: impl Into<String>) {
        self.session.notify(NotificationLevel::Info, message);
        self.collect_notifications();
    }

    fn refresh_documents(&mut self) {
        let Some(user) = self.auth.current_user().cloned() else {
            return;
        };
        let result = self
            .session
            .refresh_documents(&self.store, &user)
            .map(|docs| docs.len());
        if let Some(count) = self.report(result) {
            self.documents_state
                .select(if count == 0 { None } else { Some(0) });
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('q') {
            self.should_quit = true;
            return;
        }

        match self.mode.clone() {
            Mode::Editing => self.handle_editing_key(key, now),
            Mode::Search => self.handle_search_key(key),
            Mode::Documents => self.handle_documents_key(key),
            Mode::Prompt { kind, input } => self.handle_prompt_key(key, kind, input, now),
        }
    }

    fn handle_editing_key(&mut self, key: KeyEvent, now: Instant) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        if ctrl && let KeyCode::Char(c) = key.code {
            match c {
                'b' => self.format(Formatting::Bold, now),
                't' => self.format(Formatting::Italic, now),
                'k' => self.format(Formatting::Link, now),
                'e' => self.format(Formatting::Code, now),
                'z' => {
                    self.session.undo(now);
                }
                'y' => {
                    self.session.redo(now);
                }
                'f' => self.open_search(),
                'n' => self.navigate(Direction::Next),
                'p' => self.navigate(Direction::Prev),
                's' => {
                    self.session
                        .save_immediately(now, &mut self.store, &self.auth);
                    self.collect_notifications();
                }
                'v' => {
                    let next = self.session.view().mode.next();
                    self.session.view_mut().set_mode(next);
                }
                'o' => {
                    self.refresh_documents();
                    self.mode = Mode::Documents;
                }
                'r' => self.prompt(PromptKind::Import),
                'w' => self.prompt(PromptKind::Export),
                'l' => self.prompt(PromptKind::Template),
                'u' => self.prompt(PromptKind::UploadImage),
                _ => {}
            }
            return;
        }

        if alt && let KeyCode::Char(c) = key.code {
            match c {
                'l' => self.format(Formatting::List, now),
                'o' => self.format(Formatting::NumberedList, now),
                'h' => self.format(Formatting::Heading, now),
                'q' => self.format(Formatting::Quote, now),
                's' => self.format(Formatting::Strikethrough, now),
                't' => self.format(Formatting::Table, now),
                'e' => self.session.view_mut().toggle_editor_fullscreen(),
                'p' => self.session.view_mut().toggle_preview_fullscreen(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char(c) => {
                let result = self.session.insert_text(c.encode_utf8(&mut [0; 4]), now);
                self.report(result);
            }
            KeyCode::Enter => {
                let result = self.session.insert_text("\n", now);
                self.report(result);
            }
            KeyCode::Tab => {
                let result = self.session.insert_text("    ", now);
                self.report(result);
            }
            KeyCode::Backspace => {
                let result = self.session.backspace(now);
                self.report(result);
            }
            KeyCode::Delete => {
                let result = self.session.delete_forward(now);
                self.report(result);
            }
            KeyCode::Left => self.session.move_cursor(Motion::Left),
            KeyCode::Right => self.session.move_cursor(Motion::Right),
            KeyCode::Up => self.session.move_cursor(Motion::Up),
            KeyCode::Down => self.session.move_cursor(Motion::Down),
            KeyCode::Home => self.session.move_cursor(Motion::LineStart),
            KeyCode::End => self.session.move_cursor(Motion::LineEnd),
            KeyCode::PageUp => self.session.move_cursor(Motion::DocumentStart),
            KeyCode::PageDown => self.session.move_cursor(Motion::DocumentEnd),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let mut query = self.session.search().query().to_string();
        match key.code {
            KeyCode::Esc => {
                self.session.toggle_search_bar();
                self.mode = Mode::Editing;
            }
            KeyCode::Enter => {
                self.mode = Mode::Editing;
            }
            KeyCode::Down => self.navigate(Direction::Next),
            KeyCode::Up => self.navigate(Direction::Prev),
            KeyCode::Char('n') if ctrl => self.navigate(Direction::Next),
            KeyCode::Char('p') if ctrl => self.navigate(Direction::Prev),
            KeyCode::Char('x') if ctrl => {
                let mode = match self.session.search().mode() {
                    SearchMode::Literal => SearchMode::Regex,
                    SearchMode::Regex => SearchMode::Literal,
                };
                self.session.set_search_mode(mode);
            }
            KeyCode::Backspace => {
                query.pop();
                self.session.set_search_query(&query);
            }
            KeyCode::Char(c) if !ctrl => {
                query.push(c);
                self.session.set_search_query(&query);
            }
            _ => {}
        }
    }

    fn handle_documents_key(&mut self, key: KeyEvent) {
        let count = self.session.documents().len();
        let selected = self
            .documents_state
            .selected()
            .and_then(|i| self.session.documents().get(i))
            .map(|doc| doc.id);

        match key.code {
            KeyCode::Esc => self.mode = Mode::Editing,
            KeyCode::Down | KeyCode::Char('j') if count > 0 => {
                let i = self.documents_state.selected().map_or(0, |i| (i + 1) % count);
                self.documents_state.select(Some(i));
            }
            KeyCode::Up | KeyCode::Char('k') if count > 0 => {
                let i = self
                    .documents_state
                    .selected()
                    .map_or(0, |i| (i + count - 1) % count);
                self.documents_state.select(Some(i));
            }
            KeyCode::Enter => {
                if let Some(id) = selected {
                    let result = self.session.open_document(&self.store, id);
                    if self.report(result).is_some() {
                        self.scroll = 0;
                        self.mode = Mode::Editing;
                    }
                }
            }
            KeyCode::Char('n') => {
                self.session.new_document();
                self.scroll = 0;
                self.mode = Mode::Editing;
                self.info("New document");
            }
            KeyCode::Char('d') => {
                if let Some(id) = selected {
                    let result = self.session.delete_document(&mut self.store, id);
                    if self.report(result).is_some() {
                        self.refresh_documents();
                        self.info("Document deleted");
                    }
                }
            }
            KeyCode::Char('r') => {
                if let Some(id) = selected {
                    self.prompt(PromptKind::Rename(id));
                }
            }
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent, kind: PromptKind, mut input: String, now: Instant) {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Editing,
            KeyCode::Enter => {
                self.mode = Mode::Editing;
                self.submit_prompt(kind, input.trim(), now);
            }
            KeyCode::Backspace => {
                input.pop();
                self.mode = Mode::Prompt { kind, input };
            }
            KeyCode::Char(c) => {
                input.push(c);
                self.mode = Mode::Prompt { kind, input };
            }
            _ => {}
        }
    }

    fn submit_prompt(&mut self, kind: PromptKind, input: &str, now: Instant) {
        match kind {
            PromptKind::Import => {
                let result = self.session.import_file(&PathBuf::from(input), now);
                if self.report(result).is_some() {
                    self.info(format!("Imported {input}"));
                }
            }
            PromptKind::Export => {
                let result = self.session.export_file(&PathBuf::from(input));
                if self.report(result).is_some() {
                    self.info(format!("Exported to {input}"));
                }
            }
            PromptKind::Template => {
                let result = self.session.apply_template(input, now);
                self.report(result);
            }
            PromptKind::UploadImage => {
                let path = PathBuf::from(input);
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                match std::fs::read(&path) {
                    Ok(bytes) => {
                        let result =
                            self.session
                                .insert_uploaded_image(&mut self.uploader, &name, &bytes, now);
                        // Failed uploads already left a notification behind
                        if result.is_ok() {
                            self.info(format!("Inserted {name}"));
                        } else {
                            self.collect_notifications();
                        }
                    }
                    Err(e) => {
                        self.report::<()>(Err(SessionError::Upload(e.into())));
                    }
                }
            }
            PromptKind::Rename(id) => {
                let result = self.session.rename_document(&mut self.store, id, input);
                self.report(result);
                self.mode = Mode::Documents;
            }
        }
    }

    fn prompt(&mut self, kind: PromptKind) {
        let input = match kind {
            PromptKind::Rename(id) => self
                .session
                .documents()
                .iter()
                .find(|doc| doc.id == id)
                .map(|doc| doc.title.clone())
                .unwrap_or_default(),
            PromptKind::Template => {
                let ids: Vec<_> = templates::all().iter().map(|t| t.id).collect();
                self.info(format!("Templates: {}", ids.join(", ")));
                String::new()
            }
            _ => String::new(),
        };
        self.mode = Mode::Prompt { kind, input };
    }

    fn format(&mut self, formatting: Formatting, now: Instant) {
        let result = self.session.apply_formatting(formatting, now);
        self.report(result);
    }

    fn open_search(&mut self) {
        if !self.session.view().search_bar_open {
            self.session.toggle_search_bar();
        }
        self.mode = Mode::Search;
    }

    fn navigate(&mut self, direction: Direction) {
        if let Some(reveal) = self.session.navigate_search(direction) {
            self.scroll = u16::try_from(reveal.line).unwrap_or(u16::MAX);
        }
    }

    /// Keep the caret line inside an editor pane `height` rows tall
    pub fn follow_cursor(&mut self, cursor_line: usize, height: u16) {
        let line = u16::try_from(cursor_line).unwrap_or(u16::MAX);
        if line < self.scroll {
            self.scroll = line;
        } else if height > 0 && line >= self.scroll.saturating_add(height) {
            self.scroll = line.saturating_sub(height - 1);
        }
    }
}
