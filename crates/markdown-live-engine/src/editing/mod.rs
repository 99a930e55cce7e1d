/*!
 * # Editing Core
 *
 * The in-memory editor state machine. A front end feeds input into a
 * [`Buffer`], and the rest of the state is kept in step with it.
 *
 * ## Pieces
 *
 * - **`buffer`**: `Buffer`, a single `xi_rope::Rope` plus selection and a
 *   version counter. Every edit is a `Cmd` compiled to a `Delta`.
 * - **`commands`**: the `Cmd` edit algebra and selection transformation.
 * - **`format`**: Markdown formatting commands (bold, lists, tables, ...)
 *   resolved against the current selection.
 * - **`history`**: snapshot undo/redo with a re-entrancy guard so restoring a
 *   snapshot is not recorded as a new edit.
 * - **`search`**: case-insensitive literal (or opt-in regex) search with
 *   wrap-around navigation.
 * - **`motion`**: caret movement by character, line and document.
 * - **`patch`**: what an edit changed.
 * - **`stats`**: word, line and character counts.
 *
 * ## Usage Pattern
 *
 * ```rust
 * use markdown_live_engine::editing::*;
 *
 * let mut buffer = Buffer::from_text("hello world");
 * let mut history = History::new(&buffer.text());
 *
 * buffer.set_selection(6..11).unwrap();
 * buffer.apply_formatting(Formatting::Bold).unwrap();
 * history.record_if_changed(buffer.rope());
 * assert_eq!(buffer.text(), "hello **world**");
 *
 * let restored = history.undo().unwrap();
 * buffer.set_content(&restored.to_string());
 * history.record_if_changed(buffer.rope());
 * assert_eq!(buffer.text(), "hello world");
 * ```
 */

pub mod buffer;
pub mod commands;
pub mod format;
pub mod history;
pub mod motion;
pub mod patch;
pub mod search;
pub mod stats;

pub use buffer::{Buffer, EditError};
pub use commands::Cmd;
pub use format::{FormatEdit, Formatting, TABLE_TEMPLATE};
pub use history::History;
pub use motion::Motion;
pub use patch::Patch;
pub use search::{Direction, Match, Reveal, SearchMode, SearchState};
pub use stats::Statistics;
