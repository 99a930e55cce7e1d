//! Markdown formatting commands applied to the current selection.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::editing::{Buffer, Cmd, EditError, Patch};

pub const TABLE_TEMPLATE: &str =
    "\n| Header 1 | Header 2 |\n| -------- | -------- |\n| Cell 1   | Cell 2   |\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Formatting {
    Bold,
    Italic,
    Code,
    Strikethrough,
    Link,
    List,
    NumberedList,
    Heading,
    Quote,
    Table,
}

/// The edit a formatting command resolves to for a given selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatEdit {
    /// Span of the original content being replaced (the whole selection)
    pub replace: Range<usize>,
    pub insert: String,
    /// Where the caret lands once the edit is applied
    pub cursor: usize,
}

impl Formatting {
    pub const ALL: [Formatting; 10] = [
        Formatting::Bold,
        Formatting::Italic,
        Formatting::Code,
        Formatting::Strikethrough,
        Formatting::Link,
        Formatting::List,
        Formatting::NumberedList,
        Formatting::Heading,
        Formatting::Quote,
        Formatting::Table,
    ];

    /// Text inserted when nothing (or only whitespace) is selected
    pub fn placeholder(self) -> &'static str {
        match self {
            Formatting::Bold => "**bold text**",
            Formatting::Italic => "_italic text_",
            Formatting::Code => "`code`",
            Formatting::Strikethrough => "~~strikethrough text~~",
            Formatting::Link => "[link text](url)",
            Formatting::List => "\n- list item",
            Formatting::NumberedList => "\n1. numbered item",
            Formatting::Heading => "\n# Heading",
            Formatting::Quote => "\n> quote",
            Formatting::Table => TABLE_TEMPLATE,
        }
    }

    /// Inline wrappers as (open, close, cursor advance past the selected text)
    fn wrapper(self) -> Option<(&'static str, &'static str, usize)> {
        match self {
            Formatting::Bold => Some(("**", "**", 4)),
            Formatting::Italic => Some(("_", "_", 2)),
            Formatting::Code => Some(("`", "`", 2)),
            Formatting::Strikethrough => Some(("~~", "~~", 4)),
            // Caret lands on the start of the url placeholder
            Formatting::Link => Some(("[", "](url)", 3)),
            _ => None,
        }
    }

    /// Line prefixes always start on a fresh line, even mid-line
    fn line_prefix(self) -> Option<&'static str> {
        match self {
            Formatting::List => Some("\n- "),
            Formatting::NumberedList => Some("\n1. "),
            Formatting::Heading => Some("\n# "),
            Formatting::Quote => Some("\n> "),
            _ => None,
        }
    }

    /// Resolve this command against `text` with `selection` selected.
    ///
    /// Surrounding whitespace in the selection is kept outside the inline
    /// markers so `" word "` becomes `" **word** "`.
    ///
    /// # Panics
    ///
    /// Panics if `selection` is not a valid char-aligned range of `text`.
    pub fn compile(self, text: &str, selection: Range<usize>) -> FormatEdit {
        let selected = &text[selection.clone()];
        let trimmed = selected.trim();
        // A blank selection counts as starting where the selection starts
        let lead_len = if trimmed.is_empty() {
            0
        } else {
            selected.len() - selected.trim_start().len()
        };
        let lead = &selected[..lead_len];
        let trail = &selected[lead_len + trimmed.len()..];

        let actual_start = selection.start + lead_len;
        let actual_end = actual_start + trimmed.len();

        let (insert, cursor) = if let Some((open, close, advance)) = self.wrapper() {
            if trimmed.is_empty() {
                (self.placeholder().to_string(), actual_start + open.len())
            } else {
                (
                    format!("{lead}{open}{trimmed}{close}{trail}"),
                    actual_end + advance,
                )
            }
        } else if let Some(prefix) = self.line_prefix() {
            if trimmed.is_empty() {
                (self.placeholder().to_string(), actual_start)
            } else {
                (format!("{prefix}{trimmed}"), actual_start)
            }
        } else {
            (TABLE_TEMPLATE.to_string(), actual_start)
        };

        FormatEdit {
            replace: selection,
            insert,
            cursor,
        }
    }
}

impl Buffer {
    /// Apply a formatting command to the current selection and collapse the
    /// selection to the resulting caret position.
    pub fn apply_formatting(&mut self, formatting: Formatting) -> Result<Patch, EditError> {
        let text = self.text();
        let edit = formatting.compile(&text, self.selection());
        let mut patch = self.apply(Cmd::Replace {
            range: edit.replace,
            text: edit.insert,
        })?;

        let cursor = edit.cursor.min(self.len());
        self.selection = cursor..cursor;
        patch.new_selection = cursor..cursor;
        Ok(patch)
    }
}
