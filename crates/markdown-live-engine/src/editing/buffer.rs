use std::borrow::Cow;
use std::ops::Range;

use xi_rope::{Delta, Rope, RopeInfo};

use crate::editing::{Cmd, Patch};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("Range {start}..{end} is outside the buffer (length {len})")]
    OutOfRange { start: usize, end: usize, len: usize },
    #[error("Offset {0} is not on a character boundary")]
    NotCharBoundary(usize),
}

/// The text being edited plus its selection.
///
/// The whole document lives in a single `xi_rope::Rope`. Every mutation goes
/// through a [`Cmd`], which compiles to a `Delta`; the selection is carried
/// through the edit and the version is bumped so observers can detect change.
/// Offsets are UTF-8 byte offsets and must sit on character boundaries.
#[derive(Clone)]
pub struct Buffer {
    pub(crate) rope: Rope,
    /// Invariant: `selection.start <= selection.end <= rope.len()`
    pub(crate) selection: Range<usize>,
    pub(crate) version: u64,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Create a buffer with the cursor at the end of `text`
    pub fn from_text(text: &str) -> Self {
        let rope = Rope::from(text);
        let len = rope.len();
        Self {
            rope,
            selection: len..len,
            version: 0,
        }
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Cheap structural clone of the content
    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn len(&self) -> usize {
        self.rope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len() == 0
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    /// The caret sits at the end of the selection
    pub fn cursor(&self) -> usize {
        self.selection.end
    }

    pub fn set_selection(&mut self, selection: Range<usize>) -> Result<(), EditError> {
        self.check_range(selection.start, selection.end)?;
        self.selection = selection;
        Ok(())
    }

    pub fn set_cursor(&mut self, at: usize) -> Result<(), EditError> {
        self.set_selection(at..at)
    }

    pub fn selected_text(&self) -> Cow<'_, str> {
        self.slice_to_cow(self.selection.clone())
    }

    pub fn slice_to_cow(&self, range: Range<usize>) -> Cow<'_, str> {
        let len = self.rope.len();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        self.rope.slice_to_cow(start..end)
    }

    /// Replace the whole content. The selection is clamped to the new length.
    pub fn set_content(&mut self, text: &str) -> Patch {
        let len = self.rope.len();
        // Full replacement is always in range
        self.apply_unchecked(Cmd::Replace {
            range: 0..len,
            text: text.to_string(),
        })
    }

    /// Splice `text` over `replace_len` bytes starting at `position`.
    pub fn insert_at(
        &mut self,
        position: usize,
        text: &str,
        replace_len: usize,
    ) -> Result<Patch, EditError> {
        let end = position
            .checked_add(replace_len)
            .ok_or(EditError::OutOfRange {
                start: position,
                end: usize::MAX,
                len: self.len(),
            })?;
        self.apply(Cmd::Replace {
            range: position..end,
            text: text.to_string(),
        })
    }

    /// Apply an edit command after validating the range it touches.
    pub fn apply(&mut self, cmd: Cmd) -> Result<Patch, EditError> {
        let range = cmd.target_range();
        self.check_range(range.start, range.end)?;
        Ok(self.apply_unchecked(cmd))
    }

    fn apply_unchecked(&mut self, cmd: Cmd) -> Patch {
        let delta = self.compile_command(&cmd);

        // Track inserted ranges for the patch
        let mut changed = Vec::new();
        let mut cursor = 0;
        for op in delta.els.iter() {
            match op {
                xi_rope::delta::DeltaElement::Copy(from, to) => {
                    cursor += to - from;
                }
                xi_rope::delta::DeltaElement::Insert(inserted) => {
                    let start = cursor;
                    let end = cursor + inserted.len();
                    changed.push(start..end);
                    cursor = end;
                }
            }
        }

        self.rope = delta.apply(&self.rope);

        let new_selection = crate::editing::commands::transform_selection(&self.selection, &cmd);
        let len = self.rope.len();
        self.selection = new_selection.start.min(len)..new_selection.end.min(len);
        self.version += 1;

        Patch {
            changed,
            new_selection: self.selection.clone(),
            version: self.version,
        }
    }

    fn compile_command(&self, cmd: &Cmd) -> Delta<RopeInfo> {
        crate::editing::commands::compile_command(self, cmd)
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), EditError> {
        let len = self.rope.len();
        if start > end || end > len {
            return Err(EditError::OutOfRange { start, end, len });
        }
        if (start == 0 || start == len) && (end == 0 || end == len) {
            return Ok(());
        }
        let text = self.rope.slice_to_cow(0..len);
        for offset in [start, end] {
            if !text.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary(offset));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("text", &self.rope.to_string())
            .field("selection", &self.selection)
            .field("version", &self.version)
            .finish()
    }
}

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        // Rope has no PartialEq; compare content as strings
        self.rope.to_string() == other.rope.to_string()
            && self.selection == other.selection
            && self.version == other.version
    }
}

/// Convert byte offset to (row, column) position in given text
pub(crate) fn byte_to_point_in_text(text: &str, byte_offset: usize) -> (usize, usize) {
    let text_bytes = text.as_bytes();
    let offset = byte_offset.min(text_bytes.len());

    let mut row = 0;
    let mut last_newline = 0;

    for (i, &byte) in text_bytes.iter().enumerate().take(offset) {
        if byte == b'\n' {
            row += 1;
            last_newline = i + 1;
        }
    }

    (row, offset - last_newline)
}
