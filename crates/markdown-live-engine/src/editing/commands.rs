use std::ops::Range;

use xi_rope::{Delta, Rope, RopeInfo, delta::Builder};

use crate::editing::Buffer;

/// Edit commands. Every buffer mutation is expressed as one of these and
/// compiled to a `Delta` before it touches the rope.
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    InsertText { at: usize, text: String },
    DeleteRange { range: Range<usize> },
    Replace { range: Range<usize>, text: String },
}

impl Cmd {
    /// The byte range of the existing content this command reads or replaces
    pub(crate) fn target_range(&self) -> Range<usize> {
        match self {
            Cmd::InsertText { at, .. } => *at..*at,
            Cmd::DeleteRange { range } | Cmd::Replace { range, .. } => range.clone(),
        }
    }

    fn replaced_and_inserted(&self) -> (Range<usize>, usize) {
        match self {
            Cmd::InsertText { at, text } => (*at..*at, text.len()),
            Cmd::DeleteRange { range } => (range.clone(), 0),
            Cmd::Replace { range, text } => (range.clone(), text.len()),
        }
    }
}

pub(crate) fn compile_command(buffer: &Buffer, cmd: &Cmd) -> Delta<RopeInfo> {
    let mut builder = Builder::new(buffer.len());
    match cmd {
        Cmd::InsertText { at, text } => {
            builder.replace(*at..*at, Rope::from(text.as_str()));
        }
        Cmd::DeleteRange { range } => {
            builder.delete(range.clone());
        }
        Cmd::Replace { range, text } => {
            builder.replace(range.clone(), Rope::from(text.as_str()));
        }
    }
    builder.build()
}

/// Carry a selection through an edit. Offsets before the edit stay put,
/// offsets after it shift by the size change and offsets inside a replaced
/// span land at the end of the inserted text.
pub(crate) fn transform_selection(selection: &Range<usize>, cmd: &Cmd) -> Range<usize> {
    let (replaced, inserted) = cmd.replaced_and_inserted();
    let map = |offset: usize| {
        if offset <= replaced.start {
            offset
        } else if offset >= replaced.end {
            offset - (replaced.end - replaced.start) + inserted
        } else {
            replaced.start + inserted
        }
    };
    map(selection.start)..map(selection.end)
}
