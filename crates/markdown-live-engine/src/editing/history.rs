use xi_rope::Rope;

/// Snapshot-based undo/redo.
///
/// Every distinct content observed by [`History::record_if_changed`] becomes
/// one entry. Snapshots are ropes, so consecutive entries share most of
/// their structure. The undo stack never shrinks below its bottom entry.
#[derive(Clone)]
pub struct History {
    /// Past states, newest last. Never empty.
    undo: Vec<Rope>,
    /// Undone states, most recently undone last
    redo: Vec<Rope>,
    /// Set while an undo/redo is writing restored content back into the
    /// buffer so the resulting change observation is not recorded again
    restoring: bool,
}

impl Default for History {
    fn default() -> Self {
        Self::new("")
    }
}

impl History {
    pub fn new(initial: &str) -> Self {
        Self {
            undo: vec![Rope::from(initial)],
            redo: Vec::new(),
            restoring: false,
        }
    }

    /// Forget everything and start over from `initial`
    pub fn reset(&mut self, initial: &str) {
        *self = Self::new(initial);
    }

    /// Observe buffer content after a change.
    ///
    /// Returns `true` when a new entry was pushed.
    pub fn record_if_changed(&mut self, content: &Rope) -> bool {
        if self.restoring {
            self.restoring = false;
            return false;
        }

        if self.top_equals(content) {
            return false;
        }

        self.undo.push(content.clone());
        self.redo.clear();
        true
    }

    /// Step back one entry, returning the content to restore
    pub fn undo(&mut self) -> Option<Rope> {
        if self.undo.len() <= 1 {
            return None;
        }

        let current = self.undo.pop()?;
        self.redo.push(current);
        self.restoring = true;
        self.undo.last().cloned()
    }

    /// Re-apply the most recently undone entry
    pub fn redo(&mut self) -> Option<Rope> {
        let next = self.redo.pop()?;
        self.undo.push(next.clone());
        self.restoring = true;
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn current(&self) -> Option<&Rope> {
        self.undo.last()
    }

    fn top_equals(&self, content: &Rope) -> bool {
        match self.undo.last() {
            Some(top) => {
                top.len() == content.len()
                    && top.slice_to_cow(0..top.len()) == content.slice_to_cow(0..content.len())
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for History {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("undo_depth", &self.undo.len())
            .field("redo_depth", &self.redo.len())
            .field("restoring", &self.restoring)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rope(text: &str) -> Rope {
        Rope::from(text)
    }

    #[test]
    fn test_new_history_cannot_undo() {
        let mut history = History::new("start");

        assert!(!history.can_undo());
        assert!(history.undo().is_none());
        assert_eq!(history.undo_depth(), 1);
    }

    #[test]
    fn test_identical_content_is_not_recorded() {
        let mut history = History::new("");

        assert!(history.record_if_changed(&rope("a")));
        assert!(!history.record_if_changed(&rope("a")));

        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn test_undo_then_redo_restores_latest() {
        let mut history = History::new("");
        for text in ["a", "ab", "abc"] {
            history.record_if_changed(&rope(text));
        }

        assert_eq!(history.undo().map(|r| r.to_string()), Some("ab".to_string()));
        history.record_if_changed(&rope("ab"));
        assert_eq!(history.undo().map(|r| r.to_string()), Some("a".to_string()));
        history.record_if_changed(&rope("a"));

        assert_eq!(history.redo().map(|r| r.to_string()), Some("ab".to_string()));
        history.record_if_changed(&rope("ab"));
        assert_eq!(history.redo().map(|r| r.to_string()), Some("abc".to_string()));
        history.record_if_changed(&rope("abc"));

        assert!(history.redo().is_none());
        assert_eq!(history.current().map(|r| r.to_string()), Some("abc".to_string()));
    }

    #[test]
    fn test_undo_observation_is_not_recorded() {
        let mut history = History::new("");
        history.record_if_changed(&rope("one"));
        history.record_if_changed(&rope("two"));
        let before = history.undo_depth();

        let restored = history.undo().unwrap();
        // The buffer reports the restored content back as a change
        assert!(!history.record_if_changed(&restored));

        assert_eq!(history.undo_depth(), before - 1);
        assert_eq!(history.redo_depth(), 1);
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut history = History::new("");
        history.record_if_changed(&rope("one"));
        history.record_if_changed(&rope("two"));
        let restored = history.undo().unwrap();
        history.record_if_changed(&restored);

        history.record_if_changed(&rope("one!"));

        assert!(!history.can_redo());
        assert_eq!(history.undo_depth(), 3);
    }

    #[test]
    fn test_undo_stops_at_bottom_entry() {
        let mut history = History::new("base");
        history.record_if_changed(&rope("edit"));

        assert!(history.undo().is_some());
        history.record_if_changed(&rope("base"));
        assert!(history.undo().is_none());

        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.current().map(|r| r.to_string()), Some("base".to_string()));
    }

    #[test]
    fn test_reset_discards_both_stacks() {
        let mut history = History::new("");
        history.record_if_changed(&rope("x"));
        history.record_if_changed(&rope("y"));
        history.undo();

        history.reset("fresh");

        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.redo_depth(), 0);
        assert!(history.record_if_changed(&rope("fresh!")));
    }
}
