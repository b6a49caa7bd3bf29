#![forbid(unsafe_code)]

//! In-process navigation history.
//!
//! Mirrors a browser session history: an initial entry with no state, then
//! one entry per [`push`](HistoryService::push). Moving the cursor
//! delivers the state of the entry moved to; pushing is silent.

use std::fmt;

use tracing::trace;

use crate::reactive::EventStream;

pub struct HistoryService<S> {
    /// `entries[0]` is the initial, stateless entry.
    entries: Vec<Option<S>>,
    cursor: usize,
    state_changes: EventStream<Option<S>>,
}

impl<S: Clone + 'static> HistoryService<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: vec![None],
            cursor: 0,
            state_changes: EventStream::new(),
        }
    }

    /// Add an entry after the current one, discarding any forward entries.
    pub fn push(&mut self, state: S) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(Some(state));
        self.cursor = self.entries.len() - 1;
        trace!(entries = self.entries.len(), "history push");
    }

    /// Step back one entry. Returns `false` at the initial entry.
    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.announce();
        true
    }

    /// Step forward one entry. Returns `false` at the newest entry.
    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        self.announce();
        true
    }

    /// State of the current entry.
    #[must_use]
    pub fn current(&self) -> Option<&S> {
        self.entries.get(self.cursor).and_then(Option::as_ref)
    }

    /// Number of entries, the initial one included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether only the initial entry exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 1
    }

    /// Navigation events, carrying the state of the entry navigated to.
    #[must_use]
    pub fn state_changes(&self) -> &EventStream<Option<S>> {
        &self.state_changes
    }

    fn announce(&self) {
        trace!(cursor = self.cursor, "history navigation");
        let state = self.entries.get(self.cursor).cloned().flatten();
        self.state_changes.emit(&state);
    }
}

impl<S: Clone + 'static> Default for HistoryService<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for HistoryService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryService")
            .field("entries", &self.entries.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Subscribe;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(history: &HistoryService<u8>) -> (Rc<RefCell<Vec<Option<u8>>>>, crate::reactive::Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let sub = history
            .state_changes()
            .subscribe(move |state: &Option<u8>| s.borrow_mut().push(*state));
        (seen, sub)
    }

    #[test]
    fn push_is_silent() {
        let mut history = HistoryService::new();
        let (seen, _sub) = recorder(&history);
        history.push(1);
        history.push(2);
        assert!(seen.borrow().is_empty());
        assert_eq!(history.current(), Some(&2));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn back_and_forward_deliver_entry_state() {
        let mut history = HistoryService::new();
        let (seen, _sub) = recorder(&history);
        history.push(1);
        history.push(2);

        assert!(history.back());
        assert!(history.back());
        assert!(!history.back());
        assert!(history.forward());
        assert_eq!(*seen.borrow(), vec![Some(1), None, Some(1)]);
    }

    #[test]
    fn push_discards_forward_entries() {
        let mut history = HistoryService::new();
        history.push(1);
        history.push(2);
        history.back();
        history.push(3);

        assert_eq!(history.len(), 3);
        assert!(!history.forward());
        assert_eq!(history.current(), Some(&3));
    }

    #[test]
    fn fresh_history_is_empty() {
        let history = HistoryService::<u8>::default();
        assert!(history.is_empty());
        assert_eq!(history.current(), None);
    }
}
