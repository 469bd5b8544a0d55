#![forbid(unsafe_code)]

//! In-memory browser window.
//!
//! [`FakeWindow`] keeps a history stack of URL fragments and a listener
//! table. Like a browser, navigation queues its `hashchange` event instead
//! of delivering it synchronously: call
//! [`dispatch_pending`](FakeWindow::dispatch_pending) to run the event loop.
//! Key events are delivered immediately.
//!
//! `replace_hash` rewrites the current entry and queues nothing, so
//! [`history_len`](FakeWindow::history_len) shows whether a navigation
//! pushed an entry.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

use ahash::AHashMap;
use veil_core::{
    EnvironmentError, KeyEvent, Listener, ListenerId, Window, WindowEvent, WindowEventKind,
};

struct History {
    entries: Vec<String>,
    index: usize,
}

impl History {
    fn current(&self) -> &str {
        self.entries.get(self.index).map_or("", String::as_str)
    }
}

/// Deterministic [`Window`] for tests.
pub struct FakeWindow {
    history: RefCell<History>,
    pending: RefCell<VecDeque<WindowEvent>>,
    listeners: RefCell<AHashMap<ListenerId, (WindowEventKind, Listener)>>,
    next_listener: Cell<u64>,
    pushes: Cell<u64>,
    replaces: Cell<u64>,
}

impl Default for FakeWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FakeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let history = self.history.borrow();
        f.debug_struct("FakeWindow")
            .field("entries", &history.entries)
            .field("index", &history.index)
            .field("pending", &self.pending.borrow().len())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

/// Normalize user-facing fragment spellings: `"x"` and `"#x"` become
/// `"#x"`; `""` and `"#"` become `""`.
pub fn normalize_fragment(raw: &str) -> String {
    let bare = raw.strip_prefix('#').unwrap_or(raw);
    if bare.is_empty() {
        String::new()
    } else {
        format!("#{bare}")
    }
}

impl FakeWindow {
    /// A window at a URL without fragment.
    pub fn new() -> Self {
        Self::with_hash("")
    }

    /// A window whose initial URL carries `fragment`.
    pub fn with_hash(fragment: &str) -> Self {
        Self {
            history: RefCell::new(History {
                entries: vec![normalize_fragment(fragment)],
                index: 0,
            }),
            pending: RefCell::new(VecDeque::new()),
            listeners: RefCell::new(AHashMap::new()),
            next_listener: Cell::new(0),
            pushes: Cell::new(0),
            replaces: Cell::new(0),
        }
    }

    /// Current fragment (same as `location_hash`, infallible).
    pub fn hash(&self) -> String {
        self.history.borrow().current().to_owned()
    }

    /// Simulate the user following an anchor link or editing the URL.
    pub fn set_hash_externally(&self, fragment: &str) {
        self.navigate(normalize_fragment(fragment));
    }

    /// Simulate the browser Back button. Returns `false` at the first entry.
    pub fn back(&self) -> bool {
        self.traverse(-1)
    }

    /// Simulate the browser Forward button. Returns `false` at the last entry.
    pub fn forward(&self) -> bool {
        self.traverse(1)
    }

    /// Deliver a key release to `KeyUp` listeners immediately.
    pub fn key_up(&self, key: KeyEvent) {
        self.dispatch(&WindowEvent::KeyUp(key));
    }

    /// Deliver queued events, including ones queued by listeners while
    /// dispatching. Returns the number delivered.
    pub fn dispatch_pending(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            self.dispatch(&event);
            delivered += 1;
        }
        delivered
    }

    /// Number of queued, undelivered events.
    pub fn pending_events(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: WindowEventKind) -> usize {
        self.listeners
            .borrow()
            .values()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    /// Number of history entries.
    pub fn history_len(&self) -> usize {
        self.history.borrow().entries.len()
    }

    /// Snapshot of the history entries.
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().entries.clone()
    }

    /// Position of the current entry.
    pub fn history_index(&self) -> usize {
        self.history.borrow().index
    }

    /// Number of `push_hash` calls made through the [`Window`] API.
    pub fn push_count(&self) -> u64 {
        self.pushes.get()
    }

    /// Number of `replace_hash` calls made through the [`Window`] API.
    pub fn replace_count(&self) -> u64 {
        self.replaces.get()
    }

    fn navigate(&self, fragment: String) {
        {
            let mut history = self.history.borrow_mut();
            if history.current() == fragment {
                return;
            }
            let keep = history.index + 1;
            history.entries.truncate(keep);
            history.entries.push(fragment.clone());
            history.index = keep;
        }
        self.queue_hash_change(fragment);
    }

    fn traverse(&self, step: isize) -> bool {
        let (before, after) = {
            let mut history = self.history.borrow_mut();
            let Some(index) = history.index.checked_add_signed(step) else {
                return false;
            };
            if index >= history.entries.len() {
                return false;
            }
            let before = history.current().to_owned();
            history.index = index;
            (before, history.current().to_owned())
        };
        if before != after {
            self.queue_hash_change(after);
        }
        true
    }

    fn queue_hash_change(&self, fragment: String) {
        self.pending
            .borrow_mut()
            .push_back(WindowEvent::HashChange { fragment });
    }

    fn dispatch(&self, event: &WindowEvent) {
        let kind = event.kind();
        let mut targets: Vec<(ListenerId, Listener)> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, (k, _))| *k == kind)
            .map(|(id, (_, listener))| (*id, listener.clone()))
            .collect();
        targets.sort_by_key(|(id, _)| *id);
        for (id, listener) in targets {
            // A listener removed by an earlier one in this dispatch is skipped.
            if self.listeners.borrow().contains_key(&id) {
                listener(event);
            }
        }
    }
}

impl Window for FakeWindow {
    fn location_hash(&self) -> Result<String, EnvironmentError> {
        Ok(self.hash())
    }

    fn push_hash(&self, fragment: &str) -> Result<(), EnvironmentError> {
        self.pushes.set(self.pushes.get() + 1);
        self.navigate(normalize_fragment(fragment));
        Ok(())
    }

    fn replace_hash(&self, fragment: Option<&str>) -> Result<(), EnvironmentError> {
        self.replaces.set(self.replaces.get() + 1);
        let mut history = self.history.borrow_mut();
        let index = history.index;
        if let Some(entry) = history.entries.get_mut(index) {
            *entry = fragment.map(normalize_fragment).unwrap_or_default();
        }
        Ok(())
    }

    fn add_listener(
        &self,
        kind: WindowEventKind,
        listener: Listener,
    ) -> Result<ListenerId, EnvironmentError> {
        let id = ListenerId::new(self.next_listener.get());
        self.next_listener.set(self.next_listener.get() + 1);
        self.listeners.borrow_mut().insert(id, (kind, listener));
        Ok(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().remove(&id);
    }
}
