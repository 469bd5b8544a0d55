#![forbid(unsafe_code)]

//! Focus and tab-order simulation.
//!
//! A [`FakeDocument`] holds elements in document order. Sequential
//! navigation ([`tab`](FakeDocument::tab), [`shift_tab`](FakeDocument::shift_tab))
//! visits elements whose `tab_index` is non-negative, like a browser does.
//! Elements can carry a focus hook, which is how sentinel elements hand
//! control to a focus trap.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use veil_core::{Focusable, KeyEvent, TabDirection};

type FocusHook = Rc<dyn Fn()>;

#[derive(Default)]
struct DocState {
    elements: RefCell<Vec<Rc<FakeElement>>>,
    active: RefCell<Option<String>>,
    log: RefCell<Vec<String>>,
}

/// One focusable node.
pub struct FakeElement {
    name: String,
    tab_index: Cell<i32>,
    doc: Weak<DocState>,
    on_focus: RefCell<Option<FocusHook>>,
    focus_count: Cell<u32>,
}

impl fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeElement")
            .field("name", &self.name)
            .field("tab_index", &self.tab_index.get())
            .finish()
    }
}

impl FakeElement {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tab_index(&self) -> i32 {
        self.tab_index.get()
    }

    /// `-1` removes the element from sequential navigation.
    pub fn set_tab_index(&self, tab_index: i32) {
        self.tab_index.set(tab_index);
    }

    /// Run `hook` every time the element receives focus.
    pub fn on_focus(&self, hook: impl Fn() + 'static) {
        *self.on_focus.borrow_mut() = Some(Rc::new(hook));
    }

    /// How many times this element received focus.
    pub fn focus_count(&self) -> u32 {
        self.focus_count.get()
    }

    pub fn is_tabbable(&self) -> bool {
        self.tab_index.get() >= 0
    }
}

impl Focusable for FakeElement {
    fn focus(&self) {
        self.focus_count.set(self.focus_count.get() + 1);
        if let Some(doc) = self.doc.upgrade() {
            *doc.active.borrow_mut() = Some(self.name.clone());
            doc.log.borrow_mut().push(self.name.clone());
        }
        let hook = self.on_focus.borrow().clone();
        if let Some(hook) = hook {
            hook();
        }
    }
}

/// Elements in document order plus the active element.
#[derive(Clone, Default)]
pub struct FakeDocument {
    state: Rc<DocState>,
}

impl fmt::Debug for FakeDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeDocument")
            .field("elements", &self.names())
            .field("active", &self.active())
            .finish()
    }
}

impl FakeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tabbable element.
    pub fn element(&self, name: &str) -> Rc<FakeElement> {
        let element = Rc::new(FakeElement {
            name: name.to_owned(),
            tab_index: Cell::new(0),
            doc: Rc::downgrade(&self.state),
            on_focus: RefCell::new(None),
            focus_count: Cell::new(0),
        });
        self.state.elements.borrow_mut().push(Rc::clone(&element));
        element
    }

    /// Look up an element by name.
    pub fn get(&self, name: &str) -> Option<Rc<FakeElement>> {
        self.state
            .elements
            .borrow()
            .iter()
            .find(|e| e.name == name)
            .cloned()
    }

    /// Element names in document order.
    pub fn names(&self) -> Vec<String> {
        self.state
            .elements
            .borrow()
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    /// Name of the focused element.
    pub fn active(&self) -> Option<String> {
        self.state.active.borrow().clone()
    }

    /// Every element that received focus, in order.
    pub fn focus_log(&self) -> Vec<String> {
        self.state.log.borrow().clone()
    }

    pub fn clear_focus_log(&self) {
        self.state.log.borrow_mut().clear();
    }

    /// Press Tab.
    pub fn tab(&self) {
        self.navigate(TabDirection::Forward);
    }

    /// Press Shift+Tab.
    pub fn shift_tab(&self) {
        self.navigate(TabDirection::Backward);
    }

    /// Route a key press; Tab and Shift+Tab move focus. Returns whether the
    /// key was handled.
    pub fn press(&self, key: KeyEvent) -> bool {
        match key.tab_direction() {
            Some(direction) => {
                self.navigate(direction);
                true
            }
            None => false,
        }
    }

    /// Move focus to the next tabbable element in `direction`, wrapping at
    /// the ends of the document.
    pub fn navigate(&self, direction: TabDirection) {
        let target = {
            let elements = self.state.elements.borrow();
            if elements.is_empty() {
                return;
            }
            let len = elements.len();
            let active = self.state.active.borrow();
            let start = active
                .as_deref()
                .and_then(|name| elements.iter().position(|e| e.name == name));
            let candidates = (1..=len).map(|step| match (direction, start) {
                (TabDirection::Forward, Some(i)) => (i + step) % len,
                (TabDirection::Forward, None) => step - 1,
                (TabDirection::Backward, Some(i)) => (i + len - step % len) % len,
                (TabDirection::Backward, None) => len - step,
            });
            candidates
                .map(|i| Rc::clone(&elements[i]))
                .find(|e| e.is_tabbable())
        };
        if let Some(element) = target {
            element.focus();
        }
    }
}
