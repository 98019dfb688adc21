use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::render;

/// Detaches a listener when dropped.
#[must_use = "dropping a subscription detaches its listener"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

/// The overlay mount point.
pub trait ModalSurface {
    fn has_mount_point(&self) -> bool;
    fn render(&self, markup: &str);
    fn clear(&self);
    /// Registers a document-level Escape handler.
    fn listen_escape(&self, on_escape: Rc<dyn Fn()>) -> Subscription;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalClick {
    Backdrop,
    Dialog,
}

enum ModalState {
    Closed,
    Open {
        content: String,
        _escape: Subscription,
    },
}

/// Single exclusive dialog above the current view.
pub struct ModalController {
    surface: Rc<dyn ModalSurface>,
    state: RefCell<ModalState>,
    this: Weak<ModalController>,
}

impl ModalController {
    pub fn new(surface: Rc<dyn ModalSurface>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            surface,
            state: RefCell::new(ModalState::Closed),
            this: this.clone(),
        })
    }

    pub fn is_open(&self) -> bool {
        matches!(*self.state.borrow(), ModalState::Open { .. })
    }

    /// Inner content of the open dialog, if any.
    pub fn content(&self) -> Option<String> {
        match &*self.state.borrow() {
            ModalState::Open { content, .. } => Some(content.clone()),
            ModalState::Closed => None,
        }
    }

    /// Opens the dialog, replacing whatever is open. The previous Escape
    /// subscription is dropped before the new one is registered.
    #[tracing::instrument(skip_all)]
    pub fn open(&self, content: &str) {
        let previous = self.state.replace(ModalState::Closed);
        drop(previous);

        self.surface.render(&render::modal_frame(content));
        let this = self.this.clone();
        let escape = self.surface.listen_escape(Rc::new(move || {
            if let Some(modal) = this.upgrade() {
                debug!("escape pressed");
                modal.close();
            }
        }));
        *self.state.borrow_mut() = ModalState::Open {
            content: content.to_string(),
            _escape: escape,
        };
    }

    /// Closes the dialog; a no-op when already closed or when the mount
    /// point is gone.
    pub fn close(&self) {
        if !self.is_open() {
            return;
        }
        let previous = self.state.replace(ModalState::Closed);
        if self.surface.has_mount_point() {
            self.surface.clear();
        }
        drop(previous);
        debug!("modal closed");
    }

    pub fn click(&self, target: ModalClick) {
        match target {
            ModalClick::Backdrop => self.close(),
            ModalClick::Dialog => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    #[derive(Default)]
    struct Surface {
        markup: RefCell<Option<String>>,
        mutations: Cell<u32>,
        listeners: Rc<RefCell<Vec<(u32, Rc<dyn Fn()>)>>>,
        next_id: Cell<u32>,
    }

    impl Surface {
        fn press_escape(&self) {
            let handlers: Vec<Rc<dyn Fn()>> = self
                .listeners
                .borrow()
                .iter()
                .map(|(_, handler)| handler.clone())
                .collect();
            for handler in handlers {
                handler();
            }
        }
    }

    impl ModalSurface for Surface {
        fn has_mount_point(&self) -> bool {
            true
        }

        fn render(&self, markup: &str) {
            self.mutations.set(self.mutations.get() + 1);
            *self.markup.borrow_mut() = Some(markup.to_string());
        }

        fn clear(&self) {
            self.mutations.set(self.mutations.get() + 1);
            *self.markup.borrow_mut() = None;
        }

        fn listen_escape(&self, on_escape: Rc<dyn Fn()>) -> Subscription {
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            self.listeners.borrow_mut().push((id, on_escape));
            let listeners = Rc::clone(&self.listeners);
            Subscription::new(move || listeners.borrow_mut().retain(|(other, _)| *other != id))
        }
    }

    #[test]
    fn opening_twice_leaves_one_escape_listener() {
        let surface = Rc::new(Surface::default());
        let modal = ModalController::new(surface.clone());

        modal.open("<p>first</p>");
        modal.open("<p>second</p>");
        assert_eq!(surface.listeners.borrow().len(), 1);
        assert_eq!(modal.content().as_deref(), Some("<p>second</p>"));

        let before = surface.mutations.get();
        surface.press_escape();
        assert!(!modal.is_open());
        assert_eq!(surface.mutations.get(), before + 1);
        assert!(surface.listeners.borrow().is_empty());
    }

    #[test]
    fn close_when_closed_touches_nothing() {
        let surface = Rc::new(Surface::default());
        let modal = ModalController::new(surface.clone());
        modal.close();
        modal.close();
        assert_eq!(surface.mutations.get(), 0);
    }

    #[test]
    fn backdrop_closes_dialog_click_does_not() {
        let surface = Rc::new(Surface::default());
        let modal = ModalController::new(surface.clone());
        modal.open("<form></form>");

        modal.click(ModalClick::Dialog);
        assert!(modal.is_open());

        modal.click(ModalClick::Backdrop);
        assert!(!modal.is_open());
        assert!(surface.markup.borrow().is_none());
        assert!(surface.listeners.borrow().is_empty());
    }

    #[test]
    fn explicit_close_detaches_escape_listener() {
        let surface = Rc::new(Surface::default());
        let modal = ModalController::new(surface.clone());
        modal.open("<p>x</p>");
        modal.close();
        assert!(surface.listeners.borrow().is_empty());

        surface.press_escape();
        assert_eq!(surface.mutations.get(), 2);
    }
}
