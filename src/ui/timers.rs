//! [`Scheduler`] on top of the glib main loop.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::rc::Rc;
use std::time::Duration;

use gtk4::glib;

use memory_puzzle::game::{Scheduler, TaskId};

#[derive(Default)]
pub struct GlibScheduler {
    next_id: Cell<u64>,
    sources: Rc<RefCell<HashMap<TaskId, glib::SourceId>>>,
}

impl GlibScheduler {
    fn next_id(&self) -> TaskId {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        TaskId(id)
    }
}

impl Scheduler for GlibScheduler {
    fn once(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TaskId {
        let id = self.next_id();
        let sources = self.sources.clone();
        let source = glib::timeout_add_local_once(delay, move || {
            // glib drops the source itself after a one-shot fires.
            sources.borrow_mut().remove(&id);
            task();
        });
        self.sources.borrow_mut().insert(id, source);
        id
    }

    fn every(&self, period: Duration, mut task: Box<dyn FnMut() -> ControlFlow<()>>) -> TaskId {
        let id = self.next_id();
        let sources = self.sources.clone();
        let source = glib::timeout_add_local(period, move || match task() {
            ControlFlow::Continue(()) => glib::ControlFlow::Continue,
            ControlFlow::Break(()) => {
                sources.borrow_mut().remove(&id);
                glib::ControlFlow::Break
            }
        });
        self.sources.borrow_mut().insert(id, source);
        id
    }

    fn cancel(&self, id: TaskId) {
        let source = self.sources.borrow_mut().remove(&id);
        if let Some(source) = source {
            source.remove();
        }
    }
}
