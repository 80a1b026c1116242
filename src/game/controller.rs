//! Drives a [`Session`] from scheduled callbacks.
//!
//! The controller owns the pending resolve and countdown tasks. Restarting or
//! dropping it cancels them, and every callback also checks the session
//! generation it was scheduled for before touching anything.

use std::cell::{Cell, RefCell};
use std::ops::ControlFlow;
use std::rc::{Rc, Weak};
use std::time::Duration;

use rand::rngs::StdRng;

use crate::scores::{GameResult, ScoreStore};

use super::scheduler::{Scheduler, TaskId};
use super::session::{Phase, RevealOutcome, Session, SessionSnapshot};

pub const DEFAULT_REVEAL_DELAY_MS: u64 = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// How long both picked cards stay face up before they are judged.
    pub reveal_delay: Duration,
    pub tick_period: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            reveal_delay: Duration::from_millis(DEFAULT_REVEAL_DELAY_MS),
            tick_period: Duration::from_secs(1),
        }
    }
}

type Observer = Box<dyn Fn(&SessionSnapshot)>;

#[derive(Default)]
struct PendingTasks {
    resolve: Option<TaskId>,
    tick: Option<TaskId>,
}

struct Inner {
    session: RefCell<Session>,
    scheduler: Rc<dyn Scheduler>,
    store: Rc<dyn ScoreStore>,
    timing: Timing,
    rng: RefCell<StdRng>,
    tasks: RefCell<PendingTasks>,
    observer: RefCell<Option<Observer>>,
    recorded: Cell<bool>,
}

pub struct GameController {
    inner: Rc<Inner>,
}

impl GameController {
    pub fn new(
        session: Session,
        scheduler: Rc<dyn Scheduler>,
        store: Rc<dyn ScoreStore>,
        timing: Timing,
        rng: StdRng,
    ) -> Self {
        GameController {
            inner: Rc::new(Inner {
                session: RefCell::new(session),
                scheduler,
                store,
                timing,
                rng: RefCell::new(rng),
                tasks: RefCell::new(PendingTasks::default()),
                observer: RefCell::new(None),
                recorded: Cell::new(false),
            }),
        }
    }

    /// Registers the callback that receives a snapshot after every change.
    /// Must not be called from inside the observer itself.
    pub fn set_observer(&self, observer: impl Fn(&SessionSnapshot) + 'static) {
        *self.inner.observer.borrow_mut() = Some(Box::new(observer));
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.session.borrow().snapshot()
    }

    pub fn with_session<T>(&self, f: impl FnOnce(&Session) -> T) -> T {
        f(&self.inner.session.borrow())
    }

    /// Starts the countdown.
    pub fn start(&self) {
        let already_running = self.inner.tasks.borrow().tick.is_some();
        if !already_running && !self.inner.session.borrow().phase().is_finished() {
            Inner::schedule_tick(&self.inner);
        }
        self.inner.notify();
    }

    pub fn reveal(&self, index: usize) -> RevealOutcome {
        let (outcome, generation) = {
            let mut session = self.inner.session.borrow_mut();
            (session.reveal(index), session.generation())
        };
        match outcome {
            RevealOutcome::Ignored(reason) => {
                tracing::trace!(index, ?reason, "reveal ignored");
                return outcome;
            }
            RevealOutcome::First => {}
            RevealOutcome::Second => Inner::schedule_resolve(&self.inner, generation),
        }
        self.inner.notify();
        outcome
    }

    /// Deals a fresh board and restarts the countdown.
    pub fn restart(&self) {
        self.inner.cancel_pending();
        {
            let mut rng = self.inner.rng.borrow_mut();
            self.inner.session.borrow_mut().restart(&mut *rng);
        }
        self.inner.recorded.set(false);
        tracing::debug!(generation = self.inner.session.borrow().generation(), "session restarted");
        Inner::schedule_tick(&self.inner);
        self.inner.notify();
    }

    /// Cancels every pending callback. The session is left as it is.
    pub fn teardown(&self) {
        self.inner.cancel_pending();
    }
}

impl Drop for GameController {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl Inner {
    fn schedule_tick(this: &Rc<Self>) {
        let weak: Weak<Inner> = Rc::downgrade(this);
        let id = this.scheduler.every(
            this.timing.tick_period,
            Box::new(move || match weak.upgrade() {
                Some(inner) => inner.on_tick(),
                None => ControlFlow::Break(()),
            }),
        );
        if let Some(old) = this.tasks.borrow_mut().tick.replace(id) {
            this.scheduler.cancel(old);
        }
    }

    fn schedule_resolve(this: &Rc<Self>, generation: u64) {
        let weak: Weak<Inner> = Rc::downgrade(this);
        let id = this.scheduler.once(
            this.timing.reveal_delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.on_resolve(generation);
                }
            }),
        );
        if let Some(old) = this.tasks.borrow_mut().resolve.replace(id) {
            this.scheduler.cancel(old);
        }
    }

    fn on_tick(&self) -> ControlFlow<()> {
        let phase = self.session.borrow_mut().tick();
        let flow = if phase.is_finished() {
            // The scheduler drops this task once it breaks.
            self.tasks.borrow_mut().tick = None;
            if phase == Phase::Expired {
                self.finish();
            }
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        };
        self.notify();
        flow
    }

    fn on_resolve(&self, generation: u64) {
        self.tasks.borrow_mut().resolve = None;
        let (matched, phase) = {
            let mut session = self.session.borrow_mut();
            if session.generation() != generation {
                tracing::debug!(generation, "dropping resolve for a replaced board");
                return;
            }
            (session.resolve(), session.phase())
        };
        let Some(matched) = matched else {
            return;
        };
        tracing::trace!(matched, "resolved pair");
        if phase == Phase::Won {
            self.finish();
        }
        self.notify();
    }

    fn finish(&self) {
        self.cancel_pending();
        if self.recorded.replace(true) {
            return;
        }
        let result = {
            let session = self.session.borrow();
            GameResult {
                player_name: session.player_name().to_string(),
                score: session.score(),
                won: session.phase() == Phase::Won,
            }
        };
        tracing::info!(
            player = %result.player_name,
            score = result.score,
            won = result.won,
            "game over"
        );
        self.store.record_game(&result);
    }

    fn cancel_pending(&self) {
        let (resolve, tick) = {
            let mut tasks = self.tasks.borrow_mut();
            (tasks.resolve.take(), tasks.tick.take())
        };
        for id in [resolve, tick].into_iter().flatten() {
            self.scheduler.cancel(id);
        }
    }

    fn notify(&self) {
        let snapshot = self.session.borrow().snapshot();
        if let Some(observer) = self.observer.borrow().as_ref() {
            observer(&snapshot);
        }
    }
}
