//! In-memory page environment for tests and demos.
//!
//! [`MemoryDom`] is a small document of iframes with the two surfaces a real page has:
//! the *page* side (`page_*` methods, which go through interception once installed, and
//! `insert_*`/`replace_src_silently`, which model markup-level changes that bypass it)
//! and the [`Dom`](crate::dom::Dom) side the pipeline uses.  Mutation records queue up
//! and are only delivered by [`MemoryDom::flush`], as `MutationObserver` delivers them
//! after the current task.
//!
//! [`VirtualTimers`] runs `setTimeout`/`setInterval` callbacks against a clock that only
//! moves when told to.  [`Harness`] pairs the two into an event loop: every timer task is
//! followed by a mutation-record checkpoint.

mod dom;
mod timers;

pub use dom::{FrameId, MemoryDom};
pub use timers::VirtualTimers;

use crate::dom::ReadyState;
use std::time::Duration;

/// Checkpoints allowed before [`Harness::settle`] declares a rewrite loop.
const MAX_CHECKPOINTS: usize = 1_000;

/// A page and its clock.
#[derive(Clone)]
pub struct Harness {
    pub dom: MemoryDom,
    pub timers: VirtualTimers,
}

impl Harness {
    /// A fully loaded page at `href`.
    pub fn new(href: &str) -> Self {
        Harness {
            dom: MemoryDom::new(href),
            timers: VirtualTimers::new(),
        }
    }

    /// A page still parsing at `href`, with no body yet.
    pub fn loading(href: &str) -> Self {
        let dom = MemoryDom::new(href);
        dom.set_ready_state(ReadyState::Loading);
        dom.set_body_present(false);
        Harness {
            dom,
            timers: VirtualTimers::new(),
        }
    }

    /// Delivers mutation records until none are left.
    ///
    /// # Panics
    ///
    /// If records keep being produced, which means something rewrites in a loop.
    pub fn settle(&self) {
        for _ in 0..MAX_CHECKPOINTS {
            if self.dom.flush() == 0 {
                return;
            }
        }
        panic!("mutation records did not settle after {MAX_CHECKPOINTS} checkpoints");
    }

    /// Moves the clock forward, running due timers in order with a checkpoint after each.
    pub fn advance(&self, by: Duration) {
        self.settle();
        let target = self.timers.now() + by;
        while self.timers.run_next(target) {
            self.settle();
        }
        self.timers.set_now(target);
    }
}
