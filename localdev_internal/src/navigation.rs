//! SPA route-change detection.
//!
//! Azure DevOps navigates client-side, so the script is never reloaded when the user
//! moves from, say, a repository view to a pull request.  Document-wide child-list
//! mutations serve as a proxy for "the route may have changed": each batch compares the
//! current href with the last one seen, and a change onto a target page schedules a
//! re-initialization once the new view has had time to render.

use crate::dom::Dom;
use crate::env::Env;
use crate::timers::Timers;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub struct NavigationMonitor<D, T> {
    env: Weak<Env<D, T>>,
    last_url: RefCell<String>,
    reinit: Rc<dyn Fn()>,
}

impl<D: Dom, T: Timers> NavigationMonitor<D, T> {
    /// Creates a monitor that starts from the current location.
    pub fn new(env: &Rc<Env<D, T>>, reinit: Rc<dyn Fn()>) -> Rc<Self> {
        Rc::new(NavigationMonitor {
            env: Rc::downgrade(env),
            last_url: RefCell::new(env.dom.location().href),
            reinit,
        })
    }

    /// Subscribes to document mutations.
    pub fn install(self: &Rc<Self>) -> bool {
        let Some(env) = self.env.upgrade() else {
            return false;
        };
        let monitor = Rc::clone(self);
        env.dom.observe_document(Box::new(move |_records| {
            monitor.check();
        }))
    }

    /// Compares the location against the last one seen.
    ///
    /// Returns `true` when a re-initialization was scheduled.  Each distinct transition
    /// is acted on at most once, however many mutation batches report it.
    pub fn check(&self) -> bool {
        let Some(env) = self.env.upgrade() else {
            return false;
        };
        let location = env.dom.location();
        if *self.last_url.borrow() == location.href {
            return false;
        }
        *self.last_url.borrow_mut() = location.href.clone();

        let (is_target, delay) = {
            let config = env.config();
            (config.target_pages.matches(&location), config.reinit_delay)
        };
        if !is_target {
            return false;
        }
        env.info("Navigated to target page, re-initializing...");
        let reinit = Rc::clone(&self.reinit);
        env.timers.set_timeout(delay, Box::new(move || reinit()));
        true
    }

    pub fn last_url(&self) -> String {
        self.last_url.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sim::{MemoryDom, VirtualTimers};
    use std::cell::Cell;
    use std::time::Duration;

    type SimMonitor = Rc<NavigationMonitor<MemoryDom, VirtualTimers>>;
    type SimEnv = Rc<Env<MemoryDom, VirtualTimers>>;

    fn monitor(dom: &MemoryDom, timers: &VirtualTimers) -> (SimMonitor, Rc<Cell<u32>>, SimEnv) {
        let env = Env::new(dom.clone(), timers.clone(), Config::default());
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let m = NavigationMonitor::new(&env, Rc::new(move || counter.set(counter.get() + 1)));
        (m, calls, env)
    }

    #[test]
    fn one_reinit_per_distinct_transition() {
        let dom = MemoryDom::new("https://dev.azure.com/o/p/_git/r");
        let timers = VirtualTimers::new();
        let (m, calls, _env) = monitor(&dom, &timers);

        assert!(!m.check());
        dom.set_location("https://dev.azure.com/o/p/_git/r/pullrequest/3");
        assert!(m.check());
        assert!(!m.check());
        assert!(!m.check());

        timers.advance(Duration::from_millis(999));
        assert_eq!(calls.get(), 0);
        timers.advance(Duration::from_millis(1));
        assert_eq!(calls.get(), 1);
        assert_eq!(m.last_url(), "https://dev.azure.com/o/p/_git/r/pullrequest/3");
    }

    #[test]
    fn non_target_transition_is_recorded_but_ignored() {
        let dom = MemoryDom::new("https://dev.azure.com/o/p/_git/r/pullrequest/3");
        let timers = VirtualTimers::new();
        let (m, calls, _env) = monitor(&dom, &timers);

        dom.set_location("https://dev.azure.com/o/p/_workitems/edit/1");
        assert!(!m.check());
        assert_eq!(m.last_url(), "https://dev.azure.com/o/p/_workitems/edit/1");

        // coming back is a new transition
        dom.set_location("https://dev.azure.com/o/p/_git/r/pullrequest/3");
        assert!(m.check());
        timers.advance(Duration::from_secs(2));
        assert_eq!(calls.get(), 1);
    }
}
