use crate::dom::Dom;
use crate::env::Env;
use crate::scanner::Scanner;
use crate::timers::Timers;
use std::rc::Rc;

/// Safety-net scan on a fixed period.
///
/// Covers source changes that produce no `src` attribute record and anything that
/// happened before the watcher was attached.  Runs for the life of the page.
pub struct Poller<D, T> {
    env: Rc<Env<D, T>>,
}

impl<D: Dom, T: Timers> Poller<D, T> {
    pub fn new(env: Rc<Env<D, T>>) -> Self {
        Poller { env }
    }

    pub fn start(&self) {
        let period = self.env.config().check_interval;
        let env = Rc::downgrade(&self.env);
        self.env.timers.set_interval(
            period,
            Box::new(move || {
                if let Some(env) = env.upgrade() {
                    Scanner::new(env).scan();
                }
            }),
        );
    }
}
