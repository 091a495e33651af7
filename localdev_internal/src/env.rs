use crate::config::Config;
use crate::dom::Dom;
use crate::log::{self, Level};
use crate::timers::Timers;
use std::cell::{Ref, RefCell};
use std::rc::Rc;

/// The page environment and the configuration every component reads.
///
/// Components hold it behind `Rc`; callbacks handed to the page hold it behind `Weak`,
/// so a dropped [`Redirector`](crate::Redirector) stops rewriting instead of leaking.
pub struct Env<D, T> {
    pub dom: D,
    pub timers: T,
    config: RefCell<Config>,
}

impl<D: Dom, T: Timers> Env<D, T> {
    pub fn new(dom: D, timers: T, config: Config) -> Rc<Self> {
        Rc::new(Env {
            dom,
            timers,
            config: RefCell::new(config),
        })
    }

    /// Borrows the configuration.  Release it before calling into the page.
    pub fn config(&self) -> Ref<'_, Config> {
        self.config.borrow()
    }

    pub(crate) fn update_config<R>(&self, f: impl FnOnce(&mut Config) -> R) -> R {
        f(&mut self.config.borrow_mut())
    }

    /// Runs the matcher against the current table.
    pub fn resolve(&self, url: &str) -> Option<String> {
        self.config.borrow().url_mappings.resolve(url)
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    fn log(&self, level: Level, message: &str) {
        let enabled = self.config.borrow().enable_debug_log;
        log::emit(enabled, level, message);
    }
}
