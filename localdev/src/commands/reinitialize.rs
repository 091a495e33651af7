use localdev_internal::command::{Command, Response};
use localdev_internal::dom::Dom;
use localdev_internal::timers::Timers;
use localdev_internal::{InitOutcome, Redirector};

/// The `reinitialize` command.
pub(crate) struct Reinitialize<D, T> {
    redirector: Redirector<D, T>,
}

impl<D, T> Reinitialize<D, T> {
    pub(crate) fn new(redirector: Redirector<D, T>) -> Self {
        Reinitialize { redirector }
    }
}

impl<D: Dom, T: Timers> Command for Reinitialize<D, T> {
    fn name(&self) -> &'static str {
        "reinitialize"
    }

    fn short_description(&self) -> &'static str {
        "Runs initialization again, regardless of the current page."
    }

    fn full_description(&self) -> &'static str {
        "Runs initialization again, regardless of the current page.
Usage: reinitialize

Interception is installed only once.  Each run scans immediately and starts another watcher and poller."
    }

    fn execute(&self, _args: Vec<String>) -> Result<Response, Response> {
        let message = match self.redirector.reinitialize() {
            InitOutcome::Armed => "Initialization complete",
            InitOutcome::Deferred => "Initialization complete; scanning after DOMContentLoaded",
            InitOutcome::NoMappings => "No URL mappings configured; nothing to do",
        };
        Ok(message.into())
    }
}
