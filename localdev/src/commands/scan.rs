use localdev_internal::Redirector;
use localdev_internal::command::{Command, Response};
use localdev_internal::dom::Dom;
use localdev_internal::timers::Timers;

/// The `scan` command.
pub(crate) struct Scan<D, T> {
    redirector: Redirector<D, T>,
}

impl<D, T> Scan<D, T> {
    pub(crate) fn new(redirector: Redirector<D, T>) -> Self {
        Scan { redirector }
    }
}

impl<D: Dom, T: Timers> Command for Scan<D, T> {
    fn name(&self) -> &'static str {
        "scan"
    }

    fn short_description(&self) -> &'static str {
        "Scans the page's extension iframes now."
    }

    fn full_description(&self) -> &'static str {
        "Scans the page's extension iframes now and rewrites any that match the table.
Usage: scan"
    }

    fn execute(&self, _args: Vec<String>) -> Result<Response, Response> {
        let replaced = self.redirector.scan();
        Ok(format!("Rewrote {replaced} iframe(s)").into())
    }
}
