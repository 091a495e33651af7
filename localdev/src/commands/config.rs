use localdev_internal::Redirector;
use localdev_internal::command::{Command, Response};
use localdev_internal::dom::Dom;
use localdev_internal::timers::Timers;

/// The `config` command.
pub(crate) struct ShowConfig<D, T> {
    redirector: Redirector<D, T>,
}

impl<D, T> ShowConfig<D, T> {
    pub(crate) fn new(redirector: Redirector<D, T>) -> Self {
        ShowConfig { redirector }
    }
}

impl<D: Dom, T: Timers> Command for ShowConfig<D, T> {
    fn name(&self) -> &'static str {
        "config"
    }

    fn short_description(&self) -> &'static str {
        "Shows the current configuration as JSON."
    }

    fn full_description(&self) -> &'static str {
        "Shows the current configuration as JSON.
Usage: config

Durations are in milliseconds.  The output is accepted by `startLocalDev`."
    }

    fn execute(&self, _args: Vec<String>) -> Result<Response, Response> {
        Response::from_serialize(&self.redirector.config())
    }
}
