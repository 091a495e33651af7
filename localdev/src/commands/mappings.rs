use localdev_internal::Redirector;
use localdev_internal::command::{Command, Response};
use localdev_internal::dom::Dom;
use localdev_internal::timers::Timers;

/// The `add_mapping` command.
pub(crate) struct AddMapping<D, T> {
    redirector: Redirector<D, T>,
}

impl<D, T> AddMapping<D, T> {
    pub(crate) fn new(redirector: Redirector<D, T>) -> Self {
        AddMapping { redirector }
    }
}

impl<D: Dom, T: Timers> Command for AddMapping<D, T> {
    fn name(&self) -> &'static str {
        "add_mapping"
    }

    fn short_description(&self) -> &'static str {
        "Adds or replaces a production to local URL mapping."
    }

    fn full_description(&self) -> &'static str {
        "Adds or replaces a production to local URL mapping.
Usage: add_mapping PRODUCTION LOCAL

PRODUCTION is a URL prefix; any iframe source starting with it is rewritten to LOCAL followed by the rest of
the source.  Replacing an existing PRODUCTION keeps its position in the table.

Iframes that are already loaded are picked up by the next scan.  If the table was empty when the helper
started, run `reinitialize` afterwards."
    }

    fn execute(&self, args: Vec<String>) -> Result<Response, Response> {
        let [production, local] = args.as_slice() else {
            return Err(Response::usage(self.name(), "PRODUCTION LOCAL"));
        };
        match self.redirector.add_mapping(production, local) {
            Ok(()) => Ok(format!("Added new URL mapping: {production} -> {local}").into()),
            Err(e) => Err(e.to_string().into()),
        }
    }
}

/// The `remove_mapping` command.
pub(crate) struct RemoveMapping<D, T> {
    redirector: Redirector<D, T>,
}

impl<D, T> RemoveMapping<D, T> {
    pub(crate) fn new(redirector: Redirector<D, T>) -> Self {
        RemoveMapping { redirector }
    }
}

impl<D: Dom, T: Timers> Command for RemoveMapping<D, T> {
    fn name(&self) -> &'static str {
        "remove_mapping"
    }

    fn short_description(&self) -> &'static str {
        "Removes a production URL mapping."
    }

    fn full_description(&self) -> &'static str {
        "Removes a production URL mapping.
Usage: remove_mapping PRODUCTION

Iframes already rewritten keep their local URL.  Removing a mapping that does not exist is not an error."
    }

    fn execute(&self, args: Vec<String>) -> Result<Response, Response> {
        let [production] = args.as_slice() else {
            return Err(Response::usage(self.name(), "PRODUCTION"));
        };
        if self.redirector.remove_mapping(production) {
            Ok(format!("Removed URL mapping: {production}").into())
        } else {
            Ok(format!("No mapping for {production}").into())
        }
    }
}
