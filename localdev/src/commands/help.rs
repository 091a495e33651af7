use super::{Registry, find};
use localdev_internal::command::{Command, Response};
use std::rc::Weak;

/// The `help` command.
///
/// Returns the full description of a requested command.
pub struct Help {
    registry: Weak<Registry>,
}

impl Help {
    pub(crate) fn new(registry: Weak<Registry>) -> Self {
        Help { registry }
    }
}

impl Command for Help {
    fn name(&self) -> &'static str {
        "help"
    }

    fn short_description(&self) -> &'static str {
        "Provides detailed help for a command.  Use this to learn more about an individual command."
    }

    fn full_description(&self) -> &'static str {
        "Provides detailed help for a command.
Usage: help COMMAND"
    }

    fn execute(&self, args: Vec<String>) -> Result<Response, Response> {
        let Some(name) = args.first() else {
            return Err(Response::usage(self.name(), "COMMAND"));
        };
        let Some(registry) = self.registry.upgrade() else {
            return Err("The command registry is gone".into());
        };
        match find(&registry, name) {
            Some(command) => Ok(command.full_description().into()),
            None => Err(format!("No such command: {}", name).into()),
        }
    }
}
