use super::Registry;
use localdev_internal::command::{Command, Response};
use serde::{Deserialize, Serialize};
use std::rc::Weak;

/// One row of the `list` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub name: String,
    pub short_description: String,
}

/// The `list` command.
///
/// Returns a list of all commands registered with the helper.
pub(crate) struct List {
    registry: Weak<Registry>,
}

impl List {
    pub(crate) fn new(registry: Weak<Registry>) -> Self {
        List { registry }
    }
}

impl Command for List {
    fn name(&self) -> &'static str {
        "list"
    }
    fn short_description(&self) -> &'static str {
        "List the currently available commands.  Use this command to discover what the helper can do on this page."
    }

    fn full_description(&self) -> &'static str {
        "List all available commands.

Built-in commands manage the URL mapping table and the redirector.  Commands registered by the page with
`Helper::add_command` appear here too.
        "
    }
    fn execute(&self, _args: Vec<String>) -> Result<Response, Response> {
        let Some(registry) = self.registry.upgrade() else {
            return Err("The command registry is gone".into());
        };
        let mut items = Vec::new();

        for command in registry.borrow().iter() {
            let item = ListItem {
                name: command.name().to_string(),
                short_description: command.short_description().to_string(),
            };
            items.push(item);
        }
        Response::from_serialize(&items)
    }
}
