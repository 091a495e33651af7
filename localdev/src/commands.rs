// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::command::{Command, Response};
use localdev_internal::Redirector;
use localdev_internal::dom::Dom;
use localdev_internal::timers::Timers;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

mod config;
mod help;
mod list;
mod mappings;
mod reinitialize;
mod scan;

/// One helper's registry of available commands.
///
/// Populated by `register_commands` and `Helper::add_command`.
pub(crate) type Registry = RefCell<Vec<Rc<dyn Command>>>;

pub(crate) type CommandList = Rc<Registry>;

/// Registers the built-in commands.
///
/// This is called automatically by `Helper::new`.
pub(crate) fn register_commands<D: Dom, T: Timers>(redirector: &Redirector<D, T>) -> CommandList {
    let list: CommandList = Rc::new(RefCell::new(Vec::new()));
    let registry = Rc::downgrade(&list);
    let builtins: Vec<Rc<dyn Command>> = vec![
        Rc::new(help::Help::new(Weak::clone(&registry))),
        Rc::new(list::List::new(registry)),
        Rc::new(mappings::AddMapping::new(redirector.clone())),
        Rc::new(mappings::RemoveMapping::new(redirector.clone())),
        Rc::new(reinitialize::Reinitialize::new(redirector.clone())),
        Rc::new(config::ShowConfig::new(redirector.clone())),
        Rc::new(scan::Scan::new(redirector.clone())),
    ];
    list.borrow_mut().extend(builtins);
    #[cfg(feature = "logwise")]
    list.borrow_mut().push(Rc::new(crate::logwise::LogwiseCapture));
    list
}

/// Finds the most recently registered command called `name`.
pub(crate) fn find(list: &Registry, name: &str) -> Option<Rc<dyn Command>> {
    list.borrow().iter().rev().find(|c| c.name() == name).cloned()
}

pub(crate) fn dispatch(
    list: &CommandList,
    name: &str,
    args: Vec<String>,
) -> Result<Response, Response> {
    // the registry borrow is released before executing, so commands may register others
    match find(list, name) {
        Some(command) => command.execute(args),
        None => Err(format!("No such command: {name}. Try `list`.").into()),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::sim::Harness;
    use std::time::Duration;

    const PR: &str = "https://dev.azure.com/o/p/_git/r/pullrequest/1";
    const PROD: &str = "https://ext.azurestaticapps.net/";

    fn args(a: &[&str]) -> Vec<String> {
        a.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unknown_command_is_an_error() {
        let page = Harness::new(PR);
        let helper = crate::begin(page.dom.clone(), page.timers.clone(), Config::default());
        let err = helper.run_command("nope", vec![]).unwrap_err();
        assert!(err.to_string().contains("No such command: nope"));
    }

    #[test]
    fn list_reports_builtins_with_descriptions() {
        let page = Harness::new(PR);
        let helper = crate::begin(page.dom.clone(), page.timers.clone(), Config::default());
        let listed = helper.run_command("list", vec![]).unwrap().into_string();
        let builtins = [
            "help",
            "list",
            "add_mapping",
            "remove_mapping",
            "reinitialize",
            "config",
            "scan",
        ];
        for name in builtins {
            assert!(listed.contains(&format!("\"{name}\"")), "{name} missing from {listed}");
        }
        let help = helper.run_command("help", args(&["add_mapping"])).unwrap().into_string();
        assert!(help.contains("Usage: add_mapping PRODUCTION LOCAL"));
        assert!(helper.run_command("help", vec![]).is_err());
    }

    #[test]
    fn add_mapping_then_scan_rewrites_loaded_frames() {
        let page = Harness::new(PR);
        let frame = page.dom.insert_frame(&[("src", "https://ext.azurestaticapps.net/app")]);
        let helper = crate::begin(page.dom.clone(), page.timers.clone(), Config::default());
        page.advance(Duration::from_millis(10));
        assert_eq!(page.dom.src_of(frame).as_deref(), Some("https://ext.azurestaticapps.net/app"));

        helper.run_command("add_mapping", args(&[PROD, "http://localhost:3000/"])).unwrap();
        assert!(helper.run_command("add_mapping", args(&[PROD])).is_err());
        // the empty table never armed anything; re-initializing does
        helper.run_command("reinitialize", vec![]).unwrap();
        assert_eq!(page.dom.src_of(frame).as_deref(), Some("http://localhost:3000/app"));

        let config = helper.run_command("config", vec![]).unwrap().into_string();
        assert!(config.contains(
            "\"urlMappings\":{\"https://ext.azurestaticapps.net/\":\"http://localhost:3000/\"}"
        ));
    }

    #[test]
    fn remove_mapping_stops_future_rewrites_only() {
        let page = Harness::new(PR);
        let first = page.dom.insert_frame(&[("src", "https://ext.azurestaticapps.net/a")]);
        let mut config = Config::default();
        config.url_mappings.insert(PROD, "http://localhost:3000/");
        let helper = crate::begin(page.dom.clone(), page.timers.clone(), config);

        helper.run_command("remove_mapping", args(&[PROD])).unwrap();
        helper.run_command("remove_mapping", args(&[PROD])).unwrap();
        let second = page.dom.insert_frame(&[("src", "https://ext.azurestaticapps.net/b")]);
        page.advance(Duration::from_millis(2500));

        assert_eq!(page.dom.src_of(first).as_deref(), Some("http://localhost:3000/a"));
        assert_eq!(page.dom.src_of(second).as_deref(), Some("https://ext.azurestaticapps.net/b"));
        let scanned = helper.run_command("scan", vec![]).unwrap().into_string();
        assert_eq!(scanned, "Rewrote 0 iframe(s)");
    }

    #[test]
    fn config_output_keeps_table_order() {
        let page = Harness::new(PR);
        let mut config = Config::default();
        config
            .url_mappings
            .insert("https://ext.azurestaticapps.net/v2/", "http://localhost:2/");
        config.url_mappings.insert(PROD, "http://localhost:1/");
        let helper = crate::begin(page.dom.clone(), page.timers.clone(), config);

        let shown = helper.run_command("config", vec![]).unwrap().into_string();
        let back = Config::from_json(&shown).unwrap();
        assert_eq!(
            back.url_mappings.resolve("https://ext.azurestaticapps.net/v2/page").as_deref(),
            Some("http://localhost:2/page")
        );
        let keys: Vec<&str> = back.url_mappings.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["https://ext.azurestaticapps.net/v2/", PROD]);
    }
}
