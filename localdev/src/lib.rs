//! localdev redirects production Azure DevOps extension iframes to a local development
//! server.
//!
//! Azure DevOps hosts extension UI in iframes that load from the extension's production
//! hosting (typically `*.azurestaticapps.net` or `*.azurewebsites.net`).  While
//! developing, you want those iframes to load from `http://localhost:3000/` instead,
//! inside the real Azure DevOps page, without redeploying.  localdev rewrites the iframe
//! sources as the page creates them.
//!
//! # Overview
//!
//! You supply a table of production URL prefixes and their local replacements.  Once
//! started on a target page, localdev:
//!
//! - intercepts every page-originated iframe `src` assignment, attribute and property
//!   form alike, and substitutes the local URL before the page sees it;
//! - sweeps iframes that already exist;
//! - watches the document for inserted iframes and changed sources, coalescing bursts;
//! - re-scans on an interval, for changes nothing else noticed;
//! - re-initializes after single-page-app navigation onto a target page.
//!
//! Rewritten iframes get a blue border and a `Local Development - ` title prefix.
//!
//! # Quick start
//!
//! In the browser, build for `wasm32-unknown-unknown` and call the exported
//! `startLocalDev(configJson)` from the page (for example from a userscript).  The
//! developer console then has `window.adoExtensionDevHelper`:
//!
//! ```text
//! adoExtensionDevHelper.addMapping("https://my-ext.azurestaticapps.net/", "http://localhost:3000/")
//! adoExtensionDevHelper.reinitialize()
//! adoExtensionDevHelper.run("list")
//! ```
//!
//! # Less-Quick Start
//!
//! ## Running against any environment
//!
//! The pipeline reaches the page only through the [`dom::Dom`] and [`timers::Timers`]
//! traits.  [`begin`] starts it against any implementation and returns the [`Helper`]
//! that owns it:
//!
//! ```rust
//! use localdev::config::Config;
//! use localdev::sim::Harness;
//!
//! let page = Harness::new("https://dev.azure.com/org/proj/_git/repo/pullrequest/3");
//! let frame = page.dom.insert_frame(&[("src", "https://my-ext.azurestaticapps.net/")]);
//!
//! let mut config = Config::default();
//! config.url_mappings.insert("https://my-ext.azurestaticapps.net/", "http://localhost:3000/");
//! let helper = localdev::begin(page.dom.clone(), page.timers.clone(), config);
//!
//! assert_eq!(page.dom.src_of(frame).as_deref(), Some("http://localhost:3000/"));
//! let listed = helper.run_command("list", vec![]).unwrap();
//! assert!(listed.to_string().contains("add_mapping"));
//! ```
//!
//! ## Implementing a Custom Command
//!
//! ```rust
//! use localdev::command::{Command, Response};
//! use localdev::config::Config;
//! use localdev::sim::Harness;
//!
//! struct HelloCommand;
//!
//! impl Command for HelloCommand {
//!     fn name(&self) -> &'static str {
//!         "hello"
//!     }
//!
//!     fn short_description(&self) -> &'static str {
//!         "Greets a user"
//!     }
//!
//!     fn full_description(&self) -> &'static str {
//!         "Greets a user. Usage: hello [name]"
//!     }
//!
//!     fn execute(&self, args: Vec<String>) -> Result<Response, Response> {
//!         let name = args.get(0).map(|s| s.as_str()).unwrap_or("World");
//!         Ok(format!("Hello, {}!", name).into())
//!     }
//! }
//!
//! let page = Harness::new("https://dev.azure.com/org");
//! let helper = localdev::begin(page.dom.clone(), page.timers.clone(), Config::default());
//! helper.add_command(HelloCommand);
//! assert_eq!(helper.run_command("hello", vec!["Ada".into()]).unwrap().to_string(), "Hello, Ada!");
//! ```
//!
//! # Feature Flags
//!
//! - `logwise` - Captures `logwise` log records in memory and adds the `logs` command.

#[cfg(feature = "logwise")]
mod logwise;

#[cfg(target_arch = "wasm32")]
pub mod browser;

mod commands;

use localdev_internal::command::{Command, Response};
use localdev_internal::config::Config;
use localdev_internal::dom::Dom;
use localdev_internal::timers::Timers;
use std::rc::Rc;

pub use localdev_internal::{InitOutcome, Redirector};
pub use localdev_internal::{config, dom, error, mapping, sim, target, timers};

/// Re-exports of types needed to implement custom commands.
pub mod command {
    pub use localdev_internal::command::{Command, Response};
}

/// A running redirector and its command registry.
pub struct Helper<D, T> {
    redirector: Redirector<D, T>,
    commands: commands::CommandList,
}

/// Starts the redirector and registers the built-in commands.
///
/// The page gate decides whether rewriting starts now; navigation onto a target page
/// starts it later either way.  Keep the returned [`Helper`] alive for as long as the
/// page should be redirected.
pub fn begin<D: Dom, T: Timers>(dom: D, timers: T, config: Config) -> Helper<D, T> {
    #[cfg(feature = "logwise")]
    {
        logwise::begin_log_capture();
    }
    let helper = Helper::new(Redirector::new(dom, timers, config));
    helper.redirector.start();
    helper
}

impl<D: Dom, T: Timers> Helper<D, T> {
    /// Wraps a redirector without starting it.
    pub fn new(redirector: Redirector<D, T>) -> Self {
        let commands = commands::register_commands(&redirector);
        Helper {
            redirector,
            commands,
        }
    }

    pub fn redirector(&self) -> &Redirector<D, T> {
        &self.redirector
    }

    /// Registers a custom command.  A later command with an existing name takes over
    /// that name.
    pub fn add_command<C: Command>(&self, command: C) {
        self.commands.borrow_mut().push(Rc::new(command));
    }

    /// Runs the command called `name`.
    pub fn run_command(&self, name: &str, args: Vec<String>) -> Result<Response, Response> {
        commands::dispatch(&self.commands, name, args)
    }
}
