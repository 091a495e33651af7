//! The guarded `src` setter.
//!
//! Every way an iframe's source can be assigned goes through [`Interceptor`]: the
//! attribute form (`setAttribute("src", ..)`), the property form (`frame.src = ..`), and
//! the [`Scanner`](crate::scanner::Scanner)'s own rewrites.  A mapped value is replaced
//! by its local URL before the page sees it, and the iframe is marked so that a developer
//! can tell at a glance that local content is loaded.
//!
//! Rust callers use the methods directly.  Page code reaches the same logic once
//! [`Interceptor::install`] has handed the interceptor to the environment as its
//! [`SrcHook`].

use crate::dom::{Dom, MARKER, SRC, SrcHook};
use crate::env::Env;
use crate::timers::Timers;
use std::cell::Cell;
use std::rc::Rc;

/// Inline border applied to rewritten iframes.
pub const BORDER: &str = "2px solid #0078d4";

/// Prefix applied to a rewritten iframe's title.
pub const TITLE_PREFIX: &str = "Local Development - ";

/// Title used when the iframe had none.
pub const DEFAULT_TITLE: &str = "Extension iframe";

/// The path a `src` assignment arrived by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Via {
    Attribute,
    Property,
}

impl Via {
    fn label(self) -> &'static str {
        match self {
            Via::Attribute => "attribute",
            Via::Property => "property",
        }
    }
}

pub struct Interceptor<D, T> {
    env: Rc<Env<D, T>>,
    installed: Rc<Cell<bool>>,
}

impl<D, T> Clone for Interceptor<D, T> {
    fn clone(&self) -> Self {
        Interceptor {
            env: Rc::clone(&self.env),
            installed: Rc::clone(&self.installed),
        }
    }
}

impl<D: Dom, T: Timers> Interceptor<D, T> {
    pub fn new(env: Rc<Env<D, T>>) -> Self {
        Interceptor {
            env,
            installed: Rc::new(Cell::new(false)),
        }
    }

    /// Hands this interceptor to the environment.
    ///
    /// Returns `true` only on the call that installed it; later calls leave the existing
    /// installation alone.
    pub fn install(&self) -> bool {
        if self.installed.get() {
            return false;
        }
        let hook: Rc<dyn SrcHook<D::Frame>> = Rc::new(self.clone());
        let ok = self.env.dom.install_interception(hook);
        if ok {
            self.installed.set(true);
        } else {
            self.env.error("Failed to install iframe src interception");
        }
        ok
    }

    pub fn is_installed(&self) -> bool {
        self.installed.get()
    }

    /// `setAttribute`; names other than `src` pass through untouched.
    pub fn set_attribute(&self, frame: &D::Frame, name: &str, value: &str) {
        if name.eq_ignore_ascii_case(SRC) {
            assign(&self.env, frame, value, Via::Attribute);
        } else {
            self.env.dom.write_attribute(frame, name, value);
        }
    }

    /// Property assignment.  Returns the value that took effect.
    pub fn set_src(&self, frame: &D::Frame, value: &str) -> String {
        assign(&self.env, frame, value, Via::Property)
    }

    /// Reads back the effective source, `""` when unset.
    pub fn src(&self, frame: &D::Frame) -> String {
        read(&self.env, frame)
    }
}

impl<D: Dom, T: Timers> SrcHook<D::Frame> for Interceptor<D, T> {
    fn set_attribute(&self, frame: &D::Frame, name: &str, value: &str) {
        Interceptor::set_attribute(self, frame, name, value);
    }

    fn set_src(&self, frame: &D::Frame, value: &str) {
        Interceptor::set_src(self, frame, value);
    }

    fn src(&self, frame: &D::Frame) -> String {
        Interceptor::src(self, frame)
    }
}

fn assign<D: Dom, T: Timers>(env: &Env<D, T>, frame: &D::Frame, value: &str, via: Via) -> String {
    // resolved once; the local URL is never fed back into the table
    match env.resolve(value) {
        Some(local) => {
            env.info(&format!(
                "Intercepting iframe src {} ({value}), using local URL ({local})",
                via.label()
            ));
            apply(env, frame, &local);
            local
        }
        None => {
            env.dom.write_attribute(frame, SRC, value);
            value.to_string()
        }
    }
}

/// Writes `local` and marks the iframe as rewritten.
pub(crate) fn apply<D: Dom, T: Timers>(env: &Env<D, T>, frame: &D::Frame, local: &str) {
    let first_time = env.dom.attribute(frame, MARKER).is_none();
    env.dom.write_attribute(frame, SRC, local);
    env.dom.write_attribute(frame, MARKER, local);
    env.dom.set_border(frame, BORDER);

    let title = env.dom.title(frame);
    if first_time && !title.starts_with(TITLE_PREFIX) {
        let base = if title.is_empty() { DEFAULT_TITLE } else { title.as_str() };
        env.dom.set_title(frame, &format!("{TITLE_PREFIX}{base}"));
    }
}

pub(crate) fn read<D: Dom, T: Timers>(env: &Env<D, T>, frame: &D::Frame) -> String {
    env.dom.attribute(frame, SRC).unwrap_or_default()
}

/// Whether the iframe still shows the URL this system last wrote into it.
pub(crate) fn is_rewritten<D: Dom, T: Timers>(
    env: &Env<D, T>,
    frame: &D::Frame,
    current: &str,
) -> bool {
    env.dom.attribute(frame, MARKER).as_deref() == Some(current)
}
