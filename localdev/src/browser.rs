// SPDX-License-Identifier: MIT OR Apache-2.0
//! The `web-sys` binding.
//!
//! [`BrowserDom`] and [`BrowserTimers`] implement the pipeline's environment traits on
//! the real page.  [`begin_browser`] is the script entry point: it builds both, checks the
//! configured host patterns, starts the helper and publishes the console object
//! `window.adoExtensionDevHelper`.

mod dom;
mod exports;
mod timers;

pub use dom::BrowserDom;
pub use timers::BrowserTimers;

use localdev_internal::config::Config;
use localdev_internal::dom::Dom;
use localdev_internal::error::ConfigError;
use localdev_internal::log::{self, Level};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// Name of the console object.
pub const GLOBAL_NAME: &str = "adoExtensionDevHelper";

#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("JavaScript error: {0}")]
    Js(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<JsValue> for BindingError {
    fn from(value: JsValue) -> Self {
        BindingError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

/// Starts redirecting on the current page.
///
/// `config_json` is a [`Config`] in JSON form; `None` starts with an empty table that is
/// filled from the console.  Returns `Ok(false)` when the page's host is not in
/// `hostPatterns`.
pub fn begin_browser(config_json: Option<&str>) -> Result<bool, BindingError> {
    let config = match config_json {
        Some(text) => Config::from_json(text)?,
        None => Config::default(),
    };
    let window = web_sys::window().ok_or(BindingError::NoWindow)?;
    let document = window.document().ok_or(BindingError::NoDocument)?;
    let dom = BrowserDom::new(window.clone(), document);

    if !config.host_allowed(&dom.location()) {
        log::emit(
            config.enable_debug_log,
            Level::Info,
            "Host is not in hostPatterns; staying inactive",
        );
        return Ok(false);
    }

    let helper = Rc::new(crate::begin(dom, BrowserTimers::new(window.clone()), config));
    exports::publish(&window, helper)?;
    Ok(true)
}

/// JavaScript entry point.  Throws when the binding cannot start.
#[wasm_bindgen(js_name = startLocalDev)]
pub fn start_local_dev(config_json: Option<String>) -> Result<bool, JsValue> {
    begin_browser(config_json.as_deref()).map_err(|e| {
        log::emit(true, Level::Error, &format!("Failed to start: {e}"));
        JsValue::from_str(&e.to_string())
    })
}
