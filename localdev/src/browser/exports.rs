use super::{BindingError, BrowserDom, BrowserTimers, GLOBAL_NAME};
use crate::Helper;
use localdev_internal::InitOutcome;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::Window;
use web_sys::js_sys::{Array, Object, Reflect};

type BrowserHelper = Helper<BrowserDom, BrowserTimers>;

/// Installs `window.adoExtensionDevHelper`.
///
/// The object keeps `helper` alive for the rest of the page's life.
pub(super) fn publish(window: &Window, helper: Rc<BrowserHelper>) -> Result<(), BindingError> {
    let object = Object::new();

    let h = Rc::clone(&helper);
    let run: Box<dyn FnMut(String, JsValue) -> Result<JsValue, JsValue>> =
        Box::new(move |name: String, args: JsValue| {
            let args: Vec<String> = if Array::is_array(&args) {
                Array::from(&args).iter().filter_map(|v| v.as_string()).collect()
            } else {
                Vec::new()
            };
            match h.run_command(&name, args) {
                Ok(response) => Ok(JsValue::from_str(&response.to_string())),
                Err(response) => Err(JsValue::from_str(&response.to_string())),
            }
        });
    let run = Closure::wrap(run);

    let h = Rc::clone(&helper);
    let add_mapping: Box<dyn FnMut(String, String) -> Result<(), JsValue>> =
        Box::new(move |production: String, local: String| {
            h.redirector()
                .add_mapping(&production, &local)
                .map_err(|e| JsValue::from_str(&e.to_string()))
        });
    let add_mapping = Closure::wrap(add_mapping);

    let h = Rc::clone(&helper);
    let remove_mapping = Closure::wrap(Box::new(move |production: String| -> bool {
        h.redirector().remove_mapping(&production)
    }) as Box<dyn FnMut(String) -> bool>);

    let h = Rc::clone(&helper);
    let reinitialize = Closure::wrap(Box::new(move || -> String {
        match h.redirector().reinitialize() {
            InitOutcome::Armed => "armed",
            InitOutcome::Deferred => "deferred",
            InitOutcome::NoMappings => "noMappings",
        }
        .to_string()
    }) as Box<dyn FnMut() -> String>);

    let config = Closure::wrap(Box::new(move || -> Result<String, JsValue> {
        helper
            .redirector()
            .config()
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }) as Box<dyn FnMut() -> Result<String, JsValue>>);

    Reflect::set(&object, &"run".into(), run.as_ref())?;
    Reflect::set(&object, &"addMapping".into(), add_mapping.as_ref())?;
    Reflect::set(&object, &"removeMapping".into(), remove_mapping.as_ref())?;
    Reflect::set(&object, &"reinitialize".into(), reinitialize.as_ref())?;

    let descriptor = Object::new();
    Reflect::set(&descriptor, &"get".into(), config.as_ref())?;
    Reflect::set(&descriptor, &"enumerable".into(), &JsValue::TRUE)?;
    Reflect::define_property(&object, &"config".into(), &descriptor)?;

    Reflect::set(window, &GLOBAL_NAME.into(), &object)?;

    run.forget();
    add_mapping.forget();
    remove_mapping.forget();
    reinitialize.forget();
    config.forget();
    Ok(())
}
