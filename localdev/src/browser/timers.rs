use localdev_internal::timers::Timers;
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::Window;

/// `setTimeout`/`setInterval` on the page's window.
pub struct BrowserTimers {
    window: Window,
}

impl BrowserTimers {
    pub fn new(window: Window) -> Self {
        BrowserTimers { window }
    }
}

fn millis(d: Duration) -> i32 {
    i32::try_from(d.as_millis()).unwrap_or(i32::MAX)
}

impl Timers for BrowserTimers {
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) {
        let callback = Closure::once_into_js(move || callback());
        if let Err(e) = self.window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            millis(delay),
        ) {
            web_sys::console::error_1(&e);
        }
    }

    fn set_interval(&self, period: Duration, callback: Box<dyn FnMut()>) {
        let callback = Closure::wrap(callback);
        match self.window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            millis(period),
        ) {
            // intervals are never cleared
            Ok(_) => callback.forget(),
            Err(e) => web_sys::console::error_1(&e),
        }
    }
}
