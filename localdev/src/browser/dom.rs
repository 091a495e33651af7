use super::BindingError;
use localdev_internal::dom::{
    AddedNode, Dom, FrameFilter, Location, Mutation, MutationCallback, ReadyState, SRC, SrcHook,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::js_sys::{Array, Function, Object, Reflect};
use web_sys::{
    Document, Element, HtmlElement, HtmlIFrameElement, MutationObserver, MutationObserverInit,
    MutationRecord, Node, Window,
};

/// The page's document.
pub struct BrowserDom {
    window: Window,
    document: Document,
    /// `Element.prototype.setAttribute` as it was before interception was installed.
    native_set_attribute: RefCell<Option<Function>>,
}

impl BrowserDom {
    pub fn new(window: Window, document: Document) -> Self {
        BrowserDom {
            window,
            document,
            native_set_attribute: RefCell::new(None),
        }
    }

    fn observe(
        &self,
        target: &Node,
        init: &MutationObserverInit,
        callback: MutationCallback,
    ) -> bool {
        let mut callback = callback;
        let handler = Closure::wrap(Box::new(move |records: Array, _observer: MutationObserver| {
            let batch: Vec<Mutation> = records
                .iter()
                .filter_map(|r| r.dyn_into::<MutationRecord>().ok())
                .filter_map(|r| convert(&r))
                .collect();
            callback(&batch);
        }) as Box<dyn FnMut(Array, MutationObserver)>);
        let observer = match MutationObserver::new(handler.as_ref().unchecked_ref()) {
            Ok(observer) => observer,
            Err(e) => {
                web_sys::console::error_1(&e);
                return false;
            }
        };
        match observer.observe_with_options(target, init) {
            Ok(()) => {
                // the observer lives as long as its target
                handler.forget();
                true
            }
            Err(e) => {
                web_sys::console::error_1(&e);
                false
            }
        }
    }

    fn patch_prototype(&self, hook: Rc<dyn SrcHook<Element>>) -> Result<(), BindingError> {
        let constructor = Reflect::get(&self.window, &"HTMLIFrameElement".into())?;
        let prototype: Object = Reflect::get(&constructor, &"prototype".into())?.dyn_into()?;
        let native: Function = Reflect::get(&prototype, &"setAttribute".into())?.dyn_into()?;
        *self.native_set_attribute.borrow_mut() = Some(native.clone());

        let set_hook = Rc::clone(&hook);
        let handler = Closure::wrap(Box::new(move |this: JsValue, name: String, value: String| {
            match this.dyn_into::<Element>() {
                Ok(frame) => set_hook.set_attribute(&frame, &name, &value),
                Err(this) => {
                    if let Err(e) = native.call2(&this, &name.into(), &value.into()) {
                        web_sys::console::error_1(&e);
                    }
                }
            }
        }) as Box<dyn FnMut(JsValue, String, String)>);
        let set_attribute = bind_this(
            "return function(name, value) { handler(this, String(name), String(value)); }",
            &handler,
        )?;
        Reflect::set(&prototype, &"setAttribute".into(), &set_attribute)?;

        let get_hook = Rc::clone(&hook);
        let getter = Closure::wrap(Box::new(move |this: JsValue| -> String {
            this.dyn_into::<Element>()
                .map(|frame| get_hook.src(&frame))
                .unwrap_or_default()
        }) as Box<dyn FnMut(JsValue) -> String>);
        let setter = Closure::wrap(Box::new(move |this: JsValue, value: String| {
            if let Ok(frame) = this.dyn_into::<Element>() {
                hook.set_src(&frame, &value);
            }
        }) as Box<dyn FnMut(JsValue, String)>);

        let descriptor = Object::new();
        Reflect::set(
            &descriptor,
            &"get".into(),
            &bind_this("return function() { return handler(this); }", &getter)?,
        )?;
        Reflect::set(
            &descriptor,
            &"set".into(),
            &bind_this("return function(value) { handler(this, String(value)); }", &setter)?,
        )?;
        Reflect::set(&descriptor, &"configurable".into(), &JsValue::TRUE)?;
        Reflect::set(&descriptor, &"enumerable".into(), &JsValue::TRUE)?;
        if !Reflect::define_property(&prototype, &SRC.into(), &descriptor)? {
            return Err(BindingError::Js(
                "HTMLIFrameElement.prototype.src is not configurable".into(),
            ));
        }

        // the patched prototype references these for the life of the page
        handler.forget();
        getter.forget();
        setter.forget();
        Ok(())
    }

    fn html(frame: &Element) -> Option<&HtmlElement> {
        frame.dyn_ref::<HtmlElement>()
    }
}

/// Wraps `handler` in a plain JS function that passes `this` as the first argument.
fn bind_this<T: ?Sized>(body: &str, handler: &Closure<T>) -> Result<JsValue, BindingError> {
    let factory = Function::new_with_args("handler", body);
    Ok(factory.call1(&JsValue::NULL, handler.as_ref())?)
}

fn convert(record: &MutationRecord) -> Option<Mutation> {
    match record.type_().as_str() {
        "childList" => {
            let nodes = record.added_nodes();
            let added = (0..nodes.length())
                .filter_map(|i| nodes.get(i))
                .map(|node| {
                    if node.is_instance_of::<HtmlIFrameElement>() {
                        AddedNode::Frame
                    } else if let Some(element) = node.dyn_ref::<Element>() {
                        AddedNode::Element {
                            contains_frame: matches!(element.query_selector("iframe"), Ok(Some(_))),
                        }
                    } else {
                        AddedNode::Other
                    }
                })
                .collect();
            Some(Mutation::ChildList { added })
        }
        "attributes" => Some(Mutation::Attribute {
            target_is_frame: record
                .target()
                .map(|t| t.is_instance_of::<HtmlIFrameElement>())
                .unwrap_or(false),
            name: record.attribute_name().unwrap_or_default(),
        }),
        _ => None,
    }
}

impl Dom for BrowserDom {
    type Frame = Element;

    fn query_frames(&self, filter: &FrameFilter) -> Vec<Element> {
        let Ok(nodes) = self.document.query_selector_all(&filter.selector()) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn attribute(&self, frame: &Element, name: &str) -> Option<String> {
        frame.get_attribute(name)
    }

    fn write_attribute(&self, frame: &Element, name: &str, value: &str) {
        let native = self.native_set_attribute.borrow().clone();
        let result = match native {
            Some(native) => native.call2(frame, &name.into(), &value.into()).map(|_| ()),
            None => frame.set_attribute(name, value),
        };
        if let Err(e) = result {
            web_sys::console::error_1(&e);
        }
    }

    fn title(&self, frame: &Element) -> String {
        Self::html(frame).map(|e| e.title()).unwrap_or_default()
    }

    fn set_title(&self, frame: &Element, title: &str) {
        if let Some(e) = Self::html(frame) {
            e.set_title(title);
        }
    }

    fn set_border(&self, frame: &Element, border: &str) {
        if let Some(e) = Self::html(frame) {
            if let Err(err) = e.style().set_property("border", border) {
                web_sys::console::error_1(&err);
            }
        }
    }

    fn location(&self) -> Location {
        let location = self.window.location();
        Location::new(
            location.href().unwrap_or_default(),
            location.pathname().unwrap_or_default(),
        )
    }

    fn ready_state(&self) -> ReadyState {
        match self.document.ready_state().as_str() {
            "loading" => ReadyState::Loading,
            "interactive" => ReadyState::Interactive,
            _ => ReadyState::Complete,
        }
    }

    fn has_body(&self) -> bool {
        self.document.body().is_some()
    }

    fn on_content_loaded(&self, callback: Box<dyn FnOnce()>) {
        let listener = Closure::once_into_js(move || callback());
        if let Err(e) = self
            .document
            .add_event_listener_with_callback("DOMContentLoaded", listener.unchecked_ref())
        {
            web_sys::console::error_1(&e);
        }
    }

    fn observe_body(&self, callback: MutationCallback) -> bool {
        let Some(body) = self.document.body() else {
            return false;
        };
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        init.set_attributes(true);
        init.set_attribute_filter(&Array::of1(&SRC.into()));
        self.observe(&body, &init, callback)
    }

    fn observe_document(&self, callback: MutationCallback) -> bool {
        let Some(root) = self.document.document_element() else {
            return false;
        };
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        self.observe(&root, &init, callback)
    }

    fn install_interception(&self, hook: Rc<dyn SrcHook<Element>>) -> bool {
        match self.patch_prototype(hook) {
            Ok(()) => true,
            Err(e) => {
                web_sys::console::error_1(&JsValue::from_str(&e.to_string()));
                false
            }
        }
    }
}
