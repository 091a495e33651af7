use crate::dom::{
    AddedNode, Dom, FrameFilter, Location, Mutation, MutationCallback, ReadyState, SRC, SrcHook,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Handle to an iframe in a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(usize);

#[derive(Default)]
struct Frame {
    attributes: BTreeMap<String, String>,
    border: Option<String>,
}

struct State {
    frames: Vec<Frame>,
    location: Location,
    ready: ReadyState,
    body: bool,
    pending: Vec<Mutation>,
    body_observers: Vec<MutationCallback>,
    document_observers: Vec<MutationCallback>,
    content_loaded: Vec<Box<dyn FnOnce()>>,
    hook: Option<Rc<dyn SrcHook<FrameId>>>,
    installs: usize,
}

/// A document of iframes.  Clones share the same document.
#[derive(Clone)]
pub struct MemoryDom {
    state: Rc<RefCell<State>>,
}

impl MemoryDom {
    /// A loaded document with a body, at `href`.
    pub fn new(href: &str) -> Self {
        MemoryDom {
            state: Rc::new(RefCell::new(State {
                frames: Vec::new(),
                location: Location::from_href(href),
                ready: ReadyState::Complete,
                body: true,
                pending: Vec::new(),
                body_observers: Vec::new(),
                document_observers: Vec::new(),
                content_loaded: Vec::new(),
                hook: None,
                installs: 0,
            })),
        }
    }

    pub fn set_ready_state(&self, ready: ReadyState) {
        self.state.borrow_mut().ready = ready;
    }

    pub fn set_body_present(&self, present: bool) {
        self.state.borrow_mut().body = present;
    }

    /// Finishes parsing: the body appears and `DOMContentLoaded` listeners run.
    pub fn finish_loading(&self) {
        let listeners = {
            let mut s = self.state.borrow_mut();
            s.ready = ReadyState::Interactive;
            s.body = true;
            std::mem::take(&mut s.content_loaded)
        };
        for listener in listeners {
            listener();
        }
    }

    /// Changes the location without a reload and without rendering anything.
    pub fn set_location(&self, href: &str) {
        self.state.borrow_mut().location = Location::from_href(href);
    }

    /// SPA navigation: the location changes and the new view renders.
    pub fn navigate(&self, href: &str) {
        let mut s = self.state.borrow_mut();
        s.location = Location::from_href(href);
        s.pending.push(Mutation::ChildList {
            added: vec![AddedNode::Element {
                contains_frame: false,
            }],
        });
    }

    /// Parses an `<iframe>` with `attributes` into the body.  Markup bypasses interception.
    pub fn insert_frame(&self, attributes: &[(&str, &str)]) -> FrameId {
        let id = self.push_frame(attributes);
        self.state.borrow_mut().pending.push(Mutation::ChildList {
            added: vec![AddedNode::Frame],
        });
        id
    }

    /// Parses a container element holding one iframe per attribute list.
    pub fn insert_container(&self, frames: &[&[(&str, &str)]]) -> Vec<FrameId> {
        let ids: Vec<FrameId> = frames
            .iter()
            .map(|attributes| self.push_frame(attributes))
            .collect();
        self.state.borrow_mut().pending.push(Mutation::ChildList {
            added: vec![AddedNode::Element {
                contains_frame: !ids.is_empty(),
            }],
        });
        ids
    }

    /// Inserts a non-iframe element.
    pub fn insert_element(&self) {
        self.state.borrow_mut().pending.push(Mutation::ChildList {
            added: vec![AddedNode::Element {
                contains_frame: false,
            }],
        });
    }

    /// Page script calling `frame.setAttribute(name, value)`.
    pub fn page_set_attribute(&self, frame: FrameId, name: &str, value: &str) {
        match self.hook() {
            Some(hook) => hook.set_attribute(&frame, name, value),
            None => self.write_attribute(&frame, name, value),
        }
    }

    /// Page script assigning `frame.src = value`.
    pub fn page_set_src(&self, frame: FrameId, value: &str) {
        match self.hook() {
            Some(hook) => hook.set_src(&frame, value),
            None => self.write_attribute(&frame, SRC, value),
        }
    }

    /// Page script reading `frame.src`.
    pub fn page_src(&self, frame: FrameId) -> String {
        match self.hook() {
            Some(hook) => hook.src(&frame),
            None => self.src_of(frame).unwrap_or_default(),
        }
    }

    /// Replaces the source the way a bulk markup rewrite can, with no mutation record.
    pub fn replace_src_silently(&self, frame: FrameId, value: &str) {
        if let Some(f) = self.state.borrow_mut().frames.get_mut(frame.0) {
            f.attributes.insert(SRC.to_string(), value.to_string());
        }
    }

    /// Delivers queued mutation records to observers.  Returns how many were delivered.
    pub fn flush(&self) -> usize {
        let records = std::mem::take(&mut self.state.borrow_mut().pending);
        if records.is_empty() {
            return 0;
        }
        let child_lists: Vec<Mutation> = records
            .iter()
            .filter(|m| matches!(m, Mutation::ChildList { .. }))
            .cloned()
            .collect();

        let mut body = std::mem::take(&mut self.state.borrow_mut().body_observers);
        for observer in body.iter_mut() {
            observer(&records);
        }
        {
            let mut s = self.state.borrow_mut();
            body.append(&mut s.body_observers);
            s.body_observers = body;
        }

        if !child_lists.is_empty() {
            let mut document = std::mem::take(&mut self.state.borrow_mut().document_observers);
            for observer in document.iter_mut() {
                observer(&child_lists);
            }
            let mut s = self.state.borrow_mut();
            document.append(&mut s.document_observers);
            s.document_observers = document;
        }
        records.len()
    }

    pub fn frames(&self) -> Vec<FrameId> {
        (0..self.state.borrow().frames.len()).map(FrameId).collect()
    }

    pub fn src_of(&self, frame: FrameId) -> Option<String> {
        self.attribute(&frame, SRC)
    }

    pub fn title_of(&self, frame: FrameId) -> String {
        self.title(&frame)
    }

    pub fn border_of(&self, frame: FrameId) -> Option<String> {
        self.state.borrow().frames.get(frame.0).and_then(|f| f.border.clone())
    }

    pub fn body_observers(&self) -> usize {
        self.state.borrow().body_observers.len()
    }

    pub fn document_observers(&self) -> usize {
        self.state.borrow().document_observers.len()
    }

    /// How many times interception was installed.
    pub fn interception_installs(&self) -> usize {
        self.state.borrow().installs
    }

    fn push_frame(&self, attributes: &[(&str, &str)]) -> FrameId {
        let mut s = self.state.borrow_mut();
        let frame = Frame {
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            border: None,
        };
        s.frames.push(frame);
        FrameId(s.frames.len() - 1)
    }

    fn hook(&self) -> Option<Rc<dyn SrcHook<FrameId>>> {
        self.state.borrow().hook.clone()
    }
}

impl Dom for MemoryDom {
    type Frame = FrameId;

    fn query_frames(&self, filter: &FrameFilter) -> Vec<FrameId> {
        self.state
            .borrow()
            .frames
            .iter()
            .enumerate()
            .filter(|(_, f)| {
                filter.matches(
                    f.attributes.get("class").map(String::as_str),
                    f.attributes.get(SRC).map(String::as_str),
                )
            })
            .map(|(i, _)| FrameId(i))
            .collect()
    }

    fn attribute(&self, frame: &FrameId, name: &str) -> Option<String> {
        self.state
            .borrow()
            .frames
            .get(frame.0)
            .and_then(|f| f.attributes.get(name).cloned())
    }

    fn write_attribute(&self, frame: &FrameId, name: &str, value: &str) {
        let mut s = self.state.borrow_mut();
        let Some(f) = s.frames.get_mut(frame.0) else {
            return;
        };
        f.attributes.insert(name.to_ascii_lowercase(), value.to_string());
        s.pending.push(Mutation::Attribute {
            target_is_frame: true,
            name: name.to_ascii_lowercase(),
        });
    }

    fn title(&self, frame: &FrameId) -> String {
        self.attribute(frame, "title").unwrap_or_default()
    }

    fn set_title(&self, frame: &FrameId, title: &str) {
        self.write_attribute(frame, "title", title);
    }

    fn set_border(&self, frame: &FrameId, border: &str) {
        if let Some(f) = self.state.borrow_mut().frames.get_mut(frame.0) {
            f.border = Some(border.to_string());
        }
    }

    fn location(&self) -> Location {
        self.state.borrow().location.clone()
    }

    fn ready_state(&self) -> ReadyState {
        self.state.borrow().ready
    }

    fn has_body(&self) -> bool {
        self.state.borrow().body
    }

    fn on_content_loaded(&self, callback: Box<dyn FnOnce()>) {
        self.state.borrow_mut().content_loaded.push(callback);
    }

    fn observe_body(&self, callback: MutationCallback) -> bool {
        let mut s = self.state.borrow_mut();
        if !s.body {
            return false;
        }
        s.body_observers.push(callback);
        true
    }

    fn observe_document(&self, callback: MutationCallback) -> bool {
        self.state.borrow_mut().document_observers.push(callback);
        true
    }

    fn install_interception(&self, hook: Rc<dyn SrcHook<FrameId>>) -> bool {
        let mut s = self.state.borrow_mut();
        s.hook = Some(hook);
        s.installs += 1;
        true
    }
}
