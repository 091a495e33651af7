//! The environment the pipeline runs in.
//!
//! The hosting page is opaque and mutates on its own schedule.  The pipeline only
//! reaches it through [`Dom`], which a browser binding implements with `web-sys` and
//! the [`sim`](crate::sim) harness implements in memory.

use std::rc::Rc;

/// Attribute that carries an iframe's source.
pub const SRC: &str = "src";

/// Attribute this system writes on every iframe it rewrites, holding the URL it wrote.
pub const MARKER: &str = "data-localdev-src";

/// Which iframes count as extension hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFilter {
    /// CSS class the host application puts on extension iframes.
    pub class_name: &'static str,
    /// Host-name fragments of the production hosting platforms.
    pub host_markers: &'static [&'static str],
}

/// The Azure DevOps extension iframe heuristic.
pub const EXTENSION_FRAMES: FrameFilter = FrameFilter {
    class_name: "external-content--iframe",
    host_markers: &["azurestaticapps.net", "azurewebsites.net"],
};

impl FrameFilter {
    /// The equivalent CSS selector, for `querySelectorAll`.
    ///
    /// ```
    /// use localdev_internal::dom::EXTENSION_FRAMES;
    ///
    /// assert_eq!(
    ///     EXTENSION_FRAMES.selector(),
    ///     r#"iframe.external-content--iframe, iframe[src*="azurestaticapps.net"], iframe[src*="azurewebsites.net"]"#
    /// );
    /// ```
    pub fn selector(&self) -> String {
        let mut parts = vec![format!("iframe.{}", self.class_name)];
        for marker in self.host_markers {
            parts.push(format!("iframe[src*=\"{marker}\"]"));
        }
        parts.join(", ")
    }

    /// Evaluates the filter against an iframe's `class` and `src` attributes.
    pub fn matches(&self, class: Option<&str>, src: Option<&str>) -> bool {
        let by_class = class
            .map(|c| c.split_whitespace().any(|name| name == self.class_name))
            .unwrap_or(false);
        let by_host = src
            .map(|s| self.host_markers.iter().any(|marker| s.contains(marker)))
            .unwrap_or(false);
        by_class || by_host
    }
}

/// The parts of `window.location` the gate looks at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub href: String,
    pub pathname: String,
}

impl Location {
    pub fn new(href: impl Into<String>, pathname: impl Into<String>) -> Self {
        Location {
            href: href.into(),
            pathname: pathname.into(),
        }
    }

    /// Derives the pathname from an absolute href.
    ///
    /// ```
    /// use localdev_internal::dom::Location;
    ///
    /// let l = Location::from_href("https://dev.azure.com/org/proj/_git/repo/pullrequest/7?tab=files");
    /// assert_eq!(l.pathname, "/org/proj/_git/repo/pullrequest/7");
    /// ```
    pub fn from_href(href: impl Into<String>) -> Self {
        let href = href.into();
        let after_scheme = href.find("://").map(|i| i + 3).unwrap_or(0);
        let rest = &href[after_scheme..];
        let pathname = match rest.find('/') {
            Some(slash) => {
                let path = &rest[slash..];
                let end = path.find(['?', '#']).unwrap_or(path.len());
                path[..end].to_string()
            }
            None => "/".to_string(),
        };
        Location { href, pathname }
    }
}

/// `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// A node reported as inserted by a child-list mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddedNode {
    /// An `<iframe>` element.
    Frame,
    /// Some other element, possibly with iframe descendants.
    Element { contains_frame: bool },
    /// Text, comments and the like.
    Other,
}

/// One mutation record, reduced to what the watchers need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    ChildList { added: Vec<AddedNode> },
    Attribute { target_is_frame: bool, name: String },
}

/// Callback receiving batches of mutation records.
pub type MutationCallback = Box<dyn FnMut(&[Mutation])>;

/// Receives every page-originated `src` assignment once interception is installed.
///
/// [`Interceptor`](crate::intercept::Interceptor) implements this; environments call it
/// from their patched `setAttribute` and `src` accessors.
pub trait SrcHook<F> {
    /// `element.setAttribute(name, value)`.
    fn set_attribute(&self, frame: &F, name: &str, value: &str);
    /// `element.src = value`.
    fn set_src(&self, frame: &F, value: &str);
    /// `element.src`.
    fn src(&self, frame: &F) -> String;
}

/// Access to the hosting document.
///
/// Implementations must not invoke mutation callbacks synchronously from inside any of
/// these methods; records are delivered later, the way `MutationObserver` queues them.
pub trait Dom: 'static {
    type Frame: Clone + 'static;

    /// All iframes matching `filter`, in document order.
    fn query_frames(&self, filter: &FrameFilter) -> Vec<Self::Frame>;

    fn attribute(&self, frame: &Self::Frame, name: &str) -> Option<String>;

    /// Writes an attribute without passing through interception.
    fn write_attribute(&self, frame: &Self::Frame, name: &str, value: &str);

    fn title(&self, frame: &Self::Frame) -> String;

    fn set_title(&self, frame: &Self::Frame, title: &str);

    /// Sets the inline `border` style.
    fn set_border(&self, frame: &Self::Frame, border: &str);

    fn location(&self) -> Location;

    fn ready_state(&self) -> ReadyState;

    fn has_body(&self) -> bool;

    /// Runs `callback` once when `DOMContentLoaded` fires.
    fn on_content_loaded(&self, callback: Box<dyn FnOnce()>);

    /// Subscribes to subtree child-list and `src` attribute changes under `body`.
    ///
    /// Returns `false` without subscribing when there is no body yet.
    fn observe_body(&self, callback: MutationCallback) -> bool;

    /// Subscribes to subtree child-list changes under the document element.
    fn observe_document(&self, callback: MutationCallback) -> bool;

    /// Routes page-originated iframe `src` assignments through `hook`.
    fn install_interception(&self, hook: Rc<dyn SrcHook<Self::Frame>>) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches_class_or_host() {
        let f = EXTENSION_FRAMES;
        assert!(f.matches(Some("foo external-content--iframe"), None));
        assert!(f.matches(None, Some("https://x.azurewebsites.net/app")));
        assert!(!f.matches(Some("external-content"), Some("http://localhost:3000/")));
        assert!(!f.matches(None, None));
    }

    #[test]
    fn location_without_path() {
        assert_eq!(Location::from_href("https://dev.azure.com").pathname, "/");
        assert_eq!(Location::from_href("https://dev.azure.com/org#x").pathname, "/org");
    }
}
