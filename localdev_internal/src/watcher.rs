//! Debounced mutation watcher.
//!
//! Watches the body subtree for inserted iframes (directly or inside an inserted
//! element) and for `src` attribute changes on iframes.  A qualifying batch schedules
//! one scan after the configured debounce delay; batches arriving while that scan is
//! pending ride along with it.

use crate::dom::{AddedNode, Dom, Mutation, SRC};
use crate::env::Env;
use crate::scanner::Scanner;
use crate::timers::Timers;
use std::cell::Cell;
use std::rc::{Rc, Weak};

pub struct Watcher<D, T> {
    env: Rc<Env<D, T>>,
    pending: Rc<Cell<bool>>,
}

impl<D: Dom, T: Timers> Watcher<D, T> {
    pub fn new(env: Rc<Env<D, T>>) -> Self {
        Watcher {
            env,
            pending: Rc::new(Cell::new(false)),
        }
    }

    /// Subscribes to body mutations.
    ///
    /// Returns `false` when the document has no body yet; the caller retries once the
    /// document has loaded.
    pub fn install(&self) -> bool {
        if !self.env.dom.has_body() {
            return false;
        }
        let env = Rc::downgrade(&self.env);
        let pending = Rc::clone(&self.pending);
        let subscribed = self.env.dom.observe_body(Box::new(move |records| {
            on_mutations(&env, &pending, records);
        }));
        if subscribed {
            self.env.info("MutationObserver setup complete");
        }
        subscribed
    }

    /// Whether a debounced scan is waiting to run.
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }
}

/// Whether any record in the batch can have introduced or changed an iframe source.
pub fn qualifies(records: &[Mutation]) -> bool {
    records.iter().any(|record| match record {
        Mutation::ChildList { added } => added.iter().any(|node| {
            matches!(
                node,
                AddedNode::Frame | AddedNode::Element { contains_frame: true }
            )
        }),
        Mutation::Attribute {
            target_is_frame,
            name,
        } => *target_is_frame && name == SRC,
    })
}

fn on_mutations<D: Dom, T: Timers>(
    env: &Weak<Env<D, T>>,
    pending: &Rc<Cell<bool>>,
    records: &[Mutation],
) {
    if !qualifies(records) || pending.get() {
        return;
    }
    let Some(strong) = env.upgrade() else {
        return;
    };
    pending.set(true);
    let delay = strong.config().debounce_delay;
    let env = Weak::clone(env);
    let pending = Rc::clone(pending);
    strong.timers.set_timeout(
        delay,
        Box::new(move || {
            pending.set(false);
            if let Some(env) = env.upgrade() {
                Scanner::new(env).scan();
            }
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sim::{MemoryDom, VirtualTimers};
    use std::time::Duration;

    fn attr(target_is_frame: bool, name: &str) -> Mutation {
        Mutation::Attribute {
            target_is_frame,
            name: name.to_string(),
        }
    }

    #[test]
    fn inserted_frames_qualify() {
        assert!(qualifies(&[Mutation::ChildList {
            added: vec![AddedNode::Other, AddedNode::Frame],
        }]));
        assert!(qualifies(&[Mutation::ChildList {
            added: vec![AddedNode::Element { contains_frame: true }],
        }]));
        assert!(!qualifies(&[Mutation::ChildList {
            added: vec![AddedNode::Element { contains_frame: false }, AddedNode::Other],
        }]));
        assert!(!qualifies(&[Mutation::ChildList { added: vec![] }]));
    }

    #[test]
    fn only_src_on_frames_qualifies() {
        assert!(qualifies(&[attr(true, "src")]));
        assert!(!qualifies(&[attr(true, "title")]));
        assert!(!qualifies(&[attr(false, "src")]));
        assert!(qualifies(&[attr(false, "src"), attr(true, "src")]));
        assert!(!qualifies(&[]));
    }

    #[test]
    fn without_a_body_install_subscribes_nothing() {
        let dom = MemoryDom::new("https://dev.azure.com/o/p/_git/r/pullrequest/1");
        dom.set_body_present(false);
        let timers = VirtualTimers::new();
        let watcher = Watcher::new(Env::new(dom.clone(), timers.clone(), Config::default()));

        assert!(!watcher.install());
        assert_eq!(dom.body_observers(), 0);
        dom.insert_frame(&[("src", "https://a.azurestaticapps.net/")]);
        dom.flush();
        assert_eq!(timers.timeouts(), 0);
        assert!(!watcher.is_pending());
    }

    #[test]
    fn pending_clears_when_the_debounced_scan_runs() {
        let dom = MemoryDom::new("https://dev.azure.com/o/p/_git/r/pullrequest/1");
        let timers = VirtualTimers::new();
        let watcher = Watcher::new(Env::new(dom.clone(), timers.clone(), Config::default()));
        assert!(watcher.install());

        dom.insert_frame(&[]);
        dom.flush();
        assert!(watcher.is_pending());
        timers.advance(Duration::from_millis(100));
        assert!(!watcher.is_pending());
    }
}
