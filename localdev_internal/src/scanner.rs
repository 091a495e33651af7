//! One-shot sweep of the document's extension iframes.
//!
//! The scanner catches everything interception cannot: iframes that existed before
//! interception was installed and sources replaced through bulk markup changes.  It is
//! the single consumer behind the watcher, the poller and initialization, and it is
//! idempotent: an iframe that still shows the URL this system wrote into it is skipped,
//! so a second pass over an unchanged document rewrites nothing.

use crate::dom::{Dom, EXTENSION_FRAMES};
use crate::env::Env;
use crate::intercept;
use crate::timers::Timers;
use std::rc::Rc;

pub struct Scanner<D, T> {
    env: Rc<Env<D, T>>,
}

impl<D: Dom, T: Timers> Scanner<D, T> {
    pub fn new(env: Rc<Env<D, T>>) -> Self {
        Scanner { env }
    }

    /// Rewrites every matching iframe whose current source maps to a different URL.
    ///
    /// Returns the number of iframes rewritten in this pass.
    pub fn scan(&self) -> usize {
        let env = &self.env;
        let mut replaced = 0;
        for frame in env.dom.query_frames(&EXTENSION_FRAMES) {
            let current = intercept::read(env, &frame);
            if intercept::is_rewritten(env, &frame, &current) {
                continue;
            }
            let Some(local) = env.resolve(&current) else {
                continue;
            };
            if local == current {
                continue;
            }
            env.info(&format!(
                "Found production iframe ({current}), replacing with local URL ({local})"
            ));
            intercept::apply(env, &frame, &local);
            replaced += 1;
        }
        if replaced > 0 {
            env.info(&format!(
                "Successfully replaced {replaced} iframe(s) with local development URLs"
            ));
        }
        replaced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::mapping::MappingTable;
    use crate::sim::{MemoryDom, VirtualTimers};

    fn scanner(dom: &MemoryDom, table: MappingTable) -> Scanner<MemoryDom, VirtualTimers> {
        let config = Config {
            url_mappings: table,
            ..Config::default()
        };
        Scanner::new(Env::new(dom.clone(), VirtualTimers::new(), config))
    }

    fn table() -> MappingTable {
        MappingTable::from_iter([
            ("https://a.azurestaticapps.net/", "http://localhost:3000/"),
            ("https://b.azurewebsites.net/app", "http://localhost:8080/app"),
        ])
    }

    #[test]
    fn second_pass_over_static_dom_is_zero() {
        let dom = MemoryDom::new("https://dev.azure.com/o/p/_git/r/pullrequest/1");
        let a = dom.insert_frame(&[("src", "https://a.azurestaticapps.net/x")]);
        let b = dom.insert_frame(&[("src", "https://b.azurewebsites.net/app?id=2")]);
        let s = scanner(&dom, table());

        assert_eq!(s.scan(), 2);
        assert_eq!(s.scan(), 0);
        assert_eq!(dom.src_of(a).as_deref(), Some("http://localhost:3000/x"));
        assert_eq!(dom.src_of(b).as_deref(), Some("http://localhost:8080/app?id=2"));
    }

    #[test]
    fn only_extension_frames_are_considered() {
        let dom = MemoryDom::new("https://dev.azure.com/o/p/_git/r/pullrequest/1");
        // same URL as a mapping but no class and no hosting-platform host
        let other = dom.insert_frame(&[("src", "https://a.example/x")]);
        let classed = dom.insert_frame(&[
            ("class", "external-content--iframe"),
            ("src", "https://a.example/x"),
        ]);
        let table = MappingTable::from_iter([("https://a.example/", "http://localhost:1/")]);
        let s = scanner(&dom, table);

        assert_eq!(s.scan(), 1);
        assert_eq!(dom.src_of(other).as_deref(), Some("https://a.example/x"));
        assert_eq!(dom.src_of(classed).as_deref(), Some("http://localhost:1/x"));
    }

    #[test]
    fn reassigned_production_url_is_rewritten_again() {
        let dom = MemoryDom::new("https://dev.azure.com/o/p/_git/r/pullrequest/1");
        let frame = dom.insert_frame(&[("src", "https://a.azurestaticapps.net/x")]);
        let s = scanner(&dom, table());
        assert_eq!(s.scan(), 1);

        // bulk markup change puts the production URL back without interception
        dom.replace_src_silently(frame, "https://a.azurestaticapps.net/y");
        assert_eq!(s.scan(), 1);
        assert_eq!(dom.src_of(frame).as_deref(), Some("http://localhost:3000/y"));
    }

    #[test]
    fn overlapping_table_does_not_chain() {
        let dom = MemoryDom::new("https://dev.azure.com/o/p/_git/r/pullrequest/1");
        let frame = dom.insert_frame(&[("src", "https://a.azurestaticapps.net/x")]);
        // the local side is itself a production prefix
        let s = scanner(
            &dom,
            MappingTable::from_iter([(
                "https://a.azurestaticapps.net/",
                "https://a.azurestaticapps.net/dev/",
            )]),
        );
        assert_eq!(s.scan(), 1);
        assert_eq!(s.scan(), 0);
        assert_eq!(dom.src_of(frame).as_deref(), Some("https://a.azurestaticapps.net/dev/x"));
    }

    #[test]
    fn empty_table_rewrites_nothing() {
        let dom = MemoryDom::new("https://dev.azure.com/o/p/_git/r/pullrequest/1");
        dom.insert_frame(&[("src", "https://a.azurestaticapps.net/x")]);
        assert_eq!(scanner(&dom, MappingTable::new()).scan(), 0);
    }
}
