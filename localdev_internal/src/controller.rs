use crate::config::Config;
use crate::dom::{Dom, ReadyState};
use crate::env::Env;
use crate::error::ConfigError;
use crate::intercept::Interceptor;
use crate::navigation::NavigationMonitor;
use crate::poller::Poller;
use crate::scanner::Scanner;
use crate::timers::Timers;
use crate::watcher::Watcher;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// What an [`init`](Redirector::init) call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Interception, scanner, watcher and poller are all running.
    Armed,
    /// Interception and the poller are running; the first scan and the watcher wait for
    /// `DOMContentLoaded`.
    Deferred,
    /// The mapping table is empty, so nothing was armed.
    NoMappings,
}

/// Owns the configuration and drives the whole pipeline for one page.
///
/// A `Redirector` is a shared handle; clones drive the same pipeline.  Keep one alive
/// for as long as the page should be redirected.
///
/// ```
/// use localdev_internal::Redirector;
/// use localdev_internal::config::Config;
/// use localdev_internal::sim::Harness;
///
/// let page = Harness::new("https://dev.azure.com/org/proj/_git/repo/pullrequest/12");
/// let frame = page.dom.insert_frame(&[("src", "https://my-ext.azurestaticapps.net/index.html")]);
///
/// let mut config = Config::default();
/// config.url_mappings.insert("https://my-ext.azurestaticapps.net/", "http://localhost:3000/");
///
/// let redirector = Redirector::new(page.dom.clone(), page.timers.clone(), config);
/// assert!(redirector.start());
/// assert_eq!(page.dom.src_of(frame).as_deref(), Some("http://localhost:3000/index.html"));
/// ```
pub struct Redirector<D, T> {
    inner: Rc<Inner<D, T>>,
}

struct Inner<D, T> {
    env: Rc<Env<D, T>>,
    interceptor: Interceptor<D, T>,
    navigation: RefCell<Option<Rc<NavigationMonitor<D, T>>>>,
}

impl<D, T> Clone for Redirector<D, T> {
    fn clone(&self) -> Self {
        Redirector {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<D: Dom, T: Timers> Redirector<D, T> {
    pub fn new(dom: D, timers: T, config: Config) -> Self {
        let env = Env::new(dom, timers, config);
        let interceptor = Interceptor::new(Rc::clone(&env));
        Redirector {
            inner: Rc::new(Inner {
                env,
                interceptor,
                navigation: RefCell::new(None),
            }),
        }
    }

    /// Script entry point: initializes if the current page is a target, then starts
    /// watching for SPA navigation either way.
    ///
    /// Returns whether the page gate passed.
    pub fn start(&self) -> bool {
        let location = self.inner.env.dom.location();
        let active = self.inner.env.config().target_pages.matches(&location);
        if active {
            self.init();
        }
        self.install_navigation_monitor();
        active
    }

    /// Runs the initialization sequence.
    ///
    /// Safe to call repeatedly: interception is installed once, and each call layers a
    /// fresh watcher and poller over the previous ones.
    pub fn init(&self) -> InitOutcome {
        let env = &self.inner.env;
        env.info("Initializing extension local development helper...");
        let count = env.config().url_mappings.len();
        env.info(&format!("Configured URL mappings: {count} mapping(s)"));

        if count == 0 {
            env.warn("Warning: No URL mappings configured. Please update the URL_MAPPINGS configuration.");
            return InitOutcome::NoMappings;
        }
        self.report_table_hazards();

        self.inner.interceptor.install();

        let outcome = if env.dom.ready_state() == ReadyState::Loading {
            let weak = Rc::downgrade(env);
            env.dom.on_content_loaded(Box::new(move || {
                if let Some(env) = weak.upgrade() {
                    arm_document(&env);
                }
            }));
            InitOutcome::Deferred
        } else {
            arm_document(env);
            InitOutcome::Armed
        };

        Poller::new(Rc::clone(env)).start();

        env.info("Initialization complete");
        outcome
    }

    /// Re-runs initialization regardless of the current state.
    pub fn reinitialize(&self) -> InitOutcome {
        self.init()
    }

    /// Inserts or overwrites a mapping.  Already-loaded iframes are picked up by the next
    /// scan.
    pub fn add_mapping(&self, production: &str, local: &str) -> Result<(), ConfigError> {
        if production.is_empty() {
            return Err(ConfigError::EmptyMappingKey {
                local: local.to_string(),
            });
        }
        let env = &self.inner.env;
        env.update_config(|c| c.url_mappings.insert(production, local));
        env.info(&format!("Added new URL mapping: {production} -> {local}"));
        let rematched_by = env.config().url_mappings.key_for(local).map(str::to_string);
        if let Some(key) = rematched_by {
            env.warn(&format!(
                "Local URL {local} is itself matched by production key {key}; keep local and production domains disjoint"
            ));
        }
        Ok(())
    }

    /// Removes a mapping.  Returns whether it existed; iframes already rewritten stay
    /// rewritten.
    pub fn remove_mapping(&self, production: &str) -> bool {
        let env = &self.inner.env;
        let existed = env.update_config(|c| c.url_mappings.remove(production)).is_some();
        env.info(&format!("Removed URL mapping: {production}"));
        existed
    }

    /// A snapshot of the current configuration.
    pub fn config(&self) -> Config {
        self.inner.env.config().clone()
    }

    /// Runs one scanner pass now.
    pub fn scan(&self) -> usize {
        Scanner::new(Rc::clone(&self.inner.env)).scan()
    }

    /// The guarded setter, for Rust code that assigns iframe sources itself.
    pub fn interceptor(&self) -> &Interceptor<D, T> {
        &self.inner.interceptor
    }

    fn install_navigation_monitor(&self) {
        if self.inner.navigation.borrow().is_some() {
            return;
        }
        let weak: Weak<Inner<D, T>> = Rc::downgrade(&self.inner);
        let reinit: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                Redirector { inner }.init();
            }
        });
        let monitor = NavigationMonitor::new(&self.inner.env, reinit);
        if monitor.install() {
            *self.inner.navigation.borrow_mut() = Some(monitor);
        }
    }

    fn report_table_hazards(&self) {
        let env = &self.inner.env;
        let (conflicts, shadowed) = {
            let config = env.config();
            (config.url_mappings.conflicts(), config.url_mappings.shadowed())
        };
        for c in conflicts {
            env.warn(&format!(
                "Local URL {} for {} is itself matched by production key {}; keep local and production domains disjoint",
                c.local, c.production, c.rematched_by
            ));
        }
        for s in shadowed {
            env.warn(&format!(
                "Mapping {} is shadowed by earlier prefix {} and only applies to exact matches",
                s.later, s.earlier
            ));
        }
    }
}

fn arm_document<D: Dom, T: Timers>(env: &Rc<Env<D, T>>) {
    Scanner::new(Rc::clone(env)).scan();
    Watcher::new(Rc::clone(env)).install();
}
