//! The page gate: whether the pipeline should be active for a location.

use crate::dom::Location;
use serde::{Deserialize, Serialize};

/// Which Azure DevOps page categories activate the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TargetPages {
    pub pull_requests: bool,
    pub work_items: bool,
    pub builds: bool,
    pub releases: bool,
    pub repos: bool,
}

impl Default for TargetPages {
    fn default() -> Self {
        TargetPages {
            pull_requests: true,
            work_items: false,
            builds: false,
            releases: false,
            repos: false,
        }
    }
}

impl TargetPages {
    /// Every category disabled.
    pub const NONE: TargetPages = TargetPages {
        pull_requests: false,
        work_items: false,
        builds: false,
        releases: false,
        repos: false,
    };

    /// Every category enabled.
    pub const ALL: TargetPages = TargetPages {
        pull_requests: true,
        work_items: true,
        builds: true,
        releases: true,
        repos: true,
    };

    /// Whether `location` belongs to an enabled category.  Case-insensitive.
    ///
    /// ```
    /// use localdev_internal::dom::Location;
    /// use localdev_internal::target::TargetPages;
    ///
    /// let pr = Location::from_href("https://dev.azure.com/org/proj/_git/repo/pullrequest/42");
    /// assert!(TargetPages::default().matches(&pr));
    /// assert!(!TargetPages::NONE.matches(&pr));
    /// ```
    pub fn matches(&self, location: &Location) -> bool {
        let path = location.pathname.to_lowercase();
        let href = location.href.to_lowercase();

        (self.pull_requests && (path.contains("/pullrequest/") || href.contains("pullrequest")))
            || (self.work_items && path.contains("/_workitems/"))
            || (self.builds && path.contains("/_build/"))
            || (self.releases && path.contains("/_release/"))
            || (self.repos && path.contains("/_git/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(href: &str) -> Location {
        Location::from_href(href)
    }

    #[test]
    fn pull_request_matches_path_or_href() {
        let gate = TargetPages::default();
        assert!(gate.matches(&at("https://dev.azure.com/o/p/_git/r/PullRequest/1")));
        // listing page has no trailing segment but the href still names it
        assert!(gate.matches(&at("https://dev.azure.com/o/p/_git/r/pullrequests?_a=mine")));
        assert!(!gate.matches(&at("https://dev.azure.com/o/p/_git/r")));
    }

    #[test]
    fn each_category_uses_its_path() {
        let only = |f: fn(&mut TargetPages)| {
            let mut t = TargetPages::NONE;
            f(&mut t);
            t
        };
        let work = only(|t| t.work_items = true);
        let builds = only(|t| t.builds = true);
        let releases = only(|t| t.releases = true);
        let repos = only(|t| t.repos = true);

        assert!(work.matches(&at("https://dev.azure.com/o/p/_workitems/edit/5")));
        assert!(builds.matches(&at("https://dev.azure.com/o/p/_build/results?buildId=1")));
        assert!(releases.matches(&at("https://o.visualstudio.com/p/_release/x")));
        assert!(repos.matches(&at("https://dev.azure.com/o/p/_git/repo")));
        assert!(!work.matches(&at("https://dev.azure.com/o/p/_git/repo")));
        // a query string is not the path
        assert!(!builds.matches(&at("https://dev.azure.com/o/p?next=/_build/")));
    }

    #[test]
    fn all_disabled_never_matches() {
        for href in [
            "https://dev.azure.com/o/p/_git/r/pullrequest/1",
            "https://dev.azure.com/o/p/_workitems/edit/5",
            "https://dev.azure.com/o/p/_build/",
        ] {
            assert!(!TargetPages::NONE.matches(&at(href)));
            assert!(TargetPages::ALL.matches(&at(href)));
        }
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let t: TargetPages = serde_json::from_str(r#"{"workItems": true}"#).unwrap();
        assert!(t.work_items);
        assert!(t.pull_requests);
        assert!(!t.repos);
    }
}
