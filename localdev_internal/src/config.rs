//! Developer-supplied configuration.
//!
//! A [`Config`] is plain data with serde support, so it can be written inline in Rust or
//! loaded from the JSON object a userscript manager or page embeds:
//!
//! ```
//! use localdev_internal::config::Config;
//! use std::time::Duration;
//!
//! let config = Config::from_json(r#"{
//!     "urlMappings": {
//!         "https://my-extension.azurestaticapps.net/": "http://localhost:3000/"
//!     },
//!     "checkInterval": 500,
//!     "targetPages": { "pullRequests": true, "repos": true }
//! }"#).unwrap();
//!
//! assert_eq!(config.url_mappings.len(), 1);
//! assert_eq!(config.check_interval, Duration::from_millis(500));
//! assert!(config.enable_debug_log);
//! ```

use crate::dom::Location;
use crate::error::ConfigError;
use crate::mapping::MappingTable;
use crate::target::TargetPages;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_millis(2000);
pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_REINIT_DELAY: Duration = Duration::from_millis(1000);

/// Pages the script is injected on.
pub const DEFAULT_HOST_PATTERNS: [&str; 2] =
    ["https://dev.azure.com/*", "https://*.visualstudio.com/*"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Production URL prefix to local URL prefix.
    pub url_mappings: MappingTable,
    pub enable_debug_log: bool,
    /// Fallback poller period.
    #[serde(with = "millis")]
    pub check_interval: Duration,
    /// Delay that coalesces bursts of mutation records into one scan.
    #[serde(with = "millis")]
    pub debounce_delay: Duration,
    /// Delay between detecting a route change and re-initializing.
    #[serde(with = "millis")]
    pub reinit_delay: Duration,
    pub target_pages: TargetPages,
    /// `@match`-style globs; `*` matches any run of characters.
    pub host_patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            url_mappings: MappingTable::new(),
            enable_debug_log: true,
            check_interval: DEFAULT_CHECK_INTERVAL,
            debounce_delay: DEFAULT_DEBOUNCE_DELAY,
            reinit_delay: DEFAULT_REINIT_DELAY,
            target_pages: TargetPages::default(),
            host_patterns: DEFAULT_HOST_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl Config {
    /// The shipped sample configuration, with placeholder mappings to replace.
    pub fn example() -> Self {
        Config {
            url_mappings: MappingTable::from_iter([
                (
                    "https://your-production-extension.azurestaticapps.net/",
                    "http://localhost:3000/",
                ),
                ("https://another-extension.azurewebsites.net/app", "http://localhost:8080/app"),
            ]),
            ..Config::default()
        }
    }

    /// Parses and validates a JSON configuration.  Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects configurations the pipeline cannot run safely.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.check_interval.is_zero() {
            return Err(ConfigError::ZeroInterval(self.check_interval));
        }
        if let Some(local) = self.url_mappings.get("") {
            return Err(ConfigError::EmptyMappingKey {
                local: local.to_string(),
            });
        }
        Ok(())
    }

    /// Whether the script should run at all on `location`.
    ///
    /// An empty pattern list allows every host.
    pub fn host_allowed(&self, location: &Location) -> bool {
        if self.host_patterns.is_empty() {
            return true;
        }
        let href = location.href.to_lowercase();
        self.host_patterns
            .iter()
            .any(|pattern| glob_match(&pattern.to_lowercase(), &href))
    }
}

/// `*` matches any (possibly empty) run of characters; everything else is literal.
fn glob_match(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return text.is_empty();
    };
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };
    let pieces: Vec<&str> = parts.collect();
    let Some((last, middle)) = pieces.split_last() else {
        // no `*` at all
        return rest.is_empty();
    };
    for piece in middle {
        match rest.find(piece) {
            Some(i) => rest = &rest[i + piece.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis().try_into().unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_script() {
        let c = Config::default();
        assert!(c.url_mappings.is_empty());
        assert!(c.enable_debug_log);
        assert_eq!(c.check_interval, Duration::from_millis(2000));
        assert_eq!(c.debounce_delay, Duration::from_millis(100));
        assert_eq!(c.reinit_delay, Duration::from_millis(1000));
        assert_eq!(c.target_pages, TargetPages::default());
        assert_eq!(Config::example().url_mappings.len(), 2);
    }

    #[test]
    fn rejects_zero_interval_and_empty_key() {
        let err = Config::from_json(r#"{"checkInterval": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroInterval(_)));

        let err = Config::from_json(r#"{"urlMappings": {"": "http://localhost:1/"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyMappingKey { .. }));

        let err = Config::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn json_round_trip_keeps_millis() {
        let c = Config::example();
        let text = c.to_json().unwrap();
        assert!(text.contains("\"checkInterval\": 2000"));
        assert_eq!(Config::from_json(&text).unwrap(), c);
    }

    #[test]
    fn host_patterns_follow_match_globs() {
        let c = Config::default();
        assert!(c.host_allowed(&Location::from_href("https://dev.azure.com/org/proj")));
        assert!(c.host_allowed(&Location::from_href("https://Contoso.VisualStudio.com/proj")));
        assert!(!c.host_allowed(&Location::from_href("https://example.com/dev.azure.com/")));
        assert!(!c.host_allowed(&Location::from_href("http://dev.azure.com/org")));

        let open = Config {
            host_patterns: vec![],
            ..Config::default()
        };
        assert!(open.host_allowed(&Location::from_href("https://anything.test/")));
    }

    #[test]
    fn glob_edge_cases() {
        assert!(glob_match("abc", "abc"));
        assert!(!glob_match("abc", "abcd"));
        assert!(glob_match("a*", "a"));
        assert!(glob_match("*", ""));
        assert!(glob_match("a*b*c", "a-b-b-c"));
        assert!(!glob_match("a*b*c", "a-c-b"));
    }
}
