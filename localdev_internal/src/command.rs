use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A command that can be executed from the page console.
///
/// Commands are the primary way to expose the redirector to a developer at runtime.
/// Each command has a unique name, descriptions, and an execution method.
///
/// The redirector is single-threaded, so commands need not be `Send`.
pub trait Command: 'static {
    /// The unique name of the command.
    ///
    /// This is used to invoke the command (e.g. `adoExtensionDevHelper.run("<name>")`).
    fn name(&self) -> &'static str;

    /// A short, one-line description of the command.
    ///
    /// This is shown in the `list` command.
    fn short_description(&self) -> &'static str;

    /// A full description of the command.
    ///
    /// This is shown when `help <name>` is invoked. It should include usage instructions.
    fn full_description(&self) -> &'static str;

    /// Executes the command with the given arguments.
    ///
    /// Returns a `Response` on success, or a `Response` (usually a string error) on failure.
    fn execute(&self, args: Vec<String>) -> Result<Response, Response>;
}

/**
A response from a command
*/
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Response {
    String(String),
    Json(serde_json::Value),
}

impl Response {
    pub fn into_string(self) -> String {
        match self {
            Response::String(s) => s,
            Response::Json(value) => value.to_string(),
        }
    }

    pub fn from_serialize<S: Serialize>(s: &S) -> Result<Response, Response> {
        match serde_json::to_value(s) {
            Ok(value) => Ok(Response::Json(value)),
            Err(e) => Err(Response::String(e.to_string())),
        }
    }

    /// Wrong-arity error in the shape every command reports it.
    pub fn usage(name: &str, usage: &str) -> Response {
        Response::String(format!("usage: {name} {usage}"))
    }
}

impl From<String> for Response {
    fn from(s: String) -> Self {
        Response::String(s)
    }
}

impl From<&str> for Response {
    fn from(s: &str) -> Self {
        Response::String(s.to_string())
    }
}

impl From<serde_json::Value> for Response {
    fn from(value: serde_json::Value) -> Self {
        Response::Json(value)
    }
}

impl Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Response::String(s) => write!(f, "{}", s),
            Response::Json(value) => match serde_json::to_string_pretty(value) {
                Ok(pretty) => write!(f, "{}", pretty),
                Err(_) => write!(f, "{}", value),
            },
        }
    }
}
