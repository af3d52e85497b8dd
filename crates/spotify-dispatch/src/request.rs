//! Request description handed to the dispatcher

use serde_json::Value;
use spotify_auth::Scope;
use transport::Method;

/// What a call should do when its required scope was not granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnMissingScope {
    /// Fail with `InsufficientScope`.
    #[default]
    Fail,
    /// Report absence (`Ok(None)`). Only honored by the optional-payload
    /// shape; every other shape fails.
    Absent,
}

/// One Web API call: method, path relative to the API base, query, extra
/// headers, optional JSON body and the scope it requires.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    pub requires_auth_header: bool,
    pub required_scope: Option<Scope>,
    pub on_missing_scope: OnMissingScope,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            requires_auth_header: true,
            required_scope: None,
            on_missing_scope: OnMissingScope::Fail,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Add a query parameter only when a value is given.
    pub fn query_opt(self, name: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(name, value),
            None => self,
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.required_scope = Some(scope);
        self
    }

    /// Report a missing scope as absence instead of an error.
    pub fn absent_without_scope(mut self) -> Self {
        self.on_missing_scope = OnMissingScope::Absent;
        self
    }

    pub fn without_auth(mut self) -> Self {
        self.requires_auth_header = false;
        self
    }

    /// Query value by name, for assertions and logging.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}
