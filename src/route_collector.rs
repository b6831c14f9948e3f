//! Route collection: filters a host route table down to documented endpoints.
//!
//! The route table is always passed in explicitly. A route is documented when
//! its URI literally starts with the API prefix, it points at a concrete
//! `Controller@action` handler and it is not the documentation endpoint itself.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of the host application's route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    /// Route URI without the leading `/` (e.g. `api/v2/users/{id}`)
    pub uri: String,
    /// Declared HTTP verbs, upper or lower case (e.g. `["GET", "HEAD"]`)
    pub methods: Vec<String>,
    /// Handler identifier in `Controller@action` form; closures have none
    #[serde(default)]
    pub action: Option<String>,
}

impl RouteRecord {
    pub fn new(uri: &str, methods: &[&str], action: Option<&str>) -> Self {
        Self {
            uri: uri.to_string(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
            action: action.map(str::to_string),
        }
    }
}

/// HTTP methods that can appear in a Swagger path item.
///
/// `HEAD` has no variant; the router registers it alongside every `GET`
/// and it is never documented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl HttpMethod {
    /// Parse a verb case-insensitively. Returns `None` for `HEAD` and
    /// anything unknown.
    pub fn parse(verb: &str) -> Option<Self> {
        match verb.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "patch" => Some(HttpMethod::Patch),
            "delete" => Some(HttpMethod::Delete),
            "options" => Some(HttpMethod::Options),
            _ => None,
        }
    }

    /// Lower-case name, as used for Swagger path item keys
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A documented route, normalized for one generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// Path prefixed with `/` (e.g. `/api/v2/users/{id}`)
    pub path: String,
    pub http_method: HttpMethod,
    /// Controller part of the action identifier
    pub controller: String,
    /// Handler name part of the action identifier
    pub action: String,
    /// First path segment after the API prefix
    pub tag: String,
}

/// Filters and normalizes a route table for one API prefix.
pub struct RouteCollector {
    prefix: String,
    docs_prefix: Option<String>,
}

impl RouteCollector {
    /// Create a collector for `prefix` (e.g. `api/v2/`). The prefix is compared
    /// as a literal string, not per path segment.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            docs_prefix: None,
        }
    }

    /// Exclude every route whose URI starts with `docs_prefix`
    pub fn with_docs_prefix(mut self, docs_prefix: Option<String>) -> Self {
        self.docs_prefix = docs_prefix.filter(|p| !p.is_empty());
        self
    }

    /// Collect the documented routes, sorted by `(path, method)`.
    pub fn collect(&self, routes: &[RouteRecord]) -> Vec<RouteDescriptor> {
        debug!(
            "Collecting routes under prefix '{}' from {} entries",
            self.prefix,
            routes.len()
        );

        let mut descriptors: Vec<RouteDescriptor> =
            routes.iter().filter_map(|r| self.describe(r)).collect();

        descriptors.sort_by(|a, b| {
            (a.path.as_str(), a.http_method.as_str()).cmp(&(b.path.as_str(), b.http_method.as_str()))
        });

        debug!("Collected {} documented routes", descriptors.len());
        descriptors
    }

    fn describe(&self, route: &RouteRecord) -> Option<RouteDescriptor> {
        let uri = route.uri.trim_start_matches('/');

        let rest = uri.strip_prefix(self.prefix.as_str())?;

        let (controller, action) = match route.action.as_deref().and_then(split_action) {
            Some(parts) => parts,
            None => {
                debug!("Skipping {}: no controller action", uri);
                return None;
            }
        };

        if let Some(docs_prefix) = &self.docs_prefix {
            if uri.starts_with(docs_prefix.as_str()) {
                debug!("Skipping {}: documentation endpoint", uri);
                return None;
            }
        }

        let http_method = match primary_method(&route.methods) {
            Some(method) => method,
            None => {
                debug!("Skipping {}: no documentable method in {:?}", uri, route.methods);
                return None;
            }
        };

        let tag = rest
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string();

        Some(RouteDescriptor {
            path: format!("/{}", uri),
            http_method,
            controller: controller.to_string(),
            action: action.to_string(),
            tag,
        })
    }
}

/// Split `Controller@action`; both halves must be non-empty.
fn split_action(action: &str) -> Option<(&str, &str)> {
    let (controller, method) = action.split_once('@')?;
    if controller.is_empty() || method.is_empty() {
        return None;
    }
    Some((controller, method))
}

/// First declared verb once `HEAD` is removed
fn primary_method(methods: &[String]) -> Option<HttpMethod> {
    methods
        .iter()
        .find(|m| !m.eq_ignore_ascii_case("HEAD"))
        .and_then(|m| HttpMethod::parse(m))
}
