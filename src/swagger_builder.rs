//! Assembly of the final Swagger 2.0 document: header, tags, tag group,
//! definitions and paths.

use crate::definition_registry::Schema;
use crate::io_parameter::{Parameter, Response};
use crate::route_collector::{HttpMethod, RouteDescriptor};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the single tag group listing every tag
pub const TAG_GROUP_NAME: &str = "API Endpoints";

/// Swagger document builder
pub struct SwaggerBuilder {
    host: String,
    info: Info,
    /// Unique tags in first-seen order
    tags: Vec<Tag>,
    /// Paths collection (URL path -> PathItem)
    paths: BTreeMap<String, PathItem>,
}

/// Swagger Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub version: String,
    pub title: String,
    pub description: String,
}

impl Default for Info {
    fn default() -> Self {
        Self {
            version: "v2".to_string(),
            title: "API Documentation".to_string(),
            description: "API v2 endpoints documentation".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// `x-tagGroups` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagGroup {
    pub name: String,
    pub tags: Vec<String>,
}

/// Swagger PathItem object - all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
}

impl PathItem {
    fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
        }
    }

    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
        }
    }
}

/// Swagger Operation object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub tags: Vec<String>,
    pub summary: String,
    pub description: String,
    pub parameters: Vec<Parameter>,
    /// Status code -> response
    pub responses: BTreeMap<String, Response>,
}

impl Operation {
    /// Operation for `route`; summary is the route path.
    ///
    /// Without a response the operation gets a plain 200.
    pub fn new(
        route: &RouteDescriptor,
        description: String,
        parameters: Vec<Parameter>,
        response: Option<Response>,
    ) -> Self {
        let mut responses = BTreeMap::new();
        responses.insert(
            "200".to_string(),
            response.unwrap_or_else(Response::successful),
        );

        Self {
            tags: vec![route.tag.clone()],
            summary: route.path.clone(),
            description,
            parameters,
            responses,
        }
    }
}

/// Complete Swagger 2.0 document, fields in output key order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwaggerDocument {
    pub swagger: String,
    pub host: String,
    pub schemes: Vec<String>,
    pub produces: Vec<String>,
    pub info: Info,
    pub definitions: BTreeMap<String, Schema>,
    pub tags: Vec<Tag>,
    #[serde(rename = "x-tagGroups")]
    pub tag_groups: Vec<TagGroup>,
    pub paths: BTreeMap<String, PathItem>,
}

impl SwaggerBuilder {
    /// Create a builder for `host` with default info
    pub fn new(host: impl Into<String>) -> Self {
        debug!("Initializing SwaggerBuilder");
        Self {
            host: host.into(),
            info: Info::default(),
            tags: Vec::new(),
            paths: BTreeMap::new(),
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, info: Info) -> Self {
        self.info = info;
        self
    }

    /// Add the operation of one route.
    ///
    /// A second operation for the same path and method replaces the first.
    pub fn add_operation(&mut self, route: &RouteDescriptor, operation: Operation) {
        debug!("Adding operation: {} {}", route.http_method, route.path);

        if !self.tags.iter().any(|t| t.name == route.tag) {
            self.tags.push(Tag {
                name: route.tag.clone(),
            });
        }

        let path_item = self.paths.entry(route.path.clone()).or_default();
        let slot = path_item.slot(route.http_method);
        if slot.is_some() {
            warn!(
                "Duplicate operation {} {}, keeping {}@{}",
                route.http_method, route.path, route.controller, route.action
            );
        }
        *slot = Some(operation);
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Build the final document around the definitions collected in this build
    pub fn build(self, definitions: BTreeMap<String, Schema>) -> SwaggerDocument {
        debug!(
            "Building Swagger document: {} paths, {} definitions, {} tags",
            self.paths.len(),
            definitions.len(),
            self.tags.len()
        );

        let tag_groups = vec![TagGroup {
            name: TAG_GROUP_NAME.to_string(),
            tags: self.tags.iter().map(|t| t.name.clone()).collect(),
        }];

        SwaggerDocument {
            swagger: "2.0".to_string(),
            host: self.host,
            schemes: vec!["https".to_string()],
            produces: vec!["application/json".to_string()],
            info: self.info,
            definitions,
            tags: self.tags,
            tag_groups,
            paths: self.paths,
        }
    }
}

/// Host name from an application URL: the `http://` / `https://` scheme is
/// dropped, everything else is kept.
pub fn host_from_url(url: &str) -> String {
    url.trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .to_string()
}
