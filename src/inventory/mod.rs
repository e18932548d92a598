//! Route inventory: declarative metadata for every documented endpoint
//!
//! Controllers implement [`ApiController`] to mark themselves as documented
//! and to describe their routes. [`RouteRegistry::scan`] runs once at startup
//! and folds every controller into a map keyed `METHOD:fullPath`; the result
//! is read-only afterwards and shared through an `Arc` by the server.

use crate::capture::record::ExchangeRecord;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Where a parameter is carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Query,
    Path,
    Header,
}

impl ParamLocation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Path => "path",
            Self::Header => "header",
        }
    }
}

/// Static description of one endpoint parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub name: String,
    /// Short type name, e.g. `u64` or `String`
    #[serde(rename = "type")]
    pub type_name: String,
    pub location: ParamLocation,
    pub required: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub example: String,
}

impl ParamDescriptor {
    pub fn query(name: &str, type_name: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            location: ParamLocation::Query,
            required,
            description: String::new(),
            example: String::new(),
        }
    }

    /// Path variables are always required.
    pub fn path(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            location: ParamLocation::Path,
            required: true,
            description: String::new(),
            example: String::new(),
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn example(mut self, example: &str) -> Self {
        self.example = example.to_string();
        self
    }
}

/// Static metadata for one endpoint. `path` is the full template including
/// the controller base prefix, with `{var}` segments for path variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescriptor {
    pub path: String,
    pub method: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<ParamDescriptor>,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub method_name: String,
    /// Transient enrichment attached during a synthesis run; never part of
    /// the persisted inventory snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_exchange: Option<ExchangeRecord>,
}

impl RouteDescriptor {
    pub fn new(method: &str, sub_path: &str, method_name: &str) -> Self {
        Self {
            path: sub_path.to_string(),
            method: method.to_uppercase(),
            description: String::new(),
            tags: Vec::new(),
            parameters: Vec::new(),
            class_name: String::new(),
            method_name: method_name.to_string(),
            last_exchange: None,
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn param(mut self, param: ParamDescriptor) -> Self {
        self.parameters.push(param);
        self
    }

    /// Registry key: `METHOD:fullPath`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.method, self.path)
    }
}

/// HTTP verbs the inventory scans for.
const SCANNED_METHODS: [&str; 4] = ["GET", "POST", "PUT", "DELETE"];

/// Marker for a documented controller: the scan visits every implementor and
/// collects its route descriptors.
pub trait ApiController: Send + Sync {
    /// Source-level name of the controller, recorded on each descriptor.
    fn class_name(&self) -> &str;

    /// Path template prefix shared by all routes of this controller.
    fn base_path(&self) -> &str {
        ""
    }

    /// Descriptors for this controller's routes, with paths relative to
    /// [`base_path`](Self::base_path).
    fn describe(&self) -> Vec<RouteDescriptor>;
}

/// The one-shot inventory of documented routes.
#[derive(Debug, Default, Clone)]
pub struct RouteRegistry {
    routes: BTreeMap<String, RouteDescriptor>,
}

impl RouteRegistry {
    /// Scans the given controllers and builds the inventory. Descriptors that
    /// share a key overwrite earlier ones; verbs outside GET/POST/PUT/DELETE
    /// are skipped.
    pub fn scan(controllers: &[&dyn ApiController]) -> Self {
        let mut routes = BTreeMap::new();

        for controller in controllers {
            let base = controller.base_path();
            for mut descriptor in controller.describe() {
                if !SCANNED_METHODS.contains(&descriptor.method.as_str()) {
                    warn!(
                        method = %descriptor.method,
                        path = %descriptor.path,
                        "Skipping route with unscanned verb"
                    );
                    continue;
                }
                descriptor.path = format!("{}{}", base, descriptor.path);
                descriptor.class_name = controller.class_name().to_string();
                routes.insert(descriptor.key(), descriptor);
            }
        }

        info!(total = routes.len(), "Route inventory scanned");
        Self { routes }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn get(&self, method: &str, path: &str) -> Option<&RouteDescriptor> {
        self.routes.get(&format!("{}:{}", method, path))
    }

    /// Descriptors keyed `METHOD:path`, in key order.
    pub fn entries(&self) -> &BTreeMap<String, RouteDescriptor> {
        &self.routes
    }

    /// Descriptors sorted by path ascending, cloned for enrichment.
    pub fn sorted_by_path(&self) -> Vec<RouteDescriptor> {
        let mut routes: Vec<RouteDescriptor> = self.routes.values().cloned().collect();
        routes.sort_by(|a, b| a.path.cmp(&b.path));
        routes
    }

    /// Writes the inventory snapshot under `doc_directory`: a pretty JSON
    /// file and a simple HTML index (distinct from the synthesized rich
    /// documentation).
    pub fn persist_snapshot(&self, doc_directory: &Path) -> Result<()> {
        fs::create_dir_all(doc_directory).with_context(|| {
            format!("failed to create doc directory {}", doc_directory.display())
        })?;

        let snapshot = serde_json::json!({
            "generatedAt": chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            "totalEndpoints": self.routes.len(),
            "endpoints": self.routes,
        });
        let json_path = doc_directory.join("api-documentation.json");
        fs::write(&json_path, serde_json::to_string_pretty(&snapshot)?)
            .with_context(|| format!("failed to write {}", json_path.display()))?;

        let html_path = doc_directory.join("api-documentation.html");
        fs::write(&html_path, self.render_index_html())
            .with_context(|| format!("failed to write {}", html_path.display()))?;

        Ok(())
    }

    fn render_index_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("<title>API Documentation</title>\n");
        html.push_str("<style>\n");
        html.push_str("body { font-family: Arial, sans-serif; margin: 20px; background: #f5f5f5; }\n");
        html.push_str(".endpoint { background: white; padding: 20px; margin: 10px 0; border-radius: 5px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }\n");
        html.push_str(".method { display: inline-block; padding: 5px 10px; border-radius: 3px; color: white; font-weight: bold; margin-right: 10px; }\n");
        html.push_str(".GET { background: #61affe; }\n");
        html.push_str(".POST { background: #49cc90; }\n");
        html.push_str(".PUT { background: #fca130; }\n");
        html.push_str(".DELETE { background: #f93e3e; }\n");
        html.push_str(".param { background: #f0f0f0; padding: 10px; margin: 5px 0; border-radius: 3px; }\n");
        html.push_str("h1 { color: #333; }\n");
        html.push_str(".tag { background: #e3f2fd; padding: 3px 8px; border-radius: 3px; margin: 0 5px; font-size: 12px; }\n");
        html.push_str("</style>\n</head>\n<body>\n");
        html.push_str("<h1>API Documentation</h1>\n");
        html.push_str(&format!(
            "<p>Generated: {}</p>\n",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S")
        ));
        html.push_str(&format!("<p>Total Endpoints: {}</p>\n", self.routes.len()));

        for endpoint in self.routes.values() {
            html.push_str("<div class='endpoint'>\n");
            html.push_str(&format!(
                "<div><span class='method {m}'>{m}</span><strong>{p}</strong></div>\n",
                m = endpoint.method,
                p = endpoint.path
            ));

            if !endpoint.description.is_empty() {
                html.push_str(&format!("<p>{}</p>\n", endpoint.description));
            }

            if !endpoint.tags.is_empty() {
                html.push_str("<div>Tags: ");
                for tag in &endpoint.tags {
                    html.push_str(&format!("<span class='tag'>{}</span>", tag));
                }
                html.push_str("</div>\n");
            }

            if !endpoint.parameters.is_empty() {
                html.push_str("<h4>Parameters:</h4>\n");
                for param in &endpoint.parameters {
                    html.push_str("<div class='param'>\n");
                    html.push_str(&format!(
                        "<strong>{}</strong> ({}) - {} {}",
                        param.name,
                        param.type_name,
                        param.location.as_str(),
                        if param.required {
                            "<span style='color:red;'>*required</span>"
                        } else {
                            "optional"
                        }
                    ));
                    if !param.description.is_empty() {
                        html.push_str(&format!("<br/>{}", param.description));
                    }
                    html.push_str("</div>\n");
                }
            }

            html.push_str("</div>\n");
        }

        html.push_str("</body>\n</html>");
        html
    }
}

/// Persists the inventory snapshot after a short startup delay. The registry
/// itself is already populated before the server accepts traffic.
pub fn spawn_snapshot_task(
    registry: Arc<RouteRegistry>,
    doc_directory: PathBuf,
    delay: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match registry.persist_snapshot(&doc_directory) {
            Ok(()) => info!(
                directory = %doc_directory.display(),
                "Route inventory snapshot persisted"
            ),
            Err(e) => error!(error = %e, "Failed to persist route inventory snapshot"),
        }
    })
}
