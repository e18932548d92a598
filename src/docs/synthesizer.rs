//! The synthesis engine: joins inventory and samples, emits the artifacts

use crate::docs::{curl, html, markdown, postman};
use crate::inventory::{ParamDescriptor, RouteDescriptor, RouteRegistry};
use crate::store::ExchangeStore;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// The four artifacts one `generate()` run produces.
pub const ARTIFACT_FILES: [&str; 4] = [
    "complete-api-documentation.json",
    "API-DOCUMENTATION.md",
    "API-DOCUMENTATION.html",
    "postman-collection.json",
];

/// Application- and server-level inputs to a synthesis run.
#[derive(Debug, Clone)]
pub struct SynthesisSettings {
    pub application_name: String,
    pub api_version: String,
    pub api_description: String,
    pub server_port: u16,
    /// Empty string when the application is mounted at the root
    pub context_path: String,
}

impl SynthesisSettings {
    pub fn base_url(&self) -> String {
        format!("http://localhost:{}{}", self.server_port, self.context_path)
    }

    /// Context path as shown in the artifacts: `/` when empty.
    pub fn context_path_display(&self) -> &str {
        if self.context_path.is_empty() {
            "/"
        } else {
            &self.context_path
        }
    }
}

/// Top-level documentation model, serialized as
/// `complete-api-documentation.json` and embedded in the generate response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Documentation {
    pub application: ApplicationInfo,
    pub server: ServerInfo,
    pub api: ApiInfo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub context_path: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInfo {
    pub total_endpoints: usize,
    pub endpoints: Vec<EndpointDoc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDoc {
    pub method: String,
    pub path: String,
    pub full_url: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ParamDescriptor>>,
}

/// Emits developer-facing documentation from the route inventory and the
/// latest captured exchange per route.
pub struct DocumentationSynthesizer {
    store: Arc<ExchangeStore>,
    doc_directory: PathBuf,
    settings: SynthesisSettings,
}

impl DocumentationSynthesizer {
    /// Failure to create the doc directory is fatal at startup.
    pub fn new(
        store: Arc<ExchangeStore>,
        doc_directory: impl Into<PathBuf>,
        settings: SynthesisSettings,
    ) -> Result<Self> {
        let doc_directory = doc_directory.into();
        fs::create_dir_all(&doc_directory).with_context(|| {
            format!("failed to create doc directory {}", doc_directory.display())
        })?;
        Ok(Self {
            store,
            doc_directory,
            settings,
        })
    }

    pub fn doc_directory(&self) -> &Path {
        &self.doc_directory
    }

    /// Runs one synthesis: loads the latest sample per route, builds the
    /// documentation model, writes the four artifacts. I/O failures propagate
    /// to the operator; partial artifacts may remain on disk.
    pub fn generate(&self, registry: &RouteRegistry) -> Result<Documentation> {
        let mut routes = registry.sorted_by_path();

        // Transient enrichment on clones only; the inventory stays pristine
        for route in &mut routes {
            let endpoint = format!("{}{}", self.settings.context_path, route.path);
            route.last_exchange = self.store.load_latest(&route.method, &endpoint);
        }

        let now = chrono::Local::now();
        let generated_at = now.format("%Y-%m-%dT%H:%M:%S").to_string();
        let generated_at_human = now.format("%Y-%m-%d %H:%M:%S").to_string();

        let documentation = self.build_model(&routes, &generated_at);

        self.write_artifact(
            "complete-api-documentation.json",
            &serde_json::to_string_pretty(&documentation)?,
        )?;
        self.write_artifact(
            "API-DOCUMENTATION.md",
            &markdown::render(&self.settings, &routes, &generated_at),
        )?;
        self.write_artifact(
            "API-DOCUMENTATION.html",
            &html::render(&self.settings, &routes, &generated_at_human),
        )?;
        self.write_artifact(
            "postman-collection.json",
            &serde_json::to_string_pretty(&postman::collection(&self.settings, &routes))?,
        )?;

        info!(
            endpoints = routes.len(),
            directory = %self.doc_directory.display(),
            "Documentation generated"
        );
        Ok(documentation)
    }

    fn build_model(&self, routes: &[RouteDescriptor], generated_at: &str) -> Documentation {
        let base_url = self.settings.base_url();
        let endpoints = routes
            .iter()
            .map(|route| EndpointDoc {
                method: route.method.clone(),
                path: route.path.clone(),
                full_url: format!("{}{}", base_url, route.path),
                description: route.description.clone(),
                tags: route.tags.clone(),
                parameters: if route.parameters.is_empty() {
                    None
                } else {
                    Some(route.parameters.clone())
                },
            })
            .collect();

        Documentation {
            application: ApplicationInfo {
                name: self.settings.application_name.clone(),
                version: self.settings.api_version.clone(),
                description: self.settings.api_description.clone(),
                generated_at: generated_at.to_string(),
            },
            server: ServerInfo {
                protocol: "http".to_string(),
                host: "localhost".to_string(),
                port: self.settings.server_port,
                context_path: self.settings.context_path_display().to_string(),
                base_url,
            },
            api: ApiInfo {
                total_endpoints: routes.len(),
                endpoints,
            },
        }
    }

    fn write_artifact(&self, name: &str, content: &str) -> Result<()> {
        let path = self.doc_directory.join(name);
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    /// cURL example for one enriched route; exposed for the emitters' tests.
    pub fn curl_for(&self, route: &RouteDescriptor) -> String {
        curl::curl_example(&self.settings.base_url(), route)
    }
}
