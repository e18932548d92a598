//! Postman collection v2.1.0 emitter (`postman-collection.json`)

use crate::docs::synthesizer::SynthesisSettings;
use crate::inventory::RouteDescriptor;
use serde::Serialize;

const SCHEMA_URL: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    pub info: CollectionInfo,
    pub item: Vec<CollectionItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionInfo {
    pub name: String,
    pub description: String,
    pub schema: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionItem {
    pub name: String,
    pub request: ItemRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemRequest {
    pub method: String,
    pub url: ItemUrl,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemUrl {
    pub raw: String,
    pub protocol: String,
    pub host: Vec<String>,
    pub port: String,
    pub path: Vec<String>,
}

pub fn collection(settings: &SynthesisSettings, routes: &[RouteDescriptor]) -> Collection {
    let base_url = settings.base_url();

    let items = routes
        .iter()
        .map(|route| {
            let full_path = format!("{}{}", settings.context_path, route.path);
            let segments: Vec<String> = full_path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();

            CollectionItem {
                name: format!("{} {}", route.method, route.path),
                request: ItemRequest {
                    method: route.method.clone(),
                    url: ItemUrl {
                        raw: format!("{}{}", base_url, route.path),
                        protocol: "http".to_string(),
                        host: vec!["localhost".to_string()],
                        port: settings.server_port.to_string(),
                        path: segments,
                    },
                    description: route.description.clone(),
                },
            }
        })
        .collect();

    Collection {
        info: CollectionInfo {
            name: format!("{} API", settings.application_name),
            description: settings.api_description.clone(),
            schema: SCHEMA_URL.to_string(),
        },
        item: items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(context_path: &str) -> SynthesisSettings {
        SynthesisSettings {
            application_name: "demo-app".to_string(),
            api_version: "1.0.0".to_string(),
            api_description: "API Documentation".to_string(),
            server_port: 8080,
            context_path: context_path.to_string(),
        }
    }

    #[test]
    fn test_collection_shape() {
        let routes = vec![
            RouteDescriptor::new("GET", "/api/users/{id}", "get_user").describe("Get user"),
            RouteDescriptor::new("POST", "/api/echo", "echo"),
        ];
        let c = collection(&settings(""), &routes);

        assert_eq!(c.info.name, "demo-app API");
        assert_eq!(c.info.schema, SCHEMA_URL);
        assert_eq!(c.item.len(), 2);

        let first = &c.item[0];
        assert_eq!(first.name, "GET /api/users/{id}");
        assert_eq!(first.request.method, "GET");
        assert_eq!(
            first.request.url.raw,
            "http://localhost:8080/api/users/{id}"
        );
        assert_eq!(first.request.url.host, vec!["localhost"]);
        assert_eq!(first.request.url.port, "8080");
        assert_eq!(first.request.url.path, vec!["api", "users", "{id}"]);
        assert_eq!(first.request.description, "Get user");
    }

    #[test]
    fn test_context_path_prefixes_segments_not_name() {
        let routes = vec![RouteDescriptor::new("GET", "/api/users", "list_users")];
        let c = collection(&settings("/v1"), &routes);

        let item = &c.item[0];
        assert_eq!(item.name, "GET /api/users");
        assert_eq!(item.request.url.raw, "http://localhost:8080/v1/api/users");
        assert_eq!(item.request.url.path, vec!["v1", "api", "users"]);
    }

    #[test]
    fn test_serialized_key_order() {
        let routes = vec![RouteDescriptor::new("GET", "/api/users", "list_users")];
        let json = serde_json::to_string_pretty(&collection(&settings(""), &routes)).unwrap();

        let info_pos = json.find("\"info\"").unwrap();
        let item_pos = json.find("\"item\"").unwrap();
        assert!(info_pos < item_pos);
        assert!(json.contains("\"schema\""));
    }
}
