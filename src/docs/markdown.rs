//! Markdown emitter (`API-DOCUMENTATION.md`)

use crate::docs::synthesizer::SynthesisSettings;
use crate::docs::{curl, group_by_tag, tag_anchor};
use crate::inventory::RouteDescriptor;
use serde_json::Value;

pub fn render(
    settings: &SynthesisSettings,
    routes: &[RouteDescriptor],
    generated_at: &str,
) -> String {
    let base_url = settings.base_url();
    let mut md = String::new();

    md.push_str(&format!(
        "# {} - API Documentation\n\n",
        settings.application_name
    ));
    md.push_str(&format!("**Version:** {}\n\n", settings.api_version));
    md.push_str(&format!("**Generated:** {}\n\n", generated_at));
    md.push_str(&format!(
        "**Description:** {}\n\n",
        settings.api_description
    ));

    md.push_str("## Server Information\n\n");
    md.push_str(&format!("- **Base URL:** `{}`\n", base_url));
    md.push_str(&format!("- **Port:** {}\n", settings.server_port));
    md.push_str(&format!(
        "- **Context Path:** {}\n\n",
        settings.context_path_display()
    ));

    let groups = group_by_tag(routes);

    md.push_str("## Table of Contents\n\n");
    for (tag, _) in &groups {
        md.push_str(&format!("- [{}](#{})\n", tag, tag_anchor(tag)));
    }
    md.push_str("\n---\n\n");

    for (tag, endpoints) in &groups {
        md.push_str(&format!("## {}\n\n", tag));

        for endpoint in endpoints {
            md.push_str(&format!("### {} {}\n\n", endpoint.method, endpoint.path));

            if !endpoint.description.is_empty() {
                md.push_str(&format!("**Description:** {}\n\n", endpoint.description));
            }

            md.push_str(&format!(
                "**Full URL:** `{}{}`\n\n",
                base_url, endpoint.path
            ));

            if let Some(exchange) = &endpoint.last_exchange {
                if endpoint.method != "GET" {
                    md.push_str("**Sample Request:**\n```json\n");
                    md.push_str(&pretty_body(exchange.request_body.as_ref()));
                    md.push_str("\n```\n\n");
                }

                md.push_str("**Sample Headers:**\n```json\n");
                md.push_str(
                    &serde_json::to_string_pretty(&exchange.request_headers)
                        .unwrap_or_else(|_| "{}".to_string()),
                );
                md.push_str("\n```\n\n");

                if exchange.response_body.is_some() {
                    md.push_str("**Sample Response:**\n```json\n");
                    md.push_str(&pretty_body(exchange.response_body.as_ref()));
                    md.push_str("\n```\n\n");
                }
            }

            if !endpoint.parameters.is_empty() {
                md.push_str("**Parameters:**\n\n");
                md.push_str("| Name | Type | Location | Required | Description |\n");
                md.push_str("|------|------|----------|----------|-------------|\n");
                for param in &endpoint.parameters {
                    md.push_str(&format!(
                        "| {} | {} | {} | {} | {} |\n",
                        param.name,
                        param.type_name,
                        param.location.as_str(),
                        if param.required { "✓" } else { "✗" },
                        if param.description.is_empty() {
                            "-"
                        } else {
                            &param.description
                        }
                    ));
                }
                md.push('\n');
            }

            md.push_str("**cURL Example:**\n```bash\n");
            md.push_str(&curl::curl_example(&base_url, endpoint));
            md.push_str("\n```\n\n---\n\n");
        }
    }

    md
}

/// Pretty-prints a captured body; a JSON-looking captured string is expanded
/// to real JSON first.
fn pretty_body(body: Option<&Value>) -> String {
    let expanded = match body {
        Some(Value::String(s)) if s.trim().starts_with('{') => {
            serde_json::from_str::<Value>(s).unwrap_or_else(|_| Value::String(s.clone()))
        }
        Some(v) => v.clone(),
        None => Value::Null,
    };
    serde_json::to_string_pretty(&expanded).unwrap_or_else(|_| "null".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::record::ExchangeRecord;
    use crate::inventory::ParamDescriptor;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn settings() -> SynthesisSettings {
        SynthesisSettings {
            application_name: "demo-app".to_string(),
            api_version: "1.0.0".to_string(),
            api_description: "API Documentation".to_string(),
            server_port: 8080,
            context_path: String::new(),
        }
    }

    fn sample_exchange() -> ExchangeRecord {
        ExchangeRecord {
            id: Uuid::new_v4(),
            endpoint: "/api/echo".to_string(),
            method: "POST".to_string(),
            request_body: Some(serde_json::json!({"x": 1})),
            request_headers: BTreeMap::from([(
                "accept".to_string(),
                "application/json".to_string(),
            )]),
            query_params: BTreeMap::new(),
            path_variables: BTreeMap::new(),
            response_body: Some(serde_json::json!({"ok": true})),
            status_code: 200,
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            execution_time: 3,
            client_ip: "127.0.0.1".to_string(),
        }
    }

    #[test]
    fn test_render_without_sample() {
        let routes = vec![RouteDescriptor::new("POST", "/api/echo", "echo")
            .describe("Echo")
            .tags(&["demo"])];
        let md = render(&settings(), &routes, "2024-01-01T10:00:00");

        assert!(md.contains("# demo-app - API Documentation"));
        assert!(md.contains("- [demo](#demo)"));
        assert!(md.contains("## demo"));
        assert!(md.contains("### POST /api/echo"));
        assert!(md.contains("-d '{}'"));
        assert!(!md.contains("Sample Response"));
        assert!(!md.contains("Sample Request"));
    }

    #[test]
    fn test_render_with_sample_join() {
        let mut route = RouteDescriptor::new("POST", "/api/echo", "echo").tags(&["demo"]);
        route.last_exchange = Some(sample_exchange());
        let md = render(&settings(), &[route], "2024-01-01T10:00:00");

        assert!(md.contains("**Sample Request:**"));
        assert!(md.contains("\"x\": 1"));
        assert!(md.contains("**Sample Response:**"));
        assert!(md.contains("\"ok\": true"));
        assert!(md.contains("-d '{\"x\":1}'"));
    }

    #[test]
    fn test_get_sample_suppresses_request_block() {
        let mut exchange = sample_exchange();
        exchange.method = "GET".to_string();
        let mut route = RouteDescriptor::new("GET", "/api/echo", "echo");
        route.last_exchange = Some(exchange);

        let md = render(&settings(), &[route], "2024-01-01T10:00:00");
        assert!(!md.contains("Sample Request"));
        assert!(md.contains("Sample Headers"));
    }

    #[test]
    fn test_untagged_endpoint_grouped_uncategorized() {
        let routes = vec![RouteDescriptor::new("GET", "/plain", "plain")
            .param(ParamDescriptor::query("q", "String", false))];
        let md = render(&settings(), &routes, "2024-01-01T10:00:00");

        assert!(md.contains("- [Uncategorized](#uncategorized)"));
        assert!(md.contains("| q | String | query | ✗ | - |"));
    }
}
