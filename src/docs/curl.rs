//! cURL example generator shared by the Markdown and HTML emitters

use crate::inventory::{ParamLocation, RouteDescriptor};
use serde_json::Value;

/// Builds a deterministic cURL invocation for one endpoint, enriched from its
/// latest captured exchange when one exists.
pub fn curl_example(base_url: &str, route: &RouteDescriptor) -> String {
    let mut curl = format!("curl -X {} \\\n", route.method);

    let mut url = format!("{}{}", base_url, route.path);

    // Path variables: captured values win, then declared examples, then "1"
    let captured_vars = route
        .last_exchange
        .as_ref()
        .map(|x| &x.path_variables)
        .filter(|vars| !vars.is_empty());
    match captured_vars {
        Some(vars) => {
            for (name, value) in vars {
                url = url.replace(&format!("{{{}}}", name), value);
            }
        }
        None => {
            for param in &route.parameters {
                if param.location == ParamLocation::Path {
                    let value = if param.example.is_empty() {
                        "1"
                    } else {
                        param.example.as_str()
                    };
                    url = url.replace(&format!("{{{}}}", param.name), value);
                }
            }
        }
    }

    if let Some(exchange) = &route.last_exchange {
        if !exchange.query_params.is_empty() {
            let query: Vec<String> = exchange
                .query_params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            url.push('?');
            url.push_str(&query.join("&"));
        }
    }

    curl.push_str(&format!("  \"{}\" \\\n", url));
    curl.push_str("  -H \"Content-Type: application/json\" \\\n");
    curl.push_str("  -H \"Accept: application/json\"");

    if let Some(exchange) = &route.last_exchange {
        for (name, value) in &exchange.request_headers {
            let lower = name.to_lowercase();
            if lower != "content-type" && lower != "accept" {
                curl.push_str(&format!(" \\\n  -H \"{}: {}\"", name, value));
            }
        }
    }

    if route.method == "POST" || route.method == "PUT" {
        let body = request_body_json(route);
        curl.push_str(&format!(" \\\n  -d '{}'", body.replace('\'', "\\'")));
    }

    curl
}

/// Compact JSON body for the `-d` flag: a JSON-looking captured string is
/// re-parsed and re-serialized, a structured value is serialized, anything
/// else becomes `{}`.
fn request_body_json(route: &RouteDescriptor) -> String {
    let body = route
        .last_exchange
        .as_ref()
        .and_then(|x| x.request_body.as_ref());

    match body {
        Some(Value::String(s)) if s.trim().starts_with('{') => {
            match serde_json::from_str::<Value>(s) {
                Ok(parsed) => parsed.to_string(),
                Err(_) => "{}".to_string(),
            }
        }
        Some(Value::String(_)) | None => "{}".to_string(),
        Some(value) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::record::ExchangeRecord;
    use crate::inventory::ParamDescriptor;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn exchange(method: &str, endpoint: &str) -> ExchangeRecord {
        ExchangeRecord {
            id: Uuid::new_v4(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
            request_body: None,
            request_headers: BTreeMap::new(),
            query_params: BTreeMap::new(),
            path_variables: BTreeMap::new(),
            response_body: None,
            status_code: 200,
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            execution_time: 1,
            client_ip: "127.0.0.1".to_string(),
        }
    }

    #[test]
    fn test_get_without_sample_has_no_body() {
        let route = RouteDescriptor::new("GET", "/api/users/{id}", "get_user")
            .param(ParamDescriptor::path("id", "u64"));
        let curl = curl_example("http://localhost:8080", &route);

        assert!(curl.starts_with("curl -X GET \\\n"));
        assert!(curl.contains("\"http://localhost:8080/api/users/1\""));
        assert!(curl.contains("-H \"Content-Type: application/json\""));
        assert!(curl.contains("-H \"Accept: application/json\""));
        assert!(!curl.contains("-d"));
    }

    #[test]
    fn test_post_without_sample_ends_with_empty_object() {
        let route = RouteDescriptor::new("POST", "/api/echo", "echo");
        let curl = curl_example("http://localhost:8080", &route);
        assert!(curl.ends_with("-d '{}'"));
    }

    #[test]
    fn test_path_variables_from_sample_win() {
        let mut x = exchange("GET", "/api/users/42");
        x.path_variables.insert("id".to_string(), "42".to_string());

        let mut route = RouteDescriptor::new("GET", "/api/users/{id}", "get_user")
            .param(ParamDescriptor::path("id", "u64").example("7"));
        route.last_exchange = Some(x);

        let curl = curl_example("http://localhost:8080", &route);
        assert!(curl.contains("/api/users/42"));
    }

    #[test]
    fn test_example_fallback_when_sample_has_no_vars() {
        let route = RouteDescriptor::new("GET", "/api/users/{id}", "get_user")
            .param(ParamDescriptor::path("id", "u64").example("7"));
        let curl = curl_example("http://localhost:8080", &route);
        assert!(curl.contains("/api/users/7"));
    }

    #[test]
    fn test_query_params_and_extra_headers_from_sample() {
        let mut x = exchange("GET", "/api/users");
        x.query_params.insert("page".to_string(), "2".to_string());
        x.query_params.insert("size".to_string(), "10".to_string());
        x.request_headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        x.request_headers
            .insert("x-request-id".to_string(), "abc".to_string());

        let mut route = RouteDescriptor::new("GET", "/api/users", "list_users");
        route.last_exchange = Some(x);

        let curl = curl_example("http://localhost:8080", &route);
        assert!(curl.contains("/api/users?page=2&size=10"));
        assert!(curl.contains("-H \"x-request-id: abc\""));
        // the captured Content-Type must not be duplicated
        assert_eq!(curl.matches("Content-Type").count(), 1);
    }

    #[test]
    fn test_json_string_body_reserialized_compact() {
        let mut x = exchange("POST", "/api/echo");
        x.request_body = Some(Value::String("{ \"x\": 1 }".to_string()));
        let mut route = RouteDescriptor::new("POST", "/api/echo", "echo");
        route.last_exchange = Some(x);

        let curl = curl_example("http://localhost:8080", &route);
        assert!(curl.ends_with("-d '{\"x\":1}'"));
    }

    #[test]
    fn test_structured_body_serialized_compact() {
        let mut x = exchange("PUT", "/api/echo");
        x.request_body = Some(serde_json::json!({"x": 1}));
        let mut route = RouteDescriptor::new("PUT", "/api/echo", "echo");
        route.last_exchange = Some(x);

        let curl = curl_example("http://localhost:8080", &route);
        assert!(curl.ends_with("-d '{\"x\":1}'"));
    }

    #[test]
    fn test_single_quotes_escaped_in_body() {
        let mut x = exchange("POST", "/api/echo");
        x.request_body = Some(serde_json::json!({"name": "O'Brien"}));
        let mut route = RouteDescriptor::new("POST", "/api/echo", "echo");
        route.last_exchange = Some(x);

        let curl = curl_example("http://localhost:8080", &route);
        assert!(curl.contains("O\\'Brien"));
    }

    #[test]
    fn test_deterministic_output() {
        let route = RouteDescriptor::new("POST", "/api/echo", "echo").tags(&["demo"]);
        let a = curl_example("http://localhost:8080", &route);
        let b = curl_example("http://localhost:8080", &route);
        assert_eq!(a, b);
    }
}
