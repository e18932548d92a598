//! Rich HTML emitter (`API-DOCUMENTATION.html`)
//!
//! Fixed layout: hero header, server info grid, table of contents, one
//! anchored section per tag, one card per endpoint with a method pill
//! colored by verb, URL strip, tags, parameter table, cURL block and
//! captured samples.

use crate::docs::synthesizer::SynthesisSettings;
use crate::docs::{curl, group_by_tag, tag_anchor};
use crate::inventory::RouteDescriptor;
use serde_json::Value;

const STYLESHEET: &str = "\
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background: #f5f7fa; color: #333; line-height: 1.6; }
        .container { max-width: 1200px; margin: 0 auto; padding: 20px; }
        .header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 40px; border-radius: 10px; margin-bottom: 30px; box-shadow: 0 10px 30px rgba(0,0,0,0.1); }
        .header h1 { font-size: 2.5em; margin-bottom: 10px; }
        .header .version { font-size: 1.2em; opacity: 0.9; }
        .server-info { background: white; padding: 25px; border-radius: 10px; margin-bottom: 30px; box-shadow: 0 2px 10px rgba(0,0,0,0.05); }
        .server-info h2 { color: #667eea; margin-bottom: 15px; }
        .server-info .info-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(250px, 1fr)); gap: 15px; }
        .info-item { padding: 10px; background: #f8f9fa; border-radius: 5px; }
        .info-item label { font-weight: bold; color: #666; display: block; margin-bottom: 5px; }
        .info-item code { background: #e9ecef; padding: 5px 10px; border-radius: 3px; display: inline-block; }
        .endpoint { background: white; padding: 25px; margin-bottom: 20px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.05); border-left: 4px solid #667eea; }
        .endpoint-header { display: flex; align-items: center; margin-bottom: 15px; }
        .method { display: inline-block; padding: 8px 15px; border-radius: 5px; color: white; font-weight: bold; margin-right: 15px; font-size: 0.9em; }
        .GET { background: #61affe; }
        .POST { background: #49cc90; }
        .PUT { background: #fca130; }
        .DELETE { background: #f93e3e; }
        .PATCH { background: #50e3c2; }
        .endpoint-path { font-size: 1.3em; font-weight: 600; color: #2c3e50; }
        .endpoint-url { background: #f8f9fa; padding: 10px 15px; border-radius: 5px; font-family: 'Courier New', monospace; font-size: 0.9em; margin: 10px 0; word-break: break-all; }
        .description { color: #666; margin: 15px 0; }
        .tags { margin: 10px 0; }
        .tag { background: #e3f2fd; color: #1976d2; padding: 5px 12px; border-radius: 15px; margin-right: 8px; font-size: 0.85em; display: inline-block; }
        .parameters { margin-top: 20px; }
        .parameters h4 { color: #667eea; margin-bottom: 10px; }
        .param-table { width: 100%; border-collapse: collapse; margin-top: 10px; }
        .param-table th { background: #f8f9fa; padding: 12px; text-align: left; font-weight: 600; border-bottom: 2px solid #dee2e6; }
        .param-table td { padding: 12px; border-bottom: 1px solid #dee2e6; }
        .param-table tr:hover { background: #f8f9fa; }
        .required { color: #f93e3e; font-weight: bold; }
        .curl-section { margin-top: 20px; }
        .curl-section h4 { color: #667eea; margin-bottom: 10px; }
        .curl-code { background: #2d2d2d; color: #f8f8f2; padding: 15px; border-radius: 5px; font-family: 'Courier New', monospace; font-size: 0.9em; overflow-x: auto; }
        .samples { margin-top: 20px; }
        .sample-section h4 { color: #667eea; margin: 15px 0 10px 0; }
        .sample-code { background: #f8f9fa; padding: 15px; border-radius: 5px; font-family: 'Courier New', monospace; font-size: 0.9em; overflow-x: auto; }
        .section-title { color: #667eea; font-size: 2em; margin: 40px 0 20px 0; padding-bottom: 10px; border-bottom: 3px solid #667eea; }
        .toc { background: white; padding: 25px; border-radius: 10px; margin-bottom: 30px; box-shadow: 0 2px 10px rgba(0,0,0,0.05); }
        .toc h2 { color: #667eea; margin-bottom: 15px; }
        .toc ul { list-style: none; }
        .toc li { padding: 8px 0; }
        .toc a { color: #667eea; text-decoration: none; transition: all 0.3s; }
        .toc a:hover { color: #764ba2; padding-left: 10px; }
";

pub fn render(
    settings: &SynthesisSettings,
    routes: &[RouteDescriptor],
    generated_at: &str,
) -> String {
    let base_url = settings.base_url();
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str("    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str(&format!(
        "    <title>{} - API Documentation</title>\n",
        settings.application_name
    ));
    html.push_str("    <style>\n");
    html.push_str(STYLESHEET);
    html.push_str("    </style>\n");
    html.push_str("</head>\n<body>\n");
    html.push_str("    <div class=\"container\">\n");

    // Hero header
    html.push_str("        <div class=\"header\">\n");
    html.push_str(&format!(
        "            <h1>{}</h1>\n",
        settings.application_name
    ));
    html.push_str(&format!(
        "            <div class=\"version\">Version: {}</div>\n",
        settings.api_version
    ));
    html.push_str(&format!(
        "            <div class=\"version\">{}</div>\n",
        settings.api_description
    ));
    html.push_str(&format!(
        "            <div class=\"version\">Generated: {}</div>\n",
        generated_at
    ));
    html.push_str("        </div>\n");

    // Server info grid
    html.push_str("        <div class=\"server-info\">\n");
    html.push_str("            <h2>Server Information</h2>\n");
    html.push_str("            <div class=\"info-grid\">\n");
    html.push_str(&format!(
        "                <div class=\"info-item\"><label>Base URL</label><code>{}</code></div>\n",
        base_url
    ));
    html.push_str(&format!(
        "                <div class=\"info-item\"><label>Port</label><code>{}</code></div>\n",
        settings.server_port
    ));
    html.push_str(&format!(
        "                <div class=\"info-item\"><label>Context Path</label><code>{}</code></div>\n",
        settings.context_path_display()
    ));
    html.push_str(&format!(
        "                <div class=\"info-item\"><label>Total Endpoints</label><code>{}</code></div>\n",
        routes.len()
    ));
    html.push_str("            </div>\n");
    html.push_str("        </div>\n");

    let groups = group_by_tag(routes);

    // Table of contents
    html.push_str("        <div class=\"toc\">\n");
    html.push_str("            <h2>Table of Contents</h2>\n");
    html.push_str("            <ul>\n");
    for (tag, _) in &groups {
        html.push_str(&format!(
            "                <li><a href=\"#{}\">{}</a></li>\n",
            tag_anchor(tag),
            tag
        ));
    }
    html.push_str("            </ul>\n");
    html.push_str("        </div>\n");

    for (tag, endpoints) in &groups {
        html.push_str(&format!(
            "        <h2 class=\"section-title\" id=\"{}\">{}</h2>\n",
            tag_anchor(tag),
            tag
        ));

        for endpoint in endpoints {
            html.push_str("        <div class=\"endpoint\">\n");
            html.push_str("            <div class=\"endpoint-header\">\n");
            html.push_str(&format!(
                "                <span class=\"method {m}\">{m}</span>\n",
                m = endpoint.method
            ));
            html.push_str(&format!(
                "                <span class=\"endpoint-path\">{}</span>\n",
                endpoint.path
            ));
            html.push_str("            </div>\n");

            if !endpoint.description.is_empty() {
                html.push_str(&format!(
                    "            <div class=\"description\">{}</div>\n",
                    endpoint.description
                ));
            }

            html.push_str(&format!(
                "            <div class=\"endpoint-url\">{}{}</div>\n",
                base_url, endpoint.path
            ));

            if !endpoint.tags.is_empty() {
                html.push_str("            <div class=\"tags\">\n");
                for t in &endpoint.tags {
                    html.push_str(&format!(
                        "                <span class=\"tag\">{}</span>\n",
                        t
                    ));
                }
                html.push_str("            </div>\n");
            }

            if !endpoint.parameters.is_empty() {
                html.push_str("            <div class=\"parameters\">\n");
                html.push_str("                <h4>Parameters</h4>\n");
                html.push_str("                <table class=\"param-table\">\n");
                html.push_str("                    <thead><tr><th>Name</th><th>Type</th><th>Location</th><th>Required</th><th>Description</th></tr></thead>\n");
                html.push_str("                    <tbody>\n");
                for param in &endpoint.parameters {
                    html.push_str("                        <tr>\n");
                    html.push_str(&format!(
                        "                            <td><strong>{}</strong></td>\n",
                        param.name
                    ));
                    html.push_str(&format!(
                        "                            <td>{}</td>\n",
                        param.type_name
                    ));
                    html.push_str(&format!(
                        "                            <td>{}</td>\n",
                        param.location.as_str()
                    ));
                    html.push_str(&format!(
                        "                            <td>{}</td>\n",
                        if param.required {
                            "<span class=\"required\">Yes</span>"
                        } else {
                            "No"
                        }
                    ));
                    html.push_str(&format!(
                        "                            <td>{}</td>\n",
                        if param.description.is_empty() {
                            "-"
                        } else {
                            &param.description
                        }
                    ));
                    html.push_str("                        </tr>\n");
                }
                html.push_str("                    </tbody>\n");
                html.push_str("                </table>\n");
                html.push_str("            </div>\n");
            }

            html.push_str("            <div class=\"curl-section\">\n");
            html.push_str("                <h4>cURL Example</h4>\n");
            html.push_str(&format!(
                "                <div class=\"curl-code\">{}</div>\n",
                curl::curl_example(&base_url, endpoint)
            ));
            html.push_str("            </div>\n");

            if let Some(exchange) = &endpoint.last_exchange {
                html.push_str("            <div class=\"samples\">\n");

                html.push_str("                <div class=\"sample-section\">\n");
                html.push_str("                    <h4>Sample Request</h4>\n");
                html.push_str(&format!(
                    "                    <pre class=\"sample-code\">{}</pre>\n",
                    pretty(exchange.request_body.as_ref())
                ));
                html.push_str("                </div>\n");

                html.push_str("                <div class=\"sample-section\">\n");
                html.push_str("                    <h4>Sample Headers</h4>\n");
                html.push_str(&format!(
                    "                    <pre class=\"sample-code\">{}</pre>\n",
                    serde_json::to_string_pretty(&exchange.request_headers)
                        .unwrap_or_else(|_| "{}".to_string())
                ));
                html.push_str("                </div>\n");

                html.push_str("                <div class=\"sample-section\">\n");
                html.push_str("                    <h4>Sample Response</h4>\n");
                html.push_str(&format!(
                    "                    <pre class=\"sample-code\">{}</pre>\n",
                    pretty(exchange.response_body.as_ref())
                ));
                html.push_str("                </div>\n");

                html.push_str("            </div>\n");
            }

            html.push_str("        </div>\n");
        }
    }

    html.push_str("    </div>\n");
    html.push_str("</body>\n</html>");
    html
}

fn pretty(body: Option<&Value>) -> String {
    match body {
        None => "null".to_string(),
        Some(v) => serde_json::to_string_pretty(v).unwrap_or_else(|_| "null".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::ParamDescriptor;

    fn settings() -> SynthesisSettings {
        SynthesisSettings {
            application_name: "demo-app".to_string(),
            api_version: "1.0.0".to_string(),
            api_description: "API Documentation".to_string(),
            server_port: 8080,
            context_path: String::new(),
        }
    }

    #[test]
    fn test_render_fixed_layout() {
        let routes = vec![RouteDescriptor::new("GET", "/api/users/{id}", "get_user")
            .describe("Get user by ID")
            .tags(&["User Management"])
            .param(ParamDescriptor::path("id", "u64").describe("User ID"))];

        let html = render(&settings(), &routes, "2024-01-01 10:00:00");

        assert!(html.contains("<title>demo-app - API Documentation</title>"));
        assert!(html.contains("class=\"header\""));
        assert!(html.contains("class=\"info-grid\""));
        assert!(html.contains("id=\"user-management\""));
        assert!(html.contains("<span class=\"method GET\">GET</span>"));
        assert!(html.contains("class=\"param-table\""));
        assert!(html.contains("<span class=\"required\">Yes</span>"));
        assert!(html.contains("class=\"curl-code\""));
        // no sample captured, no samples section
        assert!(!html.contains("class=\"samples\""));
    }

    #[test]
    fn test_samples_section_when_exchange_present() {
        let mut route = RouteDescriptor::new("POST", "/api/echo", "echo");
        route.last_exchange = Some(crate::capture::record::ExchangeRecord {
            id: uuid::Uuid::new_v4(),
            endpoint: "/api/echo".to_string(),
            method: "POST".to_string(),
            request_body: Some(serde_json::json!({"x": 1})),
            request_headers: Default::default(),
            query_params: Default::default(),
            path_variables: Default::default(),
            response_body: Some(serde_json::json!({"ok": true})),
            status_code: 200,
            timestamp: chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            execution_time: 1,
            client_ip: "127.0.0.1".to_string(),
        });

        let html = render(&settings(), &[route], "2024-01-01 10:00:00");
        assert!(html.contains("<h4>Sample Request</h4>"));
        assert!(html.contains("<h4>Sample Headers</h4>"));
        assert!(html.contains("<h4>Sample Response</h4>"));
        assert!(html.contains("\"ok\": true"));
    }
}
