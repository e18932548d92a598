//! Built-in demo application served behind the capture middleware
//!
//! A small documented API that exercises the whole pipeline when the binary
//! runs standalone: path variables, query parameters, request and response
//! bodies all flow through capture and into the synthesized documentation.

use crate::inventory::{ApiController, ParamDescriptor, RouteDescriptor};
use axum::extract::{Path, Query};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};

/// Users demo controller, `/api/users`.
pub struct UsersController;

impl ApiController for UsersController {
    fn class_name(&self) -> &str {
        "UsersController"
    }

    fn base_path(&self) -> &str {
        "/api/users"
    }

    fn describe(&self) -> Vec<RouteDescriptor> {
        vec![
            RouteDescriptor::new("GET", "/{id}", "get_user_by_id")
                .describe("Get user by ID")
                .tags(&["users", "read"])
                .param(ParamDescriptor::path("id", "u64").describe("User ID")),
            RouteDescriptor::new("GET", "", "list_users")
                .describe("List users with paging")
                .tags(&["users", "read"])
                .param(ParamDescriptor::query("page", "u32", false).example("1"))
                .param(ParamDescriptor::query("size", "u32", false).example("20")),
        ]
    }
}

/// Echo demo controller, `/api/echo`.
pub struct EchoController;

impl ApiController for EchoController {
    fn class_name(&self) -> &str {
        "EchoController"
    }

    fn base_path(&self) -> &str {
        "/api"
    }

    fn describe(&self) -> Vec<RouteDescriptor> {
        vec![RouteDescriptor::new("POST", "/echo", "echo")
            .describe("Echo the request body")
            .tags(&["demo"])]
    }
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_size")]
    size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_size() -> u32 {
    20
}

async fn get_user_by_id(Path(id): Path<u64>) -> Json<Value> {
    Json(json!({ "id": id, "name": "John Doe" }))
}

async fn list_users(Query(paging): Query<PageQuery>) -> Json<Value> {
    let users: Vec<Value> = (0..2)
        .map(|i| {
            let id = u64::from(paging.page.saturating_sub(1) * paging.size) + i + 1;
            json!({ "id": id, "name": format!("User {}", id) })
        })
        .collect();
    Json(json!({ "page": paging.page, "size": paging.size, "users": users }))
}

async fn echo(body: Option<Json<Value>>) -> Json<Value> {
    let payload = body.map(|Json(v)| v).unwrap_or(Value::Null);
    Json(json!({ "ok": true, "echo": payload }))
}

/// The demo controllers, in scan order.
pub fn controllers() -> Vec<Box<dyn ApiController>> {
    vec![Box::new(UsersController), Box::new(EchoController)]
}

/// Axum routes for the demo application. The capture middleware is layered
/// on by the server, not here.
pub fn router() -> Router {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/:id", get(get_user_by_id))
        .route("/api/echo", post(echo))
}
