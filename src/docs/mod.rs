//! Documentation synthesis
//!
//! Fuses the route inventory with the latest captured exchange per route and
//! emits four artifacts under the doc directory: structured JSON, Markdown,
//! HTML, and a Postman collection. The request-serving path never touches
//! this module; synthesis runs on operator demand and its I/O failures
//! propagate to the caller.

pub mod curl;
pub mod html;
pub mod markdown;
pub mod postman;
pub mod synthesizer;

pub use synthesizer::{
    Documentation, DocumentationSynthesizer, SynthesisSettings, ARTIFACT_FILES,
};

use crate::inventory::RouteDescriptor;

/// Groups endpoints by tag over the path-sorted route list. Tag order is
/// first appearance; untagged endpoints fall under `Uncategorized`; an
/// endpoint with several tags appears under each.
pub(crate) fn group_by_tag(routes: &[RouteDescriptor]) -> Vec<(String, Vec<&RouteDescriptor>)> {
    let mut groups: Vec<(String, Vec<&RouteDescriptor>)> = Vec::new();

    for route in routes {
        let tags: Vec<String> = if route.tags.is_empty() {
            vec!["Uncategorized".to_string()]
        } else {
            route.tags.clone()
        };
        for tag in tags {
            match groups.iter_mut().find(|(t, _)| *t == tag) {
                Some((_, members)) => members.push(route),
                None => groups.push((tag, vec![route])),
            }
        }
    }

    groups
}

/// Anchor id for a tag heading: lowercase, spaces to dashes.
pub(crate) fn tag_anchor(tag: &str) -> String {
    tag.to_lowercase().replace(' ', "-")
}
