//! Curriculum path matching.
//!
//! Recognized shapes:
//!
//! ```text
//! /curriculum/{module}
//! /curriculum/{module}/lessons/{unit}
//! ```
//!
//! Query strings, fragments and a trailing slash are ignored. Anything else
//! matches nothing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PathMatch {
    pub module_id: Option<String>,
    pub unit_id: Option<String>,
}

pub fn match_path(path: &str) -> PathMatch {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    let Some(rest) = path.strip_prefix('/') else {
        return PathMatch::default();
    };
    let segments: Vec<&str> = rest.split('/').collect();

    match segments.as_slice() {
        ["curriculum", module] if !module.is_empty() => PathMatch {
            module_id: Some(module.to_string()),
            unit_id: None,
        },
        ["curriculum", module, "lessons", unit] if !module.is_empty() && !unit.is_empty() => {
            PathMatch {
                module_id: Some(module.to_string()),
                unit_id: Some(unit.to_string()),
            }
        }
        _ => PathMatch::default(),
    }
}
