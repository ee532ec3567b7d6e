//! Sensor discovery from the controller menu
//!
//! The menu served at `/user/menu` is a tree of function blocks (`fub`)
//! containing nested `object` nodes of arbitrary depth. Each node that
//! carries a `uri` becomes one entry of a flat [`SensorMap`] keyed by its
//! normalized, underscore-joined path of names.

use crate::document::{parse_document, XmlElement};
use crate::error::{MeinEtaError, Result};
use std::collections::HashMap;

/// Sensor key → device address
pub type SensorMap = HashMap<String, String>;

/// Name used for nodes without a `name` attribute
pub const UNKNOWN_NODE_NAME: &str = "unknown";

/// One node of the discovery tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuNode {
    pub name: Option<String>,
    pub uri: Option<String>,
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_uri<S: Into<String>>(mut self, uri: S) -> Self {
        self.uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: MenuNode) -> Self {
        self.children.push(child);
        self
    }

    /// Build a node and its `object` descendants from a document element
    pub fn from_element(element: &XmlElement) -> Self {
        Self {
            name: element.attr("name").map(str::to_string),
            uri: element.attr("uri").map(str::to_string),
            children: element
                .children_named("object")
                .map(MenuNode::from_element)
                .collect(),
        }
    }

    /// Key segment contributed by this node
    pub fn key_segment(&self) -> String {
        self.name
            .as_deref()
            .unwrap_or(UNKNOWN_NODE_NAME)
            .to_lowercase()
            .replace(' ', "_")
    }
}

/// Extract the function blocks from a discovery document
///
/// The document must have the shape `eta/menu/fub+`; anything else is a
/// parsing failure carrying the raw body.
pub fn parse_menu(body: &str) -> Result<Vec<MenuNode>> {
    let root = parse_document(body).map_err(|e| {
        MeinEtaError::parsing(format!("Failed to parse menu structure: {e}"), body)
    })?;

    if root.name != "eta" {
        return Err(MeinEtaError::parsing(
            format!("Failed to parse menu structure: unexpected root <{}>", root.name),
            body,
        ));
    }

    let menu = root.child("menu").ok_or_else(|| {
        MeinEtaError::parsing("Failed to parse menu structure: missing <menu>", body)
    })?;

    let blocks: Vec<MenuNode> = menu.children_named("fub").map(MenuNode::from_element).collect();
    if blocks.is_empty() {
        return Err(MeinEtaError::parsing(
            "Failed to parse menu structure: no function blocks",
            body,
        ));
    }

    Ok(blocks)
}

/// Flatten the discovery tree into sensor key → device address
///
/// Depth-first pre-order. On key collisions the node visited last wins.
pub fn flatten(blocks: &[MenuNode]) -> SensorMap {
    let mut sensors = SensorMap::new();
    collect(blocks, "", &mut sensors);
    sensors
}

fn collect(nodes: &[MenuNode], prefix: &str, sensors: &mut SensorMap) {
    for node in nodes {
        let key = format!("{prefix}_{}", node.key_segment())
            .trim_matches('_')
            .to_string();

        if let Some(uri) = node.uri.as_deref().filter(|uri| !uri.is_empty()) {
            sensors.insert(key.clone(), uri.to_string());
        }

        if !node.children.is_empty() {
            collect(&node.children, &key, sensors);
        }
    }
}
