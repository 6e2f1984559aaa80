// SPDX-License-Identifier: MIT OR Apache-2.0
//! Turning palette drops into nodes.

use crate::node::Node;
use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};

/// Data carried by a palette item dropped on the canvas
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropPayload {
    /// Node label, a drop without one is ignored
    pub label: String,
    /// Palette item code
    pub node_code: Option<String>,
    /// Icon code
    pub icon_code: Option<String>,
    /// Extra item data as a JSON string
    pub item_data: Option<String>,
}

impl DropPayload {
    /// Create a payload with just a label
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Set the node code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.node_code = Some(code.into());
        self
    }

    /// Set the item data JSON
    pub fn with_item_data(mut self, json: impl Into<String>) -> Self {
        self.item_data = Some(json.into());
        self
    }
}

/// Fills in node defaults from the palette item code.
///
/// Runs on every dropped node after its geometry, label and metadata are set.
pub trait NodeFactory {
    /// Decorate a freshly dropped node
    fn decorate(&self, node_code: Option<&str>, node: &mut Node);
}

impl<F> NodeFactory for F
where
    F: Fn(Option<&str>, &mut Node),
{
    fn decorate(&self, node_code: Option<&str>, node: &mut Node) {
        self(node_code, node);
    }
}

/// Factory that copies `status`, `order` and `iconCode` out of the item
/// data, when present
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNodeFactory;

impl NodeFactory for DefaultNodeFactory {
    fn decorate(&self, _node_code: Option<&str>, node: &mut Node) {
        let Some(data) = node.metadata.as_ref().and_then(|m| m.as_object()) else {
            return;
        };
        if let Some(status) = data.get("status").and_then(|v| v.as_str()) {
            node.status = Some(status.to_owned());
        }
        if let Some(order) = data
            .get("order")
            .and_then(serde_json::Value::as_u64)
            .and_then(|o| u32::try_from(o).ok())
        {
            node.order = Some(order);
        }
        if let Some(icon) = data.get("iconCode").and_then(|v| v.as_str()) {
            node.icon_code = Some(icon.to_owned());
        }
    }
}

/// Parse drop item data. Malformed JSON is logged and ignored.
pub fn parse_item_data(raw: Option<&str>) -> Option<serde_json::Value> {
    let raw = raw.filter(|s| !s.trim().is_empty())?;
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(%err, "Ignoring malformed drop item data");
            None
        }
    }
}

/// Build the node for a drop at `world_center`.
///
/// The node gets `size` and is centred on the drop point. Returns `None`
/// when the payload has no label.
pub fn build_dropped_node(
    payload: &DropPayload,
    world_center: Pos2,
    size: Vec2,
    factory: &dyn NodeFactory,
) -> Option<Node> {
    if payload.label.is_empty() {
        return None;
    }

    let mut node = Node::new(payload.label.clone(), world_center - size / 2.0, size);
    node.node_code.clone_from(&payload.node_code);
    node.icon_code.clone_from(&payload.icon_code);
    node.metadata = parse_item_data(payload.item_data.as_deref());

    factory.decorate(payload.node_code.as_deref(), &mut node);
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    const SIZE: Vec2 = Vec2::new(150.0, 75.0);

    fn drop_at(payload: &DropPayload, point: Pos2) -> Option<Node> {
        build_dropped_node(payload, point, SIZE, &DefaultNodeFactory)
    }

    #[test]
    fn test_drop_centres_node() {
        let payload = DropPayload::new("Task").with_code("task");
        let node = drop_at(&payload, Pos2::new(300.0, 200.0)).unwrap();
        assert_eq!(node.position, Pos2::new(225.0, 162.5));
        assert_eq!(node.size, SIZE);
        assert_eq!(node.label, "Task");
        assert_eq!(node.node_code.as_deref(), Some("task"));
        assert!(node.connected_to.is_empty());
        assert!(node.connected_from.is_empty());
    }

    #[test]
    fn test_drop_without_label_is_ignored() {
        let payload = DropPayload::default();
        assert!(drop_at(&payload, Pos2::ZERO).is_none());
    }

    #[test]
    fn test_default_factory_reads_item_data() {
        let item_data = r#"{"status":"pending","order":4,"iconCode":"eye","extra":true}"#;
        let payload = DropPayload::new("Review").with_item_data(item_data);
        let node = drop_at(&payload, Pos2::ZERO).unwrap();
        assert_eq!(node.status.as_deref(), Some("pending"));
        assert_eq!(node.order, Some(4));
        assert_eq!(node.icon_code.as_deref(), Some("eye"));
        assert_eq!(node.metadata.unwrap()["extra"], serde_json::json!(true));
    }

    #[test]
    fn test_closure_factory() {
        let factory = |code: Option<&str>, node: &mut Node| {
            if code == Some("done") {
                node.status = Some("complete".to_owned());
            }
        };
        let payload = DropPayload::new("Ship").with_code("done");
        let node = build_dropped_node(&payload, Pos2::ZERO, SIZE, &factory).unwrap();
        assert_eq!(node.status.as_deref(), Some("complete"));
    }

    #[test]
    #[traced_test]
    fn test_malformed_item_data_is_logged_and_dropped() {
        let payload = DropPayload::new("Task").with_item_data("{not json");
        let node = drop_at(&payload, Pos2::ZERO).unwrap();
        assert!(node.metadata.is_none());
        assert!(logs_contain("Ignoring malformed drop item data"));
    }
}
