// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequence ordering of nodes.

use crate::node::{Node, NodeId};

/// Order used for nodes without one
pub const DEFAULT_ORDER: u32 = 0;

fn order_of(node: &Node) -> u32 {
    node.order.unwrap_or(DEFAULT_ORDER)
}

/// One-based order for a zero-based list position, saturating at `u32::MAX`
fn sequence_number(position: usize) -> u32 {
    u32::try_from(position.saturating_add(1)).unwrap_or(u32::MAX)
}

/// Sort nodes by `order`. Nodes without an order sort as [`DEFAULT_ORDER`];
/// ties keep their input order.
pub fn sort_by_order(nodes: &[Node]) -> Vec<Node> {
    let mut sorted = nodes.to_vec();
    sorted.sort_by_key(order_of);
    sorted
}

/// Number nodes `1..=n` in their current list order
pub fn assign_sequential_order(nodes: &[Node]) -> Vec<Node> {
    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| Node {
            order: Some(sequence_number(index)),
            ..node.clone()
        })
        .collect()
}

/// Sort nodes by order and renumber them, offset by the sorted position of
/// `start_id`: the node at sorted index `i` gets order `start + i + 1`.
///
/// An unknown `start_id` returns the input unchanged.
pub fn reorder_from(nodes: &[Node], start_id: &NodeId) -> Vec<Node> {
    let sorted = sort_by_order(nodes);
    let Some(start) = sorted.iter().position(|n| n.id == *start_id) else {
        return nodes.to_vec();
    };

    sorted
        .into_iter()
        .enumerate()
        .map(|(index, node)| Node {
            order: Some(sequence_number(start + index)),
            ..node
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Pos2, Vec2};

    fn node(id: &str, order: Option<u32>) -> Node {
        let node = Node::new(id, Pos2::ZERO, Vec2::new(10.0, 10.0)).with_id(id);
        match order {
            Some(order) => node.with_order(order),
            None => node,
        }
    }

    fn ids(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_sort_by_order_is_stable() {
        let nodes = vec![
            node("c", Some(3)),
            node("none1", None),
            node("a", Some(1)),
            node("zero", Some(0)),
            node("none2", None),
        ];
        let sorted = sort_by_order(&nodes);
        assert_eq!(ids(&sorted), vec!["none1", "zero", "none2", "a", "c"]);
        // Input untouched
        assert_eq!(nodes[0].id.as_str(), "c");
    }

    #[test]
    fn test_assign_sequential_order() {
        let nodes = vec![node("x", Some(9)), node("y", None), node("z", Some(1))];
        let ordered = assign_sequential_order(&nodes);
        let orders: Vec<_> = ordered.iter().map(|n| n.order).collect();
        assert_eq!(orders, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(ids(&ordered), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_reorder_from() {
        let nodes = vec![node("b", Some(2)), node("a", Some(1)), node("c", Some(3))];
        let reordered = reorder_from(&nodes, &NodeId::from("b"));
        assert_eq!(ids(&reordered), vec!["a", "b", "c"]);
        let orders: Vec<_> = reordered.iter().map(|n| n.order).collect();
        assert_eq!(orders, vec![Some(2), Some(3), Some(4)]);

        let unchanged = reorder_from(&nodes, &NodeId::from("missing"));
        assert_eq!(unchanged, nodes);
    }

    #[test]
    fn test_sequence_number_saturates() {
        assert_eq!(sequence_number(0), 1);
        assert_eq!(sequence_number(41), 42);
        assert_eq!(sequence_number(u32::MAX as usize), u32::MAX);
        assert_eq!(sequence_number(usize::MAX), u32::MAX);
    }
}
