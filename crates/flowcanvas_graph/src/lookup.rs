// SPDX-License-Identifier: MIT OR Apache-2.0
//! Asynchronous node lookup over the event bus.

use crate::events::{
    NodeLookupRequest, NodeLookupResponse, RequestId, GET_NODE_BY_ID_REQUEST,
    GET_NODE_BY_ID_RESPONSE,
};
use crate::node::{Node, NodeId};
use flowcanvas_events::EventBus;
use std::cell::RefCell;
use std::time::Duration;
use tokio::sync::oneshot;

/// How long [`get_node_by_id`] waits for a response
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Error from [`get_node_by_id`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// Nobody answered in time
    #[error("Timeout waiting for node {id} after {after:?}")]
    Timeout {
        /// Node that was requested
        id: NodeId,
        /// Time waited
        after: Duration,
    },

    /// The response listener was removed from the bus before an answer arrived
    #[error("Lookup of node {0} was abandoned")]
    Abandoned(NodeId),
}

/// Ask whoever owns the canvas for a node.
///
/// Emits a request with a fresh request ID and resolves with the first
/// response carrying that ID. Responses for other requests are ignored.
/// The response listener is removed whatever the outcome.
pub async fn get_node_by_id(bus: &EventBus, id: NodeId) -> Result<Option<Node>, LookupError> {
    let request_id = RequestId::new();
    let (sender, receiver) = oneshot::channel();
    let sender = RefCell::new(Some(sender));

    let expected = request_id.clone();
    let _guard = bus
        .subscribe(
            &GET_NODE_BY_ID_RESPONSE,
            move |response: &NodeLookupResponse| {
                if response.request_id != expected {
                    return Ok(());
                }
                if let Some(sender) = sender.borrow_mut().take() {
                    // Receiver gone means the lookup already finished
                    let _ = sender.send(response.node.clone());
                }
                Ok(())
            },
        )
        .into_scoped();

    tracing::trace!(node_id = %id, %request_id, "Requesting node");
    bus.emit(
        &GET_NODE_BY_ID_REQUEST,
        NodeLookupRequest {
            id: id.clone(),
            request_id,
        },
    );

    match tokio::time::timeout(LOOKUP_TIMEOUT, receiver).await {
        Ok(Ok(node)) => Ok(node),
        Ok(Err(_)) => Err(LookupError::Abandoned(id)),
        Err(_) => {
            tracing::warn!(node_id = %id, "Node lookup timed out");
            Err(LookupError::Timeout {
                id,
                after: LOOKUP_TIMEOUT,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Pos2, Vec2};
    use flowcanvas_events::Subscription;

    fn responder(bus: &EventBus, nodes: Vec<Node>, send_decoy: bool) -> Subscription {
        let weak = bus.downgrade();
        bus.subscribe(&GET_NODE_BY_ID_REQUEST, move |request: &NodeLookupRequest| {
            let Some(bus) = weak.upgrade() else {
                return Ok(());
            };
            if send_decoy {
                bus.emit(
                    &GET_NODE_BY_ID_RESPONSE,
                    NodeLookupResponse {
                        node: None,
                        request_id: RequestId("someone-else".to_owned()),
                    },
                );
            }
            bus.emit(
                &GET_NODE_BY_ID_RESPONSE,
                NodeLookupResponse {
                    node: nodes.iter().find(|n| n.id == request.id).cloned(),
                    request_id: request.request_id.clone(),
                },
            );
            Ok(())
        })
    }

    #[tokio::test]
    async fn test_lookup_resolves_matching_response() {
        let bus = EventBus::new();
        let node = Node::new("A", Pos2::ZERO, Vec2::new(10.0, 10.0)).with_id("a");
        let _responder = responder(&bus, vec![node.clone()], false);

        let found = get_node_by_id(&bus, NodeId::from("a")).await;
        assert_eq!(found, Ok(Some(node)));
        let missing = get_node_by_id(&bus, NodeId::from("zzz")).await;
        assert_eq!(missing, Ok(None));
        assert_eq!(bus.listener_count(&GET_NODE_BY_ID_RESPONSE), 0);
    }

    #[tokio::test]
    async fn test_lookup_ignores_other_request_ids() {
        let bus = EventBus::new();
        let node = Node::new("A", Pos2::ZERO, Vec2::new(10.0, 10.0)).with_id("a");
        let _responder = responder(&bus, vec![node.clone()], true);

        let found = get_node_by_id(&bus, NodeId::from("a")).await;
        assert_eq!(found, Ok(Some(node)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_times_out_without_responder() {
        let bus = EventBus::new();
        let started = tokio::time::Instant::now();

        let result = get_node_by_id(&bus, NodeId::from("a")).await;

        assert_eq!(
            result,
            Err(LookupError::Timeout {
                id: NodeId::from("a"),
                after: LOOKUP_TIMEOUT
            })
        );
        assert!(started.elapsed() >= LOOKUP_TIMEOUT);
        assert!(!bus.has_listeners(&GET_NODE_BY_ID_RESPONSE));
    }

    #[tokio::test]
    async fn test_lookup_abandoned_when_bus_cleared() {
        let bus = EventBus::new();
        let weak = bus.downgrade();
        let _clearer = bus.subscribe(&GET_NODE_BY_ID_REQUEST, move |_: &NodeLookupRequest| {
            if let Some(bus) = weak.upgrade() {
                bus.clear(&GET_NODE_BY_ID_RESPONSE);
            }
            Ok(())
        });

        assert_eq!(
            get_node_by_id(&bus, NodeId::from("a")).await,
            Err(LookupError::Abandoned(NodeId::from("a")))
        );
    }
}
