// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canvas interaction engine.

use super::zoom::{self, ZoomDirection};
use super::{pan, ConnectionDrag, ConnectionPreview, HitTarget, NodeDrag, PanDrag};
use super::{PointerButton, PointerEvent, WheelEvent};
use crate::config::{CanvasConfig, ConfigError, ZoomConfig};
use crate::connection::{Connection, ConnectionId};
use crate::events::{self, NodeLookupRequest, NodeLookupResponse};
use crate::node::{ConnectorSide, Node, NodeId};
use crate::palette::{self, DefaultNodeFactory, DropPayload, NodeFactory};
use crate::scene::Scene;
use crate::transform::ViewTransform;
use egui::{Pos2, Vec2};
use flowcanvas_events::{EventBus, ListenerError, Subscription, Topic};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Viewport size assumed until the host reports one
pub const DEFAULT_VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

/// Session state owned by the engine
#[derive(Debug)]
struct CanvasState {
    scene: Scene,
    view: ViewTransform,
    config: CanvasConfig,
    viewport: Vec2,
    node_drag: NodeDrag,
    connection_drag: ConnectionDrag,
    pan: PanDrag,
}

/// Bus event produced while the state is borrowed, published afterwards
#[derive(Debug)]
enum Emission {
    NodeAdded(Node),
    NodeUpdated(Node),
    NodeRemoved(Node),
    ConnectionCreated(Connection),
    ConnectionDeleted(Connection),
    ZoomChanged(f32),
    ViewChanged(ViewTransform),
    LookupResponse(NodeLookupResponse),
}

#[derive(Debug, Default)]
struct Outbox(Vec<Emission>);

impl Outbox {
    fn push(&mut self, emission: Emission) {
        self.0.push(emission);
    }

    /// Announce a zoom or pan: the level on `zoom:changed`, the full
    /// transform on `view:changed`
    fn view_changed(&mut self, view: ViewTransform) {
        self.push(Emission::ZoomChanged(view.zoom_level));
        self.push(Emission::ViewChanged(view));
    }

    fn publish(self, bus: &EventBus) {
        for emission in self.0 {
            match emission {
                Emission::NodeAdded(node) => bus.emit(&events::NODE_ADDED, node),
                Emission::NodeUpdated(node) => bus.emit(&events::NODE_UPDATED, node),
                Emission::NodeRemoved(node) => bus.emit(&events::NODE_REMOVED, node),
                Emission::ConnectionCreated(c) => bus.emit(&events::CONNECTION_CREATED, c),
                Emission::ConnectionDeleted(c) => bus.emit(&events::CONNECTION_DELETED, c),
                Emission::ZoomChanged(level) => bus.emit(&events::ZOOM_CHANGED, level),
                Emission::ViewChanged(view) => bus.emit(&events::VIEW_CHANGED, view),
                Emission::LookupResponse(response) => {
                    bus.emit(&events::GET_NODE_BY_ID_RESPONSE, response);
                }
            }
        }
    }
}

impl CanvasState {
    fn new(config: CanvasConfig) -> Self {
        Self {
            scene: Scene::new(),
            view: ViewTransform::new(config.zoom.initial_zoom, Vec2::ZERO),
            config,
            viewport: DEFAULT_VIEWPORT,
            node_drag: NodeDrag::Idle,
            connection_drag: ConnectionDrag::Idle,
            pan: PanDrag::Idle,
        }
    }

    fn gesture_active(&self) -> bool {
        self.node_drag.is_active() || self.connection_drag.is_pending() || self.pan.is_active()
    }

    fn hit_test(&self, screen: Pos2) -> HitTarget {
        // Pick radii are constant on screen
        let zoom = self.view.zoom_level;
        self.scene.hit_test(
            self.view.to_world(screen),
            self.config.connector_hit_radius / zoom,
            self.config.delete_handle_radius / zoom,
        )
    }

    fn pointer_down(&mut self, event: &PointerEvent, out: &mut Outbox) {
        if self.gesture_active() {
            tracing::debug!("Pointer down ignored, gesture in progress");
            return;
        }
        if PanDrag::qualifies(event, self.config.pan_modifier) {
            self.pan = PanDrag::begin(event.position);
            return;
        }
        if event.button != PointerButton::Primary {
            return;
        }

        let world = self.view.to_world(event.position);
        match &event.target {
            HitTarget::DeleteHandle(id) => {
                self.delete_connection(id, out);
            }
            HitTarget::Connector { .. } => {
                self.connection_drag = ConnectionDrag::begin(&self.scene, &event.target);
            }
            HitTarget::NodeBody(id) => {
                if let Some(node) = self.scene.node(id) {
                    self.node_drag = NodeDrag::begin(node, world);
                }
            }
            HitTarget::Canvas => {}
        }
    }

    fn pointer_move(&mut self, screen: Pos2, out: &mut Outbox) {
        // Converted per sample, the view may have changed mid-gesture
        let world = self.view.to_world(screen);

        if let Some((id, position)) = self.node_drag.target_position(world) {
            self.scene.move_node(id, position);
        }
        self.connection_drag.update(world);
        if self.pan.update(&mut self.view, screen) {
            out.view_changed(self.view);
        }
    }

    fn pointer_up(&mut self, target: &HitTarget, out: &mut Outbox) {
        self.finish_node_drag(out);
        if let Some(connection) = self.connection_drag.release(&mut self.scene, target) {
            tracing::debug!(
                source = %connection.source_node_id,
                target = %connection.target_node_id,
                "Connection created"
            );
            out.push(Emission::ConnectionCreated(connection));
        }
        self.pan.end();
    }

    fn pointer_leave(&mut self, out: &mut Outbox) {
        self.finish_node_drag(out);
        self.connection_drag.cancel();
        self.pan.end();
    }

    fn finish_node_drag(&mut self, out: &mut Outbox) {
        let Some(id) = self.node_drag.finish() else {
            return;
        };
        if let Some(node) = self.scene.node(&id) {
            out.push(Emission::NodeUpdated(node.clone()));
        }
    }

    fn wheel(&mut self, event: &WheelEvent, out: &mut Outbox) {
        if event.is_zoom() {
            let target = zoom::wheel_zoom_target(
                self.view.zoom_level,
                event.delta.y,
                self.config.wheel_zoom_sensitivity,
                &self.config.zoom,
            );
            self.zoom_to(target, event.position, out);
        } else {
            pan::wheel_pan(&mut self.view, event.delta);
            out.view_changed(self.view);
        }
    }

    fn zoom_to(&mut self, level: f32, anchor: Pos2, out: &mut Outbox) {
        self.view.zoom_around(level, anchor, &self.config.zoom);
        out.view_changed(self.view);
    }

    fn zoom_step(&mut self, direction: ZoomDirection, out: &mut Outbox) {
        let target = zoom::step_target(self.view.zoom_level, direction, &self.config.zoom);
        self.zoom_to(target, Pos2::ZERO, out);
    }

    fn reset_view(&mut self, out: &mut Outbox) {
        self.view = zoom::reset_view(self.scene.nodes(), self.viewport, &self.config.zoom);
        out.view_changed(self.view);
    }

    fn set_zoom_config(
        &mut self,
        config: ZoomConfig,
        out: &mut Outbox,
    ) -> Result<(), ConfigError> {
        config.validate()?;
        self.config.zoom = config;
        self.view.zoom_level = config.initial_zoom;
        out.view_changed(self.view);
        Ok(())
    }

    fn delete_connection(&mut self, id: &ConnectionId, out: &mut Outbox) -> Option<Connection> {
        let removed = self.scene.disconnect(id)?;
        out.push(Emission::ConnectionDeleted(removed.clone()));
        Some(removed)
    }

    fn delete_node(&mut self, id: &NodeId, out: &mut Outbox) -> Option<Node> {
        if matches!(&self.node_drag, NodeDrag::Dragging { node_id, .. } if node_id == id) {
            self.node_drag = NodeDrag::Idle;
        }
        let connecting_from_node = matches!(
            &self.connection_drag,
            ConnectionDrag::Pending { origin, .. } if origin == id
        );
        if connecting_from_node {
            self.connection_drag.cancel();
        }

        let (node, connections) = self.scene.remove_node(id)?;
        for connection in connections {
            out.push(Emission::ConnectionDeleted(connection));
        }
        out.push(Emission::NodeRemoved(node.clone()));
        Some(node)
    }

    fn lookup(&self, request: &NodeLookupRequest, out: &mut Outbox) {
        out.push(Emission::LookupResponse(NodeLookupResponse {
            node: self.scene.node(&request.id).cloned(),
            request_id: request.request_id.clone(),
        }));
    }
}

/// Drives the canvas from pointer input and bus events.
///
/// The engine owns the session state. Every handler updates the state and
/// releases it before announcing the change on the bus, so bus listeners
/// are free to call back into the engine.
///
/// On creation the engine enables replay for the bulk replace topics and
/// starts listening to the canvas input topics (see [`crate::events`]);
/// dropping it stops listening.
pub struct CanvasEngine {
    state: Rc<RefCell<CanvasState>>,
    bus: EventBus,
    factory: Rc<dyn NodeFactory>,
    subscriptions: Vec<Subscription>,
}

impl fmt::Debug for CanvasEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasEngine")
            .field("state", &self.state)
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

impl CanvasEngine {
    /// Create an engine on `bus`
    pub fn new(bus: EventBus, config: CanvasConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        events::install_replay_buffers(&bus);

        let state = Rc::new(RefCell::new(CanvasState::new(config)));
        let wiring = Wiring {
            bus: &bus,
            state: &state,
        };
        let subscriptions = vec![
            wiring.listen(&events::ZOOM_WITH_POINT, |state, request, out| {
                state.zoom_to(request.zoom, Pos2::new(request.x, request.y), out);
            }),
            wiring.listen(&events::ZOOM_RESET, |state, _, out| {
                state.reset_view(out);
            }),
            wiring.listen(&events::ZOOM_CONFIG_UPDATED, |state, config, out| {
                if let Err(err) = state.set_zoom_config(*config, out) {
                    tracing::warn!(%err, "Rejected zoom configuration");
                }
            }),
            wiring.listen(&events::NODES_REPLACED, |state, nodes, _| {
                state.scene.replace_nodes(nodes.clone());
            }),
            wiring.listen(&events::CONNECTIONS_REPLACED, |state, connections, _| {
                state.scene.replace_connections(connections.clone());
            }),
            wiring.listen(&events::NODE_REPLACED, |state, node, _| {
                state.scene.upsert_node(node.clone());
            }),
            wiring.listen(&events::GET_NODE_BY_ID_REQUEST, |state, request, out| {
                state.lookup(request, out);
            }),
        ];

        tracing::debug!(listeners = subscriptions.len(), "Canvas engine ready");
        Ok(Self {
            state,
            bus,
            factory: Rc::new(DefaultNodeFactory),
            subscriptions,
        })
    }

    /// Use `factory` to decorate dropped nodes
    pub fn with_factory(mut self, factory: impl NodeFactory + 'static) -> Self {
        self.factory = Rc::new(factory);
        self
    }

    /// The bus this engine talks on
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    fn apply<R>(&self, f: impl FnOnce(&mut CanvasState, &mut Outbox) -> R) -> R {
        let mut out = Outbox::default();
        let result = {
            let mut state = self.state.borrow_mut();
            f(&mut *state, &mut out)
        };
        out.publish(&self.bus);
        result
    }

    // Queries

    /// Snapshot of the scene
    pub fn scene(&self) -> Scene {
        self.state.borrow().scene.clone()
    }

    /// Current node list
    pub fn nodes(&self) -> Rc<[Node]> {
        Rc::clone(self.state.borrow().scene.nodes())
    }

    /// Current connection list
    pub fn connections(&self) -> Rc<[Connection]> {
        Rc::clone(self.state.borrow().scene.connections())
    }

    /// Get a node by ID
    pub fn node(&self, id: &NodeId) -> Option<Node> {
        self.state.borrow().scene.node(id).cloned()
    }

    /// Current view transform
    pub fn view(&self) -> ViewTransform {
        self.state.borrow().view
    }

    /// Current zoom level
    pub fn zoom_level(&self) -> f32 {
        self.state.borrow().view.zoom_level
    }

    /// Current zoom configuration
    pub fn zoom_config(&self) -> ZoomConfig {
        self.state.borrow().config.zoom
    }

    /// Current canvas configuration
    pub fn config(&self) -> CanvasConfig {
        self.state.borrow().config.clone()
    }

    /// Current viewport size
    pub fn viewport(&self) -> Vec2 {
        self.state.borrow().viewport
    }

    /// Check if a node is being dragged
    pub fn is_dragging_node(&self) -> bool {
        self.state.borrow().node_drag.is_active()
    }

    /// Check if a connection is being dragged
    pub fn is_connecting(&self) -> bool {
        self.state.borrow().connection_drag.is_pending()
    }

    /// Check if the view is being panned
    pub fn is_panning(&self) -> bool {
        self.state.borrow().pan.is_active()
    }

    /// Preview of the connection being dragged
    pub fn connection_preview(&self) -> Option<ConnectionPreview> {
        self.state.borrow().connection_drag.preview().copied()
    }

    // Render queries

    /// SVG path of every connection whose nodes both exist
    pub fn connection_paths(&self) -> Vec<(ConnectionId, String)> {
        let state = self.state.borrow();
        state
            .scene
            .connections()
            .iter()
            .filter_map(|c| {
                let curve = state.scene.connection_curve(c)?;
                Some((c.id.clone(), curve.to_svg_path()))
            })
            .collect()
    }

    /// SVG path of the connection preview
    pub fn preview_path(&self) -> Option<String> {
        self.connection_preview().map(|p| p.path())
    }

    /// World position of a connection's delete handle
    pub fn delete_handle(&self, id: &ConnectionId) -> Option<Pos2> {
        let state = self.state.borrow();
        let connection = state.scene.connection(id)?;
        Some(state.scene.connection_curve(connection)?.midpoint())
    }

    /// What lies under a screen position
    pub fn hit_test(&self, screen: Pos2) -> HitTarget {
        self.state.borrow().hit_test(screen)
    }

    /// Primary-button event at `screen` with its target resolved
    pub fn pointer_at(&self, screen: Pos2) -> PointerEvent {
        PointerEvent::new(screen).on(self.hit_test(screen))
    }

    // Pointer input

    /// Handle a pointer press
    pub fn pointer_down(&self, event: &PointerEvent) {
        self.apply(|state, out| state.pointer_down(event, out));
    }

    /// Handle pointer movement to a screen position
    pub fn pointer_move(&self, screen: Pos2) {
        self.apply(|state, out| state.pointer_move(screen, out));
    }

    /// Handle a pointer release; `event.target` decides where a connection
    /// drag lands
    pub fn pointer_up(&self, event: &PointerEvent) {
        self.apply(|state, out| state.pointer_up(&event.target, out));
    }

    /// Handle the pointer leaving the canvas
    pub fn pointer_leave(&self) {
        self.apply(CanvasState::pointer_leave);
    }

    /// Handle a wheel event: zoom with Ctrl/Cmd, pan otherwise
    pub fn wheel(&self, event: &WheelEvent) {
        self.apply(|state, out| state.wheel(event, out));
    }

    // Commands

    /// Create a node from a palette drop at a screen position
    pub fn drop_item(&self, payload: &DropPayload, screen: Pos2) -> Option<Node> {
        let (world, size) = {
            let state = self.state.borrow();
            (state.view.to_world(screen), state.config.default_node_size)
        };
        // Factory runs without the state borrowed
        let node = palette::build_dropped_node(payload, world, size, self.factory.as_ref())?;

        self.apply(|state, out| {
            state.scene.add_node(node.clone());
            out.push(Emission::NodeAdded(node.clone()));
        });
        Some(node)
    }

    /// Delete a connection. Unknown IDs are ignored.
    pub fn delete_connection(&self, id: &ConnectionId) -> Option<Connection> {
        self.apply(|state, out| state.delete_connection(id, out))
    }

    /// Delete a node together with its connections
    pub fn delete_node(&self, id: &NodeId) -> Option<Node> {
        self.apply(|state, out| state.delete_node(id, out))
    }

    /// Zoom to `level` keeping the world point under `anchor` in place
    pub fn zoom_to(&self, level: f32, anchor: Pos2) {
        self.apply(|state, out| state.zoom_to(level, anchor, out));
    }

    /// Zoom in one step around the screen origin
    pub fn zoom_in(&self) {
        self.apply(|state, out| state.zoom_step(ZoomDirection::In, out));
    }

    /// Zoom out one step around the screen origin
    pub fn zoom_out(&self) {
        self.apply(|state, out| state.zoom_step(ZoomDirection::Out, out));
    }

    /// Centre the nodes in the viewport at the initial zoom
    pub fn reset_view(&self) {
        self.apply(CanvasState::reset_view);
    }

    /// Replace the zoom configuration and return to its initial zoom
    pub fn set_zoom_config(&self, config: ZoomConfig) -> Result<(), ConfigError> {
        self.apply(|state, out| state.set_zoom_config(config, out))
    }

    /// Report the viewport size
    pub fn set_viewport(&self, size: Vec2) {
        self.state.borrow_mut().viewport = size.max(Vec2::ZERO);
    }

    /// Replace all nodes
    pub fn replace_nodes(&self, nodes: Vec<Node>) {
        self.state.borrow_mut().scene.replace_nodes(nodes);
    }

    /// Replace all connections
    pub fn replace_connections(&self, connections: Vec<Connection>) {
        let mut state = self.state.borrow_mut();
        state.scene.replace_connections(connections);
    }

    /// Replace a node by ID, or add it
    pub fn upsert_node(&self, node: Node) {
        self.state.borrow_mut().scene.upsert_node(node);
    }

    /// Connector point of a node, in screen space
    pub fn connector_on_screen(&self, id: &NodeId, side: ConnectorSide) -> Option<Pos2> {
        let state = self.state.borrow();
        let node = state.scene.node(id)?;
        Some(state.view.to_screen(node.connector(side)))
    }
}

impl Drop for CanvasEngine {
    fn drop(&mut self) {
        for subscription in &self.subscriptions {
            subscription.unsubscribe();
        }
    }
}

/// Bus and state a set of engine listeners is attached to
struct Wiring<'a> {
    bus: &'a EventBus,
    state: &'a Rc<RefCell<CanvasState>>,
}

impl Wiring<'_> {
    /// Subscribe a state handler to `topic`.
    ///
    /// The listener holds only weak handles, so it never keeps the engine
    /// or the bus alive.
    fn listen<T: 'static>(
        &self,
        topic: &Topic<T>,
        handler: impl Fn(&mut CanvasState, &T, &mut Outbox) + 'static,
    ) -> Subscription {
        let weak_state = Rc::downgrade(self.state);
        let weak_bus = self.bus.downgrade();
        self.bus.subscribe(topic, move |payload: &T| {
            let (Some(state), Some(bus)) = (weak_state.upgrade(), weak_bus.upgrade()) else {
                return Ok(());
            };
            let mut out = Outbox::default();
            {
                let Ok(mut state) = state.try_borrow_mut() else {
                    return Err(ListenerError::rejected("canvas state is busy"));
                };
                handler(&mut *state, payload, &mut out);
            }
            out.publish(&bus);
            Ok(())
        })
    }
}
