//! The scene: registry of every node, socket and edge on the canvas.
//!
//! Entities refer to each other by handle, never by pointer. A node lists the
//! handles of the sockets it owns, a socket remembers its node and the one edge
//! attached to it, and an edge remembers the socket bound on each side. All
//! operations that touch more than one entity live on [`Scene`] so both sides
//! of every link are updated together; the node, socket and edge modules each
//! contribute their part of the `Scene` API.

use std::collections::HashMap;
use std::fmt;

use crate::edge::{Edge, EdgeStyle};
use crate::error::GraphError;
use crate::node::{Node, NodeStyle};
use crate::socket::{Socket, SocketStyle};
use crate::text::{MonospaceMetrics, TextMeasure};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// Raw numeric value, e.g. for use as a Slint model id.
            pub fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

handle!(
    /// Handle of a node in a [`Scene`].
    NodeId,
    "node"
);
handle!(
    /// Handle of a socket in a [`Scene`].
    SocketId,
    "socket"
);
handle!(
    /// Handle of an edge in a [`Scene`].
    EdgeId,
    "edge"
);

/// Notifications queued by the scene for the host or a model adapter.
///
/// Drain them with [`Scene::drain_events`] after handling input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    NodeAdded(NodeId),
    NodeRemoved(NodeId),
    EdgeAdded(EdgeId),
    EdgeRemoved(EdgeId),
    /// Both sides of the edge are bound.
    EdgeConnected { edge: EdgeId, source: SocketId, sink: SocketId },
    /// A source socket stopped referencing `edge`.
    SourceDisconnected { edge: EdgeId, node: NodeId, socket: SocketId },
    /// A sink socket stopped referencing `edge`.
    SinkDisconnected { edge: EdgeId, node: NodeId, socket: SocketId },
}

/// Stacking value of unselected nodes.
pub const Z_NODE: i32 = 0;
/// Stacking value of the selected node.
pub const Z_SELECTED_NODE: i32 = 1;
/// Stacking value of edges; they sit below every node.
pub const Z_EDGE: i32 = -1;
/// Stacking value of the edge being dragged.
pub const Z_DRAGGED_EDGE: i32 = 2;

/// Registry of all nodes, sockets and edges.
pub struct Scene {
    pub(crate) nodes: HashMap<NodeId, Node>,
    pub(crate) sockets: HashMap<SocketId, Socket>,
    pub(crate) edges: HashMap<EdgeId, Edge>,
    next_id: u32,
    pub(crate) node_style: NodeStyle,
    pub(crate) socket_style: SocketStyle,
    pub(crate) edge_style: EdgeStyle,
    pub(crate) metrics: Box<dyn TextMeasure>,
    events: Vec<SceneEvent>,
    needs_repaint: bool,
    selected: Option<NodeId>,
    raised_edge: Option<EdgeId>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.nodes.len())
            .field("sockets", &self.sockets.len())
            .field("edges", &self.edges.len())
            .field("selected", &self.selected)
            .finish()
    }
}

impl Scene {
    /// Create an empty scene with default styles and [`MonospaceMetrics`].
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            sockets: HashMap::new(),
            edges: HashMap::new(),
            next_id: 1,
            node_style: NodeStyle::default(),
            socket_style: SocketStyle::default(),
            edge_style: EdgeStyle::default(),
            metrics: Box::new(MonospaceMetrics::default()),
            events: Vec::new(),
            needs_repaint: false,
            selected: None,
            raised_edge: None,
        }
    }

    /// Use `metrics` to measure socket labels and node titles.
    ///
    /// Only affects sockets created afterwards.
    pub fn with_metrics(mut self, metrics: impl TextMeasure + 'static) -> Self {
        self.metrics = Box::new(metrics);
        self
    }

    /// Style applied to nodes created afterwards.
    pub fn with_node_style(mut self, style: NodeStyle) -> Self {
        self.node_style = style;
        self
    }

    /// Style applied to sockets created afterwards.
    pub fn with_socket_style(mut self, style: SocketStyle) -> Self {
        self.socket_style = style;
        self
    }

    /// Style applied to edges created afterwards.
    pub fn with_edge_style(mut self, style: EdgeStyle) -> Self {
        self.edge_style = style;
        self
    }

    pub fn node_style(&self) -> &NodeStyle {
        &self.node_style
    }

    pub fn socket_style(&self) -> &SocketStyle {
        &self.socket_style
    }

    pub fn edge_style(&self) -> &EdgeStyle {
        &self.edge_style
    }

    pub(crate) fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // === Lookup ===

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn socket(&self, id: SocketId) -> Option<&Socket> {
        self.sockets.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn socket_count(&self) -> usize {
        self.sockets.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Node handles in creation order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Edge handles in creation order.
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        let mut ids: Vec<EdgeId> = self.edges.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values()
    }

    pub fn sockets(&self) -> impl Iterator<Item = &Socket> + '_ {
        self.sockets.values()
    }

    pub(crate) fn node_ref(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, GraphError> {
        self.nodes.get_mut(&id).ok_or(GraphError::UnknownNode(id))
    }

    pub(crate) fn socket_ref(&self, id: SocketId) -> Result<&Socket, GraphError> {
        self.sockets.get(&id).ok_or(GraphError::UnknownSocket(id))
    }

    pub(crate) fn socket_mut(&mut self, id: SocketId) -> Result<&mut Socket, GraphError> {
        self.sockets.get_mut(&id).ok_or(GraphError::UnknownSocket(id))
    }

    pub(crate) fn edge_ref(&self, id: EdgeId) -> Result<&Edge, GraphError> {
        self.edges.get(&id).ok_or(GraphError::UnknownEdge(id))
    }

    pub(crate) fn edge_mut(&mut self, id: EdgeId) -> Result<&mut Edge, GraphError> {
        self.edges.get_mut(&id).ok_or(GraphError::UnknownEdge(id))
    }

    // === Events and repaint ===

    pub(crate) fn emit(&mut self, event: SceneEvent) {
        self.events.push(event);
    }

    /// Events queued since the last drain, oldest first.
    pub fn pending_events(&self) -> &[SceneEvent] {
        &self.events
    }

    /// Take all queued events.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.needs_repaint = true;
    }

    /// Whether anything visible changed since the last [`take_needs_repaint`](Self::take_needs_repaint).
    pub fn needs_repaint(&self) -> bool {
        self.needs_repaint
    }

    /// Read and clear the repaint flag.
    pub fn take_needs_repaint(&mut self) -> bool {
        std::mem::replace(&mut self.needs_repaint, false)
    }

    // === Selection and stacking ===

    /// Select a single node (or none). The selected node is raised above the others.
    pub fn select_node(&mut self, id: Option<NodeId>) {
        let id = id.filter(|id| self.nodes.contains_key(id));
        if self.selected != id {
            self.selected = id;
            self.mark_dirty();
        }
    }

    pub fn selected_node(&self) -> Option<NodeId> {
        self.selected
    }

    /// Stacking value of a node. Higher values paint on top.
    pub fn node_z(&self, id: NodeId) -> i32 {
        if self.selected == Some(id) {
            Z_SELECTED_NODE
        } else {
            Z_NODE
        }
    }

    /// Temporarily raise an edge above everything else (or clear the raise).
    pub fn raise_edge(&mut self, id: Option<EdgeId>) {
        if self.raised_edge != id {
            self.raised_edge = id;
            self.mark_dirty();
        }
    }

    pub fn raised_edge(&self) -> Option<EdgeId> {
        self.raised_edge
    }

    /// Stacking value of an edge. Higher values paint on top.
    pub fn edge_z(&self, id: EdgeId) -> i32 {
        if self.raised_edge == Some(id) {
            Z_DRAGGED_EDGE
        } else {
            Z_EDGE
        }
    }

    pub(crate) fn forget_node(&mut self, id: NodeId) {
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    pub(crate) fn forget_edge(&mut self, id: EdgeId) {
        if self.raised_edge == Some(id) {
            self.raised_edge = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn test_new_scene_is_empty() {
        let scene = Scene::new();
        assert_eq!(scene.node_count(), 0);
        assert_eq!(scene.edge_count(), 0);
        assert!(scene.pending_events().is_empty());
        assert!(!scene.needs_repaint());
    }

    #[test]
    fn test_handles_are_never_reused() {
        let mut scene = Scene::new();
        let a = scene.add_node("a", Point::new(0.0, 0.0));
        scene.remove_node(a).unwrap();
        let b = scene.add_node("b", Point::new(0.0, 0.0));
        assert_ne!(a, b);
        assert!(scene.node(a).is_none());
    }

    #[test]
    fn test_ids_listed_in_creation_order() {
        let mut scene = Scene::new();
        let ids: Vec<NodeId> = (0..5)
            .map(|i| scene.add_node("n", Point::new(i as f32, 0.0)))
            .collect();
        assert_eq!(scene.node_ids(), ids);
    }

    #[test]
    fn test_selection_raises_node() {
        let mut scene = Scene::new();
        let a = scene.add_node("a", Point::new(0.0, 0.0));
        let b = scene.add_node("b", Point::new(0.0, 0.0));
        scene.select_node(Some(a));
        assert_eq!(scene.node_z(a), Z_SELECTED_NODE);
        assert_eq!(scene.node_z(b), Z_NODE);
        scene.select_node(None);
        assert_eq!(scene.node_z(a), Z_NODE);
    }

    #[test]
    fn test_select_unknown_node_clears_selection() {
        let mut scene = Scene::new();
        let a = scene.add_node("a", Point::new(0.0, 0.0));
        scene.select_node(Some(a));
        scene.select_node(Some(NodeId(999)));
        assert_eq!(scene.selected_node(), None);
    }

    #[test]
    fn test_removing_selected_node_clears_selection() {
        let mut scene = Scene::new();
        let a = scene.add_node("a", Point::new(0.0, 0.0));
        scene.select_node(Some(a));
        scene.remove_node(a).unwrap();
        assert_eq!(scene.selected_node(), None);
    }

    #[test]
    fn test_repaint_flag_is_taken_once() {
        let mut scene = Scene::new();
        scene.add_node("a", Point::new(0.0, 0.0));
        assert!(scene.take_needs_repaint());
        assert!(!scene.take_needs_repaint());
    }

    #[test]
    fn test_drain_events_empties_queue() {
        let mut scene = Scene::new();
        let a = scene.add_node("a", Point::new(0.0, 0.0));
        assert_eq!(scene.drain_events(), vec![SceneEvent::NodeAdded(a)]);
        assert!(scene.pending_events().is_empty());
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(NodeId(4).to_string(), "node#4");
        assert_eq!(SocketId(5).to_string(), "socket#5");
        assert_eq!(EdgeId(6).to_string(), "edge#6");
        assert_eq!(EdgeId(6).raw(), 6);
    }
}
