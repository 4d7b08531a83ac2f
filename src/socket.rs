//! Sockets: the typed connection points on a node.
//!
//! A socket is drawn as a small circle at its anchor plus a label. Only the
//! circle reacts to the pointer; the label widens the painted area but is not
//! part of the hit zone. Sinks sit on the left edge of their node with the
//! label to the right of the circle, sources on the right edge with the label
//! to the left.

use std::fmt;

use log::trace;
use slint::{Color, SharedString};

use crate::error::GraphError;
use crate::geometry::{Point, Rect, Size};
use crate::scene::{EdgeId, NodeId, Scene, SceneEvent, SocketId};

/// Which way data flows through a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SocketKind {
    /// Input. Edges end here.
    Sink,
    /// Output. Edges start here.
    Source,
}

impl SocketKind {
    pub fn opposite(self) -> Self {
        match self {
            SocketKind::Sink => SocketKind::Source,
            SocketKind::Source => SocketKind::Sink,
        }
    }

    pub fn is_sink(self) -> bool {
        self == SocketKind::Sink
    }

    pub fn is_source(self) -> bool {
        self == SocketKind::Source
    }
}

impl fmt::Display for SocketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketKind::Sink => f.write_str("sink"),
            SocketKind::Source => f.write_str("source"),
        }
    }
}

/// Dimensions and colours shared by all sockets of a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SocketStyle {
    pub circle_radius: f32,
    /// Gap between the circle and the label.
    pub text_offset: f32,
    pub pen_width: f32,
    pub min_width: f32,
    pub min_height: f32,
    pub sink_color: Color,
    pub source_color: Color,
    pub outline_color: Color,
    pub text_color: Color,
}

impl Default for SocketStyle {
    fn default() -> Self {
        Self {
            circle_radius: 6.0,
            text_offset: 3.0,
            pen_width: 1.0,
            min_width: 30.0,
            min_height: 12.0,
            sink_color: Color::from_argb_u8(0xff, 0x00, 0x77, 0xff),
            source_color: Color::from_argb_u8(0xff, 0xff, 0x77, 0x00),
            outline_color: Color::from_argb_u8(0xff, 0x00, 0x00, 0x00),
            text_color: Color::from_argb_u8(0xff, 0xff, 0xff, 0xff),
        }
    }
}

impl SocketStyle {
    pub fn with_circle_radius(mut self, radius: f32) -> Self {
        self.circle_radius = radius;
        self
    }

    pub fn with_min_size(mut self, width: f32, height: f32) -> Self {
        self.min_width = width;
        self.min_height = height;
        self
    }

    /// Size of a socket whose label measures `label`.
    pub fn minimal_size(&self, label: Size) -> Size {
        Size::new(
            self.min_width
                .max(self.circle_radius * 2.0 + self.text_offset + label.width + self.pen_width),
            self.min_height.max(label.height + self.pen_width),
        )
    }
}

/// A connection point owned by exactly one node.
#[derive(Debug, Clone)]
pub struct Socket {
    id: SocketId,
    kind: SocketKind,
    label: SharedString,
    label_size: Size,
    node: NodeId,
    edge: Option<EdgeId>,
    position: Point,
    style: SocketStyle,
}

impl Socket {
    pub(crate) fn new(
        id: SocketId,
        kind: SocketKind,
        label: SharedString,
        label_size: Size,
        node: NodeId,
        style: SocketStyle,
    ) -> Self {
        Self { id, kind, label, label_size, node, edge: None, position: Point::new(0.0, 0.0), style }
    }

    pub fn id(&self) -> SocketId {
        self.id
    }

    pub fn kind(&self) -> SocketKind {
        self.kind
    }

    pub fn is_sink(&self) -> bool {
        self.kind.is_sink()
    }

    pub fn is_source(&self) -> bool {
        self.kind.is_source()
    }

    pub fn label(&self) -> &SharedString {
        &self.label
    }

    /// The owning node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The attached edge, if any.
    pub fn edge(&self) -> Option<EdgeId> {
        self.edge
    }

    /// Anchor position in node-local coordinates.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn style(&self) -> &SocketStyle {
        &self.style
    }

    pub fn color(&self) -> Color {
        match self.kind {
            SocketKind::Sink => self.style.sink_color,
            SocketKind::Source => self.style.source_color,
        }
    }

    pub fn minimal_size(&self) -> Size {
        self.style.minimal_size(self.label_size)
    }

    /// Sockets cannot be resized by the user, so this is the minimal size.
    pub fn size(&self) -> Size {
        self.minimal_size()
    }

    /// Whether a socket-local point falls inside the circular hit zone.
    pub fn hit_test(&self, local: Point) -> bool {
        let r = self.style.circle_radius;
        local.x * local.x + local.y * local.y <= r * r
    }

    /// Painted area in socket-local coordinates: circle plus label.
    pub fn bounding_rect(&self) -> Rect {
        let size = self.size();
        let x = -self.style.circle_radius - self.style.pen_width / 2.0;
        let y = -size.height / 2.0 - self.style.pen_width / 2.0;
        match self.kind {
            SocketKind::Sink => Rect::new(x, y, size.width, size.height),
            SocketKind::Source => Rect::new(-size.width - x, y, size.width, size.height),
        }
    }

    /// Label box in socket-local coordinates, vertically centred on the anchor.
    pub fn label_rect(&self) -> Rect {
        let gap = self.style.circle_radius + self.style.text_offset;
        let y = -self.label_size.height / 2.0;
        match self.kind {
            SocketKind::Sink => Rect::new(gap, y, self.label_size.width, self.label_size.height),
            SocketKind::Source => Rect::new(
                -gap - self.label_size.width,
                y,
                self.label_size.width,
                self.label_size.height,
            ),
        }
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub(crate) fn set_edge(&mut self, edge: Option<EdgeId>) {
        self.edge = edge;
    }

    pub(crate) fn set_label(&mut self, label: SharedString, label_size: Size) {
        self.label = label;
        self.label_size = label_size;
    }
}

impl Scene {
    /// Scene-space point where an attached edge ends: the socket's local
    /// origin mapped through its node's position.
    pub fn socket_anchor(&self, socket: SocketId) -> Result<Point, GraphError> {
        let s = self.socket_ref(socket)?;
        let node = self.node_ref(s.node())?;
        let origin = node.position();
        Ok(Point::new(origin.x + s.position().x, origin.y + s.position().y))
    }

    /// Map a scene point into the socket's local coordinates.
    pub fn socket_local_point(&self, socket: SocketId, scene_point: Point) -> Result<Point, GraphError> {
        let anchor = self.socket_anchor(socket)?;
        Ok(Point::new(scene_point.x - anchor.x, scene_point.y - anchor.y))
    }

    /// Position of the socket within its node's sink or source list.
    pub fn socket_index(&self, socket: SocketId) -> Option<usize> {
        let s = self.sockets.get(&socket)?;
        let node = self.nodes.get(&s.node())?;
        let list = match s.kind() {
            SocketKind::Sink => node.sinks(),
            SocketKind::Source => node.sources(),
        };
        list.iter().position(|&id| id == socket)
    }

    /// Attach `edge` to `socket`.
    ///
    /// Any edge the socket held before loses its reference to the socket and
    /// a disconnect event is queued for it; the edge side matching the socket
    /// kind is rebound and its endpoint snaps to the socket anchor. Attaching
    /// the edge the socket already holds only refreshes the endpoint.
    ///
    /// Returns the edge that was evicted from the socket, if any.
    pub fn attach_edge(&mut self, socket: SocketId, edge: EdgeId) -> Result<Option<EdgeId>, GraphError> {
        self.bind(edge, socket)
    }

    /// Clear the socket's edge reference without queuing a disconnect event.
    ///
    /// The edge side that pointed at this socket is cleared too so the graph
    /// stays consistent. Returns the edge that was attached.
    pub fn detach_edge(&mut self, socket: SocketId) -> Result<Option<EdgeId>, GraphError> {
        let previous = self.socket_ref(socket)?.edge();
        if let Some(edge) = previous {
            self.release(socket, edge, false)?;
        }
        Ok(previous)
    }

    /// Recompute the endpoint of the attached edge from the socket's current
    /// anchor: the start for a source, the stop for a sink.
    pub fn notify_socket_moved(&mut self, socket: SocketId) -> Result<(), GraphError> {
        let s = self.socket_ref(socket)?;
        let Some(edge) = s.edge() else {
            return Ok(());
        };
        let kind = s.kind();
        let anchor = self.socket_anchor(socket)?;
        let e = self.edge_mut(edge)?;
        match kind {
            SocketKind::Source => e.set_start(anchor),
            SocketKind::Sink => e.set_stop(anchor),
        }
        self.mark_dirty();
        Ok(())
    }

    /// Change a socket's label and relayout its node.
    pub fn set_socket_label(&mut self, socket: SocketId, label: impl Into<SharedString>) -> Result<(), GraphError> {
        let label = label.into();
        let size = self.metrics.measure(&label);
        let s = self.socket_mut(socket)?;
        s.set_label(label, size);
        let node = s.node();
        self.invalidate_node(node)
    }

    /// Bind `socket` to the side of `edge` that matches the socket kind.
    pub(crate) fn bind(&mut self, edge: EdgeId, socket: SocketId) -> Result<Option<EdgeId>, GraphError> {
        let s = self.socket_ref(socket)?;
        let kind = s.kind();
        let held = s.edge();
        let bound = self.edge_ref(edge)?.socket(kind);

        if held == Some(edge) && bound == Some(socket) {
            self.notify_socket_moved(socket)?;
            return Ok(None);
        }

        // the edge lets go of whatever it had on this side
        if let Some(old) = bound.filter(|&old| old != socket) {
            self.release(old, edge, true)?;
        }

        // the socket lets go of its previous edge
        let mut evicted = None;
        if let Some(previous) = held.filter(|&previous| previous != edge) {
            self.release(socket, previous, true)?;
            evicted = Some(previous);
        }

        self.socket_mut(socket)?.set_edge(Some(edge));
        self.edge_mut(edge)?.set_socket(kind, Some(socket));
        self.notify_socket_moved(socket)?;
        trace!("bound {} {} to {}", kind, socket, edge);

        let e = self.edge_ref(edge)?;
        if let (Some(source), Some(sink)) = (e.source(), e.sink()) {
            self.emit(SceneEvent::EdgeConnected { edge, source, sink });
        }
        Ok(evicted)
    }

    /// Break the link between `socket` and `edge` on both sides.
    pub(crate) fn release(&mut self, socket: SocketId, edge: EdgeId, notify: bool) -> Result<(), GraphError> {
        let s = self.socket_mut(socket)?;
        let kind = s.kind();
        let node = s.node();
        if s.edge() == Some(edge) {
            s.set_edge(None);
        }
        if let Some(e) = self.edges.get_mut(&edge) {
            if e.socket(kind) == Some(socket) {
                e.set_socket(kind, None);
            }
        }
        if notify {
            self.emit(match kind {
                SocketKind::Source => SceneEvent::SourceDisconnected { edge, node, socket },
                SocketKind::Sink => SceneEvent::SinkDisconnected { edge, node, socket },
            });
        }
        self.mark_dirty();
        Ok(())
    }
}
