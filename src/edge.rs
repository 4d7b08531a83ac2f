//! Edges: directed curved connectors from a source socket to a sink socket.
//!
//! An edge may exist with zero, one or two sides bound. Half-bound edges are
//! the normal state while the user drags the free end around; a fully bound
//! edge represents a SOURCE -> SINK connection. The curve is recomputed every
//! time an endpoint moves.

use log::debug;
use slint::Color;

use crate::error::GraphError;
use crate::geometry::Point;
use crate::path::{CubicBezier, CurveShape};
use crate::scene::{EdgeId, Scene, SceneEvent, SocketId};
use crate::socket::SocketKind;

/// Visual parameters of edges.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeStyle {
    pub shape: CurveShape,
    pub color: Color,
    pub line_width: f32,
    /// Maximum pointer distance from the curve that still counts as a hit.
    pub hit_distance: f32,
    /// Number of segments used to flatten the curve for hit testing.
    pub hit_samples: usize,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            shape: CurveShape::default(),
            color: Color::from_argb_u8(0xff, 0x00, 0xff, 0x00),
            line_width: 2.0,
            hit_distance: 4.0,
            hit_samples: 20,
        }
    }
}

impl EdgeStyle {
    pub fn with_factor(mut self, factor: f32) -> Self {
        self.shape.factor = factor;
        self
    }

    pub fn with_min_dist(mut self, min_dist: f32) -> Self {
        self.shape.min_dist = min_dist;
        self
    }

    pub fn with_max_dist(mut self, max_dist: Option<f32>) -> Self {
        self.shape.max_dist = max_dist;
        self
    }
}

/// A directed connector between two anchor points.
#[derive(Debug, Clone)]
pub struct Edge {
    id: EdgeId,
    start: Point,
    stop: Point,
    shape: CurveShape,
    source: Option<SocketId>,
    sink: Option<SocketId>,
    curve: CubicBezier,
}

impl Edge {
    pub(crate) fn new(id: EdgeId, start: Point, stop: Point, shape: CurveShape) -> Self {
        Self {
            id,
            start,
            stop,
            shape,
            source: None,
            sink: None,
            curve: CubicBezier::from_endpoints(start, stop, &shape),
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// Source-side endpoint in scene coordinates.
    pub fn start(&self) -> Point {
        self.start
    }

    /// Sink-side endpoint in scene coordinates.
    pub fn stop(&self) -> Point {
        self.stop
    }

    pub fn shape(&self) -> &CurveShape {
        &self.shape
    }

    pub fn factor(&self) -> f32 {
        self.shape.factor
    }

    pub fn source(&self) -> Option<SocketId> {
        self.source
    }

    pub fn sink(&self) -> Option<SocketId> {
        self.sink
    }

    /// The socket bound on the side that takes sockets of `kind`.
    pub fn socket(&self, kind: SocketKind) -> Option<SocketId> {
        match kind {
            SocketKind::Source => self.source,
            SocketKind::Sink => self.sink,
        }
    }

    /// Both sides bound.
    pub fn is_connected(&self) -> bool {
        self.source.is_some() && self.sink.is_some()
    }

    /// Which side `socket` is bound to, if any.
    pub fn side_of(&self, socket: SocketId) -> Option<SocketKind> {
        if self.source == Some(socket) {
            Some(SocketKind::Source)
        } else if self.sink == Some(socket) {
            Some(SocketKind::Sink)
        } else {
            None
        }
    }

    /// Current curve, always in sync with the endpoints.
    pub fn curve(&self) -> &CubicBezier {
        &self.curve
    }

    pub(crate) fn set_start(&mut self, p: Point) {
        self.start = p;
        self.update_path();
    }

    pub(crate) fn set_stop(&mut self, p: Point) {
        self.stop = p;
        self.update_path();
    }

    pub(crate) fn set_shape(&mut self, shape: CurveShape) {
        self.shape = shape;
        self.update_path();
    }

    pub(crate) fn set_socket(&mut self, kind: SocketKind, socket: Option<SocketId>) {
        match kind {
            SocketKind::Source => self.source = socket,
            SocketKind::Sink => self.sink = socket,
        }
    }

    fn update_path(&mut self) {
        self.curve = CubicBezier::from_endpoints(self.start, self.stop, &self.shape);
    }
}

impl Scene {
    /// Create a free-floating edge with both endpoints at the origin.
    pub fn add_edge(&mut self) -> EdgeId {
        let origin = Point::new(0.0, 0.0);
        self.add_edge_between(origin, origin)
    }

    /// Create a free-floating edge between two scene points.
    pub fn add_edge_between(&mut self, start: Point, stop: Point) -> EdgeId {
        let id = EdgeId(self.alloc_id());
        self.edges.insert(id, Edge::new(id, start, stop, self.edge_style.shape));
        self.emit(SceneEvent::EdgeAdded(id));
        self.mark_dirty();
        id
    }

    /// Create an edge and bind it to `source` and `sink`.
    pub fn connect_new(&mut self, source: SocketId, sink: SocketId) -> Result<EdgeId, GraphError> {
        self.expect_kind(source, SocketKind::Source)?;
        self.expect_kind(sink, SocketKind::Sink)?;
        let edge = self.add_edge();
        self.connect(edge, source, sink)?;
        Ok(edge)
    }

    pub fn set_edge_start(&mut self, edge: EdgeId, p: Point) -> Result<(), GraphError> {
        self.edge_mut(edge)?.set_start(p);
        self.mark_dirty();
        Ok(())
    }

    pub fn set_edge_stop(&mut self, edge: EdgeId, p: Point) -> Result<(), GraphError> {
        self.edge_mut(edge)?.set_stop(p);
        self.mark_dirty();
        Ok(())
    }

    /// Change the curve shape of a single edge.
    pub fn set_edge_shape(&mut self, edge: EdgeId, shape: CurveShape) -> Result<(), GraphError> {
        self.edge_mut(edge)?.set_shape(shape);
        self.mark_dirty();
        Ok(())
    }

    /// Bind the start of `edge` to a source socket.
    ///
    /// The socket's previous edge (if another one) is evicted and notified,
    /// the edge's previous source (if another socket) is released, and the
    /// start snaps to the socket anchor. Returns the evicted edge.
    pub fn connect_source(&mut self, edge: EdgeId, socket: SocketId) -> Result<Option<EdgeId>, GraphError> {
        self.edge_ref(edge)?;
        self.expect_kind(socket, SocketKind::Source)?;
        self.bind(edge, socket)
    }

    /// Bind the stop of `edge` to a sink socket. See [`connect_source`](Self::connect_source).
    pub fn connect_sink(&mut self, edge: EdgeId, socket: SocketId) -> Result<Option<EdgeId>, GraphError> {
        self.edge_ref(edge)?;
        self.expect_kind(socket, SocketKind::Sink)?;
        self.bind(edge, socket)
    }

    /// Bind both sides in one call.
    pub fn connect(&mut self, edge: EdgeId, source: SocketId, sink: SocketId) -> Result<(), GraphError> {
        self.expect_kind(source, SocketKind::Source)?;
        self.expect_kind(sink, SocketKind::Sink)?;
        self.connect_source(edge, source)?;
        self.connect_sink(edge, sink)?;
        Ok(())
    }

    /// Unbind the source side. Safe to call when already unbound.
    pub fn disconnect_source(&mut self, edge: EdgeId) -> Result<(), GraphError> {
        self.disconnect_side(edge, SocketKind::Source)
    }

    /// Unbind the sink side. Safe to call when already unbound.
    pub fn disconnect_sink(&mut self, edge: EdgeId) -> Result<(), GraphError> {
        self.disconnect_side(edge, SocketKind::Sink)
    }

    /// Unbind both sides.
    pub fn disconnect(&mut self, edge: EdgeId) -> Result<(), GraphError> {
        self.disconnect_side(edge, SocketKind::Source)?;
        self.disconnect_side(edge, SocketKind::Sink)
    }

    /// Disconnect both sides and drop the edge from the scene.
    pub fn remove_edge(&mut self, edge: EdgeId) -> Result<(), GraphError> {
        self.disconnect(edge)?;
        self.edges.remove(&edge);
        self.forget_edge(edge);
        self.emit(SceneEvent::EdgeRemoved(edge));
        self.mark_dirty();
        debug!("removed {}", edge);
        Ok(())
    }

    /// Fully bound edges as `(edge, source, sink)` in creation order.
    pub fn connections(&self) -> Vec<(EdgeId, SocketId, SocketId)> {
        self.edge_ids()
            .into_iter()
            .filter_map(|id| {
                let e = self.edges.get(&id)?;
                Some((id, e.source()?, e.sink()?))
            })
            .collect()
    }

    fn disconnect_side(&mut self, edge: EdgeId, kind: SocketKind) -> Result<(), GraphError> {
        if let Some(socket) = self.edge_ref(edge)?.socket(kind) {
            self.release(socket, edge, true)?;
        }
        Ok(())
    }

    fn expect_kind(&self, socket: SocketId, expected: SocketKind) -> Result<(), GraphError> {
        let found = self.socket_ref(socket)?.kind();
        if found != expected {
            return Err(GraphError::WrongSocketKind { socket, expected, found });
        }
        Ok(())
    }
}
