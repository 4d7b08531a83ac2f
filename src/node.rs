//! Nodes: rectangular containers of sinks, sources and optional embedded content.
//!
//! A node computes its own geometry. Sinks stack top-down along the left edge
//! below the title band, sources stack bottom-up along the right edge above the
//! bottom margin, and embedded content fills the band in between. The minimum
//! size is derived from the sockets and the content; the current size is never
//! allowed below it.
//!
//! Recomputation is guarded by a dirty flag: [`Scene::update_node_geometry`] is a
//! cheap no-op unless a socket was added or removed, the size was set or the
//! content changed since the last run.

use log::{debug, trace};
use slint::{Color, SharedString};

use crate::error::GraphError;
use crate::geometry::{offset, Point, Rect, Size};
use crate::scene::{EdgeId, NodeId, Scene, SceneEvent, SocketId};
use crate::socket::{Socket, SocketKind};

/// Margins, minimum sizes and colours of nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeStyle {
    /// Space above the first sink, taken by the title.
    pub top_margin: f32,
    pub bottom_margin: f32,
    /// Vertical gap after each socket.
    pub item_padding: f32,
    /// Horizontal inset of the embedded content.
    pub lr_padding: f32,
    pub hard_min_width: f32,
    pub hard_min_height: f32,
    pub initial_width: f32,
    pub initial_height: f32,
    pub title_height: f32,
    pub corner_radius: f32,
    /// Side of the square resize hot-zone in the bottom-right corner.
    pub resize_handle: f32,
    pub title_color: Color,
    pub background_color: Color,
    pub outline_color: Color,
    pub selected_outline_color: Color,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            top_margin: 30.0,
            bottom_margin: 15.0,
            item_padding: 5.0,
            lr_padding: 10.0,
            hard_min_width: 150.0,
            hard_min_height: 120.0,
            initial_width: 150.0,
            initial_height: 120.0,
            title_height: 20.0,
            corner_radius: 10.0,
            resize_handle: 10.0,
            title_color: Color::from_argb_u8(0xe3, 0x21, 0x21, 0x21),
            background_color: Color::from_argb_u8(0xe3, 0x1a, 0x1a, 0x1a),
            outline_color: Color::from_argb_u8(0x7f, 0x00, 0x00, 0x00),
            selected_outline_color: Color::from_argb_u8(0xff, 0xff, 0x36, 0xa7),
        }
    }
}

impl NodeStyle {
    pub fn with_hard_min(mut self, width: f32, height: f32) -> Self {
        self.hard_min_width = width;
        self.hard_min_height = height;
        self
    }

    pub fn with_initial_size(mut self, width: f32, height: f32) -> Self {
        self.initial_width = width;
        self.initial_height = height;
        self
    }

    pub fn with_margins(mut self, top: f32, bottom: f32) -> Self {
        self.top_margin = top;
        self.bottom_margin = bottom;
        self
    }

    pub fn with_padding(mut self, item: f32, left_right: f32) -> Self {
        self.item_padding = item;
        self.lr_padding = left_right;
        self
    }
}

/// Embedded content placed in the middle band of a node.
///
/// The content itself is owned by the host; the node only needs its size
/// constraints and hands back the rectangle it should occupy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Content {
    /// Explicit minimum. A positive dimension here wins over the size hint.
    pub minimum_size: Option<Size>,
    /// Preferred minimum reported by the content.
    pub size_hint: Option<Size>,
    /// Assigned rectangle in node-local coordinates, written by layout.
    pub geometry: Rect,
}

impl Content {
    pub fn with_minimum_size(width: f32, height: f32) -> Self {
        Self { minimum_size: Some(Size::new(width, height)), ..Self::default() }
    }

    pub fn with_size_hint(width: f32, height: f32) -> Self {
        Self { size_hint: Some(Size::new(width, height)), ..Self::default() }
    }

    /// Size the content needs at least, per dimension.
    pub fn required_size(&self) -> Size {
        let hint = self.size_hint.unwrap_or(Size::new(0.0, 0.0));
        let pick = |explicit: Option<f32>, hint: f32| match explicit {
            Some(v) if v > 0.0 => v,
            _ => hint.max(0.0),
        };
        Size::new(
            pick(self.minimum_size.map(|s| s.width), hint.width),
            pick(self.minimum_size.map(|s| s.height), hint.height),
        )
    }
}

/// Result of the node layout computation.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub min_width: f32,
    pub min_height: f32,
    pub width: f32,
    pub height: f32,
    /// Anchor of each sink, in node-local coordinates.
    pub sinks: Vec<Point>,
    /// Anchor of each source, in node-local coordinates.
    pub sources: Vec<Point>,
    /// Band left for the embedded content.
    pub content: Rect,
}

/// Lay out a node.
///
/// `requested` is the size the node would like to have; the result never goes
/// below the minimum derived from `sinks`, `sources` (their minimal sizes, in
/// list order) and the content requirement.
pub fn compute_layout(
    style: &NodeStyle,
    requested: Size,
    sinks: &[Size],
    sources: &[Size],
    content: Option<Size>,
) -> NodeLayout {
    let mut min_width: f32 = 0.0;
    let mut min_height = style.top_margin + style.bottom_margin;

    for s in sinks.iter().chain(sources) {
        min_height += s.height + style.item_padding;
        min_width = min_width.max(s.width);
    }
    if let Some(c) = content {
        min_height += c.height;
        min_width = min_width.max(c.width + 2.0 * style.lr_padding);
    }

    let min_width = min_width.max(style.hard_min_width);
    let min_height = min_height.max(style.hard_min_height);
    let width = requested.width.max(min_width);
    let height = requested.height.max(min_height);

    // sockets are centred on their anchor
    let mut top = style.top_margin;
    let sink_positions = sinks
        .iter()
        .map(|s| {
            let p = Point::new(0.0, top + s.height / 2.0);
            top += s.height + style.item_padding;
            p
        })
        .collect();

    let mut bottom = height - style.bottom_margin;
    let mut source_positions: Vec<Point> = sources
        .iter()
        .rev()
        .map(|s| {
            bottom -= s.height;
            let p = Point::new(width, bottom + s.height / 2.0);
            bottom -= style.item_padding;
            p
        })
        .collect();
    source_positions.reverse();

    NodeLayout {
        min_width,
        min_height,
        width,
        height,
        sinks: sink_positions,
        sources: source_positions,
        content: Rect::new(style.lr_padding, top, width - 2.0 * style.lr_padding, bottom - top),
    }
}

/// A node on the canvas.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    title: SharedString,
    position: Point,
    width: f32,
    height: f32,
    min_width: f32,
    min_height: f32,
    sinks: Vec<SocketId>,
    sources: Vec<SocketId>,
    content: Option<Content>,
    changed: bool,
    style: NodeStyle,
}

impl Node {
    fn new(id: NodeId, title: SharedString, position: Point, style: NodeStyle) -> Self {
        Self {
            id,
            title,
            position,
            width: style.initial_width,
            height: style.initial_height,
            min_width: style.hard_min_width,
            min_height: style.hard_min_height,
            sinks: Vec::new(),
            sources: Vec::new(),
            content: None,
            changed: true,
            style,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn title(&self) -> &SharedString {
        &self.title
    }

    /// Top-left corner in scene coordinates.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn minimum_size(&self) -> Size {
        Size::new(self.min_width, self.min_height)
    }

    /// Scene-space rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size())
    }

    /// Sinks in insertion order, top to bottom.
    pub fn sinks(&self) -> &[SocketId] {
        &self.sinks
    }

    /// Sources in insertion order, top to bottom.
    pub fn sources(&self) -> &[SocketId] {
        &self.sources
    }

    pub fn sockets(&self) -> impl Iterator<Item = SocketId> + '_ {
        self.sinks.iter().chain(self.sources.iter()).copied()
    }

    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    pub fn style(&self) -> &NodeStyle {
        &self.style
    }

    /// Whether the geometry is stale.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Title band in node-local coordinates; the title text spans the full width.
    pub fn title_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.style.title_height)
    }

    /// Whether a node-local point is inside the bottom-right resize hot-zone.
    pub fn is_in_resize_handle(&self, local: Point) -> bool {
        let h = self.style.resize_handle;
        local.x >= self.width - h && local.x <= self.width && local.y >= self.height - h && local.y <= self.height
    }

    fn socket_list_mut(&mut self, kind: SocketKind) -> &mut Vec<SocketId> {
        match kind {
            SocketKind::Sink => &mut self.sinks,
            SocketKind::Source => &mut self.sources,
        }
    }

    fn socket_list(&self, kind: SocketKind) -> &[SocketId] {
        match kind {
            SocketKind::Sink => &self.sinks,
            SocketKind::Source => &self.sources,
        }
    }
}

impl Scene {
    /// Create a node with the style's initial size at `position`.
    pub fn add_node(&mut self, title: impl Into<SharedString>, position: Point) -> NodeId {
        let id = NodeId(self.alloc_id());
        self.nodes.insert(id, Node::new(id, title.into(), position, self.node_style));
        // a fresh node has no sockets and cannot fail to lay out
        let _ = self.update_node_geometry(id);
        self.emit(SceneEvent::NodeAdded(id));
        self.mark_dirty();
        debug!("added {} at ({}, {})", id, position.x, position.y);
        id
    }

    /// Remove a node, its sockets and every edge attached to them.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let sockets: Vec<SocketId> = self.node_ref(id)?.sockets().collect();
        for socket in &sockets {
            if let Some(edge) = self.socket_ref(*socket)?.edge() {
                self.remove_edge(edge)?;
            }
        }
        for socket in &sockets {
            self.sockets.remove(socket);
        }
        self.nodes.remove(&id);
        self.forget_node(id);
        self.emit(SceneEvent::NodeRemoved(id));
        self.mark_dirty();
        debug!("removed {} with {} sockets", id, sockets.len());
        Ok(())
    }

    /// Append a sink below the existing ones and relayout.
    pub fn add_sink(&mut self, node: NodeId, label: impl Into<SharedString>) -> Result<SocketId, GraphError> {
        self.add_socket(node, SocketKind::Sink, label.into())
    }

    /// Append a source below the existing ones and relayout.
    pub fn add_source(&mut self, node: NodeId, label: impl Into<SharedString>) -> Result<SocketId, GraphError> {
        self.add_socket(node, SocketKind::Source, label.into())
    }

    fn add_socket(&mut self, node: NodeId, kind: SocketKind, label: SharedString) -> Result<SocketId, GraphError> {
        self.node_ref(node)?;
        let id = SocketId(self.alloc_id());
        let label_size = self.metrics.measure(&label);
        let socket = Socket::new(id, kind, label, label_size, node, self.socket_style);
        self.sockets.insert(id, socket);
        self.node_mut(node)?.socket_list_mut(kind).push(id);
        self.invalidate_node(node)?;
        Ok(id)
    }

    /// Remove a single socket. Its edge, if any, is removed first.
    pub fn remove_socket(&mut self, socket: SocketId) -> Result<(), GraphError> {
        let s = self.socket_ref(socket)?;
        let (node, kind, edge) = (s.node(), s.kind(), s.edge());
        if let Some(edge) = edge {
            self.remove_edge(edge)?;
        }
        self.node_mut(node)?.socket_list_mut(kind).retain(|&id| id != socket);
        self.sockets.remove(&socket);
        self.invalidate_node(node)
    }

    /// Remove every sink of a node.
    pub fn clear_sinks(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.clear_sockets(node, SocketKind::Sink)
    }

    /// Remove every source of a node.
    pub fn clear_sources(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.clear_sockets(node, SocketKind::Source)
    }

    fn clear_sockets(&mut self, node: NodeId, kind: SocketKind) -> Result<(), GraphError> {
        let ids = self.node_ref(node)?.socket_list(kind).to_vec();
        for id in ids {
            self.remove_socket(id)?;
        }
        Ok(())
    }

    /// Request a size. The node clamps it to its minimum and relayouts.
    pub fn set_node_size(&mut self, node: NodeId, width: f32, height: f32) -> Result<(), GraphError> {
        let n = self.node_mut(node)?;
        n.width = width;
        n.height = height;
        self.invalidate_node(node)
    }

    /// Move a node. Attached edges follow.
    pub fn set_node_position(&mut self, node: NodeId, position: Point) -> Result<(), GraphError> {
        self.node_mut(node)?.position = position;
        self.propagate_changes(node)?;
        self.mark_dirty();
        Ok(())
    }

    pub fn move_node_by(&mut self, node: NodeId, dx: f32, dy: f32) -> Result<(), GraphError> {
        let p = self.node_ref(node)?.position();
        self.set_node_position(node, offset(p, dx, dy))
    }

    /// Replace (or clear) the embedded content and relayout.
    pub fn set_central_content(&mut self, node: NodeId, content: Option<Content>) -> Result<(), GraphError> {
        self.node_mut(node)?.content = content;
        self.invalidate_node(node)
    }

    pub fn set_title(&mut self, node: NodeId, title: impl Into<SharedString>) -> Result<(), GraphError> {
        self.node_mut(node)?.title = title.into();
        self.mark_dirty();
        Ok(())
    }

    /// The sink at `index`, or `None` when out of range.
    pub fn sink_socket(&self, node: NodeId, index: usize) -> Option<SocketId> {
        self.nodes.get(&node)?.sinks.get(index).copied()
    }

    /// The source at `index`, or `None` when out of range.
    pub fn source_socket(&self, node: NodeId, index: usize) -> Option<SocketId> {
        self.nodes.get(&node)?.sources.get(index).copied()
    }

    /// Rebind the source at `index` to `edge`.
    ///
    /// The edge previously held by that socket gets a
    /// [`SceneEvent::SourceDisconnected`] and is returned.
    pub fn connect_node_source(&mut self, node: NodeId, index: usize, edge: EdgeId) -> Result<Option<EdgeId>, GraphError> {
        let socket = self.indexed_socket(node, SocketKind::Source, index)?;
        self.connect_source(edge, socket)
    }

    /// Rebind the sink at `index` to `edge`. See [`connect_node_source`](Self::connect_node_source).
    pub fn connect_node_sink(&mut self, node: NodeId, index: usize, edge: EdgeId) -> Result<Option<EdgeId>, GraphError> {
        let socket = self.indexed_socket(node, SocketKind::Sink, index)?;
        self.connect_sink(edge, socket)
    }

    fn indexed_socket(&self, node: NodeId, kind: SocketKind, index: usize) -> Result<SocketId, GraphError> {
        self.node_ref(node)?
            .socket_list(kind)
            .get(index)
            .copied()
            .ok_or(GraphError::NoSocketAtIndex { node, kind, index })
    }

    /// Mark the node's geometry stale and recompute it.
    pub fn invalidate_node(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.node_mut(node)?.changed = true;
        self.update_node_geometry(node)
    }

    /// Recompute the node's geometry if anything changed since the last run,
    /// then push the new socket anchors to the attached edges.
    pub fn update_node_geometry(&mut self, node: NodeId) -> Result<(), GraphError> {
        let n = self.node_ref(node)?;
        if !n.changed {
            return Ok(());
        }

        let minimal = |ids: &[SocketId]| -> Result<Vec<Size>, GraphError> {
            ids.iter().map(|id| Ok(self.socket_ref(*id)?.minimal_size())).collect()
        };
        let sinks = minimal(&n.sinks)?;
        let sources = minimal(&n.sources)?;
        let content = n.content.as_ref().map(Content::required_size);
        let layout = compute_layout(&n.style, n.size(), &sinks, &sources, content);

        let n = self.node_mut(node)?;
        n.min_width = layout.min_width;
        n.min_height = layout.min_height;
        n.width = layout.width;
        n.height = layout.height;
        if let Some(c) = n.content.as_mut() {
            c.geometry = layout.content;
        }
        n.changed = false;
        let placements: Vec<(SocketId, Point)> = n
            .sinks
            .iter()
            .copied()
            .zip(layout.sinks.iter().copied())
            .chain(n.sources.iter().copied().zip(layout.sources.iter().copied()))
            .collect();

        for (id, p) in placements {
            self.socket_mut(id)?.set_position(p);
        }
        trace!("layout {}: {}x{} (min {}x{})", node, layout.width, layout.height, layout.min_width, layout.min_height);

        self.mark_dirty();
        self.propagate_changes(node)
    }

    /// Tell every socket of the node to refresh its attached edge.
    pub fn propagate_changes(&mut self, node: NodeId) -> Result<(), GraphError> {
        let sockets: Vec<SocketId> = self.node_ref(node)?.sockets().collect();
        for socket in sockets {
            self.notify_socket_moved(socket)?;
        }
        Ok(())
    }
}
