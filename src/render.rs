//! Geometry snapshots for the painting layer.
//!
//! The scene never paints. Per frame, the host asks for a [`NodeGeometry`],
//! [`SocketGeometry`] or [`EdgeGeometry`] per entity and hands them to its
//! `.slint` components, or lets [`RenderModels`] keep Slint `VecModel`s in
//! sync automatically.
//!
//! # Example
//!
//! ```ignore
//! use slint_node_canvas::{CanvasController, RenderModels};
//! use slint::{ModelRc, VecModel};
//! use std::rc::Rc;
//!
//! let ctrl = CanvasController::default();
//! let edges = Rc::new(VecModel::<EdgePath>::default());
//!
//! let mut models = RenderModels::new();
//! models.bind_edges(edges.clone(), |e| EdgePath {
//!     id: e.id.raw() as i32,
//!     commands: e.path_commands.clone(),
//!     color: e.color,
//!     width: e.line_width,
//! });
//! window.set_edge_paths(ModelRc::from(edges));
//!
//! // after every handled event
//! models.sync_if_needed(&mut ctrl.scene().borrow_mut(), &ctrl.viewport());
//! ```

use std::rc::Rc;

use slint::{Color, Model, SharedString, VecModel};

use crate::geometry::{Point, Rect};
use crate::path::CubicBezier;
use crate::scene::{EdgeId, NodeId, Scene, SocketId};
use crate::socket::SocketKind;
use crate::viewport::Viewport;

fn rect_to_view(r: Rect, vp: &Viewport) -> Rect {
    let origin = vp.to_view(r.origin());
    let z = if vp.zoom > 0.0 { vp.zoom } else { 1.0 };
    Rect::new(origin.x, origin.y, r.width * z, r.height * z)
}

/// Paintable state of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGeometry {
    pub id: NodeId,
    pub title: SharedString,
    pub rect: Rect,
    pub title_rect: Rect,
    /// Rectangle assigned to embedded content.
    pub content_rect: Option<Rect>,
    pub selected: bool,
    pub z: i32,
    pub corner_radius: f32,
    pub background_color: Color,
    pub title_color: Color,
    pub outline_color: Color,
}

impl NodeGeometry {
    /// Same geometry mapped into view coordinates.
    pub fn to_view(&self, vp: &Viewport) -> Self {
        Self {
            rect: rect_to_view(self.rect, vp),
            title_rect: rect_to_view(self.title_rect, vp),
            content_rect: self.content_rect.map(|r| rect_to_view(r, vp)),
            ..self.clone()
        }
    }
}

/// Paintable state of a socket. Positions are absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketGeometry {
    pub id: SocketId,
    pub node: NodeId,
    pub kind: SocketKind,
    pub label: SharedString,
    /// Circle centre.
    pub anchor: Point,
    pub radius: f32,
    pub label_rect: Rect,
    pub color: Color,
    pub connected: bool,
}

impl SocketGeometry {
    pub fn to_view(&self, vp: &Viewport) -> Self {
        let z = if vp.zoom > 0.0 { vp.zoom } else { 1.0 };
        Self {
            anchor: vp.to_view(self.anchor),
            radius: self.radius * z,
            label_rect: rect_to_view(self.label_rect, vp),
            ..self.clone()
        }
    }
}

/// Paintable state of an edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGeometry {
    pub id: EdgeId,
    pub curve: CubicBezier,
    /// `curve` as Slint path commands.
    pub path_commands: SharedString,
    pub z: i32,
    pub color: Color,
    pub line_width: f32,
    pub connected: bool,
}

impl EdgeGeometry {
    pub fn to_view(&self, vp: &Viewport) -> Self {
        let curve = CubicBezier {
            p0: vp.to_view(self.curve.p0),
            p1: vp.to_view(self.curve.p1),
            p2: vp.to_view(self.curve.p2),
            p3: vp.to_view(self.curve.p3),
        };
        Self { curve, path_commands: curve.to_path_commands().into(), ..self.clone() }
    }
}

impl Scene {
    pub fn node_geometry(&self, id: NodeId) -> Option<NodeGeometry> {
        let node = self.node(id)?;
        let origin = node.position();
        let selected = self.selected_node() == Some(id);
        let style = node.style();
        Some(NodeGeometry {
            id,
            title: node.title().clone(),
            rect: node.rect(),
            title_rect: node.title_rect().translated(origin.x, origin.y),
            content_rect: node.content().map(|c| c.geometry.translated(origin.x, origin.y)),
            selected,
            z: self.node_z(id),
            corner_radius: style.corner_radius,
            background_color: style.background_color,
            title_color: style.title_color,
            outline_color: if selected { style.selected_outline_color } else { style.outline_color },
        })
    }

    pub fn socket_geometry(&self, id: SocketId) -> Option<SocketGeometry> {
        let socket = self.socket(id)?;
        let anchor = self.socket_anchor(id).ok()?;
        Some(SocketGeometry {
            id,
            node: socket.node(),
            kind: socket.kind(),
            label: socket.label().clone(),
            anchor,
            radius: socket.style().circle_radius,
            label_rect: socket.label_rect().translated(anchor.x, anchor.y),
            color: socket.color(),
            connected: socket.edge().is_some(),
        })
    }

    pub fn edge_geometry(&self, id: EdgeId) -> Option<EdgeGeometry> {
        let edge = self.edge(id)?;
        let curve = *edge.curve();
        Some(EdgeGeometry {
            id,
            curve,
            path_commands: curve.to_path_commands().into(),
            z: self.edge_z(id),
            color: self.edge_style.color,
            line_width: self.edge_style.line_width,
            connected: edge.is_connected(),
        })
    }

    /// Nodes bottom to top.
    pub fn node_paint_order(&self) -> Vec<NodeId> {
        let mut ids = self.node_ids();
        ids.sort_by_key(|id| (self.node_z(*id), id.raw()));
        ids
    }

    /// Edges bottom to top.
    pub fn edge_paint_order(&self) -> Vec<EdgeId> {
        let mut ids = self.edge_ids();
        ids.sort_by_key(|id| (self.edge_z(*id), id.raw()));
        ids
    }
}

/// Syncs a list of snapshots into a bound Slint model.
trait ModelSyncer<G> {
    fn sync(&self, items: &[G]);
}

struct ConcreteModelSyncer<P, F> {
    model: Rc<VecModel<P>>,
    constructor: F,
}

impl<G, P, F> ModelSyncer<G> for ConcreteModelSyncer<P, F>
where
    P: Clone + 'static,
    F: Fn(&G) -> P,
{
    fn sync(&self, items: &[G]) {
        // Update existing rows or add new ones
        for (i, item) in items.iter().enumerate() {
            let row = (self.constructor)(item);
            if i < self.model.row_count() {
                self.model.set_row_data(i, row);
            } else {
                self.model.push(row);
            }
        }
        while self.model.row_count() > items.len() {
            self.model.remove(self.model.row_count() - 1);
        }
    }
}

/// Keeps Slint models of nodes, sockets and edges in sync with a scene.
///
/// Bind each model once with a constructor that maps a snapshot (already in
/// view coordinates) to the row type of your `.slint` file. Rows are listed in
/// paint order.
#[derive(Default)]
pub struct RenderModels {
    nodes: Option<Box<dyn ModelSyncer<NodeGeometry>>>,
    sockets: Option<Box<dyn ModelSyncer<SocketGeometry>>>,
    edges: Option<Box<dyn ModelSyncer<EdgeGeometry>>>,
}

impl RenderModels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_nodes<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(&NodeGeometry) -> P + 'static,
    {
        self.nodes = Some(Box::new(ConcreteModelSyncer { model, constructor }));
    }

    pub fn bind_sockets<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(&SocketGeometry) -> P + 'static,
    {
        self.sockets = Some(Box::new(ConcreteModelSyncer { model, constructor }));
    }

    pub fn bind_edges<P, F>(&mut self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(&EdgeGeometry) -> P + 'static,
    {
        self.edges = Some(Box::new(ConcreteModelSyncer { model, constructor }));
    }

    /// Rebuild every bound model from the scene.
    pub fn sync(&self, scene: &Scene, vp: &Viewport) {
        let nodes = scene.node_paint_order();

        if let Some(syncer) = &self.nodes {
            let items: Vec<NodeGeometry> =
                nodes.iter().filter_map(|id| scene.node_geometry(*id)).map(|g| g.to_view(vp)).collect();
            syncer.sync(&items);
        }

        if let Some(syncer) = &self.sockets {
            let items: Vec<SocketGeometry> = nodes
                .iter()
                .filter_map(|id| scene.node(*id))
                .flat_map(|n| n.sockets())
                .filter_map(|id| scene.socket_geometry(id))
                .map(|g| g.to_view(vp))
                .collect();
            syncer.sync(&items);
        }

        if let Some(syncer) = &self.edges {
            let items: Vec<EdgeGeometry> = scene
                .edge_paint_order()
                .iter()
                .filter_map(|id| scene.edge_geometry(*id))
                .map(|g| g.to_view(vp))
                .collect();
            syncer.sync(&items);
        }
    }

    /// Sync only if the scene asked for a repaint. Returns whether it did.
    pub fn sync_if_needed(&self, scene: &mut Scene, vp: &Viewport) -> bool {
        if !scene.take_needs_repaint() {
            return false;
        }
        self.sync(scene, vp);
        true
    }
}
