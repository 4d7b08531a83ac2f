//! Layered auto-arrange of scene nodes.
//!
//! Nodes are ranked along the flow of their fully bound edges with the
//! Sugiyama method (via `rust-sugiyama`) and moved to the computed positions.
//! Moving goes through [`Scene::set_node_position`], so attached edges follow.
//!
//! Requires the `layout` feature.

use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::error::GraphError;
use crate::geometry::Point;
use crate::scene::{NodeId, Scene};

/// Direction in which layers follow each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Direction {
    /// Sources on the right feed sinks on the left of the next layer.
    #[default]
    LeftToRight,
    TopToBottom,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrangeConfig {
    /// Spacing between nodes of one layer; 0 keeps the `rust-sugiyama` default.
    pub vertex_spacing: f64,
    /// Minimum number of layers an edge spans; 0 keeps the default.
    pub minimum_length: u32,
    pub direction: Direction,
    /// Top-left corner of the arranged block.
    pub origin: Point,
}

impl Default for ArrangeConfig {
    fn default() -> Self {
        Self { vertex_spacing: 0.0, minimum_length: 0, direction: Direction::default(), origin: Point::new(0.0, 0.0) }
    }
}

/// Computed top-left corner of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePosition {
    pub node: NodeId,
    pub x: f64,
    pub y: f64,
}

fn sugiyama(edges: &[(NodeId, NodeId)], sizes: &[(NodeId, (f64, f64))], config: &ArrangeConfig) -> Vec<NodePosition> {
    if sizes.is_empty() {
        return Vec::new();
    }
    let horizontal = config.direction == Direction::LeftToRight;

    // rust-sugiyama wants dense u32 vertex indices
    let index: HashMap<NodeId, u32> = sizes.iter().enumerate().map(|(i, (id, _))| (*id, i as u32)).collect();
    let vertices: Vec<(u32, (f64, f64))> = sizes
        .iter()
        .enumerate()
        .map(|(i, (_, (w, h)))| (i as u32, if horizontal { (*h, *w) } else { (*w, *h) }))
        .collect();
    let mapped: Vec<(u32, u32)> =
        edges.iter().filter_map(|(a, b)| Some((*index.get(a)?, *index.get(b)?))).collect();

    let mut sg = rust_sugiyama::configure::Config { dummy_vertices: false, ..Default::default() };
    if config.vertex_spacing > 0.0 {
        sg.vertex_spacing = config.vertex_spacing;
    }
    if config.minimum_length > 0 {
        sg.minimum_length = config.minimum_length;
    }

    let mut out = Vec::with_capacity(sizes.len());
    for (layout, _, _) in rust_sugiyama::from_vertices_and_edges(&vertices, &mapped, &sg) {
        for (idx, (x, y)) in layout {
            if let Some((node, _)) = sizes.get(idx) {
                let (x, y) = if horizontal { (y, x) } else { (x, y) };
                out.push(NodePosition { node: *node, x, y });
            }
        }
    }
    out
}

impl Scene {
    /// Node-to-node flow of all fully bound edges, without duplicates or
    /// self loops.
    pub fn node_flow(&self) -> Vec<(NodeId, NodeId)> {
        let node_of = |s| self.socket(s).map(|s| s.node());
        self.connections()
            .into_iter()
            .filter_map(|(_, source, sink)| Some((node_of(source)?, node_of(sink)?)))
            .filter(|(a, b)| a != b)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Layered positions for every node, without moving anything.
    pub fn layout_positions(&self, config: &ArrangeConfig) -> Vec<NodePosition> {
        let sizes: Vec<(NodeId, (f64, f64))> = self
            .node_ids()
            .into_iter()
            .filter_map(|id| self.node(id).map(|n| (id, (n.size().width as f64, n.size().height as f64))))
            .collect();
        sugiyama(&self.node_flow(), &sizes, config)
    }

    /// Move every node to its layered position.
    pub fn arrange(&mut self, config: &ArrangeConfig) -> Result<(), GraphError> {
        let positions = self.layout_positions(config);
        let min_x = positions.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = positions.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);

        for p in &positions {
            let x = config.origin.x + (p.x - min_x) as f32;
            let y = config.origin.y + (p.y - min_y) as f32;
            self.set_node_position(p.node, Point::new(x, y))?;
        }
        debug!("arranged {} nodes", positions.len());
        Ok(())
    }
}
