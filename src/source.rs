//! Hooks for nodes backed by an external data model.
//!
//! A host with its own data (a row of a table, a record, a settings object)
//! describes it through [`NodeSource`]. The scene turns each [`FieldSpec`]
//! into a socket, in order, and the host listens for
//! [`SceneEvent::EdgeConnected`](crate::SceneEvent::EdgeConnected) to copy
//! values across completed edges.

use log::{debug, warn};
use slint::SharedString;

use crate::error::GraphError;
use crate::geometry::Point;
use crate::scene::{NodeId, Scene, SocketId};
use crate::socket::SocketKind;

/// One exposed field of a data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub label: SharedString,
    pub kind: SocketKind,
}

impl FieldSpec {
    pub fn new(label: impl Into<SharedString>, kind: SocketKind) -> Self {
        Self { label: label.into(), kind }
    }

    /// A field read by the node.
    pub fn sink(label: impl Into<SharedString>) -> Self {
        Self::new(label, SocketKind::Sink)
    }

    /// A field written by the node.
    pub fn source(label: impl Into<SharedString>) -> Self {
        Self::new(label, SocketKind::Source)
    }
}

/// External data exposed as a node.
///
/// # Example
///
/// ```ignore
/// struct Adder;
///
/// impl NodeSource for Adder {
///     fn title(&self) -> SharedString {
///         "Add".into()
///     }
///
///     fn fields(&self) -> Vec<FieldSpec> {
///         vec![FieldSpec::sink("a"), FieldSpec::sink("b"), FieldSpec::source("sum")]
///     }
/// }
/// ```
pub trait NodeSource {
    fn title(&self) -> SharedString;

    /// Fields in socket order.
    fn fields(&self) -> Vec<FieldSpec>;
}

/// A fixed title and field list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSource {
    pub title: SharedString,
    pub fields: Vec<FieldSpec>,
}

impl StaticSource {
    pub fn new(title: impl Into<SharedString>) -> Self {
        Self { title: title.into(), fields: Vec::new() }
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }
}

impl NodeSource for StaticSource {
    fn title(&self) -> SharedString {
        self.title.clone()
    }

    fn fields(&self) -> Vec<FieldSpec> {
        self.fields.clone()
    }
}

/// Node created from a source, with its sockets in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedNode {
    pub node: NodeId,
    /// One entry per field.
    pub sockets: Vec<SocketId>,
}

impl Scene {
    /// Create a node from `source`, one socket per field.
    ///
    /// A missing source is not an error: the node is created empty and a
    /// warning is logged.
    pub fn add_node_from_source(&mut self, source: Option<&dyn NodeSource>, position: Point) -> SourcedNode {
        let Some(source) = source else {
            warn!("no data source given, creating an empty node");
            let node = self.add_node("", position);
            return SourcedNode { node, sockets: Vec::new() };
        };

        let node = self.add_node(source.title(), position);
        let sockets = self.add_fields(node, &source.fields()).unwrap_or_default();
        debug!("{} built from source with {} fields", node, sockets.len());
        SourcedNode { node, sockets }
    }

    /// Append one socket per field to an existing node.
    pub fn add_fields(&mut self, node: NodeId, fields: &[FieldSpec]) -> Result<Vec<SocketId>, GraphError> {
        fields
            .iter()
            .map(|f| match f.kind {
                SocketKind::Sink => self.add_sink(node, f.label.clone()),
                SocketKind::Source => self.add_source(node, f.label.clone()),
            })
            .collect()
    }
}
