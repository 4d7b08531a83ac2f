//! # Slint Node Canvas
//!
//! The data and interaction model of a node-graph editor canvas, for Slint
//! applications: nodes with ordered input (sink) and output (source) sockets,
//! curved edges between them, and the pointer gestures that create, re-plug,
//! resize and move them.
//!
//! ## Features
//!
//! - **Consistent graph** - Every socket/edge link is stored on both sides and
//!   updated together; removing a node or socket never leaves an edge dangling
//! - **Self-laying-out nodes** - Node size and socket positions are derived from
//!   the sockets and embedded content; attached edges follow every change
//! - **Gesture state machine** - Drag-to-connect, unplug-and-redrag, resize,
//!   move, pan and zoom with cursor feedback
//! - **Pluggable drop rules** - Add your own [`ConnectionValidator`]s on top of
//!   the built-in kind rule
//! - **Renderer agnostic** - Geometry snapshots and Slint `VecModel` syncing;
//!   painting stays in your `.slint` files
//!
//! ## Quick Start
//!
//! ```ignore
//! use slint_node_canvas::{CanvasController, Scene};
//! use slint::LogicalPosition;
//!
//! let mut scene = Scene::new();
//! let a = scene.add_node("Generator", LogicalPosition::new(0.0, 0.0));
//! let b = scene.add_node("Output", LogicalPosition::new(300.0, 0.0));
//! let out = scene.add_source(a, "signal")?;
//! let inp = scene.add_sink(b, "input")?;
//! scene.connect_new(out, inp)?;
//!
//! let ctrl = CanvasController::new(scene);
//! ctrl.resize(800.0, 600.0);
//! // forward pointer input with ctrl.handle_event(..) or ctrl.handle_window_event(..)
//! ```
//!
//! ## Modules
//!
//! - [`Scene`] - Registry of nodes, sockets and edges; every graph mutation
//! - [`CanvasController`] - Pointer gestures, viewport, cursor
//! - [`RenderModels`] - Keep Slint models of nodes, sockets and edges in sync
//! - [`NodeSource`] - Build nodes from external data
//! - `layout` (feature `layout`) - Layered auto-arrange

pub mod error;
pub mod geometry;
pub mod path;
pub mod text;
pub mod scene;
pub mod socket;
pub mod edge;
pub mod node;
pub mod validation;
pub mod viewport;
pub mod controller;
pub mod source;
pub mod render;

#[cfg(feature = "layout")]
pub mod layout;

pub use controller::{
    CanvasConfig, CanvasController, CursorShape, DragOrigin, EventResult, Gesture, Modifiers,
    PointerButton, PointerButtons, PointerEvent,
};
pub use edge::{Edge, EdgeStyle};
pub use error::GraphError;
pub use geometry::{Point, Rect, Size};
pub use hit_test::HitItem;
pub use node::{compute_layout, Content, Node, NodeLayout, NodeStyle};
pub use path::{distance_to_bezier, CubicBezier, CurveShape};
pub use render::{EdgeGeometry, NodeGeometry, RenderModels, SocketGeometry};
pub use scene::{
    EdgeId, NodeId, Scene, SceneEvent, SocketId, Z_DRAGGED_EDGE, Z_EDGE, Z_NODE, Z_SELECTED_NODE,
};
pub use socket::{Socket, SocketKind, SocketStyle};
pub use source::{FieldSpec, NodeSource, SourcedNode, StaticSource};
pub use text::{MonospaceMetrics, TextMeasure};
pub use validation::{
    validate_drop, CompositeValidator, ConnectionValidator, DistinctNodeValidator, DropContext,
    KindValidator, ValidationError, ValidationResult,
};
pub use viewport::Viewport;

#[cfg(feature = "layout")]
pub use layout::{ArrangeConfig, Direction, NodePosition};
