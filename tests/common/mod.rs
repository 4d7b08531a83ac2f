//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use slint_node_canvas::{NodeId, Point, Scene, SceneEvent, Size, SocketId};

/// Text metrics where every character is one unit wide, so a label's width
/// equals its length.
pub fn unit_metrics(text: &str) -> Size {
    Size::new(text.chars().count() as f32, 14.0)
}

/// Node "N1" at the origin with source "out", node "N2" at (300, 0) with
/// sink "in".
pub fn two_node_scene() -> (Scene, NodeId, SocketId, NodeId, SocketId) {
    let mut scene = Scene::new();
    let n1 = scene.add_node("N1", Point::new(0.0, 0.0));
    let n2 = scene.add_node("N2", Point::new(300.0, 0.0));
    let out = scene.add_source(n1, "out").unwrap();
    let inp = scene.add_sink(n2, "in").unwrap();
    (scene, n1, out, n2, inp)
}

/// Tallies drained scene events by variant.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventTally {
    pub nodes_added: usize,
    pub nodes_removed: usize,
    pub edges_added: usize,
    pub edges_removed: usize,
    pub connected: usize,
    pub source_disconnected: usize,
    pub sink_disconnected: usize,
}

impl EventTally {
    pub fn drain(scene: &mut Scene) -> Self {
        let mut tally = Self::default();
        for event in scene.drain_events() {
            match event {
                SceneEvent::NodeAdded(_) => tally.nodes_added += 1,
                SceneEvent::NodeRemoved(_) => tally.nodes_removed += 1,
                SceneEvent::EdgeAdded(_) => tally.edges_added += 1,
                SceneEvent::EdgeRemoved(_) => tally.edges_removed += 1,
                SceneEvent::EdgeConnected { .. } => tally.connected += 1,
                SceneEvent::SourceDisconnected { .. } => tally.source_disconnected += 1,
                SceneEvent::SinkDisconnected { .. } => tally.sink_disconnected += 1,
            }
        }
        tally
    }
}

/// Every socket/edge back reference agrees with its forward reference.
pub fn assert_links_consistent(scene: &Scene) {
    for edge in scene.edges() {
        for socket in [edge.source(), edge.sink()].into_iter().flatten() {
            let s = scene.socket(socket).expect("edge points at a live socket");
            assert_eq!(s.edge(), Some(edge.id()), "{} bound to {} but not back", edge.id(), socket);
        }
    }
    for socket in scene.sockets() {
        if let Some(edge) = socket.edge() {
            let e = scene.edge(edge).expect("socket points at a live edge");
            assert_eq!(e.side_of(socket.id()), Some(socket.kind()), "{} holds {} but not back", socket.id(), edge);
        }
    }
}
