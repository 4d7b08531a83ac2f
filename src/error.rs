//! Error types for scene operations.

use crate::scene::{EdgeId, NodeId, SocketId};
use crate::socket::SocketKind;
use thiserror::Error;

/// Errors returned by [`Scene`](crate::Scene) operations.
///
/// These only occur when a caller passes a handle that is not (or no longer)
/// registered in the scene, or binds a socket to the wrong side of an edge.
/// Interactive gestures never surface them; the controller logs and rolls back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The node handle is not registered in this scene.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// The socket handle is not registered in this scene.
    #[error("unknown socket {0}")]
    UnknownSocket(SocketId),

    /// The edge handle is not registered in this scene.
    #[error("unknown edge {0}")]
    UnknownEdge(EdgeId),

    /// A node has no socket of the requested kind at this index.
    #[error("node {node} has no {kind} socket at index {index}")]
    NoSocketAtIndex {
        /// Node that was queried.
        node: NodeId,
        /// Kind of socket list that was indexed.
        kind: SocketKind,
        /// Requested index.
        index: usize,
    },

    /// A socket was bound to the edge side of the other kind.
    #[error("socket {socket} is a {found}, expected a {expected}")]
    WrongSocketKind {
        /// The offending socket.
        socket: SocketId,
        /// Kind the edge side requires.
        expected: SocketKind,
        /// Kind the socket actually has.
        found: SocketKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(GraphError::UnknownNode(NodeId(3)).to_string(), "unknown node node#3");
        let err = GraphError::WrongSocketKind {
            socket: SocketId(7),
            expected: SocketKind::Sink,
            found: SocketKind::Source,
        };
        assert_eq!(err.to_string(), "socket socket#7 is a source, expected a sink");
        let err = GraphError::NoSocketAtIndex {
            node: NodeId(1),
            kind: SocketKind::Sink,
            index: 4,
        };
        assert_eq!(err.to_string(), "node node#1 has no sink socket at index 4");
    }
}
