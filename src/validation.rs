//! Drop-target validation for edge drags.
//!
//! When the free end of a dragged edge is released over a socket, the
//! controller asks a [`ConnectionValidator`] whether the connection is allowed.
//! The [`KindValidator`] rule (opposite kind, never the anchored socket itself)
//! always applies; hosts can add their own rules on top, e.g. type checks
//! between sockets, with a [`CompositeValidator`].

use thiserror::Error;

use crate::scene::{EdgeId, Scene, SocketId};
use crate::socket::SocketKind;

/// What is being dropped where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropContext {
    /// The dragged edge.
    pub edge: EdgeId,
    /// Kind of socket the free end must land on.
    pub required: SocketKind,
    /// Socket holding the other end of the edge, if bound.
    pub anchored: Option<SocketId>,
    /// Socket under the pointer.
    pub target: Option<SocketId>,
}

/// Result of drop validation with optional rejection reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Combine two results (AND logic): returns first error if any
    pub fn and(self, other: ValidationResult) -> ValidationResult {
        match self {
            ValidationResult::Valid => other,
            invalid => invalid,
        }
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(err) => Err(err),
        }
    }
}

/// Reasons why a drop target was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no socket under the pointer")]
    NoSocket,
    #[error("cannot connect a socket to itself")]
    SameSocket,
    #[error("cannot drop onto a {found}, expected a {expected}")]
    SameKind { expected: SocketKind, found: SocketKind },
    #[error("cannot connect sockets of the same node")]
    SameNode,
    #[error("{0}")]
    Custom(String),
}

/// A rule deciding whether the free end of an edge may land on a socket.
///
/// # Example
///
/// ```ignore
/// struct OnlyLabelled(&'static str);
///
/// impl ConnectionValidator for OnlyLabelled {
///     fn validate(&self, scene: &Scene, drop: &DropContext) -> ValidationResult {
///         match drop.target.and_then(|s| scene.socket(s)) {
///             Some(s) if s.label() == self.0 => ValidationResult::Valid,
///             _ => ValidationResult::Invalid(ValidationError::Custom("wrong label".into())),
///         }
///     }
/// }
/// ```
pub trait ConnectionValidator {
    fn validate(&self, scene: &Scene, drop: &DropContext) -> ValidationResult;
}

impl<F> ConnectionValidator for F
where
    F: Fn(&Scene, &DropContext) -> ValidationResult,
{
    fn validate(&self, scene: &Scene, drop: &DropContext) -> ValidationResult {
        self(scene, drop)
    }
}

/// The built-in rule: there is a socket, it is not the anchored socket, and
/// its kind is the one the free end requires.
#[derive(Clone, Copy, Debug, Default)]
pub struct KindValidator;

impl ConnectionValidator for KindValidator {
    fn validate(&self, scene: &Scene, drop: &DropContext) -> ValidationResult {
        let Some(target) = drop.target else {
            return ValidationResult::Invalid(ValidationError::NoSocket);
        };
        let Some(socket) = scene.socket(target) else {
            return ValidationResult::Invalid(ValidationError::NoSocket);
        };
        if drop.anchored == Some(target) {
            return ValidationResult::Invalid(ValidationError::SameSocket);
        }
        if socket.kind() != drop.required {
            return ValidationResult::Invalid(ValidationError::SameKind {
                expected: drop.required,
                found: socket.kind(),
            });
        }
        ValidationResult::Valid
    }
}

/// Rejects edges whose two ends would sit on the same node.
#[derive(Clone, Copy, Debug, Default)]
pub struct DistinctNodeValidator;

impl ConnectionValidator for DistinctNodeValidator {
    fn validate(&self, scene: &Scene, drop: &DropContext) -> ValidationResult {
        let node_of = |s: Option<SocketId>| s.and_then(|s| scene.socket(s)).map(|s| s.node());
        match (node_of(drop.anchored), node_of(drop.target)) {
            (Some(a), Some(b)) if a == b => ValidationResult::Invalid(ValidationError::SameNode),
            _ => ValidationResult::Valid,
        }
    }
}

/// Composite validator that combines multiple validators
///
/// All validators must return Valid for the drop to be valid (AND logic).
/// Returns the first error encountered (short-circuits on failure).
#[derive(Default)]
pub struct CompositeValidator {
    validators: Vec<Box<dyn ConnectionValidator>>,
}

impl CompositeValidator {
    pub fn new() -> Self {
        Self { validators: Vec::new() }
    }

    /// Validators are checked in the order they were added.
    pub fn add<V: ConnectionValidator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn push(&mut self, validator: Box<dyn ConnectionValidator>) {
        self.validators.push(validator);
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl std::fmt::Debug for CompositeValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeValidator").field("validators", &self.validators.len()).finish()
    }
}

impl ConnectionValidator for CompositeValidator {
    fn validate(&self, scene: &Scene, drop: &DropContext) -> ValidationResult {
        for v in &self.validators {
            let result = v.validate(scene, drop);
            if !result.is_valid() {
                return result;
            }
        }
        ValidationResult::Valid
    }
}

/// Run the built-in kind rule, then `extra`.
pub fn validate_drop<V>(scene: &Scene, drop: &DropContext, extra: &V) -> ValidationResult
where
    V: ConnectionValidator + ?Sized,
{
    KindValidator.validate(scene, drop).and(extra.validate(scene, drop))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::node::tests::two_nodes;

    fn drop_on(edge: EdgeId, anchored: SocketId, target: Option<SocketId>, required: SocketKind) -> DropContext {
        DropContext { edge, required, anchored: Some(anchored), target }
    }

    #[test]
    fn test_kind_validator_accepts_opposite_kind() {
        let (mut scene, _, out, _, inp) = two_nodes();
        let e = scene.add_edge();
        let ctx = drop_on(e, out, Some(inp), SocketKind::Sink);
        assert!(KindValidator.validate(&scene, &ctx).is_valid());
    }

    #[test]
    fn test_kind_validator_rejects_same_kind() {
        let (mut scene, a, out, _, _) = two_nodes();
        let other = scene.add_source(a, "other").unwrap();
        let e = scene.add_edge();
        let ctx = drop_on(e, out, Some(other), SocketKind::Sink);
        assert_eq!(
            KindValidator.validate(&scene, &ctx),
            ValidationResult::Invalid(ValidationError::SameKind {
                expected: SocketKind::Sink,
                found: SocketKind::Source,
            })
        );
    }

    #[test]
    fn test_kind_validator_rejects_missing_and_same_socket() {
        let (mut scene, _, out, _, _) = two_nodes();
        let e = scene.add_edge();
        assert_eq!(
            KindValidator.validate(&scene, &drop_on(e, out, None, SocketKind::Sink)),
            ValidationResult::Invalid(ValidationError::NoSocket)
        );
        assert_eq!(
            KindValidator.validate(&scene, &drop_on(e, out, Some(out), SocketKind::Source)),
            ValidationResult::Invalid(ValidationError::SameSocket)
        );
    }

    #[test]
    fn test_own_node_loop_is_allowed_by_default() {
        let mut scene = Scene::new();
        let n = scene.add_node("n", Point::new(0.0, 0.0));
        let sink = scene.add_sink(n, "in").unwrap();
        let source = scene.add_source(n, "out").unwrap();
        let e = scene.add_edge();
        let ctx = drop_on(e, source, Some(sink), SocketKind::Sink);
        assert!(KindValidator.validate(&scene, &ctx).is_valid());
        assert_eq!(
            DistinctNodeValidator.validate(&scene, &ctx),
            ValidationResult::Invalid(ValidationError::SameNode)
        );
    }

    #[test]
    fn test_composite_short_circuits() {
        let (mut scene, _, out, _, inp) = two_nodes();
        let e = scene.add_edge();
        let ctx = drop_on(e, out, Some(inp), SocketKind::Sink);

        let reject = |_: &Scene, _: &DropContext| ValidationResult::Invalid(ValidationError::Custom("nope".into()));
        let composite = CompositeValidator::new().add(KindValidator).add(reject).add(DistinctNodeValidator);
        assert_eq!(composite.len(), 3);
        assert_eq!(
            composite.validate(&scene, &ctx),
            ValidationResult::Invalid(ValidationError::Custom("nope".into()))
        );
        assert!(CompositeValidator::new().validate(&scene, &ctx).is_valid());
    }

    #[test]
    fn test_validate_drop_runs_kind_rule_first() {
        let (mut scene, _, out, _, _) = two_nodes();
        let e = scene.add_edge();
        let ctx = drop_on(e, out, None, SocketKind::Sink);
        let reject = |_: &Scene, _: &DropContext| ValidationResult::Invalid(ValidationError::Custom("x".into()));
        assert_eq!(validate_drop(&scene, &ctx, &reject), ValidationResult::Invalid(ValidationError::NoSocket));
    }

    #[test]
    fn test_result_combinators() {
        assert_eq!(
            ValidationResult::Valid.and(ValidationResult::Invalid(ValidationError::SameNode)),
            ValidationResult::Invalid(ValidationError::SameNode)
        );
        assert_eq!(
            ValidationResult::Invalid(ValidationError::NoSocket).into_result(),
            Err(ValidationError::NoSocket)
        );
        assert_eq!(ValidationResult::Valid.into_result(), Ok(()));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ValidationError::SameKind { expected: SocketKind::Sink, found: SocketKind::Source }.to_string(),
            "cannot drop onto a source, expected a sink"
        );
        assert_eq!(ValidationError::Custom("boom".into()).to_string(), "boom");
    }

    #[test]
    fn test_unknown_target_counts_as_no_socket() {
        let (mut scene, _, out, _, _) = two_nodes();
        let e = scene.add_edge();
        let ctx = drop_on(e, out, Some(SocketId(999)), SocketKind::Sink);
        assert_eq!(KindValidator.validate(&scene, &ctx), ValidationResult::Invalid(ValidationError::NoSocket));
    }
}
