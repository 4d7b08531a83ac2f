//! Canvas controller: the pointer-driven gesture state machine.
//!
//! The [`CanvasController`] is the only component that mutates the scene as a
//! direct result of user input. It turns pointer events (in view coordinates)
//! into edge drags, node resizes, node moves, panning and zooming.
//!
//! # Example
//!
//! ```ignore
//! use slint_node_canvas::{CanvasController, Scene};
//!
//! slint::include_modules!();
//!
//! fn main() {
//!     let window = MainWindow::new().unwrap();
//!     let ctrl = CanvasController::new(Scene::new());
//!
//!     let a = ctrl.scene().borrow_mut().add_node("Source", slint::LogicalPosition::new(0.0, 0.0));
//!     ctrl.scene().borrow_mut().add_source(a, "value").unwrap();
//!
//!     window.on_canvas_resized({
//!         let ctrl = ctrl.clone();
//!         move |w, h| ctrl.resize(w, h)
//!     });
//!
//!     window.on_pointer({
//!         let ctrl = ctrl.clone();
//!         move |kind, button, x, y| {
//!             // translate the TouchArea event into a PointerEvent here
//!         }
//!     });
//!
//!     window.run().unwrap();
//! }
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use slint::platform::{PointerEventButton, WindowEvent};

use crate::error::GraphError;
use crate::geometry::{delta, offset, Point, Size};
use crate::hit_test::HitItem;
use crate::scene::{EdgeId, NodeId, Scene, SocketId};
use crate::socket::SocketKind;
use crate::validation::{validate_drop, CompositeValidator, ConnectionValidator, DropContext};
use crate::viewport::Viewport;

/// Tunables of the canvas view.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CanvasConfig {
    /// Zoom factor per wheel notch.
    pub zoom_step: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Zoom only while Control is held; otherwise the wheel always zooms.
    pub wheel_zoom_requires_control: bool,
    /// View units scrolled per wheel delta unit.
    pub wheel_scroll_step: f32,
    /// The first resize puts the scene origin this far from the top-left corner.
    pub initial_center_offset: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            zoom_step: 1.25,
            min_zoom: 0.1,
            max_zoom: 10.0,
            wheel_zoom_requires_control: true,
            wheel_scroll_step: 1.0,
            initial_center_offset: 50.0,
        }
    }
}

impl CanvasConfig {
    /// Bounds may be given in either order.
    pub fn with_zoom_range(mut self, min: f32, max: f32) -> Self {
        self.min_zoom = min.min(max);
        self.max_zoom = min.max(max);
        self
    }

    pub fn with_zoom_step(mut self, step: f32) -> Self {
        self.zoom_step = step;
        self
    }

    pub fn with_wheel_zoom_requires_control(mut self, required: bool) -> Self {
        self.wheel_zoom_requires_control = required;
        self
    }
}

/// Pointer buttons the canvas distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Drag, connect, resize, move.
    Primary,
    /// Pan.
    Auxiliary,
    Secondary,
    Other,
}

impl From<PointerEventButton> for PointerButton {
    fn from(button: PointerEventButton) -> Self {
        match button {
            PointerEventButton::Left => PointerButton::Primary,
            PointerEventButton::Middle => PointerButton::Auxiliary,
            PointerEventButton::Right => PointerButton::Secondary,
            _ => PointerButton::Other,
        }
    }
}

/// Set of pressed buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerButtons {
    pub primary: bool,
    pub auxiliary: bool,
    pub secondary: bool,
}

impl PointerButtons {
    pub const NONE: Self = Self { primary: false, auxiliary: false, secondary: false };
    pub const PRIMARY: Self = Self { primary: true, auxiliary: false, secondary: false };
    pub const AUXILIARY: Self = Self { primary: false, auxiliary: true, secondary: false };

    pub fn is_empty(self) -> bool {
        self == Self::NONE
    }

    pub fn contains(self, button: PointerButton) -> bool {
        match button {
            PointerButton::Primary => self.primary,
            PointerButton::Auxiliary => self.auxiliary,
            PointerButton::Secondary => self.secondary,
            PointerButton::Other => false,
        }
    }

    fn set(&mut self, button: PointerButton, down: bool) {
        match button {
            PointerButton::Primary => self.primary = down,
            PointerButton::Auxiliary => self.auxiliary = down,
            PointerButton::Secondary => self.secondary = down,
            PointerButton::Other => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub control: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { control: false, shift: false, alt: false };
    pub const CONTROL: Self = Self { control: true, shift: false, alt: false };
}

/// Normalized pointer input. Positions are in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { button: PointerButton, position: Point, modifiers: Modifiers },
    Move { buttons: PointerButtons, position: Point },
    Up { button: PointerButton, position: Point },
    Wheel { delta_x: f32, delta_y: f32, modifiers: Modifiers, position: Point },
}

/// Cursor glyph the host should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Arrow,
    /// Hovering a socket circle.
    OpenHand,
    /// Dragging with nothing droppable underneath, or panning.
    ClosedHand,
    /// Dragging over a socket that accepts the edge.
    DragMove,
    /// Dragging over a socket that rejects the edge.
    Forbidden,
}

/// How an edge drag began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOrigin {
    /// A new edge was created at an empty socket.
    Fresh,
    /// An existing edge was unplugged from the pressed socket.
    TakeOver,
}

/// The active gesture. At most one at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    DraggingEdge {
        edge: EdgeId,
        /// The unbound side; the free end must land on a socket of this kind.
        free: SocketKind,
        origin: DragOrigin,
    },
    ResizingNode { node: NodeId, original: Size },
    MovingNode { node: NodeId, grab_dx: f32, grab_dy: f32, original: Point },
    Panning { last: Point },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Accepted,
    Ignored,
}

#[derive(Debug)]
struct CanvasState {
    config: CanvasConfig,
    viewport: Viewport,
    gesture: Gesture,
    cursor: CursorShape,
    first_resize: bool,
    view_size: Size,
    buttons: PointerButtons,
    modifiers: Modifiers,
}

/// Controller that owns the scene and drives it from pointer input.
///
/// Clone this controller to share it across callbacks.
#[derive(Clone)]
pub struct CanvasController {
    scene: Rc<RefCell<Scene>>,
    state: Rc<RefCell<CanvasState>>,
    validator: Rc<RefCell<CompositeValidator>>,
}

impl Default for CanvasController {
    fn default() -> Self {
        Self::new(Scene::new())
    }
}

impl CanvasController {
    pub fn new(scene: Scene) -> Self {
        Self::with_config(scene, CanvasConfig::default())
    }

    pub fn with_config(scene: Scene, config: CanvasConfig) -> Self {
        Self {
            scene: Rc::new(RefCell::new(scene)),
            state: Rc::new(RefCell::new(CanvasState {
                config,
                viewport: Viewport::default(),
                gesture: Gesture::Idle,
                cursor: CursorShape::Arrow,
                first_resize: true,
                view_size: Size::new(0.0, 0.0),
                buttons: PointerButtons::NONE,
                modifiers: Modifiers::NONE,
            })),
            validator: Rc::new(RefCell::new(CompositeValidator::new())),
        }
    }

    /// Shared handle to the scene.
    pub fn scene(&self) -> Rc<RefCell<Scene>> {
        self.scene.clone()
    }

    pub fn config(&self) -> CanvasConfig {
        self.state.borrow().config
    }

    pub fn set_config(&self, config: CanvasConfig) {
        self.state.borrow_mut().config = config;
    }

    pub fn gesture(&self) -> Gesture {
        self.state.borrow().gesture
    }

    pub fn cursor(&self) -> CursorShape {
        self.state.borrow().cursor
    }

    pub fn viewport(&self) -> Viewport {
        self.state.borrow().viewport
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.state.borrow_mut().viewport = viewport;
        self.scene.borrow_mut().mark_dirty();
    }

    pub fn view_size(&self) -> Size {
        self.state.borrow().view_size
    }

    /// Add a drop rule checked after the built-in kind rule.
    pub fn add_validator(&self, validator: impl ConnectionValidator + 'static) {
        self.validator.borrow_mut().push(Box::new(validator));
    }

    /// Map a view position to scene coordinates with the current viewport.
    pub fn to_scene(&self, view: Point) -> Point {
        self.state.borrow().viewport.to_scene(view)
    }

    /// The view was resized. The very first call centres the view so the
    /// scene origin sits near the top-left corner.
    pub fn resize(&self, width: f32, height: f32) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.view_size = Size::new(width, height);
        if state.first_resize {
            let off = state.config.initial_center_offset;
            let target = Point::new(width / 2.0 - off, height / 2.0 - off);
            state.viewport.center_on(target, state.view_size);
            state.first_resize = false;
            debug!("initial view centred on ({}, {})", target.x, target.y);
        }
        self.scene.borrow_mut().mark_dirty();
    }

    /// Feed one pointer event.
    pub fn handle_event(&self, event: PointerEvent) -> EventResult {
        let mut scene = self.scene.borrow_mut();
        let mut state = self.state.borrow_mut();
        let validator = self.validator.borrow();
        let mut cx = Dispatch { scene: &mut *scene, state: &mut *state, validator: &*validator };
        match cx.dispatch(event) {
            Ok(result) => result,
            Err(err) => {
                warn!("gesture aborted: {}", err);
                cx.abort();
                EventResult::Accepted
            }
        }
    }

    /// Translate a Slint window event and feed it.
    ///
    /// Pressed buttons and the Control key are tracked across events since
    /// window move and scroll events do not carry them.
    pub fn handle_window_event(&self, event: &WindowEvent) -> EventResult {
        let translated = {
            let mut state = self.state.borrow_mut();
            match event {
                WindowEvent::PointerPressed { position, button } => Some(PointerEvent::Down {
                    button: (*button).into(),
                    position: *position,
                    modifiers: state.modifiers,
                }),
                WindowEvent::PointerReleased { position, button } => {
                    Some(PointerEvent::Up { button: (*button).into(), position: *position })
                }
                WindowEvent::PointerMoved { position } => {
                    Some(PointerEvent::Move { buttons: state.buttons, position: *position })
                }
                WindowEvent::PointerScrolled { position, delta_x, delta_y } => Some(PointerEvent::Wheel {
                    delta_x: *delta_x,
                    delta_y: *delta_y,
                    modifiers: state.modifiers,
                    position: *position,
                }),
                WindowEvent::KeyPressed { text } if is_control(text) => {
                    state.modifiers.control = true;
                    None
                }
                WindowEvent::KeyReleased { text } if is_control(text) => {
                    state.modifiers.control = false;
                    None
                }
                _ => None,
            }
        };
        match translated {
            Some(event) => self.handle_event(event),
            None => EventResult::Ignored,
        }
    }

    /// Abort the active gesture: a dragged edge is removed, a resized or
    /// moved node returns to where it was.
    pub fn cancel_gesture(&self) {
        let mut scene = self.scene.borrow_mut();
        let mut state = self.state.borrow_mut();
        let validator = self.validator.borrow();
        let mut cx = Dispatch { scene: &mut *scene, state: &mut *state, validator: &*validator };
        cx.abort();
    }
}

fn is_control(text: &slint::SharedString) -> bool {
    *text == slint::SharedString::from(slint::platform::Key::Control)
}

struct Dispatch<'a> {
    scene: &'a mut Scene,
    state: &'a mut CanvasState,
    validator: &'a CompositeValidator,
}

impl Dispatch<'_> {
    fn dispatch(&mut self, event: PointerEvent) -> Result<EventResult, GraphError> {
        match event {
            PointerEvent::Down { button, position, modifiers } => {
                self.state.buttons.set(button, true);
                self.state.modifiers = modifiers;
                self.press(button, position)
            }
            PointerEvent::Move { buttons, position } => {
                self.state.buttons = buttons;
                self.moved(buttons, position)
            }
            PointerEvent::Up { button, position } => {
                self.state.buttons.set(button, false);
                self.release(button, position)
            }
            PointerEvent::Wheel { delta_x, delta_y, modifiers, position } => {
                self.state.modifiers = modifiers;
                Ok(self.wheel(delta_x, delta_y, modifiers, position))
            }
        }
    }

    fn press(&mut self, button: PointerButton, view: Point) -> Result<EventResult, GraphError> {
        if !self.state.gesture.is_idle() {
            return Ok(EventResult::Ignored);
        }
        match button {
            PointerButton::Primary => self.primary_press(view),
            PointerButton::Auxiliary => {
                self.state.gesture = Gesture::Panning { last: view };
                self.state.cursor = CursorShape::ClosedHand;
                debug!("pan started");
                Ok(EventResult::Accepted)
            }
            _ => Ok(EventResult::Ignored),
        }
    }

    fn primary_press(&mut self, view: Point) -> Result<EventResult, GraphError> {
        let p = self.state.viewport.to_scene(view);

        match self.scene.item_at(p) {
            Some(HitItem::Socket(socket)) => {
                if self.scene.socket_hit(p) == Some(socket) {
                    return self.start_edge_drag(socket, p);
                }
                // a press on the label moves the node like its body would
                let node = self.scene.socket_ref(socket)?.node();
                self.start_node_gesture(node, p)
            }
            Some(HitItem::Node(node)) => self.start_node_gesture(node, p),
            Some(HitItem::Edge(_)) | None => {
                self.scene.select_node(None);
                Ok(EventResult::Ignored)
            }
        }
    }

    fn start_edge_drag(&mut self, socket: SocketId, p: Point) -> Result<EventResult, GraphError> {
        let s = self.scene.socket_ref(socket)?;
        let kind = s.kind();

        let (edge, free, origin) = match s.edge() {
            Some(edge) => {
                // unplug the pressed end, the other end stays where it is
                match kind {
                    SocketKind::Sink => self.scene.disconnect_sink(edge)?,
                    SocketKind::Source => self.scene.disconnect_source(edge)?,
                }
                (edge, kind, DragOrigin::TakeOver)
            }
            None => {
                let edge = self.scene.add_edge_between(p, p);
                match kind {
                    SocketKind::Sink => self.scene.connect_sink(edge, socket)?,
                    SocketKind::Source => self.scene.connect_source(edge, socket)?,
                };
                (edge, kind.opposite(), DragOrigin::Fresh)
            }
        };

        self.set_free_end(edge, free, p)?;
        self.scene.raise_edge(Some(edge));
        self.state.gesture = Gesture::DraggingEdge { edge, free, origin };
        self.state.cursor = CursorShape::ClosedHand;
        debug!("edge drag started: {} from {} ({:?}, free {})", edge, socket, origin, free);
        Ok(EventResult::Accepted)
    }

    fn start_node_gesture(&mut self, node: NodeId, p: Point) -> Result<EventResult, GraphError> {
        self.scene.select_node(Some(node));
        let n = self.scene.node_ref(node)?;
        let origin = n.position();
        let local = Point::new(p.x - origin.x, p.y - origin.y);

        if n.is_in_resize_handle(local) {
            let original = n.size();
            self.state.gesture = Gesture::ResizingNode { node, original };
            debug!("resize started: {} at {}x{}", node, original.width, original.height);
        } else {
            self.state.gesture = Gesture::MovingNode { node, grab_dx: local.x, grab_dy: local.y, original: origin };
            debug!("move started: {}", node);
        }
        Ok(EventResult::Accepted)
    }

    fn moved(&mut self, buttons: PointerButtons, view: Point) -> Result<EventResult, GraphError> {
        let p = self.state.viewport.to_scene(view);
        let gesture = self.state.gesture;
        match gesture {
            Gesture::DraggingEdge { edge, free, .. } if buttons.primary => {
                self.set_free_end(edge, free, p)?;
                self.state.cursor = match self.scene.socket_hit(p) {
                    None => CursorShape::ClosedHand,
                    Some(target) => {
                        if self.accepts(edge, free, target)? {
                            CursorShape::DragMove
                        } else {
                            CursorShape::Forbidden
                        }
                    }
                };
                Ok(EventResult::Accepted)
            }
            Gesture::ResizingNode { node, .. } if buttons.primary => {
                let origin = self.scene.node_ref(node)?.position();
                self.scene.set_node_size(node, p.x - origin.x, p.y - origin.y)?;
                Ok(EventResult::Accepted)
            }
            Gesture::MovingNode { node, grab_dx, grab_dy, .. } if buttons.primary => {
                self.scene.set_node_position(node, offset(p, -grab_dx, -grab_dy))?;
                Ok(EventResult::Accepted)
            }
            Gesture::Panning { last } if buttons.auxiliary => {
                let (dx, dy) = delta(last, view);
                self.state.viewport.pan_by(dx, dy);
                self.state.gesture = Gesture::Panning { last: view };
                self.scene.mark_dirty();
                Ok(EventResult::Accepted)
            }
            _ => {
                if buttons.is_empty() {
                    self.state.cursor = if self.scene.socket_hit(p).is_some() {
                        CursorShape::OpenHand
                    } else {
                        CursorShape::Arrow
                    };
                }
                Ok(EventResult::Ignored)
            }
        }
    }

    fn release(&mut self, button: PointerButton, view: Point) -> Result<EventResult, GraphError> {
        self.state.cursor = CursorShape::Arrow;
        let p = self.state.viewport.to_scene(view);

        match (self.state.gesture, button) {
            (Gesture::DraggingEdge { edge, free, origin }, PointerButton::Primary) => {
                self.state.gesture = Gesture::Idle;
                self.scene.raise_edge(None);
                self.finish_edge_drag(edge, free, origin, p)?;
                Ok(EventResult::Accepted)
            }
            (Gesture::ResizingNode { node, .. }, PointerButton::Primary) => {
                self.state.gesture = Gesture::Idle;
                debug!("resize finished: {}", node);
                Ok(EventResult::Accepted)
            }
            (Gesture::MovingNode { node, .. }, PointerButton::Primary) => {
                self.state.gesture = Gesture::Idle;
                debug!("move finished: {}", node);
                Ok(EventResult::Accepted)
            }
            (Gesture::Panning { .. }, PointerButton::Auxiliary) => {
                self.state.gesture = Gesture::Idle;
                debug!("pan finished");
                Ok(EventResult::Accepted)
            }
            _ => Ok(EventResult::Ignored),
        }
    }

    fn finish_edge_drag(&mut self, edge: EdgeId, free: SocketKind, origin: DragOrigin, p: Point) -> Result<(), GraphError> {
        let target = self.scene.socket_hit(p);
        let ctx = self.drop_context(edge, free, target)?;

        match (target, validate_drop(&*self.scene, &ctx, self.validator).into_result()) {
            (Some(target), Ok(())) => {
                let evicted = match free {
                    SocketKind::Sink => self.scene.connect_sink(edge, target)?,
                    SocketKind::Source => self.scene.connect_source(edge, target)?,
                };
                if let Some(evicted) = evicted {
                    let dangling = self.scene.edge(evicted).is_some_and(|e| !e.is_connected());
                    if dangling {
                        self.scene.remove_edge(evicted)?;
                        debug!("removed {} evicted by drop", evicted);
                    }
                }
                debug!("edge drag completed: {} onto {}", edge, target);
            }
            (_, result) => {
                self.scene.remove_edge(edge)?;
                debug!("edge drag cancelled ({:?}): {} removed, reason {:?}", origin, edge, result.err());
            }
        }
        Ok(())
    }

    fn wheel(&mut self, delta_x: f32, delta_y: f32, modifiers: Modifiers, view: Point) -> EventResult {
        let config = self.state.config;
        if modifiers.control || !config.wheel_zoom_requires_control {
            // negative delta zooms in
            let factor = if delta_y < 0.0 { config.zoom_step } else { 1.0 / config.zoom_step };
            self.state.viewport.zoom_at(factor, view, config.min_zoom, config.max_zoom);
        } else {
            self.state.viewport.pan_by(delta_x * config.wheel_scroll_step, delta_y * config.wheel_scroll_step);
        }
        self.scene.mark_dirty();
        EventResult::Accepted
    }

    fn set_free_end(&mut self, edge: EdgeId, free: SocketKind, p: Point) -> Result<(), GraphError> {
        match free {
            SocketKind::Source => self.scene.set_edge_start(edge, p),
            SocketKind::Sink => self.scene.set_edge_stop(edge, p),
        }
    }

    fn drop_context(&self, edge: EdgeId, free: SocketKind, target: Option<SocketId>) -> Result<DropContext, GraphError> {
        let anchored = self.scene.edge_ref(edge)?.socket(free.opposite());
        Ok(DropContext { edge, required: free, anchored, target })
    }

    fn accepts(&self, edge: EdgeId, free: SocketKind, target: SocketId) -> Result<bool, GraphError> {
        let ctx = self.drop_context(edge, free, Some(target))?;
        Ok(validate_drop(&*self.scene, &ctx, self.validator).is_valid())
    }

    fn abort(&mut self) {
        match self.state.gesture {
            Gesture::DraggingEdge { edge, .. } => {
                if self.scene.contains_edge(edge) {
                    if let Err(err) = self.scene.remove_edge(edge) {
                        warn!("could not remove dragged {}: {}", edge, err);
                    }
                }
                self.scene.raise_edge(None);
            }
            Gesture::ResizingNode { node, original } => {
                if self.scene.contains_node(node) {
                    if let Err(err) = self.scene.set_node_size(node, original.width, original.height) {
                        warn!("could not restore size of {}: {}", node, err);
                    }
                }
            }
            Gesture::MovingNode { node, original, .. } => {
                if self.scene.contains_node(node) {
                    if let Err(err) = self.scene.set_node_position(node, original) {
                        warn!("could not restore position of {}: {}", node, err);
                    }
                }
            }
            Gesture::Panning { .. } | Gesture::Idle => {}
        }
        if !self.state.gesture.is_idle() {
            debug!("gesture cancelled: {:?}", self.state.gesture);
        }
        self.state.gesture = Gesture::Idle;
        self.state.cursor = CursorShape::Arrow;
    }
}
