//! Pointer-driving harness around a [`CanvasController`].
//!
//! All positions passed to the helpers are scene coordinates; the harness maps
//! them through the current viewport the way a real view would.

#![allow(dead_code)]

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use slint_node_canvas::{
    CanvasController, CursorShape, EventResult, Modifiers, NodeId, Point, PointerButton, PointerButtons,
    PointerEvent, Scene, SocketId,
};

pub struct CanvasHarness {
    pub ctrl: CanvasController,
    scene: Rc<RefCell<Scene>>,
}

impl CanvasHarness {
    pub fn new(scene: Scene) -> Self {
        Self::with_controller(CanvasController::new(scene))
    }

    pub fn with_controller(ctrl: CanvasController) -> Self {
        let scene = ctrl.scene();
        Self { ctrl, scene }
    }

    pub fn scene(&self) -> Ref<'_, Scene> {
        self.scene.borrow()
    }

    pub fn scene_mut(&self) -> RefMut<'_, Scene> {
        self.scene.borrow_mut()
    }

    fn view(&self, scene_point: Point) -> Point {
        self.ctrl.viewport().to_view(scene_point)
    }

    pub fn anchor(&self, socket: SocketId) -> Point {
        self.scene().socket_anchor(socket).unwrap()
    }

    pub fn press(&self, at: Point) -> EventResult {
        self.ctrl.handle_event(PointerEvent::Down {
            button: PointerButton::Primary,
            position: self.view(at),
            modifiers: Modifiers::NONE,
        })
    }

    pub fn move_to(&self, at: Point) -> EventResult {
        self.ctrl.handle_event(PointerEvent::Move { buttons: PointerButtons::PRIMARY, position: self.view(at) })
    }

    pub fn hover(&self, at: Point) -> CursorShape {
        self.ctrl.handle_event(PointerEvent::Move { buttons: PointerButtons::NONE, position: self.view(at) });
        self.ctrl.cursor()
    }

    pub fn release(&self, at: Point) -> EventResult {
        self.ctrl.handle_event(PointerEvent::Up { button: PointerButton::Primary, position: self.view(at) })
    }

    /// Press at `from`, move to `to` in a few steps, release at `to`.
    pub fn drag(&self, from: Point, to: Point) {
        self.press(from);
        for i in 1..=4 {
            let t = i as f32 / 4.0;
            self.move_to(Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t));
        }
        self.release(to);
    }

    /// Drag from one socket circle to another.
    pub fn drag_socket(&self, from: SocketId, to: SocketId) {
        let (a, b) = (self.anchor(from), self.anchor(to));
        self.drag(a, b);
    }

    pub fn node_pos(&self, node: NodeId) -> Point {
        self.scene().node(node).unwrap().position()
    }
}
