//! Level 4: Viewport And Rendering Tests
//!
//! Tests zoom and pan, gestures under a non-identity viewport, Slint window
//! event translation and syncing of render models.

mod common;

use std::rc::Rc;

use common::harness::CanvasHarness;
use common::two_node_scene;
use slint::platform::{Key, PointerEventButton, WindowEvent};
use slint::{Model, SharedString, VecModel};
use slint_node_canvas::{
    CanvasConfig, CanvasController, CursorShape, EventResult, Modifiers, Point, PointerButton,
    PointerButtons, PointerEvent, RenderModels, Viewport,
};

fn wheel(ctrl: &CanvasController, delta_y: f32, modifiers: Modifiers, at: Point) -> EventResult {
    ctrl.handle_event(PointerEvent::Wheel { delta_x: 0.0, delta_y, modifiers, position: at })
}

#[test]
fn test_first_resize_centres_once() {
    let (scene, _, _, _, _) = two_node_scene();
    let ctrl = CanvasController::new(scene);

    ctrl.resize(800.0, 600.0);
    assert_eq!(ctrl.viewport(), Viewport::new(1.0, 50.0, 50.0));
    assert_eq!(ctrl.to_scene(Point::new(50.0, 50.0)), Point::new(0.0, 0.0));

    ctrl.resize(1024.0, 768.0);
    assert_eq!(ctrl.viewport(), Viewport::new(1.0, 50.0, 50.0));
}

#[test]
fn test_ctrl_wheel_zooms_around_pointer() {
    let ctrl = CanvasController::default();
    let anchor = Point::new(400.0, 300.0);
    let before = ctrl.to_scene(anchor);

    assert_eq!(wheel(&ctrl, -120.0, Modifiers::CONTROL, anchor), EventResult::Accepted);
    assert_eq!(ctrl.viewport().zoom, 1.25);
    assert_eq!(ctrl.to_scene(anchor), before);

    wheel(&ctrl, 120.0, Modifiers::CONTROL, anchor);
    wheel(&ctrl, 120.0, Modifiers::CONTROL, anchor);
    assert!((ctrl.viewport().zoom - 0.8).abs() < 1e-6);
}

#[test]
fn test_zoom_is_clamped() {
    let ctrl = CanvasController::with_config(Default::default(), CanvasConfig::default().with_zoom_range(0.5, 2.0));
    for _ in 0..20 {
        wheel(&ctrl, -1.0, Modifiers::CONTROL, Point::new(0.0, 0.0));
    }
    assert_eq!(ctrl.viewport().zoom, 2.0);
    for _ in 0..20 {
        wheel(&ctrl, 1.0, Modifiers::CONTROL, Point::new(0.0, 0.0));
    }
    assert_eq!(ctrl.viewport().zoom, 0.5);
}

#[test]
fn test_reversed_zoom_range_does_not_panic() {
    let ctrl = CanvasController::with_config(Default::default(), CanvasConfig::default().with_zoom_range(5.0, 1.0));
    for _ in 0..20 {
        wheel(&ctrl, -1.0, Modifiers::CONTROL, Point::new(0.0, 0.0));
    }
    assert_eq!(ctrl.viewport().zoom, 5.0);
    for _ in 0..20 {
        wheel(&ctrl, 1.0, Modifiers::CONTROL, Point::new(0.0, 0.0));
    }
    assert_eq!(ctrl.viewport().zoom, 1.0);
}

#[test]
fn test_plain_wheel_pans() {
    let ctrl = CanvasController::default();
    ctrl.handle_event(PointerEvent::Wheel {
        delta_x: 10.0,
        delta_y: -20.0,
        modifiers: Modifiers::NONE,
        position: Point::new(100.0, 100.0),
    });
    assert_eq!(ctrl.viewport(), Viewport::new(1.0, 10.0, -20.0));
}

#[test]
fn test_wheel_zoom_without_control_when_configured() {
    let config = CanvasConfig::default().with_wheel_zoom_requires_control(false).with_zoom_step(2.0);
    let ctrl = CanvasController::with_config(Default::default(), config);
    wheel(&ctrl, -1.0, Modifiers::NONE, Point::new(0.0, 0.0));
    assert_eq!(ctrl.viewport().zoom, 2.0);
}

#[test]
fn test_middle_button_pans() {
    let ctrl = CanvasController::default();
    let result = ctrl.handle_event(PointerEvent::Down {
        button: PointerButton::Auxiliary,
        position: Point::new(10.0, 10.0),
        modifiers: Modifiers::NONE,
    });
    assert_eq!(result, EventResult::Accepted);
    assert_eq!(ctrl.cursor(), CursorShape::ClosedHand);

    ctrl.handle_event(PointerEvent::Move { buttons: PointerButtons::AUXILIARY, position: Point::new(20.0, 30.0) });
    ctrl.handle_event(PointerEvent::Move { buttons: PointerButtons::AUXILIARY, position: Point::new(30.0, 50.0) });
    ctrl.handle_event(PointerEvent::Up { button: PointerButton::Auxiliary, position: Point::new(30.0, 50.0) });

    assert_eq!(ctrl.viewport(), Viewport::new(1.0, 20.0, 40.0));
    assert!(ctrl.gesture().is_idle());
    assert_eq!(ctrl.cursor(), CursorShape::Arrow);
}

#[test]
fn test_gestures_under_zoom_and_pan() {
    let (scene, n1, out, _, inp) = two_node_scene();
    let h = CanvasHarness::new(scene);
    h.ctrl.set_viewport(Viewport::new(2.0, 100.0, 50.0));

    h.drag_socket(out, inp);
    assert_eq!(h.scene().connections().len(), 1);

    h.drag(Point::new(50.0, 50.0), Point::new(70.0, 40.0));
    assert_eq!(h.node_pos(n1), Point::new(20.0, -10.0));
}

#[test]
fn test_scene_is_unchanged_by_viewport() {
    let (scene, n1, out, _, _) = two_node_scene();
    let h = CanvasHarness::new(scene);
    let anchor = h.anchor(out);

    wheel(&h.ctrl, -1.0, Modifiers::CONTROL, Point::new(123.0, 45.0));
    wheel(&h.ctrl, 3.0, Modifiers::NONE, Point::new(0.0, 0.0));

    assert_eq!(h.anchor(out), anchor);
    assert_eq!(h.node_pos(n1), Point::new(0.0, 0.0));
}

#[test]
fn test_window_events_zoom_with_control_held() {
    let ctrl = CanvasController::default();
    let control: SharedString = Key::Control.into();

    ctrl.handle_window_event(&WindowEvent::KeyPressed { text: control.clone() });
    ctrl.handle_window_event(&WindowEvent::PointerScrolled {
        position: Point::new(0.0, 0.0),
        delta_x: 0.0,
        delta_y: -1.0,
    });
    assert_eq!(ctrl.viewport().zoom, 1.25);

    ctrl.handle_window_event(&WindowEvent::KeyReleased { text: control });
    ctrl.handle_window_event(&WindowEvent::PointerScrolled {
        position: Point::new(0.0, 0.0),
        delta_x: 0.0,
        delta_y: -1.0,
    });
    assert_eq!(ctrl.viewport().zoom, 1.25);
    assert_eq!(ctrl.viewport().pan_y, -1.0);
}

#[test]
fn test_window_events_drive_edge_drag() {
    let (scene, _, out, _, inp) = two_node_scene();
    let ctrl = CanvasController::new(scene);
    let (a, b) = {
        let scene = ctrl.scene();
        let scene = scene.borrow();
        (scene.socket_anchor(out).unwrap(), scene.socket_anchor(inp).unwrap())
    };

    ctrl.handle_window_event(&WindowEvent::PointerPressed { position: a, button: PointerEventButton::Left });
    ctrl.handle_window_event(&WindowEvent::PointerMoved { position: b });
    assert_eq!(ctrl.cursor(), CursorShape::DragMove);
    ctrl.handle_window_event(&WindowEvent::PointerReleased { position: b, button: PointerEventButton::Left });

    assert_eq!(ctrl.scene().borrow().connections().len(), 1);
}

#[test]
fn test_render_models_follow_scene() {
    let (scene, _, out, _, inp) = two_node_scene();
    let h = CanvasHarness::new(scene);
    let nodes = Rc::new(VecModel::<SharedString>::default());
    let sockets = Rc::new(VecModel::<SharedString>::default());
    let edges = Rc::new(VecModel::<SharedString>::default());

    let mut models = RenderModels::new();
    models.bind_nodes(nodes.clone(), |n| n.title.clone());
    models.bind_sockets(sockets.clone(), |s| s.label.clone());
    models.bind_edges(edges.clone(), |e| e.path_commands.clone());

    assert!(models.sync_if_needed(&mut h.scene_mut(), &h.ctrl.viewport()));
    assert!(!models.sync_if_needed(&mut h.scene_mut(), &h.ctrl.viewport()));
    assert_eq!(nodes.row_count(), 2);
    assert_eq!(sockets.row_count(), 2);
    assert_eq!(edges.row_count(), 0);

    h.drag_socket(out, inp);
    assert!(models.sync_if_needed(&mut h.scene_mut(), &h.ctrl.viewport()));
    assert_eq!(edges.row_count(), 1);
    assert_eq!(edges.row_data(0).unwrap(), "M 150 97.5 C 225 97.5 225 37.5 300 37.5");

    h.ctrl.set_viewport(Viewport::new(2.0, 0.0, 0.0));
    assert!(models.sync_if_needed(&mut h.scene_mut(), &h.ctrl.viewport()));
    assert_eq!(edges.row_data(0).unwrap(), "M 300 195 C 450 195 450 75 600 75");

    let e = h.scene().connections()[0].0;
    h.scene_mut().remove_edge(e).unwrap();
    assert!(models.sync_if_needed(&mut h.scene_mut(), &h.ctrl.viewport()));
    assert_eq!(edges.row_count(), 0);
}

#[test]
fn test_selected_node_is_painted_last() {
    let (scene, n1, _, n2, _) = two_node_scene();
    let h = CanvasHarness::new(scene);
    assert_eq!(h.scene().node_paint_order(), vec![n1, n2]);

    h.drag(Point::new(50.0, 50.0), Point::new(50.0, 50.0));
    assert_eq!(h.scene().node_paint_order(), vec![n2, n1]);
    assert!(h.scene().node_geometry(n1).unwrap().selected);
}
