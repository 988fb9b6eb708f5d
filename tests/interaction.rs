use runboard::canvas::CanvasState;
use runboard::geometry::{NODE_HEIGHT, NODE_WIDTH, Point};
use runboard::interaction::{
    DragSession, HitTarget, InputEvent, InteractionController, InteractionEffect, PointerButton,
    PointerDevice, PointerId,
};
use runboard::layout::parse_layout;
use runboard::model::NodeType;
use runboard::viewport::{MAX_ZOOM, MIN_ZOOM, Transform};

const LAYOUT: &str = r#"{
  "meta": {"title": "Pipeline"},
  "views": [
    {
      "id": "main", "name": "Main",
      "canvas": {"width": 800, "height": 400},
      "nodes": [
        {"id": "a", "type": "pi", "label": "A", "x": 0, "y": 0},
        {"id": "b", "type": "tool", "label": "B", "x": 300, "y": 0}
      ],
      "connections": [{"id": "a-b", "from": "a", "to": "b"}]
    },
    {
      "id": "alt", "name": "Alt",
      "canvas": {"width": 600, "height": 300},
      "nodes": [{"id": "c", "type": "agent", "label": "C", "x": 10, "y": 10}]
    }
  ]
}"#;

fn canvas() -> CanvasState {
    CanvasState::new(parse_layout(LAYOUT).unwrap()).unwrap()
}

fn down(pointer: i64, x: f64, y: f64, target: HitTarget) -> InputEvent {
    InputEvent::PointerDown {
        pointer: PointerId(pointer),
        position: Point::new(x, y),
        button: PointerButton::Primary,
        device: PointerDevice::Mouse,
        target,
    }
}

fn mv(pointer: i64, x: f64, y: f64) -> InputEvent {
    InputEvent::PointerMove {
        pointer: PointerId(pointer),
        position: Point::new(x, y),
    }
}

fn up(pointer: i64) -> InputEvent {
    InputEvent::PointerUp {
        pointer: PointerId(pointer),
        position: Point::ZERO,
    }
}

fn node(id: &str) -> HitTarget {
    HitTarget::Node(id.to_string())
}

#[test]
fn test_drag_node_keeps_grab_offset() {
    let mut c = canvas();
    let effects = c.handle_input(down(1, 320.0, 20.0, node("b")));
    assert_eq!(effects, vec![InteractionEffect::CapturePointer(PointerId(1))]);
    match c.controller().session(PointerId(1)) {
        Some(DragSession::Node { node, grab_offset }) => {
            assert_eq!(node, "b");
            assert_eq!(*grab_offset, Point::new(20.0, 20.0));
        }
        other => panic!("unexpected session {other:?}"),
    }

    let effects = c.handle_input(mv(1, 350.0, 60.0));
    assert_eq!(
        effects,
        vec![InteractionEffect::NodeMoved {
            node: "b".into(),
            position: Point::new(330.0, 40.0)
        }]
    );
    assert_eq!(c.node_position("b"), Some(Point::new(330.0, 40.0)));

    let effects = c.handle_input(up(1));
    assert_eq!(effects, vec![InteractionEffect::ReleasePointer(PointerId(1))]);
    assert!(c.controller().is_idle());
    // moves after release do nothing
    assert!(c.handle_input(mv(1, 0.0, 0.0)).is_empty());
}

#[test]
fn test_drag_respects_zoom() {
    let mut c = canvas();
    c.handle_input(InputEvent::Wheel {
        position: Point::ZERO,
        delta_y: -200.0,
    });
    let scale = c.transform().scale;
    assert!(scale > 1.0);
    // node b sits at 300*scale on screen
    c.handle_input(down(1, 300.0 * scale + 5.0, 5.0, node("b")));
    c.handle_input(mv(1, 300.0 * scale + 5.0 + 50.0 * scale, 5.0));
    let p = c.node_position("b").unwrap();
    assert!((p.x - 350.0).abs() < 1e-9 && p.y.abs() < 1e-9);
}

#[test]
fn test_node_stays_on_canvas_after_any_drag() {
    let mut c = canvas();
    c.handle_input(down(7, 10.0, 10.0, node("a")));
    let moves = [
        (-500.0, -500.0),
        (5000.0, 20.0),
        (400.0, 9000.0),
        (123.0, 45.0),
        (-1.0, 399.0),
    ];
    for (x, y) in moves {
        c.handle_input(mv(7, x, y));
        let p = c.node_position("a").unwrap();
        assert!(p.x >= 0.0 && p.x <= 800.0 - NODE_WIDTH, "x {}", p.x);
        assert!(p.y >= 0.0 && p.y <= 400.0 - NODE_HEIGHT, "y {}", p.y);
    }
    assert_eq!(c.node_position("a"), Some(Point::new(0.0, 400.0 - NODE_HEIGHT)));
}

#[test]
fn test_dragging_updates_connection_route() {
    let mut c = canvas();
    let before = c.routes()[0].path;
    c.handle_input(down(1, 310.0, 10.0, node("b")));
    c.handle_input(mv(1, 410.0, 110.0));
    let after = c.routes()[0].path;
    assert_eq!(after.end, Point::new(400.0, 100.0 + NODE_HEIGHT / 2.0));
    assert_ne!(before, after);
}

#[test]
fn test_pan_on_canvas() {
    let mut c = canvas();
    let effects = c.handle_input(down(2, 100.0, 100.0, HitTarget::Canvas));
    assert_eq!(effects, vec![InteractionEffect::CapturePointer(PointerId(2))]);
    let effects = c.handle_input(mv(2, 130.0, 90.0));
    let expected = Transform::new(30.0, -10.0, 1.0);
    assert_eq!(effects, vec![InteractionEffect::TransformChanged(expected)]);
    assert_eq!(c.transform(), expected);
    // node positions are unaffected by panning
    assert_eq!(c.node_position("a"), Some(Point::ZERO));
}

#[test]
fn test_wheel_zoom_during_pan_is_kept() {
    let mut c = canvas();
    c.handle_input(down(4, 100.0, 100.0, HitTarget::Canvas));
    c.handle_input(InputEvent::Wheel {
        position: Point::new(100.0, 100.0),
        delta_y: -200.0,
    });
    let zoomed = c.transform();
    assert!(zoomed.scale > 1.0);

    c.handle_input(mv(4, 101.0, 100.0));
    let t = c.transform();
    assert_eq!(t.scale, zoomed.scale);
    assert!((t.x - (zoomed.x + 1.0)).abs() < 1e-9);
    assert!((t.y - zoomed.y).abs() < 1e-9);

    // further moves pan from where the previous one left off
    c.handle_input(mv(4, 111.0, 95.0));
    let t = c.transform();
    assert!((t.x - (zoomed.x + 11.0)).abs() < 1e-9);
    assert!((t.y - (zoomed.y - 5.0)).abs() < 1e-9);
    assert_eq!(t.scale, zoomed.scale);
}

#[test]
fn test_pan_scale_invariant_through_sequence() {
    let mut c = canvas();
    for i in 0..20 {
        let d = if i % 2 == 0 { 400.0 } else { -350.0 };
        c.handle_input(InputEvent::Wheel {
            position: Point::new(200.0, 100.0),
            delta_y: d,
        });
        c.handle_input(down(3, 0.0, 0.0, HitTarget::Canvas));
        c.handle_input(mv(3, i as f64 * 7.0, -(i as f64)));
        c.handle_input(up(3));
        let s = c.transform().scale;
        assert!((MIN_ZOOM..=MAX_ZOOM).contains(&s));
    }
}

#[test]
fn test_secondary_button_on_node_is_ignored() {
    let mut c = canvas();
    let effects = c.handle_input(InputEvent::PointerDown {
        pointer: PointerId(1),
        position: Point::new(10.0, 10.0),
        button: PointerButton::Secondary,
        device: PointerDevice::Mouse,
        target: node("a"),
    });
    assert!(effects.is_empty());
    assert!(c.controller().is_idle());
}

#[test]
fn test_touch_on_node_drags_regardless_of_button() {
    let mut c = canvas();
    c.handle_input(InputEvent::PointerDown {
        pointer: PointerId(9),
        position: Point::new(10.0, 10.0),
        button: PointerButton::Other,
        device: PointerDevice::Touch,
        target: node("a"),
    });
    assert!(matches!(
        c.controller().session(PointerId(9)),
        Some(DragSession::Node { .. })
    ));
}

#[test]
fn test_hidden_node_press_pans() {
    let mut c = canvas();
    c.set_active_types([NodeType::Tool]);
    c.handle_input(down(1, 10.0, 10.0, node("a")));
    assert!(matches!(
        c.controller().session(PointerId(1)),
        Some(DragSession::Pan { .. })
    ));
}

#[test]
fn test_two_pointers_drag_independently() {
    let mut c = canvas();
    c.handle_input(down(1, 10.0, 10.0, node("a")));
    c.handle_input(down(2, 310.0, 10.0, node("b")));
    assert_eq!(c.controller().active_sessions(), 2);
    c.handle_input(mv(1, 60.0, 110.0));
    c.handle_input(mv(2, 360.0, 210.0));
    assert_eq!(c.node_position("a"), Some(Point::new(50.0, 100.0)));
    assert_eq!(c.node_position("b"), Some(Point::new(350.0, 200.0)));
    c.handle_input(InputEvent::PointerCancel {
        pointer: PointerId(1),
    });
    c.handle_input(InputEvent::LostPointerCapture {
        pointer: PointerId(2),
    });
    assert!(c.controller().is_idle());
}

#[test]
fn test_second_down_for_same_pointer_is_ignored() {
    let mut c = canvas();
    c.handle_input(down(1, 10.0, 10.0, node("a")));
    assert!(c.handle_input(down(1, 0.0, 0.0, HitTarget::Canvas)).is_empty());
    assert!(matches!(
        c.controller().session(PointerId(1)),
        Some(DragSession::Node { .. })
    ));
}

#[test]
fn test_view_switch_ends_sessions_and_resets_transform() {
    let mut c = canvas();
    c.handle_input(InputEvent::Wheel {
        position: Point::new(50.0, 50.0),
        delta_y: -300.0,
    });
    c.handle_input(down(1, 10.0, 10.0, node("a")));
    c.handle_input(down(2, 500.0, 300.0, HitTarget::Canvas));
    let released = c.select_view("alt").unwrap();
    assert_eq!(released.len(), 2);
    assert!(released
        .iter()
        .all(|e| matches!(e, InteractionEffect::ReleasePointer(_))));
    assert!(c.controller().is_idle());
    assert_eq!(c.transform(), Transform::DEFAULT);
    assert_eq!(c.view().id, "alt");
    // a stale move from the old drag has no effect on the new view
    assert!(c.handle_input(mv(1, 200.0, 200.0)).is_empty());
    assert_eq!(c.node_position("c"), Some(Point::new(10.0, 10.0)));
}

#[test]
fn test_controller_works_on_any_target() {
    struct Fixed {
        t: Transform,
        moved: Vec<Point>,
    }
    impl runboard::interaction::InteractionTarget for Fixed {
        fn transform(&self) -> Transform {
            self.t
        }
        fn set_transform(&mut self, t: Transform) {
            self.t = t;
        }
        fn draggable_node_origin(&self, node: &str) -> Option<Point> {
            (node == "only").then_some(Point::new(100.0, 100.0))
        }
        fn move_node(&mut self, _node: &str, position: Point) -> Option<Point> {
            self.moved.push(position);
            Some(position)
        }
    }
    let mut target = Fixed {
        t: Transform::new(0.0, 0.0, 0.5),
        moved: Vec::new(),
    };
    let mut ctl = InteractionController::new();
    ctl.handle(down(1, 55.0, 50.0, node("only")), &mut target);
    ctl.handle(mv(1, 65.0, 50.0), &mut target);
    assert_eq!(target.moved, vec![Point::new(120.0, 100.0)]);
}
