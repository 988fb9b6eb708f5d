//! Pointer-driven interaction: dragging nodes, panning the canvas and wheel
//! zoom.
//!
//! The controller is a small state machine keyed by pointer id. Each pointer
//! is either idle, dragging one node, or panning; sessions of different
//! pointers are independent, so two fingers may drag two nodes at once. The
//! controller never touches the layout directly: it works through the
//! [`InteractionTarget`] trait and reports [`InteractionEffect`]s so the host
//! can mirror pointer capture and redraw.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut controller = InteractionController::default();
//! let effects = controller.handle(
//!     InputEvent::PointerDown {
//!         pointer: PointerId(1),
//!         position: Point::new(40.0, 30.0),
//!         button: PointerButton::Primary,
//!         device: PointerDevice::Mouse,
//!         target: HitTarget::Node("data-prep".into()),
//!     },
//!     &mut canvas,
//! );
//! ```

use indexmap::IndexMap;
use tracing::trace;

use crate::geometry::Point;
use crate::viewport::{Transform, wheel_zoom_factor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerDevice {
    Mouse,
    Pen,
    Touch,
}

/// What the pointer went down on, as resolved by the host's hit testing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    Node(String),
    Canvas,
}

/// Typed input events. Positions are canvas-container-local screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        pointer: PointerId,
        position: Point,
        button: PointerButton,
        device: PointerDevice,
        target: HitTarget,
    },
    PointerMove {
        pointer: PointerId,
        position: Point,
    },
    PointerUp {
        pointer: PointerId,
        position: Point,
    },
    PointerCancel {
        pointer: PointerId,
    },
    LostPointerCapture {
        pointer: PointerId,
    },
    Wheel {
        position: Point,
        delta_y: f64,
    },
}

/// An in-flight drag owned by one pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSession {
    /// Dragging a node; `grab_offset` is pointer minus node origin in graph space.
    Node { node: String, grab_offset: Point },
    /// Panning; `last_pointer` is the screen position of the previous event.
    /// Moves pan the current transform, so a wheel zoom mid-pan is kept.
    Pan { last_pointer: Point },
}

/// Side effects the host should mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEffect {
    CapturePointer(PointerId),
    ReleasePointer(PointerId),
    NodeMoved { node: String, position: Point },
    TransformChanged(Transform),
}

/// The canvas state the controller manipulates.
pub trait InteractionTarget {
    fn transform(&self) -> Transform;
    fn set_transform(&mut self, transform: Transform);
    /// Origin of a node that can currently be dragged (exists and is visible).
    fn draggable_node_origin(&self, node: &str) -> Option<Point>;
    /// Move a node; the target clamps and returns the applied position.
    fn move_node(&mut self, node: &str, position: Point) -> Option<Point>;
}

#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    sessions: IndexMap<PointerId, DragSession>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self, pointer: PointerId) -> Option<&DragSession> {
        self.sessions.get(&pointer)
    }

    pub fn is_idle(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Feed one input event through the state machine.
    pub fn handle<T: InteractionTarget + ?Sized>(
        &mut self,
        event: InputEvent,
        target: &mut T,
    ) -> Vec<InteractionEffect> {
        match event {
            InputEvent::PointerDown {
                pointer,
                position,
                button,
                device,
                target: hit,
            } => self.pointer_down(pointer, position, button, device, hit, target),
            InputEvent::PointerMove { pointer, position } => {
                self.pointer_move(pointer, position, target)
            }
            InputEvent::PointerUp { pointer, .. }
            | InputEvent::PointerCancel { pointer }
            | InputEvent::LostPointerCapture { pointer } => self.end_session(pointer),
            InputEvent::Wheel { position, delta_y } => {
                let factor = wheel_zoom_factor(delta_y);
                let before = target.transform();
                let after = before.zoom_at(position, factor);
                if after == before {
                    return Vec::new();
                }
                target.set_transform(after);
                vec![InteractionEffect::TransformChanged(after)]
            }
        }
    }

    fn pointer_down<T: InteractionTarget + ?Sized>(
        &mut self,
        pointer: PointerId,
        position: Point,
        button: PointerButton,
        device: PointerDevice,
        hit: HitTarget,
        target: &mut T,
    ) -> Vec<InteractionEffect> {
        if self.sessions.contains_key(&pointer) {
            return Vec::new();
        }
        let transform = target.transform();
        let session = match hit {
            HitTarget::Node(node) => match target.draggable_node_origin(&node) {
                Some(origin) => {
                    if button != PointerButton::Primary && device != PointerDevice::Touch {
                        return Vec::new();
                    }
                    let grab_offset = transform.to_graph_space(position) - origin;
                    DragSession::Node { node, grab_offset }
                }
                None => DragSession::Pan {
                    last_pointer: position,
                },
            },
            HitTarget::Canvas => DragSession::Pan {
                last_pointer: position,
            },
        };
        trace!(pointer = pointer.0, ?session, "drag session started");
        self.sessions.insert(pointer, session);
        vec![InteractionEffect::CapturePointer(pointer)]
    }

    fn pointer_move<T: InteractionTarget + ?Sized>(
        &mut self,
        pointer: PointerId,
        position: Point,
        target: &mut T,
    ) -> Vec<InteractionEffect> {
        match self.sessions.get_mut(&pointer) {
            Some(DragSession::Node { node, grab_offset }) => {
                let graph = target.transform().to_graph_space(position);
                match target.move_node(node, graph - *grab_offset) {
                    Some(applied) => vec![InteractionEffect::NodeMoved {
                        node: node.clone(),
                        position: applied,
                    }],
                    None => Vec::new(),
                }
            }
            Some(DragSession::Pan { last_pointer }) => {
                let next = target.transform().pan_by(position - *last_pointer);
                *last_pointer = position;
                target.set_transform(next);
                vec![InteractionEffect::TransformChanged(next)]
            }
            None => Vec::new(),
        }
    }

    fn end_session(&mut self, pointer: PointerId) -> Vec<InteractionEffect> {
        match self.sessions.shift_remove(&pointer) {
            Some(_) => {
                trace!(pointer = pointer.0, "drag session ended");
                vec![InteractionEffect::ReleasePointer(pointer)]
            }
            None => Vec::new(),
        }
    }

    /// End every session, e.g. on a view switch.
    pub fn reset(&mut self) -> Vec<InteractionEffect> {
        self.sessions
            .drain(..)
            .map(|(pointer, _)| InteractionEffect::ReleasePointer(pointer))
            .collect()
    }
}
