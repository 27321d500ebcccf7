//! Pointer events and per-gesture pointer tracking.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Raw pointer event in screen coordinates, as forwarded by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
    Scroll { position: Point, delta: Vec2 },
}

impl PointerEvent {
    /// Screen position carried by the event.
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position }
            | PointerEvent::Scroll { position, .. } => position,
        }
    }
}

/// Tracks the pointer while a gesture holds the capture.
///
/// Move and up events are only meaningful to the controller between
/// [`PointerTracker::capture`] and [`PointerTracker::release`]; outside that
/// window the tracker just follows the hover position.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    /// Latest pointer position in screen coordinates.
    pub position: Point,
    /// Position before the latest move.
    previous: Point,
    /// Where the captured gesture started.
    origin: Option<Point>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start capturing at `position`.
    pub fn capture(&mut self, position: Point) {
        self.position = position;
        self.previous = position;
        self.origin = Some(position);
    }

    /// Drop the capture.
    pub fn release(&mut self) {
        self.origin = None;
    }

    pub fn is_captured(&self) -> bool {
        self.origin.is_some()
    }

    /// Record a new pointer position.
    pub fn update(&mut self, position: Point) {
        self.previous = self.position;
        self.position = position;
    }

    /// Movement since the previous update.
    pub fn delta(&self) -> Vec2 {
        self.position - self.previous
    }

    /// Movement since the capture started.
    pub fn total_delta(&self) -> Option<Vec2> {
        self.origin.map(|origin| self.position - origin)
    }
}
