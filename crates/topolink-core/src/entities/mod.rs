//! Diagram entities: devices, groups (rooms) and connections.

mod connection;
mod device;
mod group;

pub use connection::{Connection, PortRef};
pub use device::{Device, DeviceSpec};
pub use group::{Group, GroupSpec, MIN_GROUP_HEIGHT, MIN_GROUP_WIDTH, clamp_group_size};

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for devices.
pub type DeviceId = Uuid;
/// Unique identifier for groups.
pub type GroupId = Uuid;
/// Unique identifier for connections.
pub type ConnectionId = Uuid;
/// Port identifier as reported by telemetry (interface index).
pub type PortId = u32;

/// A physical port on a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    /// Descriptive interface name, e.g. `GigabitEthernet0/1`.
    pub name: String,
    /// Last sampled bandwidth in bits per second.
    pub bandwidth_sample: f64,
}

impl Port {
    pub fn new(id: PortId, name: impl Into<String>, bandwidth_sample: f64) -> Self {
        Self {
            id,
            name: name.into(),
            bandwidth_sample,
        }
    }
}

/// Behaviour shared by the positioned, rectangular entities.
pub trait Entity {
    fn id(&self) -> Uuid;

    /// Bounding box in content space.
    fn bounds(&self) -> Rect;

    /// Move by a content-space delta.
    fn translate(&mut self, delta: Vec2);

    fn hit_test(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }
}

/// True when `inner` lies entirely within `outer` (edges may touch).
pub fn fully_contains(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fully_contains() {
        let outer = Rect::new(50.0, 50.0, 350.0, 250.0);
        assert!(fully_contains(outer, Rect::new(80.0, 80.0, 160.0, 140.0)));
        assert!(fully_contains(outer, outer));
        // Overlap is not containment.
        assert!(!fully_contains(outer, Rect::new(300.0, 80.0, 380.0, 140.0)));
        assert!(!fully_contains(outer, Rect::new(0.0, 0.0, 10.0, 10.0)));
    }
}
