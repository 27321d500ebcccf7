//! Port anchor layout.
//!
//! Ports alternate between the left edge (even index) and the right edge
//! (odd index) of the device body. Each side stacks its ports in fixed-height
//! rows, row `index / 2`, so the layout depends only on the port order and
//! never collides as long as the body is at least
//! [`min_height_for_ports`] tall.

use crate::entities::{Device, PortId};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Height of one port row.
pub const PORT_ROW_HEIGHT: f64 = 20.0;
/// Gap between the device top edge and the first row (and below the last).
pub const PORT_TOP_PADDING: f64 = 10.0;

/// Which edge of the body a port anchor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortSide {
    Left,
    Right,
    /// Fallback anchor at the body centre (no ports, or unknown port).
    Center,
}

impl PortSide {
    /// Unit x direction pointing away from the body.
    pub fn outward(self) -> f64 {
        match self {
            PortSide::Left => -1.0,
            PortSide::Right => 1.0,
            PortSide::Center => 0.0,
        }
    }
}

/// Resolved anchor for one port.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortAnchor {
    pub port_id: PortId,
    pub position: Point,
    pub side: PortSide,
}

/// Minimum body height that fits `port_count` ports.
pub fn min_height_for_ports(port_count: usize) -> f64 {
    let rows = port_count.div_ceil(2);
    PORT_TOP_PADDING * 2.0 + rows as f64 * PORT_ROW_HEIGHT
}

fn anchor_for_index(device: &Device, index: usize) -> (Point, PortSide) {
    let side = if index % 2 == 0 {
        PortSide::Left
    } else {
        PortSide::Right
    };
    let row = (index / 2) as f64;
    let x = match side {
        PortSide::Left => device.position.x,
        _ => device.position.x + device.width,
    };
    let y = device.position.y + PORT_TOP_PADDING + row * PORT_ROW_HEIGHT + PORT_ROW_HEIGHT / 2.0;
    (Point::new(x, y), side)
}

/// Content-space anchor of a port, falling back to the device centre.
pub fn port_position(device: &Device, port_id: PortId) -> Point {
    port_anchor(device, port_id).position
}

/// Side the port sits on, `Center` for the fallback anchor.
pub fn port_side(device: &Device, port_id: PortId) -> PortSide {
    port_anchor(device, port_id).side
}

pub fn port_anchor(device: &Device, port_id: PortId) -> PortAnchor {
    match device.port_index(port_id) {
        Some(index) => {
            let (position, side) = anchor_for_index(device, index);
            PortAnchor {
                port_id,
                position,
                side,
            }
        }
        None => PortAnchor {
            port_id,
            position: device.center(),
            side: PortSide::Center,
        },
    }
}

/// Anchors for every port, in port order.
pub fn port_anchors(device: &Device) -> Vec<PortAnchor> {
    device
        .ports
        .iter()
        .enumerate()
        .map(|(index, port)| {
            let (position, side) = anchor_for_index(device, index);
            PortAnchor {
                port_id: port.id,
                position,
                side,
            }
        })
        .collect()
}

/// The port whose anchor is closest to `point`, within `tolerance`.
pub fn hit_test_port(device: &Device, point: Point, tolerance: f64) -> Option<PortAnchor> {
    port_anchors(device)
        .into_iter()
        .map(|anchor| (anchor.position.distance(point), anchor))
        .filter(|(dist, _)| *dist <= tolerance)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, anchor)| anchor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{DeviceSpec, Port};
    use kurbo::Size;

    fn device_with_ports(n: u32) -> Device {
        let ports = (0..n).map(|i| Port::new(i, format!("eth{i}"), 1e9)).collect();
        Device::new(
            DeviceSpec::new("switch", Point::new(100.0, 100.0))
                .with_size(80.0, 60.0)
                .with_ports(ports),
            Size::new(80.0, 60.0),
        )
    }

    #[test]
    fn test_ports_alternate_sides() {
        let device = device_with_ports(4);
        assert_eq!(port_position(&device, 0), Point::new(100.0, 120.0));
        assert_eq!(port_position(&device, 1), Point::new(180.0, 120.0));
        assert_eq!(port_position(&device, 2), Point::new(100.0, 140.0));
        assert_eq!(port_position(&device, 3), Point::new(180.0, 140.0));
        assert_eq!(port_side(&device, 2), PortSide::Left);
        assert_eq!(port_side(&device, 3), PortSide::Right);
    }

    #[test]
    fn test_layout_is_collision_free() {
        let device = device_with_ports(9);
        let anchors = port_anchors(&device);
        for (i, a) in anchors.iter().enumerate() {
            for b in &anchors[i + 1..] {
                assert_ne!(a.position, b.position);
            }
            assert!(a.position.y < device.position.y + device.height);
        }
    }

    #[test]
    fn test_portless_device_anchors_at_center() {
        let device = device_with_ports(0);
        assert_eq!(port_position(&device, 3), Point::new(140.0, 130.0));
        assert_eq!(port_side(&device, 3), PortSide::Center);
    }

    #[test]
    fn test_unknown_port_anchors_at_center() {
        let device = device_with_ports(2);
        assert_eq!(port_position(&device, 42), device.center());
    }

    #[test]
    fn test_min_height_for_ports() {
        assert!((min_height_for_ports(0) - 20.0).abs() < f64::EPSILON);
        assert!((min_height_for_ports(1) - 40.0).abs() < f64::EPSILON);
        assert!((min_height_for_ports(2) - 40.0).abs() < f64::EPSILON);
        assert!((min_height_for_ports(5) - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_port() {
        let device = device_with_ports(2);
        let hit = hit_test_port(&device, Point::new(182.0, 118.0), 6.0);
        assert_eq!(hit.map(|a| a.port_id), Some(1));
        assert!(hit_test_port(&device, Point::new(140.0, 130.0), 6.0).is_none());
    }
}
