//! Network device node.

use super::{DeviceId, Entity, GroupId, Port};
use crate::ports::min_height_for_ports;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything needed to create a device; the id is allocated on creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSpec {
    /// Device category tag (`switch`, `router`, `firewall`, ...).
    pub kind: String,
    pub icon_type: String,
    pub name: String,
    #[serde(default)]
    pub ip: Option<String>,
    /// Identifier of the catalog entry this device was picked from.
    #[serde(default)]
    pub catalog_id: Option<String>,
    /// Top-left corner in content space.
    pub position: Point,
    /// Body size; the editor's default size is used when absent.
    #[serde(default)]
    pub size: Option<Size>,
    #[serde(default)]
    pub ports: Vec<Port>,
}

impl DeviceSpec {
    pub fn new(kind: impl Into<String>, position: Point) -> Self {
        let kind = kind.into();
        Self {
            icon_type: kind.clone(),
            name: kind.clone(),
            kind,
            position,
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Some(Size::new(width, height));
        self
    }

    pub fn with_ports(mut self, ports: Vec<Port>) -> Self {
        self.ports = ports;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// A positioned device on the diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub(crate) id: DeviceId,
    /// Top-left corner in content space.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub kind: String,
    pub icon_type: String,
    pub name: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub catalog_id: Option<String>,
    /// Ports in telemetry order; the order drives the anchor layout.
    pub ports: Vec<Port>,
    /// Containing group, if any. The only record of membership.
    pub(crate) group_id: Option<GroupId>,
}

impl Device {
    /// Create a device, growing the body so every port row fits.
    pub fn new(spec: DeviceSpec, default_size: Size) -> Self {
        let size = spec.size.unwrap_or(default_size);
        let height = size.height.max(min_height_for_ports(spec.ports.len()));
        Self {
            id: Uuid::new_v4(),
            position: spec.position,
            width: size.width,
            height,
            kind: spec.kind,
            icon_type: spec.icon_type,
            name: spec.name,
            ip: spec.ip,
            catalog_id: spec.catalog_id,
            ports: spec.ports,
            group_id: None,
        }
    }

    pub fn group_id(&self) -> Option<GroupId> {
        self.group_id
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Index of a port within the port list.
    pub fn port_index(&self, port_id: super::PortId) -> Option<usize> {
        self.ports.iter().position(|p| p.id == port_id)
    }
}

impl Entity for Device {
    fn id(&self) -> DeviceId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size())
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}
