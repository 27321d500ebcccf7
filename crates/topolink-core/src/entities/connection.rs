//! Port-to-port connection. Holds references only; geometry is derived.

use super::{ConnectionId, DeviceId, PortId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One end of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    pub device_id: DeviceId,
    pub port_id: PortId,
}

impl PortRef {
    pub fn new(device_id: DeviceId, port_id: PortId) -> Self {
        Self { device_id, port_id }
    }
}

/// An edge between ports on two different devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub(crate) id: ConnectionId,
    pub source: PortRef,
    pub target: PortRef,
}

impl Connection {
    pub fn new(source: PortRef, target: PortRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            target,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Whether either end sits on `device_id`.
    pub fn touches(&self, device_id: DeviceId) -> bool {
        self.source.device_id == device_id || self.target.device_id == device_id
    }

    /// Same port pair, in either direction.
    pub fn links(&self, a: PortRef, b: PortRef) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}
