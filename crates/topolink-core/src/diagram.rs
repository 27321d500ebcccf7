//! Entity store: devices, groups and connections.

use crate::entities::{
    Connection, ConnectionId, Device, DeviceId, Entity, Group, GroupId, PortRef,
    clamp_group_size, fully_contains,
};
use crate::ports::{PortAnchor, hit_test_port};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Reasons a store operation did not apply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagramError {
    #[error("device not found: {0}")]
    DeviceNotFound(DeviceId),
    #[error("group not found: {0}")]
    GroupNotFound(GroupId),
    #[error("connection not found: {0}")]
    ConnectionNotFound(ConnectionId),
    #[error("cannot connect device {0} to itself")]
    SelfConnection(DeviceId),
    #[error("ports are already connected")]
    DuplicateConnection,
    #[error("device {device} is not a member of group {group}")]
    NotAMember { device: DeviceId, group: GroupId },
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

pub type DiagramResult<T> = Result<T, DiagramError>;

/// Deep copy of the three entity collections, in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramSnapshot {
    pub devices: Vec<Device>,
    pub groups: Vec<Group>,
    pub connections: Vec<Connection>,
}

/// What lies under a content-space point, front to back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    Port { device_id: DeviceId, anchor: PortAnchor },
    Device(DeviceId),
    GroupResizeHandle(GroupId),
    Group(GroupId),
    Background,
}

/// Flat, id-keyed entity collections.
///
/// Group membership is recorded only on the device (`group_id`); a group's
/// member list is always derived, so the two views cannot disagree.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    devices: HashMap<DeviceId, Device>,
    /// Creation order of devices (back to front).
    device_order: Vec<DeviceId>,
    groups: HashMap<GroupId, Group>,
    /// Creation order of groups (back to front).
    group_order: Vec<GroupId>,
    connections: Vec<Connection>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> DiagramSnapshot {
        DiagramSnapshot {
            devices: self.devices_ordered().cloned().collect(),
            groups: self.groups_ordered().cloned().collect(),
            connections: self.connections.clone(),
        }
    }

    /// Replace every collection with the contents of `snapshot`.
    pub fn restore(&mut self, snapshot: &DiagramSnapshot) {
        self.device_order = snapshot.devices.iter().map(|d| d.id).collect();
        self.devices = snapshot.devices.iter().map(|d| (d.id, d.clone())).collect();
        self.group_order = snapshot.groups.iter().map(|g| g.id).collect();
        self.groups = snapshot.groups.iter().map(|g| (g.id, g.clone())).collect();
        self.connections = snapshot.connections.clone();
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.groups.is_empty()
    }

    // ---- queries ----

    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(&id)
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Devices back to front.
    pub fn devices_ordered(&self) -> impl DoubleEndedIterator<Item = &Device> {
        self.device_order.iter().filter_map(|id| self.devices.get(id))
    }

    /// Groups back to front.
    pub fn groups_ordered(&self) -> impl DoubleEndedIterator<Item = &Group> {
        self.group_order.iter().filter_map(|id| self.groups.get(id))
    }

    pub fn ungrouped_devices(&self) -> impl Iterator<Item = &Device> {
        self.devices_ordered().filter(|d| d.group_id.is_none())
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connections_for_device(&self, id: DeviceId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.touches(id))
    }

    /// Member device ids of a group, in device creation order.
    pub fn group_devices(&self, id: GroupId) -> Vec<DeviceId> {
        self.devices_ordered()
            .filter(|d| d.group_id == Some(id))
            .map(|d| d.id)
            .collect()
    }

    /// Topmost group whose rectangle fully contains `rect`.
    pub fn containing_group(&self, rect: Rect) -> Option<GroupId> {
        self.groups_ordered()
            .rev()
            .find(|g| fully_contains(g.bounds(), rect))
            .map(|g| g.id)
    }

    /// Union of all entity bounds.
    pub fn bounds(&self) -> Option<Rect> {
        self.devices
            .values()
            .map(Entity::bounds)
            .chain(self.groups.values().map(Entity::bounds))
            .reduce(|acc, r| acc.union(r))
    }

    /// Find what is under `point`. Devices are tried front to back, each by
    /// its ports and then its body; devices win over groups, and a group's
    /// resize handle over its body.
    pub fn hit_test(&self, point: Point, port_tolerance: f64, handle_size: f64) -> Hit {
        for device in self.devices_ordered().rev() {
            if let Some(anchor) = hit_test_port(device, point, port_tolerance) {
                return Hit::Port {
                    device_id: device.id,
                    anchor,
                };
            }
            if device.hit_test(point) {
                return Hit::Device(device.id);
            }
        }
        for group in self.groups_ordered().rev() {
            if group.resize_handle(handle_size).contains(point) {
                return Hit::GroupResizeHandle(group.id);
            }
            if group.hit_test(point) {
                return Hit::Group(group.id);
            }
        }
        Hit::Background
    }

    // ---- mutations ----

    pub fn add_device(&mut self, device: Device) -> DeviceId {
        let id = device.id;
        self.device_order.push(id);
        self.devices.insert(id, device);
        id
    }

    pub fn add_group(&mut self, group: Group) -> GroupId {
        let id = group.id;
        self.group_order.push(id);
        self.groups.insert(id, group);
        id
    }

    /// Move a device's top-left corner. Returns whether anything changed.
    pub fn move_device(&mut self, id: DeviceId, position: Point) -> DiagramResult<bool> {
        let device = self
            .devices
            .get_mut(&id)
            .ok_or(DiagramError::DeviceNotFound(id))?;
        if device.position == position {
            return Ok(false);
        }
        device.position = position;
        Ok(true)
    }

    /// Move a group and translate its members by the same delta.
    pub fn move_group(&mut self, id: GroupId, position: Point) -> DiagramResult<bool> {
        let group = self
            .groups
            .get_mut(&id)
            .ok_or(DiagramError::GroupNotFound(id))?;
        let delta = position - group.position;
        if delta.x == 0.0 && delta.y == 0.0 {
            return Ok(false);
        }
        group.translate(delta);
        for device in self.devices.values_mut().filter(|d| d.group_id == Some(id)) {
            device.translate(delta);
        }
        Ok(true)
    }

    /// Resize a group, flooring at the minimum size. Members are left where
    /// they are even if they now stick out.
    pub fn resize_group(&mut self, id: GroupId, width: f64, height: f64) -> DiagramResult<bool> {
        let group = self
            .groups
            .get_mut(&id)
            .ok_or(DiagramError::GroupNotFound(id))?;
        let size = clamp_group_size(Size::new(width, height));
        if size == group.size() {
            return Ok(false);
        }
        group.width = size.width;
        group.height = size.height;
        Ok(true)
    }

    pub fn rename_group(&mut self, id: GroupId, name: &str) -> DiagramResult<bool> {
        let group = self
            .groups
            .get_mut(&id)
            .ok_or(DiagramError::GroupNotFound(id))?;
        if group.name == name {
            return Ok(false);
        }
        group.name = name.to_string();
        Ok(true)
    }

    /// Put a device into a group, leaving any previous group.
    pub fn assign_device_to_group(
        &mut self,
        device_id: DeviceId,
        group_id: GroupId,
    ) -> DiagramResult<bool> {
        if !self.groups.contains_key(&group_id) {
            return Err(DiagramError::GroupNotFound(group_id));
        }
        let device = self
            .devices
            .get_mut(&device_id)
            .ok_or(DiagramError::DeviceNotFound(device_id))?;
        if device.group_id == Some(group_id) {
            return Ok(false);
        }
        device.group_id = Some(group_id);
        Ok(true)
    }

    pub fn remove_device_from_group(
        &mut self,
        device_id: DeviceId,
        group_id: GroupId,
    ) -> DiagramResult<()> {
        if !self.groups.contains_key(&group_id) {
            return Err(DiagramError::GroupNotFound(group_id));
        }
        let device = self
            .devices
            .get_mut(&device_id)
            .ok_or(DiagramError::DeviceNotFound(device_id))?;
        if device.group_id != Some(group_id) {
            return Err(DiagramError::NotAMember {
                device: device_id,
                group: group_id,
            });
        }
        device.group_id = None;
        Ok(())
    }

    /// Re-evaluate a device's membership after it moved.
    ///
    /// A device stays in its current group while fully inside it. Otherwise
    /// it joins the topmost group that fully contains it, or becomes
    /// ungrouped. Returns whether membership changed.
    pub fn refresh_membership(&mut self, device_id: DeviceId) -> DiagramResult<bool> {
        let device = self
            .devices
            .get(&device_id)
            .ok_or(DiagramError::DeviceNotFound(device_id))?;
        let bounds = device.bounds();
        let current = device.group_id;

        if let Some(group) = current.and_then(|id| self.groups.get(&id)) {
            if fully_contains(group.bounds(), bounds) {
                return Ok(false);
            }
        }

        let next = self.containing_group(bounds);
        if next == current {
            return Ok(false);
        }
        if let Some(device) = self.devices.get_mut(&device_id) {
            device.group_id = next;
        }
        Ok(true)
    }

    /// Connect two ports on different, existing devices.
    pub fn add_connection(&mut self, source: PortRef, target: PortRef) -> DiagramResult<ConnectionId> {
        self.insert_connection(Connection::new(source, target))
    }

    /// Insert a prebuilt connection, keeping its id.
    pub fn insert_connection(&mut self, connection: Connection) -> DiagramResult<ConnectionId> {
        let (source, target) = (connection.source, connection.target);
        for id in [source.device_id, target.device_id] {
            if !self.devices.contains_key(&id) {
                return Err(DiagramError::DeviceNotFound(id));
            }
        }
        if source.device_id == target.device_id {
            return Err(DiagramError::SelfConnection(source.device_id));
        }
        if self.connections.iter().any(|c| c.links(source, target)) {
            return Err(DiagramError::DuplicateConnection);
        }
        let id = connection.id;
        self.connections.push(connection);
        Ok(id)
    }

    /// Delete a device and every connection attached to it.
    pub fn delete_device(&mut self, id: DeviceId) -> DiagramResult<Device> {
        let device = self
            .devices
            .remove(&id)
            .ok_or(DiagramError::DeviceNotFound(id))?;
        self.device_order.retain(|&d| d != id);
        self.connections.retain(|c| !c.touches(id));
        Ok(device)
    }

    /// Delete a group; its members stay on the diagram, ungrouped.
    pub fn delete_group(&mut self, id: GroupId) -> DiagramResult<Group> {
        let group = self
            .groups
            .remove(&id)
            .ok_or(DiagramError::GroupNotFound(id))?;
        self.group_order.retain(|&g| g != id);
        for device in self.devices.values_mut().filter(|d| d.group_id == Some(id)) {
            device.group_id = None;
        }
        Ok(group)
    }

    pub fn delete_connection(&mut self, id: ConnectionId) -> DiagramResult<Connection> {
        let index = self
            .connections
            .iter()
            .position(|c| c.id == id)
            .ok_or(DiagramError::ConnectionNotFound(id))?;
        Ok(self.connections.remove(index))
    }

    /// Resolve a port reference to its anchor, if the device exists.
    pub fn port_anchor(&self, port: PortRef) -> Option<PortAnchor> {
        self.devices
            .get(&port.device_id)
            .map(|d| crate::ports::port_anchor(d, port.port_id))
    }

    /// Check the structural invariants. Used in debug builds after every commit.
    pub fn check_invariants(&self) -> DiagramResult<()> {
        let violation = |msg: String| Err(DiagramError::InvariantViolation(msg));

        if self.device_order.len() != self.devices.len()
            || self.device_order.iter().any(|id| !self.devices.contains_key(id))
        {
            return violation("device order out of sync".into());
        }
        if self.group_order.len() != self.groups.len()
            || self.group_order.iter().any(|id| !self.groups.contains_key(id))
        {
            return violation("group order out of sync".into());
        }
        for device in self.devices.values() {
            if let Some(group_id) = device.group_id {
                if !self.groups.contains_key(&group_id) {
                    return violation(format!("device {} names missing group {group_id}", device.id));
                }
            }
        }
        for c in &self.connections {
            if c.source.device_id == c.target.device_id {
                return violation(format!("connection {} is a self loop", c.id));
            }
            if !self.devices.contains_key(&c.source.device_id)
                || !self.devices.contains_key(&c.target.device_id)
            {
                return violation(format!("connection {} has a dangling endpoint", c.id));
            }
        }
        Ok(())
    }
}
