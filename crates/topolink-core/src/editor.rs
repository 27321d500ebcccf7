//! Editor handle: the command surface the enclosing page talks to.

use crate::camera::Camera;
use crate::collaborators::{CatalogEntry, CollaboratorResult};
use crate::config::EditorConfig;
use crate::diagram::{Diagram, DiagramResult, DiagramSnapshot};
use crate::entities::{
    Connection, ConnectionId, Device, DeviceId, DeviceSpec, Entity, Group, GroupId, GroupSpec,
    Port, PortRef,
};
use crate::history::History;
use crate::input::PointerEvent;
use crate::interaction::{
    InteractionController, InteractionOutcome, InteractionSettings, InteractionState,
};
use crate::picker::{DevicePicker, PendingDrop, RequestId};
use kurbo::{Point, Size};
use std::collections::HashMap;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// Message for the page to show, e.g. a failed catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Topology editor state: entities, history, view and the active gesture.
///
/// Every successful entity operation commits exactly one history snapshot
/// and bumps the render generation. Rejected operations are logged and leave
/// everything untouched.
#[derive(Debug)]
pub struct Editor {
    diagram: Diagram,
    history: History,
    camera: Camera,
    controller: InteractionController,
    config: EditorConfig,
    /// Bumped on every entity mutation; keys connection render identity.
    generation: u64,
    picker: DevicePicker,
    pending_drops: HashMap<RequestId, PendingDrop>,
    next_request: u64,
    notifications: Vec<Notification>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let diagram = Diagram::new();
        let history = History::new(diagram.snapshot(), config.history_capacity);
        let controller = InteractionController::new(InteractionSettings {
            port_hit_tolerance: config.port_hit_tolerance,
            resize_handle_size: config.resize_handle_size,
            zoom_step: config.zoom_step,
        });
        Self {
            diagram,
            history,
            camera: Camera::with_limits(config.min_zoom, config.max_zoom),
            controller,
            config,
            generation: 0,
            picker: DevicePicker::default(),
            pending_drops: HashMap::new(),
            next_request: 0,
            notifications: Vec::new(),
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn interaction(&self) -> &InteractionState {
        self.controller.state()
    }

    /// Temporary connection line while a connect gesture is active.
    pub fn temporary_connection(&self) -> Option<(Point, Point)> {
        self.controller.temporary_connection()
    }

    /// Current render generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Request a re-render of everything, connections included.
    pub fn force_update(&mut self) {
        self.generation += 1;
    }

    // ---- entity operations ----

    pub fn add_device(&mut self, spec: DeviceSpec) -> DeviceId {
        let device = Device::new(spec, self.config.default_device_size);
        let id = device.id();
        self.apply("add device", |d| Ok(d.add_device(device.clone())), |_| true);
        id
    }

    pub fn add_group(&mut self, spec: GroupSpec) -> GroupId {
        let group = Group::new(spec, self.config.default_group_size);
        let id = group.id();
        self.apply("add group", |d| Ok(d.add_group(group.clone())), |_| true);
        id
    }

    pub fn move_device(&mut self, id: DeviceId, x: f64, y: f64) -> bool {
        let position = Point::new(x, y);
        self.apply_change("move device", |d| d.move_device(id, position))
    }

    pub fn move_group(&mut self, id: GroupId, x: f64, y: f64) -> bool {
        let position = Point::new(x, y);
        self.apply_change("move group", |d| d.move_group(id, position))
    }

    pub fn resize_group(&mut self, id: GroupId, width: f64, height: f64) -> bool {
        self.apply_change("resize group", |d| d.resize_group(id, width, height))
    }

    pub fn rename_group(&mut self, id: GroupId, name: &str) -> bool {
        self.apply_change("rename group", |d| d.rename_group(id, name))
    }

    pub fn assign_device_to_group(&mut self, device_id: DeviceId, group_id: GroupId) -> bool {
        self.apply_change("assign device", |d| {
            d.assign_device_to_group(device_id, group_id)
        })
    }

    pub fn remove_device_from_group(&mut self, device_id: DeviceId, group_id: GroupId) -> bool {
        self.apply(
            "remove device from group",
            |d| d.remove_device_from_group(device_id, group_id),
            |_| true,
        )
        .is_some()
    }

    pub fn add_connection(&mut self, source: PortRef, target: PortRef) -> Option<ConnectionId> {
        let connection = Connection::new(source, target);
        self.apply(
            "add connection",
            |d| d.insert_connection(connection.clone()),
            |_| true,
        )
    }

    pub fn delete_device(&mut self, id: DeviceId) -> bool {
        self.apply("delete device", |d| d.delete_device(id), |_| true)
            .is_some()
    }

    pub fn delete_group(&mut self, id: GroupId) -> bool {
        self.apply("delete group", |d| d.delete_group(id), |_| true)
            .is_some()
    }

    pub fn delete_connection(&mut self, id: ConnectionId) -> bool {
        self.apply("delete connection", |d| d.delete_connection(id), |_| true)
            .is_some()
    }

    // ---- history ----

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        match self.history.undo() {
            Some(snapshot) => {
                self.diagram.restore(snapshot);
                self.generation += 1;
                log::debug!("undo -> {}", self.history.index());
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        match self.history.redo() {
            Some(snapshot) => {
                self.diagram.restore(snapshot);
                self.generation += 1;
                log::debug!("redo -> {}", self.history.index());
                true
            }
            None => false,
        }
    }

    /// Deep copy of the current entity collections.
    pub fn snapshot(&self) -> DiagramSnapshot {
        self.diagram.snapshot()
    }

    /// Current entity collections as pretty JSON.
    pub fn export_snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.diagram.snapshot())
    }

    // ---- pointer input ----

    /// Forward a raw pointer event from the surface.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> InteractionOutcome {
        let outcome =
            self.controller
                .handle_pointer_event(event, &mut self.diagram, &mut self.camera);
        match outcome {
            InteractionOutcome::Mutated => self.generation += 1,
            InteractionOutcome::Committed => self.commit("gesture"),
            InteractionOutcome::None | InteractionOutcome::ViewChanged => {}
        }
        outcome
    }

    /// Abort the active gesture and roll back its uncommitted changes.
    pub fn cancel_gesture(&mut self) -> bool {
        if !self.controller.cancel() {
            return false;
        }
        if let Some(snapshot) = self.history.current() {
            self.diagram.restore(snapshot);
        }
        self.generation += 1;
        true
    }

    /// Frame every entity in a viewport of the given size.
    pub fn fit_to_content(&mut self, viewport: Size) {
        if let Some(bounds) = self.diagram.bounds() {
            self.camera.fit_to_bounds(bounds, viewport, 50.0);
        }
    }

    // ---- collaborators ----

    pub fn picker(&self) -> &DevicePicker {
        &self.picker
    }

    /// Start a catalog lookup for `category`. The host runs the lookup and
    /// reports back with [`Editor::complete_catalog_lookup`].
    pub fn begin_catalog_lookup(&mut self, category: &str) -> RequestId {
        let request = self.next_request_id();
        self.picker.begin(category, request);
        request
    }

    pub fn complete_catalog_lookup(
        &mut self,
        request: RequestId,
        result: CollaboratorResult<Vec<CatalogEntry>>,
    ) {
        if !self.picker.accepts(request) {
            log::debug!("ignoring stale catalog result {request:?}");
            return;
        }
        match result {
            Ok(entries) => self.picker.fill(entries),
            Err(e) => {
                log::error!("catalog lookup failed: {e}");
                self.picker.fail();
                self.notify(NotificationLevel::Error, format!("Could not load devices: {e}"));
            }
        }
    }

    /// Record a catalog device dropped at a content-space position. The host
    /// fetches its ports and calls [`Editor::complete_device_drop`].
    pub fn begin_device_drop(&mut self, entry: CatalogEntry, kind: &str, position: Point) -> RequestId {
        let request = self.next_request_id();
        self.pending_drops.insert(
            request,
            PendingDrop {
                entry,
                kind: kind.to_string(),
                position,
            },
        );
        request
    }

    /// Create the dropped device. A failed port lookup still creates the
    /// device, with no ports, and raises a notification.
    pub fn complete_device_drop(
        &mut self,
        request: RequestId,
        result: CollaboratorResult<Vec<Port>>,
    ) -> Option<DeviceId> {
        let Some(pending) = self.pending_drops.remove(&request) else {
            log::debug!("ignoring unknown drop {request:?}");
            return None;
        };
        let ports = match result {
            Ok(ports) => ports,
            Err(e) => {
                log::error!("port lookup for {} failed: {e}", pending.entry.id);
                self.notify(
                    NotificationLevel::Error,
                    format!("Could not load ports for {}: {e}", pending.entry.name),
                );
                Vec::new()
            }
        };
        let spec = DeviceSpec {
            icon_type: pending.kind.clone(),
            kind: pending.kind,
            name: pending.entry.name,
            ip: Some(pending.entry.ip),
            catalog_id: Some(pending.entry.id),
            position: pending.position,
            size: None,
            ports,
        };
        Some(self.add_device(spec))
    }

    pub fn pending_drop_count(&self) -> usize {
        self.pending_drops.len()
    }

    /// Take every queued notification.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // ---- internals ----

    fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    fn notify(&mut self, level: NotificationLevel, message: String) {
        self.notifications.push(Notification { level, message });
    }

    fn commit(&mut self, action: &str) {
        debug_assert!(
            self.diagram.check_invariants().is_ok(),
            "{action}: {:?}",
            self.diagram.check_invariants()
        );
        let snapshot = self.diagram.snapshot();
        self.commit_snapshot(action, snapshot);
    }

    fn commit_snapshot(&mut self, action: &str, snapshot: DiagramSnapshot) {
        self.generation += 1;
        self.history.commit(snapshot);
        log::debug!(
            "{action} committed ({}/{})",
            self.history.index() + 1,
            self.history.len()
        );
    }

    /// Run a store operation and commit it if `changed` says so.
    ///
    /// While a gesture holds the pointer, the live diagram carries moves that
    /// are not committed yet. The operation is then applied to the last
    /// committed state for the snapshot and replayed on the live diagram, so
    /// undoing or cancelling the gesture still returns to where it started.
    fn apply<T>(
        &mut self,
        action: &str,
        mut op: impl FnMut(&mut Diagram) -> DiagramResult<T>,
        changed: impl Fn(&T) -> bool,
    ) -> Option<T> {
        if !self.controller.has_capture() {
            return match op(&mut self.diagram) {
                Ok(value) => {
                    if changed(&value) {
                        self.commit(action);
                    }
                    Some(value)
                }
                Err(e) => {
                    log::warn!("{action} ignored: {e}");
                    None
                }
            };
        }

        let mut committed = Diagram::new();
        if let Some(snapshot) = self.history.current() {
            committed.restore(snapshot);
        }
        let value = match op(&mut committed) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("{action} ignored: {e}");
                return None;
            }
        };
        if !changed(&value) {
            return Some(value);
        }
        if let Err(e) = op(&mut self.diagram) {
            log::warn!("{action} committed but not replayed on the active gesture: {e}");
        }
        debug_assert!(
            committed.check_invariants().is_ok(),
            "{action}: {:?}",
            committed.check_invariants()
        );
        self.commit_snapshot(action, committed.snapshot());
        Some(value)
    }

    fn apply_change(
        &mut self,
        action: &str,
        op: impl FnMut(&mut Diagram) -> DiagramResult<bool>,
    ) -> bool {
        self.apply(action, op, |changed| *changed).unwrap_or(false)
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        // Release the pointer capture held by an unfinished gesture.
        self.controller.cancel();
    }
}
