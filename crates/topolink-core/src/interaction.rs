//! Pointer gesture state machine.
//!
//! A gesture starts on pointer-down, receives every pointer-move while it
//! holds the pointer capture, and ends on pointer-up. Only one gesture is
//! active at a time.

use crate::camera::Camera;
use crate::diagram::{Diagram, DiagramResult, Hit};
use crate::entities::{DeviceId, GroupId, PortRef};
use crate::input::{MouseButton, PointerEvent, PointerTracker};
use kurbo::{Point, Size, Vec2};

/// Active gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    PanningCanvas,
    DraggingDevice {
        device_id: DeviceId,
        /// Pointer position relative to the device origin at grab time.
        grab_offset: Vec2,
        moved: bool,
    },
    DraggingGroup {
        group_id: GroupId,
        grab_offset: Vec2,
        moved: bool,
    },
    ResizingGroup {
        group_id: GroupId,
        start_size: Size,
        resized: bool,
    },
    ConnectingFromPort {
        origin: PortRef,
        /// Anchor of the origin port, content space.
        anchor: Point,
        /// Live pointer position, content space.
        pointer: Point,
    },
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::PanningCanvas => "panning",
            InteractionState::DraggingDevice { .. } => "dragging-device",
            InteractionState::DraggingGroup { .. } => "dragging-group",
            InteractionState::ResizingGroup { .. } => "resizing-group",
            InteractionState::ConnectingFromPort { .. } => "connecting",
        }
    }
}

/// What an event did, so the editor knows whether to re-render or commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Nothing visible changed.
    None,
    /// Only view state changed (pan, zoom, temporary connection line).
    ViewChanged,
    /// Entities changed mid-gesture; not yet committed.
    Mutated,
    /// The gesture finished with changes that should become one history entry.
    Committed,
}

/// Hit-test tunables, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionSettings {
    pub port_hit_tolerance: f64,
    pub resize_handle_size: f64,
    pub zoom_step: f64,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            port_hit_tolerance: 6.0,
            resize_handle_size: 12.0,
            zoom_step: 1.1,
        }
    }
}

/// Interprets pointer events against the diagram and camera.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: InteractionState,
    pointer: PointerTracker,
    settings: InteractionSettings,
}

impl InteractionController {
    pub fn new(settings: InteractionSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Whether a gesture currently holds the pointer capture.
    pub fn has_capture(&self) -> bool {
        self.pointer.is_captured()
    }

    /// Temporary connection line, content space, while connecting.
    pub fn temporary_connection(&self) -> Option<(Point, Point)> {
        match self.state {
            InteractionState::ConnectingFromPort {
                anchor, pointer, ..
            } => Some((anchor, pointer)),
            _ => None,
        }
    }

    /// Feed one pointer event.
    pub fn handle_pointer_event(
        &mut self,
        event: PointerEvent,
        diagram: &mut Diagram,
        camera: &mut Camera,
    ) -> InteractionOutcome {
        match event {
            PointerEvent::Down { position, button } => {
                if button != MouseButton::Left || !self.state.is_idle() {
                    return InteractionOutcome::None;
                }
                self.begin(position, diagram, camera)
            }
            PointerEvent::Move { position } => {
                if !self.pointer.is_captured() {
                    self.pointer.position = position;
                    return InteractionOutcome::None;
                }
                self.pointer.update(position);
                self.drag(diagram, camera)
            }
            PointerEvent::Up { position, .. } => {
                // Any button's release ends the gesture holding the capture.
                if !self.pointer.is_captured() {
                    return InteractionOutcome::None;
                }
                self.pointer.update(position);
                self.finish(diagram, camera)
            }
            PointerEvent::Scroll { position, delta } => {
                if delta.y == 0.0 {
                    return InteractionOutcome::None;
                }
                let factor = if delta.y < 0.0 {
                    self.settings.zoom_step
                } else {
                    1.0 / self.settings.zoom_step
                };
                camera.zoom_at(position, factor);
                InteractionOutcome::ViewChanged
            }
        }
    }

    /// Abort the active gesture. Returns whether one was active; the caller
    /// is responsible for restoring the last committed state.
    pub fn cancel(&mut self) -> bool {
        let was_active = !self.state.is_idle();
        if was_active {
            log::debug!("gesture cancelled: {}", self.state.name());
        }
        self.end();
        was_active
    }

    fn begin(&mut self, position: Point, diagram: &Diagram, camera: &Camera) -> InteractionOutcome {
        let content = camera.screen_to_content(position);
        let tolerance = camera.screen_distance_to_content(self.settings.port_hit_tolerance);
        let handle = camera.screen_distance_to_content(self.settings.resize_handle_size);

        let next = match diagram.hit_test(content, tolerance, handle) {
            Hit::Port { device_id, anchor } => InteractionState::ConnectingFromPort {
                origin: PortRef::new(device_id, anchor.port_id),
                anchor: anchor.position,
                pointer: content,
            },
            Hit::Device(device_id) => match diagram.device(device_id) {
                Some(device) => InteractionState::DraggingDevice {
                    device_id,
                    grab_offset: content - device.position,
                    moved: false,
                },
                None => return InteractionOutcome::None,
            },
            Hit::GroupResizeHandle(group_id) => match diagram.group(group_id) {
                Some(group) => InteractionState::ResizingGroup {
                    group_id,
                    start_size: group.size(),
                    resized: false,
                },
                None => return InteractionOutcome::None,
            },
            Hit::Group(group_id) => match diagram.group(group_id) {
                Some(group) => InteractionState::DraggingGroup {
                    group_id,
                    grab_offset: content - group.position,
                    moved: false,
                },
                None => return InteractionOutcome::None,
            },
            Hit::Background => InteractionState::PanningCanvas,
        };

        log::debug!("gesture started: {}", next.name());
        let outcome = if matches!(next, InteractionState::ConnectingFromPort { .. }) {
            InteractionOutcome::ViewChanged
        } else {
            InteractionOutcome::None
        };
        self.state = next;
        self.pointer.capture(position);
        outcome
    }

    fn drag(&mut self, diagram: &mut Diagram, camera: &mut Camera) -> InteractionOutcome {
        let content = camera.screen_to_content(self.pointer.position);
        match &mut self.state {
            InteractionState::Idle => InteractionOutcome::None,
            InteractionState::PanningCanvas => {
                let delta = self.pointer.delta();
                if delta == Vec2::ZERO {
                    return InteractionOutcome::None;
                }
                camera.pan(delta);
                InteractionOutcome::ViewChanged
            }
            InteractionState::DraggingDevice {
                device_id,
                grab_offset,
                moved,
            } => {
                let device_id = *device_id;
                match drag_device(diagram, device_id, content - *grab_offset) {
                    Ok(true) => {
                        *moved = true;
                        InteractionOutcome::Mutated
                    }
                    Ok(false) => InteractionOutcome::None,
                    Err(e) => {
                        log::warn!("device drag ignored: {e}");
                        InteractionOutcome::None
                    }
                }
            }
            InteractionState::DraggingGroup {
                group_id,
                grab_offset,
                moved,
            } => match diagram.move_group(*group_id, content - *grab_offset) {
                Ok(true) => {
                    *moved = true;
                    InteractionOutcome::Mutated
                }
                Ok(false) => InteractionOutcome::None,
                Err(e) => {
                    log::warn!("group drag ignored: {e}");
                    InteractionOutcome::None
                }
            },
            InteractionState::ResizingGroup {
                group_id,
                start_size,
                resized,
            } => {
                let delta = self.pointer.total_delta().unwrap_or(Vec2::ZERO);
                let delta = delta / camera.zoom;
                let width = start_size.width + delta.x;
                let height = start_size.height + delta.y;
                match diagram.resize_group(*group_id, width, height) {
                    Ok(true) => {
                        *resized = true;
                        InteractionOutcome::Mutated
                    }
                    Ok(false) => InteractionOutcome::None,
                    Err(e) => {
                        log::warn!("group resize ignored: {e}");
                        InteractionOutcome::None
                    }
                }
            }
            InteractionState::ConnectingFromPort { pointer, .. } => {
                *pointer = content;
                InteractionOutcome::ViewChanged
            }
        }
    }

    fn finish(&mut self, diagram: &mut Diagram, camera: &mut Camera) -> InteractionOutcome {
        // Apply the release position as a final move first.
        let moved = self.drag(diagram, camera);

        let outcome = match &self.state {
            InteractionState::Idle => InteractionOutcome::None,
            InteractionState::PanningCanvas => InteractionOutcome::ViewChanged,
            InteractionState::DraggingDevice { moved: true, .. }
            | InteractionState::DraggingGroup { moved: true, .. }
            | InteractionState::ResizingGroup { resized: true, .. } => {
                InteractionOutcome::Committed
            }
            InteractionState::DraggingDevice { .. }
            | InteractionState::DraggingGroup { .. }
            | InteractionState::ResizingGroup { .. } => moved,
            InteractionState::ConnectingFromPort { origin, .. } => {
                let origin = *origin;
                self.complete_connection(origin, diagram, camera)
            }
        };

        log::debug!("gesture ended: {} -> {:?}", self.state.name(), outcome);
        self.end();
        outcome
    }

    fn complete_connection(
        &self,
        origin: PortRef,
        diagram: &mut Diagram,
        camera: &Camera,
    ) -> InteractionOutcome {
        let content = camera.screen_to_content(self.pointer.position);
        let tolerance = camera.screen_distance_to_content(self.settings.port_hit_tolerance);
        let handle = camera.screen_distance_to_content(self.settings.resize_handle_size);

        let target = match diagram.hit_test(content, tolerance, handle) {
            Hit::Port { device_id, anchor } if device_id != origin.device_id => {
                PortRef::new(device_id, anchor.port_id)
            }
            _ => {
                log::debug!("connection abandoned");
                return InteractionOutcome::ViewChanged;
            }
        };

        match diagram.add_connection(origin, target) {
            Ok(id) => {
                log::debug!("connection {id} created");
                InteractionOutcome::Committed
            }
            Err(e) => {
                log::warn!("connection rejected: {e}");
                InteractionOutcome::ViewChanged
            }
        }
    }

    fn end(&mut self) {
        self.state = InteractionState::Idle;
        self.pointer.release();
    }
}

/// Move a device and re-evaluate its group membership.
fn drag_device(diagram: &mut Diagram, device_id: DeviceId, position: Point) -> DiagramResult<bool> {
    let moved = diagram.move_device(device_id, position)?;
    let regrouped = diagram.refresh_membership(device_id)?;
    Ok(moved || regrouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Device, DeviceSpec, Group, GroupSpec, Port};

    fn device(diagram: &mut Diagram, x: f64, y: f64) -> DeviceId {
        let ports = vec![Port::new(0, "eth0", 0.0), Port::new(1, "eth1", 0.0)];
        diagram.add_device(Device::new(
            DeviceSpec::new("switch", Point::new(x, y))
                .with_size(80.0, 60.0)
                .with_ports(ports),
            Size::new(80.0, 60.0),
        ))
    }

    fn group(diagram: &mut Diagram, x: f64, y: f64) -> GroupId {
        diagram.add_group(Group::new(
            GroupSpec::new("Room", Point::new(x, y)).with_size(300.0, 200.0),
            Size::new(300.0, 200.0),
        ))
    }

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    fn mv(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move {
            position: Point::new(x, y),
        }
    }

    fn up(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    struct Fixture {
        controller: InteractionController,
        diagram: Diagram,
        camera: Camera,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                controller: InteractionController::new(InteractionSettings::default()),
                diagram: Diagram::new(),
                camera: Camera::new(),
            }
        }

        fn send(&mut self, event: PointerEvent) -> InteractionOutcome {
            self.controller
                .handle_pointer_event(event, &mut self.diagram, &mut self.camera)
        }
    }

    #[test]
    fn test_background_pans_camera() {
        let mut fx = Fixture::new();
        fx.send(down(10.0, 10.0));
        assert_eq!(fx.controller.state(), &InteractionState::PanningCanvas);
        assert!(fx.controller.has_capture());

        assert_eq!(fx.send(mv(30.0, 25.0)), InteractionOutcome::ViewChanged);
        fx.send(mv(40.0, 25.0));
        assert_eq!(fx.camera.offset, Vec2::new(30.0, 15.0));

        fx.send(up(40.0, 25.0));
        assert!(fx.controller.state().is_idle());
        assert!(!fx.controller.has_capture());
    }

    #[test]
    fn test_device_drag_updates_every_move() {
        let mut fx = Fixture::new();
        let d = device(&mut fx.diagram, 100.0, 100.0);

        fx.send(down(140.0, 130.0));
        assert!(matches!(
            fx.controller.state(),
            InteractionState::DraggingDevice { device_id, .. } if *device_id == d
        ));

        assert_eq!(fx.send(mv(150.0, 130.0)), InteractionOutcome::Mutated);
        assert_eq!(fx.diagram.device(d).unwrap().position, Point::new(110.0, 100.0));
        assert_eq!(fx.send(mv(160.0, 140.0)), InteractionOutcome::Mutated);
        assert_eq!(fx.diagram.device(d).unwrap().position, Point::new(120.0, 110.0));

        assert_eq!(fx.send(up(160.0, 140.0)), InteractionOutcome::Committed);
        assert!(fx.controller.state().is_idle());
    }

    #[test]
    fn test_click_without_move_does_not_commit() {
        let mut fx = Fixture::new();
        device(&mut fx.diagram, 100.0, 100.0);
        fx.send(down(140.0, 130.0));
        assert_eq!(fx.send(up(140.0, 130.0)), InteractionOutcome::None);
        assert!(fx.controller.state().is_idle());
    }

    #[test]
    fn test_drag_into_and_out_of_group() {
        let mut fx = Fixture::new();
        let d = device(&mut fx.diagram, 100.0, 100.0);
        let g = group(&mut fx.diagram, 50.0, 50.0);

        fx.send(down(140.0, 130.0));
        fx.send(mv(120.0, 110.0));
        fx.send(up(120.0, 110.0));

        assert_eq!(fx.diagram.device(d).unwrap().position, Point::new(80.0, 80.0));
        assert_eq!(fx.diagram.device(d).unwrap().group_id(), Some(g));
        assert_eq!(fx.diagram.group_devices(g), vec![d]);

        // Drag it partway out of the right edge.
        fx.send(down(120.0, 110.0));
        fx.send(mv(350.0, 110.0));
        fx.send(up(350.0, 110.0));
        assert!(fx.diagram.device(d).unwrap().group_id().is_none());
        assert!(fx.diagram.group_devices(g).is_empty());
    }

    #[test]
    fn test_group_drag_carries_members() {
        let mut fx = Fixture::new();
        let g = group(&mut fx.diagram, 50.0, 50.0);
        let d = device(&mut fx.diagram, 100.0, 100.0);
        fx.diagram.assign_device_to_group(d, g).unwrap();

        fx.send(down(300.0, 60.0));
        assert!(matches!(fx.controller.state(), InteractionState::DraggingGroup { .. }));
        fx.send(mv(320.0, 90.0));
        assert_eq!(fx.send(up(320.0, 90.0)), InteractionOutcome::Committed);

        assert_eq!(fx.diagram.group(g).unwrap().position, Point::new(70.0, 80.0));
        assert_eq!(fx.diagram.device(d).unwrap().position, Point::new(120.0, 130.0));
    }

    #[test]
    fn test_resize_handle_uses_cumulative_delta() {
        let mut fx = Fixture::new();
        let g = group(&mut fx.diagram, 50.0, 50.0);

        fx.send(down(345.0, 245.0));
        assert!(matches!(fx.controller.state(), InteractionState::ResizingGroup { .. }));
        fx.send(mv(355.0, 255.0));
        fx.send(mv(395.0, 265.0));
        assert_eq!(fx.send(up(395.0, 265.0)), InteractionOutcome::Committed);

        let group = fx.diagram.group(g).unwrap();
        assert!((group.width - 350.0).abs() < f64::EPSILON);
        assert!((group.height - 220.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_is_floored() {
        let mut fx = Fixture::new();
        let g = group(&mut fx.diagram, 50.0, 50.0);
        fx.send(down(345.0, 245.0));
        fx.send(mv(0.0, 0.0));
        fx.send(up(0.0, 0.0));
        let group = fx.diagram.group(g).unwrap();
        assert!((group.width - 150.0).abs() < f64::EPSILON);
        assert!((group.height - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_connect_two_devices() {
        let mut fx = Fixture::new();
        let a = device(&mut fx.diagram, 100.0, 100.0);
        let b = device(&mut fx.diagram, 300.0, 100.0);

        fx.send(down(100.0, 120.0));
        assert_eq!(fx.send(mv(250.0, 150.0)), InteractionOutcome::ViewChanged);
        assert_eq!(
            fx.controller.temporary_connection(),
            Some((Point::new(100.0, 120.0), Point::new(250.0, 150.0)))
        );

        assert_eq!(fx.send(up(380.0, 120.0)), InteractionOutcome::Committed);
        assert!(fx.controller.temporary_connection().is_none());

        let conns = fx.diagram.connections();
        assert_eq!(conns.len(), 1);
        assert_eq!(conns[0].source, PortRef::new(a, 0));
        assert_eq!(conns[0].target, PortRef::new(b, 1));
    }

    #[test]
    fn test_connect_to_same_device_is_abandoned() {
        let mut fx = Fixture::new();
        device(&mut fx.diagram, 100.0, 100.0);

        fx.send(down(100.0, 120.0));
        assert_eq!(fx.send(up(180.0, 120.0)), InteractionOutcome::ViewChanged);
        assert!(fx.diagram.connections().is_empty());
        assert!(fx.controller.state().is_idle());
    }

    #[test]
    fn test_connect_released_on_background_is_abandoned() {
        let mut fx = Fixture::new();
        device(&mut fx.diagram, 100.0, 100.0);
        fx.send(down(100.0, 120.0));
        fx.send(up(600.0, 600.0));
        assert!(fx.diagram.connections().is_empty());
        assert!(fx.controller.state().is_idle());
    }

    #[test]
    fn test_second_press_during_gesture_is_ignored() {
        let mut fx = Fixture::new();
        device(&mut fx.diagram, 100.0, 100.0);
        fx.send(down(10.0, 10.0));
        assert_eq!(fx.send(down(140.0, 130.0)), InteractionOutcome::None);
        assert_eq!(fx.controller.state(), &InteractionState::PanningCanvas);
    }

    #[test]
    fn test_moves_without_capture_are_ignored() {
        let mut fx = Fixture::new();
        let d = device(&mut fx.diagram, 100.0, 100.0);
        assert_eq!(fx.send(mv(140.0, 130.0)), InteractionOutcome::None);
        assert_eq!(fx.send(up(140.0, 130.0)), InteractionOutcome::None);
        assert_eq!(fx.diagram.device(d).unwrap().position, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_drag_respects_zoom_and_pan() {
        let mut fx = Fixture::new();
        fx.camera.zoom = 2.0;
        fx.camera.offset = Vec2::new(10.0, 10.0);
        let d = device(&mut fx.diagram, 100.0, 100.0);

        // Device centre (140, 130) is at screen (290, 270).
        fx.send(down(290.0, 270.0));
        fx.send(mv(310.0, 290.0));
        fx.send(up(310.0, 290.0));

        assert_eq!(fx.diagram.device(d).unwrap().position, Point::new(110.0, 110.0));
    }

    #[test]
    fn test_scroll_zooms() {
        let mut fx = Fixture::new();
        let outcome = fx.send(PointerEvent::Scroll {
            position: Point::new(100.0, 100.0),
            delta: Vec2::new(0.0, -1.0),
        });
        assert_eq!(outcome, InteractionOutcome::ViewChanged);
        assert!((fx.camera.zoom - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_any_button_release_ends_gesture() {
        let mut fx = Fixture::new();
        let d = device(&mut fx.diagram, 100.0, 100.0);
        fx.send(down(140.0, 130.0));
        fx.send(mv(160.0, 130.0));

        let outcome = fx.send(PointerEvent::Up {
            position: Point::new(170.0, 130.0),
            button: MouseButton::Right,
        });

        assert_eq!(outcome, InteractionOutcome::Committed);
        assert!(fx.controller.state().is_idle());
        assert!(!fx.controller.has_capture());
        assert_eq!(fx.diagram.device(d).unwrap().position, Point::new(130.0, 100.0));
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let mut fx = Fixture::new();
        device(&mut fx.diagram, 100.0, 100.0);
        fx.send(down(140.0, 130.0));
        assert!(fx.controller.cancel());
        assert!(fx.controller.state().is_idle());
        assert!(!fx.controller.has_capture());
        assert!(!fx.controller.cancel());
    }
}
