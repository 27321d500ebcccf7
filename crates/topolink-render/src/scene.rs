//! Backend-agnostic display list for a diagram frame.

use crate::renderer::{GridStyle, Palette, RenderContext, Renderer};
use kurbo::{Affine, BezPath, Point, Rect};
use peniko::Color;
use topolink_core::ports::{PortAnchor, PortSide, port_anchors};
use topolink_core::{ConnectionId, Device, DeviceId, Diagram, Entity, GroupId};

/// Length of the straight segment leaving a port before the elbow.
pub const CONNECTION_STUB: f64 = 16.0;

/// Render identity of a connection. A new generation means new geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionKey {
    pub generation: u64,
    pub connection_id: ConnectionId,
}

#[derive(Debug, Clone)]
pub struct DeviceItem {
    pub id: DeviceId,
    pub body: Rect,
    pub name: String,
    pub icon_type: String,
    pub ports: Vec<PortAnchor>,
    pub fill: Color,
    pub stroke: Color,
    pub port_color: Color,
}

impl DeviceItem {
    fn from_device(device: &Device, palette: &Palette) -> Self {
        Self {
            id: device.id(),
            body: device.bounds(),
            name: device.name.clone(),
            icon_type: device.icon_type.clone(),
            ports: port_anchors(device),
            fill: palette.device_fill,
            stroke: palette.device_stroke,
            port_color: palette.port,
        }
    }
}

/// One draw command, in content coordinates.
#[derive(Debug, Clone)]
pub enum DrawItem {
    Grid {
        style: GridStyle,
        spacing: f64,
    },
    /// A group frame with its member devices drawn inside it.
    Group {
        id: GroupId,
        frame: Rect,
        resize_handle: Rect,
        name: String,
        fill: Color,
        stroke: Color,
        members: Vec<DeviceItem>,
    },
    Device(DeviceItem),
    Connection {
        key: ConnectionKey,
        path: BezPath,
        color: Color,
    },
    TemporaryConnection {
        from: Point,
        to: Point,
        color: Color,
    },
}

/// Everything needed to paint one frame.
#[derive(Debug, Clone)]
pub struct DisplayList {
    /// Content-to-screen transform, HiDPI scale included.
    pub transform: Affine,
    /// Clear colour for the viewport.
    pub background: Color,
    pub generation: u64,
    pub items: Vec<DrawItem>,
}

impl Default for DisplayList {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            background: Color::from_rgba8(0, 0, 0, 0),
            generation: 0,
            items: Vec::new(),
        }
    }
}

impl DisplayList {
    pub fn connection_keys(&self) -> Vec<ConnectionKey> {
        self.items
            .iter()
            .filter_map(|item| match item {
                DrawItem::Connection { key, .. } => Some(*key),
                _ => None,
            })
            .collect()
    }

    pub fn connection_path(&self, id: ConnectionId) -> Option<&BezPath> {
        self.items.iter().find_map(|item| match item {
            DrawItem::Connection { key, path, .. } if key.connection_id == id => Some(path),
            _ => None,
        })
    }

    /// Devices drawn in this frame, grouped or not.
    pub fn device_count(&self) -> usize {
        self.items
            .iter()
            .map(|item| match item {
                DrawItem::Group { members, .. } => members.len(),
                DrawItem::Device(_) => 1,
                _ => 0,
            })
            .sum()
    }

    pub fn temporary_connection(&self) -> Option<(Point, Point)> {
        self.items.iter().find_map(|item| match item {
            DrawItem::TemporaryConnection { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
    }
}

/// Orthogonal route between two port anchors.
///
/// Each end leaves its port horizontally for [`CONNECTION_STUB`] units
/// (no stub for a centre anchor), then the stubs are joined through a
/// vertical segment at their mid x.
pub fn route_connection(source: &PortAnchor, target: &PortAnchor) -> BezPath {
    let stub = |anchor: &PortAnchor| {
        Point::new(
            anchor.position.x + anchor.side.outward() * CONNECTION_STUB,
            anchor.position.y,
        )
    };
    let start = stub(source);
    let end = stub(target);
    let mid_x = (start.x + end.x) / 2.0;

    let mut path = BezPath::new();
    path.move_to(source.position);
    if source.side != PortSide::Center {
        path.line_to(start);
    }
    path.line_to(Point::new(mid_x, start.y));
    path.line_to(Point::new(mid_x, end.y));
    if target.side != PortSide::Center {
        path.line_to(end);
    }
    path.line_to(target.position);
    path
}

fn connection_items(diagram: &Diagram, generation: u64, color: Color) -> Vec<DrawItem> {
    let mut items = Vec::with_capacity(diagram.connections().len());
    for connection in diagram.connections() {
        let (Some(source), Some(target)) = (
            diagram.port_anchor(connection.source),
            diagram.port_anchor(connection.target),
        ) else {
            log::warn!("connection {} has a dangling endpoint", connection.id());
            continue;
        };
        items.push(DrawItem::Connection {
            key: ConnectionKey {
                generation,
                connection_id: connection.id(),
            },
            path: route_connection(&source, &target),
            color,
        });
    }
    items
}

/// Builds a [`DisplayList`] per frame.
#[derive(Debug, Default)]
pub struct DisplayListRenderer {
    list: DisplayList,
}

impl DisplayListRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display_list(&self) -> &DisplayList {
        &self.list
    }

    /// Take ownership of the built list, leaving an empty one.
    pub fn take_display_list(&mut self) -> DisplayList {
        std::mem::take(&mut self.list)
    }
}

impl Renderer for DisplayListRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        let editor = ctx.editor;
        let diagram = editor.diagram();
        let camera = editor.camera();
        let generation = editor.generation();

        let mut items = Vec::new();
        if ctx.grid_style != GridStyle::None {
            items.push(DrawItem::Grid {
                style: ctx.grid_style,
                spacing: ctx.grid_spacing,
            });
        }

        let handle = camera.screen_distance_to_content(editor.config().resize_handle_size);
        for group in diagram.groups_ordered() {
            let members = diagram
                .group_devices(group.id())
                .into_iter()
                .filter_map(|id| diagram.device(id))
                .map(|device| DeviceItem::from_device(device, &ctx.palette))
                .collect();
            items.push(DrawItem::Group {
                id: group.id(),
                frame: group.bounds(),
                resize_handle: group.resize_handle(handle),
                name: group.name.clone(),
                fill: ctx.palette.group_fill,
                stroke: ctx.palette.group_stroke,
                members,
            });
        }

        items.extend(
            diagram
                .ungrouped_devices()
                .map(|device| DrawItem::Device(DeviceItem::from_device(device, &ctx.palette))),
        );
        items.extend(connection_items(diagram, generation, ctx.palette.connection));

        if let Some((from, to)) = editor.temporary_connection() {
            items.push(DrawItem::TemporaryConnection {
                from,
                to,
                color: ctx.palette.temporary_connection,
            });
        }

        self.list = DisplayList {
            transform: Affine::scale(ctx.scale_factor) * camera.transform(),
            background: ctx.background_color,
            generation,
            items,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{PathEl, Size};
    use topolink_core::{
        DeviceSpec, Editor, GroupSpec, MouseButton, PointerEvent, Port, PortRef,
    };

    fn ports() -> Vec<Port> {
        vec![Port::new(0, "eth0", 1e9), Port::new(1, "eth1", 1e9)]
    }

    fn device(editor: &mut Editor, x: f64, y: f64) -> DeviceId {
        editor.add_device(
            DeviceSpec::new("switch", Point::new(x, y))
                .with_size(80.0, 60.0)
                .with_ports(ports()),
        )
    }

    fn build(editor: &Editor) -> DisplayList {
        let mut renderer = DisplayListRenderer::new();
        let ctx = RenderContext::new(editor, Size::new(800.0, 600.0));
        renderer.build_scene(&ctx);
        renderer.take_display_list()
    }

    fn points(path: &BezPath) -> Vec<Point> {
        path.elements()
            .iter()
            .filter_map(|el| match el {
                PathEl::MoveTo(p) | PathEl::LineTo(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_route_between_facing_ports() {
        let source = PortAnchor {
            port_id: 1,
            position: Point::new(180.0, 120.0),
            side: PortSide::Right,
        };
        let target = PortAnchor {
            port_id: 0,
            position: Point::new(300.0, 160.0),
            side: PortSide::Left,
        };

        let pts = points(&route_connection(&source, &target));

        assert_eq!(
            pts,
            vec![
                Point::new(180.0, 120.0),
                Point::new(196.0, 120.0),
                Point::new(240.0, 120.0),
                Point::new(240.0, 160.0),
                Point::new(284.0, 160.0),
                Point::new(300.0, 160.0),
            ]
        );
    }

    #[test]
    fn test_route_from_centre_anchor_has_no_stub() {
        let source = PortAnchor {
            port_id: 7,
            position: Point::new(0.0, 0.0),
            side: PortSide::Center,
        };
        let target = PortAnchor {
            port_id: 0,
            position: Point::new(100.0, 50.0),
            side: PortSide::Left,
        };

        let pts = points(&route_connection(&source, &target));

        assert_eq!(pts.first(), Some(&Point::new(0.0, 0.0)));
        assert_eq!(pts.last(), Some(&Point::new(100.0, 50.0)));
        assert_eq!(pts.len(), 5);
    }

    #[test]
    fn test_groups_nest_members() {
        let mut editor = Editor::default();
        let g = editor.add_group(GroupSpec::new("Rack", Point::new(50.0, 50.0)));
        let inside = device(&mut editor, 100.0, 100.0);
        let outside = device(&mut editor, 500.0, 100.0);
        editor.assign_device_to_group(inside, g);

        let list = build(&editor);

        let group = list.items.iter().find_map(|item| match item {
            DrawItem::Group { id, members, .. } if *id == g => Some(members),
            _ => None,
        });
        assert_eq!(group.map(|m| m[0].id), Some(inside));
        assert!(list.items.iter().any(|item| matches!(item, DrawItem::Device(d) if d.id == outside)));
        assert_eq!(list.device_count(), 2);
    }

    #[test]
    fn test_connection_geometry_follows_moves() {
        let mut editor = Editor::default();
        let a = device(&mut editor, 100.0, 100.0);
        let b = device(&mut editor, 300.0, 100.0);
        let c = editor
            .add_connection(PortRef::new(a, 1), PortRef::new(b, 0))
            .unwrap();

        let before = build(&editor);
        editor.move_device(b, 300.0, 200.0);
        let after = build(&editor);

        assert_ne!(before.connection_keys(), after.connection_keys());
        assert_eq!(after.connection_keys()[0].generation, editor.generation());
        let end = points(after.connection_path(c).unwrap()).pop();
        assert_eq!(end, Some(Point::new(300.0, 220.0)));
    }

    #[test]
    fn test_force_update_rekeys_connections() {
        let mut editor = Editor::default();
        let a = device(&mut editor, 0.0, 0.0);
        let b = device(&mut editor, 200.0, 0.0);
        editor.add_connection(PortRef::new(a, 1), PortRef::new(b, 0));

        let before = build(&editor);
        editor.force_update();
        let after = build(&editor);

        assert_ne!(before.connection_keys(), after.connection_keys());
    }

    #[test]
    fn test_temporary_connection_is_drawn() {
        let mut editor = Editor::default();
        device(&mut editor, 100.0, 100.0);
        editor.handle_pointer_event(PointerEvent::Down {
            position: Point::new(100.0, 120.0),
            button: MouseButton::Left,
        });
        editor.handle_pointer_event(PointerEvent::Move {
            position: Point::new(250.0, 150.0),
        });

        let list = build(&editor);

        assert_eq!(
            list.temporary_connection(),
            Some((Point::new(100.0, 120.0), Point::new(250.0, 150.0)))
        );
    }

    #[test]
    fn test_items_carry_context_colours() {
        let mut editor = Editor::default();
        let g = editor.add_group(GroupSpec::new("Rack", Point::new(50.0, 50.0)));
        let d = device(&mut editor, 100.0, 100.0);
        editor.assign_device_to_group(d, g);
        let background = Color::from_rgba8(10, 20, 30, 255);
        let mut renderer = DisplayListRenderer::new();
        let mut ctx = RenderContext::new(&editor, Size::new(800.0, 600.0));
        ctx.background_color = background;
        renderer.build_scene(&ctx);

        let list = renderer.display_list();
        let palette = Palette::default();
        assert_eq!(list.background.components, background.components);
        let Some(DrawItem::Group { fill, members, .. }) = list
            .items
            .iter()
            .find(|item| matches!(item, DrawItem::Group { .. }))
        else {
            panic!("group not drawn");
        };
        assert_eq!(fill.components, palette.group_fill.components);
        assert_eq!(members[0].port_color.components, palette.port.components);
    }

    #[test]
    fn test_transform_includes_scale_factor() {
        let editor = Editor::default();
        let mut renderer = DisplayListRenderer::new();
        let ctx = RenderContext::new(&editor, Size::new(800.0, 600.0))
            .with_scale_factor(2.0)
            .with_grid(GridStyle::None);
        renderer.build_scene(&ctx);

        let list = renderer.display_list();
        assert_eq!(list.transform * Point::new(10.0, 5.0), Point::new(20.0, 10.0));
        assert!(list.items.is_empty());
    }
}
