//! Room container that devices can be placed inside.

use super::{Entity, GroupId};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest width a group can be resized to.
pub const MIN_GROUP_WIDTH: f64 = 150.0;
/// Smallest height a group can be resized to.
pub const MIN_GROUP_HEIGHT: f64 = 100.0;

/// Parameters for a new group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub name: String,
    pub position: Point,
    #[serde(default)]
    pub size: Option<Size>,
}

impl GroupSpec {
    pub fn new(name: impl Into<String>, position: Point) -> Self {
        Self {
            name: name.into(),
            position,
            size: None,
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Some(Size::new(width, height));
        self
    }
}

/// A named, resizable room.
///
/// Membership is not stored here; a device names its group and the diagram
/// derives each group's member list from that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub(crate) id: GroupId,
    /// Top-left corner in content space.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub name: String,
}

impl Group {
    pub fn new(spec: GroupSpec, default_size: Size) -> Self {
        let size = clamp_group_size(spec.size.unwrap_or(default_size));
        Self {
            id: Uuid::new_v4(),
            position: spec.position,
            width: size.width,
            height: size.height,
            name: spec.name,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Square handle at the bottom-right corner, `handle_size` content units wide.
    pub fn resize_handle(&self, handle_size: f64) -> Rect {
        let corner = Point::new(self.position.x + self.width, self.position.y + self.height);
        Rect::new(
            corner.x - handle_size,
            corner.y - handle_size,
            corner.x,
            corner.y,
        )
    }
}

/// Apply the minimum group size.
pub fn clamp_group_size(size: Size) -> Size {
    Size::new(size.width.max(MIN_GROUP_WIDTH), size.height.max(MIN_GROUP_HEIGHT))
}

impl Entity for Group {
    fn id(&self) -> GroupId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size())
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}
