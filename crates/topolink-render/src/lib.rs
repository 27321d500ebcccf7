//! Topolink Render Library
//!
//! Renderer abstraction and the display-list scene builder for Topolink.
//! Connection geometry is derived from device positions on every build.

mod renderer;
mod scene;

pub use renderer::{GridStyle, Palette, RenderContext, Renderer};
pub use scene::{
    CONNECTION_STUB, ConnectionKey, DeviceItem, DisplayList, DisplayListRenderer, DrawItem,
    route_connection,
};
