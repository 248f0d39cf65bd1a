//! Display-list rendering
//!
//! Simulations are turned into a [`Scene`] each frame; the browser host
//! paints it onto a Canvas2D context.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod scene;
pub mod shapes;

pub use scene::{DrawCmd, Scene, colors, css_color};

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasPainter;

/// Anything that can describe itself as a display list
pub trait Draw {
    /// Replace the contents of `scene` with the current frame
    fn draw(&self, scene: &mut Scene);
}
