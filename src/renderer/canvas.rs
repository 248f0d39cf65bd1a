//! Canvas2D painter for [`Scene`] display lists

use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::scene::{DrawCmd, Scene, css_color};

const FONT_FAMILY: &str = "Fredoka, 'Noto Sans SC', sans-serif";

pub struct CanvasPainter {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasPainter {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        Ok(Self { canvas, ctx })
    }

    /// Match the backing store to the element's CSS size
    pub fn fit_to_client(&self) -> (f32, f32) {
        let width = self.canvas.client_width().max(1) as u32;
        let height = self.canvas.client_height().max(1) as u32;
        if self.canvas.width() != width || self.canvas.height() != height {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
        }
        (width as f32, height as f32)
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn paint(&self, scene: &Scene) {
        let ctx = &self.ctx;
        ctx.clear_rect(0.0, 0.0, scene.width as f64, scene.height as f64);
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");

        for cmd in scene.cmds() {
            match cmd {
                DrawCmd::Circle {
                    center,
                    radius,
                    color,
                } => {
                    ctx.set_fill_style_str(&css_color(*color));
                    ctx.begin_path();
                    ctx.arc(center.x as f64, center.y as f64, *radius as f64, 0.0, TAU)
                        .ok();
                    ctx.fill();
                }
                DrawCmd::Rect {
                    min,
                    size,
                    color,
                    corner,
                } => {
                    ctx.set_fill_style_str(&css_color(*color));
                    if *corner > 0.0 {
                        self.rounded_rect_path(min.x, min.y, size.x, size.y, *corner);
                        ctx.fill();
                    } else {
                        ctx.fill_rect(min.x as f64, min.y as f64, size.x as f64, size.y as f64);
                    }
                }
                DrawCmd::Polygon { points, color } => {
                    let Some((first, rest)) = points.split_first() else {
                        continue;
                    };
                    ctx.set_fill_style_str(&css_color(*color));
                    ctx.begin_path();
                    ctx.move_to(first.x as f64, first.y as f64);
                    for p in rest {
                        ctx.line_to(p.x as f64, p.y as f64);
                    }
                    ctx.close_path();
                    ctx.fill();
                }
                DrawCmd::Line {
                    from,
                    to,
                    width,
                    color,
                    dash,
                } => {
                    let pattern = js_sys::Array::new();
                    if let Some(d) = dash {
                        pattern.push(&JsValue::from_f64(*d as f64));
                        pattern.push(&JsValue::from_f64(*d as f64));
                    }
                    ctx.set_line_dash(&pattern).ok();
                    ctx.set_stroke_style_str(&css_color(*color));
                    ctx.set_line_width(*width as f64);
                    ctx.begin_path();
                    ctx.move_to(from.x as f64, from.y as f64);
                    ctx.line_to(to.x as f64, to.y as f64);
                    ctx.stroke();
                    if dash.is_some() {
                        ctx.set_line_dash(&js_sys::Array::new()).ok();
                    }
                }
                DrawCmd::Text {
                    pos,
                    text,
                    size,
                    color,
                    bold,
                } => {
                    let weight = if *bold { "bold " } else { "" };
                    ctx.set_font(&format!("{weight}{size}px {FONT_FAMILY}"));
                    ctx.set_fill_style_str(&css_color(*color));
                    ctx.fill_text(text, pos.x as f64, pos.y as f64).ok();
                }
            }
        }
    }

    fn rounded_rect_path(&self, x: f32, y: f32, w: f32, h: f32, r: f32) {
        let r = r.min(w / 2.0).min(h / 2.0) as f64;
        let (x, y, w, h) = (x as f64, y as f64, w as f64, h as f64);
        let ctx = &self.ctx;
        ctx.begin_path();
        ctx.move_to(x + r, y);
        ctx.arc_to(x + w, y, x + w, y + h, r).ok();
        ctx.arc_to(x + w, y + h, x, y + h, r).ok();
        ctx.arc_to(x, y + h, x, y, r).ok();
        ctx.arc_to(x, y, x + w, y, r).ok();
        ctx.close_path();
    }
}
