//! Platform-neutral display list

use glam::Vec2;

/// One drawing operation, painted in order
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Circle {
        center: Vec2,
        radius: f32,
        color: [f32; 4],
    },
    Rect {
        min: Vec2,
        size: Vec2,
        color: [f32; 4],
        /// Corner radius, 0 for square corners
        corner: f32,
    },
    /// Filled closed polygon
    Polygon { points: Vec<Vec2>, color: [f32; 4] },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: [f32; 4],
        /// Dash and gap length for dashed strokes
        dash: Option<f32>,
    },
    /// Centred text
    Text {
        pos: Vec2,
        text: String,
        size: f32,
        color: [f32; 4],
        bold: bool,
    },
}

/// A frame's worth of draw commands
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    cmds: Vec<DrawCmd>,
}

impl Scene {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            cmds: Vec::with_capacity(256),
        }
    }

    /// Reset for a new frame, keeping the allocation
    pub fn clear(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.cmds.clear();
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        self.cmds.push(DrawCmd::Circle {
            center,
            radius,
            color,
        });
    }

    pub fn rect(&mut self, min: Vec2, size: Vec2, color: [f32; 4], corner: f32) {
        self.cmds.push(DrawCmd::Rect {
            min,
            size,
            color,
            corner,
        });
    }

    pub fn polygon(&mut self, points: Vec<Vec2>, color: [f32; 4]) {
        if points.len() >= 3 {
            self.cmds.push(DrawCmd::Polygon { points, color });
        }
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: [f32; 4], dash: Option<f32>) {
        self.cmds.push(DrawCmd::Line {
            from,
            to,
            width,
            color,
            dash,
        });
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, size: f32, color: [f32; 4], bold: bool) {
        self.cmds.push(DrawCmd::Text {
            pos,
            text: text.into(),
            size,
            color,
            bold,
        });
    }

    pub fn cmds(&self) -> &[DrawCmd] {
        &self.cmds
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Every text string in paint order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.cmds.iter().filter_map(|cmd| match cmd {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// CSS `rgba()` string for a colour
pub fn css_color(color: [f32; 4]) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({},{},{},{})",
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        color[3].clamp(0.0, 1.0)
    )
}

/// Colors for game elements
pub mod colors {
    use crate::rgb;

    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const SHINE: [f32; 4] = [1.0, 1.0, 1.0, 0.3];
    pub const SHADOW: [f32; 4] = [0.0, 0.0, 0.0, 0.2];
    pub const AIM_GUIDE: [f32; 4] = [0.0, 0.0, 0.0, 0.2];
    pub const BASKET: [f32; 4] = rgb(0x8D, 0x6E, 0x63);
    pub const BASKET_RIM: [f32; 4] = rgb(0x6D, 0x4C, 0x41);
    pub const APPLE: [f32; 4] = rgb(0xFF, 0x6B, 0x6B);
    pub const STEM: [f32; 4] = rgb(0x4E, 0x34, 0x2E);
    pub const BOMB: [f32; 4] = rgb(0x33, 0x33, 0x33);
    pub const FUSE: [f32; 4] = rgb(0xFF, 0xA0, 0x00);
    pub const CARD_BACK: [f32; 4] = rgb(0x6C, 0x5C, 0xE7);
    pub const CARD_EQUATION: [f32; 4] = rgb(0xFF, 0xF3, 0xCD);
    pub const CARD_ANSWER: [f32; 4] = rgb(0xD6, 0xF5, 0xE3);
    pub const CARD_MATCHED: [f32; 4] = [0.18, 0.8, 0.44, 0.35];
    pub const CARD_TEXT: [f32; 4] = rgb(0x2D, 0x34, 0x36);
}
