//! Display list for one laid-out page.
//!
//! Coordinates are millimetres from the top-left corner of the page; the y of
//! a text operation is its baseline. The writer converts to PDF user space.

use crate::fonts::{FontStyle, text_width_mm};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const NAVY: Rgb = Rgb(26, 42, 82);
    pub const BODY: Rgb = Rgb(60, 60, 60);
    pub const COLUMN_HEADING: Rgb = Rgb(100, 100, 100);
    pub const BAND: Rgb = Rgb(240, 240, 240);
    pub const FOOTER: Rgb = Rgb(120, 120, 120);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    pub(crate) fn components(self) -> (f32, f32, f32) {
        (
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextOp {
    /// Anchor x; meaning depends on `align`.
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub style: FontStyle,
    /// Font size in points.
    pub size: f32,
    pub color: Rgb,
    pub align: TextAlign,
    /// Extra space added to every space character, in millimetres.
    pub word_spacing: f32,
}

impl TextOp {
    pub fn new(x: f32, y: f32, text: impl Into<String>, style: FontStyle, size: f32) -> Self {
        Self {
            x,
            y,
            text: text.into(),
            style,
            size,
            color: Rgb::BODY,
            align: TextAlign::Left,
            word_spacing: 0.0,
        }
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn word_spacing(mut self, spacing: f32) -> Self {
        self.word_spacing = spacing;
        self
    }

    pub fn width(&self) -> f32 {
        let spaces = self.text.chars().filter(|&c| c == ' ').count() as f32;
        text_width_mm(&self.text, self.style, self.size) + spaces * self.word_spacing
    }

    /// Left edge after alignment.
    pub fn left(&self) -> f32 {
        match self.align {
            TextAlign::Left => self.x,
            TextAlign::Center => self.x - self.width() / 2.0,
            TextAlign::Right => self.x - self.width(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Frame {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Text(TextOp),
    FillRect { frame: Frame, color: Rgb },
    /// `image` indexes the report's image store.
    Image { frame: Frame, image: usize },
}

#[derive(Clone, Debug, Default)]
pub struct Page {
    ops: Vec<DrawOp>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, op: TextOp) {
        self.ops.push(DrawOp::Text(op));
    }

    pub fn fill_rect(&mut self, frame: Frame, color: Rgb) {
        self.ops.push(DrawOp::FillRect { frame, color });
    }

    pub fn draw_image(&mut self, frame: Frame, image: usize) {
        self.ops.push(DrawOp::Image { frame, image });
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextOp> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(t) => Some(t),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = (&Frame, usize)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Image { frame, image } => Some((frame, *image)),
            _ => None,
        })
    }

    pub fn image_count(&self) -> usize {
        self.images().count()
    }

    /// Whether any text operation on the page contains `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.text.contains(needle))
    }

    /// First text operation containing `needle`.
    pub fn find_text(&self, needle: &str) -> Option<&TextOp> {
        self.texts().find(|t| t.text.contains(needle))
    }
}
