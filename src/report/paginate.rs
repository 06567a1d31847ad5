//! Vertical cursor and page breaking.
//!
//! The [`Paginator`] is the only owner of [`RenderState`]. Renderers ask it to
//! reserve room for a block they cannot split, then draw at [`Paginator::cursor`]
//! and [`Paginator::advance`] past what they drew.

use crate::config::{PageGeometry, ReportConfig};
use crate::fonts::FontStyle;
use crate::pdf::{Frame, Page, Rgb, TextOp};

const FIT_TOLERANCE: f32 = 1e-3;

/// Draws the branding band at the top of every page.
pub trait PageHeader: Sync {
    fn draw(&self, page: &mut Page, geometry: &PageGeometry);
}

/// A header that draws nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlankHeader;

impl PageHeader for BlankHeader {
    fn draw(&self, _page: &mut Page, _geometry: &PageGeometry) {}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderState {
    pub page_index: usize,
    pub cursor_y: f32,
    /// Lowest cursor position content may reach on the current page.
    pub content_bottom: f32,
    pub header_drawn: bool,
}

pub struct Paginator<'h> {
    pages: Vec<Page>,
    state: RenderState,
    geometry: PageGeometry,
    section_header_height: f32,
    header: &'h dyn PageHeader,
}

const SECTION_BAND_HEIGHT: f32 = 7.0;
const SECTION_BAND_RISE: f32 = 4.0;
const SECTION_TITLE_SIZE: f32 = 10.0;

impl<'h> Paginator<'h> {
    /// Open the first page with its header drawn and the cursor at the
    /// content start.
    pub fn new(config: &ReportConfig, header: &'h dyn PageHeader) -> Self {
        let geometry = config.page;
        let mut paginator = Self {
            pages: Vec::new(),
            state: RenderState {
                page_index: 0,
                cursor_y: geometry.content_start,
                content_bottom: geometry.content_limit(),
                header_drawn: false,
            },
            geometry,
            section_header_height: config.section_header_height,
            header,
        };
        paginator.open_page();
        paginator
    }

    fn open_page(&mut self) {
        let mut page = Page::new();
        self.header.draw(&mut page, &self.geometry);
        self.pages.push(page);
        self.state.page_index = self.pages.len() - 1;
        self.state.cursor_y = self.geometry.content_start;
        self.state.content_bottom = self.geometry.content_limit();
        self.state.header_drawn = true;
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn cursor(&self) -> f32 {
        self.state.cursor_y
    }

    pub fn page_index(&self) -> usize {
        self.state.page_index
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Room left above the bottom reserve.
    pub fn remaining(&self) -> f32 {
        self.state.content_bottom - self.state.cursor_y
    }

    /// Nothing has been drawn below the header on this page yet.
    pub fn at_page_top(&self) -> bool {
        self.state.cursor_y <= self.geometry.content_start + f32::EPSILON
    }

    /// Start a new page unless `height` fits below the cursor. Returns whether
    /// a break happened. A block taller than a whole page is drawn from the
    /// top of a fresh page and allowed to overflow; it never loops.
    pub fn reserve(&mut self, height: f32) -> bool {
        // Blocks reserved as a sum of their parts must fit the same way.
        if self.state.cursor_y + height <= self.state.content_bottom + FIT_TOLERANCE {
            return false;
        }
        if self.at_page_top() {
            log::debug!(
                "Block of {height:.1}mm exceeds page {} content height, drawing with overflow",
                self.state.page_index + 1
            );
            return false;
        }
        log::debug!(
            "Page break before {height:.1}mm block at y={:.1} on page {}",
            self.state.cursor_y,
            self.state.page_index + 1
        );
        self.new_page();
        true
    }

    /// Draw a section title band, keeping at least `min_following` of room
    /// for its content on the same page.
    pub fn section_header(&mut self, title: &str, min_following: f32) -> bool {
        let broke = self.reserve(self.section_header_height + min_following);
        let y = self.state.cursor_y;
        let margin = self.geometry.margin;
        let width = self.geometry.content_width();
        let page = self.page_mut();
        page.fill_rect(
            Frame {
                x: margin,
                y: y - SECTION_BAND_RISE,
                width,
                height: SECTION_BAND_HEIGHT,
            },
            Rgb::BAND,
        );
        page.push_text(
            TextOp::new(margin + 2.0, y, title, FontStyle::Bold, SECTION_TITLE_SIZE).color(Rgb::NAVY),
        );
        self.advance(self.section_header_height);
        broke
    }

    pub fn advance(&mut self, height: f32) {
        self.state.cursor_y += height;
    }

    /// Unconditional page break.
    pub fn new_page(&mut self) {
        self.open_page();
    }

    pub fn page_mut(&mut self) -> &mut Page {
        let index = self.state.page_index;
        &mut self.pages[index]
    }

    /// Push a text operation onto the current page.
    pub fn text(&mut self, op: TextOp) {
        self.page_mut().push_text(op);
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn finish(self) -> Vec<Page> {
        self.pages
    }
}
