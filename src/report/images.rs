use crate::config::{GridConfig, PageGeometry, ReportConfig};
use crate::fonts::FontStyle;
use crate::pdf::{Frame, Rgb, TextAlign, TextOp};
use crate::report::paginate::Paginator;

pub const APPENDIX_TITLE: &str = "ANEXOS / IMAGENS DO EXAME";
pub const CONTINUATION_SUFFIX: &str = " (continuação)";
/// Smallest cell height honoured from configuration, in mm.
const MIN_CELL_HEIGHT: f32 = 10.0;

/// Scaled size of an image drawn "contain" style inside a cell. Never
/// upscales; the aspect ratio is kept.
pub fn fit_contain(image_w: f32, image_h: f32, cell_w: f32, cell_h: f32) -> (f32, f32) {
    if image_w <= 0.0 || image_h <= 0.0 {
        return (0.0, 0.0);
    }
    let scale = 1.0f32.min(cell_w / image_w).min(cell_h / image_h);
    (image_w * scale, image_h * scale)
}

/// Fixed-cell grid for the image appendix.
#[derive(Clone, Copy, Debug)]
pub struct ImageGrid {
    grid: GridConfig,
    geometry: PageGeometry,
    per_page: usize,
}

impl ImageGrid {
    pub fn new(config: &ReportConfig) -> Self {
        let geometry = config.page;
        let grid = GridConfig {
            columns: config.grid.columns.max(1),
            cell_height: config.grid.cell_height.max(MIN_CELL_HEIGHT),
            gap: config.grid.gap.max(0.0),
            ..config.grid
        };
        let top = geometry.content_start + grid.title_gap;
        let pitch = grid.cell_height + grid.gap;
        let rows_fit = ((geometry.content_limit() - top + grid.gap) / pitch).floor().max(1.0) as usize;
        let per_page = grid.per_page.clamp(1, rows_fit.saturating_mul(grid.columns));
        if per_page < grid.per_page {
            log::debug!(
                "Image grid holds {per_page} cells per page, {} requested",
                grid.per_page
            );
        }
        Self {
            grid,
            geometry,
            per_page,
        }
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn cell_width(&self) -> f32 {
        let cols = self.grid.columns as f32;
        (self.geometry.content_width() - (cols - 1.0) * self.grid.gap) / cols
    }

    pub fn cell_height(&self) -> f32 {
        self.grid.cell_height
    }

    /// Cell for the `slot`-th image on a page, row-major.
    pub fn cell(&self, slot: usize) -> Frame {
        let row = slot / self.grid.columns;
        let col = slot % self.grid.columns;
        let width = self.cell_width();
        Frame {
            x: self.geometry.margin + col as f32 * (width + self.grid.gap),
            y: self.geometry.content_start
                + self.grid.title_gap
                + row as f32 * (self.grid.cell_height + self.grid.gap),
            width,
            height: self.grid.cell_height,
        }
    }

    /// Image frame centred inside its cell.
    pub fn place(&self, slot: usize, width_px: u32, height_px: u32) -> Frame {
        let cell = self.cell(slot);
        let (w, h) = fit_contain(width_px as f32, height_px as f32, cell.width, cell.height);
        Frame {
            x: cell.x + (cell.width - w) / 2.0,
            y: cell.y + (cell.height - h) / 2.0,
            width: w,
            height: h,
        }
    }
}

/// Places appendix images one by one, opening a page whenever the current
/// one is full. Nothing is drawn until the first image arrives.
pub struct Appendix {
    grid: ImageGrid,
    placed: usize,
}

impl Appendix {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            grid: ImageGrid::new(config),
            placed: 0,
        }
    }

    pub fn placed(&self) -> usize {
        self.placed
    }

    pub fn place(&mut self, p: &mut Paginator<'_>, image: usize, width_px: u32, height_px: u32) {
        let slot = self.placed % self.grid.per_page();
        if slot == 0 {
            p.new_page();
            let title = if self.placed == 0 {
                APPENDIX_TITLE.to_string()
            } else {
                format!("{APPENDIX_TITLE}{CONTINUATION_SUFFIX}")
            };
            let geometry = *p.geometry();
            p.text(
                TextOp::new(geometry.width / 2.0, geometry.content_start, title, FontStyle::Bold, 12.0)
                    .color(Rgb::NAVY)
                    .align(TextAlign::Center),
            );
        }
        let frame = self.grid.place(slot, width_px, height_px);
        p.page_mut().draw_image(frame, image);
        self.placed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_images_are_not_upscaled() {
        assert_eq!(fit_contain(40.0, 30.0, 87.0, 74.0), (40.0, 30.0));
    }

    #[test]
    fn default_grid_fits_six_cells_above_footer() {
        let config = ReportConfig::default();
        let grid = ImageGrid::new(&config);
        assert_eq!(grid.per_page(), 6);
        assert!(grid.cell(5).bottom() <= config.page.content_limit());
        assert_eq!(grid.cell(1).y, grid.cell(0).y);
        assert!(grid.cell(1).x > grid.cell(0).right());
    }

    #[test]
    fn degenerate_cell_pitch_is_clamped() {
        let mut config = ReportConfig::default();
        config.grid.cell_height = 0.0;
        config.grid.gap = 0.0;
        config.grid.per_page = usize::MAX;
        let grid = ImageGrid::new(&config);
        assert_eq!(grid.cell_height(), MIN_CELL_HEIGHT);
        let last = grid.cell(grid.per_page() - 1);
        assert!(last.bottom() <= config.page.content_limit() + 1e-3);

        config.grid.cell_height = -50.0;
        config.grid.gap = -5.0;
        config.grid.per_page = 6;
        let grid = ImageGrid::new(&config);
        assert_eq!(grid.per_page(), 6);
        assert!(grid.cell(1).x >= grid.cell(0).right());
    }
}
