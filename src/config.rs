use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Page geometry in millimetres, origin at the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    /// Height of the branding band drawn on every page.
    pub header_height: f32,
    /// Where body content starts on a fresh page.
    pub content_start: f32,
    /// Space kept free at the bottom of every page for the page number.
    pub bottom_reserved: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin: 16.0,
            header_height: 25.0,
            content_start: 35.0,
            bottom_reserved: 20.0,
        }
    }
}

impl PageGeometry {
    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Lowest cursor position body content may reach.
    pub fn content_limit(&self) -> f32 {
        self.height - self.bottom_reserved
    }

    pub fn content_height(&self) -> f32 {
        self.content_limit() - self.content_start
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GridConfig {
    pub columns: usize,
    pub per_page: usize,
    pub cell_height: f32,
    pub gap: f32,
    /// Offset from the appendix title baseline to the first row of cells.
    pub title_gap: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 2,
            per_page: 6,
            cell_height: 74.0,
            gap: 4.0,
            title_gap: 7.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SignatureConfig {
    pub image_width: f32,
    pub max_image_height: f32,
    pub line_height: f32,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            image_width: 40.0,
            max_image_height: 15.0,
            line_height: 4.0,
        }
    }
}

/// Everything the composer needs to know besides the exam itself. Passed in
/// explicitly; nothing is read from global state during a render.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    pub page: PageGeometry,
    pub row_height: f32,
    /// Vertical footprint of a section title band.
    pub section_header_height: f32,
    /// Content that must fit below a section title on the same page.
    pub section_min_content: f32,
    /// Upper bound for the hemodynamic block look-ahead.
    pub hemodynamic_cap: f32,
    pub grid: GridConfig,
    pub signature: SignatureConfig,
    pub decimal_separator: char,
    /// Reference range and classification columns in the LV table.
    pub show_references: bool,
    pub asset_timeout_ms: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page: PageGeometry::default(),
            row_height: 5.0,
            section_header_height: 8.0,
            section_min_content: 25.0,
            hemodynamic_cap: 80.0,
            grid: GridConfig::default(),
            signature: SignatureConfig::default(),
            decimal_separator: ',',
            show_references: true,
            asset_timeout_ms: 10_000,
        }
    }
}

impl ReportConfig {
    /// Defaults with overrides from `VETCARDIO_ASSET_TIMEOUT_MS`,
    /// `VETCARDIO_IMAGES_PER_PAGE` and `VETCARDIO_SHOW_REFERENCES`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(ms) = env_parse::<u64>("VETCARDIO_ASSET_TIMEOUT_MS") {
            config.asset_timeout_ms = ms;
        }
        if let Some(n) = env_parse::<usize>("VETCARDIO_IMAGES_PER_PAGE").filter(|n| *n > 0) {
            config.grid.per_page = n;
        }
        if let Ok(val) = std::env::var("VETCARDIO_SHOW_REFERENCES") {
            config.show_references = !matches!(val.trim(), "0" | "false" | "no" | "off");
        }
        config
    }

    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn asset_timeout(&self) -> Duration {
        Duration::from_millis(self.asset_timeout_ms)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let val = std::env::var(name).ok()?;
    match val.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            log::warn!("Ignoring {name}={val:?}: not a valid value");
            None
        }
    }
}
