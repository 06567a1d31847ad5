use crate::config::{ReportConfig, SignatureConfig};
use crate::fonts::FontStyle;
use crate::model::Practitioner;
use crate::pdf::{Frame, Rgb, TextAlign, TextOp};
use crate::report::header::DEFAULT_PRACTITIONER;
use crate::report::paginate::Paginator;
use crate::values::present;

/// Signature raster already placed in the report's image store.
#[derive(Clone, Copy, Debug)]
pub struct SignatureImage {
    pub image: usize,
    pub width_px: u32,
    pub height_px: u32,
}

impl SignatureImage {
    /// Drawn size: fixed width, capped height, aspect ratio kept.
    pub fn size(&self, config: &SignatureConfig) -> (f32, f32) {
        let ratio = self.height_px as f32 / self.width_px.max(1) as f32;
        let height = config.image_width * ratio;
        if height <= config.max_image_height {
            (config.image_width, height)
        } else {
            (config.max_image_height / ratio, config.max_image_height)
        }
    }
}

/// Closing professional signature: optional image, then name, license and
/// specialty lines centred on the page. Never split across pages.
pub struct SignatureBlock<'a> {
    practitioner: &'a Practitioner,
    image: Option<SignatureImage>,
}

impl<'a> SignatureBlock<'a> {
    pub fn new(practitioner: &'a Practitioner, image: Option<SignatureImage>) -> Self {
        Self {
            practitioner,
            image,
        }
    }

    pub fn name_line(&self) -> String {
        match present(&self.practitioner.name) {
            Some(name) => {
                let prefix = if self.practitioner.is_female() { "Dra." } else { "Dr." };
                format!("{prefix} {name}")
            }
            None => DEFAULT_PRACTITIONER.to_string(),
        }
    }

    pub fn license_line(&self) -> Option<String> {
        let license = present(&self.practitioner.license)?;
        Some(match present(&self.practitioner.license_state) {
            Some(state) => format!("CRMV {state} {license}"),
            None => format!("CRMV {license}"),
        })
    }

    fn line_count(&self) -> usize {
        1 + usize::from(self.license_line().is_some())
            + usize::from(present(&self.practitioner.specialty).is_some())
    }

    /// Upper bound of the vertical space the block takes.
    pub fn height(&self, config: &SignatureConfig) -> f32 {
        let image = if self.image.is_some() {
            config.max_image_height + 2.0
        } else {
            0.0
        };
        2.0 + image + self.line_count() as f32 * config.line_height + 4.0
    }

    pub fn render(&self, p: &mut Paginator<'_>, config: &ReportConfig) {
        let sig = &config.signature;
        p.reserve(self.height(sig));
        p.advance(2.0);
        let center = config.page.width / 2.0;

        if let Some(image) = self.image {
            let (w, h) = image.size(sig);
            let y = p.cursor();
            p.page_mut().draw_image(
                Frame {
                    x: center - w / 2.0,
                    y,
                    width: w,
                    height: h,
                },
                image.image,
            );
            p.advance(h + 2.0);
        }

        let centred = |y: f32, text: String, style: FontStyle, size: f32| {
            TextOp::new(center, y, text, style, size)
                .color(Rgb::NAVY)
                .align(TextAlign::Center)
        };
        let y = p.cursor();
        p.text(centred(y, self.name_line(), FontStyle::Bold, 10.0));
        let extra = [
            self.license_line(),
            present(&self.practitioner.specialty).map(str::to_string),
        ];
        for line in extra.into_iter().flatten() {
            p.advance(sig.line_height);
            let y = p.cursor();
            p.text(centred(y, line, FontStyle::Regular, 9.0));
        }
        p.advance(sig.line_height);
    }
}
