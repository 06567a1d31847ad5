use crate::config::PageGeometry;
use crate::fonts::FontStyle;
use crate::model::{Clinic, Practitioner};
use crate::pdf::{Frame, Page, Rgb, TextAlign, TextOp};
use crate::report::paginate::PageHeader;
use crate::values::present;

const LOGO_X: f32 = 10.0;
const LOGO_Y: f32 = 3.0;
const LOGO_HEIGHT: f32 = 18.0;
const TEXT_INSET: f32 = 15.0;

pub const FALLBACK_CLINIC: &str = "VitaeCor";
pub const CLINIC_SUBTITLE: &str = "Cardiologia Veterinária";
pub const DEFAULT_PRACTITIONER: &str = "Veterinário Responsável";

/// Clinic logo already placed in the report's image store.
#[derive(Clone, Copy, Debug)]
pub struct PlacedLogo {
    pub image: usize,
    pub aspect: f32,
}

/// Navy band with the clinic identity on the left and the practitioner on
/// the right, repeated on every page.
pub struct BrandingHeader<'a> {
    pub clinic: &'a Clinic,
    pub practitioner: &'a Practitioner,
    pub logo: Option<PlacedLogo>,
}

impl PageHeader for BrandingHeader<'_> {
    fn draw(&self, page: &mut Page, geometry: &PageGeometry) {
        page.fill_rect(
            Frame {
                x: 0.0,
                y: 0.0,
                width: geometry.width,
                height: geometry.header_height,
            },
            Rgb::NAVY,
        );

        match self.logo {
            Some(logo) => page.draw_image(
                Frame {
                    x: LOGO_X,
                    y: LOGO_Y,
                    width: LOGO_HEIGHT * logo.aspect,
                    height: LOGO_HEIGHT,
                },
                logo.image,
            ),
            None => {
                let name = present(&self.clinic.trade_name).unwrap_or(FALLBACK_CLINIC);
                page.push_text(
                    TextOp::new(TEXT_INSET, 12.0, name, FontStyle::Bold, 18.0).color(Rgb::WHITE),
                );
                page.push_text(
                    TextOp::new(TEXT_INSET, 18.0, CLINIC_SUBTITLE, FontStyle::Regular, 10.0)
                        .color(Rgb::WHITE),
                );
            }
        }

        let right = geometry.width - TEXT_INSET;
        let right_text = |y: f32, text: &str, style: FontStyle, size: f32| {
            TextOp::new(right, y, text, style, size)
                .color(Rgb::WHITE)
                .align(TextAlign::Right)
        };
        page.push_text(right_text(8.0, "Ecodopplercardiograma", FontStyle::Bold, 12.0));
        let name = present(&self.practitioner.name).unwrap_or(DEFAULT_PRACTITIONER);
        page.push_text(right_text(13.0, name, FontStyle::Regular, 9.0));
        if let Some(license) = present(&self.practitioner.license) {
            let state = present(&self.practitioner.license_state).unwrap_or("");
            page.push_text(right_text(
                17.0,
                &format!("CRMV-{state}  {license}"),
                FontStyle::Regular,
                9.0,
            ));
        }
        if let Some(phone) = present(&self.practitioner.phone) {
            page.push_text(right_text(21.0, phone, FontStyle::Regular, 9.0));
        }
    }
}

/// Stamp "Página i de N" on every page once composition is complete.
pub fn stamp_page_numbers(pages: &mut [Page], geometry: &PageGeometry) {
    let total = pages.len();
    for (i, page) in pages.iter_mut().enumerate() {
        page.push_text(
            TextOp::new(
                geometry.width / 2.0,
                geometry.height - 5.0,
                format!("Página {} de {}", i + 1, total),
                FontStyle::Regular,
                8.0,
            )
            .color(Rgb::FOOTER)
            .align(TextAlign::Center),
        );
    }
}
