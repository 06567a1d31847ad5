pub mod header;
pub mod images;
pub mod paginate;
pub mod sections;
pub mod signature;

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::assets::{self, AssetLoader, DecodedImage, ImageSource};
use crate::config::{PageGeometry, ReportConfig};
use crate::error::Error;
use crate::fonts::fold_accent;
use crate::metrics::DerivedValues;
use crate::model::{BrandingAssets, ExamRecord};
use crate::pdf::{self, Page};

use header::{BrandingHeader, PlacedLogo, stamp_page_numbers};
use images::Appendix;
use paginate::Paginator;
use sections::{Section, SectionContext};
use signature::{SignatureBlock, SignatureImage};

/// A fully laid-out report, ready to serialize.
#[derive(Debug)]
pub struct Report {
    pages: Vec<Page>,
    images: Vec<DecodedImage>,
    geometry: PageGeometry,
    file_name: String,
}

impl Report {
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Rasters referenced by the pages' image operations.
    pub fn images(&self) -> &[DecodedImage] {
        &self.images
    }

    pub fn render(&self) -> Result<Vec<u8>, Error> {
        pdf::write_pdf(&self.pages, &self.images, &self.geometry)
    }

    /// `laudo-<patient>-<date>.pdf`
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Render and write the PDF into `dir` under [`Report::file_name`].
    pub async fn save(&self, dir: &Path) -> Result<PathBuf, Error> {
        let bytes = self.render()?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &bytes).await?;
        Ok(path)
    }
}

fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars().map(fold_accent) {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

fn iso_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    ["%Y-%m-%d", "%d/%m/%Y"]
        .iter()
        .find_map(|fmt| chrono::NaiveDate::parse_from_str(raw, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
}

pub fn file_name_for(exam: &ExamRecord) -> String {
    let patient = crate::values::present(&exam.patient.name)
        .map(slug)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "paciente".to_string());
    let date = crate::values::present(&exam.info.date)
        .and_then(iso_date)
        .unwrap_or_else(|| "sem-data".to_string());
    format!("laudo-{patient}-{date}.pdf")
}

/// Lay out the whole report.
///
/// Layout is one sequential pass. The only suspension points are the asset
/// loads (logo, signature, each appendix image), each awaited before drawing
/// continues, so output order never depends on fetch latency. Any asset that
/// fails or times out is logged and skipped.
///
/// `images` are the stored exam images in storage order; when empty, the
/// sources recorded in the exam are used.
pub async fn compose(
    exam: &ExamRecord,
    images: Vec<ImageSource>,
    branding: &BrandingAssets,
    loader: &dyn AssetLoader,
    config: &ReportConfig,
) -> Result<Report, Error> {
    let t0 = Instant::now();
    if exam.is_blank() {
        return Err(Error::NoExamData);
    }
    let timeout = config.asset_timeout();
    let mut store: Vec<DecodedImage> = Vec::new();

    let logo = match &branding.logo {
        Some(source) => match assets::resolve(source, "clinic logo", loader, timeout).await {
            Ok(img) => {
                let aspect = img.width as f32 / img.height as f32;
                store.push(img);
                Some(PlacedLogo {
                    image: store.len() - 1,
                    aspect,
                })
            }
            Err(e) => {
                log::warn!("Clinic logo unavailable, using text header: {e}");
                None
            }
        },
        None => None,
    };
    let t_logo = t0.elapsed();

    let header = BrandingHeader {
        clinic: &branding.clinic,
        practitioner: &branding.practitioner,
        logo,
    };
    let derived = DerivedValues::compute(exam);
    let ctx = SectionContext::new(exam, &derived, config);
    let mut p = Paginator::new(config, &header);

    ctx.title(&mut p);
    ctx.identification(&mut p);
    for section in Section::ORDER {
        ctx.render(section, &mut p);
    }
    let t_sections = t0.elapsed();

    let signature = match &branding.signature {
        Some(source) => match assets::resolve(source, "signature", loader, timeout).await {
            Ok(img) => {
                let placed = SignatureImage {
                    image: store.len(),
                    width_px: img.width,
                    height_px: img.height,
                };
                store.push(img);
                Some(placed)
            }
            Err(e) => {
                log::warn!("Signature image unavailable, using text-only block: {e}");
                None
            }
        },
        None => None,
    };
    SignatureBlock::new(&branding.practitioner, signature).render(&mut p, config);

    let sources: Vec<Option<ImageSource>> = if images.is_empty() {
        exam.image_sources()
    } else {
        images.into_iter().map(Some).collect()
    };
    let mut appendix = Appendix::new(config);
    for index in exam.appendix_indices(sources.len()) {
        let label = exam
            .images
            .get(index)
            .map(|a| a.name.clone())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("image #{index}"));
        let Some(source) = &sources[index] else {
            log::warn!("Skipping {label}: no usable source");
            continue;
        };
        match assets::resolve(source, &label, loader, timeout).await {
            Ok(img) => {
                let (w, h) = (img.width, img.height);
                store.push(img);
                appendix.place(&mut p, store.len() - 1, w, h);
            }
            Err(e) => log::warn!("Skipping {label}: {e}"),
        }
    }
    let t_appendix = t0.elapsed();

    let mut pages = p.finish();
    stamp_page_numbers(&mut pages, &config.page);

    log::info!(
        "Compose phases: logo={:.1}ms, sections={:.1}ms, signature+appendix={:.1}ms ({} pages, {} images)",
        t_logo.as_secs_f64() * 1000.0,
        (t_sections - t_logo).as_secs_f64() * 1000.0,
        (t_appendix - t_sections).as_secs_f64() * 1000.0,
        pages.len(),
        appendix.placed(),
    );

    Ok(Report {
        pages,
        images: store,
        geometry: config.page,
        file_name: file_name_for(exam),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_folds_accents_and_punctuation() {
        assert_eq!(slug("Bolinha  de Neve!"), "bolinha-de-neve");
        assert_eq!(slug("Ágata"), "agata");
    }

    #[test]
    fn file_name_uses_iso_date() {
        let mut exam = ExamRecord::default();
        exam.patient.name = Some("Rex".into());
        exam.info.date = Some("07/03/2024".into());
        assert_eq!(file_name_for(&exam), "laudo-rex-2024-03-07.pdf");
        exam.info.date = None;
        assert_eq!(file_name_for(&exam), "laudo-rex-sem-data.pdf");
    }
}
