pub mod assets;
pub mod config;
mod error;
pub mod fonts;
pub mod metrics;
pub mod model;
pub mod pdf;
pub mod report;
pub mod values;

pub use assets::{AssetLoader, DecodedImage, FsAssetLoader, ImageFormat, ImageSource, NoRemoteAssets};
pub use config::ReportConfig;
pub use error::Error;
pub use model::{BrandingAssets, ExamRecord};
pub use report::Report;

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Compose the report for one exam. See [`report::compose`].
pub async fn generate_report(
    exam: &ExamRecord,
    images: Vec<ImageSource>,
    branding: &BrandingAssets,
    loader: &dyn AssetLoader,
    config: &ReportConfig,
) -> Result<Report, Error> {
    report::compose(exam, images, branding, loader, config).await
}

/// Read an exam (and optional branding) JSON file, compose the report and
/// write the PDF into `out_dir`. Relative asset locations resolve against
/// the exam file's directory.
pub async fn write_report(
    exam_path: &Path,
    branding_path: Option<&Path>,
    out_dir: &Path,
    config: &ReportConfig,
) -> Result<PathBuf, Error> {
    let t0 = Instant::now();

    let exam = ExamRecord::from_json(&tokio::fs::read_to_string(exam_path).await?)?;
    let branding = match branding_path {
        Some(path) => BrandingAssets::from_json(&tokio::fs::read_to_string(path).await?)?,
        None => BrandingAssets::default(),
    };
    let t_parse = t0.elapsed();

    let root = exam_path.parent().unwrap_or_else(|| Path::new("."));
    let loader = FsAssetLoader::new(root);
    let report = generate_report(&exam, Vec::new(), &branding, &loader, config).await?;
    let t_compose = t0.elapsed();

    let bytes = report.render()?;
    let t_render = t0.elapsed();

    let path = out_dir.join(report.file_name());
    tokio::fs::write(&path, &bytes).await?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, compose={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_compose - t_parse).as_secs_f64() * 1000.0,
        (t_render - t_compose).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(path)
}
