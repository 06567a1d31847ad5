#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use base64::Engine;
use vetcardio_report::pdf::{Page, TextOp};
use vetcardio_report::{AssetLoader, BrandingAssets, Error, ExamRecord, Report};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Exam with only identity, weight and the two LV diameters.
pub const SCENARIO_EXAM: &str = r#"{
    "patientData": { "nome": "Rex", "especie": "canino", "peso": "12.5" },
    "measurementsData": { "dvedDiastole": "4.0", "dvedSistole": "2.6" }
}"#;

/// Exam with every clinical group filled in.
pub const FULL_EXAM: &str = r#"{
    "patientData": {
        "nome": "Bolinha", "responsavel": "Maria Silva", "especie": "felino",
        "raca": "SRD", "sexo": "Fêmea", "idade": "9 anos", "peso": "4.2"
    },
    "examInfo": {
        "data": "2024-03-07", "solicitante": "Dr. Paulo", "clinica": "Clínica Centro",
        "ritmo": "Sinusal", "frequenciaCardiaca": "180", "modoMedicao": "M"
    },
    "measurementsData": {
        "septoIVd": "0.45", "septoIVs": "0.70", "paredeLVd": "0.50", "paredeLVs": "0.80",
        "dvedDiastole": "1.60", "dvedSistole": "0.80", "aorta": "0.90", "atrioEsquerdo": "1.30"
    },
    "classificationsData": { "septoIVd": "normal", "dvedDiastole": "normal", "relacaoAEAo": "normal" },
    "funcaoDiastolica": {
        "ondaE": "75", "ondaA": "60", "tempoDesaceleracao": "70", "triv": "50",
        "padraoDiastolico": "Relaxamento normal"
    },
    "funcaoSistolica": { "simpson": "62", "mapse": "0.45", "epss": "0.2", "statusFuncao": "normal" },
    "ventriculoDireito": { "atrioDireito": "Normal", "ventriculoDireito": "none", "tapse": "0.9" },
    "tdiLivre": { "s": "8.2", "e": "10", "a": "7.5" },
    "tdiSeptal": { "s": "6.1", "e": "8", "a": "6" },
    "valvasDoppler": {
        "mitralVelocidade": "480", "mitralGradiente": "92", "mitralDpDt": "1800",
        "tricuspideVelocidade": "210", "tricuspideGradiente": "18",
        "aorticaVelocidade": "110", "aorticaGradiente": "5",
        "pulmonarVelocidade": "95", "pulmonarGradiente": "4"
    },
    "outros": { "observacoes": "Sem alterações adicionais." },
    "achados": "Insuficiência mitral discreta, sem remodelamento.",
    "conclusoes": "Exame dentro da normalidade para a espécie.",
    "comentariosAdicionais": "Reavaliar em 12 meses."
}"#;

pub const BRANDING: &str = r#"{
    "clinic": { "nome_fantasia": "CardioPet" },
    "practitioner": {
        "nome": "Ana Souza", "crmv": "12345", "uf_crmv": "SP",
        "telefone": "(11) 99999-0000", "especialidade": "Cardiologia Veterinária",
        "sexo": "feminino"
    }
}"#;

pub fn scenario_exam() -> ExamRecord {
    ExamRecord::from_json(SCENARIO_EXAM).unwrap()
}

pub fn full_exam() -> ExamRecord {
    ExamRecord::from_json(FULL_EXAM).unwrap()
}

pub fn branding() -> BrandingAssets {
    BrandingAssets::from_json(BRANDING).unwrap()
}

/// A flat-colour PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 90, 160]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// A half-transparent PNG, for soft-mask embedding.
pub fn rgba_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 30, 30, 128]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 120, 120]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

pub fn data_url(bytes: &[u8], mime: &str) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Serves fixed bytes per location, after an optional delay.
#[derive(Default)]
pub struct MemoryLoader {
    files: HashMap<String, Vec<u8>>,
    reset: Vec<String>,
    delay: Option<Duration>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, location: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(location.to_string(), bytes);
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fetching `location` fails with a plain I/O error.
    pub fn reset(mut self, location: &str) -> Self {
        self.reset.push(location.to_string());
        self
    }
}

#[async_trait]
impl AssetLoader for MemoryLoader {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, Error> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.reset.iter().any(|l| l == location) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )));
        }
        self.files.get(location).cloned().ok_or_else(|| Error::AssetLoad {
            label: location.to_string(),
            reason: "not found".to_string(),
        })
    }
}

/// Fresh scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("vetcardio-{name}-{nanos}"));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn has_text(report: &Report, needle: &str) -> bool {
    report.pages().iter().any(|p| p.contains_text(needle))
}

/// Index of the first page with a text containing `needle`.
pub fn page_of(report: &Report, needle: &str) -> Option<usize> {
    page_of_pages(report.pages(), needle)
}

pub fn page_of_pages(pages: &[Page], needle: &str) -> Option<usize> {
    pages.iter().position(|p| p.contains_text(needle))
}

/// Every text operation in draw order, tagged with its page index.
pub fn texts_in_order(pages: &[Page]) -> Vec<(usize, &TextOp)> {
    pages
        .iter()
        .enumerate()
        .flat_map(|(i, page)| page.texts().map(move |t| (i, t)))
        .collect()
}

pub fn image_total(report: &Report) -> usize {
    report.pages().iter().map(Page::image_count).sum()
}

/// Number of `/Type /Page` dictionaries in a serialized PDF.
pub fn pdf_page_count(bytes: &[u8]) -> usize {
    let needle = b"/Type /Page";
    bytes
        .windows(needle.len() + 1)
        .filter(|w| w.starts_with(needle) && w[needle.len()] != b's')
        .count()
}

pub fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
