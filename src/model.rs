//! Exam record handed over by the data-entry layer.
//!
//! Field names follow Rust conventions; the serde names match the JSON the
//! exam forms persist. Every measurement is an optional decimal string, and
//! every clinical group can answer whether it carries anything at all.

use serde::{Deserialize, Deserializer, Serialize};

use crate::assets::ImageSource;
use crate::values::present;

fn any_present(fields: &[&Option<String>]) -> bool {
    fields.iter().any(|f| present(f).is_some())
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Patient {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "responsavel")]
    pub owner: Option<String>,
    #[serde(rename = "especie")]
    pub species: Option<String>,
    #[serde(rename = "raca")]
    pub breed: Option<String>,
    #[serde(rename = "sexo")]
    pub sex: Option<String>,
    #[serde(rename = "idade")]
    pub age: Option<String>,
    #[serde(rename = "peso")]
    pub weight: Option<String>,
}

impl Patient {
    pub fn is_absent(&self) -> bool {
        !any_present(&[
            &self.name,
            &self.owner,
            &self.species,
            &self.breed,
            &self.sex,
            &self.age,
            &self.weight,
        ])
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum MeasurementMode {
    #[default]
    M,
    B,
}

impl MeasurementMode {
    pub fn label(self) -> &'static str {
        match self {
            MeasurementMode::M => "MODO M",
            MeasurementMode::B => "MODO B",
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ExamInfo {
    #[serde(rename = "data")]
    pub date: Option<String>,
    #[serde(rename = "solicitante")]
    pub requester: Option<String>,
    #[serde(rename = "clinica")]
    pub clinic: Option<String>,
    #[serde(rename = "ritmo")]
    pub rhythm: Option<String>,
    #[serde(rename = "frequenciaCardiaca")]
    pub heart_rate: Option<String>,
    #[serde(rename = "modoMedicao")]
    pub mode: MeasurementMode,
}

/// Linear left-ventricle measurements in centimetres.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LeftVentricle {
    #[serde(rename = "septoIVd")]
    pub septum_diastole: Option<String>,
    #[serde(rename = "septoIVs")]
    pub septum_systole: Option<String>,
    #[serde(rename = "paredeLVd")]
    pub wall_diastole: Option<String>,
    #[serde(rename = "paredeLVs")]
    pub wall_systole: Option<String>,
    #[serde(rename = "dvedDiastole")]
    pub diameter_diastole: Option<String>,
    #[serde(rename = "dvedSistole")]
    pub diameter_systole: Option<String>,
    #[serde(rename = "aorta")]
    pub aortic_root: Option<String>,
    #[serde(rename = "atrioEsquerdo")]
    pub left_atrium: Option<String>,
    /// Manually entered FS%, overrides the computed value when present.
    #[serde(rename = "fracaoEncurtamento")]
    pub shortening_fraction: Option<String>,
    /// Manually entered Teicholz FE%, overrides the computed value when present.
    #[serde(rename = "fracaoEjecaoTeicholz")]
    pub ejection_fraction: Option<String>,
}

impl LeftVentricle {
    pub fn is_absent(&self) -> bool {
        !any_present(&[
            &self.septum_diastole,
            &self.septum_systole,
            &self.wall_diastole,
            &self.wall_systole,
            &self.diameter_diastole,
            &self.diameter_systole,
            &self.aortic_root,
            &self.left_atrium,
            &self.shortening_fraction,
            &self.ejection_fraction,
        ])
    }
}

/// Keys shared by reference ranges and classifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Parameter {
    SeptumDiastole,
    DiameterDiastole,
    WallDiastole,
    DiameterSystole,
    SeptumSystole,
    WallSystole,
    NormalizedDiameter,
    ShorteningFraction,
    EjectionFractionTeicholz,
    EjectionFractionSimpson,
    AtriumAortaRatio,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ReferenceRanges {
    #[serde(rename = "septoIVd")]
    pub septum_diastole: Option<String>,
    #[serde(rename = "dvedDiastole")]
    pub diameter_diastole: Option<String>,
    #[serde(rename = "paredeLVd")]
    pub wall_diastole: Option<String>,
    #[serde(rename = "dvedSistole")]
    pub diameter_systole: Option<String>,
    #[serde(rename = "septoIVs")]
    pub septum_systole: Option<String>,
    #[serde(rename = "paredeLVs")]
    pub wall_systole: Option<String>,
    #[serde(rename = "dvedNormalizado")]
    pub normalized_diameter: Option<String>,
    #[serde(rename = "fracaoEncurtamento")]
    pub shortening_fraction: Option<String>,
    #[serde(rename = "fracaoEjecaoTeicholz")]
    pub ejection_fraction_teicholz: Option<String>,
    #[serde(rename = "fracaoEjecaoSimpson")]
    pub ejection_fraction_simpson: Option<String>,
}

impl ReferenceRanges {
    pub fn get(&self, parameter: Parameter) -> Option<&str> {
        let field = match parameter {
            Parameter::SeptumDiastole => &self.septum_diastole,
            Parameter::DiameterDiastole => &self.diameter_diastole,
            Parameter::WallDiastole => &self.wall_diastole,
            Parameter::DiameterSystole => &self.diameter_systole,
            Parameter::SeptumSystole => &self.septum_systole,
            Parameter::WallSystole => &self.wall_systole,
            Parameter::NormalizedDiameter => &self.normalized_diameter,
            Parameter::ShorteningFraction => &self.shortening_fraction,
            Parameter::EjectionFractionTeicholz => &self.ejection_fraction_teicholz,
            Parameter::EjectionFractionSimpson => &self.ejection_fraction_simpson,
            Parameter::AtriumAortaRatio => return None,
        };
        field.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Classification {
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "diminuido")]
    Diminished,
    #[serde(rename = "aumentado")]
    Increased,
}

impl Classification {
    pub fn label(self) -> &'static str {
        match self {
            Classification::Normal => "Normal",
            Classification::Diminished => "Diminuído",
            Classification::Increased => "Aumentado",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "normal" => Some(Classification::Normal),
            "diminuido" | "diminuído" => Some(Classification::Diminished),
            "aumentado" => Some(Classification::Increased),
            _ => None,
        }
    }
}

/// Unknown, empty and "none" tags all mean unset.
fn classification_tag<'de, D>(deserializer: D) -> Result<Option<Classification>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Classification::from_tag))
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Classifications {
    #[serde(rename = "septoIVd", deserialize_with = "classification_tag")]
    pub septum_diastole: Option<Classification>,
    #[serde(rename = "dvedDiastole", deserialize_with = "classification_tag")]
    pub diameter_diastole: Option<Classification>,
    #[serde(rename = "paredeLVd", deserialize_with = "classification_tag")]
    pub wall_diastole: Option<Classification>,
    #[serde(rename = "dvedSistole", deserialize_with = "classification_tag")]
    pub diameter_systole: Option<Classification>,
    #[serde(rename = "septoIVs", deserialize_with = "classification_tag")]
    pub septum_systole: Option<Classification>,
    #[serde(rename = "paredeLVs", deserialize_with = "classification_tag")]
    pub wall_systole: Option<Classification>,
    #[serde(rename = "dvedNormalizado", deserialize_with = "classification_tag")]
    pub normalized_diameter: Option<Classification>,
    #[serde(rename = "fracaoEncurtamento", deserialize_with = "classification_tag")]
    pub shortening_fraction: Option<Classification>,
    #[serde(rename = "fracaoEjecaoTeicholz", deserialize_with = "classification_tag")]
    pub ejection_fraction_teicholz: Option<Classification>,
    #[serde(rename = "fracaoEjecaoSimpson", deserialize_with = "classification_tag")]
    pub ejection_fraction_simpson: Option<Classification>,
    #[serde(rename = "relacaoAEAo", deserialize_with = "classification_tag")]
    pub atrium_aorta_ratio: Option<Classification>,
}

impl Classifications {
    pub fn get(&self, parameter: Parameter) -> Option<Classification> {
        match parameter {
            Parameter::SeptumDiastole => self.septum_diastole,
            Parameter::DiameterDiastole => self.diameter_diastole,
            Parameter::WallDiastole => self.wall_diastole,
            Parameter::DiameterSystole => self.diameter_systole,
            Parameter::SeptumSystole => self.septum_systole,
            Parameter::WallSystole => self.wall_systole,
            Parameter::NormalizedDiameter => self.normalized_diameter,
            Parameter::ShorteningFraction => self.shortening_fraction,
            Parameter::EjectionFractionTeicholz => self.ejection_fraction_teicholz,
            Parameter::EjectionFractionSimpson => self.ejection_fraction_simpson,
            Parameter::AtriumAortaRatio => self.atrium_aorta_ratio,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DiastolicFunction {
    #[serde(rename = "ondaE")]
    pub e_wave: Option<String>,
    #[serde(rename = "ondaA")]
    pub a_wave: Option<String>,
    #[serde(rename = "tempoDesaceleracao")]
    pub deceleration_time: Option<String>,
    #[serde(rename = "triv")]
    pub ivrt: Option<String>,
    #[serde(rename = "padraoDiastolico")]
    pub pattern: Option<String>,
    #[serde(rename = "conclusaoDiastolica")]
    pub conclusion: Option<String>,
}

impl DiastolicFunction {
    pub fn is_absent(&self) -> bool {
        !any_present(&[
            &self.e_wave,
            &self.a_wave,
            &self.deceleration_time,
            &self.ivrt,
            &self.pattern,
            &self.conclusion,
        ])
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SystolicFunction {
    pub simpson: Option<String>,
    pub mapse: Option<String>,
    pub epss: Option<String>,
    #[serde(rename = "statusFuncao")]
    pub status: Option<String>,
    #[serde(rename = "tipoDisfuncao")]
    pub dysfunction_type: Option<String>,
}

impl SystolicFunction {
    pub fn is_absent(&self) -> bool {
        !any_present(&[
            &self.simpson,
            &self.mapse,
            &self.epss,
            &self.status,
            &self.dysfunction_type,
        ])
    }
}

/// Tissue Doppler velocities for one wall (cm/s).
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TissueDoppler {
    #[serde(rename = "s")]
    pub s_prime: Option<String>,
    #[serde(rename = "e")]
    pub e_prime: Option<String>,
    #[serde(rename = "a")]
    pub a_prime: Option<String>,
}

impl TissueDoppler {
    pub fn is_absent(&self) -> bool {
        !any_present(&[&self.s_prime, &self.e_prime, &self.a_prime])
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ValveDoppler {
    #[serde(rename = "mitralVelocidade")]
    pub mitral_velocity: Option<String>,
    #[serde(rename = "mitralGradiente")]
    pub mitral_gradient: Option<String>,
    #[serde(rename = "mitralDpDt")]
    pub mitral_dp_dt: Option<String>,
    #[serde(rename = "tricuspideVelocidade")]
    pub tricuspid_velocity: Option<String>,
    #[serde(rename = "tricuspideGradiente")]
    pub tricuspid_gradient: Option<String>,
    #[serde(rename = "pulmonarVelocidade")]
    pub pulmonary_velocity: Option<String>,
    #[serde(rename = "pulmonarGradiente")]
    pub pulmonary_gradient: Option<String>,
    #[serde(rename = "aorticaVelocidade")]
    pub aortic_velocity: Option<String>,
    #[serde(rename = "aorticaGradiente")]
    pub aortic_gradient: Option<String>,
}

impl ValveDoppler {
    pub fn is_absent(&self) -> bool {
        !any_present(&[
            &self.mitral_velocity,
            &self.mitral_gradient,
            &self.mitral_dp_dt,
            &self.tricuspid_velocity,
            &self.tricuspid_gradient,
            &self.pulmonary_velocity,
            &self.pulmonary_gradient,
            &self.aortic_velocity,
            &self.aortic_gradient,
        ])
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RightVentricle {
    /// Qualitative tag ("Normal", "Aumentado", ...); "none" means unset.
    #[serde(rename = "atrioDireito")]
    pub atrium_size: Option<String>,
    #[serde(rename = "ventriculoDireito")]
    pub ventricle_size: Option<String>,
    pub tapse: Option<String>,
    pub fac: Option<String>,
    #[serde(rename = "tdiS")]
    pub tdi_s_prime: Option<String>,
}

impl RightVentricle {
    pub fn atrium_tag(&self) -> Option<&str> {
        qualitative(&self.atrium_size)
    }

    pub fn ventricle_tag(&self) -> Option<&str> {
        qualitative(&self.ventricle_size)
    }

    pub fn is_absent(&self) -> bool {
        self.atrium_tag().is_none()
            && self.ventricle_tag().is_none()
            && !any_present(&[&self.tapse, &self.fac, &self.tdi_s_prime])
    }
}

fn qualitative(tag: &Option<String>) -> Option<&str> {
    present(tag).filter(|t| !t.eq_ignore_ascii_case("none"))
}

pub const DEFAULT_SEPTA: &str = "interventricular e interatrial íntegros";
pub const DEFAULT_PERICARDIUM: &str = "normal, sem derrame";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OtherFindings {
    #[serde(rename = "septos")]
    pub septa: Option<String>,
    #[serde(rename = "pericardio")]
    pub pericardium: Option<String>,
    #[serde(rename = "observacoes")]
    pub observations: Option<String>,
}

impl OtherFindings {
    pub fn septa_text(&self) -> &str {
        present(&self.septa).unwrap_or(DEFAULT_SEPTA)
    }

    pub fn pericardium_text(&self) -> &str {
        present(&self.pericardium).unwrap_or(DEFAULT_PERICARDIUM)
    }
}

/// Free-text observations appended to individual sections.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SectionNotes {
    #[serde(rename = "atrioEsquerdoAorta")]
    pub atrium_aorta: Option<String>,
    #[serde(rename = "funcaoSistolica")]
    pub systolic: Option<String>,
    #[serde(rename = "ventriculoDireito")]
    pub right_ventricle: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ValveNotes {
    pub mitral: Option<String>,
    #[serde(rename = "tricuspide")]
    pub tricuspid: Option<String>,
    #[serde(rename = "pulmonar")]
    pub pulmonary: Option<String>,
    #[serde(rename = "aortica")]
    pub aortic: Option<String>,
}

/// One stored exam image. `storage_url` wins over `data_url` when both exist.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageAttachment {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    #[serde(rename = "dataUrl")]
    pub data_url: Option<String>,
    #[serde(rename = "storageUrl")]
    pub storage_url: Option<String>,
}

impl ImageAttachment {
    pub fn source(&self) -> Option<ImageSource> {
        let url = present(&self.storage_url)
            .filter(|u| !u.starts_with("blob:"))
            .or_else(|| present(&self.data_url))?;
        Some(ImageSource::from(url.to_string()))
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ExamRecord {
    #[serde(rename = "patientData")]
    pub patient: Patient,
    #[serde(rename = "examInfo")]
    pub info: ExamInfo,
    #[serde(rename = "measurementsData")]
    pub left_ventricle: LeftVentricle,
    #[serde(rename = "classificationsData")]
    pub classifications: Classifications,
    #[serde(rename = "referencesData")]
    pub references: ReferenceRanges,
    #[serde(rename = "funcaoDiastolica")]
    pub diastolic: DiastolicFunction,
    #[serde(rename = "funcaoSistolica")]
    pub systolic: SystolicFunction,
    #[serde(rename = "ventriculoDireito")]
    pub right_ventricle: RightVentricle,
    #[serde(rename = "tdiLivre")]
    pub tdi_free_wall: TissueDoppler,
    #[serde(rename = "tdiSeptal")]
    pub tdi_septal: TissueDoppler,
    #[serde(rename = "valvasDoppler")]
    pub valves: ValveDoppler,
    #[serde(rename = "outros")]
    pub other: OtherFindings,
    #[serde(rename = "observacoesSecoes")]
    pub section_notes: SectionNotes,
    #[serde(rename = "observacoesValvas")]
    pub valve_notes: ValveNotes,
    #[serde(rename = "achados")]
    pub findings: Option<String>,
    #[serde(rename = "conclusoes")]
    pub impression: Option<String>,
    #[serde(rename = "comentariosAdicionais")]
    pub addendum: Option<String>,
    #[serde(rename = "storedImages")]
    pub images: Vec<ImageAttachment>,
    #[serde(rename = "selectedImages")]
    pub selected_images: Vec<usize>,
}

impl ExamRecord {
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// True when there is nothing to report: no patient identity and no
    /// clinical data of any kind.
    pub fn is_blank(&self) -> bool {
        self.patient.is_absent()
            && self.left_ventricle.is_absent()
            && self.diastolic.is_absent()
            && self.systolic.is_absent()
            && self.right_ventricle.is_absent()
            && self.tdi_free_wall.is_absent()
            && self.tdi_septal.is_absent()
            && self.valves.is_absent()
            && present(&self.findings).is_none()
            && present(&self.impression).is_none()
    }

    /// Sources for every stored image, in storage order. Attachments without
    /// a usable URL map to `None` so indices stay aligned with `selected_images`.
    pub fn image_sources(&self) -> Vec<Option<ImageSource>> {
        self.images.iter().map(ImageAttachment::source).collect()
    }

    /// Indices of the images that go into the appendix. An empty selection
    /// means every stored image.
    pub fn appendix_indices(&self, available: usize) -> Vec<usize> {
        if self.selected_images.is_empty() {
            return (0..available).collect();
        }
        let mut indices: Vec<usize> = self
            .selected_images
            .iter()
            .copied()
            .filter(|&i| i < available)
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

/// Clinic identity shown in the page header.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Clinic {
    #[serde(rename = "nome_fantasia")]
    pub trade_name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Practitioner {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "crmv")]
    pub license: Option<String>,
    #[serde(rename = "uf_crmv")]
    pub license_state: Option<String>,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    #[serde(rename = "especialidade")]
    pub specialty: Option<String>,
    #[serde(rename = "sexo")]
    pub sex: Option<String>,
}

impl Practitioner {
    pub fn is_female(&self) -> bool {
        present(&self.sex).is_some_and(|s| s.eq_ignore_ascii_case("feminino"))
    }
}

/// Optional clinic logo, practitioner signature and the text fields that
/// accompany them.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct BrandingAssets {
    pub clinic: Clinic,
    pub practitioner: Practitioner,
    #[serde(rename = "logo_url")]
    pub logo: Option<ImageSource>,
    #[serde(rename = "signature_url")]
    pub signature: Option<ImageSource>,
}

impl BrandingAssets {
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(json)?)
    }
}
