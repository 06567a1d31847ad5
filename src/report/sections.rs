//! Clinical section renderers.
//!
//! Each [`Section`] decides on its own whether it appears, based only on the
//! presence filter, and draws through the [`Paginator`] so every row and
//! paragraph line goes through `reserve` before it is placed.

use crate::config::ReportConfig;
use crate::fonts::{FontStyle, text_width_mm};
use crate::metrics::{DerivedValues, Metric, parse_decimal};
use crate::model::{ExamRecord, Parameter, TissueDoppler};
use crate::pdf::{ColumnLayout, Rgb, TextAlign, TextOp, justify_spacing, wrap_text};
use crate::report::paginate::Paginator;
use crate::values::{fixed, format_date, format_decimal, present, with_unit};

pub const BODY_SIZE: f32 = 9.0;
const SMALL_SIZE: f32 = 8.0;
const TITLE_SIZE: f32 = 14.0;
const COLUMN_GAP: f32 = 2.0;
const SECTION_GAP: f32 = 3.0;
const VALVE_TITLE_ADVANCE: f32 = 5.0;
const VALVE_NOTE_GAP: f32 = 2.0;
const HEMODYNAMIC_TITLE_GAP: f32 = 2.0;
const HEMODYNAMIC_MIN_FOLLOWING: f32 = 30.0;
const VALUE_SEPARATOR: &str = "   |   ";

pub const REPORT_TITLE: &str = "RELATÓRIO DE ESTUDO ECOCARDIOGRÁFICO";
pub const NORMALIZED_LABEL: &str = "VE em diástole NORMALIZADO (DVEdN)";

/// Cornell reference ranges used when the exam carries none.
fn cornell_reference(parameter: Parameter) -> Option<&'static str> {
    match parameter {
        Parameter::SeptumDiastole => Some("0.35 - 0.94"),
        Parameter::DiameterDiastole => Some("1.0 - 4.6"),
        Parameter::WallDiastole => Some("0.41 - 0.83"),
        Parameter::DiameterSystole => Some("0.61 - 3.04"),
        Parameter::SeptumSystole => Some("0.48 - 1.32"),
        Parameter::WallSystole => Some("0.67 - 1.29"),
        Parameter::NormalizedDiameter => Some("< 1.70"),
        _ => None,
    }
}

/// Fixed clinical emission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    ObservedParameters,
    LeftVentricle,
    Systolic,
    AtriumAorta,
    Diastolic,
    Hemodynamic,
    RightVentricle,
    Other,
    Findings,
    Impression,
}

impl Section {
    pub const ORDER: [Section; 10] = [
        Section::ObservedParameters,
        Section::LeftVentricle,
        Section::Systolic,
        Section::AtriumAorta,
        Section::Diastolic,
        Section::Hemodynamic,
        Section::RightVentricle,
        Section::Other,
        Section::Findings,
        Section::Impression,
    ];
}

struct LvRow {
    label: &'static str,
    value: String,
    parameter: Parameter,
}

struct ValveBlock<'a> {
    title: &'static str,
    rows: Vec<(&'static str, String)>,
    note: Option<&'a str>,
}

impl ValveBlock<'_> {
    /// Title, rows and trailing gap, plus the first note line so the title
    /// never ends a page on its own.
    fn height(&self, row_height: f32) -> f32 {
        let note = if self.note.is_some() { row_height } else { 0.0 };
        VALVE_TITLE_ADVANCE + self.rows.len() as f32 * row_height + SECTION_GAP + note
    }
}

/// Everything a section renderer reads.
pub struct SectionContext<'a> {
    pub exam: &'a ExamRecord,
    pub derived: &'a DerivedValues,
    pub config: &'a ReportConfig,
}

impl<'a> SectionContext<'a> {
    pub fn new(exam: &'a ExamRecord, derived: &'a DerivedValues, config: &'a ReportConfig) -> Self {
        Self {
            exam,
            derived,
            config,
        }
    }

    fn num(&self, value: &str) -> String {
        format_decimal(value, self.config.decimal_separator)
    }

    fn unit(&self, value: &str, unit: &str) -> String {
        with_unit(value, unit, self.config.decimal_separator)
    }

    fn measured(&self, field: &Option<String>, unit: &str) -> Option<String> {
        present(field).map(|v| self.unit(v, unit))
    }

    fn metric(&self, metric: &Metric) -> Option<String> {
        metric.value().map(|v| self.num(v))
    }

    fn margin(&self) -> f32 {
        self.config.page.margin
    }

    fn content_width(&self) -> f32 {
        self.config.page.content_width()
    }

    fn body(&self, x: f32, y: f32, text: impl Into<String>) -> TextOp {
        TextOp::new(x, y, text, FontStyle::Regular, BODY_SIZE).color(Rgb::BODY)
    }

    /// Reference and classification columns are only meaningful with a
    /// positive body weight.
    pub fn shows_references(&self) -> bool {
        self.config.show_references
            && parse_decimal(present(&self.exam.patient.weight)).is_some_and(|w| w > 0.0)
    }

    pub fn includes(&self, section: Section) -> bool {
        let exam = self.exam;
        let notes = &exam.section_notes;
        match section {
            Section::ObservedParameters => {
                present(&exam.info.rhythm).is_some() || present(&exam.info.heart_rate).is_some()
            }
            Section::LeftVentricle => !self.left_ventricle_rows().is_empty(),
            Section::Systolic => {
                !exam.systolic.is_absent() || present(&notes.systolic).is_some()
            }
            Section::AtriumAorta => {
                present(&exam.left_ventricle.aortic_root).is_some()
                    || present(&exam.left_ventricle.left_atrium).is_some()
                    || present(&notes.atrium_aorta).is_some()
            }
            Section::Diastolic => {
                !exam.diastolic.is_absent()
                    || !exam.tdi_free_wall.is_absent()
                    || !exam.tdi_septal.is_absent()
            }
            Section::Hemodynamic => !self.valve_blocks().is_empty(),
            Section::RightVentricle => {
                !exam.right_ventricle.is_absent() || present(&notes.right_ventricle).is_some()
            }
            Section::Other => true,
            Section::Findings => present(&exam.findings).is_some(),
            Section::Impression => {
                present(&exam.impression).is_some() || present(&exam.addendum).is_some()
            }
        }
    }

    /// Draw `section` if it has anything to show.
    pub fn render(&self, section: Section, p: &mut Paginator<'_>) {
        if !self.includes(section) {
            log::debug!("Section {section:?} omitted: no present values");
            return;
        }
        match section {
            Section::ObservedParameters => self.observed_parameters(p),
            Section::LeftVentricle => self.left_ventricle(p),
            Section::Systolic => self.systolic(p),
            Section::AtriumAorta => self.atrium_aorta(p),
            Section::Diastolic => self.diastolic(p),
            Section::Hemodynamic => self.hemodynamic(p),
            Section::RightVentricle => self.right_ventricle(p),
            Section::Other => self.other(p),
            Section::Findings => self.findings(p),
            Section::Impression => self.impression(p),
        }
    }

    pub fn title(&self, p: &mut Paginator<'_>) {
        let x = self.config.page.width / 2.0;
        let y = p.cursor();
        p.text(
            TextOp::new(x, y, REPORT_TITLE, FontStyle::Bold, TITLE_SIZE)
                .color(Rgb::NAVY)
                .align(TextAlign::Center),
        );
        p.advance(12.0);
    }

    /// Compact two-column patient and exam identification.
    pub fn identification(&self, p: &mut Paginator<'_>) {
        let patient = &self.exam.patient;
        let info = &self.exam.info;
        let or_dash = |field: &Option<String>| present(field).unwrap_or("-").to_string();
        let weight = self.measured(&patient.weight, "kg").unwrap_or_else(|| "-".to_string());
        let date = present(&info.date).map(format_date).unwrap_or_else(|| "-".to_string());

        let rows = [
            ("Paciente:", or_dash(&patient.name), "Espécie:", or_dash(&patient.species)),
            ("Raça:", or_dash(&patient.breed), "Sexo:", or_dash(&patient.sex)),
            ("Idade:", or_dash(&patient.age), "Peso:", weight),
            ("Tutor(a):", or_dash(&patient.owner), "Data:", date),
            (
                "Solicitante:",
                or_dash(&info.requester),
                "Clínica/Hospital:",
                or_dash(&info.clinic),
            ),
        ];
        let cols = ColumnLayout::even(self.margin(), self.content_width(), 2);
        for (label1, value1, label2, value2) in rows {
            p.reserve(4.5);
            let y = p.cursor();
            for (col, label, value) in [(0, label1, value1), (1, label2, value2)] {
                let x = cols.x(col);
                p.text(TextOp::new(x, y, label, FontStyle::Bold, BODY_SIZE).color(Rgb::BODY));
                let value_x = x + text_width_mm(label, FontStyle::Bold, BODY_SIZE) + 2.0;
                p.text(self.body(value_x, y, value));
            }
            p.advance(4.5);
        }
        p.advance(6.0);
    }

    fn observed_parameters(&self, p: &mut Paginator<'_>) {
        let info = &self.exam.info;
        p.section_header("PARÂMETROS OBSERVADOS", self.config.section_min_content);
        let mut rows = Vec::new();
        if let Some(rhythm) = present(&info.rhythm) {
            rows.push(("Ritmo", rhythm.to_string()));
        }
        if let Some(hr) = self.measured(&info.heart_rate, "bpm") {
            rows.push(("Frequência Cardíaca", hr));
        }
        self.rows(p, &rows);
        p.advance(5.0);
    }

    fn left_ventricle_rows(&self) -> Vec<LvRow> {
        let lv = &self.exam.left_ventricle;
        let derived = self.derived;
        let measured = [
            ("Septo interventricular em diástole (SIVd)", &lv.septum_diastole, Parameter::SeptumDiastole),
            ("Ventrículo esquerdo em diástole (VEd)", &lv.diameter_diastole, Parameter::DiameterDiastole),
            ("Parede livre do VE em diástole (PLVEd)", &lv.wall_diastole, Parameter::WallDiastole),
            ("Ventrículo esquerdo em sístole (VEs)", &lv.diameter_systole, Parameter::DiameterSystole),
            ("Septo interventricular em sístole (SIVs)", &lv.septum_systole, Parameter::SeptumSystole),
            ("Parede livre do VE em sístole (PLVEs)", &lv.wall_systole, Parameter::WallSystole),
        ];
        let mut rows: Vec<LvRow> = measured
            .into_iter()
            .filter_map(|(label, field, parameter)| {
                Some(LvRow {
                    label,
                    value: self.measured(field, "cm")?,
                    parameter,
                })
            })
            .collect();

        let percent = |metric: &Metric| metric.value().map(|v| self.unit(v, "%"));
        let functional = [
            ("Fração de Encurtamento (FS)", percent(&derived.shortening_fraction), Parameter::ShorteningFraction),
            ("Fração de Ejeção (FE Teicholz)", percent(&derived.ejection_fraction), Parameter::EjectionFractionTeicholz),
            ("Fração de Ejeção (FE Simpson)", self.measured(&self.exam.systolic.simpson, "%"), Parameter::EjectionFractionSimpson),
        ];
        rows.extend(
            functional
                .into_iter()
                .filter_map(|(label, value, parameter)| Some(LvRow { label, value: value?, parameter })),
        );
        rows
    }

    fn reference_text(&self, parameter: Parameter) -> Option<String> {
        if parameter == Parameter::NormalizedDiameter {
            return cornell_reference(parameter).map(|r| self.num(r));
        }
        self.exam
            .references
            .get(parameter)
            .or_else(|| cornell_reference(parameter))
            .map(|r| self.num(r))
    }

    fn left_ventricle(&self, p: &mut Paginator<'_>) {
        let title = format!("VENTRÍCULO ESQUERDO ({})", self.exam.info.mode.label());
        p.section_header(&title, self.config.section_min_content);

        let cols = ColumnLayout::weighted(self.margin(), self.content_width(), &[68.0, 32.0, 42.0, 36.0]);
        let with_refs = self.shows_references();
        let headings: &[&str] = if with_refs {
            &["Parâmetro", "Valor", "Referência", "Status"]
        } else {
            &["Parâmetro", "Valor"]
        };
        let y = p.cursor();
        for (i, heading) in headings.iter().enumerate() {
            p.text(
                TextOp::new(cols.x(i), y, *heading, FontStyle::Bold, SMALL_SIZE).color(Rgb::COLUMN_HEADING),
            );
        }
        p.advance(6.0);

        for row in self.left_ventricle_rows() {
            p.reserve(self.config.row_height);
            let y = p.cursor();
            p.text(self.body(cols.x(0), y, row.label));
            p.text(self.body(cols.x(1), y, row.value));
            if with_refs {
                if let Some(reference) = self.reference_text(row.parameter) {
                    p.text(
                        TextOp::new(cols.x(2), y, reference, FontStyle::Regular, SMALL_SIZE).color(Rgb::BODY),
                    );
                }
                if let Some(class) = self.exam.classifications.get(row.parameter) {
                    p.text(self.body(cols.x(3), y, class.label()));
                }
            }
            p.advance(self.config.row_height);
        }
        self.normalized_diameter(p, with_refs);
        p.advance(SECTION_GAP);
    }

    /// DVEdN line beneath the table, with its fixed reference when the
    /// reference columns are shown.
    fn normalized_diameter(&self, p: &mut Paginator<'_>, with_refs: bool) {
        let Some(value) = self.metric(&self.derived.normalized_diameter) else {
            return;
        };
        let mut line = format!("{NORMALIZED_LABEL}: {value}");
        if with_refs {
            if let Some(reference) = self.reference_text(Parameter::NormalizedDiameter) {
                line.push_str(&format!(" (ref. {reference})"));
            }
            if let Some(class) = self.exam.classifications.get(Parameter::NormalizedDiameter) {
                line.push_str(&format!(" - {}", class.label()));
            }
        }
        p.advance(1.0);
        p.reserve(self.config.row_height);
        let y = p.cursor();
        p.text(TextOp::new(self.margin(), y, line, FontStyle::Italic, BODY_SIZE).color(Rgb::BODY));
        p.advance(self.config.row_height);
    }

    fn systolic(&self, p: &mut Paginator<'_>) {
        let systolic = &self.exam.systolic;
        p.section_header("AVALIAÇÃO DA FUNÇÃO SISTÓLICA", self.config.section_min_content);

        let fractions: Vec<String> = [
            ("FS", self.derived.shortening_fraction.value().map(str::to_string)),
            ("FE (Teicholz)", self.derived.ejection_fraction.value().map(str::to_string)),
            ("FE (Simpson)", present(&systolic.simpson).map(str::to_string)),
        ]
        .into_iter()
        .filter_map(|(label, v)| Some(format!("{label}: {}", self.unit(&v?, "%"))))
        .collect();
        self.joined_line(p, &fractions);

        let motion: Vec<String> = [("MAPSE", &systolic.mapse), ("EPSS", &systolic.epss)]
            .into_iter()
            .filter_map(|(label, field)| Some(format!("{label}: {}", self.measured(field, "cm")?)))
            .collect();
        self.joined_line(p, &motion);

        let kind = present(&systolic.dysfunction_type);
        let assessment = match present(&systolic.status) {
            Some("normal") => Some("Função sistólica preservada".to_string()),
            Some("disfuncao") => Some(match kind {
                Some(kind) => format!("Disfunção sistólica {kind}"),
                None => "Disfunção sistólica".to_string(),
            }),
            Some(other) => Some(other.to_string()),
            None => kind.map(|kind| format!("Disfunção sistólica {kind}")),
        };
        if let Some(text) = assessment {
            self.rows(p, &[("Avaliação", text)]);
        }

        self.note(p, &self.exam.section_notes.systolic);
        p.advance(SECTION_GAP);
    }

    fn atrium_aorta(&self, p: &mut Paginator<'_>) {
        let lv = &self.exam.left_ventricle;
        p.section_header("ÁTRIO ESQUERDO / AORTA (MODO B)", self.config.section_min_content);
        let mut rows = Vec::new();
        if let Some(v) = self.measured(&lv.aortic_root, "cm") {
            rows.push(("Aorta", v));
        }
        if let Some(v) = self.measured(&lv.left_atrium, "cm") {
            rows.push(("Átrio esquerdo", v));
        }
        if let Some(ratio) = self.metric(&self.derived.atrium_to_aorta) {
            let value = match self.exam.classifications.atrium_aorta_ratio {
                Some(class) => format!("{ratio} ({})", class.label()),
                None => ratio,
            };
            rows.push(("Relação Átrio esquerdo/Aorta", value));
        }
        self.rows(p, &rows);
        self.note(p, &self.exam.section_notes.atrium_aorta);
        p.advance(SECTION_GAP);
    }

    fn diastolic(&self, p: &mut Paginator<'_>) {
        let d = &self.exam.diastolic;
        let derived = self.derived;
        p.section_header("FUNÇÃO DIASTÓLICA DO VENTRÍCULO ESQUERDO", self.config.section_min_content);

        let rows: Vec<(&str, String)> = [
            ("Velocidade da onda E", self.measured(&d.e_wave, "cm/s")),
            ("Velocidade da onda A", self.measured(&d.a_wave, "cm/s")),
            ("Relação onda E/A", self.metric(&derived.e_to_a)),
            ("Tempo de desaceleração da onda E", self.measured(&d.deceleration_time, "ms")),
            ("Tempo de Relaxamento Isovolumétrico (TRIV)", self.measured(&d.ivrt, "ms")),
            ("E/TRIV", self.metric(&derived.e_to_ivrt)),
        ]
        .into_iter()
        .filter_map(|(label, value)| Some((label, value?)))
        .collect();
        self.rows(p, &rows);

        if let Some(pattern) = present(&d.pattern) {
            self.paragraph(p, &format!("Padrão diastólico: {pattern}"), FontStyle::Regular);
        }

        if !self.exam.tdi_free_wall.is_absent() || !self.exam.tdi_septal.is_absent() {
            self.tissue_doppler(p);
        }

        if let Some(conclusion) = present(&d.conclusion) {
            p.advance(SECTION_GAP);
            self.paragraph(p, conclusion, FontStyle::Regular);
        }
        p.advance(SECTION_GAP);
    }

    fn tdi_values(&self, wall: &TissueDoppler, ratio: &Metric) -> Option<String> {
        if wall.is_absent() {
            return None;
        }
        let sep = self.config.decimal_separator;
        let mut parts: Vec<String> = [("s'", &wall.s_prime), ("e'", &wall.e_prime), ("a'", &wall.a_prime)]
            .into_iter()
            .filter_map(|(label, field)| {
                let v = fixed(present(field)?, 1, sep)?;
                Some(format!("{label}: {v} cm/s"))
            })
            .collect();
        if let Some(r) = self.metric(ratio) {
            parts.push(format!("E/e': {r}"));
        }
        Some(parts.join(VALUE_SEPARATOR))
    }

    fn tissue_doppler(&self, p: &mut Paginator<'_>) {
        let derived = self.derived;
        let walls = [
            ("Parede Livre:", self.tdi_values(&self.exam.tdi_free_wall, &derived.e_to_e_prime_free)),
            ("Parede Septal:", self.tdi_values(&self.exam.tdi_septal, &derived.e_to_e_prime_septal)),
        ];

        // Subtitle stays with the first wall line.
        p.advance(SECTION_GAP);
        p.reserve(5.0 + 4.0 + self.config.row_height);
        let margin = self.margin();
        let y = p.cursor();
        p.text(TextOp::new(margin, y, "Doppler Tecidual (TDI)", FontStyle::Bold, BODY_SIZE).color(Rgb::NAVY));
        p.advance(5.0);

        for (label, values) in walls {
            let Some(values) = values else { continue };
            p.reserve(4.0 + self.config.row_height);
            let y = p.cursor();
            p.text(TextOp::new(margin, y, label, FontStyle::Italic, SMALL_SIZE).color(Rgb::BODY));
            p.advance(4.0);
            let y = p.cursor();
            p.text(self.body(margin + 2.0, y, values));
            p.advance(self.config.row_height);
        }

        if let Some(mean) = self.metric(&derived.mean_e_to_e_prime) {
            p.reserve(self.config.row_height);
            let y = p.cursor();
            p.text(
                TextOp::new(margin, y, format!("Média E/e': {mean}"), FontStyle::Bold, BODY_SIZE)
                    .color(Rgb::BODY),
            );
            p.advance(self.config.row_height);
        }
    }

    fn valve_blocks(&self) -> Vec<ValveBlock<'a>> {
        let exam: &'a ExamRecord = self.exam;
        let v = &exam.valves;
        let notes = &exam.valve_notes;
        let candidates = [
            (
                "VALVA MITRAL",
                vec![
                    ("Velocidade máxima do fluxo retrógrado da IM", self.measured(&v.mitral_velocity, "cm/s")),
                    ("Gradiente", self.measured(&v.mitral_gradient, "mmHg")),
                    ("+dP/dT", self.measured(&v.mitral_dp_dt, "mmHg/s")),
                ],
                &notes.mitral,
            ),
            (
                "VALVA TRICÚSPIDE",
                vec![
                    ("Velocidade máxima do fluxo retrógrado da IT", self.measured(&v.tricuspid_velocity, "cm/s")),
                    ("Gradiente", self.measured(&v.tricuspid_gradient, "mmHg")),
                ],
                &notes.tricuspid,
            ),
            (
                "VALVA AÓRTICA",
                vec![
                    ("Velocidade máxima do fluxo transvalvar", self.measured(&v.aortic_velocity, "cm/s")),
                    ("Gradiente", self.measured(&v.aortic_gradient, "mmHg")),
                ],
                &notes.aortic,
            ),
            (
                "VALVA PULMONAR",
                vec![
                    ("Velocidade máxima do fluxo transvalvar", self.measured(&v.pulmonary_velocity, "cm/s")),
                    ("Gradiente", self.measured(&v.pulmonary_gradient, "mmHg")),
                ],
                &notes.pulmonary,
            ),
        ];
        candidates
            .into_iter()
            .filter_map(|(title, rows, note)| {
                let rows: Vec<(&'static str, String)> = rows
                    .into_iter()
                    .filter_map(|(label, value)| Some((label, value?)))
                    .collect();
                let note = present(note);
                (!rows.is_empty() || note.is_some()).then_some(ValveBlock { title, rows, note })
            })
            .collect()
    }

    /// Look-ahead height for the whole hemodynamic section, capped.
    pub fn hemodynamic_estimate(&self) -> f32 {
        let blocks: f32 = self
            .valve_blocks()
            .iter()
            .map(|b| b.height(self.config.row_height))
            .sum();
        (self.config.section_header_height + HEMODYNAMIC_TITLE_GAP + blocks).min(self.config.hemodynamic_cap)
    }

    fn hemodynamic(&self, p: &mut Paginator<'_>) {
        p.reserve(self.hemodynamic_estimate());
        p.section_header("AVALIAÇÃO HEMODINÂMICA", HEMODYNAMIC_MIN_FOLLOWING);
        p.advance(HEMODYNAMIC_TITLE_GAP);

        let margin = self.margin();
        for block in self.valve_blocks() {
            p.reserve(block.height(self.config.row_height));
            let y = p.cursor();
            p.text(TextOp::new(margin, y, block.title, FontStyle::Bold, BODY_SIZE).color(Rgb::BODY));
            p.advance(VALVE_TITLE_ADVANCE);
            for (label, value) in &block.rows {
                let y = p.cursor();
                p.text(self.body(margin, y, format!("{label}: {value}")));
                p.advance(self.config.row_height);
            }
            p.advance(SECTION_GAP);
            if let Some(note) = block.note {
                self.paragraph(p, note, FontStyle::Regular);
                p.advance(VALVE_NOTE_GAP);
            }
        }
    }

    fn right_ventricle(&self, p: &mut Paginator<'_>) {
        let rv = &self.exam.right_ventricle;
        p.section_header("VENTRÍCULO DIREITO", self.config.section_min_content);
        let rows: Vec<(&str, String)> = [
            ("Átrio Direito", rv.atrium_tag().map(str::to_string)),
            ("Ventrículo Direito", rv.ventricle_tag().map(str::to_string)),
            ("TAPSE", self.measured(&rv.tapse, "cm")),
            ("FAC", self.measured(&rv.fac, "%")),
            ("TDI: s'", self.measured(&rv.tdi_s_prime, "cm/s")),
        ]
        .into_iter()
        .filter_map(|(label, value)| Some((label, value?)))
        .collect();
        self.rows(p, &rows);
        self.note(p, &self.exam.section_notes.right_ventricle);
        p.advance(SECTION_GAP);
    }

    fn other(&self, p: &mut Paginator<'_>) {
        let other = &self.exam.other;
        p.section_header("OUTROS", self.config.section_min_content);
        self.rows(
            p,
            &[
                ("Septos", other.septa_text().to_string()),
                ("Pericárdio", other.pericardium_text().to_string()),
            ],
        );
        self.note(p, &other.observations);
        p.advance(5.0);
    }

    fn findings(&self, p: &mut Paginator<'_>) {
        p.section_header("ACHADOS ECOCARDIOGRÁFICOS", self.config.section_min_content);
        if let Some(text) = present(&self.exam.findings) {
            self.paragraph(p, text, FontStyle::Regular);
        }
        p.advance(SECTION_GAP);
    }

    fn impression(&self, p: &mut Paginator<'_>) {
        p.section_header("IMPRESSÃO DIAGNÓSTICA", self.config.section_min_content);
        if let Some(text) = present(&self.exam.impression) {
            self.paragraph(p, text, FontStyle::Regular);
        }
        if let Some(addendum) = present(&self.exam.addendum) {
            p.advance(6.0);
            self.paragraph(p, addendum, FontStyle::Bold);
        }
    }

    /// `label: value` rows, two per line when both fit in half the width.
    fn rows(&self, p: &mut Paginator<'_>, rows: &[(&str, String)]) {
        let cols = ColumnLayout::even(self.margin(), self.content_width(), 2);
        let fits = |text: &str| {
            text_width_mm(text, FontStyle::Regular, BODY_SIZE) <= cols.width(0) - COLUMN_GAP
        };
        let mut i = 0;
        while i < rows.len() {
            let first = format!("{}: {}", rows[i].0, rows[i].1);
            let second = rows.get(i + 1).map(|(label, value)| format!("{label}: {value}"));
            p.reserve(self.config.row_height);
            let y = p.cursor();
            let paired = matches!(&second, Some(s) if fits(&first) && fits(s));
            p.text(self.body(cols.x(0), y, first));
            if paired && let Some(second) = second {
                p.text(self.body(cols.x(1), y, second));
                i += 2;
            } else {
                i += 1;
            }
            p.advance(self.config.row_height);
        }
    }

    /// Values joined on one line with a vertical-bar separator.
    fn joined_line(&self, p: &mut Paginator<'_>, parts: &[String]) {
        if parts.is_empty() {
            return;
        }
        p.reserve(self.config.row_height);
        let y = p.cursor();
        p.text(self.body(self.margin(), y, parts.join(VALUE_SEPARATOR)));
        p.advance(self.config.row_height);
    }

    fn note(&self, p: &mut Paginator<'_>, note: &Option<String>) {
        if let Some(text) = present(note) {
            p.advance(2.0);
            self.paragraph(p, text, FontStyle::Regular);
        }
    }

    /// Justified paragraph, one reservation per line.
    fn paragraph(&self, p: &mut Paginator<'_>, text: &str, style: FontStyle) {
        let width = self.content_width();
        let margin = self.margin();
        for line in wrap_text(text, style, BODY_SIZE, width) {
            p.reserve(self.config.row_height);
            if !line.text.is_empty() {
                let spacing = justify_spacing(&line, style, BODY_SIZE, width);
                let y = p.cursor();
                p.text(
                    TextOp::new(margin, y, line.text, style, BODY_SIZE)
                        .color(Rgb::BODY)
                        .word_spacing(spacing),
                );
            }
            p.advance(self.config.row_height);
        }
    }
}
