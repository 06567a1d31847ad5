mod common;

use std::time::Duration;

use vetcardio_report::pdf::TextAlign;
use vetcardio_report::report::header::{DEFAULT_PRACTITIONER, FALLBACK_CLINIC};
use vetcardio_report::report::images::APPENDIX_TITLE;
use vetcardio_report::report::sections::{NORMALIZED_LABEL, REPORT_TITLE};
use vetcardio_report::{
    BrandingAssets, DecodedImage, Error, ExamRecord, ImageSource, NoRemoteAssets, Report,
    ReportConfig, generate_report, write_report,
};

use common::{has_text, image_total, page_of};

const LV_ROWS: [&str; 9] = [
    "(SIVd)", "(VEd)", "(PLVEd)", "(VEs)", "(SIVs)", "(PLVEs)", "(FS)", "(FE Teicholz)",
    "(FE Simpson)",
];

async fn compose(exam: &ExamRecord, branding: &BrandingAssets) -> Report {
    common::init_logging();
    generate_report(exam, Vec::new(), branding, &NoRemoteAssets, &ReportConfig::default())
        .await
        .unwrap()
}

#[tokio::test]
async fn scenario_exam_produces_minimal_report() {
    let report = compose(&common::scenario_exam(), &BrandingAssets::default()).await;

    assert_eq!(report.page_count(), 1);
    assert!(has_text(&report, REPORT_TITLE));
    for text in ["Paciente:", "Rex", "Espécie:", "canino", "12,5 kg"] {
        assert!(has_text(&report, text), "identification is missing {text}");
    }

    assert!(has_text(&report, "VENTRÍCULO ESQUERDO (MODO M)"));
    let shown: Vec<&str> = LV_ROWS
        .iter()
        .copied()
        .filter(|row| has_text(&report, row))
        .collect();
    assert_eq!(shown, ["(VEd)", "(VEs)", "(FS)", "(FE Teicholz)"]);
    for value in ["4,0 cm", "2,6 cm", "35,0%", "64,8%"] {
        assert!(has_text(&report, value), "missing value {value}");
    }

    for absent in [
        "PARÂMETROS OBSERVADOS",
        "AVALIAÇÃO DA FUNÇÃO SISTÓLICA",
        "ÁTRIO ESQUERDO / AORTA",
        "FUNÇÃO DIASTÓLICA",
        "AVALIAÇÃO HEMODINÂMICA",
        "VENTRÍCULO DIREITO",
        "ACHADOS",
        "IMPRESSÃO",
        APPENDIX_TITLE,
    ] {
        assert!(!has_text(&report, absent), "unexpected section {absent}");
    }

    // Text-only signature, no rasters anywhere.
    let page = &report.pages()[0];
    let signature = page
        .texts()
        .find(|t| t.text == DEFAULT_PRACTITIONER && t.align == TextAlign::Center)
        .expect("signature name line");
    assert!(signature.y < report_content_limit());
    assert_eq!(image_total(&report), 0);
    assert!(page.contains_text(FALLBACK_CLINIC));
    assert!(page.contains_text("Página 1 de 1"));
    assert_eq!(report.file_name(), "laudo-rex-sem-data.pdf");
}

fn report_content_limit() -> f32 {
    ReportConfig::default().page.content_limit()
}

#[tokio::test]
async fn reference_columns_follow_weight_and_toggle() {
    let exam = common::scenario_exam();
    let with_weight = compose(&exam, &BrandingAssets::default()).await;
    assert!(has_text(&with_weight, "Referência"));
    assert!(has_text(&with_weight, "1,0 - 4,6"));
    let normalized = with_weight.pages()[0].find_text(NORMALIZED_LABEL).unwrap();
    assert!(normalized.text.contains("1,90"), "{}", normalized.text);
    assert!(normalized.text.contains("< 1,70"), "{}", normalized.text);

    let mut no_weight = exam.clone();
    no_weight.patient.weight = Some("0 kg".into());
    let report = compose(&no_weight, &BrandingAssets::default()).await;
    assert!(!has_text(&report, "Referência"));
    assert!(!has_text(&report, NORMALIZED_LABEL));

    let config = ReportConfig {
        show_references: false,
        ..ReportConfig::default()
    };
    let report = generate_report(&exam, Vec::new(), &BrandingAssets::default(), &NoRemoteAssets, &config)
        .await
        .unwrap();
    assert!(!has_text(&report, "Referência"));
    assert!(!has_text(&report, "1,0 - 4,6"));
}

#[tokio::test]
async fn blank_exam_is_a_terminal_error() {
    let blank = ExamRecord::default();
    let result = generate_report(
        &blank,
        Vec::new(),
        &BrandingAssets::default(),
        &NoRemoteAssets,
        &ReportConfig::default(),
    )
    .await;
    assert!(matches!(result, Err(Error::NoExamData)));

    let placeholders = ExamRecord::from_json(
        r#"{ "patientData": { "nome": "", "peso": "0" }, "measurementsData": { "aorta": "-" } }"#,
    )
    .unwrap();
    let result = generate_report(
        &placeholders,
        Vec::new(),
        &BrandingAssets::default(),
        &NoRemoteAssets,
        &ReportConfig::default(),
    )
    .await;
    assert!(matches!(result, Err(Error::NoExamData)));
}

#[tokio::test]
async fn full_exam_emits_sections_in_clinical_order() {
    let report = compose(&common::full_exam(), &common::branding()).await;
    let order = [
        REPORT_TITLE,
        "Paciente:",
        "PARÂMETROS OBSERVADOS",
        "VENTRÍCULO ESQUERDO (MODO M)",
        "AVALIAÇÃO DA FUNÇÃO SISTÓLICA",
        "ÁTRIO ESQUERDO / AORTA",
        "FUNÇÃO DIASTÓLICA DO VENTRÍCULO ESQUERDO",
        "Doppler Tecidual (TDI)",
        "AVALIAÇÃO HEMODINÂMICA",
        "VALVA MITRAL",
        "VALVA TRICÚSPIDE",
        "VALVA AÓRTICA",
        "VALVA PULMONAR",
        "VENTRÍCULO DIREITO",
        "OUTROS",
        "ACHADOS ECOCARDIOGRÁFICOS",
        "IMPRESSÃO DIAGNÓSTICA",
        "Reavaliar em 12 meses.",
        "Dra. Ana Souza",
    ];
    let ordered = common::texts_in_order(report.pages());
    let positions: Vec<usize> = order
        .iter()
        .map(|needle| {
            ordered
                .iter()
                .position(|(_, t)| t.text.contains(needle))
                .unwrap_or_else(|| panic!("{needle} missing"))
        })
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");

    assert!(has_text(&report, "CRMV SP 12345"));
    assert!(has_text(&report, "CRMV-SP  12345"));
    assert!(has_text(&report, "CardioPet"));
    assert!(has_text(&report, "Função sistólica preservada"));
    assert!(has_text(&report, "interventricular e interatrial íntegros"));
    assert_eq!(report.file_name(), "laudo-bolinha-2024-03-07.pdf");

    let total = report.page_count();
    for (i, page) in report.pages().iter().enumerate() {
        assert!(page.contains_text(&format!("Página {} de {total}", i + 1)));
        assert!(page.contains_text("Ecodopplercardiograma"));
    }
}

#[tokio::test]
async fn logo_and_signature_images_are_drawn() {
    let mut branding = common::branding();
    branding.logo = Some(ImageSource::from(common::data_url(&common::png_bytes(300, 100), "image/png")));
    branding.signature = Some(ImageSource::from(common::data_url(&common::png_bytes(400, 100), "image/png")));
    let report = compose(&common::scenario_exam(), &branding).await;

    assert_eq!(report.images().len(), 2);
    let page = &report.pages()[0];
    let (logo, logo_index) = page.images().next().unwrap();
    assert_eq!(logo_index, 0);
    assert_eq!(logo.height, 18.0);
    assert!((logo.width - 54.0).abs() < 1e-3);
    assert!(!page.contains_text("CardioPet"));

    let (signature, sig_index) = page.images().find(|(_, i)| *i == 1).unwrap();
    assert_eq!(sig_index, 1);
    assert!((signature.width - 40.0).abs() < 1e-3);
    assert!((signature.height - 10.0).abs() < 1e-3);
    let name = page.find_text("Dra. Ana Souza").unwrap();
    assert!(signature.bottom() < name.y);
}

#[tokio::test]
async fn broken_branding_assets_fall_back_to_text() {
    let mut branding = common::branding();
    branding.logo = Some(ImageSource::from("logos/missing.png".to_string()));
    branding.signature = Some(ImageSource::from("data:image/png;base64,AAAA".to_string()));
    let report = compose(&common::scenario_exam(), &branding).await;

    assert_eq!(image_total(&report), 0);
    assert!(report.images().is_empty());
    assert!(has_text(&report, "CardioPet"));
    assert!(has_text(&report, "Dra. Ana Souza"));
}

#[tokio::test]
async fn appendix_uses_supplied_images_and_skips_bad_ones() {
    let exam = common::scenario_exam();
    let png = common::png_bytes(1600, 1200);
    let decoded = DecodedImage::from_bytes(png.clone(), "eco").unwrap();
    let mut images: Vec<ImageSource> = (0..6).map(|_| ImageSource::from(decoded.clone())).collect();
    images.insert(2, ImageSource::from("data:image/png;base64,bm90IGFuIGltYWdl".to_string()));
    images.push(ImageSource::from(common::data_url(&common::jpeg_bytes(640, 480), "image/jpeg")));

    let report = generate_report(
        &exam,
        images,
        &BrandingAssets::default(),
        &NoRemoteAssets,
        &ReportConfig::default(),
    )
    .await
    .unwrap();

    // Seven good images: a full appendix page and a continuation page.
    assert_eq!(report.page_count(), 3);
    assert_eq!(report.pages()[1].image_count(), 6);
    assert_eq!(report.pages()[2].image_count(), 1);
    assert_eq!(page_of(&report, APPENDIX_TITLE), Some(1));
    assert!(report.pages()[2].contains_text("(continuação)"));
    assert!(report.pages()[2].contains_text("Página 3 de 3"));
}

#[tokio::test]
async fn stored_images_follow_selection() {
    let mut exam = common::scenario_exam();
    let url = common::data_url(&common::png_bytes(800, 600), "image/png");
    exam.images = (0..4)
        .map(|i| vetcardio_report::model::ImageAttachment {
            name: format!("eco{i}.png"),
            mime_type: Some("image/png".into()),
            data_url: Some(url.clone()),
            storage_url: None,
        })
        .collect();
    exam.selected_images = vec![3, 1, 9];

    let report = compose(&exam, &BrandingAssets::default()).await;
    assert_eq!(report.page_count(), 2);
    assert_eq!(report.pages()[1].image_count(), 2);
}

#[tokio::test]
async fn slow_remote_image_is_skipped_after_timeout() {
    let mut exam = common::scenario_exam();
    exam.images = vec![vetcardio_report::model::ImageAttachment {
        name: "eco.png".into(),
        storage_url: Some("remote/eco.png".into()),
        ..Default::default()
    }];
    let config = ReportConfig {
        asset_timeout_ms: 20,
        ..ReportConfig::default()
    };

    let slow = common::MemoryLoader::new()
        .with("remote/eco.png", common::png_bytes(200, 200))
        .slow(Duration::from_millis(500));
    let report = generate_report(&exam, Vec::new(), &BrandingAssets::default(), &slow, &config)
        .await
        .unwrap();
    assert_eq!(report.page_count(), 1);
    assert!(!has_text(&report, APPENDIX_TITLE));

    let fast = common::MemoryLoader::new().with("remote/eco.png", common::png_bytes(200, 200));
    let report = generate_report(&exam, Vec::new(), &BrandingAssets::default(), &fast, &config)
        .await
        .unwrap();
    assert_eq!(report.page_count(), 2);
    assert!(has_text(&report, APPENDIX_TITLE));
}

#[tokio::test]
async fn loader_io_failure_skips_only_that_image() {
    let mut exam = common::scenario_exam();
    exam.images = ["remote/a.png", "remote/b.png"]
        .into_iter()
        .map(|url| vetcardio_report::model::ImageAttachment {
            name: url.trim_start_matches("remote/").into(),
            storage_url: Some(url.into()),
            ..Default::default()
        })
        .collect();
    let mut branding = common::branding();
    branding.logo = Some(ImageSource::from("remote/logo.png".to_string()));

    let loader = common::MemoryLoader::new()
        .with("remote/b.png", common::png_bytes(200, 200))
        .reset("remote/a.png")
        .reset("remote/logo.png");
    let report = generate_report(&exam, Vec::new(), &branding, &loader, &ReportConfig::default())
        .await
        .unwrap();

    assert_eq!(report.page_count(), 2);
    assert_eq!(report.pages()[1].image_count(), 1);
    assert!(has_text(&report, "CardioPet"));
}

#[tokio::test]
async fn write_report_reads_inputs_and_resolves_relative_assets() {
    let dir = common::scratch_dir("write");
    let exam_path = dir.join("exam.json");
    let branding_path = dir.join("branding.json");
    std::fs::write(&exam_path, common::SCENARIO_EXAM).unwrap();
    std::fs::write(dir.join("assinatura.png"), common::png_bytes(400, 120)).unwrap();
    std::fs::write(
        &branding_path,
        r#"{ "practitioner": { "nome": "Carlos Lima", "crmv": "999" }, "signature_url": "assinatura.png" }"#,
    )
    .unwrap();

    let path = write_report(&exam_path, Some(&branding_path), &dir, &ReportConfig::default())
        .await
        .unwrap();
    assert_eq!(path.file_name().unwrap(), "laudo-rex-sem-data.pdf");
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(common::contains_bytes(&bytes, b"/Subtype /Image"));

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn save_writes_named_file() {
    let dir = common::scratch_dir("save");
    let report = compose(&common::full_exam(), &common::branding()).await;
    let path = report.save(&dir).await.unwrap();
    assert!(path.ends_with("laudo-bolinha-2024-03-07.pdf"));
    assert_eq!(std::fs::read(&path).unwrap(), report.render().unwrap());
    std::fs::remove_dir_all(&dir).ok();
}
