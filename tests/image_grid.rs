mod common;

use vetcardio_report::ReportConfig;
use vetcardio_report::report::images::{
    APPENDIX_TITLE, Appendix, CONTINUATION_SUFFIX, ImageGrid, fit_contain,
};
use vetcardio_report::report::paginate::{BlankHeader, Paginator};

#[test]
fn large_image_is_contained_with_aspect_kept() {
    let (w, h) = fit_contain(1600.0, 1200.0, 300.0, 200.0);
    assert!(w <= 300.0 && h <= 200.0);
    assert!((h - 200.0).abs() < 1e-3 || (w - 300.0).abs() < 1e-3);
    assert!((w / h - 1600.0 / 1200.0).abs() < 1e-4);
}

#[test]
fn wide_image_touches_the_sides() {
    let (w, h) = fit_contain(4000.0, 500.0, 300.0, 200.0);
    assert!((w - 300.0).abs() < 1e-3);
    assert!((h - 37.5).abs() < 1e-3);
}

#[test]
fn degenerate_image_has_no_size() {
    assert_eq!(fit_contain(0.0, 100.0, 300.0, 200.0), (0.0, 0.0));
}

#[test]
fn placed_image_is_centred_in_its_cell() {
    let config = ReportConfig::default();
    let grid = ImageGrid::new(&config);
    for slot in 0..grid.per_page() {
        let cell = grid.cell(slot);
        let frame = grid.place(slot, 1600, 1200);
        assert!(frame.x >= cell.x - 1e-3 && frame.right() <= cell.right() + 1e-3);
        assert!(frame.y >= cell.y - 1e-3 && frame.bottom() <= cell.bottom() + 1e-3);
        let left = frame.x - cell.x;
        let right = cell.right() - frame.right();
        assert!((left - right).abs() < 1e-3);
        let top = frame.y - cell.y;
        let bottom = cell.bottom() - frame.bottom();
        assert!((top - bottom).abs() < 1e-3);
    }
}

#[test]
fn cells_stay_above_the_footer_reserve() {
    let config = ReportConfig::default();
    let grid = ImageGrid::new(&config);
    let last = grid.cell(grid.per_page() - 1);
    assert!(last.bottom() <= config.page.content_limit());
    assert!(last.right() <= config.page.width - config.page.margin + 1e-3);
}

#[test]
fn requested_capacity_is_clamped_to_what_fits() {
    let mut config = ReportConfig::default();
    config.grid.per_page = 20;
    assert_eq!(ImageGrid::new(&config).per_page(), 6);
    config.grid.per_page = 4;
    assert_eq!(ImageGrid::new(&config).per_page(), 4);
}

fn appendix_pages(config: &ReportConfig, count: usize) -> Vec<vetcardio_report::pdf::Page> {
    let mut p = Paginator::new(config, &BlankHeader);
    let mut appendix = Appendix::new(config);
    for image in 0..count {
        appendix.place(&mut p, image, 1600, 1200);
    }
    assert_eq!(appendix.placed(), count);
    p.finish()
}

#[test]
fn appendix_starts_on_its_own_page_and_continues() {
    let config = ReportConfig::default();
    let pages = appendix_pages(&config, 7);
    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0].image_count(), 0);
    assert_eq!(pages[1].image_count(), 6);
    assert_eq!(pages[2].image_count(), 1);

    let first = pages[1].find_text(APPENDIX_TITLE).unwrap();
    assert_eq!(first.text, APPENDIX_TITLE);
    let second = pages[2].find_text(APPENDIX_TITLE).unwrap();
    assert_eq!(second.text, format!("{APPENDIX_TITLE}{CONTINUATION_SUFFIX}"));
}

#[test]
fn configured_capacity_drives_page_breaks() {
    let mut config = ReportConfig::default();
    config.grid.per_page = 4;
    let pages = appendix_pages(&config, 7);
    assert_eq!(pages.len(), 3);
    assert_eq!(pages[1].image_count(), 4);
    assert_eq!(pages[2].image_count(), 3);
}

#[test]
fn image_order_is_preserved() {
    let config = ReportConfig::default();
    let pages = appendix_pages(&config, 8);
    let order: Vec<usize> = pages
        .iter()
        .flat_map(|page| page.images().map(|(_, image)| image))
        .collect();
    assert_eq!(order, (0..8).collect::<Vec<_>>());
}

#[test]
fn no_images_means_no_appendix_page() {
    let config = ReportConfig::default();
    let pages = appendix_pages(&config, 0);
    assert_eq!(pages.len(), 1);
    assert!(!pages[0].contains_text(APPENDIX_TITLE));
}
