use iconscan::lowlevel::{best_row, OUT_OF_BOUNDS_PENALTY};
use iconscan::{
    hash_raster, locate_row, GridConfig, IconRecognizer, Raster, RecognizerConfig,
    ReferenceTable, Strategy, TableLoader,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const KEYS: [&str; 6] = ["alpha", "bravo", "charlie", "delta", "echo", "foxtrot"];

fn make_icon(seed: u64, width: usize, height: usize) -> Raster {
    let mut rng = StdRng::seed_from_u64(seed);
    let data: Vec<u8> = (0..width * height)
        .flat_map(|_| [rng.random::<u8>(), rng.random::<u8>(), rng.random::<u8>(), 255])
        .collect();
    Raster::from_rgba(data, width, height).unwrap()
}

fn make_icons() -> Vec<Raster> {
    (0..KEYS.len() as u64)
        .map(|i| make_icon(100 + i, 40, 30))
        .collect()
}

fn make_table(icons: &[Raster]) -> ReferenceTable {
    ReferenceTable::from_entries(KEYS.iter().zip(icons).map(|(key, icon)| (*key, hash_raster(icon))))
        .unwrap()
}

fn blank(width: usize, height: usize) -> Raster {
    Raster::from_fn(width, height, |_, _| [24, 28, 36, 255]).unwrap()
}

fn place_row(screen: &mut Raster, icons: &[Raster], x_base: usize, y: usize, pitch: usize) {
    for (i, icon) in icons.iter().enumerate() {
        screen.blit(icon, x_base + 6 + i * pitch, y);
    }
}

#[test]
fn grid_finds_centered_row() {
    let icons = make_icons();
    let table = make_table(&icons);
    let mut screen = blank(600, 300);
    // Centered row origin for a 600 px wide image: round((600 - 282) / 2).
    place_row(&mut screen, &icons, 159, 20, 46);

    let result = locate_row(&screen, &table, &GridConfig::default()).unwrap();
    assert!(result.is_recognized());
    assert_eq!(result.keys(), KEYS);
}

#[test]
fn grid_tries_shifted_origins() {
    let icons = make_icons();
    let table = make_table(&icons);

    let mut screen = blank(600, 300);
    place_row(&mut screen, &icons, 199, 20, 46);
    let result = locate_row(&screen, &table, &GridConfig::default()).unwrap();
    assert_eq!(result.keys(), KEYS);

    let mut screen = blank(600, 300);
    place_row(&mut screen, &icons, 179, 20, 46);
    let cfg = GridConfig {
        x_shift: 20,
        ..GridConfig::default()
    };
    let result = locate_row(&screen, &table, &cfg).unwrap();
    assert_eq!(result.keys(), KEYS);
}

#[test]
fn grid_is_all_or_nothing() {
    let mut icons = make_icons();
    let table = make_table(&icons);
    icons[3] = make_icon(9_999, 40, 30);
    let mut screen = blank(600, 300);
    place_row(&mut screen, &icons, 159, 20, 46);

    // Five good slots pass the row threshold but the row is still incomplete.
    let result = locate_row(&screen, &table, &GridConfig::default()).unwrap();
    assert!(!result.is_recognized());
    assert!(result.keys().is_empty());

    let result = locate_row(&screen, &table, &GridConfig::strict()).unwrap();
    assert!(result.keys().is_empty());
}

#[test]
fn strict_preset_accepts_complete_row() {
    let strict = GridConfig::strict();
    assert_eq!(strict.min_ok, 6);
    assert_eq!(strict.target_width, 1100);
    assert!((strict.y_max_frac - 0.22).abs() < f32::EPSILON);

    let icons = make_icons();
    let table = make_table(&icons);
    let mut screen = blank(600, 300);
    place_row(&mut screen, &icons, 159, 20, 46);
    let result = locate_row(&screen, &table, &strict).unwrap();
    assert_eq!(result.keys(), KEYS);
}

#[test]
fn slots_past_the_edge_reject_the_row() {
    let icons = make_icons();
    let table = make_table(&icons);
    // Narrower than the 282 px row: the sixth slot leaves the image.
    let mut screen = blank(260, 200);
    place_row(&mut screen, &icons, 0, 20, 46);

    let result = locate_row(&screen, &table, &GridConfig::default()).unwrap();
    assert!(result.keys().is_empty());

    let lenient = GridConfig {
        min_ok: 0,
        ..GridConfig::default()
    };
    let result = locate_row(&screen, &table, &lenient).unwrap();
    assert!(result.keys().is_empty());

    let luma = screen.to_luma();
    for cfg in [GridConfig::default(), lenient] {
        let row = best_row(luma.view(), 1.0, &table, &cfg).unwrap().unwrap();
        assert!(row.total >= OUT_OF_BOUNDS_PENALTY);
        assert!(row.slots[5].is_none());
        assert!(row.accepted(cfg.max_distance).is_none());
    }
}

#[test]
fn grid_ignores_rows_below_the_band() {
    let icons = make_icons();
    let table = make_table(&icons);
    let mut screen = blank(600, 300);
    place_row(&mut screen, &icons, 159, 200, 46);

    let result = locate_row(&screen, &table, &GridConfig::default()).unwrap();
    assert!(!result.is_recognized());
}

#[test]
fn grid_scales_geometry_for_large_screenshots() {
    let icons = make_icons();
    let table = make_table(&icons);
    let doubled: Vec<Raster> = icons
        .iter()
        .map(|icon| Raster::from_fn(80, 60, |x, y| icon.pixel(x / 2, y / 2).unwrap()).unwrap())
        .collect();

    // 2000 px wide downscales by exactly one half, so slots are configured at
    // twice the working size.
    let mut screen = blank(2000, 600);
    for (i, icon) in doubled.iter().enumerate() {
        screen.blit(icon, 2 * (359 + 6 + i * 46), 40);
    }
    let cfg = GridConfig {
        slot_width: 80,
        slot_height: 60,
        gap: 12,
        padding: 12,
        x_shift: 80,
        ..GridConfig::default()
    };

    let result = locate_row(&screen, &table, &cfg).unwrap();
    assert_eq!(result.keys(), KEYS);
}

#[test]
fn grid_rejects_invalid_config() {
    let table = make_table(&make_icons());
    let cfg = GridConfig {
        target_width: 0,
        ..GridConfig::default()
    };
    assert!(locate_row(&blank(600, 300), &table, &cfg).is_err());
}

#[test]
fn recognizer_runs_both_strategies() {
    let icons = make_icons();
    let table = make_table(&icons);

    let mut screen = blank(600, 300);
    place_row(&mut screen, &icons, 159, 20, 46);
    let grid = IconRecognizer::new(TableLoader::from_table(table.clone()));
    assert_eq!(grid.recognize(&screen).unwrap().into_keys(), KEYS);

    let mut screen = blank(600, 300);
    for (i, icon) in icons.iter().enumerate() {
        screen.blit(icon, 60 + i * 48, 60);
    }
    let freeform = IconRecognizer::new(TableLoader::from_table(table)).with_config(
        RecognizerConfig {
            strategy: Strategy::Freeform,
            ..RecognizerConfig::default()
        },
    );
    assert_eq!(freeform.recognize(&screen).unwrap().into_keys(), KEYS);
}

#[cfg(feature = "image-io")]
#[test]
fn recognizer_decodes_png_bytes() {
    use std::io::Cursor;

    let icons = make_icons();
    let table = make_table(&icons);
    let mut screen = blank(600, 300);
    place_row(&mut screen, &icons, 159, 20, 46);

    let encoded = image::RgbaImage::from_raw(600, 300, screen.as_rgba().to_vec()).unwrap();
    let mut bytes = Vec::new();
    encoded
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();

    let recognizer = IconRecognizer::new(TableLoader::from_table(table));
    let result = recognizer.recognize_bytes(&bytes).unwrap();
    assert_eq!(result.keys(), KEYS);
}
