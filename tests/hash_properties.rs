use iconscan::lowlevel::{build_from_sheet, dhash_region, hamming, SheetLayout};
use iconscan::{hash_raster, DHash, Raster, ReferenceTable};

fn stripes(width: usize, height: usize, offset: u8) -> Raster {
    Raster::from_fn(width, height, |x, y| {
        let v = (((x / 5) * 37 + (y / 4) * 11) % 180) as u8 + offset;
        [v, v, v, 255]
    })
    .unwrap()
}

#[test]
fn distance_is_a_metric_on_hashes() {
    let a = hash_raster(&stripes(40, 30, 0));
    let b = hash_raster(&stripes(40, 30, 0));
    let c = DHash(a.0 ^ 0b1011);

    assert_eq!(a, b);
    assert_eq!(a.distance(b), 0);
    assert_eq!(a.distance(c), 3);
    assert_eq!(c.distance(a), 3);
    assert_eq!(hamming(0, u64::MAX), 64);
}

#[test]
fn hash_ignores_uniform_brightness_shift() {
    let base = hash_raster(&stripes(40, 30, 0));
    let brighter = hash_raster(&stripes(40, 30, 60));
    assert!(base.distance(brighter) <= 2);
}

#[test]
fn hash_is_stable_across_icon_sizes() {
    // A pattern repeated at double resolution keeps its coarse structure.
    let small = stripes(40, 30, 0);
    let large = Raster::from_fn(80, 60, |x, y| small.pixel(x / 2, y / 2).unwrap()).unwrap();
    assert!(hash_raster(&small).distance(hash_raster(&large)) <= 2);
}

#[test]
fn uniform_regions_hash_to_zero() {
    // 18x16 maps onto the 9x8 grid with exact half weights.
    let flat = Raster::from_fn(18, 16, |_, _| [90, 140, 200, 255]).unwrap();
    assert_eq!(hash_raster(&flat), DHash(0));

    let luma = flat.to_luma();
    assert_eq!(dhash_region(luma.view(), 0, 0, 18, 16), Some(DHash(0)));
    assert_eq!(dhash_region(luma.view(), 10, 10, 18, 16), None);
}

#[test]
fn sheet_cells_hash_like_cropped_icons() {
    let icons: Vec<Raster> = (0..3u8).map(|i| stripes(40, 30, i * 20)).collect();
    let variants: Vec<Raster> = (0..3usize)
        .map(|i| {
            Raster::from_fn(40, 30, |x, y| {
                let v = ((x * (i + 2) + y * 7) % 256) as u8;
                [v, 255 - v, v / 3, 255]
            })
            .unwrap()
        })
        .collect();

    // Two cells per row.
    let mut sheet = Raster::from_fn(80, 60, |_, _| [0, 0, 0, 255]).unwrap();
    sheet.blit(&icons[0], 0, 0);
    sheet.blit(&variants[1], 40, 0);
    sheet.blit(&variants[2], 0, 30);

    let index = [("first", 0usize), ("second", 1), ("third", 2), ("outside", 9)];
    let table = build_from_sheet(&sheet, SheetLayout::default(), &index).unwrap();

    let expected = ReferenceTable::from_entries([
        ("first", hash_raster(&icons[0])),
        ("second", hash_raster(&variants[1])),
        ("third", hash_raster(&variants[2])),
    ])
    .unwrap();
    assert_eq!(table, expected);
}
