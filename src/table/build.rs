//! Building reference tables from icon sprite sheets.
//!
//! Sheets pack equally sized icon cells left to right, top to bottom. Icon
//! number `n` sits in column `n % cols` and row `n / cols`, where `cols` is the
//! number of whole cells that fit across the sheet.

use crate::hash::SlotHasher;
use crate::image::Raster;
use crate::table::ReferenceTable;
use crate::trace::trace_event;
use crate::util::{IconScanError, IconScanResult};

/// Cell geometry of a sprite sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SheetLayout {
    /// Width of one icon cell in pixels.
    pub cell_width: usize,
    /// Height of one icon cell in pixels.
    pub cell_height: usize,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            cell_width: 40,
            cell_height: 30,
        }
    }
}

impl SheetLayout {
    /// Returns the top-left pixel of icon `icon` in a sheet `sheet_width` wide.
    pub fn cell_origin(&self, icon: usize, sheet_width: usize) -> Option<(usize, usize)> {
        let cols = sheet_width / self.cell_width.max(1);
        if cols == 0 {
            return None;
        }
        Some((
            (icon % cols) * self.cell_width,
            (icon / cols) * self.cell_height,
        ))
    }
}

/// Hashes every indexed icon cell of `sheet` into a reference table.
///
/// `index` pairs each species key with its icon number. Icons whose cell
/// falls outside the sheet are skipped.
pub fn build_from_sheet<K: AsRef<str>>(
    sheet: &Raster,
    layout: SheetLayout,
    index: &[(K, usize)],
) -> IconScanResult<ReferenceTable> {
    if layout.cell_width == 0 || layout.cell_height == 0 {
        return Err(IconScanError::InvalidInput("sheet cell size must be > 0"));
    }
    if sheet.width() < layout.cell_width {
        return Err(IconScanError::InvalidInput(
            "sheet is narrower than one icon cell",
        ));
    }

    let hasher = SlotHasher::new(layout.cell_width, layout.cell_height)?;
    let luma = sheet.to_luma();
    let view = luma.view();

    let mut entries = Vec::with_capacity(index.len());
    let mut skipped = 0usize;
    for (key, icon) in index {
        let hash = layout
            .cell_origin(*icon, sheet.width())
            .and_then(|(x, y)| hasher.hash_at(view, x, y));
        match hash {
            Some(hash) => entries.push((key.as_ref().to_string(), hash)),
            None => skipped += 1,
        }
    }

    trace_event!("sheet_hashed", hashed = entries.len(), skipped = skipped);
    ReferenceTable::from_entries(entries)
}
