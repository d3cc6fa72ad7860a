//! End-to-end icon row recognition.
//!
//! An [`IconRecognizer`] owns the table loader and the scan configuration.
//! Each call loads the reference table on first use, runs the selected
//! strategy over a decoded raster, and returns six keys or an empty result.

use crate::image::Raster;
use crate::search::{locate_row, scan_freeform, FreeformConfig, GridConfig, ScanResult, Strategy};
use crate::table::TableLoader;
use crate::trace::{trace_event, trace_span};
use crate::util::IconScanResult;

/// Settings for both strategies plus the one to run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecognizerConfig {
    /// Strategy used by [`IconRecognizer::recognize`].
    pub strategy: Strategy,
    /// Fixed-layout grid settings.
    pub grid: GridConfig,
    /// Free-form scan settings.
    pub freeform: FreeformConfig,
}

/// Recognizes rows of species icons in screenshots.
#[derive(Debug)]
pub struct IconRecognizer {
    loader: TableLoader,
    config: RecognizerConfig,
}

impl IconRecognizer {
    /// Creates a recognizer with default configuration.
    pub fn new(loader: TableLoader) -> Self {
        Self {
            loader,
            config: RecognizerConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: RecognizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Returns the table loader.
    pub fn loader(&self) -> &TableLoader {
        &self.loader
    }

    /// Recognizes the icon row in a decoded raster.
    ///
    /// Fails when the reference table cannot be loaded or the configuration is
    /// invalid. An unrecognizable image yields an empty [`ScanResult`].
    pub fn recognize(&self, raster: &Raster) -> IconScanResult<ScanResult> {
        let _span = trace_span!(
            "recognize",
            width = raster.width(),
            height = raster.height()
        )
        .entered();
        let table = self.loader.ensure_loaded()?;
        let result = match self.config.strategy {
            Strategy::Grid => locate_row(raster, &table, &self.config.grid)?,
            Strategy::Freeform => scan_freeform(raster, &table, &self.config.freeform)?,
        };
        trace_event!("recognized", found = result.is_recognized());
        Ok(result)
    }

    /// Decodes an image file and recognizes its icon row.
    #[cfg(feature = "image-io")]
    pub fn recognize_path<P: AsRef<std::path::Path>>(&self, path: P) -> IconScanResult<ScanResult> {
        let raster = crate::image::io::load_raster(path)?;
        self.recognize(&raster)
    }

    /// Decodes an encoded image held in memory and recognizes its icon row.
    #[cfg(feature = "image-io")]
    pub fn recognize_bytes(&self, bytes: &[u8]) -> IconScanResult<ScanResult> {
        let raster = crate::image::io::decode_raster(bytes)?;
        self.recognize(&raster)
    }
}
