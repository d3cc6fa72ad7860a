use clap::{Parser, Subcommand};
use iconscan::io::load_raster;
use iconscan::lowlevel::{build_from_sheet, SheetLayout};
use iconscan::{
    hash_raster, FreeformConfig, GridConfig, IconRecognizer, RecognizerConfig, Strategy,
    TableLoader, TableSource,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Recognize rows of species icons in screenshots")]
struct Cli {
    /// Enable tracing output for performance profiling.
    #[arg(long, global = true)]
    trace: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a screenshot described by a JSON configuration file.
    Scan {
        /// Path to the JSON configuration file.
        #[arg(short, long, value_name = "FILE", default_value = "config.json")]
        config: PathBuf,
    },
    /// Print the dHash of a whole image as 16 hex digits.
    Hash {
        /// Image to hash.
        image: PathBuf,
    },
    /// Hash every indexed cell of an icon sprite sheet into a reference table.
    BuildTable {
        /// Sprite sheet image.
        #[arg(long)]
        sheet: PathBuf,
        /// JSON object mapping species keys to icon numbers.
        #[arg(long)]
        index: PathBuf,
        /// Output path for the reference table JSON.
        #[arg(long, default_value = "icon-hashes.json")]
        out: PathBuf,
        /// Width of one sheet cell.
        #[arg(long, default_value_t = 40)]
        cell_width: usize,
        /// Height of one sheet cell.
        #[arg(long, default_value_t = 30)]
        cell_height: usize,
    },
    /// Print the JSON schema of the scan configuration.
    PrintSchema,
    /// Print an example scan configuration.
    PrintExample,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum StrategyConfig {
    #[default]
    Grid,
    Freeform,
}

impl From<StrategyConfig> for Strategy {
    fn from(value: StrategyConfig) -> Self {
        match value {
            StrategyConfig::Grid => Strategy::Grid,
            StrategyConfig::Freeform => Strategy::Freeform,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct GridConfigJson {
    target_width: usize,
    slot_width: usize,
    slot_height: usize,
    gap: usize,
    padding: usize,
    y_min_frac: f32,
    y_max_frac: f32,
    y_step: Option<usize>,
    x_shift: usize,
    max_distance: u32,
    min_ok: usize,
    parallel: bool,
}

impl Default for GridConfigJson {
    fn default() -> Self {
        let cfg = GridConfig::default();
        Self {
            target_width: cfg.target_width,
            slot_width: cfg.slot_width,
            slot_height: cfg.slot_height,
            gap: cfg.gap,
            padding: cfg.padding,
            y_min_frac: cfg.y_min_frac,
            y_max_frac: cfg.y_max_frac,
            y_step: cfg.y_step,
            x_shift: cfg.x_shift,
            max_distance: cfg.max_distance,
            min_ok: cfg.min_ok,
            parallel: cfg.parallel,
        }
    }
}

impl From<GridConfigJson> for GridConfig {
    fn from(value: GridConfigJson) -> Self {
        Self {
            target_width: value.target_width,
            slot_width: value.slot_width,
            slot_height: value.slot_height,
            gap: value.gap,
            padding: value.padding,
            y_min_frac: value.y_min_frac,
            y_max_frac: value.y_max_frac,
            y_step: value.y_step,
            x_shift: value.x_shift,
            max_distance: value.max_distance,
            min_ok: value.min_ok,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct FreeformConfigJson {
    target_width: usize,
    sizes: Vec<(usize, usize)>,
    step: usize,
    max_distance: u32,
    max_checks_per_size: usize,
    dedup_radius: f32,
    band_tolerance: f32,
    primary_pool: usize,
    fallback_pool: usize,
    parallel: bool,
}

impl Default for FreeformConfigJson {
    fn default() -> Self {
        let cfg = FreeformConfig::default();
        Self {
            target_width: cfg.target_width,
            sizes: cfg.sizes,
            step: cfg.step,
            max_distance: cfg.max_distance,
            max_checks_per_size: cfg.max_checks_per_size,
            dedup_radius: cfg.dedup_radius,
            band_tolerance: cfg.band_tolerance,
            primary_pool: cfg.primary_pool,
            fallback_pool: cfg.fallback_pool,
            parallel: cfg.parallel,
        }
    }
}

impl From<FreeformConfigJson> for FreeformConfig {
    fn from(value: FreeformConfigJson) -> Self {
        Self {
            target_width: value.target_width,
            sizes: value.sizes,
            step: value.step,
            max_distance: value.max_distance,
            max_checks_per_size: value.max_checks_per_size,
            dedup_radius: value.dedup_radius,
            band_tolerance: value.band_tolerance,
            primary_pool: value.primary_pool,
            fallback_pool: value.fallback_pool,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    table_sources: Vec<String>,
    output_path: Option<String>,
    strategy: StrategyConfig,
    grid: GridConfigJson,
    freeform: FreeformConfigJson,
}

#[derive(Debug, Serialize)]
struct Output {
    recognized: bool,
    keys: Vec<String>,
}

fn table_source(location: &str) -> TableSource {
    if location.starts_with("http://") || location.starts_with("https://") {
        TableSource::Url(location.to_string())
    } else {
        TableSource::File(PathBuf::from(location))
    }
}

fn run_scan(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config_text = fs::read_to_string(config_path)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() {
        return Err("image_path must be set in the config".into());
    }

    let loader = if config.table_sources.is_empty() {
        TableLoader::with_default_sources(".")
    } else {
        TableLoader::new(
            config
                .table_sources
                .iter()
                .map(String::as_str)
                .map(table_source)
                .collect(),
        )
    };
    let recognizer = IconRecognizer::new(loader).with_config(RecognizerConfig {
        strategy: config.strategy.into(),
        grid: config.grid.into(),
        freeform: config.freeform.into(),
    });

    let result = recognizer.recognize_path(&config.image_path)?;
    let output = Output {
        recognized: result.is_recognized(),
        keys: result.into_keys(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn run_build_table(
    sheet: &Path,
    index: &Path,
    out: &Path,
    layout: SheetLayout,
) -> Result<(), Box<dyn std::error::Error>> {
    let sheet = load_raster(sheet)?;
    let index: BTreeMap<String, usize> = serde_json::from_str(&fs::read_to_string(index)?)?;
    let index: Vec<(String, usize)> = index.into_iter().collect();
    let table = build_from_sheet(&sheet, layout, &index)?;
    fs::write(out, table.to_json_string()?)?;
    eprintln!(
        "hashed {} of {} icons into {}",
        table.len(),
        index.len(),
        out.display()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("iconscan=info".parse()?))
            .with_target(false)
            .init();
    }

    match cli.command {
        Command::Scan { config } => run_scan(&config)?,
        Command::Hash { image } => {
            let raster = load_raster(&image)?;
            println!("{}", hash_raster(&raster));
        }
        Command::BuildTable {
            sheet,
            index,
            out,
            cell_width,
            cell_height,
        } => run_build_table(
            &sheet,
            &index,
            &out,
            SheetLayout {
                cell_width,
                cell_height,
            },
        )?,
        Command::PrintSchema => println!("{SCHEMA_JSON}"),
        Command::PrintExample => println!("{EXAMPLE_JSON}"),
    }

    Ok(())
}
