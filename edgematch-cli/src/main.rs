use clap::Parser;
use edgematch::image::io::{load_gray_image, save_gray_image};
use edgematch::{Match, MatchConfig, Matcher, TemplateLibrary, TrainConfig};
use image::Rgb;
use imageproc::drawing::{draw_cross_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

const MATCH_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

#[derive(Parser, Debug)]
#[command(author, version, about = "EdgeMatch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
struct RotationRangeJson {
    min_deg: f32,
    max_deg: f32,
    step_deg: f32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct TrainConfigJson {
    pyramid_levels: usize,
    scales: Vec<f32>,
    rotations_deg: Vec<f32>,
    /// Overrides `rotations_deg` with an evenly spaced sweep when set.
    rotation_range: Option<RotationRangeJson>,
    canny_low: f32,
    canny_high: f32,
    fill_value: u8,
    parallel: bool,
}

impl Default for TrainConfigJson {
    fn default() -> Self {
        let cfg = TrainConfig::default();
        Self {
            pyramid_levels: cfg.pyramid_levels,
            scales: cfg.scales,
            rotations_deg: cfg.rotations_deg,
            rotation_range: None,
            canny_low: cfg.canny_low,
            canny_high: cfg.canny_high,
            fill_value: cfg.fill_value,
            parallel: cfg.parallel,
        }
    }
}

impl TrainConfigJson {
    fn into_config(self) -> edgematch::EdgeMatchResult<TrainConfig> {
        let cfg = TrainConfig {
            pyramid_levels: self.pyramid_levels,
            scales: self.scales,
            rotations_deg: self.rotations_deg,
            canny_low: self.canny_low,
            canny_high: self.canny_high,
            fill_value: self.fill_value,
            parallel: self.parallel,
        };
        match self.rotation_range {
            Some(range) => cfg.with_rotation_range(range.min_deg, range.max_deg, range.step_deg),
            None => Ok(cfg),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SearchConfigJson {
    min_score: f32,
    roi_size: usize,
    top_k: usize,
    greediness: f32,
    coarse_step: usize,
    coarse_min_score: f32,
    min_roi_size: usize,
    parallel: bool,
}

impl Default for SearchConfigJson {
    fn default() -> Self {
        let cfg = MatchConfig::default();
        Self {
            min_score: cfg.min_score,
            roi_size: cfg.roi_size,
            top_k: cfg.top_k,
            greediness: cfg.greediness,
            coarse_step: cfg.coarse_step,
            coarse_min_score: cfg.coarse_min_score,
            min_roi_size: cfg.min_roi_size,
            parallel: cfg.parallel,
        }
    }
}

impl From<SearchConfigJson> for MatchConfig {
    fn from(value: SearchConfigJson) -> Self {
        Self {
            min_score: value.min_score,
            roi_size: value.roi_size,
            top_k: value.top_k,
            greediness: value.greediness,
            coarse_step: value.coarse_step,
            coarse_min_score: value.coarse_min_score,
            min_roi_size: value.min_roi_size,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    template_path: String,
    image_path: String,
    output_path: Option<String>,
    annotated_path: Option<String>,
    debug_models_dir: Option<String>,
    library_path: Option<String>,
    train: TrainConfigJson,
    search: SearchConfigJson,
}

#[derive(Debug, Serialize)]
struct MatchRecord {
    x: usize,
    y: usize,
    score: f32,
    scale: f32,
    angle_deg: f32,
    width: usize,
    height: usize,
    left: isize,
    top: isize,
}

impl From<Match> for MatchRecord {
    fn from(value: Match) -> Self {
        let (left, top) = value.top_left();
        Self {
            x: value.x,
            y: value.y,
            score: value.score,
            scale: value.scale,
            angle_deg: value.angle_deg,
            width: value.width,
            height: value.height,
            left,
            top,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    best: Option<MatchRecord>,
    matches: Vec<MatchRecord>,
}

fn write_debug_models(
    library: &TemplateLibrary,
    dir: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;
    for model in library.iter() {
        let render = model.render_points();
        let path = Path::new(dir).join(format!(
            "model_l{}_v{}_s{:.2}_a{:.1}.png",
            model.level(),
            model.variant(),
            model.scale(),
            model.angle_deg()
        ));
        save_gray_image(&path, render.view())?;
    }
    info!(dir, models = library.len(), "wrote model renders");
    Ok(())
}

fn write_annotated(
    image_path: &str,
    matches: &[Match],
    out_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut canvas = image::open(image_path)?.to_rgb8();
    for m in matches {
        let (left, top) = m.top_left();
        let width = u32::try_from(m.width.max(1))?;
        let height = u32::try_from(m.height.max(1))?;
        let rect = Rect::at(i32::try_from(left)?, i32::try_from(top)?).of_size(width, height);
        draw_hollow_rect_mut(&mut canvas, rect, MATCH_COLOR);
        draw_cross_mut(&mut canvas, MATCH_COLOR, i32::try_from(m.x)?, i32::try_from(m.y)?);
    }
    canvas.save(out_path)?;
    info!(path = out_path, matches = matches.len(), "wrote annotated image");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env()
                    .add_directive("edgematch=info".parse()?)
                    .add_directive("edgematch_cli=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() || config.template_path.is_empty() {
        return Err("image_path and template_path must be set in the config".into());
    }

    let template = load_gray_image(&config.template_path)?;
    let library = Arc::new(TemplateLibrary::train(
        template.view(),
        config.train.into_config()?,
    )?);
    info!(
        levels = library.num_levels(),
        models = library.len(),
        "trained template library"
    );

    if let Some(dir) = config.debug_models_dir.as_deref() {
        write_debug_models(&library, dir)?;
    }
    if let Some(path) = config.library_path.as_deref() {
        fs::write(path, serde_json::to_string(library.as_ref())?)?;
        info!(path, "saved template library");
    }

    let image = load_gray_image(&config.image_path)?;
    let matcher = Matcher::new(Arc::clone(&library)).with_config(config.search.into());
    let matches = matcher.match_image(image.view())?;
    info!(matches = matches.len(), "search complete");

    if let Some(path) = config.annotated_path.as_deref() {
        write_annotated(&config.image_path, &matches, path)?;
    }

    let best = matches.first().copied().map(MatchRecord::from);
    let records = matches.into_iter().map(MatchRecord::from).collect();
    let output = Output {
        best,
        matches: records,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
