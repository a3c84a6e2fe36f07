use std::fs;
use std::path::{Path, PathBuf};

mod output_name;
mod sheet;

use anyhow::{Context, bail};
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use image::{DynamicImage, ImageReader, RgbaImage};
use spritemapper_core::config::{AlgorithmFamily, MapperConfig};
use spritemapper_core::{Atlas, InputImage, layout_images, map_images};
use tracing::{error, info, info_span, warn};
use walkdir::WalkDir;

use output_name::OutputName;
use sheet::{MetaFormat, MetaOutput, OutputSet, RunFile, SheetJob, parse_sort_order};

#[derive(Parser, Debug)]
#[command(
    name = "spritemapper",
    about = "Pack images into sprite sheets with Zwoptex2 or JSON metadata",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack images into sprite sheet textures plus metadata
    Pack(PackArgs),
    /// Compute placements and write metadata only (no textures)
    Layout(PackArgs),
    /// Produce every sheet described by a YAML config file
    Run(RunArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Input files or directories, relative to --base-dir
    #[arg(required = true, num_args = 1.., help_heading = "Input/Output")]
    inputs: Vec<PathBuf>,
    /// Base directory of the inputs; frame names are relative to it
    #[arg(long, default_value = ".", help_heading = "Input/Output")]
    base_dir: PathBuf,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
    /// Texture filename; `{n}`, `{n1}` and `{n!}` insert the page number
    #[arg(long, default_value = "spritemap.png", help_heading = "Input/Output")]
    out: String,
    /// Metadata filename (defaults to --out with the format's extension)
    #[arg(long, help_heading = "Input/Output")]
    meta: Option<String>,

    // Layout
    /// Algorithm families to try, comma-separated: maxrects,guillotine,shelf
    #[arg(long, default_value = "maxrects", help_heading = "Layout")]
    algorithm: String,
    /// Max page width, border included
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    max_width: u32,
    /// Max page height, border included (0 = unbounded)
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    max_height: u32,
    /// Round page dims up to powers of two
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    pot: bool,
    /// Padding between sprites
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    spacing: u32,
    /// Padding around the entire page
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    border: u32,
    /// Sort order: area_desc|max_side_desc|height_desc|width_desc|name_asc|none
    #[arg(long, default_value = "area_desc", help_heading = "Layout")]
    sort_order: String,
    /// Rotate portrait sprites to landscape before layout
    #[arg(long, default_value_t = true, action = ArgAction::Set, help_heading = "Layout")]
    landscape: bool,
    /// Run the candidate layouts in parallel (requires feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    parallel: bool,

    // Image Processing
    /// Trim transparent borders
    #[arg(long, default_value_t = true, action = ArgAction::Set, help_heading = "Image Processing")]
    trim: bool,
    /// Trim alpha threshold (0..=255)
    #[arg(long, default_value_t = 0, help_heading = "Image Processing")]
    trim_threshold: u8,
    /// Keep one transparent pixel right/below trimmed sprites
    #[arg(long, default_value_t = false, help_heading = "Image Processing")]
    reserve_border: bool,
    /// Draw red outlines (debug)
    #[arg(long, default_value_t = false, help_heading = "Image Processing")]
    draw_frames: bool,

    // Export
    /// Metadata format: zwoptex2 | json-hash | json-array
    #[arg(long, default_value = "zwoptex2", value_parser = ["zwoptex2", "json-hash", "json-array"], help_heading = "Export")]
    format: String,
    /// Keep directories in the texture filename written to the metadata
    #[arg(long, default_value_t = false, help_heading = "Export")]
    keep_dir: bool,
    /// Print the merged configuration and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct RunArgs {
    /// YAML file with shared options and a list of sheets
    config: PathBuf,
    /// Only run the sheets with these indices (0-based)
    #[arg(long, value_delimiter = ',')]
    only: Vec<usize>,
    /// Print each sheet's merged configuration and exit
    #[arg(long, default_value_t = false)]
    print_config: bool,
    /// Dry run: compute layouts and stats but do not write files
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

/// What a sheet run writes.
#[derive(Debug, Clone, Copy)]
struct RunMode {
    layout_only: bool,
    dry_run: bool,
    progress: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let progress = cli.progress && !cli.quiet;

    match &cli.command {
        Commands::Pack(args) => run_pack(args, progress, false),
        Commands::Layout(args) => run_pack(args, false, true),
        Commands::Run(args) => run_config(args, progress),
    }
}

impl PackArgs {
    fn mapper_config(&self) -> anyhow::Result<MapperConfig> {
        Ok(MapperConfig {
            max_width: self.max_width,
            max_height: self.max_height,
            spacing: self.spacing,
            border: self.border,
            power_of_two: self.pot,
            trim: self.trim,
            trim_threshold: self.trim_threshold,
            reserve_border: self.reserve_border,
            landscape: self.landscape,
            draw_frames: self.draw_frames,
            algorithms: AlgorithmFamily::parse_list(&self.algorithm)?,
            sort_order: parse_sort_order(&self.sort_order)?,
            parallel: self.parallel,
        })
    }

    fn sheet_job(&self) -> anyhow::Result<SheetJob> {
        let format: MetaFormat = self.format.parse()?;
        let meta = match &self.meta {
            Some(m) => m.clone(),
            None => Path::new(&self.out)
                .with_extension(format.extension())
                .to_string_lossy()
                .into_owned(),
        };
        Ok(SheetJob {
            base_dir: self.base_dir.clone(),
            inputs: self.inputs.clone(),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            cfg: self.mapper_config()?,
            out_dir: PathBuf::new(),
            outputs: vec![OutputSet {
                textures: vec![self.out.clone()],
                metas: vec![MetaOutput {
                    format,
                    path: meta,
                    keep_dir: self.keep_dir,
                }],
            }],
        })
    }
}

fn run_pack(args: &PackArgs, progress: bool, layout_only: bool) -> anyhow::Result<()> {
    let job = args.sheet_job()?;

    if args.print_config {
        match args.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&job.cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&job.cfg)?),
        }
        return Ok(());
    }

    let mode = RunMode {
        layout_only,
        dry_run: args.dry_run,
        progress,
    };
    if !run_sheet(&job, mode)? {
        bail!("no input images found under {}", job.base_dir.display());
    }
    Ok(())
}

fn run_config(args: &RunArgs, progress: bool) -> anyhow::Result<()> {
    let root = args.config.parent().unwrap_or(Path::new(""));
    let jobs = RunFile::load(&args.config)?.into_jobs(root)?;
    info!(sheets = jobs.len(), config = ?args.config, "loaded config");

    let selected: Vec<(usize, &SheetJob)> = jobs
        .iter()
        .enumerate()
        .filter(|(i, _)| args.only.is_empty() || args.only.contains(i))
        .collect();

    if args.print_config {
        let cfgs: Vec<&MapperConfig> = selected.iter().map(|(_, j)| &j.cfg).collect();
        println!("{}", serde_yaml::to_string(&cfgs)?);
        return Ok(());
    }

    let mode = RunMode {
        layout_only: false,
        dry_run: args.dry_run,
        progress,
    };
    for (index, job) in selected {
        let _span = info_span!("sheet", index).entered();
        if job.outputs.is_empty() {
            warn!("sheet has no outputs");
        }
        if !run_sheet(job, mode).with_context(|| format!("sheet {index}"))? {
            warn!(base_dir = ?job.base_dir, "no input images, sheet skipped");
        }
    }
    Ok(())
}

/// Loads, lays out and writes one sheet. Returns false if no input image
/// was found.
fn run_sheet(job: &SheetJob, mode: RunMode) -> anyhow::Result<bool> {
    let files = gather_inputs(&job.base_dir, &job.inputs, &job.include, &job.exclude)?;
    if files.is_empty() {
        return Ok(false);
    }
    let inputs = load_images_with_progress(&files, mode.progress)?;
    info!(count = inputs.len(), "loaded input images");

    let (atlas, textures) = if mode.layout_only {
        (layout_images(inputs, job.cfg.clone())?, Vec::new())
    } else {
        let out = map_images(inputs, job.cfg.clone())?;
        let textures: Vec<RgbaImage> = out.pages.into_iter().map(|p| p.rgba).collect();
        (out.atlas, textures)
    };

    let stats = atlas.stats();
    info!(
        pages = stats.num_pages,
        used_area = stats.used_frame_area,
        total_area = stats.total_page_area,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        layouter = %atlas.meta.layouter,
        "stats"
    );
    if mode.dry_run {
        println!("{}", stats.summary());
        return Ok(true);
    }

    for set in &job.outputs {
        write_output_set(set, &job.out_dir, &atlas, &textures)?;
    }
    Ok(true)
}

fn write_output_set(
    set: &OutputSet,
    out_dir: &Path,
    atlas: &Atlas,
    textures: &[RgbaImage],
) -> anyhow::Result<()> {
    let total = atlas.pages.len();

    // metadata refers to the first texture pattern
    let texture_names = match set.textures.first() {
        Some(pattern) => OutputName::parse(pattern).render_all(total)?,
        None => vec![String::new(); total],
    };

    if !textures.is_empty() {
        for pattern in &set.textures {
            let names = OutputName::parse(pattern).render_all(total)?;
            for (id, (name, rgba)) in names.iter().zip(textures).enumerate() {
                let path = out_dir.join(name);
                write_texture(&path, rgba)?;
                info!(?path, id, "wrote page");
            }
        }
    }

    for meta in &set.metas {
        let names: Vec<String> = texture_names
            .iter()
            .map(|n| texture_reference(n, meta.keep_dir))
            .collect();
        write_meta(meta, out_dir, atlas, &names)?;
    }
    Ok(())
}

fn write_meta(
    meta: &MetaOutput,
    out_dir: &Path,
    atlas: &Atlas,
    texture_names: &[String],
) -> anyhow::Result<()> {
    let pattern = OutputName::parse(&meta.path);
    match meta.format {
        MetaFormat::Zwoptex2 => {
            let names = pattern.render_all(atlas.pages.len())?;
            for (page, (name, texture)) in names.iter().zip(texture_names).enumerate() {
                let path = out_dir.join(name);
                let plist = spritemapper_core::to_zwoptex2(atlas, page, texture);
                write_file(&path, plist.as_bytes())?;
                info!(?path, page, "metadata written");
            }
        }
        MetaFormat::JsonHash | MetaFormat::JsonArray => {
            let path = out_dir.join(pattern.render(0, 1)?);
            let mut value = if meta.format == MetaFormat::JsonHash {
                spritemapper_core::to_json_hash(atlas)
            } else {
                spritemapper_core::to_json_array(atlas)
            };
            if let Some(pages) = value.get_mut("pages").and_then(|v| v.as_array_mut()) {
                for (page, name) in pages.iter_mut().zip(texture_names) {
                    page["image"] = serde_json::Value::from(name.as_str());
                }
            } else {
                value["meta"]["images"] = serde_json::Value::from(texture_names.to_vec());
            }
            let json = serde_json::to_string_pretty(&value)?;
            write_file(&path, json.as_bytes())?;
            info!(?path, pages = atlas.pages.len(), "metadata written");
        }
    }
    Ok(())
}

/// Texture name as written into metadata: `/` separated, and reduced to the
/// file name unless `keep_dir` is set.
fn texture_reference(name: &str, keep_dir: bool) -> String {
    let name = name.replace('\\', "/");
    if keep_dir {
        return name;
    }
    match name.rsplit_once('/') {
        Some((_, file)) => file.to_string(),
        None => name,
    }
}

fn write_texture(path: &Path, rgba: &RgbaImage) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let jpeg = matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "jpg" | "jpeg")
    );
    if jpeg {
        DynamicImage::ImageRgba8(rgba.clone())
            .to_rgb8()
            .save(path)
            .with_context(|| format!("write {}", path.display()))?;
    } else {
        rgba.save(path)
            .with_context(|| format!("write {}", path.display()))?;
    }
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    ensure_parent(path)?;
    fs::write(path, bytes).with_context(|| format!("write {}", path.display()))
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
    }
    Ok(())
}

/// An image file found on disk and the frame name it will be packed under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct InputFile {
    key: String,
    path: PathBuf,
}

/// Resolves `inputs` against `base_dir`, walks directories and filters by
/// extension and globs. Globs match the `/` separated path relative to
/// `base_dir`. The result is sorted by key so layouts are reproducible.
fn gather_inputs(
    base_dir: &Path,
    inputs: &[PathBuf],
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<InputFile>> {
    if !base_dir.is_dir() {
        bail!("base dir {} is not a directory", base_dir.display());
    }
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;

    let mut list: Vec<InputFile> = Vec::new();
    let mut push = |p: &Path| {
        let key = frame_key(base_dir, p);
        if !should_skip(&key, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
            list.push(InputFile {
                key,
                path: p.to_path_buf(),
            });
        }
    };
    for input in inputs {
        let path = base_dir.join(input);
        if path.is_file() {
            push(&path);
        } else if path.is_dir() {
            for entry in WalkDir::new(&path).into_iter().filter_map(|e| e.ok()) {
                if entry.file_type().is_file() {
                    push(entry.path());
                }
            }
        } else {
            bail!(
                "input {} doesn't exist in base dir {}",
                input.display(),
                base_dir.display()
            );
        }
    }
    list.sort();
    list.dedup_by(|a, b| a.key == b.key);
    Ok(list)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("bad glob {pat}"))?);
    }
    Ok(Some(b.build()?))
}

fn frame_key(base_dir: &Path, p: &Path) -> String {
    p.strip_prefix(base_dir)
        .unwrap_or(p)
        .to_string_lossy()
        .replace('\\', "/")
}

fn should_skip(key: &str, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    if let Some(ex) = exclude {
        if ex.is_match(key) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(key) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "gif" | "bmp" | "tga")
    )
}

fn load_images_with_progress(files: &[InputFile], progress: bool) -> anyhow::Result<Vec<InputImage>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(files.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };

    let mut list = Vec::with_capacity(files.len());
    for f in files {
        if let Some(b) = &bar {
            b.set_message(f.key.clone());
        }
        match load_image(&f.path) {
            Ok(image) => list.push(InputImage {
                key: f.key.clone(),
                image,
            }),
            Err(e) => {
                error!(path = ?f.path, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_image(p: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_reference_strips_dirs() {
        assert_eq!(texture_reference("out/sheets/ui.png", false), "ui.png");
        assert_eq!(texture_reference("out\\ui.png", true), "out/ui.png");
        assert_eq!(texture_reference("ui.png", false), "ui.png");
    }

    #[test]
    fn globs_match_relative_keys() {
        let inc = build_globset(&["**/*.png".to_string()]).unwrap();
        let exc = build_globset(&["ui/tmp_*".to_string()]).unwrap();
        assert!(!should_skip("ui/button.png", inc.as_ref(), exc.as_ref()));
        assert!(should_skip("ui/tmp_a.png", inc.as_ref(), exc.as_ref()));
        assert!(should_skip("ui/button.jpg", inc.as_ref(), exc.as_ref()));
        assert!(!should_skip("x.jpg", None, None));
    }

    #[test]
    fn pack_args_build_a_job() {
        let cli = Cli::parse_from([
            "spritemapper",
            "pack",
            "icons",
            "--out",
            "build/icons{n}.png",
            "--format",
            "json-hash",
            "--algorithm",
            "shelf,maxrects",
            "--trim",
            "false",
            "--border",
            "2",
        ]);
        let Commands::Pack(args) = cli.command else {
            panic!("expected pack");
        };
        let job = args.sheet_job().unwrap();
        assert!(!job.cfg.trim);
        assert!(job.cfg.landscape);
        assert_eq!(job.cfg.border, 2);
        assert_eq!(
            job.cfg.algorithms,
            vec![AlgorithmFamily::Shelf, AlgorithmFamily::MaxRects]
        );
        let meta = &job.outputs[0].metas[0];
        assert_eq!(meta.format, MetaFormat::JsonHash);
        assert_eq!(meta.path, "build/icons{n}.json");
    }
}
