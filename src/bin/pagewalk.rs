use std::{
    collections::BTreeMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use pagewalk::{
    EngineConfig, FsImageProbe, ImageResolver, Intent, PageDataset, Session,
    offline::{
        rotation::apply_rotation_file,
        thumbnails::{ThumbnailOptions, generate_all},
    },
};

#[derive(Parser, Debug)]
#[command(name = "pagewalk", version)]
struct Cli {
    /// Log engine transitions (repeat for trace output).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a page dataset and check it against a config.
    Inspect(InspectArgs),
    /// Replay a JSON script of intents and time steps, printing a snapshot per step.
    Simulate(SimulateArgs),
    /// Apply a rotation patch file to a dataset in place.
    ApplyRotation(ApplyRotationArgs),
    /// Generate overview thumbnails for every image in a directory.
    Thumbnails(ThumbnailArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Page dataset JSON.
    #[arg(long)]
    pages: PathBuf,

    /// Engine config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Page dataset JSON.
    #[arg(long)]
    pages: PathBuf,

    /// Engine config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Script: a JSON array of intents (`{"intent": "next"}`) and `{"advance": ms}` steps.
    #[arg(long)]
    script: PathBuf,

    /// Directory image paths are resolved against. Defaults to the dataset's directory.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Also print the events emitted by each step.
    #[arg(long)]
    events: bool,
}

#[derive(Parser, Debug)]
struct ApplyRotationArgs {
    /// Rotation patch text file.
    #[arg(long)]
    patch: PathBuf,

    /// Page dataset JSON, rewritten in place.
    #[arg(long)]
    pages: PathBuf,
}

#[derive(Parser, Debug)]
struct ThumbnailArgs {
    /// Directory with the original images.
    #[arg(long = "in")]
    in_dir: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Thumbnail width in pixels.
    #[arg(long, default_value_t = 400)]
    width: u32,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = 60)]
    quality: u8,
}

#[derive(serde::Deserialize, Debug)]
#[serde(untagged)]
enum Step {
    Advance { advance: u64 },
    Intent(Intent),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Simulate(args) => cmd_simulate(args),
        Command::ApplyRotation(args) => cmd_apply_rotation(args),
        Command::Thumbnails(args) => cmd_thumbnails(args),
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(p) => EngineConfig::from_json_file(p)
            .with_context(|| format!("load config '{}'", p.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn read_pages(path: &Path) -> anyhow::Result<PageDataset> {
    PageDataset::load(path).with_context(|| format!("load pages '{}'", path.display()))
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let pages = read_pages(&args.pages)?;
    let config = read_config(args.config.as_deref())?;

    let mut kinds: BTreeMap<String, usize> = BTreeMap::new();
    for p in pages.iter() {
        *kinds.entry(p.kind.to_string()).or_default() += 1;
    }
    println!("pages: {}", pages.len());
    for (kind, n) in &kinds {
        println!("  {kind}: {n}");
    }
    if let Some(b) = pages.world_bounds() {
        println!(
            "world bounds: x {:.0}..{:.0}, y {:.0}..{:.0} ({:.0} x {:.0})",
            b.min_x, b.max_x, b.min_y, b.max_y, b.width, b.height
        );
    }

    let min_points = config.scroll.min_path_points;
    for p in pages.iter().filter(|p| p.drives_scroll()) {
        let n = p.scroll_path.len();
        let note = if n <= min_points { " (degenerate)" } else { "" };
        let rotate = if p.rotates_with_path() { ", rotates" } else { "" };
        println!("  path {}: {n} points{rotate}{note}", p.id);
    }

    let narrative = &config.narrative;
    let mut referenced: Vec<&str> = Vec::new();
    if let Some(b) = &narrative.branch {
        referenced.extend([b.anchor.as_str(), b.arm_a_start.as_str(), b.arm_b_start.as_str()]);
        referenced.push(b.arm_a_end());
        referenced.extend(b.ending_a.as_deref());
        referenced.extend(b.ending_b.as_deref());
    }
    for batch in &narrative.reveal_batches {
        referenced.push(&batch.trigger);
        referenced.extend(batch.pages.iter().map(String::as_str));
        referenced.extend(batch.advance_to.as_deref());
    }
    referenced.extend(narrative.auto_advance.iter().map(|r| r.id.as_str()));
    let missing: Vec<&str> = referenced
        .into_iter()
        .filter(|id| !pages.contains(id))
        .collect();
    if missing.is_empty() {
        println!("narrative: ok");
    } else {
        println!("narrative: {} unknown id(s): {}", missing.len(), missing.join(", "));
    }
    Ok(())
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let pages = Arc::new(read_pages(&args.pages)?);
    let config = read_config(args.config.as_deref())?;

    let f = File::open(&args.script)
        .with_context(|| format!("open script '{}'", args.script.display()))?;
    let steps: Vec<Step> =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse script JSON")?;

    let root = match args.root {
        Some(r) => r,
        None => args
            .pages
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let resolver = Arc::new(ImageResolver::new(
        Arc::new(FsImageProbe::new(root)),
        config.images.clone(),
    ));
    let mut session = Session::new(pages, config, resolver).context("start session")?;
    print_step(&mut session, "start", args.events)?;

    for (i, step) in steps.into_iter().enumerate() {
        let label = match step {
            Step::Advance { advance } => {
                session.advance(advance);
                format!("#{i} advance {advance}")
            }
            Step::Intent(intent) => {
                let label = format!("#{i} {intent:?}");
                session.handle(intent);
                label
            }
        };
        print_step(&mut session, &label, args.events)?;
    }
    Ok(())
}

fn print_step(session: &mut Session, label: &str, events: bool) -> anyhow::Result<()> {
    let snapshot = serde_json::to_string(&session.snapshot())?;
    println!("{label}: {snapshot}");
    let drained = session.drain_events();
    if events && !drained.is_empty() {
        println!("  events: {}", serde_json::to_string(&drained)?);
    }
    Ok(())
}

fn cmd_apply_rotation(args: ApplyRotationArgs) -> anyhow::Result<()> {
    let report = apply_rotation_file(&args.patch, &args.pages)
        .with_context(|| format!("apply '{}'", args.patch.display()))?;
    for (id, rot) in &report.updated {
        println!("{id}: rot = {rot}");
    }
    for id in &report.unknown {
        eprintln!("warning: {id} not in dataset");
    }
    println!("{} page(s) updated", report.updated.len());
    Ok(())
}

fn mib(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

fn cmd_thumbnails(args: ThumbnailArgs) -> anyhow::Result<()> {
    let opts = ThumbnailOptions {
        width: args.width,
        jpeg_quality: args.quality.clamp(1, 100),
    };
    let report = generate_all(&args.in_dir, &args.out, opts)
        .with_context(|| format!("thumbnails for '{}'", args.in_dir.display()))?;

    let total = report.generated.len() + report.failed.len();
    for (i, o) in report.generated.iter().enumerate() {
        println!(
            "[{}/{total}] {} ({:.2}MB -> {:.2}MB, {:.1}% smaller)",
            i + 1,
            o.source.display(),
            mib(o.original_bytes),
            mib(o.thumbnail_bytes),
            o.reduction_pct()
        );
    }
    for (source, err) in &report.failed {
        eprintln!("failed: {}: {err}", source.display());
    }
    println!("generated: {}", report.generated.len());
    println!("failed: {}", report.failed.len());
    println!("originals: {:.2} MB", mib(report.total_original_bytes()));
    println!("thumbnails: {:.2} MB", mib(report.total_thumbnail_bytes()));
    println!("saved: {:.2} MB", report.saved_bytes() as f64 / 1024.0 / 1024.0);
    println!("average reduction: {:.1}%", report.average_reduction_pct());
    println!("output: {}", args.out.display());
    Ok(())
}
