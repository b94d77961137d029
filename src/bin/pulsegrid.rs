use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use pulsegrid::clock::meter::{Boundary, eighth_beat, position};

#[derive(Parser, Debug)]
#[command(name = "pulsegrid", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the grid layout fitted to a viewport.
    Layout(LayoutArgs),
    /// Print the musical position at a point in time.
    Position(PositionArgs),
    /// List the events of a sheet in timeline order.
    Timeline(TimelineArgs),
    /// Simulate a session up to a point in time and write the grid as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    #[arg(long)]
    width: f64,

    #[arg(long)]
    height: f64,

    /// Coarse cells to aim for.
    #[arg(long, default_value_t = pulsegrid::layout::grid::DEFAULT_TARGET_CELLS)]
    target: u32,
}

#[derive(Parser, Debug)]
struct PositionArgs {
    #[arg(long, default_value_t = 120)]
    bpm: u32,

    #[arg(long, default_value_t = 4)]
    beats_per_bar: u32,

    #[arg(long, default_value_t = 4)]
    sub_beats: u32,

    /// Elapsed seconds since the clock started.
    #[arg(long)]
    at: f64,
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    /// Sheet JSON.
    #[arg(long)]
    sheet: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Sheet JSON. Without one the session runs clock-only.
    #[arg(long)]
    sheet: Option<PathBuf>,

    /// Elapsed seconds to render.
    #[arg(long)]
    at: f64,

    #[arg(long, default_value_t = 640.0)]
    width: f64,

    #[arg(long, default_value_t = 640.0)]
    height: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Simulated frames per second leading up to `--at`.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Session options JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    palette: Option<PaletteChoice>,

    #[arg(long)]
    seed: Option<u64>,

    /// Output pixels per viewport pixel.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PaletteChoice {
    White,
    Random,
}

impl From<PaletteChoice> for pulsegrid::PaletteMode {
    fn from(choice: PaletteChoice) -> Self {
        match choice {
            PaletteChoice::White => Self::White,
            PaletteChoice::Random => Self::Random,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Layout(args) => cmd_layout(args),
        Command::Position(args) => cmd_position(args),
        Command::Timeline(args) => cmd_timeline(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    if args.target == 0 {
        anyhow::bail!("--target must be > 0");
    }
    let viewport = pulsegrid::Viewport::new(args.width, args.height).clamped();
    let layout = pulsegrid::compute_grid_layout(viewport, args.target);
    let out = serde_json::json!({
        "cols": layout.cols,
        "rows": layout.rows,
        "cellPx": layout.cell_px,
        "fineCols": layout.fine_cols(),
        "fineRows": layout.fine_rows(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_position(args: PositionArgs) -> anyhow::Result<()> {
    let meter = pulsegrid::MeterConfig::new(args.bpm, args.beats_per_bar, args.sub_beats)
        .context("meter")?;
    let pos = position(args.at, &meter);
    let boundary = Boundary::of(&pos, &meter);
    let out = serde_json::json!({
        "bar": pos.bar,
        "beat": pos.beat,
        "subBeat": pos.sub_beat,
        "eighth": eighth_beat(args.at, &meter),
        "boundary": format!("{boundary:?}"),
        "pulseMs": boundary.pulse_duration_ms(&meter),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let sheet = read_sheet(&args.sheet)?;
    let meter = sheet.meter();
    println!(
        "{} bpm, {} beats/bar, {} sub-beats/beat, {} bars, {} events",
        meter.meter.bpm,
        meter.meter.beats_per_bar,
        meter.meter.sub_beats_per_beat,
        meter.bars,
        sheet.len()
    );
    let mut events: Vec<_> = sheet.events().iter().collect();
    events.sort_by_key(|e| e.at);
    for e in events {
        println!("{:>4}.{:<3} {:<10} {}", e.at.bar, e.at.sub_beat, e.id, e.source);
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    if !(args.at.is_finite() && args.at >= 0.0) {
        anyhow::bail!("--at must be a non-negative number of seconds");
    }
    if args.fps == 0 {
        anyhow::bail!("--fps must be > 0");
    }

    let mut opts = match &args.config {
        Some(path) => read_opts(path)?,
        None => pulsegrid::BeatSessionOpts::default(),
    };
    if let Some(seed) = args.seed {
        opts.seed = Some(seed);
    }
    if let Some(palette) = args.palette {
        opts.palette = palette.into();
    }
    let palette = opts.palette;

    let mut session = pulsegrid::BeatSession::with_grid(opts);
    session.mount(pulsegrid::Viewport::new(args.width, args.height));
    if let Some(path) = &args.sheet {
        session.load_sheet(read_sheet(path)?);
    }
    session.start(pulsegrid::StartOpts {
        palette,
        start_at_secs: None,
    })?;

    let end_ms = args.at * 1000.0;
    let step_ms = 1000.0 / f64::from(args.fps);
    let mut fired = 0usize;
    let mut frames = 0u64;
    let mut now_ms = 0.0;
    while now_ms < end_ms {
        fired += session.frame(now_ms).fired.len();
        frames += 1;
        now_ms = step_ms * frames as f64;
    }
    let last = session.frame(end_ms);
    fired += last.fired.len();
    if let Some(state) = last.state {
        tracing::info!(
            bar = state.position.bar,
            beat = state.position.beat,
            sub_beat = state.position.sub_beat,
            frames = frames + 1,
            fired,
            "simulated"
        );
    }

    let raster = pulsegrid::RasterOpts {
        scale: args.scale,
        ..pulsegrid::RasterOpts::default()
    };
    let img = pulsegrid::rasterize(session.surface(), end_ms, &raster);

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        img.as_raw(),
        img.width(),
        img.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn read_sheet(path: &Path) -> anyhow::Result<pulsegrid::Sheet> {
    pulsegrid::load_sheet(path).with_context(|| format!("load sheet '{}'", path.display()))
}

fn read_opts(path: &Path) -> anyhow::Result<pulsegrid::BeatSessionOpts> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("open session config '{}'", path.display()))?;
    let opts = pulsegrid::BeatSessionOpts::from_json(&json)
        .with_context(|| format!("parse session config '{}'", path.display()))?;
    Ok(opts)
}
