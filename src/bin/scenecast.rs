use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scenecast::{PipelineConfig, RenderRequest, ScenePipeline};

#[derive(Parser, Debug)]
#[command(name = "scenecast", version)]
struct Cli {
    /// TOML config file; defaults apply to anything it omits.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the renderer output root.
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Statically check scene source without rendering it.
    Validate(ValidateArgs),
    /// Render scene source to video, optionally muxing narration audio.
    Render(RenderArgs),
    /// Mux narration audio into an existing video.
    Combine(CombineArgs),
    /// Delete artifacts older than the retention age.
    Sweep(SweepArgs),
    /// Report whether the external tools are reachable.
    Doctor,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Scene source file.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Scene source file.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Declared scene class to render when the source has several.
    #[arg(long)]
    scene: Option<String>,

    /// Narration audio to mux into the rendered video.
    #[arg(long)]
    audio: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct CombineArgs {
    /// Silent video, replaced in place.
    #[arg(long)]
    video: PathBuf,

    /// Narration audio.
    #[arg(long)]
    audio: PathBuf,
}

#[derive(Parser, Debug)]
struct SweepArgs {
    /// Maximum artifact age; defaults to the configured retention.
    #[arg(long)]
    max_age_hours: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref(), cli.output_dir)?;

    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Render(args) => cmd_render(cfg, args),
        Command::Combine(args) => cmd_combine(cfg, args),
        Command::Sweep(args) => cmd_sweep(cfg, args),
        Command::Doctor => cmd_doctor(&cfg),
    }
}

fn load_config(path: Option<&Path>, output_dir: Option<PathBuf>) -> anyhow::Result<PipelineConfig> {
    let mut cfg = match path {
        Some(p) => PipelineConfig::load(p)?,
        None => PipelineConfig::default(),
    };
    cfg.apply_env_overrides()?;
    if let Some(dir) = output_dir {
        cfg.output_dir = dir;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read scene source '{}'", path.display()))
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let source = read_source(&args.in_path)?;
    let report = scenecast::validate(&source);
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.is_valid {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_render(cfg: PipelineConfig, args: RenderArgs) -> anyhow::Result<()> {
    let source = read_source(&args.in_path)?;
    let mut request = RenderRequest::new(source);
    if let Some(scene) = args.scene {
        request = request.with_scene_name(scene);
    }

    let pipeline = ScenePipeline::new(cfg)?;
    let result = pipeline.render_narrated(&request, args.audio.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn cmd_combine(cfg: PipelineConfig, args: CombineArgs) -> anyhow::Result<()> {
    let pipeline = ScenePipeline::new(cfg)?;
    let out = pipeline.combine(&args.video, &args.audio);
    println!("{}", out.display());
    Ok(())
}

fn cmd_sweep(cfg: PipelineConfig, args: SweepArgs) -> anyhow::Result<()> {
    let hours = args.max_age_hours.unwrap_or(cfg.retention_max_age_hours);
    let pipeline = ScenePipeline::new(cfg)?;
    let report = pipeline.sweep(hours);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_doctor(cfg: &PipelineConfig) -> anyhow::Result<()> {
    let checks = [
        (cfg.renderer_bin.as_str(), "--version"),
        (cfg.ffmpeg_bin.as_str(), "-version"),
        (cfg.ffprobe_bin.as_str(), "-version"),
    ];
    let mut all_ok = true;
    for (program, flag) in checks {
        let ok = scenecast::is_on_path(program, flag);
        all_ok &= ok;
        eprintln!("  {program:<12} {}", if ok { "ok" } else { "not found" });
    }
    if !all_ok {
        anyhow::bail!("one or more external tools are unavailable");
    }
    Ok(())
}
