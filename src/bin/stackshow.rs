use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "stackshow", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in scenes.
    List,
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Dump the compiled timeline as JSON.
    Dump(DumpArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Scene name (see `stackshow list`).
    #[arg(long)]
    scene: String,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Frames per second used to compile the timeline.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Directory holding the JetBrains Mono font files.
    #[arg(long, default_value = "assets/fonts")]
    font_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Scene name (see `stackshow list`).
    #[arg(long)]
    scene: String,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Overwrite output if it already exists.
    #[arg(long, default_value_t = true)]
    overwrite: bool,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Directory holding the JetBrains Mono font files.
    #[arg(long, default_value = "assets/fonts")]
    font_dir: PathBuf,

    /// Write PNG frames into this directory instead of encoding an MP4.
    #[arg(long)]
    png_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct DumpArgs {
    /// Scene name (see `stackshow list`).
    #[arg(long)]
    scene: String,

    /// Output JSON path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Frames per second used to compile the timeline.
    #[arg(long, default_value_t = 30)]
    fps: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::List => cmd_list(),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Dump(args) => cmd_dump(args),
    }
}

fn compile_scene(name: &str, fps: u32) -> anyhow::Result<stackshow::Timeline> {
    let entry = stackshow::scenes::by_name(name)
        .with_context(|| format!("unknown scene '{name}' (try `stackshow list`)"))?;
    let scene = (entry.build)()?;
    let fps = stackshow::Fps::new(fps, 1)?;
    Ok(stackshow::compile(&scene, fps)?)
}

fn make_renderer(font_dir: &Path) -> anyhow::Result<stackshow::CpuRenderer> {
    Ok(stackshow::CpuRenderer::new(stackshow::CpuRendererOpts {
        fonts: stackshow::FontSpec::in_dir(font_dir),
    })?)
}

fn cmd_list() -> anyhow::Result<()> {
    for entry in stackshow::scenes::all() {
        println!("{:<16} {}", entry.name, entry.summary);
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let timeline = compile_scene(&args.scene, args.fps)?;
    let mut renderer = make_renderer(&args.font_dir)?;

    let frame = stackshow::render_frame(
        &mut renderer,
        &timeline,
        stackshow::FrameIndex(args.frame),
    )?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let timeline = compile_scene(&args.scene, args.fps)?;
    let mut renderer = make_renderer(&args.font_dir)?;
    let range = timeline.full_range();

    if let Some(dir) = args.png_dir {
        let mut sink = stackshow::PngDirSink::new(&dir);
        let stats = stackshow::render_range(&mut renderer, &timeline, range, &mut sink)?;
        eprintln!("wrote {} frames to {}", stats.frames_rendered, dir.display());
        return Ok(());
    }

    let bg = timeline.background;
    let mut sink = stackshow::FfmpegSink::new(stackshow::FfmpegSinkOpts {
        out_path: args.out.clone(),
        overwrite: args.overwrite,
        bg_rgba: bg.to_array(),
    });
    let _stats = stackshow::render_range(&mut renderer, &timeline, range, &mut sink)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_dump(args: DumpArgs) -> anyhow::Result<()> {
    let timeline = compile_scene(&args.scene, args.fps)?;
    let json = serde_json::to_string_pretty(&timeline).context("serialize timeline JSON")?;

    match args.out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(&path, json)
                .with_context(|| format!("write json '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
