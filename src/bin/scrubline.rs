use std::{fs, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "scrubline", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and validate a scene JSON file.
    Validate(ValidateArgs),
    /// Simulate a scroll pass over a scene and write the rendered canvas as
    /// PNG frames.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for PNG frames.
    #[arg(long)]
    out: PathBuf,

    /// Number of scroll steps from progress 0 to 1.
    #[arg(long, default_value_t = 10)]
    steps: u32,

    /// Viewport width in pixels.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Total scrollable distance driven through the tracker, in pixels.
    #[arg(long, default_value_t = 3240.0)]
    scroll_len: f64,

    /// Print the resolved section styles at each step as JSON lines.
    #[arg(long)]
    dump_styles: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_scene(path: &PathBuf) -> anyhow::Result<scrubline::SceneSpec> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("open scene '{}'", path.display()))?;
    let spec = scrubline::SceneSpec::from_json(&json)
        .with_context(|| format!("validate scene '{}'", path.display()))?;
    Ok(spec)
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let spec = read_scene(&args.in_path)?;
    eprintln!(
        "ok: {} frames, {} sections",
        spec.sequence.frame_count,
        spec.sections.len()
    );
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let spec = read_scene(&args.in_path)?;
    let viewport = scrubline::Viewport::new(args.width, args.height);
    let range = scrubline::ScrollRange::new(0.0, args.scroll_len.max(1.0))?;
    let mut scene = scrubline::ScrollScene::new(&spec, range, viewport)?;

    let assets_root = args
        .in_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut fetcher = scrubline::FsFetcher::new(assets_root);
    scene.preload(&mut fetcher);

    fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    let steps = args.steps.max(1);
    for step in 0..=steps {
        let offset = args.scroll_len * f64::from(step) / f64::from(steps);
        scene.on_scroll(offset);
        // Tick at 60fps until the spring settles at this scroll position.
        let mut ticks = 0u32;
        while scene.tick(1.0 / 60.0) {
            ticks += 1;
            if ticks > 6_000 {
                anyhow::bail!("spring did not settle at step {step}");
            }
        }

        if args.dump_styles {
            let line = serde_json::json!({
                "step": step,
                "progress": scene.smoothed(),
                "styles": scene.styles(),
            });
            println!("{line}");
        }

        let out_path = args.out.join(format!("step_{step:03}.png"));
        let player = scene.player();
        let surface = player.surface();
        image::save_buffer_with_format(
            &out_path,
            surface.pixels(),
            surface.width(),
            surface.height(),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", out_path.display()))?;
    }

    eprintln!("wrote {} frames to {}", steps + 1, args.out.display());
    Ok(())
}
