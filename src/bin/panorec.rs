use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use panorec::{
    CaptureConfig, CaptureSession, CubeFace, CubeView, DerivedGeometry, EquirectBuffer,
    EquirectCompositor, FaceImage, FaceSet, FrameWriter, HostSignal, ImageFileWriter,
    ProceduralCamera, ProceduralScene, Quat, StitchParams, run_capture,
};

#[derive(Parser, Debug)]
#[command(name = "panorec", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record an equirectangular image sequence of the procedural scene.
    Capture(CaptureArgs),
    /// Print what a capture with this configuration would produce.
    Info(InfoArgs),
    /// Stitch six pre-rendered cube faces into one equirectangular image.
    Stitch(StitchArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    /// 4096 px wide.
    #[value(name = "4k")]
    FourK,
    /// 2048 px wide.
    #[value(name = "2k")]
    TwoK,
    /// 1024 px wide.
    #[value(name = "1k")]
    OneK,
}

impl Preset {
    fn width(self) -> u32 {
        match self {
            Self::FourK => 4096,
            Self::TwoK => 2048,
            Self::OneK => 1024,
        }
    }
}

#[derive(Parser, Debug)]
struct CaptureArgs {
    /// Capture configuration JSON.
    #[arg(long)]
    config: PathBuf,

    /// Procedural scene JSON (built-in scene when omitted).
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Directory relative output prefixes resolve against.
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Override the configured output width.
    #[arg(long, value_enum)]
    preset: Option<Preset>,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Capture configuration JSON.
    #[arg(long)]
    config: PathBuf,

    /// Directory relative output prefixes resolve against.
    #[arg(long, default_value = ".")]
    project_root: PathBuf,
}

#[derive(Parser, Debug)]
struct StitchArgs {
    /// Directory holding `px`, `nx`, `py`, `ny`, `pz` and `nz` face images.
    #[arg(long)]
    faces: PathBuf,

    /// Capture configuration JSON (format, output size, overlap and stitching options).
    #[arg(long)]
    config: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Capture(args) => cmd_capture(args),
        Command::Info(args) => cmd_info(args),
        Command::Stitch(args) => cmd_stitch(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> anyhow::Result<CaptureConfig> {
    let cfg = CaptureConfig::from_path(path)
        .with_context(|| format!("load config '{}'", path.display()))?;
    Ok(cfg.sanitized())
}

fn cmd_capture(args: CaptureArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(&args.config)?;
    if let Some(preset) = args.preset {
        cfg.width = preset.width();
    }
    let scene = match &args.scene {
        Some(path) => ProceduralScene::from_path(path)?,
        None => ProceduralScene::default(),
    };

    eprintln!("{}", cfg.summary(&args.project_root));

    let mut camera = ProceduralCamera::new(scene);
    let mut writer = ImageFileWriter::new();
    let mut session = CaptureSession::new(&args.project_root);
    let stats = run_capture(&mut session, &cfg, &mut camera, &mut writer, |cam, _, t| {
        cam.set_time(t);
        HostSignal::Continue
    })?;

    eprintln!(
        "wrote {} frame(s), skipped {}, waited {}",
        stats.frames_written, stats.frames_skipped, stats.frames_waited
    );
    Ok(())
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    println!("{}", cfg.summary(&args.project_root));
    Ok(())
}

fn cmd_stitch(args: StitchArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let ext = cfg.format.extension();

    let mut faces = Vec::with_capacity(6);
    for face in CubeFace::ALL {
        let path = args.faces.join(format!("{}.{ext}", face.name()));
        let img = image::open(&path).with_context(|| format!("read face '{}'", path.display()))?;
        faces.push(img.to_rgba32f());
    }
    let faces: [FaceImage; 6] = faces
        .try_into()
        .map_err(|_| anyhow::anyhow!("expected six faces"))?;
    let faces = FaceSet::from_faces(faces)?;

    let geom = DerivedGeometry::derive(&cfg);
    let mut out = EquirectBuffer::new(geom.width, geom.height, cfg.format)?;
    let view = CubeView {
        faces: &faces,
        to_cube: Quat::IDENTITY,
    };
    EquirectCompositor::new(StitchParams::from_config(&cfg, &geom)).composite(&[view], &mut out)?;

    ImageFileWriter::new().write_frame(&args.out, &out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
