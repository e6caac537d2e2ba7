use std::{
    cell::RefCell,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "toothsketch", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON gesture script against a base image and write the exported PNG.
    Replay(ReplayArgs),
    /// Print the canvas layout computed for a container.
    Fit(FitArgs),
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Gesture script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Directory base-image references are resolved against. Defaults to the script's directory.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Engine configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write the resulting annotation store as JSON.
    #[arg(long)]
    store: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FitArgs {
    /// Base image natural width.
    #[arg(long)]
    image_width: u32,

    /// Base image natural height.
    #[arg(long)]
    image_height: u32,

    /// Container width (CSS pixels).
    #[arg(long)]
    container_width: f64,

    /// Container height (CSS pixels).
    #[arg(long)]
    container_height: f64,

    /// Host view profile.
    #[arg(long, value_enum, default_value_t = HostChoice::Dialog)]
    host: HostChoice,

    /// Device pixel ratio.
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HostChoice {
    Modal,
    Dialog,
}

impl From<HostChoice> for toothsketch::HostKind {
    fn from(c: HostChoice) -> Self {
        match c {
            HostChoice::Modal => Self::Modal,
            HostChoice::Dialog => Self::Dialog,
        }
    }
}

#[derive(serde::Deserialize, Debug)]
struct Script {
    key: toothsketch::EntityKey,
    base_image: String,
    #[serde(default)]
    persisted: Option<String>,
    #[serde(default)]
    host: toothsketch::HostKind,
    #[serde(default)]
    read_only: bool,
    container: toothsketch::ContainerBox,
    #[serde(default = "default_dpr")]
    device_pixel_ratio: f64,
    #[serde(default)]
    steps: Vec<Step>,
}

fn default_dpr() -> f64 {
    1.0
}

#[derive(serde::Deserialize, Debug)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Step {
    Pointer {
        phase: toothsketch::PointerPhase,
        event: toothsketch::PointerEvent,
    },
    Style {
        color: toothsketch::StrokeColor,
        thickness: u32,
    },
    Undo,
    Clear,
    Resize {
        container: toothsketch::ContainerBox,
        #[serde(default = "default_dpr")]
        device_pixel_ratio: f64,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Replay(args) => cmd_replay(args),
        Command::Fit(args) => cmd_fit(args),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("TOOTHSKETCH_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_script(path: &Path) -> anyhow::Result<Script> {
    let f = File::open(path).with_context(|| format!("open script '{}'", path.display()))?;
    let r = BufReader::new(f);
    let script: Script = serde_json::from_reader(r).with_context(|| "parse script JSON")?;
    Ok(script)
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let script = read_script(&args.script)?;
    let config = match &args.config {
        Some(p) => toothsketch::EngineConfig::from_path(p)?,
        None => toothsketch::EngineConfig::default(),
    };
    let assets_root = match &args.assets {
        Some(p) => p.clone(),
        None => args
            .script
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
    };

    let mut engine =
        toothsketch::AnnotationEngine::new(config, toothsketch::FsImageSource::new(assets_root))?;
    let mut req = toothsketch::SessionRequest::new(script.key.clone(), script.base_image)
        .with_host(script.host)
        .read_only(script.read_only);
    if let Some(stored) = script.persisted {
        req = req.with_persisted(stored);
    }
    let handle = engine.open(req);

    let store = Rc::new(RefCell::new(toothsketch::AnnotationStore::new()));
    engine.add_sink(handle, Rc::clone(&store))?;
    engine.mount(handle, script.container, script.device_pixel_ratio)?;

    for (i, step) in script.steps.into_iter().enumerate() {
        let res = match step {
            Step::Pointer { phase, event } => engine.pointer(handle, phase, &event),
            Step::Style { color, thickness } => {
                engine.set_style(handle, toothsketch::StrokeStyle::new(color, thickness))
            }
            Step::Undo => engine.undo(handle).map(|_| ()),
            Step::Clear => engine.clear(handle),
            Step::Resize {
                container,
                device_pixel_ratio,
            } => engine.resize(handle, container, device_pixel_ratio),
        };
        res.with_context(|| format!("script step {i}"))?;
    }

    let exported = engine
        .session(handle)
        .context("session vanished during replay")?
        .export()?;
    engine.close_session(handle)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, exported.to_bytes()?)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());

    if let Some(path) = &args.store {
        let json = store.borrow().to_json_string()?;
        std::fs::write(path, json)
            .with_context(|| format!("write store '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_fit(args: FitArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.image_width > 0 && args.image_height > 0,
        "image size must be non-zero"
    );
    let config = toothsketch::EngineConfig::default();
    let profile = config.profile(args.host.into());
    let aspect = f64::from(args.image_width) / f64::from(args.image_height);
    let (aw, ah) =
        toothsketch::ContainerBox::new(args.container_width, args.container_height)
            .available(profile.padding);
    let logical = toothsketch::fit_to_container(aspect, aw, ah, profile.max_size)
        .unwrap_or(profile.fallback_size);
    let physical = toothsketch::PixelSize::from_logical(logical, args.dpr);

    let out = serde_json::json!({
        "logical": logical,
        "physical": physical,
        "aspect_ratio": aspect,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
