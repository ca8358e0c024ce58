use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use memeforge::{
    Anchor, AssetReference, DEFAULT_EXPORT_NAME, DEFAULT_LOAD_TIMEOUT, DEFAULT_UPLOAD_NAME,
    EngineOpts, EngineState, HttpAssetLoader, MemeEngine, PersistenceClient, SourceAsset, StaticCredentials,
};

#[derive(Parser, Debug)]
#[command(name = "memeforge", version, about = "Compose captioned images")]
struct Cli {
    /// Engine options JSON (bounds, scale, font, api url).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the preset templates.
    Templates,
    /// Compose a meme and write it as PNG.
    Render(RenderArgs),
    /// Compose a meme and save it to the backend.
    Save(SaveArgs),
    /// List the compositions saved by the current user.
    List(RemoteArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Preset template id (see `templates`).
    #[arg(long, conflicts_with = "image", required_unless_present = "image")]
    template: Option<u32>,

    /// Local image file, http(s) URL or data URL.
    #[arg(long)]
    image: Option<String>,

    /// Top caption.
    #[arg(long, default_value = "")]
    top: String,

    /// Bottom caption.
    #[arg(long, default_value = "")]
    bottom: String,

    /// Device scale factor for the backing raster.
    #[arg(long)]
    scale: Option<f64>,

    /// TrueType/OpenType font used for captions.
    #[arg(long, env = "MEMEFORGE_FONT")]
    font: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output PNG path.
    #[arg(long, default_value = DEFAULT_EXPORT_NAME)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RemoteArgs {
    /// Bearer token for the backend.
    #[arg(long, env = "MEMEFORGE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Backend base URL.
    #[arg(long)]
    api_url: Option<String>,
}

#[derive(Args, Debug)]
struct SaveArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    remote: RemoteArgs,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let opts = load_opts(cli.config.as_deref())?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("start tokio runtime")?;

    match cli.cmd {
        Command::Templates => {
            for t in memeforge::template_presets() {
                println!("{}\t{}\t{}", t.id, t.name, t.url);
            }
            Ok(())
        }
        Command::Render(args) => rt.block_on(cmd_render(opts, args)),
        Command::Save(args) => rt.block_on(cmd_save(opts, args)),
        Command::List(args) => rt.block_on(cmd_list(opts, args)),
    }
}

fn load_opts(config: Option<&Path>) -> anyhow::Result<EngineOpts> {
    let opts = match config {
        Some(path) => EngineOpts::from_path(path)?,
        None => EngineOpts::default(),
    };
    Ok(opts.with_env_overrides())
}

fn resolve_source(args: &SourceArgs) -> anyhow::Result<SourceAsset> {
    if let Some(id) = args.template {
        return Ok(memeforge::template_asset(id)?);
    }
    let image = args
        .image
        .as_deref()
        .context("either --template or --image is required")?;

    let path = Path::new(image);
    if path.is_file() {
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Ok(SourceAsset::upload(&name, bytes)?);
    }
    Ok(SourceAsset::custom(
        DEFAULT_UPLOAD_NAME,
        AssetReference::parse(image)?,
    ))
}

/// Run a session to a settled, captioned frame.
async fn compose(mut opts: EngineOpts, args: &SourceArgs) -> anyhow::Result<MemeEngine> {
    if let Some(font) = &args.font {
        opts = opts.with_font_path(font);
    }
    if let Some(scale) = args.scale {
        opts = opts.with_device_scale(scale);
    }
    let asset = resolve_source(args)?;

    let loader = HttpAssetLoader::with_timeout(DEFAULT_LOAD_TIMEOUT)?;
    let engine = MemeEngine::spawn(&opts, Arc::new(loader))?;
    engine.select(asset)?;
    engine.set_caption(Anchor::Top, args.top.as_str())?;
    engine.set_caption(Anchor::Bottom, args.bottom.as_str())?;

    let snapshot = engine.settled().await?;
    if snapshot.state != EngineState::Ready {
        let reason = snapshot
            .fault
            .map(|f| f.message)
            .unwrap_or_else(|| format!("engine is {}", snapshot.state));
        anyhow::bail!("composition failed: {reason}");
    }
    if let Some(fault) = snapshot.fault {
        anyhow::bail!("composition failed: {}", fault.message);
    }
    Ok(engine)
}

async fn cmd_render(opts: EngineOpts, args: RenderArgs) -> anyhow::Result<()> {
    let engine = compose(opts, &args.source).await?;
    let png = engine.export().await?;
    std::fs::write(&args.out, &png)
        .with_context(|| format!("write '{}'", args.out.display()))?;
    engine.shutdown().await;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

async fn cmd_save(opts: EngineOpts, args: SaveArgs) -> anyhow::Result<()> {
    let client = make_client(&opts, &args.remote)?;
    let engine = compose(opts, &args.source).await?;
    let record = engine.save(&client).await?;
    engine.shutdown().await;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn cmd_list(opts: EngineOpts, args: RemoteArgs) -> anyhow::Result<()> {
    let client = make_client(&opts, &args)?;
    let records = client.list_mine().await?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

fn make_client(opts: &EngineOpts, args: &RemoteArgs) -> anyhow::Result<PersistenceClient> {
    let creds = match &args.token {
        Some(token) => StaticCredentials::new(token),
        None => StaticCredentials::anonymous(),
    };
    let base = args.api_url.as_deref().unwrap_or(&opts.api_base_url);
    Ok(PersistenceClient::new(base, Arc::new(creds))?)
}
