use futures::executor::block_on;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use storymap::render::{
    AssetSource, CommandRenderer, DiagramRenderer, FsSource, HeadlessError, PrerenderedRenderer,
    RenderController, RenderError, RenderOutcome, StaticHost, render_story,
};
use storymap::visuals::{init_visuals, inject_visuals};
use storymap::{MetadataMap, SiteConfig, enrich_svg};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "STORYMAP_LOG";
const DEFAULT_PAGE_PATH: &str = "/index.html";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Core(storymap::Error),
    Headless(HeadlessError),
    Renderer(RenderError),
    Visuals(storymap::visuals::Error),
    Json(serde_json::Error),
    MissingInput(String),
    #[cfg(feature = "http")]
    BaseUrl(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
            CliError::Headless(err) => write!(f, "{err}"),
            CliError::Renderer(err) => write!(f, "{err}"),
            CliError::Visuals(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::MissingInput(path) => write!(f, "could not fetch {path}"),
            #[cfg(feature = "http")]
            CliError::BaseUrl(msg) => write!(f, "invalid --base-url: {msg}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<storymap::Error> for CliError {
    fn from(value: storymap::Error) -> Self {
        Self::Core(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        Self::Headless(value)
    }
}

impl From<RenderError> for CliError {
    fn from(value: RenderError) -> Self {
        Self::Renderer(value)
    }
}

impl From<storymap::visuals::Error> for CliError {
    fn from(value: storymap::visuals::Error) -> Self {
        Self::Visuals(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Render,
    Reconcile,
    Visuals,
    Download,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    site: Option<String>,
    #[cfg(feature = "http")]
    base_url: Option<String>,
    config: Option<String>,
    overrides: Vec<(String, Value)>,
    svg: Option<String>,
    source: Option<String>,
    map: Option<String>,
    page: Option<String>,
    out: Option<String>,
    payload: Option<String>,
    annotated: Option<String>,
    pretty: bool,
}

fn usage() -> &'static str {
    "storymap-cli\n\
\n\
USAGE:\n\
  storymap-cli [render] [--site <dir>] [--config <file>] [--set <key>=<value>]... [--svg <file>] [--source <file>|-] [--out <file>] [--payload <file>]\n\
  storymap-cli reconcile --svg <file> [--map <file>] [--config <file>] [--annotated <file>] [--pretty]\n\
  storymap-cli visuals [--site <dir>] [--config <file>] [--page <file>] [--out <file>]\n\
  storymap-cli download [--site <dir>] [--config <file>] [--source <file>|-] [--out <dir-or-file>]\n\
\n\
NOTES:\n\
  - --site defaults to the current directory; site paths such as /assets/data/story.mmd resolve under it.\n\
  - With the `http` feature, --base-url <url> fetches site paths over HTTP instead of --site.\n\
  - render runs the engine command from the config (engine.command) unless --svg gives a prerendered SVG.\n\
  - render writes the page fragment even when rendering fails; the fragment then shows the error.\n\
  - --set values are parsed as JSON when possible and used as strings otherwise.\n\
  - Set STORYMAP_LOG (e.g. STORYMAP_LOG=debug) to control log output on stderr.\n\
"
}

fn parse_override(raw: &str) -> Result<(String, Value), CliError> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(CliError::Usage(usage()));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::Usage(usage()));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        let mut value = || it.next().cloned().ok_or(CliError::Usage(usage()));
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "render" => args.command = Command::Render,
            "reconcile" => args.command = Command::Reconcile,
            "visuals" => args.command = Command::Visuals,
            "download" => args.command = Command::Download,
            "--pretty" => args.pretty = true,
            "--site" => args.site = Some(value()?),
            #[cfg(feature = "http")]
            "--base-url" => args.base_url = Some(value()?),
            "--config" => args.config = Some(value()?),
            "--set" => {
                let raw = value()?;
                args.overrides.push(parse_override(&raw)?);
            }
            "--svg" => args.svg = Some(value()?),
            "--source" => args.source = Some(value()?),
            "--map" => args.map = Some(value()?),
            "--page" => args.page = Some(value()?),
            "--out" => args.out = Some(value()?),
            "--payload" => args.payload = Some(value()?),
            "--annotated" => args.annotated = Some(value()?),
            _ => return Err(CliError::Usage(usage())),
        }
    }

    if args.command == Command::Reconcile && args.svg.is_none() {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<SiteConfig, CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => SiteConfig::load(Path::new(path))?,
        None => SiteConfig::defaults(),
    };
    for (key, value) in &args.overrides {
        config.apply_override(key, value.clone());
    }
    Ok(config)
}

fn read_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read_to_string(input)?)
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None | Some("-") => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn build_renderer(args: &Args, config: &SiteConfig) -> Result<Box<dyn DiagramRenderer>, CliError> {
    match args.svg.as_deref() {
        Some(path) => Ok(Box::new(PrerenderedRenderer::new(read_input(path)?))),
        None => Ok(Box::new(CommandRenderer::from_site_config(config)?)),
    }
}

async fn run_render<S: AssetSource>(
    args: &Args,
    config: SiteConfig,
    source: &S,
) -> Result<(), CliError> {
    let renderer = build_renderer(args, &config)?;
    let source_override = args.source.as_deref().map(read_input).transpose()?;
    let page = render_story(config, source, renderer, source_override).await?;

    if let Some(warning) = &page.fetch_warning {
        eprintln!("{warning}");
    }
    if let RenderOutcome::Failed(failure) = &page.outcome {
        eprintln!("Render error: {}", failure.message);
    }
    write_text(&page.fragment, args.out.as_deref())?;
    if let Some(path) = args.payload.as_deref() {
        std::fs::write(path, &page.payload_json)?;
    }
    Ok(())
}

async fn run_visuals<S: AssetSource>(
    args: &Args,
    config: SiteConfig,
    source: &S,
) -> Result<(), CliError> {
    let page = match args.page.as_deref() {
        Some(path) => read_input(path)?,
        None => source
            .fetch_text(DEFAULT_PAGE_PATH)
            .await
            .map_err(storymap::visuals::Error::from)?
            .ok_or_else(|| CliError::MissingInput(DEFAULT_PAGE_PATH.to_string()))?,
    };

    let out = match init_visuals(source, &config).await {
        Some(fragment) => inject_visuals(&page, &fragment)?.unwrap_or(page),
        None => page,
    };
    write_text(&out, args.out.as_deref())
}

async fn run_download<S: AssetSource>(
    args: &Args,
    config: SiteConfig,
    source: &S,
) -> Result<(), CliError> {
    let mut ctl = RenderController::new(
        config,
        source,
        PrerenderedRenderer::new(String::new()),
        StaticHost::new(),
    );
    ctl.fetch_initial().await;
    if !ctl.error_text().is_empty() {
        eprintln!("{}", ctl.error_text());
    }
    if let Some(path) = args.source.as_deref() {
        ctl.set_source(read_input(path)?);
    }

    let artifact = ctl.download();
    let target = match args.out.as_deref() {
        None => PathBuf::from(&artifact.file_name),
        Some(out) if Path::new(out).is_dir() => Path::new(out).join(&artifact.file_name),
        Some(out) => PathBuf::from(out),
    };
    std::fs::write(&target, &artifact.bytes)?;
    println!("{}", target.display());
    Ok(())
}

fn run_reconcile(args: &Args) -> Result<(), CliError> {
    let config = load_config(args)?;
    let svg_path = args.svg.as_deref().ok_or(CliError::Usage(usage()))?;
    let svg = read_input(svg_path)?;
    let map = match args.map.as_deref() {
        Some(path) => MetadataMap::from_json_str(&read_input(path)?)?,
        None => MetadataMap::empty(),
    };

    let enriched = enrich_svg(&svg, &map, config.screenshot_dir())?;
    if let Some(path) = args.annotated.as_deref() {
        std::fs::write(path, &enriched.svg)?;
    }
    let stdout = std::io::stdout().lock();
    if args.pretty {
        serde_json::to_writer_pretty(stdout, &enriched.reconciliation)?;
    } else {
        serde_json::to_writer(stdout, &enriched.reconciliation)?;
    }
    Ok(())
}

async fn run_with_source<S: AssetSource>(args: &Args, source: &S) -> Result<(), CliError> {
    let config = load_config(args)?;
    match args.command {
        Command::Render => run_render(args, config, source).await,
        Command::Visuals => run_visuals(args, config, source).await,
        Command::Download => run_download(args, config, source).await,
        Command::Reconcile => run_reconcile(args),
    }
}

fn run(args: Args) -> Result<(), CliError> {
    tracing::debug!(command = ?args.command, "storymap-cli");
    if args.command == Command::Reconcile {
        return run_reconcile(&args);
    }

    #[cfg(feature = "http")]
    {
        if let Some(base) = args.base_url.as_deref() {
            let source = storymap::render::HttpSource::parse(base)
                .map_err(|err| CliError::BaseUrl(err.to_string()))?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            return runtime.block_on(run_with_source(&args, &source));
        }
    }

    let site = FsSource::new(args.site.as_deref().unwrap_or("."));
    block_on(run_with_source(&args, &site))
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_tracing();
    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
