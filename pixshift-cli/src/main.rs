use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use pixshift::config::AppConfig;
use pixshift::orchestrator::{spawn_batch, CancelToken, ProgressEvent};
use pixshift::{
    BatchPolicy, ConversionRequest, JobState, OutputFormat, ResizeMode, SizeSpec, SourceImage,
    Unit,
};

#[derive(Parser)]
#[command(name = "pixshift")]
#[command(about = "Convert images between formats and sizes", long_about = None)]
#[command(version)]
struct Args {
    /// Input image: a local file path or an http(s) URL
    #[arg(value_name = "INPUT", required_unless_present = "clipboard")]
    input: Option<String>,

    /// Read the input image from the system clipboard instead
    #[arg(long, default_value_t)]
    clipboard: bool,

    /// Output directory (last used directory, then Downloads, if unset)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Png)]
    format: OutputFormatArg,

    /// Target size as WIDTHxHEIGHT in the chosen unit; repeatable
    #[arg(short, long = "size", value_name = "WxH")]
    sizes: Vec<String>,

    /// Also emit the image at its original dimensions
    #[arg(long, default_value_t)]
    original: bool,

    /// Unit for --size values
    #[arg(short, long, value_enum, default_value_t = UnitArg::Px)]
    unit: UnitArg,

    /// Encoder quality (1-100)
    #[arg(long, value_name = "QUALITY", default_value_t = 90)]
    quality: u8,

    /// DPI for unit conversion and embedded metadata (72-600)
    #[arg(long, value_name = "DPI", default_value_t = 300)]
    dpi: u16,

    /// How to reconcile aspect ratio with the target box
    #[arg(short = 'm', long, value_enum, default_value_t = ResizeModeArg::Stretch)]
    mode: ResizeModeArg,

    /// Report resulting sizes without writing to the destination
    #[arg(long, default_value_t)]
    preview: bool,

    /// Keep converting remaining sizes when one fails
    #[arg(long, default_value_t)]
    keep_going: bool,

    /// Verbose output
    #[arg(short, long, default_value_t)]
    verbose: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, default_value_t)]
    quiet: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormatArg {
    Png,
    Jpeg,
    Jpg,
    Webp,
    Ico,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Png => OutputFormat::Png,
            OutputFormatArg::Jpeg => OutputFormat::Jpeg,
            OutputFormatArg::Jpg => OutputFormat::Jpg,
            OutputFormatArg::Webp => OutputFormat::WebP,
            OutputFormatArg::Ico => OutputFormat::Ico,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum UnitArg {
    Px,
    Cm,
    Inch,
}

impl From<UnitArg> for Unit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::Px => Unit::Pixel,
            UnitArg::Cm => Unit::Cm,
            UnitArg::Inch => Unit::Inch,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ResizeModeArg {
    Stretch,
    Crop,
    Fit,
}

impl From<ResizeModeArg> for ResizeMode {
    fn from(arg: ResizeModeArg) -> Self {
        match arg {
            ResizeModeArg::Stretch => ResizeMode::Stretch,
            ResizeModeArg::Crop => ResizeMode::Crop,
            ResizeModeArg::Fit => ResizeMode::Fit,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose, args.quiet);

    let config = AppConfig::load().unwrap_or_default();

    let source = acquire_source(&args)?;
    log::info!(
        "loaded `{}` ({}x{})",
        source.stem(),
        source.dimensions().0,
        source.dimensions().1
    );

    let sizes = collect_sizes(&args)?;
    let mut request = ConversionRequest::new(source, args.format.into(), sizes);
    request.quality = args.quality;
    request.dpi = args.dpi;
    request.resize_mode = args.mode.into();
    request.policy = if args.keep_going {
        BatchPolicy::ContinueOnError
    } else {
        BatchPolicy::FailFast
    };

    if args.preview {
        return run_preview(&request);
    }

    let output_dir = args
        .output_dir
        .clone()
        .or(config.output_dir)
        .unwrap_or_else(pixshift::output::default_output_dir);

    let outcome = run_conversion(request, output_dir.clone())?;

    let updated = AppConfig {
        output_dir: Some(output_dir),
        format: args.format.into(),
        quality: args.quality,
        dpi: args.dpi,
        resize_mode: args.mode.into(),
    };
    if updated.save().is_none() {
        log::debug!("could not persist config defaults");
    }

    match outcome {
        JobState::Completed => Ok(()),
        JobState::Cancelled => anyhow::bail!("conversion cancelled"),
        _ => anyhow::bail!("conversion failed"),
    }
}

fn acquire_source(args: &Args) -> Result<SourceImage> {
    if args.clipboard {
        return SourceImage::from_clipboard().context("Failed to read clipboard image");
    }

    let input = args.input.as_deref().expect("clap enforces INPUT");
    if input.starts_with("http://") || input.starts_with("https://") {
        SourceImage::from_url(input).with_context(|| format!("Failed to download `{input}`"))
    } else {
        SourceImage::from_path(Path::new(input))
            .with_context(|| format!("Failed to load `{input}`"))
    }
}

fn collect_sizes(args: &Args) -> Result<Vec<SizeSpec>> {
    let unit: Unit = args.unit.into();
    let mut sizes = Vec::with_capacity(args.sizes.len() + 1);

    for raw in &args.sizes {
        sizes.push(parse_size(raw, unit)?);
    }
    if args.original {
        sizes.push(SizeSpec::Original);
    }

    if sizes.is_empty() {
        anyhow::bail!("No target sizes given; pass --size WxH and/or --original");
    }
    Ok(sizes)
}

fn parse_size(raw: &str, unit: Unit) -> Result<SizeSpec> {
    let (width, height) = raw
        .split_once(['x', 'X'])
        .with_context(|| format!("Invalid size `{raw}`, expected WIDTHxHEIGHT"))?;

    let width: f64 = width
        .trim()
        .parse()
        .with_context(|| format!("Invalid width in `{raw}`"))?;
    let height: f64 = height
        .trim()
        .parse()
        .with_context(|| format!("Invalid height in `{raw}`"))?;

    Ok(SizeSpec::Custom {
        width,
        height,
        unit,
    })
}

fn run_preview(request: &ConversionRequest) -> Result<()> {
    let preview = pixshift::preview::preview(request).context("Preview failed")?;

    for (report, _) in preview.items() {
        let (width, height) = report.dimensions;
        let notes = if report.notes.is_empty() {
            String::new()
        } else {
            format!(" ({})", report.notes.join(", "))
        };
        log::info!(
            "{}: {width}x{height}, {} bytes{notes}",
            report.file_name,
            report.encoded_len
        );
    }
    for (index, reason) in &preview.outcome.skipped {
        log::warn!("size #{index} skipped: {reason}");
    }
    for (index, error) in &preview.outcome.failures {
        log::error!("size #{index} failed: {error}");
    }
    Ok(())
}

fn run_conversion(request: ConversionRequest, output_dir: PathBuf) -> Result<JobState> {
    let (event_tx, event_rx) = mpsc::channel();
    let token = CancelToken::new();
    let handle = spawn_batch(request, output_dir, token, event_tx);

    let mut state = JobState::default();
    for event in event_rx {
        match event {
            ProgressEvent::BatchStarted { total } => {
                log::info!("converting {total} sizes");
            }
            ProgressEvent::ItemStarted {
                index,
                total,
                label,
            } => {
                log::info!("[{}/{total}] processing {label}...", index + 1);
            }
            ProgressEvent::ItemCompleted { path, report, .. } => {
                let notes = if report.notes.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", report.notes.join(", "))
                };
                log::info!("saved {}{notes}", path.display());
            }
            ProgressEvent::ItemSkipped { index, reason } => {
                log::warn!("size #{} skipped: {reason}", index + 1);
            }
            ProgressEvent::ItemFailed { index, error } => {
                log::error!("size #{} failed: {error}", index + 1);
            }
            ProgressEvent::BatchFinished { state: finished } => {
                log::info!("done: {finished:?}");
                state = finished;
            }
        }
    }

    handle
        .join()
        .map_err(|_| anyhow::anyhow!("conversion worker panicked"))?
        .context("Conversion failed")?;
    Ok(state)
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}
