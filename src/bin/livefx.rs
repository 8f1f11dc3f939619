use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use livefx::{
    Catalog, EffectChain, EffectEntry, EffectKind, EffectRegistry, FfmpegSink, FfmpegSinkOpts,
    Fps, Frame, FrameSink, FrameSource, ParamDefault, ParamKind, ParamValue, Pipeline,
    PipelineOpts, PngSequenceSink, Preset, RecordingSink, SkinToneModel, StillSource,
    SyntheticSource, ToneSource,
};

#[derive(Parser, Debug)]
#[command(name = "livefx", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List effect kinds and their parameters.
    Effects {
        #[arg(long)]
        json: bool,
    },
    /// List the built-in presets.
    Presets {
        #[arg(long)]
        json: bool,
    },
    /// Run frames through an effect chain and record them.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Still image to use as the camera; a synthetic test pattern otherwise.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Output: a directory for a PNG sequence, or a `.mp4` file (requires `ffmpeg` on PATH).
    #[arg(long)]
    out: PathBuf,

    /// Built-in preset id.
    #[arg(long, conflicts_with = "preset_file")]
    preset: Option<String>,

    /// Preset JSON file.
    #[arg(long)]
    preset_file: Option<PathBuf>,

    /// Effect to append, as `id` or `id:key=value,key=value`. Repeatable.
    #[arg(long = "effect")]
    effects: Vec<String>,

    /// Number of frames to process.
    #[arg(long, default_value_t = 30)]
    frames: u64,

    /// Pipeline options JSON.
    #[arg(long)]
    opts: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    #[arg(long)]
    fps: Option<u32>,

    /// Background image for keying and replacement effects.
    #[arg(long)]
    background: Option<PathBuf>,

    /// Track faces with the skin-tone heuristic.
    #[arg(long)]
    detect: bool,

    /// Feed a sine tone of this frequency (Hz) to audio-reactive effects.
    #[arg(long)]
    tone: Option<f32>,

    /// Write the final chain configuration as a preset.
    #[arg(long)]
    save_preset: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Effects { json } => cmd_effects(json),
        Command::Presets { json } => cmd_presets(json),
        Command::Render(args) => cmd_render(args),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("LIVEFX_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_effects(json: bool) -> anyhow::Result<()> {
    if json {
        let kinds: Vec<serde_json::Value> = EffectKind::ALL
            .into_iter()
            .map(|kind| {
                let params: Vec<serde_json::Value> = kind
                    .param_specs()
                    .iter()
                    .map(|spec| {
                        serde_json::json!({
                            "key": spec.key,
                            "kind": describe_kind(spec.kind),
                            "default": default_value(spec.default),
                        })
                    })
                    .collect();
                serde_json::json!({
                    "id": kind.id(),
                    "name": kind.display_name(),
                    "category": kind.category(),
                    "params": params,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&kinds)?);
        return Ok(());
    }
    for kind in EffectKind::ALL {
        println!("{:<18} {:<9} {}", kind.id(), format!("{:?}", kind.category()).to_lowercase(), kind.display_name());
        for spec in kind.param_specs() {
            println!(
                "    {:<14} {:<28} default {}",
                spec.key,
                describe_kind(spec.kind),
                default_value(spec.default)
            );
        }
    }
    Ok(())
}

fn describe_kind(kind: ParamKind) -> String {
    match kind {
        ParamKind::Number { min, max, step } => format!("number {min}..{max} step {step}"),
        ParamKind::Bool => "bool".to_owned(),
        ParamKind::Color => "color".to_owned(),
        ParamKind::Choice(choices) => format!("one of {}", choices.join("|")),
        ParamKind::Text { max_len } => format!("text <= {max_len} bytes"),
    }
}

fn default_value(default: ParamDefault) -> serde_json::Value {
    serde_json::to_value(default.to_value()).unwrap_or(serde_json::Value::Null)
}

fn cmd_presets(json: bool) -> anyhow::Result<()> {
    let catalog = Catalog::builtin()?;
    if json {
        let all: serde_json::Map<String, serde_json::Value> = catalog
            .iter()
            .map(|(id, p)| Ok::<_, anyhow::Error>((id.to_owned(), serde_json::to_value(p)?)))
            .collect::<anyhow::Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }
    for (id, preset) in catalog.iter() {
        let ids: Vec<&str> = preset.effects.iter().map(|e| e.id.as_str()).collect();
        println!("{id:<12} {} {:<16} {}", preset.icon, preset.name, ids.join(" > "));
    }
    Ok(())
}

/// Parse `id` or `id:key=value,key=value`. Values are read as JSON when they parse, text
/// otherwise.
fn parse_effect_arg(arg: &str) -> anyhow::Result<EffectEntry> {
    let (id, rest) = arg.split_once(':').unwrap_or((arg, ""));
    let mut entry = EffectEntry::new(id.trim());
    for pair in rest.split(',').filter(|p| !p.trim().is_empty()) {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("expected key=value in '{pair}'"))?;
        let value = serde_json::from_str::<ParamValue>(raw.trim())
            .unwrap_or_else(|_| ParamValue::Text(raw.trim().to_owned()));
        entry.params.insert(key.trim(), value);
    }
    entry.lift_legacy_intensity();
    Ok(entry)
}

fn build_chain(args: &RenderArgs, registry: &EffectRegistry) -> anyhow::Result<EffectChain> {
    let mut chain = match (&args.preset, &args.preset_file) {
        (Some(id), _) => {
            let catalog = Catalog::builtin()?;
            let preset = catalog
                .get(id)
                .with_context(|| format!("unknown preset '{id}'"))?;
            preset.instantiate(registry)?
        }
        (None, Some(path)) => Preset::load(path)?.instantiate(registry)?,
        (None, None) => EffectChain::new(),
    };
    for arg in &args.effects {
        let entry = parse_effect_arg(arg)?;
        chain.push(registry.build(&entry)?);
    }
    Ok(chain)
}

fn make_recorder(out: &Path, sample_every: u32) -> anyhow::Result<Box<dyn FrameSink>> {
    let is_mp4 = out
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp4"));
    Ok(if is_mp4 {
        Box::new(RecordingSink::new(
            FfmpegSink::new(FfmpegSinkOpts::new(out)),
            sample_every,
        )?)
    } else {
        Box::new(RecordingSink::new(PngSequenceSink::new(out), sample_every)?)
    })
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut opts = match &args.opts {
        Some(path) => PipelineOpts::load(path)?,
        None => PipelineOpts::default(),
    };
    if let Some(w) = args.width {
        opts.width = w;
    }
    if let Some(h) = args.height {
        opts.height = h;
    }
    if let Some(fps) = args.fps {
        opts.fps = Fps::new(fps, 1)?;
    }

    let registry = EffectRegistry::builtin();
    let mut chain = build_chain(&args, &registry)?;
    if let Some(path) = &args.background {
        let image = Arc::new(
            Frame::load(path).with_context(|| format!("load background '{}'", path.display()))?,
        );
        for id in chain.ids() {
            if chain.get(id).is_some_and(|fx| fx.kind().accepts_image()) {
                chain.set_image(id, Some(Arc::clone(&image)))?;
            }
        }
    }

    let source: Box<dyn FrameSource> = match &args.in_path {
        Some(path) => Box::new(
            StillSource::open(path).with_context(|| format!("open input '{}'", path.display()))?,
        ),
        None => Box::new(SyntheticSource::new(opts.width, opts.height)),
    };
    let recorder = make_recorder(&args.out, opts.record_every)?;

    let mut pipeline = Pipeline::new(opts, chain)?
        .with_source(source)
        .with_sink(recorder);
    if args.detect {
        pipeline.start_tracker(Box::new(SkinToneModel::default()))?;
    }
    if let Some(freq) = args.tone {
        let rate = pipeline.opts().audio.sample_rate;
        pipeline.start_audio(Box::new(ToneSource::new(freq, 0.5, rate)))?;
    }

    let stats = pipeline.run(Some(args.frames))?;
    for entry in pipeline.status().entries() {
        eprintln!("status: {} {}", entry.component, entry.message);
    }

    if let Some(path) = &args.save_preset {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("custom");
        let preset = Preset::from_chain(name, "", pipeline.chain());
        std::fs::write(path, preset.to_json_pretty()?)
            .with_context(|| format!("write preset '{}'", path.display()))?;
    }

    eprintln!(
        "processed {} frames ({} passthrough, {} effect failures), avg {:.2} ms/frame -> {}",
        stats.frames,
        stats.passthrough_frames,
        stats.effect_failures,
        stats.avg_cycle().as_secs_f64() * 1000.0,
        args.out.display()
    );
    Ok(())
}
