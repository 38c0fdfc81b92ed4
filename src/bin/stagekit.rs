use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "stagekit", version)]
struct Cli {
    /// Log debug events to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a clip document and check every element (and widget reference).
    Validate(ValidateArgs),
    /// Print the draw records of a clip at one instant as JSON.
    Resolve(ResolveArgs),
    /// Print the inspector metadata of one widget definition as JSON.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input clip JSON.
    #[arg(long)]
    clip: PathBuf,

    /// Widget definitions JSON (array).
    #[arg(long)]
    widgets: Option<PathBuf>,

    /// Reject widget fields the definition does not declare.
    #[arg(long)]
    strict: bool,
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    /// Input clip JSON.
    #[arg(long)]
    clip: PathBuf,

    /// Widget definitions JSON (array).
    #[arg(long)]
    widgets: Option<PathBuf>,

    /// Clip time in seconds.
    #[arg(long)]
    time: f64,

    /// Reject widget fields the definition does not declare.
    #[arg(long)]
    strict: bool,

    /// Drop records whose effective opacity is 0.
    #[arg(long)]
    skip_transparent: bool,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Widget definitions JSON (array).
    #[arg(long)]
    widgets: PathBuf,

    /// Widget scope.
    #[arg(long)]
    scope: String,

    /// Widget name within the scope.
    #[arg(long)]
    widget: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Resolve(args) => cmd_resolve(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn read_clip(path: &Path) -> anyhow::Result<stagekit::Clip> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("open clip '{}'", path.display()))?;
    let clip = stagekit::Clip::from_json(&json)
        .with_context(|| format!("load clip '{}'", path.display()))?;
    Ok(clip)
}

fn read_registry(path: Option<&Path>) -> anyhow::Result<stagekit::WidgetRegistry> {
    let mut registry = stagekit::WidgetRegistry::new();
    let Some(path) = path else {
        return Ok(registry);
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("open widget definitions '{}'", path.display()))?;
    let defs = stagekit::parse_widget_definitions(&json)
        .with_context(|| format!("parse widget definitions '{}'", path.display()))?;
    for def in defs {
        registry.register(def)?;
    }
    Ok(registry)
}

fn unknown_fields(strict: bool) -> stagekit::UnknownFields {
    if strict {
        stagekit::UnknownFields::Strict
    } else {
        stagekit::UnknownFields::Lenient
    }
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let clip = read_clip(&args.clip)?;
    let registry = read_registry(args.widgets.as_deref())?;

    let mut widgets = 0usize;
    if args.widgets.is_some() {
        for (el, _) in clip.tree().preorder() {
            let Some(w) = el.widget_props() else {
                continue;
            };
            let unknown = unknown_fields(args.strict);
            let context = || format!("element '{}'", el.id());
            registry
                .resolve_parameters(&w.scope, &w.widget_id, &w.parameters, unknown)
                .with_context(context)?;
            if let Some(phase) = &w.appear {
                registry
                    .resolve_appear(&w.scope, &w.widget_id, &phase.params, unknown)
                    .with_context(context)?;
            }
            if let Some(phase) = &w.disappear {
                registry
                    .resolve_disappear(&w.scope, &w.widget_id, &phase.params, unknown)
                    .with_context(context)?;
            }
            widgets += 1;
        }
    }

    eprintln!(
        "ok: {} elements ({} widgets checked) in '{}'",
        clip.tree().len(),
        widgets,
        args.clip.display()
    );
    Ok(())
}

fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let clip = read_clip(&args.clip)?;
    let registry = read_registry(args.widgets.as_deref())?;

    let opts = stagekit::ComposerOpts {
        unknown_fields: unknown_fields(args.strict),
        skip_transparent: args.skip_transparent,
        ..stagekit::ComposerOpts::default()
    };
    let records = stagekit::Composer::new(&registry)
        .with_opts(opts)
        .resolve(&clip, args.time)?;

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let registry = read_registry(Some(&args.widgets))?;
    let meta = registry.inspector_metadata(&args.scope, &args.widget)?;
    println!("{}", serde_json::to_string_pretty(&meta)?);
    Ok(())
}
