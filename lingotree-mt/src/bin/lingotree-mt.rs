use anyhow::{Context, anyhow, bail};
use chrono::Utc;
use clap::{Arg, ArgAction, ArgMatches, Command};
use lingotree::{
    DocumentFormat, ExportMode, Translatable, TranslationStats, export_filename, flatten,
    load_document, merge, rebuild, toggle_select_all,
};
use lingotree_mt::{
    BatchReport, BatchTranslator, ChatCompletionProvider, ConfigStore, FileConfigStore,
    MachineTranslator, MockMode, MockTranslator, TranslationConfig, update_config,
};
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .short('f')
        .help("Document format (json, yaml); inferred from the file extension by default")
        .value_parser(["json", "yaml", "yml"])
}

fn output_arg() -> Arg {
    Arg::new("output")
        .long("output")
        .short('o')
        .help("Where to write the result (default: timestamped file in the current directory)")
}

fn mock_arg() -> Arg {
    Arg::new("mock")
        .long("mock")
        .short('m')
        .help("Use the mock translator instead of the configured endpoint")
        .action(ArgAction::SetTrue)
}

fn cli() -> Command {
    Command::new("lingotree-mt")
        .version("0.1.0")
        .about("Machine translation for JSON/YAML localization files")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Path of the settings file (default: user config directory)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .help("Show detailed progress")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("extract")
                .about("List every translatable string with its path")
                .arg(Arg::new("file").help("Source document").required(true).index(1))
                .arg(
                    Arg::new("translated")
                        .long("translated")
                        .short('t')
                        .help("Earlier translation to compare against"),
                )
                .arg(format_arg()),
        )
        .subcommand(
            Command::new("translate")
                .about("Translate a document from scratch")
                .arg(Arg::new("file").help("Source document").required(true).index(1))
                .arg(
                    Arg::new("match")
                        .long("match")
                        .short('p')
                        .help("Only translate items whose dotted path matches this regex"),
                )
                .arg(format_arg())
                .arg(output_arg())
                .arg(mock_arg()),
        )
        .subcommand(
            Command::new("update")
                .about("Refresh an earlier translation after the base document changed")
                .arg(Arg::new("base").help("Current base document").required(true).index(1))
                .arg(
                    Arg::new("translated")
                        .long("translated")
                        .short('t')
                        .help("Earlier translation to carry forward"),
                )
                .arg(
                    Arg::new("all")
                        .long("all")
                        .short('a')
                        .help("Translate every item, not only new and changed ones")
                        .action(ArgAction::SetTrue),
                )
                .arg(format_arg())
                .arg(output_arg())
                .arg(mock_arg()),
        )
        .subcommand(
            Command::new("config")
                .about("Show or change the endpoint settings")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print the settings (API key masked)"))
                .subcommand(Command::new("path").about("Print the settings file location"))
                .subcommand(
                    Command::new("set")
                        .about("Change one setting")
                        .arg(
                            Arg::new("field")
                                .required(true)
                                .index(1)
                                .value_parser(lingotree_mt::config::CONFIG_FIELDS),
                        )
                        .arg(Arg::new("value").required(true).index(2)),
                ),
        )
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_format(matches: &ArgMatches, path: &Path) -> anyhow::Result<DocumentFormat> {
    match matches.get_one::<String>("format") {
        Some(name) => name.parse().map_err(|e: String| anyhow!(e)),
        None => Ok(DocumentFormat::from_path(path).unwrap_or_default()),
    }
}

fn required_path(matches: &ArgMatches, name: &str) -> anyhow::Result<PathBuf> {
    matches
        .get_one::<String>(name)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("missing argument <{}>", name))
}

fn load(path: &Path, format: DocumentFormat) -> anyhow::Result<Value> {
    load_document(path, Some(format)).with_context(|| format!("Failed to load {}", path.display()))
}

fn write_output(
    matches: &ArgMatches,
    mode: ExportMode,
    format: DocumentFormat,
    document: &Value,
) -> anyhow::Result<PathBuf> {
    let target = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(export_filename(mode, format, Utc::now())));
    fs::write(&target, format.serialize(document)?)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    Ok(target)
}

/// Run the batch with Ctrl-C wired to cancellation
async fn run_batch<T>(
    config: &TranslationConfig,
    items: &mut [T],
    use_mock: bool,
) -> anyhow::Result<BatchReport>
where
    T: Translatable + Clone + Send + Sync,
{
    let translator: Box<dyn MachineTranslator> = if use_mock {
        Box::new(MockTranslator::new(MockMode::Suffix("mt".to_string())))
    } else {
        Box::new(ChatCompletionProvider::from_config(config)?)
    };

    let runner = BatchTranslator::new();
    let run = runner.translate_in_place(config, translator.as_ref(), items);
    let cancel_on_interrupt = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling remaining requests");
            runner.cancel();
        }
        std::future::pending::<()>().await
    };

    tokio::select! {
        report = run => Ok(report?),
        _ = cancel_on_interrupt => bail!("translation interrupted"),
    }
}

fn load_config(store: &FileConfigStore, use_mock: bool) -> anyhow::Result<TranslationConfig> {
    let config = store.load()?.with_env_overrides();
    Ok(if use_mock {
        config.with_mock_placeholders()
    } else {
        config
    })
}

fn print_report(report: &BatchReport, written: &Path) {
    println!(
        "🌍 Translated {}/{} ({} failed{})",
        report.translated,
        report.requested,
        report.failed,
        if report.cancelled { ", cancelled" } else { "" }
    );
    println!("✅ Wrote {}", written.display());
}

fn extract(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = required_path(matches, "file")?;
    let format = resolve_format(matches, &path)?;
    let document = load(&path, format)?;

    match matches.get_one::<String>("translated") {
        None => {
            for item in flatten(&document) {
                println!("{}\t{}", item.path, item.value);
            }
        }
        Some(translated_path) => {
            let translated = load(Path::new(translated_path), format)?;
            for item in merge(&document, Some(&translated)) {
                let status = if item.is_new {
                    "new"
                } else if item.is_updated {
                    "updated"
                } else {
                    "same"
                };
                println!("{}\t{}\t{}", status, item.path, item.current_value);
            }
        }
    }
    Ok(())
}

async fn translate(matches: &ArgMatches, store: &FileConfigStore) -> anyhow::Result<()> {
    let path = required_path(matches, "file")?;
    let format = resolve_format(matches, &path)?;
    let use_mock = matches.get_flag("mock");
    let document = load(&path, format)?;

    let mut items = flatten(&document);
    match matches.get_one::<String>("match") {
        Some(pattern) => {
            let filter = Regex::new(pattern).context("Invalid --match pattern")?;
            for item in items.iter_mut() {
                item.selected = filter.is_match(&item.path.to_dotted());
            }
        }
        None => toggle_select_all(&mut items),
    }

    let stats = TranslationStats::collect(&items);
    println!("📦 {} strings, {} selected", stats.total, stats.selected);

    let config = load_config(store, use_mock)?;
    let report = run_batch(&config, &mut items, use_mock).await?;

    let rebuilt = rebuild(&document, &items)?;
    let written = write_output(matches, ExportMode::Initial, format, &rebuilt)?;
    print_report(&report, &written);
    Ok(())
}

async fn update(matches: &ArgMatches, store: &FileConfigStore) -> anyhow::Result<()> {
    let base_path = required_path(matches, "base")?;
    let format = resolve_format(matches, &base_path)?;
    let use_mock = matches.get_flag("mock");
    let base = load(&base_path, format)?;
    let translated = match matches.get_one::<String>("translated") {
        Some(path) => Some(load(Path::new(path), format)?),
        None => None,
    };

    let mut items = merge(&base, translated.as_ref());
    let translate_all = matches.get_flag("all");
    for item in items.iter_mut() {
        item.selected = translate_all || item.needs_translation();
    }

    let new_count = items.iter().filter(|item| item.is_new).count();
    let updated_count = items.iter().filter(|item| item.is_updated).count();
    println!(
        "📦 {} strings: {} new, {} updated",
        items.len(),
        new_count,
        updated_count
    );

    let written = if items.iter().any(|item| item.selected) {
        let config = load_config(store, use_mock)?;
        let report = run_batch(&config, &mut items, use_mock).await?;
        let rebuilt = rebuild(&base, &items)?;
        let written = write_output(matches, ExportMode::Update, format, &rebuilt)?;
        print_report(&report, &written);
        written
    } else {
        let rebuilt = rebuild(&base, &items)?;
        let written = write_output(matches, ExportMode::Update, format, &rebuilt)?;
        println!("✅ Nothing to translate, wrote {}", written.display());
        written
    };
    tracing::debug!(path = %written.display(), "Update complete");
    Ok(())
}

fn config_command(matches: &ArgMatches, store: &FileConfigStore) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => {
            let config = store.load()?;
            println!("{}", serde_json::to_string_pretty(&config.masked())?);
        }
        Some(("path", _)) => println!("{}", store.path().display()),
        Some(("set", sub)) => {
            let field = sub
                .get_one::<String>("field")
                .ok_or_else(|| anyhow!("missing field"))?;
            let value = sub
                .get_one::<String>("value")
                .ok_or_else(|| anyhow!("missing value"))?;
            update_config(store, |config| config.set_field(field, value))?;
            println!("✅ Updated {}", field);
        }
        _ => bail!("unknown config command"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    let store = match matches.get_one::<String>("config") {
        Some(path) => FileConfigStore::new(path),
        None => FileConfigStore::default_location()?,
    };

    match matches.subcommand() {
        Some(("extract", sub)) => extract(sub),
        Some(("translate", sub)) => translate(sub, &store).await,
        Some(("update", sub)) => update(sub, &store).await,
        Some(("config", sub)) => config_command(sub, &store),
        _ => {
            cli().print_help()?;
            Ok(())
        }
    }
}
