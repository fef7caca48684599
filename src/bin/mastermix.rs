use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use polars::prelude::DataFrame;

use mastermix::config::Config;
use mastermix::i18n::{Locale, TextResolver};
use mastermix::kits::DEFAULT_KIT_ID;
use mastermix::{calc, clipboard, render, FileStorage, Kit, KitStore, Margin, MarginMode};

/// Master mix CLI
#[derive(Parser)]
#[command(name = "mastermix")]
#[command(version)]
#[command(about = "Reagent master mix calculator with local kit storage, import and export", long_about = None)]
struct Cli {
    /// Directory holding the kit storage file (cdna-kits.json)
    #[arg(long, global = true, env = "MASTERMIX_DATA_DIR")]
    data_dir: Option<PathBuf>,
    /// Display language (en, pt); defaults to $LANG
    #[arg(long, global = true, env = "MASTERMIX_LANG")]
    lang: Option<Locale>,
    /// Clipboard command for `calc --copy` (e.g. "xclip -selection clipboard")
    #[arg(long, global = true, env = "MASTERMIX_CLIPBOARD_CMD")]
    clipboard_cmd: Option<String>,
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all kits (built-in first)
    ListKits,

    /// Show a kit's reagents, protocol and notes
    Describe {
        /// Kit id (see `list-kits`)
        id: String,
    },

    /// Calculate master mix volumes for a kit
    Calc {
        /// Kit id
        #[arg(long, default_value = DEFAULT_KIT_ID)]
        kit: String,
        /// Number of samples (non-numeric counts as 0)
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        samples: String,
        /// Safety margin policy
        #[arg(long, value_enum, default_value_t = MarginArg::Extra)]
        margin: MarginArg,
        /// Extra reactions for `--margin extra`
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        extra: String,
        /// Extra percentage (0-100) for `--margin percentage`
        #[arg(long, default_value = "10", allow_hyphen_values = true)]
        percent: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,
        /// Also copy the tab-delimited results to the clipboard
        #[arg(long)]
        copy: bool,
        /// Write the output to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Create a new kit
    Add(KitArgs),

    /// Replace a kit's content (fields not given are kept)
    Edit {
        /// Kit id
        id: String,
        #[command(flatten)]
        kit: KitArgs,
    },

    /// Delete a kit (the built-in kit cannot be deleted)
    Delete {
        /// Kit id
        id: String,
    },

    /// Export custom kits to <dir>/cdna_kits_backup.json
    Export {
        /// Target directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Import kits from an exported JSON file; existing ids are skipped
    Import {
        /// JSON file
        file: PathBuf,
    },
}

#[derive(Args)]
struct KitArgs {
    /// Kit name
    #[arg(long)]
    name: Option<String>,
    /// Reagent as NAME=VOLUME in µL per reaction; repeat in mixing order
    #[arg(long = "reagent", value_name = "NAME=VOLUME")]
    reagents: Vec<String>,
    /// Thermocycler protocol text
    #[arg(long)]
    protocol: Option<String>,
    /// Free-text notes
    #[arg(long)]
    notes: Option<String>,
    /// Read the whole kit from a JSON object instead
    #[arg(long, conflicts_with_all = ["name", "reagents", "protocol", "notes"])]
    from: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum MarginArg {
    /// Fixed number of extra reactions
    Extra,
    /// Percentage on top of the sample count
    Percentage,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Table plus total volume
    Table,
    /// Tab-delimited text (what `--copy` puts on the clipboard)
    Tsv,
    /// Printable protocol sheet (Markdown)
    Print,
    /// JSON
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    mastermix::logging::init(cli.verbose);
    let cfg = Config::resolve(cli.data_dir, cli.lang, cli.clipboard_cmd);
    let t = cfg.locale;
    let mut store = KitStore::load(FileStorage::in_dir(&cfg.data_dir));

    match cli.command {
        Commands::ListKits => {
            cmd_list_kits(&store, &t)?;
        }

        Commands::Describe { id } => {
            cmd_describe(&store, &t, &id)?;
        }

        Commands::Calc { kit, samples, margin, extra, percent, format, copy, out } => {
            let kit = store.select(&kit)?;
            let mode = match margin {
                MarginArg::Extra => MarginMode::ExtraCount,
                MarginArg::Percentage => MarginMode::ExtraPercentage,
            };
            let margin = Margin {
                mode,
                extra_count: calc::coerce_count(&extra),
                extra_percentage: calc::coerce_number(&percent).clamp(0.0, 100.0),
            };
            let mix = calc::calculate(kit, calc::coerce_number(&samples), &margin);

            let text = match format {
                Format::Table => {
                    let df = render::results_frame(&mix, &t)?;
                    format!(
                        "{}\n{}\n{} {:.2} µL\n",
                        t.text("results.forReactions", &[("factor", format!("{:.1}", mix.factor).as_str())]),
                        display(df),
                        t.text("results.finalVolume", &[]),
                        mix.total_volume,
                    )
                }
                Format::Tsv => render::clipboard_text(&mix, &t)? + "\n",
                Format::Print => render::printable_protocol(kit, &mix, &t, chrono::Local::now().date_naive()),
                Format::Json => serde_json::to_string_pretty(&mix)? + "\n",
            };
            match out {
                Some(path) => std::fs::write(&path, &text).with_context(|| format!("writing {}", path.display()))?,
                None => print!("{text}"),
            }

            if copy {
                let copied = match cfg.clipboard_cmd.as_deref() {
                    Some(cmd) => render::clipboard_text(&mix, &t).and_then(|s| clipboard::copy(&s, cmd)),
                    None => Err(mastermix::KitError::Clipboard("no clipboard command; set MASTERMIX_CLIPBOARD_CMD".into())),
                };
                match copied {
                    Ok(()) => eprintln!("{}", t.text("copy.done", &[])),
                    Err(e) => eprintln!("{}: {e}", t.text("copy.failed", &[])),
                }
            }
        }

        Commands::Add(args) => {
            let kit = kit_from_args(args, None)?;
            let id = store.save(kit)?;
            println!("{}", t.text("kits.saved", &[("id", id.as_str())]));
        }

        Commands::Edit { id, kit } => {
            let Some(existing) = store.get(&id).cloned() else {
                bail!("Unknown kit: {}. Use `mastermix list-kits` to see valid kit ids.", id);
            };
            let mut kit = kit_from_args(kit, Some(existing))?;
            kit.id = id.as_str().into();
            let id = store.save(kit)?;
            println!("{}", t.text("kits.saved", &[("id", id.as_str())]));
        }

        Commands::Delete { id } => {
            if store.delete(&id)? {
                println!("{}", t.text("kits.deleted", &[("id", id.as_str())]));
            } else {
                eprintln!("{}", t.text("kits.notDeleted", &[("id", id.as_str())]));
            }
        }

        Commands::Export { dir } => {
            let path = store.export_to(&dir)?;
            println!("{}", t.text("export.done", &[("path", path.display().to_string().as_str())]));
        }

        Commands::Import { file } => {
            let raw = std::fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
            let report = store.import(&raw)?;
            println!(
                "{}",
                t.text("import.summary", &[
                    ("imported", report.imported.to_string().as_str()),
                    ("total", report.valid_total.to_string().as_str()),
                ])
            );
        }
    }

    Ok(())
}

/// Build a kit from CLI flags, starting from `base` when editing.
fn kit_from_args(args: KitArgs, base: Option<Kit>) -> anyhow::Result<Kit> {
    if let Some(path) = args.from {
        let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let mut kit: Kit = serde_json::from_str(&raw).with_context(|| format!("parsing kit JSON in {}", path.display()))?;
        // `add` always creates; `edit` keeps the edited kit's id.
        kit.id = base.map(|b| b.id).unwrap_or_default();
        return Ok(kit);
    }

    let mut kit = base.unwrap_or_else(|| Kit::new(String::new(), Vec::new()));
    if let Some(name) = args.name {
        kit.name = name;
    }
    if !args.reagents.is_empty() {
        kit.reagents = args
            .reagents
            .iter()
            .map(|s| mastermix::parse_reagent(s).with_context(|| format!("reagent `{s}` is not NAME=VOLUME")))
            .collect::<anyhow::Result<Vec<_>>>()?;
    }
    if let Some(protocol) = args.protocol {
        kit.protocol = protocol;
    }
    if let Some(notes) = args.notes {
        kit.notes = notes;
    }
    Ok(kit)
}

fn cmd_list_kits(store: &KitStore<FileStorage>, t: &Locale) -> anyhow::Result<()> {
    let df = render::kits_frame(store.kits(), t)?;
    println!("{}", display(df));
    Ok(())
}

fn cmd_describe(store: &KitStore<FileStorage>, t: &Locale, id: &str) -> anyhow::Result<()> {
    let Some(kit) = store.get(id) else {
        bail!("Unknown kit: {}. Use `mastermix list-kits` to see valid kit ids.", id);
    };
    println!("id: {}", kit.id);
    println!("name: {}", render::kit_title(kit, t));
    println!("{}:", t.text("kits.reagentCount", &[("count", kit.reagents.len().to_string().as_str())]));
    for r in &kit.reagents {
        println!("  {}\t{} µL", r.name, r.volume_per_reaction);
    }
    let protocol = if kit.protocol.trim().is_empty() { t.text("protocol.none", &[]) } else { kit.protocol.clone() };
    println!("{}:\n{}", t.text("kitModal.protocolLabel", &[]), protocol);
    if !kit.notes.trim().is_empty() {
        println!("{}:\n{}", t.text("kitModal.notesLabel", &[]), kit.notes);
    }
    Ok(())
}

/// Render a DataFrame without truncating rows, columns or cell text.
fn display(df: DataFrame) -> String {
    // These env vars are read by Polars' pretty-printer (fmt feature).
    std::env::set_var("POLARS_FMT_TABLE_FORMATTING", "UTF8_FULL");
    std::env::set_var("POLARS_FMT_TABLE_HIDE_COLUMN_DATA_TYPES", "1");
    std::env::set_var("POLARS_FMT_TABLE_HIDE_DATAFRAME_SHAPE_INFORMATION", "1");
    std::env::set_var("POLARS_FMT_MAX_COLS", "100000");
    std::env::set_var("POLARS_FMT_MAX_ROWS", "1000000");
    std::env::set_var("POLARS_FMT_STR_LEN", "100000");
    std::env::set_var("POLARS_TABLE_WIDTH", "65535");
    df.to_string()
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    fn kit_args(from: Option<PathBuf>) -> KitArgs {
        KitArgs { name: None, reagents: Vec::new(), protocol: None, notes: None, from }
    }

    #[test]
    fn negative_counts_parse_as_values() {
        let cli = Cli::try_parse_from(["mastermix", "calc", "--samples", "-3", "--extra", "-1", "--percent", "-5"]).unwrap();
        let Commands::Calc { samples, extra, percent, .. } = cli.command else { panic!("expected calc") };
        assert_eq!((samples.as_str(), extra.as_str(), percent.as_str()), ("-3", "-1", "-5"));
        assert_eq!(calc::coerce_number(&samples), -3.0);
    }

    #[test]
    fn add_from_file_ignores_file_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kit.json");
        std::fs::write(&path, r#"{"id":"kit-1","name":"K","reagents":[{"name":"A","volumePerReaction":1}]}"#).unwrap();

        let added = kit_from_args(kit_args(Some(path.clone())), None).unwrap();
        assert!(added.id.is_blank());

        let mut base = added.clone();
        base.id = "kit-9".into();
        let edited = kit_from_args(kit_args(Some(path)), Some(base)).unwrap();
        assert_eq!(edited.id.as_str(), "kit-9");
    }
}
