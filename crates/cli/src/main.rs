use anyhow::Context;
use beid_core::constants::{APPLET_ID_ENV, READER_ENV};
use beid_core::{parse, CardReader, ParseResult, ReaderConfig, SnapshotApplet, SnapshotHost};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "beid")]
#[command(about = "Belgian eID and SIS card reader CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the inserted card
    Read {
        /// Applet snapshot (YAML)
        #[arg(long)]
        snapshot: PathBuf,
        /// Card reader name (overrides BEID_READER)
        #[arg(long)]
        reader: Option<String>,
        /// Id of the element exposing the applet (overrides BEID_APPLET_ID)
        #[arg(long)]
        applet_id: Option<String>,
        /// Print a text summary instead of JSON
        #[arg(long)]
        text: bool,
    },
    /// List detected card readers
    Readers {
        /// Applet snapshot (YAML)
        #[arg(long)]
        snapshot: PathBuf,
        /// Id of the element exposing the applet (overrides BEID_APPLET_ID)
        #[arg(long)]
        applet_id: Option<String>,
    },
    /// Print the default card reader
    DefaultReader {
        /// Applet snapshot (YAML)
        #[arg(long)]
        snapshot: PathBuf,
        /// Id of the element exposing the applet (overrides BEID_APPLET_ID)
        #[arg(long)]
        applet_id: Option<String>,
    },
    /// Parse a raw applet value
    Parse {
        /// How to interpret the value
        kind: ValueKind,
        /// Raw value as returned by the applet
        value: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ValueKind {
    ValidityDate,
    BirthDate,
    SisDate,
    Number,
    Ssn,
    EidSex,
    SisSex,
    DocumentType,
    SpecialStatus,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("beid=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Read {
            snapshot,
            reader,
            applet_id,
            text,
        }) => {
            let config = resolve_config(reader, applet_id)?;
            let mut card_reader = snapshot_reader(&snapshot, &config)?;
            card_reader.set_alert(|message: &str| eprintln!("{message}"));
            card_reader
                .set_no_reader_detected_handler(Some(Box::new(|| eprintln!("No card reader detected."))));
            card_reader
                .set_no_card_present_handler(Some(Box::new(|| eprintln!("No card present."))));

            match card_reader.read() {
                Some(card) if text => println!("{card}"),
                Some(card) => println!("{}", serde_json::to_string_pretty(&card)?),
                None => println!("No card read."),
            }
        }
        Some(Commands::Readers {
            snapshot,
            applet_id,
        }) => {
            let config = resolve_config(None, applet_id)?;
            let mut card_reader = snapshot_reader(&snapshot, &config)?;
            let names = card_reader.reader_names();
            if names.is_empty() {
                println!("No card readers found.");
            } else {
                for name in names {
                    println!("{name}");
                }
            }
        }
        Some(Commands::DefaultReader {
            snapshot,
            applet_id,
        }) => {
            let config = resolve_config(None, applet_id)?;
            let mut card_reader = snapshot_reader(&snapshot, &config)?;
            println!("{}", card_reader.default_reader_name());
        }
        Some(Commands::Parse { kind, value }) => {
            let parsed =
                parse_value(kind, &value).with_context(|| format!("failed to parse {value:?}"))?;
            println!("{parsed}");
        }
        None => {
            println!("Use 'beid --help' for commands");
        }
    }

    Ok(())
}

/// Flags take precedence over `BEID_READER` / `BEID_APPLET_ID`.
fn resolve_config(reader: Option<String>, applet_id: Option<String>) -> anyhow::Result<ReaderConfig> {
    let reader = reader.or_else(|| std::env::var(READER_ENV).ok());
    let applet_id = applet_id.or_else(|| std::env::var(APPLET_ID_ENV).ok());
    let config = ReaderConfig::from_env_values(reader, applet_id)?;
    tracing::debug!(?config, "resolved reader configuration");
    Ok(config)
}

/// A reader over a snapshot applet exposed under the configured element id.
fn snapshot_reader(path: &Path, config: &ReaderConfig) -> anyhow::Result<CardReader<SnapshotHost>> {
    let applet = SnapshotApplet::load(path)
        .with_context(|| format!("failed to load snapshot {}", path.display()))?;
    let mut host = SnapshotHost::new();
    host.insert(config.applet_id(), applet);
    Ok(CardReader::with_config(host, config))
}

fn parse_value(kind: ValueKind, value: &str) -> ParseResult<String> {
    let raw = Some(value);
    let parsed = match kind {
        ValueKind::ValidityDate => parse::parse_validity_date(raw)?.to_string(),
        ValueKind::BirthDate => parse::parse_birth_date(raw)?.to_string(),
        ValueKind::SisDate => parse::parse_sis_date(raw)?.to_string(),
        ValueKind::Number => parse::parse_number(raw)?.to_string(),
        ValueKind::Ssn => parse::parse_social_security_number(raw)?.to_string(),
        ValueKind::EidSex => parse::parse_eid_sex(raw)?.to_string(),
        ValueKind::SisSex => parse::parse_sis_sex(raw)?.to_string(),
        ValueKind::DocumentType => {
            let document_type = parse::parse_document_type(raw)?;
            format!("{} ({document_type})", document_type.code())
        }
        ValueKind::SpecialStatus => {
            let status = parse::parse_special_status(raw)?;
            format!("{} ({status})", status.code())
        }
    };
    Ok(parsed)
}
