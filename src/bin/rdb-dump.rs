//! rdb-dump
//!
//! Печатает содержимое дампа Redis (файл или stdin) как JSON-массив событий
//! декодера.

use std::{
    fs::File,
    io::{self, BufWriter, Read},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use rdbstream::{
    logging::{init_logging, LogFormat},
    printer::{JsonPrinter, Printer},
    ChecksumPolicy, Decoder, Settings, StackError,
};
use tracing::debug;

#[derive(Parser)]
#[command(name = "rdb-dump")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Decode a Redis RDB dump into a stream of JSON events", long_about = None)]
#[command(after_help = "Examples:\n  rdb-dump path/to/dump.rdb\n  cat dump.rdb | rdb-dump")]
struct Cli {
    /// Путь к дампу; без него читается stdin
    path: Option<PathBuf>,
    /// Формат вывода
    #[arg(short, long, value_enum, default_value = "json")]
    output: OutputFormat,
    /// Сверять контрольную сумму (ошибка при несовпадении)
    #[arg(long, conflicts_with = "skip_checksum")]
    verify_checksum: bool,
    /// Не сверять контрольную сумму
    #[arg(long)]
    skip_checksum: bool,
    /// Формат логов в stderr
    #[arg(long)]
    log_format: Option<LogFormat>,
    /// Подробные логи (debug)
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
    /// Без логов
    #[arg(short, long)]
    quiet: bool,
}

/// Формат вывода событий
#[derive(Clone, Debug, clap::ValueEnum)]
enum OutputFormat {
    /// JSON-массив, по объекту на событие
    Json,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        let code = e
            .downcast_ref::<StackError>()
            .map_or(1, |s| s.status_code().exit_code());
        std::process::exit(code);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let settings = Settings::load().context("Failed to load settings")?;

    let mut logging = settings.logging_config();
    if cli.quiet {
        logging.level = "off".into();
    } else if cli.verbose {
        logging.level = "debug".into();
    }
    if let Some(format) = cli.log_format {
        logging.format = format;
    }
    init_logging(logging).map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    let mut config = settings.decoder_config();
    if cli.skip_checksum {
        config.checksum = ChecksumPolicy::Skip;
    } else if cli.verify_checksum {
        config.checksum = ChecksumPolicy::Verify;
    }
    debug!(?config, path = ?cli.path, "starting decoder");

    let reader: Box<dyn Read> = match &cli.path {
        Some(path) => Box::new(
            File::open(path)
                .map_err(StackError::from)
                .with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    let mut printer = match cli.output {
        OutputFormat::Json => JsonPrinter::new(BufWriter::new(stdout.lock())),
    };

    let decoder = Decoder::with_config(reader, config);
    print_events(decoder, &mut printer)
}

fn print_events<R: Read, P: Printer>(
    mut decoder: Decoder<R>,
    printer: &mut P,
) -> Result<()> {
    printer.start()?;

    while let Some(event) = decoder.next_event().inspect_err(|e| {
        if let Some(hint) = e.rdb_error().and_then(|r| r.recovery_hint()) {
            eprintln!("Hint: {hint}");
        }
    })? {
        printer.event(&event)?;
    }

    printer.end()?;
    let stats = decoder.stats();
    debug!(
        bytes = stats.bytes_read,
        records = stats.records_parsed,
        events = stats.events_emitted,
        checksum = ?decoder.checksum_status(),
        "dump decoded"
    );
    Ok(())
}
