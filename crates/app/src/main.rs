mod terminal;

use std::fmt;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::model::BankId;
use quiz_core::{LENGTH_CHOICES, SampleSize, validate_bank};
use services::{BankCatalog, QuizController, SessionError, SessionStep};
use storage::repository::BankRepository;
use storage::{BankEntry, FsBankRepository, HttpBankRepository, StorageError};
use tracing_subscriber::{EnvFilter, fmt as log_fmt, prelude::*};

use terminal::{TerminalRenderer, parse_selection, unknown_letters};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidLength { raw: String },
    InvalidServerUrl { raw: String },
    MissingBank,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidLength { raw } => write!(f, "invalid --length value: {raw}"),
            ArgsError::InvalidServerUrl { raw } => write!(f, "invalid --server value: {raw}"),
            ArgsError::MissingBank => write!(f, "check requires a bank name"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- run   [--dir <path> | --server <url>] [--bank <name>] [--length <n>]");
    eprintln!("  cargo run -p app -- list  [--dir <path> | --server <url>]");
    eprintln!("  cargo run -p app -- check <name> [--dir <path> | --server <url>]");
    eprintln!();
    eprintln!("Defaults for run:");
    eprintln!("  --dir .");
    eprintln!("  --length 10   (one of 10, 25, 50, 100, full)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_BANK_DIR, QUIZ_SERVER_URL, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    List,
    Check,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "run" => Some(Self::Run),
            "list" => Some(Self::List),
            "check" => Some(Self::Check),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Dir(PathBuf),
    Server(String),
}

#[derive(Debug)]
struct Args {
    source: Source,
    bank: Option<String>,
    length: SampleSize,
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut dir = env("QUIZ_BANK_DIR").map_or_else(|| PathBuf::from("."), PathBuf::from);
        let mut server = env("QUIZ_SERVER_URL").filter(|url| !url.trim().is_empty());
        let mut bank = None;
        let mut length = SampleSize::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--dir" => {
                    dir = PathBuf::from(require_value(args, "--dir")?);
                    server = None;
                }
                "--server" => {
                    let value = require_value(args, "--server")?;
                    if !value.starts_with("http://") && !value.starts_with("https://") {
                        return Err(ArgsError::InvalidServerUrl { raw: value });
                    }
                    server = Some(value);
                }
                "--bank" => bank = Some(require_value(args, "--bank")?),
                "--length" => {
                    let value = require_value(args, "--length")?;
                    length = parse_length(&value)?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if bank.is_none() && !arg.starts_with('-') => bank = Some(arg),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let source = match server {
            Some(url) => Source::Server(url),
            None => Source::Dir(dir),
        };
        Ok(Self {
            source,
            bank,
            length,
        })
    }
}

/// Only the offered run lengths are accepted on the command line.
fn parse_length(raw: &str) -> Result<SampleSize, ArgsError> {
    let invalid = || ArgsError::InvalidLength {
        raw: raw.to_string(),
    };
    match raw.parse::<SampleSize>().map_err(|_| invalid())? {
        SampleSize::Count(n) if !LENGTH_CHOICES.contains(&n) => Err(invalid()),
        size => Ok(size),
    }
}

fn open_source(source: &Source) -> Result<Arc<dyn BankRepository>, StorageError> {
    let banks: Arc<dyn BankRepository> = match source {
        Source::Dir(path) => Arc::new(FsBankRepository::new(path)),
        Source::Server(url) => Arc::new(HttpBankRepository::new(url)?),
    };
    Ok(banks)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(log_fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means an interactive run.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Run,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Run,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    tracing::debug!(source = ?parsed.source, length = %parsed.length, "configuration loaded");
    let banks = open_source(&parsed.source)?;

    match cmd {
        Command::List => list_banks(banks).await,
        Command::Check => {
            let name = parsed.bank.ok_or(ArgsError::MissingBank)?;
            check_bank(banks.as_ref(), &name).await
        }
        Command::Run => run_quiz(banks, parsed.bank, parsed.length).await,
    }
}

async fn list_banks(banks: Arc<dyn BankRepository>) -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = BankCatalog::new(banks);
    for entry in catalog.load().await {
        println!("{:<40} {}", entry.file, entry.label);
    }
    Ok(())
}

async fn check_bank(banks: &dyn BankRepository, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let id: BankId = name.parse()?;
    let bank = banks.fetch_bank(&id).await?;
    let issues = validate_bank(&bank.questions);

    println!("{}: {} questions", bank.name, bank.questions.len());
    if issues.is_empty() {
        println!("no issues found");
    }
    for issue in &issues {
        println!("  {issue}");
    }
    Ok(())
}

async fn run_quiz(
    banks: Arc<dyn BankRepository>,
    requested: Option<String>,
    length: SampleSize,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();

    let mut catalog = BankCatalog::new(Arc::clone(&banks));
    catalog.load().await;
    let entry = match requested {
        Some(name) => catalog.add_custom(&name).await?,
        None => match choose_bank(&catalog, &mut input)? {
            Some(entry) => entry,
            None => return Ok(()),
        },
    };

    let mut controller = QuizController::new(banks, TerminalRenderer::new(std::io::stdout()));
    println!("Starting {} ({} questions)", entry.label, length);
    controller.start_quiz(&entry.id()?, length).await?;

    loop {
        let Some(line) = prompt(&mut input, "Answer (e.g. A or A,C), q to quit: ")? else {
            return Ok(());
        };
        if line.eq_ignore_ascii_case("q") {
            let counters = controller.renderer().counters();
            println!("Stopped with {} questions left to master.", counters.remaining);
            return Ok(());
        }

        let picked = match parse_selection(&line) {
            Ok(picked) => picked,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        if let Some(question) = controller.session().and_then(|s| s.current_question()) {
            let unknown = unknown_letters(question, &picked);
            if !unknown.is_empty() {
                let letters: Vec<String> = unknown.iter().map(ToString::to_string).collect();
                println!("no such option: {}", letters.join(", "));
                continue;
            }
        }

        match controller.submit(picked) {
            Ok(_) => {}
            Err(SessionError::EmptySelection) => {
                println!("Select at least one option.");
                continue;
            }
            Err(err) => return Err(err.into()),
        }

        if prompt(&mut input, "Press Enter for the next question: ")?.is_none() {
            return Ok(());
        }
        if let SessionStep::Complete(_) = controller.advance()? {
            return Ok(());
        }
    }
}

fn choose_bank(
    catalog: &BankCatalog,
    input: &mut impl BufRead,
) -> Result<Option<BankEntry>, Box<dyn std::error::Error>> {
    let entries = catalog.entries();
    for (n, entry) in entries.iter().enumerate() {
        println!("{:>3}. {}", n + 1, entry.label);
    }

    loop {
        let Some(line) = prompt(input, "Choose a bank [1]: ")? else {
            return Ok(None);
        };
        if line.is_empty() {
            return Ok(catalog.default_entry().cloned());
        }
        match line.parse::<usize>() {
            Ok(n) if (1..=entries.len()).contains(&n) => return Ok(Some(entries[n - 1].clone())),
            _ => println!("enter a number between 1 and {}", entries.len()),
        }
    }
}

/// Prints `message` and reads one trimmed line. `None` on end of input.
fn prompt(input: &mut impl BufRead, message: &str) -> std::io::Result<Option<String>> {
    print!("{message}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
