//! Rowpipe CLI - ingest delimited text into rows
//!
//! ```bash
//! rowpipe parse input.csv              # Rows as a pretty JSON array
//! rowpipe parse input.csv --jsonl      # One JSON object per row
//! rowpipe detect input.csv             # Guess the charset
//! rowpipe split 'a,"b,c",d'            # Show the quote-aware split
//! rowpipe charsets                     # Example charset labels
//! ```
//!
//! Defaults come from `ROWPIPE_*` variables (a `.env` file is honored),
//! then `--config`, then explicit flags.

use clap::{Parser, Subcommand};
use rowpipe::{
    detect_charset, logs, split_line, CsvSourceConfig, JsonLinesSink, Pipeline, Source,
};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rowpipe")]
#[command(about = "Ingest delimited text into rows and print them as JSON", long_about = None)]
struct Cli {
    /// Echo ingestion logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a delimited text file and output rows as JSON
    Parse {
        /// Input file
        input: PathBuf,

        /// Cell delimiter
        #[arg(short, long, env = "ROWPIPE_DELIMITER")]
        delimiter: Option<String>,

        /// Charset label, or "auto" to detect
        #[arg(short, long, env = "ROWPIPE_CHARSET")]
        charset: Option<String>,

        /// First line is data, not column names
        #[arg(long)]
        no_headers: bool,

        /// Also output the header line as a row
        #[arg(long)]
        emit_header_row: bool,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write one JSON object per line
        #[arg(long)]
        jsonl: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Detect the charset of a file
    Detect {
        /// Input file
        input: PathBuf,
    },

    /// Split one line with the quote-aware rule
    Split {
        /// Line to split
        line: String,

        /// Cell delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: String,
    },

    /// List example charset labels
    Charsets,
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logs::set_echo(cli.verbose);

    let result = match cli.command {
        Commands::Parse {
            input,
            delimiter,
            charset,
            no_headers,
            emit_header_row,
            config,
            jsonl,
            output,
        } => {
            let options = ParseOptions {
                delimiter,
                charset,
                no_headers,
                emit_header_row,
                config,
                jsonl,
            };
            cmd_parse(&input, options, output.as_deref())
        }

        Commands::Detect { input } => cmd_detect(&input),

        Commands::Split { line, delimiter } => cmd_split(&line, &delimiter),

        Commands::Charsets => cmd_charsets(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

struct ParseOptions {
    delimiter: Option<String>,
    charset: Option<String>,
    no_headers: bool,
    emit_header_row: bool,
    config: Option<PathBuf>,
    jsonl: bool,
}

fn build_config(options: &ParseOptions) -> Result<CsvSourceConfig, Box<dyn std::error::Error>> {
    let mut config = match options.config {
        Some(ref path) => CsvSourceConfig::from_file(path)?,
        None => CsvSourceConfig::from_env()?,
    };
    if let Some(ref delimiter) = options.delimiter {
        config.delimiter = delimiter.clone();
    }
    if let Some(ref charset) = options.charset {
        config.charset = charset.clone();
    }
    if options.no_headers {
        config.contains_headers = false;
    }
    if options.emit_header_row {
        config.emit_header_row = true;
    }
    Ok(config)
}

fn cmd_parse(
    input: &Path,
    options: ParseOptions,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&options)?;
    let file = fs::File::open(input)?;
    let mut source = config.open(file)?;

    eprintln!("📄 Parsing: {}", input.display());
    eprintln!("   Charset: {}", source.charset());
    eprintln!("   Delimiter: '{}'", format_delimiter(source.delimiter()));

    if options.jsonl {
        let stats = match output {
            Some(path) => {
                let sink = JsonLinesSink::new(io::BufWriter::new(fs::File::create(path)?));
                Pipeline::new(&mut source).to(sink).go(None, &[])?
            }
            None => {
                let sink = JsonLinesSink::new(io::stdout().lock());
                Pipeline::new(&mut source).to(sink).go(None, &[])?
            }
        };
        report_skipped(source.skipped_lines());
        eprintln!("✅ Wrote {} rows", stats.rows_delivered);
        return Ok(());
    }

    let rows: Vec<Value> = source.query(None, &[])?.iter().map(|r| r.to_json()).collect();
    report_skipped(source.skipped_lines());
    eprintln!("   Columns: {}", source.headers().names().join(", "));
    eprintln!("✅ Parsed {} rows", rows.len());

    let json = serde_json::to_string_pretty(&rows)?;
    write_output(&json, output)
}

fn report_skipped(skipped: &[usize]) {
    if !skipped.is_empty() {
        let lines: Vec<String> = skipped.iter().map(|n| n.to_string()).collect();
        eprintln!("   ⚠️  Skipped lines: {}", lines.join(", "));
    }
}

fn cmd_detect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(input)?;
    println!("{}", detect_charset(&bytes));
    Ok(())
}

fn cmd_split(line: &str, delimiter: &str) -> Result<(), Box<dyn std::error::Error>> {
    let cells = split_line(line, delimiter);
    println!("{}", serde_json::to_string_pretty(&cells)?);
    Ok(())
}

fn cmd_charsets() -> Result<(), Box<dyn std::error::Error>> {
    for label in [
        "UTF-8",
        "UTF-16LE",
        "UTF-16BE",
        "ISO-8859-1",
        "ISO-8859-15",
        "windows-1252",
        "Shift_JIS",
        "EUC-JP",
        "GBK",
        "KOI8-R",
        "auto",
    ] {
        println!("{}", label);
    }
    Ok(())
}

fn format_delimiter(d: &str) -> String {
    match d {
        "\t" => "\\t".to_string(),
        other => other.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
