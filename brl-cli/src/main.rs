//! Command-line interface for brl
//! This binary decodes braille cell sequences into text.
//!
//! Usage:
//!   brl [`<path>`] [--lang `<code>`] [--math] [--format `<format>`]   - Decode a file (or stdin)
//!   brl --list-languages                                           - List available languages
//!   brl --list-formats                                             - List output formats
//!
//! Cells are written as dot-number groups (`13 3456 1`) or Unicode braille (`⠅⠼⠁`).
//! Settings come from the embedded defaults, then `brl.toml` in the working directory (or the
//! file given with --config), then the flags above.

use brl_config::{BrlConfig, Loader, StartMode};
use brl_parser::brl::formats::{FormatRegistry, Output};
use brl_parser::brl::{decode, parse_cells, DecodeOptions, Mode, Registry};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::borrow::Cow;
use std::io::Read;
use std::path::Path;

const LOCAL_CONFIG: &str = "brl.toml";

fn main() {
    env_logger::init();

    let matches = Command::new("brl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Transcribe braille cell sequences into text")
        .arg(
            Arg::new("path")
                .help("File with the cell sequence (reads stdin when omitted)")
                .index(1),
        )
        .arg(
            Arg::new("lang")
                .long("lang")
                .short('l')
                .help("Language code or alias (e.g., 'SI', 'UZ')"),
        )
        .arg(
            Arg::new("math")
                .long("math")
                .short('m')
                .help("Decode as a mathematical document")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format (text, simple, json, braille)"),
        )
        .arg(
            Arg::new("tables")
                .long("tables")
                .short('t')
                .help("YAML symbol data to use instead of the built-in tables"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults"),
        )
        .arg(
            Arg::new("list-languages")
                .long("list-languages")
                .help("List available languages")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available output formats")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    let config = load_config(&matches);

    if matches.get_flag("list-languages") {
        handle_list_languages_command(&config);
        return;
    }

    let path = matches.get_one::<String>("path").map(String::as_str);
    handle_decode_command(&config, path);
}

/// Build the configuration from defaults, files and flags
fn load_config(matches: &ArgMatches) -> BrlConfig {
    let mut loader = match matches.get_one::<String>("config") {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new().with_optional_file(LOCAL_CONFIG),
    };

    let overrides = [
        ("decode.language", matches.get_one::<String>("lang").cloned()),
        ("output.format", matches.get_one::<String>("format").cloned()),
        ("tables.path", matches.get_one::<String>("tables").cloned()),
        (
            "decode.start_mode",
            matches.get_flag("math").then(|| "math".to_string()),
        ),
    ];
    for (key, value) in overrides {
        if let Some(value) = value {
            loader = loader.set_override(key, value).unwrap_or_else(|e| {
                eprintln!("Configuration error: {}", e);
                std::process::exit(1);
            });
        }
    }

    loader.build().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    })
}

/// Open the symbol data named by the configuration, or the built-in data
fn open_registry(config: &BrlConfig) -> Cow<'static, Registry> {
    Registry::open(config.tables.path.as_deref()).unwrap_or_else(|e| {
        eprintln!("Table error: {}", e);
        std::process::exit(1);
    })
}

/// Handle the decode command
fn handle_decode_command(config: &BrlConfig, path: Option<&str>) {
    let tables = open_registry(config)
        .load(&config.decode.language)
        .unwrap_or_else(|e| {
            eprintln!("Language error: {}", e);
            eprintln!("\nRun `brl --list-languages` to see what is available.");
            std::process::exit(1);
        });

    let source = read_input(path).unwrap_or_else(|e| {
        eprintln!("Input error: {}", e);
        std::process::exit(1);
    });
    let cells = parse_cells(&source).unwrap_or_else(|e| {
        eprintln!("Input error: {}", e);
        std::process::exit(1);
    });

    log::debug!(
        "decoding {} cells as {} ({:?} start)",
        cells.len(),
        tables.code(),
        config.decode.start_mode
    );
    let options = DecodeOptions {
        start_mode: match config.decode.start_mode {
            StartMode::Letter => Mode::Letter,
            StartMode::Math => Mode::Math,
        },
    };
    let transcript = decode(cells.iter().copied(), &tables, options);
    for diagnostic in &transcript.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }

    let output = Output::new(&transcript).with_cells(&cells);
    let formatted = FormatRegistry::with_defaults()
        .serialize(&output, config.output.format.as_str())
        .unwrap_or_else(|e| {
            eprintln!("Format error: {}", e);
            std::process::exit(1);
        });
    println!("{}", formatted);
}

fn read_input(path: Option<&str>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(Path::new(path)),
        None => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

/// Handle the list-languages command
fn handle_list_languages_command(config: &BrlConfig) {
    let registry = open_registry(config);
    println!("Available languages:\n");
    for language in registry.languages() {
        let mut line = format!("  {:<4} {}", language.code, language.name);
        if !language.aliases.is_empty() {
            line.push_str(&format!(" (aliases: {})", language.aliases.join(", ")));
        }
        if !language.supported {
            line.push_str(" [placeholder, not supported]");
        }
        println!("{}", line);
    }
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    let registry = FormatRegistry::with_defaults();
    println!("Available output formats:\n");

    for formatter in registry.formatters() {
        println!("  {}", formatter.name());
        println!("    {}", formatter.description());
        println!();
    }
}
