//! minyaml command-line tool for checking, inspecting, and transcoding
//! metadata documents.
//!
//! Usage: minyaml [OPTIONS] [FILE]
//!
//! Options:
//!   -t, --to <FORMAT>      Output format (tree, tokens, yaml, toml, cbor, diag)
//!                          [default: tree]
//!   -k, --key <KEY>        Only output the first subtree with this key
//!   -o, --output <FILE>    Write output to specified file
//!   --check                Check if input is valid (exit 0 if valid, 1 if invalid)
//!   --namespace <NS>       Prefix for diagnostics [default: minyaml]
//!   -v, --verbose          Log pipeline progress to stderr (repeat for more)
//!   -h, --help             Print help
//!   -V, --version          Print version

use libminyaml::{Document, ParseContext, Value};
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read, Write};
use std::process;
use tracing::Level;

mod transcode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Tree,
    Tokens,
    Yaml,
    Toml,
    Cbor,
    CborDiag,
}

fn parse_format(s: &str) -> Option<Format> {
    match s {
        "tree" => Some(Format::Tree),
        "tokens" => Some(Format::Tokens),
        "yaml" | "yml" => Some(Format::Yaml),
        "toml" => Some(Format::Toml),
        "cbor" => Some(Format::Cbor),
        "diag" => Some(Format::CborDiag),
        _ => None,
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut output_format = Format::Tree;
    let mut key: Option<&str> = None;
    let mut output_file: Option<&str> = None;
    let mut check_only = false;
    let mut namespace: Option<&str> = None;
    let mut verbosity = 0u8;
    let mut input_path: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-V" | "--version" => {
                println!("minyaml {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "-t" | "--to" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: -t requires a format argument");
                    process::exit(1);
                }
                output_format = match parse_format(&args[i]) {
                    Some(format) => format,
                    None => {
                        eprintln!("Error: Unknown format: {}", args[i]);
                        process::exit(1);
                    }
                };
            }
            "-k" | "--key" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: -k requires a key argument");
                    process::exit(1);
                }
                key = Some(&args[i]);
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --output requires an argument");
                    process::exit(1);
                }
                output_file = Some(&args[i]);
            }
            "--check" => {
                check_only = true;
            }
            "--namespace" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --namespace requires an argument");
                    process::exit(1);
                }
                namespace = Some(&args[i]);
            }
            "-v" | "--verbose" => {
                verbosity = verbosity.saturating_add(1);
            }
            // -vv, -vvv
            arg if arg.len() > 2
                && arg.starts_with('-')
                && arg[1..].bytes().all(|b| b == b'v') =>
            {
                verbosity = verbosity.saturating_add(count_verbose(arg));
            }
            "-" => {
                // Explicit stdin
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                process::exit(1);
            }
            _ => {
                if input_path.is_some() {
                    eprintln!("Error: Multiple input paths not supported");
                    process::exit(1);
                }
                input_path = Some(&args[i]);
            }
        }
        i += 1;
    }

    if key.is_some() && output_format == Format::Tokens {
        eprintln!("Error: --key cannot be used with --to tokens");
        process::exit(1);
    }

    init_tracing(verbosity);

    let raw_bytes: Vec<u8> = match input_path {
        Some(path) => match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("Error reading {}: {}", path, e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut buffer) {
                eprintln!("Error reading stdin: {}", e);
                process::exit(1);
            }
            buffer
        }
    };

    let input = match String::from_utf8(raw_bytes) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: input is not valid UTF-8: {}", e);
            process::exit(1);
        }
    };

    let ctx = ParseContext::new(namespace);
    let exit_code = process_input(
        &input,
        input_path,
        &ctx,
        key,
        output_format,
        output_file,
        check_only,
    );
    process::exit(exit_code);
}

/// Verbosity carried by a `-vv...` flag, capped at `u8::MAX`.
fn count_verbose(arg: &str) -> u8 {
    u8::try_from(arg.len() - 1).unwrap_or(u8::MAX)
}

/// Install a compact stderr subscriber; each `-v` raises the level by one.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}

fn process_input(
    input: &str,
    input_file: Option<&str>,
    ctx: &ParseContext,
    key: Option<&str>,
    output_format: Format,
    output_file: Option<&str>,
    check_only: bool,
) -> i32 {
    let (mut errors, mut warnings) = (String::new(), String::new());
    let doc = ctx.parse_reporting(input, &mut errors, &mut warnings);
    eprint!("{}", warnings);

    let Some(doc) = doc else {
        if let Some(path) = input_file {
            eprint!("{}: {}", path, errors);
        } else {
            eprint!("{}", errors);
        }
        return 1;
    };
    tracing::info!(
        file = input_file.unwrap_or("<stdin>"),
        lines = doc.lines().len(),
        nodes = doc.nodes().len(),
        "parsed"
    );

    if check_only {
        if let Some(path) = input_file {
            println!("{}: ok", path);
        }
        return 0;
    }

    if output_format == Format::Tokens {
        write_text_output(&token_dump(&doc), output_file);
        return 0;
    }

    let node = match key {
        Some(key) => match doc.find_by_key_dfs(key) {
            Some(node) => Some(node),
            None => {
                eprintln!("Error: Key not found: {}", key);
                return 1;
            }
        },
        None => doc.root(),
    };

    if output_format == Format::Tree {
        let output = node
            .map(|node| doc.debug_view(node).to_string())
            .unwrap_or_default();
        write_text_output(&output, output_file);
        return 0;
    }

    let value = match node.map(|node| Value::from_node(&doc, node)) {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            eprintln!("Error: {}", e);
            return 1;
        }
        None => Value::Null,
    };
    tracing::debug!(?output_format, "transcoding");

    match output_format {
        Format::Yaml => match transcode::yaml::encode(&value) {
            Ok(output) => write_text_output(&output, output_file),
            Err(e) => {
                eprintln!("Error: Cannot convert to YAML: {}", e);
                return 1;
            }
        },
        Format::Toml => match transcode::toml::encode(&value) {
            Ok(output) => write_text_output(&output, output_file),
            Err(e) => {
                eprintln!("Error: Cannot convert to TOML: {}", e);
                return 1;
            }
        },
        Format::Cbor => match transcode::cbor::encode(&value) {
            Ok(bytes) => write_binary_output(&bytes, output_file),
            Err(e) => {
                eprintln!("Error: Cannot convert to CBOR: {}", e);
                return 1;
            }
        },
        Format::CborDiag => {
            // Render from the encoded bytes so the text matches the wire form.
            let rendered = transcode::cbor::encode(&value)
                .and_then(|bytes| transcode::cbor::diagnostic(&bytes));
            match rendered {
                Ok(output) => write_text_output(&output, output_file),
                Err(e) => {
                    eprintln!("Error: Cannot convert to CBOR: {}", e);
                    return 1;
                }
            }
        }
        Format::Tree | Format::Tokens => {}
    }

    0
}

/// One row per classified line: index, kind, indent, then its tokens.
fn token_dump(doc: &Document<'_>) -> String {
    let mut out = String::new();
    for (index, line) in doc.lines().iter().enumerate() {
        let _ = write!(out, "{:>4} {:?} indent={}:", index, line.kind, line.indent);
        for token in &doc.tokens()[line.token_range()] {
            let _ = write!(out, " {:?}({:?})", token.kind, token.text);
        }
        out.push('\n');
    }
    out
}

fn write_text_output(output: &str, output_file: Option<&str>) {
    if let Some(path) = output_file {
        if let Err(e) = fs::write(path, output) {
            eprintln!("Error writing {}: {}", path, e);
            process::exit(1);
        }
    } else {
        print!("{}", output);
        if !output.is_empty() && !output.ends_with('\n') {
            println!();
        }
    }
}

fn write_binary_output(output: &[u8], output_file: Option<&str>) {
    if let Some(path) = output_file {
        if let Err(e) = fs::write(path, output) {
            eprintln!("Error writing {}: {}", path, e);
            process::exit(1);
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = handle.write_all(output) {
            eprintln!("Error writing to stdout: {}", e);
            process::exit(1);
        }
    }
}

fn print_help() {
    println!(
        "minyaml - check, inspect and transcode minimal YAML metadata

USAGE:
    minyaml [OPTIONS] [FILE]

ARGS:
    [FILE]                 Input file (reads from stdin if not provided or -)

OPTIONS:
    -t, --to <FORMAT>      Output format [default: tree]
                           Supported: tree, tokens, yaml, toml, cbor, diag

                           'tree' prints the parsed node tree, 'tokens' the
                           classified lines and their tokens.

    -k, --key <KEY>        Only output the first subtree (depth first) whose
                           key is KEY

    -o, --output <FILE>    Write output to specified file

    --check                Check if input is valid (exit 0 if valid, 1 if invalid)

    --namespace <NS>       Prefix for error and warning lines [default: minyaml]

    -v, --verbose          Log pipeline progress to stderr; repeat for more detail

    -h, --help             Print help

    -V, --version          Print version

EXAMPLES:
    # Print the node tree of a kernel metadata block
    minyaml metadata.yml

    # Validate a document
    minyaml --check metadata.yml

    # Show how each line was tokenized
    minyaml -t tokens metadata.yml

    # Extract one subtree as YAML
    minyaml -k execution_env -t yaml metadata.yml

    # Convert to TOML
    minyaml -t toml metadata.yml

    # Convert to CBOR (binary)
    minyaml -t cbor metadata.yml -o metadata.cbor

    # View the CBOR encoding in diagnostic notation (RFC 8949 §8)
    minyaml -t diag metadata.yml
"
    );
}
