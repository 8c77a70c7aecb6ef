//! Command-line tool for validating, normalizing, and inspecting yarn
//! lockfiles.
//!
//! Usage: yarnlock [OPTIONS] [FILE]
//!
//! Options:
//!   -t, --to <FORMAT>      Output format (lock, json) [default: lock]
//!   -o, --output <FILE>    Write output to specified file
//!   --check                Check if file is valid (exit 0 if valid, 1 if invalid)
//!   --roots                Print entries not referenced by any other entry
//!   -h, --help             Print help
//!   -V, --version          Print version
//!
//! With no FILE (or `-`), input is read from stdin. The default action
//! re-encodes the lockfile in canonical form to stdout.

use libyarnlock::{parse_with_filename, Lockfile};
use std::fs;
use std::io::{self, Read, Write};
use std::process;

/// Check whether a string is a recognized format name for -t.
fn is_format_name(s: &str) -> bool {
    matches!(s, "lock" | "json")
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut to_format = "lock";
    let mut output_file: Option<&str> = None;
    let mut check_only = false;
    let mut roots_only = false;
    let mut input_path: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-V" | "--version" => {
                println!("yarnlock {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "-t" | "--to" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: -t requires a format argument");
                    process::exit(1);
                }
                if !is_format_name(&args[i]) {
                    eprintln!("Error: Unknown format: {}", args[i]);
                    process::exit(1);
                }
                to_format = &args[i];
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
            "--roots" => {
                roots_only = true;
            }
            "-" => {
                // explicit stdin, same as no FILE
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                process::exit(1);
            }
            arg => {
                if input_path.is_some() {
                    eprintln!("Error: Multiple input files not supported");
                    process::exit(1);
                }
                input_path = Some(arg);
            }
        }
        i += 1;
    }

    let (content, source_name) = match read_input(input_path) {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let lockfile = match parse_with_filename(&content, Some(&source_name)) {
        Ok(lockfile) => lockfile,
        Err(e) => {
            if check_only {
                eprintln!("{}: invalid: {}", source_name, e);
            } else {
                eprintln!("Error: {}", e);
            }
            process::exit(1);
        }
    };

    if check_only {
        return;
    }

    if roots_only {
        for key in lockfile.root_entries() {
            println!("{}", key);
        }
        return;
    }

    let rendered = match render(&lockfile, to_format) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Some(path) = output_file {
        if let Err(e) = fs::write(path, &rendered) {
            eprintln!("Error: Failed to write {}: {}", path, e);
            process::exit(1);
        }
    } else {
        let mut stdout = io::stdout();
        if let Err(e) = stdout.write_all(rendered.as_bytes()) {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Read the input document from a file or stdin.
fn read_input(path: Option<&str>) -> io::Result<(String, String)> {
    match path {
        Some(p) => Ok((fs::read_to_string(p)?, p.to_string())),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok((buf, "<stdin>".to_string()))
        }
    }
}

/// Render the lockfile in the requested output format.
fn render(lockfile: &Lockfile, format: &str) -> io::Result<String> {
    match format {
        "json" => {
            let mut text = serde_json::to_string_pretty(lockfile)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            text.push('\n');
            Ok(text)
        }
        _ => {
            let mut buf = Vec::new();
            lockfile.encode(&mut buf)?;
            String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
        }
    }
}

fn print_help() {
    println!("Usage: yarnlock [OPTIONS] [FILE]");
    println!();
    println!("Parse a yarn lockfile and re-emit it in canonical form.");
    println!();
    println!("Options:");
    println!("  -t, --to <FORMAT>    Output format (lock, json) [default: lock]");
    println!("  -o, --output <FILE>  Write output to specified file");
    println!("  --check              Check if file is valid (exit 0 if valid, 1 if invalid)");
    println!("  --roots              Print entries not referenced by any other entry");
    println!("  -h, --help           Print help");
    println!("  -V, --version        Print version");
    println!();
    println!("With no FILE (or `-`), input is read from stdin.");
}
