use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use pidigits::cli::{Cli, Command};
use pidigits::config::Config;
use pidigits::{CorpusError, GenerateOptions};

fn parse_level(s: &str) -> tracing::Level {
    match s.to_uppercase().as_str() {
        "TRACE" => tracing::Level::TRACE,
        "DEBUG" => tracing::Level::DEBUG,
        "INFO" => tracing::Level::INFO,
        "WARN" | "WARNING" => tracing::Level::WARN,
        "ERROR" => tracing::Level::ERROR,
        _ => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to WARN", s);
            tracing::Level::WARN
        }
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > WARN, so stdout stays clean for scripts
    let level = cli_log_level
        .or(config_log_level)
        .map(parse_level)
        .unwrap_or(tracing::Level::WARN);

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to install tracing subscriber: {}", e))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;

    debug!(?config, "pidigits starting");

    match cli.command {
        Command::Compute {
            digits,
            chunk_size,
            output_dir,
            guard,
            overwrite,
        } => {
            let output_dir = output_dir.unwrap_or(config.text_dir);
            let options = GenerateOptions {
                digits,
                chunk_size: chunk_size.unwrap_or(config.chunk_size),
                guard: guard.unwrap_or(config.guard),
                overwrite,
            };
            println!("Computing {} digits of pi...", digits);
            let manifest = pidigits::generate_corpus(&output_dir, &options)
                .context(format!("Failed to generate corpus in {}", output_dir.display()))?;
            println!(
                "{} Wrote {} digits to {}",
                "✓".green(),
                manifest.digits,
                output_dir.display().to_string().cyan()
            );
        }
        Command::Pack { input_dir, output_dir } => {
            let input_dir = input_dir.unwrap_or(config.text_dir);
            let output_dir = output_dir.unwrap_or(config.packed_dir);
            let manifest = pidigits::pack_digits(&input_dir, &output_dir).context("Failed to pack digits")?;
            println!("{}", output_dir.join(&manifest.binary_file).display());
        }
        Command::Search {
            pattern,
            input_dir,
            packed,
        } => {
            let result = if packed {
                let dir = input_dir.unwrap_or(config.packed_dir);
                pidigits::search::search_packed_with(&dir, &pattern, config.block_size)
            } else {
                let dir = input_dir.unwrap_or(config.text_dir);
                pidigits::search_chunks(&dir, &pattern)
            };
            match result {
                Ok(Some(position)) => println!("{}", position),
                Ok(None) => {
                    println!("Not found");
                    std::process::exit(1);
                }
                Err(e) => return Err(eyre::Report::new(e).wrap_err("Search failed")),
            }
        }
        Command::Hash {
            input_dir,
            output,
            verify,
        } => {
            let input_dir = input_dir.unwrap_or(config.text_dir);
            let output = output.unwrap_or_else(|| input_dir.join(pidigits::checksum::CHECKSUM_NAME));
            if verify {
                match pidigits::verify_checksums(&input_dir, &output) {
                    Ok(checked) => {
                        info!(checked, "Verification passed");
                        println!("{}", "OK".green());
                    }
                    Err(CorpusError::Integrity { failures }) => {
                        for failure in &failures {
                            eprintln!("{}", failure.to_string().red());
                        }
                        std::process::exit(1);
                    }
                    Err(e) => return Err(eyre::Report::new(e).wrap_err("Checksum verification failed")),
                }
            } else {
                let path = pidigits::write_checksums(&input_dir, &output).context("Failed to write checksums")?;
                println!("{}", path.display());
            }
        }
        Command::Compare {
            source,
            input_dir,
            normalize_output,
        } => {
            let input_dir = input_dir.unwrap_or(config.text_dir);
            let fractional = read_reference(&source)?;
            if let Some(path) = normalize_output {
                fs::write(&path, &fractional).context(format!("Failed to write {}", path.display()))?;
            }

            match pidigits::compare_corpus(&input_dir, &fractional).context("Comparison failed")? {
                pidigits::Comparison::Match => println!("{}", "MATCH".green()),
                pidigits::Comparison::Mismatch {
                    position,
                    source,
                    generated,
                } => {
                    println!("{} at position {}", "MISMATCH".red(), position);
                    if !source.is_empty() || !generated.is_empty() {
                        println!("source: {}", source);
                        println!("generated: {}", generated);
                    }
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn read_reference(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(eyre::eyre!("{} not found", path.display()));
    }
    let bytes = fs::read(path).context(format!("Failed to read {}", path.display()))?;
    let fractional = pidigits::extract_fractional(&String::from_utf8_lossy(&bytes));
    if fractional.is_empty() {
        warn!(?path, "Reference file has no digits");
        return Err(eyre::eyre!("No digits found in source"));
    }
    Ok(fractional)
}
