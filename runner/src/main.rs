extern crate arch_decoder;

mod config;

use arch_decoder::{Archive, ArchiveResult, Report};
use config::Config;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            config::print_help();
            return ExitCode::FAILURE;
        }
    };
    if config.show_help {
        config::print_help();
        return ExitCode::SUCCESS;
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> ArchiveResult<()> {
    let path = match &config.input_file {
        Some(path) => path.clone(),
        None => prompt_for_path()?,
    };

    let report = Archive::open(&path)?.decode(config.policy)?;
    log::debug!(
        "Tree has {} nodes, height {}, prefix-free codes: {}",
        report.tree.size(),
        report.tree.height(),
        report.codes.is_prefix_free()
    );

    print_report(&report, config)?;
    Ok(())
}

fn prompt_for_path() -> io::Result<PathBuf> {
    print!("Please enter filename to decode: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(PathBuf::from(line.trim()))
}

fn print_report(report: &Report, config: &Config) -> io::Result<()> {
    let mut out = io::stdout().lock();

    if config.print_tree {
        write!(out, "{}", report.tree)?;
        writeln!(out)?;
    }

    writeln!(out, "character    code")?;
    writeln!(out, "-------------------------")?;
    for (symbol, code) in report.codes.iter() {
        let shown = match symbol {
            '\n' => "\\n".to_string(),
            ' ' => "space".to_string(),
            other => other.to_string(),
        };
        writeln!(out, "{shown:<13}{code}")?;
    }

    writeln!(out, "MESSAGE:")?;
    writeln!(out, "{}", report.message)?;

    if config.print_stats {
        writeln!(out)?;
        writeln!(out, "STATISTICS:")?;
        writeln!(out, "{}", report.statistics)?;
    }
    Ok(())
}
