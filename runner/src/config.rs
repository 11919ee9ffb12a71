//! Command-line configuration for the archive decoder.
//!
//! The tool works with no arguments at all: it then asks for the archive
//! path on stdin.

use arch_decoder::DegenerateTreePolicy;
use std::path::PathBuf;

/// Resolved configuration for one decoding run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Archive to decode (None = prompt for it)
    pub input_file: Option<PathBuf>,

    /// Behaviour for trees that are a single leaf
    pub policy: DegenerateTreePolicy,

    /// Whether to print the statistics block
    pub print_stats: bool,

    /// Whether to dump the rebuilt tree structure
    pub print_tree: bool,

    /// Whether to print usage and exit
    pub show_help: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_file: None,
            policy: DegenerateTreePolicy::default(),
            print_stats: true,
            print_tree: false,
            show_help: false,
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments (without the program name).
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let mut config = Config::default();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--policy" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--policy requires a value".to_string());
                    }
                    config.policy = parse_policy(&args[i])?;
                }
                "--no-stats" => {
                    config.print_stats = false;
                }
                "--print-tree" => {
                    config.print_tree = true;
                }
                "--help" | "-h" => {
                    config.show_help = true;
                }
                flag if flag.starts_with("--") => {
                    return Err(format!("unknown argument: {flag}"));
                }
                path => {
                    if config.input_file.is_some() {
                        return Err(format!("unexpected extra argument: {path}"));
                    }
                    config.input_file = Some(PathBuf::from(path));
                }
            }
            i += 1;
        }

        Ok(config)
    }
}

fn parse_policy(value: &str) -> Result<DegenerateTreePolicy, String> {
    match value {
        "terminal" => Ok(DegenerateTreePolicy::Terminal),
        "repeat" => Ok(DegenerateTreePolicy::RepeatPerBit),
        "reject" => Ok(DegenerateTreePolicy::Reject),
        other => Err(format!(
            "invalid policy: {other} (expected terminal, repeat or reject)"
        )),
    }
}

pub fn print_help() {
    println!("runner: decode a message archived with a prefix-code tree");
    println!();
    println!("USAGE:");
    println!("    runner [OPTIONS] [FILE.arch]");
    println!();
    println!("OPTIONS:");
    println!("    --policy <POLICY>   Single-leaf tree handling: terminal (default), repeat, reject");
    println!("    --no-stats          Don't print compression statistics");
    println!("    --print-tree        Dump the rebuilt tree structure");
    println!("    --help, -h          Print this help");
    println!();
    println!("Without FILE the archive path is read from stdin.");
    println!("Set RUST_LOG=debug for decoding diagnostics.");
}
