//! Clap command tree definition.

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("morph")
        .about("Run contract-checked image pipelines")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .help("Config file (default: ./morph.toml if present)")
                .value_parser(value_parser!(std::path::PathBuf))
                .global(true),
        )
        .subcommand(build_checkerboard())
        .subcommand(build_noise())
        .subcommand(build_analyze())
        .subcommand(build_init_config())
}

fn dimension_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("width")
            .long("width")
            .help("Image width in pixels")
            .value_parser(value_parser!(usize)),
    )
    .arg(
        Arg::new("height")
            .long("height")
            .help("Image height in pixels")
            .value_parser(value_parser!(usize)),
    )
    .arg(
        Arg::new("output")
            .long("output")
            .short('o')
            .help("Output PNG path")
            .value_parser(value_parser!(std::path::PathBuf)),
    )
}

fn build_checkerboard() -> Command {
    dimension_args(Command::new("checkerboard").about("Render a red checkerboard to PNG"))
}

fn build_noise() -> Command {
    dimension_args(Command::new("noise").about("Render a simplex noise map to PNG"))
        .arg(
            Arg::new("frequency")
                .long("frequency")
                .help("Sampling step per pixel")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("Noise permutation seed")
                .value_parser(value_parser!(u64)),
        )
}

fn build_analyze() -> Command {
    Command::new("analyze")
        .about("Print the compatibility analysis of the bundled pipelines")
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output")
                .action(ArgAction::SetTrue),
        )
}

fn build_init_config() -> Command {
    Command::new("init-config")
        .about("Write a default morph.toml if none exists")
        .arg(
            Arg::new("path")
                .help("Destination (default: ./morph.toml)")
                .value_parser(value_parser!(std::path::PathBuf)),
        )
}
