use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use keymeta::api::Validator;
use keymeta::config::FirmwareLimits;
use keymeta::keycodes::KeycodeRegistry;
use std::path::Path;
use std::process;
use tracing::{error, info, warn, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with firmware limits; flags given on the command line win.
    #[arg(global = true, long)]
    limits: Option<String>,

    /// JSON keycode table to use instead of the built-in one.
    #[arg(global = true, long)]
    keycodes: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate metadata documents and report every issue found.
    Validate(cmd::validate::ValidateArgs),
    /// Validate one document and print its layout and default keymaps.
    Show(cmd::show::ShowArgs),
    /// List the keycode table.
    Keycodes(cmd::keycodes::KeycodesArgs),
    /// Print the built-in demo keyboard.
    Demo(cmd::demo::DemoArgs),
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let registry = match &cli.keycodes {
        Some(path) => {
            info!("Loading keycodes: {}", path);
            KeycodeRegistry::load_from_file(path).unwrap_or_else(|e| {
                error!("{}", e);
                process::exit(2);
            })
        }
        None => KeycodeRegistry::new_with_defaults(),
    };

    let (cli_limits, sub_matches) = match &cli.command {
        Commands::Validate(args) => (Some(&args.limits), matches.subcommand_matches("validate")),
        Commands::Show(args) => (Some(&args.limits), matches.subcommand_matches("show")),
        Commands::Keycodes(_) | Commands::Demo(_) => (None, None),
    };

    let limits = resolve_limits(cli.limits.as_deref(), cli_limits, sub_matches);
    let validator = Validator::new(limits, registry).unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(2);
    });

    let ok = match cli.command {
        Commands::Validate(args) => cmd::validate::run(&args, &validator),
        Commands::Show(args) => cmd::show::run(&args, &validator),
        Commands::Keycodes(args) => cmd::keycodes::run(&args, &validator.registry),
        Commands::Demo(args) => cmd::demo::run(&args, &validator.registry),
    };

    if !ok {
        process::exit(1);
    }
}

/// File limits as the base, explicit command-line flags on top.
fn resolve_limits(
    path: Option<&str>,
    cli_limits: Option<&FirmwareLimits>,
    sub_matches: Option<&clap::ArgMatches>,
) -> FirmwareLimits {
    let Some(path) = path else {
        return cli_limits.copied().unwrap_or_default();
    };

    if !Path::new(path).exists() {
        warn!("Limits file '{}' not found. Using defaults.", path);
        return cli_limits.copied().unwrap_or_default();
    }

    info!("Loading limits: {}", path);
    let mut limits = FirmwareLimits::load_from_file(path).unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(2);
    });
    if let (Some(cli_limits), Some(matches)) = (cli_limits, sub_matches) {
        limits.merge_from_cli(cli_limits, matches);
    }
    limits
}
