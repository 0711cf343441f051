//! linkman CLI
//!
//! Entry point for the `linkman` command-line tool.

use clap::{Parser, Subcommand};
use linkman::config::{self, ConfigSnapshot, LinkManagerConfig, Scope};
use linkman::{flags, uuid_hex, CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "linkman")]
#[command(about = "Inspect and edit link manager configuration", version)]
struct Cli {
    /// Path to configuration file (default: $LINKMAN_CONFIG or ./linkman.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective value of a key
    Get {
        key: String,

        /// Read from the private store
        #[arg(long)]
        private: bool,
    },

    /// Set a key
    Set {
        key: String,
        value: String,

        /// Write to the private store
        #[arg(long)]
        private: bool,

        /// Write the default layer instead of the override layer
        #[arg(long)]
        default: bool,
    },

    /// Remove a key, reverting an override to its default
    Reset {
        key: String,

        /// Write to the private store
        #[arg(long)]
        private: bool,

        /// Remove from the default layer instead of the override layer
        #[arg(long)]
        default: bool,
    },

    /// Show every stored key
    Show {
        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Print private values instead of redacting them
        #[arg(long)]
        reveal: bool,
    },

    /// Convert identifiers to and from their 32-digit hex form
    Uuid {
        #[command(subcommand)]
        action: UuidCommands,
    },

    /// Evaluate bit-flag operations on an integer
    Flags {
        /// Starting value (decimal, 0x hex or 0b binary)
        value: String,

        /// Bits to set
        #[arg(long)]
        set: Vec<String>,

        /// Bits to clear
        #[arg(long)]
        clear: Vec<String>,

        /// Bits to toggle
        #[arg(long)]
        toggle: Vec<String>,

        /// Report whether all these bits are set in the result
        #[arg(long)]
        test: Option<String>,
    },
}

#[derive(Subcommand)]
enum UuidCommands {
    /// Encode most/least significant halves
    Encode {
        #[arg(allow_negative_numbers = true)]
        most: i64,

        #[arg(allow_negative_numbers = true)]
        least: i64,
    },

    /// Decode hex text into its halves
    Decode { text: String },

    /// Generate a random identifier in hex form
    New,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = resolve_config_path(cli.config);

    match cli.command {
        Commands::Get { key, private } => run_get(&config_path, &key, scope(private)),
        Commands::Set {
            key,
            value,
            private,
            default,
        } => run_write(&config_path, &key, Some(value.as_str()), scope(private), default),
        Commands::Reset {
            key,
            private,
            default,
        } => run_write(&config_path, &key, None, scope(private), default),
        Commands::Show { json, reveal } => run_show(&config_path, json, reveal),
        Commands::Uuid { action } => run_uuid(action),
        Commands::Flags {
            value,
            set,
            clear,
            toggle,
            test,
        } => run_flags(&value, &set, &clear, &toggle, test.as_deref()),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

fn scope(private: bool) -> Scope {
    if private {
        Scope::Private
    } else {
        Scope::General
    }
}

fn load_or_exit(path: &Path) -> LinkManagerConfig {
    match config::load(path) {
        Ok(loaded) => loaded.config,
        Err(e) => {
            eprintln!("Error loading config {}: {}", path.display(), e);
            process::exit(1);
        }
    }
}

fn run_get(path: &Path, key: &str, scope: Scope) {
    let config = load_or_exit(path);
    match config.get(scope, key) {
        Some(value) => println!("{}", value),
        None => {
            eprintln!("{} key not set: {}", scope, key);
            process::exit(1);
        }
    }
}

fn run_write(path: &Path, key: &str, value: Option<&str>, scope: Scope, default: bool) {
    let config = load_or_exit(path);

    let result = if default {
        config.set_default(scope, key, value)
    } else {
        config.set(scope, key, value)
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if let Err(e) = config::save(&config, path) {
        eprintln!("Error saving config {}: {}", path.display(), e);
        process::exit(1);
    }
}

fn run_show(path: &Path, json_output: bool, reveal: bool) {
    let config = load_or_exit(path);
    let mut snapshot = ConfigSnapshot::capture(&config);
    if !reveal {
        snapshot = snapshot.redacted();
    }

    if json_output {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    println!("Configuration: {}", path.display());
    for scope in Scope::ALL {
        let layer = snapshot.layer(scope);
        println!();
        println!("[{}]", scope);
        if layer.defaults.is_empty() && layer.overrides.is_empty() {
            println!("  (empty)");
        }
        for (key, value) in &layer.overrides {
            println!("  {} = {}", key, value);
        }
        for (key, value) in &layer.defaults {
            if !layer.overrides.contains_key(key) {
                println!("  {} = {} (default)", key, value);
            }
        }
    }
    if !snapshot.database.is_default() {
        println!();
        println!("[database]");
        for (key, value) in snapshot.database.properties() {
            println!("  {} = {}", key, value);
        }
    }
}

fn run_uuid(action: UuidCommands) {
    match action {
        UuidCommands::Encode { most, least } => println!("{}", uuid_hex::encode(most, least)),
        UuidCommands::Decode { text } => match uuid_hex::decode(&text) {
            Ok((most, least)) => {
                println!("most:  {}", most);
                println!("least: {}", least);
                println!("uuid:  {}", Uuid::from_u64_pair(most as u64, least as u64));
            }
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        },
        UuidCommands::New => println!("{}", uuid_hex::encode_uuid(&Uuid::new_v4())),
    }
}

fn run_flags(value: &str, set: &[String], clear: &[String], toggle: &[String], test: Option<&str>) {
    let parse = |text: &str| match parse_int(text) {
        Some(n) => n,
        None => {
            eprintln!("Invalid integer: {}", text);
            process::exit(1);
        }
    };

    let mut word = parse(value);
    for bits in set {
        word = flags::set_flag(word, parse(bits), true);
    }
    for bits in clear {
        word = flags::set_flag(word, parse(bits), false);
    }
    for bits in toggle {
        word = flags::toggle_flag(word, parse(bits));
    }

    println!("{} (0x{:X}, 0b{:b})", word, word, word);

    if let Some(bits) = test {
        let on = flags::get_flag(word, parse(bits));
        println!("{}", on);
        if !on {
            process::exit(1);
        }
    }
}

fn parse_int(text: &str) -> Option<u64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2).ok()
    } else {
        text.parse().ok()
    }
}
