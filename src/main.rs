//! category-tree CLI
//!
//! ## Usage
//!
//! ```bash
//! # Print the tree held in a JSON records file
//! category-tree tree --input categories.json
//!
//! # Same, failing on parent cycles and showing compact ids
//! category-tree tree --input categories.json --strict --show-ids
//!
//! # Compact id conversions
//! category-tree encode 6f1c2a9e-3b4d-4c1e-9a7f-0d2b5e8c1a33
//! category-tree decode bxwqnjtNTB6afw0rXowaMw
//!
//! # Write a default config file
//! category-tree init-config
//! ```

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use category_tree::config::{default_config_path, OutputFormat};
use category_tree::printer::{write_json, TreePrinter};
use category_tree::{ByteOrder, CompactIdCodec, Config, JsonFileSource, TreeService};

#[derive(Parser)]
#[command(name = "category-tree")]
#[command(about = "Materialize flat category records into a tree")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "CATEGORY_TREE_CONFIG")]
    config: Option<PathBuf>,

    /// Byte order used by the compact id codec (overrides config file)
    #[arg(long, global = true, value_enum)]
    byte_order: Option<ByteOrderArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build and print the tree held in a JSON records file
    Tree {
        /// JSON file with an array of {id, name, parent_id} records
        #[arg(short, long)]
        input: PathBuf,

        /// Fail when the records contain parent cycles
        #[arg(long)]
        strict: bool,

        /// Print each node's compact id next to its name
        #[arg(long)]
        show_ids: bool,

        /// Output format (overrides config file)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Encode a UUID as a 22-character compact token
    Encode { id: Uuid },

    /// Decode a compact token back into a UUID
    Decode { token: String },

    /// Write the effective configuration to the config path
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ByteOrderArg {
    Rfc4122,
    MixedEndian,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

impl From<ByteOrderArg> for ByteOrder {
    fn from(arg: ByteOrderArg) -> Self {
        match arg {
            ByteOrderArg::Rfc4122 => ByteOrder::Rfc4122,
            ByteOrderArg::MixedEndian => ByteOrder::MixedEndian,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // Initialize tracing; stdout is reserved for tree output
    let directive = config.log_filter.as_deref().unwrap_or("category_tree=info");
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    // Apply CLI overrides
    if let Some(order) = cli.byte_order {
        config.codec.byte_order = order.into();
    }
    let codec = CompactIdCodec::new(config.codec.byte_order);

    match cli.command {
        Command::Tree {
            input,
            strict,
            show_ids,
            format,
        } => {
            if strict {
                config.build.strict = true;
            }
            if show_ids {
                config.output.show_ids = true;
            }
            if let Some(format) = format {
                config.output.format = format.into();
            }
            run_tree(&config, codec, input)
        }
        Command::Encode { id } => {
            println!("{}", codec.encode(id));
            Ok(())
        }
        Command::Decode { token } => {
            let id = codec
                .decode(&token)
                .with_context(|| format!("Invalid compact id '{}'", token))?;
            println!("{}", id);
            Ok(())
        }
        Command::InitConfig { force } => {
            if config_path.exists() && !force {
                anyhow::bail!(
                    "{} already exists, pass --force to overwrite",
                    config_path.display()
                );
            }
            config.save(&config_path)?;
            info!(path = %config_path.display(), "Wrote config");
            Ok(())
        }
    }
}

fn run_tree(config: &Config, codec: CompactIdCodec, input: PathBuf) -> anyhow::Result<()> {
    info!(input = %input.display(), strict = config.build.strict, "Building category tree");

    let service = TreeService::new(JsonFileSource::new(input)).strict(config.build.strict);
    let timed = service.build_tree()?;
    let forest = &timed.build.forest;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match config.output.format {
        OutputFormat::Json => write_json(forest, &mut out)?,
        OutputFormat::Text => {
            TreePrinter::from_config(&config.output, codec).write(forest, &mut out)?;
            writeln!(out)?;
            writeln!(
                out,
                "{} nodes, {} roots, depth {}, {} anomalies ({:.3}ms fetch, {:.3}ms build)",
                forest.node_count(),
                forest.len(),
                forest.max_depth(),
                timed.build.anomalies.len(),
                timed.fetch_time.as_secs_f64() * 1000.0,
                timed.build_time.as_secs_f64() * 1000.0,
            )?;
        }
    }

    Ok(())
}
