//! Quickhot CLI
//!
//! Connects to a dev server's update channel and reports hot updates.

use anyhow::Context;
use clap::{Parser, Subcommand};
use quickhot::client::decode_message;
use quickhot::hmr::PropagationPolicy;
use quickhot::{logging, ClientConfig, HmrClient, HotRuntime, HttpLoader, VERSION};
use std::path::PathBuf;
use std::rc::Rc;
use tokio::task::LocalSet;

#[derive(Parser)]
#[command(name = "quickhot")]
#[command(author, version, about = "A hot module replacement client runtime", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to a dev server and report hot updates
    Watch {
        /// WebSocket URL of the dev server
        url: Option<String>,

        /// Base URL modules are fetched from
        #[arg(long)]
        base: Option<String>,

        /// Self-accept updates for this module path (repeatable)
        #[arg(short, long, value_name = "PATH")]
        accept: Vec<String>,

        /// Keep-alive interval in seconds
        #[arg(long, value_name = "SECS")]
        heartbeat: Option<u64>,

        /// Ignore updates whose boundary is not the changed module
        #[arg(long)]
        ignore_propagated: bool,
    },

    /// Decode a server message and print it
    Decode {
        /// Raw JSON text of the message
        message: String,
    },
}

fn main() {
    let cli = Cli::parse();

    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Watch {
            url,
            base,
            accept,
            heartbeat,
            ignore_propagated,
        } => load_config(cli.config.as_ref()).and_then(|mut config| {
            if let Some(url) = url {
                config.server_url = url;
            }
            if let Some(base) = base {
                config.base = base;
            }
            if let Some(secs) = heartbeat {
                config.heartbeat_secs = secs;
            }
            if ignore_propagated {
                config.propagation = PropagationPolicy::Ignore;
            }
            watch(config, &accept)
        }),
        Commands::Decode { message } => decode(&message),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ClientConfig> {
    match path {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(ClientConfig::default()),
    }
}

fn watch(config: ClientConfig, accept: &[String]) -> anyhow::Result<()> {
    config.validate()?;
    tracing::debug!(version = VERSION, ?config, "starting client");

    let loader = HttpLoader::new(config.base.clone())?;
    let runtime = Rc::new(HotRuntime::with_config(loader, config));

    for path in accept {
        let owner = path.clone();
        runtime.create_hot_context(path).accept_self(move |module| match module {
            Some(module) => println!(
                "{} updated (t={}, {} bytes)",
                module.path,
                module.version,
                module.source.len()
            ),
            None => println!("{} changed but could not be fetched", owner),
        });
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building async runtime")?;

    let client = HmrClient::new(runtime);
    let local = LocalSet::new();
    local.block_on(&rt, client.run())?;
    Ok(())
}

fn decode(message: &str) -> anyhow::Result<()> {
    let decoded = decode_message(message)?;
    println!("{:#?}", decoded);
    Ok(())
}
