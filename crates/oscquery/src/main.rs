// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! OSCQuery command-line tool
//!
//! # Usage
//!
//! ```bash
//! # Serve an empty tree on the default port (9020)
//! oscquery serve
//!
//! # Serve a tree loaded from a wire-format JSON file
//! oscquery serve --tree tree.json --port 9030 --name "Test-Service"
//!
//! # Browse for two seconds, then dump every service's root
//! oscquery browse --settle 2 --path /
//! ```

use clap::{Parser, Subcommand};
use oscquery::{
    AddressSpace, Node, QueryClient, QueryServer, ServiceAdvertiser, ServiceBrowser, ServiceConfig,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// OSCQuery - publish and discover OSC address spaces
#[derive(Parser, Debug)]
#[command(name = "oscquery")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve an address space over HTTP and announce it
    Serve {
        /// Configuration file (JSON format)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Address-space tree in OSCQuery JSON
        #[arg(short, long)]
        tree: Option<PathBuf>,

        /// HTTP port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Service name (overrides config)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Browse for services on the local network
    Browse {
        /// Seconds to wait for announcements
        #[arg(short, long, default_value = "2")]
        settle: u64,

        /// Also query this path on every service
        #[arg(long)]
        path: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Serve {
            config,
            tree,
            port,
            name,
        } => {
            let mut config = match config {
                Some(path) => {
                    info!("Loading config from {:?}", path);
                    ServiceConfig::from_file(&path)?
                }
                None => ServiceConfig::default(),
            };
            if let Some(port) = port {
                config.http_port = port;
            }
            if let Some(name) = name {
                config.name = name;
            }

            let space = match tree {
                Some(path) => load_tree(&path)?,
                None => AddressSpace::new(),
            };

            // The blocking HTTP client used by `browse` cannot live inside a
            // runtime, so only `serve` gets one.
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(serve(config, space))
        }
        Command::Browse { settle, path } => browse(Duration::from_secs(settle), path.as_deref()),
    }
}

fn load_tree(path: &Path) -> Result<AddressSpace, Box<dyn std::error::Error>> {
    info!("Loading tree from {:?}", path);
    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    let tree = Node::from_wire(&json)?;

    let mut space = AddressSpace::new();
    if tree.full_path() == "/" {
        for child in tree.children() {
            space.insert(child.clone())?;
        }
    } else {
        space.insert(tree)?;
    }
    Ok(space)
}

async fn serve(config: ServiceConfig, space: AddressSpace) -> Result<(), Box<dyn std::error::Error>> {
    info!("+----------------------------------------------------+");
    info!(
        "|       OSCQuery Server v{}                      |",
        env!("CARGO_PKG_VERSION")
    );
    info!("+----------------------------------------------------+");
    info!("|  Name:   {:40} |", config.name);
    info!("|  HTTP:   {:40} |", config.http_addr());
    info!(
        "|  OSC:    {:40} |",
        format!("{}:{} ({})", config.osc_ip, config.osc_port, config.osc_transport)
    );
    info!("|  Nodes:  {:40} |", space.count());
    info!("+----------------------------------------------------+");

    let mut advertiser = if config.advertise {
        Some(ServiceAdvertiser::start(&config)?)
    } else {
        None
    };

    let server = QueryServer::new(config, space.into_shared())?;

    let server_handle = server.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received, stopping server...");
        server_handle.shutdown();
    });

    let result = server.run().await;

    if let Some(advertiser) = advertiser.as_mut() {
        if let Err(e) = advertiser.shutdown() {
            warn!("Failed to withdraw announcements: {}", e);
        }
    }

    result?;
    info!("OSCQuery server stopped");
    Ok(())
}

fn browse(settle: Duration, path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mut browser = ServiceBrowser::start()?;
    info!("Waiting {:?} for announcements...", settle);
    std::thread::sleep(settle);
    browser.stop();

    let services = browser.discovered();
    if services.is_empty() {
        println!("No services found");
        return Ok(());
    }

    for service in services {
        println!("{} at {}", service.name, service.socket_addr());

        let client = QueryClient::new(service)?;
        match client.host_info() {
            Ok(host_info) => println!("{}", serde_json::to_string_pretty(&host_info)?),
            Err(e) => {
                warn!("Host info failed: {}", e);
                continue;
            }
        }

        if let Some(path) = path {
            match client.query_node(path) {
                Ok(Some(node)) => {
                    println!("{}", serde_json::to_string_pretty(&node.to_wire(None))?)
                }
                Ok(None) => println!("{}: not found", path),
                Err(e) => warn!("Query of {} failed: {}", path, e),
            }
        }
    }
    Ok(())
}
