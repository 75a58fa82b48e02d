//! Scan lookup locations and report discovered plugins
//!
//! Usage:
//!   plugin-scan [--config FILE] [--location DIR]... [--contract ID:ORIGIN:MIN[:MAX]]...
//!               [--lenient] [--include-internal] [--log-filter F]

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use plugin_discovery::discovery::ContractSet;
use plugin_discovery::utils::init_logging_from_config;
use plugin_discovery::{
    ContractConfig, DescriptorInstantiator, Discovery, DiscoveryConfig, DiscoveryEvent,
    LoggingConfig,
};

#[derive(Parser, Debug)]
#[command(name = "plugin-scan", about = "Discover plugins in module lookup locations")]
struct Args {
    /// Discovery configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lookup location, may be repeated; replaces the configured locations
    #[arg(long = "location")]
    locations: Vec<PathBuf>,

    /// Extra contract as ID:ORIGIN:MIN[:MAX], may be repeated
    #[arg(long = "contract", value_parser = parse_contract)]
    contracts: Vec<ContractConfig>,

    /// Report incompatible modules instead of failing
    #[arg(long)]
    lenient: bool,

    /// Also consider non-public types
    #[arg(long)]
    include_internal: bool,

    /// Log filter (RUST_LOG takes precedence)
    #[arg(long)]
    log_filter: Option<String>,
}

fn parse_contract(raw: &str) -> Result<ContractConfig, String> {
    let parts: Vec<&str> = raw.split(':').collect();
    match parts.as_slice() {
        [id, origin, min] => Ok(ContractConfig {
            id: id.to_string(),
            origin: origin.to_string(),
            min_version: min.to_string(),
            max_version: None,
        }),
        [id, origin, min, max] => Ok(ContractConfig {
            id: id.to_string(),
            origin: origin.to_string(),
            min_version: min.to_string(),
            max_version: Some(max.to_string()),
        }),
        _ => Err(format!("expected ID:ORIGIN:MIN[:MAX], got {raw:?}")),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DiscoveryConfig::from_file(path)?,
        None => DiscoveryConfig::default(),
    };
    if !args.locations.is_empty() {
        config.lookup_locations = args.locations.clone();
    }
    config.contracts.extend(args.contracts.iter().cloned());
    if args.lenient {
        config.fatal_on_incompatible = false;
    }
    if args.include_internal {
        config.public_only = false;
    }
    if let Some(filter) = &args.log_filter {
        config
            .logging
            .get_or_insert_with(LoggingConfig::default)
            .filter = Some(filter.clone());
    }

    init_logging_from_config(config.logging.as_ref());
    config.validate()?;

    let contracts: ContractSet = config.contract_set()?;
    if contracts.is_empty() {
        anyhow::bail!("No contracts configured; pass --contract or a config file");
    }

    let mut discovery = Discovery::new(config.loader()?, DescriptorInstantiator)
        .with_locations(config.lookup_locations.iter().cloned());
    discovery.events_mut().on_event(|event| {
        if let DiscoveryEvent::PluginIncompatibleVersion {
            module,
            contract,
            declared,
            min,
            max,
        } = event
        {
            let declared = declared
                .map(|v| v.to_string())
                .unwrap_or_else(|| "<none>".to_string());
            let max = max
                .map(|v| v.to_string())
                .unwrap_or_else(|| "*".to_string());
            println!("incompatible\t{contract}\t{module}\t{declared}\t[{min}, {max}]");
        }
    });

    let registry = discovery.run(&contracts, config.options())?;
    for contract in registry.contracts() {
        for plugin in registry.plugins(contract.id()).iter() {
            println!(
                "plugin\t{}\t{}\t{}",
                contract.id(),
                plugin.module(),
                plugin.type_name()
            );
        }
    }
    info!("{} plugin(s) discovered", registry.instance_count());

    Ok(())
}
