// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use nebulas_client::blockchain::{
    network_by_name, AccountField, Amount, BlockId, ChainStateField, DecimalAmount,
    EstimateGasRequest, NebClient, NetworkConfig,
};
use nebulas_client::config::{ClientConfig, LogFormat};
use nebulas_client::NebClientError;

const DEFAULT_LOG_FILTER: &str = "info,nebulas_client=debug";

/// Query a Nebulas node and convert NAS amounts.
#[derive(Debug, Parser)]
#[command(name = "nebulas-client", version)]
struct Cli {
    /// Node API base URL (overrides --network and NEBULAS_API_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Network preset: mainnet or testnet
    #[arg(long, global = true, value_parser = |s: &str| network_by_name(Some(s)))]
    network: Option<NetworkConfig>,

    /// Log raw requests and responses
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the chain state
    State {
        #[arg(long)]
        field: Option<ChainStateField>,
    },
    /// Show an account's balance, nonce and type
    Account {
        address: String,
        #[arg(long)]
        field: Option<AccountField>,
    },
    /// Show the current gas price in wei
    GasPrice,
    /// Show a block by height or hash
    Block { block: BlockId },
    /// Show a transaction receipt
    Receipt { hash: String },
    /// Broadcast a signed, base64-encoded transaction
    SendRaw { data: String },
    /// Estimate the gas a transaction would use
    EstimateGas {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Value in wei
        #[arg(long, default_value = "0")]
        value: Amount,
        #[arg(long)]
        nonce: u64,
        /// Gas price in wei
        #[arg(long)]
        gas_price: Amount,
        #[arg(long)]
        gas_limit: u64,
    },
    /// Print the nonce to use for the next transaction
    NextNonce {
        address: String,
        /// Last nonce already used locally
        #[arg(long, default_value_t = 0)]
        local: u64,
    },
    /// Convert wei to NAS
    ToNas { wei: Amount },
    /// Convert NAS to wei
    ToWei { nas: DecimalAmount },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match LogFormat::from_env() {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    if let Err(e) = installed {
        eprintln!("warning: logging disabled: {e}");
    }
}

fn build_client(cli: &Cli) -> Result<NebClient, NebClientError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.url.as_deref() {
        config = config.with_base_url(url)?;
    } else if let Some(network) = &cli.network {
        config = config.with_base_url(network.api_url)?;
    }
    if cli.debug {
        config = config.with_debug(true);
    }
    NebClient::new(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), NebClientError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<(), NebClientError> {
    match &cli.command {
        Command::ToNas { wei } => {
            println!("{}", wei.to_nas());
            return Ok(());
        }
        Command::ToWei { nas } => {
            println!("{}", nas.to_wei()?);
            return Ok(());
        }
        _ => {}
    }

    let client = build_client(&cli)?;
    tracing::debug!(url = %client.config().base_url, "Using Nebulas node");

    match cli.command {
        Command::State { field: Some(field) } => match client.get_chain_state_field(field).await? {
            Value::String(value) => println!("{value}"),
            other => println!("{other}"),
        },
        Command::State { field: None } => print_json(&client.get_chain_state().await?)?,
        Command::Account {
            address,
            field: Some(field),
        } => println!("{}", client.get_account_state_field(&address, field).await?),
        Command::Account {
            address,
            field: None,
        } => print_json(&client.get_account_state(&address).await?)?,
        Command::GasPrice => println!("{}", client.get_gas_price().await?),
        Command::Block { block } => print_json(&client.get_block(&block).await?)?,
        Command::Receipt { hash } => print_json(&client.get_transaction_receipt(&hash).await?)?,
        Command::SendRaw { data } => println!("{}", client.send_raw_transaction(&data).await?),
        Command::EstimateGas {
            from,
            to,
            value,
            nonce,
            gas_price,
            gas_limit,
        } => {
            let request = EstimateGasRequest {
                from,
                to,
                value,
                nonce,
                gas_price,
                gas_limit,
            };
            print_json(&client.estimate_gas(&request).await?)?
        }
        Command::NextNonce { address, local } => {
            println!("{}", client.next_nonce(&address, local).await?)
        }
        Command::ToNas { .. } | Command::ToWei { .. } => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
