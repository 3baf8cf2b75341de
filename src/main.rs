//! `txctl`: build, sign and broadcast transactions against a devnet node.
//!
//! ```text
//! txctl --config devnet.toml types
//! txctl --config devnet.toml build --tx-type gov_vote --sender cosmos1... \
//!       --payload '{"proposalId":1,"option":"yes"}'
//! TXCTL_PRIVATE_KEY=<hex> txctl --config devnet.toml send --tx-type bank_send ...
//! ```
//!
//! Output is JSON on stdout; logs go to stderr. The private key is read from
//! `TXCTL_PRIVATE_KEY` only, never from the command line.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::json;

use devnet_tx::config::load_config;
use devnet_tx::cosmos::signer as cosmos_signer;
use devnet_tx::observability::logging::init_logging;
use devnet_tx::{
    connect_builder, CallContext, Framework, SigningKey, TxBuildRequest, TxBuilder, TxType,
};

/// Environment variable holding the hex-encoded private key.
const PRIVATE_KEY_ENV_VAR: &str = "TXCTL_PRIVATE_KEY";

#[derive(Parser)]
#[command(name = "txctl")]
#[command(about = "Build, sign and broadcast devnet transactions", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "TXCTL_CONFIG", default_value = "txctl.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the transaction types the configured chain supports
    Types,
    /// Build a transaction (and sign it when a key is available) without sending
    Build(TxArgs),
    /// Build, sign and broadcast a transaction
    Send(TxArgs),
}

#[derive(Args)]
struct TxArgs {
    /// Transaction type token, e.g. gov_vote or native_transfer
    #[arg(long)]
    tx_type: String,

    /// Sender address in the chain's native format
    #[arg(long)]
    sender: String,

    /// JSON payload for the transaction type
    #[arg(long)]
    payload: String,

    /// Gas limit (0 = framework default)
    #[arg(long, default_value_t = 0)]
    gas_limit: u64,

    /// Gas price, e.g. 0.025stake or 2000000000
    #[arg(long)]
    gas_price: Option<String>,

    #[arg(long, default_value = "")]
    memo: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    init_logging(&config.observability);

    let ctx = CallContext::with_timeout(config.timeouts.call_timeout());
    let cancel = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling in-flight calls");
            cancel.cancel();
        }
    });

    let builder = connect_builder(&config.network, &ctx).await?;

    match cli.command {
        Commands::Types => {
            let sdk = builder.sdk_version();
            let types: Vec<&str> = builder
                .supported_tx_types()
                .iter()
                .map(TxType::as_str)
                .collect();
            let features: Vec<&str> = sdk.features.iter().map(|f| f.as_str()).collect();
            print_json(&json!({
                "framework": builder.framework(),
                "version": sdk.version,
                "features": features,
                "tx_types": types,
            }))?;
        }
        Commands::Build(args) => {
            let key = signing_key(&args.sender, false)?;
            let req = build_request(builder.as_ref(), &args, key.as_ref())?;
            let unsigned = builder.build_tx(&ctx, &req).await?;

            let mut out = json!({
                "tx_bytes": hex::encode(&unsigned.tx_bytes),
                "sign_doc": hex::encode(&unsigned.sign_doc),
                "account_number": unsigned.account_number,
                "sequence": unsigned.sequence,
            });
            if let Some(key) = key {
                let signed = builder.sign_tx(&unsigned, &key)?;
                out["signed_tx_bytes"] = json!(hex::encode(&signed.tx_bytes));
            }
            print_json(&out)?;
        }
        Commands::Send(args) => {
            let key = signing_key(&args.sender, true)?
                .ok_or_else(|| format!("{} is not set", PRIVATE_KEY_ENV_VAR))?;
            let req = build_request(builder.as_ref(), &args, Some(&key))?;
            let unsigned = builder.build_tx(&ctx, &req).await?;
            let signed = builder.sign_tx(&unsigned, &key)?;
            let result = builder.broadcast_tx(&ctx, &signed).await?;
            print_json(&serde_json::to_value(&result)?)?;
            if !result.is_accepted() {
                std::process::exit(2);
            }
        }
    }

    Ok(())
}

/// Read the signer's key from the environment.
fn signing_key(
    sender: &str,
    required: bool,
) -> Result<Option<SigningKey>, Box<dyn std::error::Error>> {
    match std::env::var(PRIVATE_KEY_ENV_VAR) {
        Ok(hex_key) => Ok(Some(SigningKey::from_hex(sender, &hex_key)?)),
        Err(_) if !required => Ok(None),
        Err(_) => Err(format!("{} is not set", PRIVATE_KEY_ENV_VAR).into()),
    }
}

fn build_request(
    builder: &dyn TxBuilder,
    args: &TxArgs,
    key: Option<&SigningKey>,
) -> Result<TxBuildRequest, Box<dyn std::error::Error>> {
    let tx_type: TxType = args.tx_type.parse()?;
    let payload: serde_json::Value = serde_json::from_str(&args.payload)
        .map_err(|e| format!("--payload is not valid JSON: {}", e))?;

    let mut req = TxBuildRequest::new(tx_type, args.sender.clone(), payload).with_memo(args.memo.clone());
    req.gas_limit = args.gas_limit;
    req.gas_price = args.gas_price.clone();

    // The signer key is part of the signed auth info on Cosmos chains.
    if let (Framework::Cosmos, Some(key)) = (builder.framework(), key) {
        let ecdsa = cosmos_signer::load_key(&key.priv_key)?;
        req.pub_key = Some(cosmos_signer::compressed_pub_key(&ecdsa));
    }
    Ok(req)
}

fn print_json(value: &serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
