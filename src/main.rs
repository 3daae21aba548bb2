use std::{path::PathBuf, sync::Arc};

use alloy_primitives::U256;
use clap::{Parser, Subcommand};
use eyre::{eyre, WrapErr};
use pass_minter::{
    config::{NFT_CONTRACT, POLL_INTERVAL_MS, PRIV_KEY_PATH, RPC_URL},
    EthersBackend, MintError, MintPage, MinterConfig, PageState, PageView, PassBackend,
};
use tokio::sync::watch;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// 铸造 NFT pass 的命令行客户端
#[derive(Parser, Debug)]
#[command(name = "pass-minter", version, about)]
struct Args {
    /// Contract address, overrides NFT_CONTRACT
    #[arg(long, global = true)]
    contract: Option<String>,
    /// JSON-RPC endpoint, overrides RPC_URL
    #[arg(long, global = true)]
    rpc_url: Option<String>,
    /// File holding the wallet key, overrides PRIV_KEY_PATH
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    key: Option<PathBuf>,
    /// Receipt polling interval in milliseconds
    #[arg(long, global = true)]
    poll_interval_ms: Option<u64>,
    /// More verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the counter and the mint button
    Status,
    /// Mint a pass and wait for confirmation
    Mint,
    /// Print generatePass(TOKEN_ID)
    Preview { token_id: u64 },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    let config = load_config(&args)?;
    let backend =
        Arc::new(EthersBackend::new(config.clone()).wrap_err("failed to create rpc client")?);
    let page = MintPage::new(config, backend.clone());

    match args.command {
        Command::Status => {
            page.mount().await;
            connect_if_configured(&page).await?;
            print!("{}", page.view());
        }
        Command::Mint => {
            // 每次状态变化都重新渲染
            let printer = tokio::spawn(print_views(page.subscribe(), page.config().clone()));
            page.mount().await;
            page.connect().await.wrap_err("failed to connect wallet")?;
            let result = page.mint_and_confirm().await;
            drop(page);
            printer.await?;
            let outcome = result.wrap_err("mint failed")?;
            if outcome.preview.is_none() {
                warn!(tx_hash = %outcome.tx_hash, "minted without a preview");
            }
        }
        Command::Preview { token_id } => {
            let token_id = U256::from(token_id);
            let reference = backend
                .generate_pass(token_id)
                .await
                .wrap_err_with(|| eyre!("failed to generate pass {token_id}"))?;
            println!("{reference}");
        }
    }
    Ok(())
}

fn init_logger(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// 环境变量和 .env 为基础，命令行参数覆盖
fn load_config(args: &Args) -> eyre::Result<MinterConfig> {
    dotenv::dotenv().ok();
    config_with_overrides(args, |var| std::env::var(var).ok())
        .wrap_err("failed to load configuration")
}

fn config_with_overrides<F>(args: &Args, env: F) -> Result<MinterConfig, MintError>
where
    F: Fn(&str) -> Option<String>,
{
    let overrides: Vec<(&str, String)> = [
        (NFT_CONTRACT, args.contract.clone()),
        (RPC_URL, args.rpc_url.clone()),
        (PRIV_KEY_PATH, args.key.as_ref().map(|path| path.display().to_string())),
        (POLL_INTERVAL_MS, args.poll_interval_ms.map(|ms| ms.to_string())),
    ]
    .into_iter()
    .filter_map(|(var, value)| value.map(|value| (var, value)))
    .collect();

    MinterConfig::from_lookup(|var| {
        overrides
            .iter()
            .find(|(name, _)| *name == var)
            .map(|(_, value)| value.clone())
            .or_else(|| env(var))
    })
}

// 没有配置私钥时只读
async fn connect_if_configured<B: PassBackend>(page: &MintPage<B>) -> eyre::Result<()> {
    match page.connect().await {
        Ok(_) | Err(MintError::MissingWalletKey) => Ok(()),
        Err(e) => Err(eyre::Report::new(e).wrap_err("failed to connect wallet")),
    }
}

async fn print_views(mut states: watch::Receiver<PageState>, config: MinterConfig) {
    loop {
        let view = PageView::render(&states.borrow_and_update(), &config);
        println!("{view}");
        // 页面被丢弃后发送端关闭
        if states.changed().await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use std::{collections::HashMap, time::Duration};

    const ENV_CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
    const FLAG_CONTRACT: &str = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512";

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("pass-minter").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn flags_win_over_environment() {
        let env = env(&[
            (NFT_CONTRACT, ENV_CONTRACT),
            (RPC_URL, "http://env:8547"),
            (PRIV_KEY_PATH, "/env/key"),
            (POLL_INTERVAL_MS, "5000"),
        ]);
        let args = args(&[
            "--contract",
            FLAG_CONTRACT,
            "--rpc-url",
            "http://flag:8547",
            "--key",
            "/flag/key",
            "--poll-interval-ms",
            "100",
            "mint",
        ]);

        let config = config_with_overrides(&args, env).unwrap();
        assert_eq!(config.contract_address, FLAG_CONTRACT.parse::<Address>().unwrap());
        assert_eq!(config.rpc_url, "http://flag:8547");
        assert_eq!(config.private_key_path, Some(PathBuf::from("/flag/key")));
        assert_eq!(config.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn unset_flags_fall_through_to_environment() {
        let env = env(&[
            (NFT_CONTRACT, ENV_CONTRACT),
            (RPC_URL, "http://env:8547"),
            (PRIV_KEY_PATH, "/env/key"),
            (POLL_INTERVAL_MS, "5000"),
        ]);
        let args = args(&["--rpc-url", "http://flag:8547", "status"]);

        let config = config_with_overrides(&args, env).unwrap();
        assert_eq!(config.contract_address, ENV_CONTRACT.parse::<Address>().unwrap());
        assert_eq!(config.rpc_url, "http://flag:8547");
        assert_eq!(config.private_key_path, Some(PathBuf::from("/env/key")));
        assert_eq!(config.poll_interval, Duration::from_millis(5000));
    }

    #[test]
    fn flags_alone_are_enough() {
        let args = args(&[
            "--contract",
            FLAG_CONTRACT,
            "--rpc-url",
            "http://flag:8547",
            "status",
        ]);
        let config = config_with_overrides(&args, env(&[])).unwrap();
        assert_eq!(config.rpc_url, "http://flag:8547");
        assert_eq!(config.private_key_path, None);
    }
}
