use std::{path::PathBuf, str::FromStr, time::Duration};

use alloy_primitives::{Address, B256};

use crate::error::MintError;

// 合约地址
pub const NFT_CONTRACT: &str = "NFT_CONTRACT";
// RPC 节点地址
pub const RPC_URL: &str = "RPC_URL";
// 私钥文件路径
pub const PRIV_KEY_PATH: &str = "PRIV_KEY_PATH";
// 区块浏览器地址
pub const EXPLORER_URL: &str = "EXPLORER_URL";
// 区块浏览器名称
pub const EXPLORER_NAME: &str = "EXPLORER_NAME";
// 收据轮询间隔，毫秒
pub const POLL_INTERVAL_MS: &str = "POLL_INTERVAL_MS";
// 需要等待的确认块数
pub const CONFIRMATIONS: &str = "CONFIRMATIONS";

pub const DEFAULT_EXPLORER_URL: &str = "https://mumbai.polygonscan.com";
pub const DEFAULT_EXPLORER_NAME: &str = "polygonscan";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);
pub const DEFAULT_CONFIRMATIONS: usize = 1;

/// 铸造客户端配置，进程启动时构造一次后注入页面和后端
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinterConfig {
    pub contract_address: Address,
    pub rpc_url: String,
    pub private_key_path: Option<PathBuf>,
    pub explorer_url: String,
    pub explorer_name: String,
    pub poll_interval: Duration,
    pub confirmations: usize,
}

impl MinterConfig {
    pub fn new(contract_address: Address, rpc_url: impl Into<String>) -> Self {
        Self {
            contract_address,
            rpc_url: rpc_url.into(),
            private_key_path: None,
            explorer_url: DEFAULT_EXPLORER_URL.into(),
            explorer_name: DEFAULT_EXPLORER_NAME.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            confirmations: DEFAULT_CONFIRMATIONS,
        }
    }

    // 先加载 .env，再从进程环境变量读取
    pub fn from_env() -> Result<Self, MintError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    // 从任意键值来源读取配置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MintError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &'static str| lookup(var).filter(|value| !value.trim().is_empty());
        let required = |var: &'static str| {
            read(var).ok_or(MintError::Config {
                var,
                reason: "not set".into(),
            })
        };

        let contract_address = parse(NFT_CONTRACT, &required(NFT_CONTRACT)?)?;
        let mut config = Self::new(contract_address, required(RPC_URL)?.trim());

        config.private_key_path = read(PRIV_KEY_PATH).map(|path| PathBuf::from(path.trim()));
        if let Some(url) = read(EXPLORER_URL) {
            config.explorer_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(name) = read(EXPLORER_NAME) {
            config.explorer_name = name.trim().to_string();
        }
        if let Some(ms) = read(POLL_INTERVAL_MS) {
            config.poll_interval = Duration::from_millis(parse(POLL_INTERVAL_MS, &ms)?);
        }
        if let Some(confirmations) = read(CONFIRMATIONS) {
            config.confirmations = parse(CONFIRMATIONS, &confirmations)?;
        }
        Ok(config)
    }

    // 交易在区块浏览器上的链接
    pub fn tx_url(&self, tx_hash: B256) -> String {
        format!(
            "{}/tx/0x{}",
            self.explorer_url.trim_end_matches('/'),
            hex::encode(tx_hash)
        )
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, MintError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| MintError::Config {
        var,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_missing() {
        let config = MinterConfig::from_lookup(lookup(&[
            (NFT_CONTRACT, CONTRACT),
            (RPC_URL, "http://localhost:8547"),
        ]))
        .unwrap();
        assert_eq!(config.contract_address, CONTRACT.parse::<Address>().unwrap());
        assert_eq!(config.rpc_url, "http://localhost:8547");
        assert_eq!(config.private_key_path, None);
        assert_eq!(config.explorer_url, DEFAULT_EXPLORER_URL);
        assert_eq!(config.explorer_name, DEFAULT_EXPLORER_NAME);
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.confirmations, 1);
    }

    #[test]
    fn reads_optional_vars() {
        let config = MinterConfig::from_lookup(lookup(&[
            (NFT_CONTRACT, CONTRACT),
            (RPC_URL, "http://localhost:8547"),
            (PRIV_KEY_PATH, "/tmp/key"),
            (EXPLORER_URL, "https://sepolia.arbiscan.io/"),
            (EXPLORER_NAME, "arbiscan"),
            (POLL_INTERVAL_MS, "250"),
            (CONFIRMATIONS, "3"),
        ]))
        .unwrap();
        assert_eq!(config.private_key_path, Some(PathBuf::from("/tmp/key")));
        assert_eq!(config.explorer_url, "https://sepolia.arbiscan.io");
        assert_eq!(config.explorer_name, "arbiscan");
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.confirmations, 3);
    }

    #[test]
    fn missing_contract_is_an_error() {
        let err = MinterConfig::from_lookup(lookup(&[(RPC_URL, "http://localhost:8547")]))
            .unwrap_err();
        assert!(matches!(err, MintError::Config { var: NFT_CONTRACT, .. }));
    }

    #[test]
    fn bad_address_is_an_error() {
        let err = MinterConfig::from_lookup(lookup(&[
            (NFT_CONTRACT, "0x1234"),
            (RPC_URL, "http://localhost:8547"),
        ]))
        .unwrap_err();
        assert!(matches!(err, MintError::Config { var: NFT_CONTRACT, .. }));
    }

    #[test]
    fn tx_url_contains_hash() {
        let config = MinterConfig::new(Address::ZERO, "http://localhost:8547");
        let hash = B256::repeat_byte(0xab);
        assert_eq!(
            config.tx_url(hash),
            format!("https://mumbai.polygonscan.com/tx/0x{}", "ab".repeat(32))
        );
    }
}
