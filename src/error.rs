use alloy_primitives::B256;
use thiserror::Error;

// 铸造客户端的错误类型
#[derive(Debug, Error)]
pub enum MintError {
    // 钱包未连接
    #[error("wallet is not connected")]
    NotConnected,
    // mint 调用尚未准备好
    #[error("mint call is not prepared")]
    NotPrepared,
    // 上一次铸造仍在等待签名或确认
    #[error("a mint is already pending")]
    AlreadyPending,
    // 本页面已经铸造完成
    #[error("pass already minted on this page")]
    AlreadyMinted,
    // 没有配置钱包私钥
    #[error("no wallet key configured, set PRIV_KEY_PATH")]
    MissingWalletKey,
    #[error("wallet error: {0}")]
    Wallet(String),
    #[error("rpc error: {0}")]
    Rpc(String),
    // 签名或广播失败
    #[error("transaction was not submitted: {0}")]
    Submission(String),
    // 交易执行失败
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: B256 },
    // 交易从交易池中消失
    #[error("transaction {tx_hash} was dropped")]
    Dropped { tx_hash: B256 },
    // 不是当前铸造的交易
    #[error("transaction {tx_hash} is not the pending mint")]
    UnknownTransaction { tx_hash: B256 },
    #[error("abi decode error: {0}")]
    Decode(#[from] alloy_sol_types::Error),
    // 配置项错误
    #[error("invalid {var}: {reason}")]
    Config { var: &'static str, reason: String },
}
