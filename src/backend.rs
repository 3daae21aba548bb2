use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::error::MintError;

// 已准备好的 mint 调用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreparedMint {
    // 发起铸造的账户
    pub from: Address,
    // 预估 gas
    pub gas: U256,
}

// 交易收据中页面关心的部分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    pub tx_hash: B256,
    pub success: bool,
    pub block_number: Option<u64>,
    // 从 Transfer 事件中解析出的 token_id
    pub minted_token_id: Option<U256>,
}

// 页面访问钱包和合约的接口
#[async_trait]
pub trait PassBackend: Send + Sync {
    // 加载签名者，返回账户地址
    async fn connect(&self) -> Result<Address, MintError>;

    // 丢弃签名者
    async fn disconnect(&self);

    // 读取 totalSupply()
    async fn total_supply(&self) -> Result<U256, MintError>;

    // 检查 mint() 能否从 from 发出
    async fn prepare_mint(&self, from: Address) -> Result<PreparedMint, MintError>;

    // 签名并广播 mint()，返回交易哈希
    async fn send_mint(&self, prepared: &PreparedMint) -> Result<B256, MintError>;

    // 等待收据，交易丢失时返回 Dropped
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<MintReceipt, MintError>;

    // 读取 generatePass(token_id)
    async fn generate_pass(&self, token_id: U256) -> Result<String, MintError>;
}
