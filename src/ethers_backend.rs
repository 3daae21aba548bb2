use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
    sync::Arc,
};

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, PendingTransaction, Provider},
    signers::{LocalWallet, Signer},
    types::{
        transaction::eip2718::TypedTransaction, TransactionReceipt, TransactionRequest, H160,
        H256, U64,
    },
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{
    abi,
    backend::{MintReceipt, PassBackend, PreparedMint},
    config::{MinterConfig, RPC_URL},
    error::MintError,
};

type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

// 通过 JSON-RPC 访问合约的后端
pub struct EthersBackend {
    config: MinterConfig,
    provider: Provider<Http>,
    // 连接钱包后才有签名客户端
    client: RwLock<Option<Arc<Client>>>,
}

impl EthersBackend {
    pub fn new(config: MinterConfig) -> Result<Self, MintError> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| MintError::Config {
                var: RPC_URL,
                reason: e.to_string(),
            })?
            .interval(config.poll_interval);
        Ok(Self {
            config,
            provider,
            client: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &MinterConfig {
        &self.config
    }

    fn contract(&self) -> H160 {
        to_h160(self.config.contract_address)
    }

    // 只读调用
    async fn call(&self, data: Vec<u8>) -> Result<Vec<u8>, MintError> {
        let tx: TypedTransaction = TransactionRequest::new()
            .to(self.contract())
            .data(data)
            .into();
        let output = self.provider.call(&tx, None).await.map_err(rpc_error)?;
        Ok(output.to_vec())
    }

    async fn signer(&self) -> Result<Arc<Client>, MintError> {
        self.client
            .read()
            .await
            .clone()
            .ok_or(MintError::NotConnected)
    }

    fn mint_request(&self, from: Address) -> TransactionRequest {
        TransactionRequest::new()
            .from(to_h160(from))
            .to(self.contract())
            .data(abi::mint_calldata())
    }

    // 把收据转换为页面需要的结构
    fn to_mint_receipt(&self, receipt: &TransactionReceipt) -> MintReceipt {
        let logs: Vec<_> = receipt
            .logs
            .iter()
            .map(|log| {
                abi::raw_log(
                    from_h160(log.address),
                    log.topics.iter().map(|topic| B256::from(topic.0)).collect(),
                    log.data.to_vec(),
                )
            })
            .collect();
        MintReceipt {
            tx_hash: B256::from(receipt.transaction_hash.0),
            success: receipt.status == Some(U64::from(1)),
            block_number: receipt.block_number.map(|number| number.as_u64()),
            minted_token_id: abi::minted_token_id(
                self.config.contract_address,
                from_h160(receipt.from),
                &logs,
            ),
        }
    }
}

#[async_trait]
impl PassBackend for EthersBackend {
    async fn connect(&self) -> Result<Address, MintError> {
        let path = self
            .config
            .private_key_path
            .as_deref()
            .ok_or(MintError::MissingWalletKey)?;
        let key = read_secret_from_file(path)?;
        let wallet = LocalWallet::from_str(&key).map_err(|e| MintError::Wallet(e.to_string()))?;
        // 签名时需要链 id
        let chain_id = self.provider.get_chainid().await.map_err(rpc_error)?.as_u64();
        let client = SignerMiddleware::new(self.provider.clone(), wallet.with_chain_id(chain_id));
        let address = from_h160(client.address());
        *self.client.write().await = Some(Arc::new(client));
        info!(%address, chain_id, "wallet connected");
        Ok(address)
    }

    async fn disconnect(&self) {
        self.client.write().await.take();
    }

    async fn total_supply(&self) -> Result<U256, MintError> {
        let output = self.call(abi::total_supply_calldata()).await?;
        abi::decode_total_supply(&output)
    }

    async fn prepare_mint(&self, from: Address) -> Result<PreparedMint, MintError> {
        let client = self.signer().await?;
        let tx: TypedTransaction = self.mint_request(from).into();
        // 预估失败说明调用会回滚或合约不可达
        let gas = client.estimate_gas(&tx, None).await.map_err(rpc_error)?;
        let mut word = [0u8; 32];
        gas.to_big_endian(&mut word);
        debug!(%from, %gas, "mint prepared");
        Ok(PreparedMint {
            from,
            gas: U256::from_be_bytes(word),
        })
    }

    async fn send_mint(&self, prepared: &PreparedMint) -> Result<B256, MintError> {
        let client = self.signer().await?;
        if from_h160(client.address()) != prepared.from {
            return Err(MintError::NotConnected);
        }
        let tx = self
            .mint_request(prepared.from)
            .gas(ethers::types::U256::from_big_endian(&prepared.gas.to_be_bytes::<32>()));
        let pending = client
            .send_transaction(tx, None)
            .await
            .map_err(|e| MintError::Submission(e.to_string()))?;
        Ok(B256::from(pending.tx_hash().0))
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<MintReceipt, MintError> {
        let receipt = PendingTransaction::new(H256::from(tx_hash.0), &self.provider)
            .interval(self.config.poll_interval)
            .confirmations(self.config.confirmations)
            .await
            .map_err(rpc_error)?
            .ok_or(MintError::Dropped { tx_hash })?;
        Ok(self.to_mint_receipt(&receipt))
    }

    async fn generate_pass(&self, token_id: U256) -> Result<String, MintError> {
        let output = self.call(abi::generate_pass_calldata(token_id)).await?;
        abi::decode_generate_pass(&output)
    }
}

fn rpc_error(e: impl std::fmt::Display) -> MintError {
    MintError::Rpc(e.to_string())
}

fn to_h160(address: Address) -> H160 {
    H160::from_slice(address.as_slice())
}

fn from_h160(address: H160) -> Address {
    Address::from_slice(address.as_bytes())
}

// 私钥文件只取第一行
fn read_secret_from_file(path: &Path) -> Result<String, MintError> {
    let file =
        File::open(path).map_err(|e| MintError::Wallet(format!("{}: {e}", path.display())))?;
    let mut buf_reader = BufReader::new(file);
    let mut secret = String::new();
    buf_reader
        .read_line(&mut secret)
        .map_err(|e| MintError::Wallet(format!("{}: {e}", path.display())))?;
    Ok(secret.trim().to_string())
}
