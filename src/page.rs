use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    backend::{PassBackend, PreparedMint},
    config::MinterConfig,
    error::MintError,
    lifecycle::MintStatus,
    view::PageView,
};

/// 页面状态，视图只由它渲染
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    // 已连接的账户
    pub account: Option<Address>,
    // 最近一次成功读取的总量
    pub total_supply: Option<U256>,
    // 连接变化后重新计算
    pub prepared: Option<PreparedMint>,
    pub status: MintStatus,
    pub preview: Option<String>,
}

impl PageState {
    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }
}

// 一次完整铸造的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintOutcome {
    pub tx_hash: B256,
    pub token_id: Option<U256>,
    pub preview: Option<String>,
}

/// 铸造页面
///
/// 所有状态放在一个 watch 通道里：页面的操作是唯一的写入者，
/// 渲染和 [`MintPage::subscribe`] 的订阅者只读。
pub struct MintPage<B> {
    config: MinterConfig,
    backend: Arc<B>,
    state: watch::Sender<PageState>,
}

impl<B: PassBackend> MintPage<B> {
    pub fn new(config: MinterConfig, backend: Arc<B>) -> Self {
        let (state, _) = watch::channel(PageState::default());
        Self {
            config,
            backend,
            state,
        }
    }

    pub fn config(&self) -> &MinterConfig {
        &self.config
    }

    pub fn subscribe(&self) -> watch::Receiver<PageState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> PageState {
        self.state.borrow().clone()
    }

    pub fn view(&self) -> PageView {
        PageView::render(&self.state.borrow(), &self.config)
    }

    // 页面加载时读取一次总量
    pub async fn mount(&self) {
        self.read_total_supply().await;
    }

    // 连接钱包并重新准备 mint 调用
    pub async fn connect(&self) -> Result<Address, MintError> {
        let account = self.backend.connect().await?;
        self.state.send_modify(|state| {
            state.account = Some(account);
            state.prepared = None;
        });
        self.prepare_mint().await;
        Ok(account)
    }

    pub async fn disconnect(&self) {
        self.backend.disconnect().await;
        self.state.send_modify(|state| {
            state.account = None;
            state.prepared = None;
        });
        info!("wallet disconnected");
    }

    /// 读取 totalSupply()。
    ///
    /// 失败时返回 `None`，页面继续显示之前的值，不重试。
    pub async fn read_total_supply(&self) -> Option<U256> {
        match self.backend.total_supply().await {
            Ok(supply) => {
                self.state.send_modify(|state| state.total_supply = Some(supply));
                debug!(total_supply = %supply, "total supply loaded");
                Some(supply)
            }
            Err(error) => {
                warn!(%error, "failed to read total supply");
                None
            }
        }
    }

    // 未连接或预估失败时没有可用的 mint 调用
    pub async fn prepare_mint(&self) -> Option<PreparedMint> {
        let account = self.state.borrow().account;
        let Some(account) = account else {
            self.state.send_if_modified(|state| state.prepared.take().is_some());
            return None;
        };

        let prepared = match self.backend.prepare_mint(account).await {
            Ok(prepared) => Some(prepared),
            Err(error) => {
                debug!(%error, %account, "mint is not available");
                None
            }
        };
        // 准备期间连接变化则丢弃结果
        let mut applied = false;
        self.state.send_if_modified(|state| {
            applied = state.account == Some(account);
            if applied {
                state.prepared = prepared;
            }
            applied
        });
        prepared.filter(|_| applied)
    }

    /// 签名并广播 mint()，返回交易哈希。
    ///
    /// 检查前置条件和进入等待签名是同一次状态修改，
    /// 所以等待期间重复触发不会产生第二次写调用。
    pub async fn mint(&self) -> Result<B256, MintError> {
        let mut started = Err(MintError::NotConnected);
        self.state.send_if_modified(|state| {
            started = start_mint(state);
            started.is_ok()
        });
        let prepared = started.map_err(|error| {
            debug!(%error, "mint ignored");
            error
        })?;

        info!(from = %prepared.from, "waiting for wallet approval");
        match self.backend.send_mint(&prepared).await {
            Ok(tx_hash) => {
                self.transition(|status| status.submitted(tx_hash))?;
                info!(%tx_hash, "mint submitted");
                Ok(tx_hash)
            }
            Err(error) => {
                warn!(%error, "mint rejected");
                if let Err(stale) = self.transition(|status| status.rejected(error.to_string())) {
                    debug!(error = %stale, "mint was no longer awaiting approval");
                }
                Err(error)
            }
        }
    }

    /// 等待收据。成功后重新读取总量并确定 token_id。
    ///
    /// token_id 优先取收据中的 Transfer 事件，没有时退回到铸造后的总量。
    pub async fn wait_for_confirmation(&self, tx_hash: B256) -> Result<Option<U256>, MintError> {
        // 只等待当前已广播的那笔交易
        if !self.state.borrow().status.is_waiting_for(tx_hash) {
            return Err(MintError::UnknownTransaction { tx_hash });
        }
        let receipt = match self.backend.wait_for_receipt(tx_hash).await {
            Ok(receipt) if receipt.success => receipt,
            Ok(_) => return Err(self.fail(tx_hash, MintError::Reverted { tx_hash })),
            Err(error) => return Err(self.fail(tx_hash, error)),
        };

        let supply = self.read_total_supply().await;
        let token_id = receipt.minted_token_id.or(supply);
        self.transition(|status| status.confirmed(tx_hash, token_id))?;
        info!(
            %tx_hash,
            block = ?receipt.block_number,
            token_id = ?token_id,
            "mint confirmed"
        );
        Ok(token_id)
    }

    // token_id 为 0 也照常请求
    pub async fn generate_preview(&self, token_id: U256) -> Option<String> {
        match self.backend.generate_pass(token_id).await {
            Ok(reference) => {
                self.state.send_modify(|state| state.preview = Some(reference.clone()));
                debug!(%token_id, "preview loaded");
                Some(reference)
            }
            Err(error) => {
                warn!(%error, %token_id, "failed to generate preview");
                None
            }
        }
    }

    // 铸造、等待确认、生成预览
    pub async fn mint_and_confirm(&self) -> Result<MintOutcome, MintError> {
        let tx_hash = self.mint().await?;
        let token_id = self.wait_for_confirmation(tx_hash).await?;
        let preview = match token_id {
            Some(token_id) => self.generate_preview(token_id).await,
            None => None,
        };
        Ok(MintOutcome {
            tx_hash,
            token_id,
            preview,
        })
    }

    fn transition<F>(&self, f: F) -> Result<(), MintError>
    where
        F: FnOnce(&mut MintStatus) -> Result<(), MintError>,
    {
        let mut result = Ok(());
        self.state.send_if_modified(|state| {
            result = f(&mut state.status);
            result.is_ok()
        });
        result
    }

    fn fail(&self, tx_hash: B256, error: MintError) -> MintError {
        warn!(%error, %tx_hash, "mint failed");
        if let Err(error) = self.transition(|status| status.reverted(tx_hash, error.to_string())) {
            debug!(%error, "mint was no longer waiting for this transaction");
        }
        error
    }
}

fn start_mint(state: &mut PageState) -> Result<PreparedMint, MintError> {
    if state.status.is_pending() {
        return Err(MintError::AlreadyPending);
    }
    if !state.is_connected() {
        return Err(MintError::NotConnected);
    }
    let prepared = state.prepared.ok_or(MintError::NotPrepared)?;
    state.status.begin()?;
    state.preview = None;
    Ok(prepared)
}
