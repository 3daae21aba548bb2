use std::fmt;

use alloy_primitives::Address;

use crate::{config::MinterConfig, lifecycle::MintStatus, page::PageState};

pub const TITLE: &str = "Pelotto";
pub const CONNECT_PROMPT: &str = "Please, connect your wallet to mint.";
pub const MINT_LABEL: &str = "Mint Pass";
pub const APPROVAL_LABEL: &str = "Waiting for approval";
pub const MINTING_LABEL: &str = "Minting...";
pub const MINTED_HEADING: &str = "NFT Minted!";
pub const MINTED_NOTE: &str = "Your NFT will show up in your wallet in the next few minutes.";

// 铸造按钮
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintButton {
    pub label: &'static str,
    pub disabled: bool,
    // 等待签名
    pub loading: bool,
    // 已广播
    pub started: bool,
}

// 铸造成功后的提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub explorer_name: String,
    pub tx_url: String,
}

/// 页面的一次渲染结果，只由 [`PageState`] 和配置决定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub account: Option<Address>,
    // 计数器文本，总量未知时为空
    pub counter: Option<String>,
    pub connect_prompt: Option<&'static str>,
    pub failure: Option<String>,
    pub button: Option<MintButton>,
    pub confirmation: Option<Confirmation>,
    pub preview: Option<String>,
}

impl PageView {
    pub fn render(state: &PageState, config: &MinterConfig) -> Self {
        let counter = state
            .total_supply
            .map(|supply| format!("{supply} minted so far!"));

        // 未连接时只显示连接提示
        let Some(account) = state.account else {
            return Self {
                account: None,
                counter,
                connect_prompt: Some(CONNECT_PROMPT),
                failure: None,
                button: None,
                confirmation: None,
                preview: None,
            };
        };

        let button = match &state.status {
            MintStatus::Confirmed { .. } => None,
            status => Some(MintButton::for_status(status)),
        };
        let failure = match &state.status {
            MintStatus::Failed { reason } => Some(format!("Mint failed: {reason}")),
            _ => None,
        };
        let confirmation = match &state.status {
            MintStatus::Confirmed { tx_hash, .. } => Some(Confirmation {
                explorer_name: config.explorer_name.clone(),
                tx_url: config.tx_url(*tx_hash),
            }),
            _ => None,
        };
        // 预览只在确认后显示
        let preview = if state.status.is_confirmed() {
            state.preview.clone()
        } else {
            None
        };

        Self {
            account: Some(account),
            counter,
            connect_prompt: None,
            failure,
            button,
            confirmation,
            preview,
        }
    }
}

impl MintButton {
    fn for_status(status: &MintStatus) -> Self {
        let loading = matches!(status, MintStatus::AwaitingApproval);
        let started = matches!(status, MintStatus::Submitted { .. });
        let label = if loading {
            APPROVAL_LABEL
        } else if started {
            MINTING_LABEL
        } else {
            MINT_LABEL
        };
        Self {
            label,
            disabled: status.is_pending(),
            loading,
            started,
        }
    }
}

impl fmt::Display for PageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {TITLE} ==")?;
        match self.account {
            Some(account) => writeln!(f, "wallet: {account}")?,
            None => writeln!(f, "wallet: not connected")?,
        }
        writeln!(f, "{}", self.counter.as_deref().unwrap_or_default())?;
        if let Some(prompt) = self.connect_prompt {
            writeln!(f, "{prompt}")?;
        }
        if let Some(failure) = &self.failure {
            writeln!(f, "{failure}")?;
        }
        if let Some(button) = &self.button {
            if button.disabled {
                writeln!(f, "[ {} ] (disabled)", button.label)?;
            } else {
                writeln!(f, "[ {} ]", button.label)?;
            }
        }
        if let Some(confirmation) = &self.confirmation {
            writeln!(f, "{MINTED_HEADING}")?;
            writeln!(f, "{MINTED_NOTE}")?;
            writeln!(
                f,
                "View on {}: {}",
                confirmation.explorer_name, confirmation.tx_url
            )?;
        }
        if let Some(preview) = &self.preview {
            writeln!(f, "preview: {preview}")?;
        }
        Ok(())
    }
}
