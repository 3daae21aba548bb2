// 铸造 NFT pass 的客户端：连接钱包、调用 mint、等待确认并预览
pub mod abi;
pub mod backend;
pub mod config;
pub mod error;
pub mod ethers_backend;
pub mod lifecycle;
pub mod page;
pub mod view;

pub use crate::{
    backend::{MintReceipt, PassBackend, PreparedMint},
    config::MinterConfig,
    error::MintError,
    ethers_backend::EthersBackend,
    lifecycle::MintStatus,
    page::{MintOutcome, MintPage, PageState},
    view::PageView,
};
