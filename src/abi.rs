use alloy_primitives::{Address, Bytes, Log, LogData, B256, U256};
use alloy_sol_types::{sol, SolCall, SolEvent};

use crate::error::MintError;

// 定义 Pass 合约的接口和 ERC-721 转账事件
sol! {
    // 给调用者铸造一个 pass
    function mint() external;
    // 已铸造数量
    function totalSupply() external view returns (uint256);
    // 生成指定 token 的预览引用
    function generatePass(uint256 tokenId) external pure returns (string);

    // 转账事件，铸造时 from 为零地址
    event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
}

// mint 调用数据
pub fn mint_calldata() -> Vec<u8> {
    mintCall {}.abi_encode()
}

// totalSupply 调用数据
pub fn total_supply_calldata() -> Vec<u8> {
    totalSupplyCall {}.abi_encode()
}

// generatePass 调用数据
pub fn generate_pass_calldata(token_id: U256) -> Vec<u8> {
    generatePassCall { tokenId: token_id }.abi_encode()
}

// 解码 totalSupply 返回值
pub fn decode_total_supply(data: &[u8]) -> Result<U256, MintError> {
    Ok(totalSupplyCall::abi_decode_returns(data, true)?._0)
}

// 解码 generatePass 返回值
pub fn decode_generate_pass(data: &[u8]) -> Result<String, MintError> {
    Ok(generatePassCall::abi_decode_returns(data, true)?._0)
}

// 从收据日志中找出铸造给 minter 的 token_id
// 只接受本合约发出的、from 为零地址的 Transfer 事件
pub fn minted_token_id<'a, I>(contract: Address, minter: Address, logs: I) -> Option<U256>
where
    I: IntoIterator<Item = &'a Log>,
{
    logs.into_iter()
        .filter(|log| log.address == contract)
        .filter(|log| log.data.topics().first() == Some(&Transfer::SIGNATURE_HASH))
        .filter_map(|log| Transfer::decode_log_data(&log.data, true).ok())
        .find(|transfer| transfer.from.is_zero() && transfer.to == minter)
        .map(|transfer| transfer.tokenId)
}

// 用原始的 topics 和 data 构造日志，供 RPC 层转换使用
pub fn raw_log(address: Address, topics: Vec<B256>, data: Vec<u8>) -> Log {
    Log {
        address,
        data: LogData::new_unchecked(topics, Bytes::from(data)),
    }
}
