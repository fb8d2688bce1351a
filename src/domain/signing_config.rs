//! 签名配置：资产/市场元数据与用户钱包
//!
//! 每次签名调用只读传入，签名过程不会修改。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{coin::Blockchain, wallet::Wallet},
    error::ConfigError,
};

/// 资产元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub symbol: String,
    pub blockchain: Blockchain,
    /// 链上资产标识（NEO 资产哈希、ETH 合约地址等）
    #[serde(default)]
    pub hash: String,
    #[serde(default = "default_precision")]
    pub blockchain_precision: u32,
}

fn default_precision() -> u32 {
    8
}

/// 交易对元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub name: String,
    pub a_unit: String,
    pub b_unit: String,
    #[serde(default)]
    pub a_unit_precision: u32,
    #[serde(default)]
    pub b_unit_precision: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningConfig {
    pub asset_data: HashMap<String, Asset>,
    #[serde(default)]
    pub market_data: HashMap<String, Market>,
    pub wallets: HashMap<Blockchain, Wallet>,
    pub payload_signing_key: Wallet,
}

impl SigningConfig {
    pub fn asset(&self, symbol: &str) -> Result<&Asset, ConfigError> {
        self.asset_data
            .get(symbol)
            .ok_or_else(|| ConfigError::UnknownAsset(symbol.to_string()))
    }

    pub fn blockchain_of(&self, symbol: &str) -> Result<Blockchain, ConfigError> {
        Ok(self.asset(symbol)?.blockchain)
    }

    pub fn market(&self, name: &str) -> Option<&Market> {
        self.market_data.get(name)
    }

    pub fn wallet(&self, blockchain: Blockchain) -> Result<&Wallet, ConfigError> {
        self.wallets
            .get(&blockchain)
            .ok_or_else(|| ConfigError::MissingWallet(blockchain.to_string()))
    }
}
