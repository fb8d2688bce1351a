//! 币种、区块链与网络
//!
//! 定义 BIP-44 coin type、区块链标识和网络选择器

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::DerivationError;

/// BIP-44 purpose
pub const BIP44_PURPOSE: u32 = 44;

/// 协议载荷签名密钥的 purpose
pub const PAYLOAD_SIGNING_PURPOSE: u32 = 1337;

/// 加密曲线类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    /// secp256k1 (Bitcoin, Ethereum)
    Secp256k1,
    /// NIST P-256 / secp256r1 (NEO)
    Secp256r1,
}

/// BIP-44 coin type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoinType {
    Btc,
    Eth,
    Neo,
}

impl CoinType {
    /// SLIP-44 编号
    pub const fn code(self) -> u32 {
        match self {
            CoinType::Btc => 0,
            CoinType::Eth => 60,
            CoinType::Neo => 888,
        }
    }

    pub fn from_code(code: u32) -> Result<Self, DerivationError> {
        match code {
            0 => Ok(CoinType::Btc),
            60 => Ok(CoinType::Eth),
            888 => Ok(CoinType::Neo),
            other => Err(DerivationError::UnknownCoinType(other.to_string())),
        }
    }

    pub const fn blockchain(self) -> Blockchain {
        match self {
            CoinType::Btc => Blockchain::Btc,
            CoinType::Eth => Blockchain::Eth,
            CoinType::Neo => Blockchain::Neo,
        }
    }
}

impl FromStr for CoinType {
    type Err = DerivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "btc" => Ok(CoinType::Btc),
            "eth" => Ok(CoinType::Eth),
            "neo" => Ok(CoinType::Neo),
            _ => Err(DerivationError::UnknownCoinType(s.to_string())),
        }
    }
}

/// 区块链标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Blockchain {
    #[serde(alias = "BTC")]
    Btc,
    #[serde(alias = "ETH")]
    Eth,
    #[serde(alias = "NEO")]
    Neo,
}

impl Blockchain {
    pub const fn coin_type(self) -> CoinType {
        match self {
            Blockchain::Btc => CoinType::Btc,
            Blockchain::Eth => CoinType::Eth,
            Blockchain::Neo => CoinType::Neo,
        }
    }

    pub const fn curve(self) -> CurveType {
        match self {
            Blockchain::Btc | Blockchain::Eth => CurveType::Secp256k1,
            Blockchain::Neo => CurveType::Secp256r1,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Blockchain::Btc => "btc",
            Blockchain::Eth => "eth",
            Blockchain::Neo => "neo",
        }
    }
}

impl fmt::Display for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Blockchain {
    type Err = crate::error::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "btc" => Ok(Blockchain::Btc),
            "eth" => Ok(Blockchain::Eth),
            "neo" => Ok(Blockchain::Neo),
            _ => Err(crate::error::ConfigError::UnknownBlockchain(s.to_string())),
        }
    }
}

/// 网络选择器
///
/// 未识别的网络名保留为 `Other`，按主网处理（BTC 地址使用主网常量）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Network {
    #[default]
    MainNet,
    TestNet,
    LocalNet,
    Other(String),
}

impl Network {
    /// 是否使用测试网常量
    pub fn is_test(&self) -> bool {
        matches!(self, Network::TestNet | Network::LocalNet)
    }

    /// 对应的 bitcoin crate 网络参数
    pub fn bitcoin_network(&self) -> bitcoin::Network {
        match self {
            Network::TestNet | Network::LocalNet => bitcoin::Network::Regtest,
            Network::MainNet | Network::Other(_) => bitcoin::Network::Bitcoin,
        }
    }
}

impl From<&str> for Network {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "mainnet" => Network::MainNet,
            "testnet" => Network::TestNet,
            "localnet" => Network::LocalNet,
            _ => Network::Other(s.to_string()),
        }
    }
}
