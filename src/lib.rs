//! IronSign - 多链钱包派生与交易载荷签名
//!
//! 从单一主种子派生 BTC/ETH/NEO 钱包，对交易所载荷做规范化签名，
//! 并按载荷类型附加各链签名与链上划转描述。所有操作都是同步纯函数。

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod service;
pub mod utils;

// 重新导出常用类型
pub use error::{Error, Result};

pub mod prelude {
    pub use crate::{
        domain::{
            coin::{Blockchain, CoinType, CurveType, Network},
            payload::{PayloadSignature, SigningPayload},
            signing_config::SigningConfig,
            wallet::{generate_payload_signing_key, generate_wallet, Wallet},
        },
        error::{Error, Result},
        service::{chain_signer::CryptoContext, payload_signer::sign_payload},
    };
}
