//! Domain 模块
//!
//! 币种、密钥派生、钱包与签名载荷模型

pub mod coin;
pub mod derivation;
pub mod payload;
pub mod signing_config;
pub mod wallet;

// 重新导出常用类型
pub use coin::{Blockchain, CoinType, CurveType, Network};
pub use derivation::{DerivationPath, ExtendedKey};
pub use signing_config::SigningConfig;
pub use wallet::Wallet;
