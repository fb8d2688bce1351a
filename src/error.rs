//! 错误类型
//!
//! 每个组件一个封闭的错误枚举，顶层 `Error` 统一汇总并提供稳定的错误码

use thiserror::Error;

/// 数值/二进制编码错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("too many decimals given, expected {expected} got {got}")]
    TooManyDecimals { expected: u32, got: usize },
    #[error("invalid amount given: {0}")]
    InvalidAmount(String),
    #[error("could not encode data size of {0}")]
    VarIntOverflow(u64),
    #[error("nonce too large for uint32: {0}")]
    NonceTooLarge(u64),
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    #[error("invalid api key encoding: {0}")]
    InvalidApiKey(String),
}

/// 密钥派生错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerivationError {
    #[error("failed to derive master key: {0}")]
    MasterKey(String),
    #[error("failed to derive child key at index {index}: {reason}")]
    Child { index: u32, reason: String },
    #[error("derived key has no private component")]
    MissingPrivateKey,
    #[error("unknown coin type: {0}")]
    UnknownCoinType(String),
    #[error("invalid key material: {0}")]
    InvalidKey(String),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// 签名配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown asset: {0}")]
    UnknownAsset(String),
    #[error("unknown blockchain: {0}")]
    UnknownBlockchain(String),
    #[error("{0} needs a signing config")]
    MissingConfig(&'static str),
    #[error("cannot get market pairs for {0}")]
    InvalidMarket(String),
    #[error("no wallet configured for {0}")]
    MissingWallet(String),
}

/// 签名错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("cannot sign states for blockchain {0}")]
    UnsupportedStateBlockchain(String),
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("could not determine limit price for market {market} with direction {side}")]
    LimitPrice { market: String, side: String },
    #[error("key share creation failed for {blockchain}: {reason}")]
    KeyShare { blockchain: String, reason: String },
}

/// 顶层错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Derivation(#[from] DerivationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Signing(#[from] SigningError),
}

impl Error {
    /// 稳定的错误码（snake_case）
    pub fn code(&self) -> &'static str {
        match self {
            Error::Codec(e) => match e {
                CodecError::TooManyDecimals { .. } => "too_many_decimals",
                CodecError::InvalidAmount(_) => "invalid_amount",
                CodecError::VarIntOverflow(_) => "varint_overflow",
                CodecError::NonceTooLarge(_) => "nonce_too_large",
                CodecError::InvalidHex(_) => "invalid_hex",
                CodecError::InvalidApiKey(_) => "invalid_api_key",
            },
            Error::Derivation(e) => match e {
                DerivationError::MasterKey(_) => "master_key_failed",
                DerivationError::Child { .. } => "child_derivation_failed",
                DerivationError::MissingPrivateKey => "missing_private_key",
                DerivationError::UnknownCoinType(_) => "unknown_coin_type",
                DerivationError::InvalidKey(_) => "invalid_key",
                DerivationError::InvalidAddress(_) => "invalid_address",
            },
            Error::Config(e) => match e {
                ConfigError::UnknownAsset(_) => "unknown_asset",
                ConfigError::UnknownBlockchain(_) => "unknown_blockchain",
                ConfigError::MissingConfig(_) => "missing_config",
                ConfigError::InvalidMarket(_) => "invalid_market",
                ConfigError::MissingWallet(_) => "missing_wallet",
            },
            Error::Signing(e) => match e {
                SigningError::InvalidKey(_) => "invalid_signing_key",
                SigningError::Signing(_) => "signing_failed",
                SigningError::UnsupportedStateBlockchain(_) => "unsupported_state_blockchain",
                SigningError::NotImplemented(_) => "not_implemented",
                SigningError::LimitPrice { .. } => "limit_price_unresolved",
                SigningError::KeyShare { .. } => "key_share_failed",
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
