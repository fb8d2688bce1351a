//! 分层密钥派生
//!
//! BIP-32/BIP-44 派生：`m/purpose'/coin_type'/account'/change/index`
//! purpose、coin_type、account 为硬化派生，change、index 为普通派生。

use std::fmt;

use coins_bip32::primitives::XKeyInfo;
use k256::ecdsa::SigningKey;
use zeroize::Zeroizing;

use crate::error::DerivationError;

/// 硬化派生偏移量
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// 派生路径 (purpose, coin_type, account, change, index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    pub purpose: u32,
    pub coin_type: u32,
    pub account: u32,
    pub change: u32,
    pub index: u32,
}

impl DerivationPath {
    pub fn new(purpose: u32, coin_type: u32, account: u32, change: u32, index: u32) -> Self {
        Self {
            purpose,
            coin_type,
            account,
            change,
            index,
        }
    }

    /// 按路径完整派生
    pub fn derive(&self, seed: &[u8]) -> Result<ExtendedKey, DerivationError> {
        let chain_key =
            derive_chain_key(seed, self.purpose, self.coin_type, self.account, self.change)?;
        derive_index(&chain_key, self.index)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m/{}'/{}'/{}'/{}/{}",
            self.purpose, self.coin_type, self.account, self.change, self.index
        )
    }
}

/// 扩展私钥
///
/// 封装 coins-bip32 的 `XPriv`，只读暴露私钥、公钥、链码与深度。
#[derive(Clone)]
pub struct ExtendedKey {
    inner: coins_bip32::prelude::XPriv,
}

impl ExtendedKey {
    fn signing_key(&self) -> &SigningKey {
        self.inner.as_ref()
    }

    /// 32 字节私钥标量；全零视为缺失
    pub fn private_key(&self) -> Result<Zeroizing<Vec<u8>>, DerivationError> {
        let bytes = Zeroizing::new(self.signing_key().to_bytes().to_vec());
        if bytes.len() != 32 || bytes.iter().all(|b| *b == 0) {
            return Err(DerivationError::MissingPrivateKey);
        }
        Ok(bytes)
    }

    /// secp256k1 压缩公钥 (33 字节)
    pub fn public_key_compressed(&self) -> Vec<u8> {
        self.signing_key()
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }

    /// secp256k1 未压缩公钥 (65 字节，0x04 前缀)
    pub fn public_key_uncompressed(&self) -> Vec<u8> {
        self.signing_key()
            .verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }

    fn key_info(&self) -> &XKeyInfo {
        self.inner.as_ref()
    }

    pub fn chain_code(&self) -> [u8; 32] {
        self.key_info().chain_code.0
    }

    pub fn depth(&self) -> u8 {
        self.key_info().depth
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("depth", &self.depth())
            .field("public_key", &hex::encode(self.public_key_compressed()))
            .finish_non_exhaustive()
    }
}

/// 从种子派生到 change 层
///
/// purpose、coin_type、account 做硬化派生，change 做普通派生。
pub fn derive_chain_key(
    seed: &[u8],
    purpose: u32,
    coin_type: u32,
    account: u32,
    change: u32,
) -> Result<ExtendedKey, DerivationError> {
    use coins_bip32::prelude::*;

    let master = XPriv::root_from_seed(seed, None)
        .map_err(|e| DerivationError::MasterKey(e.to_string()))?;

    let mut key = master;
    for index in [
        purpose | HARDENED_OFFSET,
        coin_type | HARDENED_OFFSET,
        account | HARDENED_OFFSET,
        change,
    ] {
        key = key
            .derive_child(index)
            .map_err(|e| DerivationError::Child {
                index,
                reason: e.to_string(),
            })?;
    }

    tracing::debug!(purpose, coin_type, account, change, "derived chain key");

    Ok(ExtendedKey { inner: key })
}

/// 在 change 层之下派生地址索引（普通派生）
pub fn derive_index(chain_key: &ExtendedKey, index: u32) -> Result<ExtendedKey, DerivationError> {
    use coins_bip32::prelude::*;

    let child = chain_key
        .inner
        .derive_child(index)
        .map_err(|e| DerivationError::Child {
            index,
            reason: e.to_string(),
        })?;

    Ok(ExtendedKey { inner: child })
}
