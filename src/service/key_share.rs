//! API 密钥材料与多方签名密钥分片
//!
//! 分片协议本身在外部模块中实现，这里只负责派生各链密钥、
//! 交给 `KeyShareProvider` 生成分片，并汇总为 `ApiKeyMaterial`。

use std::{collections::BTreeMap, fmt};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::{
    domain::{
        coin::{Blockchain, CurveType, Network},
        wallet::{generate_payload_signing_key, generate_wallet, to_checksum_address, Wallet},
    },
    error::{CodecError, Result, SigningError},
    infrastructure::log_redact::{redact_address, redact_secret},
};

/// API 密钥使用的载荷签名密钥索引
pub const API_PAYLOAD_KEY_INDEX: u32 = 1;

pub const API_KEY_VERSION: u32 = 0;

/// 外部多方签名模块的接入点
pub trait KeyShareProvider {
    /// 为单链私钥生成客户端分片（不透明字节）
    fn create_share(
        &self,
        private_key: &[u8],
        blockchain: Blockchain,
        curve: CurveType,
    ) -> anyhow::Result<Vec<u8>>;
}

/// 各链钱包索引
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletIndices {
    pub btc: u32,
    pub eth: u32,
    pub neo: u32,
}

impl WalletIndices {
    pub fn for_blockchain(&self, blockchain: Blockchain) -> u32 {
        match blockchain {
            Blockchain::Btc => self.btc,
            Blockchain::Eth => self.eth,
            Blockchain::Neo => self.neo,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildKey {
    pub address: String,
    pub public_key: String,
    /// hex 编码的客户端分片
    pub share: String,
}

impl fmt::Debug for ChildKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildKey")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .field("share", &redact_secret(&self.share))
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyMaterial {
    pub child_keys: BTreeMap<Blockchain, ChildKey>,
    pub payload_public_key: String,
    pub payload_signing_key: String,
    pub version: u32,
}

impl fmt::Debug for ApiKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyMaterial")
            .field("child_keys", &self.child_keys)
            .field("payload_public_key", &self.payload_public_key)
            .field("payload_signing_key", &redact_secret(&self.payload_signing_key))
            .field("version", &self.version)
            .finish()
    }
}

/// 从主种子生成 API 密钥材料
///
/// 载荷签名密钥固定取索引 1；BTC/ETH 分片使用 secp256k1，NEO 使用 secp256r1。
pub fn generate_api_keys(
    seed: &[u8],
    network: &Network,
    indices: &WalletIndices,
    provider: &dyn KeyShareProvider,
) -> Result<ApiKeyMaterial> {
    let payload_key = generate_payload_signing_key(seed, API_PAYLOAD_KEY_INDEX)?;

    let mut child_keys = BTreeMap::new();
    for blockchain in [Blockchain::Btc, Blockchain::Eth, Blockchain::Neo] {
        let wallet = generate_wallet(
            seed,
            blockchain.coin_type(),
            indices.for_blockchain(blockchain),
            network,
        )?;
        let child = child_key(&wallet, blockchain, provider)?;
        child_keys.insert(blockchain, child);
    }

    Ok(ApiKeyMaterial {
        child_keys,
        payload_public_key: payload_key.public_key.clone(),
        payload_signing_key: payload_key.private_key.clone(),
        version: API_KEY_VERSION,
    })
}

fn child_key(
    wallet: &Wallet,
    blockchain: Blockchain,
    provider: &dyn KeyShareProvider,
) -> Result<ChildKey> {
    let private_key = Zeroizing::new(
        hex::decode(&wallet.private_key)
            .map_err(|_| CodecError::InvalidHex(redact_secret(&wallet.private_key)))?,
    );

    let share = provider
        .create_share(&private_key, blockchain, blockchain.curve())
        .map_err(|e| SigningError::KeyShare {
            blockchain: blockchain.to_string(),
            reason: e.to_string(),
        })?;

    tracing::info!(
        chain = %blockchain,
        address = %redact_address(&wallet.address),
        "key share created"
    );

    let address = match blockchain {
        Blockchain::Eth => to_checksum_address(&wallet.address),
        _ => wallet.address.clone(),
    };

    Ok(ChildKey {
        address,
        public_key: wallet.public_key.clone(),
        share: hex::encode(share),
    })
}

/// JSON 后 base64 编码
pub fn encode_api_keys(keys: &ApiKeyMaterial) -> std::result::Result<String, CodecError> {
    let json = serde_json::to_vec(keys).map_err(|e| CodecError::InvalidApiKey(e.to_string()))?;
    Ok(BASE64.encode(json))
}

pub fn decode_api_keys(encoded: &str) -> std::result::Result<ApiKeyMaterial, CodecError> {
    let json = BASE64
        .decode(encoded.trim())
        .map_err(|e| CodecError::InvalidApiKey(e.to_string()))?;
    serde_json::from_slice(&json).map_err(|e| CodecError::InvalidApiKey(e.to_string()))
}
