//! 各链签名器
//!
//! 所有签名都是 RFC-6979 确定性 ECDSA。链签名编码为
//! `{1f|20}{r:64 hex}{s:64 hex}`，恢复位为 0 时前缀 `1f`，否则 `20`。

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bitcoin::hashes::{hash160, sha256d, Hash};
use secp256k1::{All, Message, Secp256k1, SecretKey};
use sha2::Sha256;
use sha3::{Digest, Keccak256};

use crate::{
    domain::{coin::Blockchain, payload::BlockchainSignature},
    error::SigningError,
    infrastructure::log_redact::redact_hex_string,
    utils::codec::encode_variable_integer,
};

/// `"\x18Bitcoin Signed Message:\n"`
pub const BTC_MESSAGE_PREFIX: &[u8] = b"\x18Bitcoin Signed Message:\n";

/// 曲线上下文
///
/// 进程启动时构造一次，以只读引用传入各签名函数。
pub struct CryptoContext {
    secp: Secp256k1<All>,
}

impl CryptoContext {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    fn secret_key(private_key: &[u8]) -> Result<SecretKey, SigningError> {
        SecretKey::from_slice(private_key).map_err(|e| SigningError::InvalidKey(e.to_string()))
    }

    /// SHA-256(message) 的 secp256k1 签名，DER 编码后转 hex
    pub fn sign_message_der(&self, private_key: &[u8], message: &str) -> Result<String, SigningError> {
        let secret = Self::secret_key(private_key)?;
        let digest: [u8; 32] = Sha256::digest(message.as_bytes()).into();
        let signature = self
            .secp
            .sign_ecdsa(&Message::from_digest(digest), &secret);
        Ok(hex::encode(&signature.serialize_der()[..]))
    }

    /// 可恢复签名，返回 `{1f|20}{r}{s}` 编码
    pub fn sign_recoverable(&self, private_key: &[u8], digest: [u8; 32]) -> Result<String, SigningError> {
        let secret = Self::secret_key(private_key)?;
        let signature = self
            .secp
            .sign_ecdsa_recoverable(&Message::from_digest(digest), &secret);
        let (recovery_id, compact) = signature.serialize_compact();
        Ok(encode_chain_signature(recovery_id.to_i32() == 0, &compact))
    }
}

impl Default for CryptoContext {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_chain_signature(parity_zero: bool, compact: &[u8]) -> String {
    let v = if parity_zero { "1f" } else { "20" };
    format!("{}{}", v, hex::encode(compact))
}

fn decode_hex(label: &str, input: &str) -> Result<Vec<u8>, SigningError> {
    hex::decode(input).map_err(|_| SigningError::Signing(format!("{} is not valid hex", label)))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 签名策略
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// 链消息签名策略
pub trait ChainSigner: Send + Sync {
    fn blockchain(&self) -> Blockchain;

    /// 对链消息签名
    ///
    /// # Arguments
    /// * `private_key` - hex 私钥
    /// * `data` - 待签名的链消息
    fn sign_data(
        &self,
        ctx: &CryptoContext,
        private_key: &str,
        data: &str,
    ) -> Result<BlockchainSignature, SigningError>;
}

/// NEO：P-256 签名 SHA-256(消息字节)
pub struct NeoSigner;

impl ChainSigner for NeoSigner {
    fn blockchain(&self) -> Blockchain {
        Blockchain::Neo
    }

    fn sign_data(
        &self,
        _ctx: &CryptoContext,
        private_key: &str,
        data: &str,
    ) -> Result<BlockchainSignature, SigningError> {
        use p256::ecdsa::SigningKey;

        let key_bytes = zeroize::Zeroizing::new(decode_hex("private key", private_key)?);
        let signing_key =
            SigningKey::from_slice(&key_bytes).map_err(|e| SigningError::InvalidKey(e.to_string()))?;

        let digest = Sha256::digest(decode_hex("NEO data", data)?);
        let (mut signature, recovery_id) = signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| SigningError::Signing(e.to_string()))?;

        // low-S 取反 s 时 y 奇偶位随之翻转
        let mut recovery_byte = recovery_id.to_byte();
        if let Some(normalized) = signature.normalize_s() {
            signature = normalized;
            recovery_byte ^= 1;
        }

        let encoded = encode_chain_signature(recovery_byte == 0, &signature.to_bytes());
        tracing::debug!(chain = "neo", signature = %redact_hex_string(&encoded, 6), "signed chain data");

        Ok(BlockchainSignature {
            blockchain: Blockchain::Neo,
            signature: encoded,
        })
    }
}

/// ETH：secp256k1 签名 Keccak-256(消息字节)
pub struct EthSigner;

impl ChainSigner for EthSigner {
    fn blockchain(&self) -> Blockchain {
        Blockchain::Eth
    }

    fn sign_data(
        &self,
        ctx: &CryptoContext,
        private_key: &str,
        data: &str,
    ) -> Result<BlockchainSignature, SigningError> {
        let key_bytes = zeroize::Zeroizing::new(decode_hex("private key", private_key)?);
        let digest: [u8; 32] = Keccak256::digest(decode_hex("ETH data", data)?).into();
        let encoded = ctx.sign_recoverable(&key_bytes, digest)?;
        tracing::debug!(chain = "eth", signature = %redact_hex_string(&encoded, 6), "signed chain data");

        Ok(BlockchainSignature {
            blockchain: Blockchain::Eth,
            signature: encoded,
        })
    }
}

/// BTC：任意数据取 hash160 后签名
pub struct BtcSigner;

impl ChainSigner for BtcSigner {
    fn blockchain(&self) -> Blockchain {
        Blockchain::Btc
    }

    fn sign_data(
        &self,
        ctx: &CryptoContext,
        private_key: &str,
        data: &str,
    ) -> Result<BlockchainSignature, SigningError> {
        sign_btc_blockchain_data(ctx, private_key, data)
    }
}

/// 对给定哈希签名；不足 32 字节时左侧补零
pub fn sign_btc(
    ctx: &CryptoContext,
    private_key: &str,
    hash: &[u8],
) -> Result<BlockchainSignature, SigningError> {
    if hash.len() > 32 {
        return Err(SigningError::Signing(format!(
            "hash too long: {} bytes",
            hash.len()
        )));
    }
    let mut digest = [0u8; 32];
    digest[32 - hash.len()..].copy_from_slice(hash);

    let key_bytes = zeroize::Zeroizing::new(decode_hex("private key", private_key)?);
    let signature = ctx.sign_recoverable(&key_bytes, digest)?;

    Ok(BlockchainSignature {
        blockchain: Blockchain::Btc,
        signature,
    })
}

/// Bitcoin 签名消息：hash256(前缀 || varint(len) || data)，结果 base64 编码
pub fn sign_btc_message(
    ctx: &CryptoContext,
    private_key: &str,
    data: &str,
) -> Result<BlockchainSignature, SigningError> {
    let length = encode_variable_integer(data.len() as u64)
        .map_err(|e| SigningError::Signing(e.to_string()))?;

    let mut payload = BTC_MESSAGE_PREFIX.to_vec();
    payload.extend(decode_hex("varint", &length)?);
    payload.extend_from_slice(data.as_bytes());

    let hash = sha256d::Hash::hash(&payload).to_byte_array();
    let mut signature = sign_btc(ctx, private_key, &hash)?;
    signature.signature = BASE64.encode(decode_hex("signature", &signature.signature)?);
    Ok(signature)
}

/// Bitcoin 任意数据签名：hash160(data)
pub fn sign_btc_blockchain_data(
    ctx: &CryptoContext,
    private_key: &str,
    data: &str,
) -> Result<BlockchainSignature, SigningError> {
    let hash = hash160::Hash::hash(data.as_bytes()).to_byte_array();
    sign_btc(ctx, private_key, &hash)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 策略工厂
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct ChainSignerFactory;

impl ChainSignerFactory {
    pub fn for_blockchain(blockchain: Blockchain) -> &'static dyn ChainSigner {
        match blockchain {
            Blockchain::Neo => &NeoSigner,
            Blockchain::Eth => &EthSigner,
            Blockchain::Btc => &BtcSigner,
        }
    }
}

#[cfg(test)]
mod tests {
    use p256::ecdsa::{signature::hazmat::PrehashVerifier, Signature, VerifyingKey};

    use super::*;

    const ETH_KEY: &str = "1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727";
    const BTC_KEY: &str = "e284129cc0922579a535bbf4d1a3b25773090d28c909bc0fed73b5e0222cc372";
    const NEO_KEY: &str = "2ddf91cbdd66e649286f602126ac74934cd693d4db567c2a52c7edc9a6e7a0f8";

    #[test]
    fn test_eth_signature_vector() {
        let ctx = CryptoContext::new();
        let data = "029858EFFD232B4033E47D90003D41EC34ECAEDA9400000000000007E506D00052E62C";
        let sig = EthSigner.sign_data(&ctx, ETH_KEY, data).unwrap();
        assert_eq!(sig.blockchain, Blockchain::Eth);
        assert_eq!(
            sig.signature,
            "202824c1de4c79b20a037aabac1fb8e735381402ad4e7470f6790fbe44a6582c397f8e7c16c7320ac56e1cefd5d0777f917263c86e35e29867d9f1473f3129b124"
        );
    }

    #[test]
    fn test_btc_message_signature_vector() {
        let ctx = CryptoContext::new();
        let sig = sign_btc_message(&ctx, BTC_KEY, "hello").unwrap();
        assert_eq!(sig.blockchain, Blockchain::Btc);
        assert_eq!(
            sig.signature,
            "IA4824BgeUflJ7q/N0w5Lis+7hQa00HZQIrA5AzM4JG5c3Rm7zQKiWKG9ltzhKUyO+E4qoBpb1KbIQI84Gq4mCc="
        );
    }

    #[test]
    fn test_btc_blockchain_data_signature_vector() {
        let ctx = CryptoContext::new();
        let sig = BtcSigner.sign_data(&ctx, BTC_KEY, "hello").unwrap();
        assert_eq!(
            sig.signature,
            "1f30623c3f7b075566438c1fe1f7dab6a1933be2573dab81a3b9332074019dc66a053f378c9f5c3d454f8c1238b135e409a44a188c599db570d694cf5fac4a349f"
        );
    }

    #[test]
    fn test_neo_signature_verifies_on_p256() {
        let ctx = CryptoContext::new();
        let data = "01abcdef";
        let sig = NeoSigner.sign_data(&ctx, NEO_KEY, data).unwrap();
        assert_eq!(sig.signature.len(), 130);
        assert!(sig.signature.starts_with("1f") || sig.signature.starts_with("20"));

        let signing_key =
            p256::ecdsa::SigningKey::from_slice(&hex::decode(NEO_KEY).unwrap()).unwrap();
        let verifying_key = VerifyingKey::from(&signing_key);
        let signature = Signature::from_slice(&hex::decode(&sig.signature[2..]).unwrap()).unwrap();
        let digest = Sha256::digest(hex::decode(data).unwrap());
        assert!(verifying_key.verify_prehash(&digest, &signature).is_ok());
        assert!(signature.normalize_s().is_none());

        // 确定性
        let again = NeoSigner.sign_data(&ctx, NEO_KEY, data).unwrap();
        assert_eq!(sig, again);
    }

    #[test]
    fn test_der_signature_is_deterministic() {
        let ctx = CryptoContext::new();
        let key = hex::decode(ETH_KEY).unwrap();
        let a = ctx.sign_message_der(&key, "get_order,{}").unwrap();
        let b = ctx.sign_message_der(&key, "get_order,{}").unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("30"));
    }

    #[test]
    fn test_invalid_key_and_data() {
        let ctx = CryptoContext::new();
        assert!(matches!(
            EthSigner.sign_data(&ctx, "zz", "00"),
            Err(SigningError::Signing(_))
        ));
        assert!(matches!(
            EthSigner.sign_data(&ctx, &"00".repeat(32), "00"),
            Err(SigningError::InvalidKey(_))
        ));
        assert!(EthSigner.sign_data(&ctx, ETH_KEY, "0g").is_err());
    }

    #[test]
    fn test_factory() {
        for chain in [Blockchain::Neo, Blockchain::Eth, Blockchain::Btc] {
            assert_eq!(ChainSignerFactory::for_blockchain(chain).blockchain(), chain);
        }
    }
}
