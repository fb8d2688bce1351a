//! 币种适配：由派生密钥生成各链钱包
//!
//! - NEO: P-256 压缩公钥 → 验证脚本 → hash160 → Base58Check (版本 0x17)
//! - ETH: Keccak-256(未压缩公钥) 后 20 字节
//! - BTC: P2SH-P2WPKH

use std::fmt;

use bitcoin::hashes::{hash160, sha256d, Hash};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::{
    domain::{
        coin::{CoinType, Network, BIP44_PURPOSE, PAYLOAD_SIGNING_PURPOSE},
        derivation::{DerivationPath, ExtendedKey},
    },
    error::DerivationError,
    infrastructure::log_redact::{redact_address, redact_secret},
};

/// NEO 地址版本字节
pub const NEO_ADDRESS_VERSION: u8 = 0x17;

/// PUSHBYTES33
const NEO_PUSH_33: u8 = 0x21;
/// CHECKSIG
const NEO_CHECKSIG: u8 = 0xac;

/// 单链钱包
///
/// 创建后不可变。包含私钥，`Debug` 输出会脱敏。
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub address: String,
    pub index: u32,
    pub private_key: String,
    pub public_key: String,
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("index", &self.index)
            .field("private_key", &redact_secret(&self.private_key))
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// 派生 `m/44'/coin'/0'/0/index` 并生成钱包
pub fn generate_wallet(
    seed: &[u8],
    coin: CoinType,
    index: u32,
    network: &Network,
) -> Result<Wallet, DerivationError> {
    let path = DerivationPath::new(BIP44_PURPOSE, coin.code(), 0, 0, index);
    let key = path.derive(seed)?;
    let wallet = wallet_from_key(&key, coin, index, network)?;

    tracing::info!(
        coin = %coin.blockchain(),
        index,
        address = %redact_address(&wallet.address),
        "wallet generated"
    );

    Ok(wallet)
}

/// 载荷签名密钥：`m/1337'/0'/0'/0/index`
///
/// 不持有资金，地址为空。
pub fn generate_payload_signing_key(seed: &[u8], index: u32) -> Result<Wallet, DerivationError> {
    let path = DerivationPath::new(PAYLOAD_SIGNING_PURPOSE, CoinType::Btc.code(), 0, 0, index);
    let key = path.derive(seed)?;
    let private_key = key.private_key()?;

    Ok(Wallet {
        address: String::new(),
        index,
        private_key: hex::encode(private_key.as_slice()),
        public_key: hex::encode(key.public_key_compressed()),
    })
}

/// 由已派生的扩展密钥生成钱包
pub fn wallet_from_key(
    key: &ExtendedKey,
    coin: CoinType,
    index: u32,
    network: &Network,
) -> Result<Wallet, DerivationError> {
    let private_key = key.private_key()?;

    let (address, public_key) = match coin {
        CoinType::Neo => {
            let public_key = neo_public_key_from_private_key(&private_key)?;
            let script_hash = neo_script_hash(&public_key);
            let address = neo_address_from_script_hash(&script_hash)?;
            (address, hex::encode(public_key))
        }
        CoinType::Eth => {
            let public_key = key.public_key_uncompressed();
            let address = eth_address_from_public_key(&public_key)?;
            (address, hex::encode(public_key))
        }
        CoinType::Btc => {
            let compressed = key.public_key_compressed();
            let address = btc_p2sh_p2wpkh_address(&compressed, network)?;
            (address, hex::encode(compressed))
        }
    };

    Ok(Wallet {
        address,
        index,
        private_key: hex::encode(private_key.as_slice()),
        public_key,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// NEO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// 以 secp256k1 派生出的标量作为 P-256 私钥，返回压缩公钥
pub fn neo_public_key_from_private_key(private_key: &[u8]) -> Result<Vec<u8>, DerivationError> {
    let secret = p256::SecretKey::from_slice(private_key)
        .map_err(|e| DerivationError::InvalidKey(format!("not a valid P-256 scalar: {}", e)))?;
    Ok(secret.public_key().to_encoded_point(true).as_bytes().to_vec())
}

/// 脚本哈希（hash160 字节反转后的 hex）
pub fn neo_script_hash(public_key: &[u8]) -> String {
    let mut script = Vec::with_capacity(public_key.len() + 2);
    script.push(NEO_PUSH_33);
    script.extend_from_slice(public_key);
    script.push(NEO_CHECKSIG);

    let mut hash = hash160::Hash::hash(&script).to_byte_array();
    hash.reverse();
    hex::encode(hash)
}

pub fn neo_address_from_script_hash(script_hash: &str) -> Result<String, DerivationError> {
    let mut hash = hex::decode(script_hash)
        .map_err(|_| DerivationError::InvalidAddress(script_hash.to_string()))?;
    if hash.len() != 20 {
        return Err(DerivationError::InvalidAddress(script_hash.to_string()));
    }
    hash.reverse();

    let mut payload = Vec::with_capacity(25);
    payload.push(NEO_ADDRESS_VERSION);
    payload.extend_from_slice(&hash);
    let checksum = sha256d::Hash::hash(&payload).to_byte_array();
    payload.extend_from_slice(&checksum[..4]);

    Ok(bs58::encode(payload).into_string())
}

/// 校验版本与校验和后取回脚本哈希
pub fn neo_script_hash_from_address(address: &str) -> Result<String, DerivationError> {
    let invalid = || DerivationError::InvalidAddress(address.to_string());

    let decoded = bs58::decode(address).into_vec().map_err(|_| invalid())?;
    if decoded.len() != 25 || decoded[0] != NEO_ADDRESS_VERSION {
        return Err(invalid());
    }

    let (payload, checksum) = decoded.split_at(21);
    let expected = sha256d::Hash::hash(payload).to_byte_array();
    if checksum != &expected[..4] {
        return Err(invalid());
    }

    let mut hash = payload[1..].to_vec();
    hash.reverse();
    Ok(hex::encode(hash))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ETH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// 小写 hex 地址，不带 0x
pub fn eth_address_from_public_key(uncompressed: &[u8]) -> Result<String, DerivationError> {
    if uncompressed.len() != 65 || uncompressed[0] != 0x04 {
        return Err(DerivationError::InvalidKey(
            "expected 65-byte uncompressed public key".to_string(),
        ));
    }
    let hash = Keccak256::digest(&uncompressed[1..]);
    Ok(hex::encode(&hash[12..]))
}

/// EIP-55 校验和地址
///
/// 哈希对应半字节 ≥ 8 时该位字母大写。
pub fn to_checksum_address(address: &str) -> String {
    let lower = address.trim_start_matches("0x").to_lowercase();
    let hash = hex::encode(Keccak256::digest(lower.as_bytes()));

    let checksummed: String = lower
        .chars()
        .zip(hash.chars())
        .map(|(c, h)| match h.to_digit(16) {
            Some(n) if n >= 8 => c.to_ascii_uppercase(),
            _ => c,
        })
        .collect();

    format!("0x{}", checksummed)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BTC
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// P2SH 包裹的 P2WPKH 地址
pub fn btc_p2sh_p2wpkh_address(
    compressed: &[u8],
    network: &Network,
) -> Result<String, DerivationError> {
    let public_key = bitcoin::PublicKey::from_slice(compressed)
        .map_err(|e| DerivationError::InvalidKey(e.to_string()))?;

    let address = bitcoin::Address::p2shwpkh(&public_key, network.bitcoin_network())
        .map_err(|e| DerivationError::InvalidKey(e.to_string()))?;

    Ok(address.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc19a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4";

    fn seed() -> Vec<u8> {
        hex::decode(SEED).unwrap()
    }

    #[test]
    fn test_eth_wallet() {
        let wallet = generate_wallet(&seed(), CoinType::Eth, 0, &Network::MainNet).unwrap();
        assert_eq!(wallet.address, "9858effd232b4033e47d90003d41ec34ecaeda94");
        assert_eq!(
            to_checksum_address(&wallet.address),
            "0x9858EfFD232B4033E47d90003D41EC34EcaEda94"
        );
        // ETH 公钥为未压缩形式
        assert_eq!(
            wallet.public_key,
            "0437b0bb7a8288d38ed49a524b5dc98cff3eb5ca824c9f9dc0dfdb3d9cd600f299a6179912b7451c09896c4098eca7ce6b2e58330672795e847c4d6af44e024230"
        );
        assert_eq!(wallet.index, 0);
    }

    #[test]
    fn test_checksum_address() {
        assert_eq!(
            to_checksum_address("fa39fddde46cea3060b91f80abed8672f77c5bea"),
            "0xfA39FdDdE46cEA3060B91f80aBed8672F77c5Bea"
        );
        assert_eq!(
            to_checksum_address("0xFA39FDDDE46CEA3060B91F80ABED8672F77C5BEA"),
            "0xfA39FdDdE46cEA3060B91f80aBed8672F77c5Bea"
        );
    }

    #[test]
    fn test_neo_wallet() {
        let wallet = generate_wallet(&seed(), CoinType::Neo, 0, &Network::MainNet).unwrap();
        assert_eq!(
            wallet.public_key,
            "02c87e7075a940128f922fc288cc5cafd341a641ab1515938b3f8cba1e3f5ba9ad"
        );
        assert_eq!(wallet.address, "AMCWa4mJqKuHznQL4ofgMpvRZ2rFA8HHo7");

        let public_key = hex::decode(&wallet.public_key).unwrap();
        assert_eq!(
            neo_script_hash(&public_key),
            "4f73279382b747381568eb8c63e1120b2b6f813b"
        );
        assert_eq!(
            neo_script_hash_from_address(&wallet.address).unwrap(),
            "4f73279382b747381568eb8c63e1120b2b6f813b"
        );
    }

    #[test]
    fn test_neo_address_rejects_bad_checksum() {
        assert!(neo_script_hash_from_address("AMCWa4mJqKuHznQL4ofgMpvRZ2rFA8HHo8").is_err());
        assert!(neo_script_hash_from_address("not-base58-0OIl").is_err());
    }

    #[test]
    fn test_btc_wallet_network_selection() {
        let main = generate_wallet(&seed(), CoinType::Btc, 0, &Network::MainNet).unwrap();
        assert_eq!(main.address, "3HkzTaFbEMWeJPLyNCNhPyGfZsVLDwdD3G");

        let local = generate_wallet(&seed(), CoinType::Btc, 0, &Network::LocalNet).unwrap();
        assert_eq!(local.address, "2N9KCXKBcqp1zWAyX3Kza1vFvnDhW3JeiKT");

        // 未知网络回退到主网常量
        let other =
            generate_wallet(&seed(), CoinType::Btc, 0, &Network::from("devnet")).unwrap();
        assert_eq!(other.address, main.address);
    }

    #[test]
    fn test_payload_signing_key() {
        let key = generate_payload_signing_key(&seed(), 1).unwrap();
        assert_eq!(key.address, "");
        assert_eq!(
            key.private_key,
            "bc161d7529397b4a13569926f810fdea7efdc6c064a6b43c874e594bd1e5e8e3"
        );
        assert_eq!(
            key.public_key,
            "02b722d77043155f52fbc622f0ded5d87b02e99413467808a1bc4a38f2670faf43"
        );
    }

    #[test]
    fn test_wallet_debug_redacts_private_key() {
        let wallet = generate_wallet(&seed(), CoinType::Eth, 0, &Network::MainNet).unwrap();
        let debug = format!("{:?}", wallet);
        assert!(!debug.contains(&wallet.private_key));
        assert!(debug.contains(&wallet.address));
    }
}
