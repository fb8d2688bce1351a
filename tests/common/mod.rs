//! 测试辅助模块
//! 提供固定种子、签名配置和常用载荷
#![allow(dead_code)]

use std::collections::HashMap;

use bip39::{Language, Mnemonic};
use ironsign::domain::{
    coin::{Blockchain, CoinType, Network},
    payload::{
        AddMovementPayload, BuyOrSell, CurrencyAmount, MovementType, PlaceMarketOrderPayload,
        SigningPayload,
    },
    signing_config::{Asset, Market, SigningConfig},
    wallet::{generate_payload_signing_key, generate_wallet},
};

/// BIP39 标准测试助记词
pub const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

pub const NEO_ASSET_HASH: &str = "c56f33fc6ecfcd0c225c4ab356fee59390af8560be0e930faebe74a6daff7c9b";
pub const GAS_ASSET_HASH: &str = "602c79718b16e442de58778e148d0b1084e3b2dffd5de6b7b16cee7969282de7";

pub const TEST_TIMESTAMP: u64 = 1_565_323_885_016;

pub fn test_seed() -> Vec<u8> {
    Mnemonic::parse_in(Language::English, TEST_MNEMONIC)
        .expect("valid mnemonic")
        .to_seed("")
        .to_vec()
}

/// 索引 1 的载荷签名私钥
pub fn payload_key() -> Vec<u8> {
    let wallet = generate_payload_signing_key(&test_seed(), 1).expect("payload key");
    hex::decode(wallet.private_key).expect("hex key")
}

fn asset(symbol: &str, blockchain: Blockchain, hash: &str) -> (String, Asset) {
    (
        symbol.to_string(),
        Asset {
            symbol: symbol.to_string(),
            blockchain,
            hash: hash.to_string(),
            blockchain_precision: 8,
        },
    )
}

fn market(a: &str, b: &str) -> (String, Market) {
    let name = format!("{}_{}", a, b);
    (
        name.clone(),
        Market {
            name,
            a_unit: a.to_string(),
            b_unit: b.to_string(),
            a_unit_precision: 8,
            b_unit_precision: 8,
        },
    )
}

/// 由测试种子派生全部钱包的签名配置
pub fn signing_config() -> SigningConfig {
    let seed = test_seed();

    let wallets = [CoinType::Btc, CoinType::Eth, CoinType::Neo]
        .into_iter()
        .map(|coin| {
            let wallet = generate_wallet(&seed, coin, 0, &Network::MainNet).expect("wallet");
            (coin.blockchain(), wallet)
        })
        .collect();

    SigningConfig {
        asset_data: HashMap::from([
            asset("eth", Blockchain::Eth, ""),
            asset("usdc", Blockchain::Eth, ""),
            asset("neo", Blockchain::Neo, NEO_ASSET_HASH),
            asset("gas", Blockchain::Neo, GAS_ASSET_HASH),
            asset("btc", Blockchain::Btc, ""),
        ]),
        market_data: HashMap::from([
            market("neo", "eth"),
            market("neo", "gas"),
            market("eth", "usdc"),
            market("btc", "eth"),
        ]),
        wallets,
        payload_signing_key: generate_payload_signing_key(&seed, 1).expect("payload key"),
    }
}

pub fn eth_deposit() -> SigningPayload {
    SigningPayload::AddMovement(AddMovementPayload {
        address: "fa39fddde46cea3060b91f80abed8672f77c5bea".to_string(),
        nonce: 5_432_876,
        quantity: CurrencyAmount::new("1.32450000", "eth"),
        timestamp: TEST_TIMESTAMP,
        movement_type: MovementType::Deposit,
    })
}

pub fn market_order(market_name: &str, side: BuyOrSell, amount: CurrencyAmount) -> SigningPayload {
    SigningPayload::PlaceMarketOrder(PlaceMarketOrderPayload {
        amount,
        buy_or_sell: side,
        market_name: market_name.to_string(),
        nonce_from: 1,
        nonce_order: 3,
        nonce_to: 2,
        timestamp: TEST_TIMESTAMP,
    })
}
