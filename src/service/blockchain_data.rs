//! 链上签名数据构造
//!
//! 为资金划转和下单构造各链需要签名的消息（大写 hex），以及划转描述。

use std::{collections::HashMap, str::FromStr};

use once_cell::sync::Lazy;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    domain::{
        coin::Blockchain,
        payload::{
            AddMovementPayload, BlockchainMovement, BlockchainSignature, BuyOrSell,
            CurrencyPrice, MovementType, OrderData,
        },
        signing_config::{Asset, SigningConfig},
        wallet::neo_script_hash_from_address,
    },
    error::{CodecError, ConfigError, Result, SigningError},
    utils::codec::{
        convert_eth_nonce, normalize_amount, reverse_hex, to_big_endian_hex, to_little_endian_hex,
    },
};

/// 链上金额精度
pub const BLOCKCHAIN_PRECISION: u32 = 8;

/// 下单最大手续费（0.0025，8 位精度）
pub const MAX_ORDER_FEE: i64 = 250_000;

pub const ORDER_PREFIX: &str = "01";
pub const DEPOSIT_PREFIX: &str = "02";
pub const WITHDRAWAL_PREFIX: &str = "03";

/// 市价单的最低/最高汇率
const MIN_ORDER_RATE: i64 = 0;
const MAX_ORDER_RATE: &str = "FFFFFFFFFFFFFFFF";

/// 非 NEO 资产在 NEO 合约中的占位哈希
const NEO_FOREIGN_ASSET_HASH: &str = "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF";

/// 未登记资产的 ETH 资产 ID
const ETH_UNKNOWN_ASSET_ID: &str = "ffff";

/// ETH 合约资产 ID 表
static ETH_ASSET_IDS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("eth", "0000"),
        ("bat", "0001"),
        ("omg", "0002"),
        ("usdc", "0003"),
        ("zrx", "0004"),
        ("link", "0005"),
        ("qnt", "0006"),
        ("rlc", "0007"),
    ])
});

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 市场与价格
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitPairs {
    pub unit_a: String,
    pub unit_b: Option<String>,
}

/// 拆分市场名 `a_b`；只接受 1 或 2 段
pub fn get_unit_pairs(market: &str) -> std::result::Result<UnitPairs, ConfigError> {
    let parts: Vec<&str> = market.split('_').collect();
    match parts.as_slice() {
        [a] => Ok(UnitPairs {
            unit_a: a.to_string(),
            unit_b: None,
        }),
        [a, b] => Ok(UnitPairs {
            unit_a: a.to_string(),
            unit_b: Some(b.to_string()),
        }),
        _ => Err(ConfigError::InvalidMarket(market.to_string())),
    }
}

/// 下单需要的两个资产 (A, B)；配置中登记了该市场时要求一致
fn market_units(config: &SigningConfig, market: &str) -> Result<(String, String)> {
    let pairs = get_unit_pairs(market)?;
    let unit_b = pairs
        .unit_b
        .ok_or_else(|| ConfigError::InvalidMarket(market.to_string()))?;

    if let Some(known) = config.market(market) {
        if known.a_unit != pairs.unit_a || known.b_unit != unit_b {
            return Err(ConfigError::InvalidMarket(market.to_string()).into());
        }
    }
    Ok((pairs.unit_a, unit_b))
}

/// 解析限价
///
/// 买单支付 B、卖单支付 A。价格若以另一资产计价则取倒数，向零截断到 8 位小数。
pub fn get_limit_price(
    market: &str,
    buy_or_sell: BuyOrSell,
    limit_price: &CurrencyPrice,
) -> Result<String> {
    let pairs = get_unit_pairs(market)?;
    let asset_from = match buy_or_sell {
        BuyOrSell::Sell => Some(pairs.unit_a.as_str()),
        BuyOrSell::Buy => pairs.unit_b.as_deref(),
    };

    match asset_from {
        Some(from) if limit_price.currency_a == from => Ok(limit_price.amount.clone()),
        Some(from) if limit_price.currency_b == from => invert_price(&limit_price.amount),
        _ => Err(SigningError::LimitPrice {
            market: market.to_string(),
            side: buy_or_sell.as_str().to_string(),
        }
        .into()),
    }
}

fn invert_price(amount: &str) -> Result<String> {
    let invalid = || CodecError::InvalidAmount(amount.to_string());

    let price = Decimal::from_str(amount).map_err(|_| invalid())?;
    if price <= Decimal::ZERO {
        return Err(invalid().into());
    }

    let mut reciprocal = Decimal::ONE
        .checked_div(price)
        .ok_or_else(invalid)?
        .round_dp_with_strategy(BLOCKCHAIN_PRECISION, RoundingStrategy::ToZero);
    reciprocal.rescale(BLOCKCHAIN_PRECISION);
    Ok(reciprocal.to_string())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 资产标识
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub fn neo_asset_hash(asset: &Asset) -> Result<String> {
    match asset.blockchain {
        Blockchain::Neo => Ok(reverse_hex(asset.hash.trim_start_matches("0x"))?),
        _ => Ok(NEO_FOREIGN_ASSET_HASH.to_string()),
    }
}

pub fn eth_asset_id(symbol: &str) -> &'static str {
    ETH_ASSET_IDS
        .get(symbol)
        .copied()
        .unwrap_or(ETH_UNKNOWN_ASSET_ID)
}

pub fn movement_prefix(movement_type: MovementType) -> &'static str {
    match movement_type {
        MovementType::Deposit => DEPOSIT_PREFIX,
        MovementType::Withdrawal => WITHDRAWAL_PREFIX,
    }
}

/// NEO 钱包地址的脚本哈希，按合约需要的字节序
fn neo_wallet_script_hash(config: &SigningConfig) -> Result<String> {
    let wallet = config.wallet(Blockchain::Neo)?;
    let script_hash = neo_script_hash_from_address(&wallet.address)?;
    Ok(reverse_hex(&script_hash)?)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 资金划转
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub fn build_movement_data(
    config: &SigningConfig,
    payload: &AddMovementPayload,
    blockchain: Blockchain,
) -> Result<String> {
    match blockchain {
        Blockchain::Neo => build_neo_movement_data(config, payload),
        Blockchain::Eth => build_eth_movement_data(config, payload),
        Blockchain::Btc => Err(SigningError::NotImplemented("BTC movement signature data").into()),
    }
}

fn build_neo_movement_data(config: &SigningConfig, payload: &AddMovementPayload) -> Result<String> {
    let asset = config.asset(&payload.quantity.currency)?;
    let amount = normalize_amount(&payload.quantity.amount, BLOCKCHAIN_PRECISION)?;

    let data = [
        movement_prefix(payload.movement_type).to_string(),
        neo_wallet_script_hash(config)?,
        neo_asset_hash(asset)?,
        to_little_endian_hex(amount),
        to_little_endian_hex(nonce_i64(payload.nonce)?),
    ]
    .concat();

    Ok(data.to_uppercase())
}

fn build_eth_movement_data(config: &SigningConfig, payload: &AddMovementPayload) -> Result<String> {
    let wallet = config.wallet(Blockchain::Eth)?;
    let amount = normalize_amount(&payload.quantity.amount, BLOCKCHAIN_PRECISION)?;

    let data = [
        movement_prefix(payload.movement_type).to_string(),
        wallet.address.trim_start_matches("0x").to_string(),
        eth_asset_id(&payload.quantity.currency).to_string(),
        to_big_endian_hex(amount),
        convert_eth_nonce(payload.nonce)?,
    ]
    .concat();

    Ok(data.to_uppercase())
}

/// 链上划转描述；`signatures` 的第一项为该链的签名
pub fn get_blockchain_movement(
    config: &SigningConfig,
    payload: &AddMovementPayload,
    signatures: &[BlockchainSignature],
) -> Result<BlockchainMovement> {
    let unit = &payload.quantity.currency;
    let asset = config.asset(unit)?;
    let prefix = movement_prefix(payload.movement_type).to_string();
    let amount = normalize_amount(&payload.quantity.amount, BLOCKCHAIN_PRECISION)?;

    let user_sig = signatures
        .first()
        .map(|s| s.signature.clone())
        .ok_or_else(|| SigningError::Signing("movement needs a blockchain signature".to_string()))?;

    match asset.blockchain {
        Blockchain::Neo => {
            let wallet = config.wallet(Blockchain::Neo)?;
            Ok(BlockchainMovement {
                address: neo_wallet_script_hash(config)?,
                amount: to_little_endian_hex(amount),
                asset: neo_asset_hash(asset)?,
                nonce: to_little_endian_hex(nonce_i64(payload.nonce)?),
                prefix,
                user_pub_key: wallet.public_key.clone(),
                user_sig,
            })
        }
        Blockchain::Eth => {
            let wallet = config.wallet(Blockchain::Eth)?;
            Ok(BlockchainMovement {
                address: wallet.address.clone(),
                amount: amount.to_string(),
                asset: eth_asset_id(unit).to_string(),
                nonce: convert_eth_nonce(payload.nonce)?,
                prefix,
                user_pub_key: wallet.address.clone(),
                user_sig,
            })
        }
        Blockchain::Btc => Err(SigningError::NotImplemented("BTC movement").into()),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 下单
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// 下单的资产方向与汇率（均为 8 位精度整数）
struct OrderTerms {
    asset_from: String,
    asset_to: String,
    amount: i64,
    /// `None` 表示市价单
    rate: Option<i64>,
}

fn order_terms(config: &SigningConfig, order: &OrderData<'_>) -> Result<OrderTerms> {
    let (unit_a, unit_b) = market_units(config, order.market_name)?;
    let (asset_from, asset_to) = match order.buy_or_sell {
        BuyOrSell::Sell => (unit_a, unit_b),
        BuyOrSell::Buy => (unit_b, unit_a),
    };

    let rate = match order.limit_price {
        Some(price) => {
            let limit = get_limit_price(order.market_name, order.buy_or_sell, price)?;
            Some(normalize_amount(&limit, BLOCKCHAIN_PRECISION)?)
        }
        None => None,
    };

    Ok(OrderTerms {
        asset_from,
        asset_to,
        amount: normalize_amount(&order.amount.amount, BLOCKCHAIN_PRECISION)?,
        rate,
    })
}

pub fn build_order_data(
    config: &SigningConfig,
    order: &OrderData<'_>,
    blockchain: Blockchain,
) -> Result<String> {
    match blockchain {
        Blockchain::Neo => build_neo_order_data(config, order),
        Blockchain::Eth => build_eth_order_data(config, order),
        Blockchain::Btc => Err(SigningError::NotImplemented("BTC order signature data").into()),
    }
}

fn build_neo_order_data(config: &SigningConfig, order: &OrderData<'_>) -> Result<String> {
    let terms = order_terms(config, order)?;
    let (min_rate, max_rate) = match terms.rate {
        Some(rate) => (to_little_endian_hex(rate), to_little_endian_hex(rate)),
        None => (
            to_little_endian_hex(MIN_ORDER_RATE),
            MAX_ORDER_RATE.to_string(),
        ),
    };

    let data = [
        ORDER_PREFIX.to_string(),
        neo_wallet_script_hash(config)?,
        neo_asset_hash(config.asset(&terms.asset_from)?)?,
        neo_asset_hash(config.asset(&terms.asset_to)?)?,
        to_little_endian_hex(nonce_i64(order.nonce_from)?),
        to_little_endian_hex(nonce_i64(order.nonce_to)?),
        to_little_endian_hex(terms.amount),
        min_rate,
        max_rate,
        to_little_endian_hex(MAX_ORDER_FEE),
        to_little_endian_hex(nonce_i64(order.nonce_order)?),
    ]
    .concat();

    Ok(data.to_uppercase())
}

fn build_eth_order_data(config: &SigningConfig, order: &OrderData<'_>) -> Result<String> {
    let terms = order_terms(config, order)?;
    let wallet = config.wallet(Blockchain::Eth)?;
    let (min_rate, max_rate) = match terms.rate {
        Some(rate) => (to_big_endian_hex(rate), to_big_endian_hex(rate)),
        None => (to_big_endian_hex(MIN_ORDER_RATE), MAX_ORDER_RATE.to_string()),
    };

    let data = [
        ORDER_PREFIX.to_string(),
        wallet.address.trim_start_matches("0x").to_string(),
        eth_asset_id(&terms.asset_from).to_string(),
        eth_asset_id(&terms.asset_to).to_string(),
        convert_eth_nonce(order.nonce_from)?,
        convert_eth_nonce(order.nonce_to)?,
        to_big_endian_hex(terms.amount),
        min_rate,
        max_rate,
        to_big_endian_hex(MAX_ORDER_FEE),
        convert_eth_nonce(order.nonce_order)?,
    ]
    .concat();

    Ok(data.to_uppercase())
}

fn nonce_i64(nonce: u64) -> Result<i64> {
    i64::try_from(nonce).map_err(|_| CodecError::NonceTooLarge(nonce).into())
}
