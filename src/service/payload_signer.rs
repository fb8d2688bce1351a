//! 载荷签名调度
//!
//! 按载荷类型决定附加哪些链上签名、是否构造划转描述、是否逐条签名状态，
//! 最后用载荷签名密钥对 `"{kind},{canonical}"` 做通用签名。
//! 输入载荷与配置都只读，结果是新的 `PayloadSignature`，其中载荷为新构造的增强副本。

use serde_json::Value;

use crate::{
    domain::{
        coin::Blockchain,
        payload::{
            BlockchainSignature, ClientSignedState, PayloadSignature, SignStatesPayload,
            SignStatesRequest, SigningPayload, BLOCKCHAIN_SIGNATURES_FIELD,
        },
        signing_config::SigningConfig,
    },
    error::{ConfigError, Result, SigningError},
    service::{
        blockchain_data::{
            build_movement_data, build_order_data, get_blockchain_movement, get_unit_pairs,
        },
        chain_signer::{ChainSignerFactory, CryptoContext},
    },
    utils::canonical::signable_message,
};

/// 对载荷签名
///
/// # Arguments
/// * `private_key` - 载荷签名密钥（32 字节 secp256k1 标量）
/// * `config` - 下单、划转与状态签名时必需
pub fn sign_payload(
    ctx: &CryptoContext,
    private_key: &[u8],
    payload: &SigningPayload,
    config: Option<&SigningConfig>,
) -> Result<PayloadSignature> {
    let kind = payload.kind();
    let span = tracing::debug_span!("sign_payload", kind = kind.name());
    let _guard = span.enter();

    let canonical_string = signable_message(payload)?;
    let signature = ctx.sign_message_der(private_key, &canonical_string)?;

    let mut augmented = payload
        .to_value()
        .map_err(|e| SigningError::Signing(format!("payload serialization: {}", e)))?;

    let mut blockchain_signatures = Vec::new();
    if kind.needs_blockchain_signature() {
        let config = config.ok_or(ConfigError::MissingConfig("blockchain signatures"))?;
        blockchain_signatures = sign_blockchain_data(ctx, config, payload)?;
        attach_blockchain_signatures(&mut augmented, &blockchain_signatures)?;
    }

    let mut blockchain_movement = None;
    if let SigningPayload::AddMovement(movement) = payload {
        let config = config.ok_or(ConfigError::MissingConfig("blockchain movement"))?;
        blockchain_movement = Some(get_blockchain_movement(
            config,
            movement,
            &blockchain_signatures,
        )?);
    }

    if let SigningPayload::SignStates(states) = payload {
        let config = config.ok_or(ConfigError::MissingConfig("state signing"))?;
        let request = sign_state_list_and_recycled_orders(ctx, config, states)?;
        augmented = serde_json::to_value(&request)
            .map_err(|e| SigningError::Signing(format!("state request serialization: {}", e)))?;
    }

    tracing::info!(
        kind = kind.name(),
        chains = blockchain_signatures.len(),
        "payload signed"
    );

    Ok(PayloadSignature {
        canonical_string,
        signature,
        payload: augmented,
        blockchain_movement,
    })
}

fn attach_blockchain_signatures(
    augmented: &mut Value,
    signatures: &[BlockchainSignature],
) -> Result<()> {
    let value = serde_json::to_value(signatures)
        .map_err(|e| SigningError::Signing(format!("signature serialization: {}", e)))?;
    match augmented.as_object_mut() {
        Some(object) => {
            object.insert(BLOCKCHAIN_SIGNATURES_FIELD.to_string(), value);
            Ok(())
        }
        None => Err(SigningError::Signing("payload is not a JSON object".to_string()).into()),
    }
}

/// 载荷需要的链上签名
///
/// 划转只签资产所在链；下单对市场两侧资产所在的不同链各签一次，顺序为首次出现的顺序。
/// 其他类型返回空列表。
pub fn sign_blockchain_data(
    ctx: &CryptoContext,
    config: &SigningConfig,
    payload: &SigningPayload,
) -> Result<Vec<BlockchainSignature>> {
    if let SigningPayload::AddMovement(movement) = payload {
        let blockchain = config.blockchain_of(&movement.quantity.currency)?;
        let data = build_movement_data(config, movement, blockchain)?;
        return Ok(vec![sign_with_wallet(ctx, config, blockchain, &data)?]);
    }

    let Some(order) = payload.order_data() else {
        return Ok(Vec::new());
    };

    let pairs = get_unit_pairs(order.market_name)?;
    let unit_b = pairs
        .unit_b
        .ok_or_else(|| ConfigError::InvalidMarket(order.market_name.to_string()))?;

    let mut chains: Vec<Blockchain> = Vec::with_capacity(2);
    for unit in [pairs.unit_a.as_str(), unit_b.as_str()] {
        let blockchain = config.blockchain_of(unit)?;
        if !chains.contains(&blockchain) {
            chains.push(blockchain);
        }
    }

    chains
        .into_iter()
        .map(|blockchain| -> Result<BlockchainSignature> {
            let data = build_order_data(config, &order, blockchain)?;
            sign_with_wallet(ctx, config, blockchain, &data)
        })
        .collect()
}

fn sign_with_wallet(
    ctx: &CryptoContext,
    config: &SigningConfig,
    blockchain: Blockchain,
    data: &str,
) -> Result<BlockchainSignature> {
    let wallet = config.wallet(blockchain)?;
    let signer = ChainSignerFactory::for_blockchain(blockchain);
    Ok(signer.sign_data(ctx, &wallet.private_key, data)?)
}

pub fn sign_state_list_and_recycled_orders(
    ctx: &CryptoContext,
    config: &SigningConfig,
    payload: &SignStatesPayload,
) -> Result<SignStatesRequest> {
    Ok(SignStatesRequest {
        client_signed_states: sign_state_list(ctx, config, &payload.states)?,
        signed_recycled_orders: sign_state_list(ctx, config, &payload.recycled_orders)?,
        timestamp: payload.timestamp,
    })
}

/// 逐条签名状态；只支持 NEO 与 ETH，签名转大写
pub fn sign_state_list(
    ctx: &CryptoContext,
    config: &SigningConfig,
    items: &[ClientSignedState],
) -> Result<Vec<ClientSignedState>> {
    items
        .iter()
        .map(|item| -> Result<ClientSignedState> {
            let blockchain = match item.blockchain.parse::<Blockchain>() {
                Ok(chain @ (Blockchain::Neo | Blockchain::Eth)) => chain,
                _ => {
                    return Err(
                        SigningError::UnsupportedStateBlockchain(item.blockchain.clone()).into(),
                    )
                }
            };

            let signed = sign_with_wallet(ctx, config, blockchain, &item.message)?;
            Ok(ClientSignedState {
                message: item.message.clone(),
                blockchain: item.blockchain.clone(),
                signature: Some(signed.signature.to_uppercase()),
            })
        })
        .collect()
}
