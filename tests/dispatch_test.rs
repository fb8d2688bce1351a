//! 签名调度集成测试
//!
//! 覆盖跨链/同链下单、限价单、划转、状态签名与配置缺失等路径

mod common;

use common::{eth_deposit, market_order, payload_key, signing_config, TEST_TIMESTAMP};
use ironsign::{
    domain::{
        coin::Blockchain,
        payload::{
            AddMovementPayload, BuyOrSell, ClientSignedState, CurrencyAmount, CurrencyPrice,
            MovementType, PlaceLimitOrderPayload, SignStatesPayload, SigningPayload,
        },
    },
    service::{
        blockchain_data::build_order_data,
        chain_signer::CryptoContext,
        payload_signer::{sign_blockchain_data, sign_payload},
    },
};

const NEO_ORDER_DATA: &str = "013B816F2B0B12E1638CEB68153847B7829327734F9B7CFFDAA674BEAE0F930EBE6085AF9093E5FE56B34A5C220CCDCF6EFC336FC5FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF0100000000000000020000000000000000CA9A3B000000000000000000000000FFFFFFFFFFFFFFFF90D00300000000000300000000000000";
const ETH_ORDER_DATA: &str = "019858EFFD232B4033E47D90003D41EC34ECAEDA94FFFF00000000000100000002000000003B9ACA000000000000000000FFFFFFFFFFFFFFFF000000000003D09000000003";
const ETH_ORDER_SIGNATURE: &str = "20e736bcf3c1624f7bde4a2f70d1ec7387c8af0a2445f3ac3fb82c5e5c64a7c6867092d145bd530154c1f6673b8d4f4e1e4b0a342ed6512c5ec1ac0cd24a75b1a7";
const NEO_ORDER_SIGNATURE: &str = "202593511cf9ea8af645165c203b11243aaad2405cc7c0dbfbda43a2895250bff90beecc8b502503521134feb5f3e86bb1fe3ceef8d5843d68641ea7f31812760f";
const ORDER_SIGNATURE: &str = "30440220258b45c4d9c9ce4fbc64ad4fec85f5905b733423253fa76814dfed2d96bba01802200fef3ca500c3587afba3f958eb64e94584ee3b9a1671cf65ab4e890c835ae6d2";

fn sell_ten_neo() -> SigningPayload {
    market_order("neo_eth", BuyOrSell::Sell, CurrencyAmount::new("10.0", "neo"))
}

#[test]
fn test_cross_chain_market_order_signs_each_chain() {
    let ctx = CryptoContext::new();
    let config = signing_config();
    let payload = sell_ten_neo();

    let order = payload.order_data().unwrap();
    assert_eq!(build_order_data(&config, &order, Blockchain::Neo).unwrap(), NEO_ORDER_DATA);
    assert_eq!(build_order_data(&config, &order, Blockchain::Eth).unwrap(), ETH_ORDER_DATA);

    let signed = sign_payload(&ctx, &payload_key(), &payload, Some(&config)).unwrap();
    assert_eq!(
        signed.canonical_string,
        r#"place_market_order,{"amount":{"amount":"10.0","currency":"neo"},"buy_or_sell":"sell","market_name":"neo_eth","nonce_from":1,"nonce_order":3,"nonce_to":2,"timestamp":1565323885016}"#
    );
    assert_eq!(signed.signature, ORDER_SIGNATURE);

    let chains: Vec<Blockchain> = signed
        .blockchain_signatures()
        .iter()
        .map(|s| s.blockchain)
        .collect();
    assert_eq!(chains, vec![Blockchain::Neo, Blockchain::Eth]);
    assert_eq!(signed.blockchain_signatures()[0].signature, NEO_ORDER_SIGNATURE);
    assert_eq!(signed.blockchain_signatures()[1].signature, ETH_ORDER_SIGNATURE);
    assert!(signed.blockchain_movement.is_none());
}

#[test]
fn test_same_chain_order_signs_once() {
    let ctx = CryptoContext::new();
    let config = signing_config();

    let neo_gas = market_order("neo_gas", BuyOrSell::Buy, CurrencyAmount::new("1", "neo"));
    let sigs = sign_blockchain_data(&ctx, &config, &neo_gas).unwrap();
    assert_eq!(sigs.len(), 1);
    assert_eq!(sigs[0].blockchain, Blockchain::Neo);

    let eth_usdc = market_order("eth_usdc", BuyOrSell::Sell, CurrencyAmount::new("0.5", "eth"));
    let sigs = sign_blockchain_data(&ctx, &config, &eth_usdc).unwrap();
    assert_eq!(sigs.len(), 1);
    assert_eq!(sigs[0].blockchain, Blockchain::Eth);
}

#[test]
fn test_limit_order_uses_limit_rate() {
    let ctx = CryptoContext::new();
    let config = signing_config();

    // 买单支付 eth；价格以 eth 为 currency_b 计价，需取倒数 1/0.5 = 2
    let payload = SigningPayload::PlaceLimitOrder(PlaceLimitOrderPayload {
        allow_taker: true,
        amount: CurrencyAmount::new("10", "neo"),
        buy_or_sell: BuyOrSell::Buy,
        cancellation_policy: None,
        limit_price: CurrencyPrice {
            amount: "0.5".to_string(),
            currency_a: "neo".to_string(),
            currency_b: "eth".to_string(),
        },
        market_name: "neo_eth".to_string(),
        nonce_from: 1,
        nonce_order: 3,
        nonce_to: 2,
        timestamp: TEST_TIMESTAMP,
    });

    let order = payload.order_data().unwrap();
    let data = build_order_data(&config, &order, Blockchain::Eth).unwrap();
    // from eth (0000) to neo (ffff)，最低/最高汇率均为 2.00000000
    assert!(data.starts_with("019858EFFD232B4033E47D90003D41EC34ECAEDA940000FFFF"));
    assert!(data.contains("000000000BEBC200000000000BEBC200"));

    let signed = sign_payload(&ctx, &payload_key(), &payload, Some(&config)).unwrap();
    assert_eq!(signed.blockchain_signatures().len(), 2);
}

#[test]
fn test_unresolvable_limit_price_fails() {
    let ctx = CryptoContext::new();
    let config = signing_config();

    let payload = SigningPayload::PlaceLimitOrder(PlaceLimitOrderPayload {
        allow_taker: false,
        amount: CurrencyAmount::new("10", "neo"),
        buy_or_sell: BuyOrSell::Sell,
        cancellation_policy: None,
        limit_price: CurrencyPrice {
            amount: "1".to_string(),
            currency_a: "gas".to_string(),
            currency_b: "btc".to_string(),
        },
        market_name: "neo_eth".to_string(),
        nonce_from: 1,
        nonce_order: 3,
        nonce_to: 2,
        timestamp: TEST_TIMESTAMP,
    });

    let err = sign_payload(&ctx, &payload_key(), &payload, Some(&config)).unwrap_err();
    assert_eq!(err.code(), "limit_price_unresolved");
}

#[test]
fn test_neo_movement_descriptor() {
    let ctx = CryptoContext::new();
    let config = signing_config();
    let payload = SigningPayload::AddMovement(AddMovementPayload {
        address: "AMCWa4mJqKuHznQL4ofgMpvRZ2rFA8HHo7".to_string(),
        nonce: 7,
        quantity: CurrencyAmount::new("3", "neo"),
        timestamp: TEST_TIMESTAMP,
        movement_type: MovementType::Withdrawal,
    });

    let signed = sign_payload(&ctx, &payload_key(), &payload, Some(&config)).unwrap();
    assert_eq!(signed.blockchain_signatures().len(), 1);
    assert_eq!(signed.blockchain_signatures()[0].blockchain, Blockchain::Neo);

    let movement = signed.blockchain_movement.as_ref().unwrap();
    assert_eq!(movement.prefix, "03");
    assert_eq!(movement.address, "3b816f2b0b12e1638ceb68153847b7829327734f");
    assert_eq!(movement.amount, "00a3e11100000000");
    assert_eq!(movement.nonce, "0700000000000000");
    assert_eq!(
        movement.asset,
        "9b7cffdaa674beae0f930ebe6085af9093e5fe56b34a5c220ccdcf6efc336fc5"
    );
    assert_eq!(
        movement.user_pub_key,
        "02c87e7075a940128f922fc288cc5cafd341a641ab1515938b3f8cba1e3f5ba9ad"
    );
    assert_eq!(movement.user_sig, signed.blockchain_signatures()[0].signature);
}

#[test]
fn test_btc_paths_are_not_implemented() {
    let ctx = CryptoContext::new();
    let config = signing_config();

    let deposit = SigningPayload::AddMovement(AddMovementPayload {
        address: "3HkzTaFbEMWeJPLyNCNhPyGfZsVLDwdD3G".to_string(),
        nonce: 1,
        quantity: CurrencyAmount::new("0.1", "btc"),
        timestamp: TEST_TIMESTAMP,
        movement_type: MovementType::Deposit,
    });
    let err = sign_payload(&ctx, &payload_key(), &deposit, Some(&config)).unwrap_err();
    assert_eq!(err.code(), "not_implemented");

    let order = market_order("btc_eth", BuyOrSell::Sell, CurrencyAmount::new("0.1", "btc"));
    let err = sign_payload(&ctx, &payload_key(), &order, Some(&config)).unwrap_err();
    assert_eq!(err.code(), "not_implemented");
}

#[test]
fn test_order_without_config_fails() {
    let ctx = CryptoContext::new();
    let err = sign_payload(&ctx, &payload_key(), &sell_ten_neo(), None).unwrap_err();
    assert_eq!(err.code(), "missing_config");
}

#[test]
fn test_unknown_asset_fails() {
    let ctx = CryptoContext::new();
    let config = signing_config();
    let order = market_order("doge_eth", BuyOrSell::Sell, CurrencyAmount::new("1", "doge"));
    let err = sign_payload(&ctx, &payload_key(), &order, Some(&config)).unwrap_err();
    assert_eq!(err.code(), "unknown_asset");
}

#[test]
fn test_sign_states() {
    let ctx = CryptoContext::new();
    let config = signing_config();
    let state = |blockchain: &str| ClientSignedState {
        message: "AABBCCDD".to_string(),
        blockchain: blockchain.to_string(),
        signature: None,
    };

    let payload = SigningPayload::SignStates(SignStatesPayload {
        timestamp: TEST_TIMESTAMP,
        states: vec![state("NEO")],
        recycled_orders: vec![state("eth")],
    });

    let signed = sign_payload(&ctx, &payload_key(), &payload, Some(&config)).unwrap();
    assert_eq!(
        signed.canonical_string,
        "sign_states,{\"timestamp\":1565323885016}"
    );

    let states = signed.signed_states().unwrap();
    assert_eq!(states.timestamp, TEST_TIMESTAMP);
    assert_eq!(
        states.client_signed_states[0].signature.as_deref(),
        Some("1F6C7DCD1AF8A080093BE556FA07C0E808811E63694A24E1AA9CD17F3133E9DF425C3E52276602C08C4A1F542E8077FCA63F61CEE8916D34B3380478D58D21881F")
    );
    assert_eq!(
        states.signed_recycled_orders[0].signature.as_deref(),
        Some("1FA7888104AA3539AFFBA0C6142AA70AA63EAE592988D82D9F0C3C55EECE87D75B326AD92149995096F09DBF313D24A6DD8BCD233B07D51A51400ECC360BA54CFD")
    );

    // 增强载荷被替换为签名请求，输入载荷不被修改
    assert_eq!(
        signed.payload["client_signed_states"][0]["signature"],
        states.client_signed_states[0].signature.clone().unwrap()
    );
    assert!(signed.payload.get("states").is_none());
    if let SigningPayload::SignStates(original) = &payload {
        assert!(original.states[0].signature.is_none());
    }
}

#[test]
fn test_sign_states_rejects_other_chains() {
    let ctx = CryptoContext::new();
    let config = signing_config();
    let payload = SigningPayload::SignStates(SignStatesPayload {
        timestamp: TEST_TIMESTAMP,
        states: vec![ClientSignedState {
            message: "AA".to_string(),
            blockchain: "btc".to_string(),
            signature: None,
        }],
        recycled_orders: vec![],
    });

    let err = sign_payload(&ctx, &payload_key(), &payload, Some(&config)).unwrap_err();
    assert_eq!(err.code(), "unsupported_state_blockchain");
}

#[test]
fn test_signature_serializes_without_mutating_payload() {
    let ctx = CryptoContext::new();
    let config = signing_config();
    let payload = eth_deposit();

    let before = payload.clone();
    let signed = sign_payload(&ctx, &payload_key(), &payload, Some(&config)).unwrap();
    assert_eq!(payload, before);

    let json = serde_json::to_value(&signed).unwrap();
    assert!(json.get("canonicalString").is_some());
    assert!(json.get("blockchainMovement").is_some());
    assert!(json.get("blockchainSignatures").is_none());

    // 链上签名位于增强载荷内
    let signatures = &json["payload"]["blockchainSignatures"];
    assert_eq!(signatures.as_array().map(Vec::len), Some(1));
    assert_eq!(signatures[0]["blockchain"], "eth");
    assert_eq!(
        signatures[0]["signature"],
        signed.blockchain_signatures()[0].signature.as_str()
    );
    assert_eq!(json["payload"]["address"], "fa39fddde46cea3060b91f80abed8672f77c5bea");
    assert_eq!(json["payload"]["type"], "deposit");
}
