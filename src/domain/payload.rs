//! 签名载荷
//!
//! 每种 `kind` 一个变体，只携带该类请求自己的字段。字段以 camelCase 序列化，
//! 反序列化同时接受 snake_case 写法并拒绝未知字段，规范化时再统一转为 snake_case。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::coin::Blockchain;

/// 载荷类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    AddMovement,
    CancelAllOrders,
    CancelOrder,
    GetAccountAddress,
    GetAccountBalance,
    GetAccountOrder,
    GetAccountPortfolio,
    GetMovement,
    GetOrder,
    ListAccountBalances,
    ListAccountOrders,
    ListAccountTrades,
    ListAccountTransactions,
    ListMovements,
    PlaceLimitOrder,
    PlaceMarketOrder,
    PlaceStopLimitOrder,
    PlaceStopMarketOrder,
    SyncStates,
    SignStates,
}

impl PayloadKind {
    /// 规范签名消息中的域分隔名
    pub const fn name(self) -> &'static str {
        match self {
            PayloadKind::AddMovement => "add_movement",
            PayloadKind::CancelAllOrders => "cancel_all_orders",
            PayloadKind::CancelOrder => "cancel_order",
            PayloadKind::GetAccountAddress => "get_account_address",
            PayloadKind::GetAccountBalance => "get_account_balance",
            PayloadKind::GetAccountOrder => "get_account_order",
            PayloadKind::GetAccountPortfolio => "get_account_portfolio",
            PayloadKind::GetMovement => "get_movement",
            PayloadKind::GetOrder => "get_order",
            PayloadKind::ListAccountBalances => "list_account_balances",
            PayloadKind::ListAccountOrders => "list_account_orders",
            PayloadKind::ListAccountTrades => "list_account_trades",
            PayloadKind::ListAccountTransactions => "list_account_transactions",
            PayloadKind::ListMovements => "list_movements",
            PayloadKind::PlaceLimitOrder => "place_limit_order",
            PayloadKind::PlaceMarketOrder => "place_market_order",
            PayloadKind::PlaceStopLimitOrder => "place_stop_limit_order",
            PayloadKind::PlaceStopMarketOrder => "place_stop_market_order",
            PayloadKind::SyncStates => "sync_states",
            PayloadKind::SignStates => "sign_states",
        }
    }

    pub const fn is_order(self) -> bool {
        matches!(
            self,
            PayloadKind::PlaceLimitOrder
                | PayloadKind::PlaceMarketOrder
                | PayloadKind::PlaceStopLimitOrder
                | PayloadKind::PlaceStopMarketOrder
        )
    }

    pub const fn is_limit_order(self) -> bool {
        matches!(
            self,
            PayloadKind::PlaceLimitOrder | PayloadKind::PlaceStopLimitOrder
        )
    }

    pub const fn needs_blockchain_signature(self) -> bool {
        self.is_order() || matches!(self, PayloadKind::AddMovement)
    }

    pub const fn needs_blockchain_movement(self) -> bool {
        matches!(self, PayloadKind::AddMovement)
    }

    pub const fn is_state_signing(self) -> bool {
        matches!(self, PayloadKind::SignStates)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 公共字段类型
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CurrencyAmount {
    pub amount: String,
    pub currency: String,
}

impl CurrencyAmount {
    pub fn new(amount: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency: currency.into(),
        }
    }
}

/// 以 currency_a / currency_b 计价的价格
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CurrencyPrice {
    pub amount: String,
    #[serde(alias = "currency_a")]
    pub currency_a: String,
    #[serde(alias = "currency_b")]
    pub currency_b: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuyOrSell {
    #[serde(alias = "BUY")]
    Buy,
    #[serde(alias = "SELL")]
    Sell,
}

impl BuyOrSell {
    pub const fn as_str(self) -> &'static str {
        match self {
            BuyOrSell::Buy => "buy",
            BuyOrSell::Sell => "sell",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    #[serde(alias = "DEPOSIT")]
    Deposit,
    #[serde(alias = "WITHDRAWAL")]
    Withdrawal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CancellationPolicy {
    #[serde(rename = "type")]
    pub policy_type: String,
    #[serde(alias = "cancel_at", default, skip_serializing_if = "Option::is_none")]
    pub cancel_at: Option<u64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 各类载荷
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddMovementPayload {
    pub address: String,
    pub nonce: u64,
    pub quantity: CurrencyAmount,
    pub timestamp: u64,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CancelAllOrdersPayload {
    #[serde(alias = "market_name", default, skip_serializing_if = "Option::is_none")]
    pub market_name: Option<String>,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CancelOrderPayload {
    #[serde(alias = "market_name")]
    pub market_name: String,
    #[serde(alias = "order_id")]
    pub order_id: String,
    pub timestamp: u64,
}

/// get_account_address / get_account_balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CurrencyQueryPayload {
    pub currency: String,
    pub timestamp: u64,
}

/// get_account_order / get_order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderQueryPayload {
    #[serde(alias = "order_id")]
    pub order_id: String,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GetAccountPortfolioPayload {
    #[serde(alias = "fiat_symbol", default, skip_serializing_if = "Option::is_none")]
    pub fiat_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GetMovementPayload {
    #[serde(alias = "movement_id")]
    pub movement_id: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListAccountBalancesPayload {
    #[serde(alias = "ignore_low_balance", default, skip_serializing_if = "Option::is_none")]
    pub ignore_low_balance: Option<bool>,
    pub timestamp: u64,
}

/// list_account_orders / list_account_trades
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListAccountOrdersPayload {
    #[serde(alias = "market_name", default, skip_serializing_if = "Option::is_none")]
    pub market_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Vec<String>>,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListAccountTransactionsPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(alias = "fiat_symbol", default, skip_serializing_if = "Option::is_none")]
    pub fiat_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListMovementsPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub movement_type: Option<MovementType>,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlaceMarketOrderPayload {
    pub amount: CurrencyAmount,
    #[serde(alias = "buy_or_sell")]
    pub buy_or_sell: BuyOrSell,
    #[serde(alias = "market_name")]
    pub market_name: String,
    #[serde(alias = "nonce_from")]
    pub nonce_from: u64,
    #[serde(alias = "nonce_order")]
    pub nonce_order: u64,
    #[serde(alias = "nonce_to")]
    pub nonce_to: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlaceLimitOrderPayload {
    #[serde(alias = "allow_taker")]
    pub allow_taker: bool,
    pub amount: CurrencyAmount,
    #[serde(alias = "buy_or_sell")]
    pub buy_or_sell: BuyOrSell,
    #[serde(alias = "cancellation_policy", default, skip_serializing_if = "Option::is_none")]
    pub cancellation_policy: Option<CancellationPolicy>,
    #[serde(alias = "limit_price")]
    pub limit_price: CurrencyPrice,
    #[serde(alias = "market_name")]
    pub market_name: String,
    #[serde(alias = "nonce_from")]
    pub nonce_from: u64,
    #[serde(alias = "nonce_order")]
    pub nonce_order: u64,
    #[serde(alias = "nonce_to")]
    pub nonce_to: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlaceStopLimitOrderPayload {
    #[serde(alias = "allow_taker")]
    pub allow_taker: bool,
    pub amount: CurrencyAmount,
    #[serde(alias = "buy_or_sell")]
    pub buy_or_sell: BuyOrSell,
    #[serde(alias = "cancellation_policy", default, skip_serializing_if = "Option::is_none")]
    pub cancellation_policy: Option<CancellationPolicy>,
    #[serde(alias = "limit_price")]
    pub limit_price: CurrencyPrice,
    #[serde(alias = "market_name")]
    pub market_name: String,
    #[serde(alias = "nonce_from")]
    pub nonce_from: u64,
    #[serde(alias = "nonce_order")]
    pub nonce_order: u64,
    #[serde(alias = "nonce_to")]
    pub nonce_to: u64,
    #[serde(alias = "stop_price")]
    pub stop_price: CurrencyPrice,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlaceStopMarketOrderPayload {
    pub amount: CurrencyAmount,
    #[serde(alias = "buy_or_sell")]
    pub buy_or_sell: BuyOrSell,
    #[serde(alias = "market_name")]
    pub market_name: String,
    #[serde(alias = "nonce_from")]
    pub nonce_from: u64,
    #[serde(alias = "nonce_order")]
    pub nonce_order: u64,
    #[serde(alias = "nonce_to")]
    pub nonce_to: u64,
    #[serde(alias = "stop_price")]
    pub stop_price: CurrencyPrice,
    pub timestamp: u64,
}

/// 服务端下发的待确认状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSignedState {
    pub message: String,
    pub blockchain: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SyncStatesPayload {
    #[serde(alias = "server_signed_states")]
    pub server_signed_states: Vec<ServerSignedState>,
    pub timestamp: u64,
}

/// 客户端逐条签名的状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSignedState {
    pub message: String,
    pub blockchain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignStatesPayload {
    pub timestamp: u64,
    #[serde(default)]
    pub states: Vec<ClientSignedState>,
    #[serde(default, alias = "recycledOrders")]
    pub recycled_orders: Vec<ClientSignedState>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 载荷联合类型
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum SigningPayload {
    AddMovement(AddMovementPayload),
    CancelAllOrders(CancelAllOrdersPayload),
    CancelOrder(CancelOrderPayload),
    GetAccountAddress(CurrencyQueryPayload),
    GetAccountBalance(CurrencyQueryPayload),
    GetAccountOrder(OrderQueryPayload),
    GetAccountPortfolio(GetAccountPortfolioPayload),
    GetMovement(GetMovementPayload),
    GetOrder(OrderQueryPayload),
    ListAccountBalances(ListAccountBalancesPayload),
    ListAccountOrders(ListAccountOrdersPayload),
    ListAccountTrades(ListAccountOrdersPayload),
    ListAccountTransactions(ListAccountTransactionsPayload),
    ListMovements(ListMovementsPayload),
    PlaceLimitOrder(PlaceLimitOrderPayload),
    PlaceMarketOrder(PlaceMarketOrderPayload),
    PlaceStopLimitOrder(PlaceStopLimitOrderPayload),
    PlaceStopMarketOrder(PlaceStopMarketOrderPayload),
    SyncStates(SyncStatesPayload),
    SignStates(SignStatesPayload),
}

/// 下单载荷中链上签名所需的字段
#[derive(Debug, Clone, Copy)]
pub struct OrderData<'a> {
    pub amount: &'a CurrencyAmount,
    pub buy_or_sell: BuyOrSell,
    pub market_name: &'a str,
    pub nonce_from: u64,
    pub nonce_to: u64,
    pub nonce_order: u64,
    pub limit_price: Option<&'a CurrencyPrice>,
}

impl SigningPayload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            SigningPayload::AddMovement(_) => PayloadKind::AddMovement,
            SigningPayload::CancelAllOrders(_) => PayloadKind::CancelAllOrders,
            SigningPayload::CancelOrder(_) => PayloadKind::CancelOrder,
            SigningPayload::GetAccountAddress(_) => PayloadKind::GetAccountAddress,
            SigningPayload::GetAccountBalance(_) => PayloadKind::GetAccountBalance,
            SigningPayload::GetAccountOrder(_) => PayloadKind::GetAccountOrder,
            SigningPayload::GetAccountPortfolio(_) => PayloadKind::GetAccountPortfolio,
            SigningPayload::GetMovement(_) => PayloadKind::GetMovement,
            SigningPayload::GetOrder(_) => PayloadKind::GetOrder,
            SigningPayload::ListAccountBalances(_) => PayloadKind::ListAccountBalances,
            SigningPayload::ListAccountOrders(_) => PayloadKind::ListAccountOrders,
            SigningPayload::ListAccountTrades(_) => PayloadKind::ListAccountTrades,
            SigningPayload::ListAccountTransactions(_) => PayloadKind::ListAccountTransactions,
            SigningPayload::ListMovements(_) => PayloadKind::ListMovements,
            SigningPayload::PlaceLimitOrder(_) => PayloadKind::PlaceLimitOrder,
            SigningPayload::PlaceMarketOrder(_) => PayloadKind::PlaceMarketOrder,
            SigningPayload::PlaceStopLimitOrder(_) => PayloadKind::PlaceStopLimitOrder,
            SigningPayload::PlaceStopMarketOrder(_) => PayloadKind::PlaceStopMarketOrder,
            SigningPayload::SyncStates(_) => PayloadKind::SyncStates,
            SigningPayload::SignStates(_) => PayloadKind::SignStates,
        }
    }

    /// 载荷本体的 JSON 值（camelCase 字段名）
    pub fn to_value(&self) -> serde_json::Result<Value> {
        match self {
            SigningPayload::AddMovement(p) => serde_json::to_value(p),
            SigningPayload::CancelAllOrders(p) => serde_json::to_value(p),
            SigningPayload::CancelOrder(p) => serde_json::to_value(p),
            SigningPayload::GetAccountAddress(p) | SigningPayload::GetAccountBalance(p) => {
                serde_json::to_value(p)
            }
            SigningPayload::GetAccountOrder(p) | SigningPayload::GetOrder(p) => {
                serde_json::to_value(p)
            }
            SigningPayload::GetAccountPortfolio(p) => serde_json::to_value(p),
            SigningPayload::GetMovement(p) => serde_json::to_value(p),
            SigningPayload::ListAccountBalances(p) => serde_json::to_value(p),
            SigningPayload::ListAccountOrders(p) | SigningPayload::ListAccountTrades(p) => {
                serde_json::to_value(p)
            }
            SigningPayload::ListAccountTransactions(p) => serde_json::to_value(p),
            SigningPayload::ListMovements(p) => serde_json::to_value(p),
            SigningPayload::PlaceLimitOrder(p) => serde_json::to_value(p),
            SigningPayload::PlaceMarketOrder(p) => serde_json::to_value(p),
            SigningPayload::PlaceStopLimitOrder(p) => serde_json::to_value(p),
            SigningPayload::PlaceStopMarketOrder(p) => serde_json::to_value(p),
            SigningPayload::SyncStates(p) => serde_json::to_value(p),
            SigningPayload::SignStates(p) => serde_json::to_value(p),
        }
    }

    /// 下单类载荷的链上签名字段；其他类型返回 `None`
    pub fn order_data(&self) -> Option<OrderData<'_>> {
        match self {
            SigningPayload::PlaceMarketOrder(p) => Some(OrderData {
                amount: &p.amount,
                buy_or_sell: p.buy_or_sell,
                market_name: &p.market_name,
                nonce_from: p.nonce_from,
                nonce_to: p.nonce_to,
                nonce_order: p.nonce_order,
                limit_price: None,
            }),
            SigningPayload::PlaceStopMarketOrder(p) => Some(OrderData {
                amount: &p.amount,
                buy_or_sell: p.buy_or_sell,
                market_name: &p.market_name,
                nonce_from: p.nonce_from,
                nonce_to: p.nonce_to,
                nonce_order: p.nonce_order,
                limit_price: None,
            }),
            SigningPayload::PlaceLimitOrder(p) => Some(OrderData {
                amount: &p.amount,
                buy_or_sell: p.buy_or_sell,
                market_name: &p.market_name,
                nonce_from: p.nonce_from,
                nonce_to: p.nonce_to,
                nonce_order: p.nonce_order,
                limit_price: Some(&p.limit_price),
            }),
            SigningPayload::PlaceStopLimitOrder(p) => Some(OrderData {
                amount: &p.amount,
                buy_or_sell: p.buy_or_sell,
                market_name: &p.market_name,
                nonce_from: p.nonce_from,
                nonce_to: p.nonce_to,
                nonce_order: p.nonce_order,
                limit_price: Some(&p.limit_price),
            }),
            _ => None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 签名输出
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockchainSignature {
    pub blockchain: Blockchain,
    pub signature: String,
}

/// 链上资金划转描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainMovement {
    pub address: String,
    pub amount: String,
    pub asset: String,
    pub nonce: String,
    pub prefix: String,
    pub user_pub_key: String,
    pub user_sig: String,
}

/// sign_states 的逐条签名结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignStatesRequest {
    pub client_signed_states: Vec<ClientSignedState>,
    pub signed_recycled_orders: Vec<ClientSignedState>,
    pub timestamp: u64,
}

/// 增强载荷中链上签名所在的字段
pub const BLOCKCHAIN_SIGNATURES_FIELD: &str = "blockchainSignatures";

/// 载荷签名结果
///
/// `payload` 是新构造的增强载荷：需要链上签名时插入 `blockchainSignatures`，
/// sign_states 时替换为逐条签名后的请求。输入的 `SigningPayload` 不被修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadSignature {
    pub canonical_string: String,
    pub signature: String,
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain_movement: Option<BlockchainMovement>,
}

impl PayloadSignature {
    /// 增强载荷中的链上签名；没有时为空
    pub fn blockchain_signatures(&self) -> Vec<BlockchainSignature> {
        self.payload
            .get(BLOCKCHAIN_SIGNATURES_FIELD)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    /// sign_states 的签名请求；其他类型为 `None`
    pub fn signed_states(&self) -> Option<SignStatesRequest> {
        self.payload.get("client_signed_states")?;
        serde_json::from_value(self.payload.clone()).ok()
    }
}
