//! 配置管理模块
//! 支持从环境变量（`IRONSIGN_*`，可放在 `.env`）和 TOML 配置文件加载配置

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{domain::coin::Network, service::key_share::WalletIndices};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    /// MainNet / TestNet / LocalNet；其他值按主网处理
    #[serde(default = "default_network")]
    pub network: String,
    #[serde(default)]
    pub wallet: WalletConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
}

/// 钱包派生配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub account: u32,
    pub change: u32,
    pub btc_index: u32,
    pub eth_index: u32,
    pub neo_index: u32,
    pub payload_signing_index: u32,
}

fn default_network() -> String {
    env_or("IRONSIGN_NETWORK", "MainNet")
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: env_or("IRONSIGN_LOG_LEVEL", "info"),
            format: env_or("IRONSIGN_LOG_FORMAT", "text"),
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            account: env_u32("IRONSIGN_WALLET_ACCOUNT").unwrap_or(0),
            change: env_u32("IRONSIGN_WALLET_CHANGE").unwrap_or(0),
            btc_index: env_u32("IRONSIGN_BTC_INDEX").unwrap_or(0),
            eth_index: env_u32("IRONSIGN_ETH_INDEX").unwrap_or(0),
            neo_index: env_u32("IRONSIGN_NEO_INDEX").unwrap_or(0),
            payload_signing_index: env_u32("IRONSIGN_PAYLOAD_SIGNING_INDEX").unwrap_or(1),
        }
    }
}

impl WalletConfig {
    pub fn indices(&self) -> WalletIndices {
        WalletIndices {
            btc: self.btc_index,
            eth: self.eth_index,
            neo: self.neo_index,
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self> {
        // .env 不存在时忽略
        dotenvy::dotenv().ok();

        Ok(Self {
            logging: LoggingConfig::default(),
            network: default_network(),
            wallet: WalletConfig::default(),
        })
    }

    /// 从配置文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// 从配置文件和环境变量合并加载（环境变量优先级更高）
    pub fn from_env_and_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let Some(path) = path.filter(|p| p.as_ref().exists()) else {
            return Self::from_env();
        };

        dotenvy::dotenv().ok();
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("IRONSIGN_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("IRONSIGN_LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(network) = std::env::var("IRONSIGN_NETWORK") {
            self.network = network;
        }

        let wallet = &mut self.wallet;
        for (key, slot) in [
            ("IRONSIGN_WALLET_ACCOUNT", &mut wallet.account),
            ("IRONSIGN_WALLET_CHANGE", &mut wallet.change),
            ("IRONSIGN_BTC_INDEX", &mut wallet.btc_index),
            ("IRONSIGN_ETH_INDEX", &mut wallet.eth_index),
            ("IRONSIGN_NEO_INDEX", &mut wallet.neo_index),
            ("IRONSIGN_PAYLOAD_SIGNING_INDEX", &mut wallet.payload_signing_index),
        ] {
            if let Some(value) = env_u32(key) {
                *slot = value;
            }
        }
    }

    pub fn network(&self) -> Network {
        Network::from(self.network.as_str())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        // 验证日志级别
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("IRONSIGN_LOG_LEVEL must be one of: {:?}", valid_levels);
        }

        // 验证日志格式
        if self.logging.format != "json" && self.logging.format != "text" {
            anyhow::bail!("IRONSIGN_LOG_FORMAT must be 'json' or 'text'");
        }

        let wallet = &self.wallet;
        if [wallet.btc_index, wallet.eth_index, wallet.neo_index]
            .contains(&wallet.payload_signing_index)
        {
            anyhow::bail!(
                "IRONSIGN_PAYLOAD_SIGNING_INDEX ({}) must differ from the funds wallet indices",
                wallet.payload_signing_index
            );
        }

        Ok(())
    }
}
