//! IronSign 命令行入口
//!
//! ```text
//! ironsign wallets
//! ironsign sign <payload.json> [signing-config.json]
//! ```
//!
//! 主种子以 hex 形式从 `IRONSIGN_SEED` 读取；`CONFIG_PATH` 指向可选的 TOML 配置文件。

use anyhow::{Context, Result};
use ironsign::{
    config::Config,
    domain::{
        coin::{CoinType, BIP44_PURPOSE},
        derivation::{derive_chain_key, derive_index},
        payload::SigningPayload,
        signing_config::SigningConfig,
        wallet::{generate_payload_signing_key, to_checksum_address, wallet_from_key},
    },
    infrastructure::logging,
    service::{chain_signer::CryptoContext, payload_signer::sign_payload},
};
use zeroize::Zeroizing;

const USAGE: &str = "usage: ironsign wallets | ironsign sign <payload.json> [signing-config.json]";

fn main() -> Result<()> {
    // 1. 加载环境变量与配置
    dotenvy::dotenv().ok();
    let config = Config::from_env_and_file(std::env::var("CONFIG_PATH").ok())?;
    config.validate()?;

    // 2. 初始化日志
    if let Err(e) = logging::init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("wallets") => print_wallets(&config, &read_seed()?),
        Some("sign") => {
            let payload_path = args.get(1).context(USAGE)?;
            sign(&config, &read_seed()?, payload_path, args.get(2))
        }
        _ => anyhow::bail!(USAGE),
    }
}

fn read_seed() -> Result<Zeroizing<Vec<u8>>> {
    let seed_hex = Zeroizing::new(
        std::env::var("IRONSIGN_SEED").context("IRONSIGN_SEED must be set to the hex master seed")?,
    );
    let seed = hex::decode(seed_hex.trim()).context("IRONSIGN_SEED is not valid hex")?;
    Ok(Zeroizing::new(seed))
}

fn print_wallets(config: &Config, seed: &[u8]) -> Result<()> {
    let network = config.network();
    let indices = config.wallet.indices();

    for coin in [CoinType::Btc, CoinType::Eth, CoinType::Neo] {
        let chain_key = derive_chain_key(
            seed,
            BIP44_PURPOSE,
            coin.code(),
            config.wallet.account,
            config.wallet.change,
        )?;
        let index = indices.for_blockchain(coin.blockchain());
        let wallet = wallet_from_key(&derive_index(&chain_key, index)?, coin, index, &network)?;

        let address = match coin {
            CoinType::Eth => to_checksum_address(&wallet.address),
            _ => wallet.address.clone(),
        };
        println!("{}\t{}\t{}\t{}", coin.blockchain(), index, address, wallet.public_key);
    }

    let payload_key = generate_payload_signing_key(seed, config.wallet.payload_signing_index)?;
    println!(
        "payload\t{}\t-\t{}",
        payload_key.index, payload_key.public_key
    );
    Ok(())
}

fn sign(
    config: &Config,
    seed: &[u8],
    payload_path: &str,
    signing_config_path: Option<&String>,
) -> Result<()> {
    let payload: SigningPayload = read_json(payload_path)?;
    let signing_config: Option<SigningConfig> = signing_config_path
        .map(|path| read_json(path))
        .transpose()?;

    let payload_key = generate_payload_signing_key(seed, config.wallet.payload_signing_index)?;
    let private_key = Zeroizing::new(
        hex::decode(&payload_key.private_key).context("payload signing key is not valid hex")?,
    );

    let ctx = CryptoContext::new();
    let signature = sign_payload(&ctx, &private_key, &payload, signing_config.as_ref())?;

    println!("{}", serde_json::to_string_pretty(&signature)?);
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON: {}", path))
}
