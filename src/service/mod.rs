pub mod blockchain_data;
pub mod chain_signer;
pub mod key_share; // 多方签名分片接入
pub mod payload_signer;
