//! 数值/二进制编码
//!
//! 定点小数规范化、定长整数字节序编码、Bitcoin 风格变长整数

use crate::error::CodecError;

/// 将十进制字符串规范化为 `precision` 位小数后的整数（截断或补零）
///
/// `"1.5"` 在 precision = 2 时得到 `150`。precision = 0 时只接受整数。
pub fn normalize_amount(amount: &str, precision: u32) -> Result<i64, CodecError> {
    let parts: Vec<&str> = amount.split('.').collect();
    if parts.len() > 2 {
        return Err(CodecError::InvalidAmount(amount.to_string()));
    }

    let head = parts[0];
    let tail = parts.get(1).copied();

    if let Some(tail) = tail {
        if !tail.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::InvalidAmount(amount.to_string()));
        }
    }

    let digits = match (precision, tail) {
        (0, None) => head.to_string(),
        (0, Some(tail)) => {
            return Err(CodecError::TooManyDecimals {
                expected: 0,
                got: tail.len(),
            })
        }
        (p, tail) => {
            let p = p as usize;
            let tail = tail.unwrap_or("");
            if tail.len() >= p {
                format!("{}{}", head, &tail[..p])
            } else {
                format!("{}{}{}", head, tail, "0".repeat(p - tail.len()))
            }
        }
    };

    // ".5" 的整数部分为空
    let digits = if digits.is_empty() { "0".to_string() } else { digits };

    digits
        .parse::<i64>()
        .map_err(|_| CodecError::InvalidAmount(amount.to_string()))
}

/// 小数位数；超过 `precision` 时返回 0
pub fn precision_diff(amount: &str, precision: usize) -> Result<usize, CodecError> {
    let parts: Vec<&str> = amount.split('.').collect();
    if parts.len() != 2 {
        return Err(CodecError::InvalidAmount(amount.to_string()));
    }

    let tail = parts[1];
    if tail.len() > precision {
        return Ok(0);
    }
    Ok(tail.len())
}

/// 8 字节小端序 hex
pub fn to_little_endian_hex(n: i64) -> String {
    hex::encode(n.to_le_bytes())
}

/// 8 字节大端序 hex
pub fn to_big_endian_hex(n: i64) -> String {
    hex::encode(n.to_be_bytes())
}

/// Bitcoin 变长整数（hex）
pub fn encode_variable_integer(length: u64) -> Result<String, CodecError> {
    if length < 0xfd {
        Ok(format!("{:02x}", length))
    } else if length < 0x1_0000 {
        Ok(format!("fd{}", hex::encode((length as u16).to_le_bytes())))
    } else if length < 0x1_0000_0000 {
        Ok(format!("fe{}", hex::encode((length as u32).to_le_bytes())))
    } else {
        Err(CodecError::VarIntOverflow(length))
    }
}

/// 按字节反转 hex 字符串
pub fn reverse_hex(input: &str) -> Result<String, CodecError> {
    let mut bytes = hex::decode(input).map_err(|_| CodecError::InvalidHex(input.to_string()))?;
    bytes.reverse();
    Ok(hex::encode(bytes))
}

/// ETH 合约使用的 uint32 nonce（8 位 hex）
pub fn convert_eth_nonce(nonce: u64) -> Result<String, CodecError> {
    if nonce > u32::MAX as u64 {
        return Err(CodecError::NonceTooLarge(nonce));
    }
    Ok(format!("{:08x}", nonce))
}
