//! 定长字节串字段解码
//!
//! HWiNFO 的名称/标签字段是定长原始字节数组：在首个 NUL 处截断
//! （无 NUL 则取整个字段），再按字段族解码：
//!
//! - `sz*` 字段：传统 8-bit 代码页。这里固定为 Windows-1252，
//!   与宿主 locale 无关，同一字节串在任何机器上解码结果相同。
//! - `utf*` 影子字段：UTF-8。
//!
//! 两者都采用逐字符替换的有损策略，解码永不失败。

/// NUL 截断
fn until_nul(field: &[u8]) -> &[u8] {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    &field[..end]
}

/// 解码传统代码页字段（`sz*`）
pub fn decode_legacy(field: &[u8]) -> String {
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(until_nul(field));
    text.into_owned()
}

/// 解码 UTF-8 影子字段（`utf*`），无效序列逐字符替换
pub fn decode_utf8(field: &[u8]) -> String {
    String::from_utf8_lossy(until_nul(field)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nul_truncation_ignores_trailing_garbage() {
        // "CPU" + NUL + 任意非 NUL 垃圾字节
        let mut field = [0xFFu8; 128];
        field[..3].copy_from_slice(b"CPU");
        field[3] = 0;
        assert_eq!(decode_legacy(&field), "CPU");
    }

    #[test]
    fn test_field_without_nul_uses_whole_field() {
        let field = [b'X'; 16];
        assert_eq!(decode_legacy(&field), "X".repeat(16));
    }

    #[test]
    fn test_empty_field() {
        let field = [0u8; 128];
        assert_eq!(decode_legacy(&field), "");
        assert_eq!(decode_utf8(&field), "");
    }

    #[test]
    fn test_legacy_high_bytes_decode_as_windows_1252() {
        // 0xB0 -> '°'（典型的温度单位字段）
        let field = [0xB0, b'C', 0, 0];
        assert_eq!(decode_legacy(&field), "°C");
    }

    #[test]
    fn test_invalid_utf8_replaced_not_fatal() {
        let field = [b'A', 0xFF, b'B', 0];
        assert_eq!(decode_utf8(&field), "A\u{FFFD}B");
    }
}
