//! RGB888 -> RGB565 像素序列化
//!
//! 设备原生色彩格式为 16-bit RGB565：R 取高 5 位、G 取高 6 位、B 取高 5 位，
//! 打包为 `(r5 << 11) | (g6 << 5) | b5`，按小端写出两个字节。
//! 量化有损但确定：同一输入永远产生同一输出。

use crate::ProtocolError;

/// 将 8-bit RGB 分量量化打包为 RGB565
#[inline]
pub fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
    let r5 = (r >> 3) as u16 & 0x1F;
    let g6 = (g >> 2) as u16 & 0x3F;
    let b5 = (b >> 3) as u16 & 0x1F;
    (r5 << 11) | (g6 << 5) | b5
}

/// 从 RGB565 拆出量化后的 5/6/5 分量（与 `pack_rgb565` 的截断结果对应）
#[inline]
pub fn unpack_rgb565(value: u16) -> (u8, u8, u8) {
    let r5 = ((value >> 11) & 0x1F) as u8;
    let g6 = ((value >> 5) & 0x3F) as u8;
    let b5 = (value & 0x1F) as u8;
    (r5, g6, b5)
}

/// 将 RGB888 像素缓冲区编码为设备负载
///
/// `rgb` 必须恰好包含 `width * height` 个 RGB 三元组（`width * height * 3` 字节），
/// 其他长度为契约违例，返回 [`ProtocolError::SizeMismatch`]。
/// 输出长度恒为 `width * height * 2`。纯函数，无 I/O。
pub fn encode_rgb565(rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ProtocolError> {
    let pixel_count = (width as usize) * (height as usize);
    let expected = pixel_count * 3;
    if rgb.len() != expected {
        return Err(ProtocolError::SizeMismatch {
            expected,
            actual: rgb.len(),
        });
    }

    let mut out = Vec::with_capacity(pixel_count * 2);
    for px in rgb.chunks_exact(3) {
        let packed = pack_rgb565(px[0], px[1], px[2]);
        out.extend_from_slice(&packed.to_le_bytes());
    }
    Ok(out)
}
