//! 命令帧构建
//!
//! 所有帧共享 4 字节前导码 `AA 55 AA 55`，随后是 4 字节小端操作码字段。
//! 抓包确认的五种帧：
//!
//! | 帧 | 前导码之后 |
//! |---|---|
//! | 开屏 | `0B 00 00 00` |
//! | 关屏 | `0A 00 00 00` |
//! | 传输开始 | `05 00 00 00 04 00 0F 2F` + 总负载字节数（u32 小端） |
//! | 数据分块 | `08 00 00 00` + 分块字节偏移（u32 小端） + 分块数据 |
//! | 传输结束 | `06 00 00 00` |

use bytes::{BufMut, Bytes, BytesMut};

/// 帧前导码 `AA 55 AA 55`
pub const FRAME_PREAMBLE: [u8; 4] = [0xAA, 0x55, 0xAA, 0x55];

/// 开屏操作码
pub const OPCODE_POWER_ON: [u8; 4] = [0x0B, 0x00, 0x00, 0x00];
/// 关屏操作码
pub const OPCODE_POWER_OFF: [u8; 4] = [0x0A, 0x00, 0x00, 0x00];
/// 传输开始操作码
pub const OPCODE_TRANSFER_START: [u8; 4] = [0x05, 0x00, 0x00, 0x00];
/// 数据分块操作码
pub const OPCODE_CHUNK_HEADER: [u8; 4] = [0x08, 0x00, 0x00, 0x00];
/// 传输结束操作码
pub const OPCODE_TRANSFER_END: [u8; 4] = [0x06, 0x00, 0x00, 0x00];

/// 传输开始帧中操作码与尺寸字段之间的固定参数
///
/// 抓包值 `04 00 0F 2F`，含义未知（推测编码了隐式的宽/高信息）。
/// 在未对其他几何尺寸的机型抓包验证前不要改动。
pub const TRANSFER_START_PARAMS: [u8; 4] = [0x04, 0x00, 0x0F, 0x2F];

/// 协议帧
///
/// 每个变体对应一条设备命令；`encode()` 生成可直接写入串口的完整字节序列。
/// 分块帧持有负载的独立拷贝（`Bytes`），编码结果自包含。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferFrame {
    /// 开屏
    PowerOn,
    /// 关屏
    PowerOff,
    /// 传输开始（携带总负载字节数，来源于 `ScreenConfig::total_bytes()`）
    TransferStart { total_bytes: u32 },
    /// 数据分块（分块在整幅负载中的字节偏移 + 分块数据原样拷贝）
    ChunkHeader { offset: u32, data: Bytes },
    /// 传输结束
    TransferEnd,
}

impl TransferFrame {
    /// 创建分块帧
    pub fn chunk(offset: u32, data: impl Into<Bytes>) -> Self {
        Self::ChunkHeader {
            offset,
            data: data.into(),
        }
    }

    /// 帧对应的 4 字节操作码
    pub fn opcode(&self) -> [u8; 4] {
        match self {
            TransferFrame::PowerOn => OPCODE_POWER_ON,
            TransferFrame::PowerOff => OPCODE_POWER_OFF,
            TransferFrame::TransferStart { .. } => OPCODE_TRANSFER_START,
            TransferFrame::ChunkHeader { .. } => OPCODE_CHUNK_HEADER,
            TransferFrame::TransferEnd => OPCODE_TRANSFER_END,
        }
    }

    /// 序列化为完整的线上字节序列（前导码 + 操作码 + 参数）
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_slice(&FRAME_PREAMBLE);
        buf.put_slice(&self.opcode());

        match self {
            TransferFrame::PowerOn | TransferFrame::PowerOff | TransferFrame::TransferEnd => {}
            TransferFrame::TransferStart { total_bytes } => {
                buf.put_slice(&TRANSFER_START_PARAMS);
                buf.put_u32_le(*total_bytes);
            }
            TransferFrame::ChunkHeader { offset, data } => {
                buf.put_u32_le(*offset);
                buf.put_slice(data);
            }
        }

        buf.freeze()
    }

    /// 编码后的总字节数
    pub fn encoded_len(&self) -> usize {
        let body = match self {
            TransferFrame::PowerOn | TransferFrame::PowerOff | TransferFrame::TransferEnd => 0,
            TransferFrame::TransferStart { .. } => TRANSFER_START_PARAMS.len() + 4,
            TransferFrame::ChunkHeader { data, .. } => 4 + data.len(),
        };
        FRAME_PREAMBLE.len() + 4 + body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_frames() {
        assert_eq!(
            TransferFrame::PowerOn.encode().as_ref(),
            &[0xAA, 0x55, 0xAA, 0x55, 0x0B, 0x00, 0x00, 0x00]
        );
        assert_eq!(
            TransferFrame::PowerOff.encode().as_ref(),
            &[0xAA, 0x55, 0xAA, 0x55, 0x0A, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_transfer_start_matches_capture() {
        // 960x376x2 = 721920 = 0x000B0400，小端 00 04 0B 00
        let frame = TransferFrame::TransferStart {
            total_bytes: 721_920,
        };
        assert_eq!(
            frame.encode().as_ref(),
            &[
                0xAA, 0x55, 0xAA, 0x55, // 前导码
                0x05, 0x00, 0x00, 0x00, // 操作码
                0x04, 0x00, 0x0F, 0x2F, // 固定参数
                0x00, 0x04, 0x0B, 0x00, // 总负载（小端）
            ]
        );
    }

    #[test]
    fn test_transfer_end() {
        assert_eq!(
            TransferFrame::TransferEnd.encode().as_ref(),
            &[0xAA, 0x55, 0xAA, 0x55, 0x06, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_chunk_frame_layout() {
        let data: Vec<u8> = (0..47).collect();
        let frame = TransferFrame::chunk(0x0001_0203, data.clone());
        let encoded = frame.encode();

        assert_eq!(encoded.len(), 8 + 4 + 47);
        assert_eq!(&encoded[..4], &FRAME_PREAMBLE);
        assert_eq!(&encoded[4..8], &OPCODE_CHUNK_HEADER);
        // 偏移小端编码
        assert_eq!(&encoded[8..12], &[0x03, 0x02, 0x01, 0x00]);
        // 负载原样拷贝
        assert_eq!(&encoded[12..], data.as_slice());
    }

    #[test]
    fn test_encoded_len_matches_encode() {
        let frames = [
            TransferFrame::PowerOn,
            TransferFrame::PowerOff,
            TransferFrame::TransferStart { total_bytes: 42 },
            TransferFrame::chunk(0, vec![0u8; 47]),
            TransferFrame::TransferEnd,
        ];
        for frame in frames {
            assert_eq!(frame.encode().len(), frame.encoded_len());
        }
    }
}
