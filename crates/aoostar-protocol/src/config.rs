//! 设备常量配置
//!
//! 将抓包观测到的设备常量（几何尺寸、分块大小、USB VID/PID、串口参数）
//! 收拢为一个不可变配置结构体，由调用方显式传入编码器与传输引擎，
//! 避免进程级全局常量，便于未来支持其他几何尺寸的机型。

use crate::ProtocolError;
use std::time::Duration;

/// AOOSTAR 副屏设备配置
///
/// `Default` 实现对应已验证的 960x376 机型（GEM12 PRO MAX / WTR MAX）。
/// 其他几何尺寸需要硬件抓包确认传输开始帧的尺寸编码规则后才可启用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenConfig {
    /// 屏幕宽度（像素）
    pub width: u32,
    /// 屏幕高度（像素）
    pub height: u32,
    /// 单个数据分块的字节数（协议固定 47，且必须整除总负载）
    pub chunk_size: u32,
    /// USB Vendor ID
    pub usb_vid: u16,
    /// USB Product ID
    pub usb_pid: u16,
    /// 串口波特率
    pub baud_rate: u32,
    /// 应答字节（每帧写入后设备回复的单字节确认）
    pub ack_byte: u8,
    /// 应答读取超时
    pub read_timeout: Duration,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 376,
            chunk_size: 47,
            usb_vid: 0x0416,
            usb_pid: 0x90A1,
            baud_rate: 1_500_000,
            ack_byte: b'A',
            read_timeout: Duration::from_secs(2),
        }
    }
}

impl ScreenConfig {
    /// 整幅图像的 RGB565 负载字节数（width * height * 2）
    pub fn total_bytes(&self) -> u32 {
        self.width * self.height * 2
    }

    /// 完整传输需要的分块数量
    ///
    /// 要求 `chunk_size` 整除 `total_bytes()`：该协议所有分块（包括最后一块）
    /// 均为固定长度，不存在尾部残块。
    pub fn chunk_count(&self) -> Result<u32, ProtocolError> {
        self.validate()?;
        Ok(self.total_bytes() / self.chunk_size)
    }

    /// 校验几何配置
    ///
    /// - 宽/高/分块大小不可为 0
    /// - 分块大小必须整除总负载（47 | 721920 对默认几何成立）
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.width == 0 || self.height == 0 {
            return Err(ProtocolError::InvalidGeometry(format!(
                "{}x{}",
                self.width, self.height
            )));
        }
        if self.chunk_size == 0 {
            return Err(ProtocolError::InvalidGeometry("chunk_size = 0".to_string()));
        }
        if self.total_bytes() % self.chunk_size != 0 {
            return Err(ProtocolError::ChunkMisaligned {
                total_bytes: self.total_bytes(),
                chunk_size: self.chunk_size,
            });
        }
        Ok(())
    }
}
