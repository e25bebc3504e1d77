//! # AOOSTAR Screen Protocol
//!
//! AOOSTAR 副屏（GEM12 PRO MAX / WTR MAX 等机型）USB 串口协议定义（无硬件依赖）。
//!
//! ## 模块
//!
//! - `config`: 设备常量配置（几何尺寸、分块大小、USB ID、串口参数）
//! - `frame`: 命令帧构建（开/关屏、传输开始、分块、传输结束）
//! - `pixel`: RGB888 -> RGB565 像素序列化
//!
//! ## 字节序
//!
//! 协议所有多字节字段均为小端字节序（LSB 在前），
//! 每帧以固定前导码 `AA 55 AA 55` 开头。

pub mod config;
pub mod frame;
pub mod pixel;

pub use config::ScreenConfig;
pub use frame::{FRAME_PREAMBLE, TransferFrame};
pub use pixel::{encode_rgb565, pack_rgb565, unpack_rgb565};

use thiserror::Error;

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// 像素缓冲区长度与设备几何尺寸不符
    #[error("Pixel payload size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// 分块大小无法整除总负载（该设备协议不支持尾部残块）
    #[error("Chunk size {chunk_size} does not evenly divide payload of {total_bytes} bytes")]
    ChunkMisaligned { total_bytes: u32, chunk_size: u32 },

    /// 非法的设备几何配置（宽/高/分块大小为 0）
    #[error("Invalid screen geometry: {0}")]
    InvalidGeometry(String),
}
