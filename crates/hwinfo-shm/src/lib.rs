//! # HWiNFO Shared Memory Reader
//!
//! HWiNFO 以固定二进制布局在命名共享内存段
//! （`Global\HWiNFO_SENS_SM2`）中发布传感器读数。
//! 该内存由外部进程拥有且随轮询刷新，内容必须按"攻击者可控字节"对待：
//! 所有记录访问都经过边界校验的视图完成，绝不做裸指针算术。
//!
//! ## 模块
//!
//! - `layout`: 固定偏移的二进制布局解码（纯内存解释，无 I/O）
//! - `strings`: 定长字节串字段的有损解码（传统代码页 / UTF-8）
//! - `snapshot`: 不可变遥测快照及其构建
//! - `reader`: Windows 共享内存映射（作用域获取，退出即释放）
//!
//! ## 生命周期
//!
//! 每次 [`read_snapshot`]（仅 Windows）独立完成 打开 -> 映射 -> 解码 ->
//! 释放 的完整循环，不跨调用缓存：供应方数据每个轮询周期都在变化。

pub mod layout;
pub mod snapshot;
pub mod strings;

#[cfg(windows)]
pub mod reader;

#[cfg(windows)]
pub use reader::read_snapshot;

pub use layout::{ReadingRecord, ReadingType, SensorRecord, TelemetryHeader};
pub use snapshot::{ReadingEntry, TelemetrySnapshot};

use thiserror::Error;

/// 共享内存遥测错误类型
#[derive(Error, Debug)]
pub enum ShmError {
    /// 命名共享内存段不存在（HWiNFO 未运行或未开启 Shared Memory Support）
    #[error(
        "HWiNFO shared memory not found. \
         Ensure HWiNFO is running and 'Shared Memory Support' is enabled"
    )]
    NotFound,

    /// 段句柄存在但映射失败
    #[error("Failed to map shared memory view: {0}")]
    MapFailed(#[source] std::io::Error),

    /// 头部签名不匹配（损坏或不兼容的供应方）
    #[error("Invalid HWiNFO signature: expected 0x{expected:08X}, found 0x{found:08X}")]
    InvalidSignature { expected: u32, found: u32 },

    /// 记录访问越界（头部声明的偏移/数量超出映射区域）
    #[error("Record access out of bounds: offset {offset} + len {len} > region {region_len}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        region_len: usize,
    },
}
