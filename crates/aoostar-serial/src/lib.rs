//! # AOOSTAR Serial Transport Layer
//!
//! 串口传输抽象层，提供统一的字节流接口。
//!
//! 传输引擎（`aoostar-driver`）只依赖 [`ScreenTransport`] trait：
//! 真实硬件走 [`SerialScreenTransport`]（`serialport` 后端），
//! 测试走 `mock` feature 提供的脚本化 [`mock::MockTransport`]。

use std::time::Duration;
use thiserror::Error;

pub mod discovery;
pub mod serial;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use discovery::find_screen_port;
pub use serial::SerialScreenTransport;

/// 传输层统一错误类型
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// 应答读取超时（设备在超时窗口内未回复任何字节）
    #[error("Read timeout")]
    Timeout,

    /// 未找到匹配 VID/PID 的串口设备
    #[error("No serial device with VID 0x{vid:04X} PID 0x{pid:04X}")]
    DeviceNotFound { vid: u16, pid: u16 },
}

/// 屏幕字节流传输抽象
///
/// 契约：一次 `write_frame` 写入一条完整帧；随后恰好一次 `read_byte`
/// 读取单字节应答。`read_byte` 的等待必须有界，超时返回
/// [`TransportError::Timeout`] 而不是挂起。
pub trait ScreenTransport {
    /// 将一条完整帧写入设备（写满为止）
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), TransportError>;

    /// 读取单字节应答，有界等待
    fn read_byte(&mut self) -> Result<u8, TransportError>;

    /// 调整应答读取超时（后端不支持时为空操作）
    fn set_read_timeout(&mut self, _timeout: Duration) -> Result<(), TransportError> {
        Ok(())
    }
}
