//! serialport 后端实现
//!
//! 串口参数：1,500,000 波特，8 数据位，无校验，1 停止位，约 2 秒读超时。

use crate::{ScreenTransport, TransportError};
use aoostar_protocol::ScreenConfig;
use serialport::{DataBits, Parity, SerialPort, StopBits};
use std::io::{Read, Write};
use std::time::Duration;
use tracing::{debug, trace};

/// 基于 `serialport` 的屏幕传输实现
pub struct SerialScreenTransport {
    port: Box<dyn SerialPort>,
}

impl SerialScreenTransport {
    /// 按设备配置打开串口
    pub fn open(port_name: &str, config: &ScreenConfig) -> Result<Self, TransportError> {
        let port = serialport::new(port_name, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(config.read_timeout)
            .open()?;

        debug!(
            port = port_name,
            baud = config.baud_rate,
            timeout_ms = config.read_timeout.as_millis() as u64,
            "serial port opened"
        );

        Ok(Self { port })
    }
}

impl ScreenTransport for SerialScreenTransport {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(frame)?;
        self.port.flush()?;
        trace!(len = frame.len(), "frame written");
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, TransportError> {
        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(1) => Ok(buf[0]),
            // 零字节读视为超时：设备没有在窗口内给出应答
            Ok(_) => Err(TransportError::Timeout),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Err(TransportError::Timeout),
            Err(e) => Err(TransportError::Io(e)),
        }
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), TransportError> {
        self.port.set_timeout(timeout)?;
        Ok(())
    }
}
