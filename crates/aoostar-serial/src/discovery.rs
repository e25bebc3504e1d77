//! USB 串口设备发现
//!
//! 枚举系统串口，按 USB VID/PID 匹配目标设备。

use crate::TransportError;
use aoostar_protocol::ScreenConfig;
use serialport::{SerialPortType, available_ports};
use tracing::debug;

/// 查找配置中 VID/PID 对应的串口名
///
/// 返回第一个匹配的端口（如 `COM3` 或 `/dev/ttyACM0`）。
/// 没有匹配端口时返回 [`TransportError::DeviceNotFound`]。
pub fn find_screen_port(config: &ScreenConfig) -> Result<String, TransportError> {
    let ports = available_ports()?;

    for port in &ports {
        if let SerialPortType::UsbPort(info) = &port.port_type {
            debug!(
                port = %port.port_name,
                vid = info.vid,
                pid = info.pid,
                "enumerated usb serial port"
            );
            if info.vid == config.usb_vid && info.pid == config.usb_pid {
                return Ok(port.port_name.clone());
            }
        }
    }

    Err(TransportError::DeviceNotFound {
        vid: config.usb_vid,
        pid: config.usb_pid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_not_found_error_message() {
        let err = TransportError::DeviceNotFound {
            vid: 0x0416,
            pid: 0x90A1,
        };
        assert_eq!(
            err.to_string(),
            "No serial device with VID 0x0416 PID 0x90A1"
        );
    }
}
