//! 驱动层错误类型定义

use aoostar_protocol::ProtocolError;
use aoostar_serial::TransportError;
use std::fmt;
use thiserror::Error;

/// 应答发生的协议阶段
///
/// 随错误一起上抛，用于定位是哪一帧没有拿到应答
/// （排查接触不良的线缆或无响应的设备时必需）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckStage {
    /// 开屏命令
    PowerOn,
    /// 关屏命令
    PowerOff,
    /// 传输开始帧
    Start,
    /// 第 N 个数据分块（从 0 计数）
    Chunk(u32),
    /// 传输结束帧
    End,
}

impl fmt::Display for AckStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AckStage::PowerOn => write!(f, "power-on"),
            AckStage::PowerOff => write!(f, "power-off"),
            AckStage::Start => write!(f, "start"),
            AckStage::Chunk(i) => write!(f, "chunk-{i}"),
            AckStage::End => write!(f, "end"),
        }
    }
}

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 传输层错误（串口 IO 等）
    #[error("Transport error at {stage}: {source}")]
    Transport {
        stage: AckStage,
        #[source]
        source: TransportError,
    },

    /// 协议层错误（负载尺寸、几何配置）
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 应答缺失或不匹配
    ///
    /// `got` 为 `None` 表示超时（零字节），`Some(b)` 表示收到了错误的字节。
    /// 协议无重传机制，该错误对本次传输是终态。
    #[error("No acknowledgement at {stage}: {}", ack_detail(.got))]
    NoAck { stage: AckStage, got: Option<u8> },
}

fn ack_detail(got: &Option<u8>) -> String {
    match got {
        Some(b) => format!("got 0x{b:02X}"),
        None => "timed out".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_stage_display() {
        assert_eq!(AckStage::Start.to_string(), "start");
        assert_eq!(AckStage::Chunk(42).to_string(), "chunk-42");
        assert_eq!(AckStage::End.to_string(), "end");
        assert_eq!(AckStage::PowerOn.to_string(), "power-on");
    }

    #[test]
    fn test_no_ack_display() {
        let err = DriverError::NoAck {
            stage: AckStage::Chunk(3),
            got: Some(0x42),
        };
        assert_eq!(err.to_string(), "No acknowledgement at chunk-3: got 0x42");

        let err = DriverError::NoAck {
            stage: AckStage::End,
            got: None,
        };
        assert_eq!(err.to_string(), "No acknowledgement at end: timed out");
    }
}
