//! 传输引擎实现
//!
//! 引擎独占持有传输句柄：同一传输上不可能有并发传输，
//! 这是所有权层面的保证，不依赖调用方自觉。

use crate::error::{AckStage, DriverError};
use crate::state::TransferState;
use aoostar_protocol::{ProtocolError, ScreenConfig, TransferFrame};
use aoostar_serial::{ScreenTransport, TransportError};
use bytes::Bytes;
use tracing::{debug, info, trace};

/// 屏幕驱动 / 分块传输引擎
///
/// 同步、单线程：每写一帧阻塞等待一个应答字节，应答到达前绝不发送
/// 下一帧。设备侧只有单帧缓冲，这个顺序就是正确性机制。
#[derive(Debug)]
pub struct ScreenDriver<T: ScreenTransport> {
    transport: T,
    config: ScreenConfig,
    state: TransferState,
    chunk_count: u32,
}

impl<T: ScreenTransport> ScreenDriver<T> {
    /// 创建驱动，校验几何配置（分块大小必须整除总负载）
    pub fn new(transport: T, config: ScreenConfig) -> Result<Self, DriverError> {
        let chunk_count = config.chunk_count()?;
        Ok(Self {
            transport,
            config,
            state: TransferState::Idle,
            chunk_count,
        })
    }

    /// 当前传输状态
    pub fn state(&self) -> TransferState {
        self.state
    }

    /// 设备配置
    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    /// 归还传输句柄
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// 开屏
    ///
    /// 单帧单应答，独立于分块传输状态机，可在传输前后任意时刻调用。
    pub fn power_on(&mut self) -> Result<(), DriverError> {
        debug!("power on");
        self.send_standalone(&TransferFrame::PowerOn, AckStage::PowerOn)
    }

    /// 关屏
    pub fn power_off(&mut self) -> Result<(), DriverError> {
        debug!("power off");
        self.send_standalone(&TransferFrame::PowerOff, AckStage::PowerOff)
    }

    /// 推送一整幅图像
    ///
    /// `payload` 必须恰好为 `config.total_bytes()` 字节的 RGB565 数据，
    /// 其他长度是契约违例（[`ProtocolError::SizeMismatch`]），不写任何帧。
    ///
    /// 任何一帧的应答缺失/错误都让本次传输进入 [`TransferState::Failed`]
    /// 终态并立即返回错误，之后不再写出任何帧；屏幕可能停留在半幅画面，
    /// 恢复手段只有重新发起完整传输。
    pub fn send_image(&mut self, payload: &[u8]) -> Result<(), DriverError> {
        let expected = self.config.total_bytes() as usize;
        if payload.len() != expected {
            return Err(ProtocolError::SizeMismatch {
                expected,
                actual: payload.len(),
            }
            .into());
        }

        info!(
            total_bytes = expected,
            chunks = self.chunk_count,
            "starting image transfer"
        );

        self.state = TransferState::Idle;
        loop {
            match self.state {
                TransferState::Idle => {
                    let frame = TransferFrame::TransferStart {
                        total_bytes: self.config.total_bytes(),
                    };
                    self.write_frame(&frame, AckStage::Start)?;
                    self.state = TransferState::AwaitStartAck;
                }

                TransferState::AwaitStartAck => {
                    self.await_ack(AckStage::Start)?;
                    self.state = TransferState::Streaming { chunk: 0 };
                }

                TransferState::Streaming { chunk } if chunk == self.chunk_count => {
                    self.write_frame(&TransferFrame::TransferEnd, AckStage::End)?;
                    self.state = TransferState::AwaitEndAck;
                }

                TransferState::Streaming { chunk } => {
                    let offset = chunk * self.config.chunk_size;
                    let begin = offset as usize;
                    let end = begin + self.config.chunk_size as usize;
                    let frame =
                        TransferFrame::chunk(offset, Bytes::copy_from_slice(&payload[begin..end]));

                    let stage = AckStage::Chunk(chunk);
                    self.write_frame(&frame, stage)?;
                    self.await_ack(stage)?;
                    trace!(chunk, offset, "chunk acknowledged");
                    self.state = TransferState::Streaming { chunk: chunk + 1 };
                }

                TransferState::AwaitEndAck => {
                    self.await_ack(AckStage::End)?;
                    self.state = TransferState::Complete;
                }

                TransferState::Complete => {
                    info!(chunks = self.chunk_count, "image transfer complete");
                    return Ok(());
                }

                TransferState::Failed(stage) => {
                    // 错误路径直接 return，不会落到这里
                    return Err(DriverError::NoAck { stage, got: None });
                }
            }
        }
    }

    /// 写一帧；传输层失败时进入 Failed 终态
    fn write_frame(&mut self, frame: &TransferFrame, stage: AckStage) -> Result<(), DriverError> {
        let bytes = frame.encode();
        if let Err(source) = self.transport.write_frame(&bytes) {
            self.state = TransferState::Failed(stage);
            return Err(DriverError::Transport { stage, source });
        }
        Ok(())
    }

    /// 读取并校验单字节应答；失败时进入 Failed 终态
    fn await_ack(&mut self, stage: AckStage) -> Result<(), DriverError> {
        if let Err(e) = self.expect_ack(stage) {
            self.state = TransferState::Failed(stage);
            return Err(e);
        }
        Ok(())
    }

    /// 独立命令：单帧单应答，不触碰传输状态机
    fn send_standalone(
        &mut self,
        frame: &TransferFrame,
        stage: AckStage,
    ) -> Result<(), DriverError> {
        let bytes = frame.encode();
        self.transport
            .write_frame(&bytes)
            .map_err(|source| DriverError::Transport { stage, source })?;
        self.expect_ack(stage)
    }

    fn expect_ack(&mut self, stage: AckStage) -> Result<(), DriverError> {
        match self.transport.read_byte() {
            Ok(b) if b == self.config.ack_byte => Ok(()),
            Ok(b) => Err(DriverError::NoAck {
                stage,
                got: Some(b),
            }),
            Err(TransportError::Timeout) => Err(DriverError::NoAck { stage, got: None }),
            Err(source) => Err(DriverError::Transport { stage, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aoostar_protocol::frame::{
        FRAME_PREAMBLE, OPCODE_CHUNK_HEADER, OPCODE_TRANSFER_END, OPCODE_TRANSFER_START,
    };
    use aoostar_serial::mock::{MockReply, MockTransport};

    /// 缩小的测试几何：4x2 像素，16 字节负载，4 字节分块 -> 4 个分块
    fn test_config() -> ScreenConfig {
        ScreenConfig {
            width: 4,
            height: 2,
            chunk_size: 4,
            ..ScreenConfig::default()
        }
    }

    fn test_driver(transport: MockTransport) -> ScreenDriver<MockTransport> {
        ScreenDriver::new(transport, test_config()).unwrap()
    }

    fn payload() -> Vec<u8> {
        (0u8..16).collect()
    }

    #[test]
    fn test_full_transfer_completes() {
        let mut driver = test_driver(MockTransport::acking(b'A'));
        driver.send_image(&payload()).unwrap();

        assert_eq!(driver.state(), TransferState::Complete);
        // start + 4 chunks + end = chunk_count + 2 帧
        let transport = driver.into_transport();
        assert_eq!(transport.frames_written(), 6);
        assert_eq!(&transport.written[0][4..8], &OPCODE_TRANSFER_START);
        assert_eq!(&transport.written[5][4..8], &OPCODE_TRANSFER_END);
    }

    #[test]
    fn test_chunk_frames_carry_offsets_and_payload() {
        let mut driver = test_driver(MockTransport::acking(b'A'));
        let data = payload();
        driver.send_image(&data).unwrap();

        let transport = driver.into_transport();
        for (i, frame) in transport.written[1..5].iter().enumerate() {
            let offset = (i * 4) as u32;
            assert_eq!(&frame[..4], &FRAME_PREAMBLE);
            assert_eq!(&frame[4..8], &OPCODE_CHUNK_HEADER);
            assert_eq!(&frame[8..12], &offset.to_le_bytes());
            assert_eq!(&frame[12..], &data[i * 4..(i + 1) * 4]);
        }
    }

    #[test]
    fn test_nack_at_each_chunk_aborts_without_further_frames() {
        for k in 0..4u32 {
            // start 应答 + k 个分块应答，然后超时
            let transport = MockTransport::acking_n(b'A', 1 + k as usize);
            let mut driver = test_driver(transport);

            let err = driver.send_image(&payload()).unwrap_err();
            assert!(
                matches!(err, DriverError::NoAck { stage: AckStage::Chunk(i), got: None } if i == k),
                "unexpected error at k={k}: {err}"
            );
            assert_eq!(driver.state(), TransferState::Failed(AckStage::Chunk(k)));

            // 失败点之后没有任何帧被写出：start + (k+1) 个分块帧
            let transport = driver.into_transport();
            assert_eq!(transport.frames_written(), 2 + k as usize);
        }
    }

    #[test]
    fn test_wrong_ack_byte_at_start() {
        let mut transport = MockTransport::acking(b'A');
        transport.push_reply(MockReply::Byte(b'X'));
        let mut driver = test_driver(transport);

        let err = driver.send_image(&payload()).unwrap_err();
        assert!(matches!(
            err,
            DriverError::NoAck {
                stage: AckStage::Start,
                got: Some(b'X'),
            }
        ));
        assert_eq!(driver.state(), TransferState::Failed(AckStage::Start));
        assert_eq!(driver.into_transport().frames_written(), 1);
    }

    #[test]
    fn test_nack_at_end_frame() {
        // start + 4 分块被应答，结束帧超时
        let transport = MockTransport::acking_n(b'A', 5);
        let mut driver = test_driver(transport);

        let err = driver.send_image(&payload()).unwrap_err();
        assert!(matches!(
            err,
            DriverError::NoAck {
                stage: AckStage::End,
                got: None,
            }
        ));
        assert_eq!(driver.state(), TransferState::Failed(AckStage::End));
        // 结束帧本身已写出
        assert_eq!(driver.into_transport().frames_written(), 6);
    }

    #[test]
    fn test_size_mismatch_writes_nothing() {
        let mut driver = test_driver(MockTransport::acking(b'A'));
        let err = driver.send_image(&[0u8; 15]).unwrap_err();

        assert!(matches!(
            err,
            DriverError::Protocol(ProtocolError::SizeMismatch {
                expected: 16,
                actual: 15,
            })
        ));
        assert_eq!(driver.state(), TransferState::Idle);
        assert_eq!(driver.into_transport().frames_written(), 0);
    }

    #[test]
    fn test_power_frames_single_ack() {
        let mut driver = test_driver(MockTransport::acking(b'A'));
        driver.power_on().unwrap();
        driver.power_off().unwrap();

        let transport = driver.into_transport();
        assert_eq!(transport.frames_written(), 2);
        assert_eq!(
            transport.written[0],
            vec![0xAA, 0x55, 0xAA, 0x55, 0x0B, 0x00, 0x00, 0x00]
        );
        assert_eq!(
            transport.written[1],
            vec![0xAA, 0x55, 0xAA, 0x55, 0x0A, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_power_nack_reports_stage() {
        let transport = MockTransport::acking_n(b'A', 0);
        let mut driver = test_driver(transport);

        let err = driver.power_on().unwrap_err();
        assert!(matches!(
            err,
            DriverError::NoAck {
                stage: AckStage::PowerOn,
                got: None,
            }
        ));
        // 独立命令不触碰传输状态机
        assert_eq!(driver.state(), TransferState::Idle);
    }

    #[test]
    fn test_transfer_can_be_reissued_after_failure() {
        let mut transport = MockTransport::acking(b'A');
        transport.push_reply(MockReply::Timeout);
        let mut driver = test_driver(transport);

        assert!(driver.send_image(&payload()).is_err());
        assert!(driver.state().is_terminal());

        // 失败后重新发起完整传输即可恢复
        driver.send_image(&payload()).unwrap();
        assert_eq!(driver.state(), TransferState::Complete);
    }

    #[test]
    fn test_misaligned_config_rejected_at_construction() {
        let config = ScreenConfig {
            width: 4,
            height: 2,
            chunk_size: 3,
            ..ScreenConfig::default()
        };
        let err = ScreenDriver::new(MockTransport::acking(b'A'), config).unwrap_err();
        assert!(matches!(
            err,
            DriverError::Protocol(ProtocolError::ChunkMisaligned { .. })
        ));
    }
}
