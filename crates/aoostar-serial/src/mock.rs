//! 脚本化 Mock 传输（无硬件依赖）
//!
//! 记录每一条写入的帧，并按预置脚本回放应答字节，
//! 用于传输引擎的确定性单元测试。

use crate::{ScreenTransport, TransportError};
use std::collections::VecDeque;

/// 单次应答行为
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockReply {
    /// 回复指定字节
    Byte(u8),
    /// 模拟超时（设备无应答）
    Timeout,
}

/// 脚本化 Mock 传输
///
/// `read_byte` 优先消费脚本队列，队列耗尽后使用 `fallback`。
/// 所有写入的帧按顺序保留在 `written` 中供断言。
#[derive(Debug)]
pub struct MockTransport {
    /// 写入历史（每条完整帧一个条目）
    pub written: Vec<Vec<u8>>,
    script: VecDeque<MockReply>,
    fallback: MockReply,
}

impl MockTransport {
    /// 对每一帧都回复 `ack` 的传输
    pub fn acking(ack: u8) -> Self {
        Self {
            written: Vec::new(),
            script: VecDeque::new(),
            fallback: MockReply::Byte(ack),
        }
    }

    /// 前 `n` 帧回复 `ack`，之后超时
    pub fn acking_n(ack: u8, n: usize) -> Self {
        let mut transport = Self::acking(ack);
        transport.script = std::iter::repeat_n(MockReply::Byte(ack), n).collect();
        transport.fallback = MockReply::Timeout;
        transport
    }

    /// 追加一条脚本应答
    pub fn push_reply(&mut self, reply: MockReply) -> &mut Self {
        self.script.push_back(reply);
        self
    }

    /// 已写入的帧数量
    pub fn frames_written(&self) -> usize {
        self.written.len()
    }
}

impl ScreenTransport for MockTransport {
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.written.push(frame.to_vec());
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, TransportError> {
        let reply = self.script.pop_front().unwrap_or(self.fallback);
        match reply {
            MockReply::Byte(b) => Ok(b),
            MockReply::Timeout => Err(TransportError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_written_frames() {
        let mut transport = MockTransport::acking(b'A');
        transport.write_frame(&[1, 2, 3]).unwrap();
        transport.write_frame(&[4]).unwrap();
        assert_eq!(transport.written, vec![vec![1, 2, 3], vec![4]]);
    }

    #[test]
    fn test_script_then_fallback() {
        let mut transport = MockTransport::acking(b'A');
        transport.push_reply(MockReply::Byte(b'X'));
        assert_eq!(transport.read_byte().unwrap(), b'X');
        assert_eq!(transport.read_byte().unwrap(), b'A');
    }

    #[test]
    fn test_acking_n_times_out_after_n() {
        let mut transport = MockTransport::acking_n(b'A', 2);
        assert_eq!(transport.read_byte().unwrap(), b'A');
        assert_eq!(transport.read_byte().unwrap(), b'A');
        assert!(matches!(
            transport.read_byte(),
            Err(TransportError::Timeout)
        ));
    }
}
