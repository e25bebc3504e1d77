//! 传输状态机状态定义

use crate::error::AckStage;

/// 分块传输状态
///
/// 状态流转：`Idle -> AwaitStartAck -> Streaming(i) -> AwaitEndAck -> Complete`，
/// 任意非终态都可进入吸收态 `Failed`。同一时刻最多一次在途传输，
/// 由引擎对传输句柄的独占所有权保证。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// 空闲，未开始传输
    Idle,
    /// 传输开始帧已写出，等待应答
    AwaitStartAck,
    /// 正在推送分块，`chunk` 为下一个待发送的分块序号
    Streaming { chunk: u32 },
    /// 传输结束帧已写出，等待应答
    AwaitEndAck,
    /// 全部帧均被应答，传输成功
    Complete,
    /// 协议违例，终态（无自动重试）
    Failed(AckStage),
}

impl TransferState {
    /// 是否为终态（Complete 或 Failed）
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Complete | TransferState::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(TransferState::Complete.is_terminal());
        assert!(TransferState::Failed(AckStage::Start).is_terminal());
        assert!(!TransferState::Idle.is_terminal());
        assert!(!TransferState::Streaming { chunk: 3 }.is_terminal());
        assert!(!TransferState::AwaitEndAck.is_terminal());
    }
}
