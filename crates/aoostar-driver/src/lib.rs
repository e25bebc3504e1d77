//! # AOOSTAR Screen Driver
//!
//! 分块传输引擎：把整幅 RGB565 负载按应答门控协议推给设备。
//!
//! ## 协议要点
//!
//! - 每写一帧，阻塞读取一个应答字节；应答缺失或错误即整次传输失败
//! - 无滑动窗口、无校验和、无自动重传（与设备固件行为保持一致）
//! - 设备侧只有单帧缓冲，"先应答后下一帧"的顺序就是正确性机制本身
//!
//! ## 使用
//!
//! ```no_run
//! use aoostar_driver::ScreenDriver;
//! use aoostar_protocol::ScreenConfig;
//! use aoostar_serial::{SerialScreenTransport, find_screen_port};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScreenConfig::default();
//! let port = find_screen_port(&config)?;
//! let transport = SerialScreenTransport::open(&port, &config)?;
//! let mut driver = ScreenDriver::new(transport, config)?;
//!
//! driver.power_on()?;
//! let payload = vec![0u8; 721_920];
//! driver.send_image(&payload)?;
//! # Ok(())
//! # }
//! ```

mod driver;
mod error;
mod state;

pub use driver::ScreenDriver;
pub use error::{AckStage, DriverError};
pub use state::TransferState;
