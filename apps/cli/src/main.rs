//! # AOOSTAR CLI
//!
//! AOOSTAR 副屏命令行工具。
//!
//! ```bash
//! # 开屏 / 关屏
//! aoostar-cli on
//! aoostar-cli off
//!
//! # 推送一幅原始 RGB888 图像（960*376*3 字节，由外部工具生成）
//! aoostar-cli image frame.rgb
//!
//! # 推送已编码的 RGB565 负载（960*376*2 字节）
//! aoostar-cli image --rgb565 frame.rgb565
//!
//! # 读取 HWiNFO 遥测快照（仅 Windows）
//! aoostar-cli sensors --json
//! ```
//!
//! 图像缩放、排版与字体渲染不在本工具范围内：`image` 只接受
//! 尺寸完全匹配的现成像素缓冲。

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use aoostar_driver::ScreenDriver;
use aoostar_protocol::{ScreenConfig, encode_rgb565};
use aoostar_serial::{SerialScreenTransport, find_screen_port};

/// AOOSTAR 副屏命令行工具
#[derive(Parser, Debug)]
#[command(name = "aoostar-cli")]
#[command(about = "Basic controls for AOOSTAR GEM12 PRO MAX / WTR MAX screens", long_about = None)]
#[command(version)]
struct Cli {
    /// 串口名（默认按 USB VID/PID 自动发现）
    #[arg(long, global = true)]
    port: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 开屏
    On,

    /// 关屏
    Off,

    /// 推送一幅图像
    Image {
        /// 像素文件：RGB888（宽*高*3 字节），或 --rgb565 时为已编码负载
        path: PathBuf,

        /// 文件已是 RGB565 负载（宽*高*2 字节），跳过编码
        #[arg(long)]
        rgb565: bool,
    },

    /// 读取 HWiNFO 遥测快照（仅 Windows）
    Sensors {
        /// 以 JSON 输出完整快照
        #[arg(long)]
        json: bool,
    },

    /// 列出候选 USB 串口
    Ports,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("aoostar_cli=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = ScreenConfig::default();

    match cli.command {
        Commands::On => {
            let mut driver = open_driver(cli.port, &config)?;
            driver.power_on()?;
            println!("Screen enabled");
            Ok(())
        }

        Commands::Off => {
            let mut driver = open_driver(cli.port, &config)?;
            driver.power_off()?;
            println!("Screen disabled");
            Ok(())
        }

        Commands::Image { path, rgb565 } => {
            let payload = load_payload(&path, rgb565, &config)?;
            let mut driver = open_driver(cli.port, &config)?;
            driver.send_image(&payload)?;
            println!("Image sent ({} bytes)", payload.len());
            Ok(())
        }

        Commands::Sensors { json } => dump_sensors(json),

        Commands::Ports => list_ports(&config),
    }
}

/// 发现设备并打开驱动
fn open_driver(
    port: Option<String>,
    config: &ScreenConfig,
) -> Result<ScreenDriver<SerialScreenTransport>> {
    let port = match port {
        Some(port) => port,
        None => find_screen_port(config).context("screen device discovery failed")?,
    };
    tracing::info!(port = %port, "using serial port");

    let transport = SerialScreenTransport::open(&port, config)
        .with_context(|| format!("failed to open serial port {port}"))?;
    Ok(ScreenDriver::new(transport, config.clone())?)
}

/// 读取像素文件并按需编码为 RGB565
fn load_payload(path: &PathBuf, rgb565: bool, config: &ScreenConfig) -> Result<Vec<u8>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    if rgb565 {
        let expected = config.total_bytes() as usize;
        if bytes.len() != expected {
            bail!(
                "RGB565 payload must be exactly {expected} bytes for {}x{}, got {}",
                config.width,
                config.height,
                bytes.len()
            );
        }
        return Ok(bytes);
    }

    Ok(encode_rgb565(&bytes, config.width, config.height)?)
}

#[cfg(windows)]
fn dump_sensors(json: bool) -> Result<()> {
    let snapshot = hwinfo_shm::read_snapshot()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!(
        "HWiNFO v{} | {} sensors | {} readings",
        snapshot.header.version,
        snapshot.sensors.len(),
        snapshot.readings.len()
    );
    println!("{:-<90}", "");
    println!(
        "{:<32} | {:<24} | {:<10} | {}",
        "SENSOR", "LABEL", "VALUE", "UNIT"
    );
    println!("{:-<90}", "");
    for entry in &snapshot.readings {
        println!(
            "{:<32} | {:<24} | {:<10.1} | {}",
            entry.sensor_name, entry.record.label_user, entry.record.value, entry.record.unit
        );
    }
    Ok(())
}

#[cfg(not(windows))]
fn dump_sensors(_json: bool) -> Result<()> {
    bail!("the sensors command requires Windows (HWiNFO shared memory is a Windows interface)")
}

/// 列出 USB 串口，标注与设备 VID/PID 匹配的条目
fn list_ports(config: &ScreenConfig) -> Result<()> {
    let ports = serialport::available_ports().context("failed to enumerate serial ports")?;
    if ports.is_empty() {
        println!("No serial ports found");
        return Ok(());
    }

    for port in ports {
        match port.port_type {
            serialport::SerialPortType::UsbPort(info) => {
                let matched = info.vid == config.usb_vid && info.pid == config.usb_pid;
                println!(
                    "{}  vid={:04x} pid={:04x}{}",
                    port.port_name,
                    info.vid,
                    info.pid,
                    if matched { "  <- screen" } else { "" }
                );
            }
            _ => println!("{}  (not usb)", port.port_name),
        }
    }
    Ok(())
}
