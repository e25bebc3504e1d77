//! 不可变遥测快照
//!
//! 一次快照是对共享内存状态在某个时刻的完整解码拷贝：
//! 构建完成后不再引用映射内存，映射随即释放。

use crate::ShmError;
use crate::layout::{ReadingRecord, Region, SensorRecord, TelemetryHeader};
use serde::Serialize;
use tracing::{debug, warn};

/// 读数的传感器索引越界时使用的占位名称
pub const UNKNOWN_SENSOR: &str = "Unknown Sensor";

/// 读数条目：解码后的读数记录 + 已解析的传感器展示名称
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingEntry {
    /// 所属传感器的展示名称；位置索引越界时为 [`UNKNOWN_SENSOR`]
    pub sensor_name: String,
    #[serde(flatten)]
    pub record: ReadingRecord,
}

/// 遥测快照（构建后不可变）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub header: TelemetryHeader,
    /// 传感器表，下标即协议中的位置索引
    pub sensors: Vec<SensorRecord>,
    /// 读数序列，保持共享内存中的顺序
    pub readings: Vec<ReadingEntry>,
}

impl TelemetrySnapshot {
    /// 从一段完整的共享内存字节区域解码快照
    ///
    /// - 签名不符返回 [`ShmError::InvalidSignature`]，不产出任何部分数据
    /// - 头部声明的任何记录越界返回 [`ShmError::OutOfBounds`]
    /// - 读数的传感器索引越界不致命：该条读数解析为 [`UNKNOWN_SENSOR`]，
    ///   单条畸形读数不应废掉整个快照
    pub fn parse(bytes: &[u8]) -> Result<Self, ShmError> {
        let region = Region::new(bytes);
        let header = TelemetryHeader::parse(&region)?;
        header.check_signature()?;

        // 数量来自外部数据，不做预分配，越界由 record() 拦截
        let mut sensors = Vec::new();
        for i in 0..header.sensor_count {
            let record = region.record(header.sensor_offset, i, header.sensor_element_size)?;
            sensors.push(SensorRecord::parse(&record)?);
        }

        let mut readings = Vec::new();
        for i in 0..header.reading_count {
            let record = region.record(header.reading_offset, i, header.reading_element_size)?;
            let record = ReadingRecord::parse(&record)?;

            let sensor_name = match sensors.get(record.sensor_index as usize) {
                Some(sensor) => sensor.display_name().to_string(),
                None => {
                    warn!(
                        reading = i,
                        sensor_index = record.sensor_index,
                        sensors = sensors.len(),
                        "reading references out-of-range sensor index"
                    );
                    UNKNOWN_SENSOR.to_string()
                }
            };
            readings.push(ReadingEntry {
                sensor_name,
                record,
            });
        }

        debug!(
            version = header.version,
            sensors = sensors.len(),
            readings = readings.len(),
            "telemetry snapshot decoded"
        );

        Ok(Self {
            header,
            sensors,
            readings,
        })
    }

    /// 按原始标签查找读数（原始标签不随用户重命名变化，适合做稳定键）
    pub fn reading_by_label(&self, label_orig: &str) -> Option<&ReadingEntry> {
        self.readings
            .iter()
            .find(|r| r.record.label_orig == label_orig)
    }
}
