//! 固定偏移二进制布局解码
//!
//! HWiNFO 共享内存结构（`_pack_ = 1`，无填充，全部小端）：
//!
//! - 头部 48 字节：签名、版本、修订、轮询时间戳、两段记录区的
//!   偏移/元素大小/元素数量、轮询周期
//! - 传感器元素 392 字节：传感器 ID、实例号、原始/用户名称（各 128 字节）、
//!   UTF-8 影子名称（128 字节，老版本可能缺失）
//! - 读数元素 460 字节：读数类型、传感器索引、读数 ID、标签、单位、
//!   当前/最小/最大/平均值、UTF-8 影子标签与单位
//!
//! 记录的实际步长以头部声明的元素大小为准，影子字段仅在元素大小
//! 覆盖到时才解码。所有访问都经 [`Region`] 边界校验，
//! 越界返回 [`ShmError::OutOfBounds`] 而不是未定义行为。

use crate::ShmError;
use crate::strings::{decode_legacy, decode_utf8};
use serde::Serialize;

/// 头部签名：ASCII `HWiS` 按小端读出的 32 位值
pub const SIGNATURE: u32 = 0x5369_5748;

/// 名称/标签字段长度
pub const SENSOR_STRING_LEN: usize = 128;
/// 单位字段长度
pub const UNIT_STRING_LEN: usize = 16;

/// 头部长度
pub const HEADER_LEN: usize = 48;

// 传感器元素字段偏移
const SENSOR_ID: usize = 0;
const SENSOR_INSTANCE: usize = 4;
const SENSOR_NAME_ORIG: usize = 8;
const SENSOR_NAME_USER: usize = 136;
const SENSOR_UTF_NAME_USER: usize = 264;
/// 含 UTF-8 影子字段的完整传感器元素长度
pub const SENSOR_FULL_LEN: usize = 392;

// 读数元素字段偏移
const READING_TYPE: usize = 0;
const READING_SENSOR_INDEX: usize = 4;
const READING_ID: usize = 8;
const READING_LABEL_ORIG: usize = 12;
const READING_LABEL_USER: usize = 140;
const READING_UNIT: usize = 268;
const READING_VALUE: usize = 284;
const READING_VALUE_MIN: usize = 292;
const READING_VALUE_MAX: usize = 300;
const READING_VALUE_AVG: usize = 308;
const READING_UTF_LABEL_USER: usize = 316;
const READING_UTF_UNIT: usize = 444;
/// 含 UTF-8 影子字段的完整读数元素长度
pub const READING_FULL_LEN: usize = 460;

// ============================================================================
// 边界校验视图
// ============================================================================

/// 外部字节区域上的边界校验视图
///
/// 共享内存头部的偏移与数量字段由外部进程写入，不可信任；
/// 每次访问都先校验 `offset + len <= region_len`，绝不做裸指针算术。
#[derive(Debug, Clone, Copy)]
pub(crate) struct Region<'a> {
    bytes: &'a [u8],
}

impl<'a> Region<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    /// 取 `offset..offset+len` 子区域，越界报错（溢出安全）
    pub(crate) fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], ShmError> {
        let oob = || ShmError::OutOfBounds {
            offset,
            len,
            region_len: self.bytes.len(),
        };
        let end = offset.checked_add(len).ok_or_else(oob)?;
        if end > self.bytes.len() {
            return Err(oob());
        }
        Ok(&self.bytes[offset..end])
    }

    /// 取 `base + index * elem_size` 处、长 `elem_size` 的记录子区域
    pub(crate) fn record(
        &self,
        base: u32,
        index: u32,
        elem_size: u32,
    ) -> Result<Region<'a>, ShmError> {
        let offset = (base as u64)
            .checked_add(index as u64 * elem_size as u64)
            .ok_or(ShmError::OutOfBounds {
                offset: usize::MAX,
                len: elem_size as usize,
                region_len: self.bytes.len(),
            })?;
        let offset = usize::try_from(offset).map_err(|_| ShmError::OutOfBounds {
            offset: usize::MAX,
            len: elem_size as usize,
            region_len: self.bytes.len(),
        })?;
        Ok(Region::new(self.slice(offset, elem_size as usize)?))
    }

    fn array<const N: usize>(&self, offset: usize) -> Result<[u8; N], ShmError> {
        let bytes = self.slice(offset, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub(crate) fn u32_le(&self, offset: usize) -> Result<u32, ShmError> {
        Ok(u32::from_le_bytes(self.array::<4>(offset)?))
    }

    pub(crate) fn i32_le(&self, offset: usize) -> Result<i32, ShmError> {
        Ok(i32::from_le_bytes(self.array::<4>(offset)?))
    }

    pub(crate) fn i64_le(&self, offset: usize) -> Result<i64, ShmError> {
        Ok(i64::from_le_bytes(self.array::<8>(offset)?))
    }

    pub(crate) fn f64_le(&self, offset: usize) -> Result<f64, ShmError> {
        Ok(f64::from_le_bytes(self.array::<8>(offset)?))
    }
}

// ============================================================================
// 头部
// ============================================================================

/// 共享内存头部
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryHeader {
    pub signature: u32,
    pub version: u32,
    pub revision: u32,
    /// 供应方最近一次轮询的时间戳（`__time64_t`）
    pub poll_time: i64,
    pub sensor_offset: u32,
    pub sensor_element_size: u32,
    pub sensor_count: u32,
    pub reading_offset: u32,
    pub reading_element_size: u32,
    pub reading_count: u32,
    /// 轮询周期（毫秒）
    pub polling_period: u32,
}

impl TelemetryHeader {
    pub(crate) fn parse(region: &Region<'_>) -> Result<Self, ShmError> {
        Ok(Self {
            signature: region.u32_le(0)?,
            version: region.u32_le(4)?,
            revision: region.u32_le(8)?,
            poll_time: region.i64_le(12)?,
            sensor_offset: region.u32_le(20)?,
            sensor_element_size: region.u32_le(24)?,
            sensor_count: region.u32_le(28)?,
            reading_offset: region.u32_le(32)?,
            reading_element_size: region.u32_le(36)?,
            reading_count: region.u32_le(40)?,
            polling_period: region.u32_le(44)?,
        })
    }

    /// 校验签名，失败即整个快照无效
    pub(crate) fn check_signature(&self) -> Result<(), ShmError> {
        if self.signature != SIGNATURE {
            return Err(ShmError::InvalidSignature {
                expected: SIGNATURE,
                found: self.signature,
            });
        }
        Ok(())
    }
}

// ============================================================================
// 传感器记录
// ============================================================================

/// 传感器记录
///
/// 读数通过传感器在记录区中的**位置索引**关联到它，
/// 而不是 `sensor_id` —— 位置索引才是外键。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorRecord {
    pub sensor_id: u32,
    pub instance: u32,
    /// 原始区域设置下的名称（传统代码页字段）
    pub name_orig: String,
    /// 用户区域设置下的名称（传统代码页字段）
    pub name_user: String,
    /// UTF-8 影子名称（仅当元素大小覆盖该字段时存在）
    pub utf_name_user: Option<String>,
}

impl SensorRecord {
    pub(crate) fn parse(record: &Region<'_>) -> Result<Self, ShmError> {
        let utf_name_user = if record.len() >= SENSOR_FULL_LEN {
            Some(decode_utf8(
                record.slice(SENSOR_UTF_NAME_USER, SENSOR_STRING_LEN)?,
            ))
        } else {
            None
        };
        Ok(Self {
            sensor_id: record.u32_le(SENSOR_ID)?,
            instance: record.u32_le(SENSOR_INSTANCE)?,
            name_orig: decode_legacy(record.slice(SENSOR_NAME_ORIG, SENSOR_STRING_LEN)?),
            name_user: decode_legacy(record.slice(SENSOR_NAME_USER, SENSOR_STRING_LEN)?),
            utf_name_user,
        })
    }

    /// 展示名称（使用传统代码页的用户名称字段，跟随 HWiNFO 面板重命名）
    pub fn display_name(&self) -> &str {
        &self.name_user
    }
}

// ============================================================================
// 读数记录
// ============================================================================

/// 读数类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingType {
    None,
    Temp,
    Volt,
    Fan,
    Current,
    Power,
    Clock,
    Usage,
    Other,
    /// 未识别的类型值（向前兼容，保留原始值）
    Unknown(i32),
}

impl ReadingType {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => ReadingType::None,
            1 => ReadingType::Temp,
            2 => ReadingType::Volt,
            3 => ReadingType::Fan,
            4 => ReadingType::Current,
            5 => ReadingType::Power,
            6 => ReadingType::Clock,
            7 => ReadingType::Usage,
            8 => ReadingType::Other,
            other => ReadingType::Unknown(other),
        }
    }

    /// 展示名称（与 HWiNFO 的类型命名一致）
    pub fn label(&self) -> &'static str {
        match self {
            ReadingType::None => "None",
            ReadingType::Temp => "Temp",
            ReadingType::Volt => "Volt",
            ReadingType::Fan => "Fan",
            ReadingType::Current => "Current",
            ReadingType::Power => "Power",
            ReadingType::Clock => "Clock",
            ReadingType::Usage => "Usage",
            ReadingType::Other => "Other",
            ReadingType::Unknown(_) => "Unknown",
        }
    }
}

impl serde::Serialize for ReadingType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// 读数记录（解码后的原始形态，未做传感器名称解析）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingRecord {
    #[serde(rename = "type")]
    pub reading_type: ReadingType,
    /// 所属传感器的位置索引（来源不保证在界内，必须在读取侧校验）
    pub sensor_index: u32,
    pub reading_id: u32,
    pub label_orig: String,
    pub label_user: String,
    pub unit: String,
    pub value: f64,
    pub value_min: f64,
    pub value_max: f64,
    pub value_avg: f64,
    pub utf_label_user: Option<String>,
    pub utf_unit: Option<String>,
}

impl ReadingRecord {
    pub(crate) fn parse(record: &Region<'_>) -> Result<Self, ShmError> {
        let (utf_label_user, utf_unit) = if record.len() >= READING_FULL_LEN {
            (
                Some(decode_utf8(
                    record.slice(READING_UTF_LABEL_USER, SENSOR_STRING_LEN)?,
                )),
                Some(decode_utf8(record.slice(READING_UTF_UNIT, UNIT_STRING_LEN)?)),
            )
        } else {
            (None, None)
        };
        Ok(Self {
            reading_type: ReadingType::from_raw(record.i32_le(READING_TYPE)?),
            sensor_index: record.u32_le(READING_SENSOR_INDEX)?,
            reading_id: record.u32_le(READING_ID)?,
            label_orig: decode_legacy(record.slice(READING_LABEL_ORIG, SENSOR_STRING_LEN)?),
            label_user: decode_legacy(record.slice(READING_LABEL_USER, SENSOR_STRING_LEN)?),
            unit: decode_legacy(record.slice(READING_UNIT, UNIT_STRING_LEN)?),
            value: record.f64_le(READING_VALUE)?,
            value_min: record.f64_le(READING_VALUE_MIN)?,
            value_max: record.f64_le(READING_VALUE_MAX)?,
            value_avg: record.f64_le(READING_VALUE_AVG)?,
            utf_label_user,
            utf_unit,
        })
    }
}
