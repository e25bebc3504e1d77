//! Windows 共享内存映射
//!
//! 作用域获取：句柄与映射视图由 RAII 守卫一起持有，
//! 无论成功失败，任何退出路径都同时释放两者。
//! 映射绝不跨调用保留 —— 供应方数据每个轮询周期都在变化，
//! 陈旧快照不可接受。

use crate::{ShmError, TelemetrySnapshot};
use std::ffi::c_void;
use tracing::{debug, trace};
use windows_sys::Win32::Foundation::{CloseHandle, HANDLE};
use windows_sys::Win32::System::Memory::{
    FILE_MAP_READ, MEMORY_BASIC_INFORMATION, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile,
    OpenFileMappingW, UnmapViewOfFile, VirtualQuery,
};

/// 主共享内存段名称
pub const MAP_NAME: &str = "Global\\HWiNFO_SENS_SM2";
/// 远程变体名称
pub const MAP_NAME_REMOTE: &str = "Global\\HWiNFO_SENS_SM2_REMOTE_";

/// 只读映射视图守卫
///
/// Drop 时先解除映射再关闭句柄。
struct MappedView {
    handle: HANDLE,
    view: MEMORY_MAPPED_VIEW_ADDRESS,
    len: usize,
}

impl MappedView {
    /// 打开并映射命名共享内存段
    ///
    /// 先尝试主名称，失败后尝试远程变体；两者都不存在返回
    /// [`ShmError::NotFound`]，句柄存在但映射失败返回 [`ShmError::MapFailed`]。
    fn open() -> Result<Self, ShmError> {
        let mut handle: HANDLE = std::ptr::null_mut();
        for name in [MAP_NAME, MAP_NAME_REMOTE] {
            let wide: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
            handle = unsafe { OpenFileMappingW(FILE_MAP_READ, 0, wide.as_ptr()) };
            if !handle.is_null() {
                trace!(name, "shared memory mapping opened");
                break;
            }
        }
        if handle.is_null() {
            return Err(ShmError::NotFound);
        }

        let view = unsafe { MapViewOfFile(handle, FILE_MAP_READ, 0, 0, 0) };
        if view.Value.is_null() {
            let err = std::io::Error::last_os_error();
            unsafe { CloseHandle(handle) };
            return Err(ShmError::MapFailed(err));
        }

        // 映射整段（长度参数 0），实际大小通过 VirtualQuery 查询
        let mut info: MEMORY_BASIC_INFORMATION = unsafe { std::mem::zeroed() };
        let queried = unsafe {
            VirtualQuery(
                view.Value as *const c_void,
                &mut info,
                std::mem::size_of::<MEMORY_BASIC_INFORMATION>(),
            )
        };
        if queried == 0 {
            let err = std::io::Error::last_os_error();
            unsafe {
                UnmapViewOfFile(view);
                CloseHandle(handle);
            }
            return Err(ShmError::MapFailed(err));
        }

        debug!(len = info.RegionSize, "shared memory view mapped");
        Ok(Self {
            handle,
            view,
            len: info.RegionSize,
        })
    }

    /// 映射区域的字节视图
    ///
    /// 安全性：`view.Value` 指向长度为 `len`（VirtualQuery 返回的区域大小）
    /// 的已映射只读内存，生命周期受守卫约束。
    fn bytes(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.view.Value as *const u8, self.len) }
    }
}

impl Drop for MappedView {
    fn drop(&mut self) {
        unsafe {
            UnmapViewOfFile(self.view);
            CloseHandle(self.handle);
        }
    }
}

/// 读取一次遥测快照
///
/// 每次调用独立执行 打开 -> 映射 -> 解码 -> 释放，不做任何缓存；
/// 并发读取方各自调用即可，映射不跨线程共享。
pub fn read_snapshot() -> Result<TelemetrySnapshot, ShmError> {
    let view = MappedView::open()?;
    TelemetrySnapshot::parse(view.bytes())
}
