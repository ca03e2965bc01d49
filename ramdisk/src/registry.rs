//! # 注册表层
//!
//! 注册表是活动设备的权威集合，以名字为键精确查找。
//!
//! 名字的唯一性只在 [`DeviceRegistry::create`] 中检查，并且检查先于分配；
//! 检查、分配、总线注册与插入在同一把写锁之内完成，
//! 总线注册失败时新设备随之释放，不会留下条目。

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use derive_more::Display;
use spin::RwLock;

use crate::bus::{BusError, DeviceBus};
use crate::device::{Mode, RamDisk};
use crate::store::AllocError;

pub struct DeviceRegistry {
    devices: RwLock<BTreeMap<String, Arc<RamDisk>>>,
    bus: Arc<dyn DeviceBus>,
}

/// 设备的管理态快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub capacity: u64,
    pub mode: Mode,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum CreateError {
    #[display(fmt = "capacity must be a positive number of sectors")]
    InvalidCapacity,
    #[display(fmt = "device {} already exists", _0)]
    NameAlreadyExists(String),
    #[display(fmt = "unable to allocate device storage: {}", _0)]
    OutOfMemory(AllocError),
    #[display(fmt = "device registration on bus failed: {}", _0)]
    RegistrationFailure(BusError),
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SetModeError {
    #[display(fmt = "device {} not found", _0)]
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DestroyError {
    #[display(fmt = "device {} not found", _0)]
    NotFound(String),
}

impl DeviceRegistry {
    pub fn new(bus: Arc<dyn DeviceBus>) -> Self {
        Self {
            devices: RwLock::new(BTreeMap::new()),
            bus,
        }
    }

    pub fn create(&self, name: &str, capacity: u64) -> Result<Arc<RamDisk>, CreateError> {
        if capacity == 0 {
            return Err(CreateError::InvalidCapacity);
        }

        let mut devices = self.devices.write();
        if devices.contains_key(name) {
            return Err(CreateError::NameAlreadyExists(name.into()));
        }

        let dev = RamDisk::new(name, capacity).map_err(|err| {
            log::warn!("(device) failed to allocate device IO buffer for {name}");
            CreateError::OutOfMemory(err)
        })?;

        if let Err(err) = self.bus.register(&dev) {
            log::warn!("(device) {name} registration on bus failed: {err}");
            return Err(CreateError::RegistrationFailure(err));
        }

        let dev = Arc::new(dev);
        devices.insert(name.into(), Arc::clone(&dev));
        log::info!("(device) {name} created, {capacity} sectors");
        Ok(dev)
    }

    pub fn find(&self, name: &str) -> Option<Arc<RamDisk>> {
        self.devices.read().get(name).cloned()
    }

    pub fn set_mode(&self, name: &str, mode: Mode) -> Result<(), SetModeError> {
        let devices = self.devices.read();
        let dev = devices
            .get(name)
            .ok_or_else(|| SetModeError::NotFound(name.into()))?;
        dev.set_mode(mode);
        log::info!("(device) {name} is now {mode}");
        Ok(())
    }

    pub fn destroy(&self, name: &str) -> Result<(), DestroyError> {
        let dev = {
            let mut devices = self.devices.write();
            let dev = devices
                .remove(name)
                .ok_or_else(|| DestroyError::NotFound(name.into()))?;
            // 移除条目与总线注销在同一把写锁之内
            self.bus.unregister(&dev);
            dev
        };
        Self::release(&dev);
        Ok(())
    }

    pub fn destroy_all(&self) {
        let devices = {
            let mut devices = self.devices.write();
            let taken = core::mem::take(&mut *devices);
            for dev in taken.values() {
                self.bus.unregister(dev);
            }
            taken
        };
        for dev in devices.values() {
            Self::release(dev);
        }
    }

    /// 按名字排序的设备快照
    pub fn list(&self) -> Vec<DeviceInfo> {
        self.devices
            .read()
            .values()
            .map(|dev| DeviceInfo {
                name: dev.name().into(),
                capacity: dev.capacity_sectors(),
                mode: dev.mode(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }

    /// 等待在途传输结束后释放存储；调用时不持有映射表的锁
    fn release(dev: &RamDisk) {
        dev.release_store();
        log::info!("(device) {} removed", dev.name());
    }
}

impl core::fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("devices", &self.devices)
            .field("bus", &"dyn DeviceBus")
            .finish()
    }
}
