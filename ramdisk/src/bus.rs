//! # 总线层
//!
//! 设备被创建后还要在宿主上登记，才能被外界看到；销毁前先注销。
//! [`DeviceBus`] 就是对这一步的抽象，注册表只通过它与宿主打交道。
//!
//! [`SysBus`] 是进程内的实现：驱动先挂上总线，设备才能注册；
//! 每次注册都会发出一条热插拔事件。

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use derive_more::Display;
use spin::Mutex;

use crate::device::RamDisk;

pub trait DeviceBus: Send + Sync {
    fn register(&self, dev: &RamDisk) -> Result<(), BusError>;
    fn unregister(&self, dev: &RamDisk);
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum BusError {
    #[display(fmt = "no driver is bound to bus {}", _0)]
    NoDriver(String),
    #[display(fmt = "driver {} is already registered", _0)]
    DriverExists(String),
    #[display(fmt = "device {} is already registered on the bus", _0)]
    DeviceExists(String),
}

#[derive(Debug)]
pub struct SysBus {
    name: String,
    inner: Mutex<SysBusInner>,
}

#[derive(Debug, Default)]
struct SysBusInner {
    driver: Option<String>,
    devices: Vec<String>,
    /// 尚未被取走的热插拔事件
    uevents: Vec<String>,
}

impl SysBus {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            inner: Mutex::default(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn register_driver(&self, driver: &str) -> Result<(), BusError> {
        let mut inner = self.inner.lock();
        if let Some(bound) = &inner.driver {
            return Err(BusError::DriverExists(bound.clone()));
        }
        inner.driver = Some(driver.into());
        log::info!("(bus) registered driver {driver} on bus {}", self.name);
        Ok(())
    }

    pub fn unregister_driver(&self) {
        if let Some(driver) = self.inner.lock().driver.take() {
            log::info!("(bus) unregistered driver {driver} from bus {}", self.name);
        }
    }

    /// 设备名以驱动名开头即视为匹配
    pub fn match_driver(&self, device: &str) -> bool {
        self.inner
            .lock()
            .driver
            .as_deref()
            .is_some_and(|driver| device.starts_with(driver))
    }

    /// 当前已注册设备的名字，按注册顺序
    pub fn registered(&self) -> Vec<String> {
        self.inner.lock().devices.clone()
    }

    /// 取走积压的热插拔事件
    pub fn take_uevents(&self) -> Vec<String> {
        core::mem::take(&mut self.inner.lock().uevents)
    }
}

impl DeviceBus for SysBus {
    fn register(&self, dev: &RamDisk) -> Result<(), BusError> {
        let mut inner = self.inner.lock();
        if inner.driver.is_none() {
            return Err(BusError::NoDriver(self.name.clone()));
        }
        if inner.devices.iter().any(|name| name == dev.name()) {
            return Err(BusError::DeviceExists(dev.name().into()));
        }
        inner.devices.push(dev.name().into());

        let mut env = "DEV_NAME=".to_string();
        env.push_str(dev.name());
        log::debug!("(bus) {}: uevent {env}", self.name);
        inner.uevents.push(env);
        Ok(())
    }

    fn unregister(&self, dev: &RamDisk) {
        let mut inner = self.inner.lock();
        if let Some(index) = inner.devices.iter().position(|name| name == dev.name()) {
            inner.devices.remove(index);
            log::info!("(bus) {} unregistered", dev.name());
        }
    }
}
