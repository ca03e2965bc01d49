//! # 服务层
//!
//! [`ServiceState`] 在启动时构造、在关闭时拆除，持有总线、注册表与请求闸门。
//!
//! 启动顺序：驱动挂上总线，然后按创建方式二选一：
//! 自动模式创建默认设备；用户模式开放管理通道，设备全部由命令创建。
//! 任一步失败，已取得的资源按相反顺序归还，错误向上传递并阻止服务启动。
//!
//! 关闭时先停止接受新请求并等待在途请求结束，再销毁全部设备，最后卸下驱动。

use alloc::string::String;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use block_dev::BlockDevice;
use derive_more::Display;
use spin::RwLock;

use crate::bus::{BusError, SysBus};
use crate::command::CommandInterpreter;
use crate::config::{BUS_NAME, DEFAULT_DEVICE_CAPACITY, DEFAULT_DEVICE_NAME, DRIVER_NAME};
use crate::registry::{CreateError, DeviceRegistry};
use crate::request::{self, Completion, Request};

/// 设备的创建方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreationMode {
    /// 启动时自动创建一个默认设备
    #[default]
    Auto,
    /// 只接受管理命令创建设备
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bus_name: String,
    pub driver_name: String,
    pub default_name: String,
    /// 默认设备的扇区数
    pub default_capacity: u64,
    pub creation: CreationMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bus_name: BUS_NAME.into(),
            driver_name: DRIVER_NAME.into(),
            default_name: DEFAULT_DEVICE_NAME.into(),
            default_capacity: DEFAULT_DEVICE_CAPACITY,
            creation: CreationMode::Auto,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum StartError {
    #[display(fmt = "driver registration on bus failed: {}", _0)]
    DriverRegistration(BusError),
    #[display(fmt = "default device init failed: {}", _0)]
    DefaultDevice(CreateError),
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SubmitError {
    #[display(fmt = "service is shutting down")]
    ShuttingDown,
    #[display(fmt = "no such device: {}", _0)]
    NoDevice(String),
}

#[derive(Debug)]
pub struct ServiceState {
    config: Config,
    bus: Arc<SysBus>,
    registry: Arc<DeviceRegistry>,
    accepting: AtomicBool,
    /// 在途请求持有读锁，关闭时取写锁以等待它们结束
    in_flight: RwLock<()>,
}

impl ServiceState {
    /// 在 `bus` 上启动服务；`bus` 的名字通常取自 `config.bus_name`
    pub fn start(config: Config, bus: Arc<SysBus>) -> Result<Self, StartError> {
        log::info!("(service) starting on bus {}...", bus.name());
        bus.register_driver(&config.driver_name)
            .map_err(StartError::DriverRegistration)?;

        let registry = Arc::new(DeviceRegistry::new(bus.clone()));

        match config.creation {
            CreationMode::User => {
                log::info!("(service) user device creation mode entered");
            }
            CreationMode::Auto => {
                log::info!("(service) auto device creation mode entered");
                if let Err(err) = registry.create(&config.default_name, config.default_capacity) {
                    bus.unregister_driver();
                    return Err(StartError::DefaultDevice(err));
                }
                log::info!("(service) default device {} created", config.default_name);
            }
        }

        log::info!("(service) initialized");
        Ok(Self {
            config,
            bus,
            registry,
            accepting: AtomicBool::new(true),
            in_flight: RwLock::new(()),
        })
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn bus(&self) -> &SysBus {
        &self.bus
    }

    #[inline]
    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    /// 管理通道只在用户模式下开放
    pub fn interpreter(&self) -> Option<CommandInterpreter> {
        (self.config.creation == CreationMode::User)
            .then(|| CommandInterpreter::new(self.registry.clone()))
    }

    /// 数据通路的入口
    pub fn submit(&self, name: &str, rq: Request<'_>) -> Result<Completion, SubmitError> {
        let _guard = self.in_flight.read();
        if !self.accepting.load(Ordering::Acquire) {
            return Err(SubmitError::ShuttingDown);
        }
        let dev = self
            .registry
            .find(name)
            .ok_or_else(|| SubmitError::NoDevice(name.into()))?;

        dev.open();
        let completion = request::queue_rq(&*dev, rq);
        dev.release();
        Ok(completion)
    }

    pub fn is_running(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    /// 可重复调用
    pub fn shutdown(&self) {
        if !self.accepting.swap(false, Ordering::AcqRel) {
            return;
        }
        log::info!("(service) exiting...");
        drop(self.in_flight.write());
        self.registry.destroy_all();
        self.bus.unregister_driver();
        log::info!("(service) removed");
    }
}

impl Drop for ServiceState {
    fn drop(&mut self) {
        self.shutdown();
    }
}
