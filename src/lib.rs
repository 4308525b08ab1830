pub mod config;
pub mod ipc;
pub mod logging;
pub mod os;
pub mod paths;
pub mod service;

pub use ltth_updater_lib as updater;
