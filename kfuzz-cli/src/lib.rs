mod config;
mod error;
mod invoke;

pub use self::{
    config::{BridgeConf, CONF_ENV, DEFAULT_CONTROL_ROOT},
    error::{AppError, ErrorKind},
    invoke::ControlFile,
};
