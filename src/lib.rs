pub mod bus;
pub mod cli;
pub mod config;
pub mod constants;
pub mod dbus;
pub mod usb;
