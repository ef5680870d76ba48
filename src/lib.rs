pub mod cli;
pub mod config;
pub mod constants;
pub mod hid;
pub mod interpreter;
pub mod replay;
