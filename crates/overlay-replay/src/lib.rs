#![deny(warnings)]
pub mod config;
pub mod events;
pub mod logging;
pub mod replay;
