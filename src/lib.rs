//! OpenBlu CLI - browse OpenBlu VPN servers and connect to them
//!
//! This crate queries the OpenBlu server directory, picks a server and
//! starts OpenVPN against its downloaded configuration.
//!
//! # Architecture
//!
//! - `api`: OpenBlu REST client (list and get servers)
//! - `select`: Server selection (best by recency, or first)
//! - `connect`: Download configuration, write `<id>.ovpn`, launch OpenVPN
//! - `present`: Table and detail rendering
//! - `credentials`: Access key resolution and storage
//! - `platform`: Supported-OS detection and OpenVPN launchers
//! - `config`: Configuration file handling (TOML)
//! - `cli` / `app`: Argument surface and command dispatch
//!
//! # Usage
//!
//! ```bash
//! openblu --set-access-key
//! openblu -f --filter-by country --filter Italy -o ping -s ascending -l 3
//! openblu -b -c IT
//! ```

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod connect;
pub mod credentials;
pub mod error;
pub mod platform;
pub mod present;
pub mod select;

#[cfg(test)]
mod testing;

pub use app::App;
pub use cli::{Cli, Intent};
pub use config::Config;
pub use error::{exit, AppError};
