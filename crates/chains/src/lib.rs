//! Node launchers for bridge chains.
//!
//! This crate provides one launcher per supported chain type:
//! - ICON (node start followed by consensus decentralization)
//! - Ethereum
//! - Hardhat
//!
//! Launchers are registered in a [`LauncherTable`] built once at startup.

pub mod evm;
pub mod icon;
pub mod launcher;

pub use evm::EvmLauncher;
pub use icon::{DecentralizeParams, IconLauncher, IconNodeConfig};
pub use launcher::{LaunchContext, LaunchError, LauncherTable, NodeLauncher, NodeWorkflow};
