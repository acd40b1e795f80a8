//! Scripts for deploying contracts and tracking their deployments.

pub mod artifacts;
pub mod chain;
pub mod cli;
pub mod commands;
pub mod constants;
pub mod errors;
mod solidity;
pub mod utils;
