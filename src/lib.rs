//! Mock EC2 instance metadata service that hands out credentials for one of
//! several configured IAM roles, switchable at runtime through a small
//! control API.

pub mod aws;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod server;
pub mod state;
