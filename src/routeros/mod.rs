// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! `MikroTik` `RouterOS` fact driver
//!
//! Connects to routers via the `RouterOS` API, authenticates, and reports
//! interface counters and BGP sessions in the shared fact shapes.

mod cleanup;
mod client;
mod connection;
mod pool;

pub use cleanup::start_pool_cleanup_task;
pub use client::{PLATFORM, RouterOsClient};
pub use connection::{encode_length, encode_word, read_length};
pub use pool::ConnectionPool;
