// SPDX-License-Identifier: MIT

pub mod config;
pub mod report;
pub mod request;
pub mod server;
