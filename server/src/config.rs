// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Server settings. Each flag falls back to an environment variable, then to
/// its default.
#[derive(Parser, Debug, Clone)]
#[command(name = "study-planner", version, about = "Study task planner server")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "PLANNER_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: SocketAddr,

    /// Directory holding the persisted task list.
    #[arg(long, env = "PLANNER_DATA_DIR", default_value = "database")]
    pub data_dir: PathBuf,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, env = "PLANNER_LOG", default_value = "info")]
    pub log_level: String,
}
