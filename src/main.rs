// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod app;
mod config;
mod map;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use log::{error, info, warn};
use mimalloc::MiMalloc;

use crate::app::FlightWatchApp;
use crate::config::AppConfig;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Live flight tracker for the OpenSky Network
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// OpenSky state-vector endpoint
    #[arg(long)]
    api_url: Option<String>,

    /// Seconds between refreshes
    #[arg(long)]
    interval: Option<u64>,

    /// Maximum number of flights kept per snapshot
    #[arg(long)]
    max_flights: Option<usize>,

    /// Watchlist storage file
    #[arg(long)]
    storage: Option<PathBuf>,

    /// Ignore refresh results older than the one already displayed
    #[arg(long)]
    discard_stale: bool,

    /// Print the config file location and exit
    #[arg(long)]
    print_config_path: bool,
}

impl Args {
    fn apply(self, config: &mut AppConfig) {
        if let Some(url) = self.api_url {
            config.api_url = url;
        }
        if let Some(secs) = self.interval {
            config.refresh_interval_secs = secs;
        }
        if let Some(max) = self.max_flights {
            config.max_flights = max;
        }
        if let Some(path) = self.storage {
            config.storage_path = Some(path);
        }
        if self.discard_stale {
            config.discard_stale_refreshes = true;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    run().inspect_err(|e| error!("FlightWatch Desktop failed: {e}"))
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if args.print_config_path {
        println!("{}", AppConfig::get_config_path()?.display());
        return Ok(());
    }

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {e}");
        AppConfig::default()
    });
    args.apply(&mut config);

    info!("Starting FlightWatch Desktop ({})", config.api_url);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("flightwatch-worker")
        .build()?;
    let _guard = runtime.enter();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([800.0, 500.0])
            .with_title("FlightWatch Desktop"),
        ..Default::default()
    };

    eframe::run_native(
        "FlightWatch Desktop",
        options,
        Box::new(move |cc| {
            let app = FlightWatchApp::new(cc, &config)?;
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "flightwatch-desktop",
            "--interval",
            "30",
            "--max-flights",
            "100",
            "--discard-stale",
        ]);
        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert_eq!(config.refresh_interval_secs, 30);
        assert_eq!(config.max_flights, 100);
        assert!(config.discard_stale_refreshes);
        assert_eq!(config.api_url, opensky_client::DEFAULT_API_URL);
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let args = Args::parse_from(["flightwatch-desktop"]);
        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert_eq!(config, AppConfig::default());
    }
}
