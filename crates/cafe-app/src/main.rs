//! cafe-swkbd demo driver.
//!
//! Runs the software keyboard scenarios and a cursor compositor
//! walkthrough against the simulated platform, logging every step.
//! An optional TOML configuration path may be given as the first argument
//! or through `CAFE_CONFIG`.

mod cursor_demo;
mod scenarios;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use cafe_types::config::CafeConfig;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CAFE_CONFIG").ok())
        .map(PathBuf::from);
    let config = match &config_path {
        Some(path) => CafeConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CafeConfig::default(),
    };
    log::info!(
        "Starting cafe-swkbd demo (swkbd enabled: {}, locale: {:?})",
        config.swkbd.enabled,
        config.swkbd.locale,
    );

    let mut failed = 0;
    for scenario in scenarios::SCENARIOS {
        match (scenario.run)(&config) {
            Ok(()) => log::info!("{}: ok", scenario.name),
            Err(e) => {
                log::error!("{}: {e:#}", scenario.name);
                failed += 1;
            },
        }
    }

    match cursor_demo::run(&config.cursor) {
        Ok(()) => log::info!("cursor: ok"),
        Err(e) => {
            log::error!("cursor: {e:#}");
            failed += 1;
        },
    }

    if failed > 0 {
        bail!("{failed} scenario(s) failed");
    }
    log::info!("All scenarios passed");
    Ok(())
}
