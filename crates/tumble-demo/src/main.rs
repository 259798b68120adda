use anyhow::Result;
use clap::Parser;

use tumble_engine::device::GpuInit;
use tumble_engine::logging::{init_logging, LoggingConfig};
use tumble_engine::render::SdfAtlas;
use tumble_engine::window::{Runtime, RuntimeConfig};

use tumble_demo::config::{Cli, DemoConfig};
use tumble_demo::demos::demo_letter;
use tumble_demo::harness::{demo_title, time_trial, Harness};

/// Updates per scene in `--trial`.
const TRIAL_STEPS: u32 = 1000;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = DemoConfig::from_cli(Cli::parse());

    if config.trial {
        for (i, entry) in config.demos.iter().enumerate() {
            let elapsed = time_trial(entry, TRIAL_STEPS);
            let ms = elapsed.as_secs_f64() * 1000.0;
            println!("Time({}) = {ms:8.2} ms ({})", demo_letter(i), entry.name);
        }
        return Ok(());
    }

    // Text is optional; the scenes still draw without it.
    let font = match SdfAtlas::find_system_font(config.font.as_deref()) {
        Ok(atlas) => Some(atlas),
        Err(err) => {
            log::warn!("HUD text disabled: {err:#}");
            None
        }
    };

    let title = demo_title(config.start, &config.demos[config.start]);
    let harness = Harness::new(config.demos, config.start, font);

    Runtime::run(
        RuntimeConfig {
            title,
            ..RuntimeConfig::default()
        },
        GpuInit::default(),
        harness,
    )
}
