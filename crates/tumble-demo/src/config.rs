use std::path::PathBuf;

use clap::Parser;

use crate::demos::{bench_list, demo_list, DemoEntry};

/// Command line of the demo binary.
#[derive(Debug, Parser)]
#[command(name = "tumble-demo", about = "Interactive rigid-body demos")]
pub struct Cli {
    /// Use the benchmark scenes instead of the interactive demos.
    #[arg(long)]
    pub bench: bool,

    /// Time every scene headless and exit.
    #[arg(long)]
    pub trial: bool,

    /// TrueType font for the HUD. Defaults to a system monospace font.
    #[arg(long, value_name = "PATH")]
    pub font: Option<PathBuf>,

    /// Letter of the scene to start with.
    #[arg(long, value_name = "LETTER")]
    pub demo: Option<char>,
}

/// Settled run configuration.
#[derive(Debug)]
pub struct DemoConfig {
    pub demos: Vec<DemoEntry>,
    pub start: usize,
    pub trial: bool,
    pub font: Option<PathBuf>,
}

impl DemoConfig {
    /// Resolves the scene table and start index. An unknown letter falls
    /// back to the first scene.
    pub fn from_cli(cli: Cli) -> Self {
        let demos = if cli.bench { bench_list() } else { demo_list() };

        let start = match cli.demo {
            Some(letter) => {
                let index = (letter.to_ascii_lowercase() as u32).wrapping_sub('a' as u32) as usize;
                if index < demos.len() {
                    index
                } else {
                    log::warn!("no demo bound to '{letter}', starting with 'a'");
                    0
                }
            }
            None => 0,
        };

        Self {
            demos,
            start,
            trial: cli.trial,
            font: cli.font,
        }
    }
}
