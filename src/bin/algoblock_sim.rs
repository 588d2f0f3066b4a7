//! Drive a blocking session from the terminal.
//!
//! Each stdin line is either an activity (`scroll`, `mousemove`, `click`,
//! `keydown`, `touchstart`) or a query (`time`, `count`). The session ends at
//! EOF.

use std::path::PathBuf;

use algoblock::{
    activity::ActivityKind,
    clock::TokioClock,
    driver::SessionDriver,
    host::is_target_host,
    overlay::{Band, ElementProbe, OverlayStrategy, OverlaySurface, OverlayView, Rect, Viewport},
    settings::SettingsStore,
    timer::{BlockController, BlockQuery},
    utils::logging,
};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "algoblock-sim", version)]
struct Args {
    /// Hostname of the simulated page.
    #[arg(long)]
    host: String,

    /// JSON settings file; created with the defaults when missing.
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = StrategyArg::Cutout)]
    strategy: StrategyArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Full,
    Cutout,
}

impl From<StrategyArg> for OverlayStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Full => OverlayStrategy::FullBlock,
            StrategyArg::Cutout => OverlayStrategy::Cutout,
        }
    }
}

/// A headless page: fixed viewport, no search box, every call logged.
struct LogSurface {
    viewport: Viewport,
}

impl ElementProbe for LogSurface {
    type Element = ();

    fn query_all(&self, _selector: &str) -> Vec<()> {
        Vec::new()
    }

    fn bounding_rect(&self, _element: &()) -> Rect {
        Rect::new(0.0, 0.0, 0.0, 0.0)
    }
}

impl OverlaySurface for LogSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn mount(&mut self, view: &OverlayView) {
        info!("{}", view.message.title());
        info!(
            "{} {} ({:?}, {} band(s))",
            view.message.tip_text(),
            view.message.note_text(),
            view.strategy,
            view.bands.len()
        );
    }

    fn update_countdown(&mut self, remaining_secs: u64) {
        info!("countdown: {remaining_secs}");
    }

    fn update_bands(&mut self, bands: &[Band]) {
        info!("bands moved: {bands:?}");
    }

    fn attach_relayout_listeners(&mut self) {}

    fn detach_relayout_listeners(&mut self) {}

    fn unmount(&mut self) {
        info!("overlay removed");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_native();
    let args = Args::parse();

    if !is_target_host(&args.host) {
        info!("{} is not a target host; nothing to do", args.host);
        return Ok(());
    }

    let settings = match args.settings {
        Some(path) => {
            let exists = path.exists();
            let mut store = SettingsStore::new(path)?;
            if !exists {
                store.update(store.settings())?;
            }
            store.settings()
        }
        None => Default::default(),
    };

    let surface = LogSurface {
        viewport: Viewport::new(1280.0, 720.0),
    };
    let controller = BlockController::new(settings, args.strategy.into(), TokioClock::new(), surface);
    let mut driver = SessionDriver::new(controller);
    driver.start().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        match command {
            "" => continue,
            "time" => {
                let reply = driver.query(BlockQuery::GetAddictionTime).await;
                println!("{}", serde_json::to_string(&reply)?);
            }
            "count" => {
                let reply = driver.query(BlockQuery::GetBlockCount).await;
                println!("{}", serde_json::to_string(&reply)?);
            }
            other => match other.parse::<ActivityKind>() {
                Ok(kind) => driver.notify_activity(kind)?,
                Err(err) => warn!("{err}"),
            },
        }
    }

    let snapshot = driver.snapshot().await;
    driver.stop().await?;
    info!(
        "session {} ended after {}s with {} block(s)",
        snapshot.session.id, snapshot.session.elapsed_secs, snapshot.session.block_count
    );
    Ok(())
}
