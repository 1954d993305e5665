//! Process bootstrap: settings, logging, catalog, then either one pass or
//! the periodic scheduler until Ctrl-C.

use std::env;
use std::io;
use std::sync::mpsc;
use std::time::Duration;

use tracing::info;

use crate::config::ScanSettings;
use crate::error::{Error, Result};
use crate::sync::TriggerOutcome;

mod settings;
mod startup;

pub use startup::{Services, open_services};

const USAGE: &str = "usage: towerofsong [serve|scan]";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    /// Keep the catalog in sync until interrupted.
    Serve,
    /// Run a single synchronization pass and exit.
    Scan,
}

impl Command {
    pub fn parse(arg: Option<&str>) -> Result<Self> {
        match arg {
            None | Some("serve") => Ok(Self::Serve),
            Some("scan") => Ok(Self::Scan),
            Some(other) => Err(Error::Usage(format!("unknown command '{other}'\n{USAGE}"))),
        }
    }
}

pub fn run() -> Result<()> {
    let command = Command::parse(env::args().nth(1).as_deref())?;

    let settings = settings::load_settings()?;
    crate::logging::init(&settings.logging);
    settings::report(&settings);

    let services = open_services(&settings)?;
    match command {
        Command::Scan => scan_once(&services),
        Command::Serve => serve(services, &settings.scan),
    }
}

fn scan_once(services: &Services) -> Result<()> {
    if let TriggerOutcome::Completed(report) = services.scheduler.trigger() {
        info!(
            added = report.added,
            removed = report.removed,
            total = services.catalog.count()?,
            "scan complete"
        );
    }
    Ok(())
}

fn serve(services: Services, scan: &ScanSettings) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })
    .map_err(io::Error::other)?;

    let handle = services
        .scheduler
        .start(Duration::from_secs(scan.interval_secs), scan.on_startup)?;
    info!(tracks = services.catalog.count()?, "catalog ready");

    let _ = shutdown_rx.recv();
    info!("shutdown requested, stopping library sync");
    handle.stop();
    Ok(())
}
