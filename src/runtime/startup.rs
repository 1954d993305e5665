use crate::catalog::Catalog;
use crate::config::Settings;
use crate::error::Result;
use crate::sync::{Scheduler, SyncEngine};

/// Long-lived services shared by the scheduler and request handlers.
pub struct Services {
    pub catalog: Catalog,
    pub scheduler: Scheduler,
}

pub fn open_services(settings: &Settings) -> Result<Services> {
    let catalog = Catalog::open(&settings.catalog)?;
    let engine = SyncEngine::new(catalog.clone(), settings.library.clone());
    Ok(Services {
        catalog,
        scheduler: Scheduler::new(engine),
    })
}
