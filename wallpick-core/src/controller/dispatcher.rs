//! src/controller/dispatcher.rs
//! ============================================================================
//! # Selection: pick an item from the results and hand it to the renderer

use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::{
    controller::actions::SelectionTrigger,
    error::AppError,
    external::{ActiveItemStore, Externals, ProcessController},
    model::{query::Mode, session::Session},
};

/// Pick one name from `results`.
///
/// An out-of-range index falls back to a random pick with a warning.
pub fn resolve(trigger: SelectionTrigger, results: &[String]) -> Result<String, AppError> {
    let mut rng = rand::thread_rng();
    let picked = match trigger {
        SelectionTrigger::Random => results.choose(&mut rng),
        SelectionTrigger::Indexed(i) => match results.get(i) {
            Some(name) => Some(name),
            None if !results.is_empty() => {
                warn!(
                    "Index {} is out of bounds of {} results. Selecting a random one.",
                    i,
                    results.len()
                );
                results.choose(&mut rng)
            }
            None => None,
        },
    };
    picked.cloned().ok_or(AppError::NoResults)
}

/// Resolve against the session. With nothing typed in All mode, a random
/// trigger draws from the whole catalog.
pub fn resolve_in_session(trigger: SelectionTrigger, session: &Session) -> Result<String, AppError> {
    let catalog_wide = trigger == SelectionTrigger::Random
        && session.mode() == Mode::All
        && session.query().is_empty();
    if catalog_wide {
        return resolve(trigger, session.catalog.names());
    }
    resolve(trigger, session.results())
}

/// Stop the renderer, record the new name, start it again. Every step is
/// best effort: failures are returned for reporting, never abort the rest.
pub struct Refresher<'a> {
    store: &'a dyn ActiveItemStore,
    process: &'a dyn ProcessController,
}

impl<'a> Refresher<'a> {
    pub fn new(externals: &'a Externals) -> Self {
        Self {
            store: externals.store.as_ref(),
            process: externals.process.as_ref(),
        }
    }

    pub fn refresh(&self, name: &str) -> Vec<AppError> {
        info!("Setting wallpaper to '{}'", name);
        let mut failures = Vec::new();

        if let Err(e) = self.process.stop() {
            warn!("Stopping the renderer failed: {}", e);
            failures.push(e);
        }
        if let Err(e) = self.store.set_active_name(name) {
            warn!("Updating the properties file failed: {}", e);
            failures.push(e);
        }
        if let Err(e) = self.process.start() {
            warn!("Starting the renderer failed: {}", e);
            failures.push(e);
        }
        failures
    }
}

/// Full selection: resolve, refresh, then clear the query.
///
/// On `NoResults` nothing is touched. Refresh failures are reported but the
/// selection still counts.
pub fn select(
    trigger: SelectionTrigger,
    session: &mut Session,
    externals: &Externals,
) -> Result<String, AppError> {
    let name = resolve_in_session(trigger, session)?;

    let failures = Refresher::new(externals).refresh(&name);
    session.set_active_name(name.clone());
    session.set_query("");

    match failures.first() {
        None => session.show_success(format!("Wallpaper set to '{name}'")),
        Some(first) => session.show_warning(format!("Set '{name}' with problems: {first}")),
    }
    Ok(name)
}
