pub mod check;
pub mod indexes;
pub mod list;
pub mod schema;

use anyhow::Result;
use propschema::{ModelRegistration, get_model_by_collection, get_model_by_name, registered_models};

/// Look a model up by class name, then by collection.
pub fn resolve_model(name: &str) -> Result<&'static ModelRegistration> {
    if let Some(registration) = get_model_by_name(name).or_else(|| get_model_by_collection(name)) {
        return Ok(registration);
    }
    let mut known: Vec<&str> = registered_models().map(|registration| registration.name).collect();
    known.sort_unstable();
    anyhow::bail!("Unknown model '{name}'. Registered models: {}", known.join(", "))
}
