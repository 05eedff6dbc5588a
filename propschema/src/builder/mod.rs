//! Schema and index compilation with per-class memoization.

mod index;
mod schema;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::errors::SchemaError;
use crate::registry::{Registry, registry};
use crate::schema::SchemaNode;
use crate::types::{ClassId, Document};

pub use index::IndexDescription;

type Cache<T> = RwLock<HashMap<ClassId, T>>;

/// Builds validation schemas and index lists from the declarations of one [`Registry`].
///
/// Results are cached for the life of the compiler and handed out as shared `Arc`s, so
/// building the same class twice returns the same allocation. Nothing is cached for a
/// build that failed.
#[derive(Debug)]
pub struct Compiler {
    registry: Arc<Registry>,
    merged: Cache<Arc<SchemaNode>>,
    own: Cache<Arc<SchemaNode>>,
    indexes: Cache<Arc<[IndexDescription]>>,
}

static COMPILER: OnceLock<Compiler> = OnceLock::new();

/// Process-wide compiler over the process-wide [`registry`].
pub fn compiler() -> &'static Compiler {
    COMPILER.get_or_init(|| Compiler::new(Arc::clone(registry())))
}

impl Compiler {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            merged: RwLock::default(),
            own: RwLock::default(),
            indexes: RwLock::default(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Class of `T` in this compiler's registry.
    pub fn class_of<T: Document>(&self) -> ClassId {
        self.registry.class_of::<T>()
    }

    fn ensure_known(&self, class: ClassId) -> Result<(), SchemaError> {
        if self.registry.contains(class) {
            Ok(())
        } else {
            Err(SchemaError::invalid_class(format!("class {class} is not registered")))
        }
    }

    fn display_name(&self, class: ClassId) -> String {
        self.registry.class_name(class).unwrap_or_else(|| class.to_string())
    }
}

fn cached<T: Clone>(cache: &Cache<T>, class: ClassId) -> Option<T> {
    cache
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&class)
        .cloned()
}

/// Insert unless another thread got there first; either way return the stored value.
fn store<T: Clone>(cache: &Cache<T>, class: ClassId, value: T) -> T {
    cache
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(class)
        .or_insert(value)
        .clone()
}
