//! Static model discovery via the inventory crate.
//!
//! A [`Document`] type becomes discoverable (for example by the `propschema` CLI) when it
//! is submitted with [`register_model!`](crate::register_model):
//!
//! ```ignore
//! use propschema::{Document, FieldDeclarer, register_model};
//!
//! struct Invoice;
//!
//! impl Document for Invoice {
//!     const NAME: &'static str = "Invoice";
//!
//!     fn declare_fields(fields: &mut FieldDeclarer<'_>) {
//!         fields.field("total").decimal(Default::default());
//!     }
//! }
//!
//! register_model!(Invoice, "invoices");
//! ```

use crate::builder::Compiler;
use crate::errors::SchemaError;
use crate::model::Model;
use crate::registry::Registry;
use crate::types::{ClassId, Document};

/// A statically registered model.
pub struct ModelRegistration {
    /// Class name of the document type (e.g., "User")
    pub name: &'static str,
    /// Collection the model is stored in (e.g., "users")
    pub collection: &'static str,
    /// Resolves the document type in a registry
    pub class_fn: fn(&Registry) -> ClassId,
}

inventory::collect!(ModelRegistration);

impl ModelRegistration {
    pub const fn of<T: Document>(collection: &'static str) -> Self {
        Self {
            name: T::NAME,
            collection,
            class_fn: Registry::class_of::<T>,
        }
    }

    pub fn class(&self, registry: &Registry) -> ClassId {
        (self.class_fn)(registry)
    }

    pub fn model(&self, compiler: &Compiler) -> Result<Model, SchemaError> {
        Model::build(compiler, self.class(compiler.registry()), None)
    }
}

/// Submit a [`Document`] type to the static model inventory.
#[macro_export]
macro_rules! register_model {
    ($document:ty, $collection:expr) => {
        $crate::inventory::submit! {
            $crate::ModelRegistration::of::<$document>($collection)
        }
    };
}

/// Every registered model, in no particular order.
pub fn registered_models() -> impl Iterator<Item = &'static ModelRegistration> {
    inventory::iter::<ModelRegistration>()
}

pub fn get_model_by_name(name: &str) -> Option<&'static ModelRegistration> {
    registered_models().find(|registration| registration.name == name)
}

pub fn get_model_by_collection(collection: &str) -> Option<&'static ModelRegistration> {
    registered_models().find(|registration| registration.collection == collection)
}
