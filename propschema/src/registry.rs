use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::errors::SchemaError;
use crate::prop::FieldDeclarer;
use crate::types::{ClassId, Document, FieldDeclaration, FieldDetails, IndexSpec, TypeOptions, TypeTag};

#[derive(Debug, Clone)]
struct ClassEntry {
    name: String,
    base: Option<ClassId>,
}

#[derive(Debug, Default)]
struct RegistryState {
    classes: HashMap<ClassId, ClassEntry>,
    fields: HashMap<ClassId, Vec<FieldDeclaration>>,
    documents: HashMap<TypeId, ClassId>,
}

impl RegistryState {
    fn field_mut(&mut self, class: ClassId, field: &str) -> &mut FieldDeclaration {
        let fields = self.fields.entry(class).or_default();
        let position = match fields.iter().position(|declaration| declaration.name == field) {
            Some(position) => position,
            None => {
                fields.push(FieldDeclaration::new(field));
                fields.len() - 1
            }
        };
        &mut fields[position]
    }
}

/// Class table plus the per-class, per-field declarations.
///
/// Setters merge into the existing declaration and never validate: a field may be completed
/// over several calls, and malformed data only surfaces when a schema or index list is built.
#[derive(Debug)]
pub struct Registry {
    state: RwLock<RegistryState>,
}

static REGISTRY: OnceLock<Arc<Registry>> = OnceLock::new();

/// Process-wide registry shared by [`crate::compiler`].
pub fn registry() -> &'static Arc<Registry> {
    REGISTRY.get_or_init(|| Arc::new(Registry::new()))
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Empty registry holding only the built-in classes.
    pub fn new() -> Self {
        let classes = ClassId::BUILTINS
            .iter()
            .map(|(id, name)| {
                (
                    *id,
                    ClassEntry {
                        name: (*name).to_string(),
                        base: None,
                    },
                )
            })
            .collect();
        Self {
            state: RwLock::new(RegistryState {
                classes,
                ..RegistryState::default()
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Define a new class. `base` must already be known to this registry.
    pub fn define_class(&self, name: impl Into<String>, base: Option<ClassId>) -> Result<ClassId, SchemaError> {
        let name = name.into();
        let mut state = self.write();
        if let Some(base) = base
            && !state.classes.contains_key(&base)
        {
            return Err(SchemaError::invalid_class(format!("unknown base class {base} for {name}")));
        }
        let id = ClassId::allocate();
        log::trace!("defined class {name} as {id}");
        state.classes.insert(id, ClassEntry { name, base });
        Ok(id)
    }

    /// Class registered for the Rust type `T`, declaring it on first use.
    ///
    /// The id is recorded before the fields are declared, so a type may refer to itself
    /// (which the builders then reject as a circular reference).
    pub fn class_of<T: Document>(&self) -> ClassId {
        let type_id = TypeId::of::<T>();
        if let Some(id) = self.read().documents.get(&type_id) {
            return *id;
        }

        let base = T::declare_base(self);
        let id = {
            let mut state = self.write();
            if let Some(id) = state.documents.get(&type_id) {
                return *id;
            }
            let id = ClassId::allocate();
            state.documents.insert(type_id, id);
            state.classes.insert(
                id,
                ClassEntry {
                    name: T::NAME.to_string(),
                    base,
                },
            );
            id
        };

        log::debug!("declaring fields of {} as {id}", T::NAME);
        let mut declarer = FieldDeclarer::new(self, id);
        T::declare_fields(&mut declarer);
        id
    }

    pub fn set_field_type(&self, class: ClassId, field: &str, tag: TypeTag, options: TypeOptions) {
        let mut state = self.write();
        let declaration = state.field_mut(class, field);
        declaration.type_tag = Some(tag);
        declaration.type_options = options;
    }

    pub fn set_field_details(&self, class: ClassId, field: &str, details: FieldDetails) {
        self.write().field_mut(class, field).details = Some(details);
    }

    pub fn set_field_index(&self, class: ClassId, field: &str, index: IndexSpec) {
        self.write().field_mut(class, field).index = Some(index);
    }

    /// Own declarations of `class` in first-registration order, `None` if it has none.
    pub fn field_declarations(&self, class: ClassId) -> Option<Vec<FieldDeclaration>> {
        self.read().fields.get(&class).cloned()
    }

    pub fn contains(&self, class: ClassId) -> bool {
        self.read().classes.contains_key(&class)
    }

    pub fn class_name(&self, class: ClassId) -> Option<String> {
        self.read().classes.get(&class).map(|entry| entry.name.clone())
    }

    pub fn base_of(&self, class: ClassId) -> Option<ClassId> {
        self.read().classes.get(&class).and_then(|entry| entry.base)
    }

    /// `class` followed by each of its ancestors, most-derived first.
    pub fn lineage(&self, class: ClassId) -> Result<Vec<ClassId>, SchemaError> {
        let state = self.read();
        let mut lineage = Vec::new();
        let mut current = Some(class);
        while let Some(id) = current {
            let entry = state
                .classes
                .get(&id)
                .ok_or_else(|| SchemaError::invalid_class(format!("class {id} is not registered")))?;
            lineage.push(id);
            current = entry.base;
        }
        Ok(lineage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldDetails, IndexSpec, StringOptions};

    #[test]
    fn setters_merge_sub_records() {
        let registry = Registry::new();
        let class = registry.define_class("User", None).expect("define");

        registry.set_field_details(class, "name", FieldDetails::optional());
        registry.set_field_type(class, "name", TypeTag::String, TypeOptions::String(StringOptions::default()));
        registry.set_field_index(class, "email", IndexSpec::new().unique());
        registry.set_field_details(class, "name", FieldDetails::nullable());

        let fields = registry.field_declarations(class).expect("declarations");
        let names: Vec<_> = fields.iter().map(|field| field.name.as_str()).collect();
        assert_eq!(names, vec!["name", "email"]);
        assert_eq!(fields[0].type_tag, Some(TypeTag::String));
        assert_eq!(fields[0].details, Some(FieldDetails::nullable()));
        assert_eq!(fields[1].type_tag, None);
        assert!(fields[1].index.as_ref().is_some_and(|index| index.unique));
    }

    #[test]
    fn unknown_base_is_rejected() {
        let registry = Registry::new();
        let other = Registry::new().define_class("Elsewhere", None).expect("define");
        let err = registry.define_class("Child", Some(other)).expect_err("foreign base");
        assert!(matches!(err, SchemaError::InvalidClassArgument { .. }));
    }

    #[test]
    fn lineage_walks_to_the_root() {
        let registry = Registry::new();
        let root = registry.define_class("Root", None).expect("define");
        let middle = registry.define_class("Middle", Some(root)).expect("define");
        let leaf = registry.define_class("Leaf", Some(middle)).expect("define");

        assert_eq!(registry.lineage(leaf).expect("lineage"), vec![leaf, middle, root]);
        assert_eq!(registry.base_of(leaf), Some(middle));
        assert_eq!(registry.class_name(middle).as_deref(), Some("Middle"));
    }

    #[test]
    fn same_name_classes_are_distinct() {
        let registry = Registry::new();
        let a = registry.define_class("Twin", None).expect("define");
        let b = registry.define_class("Twin", None).expect("define");
        assert_ne!(a, b);
        registry.set_field_type(a, "x", TypeTag::Bool, TypeOptions::None);
        assert!(registry.field_declarations(b).is_none());
    }

    #[test]
    fn builtins_are_known() {
        let registry = Registry::new();
        assert!(registry.contains(ClassId::OBJECT_ID));
        assert_eq!(registry.class_name(ClassId::DATE).as_deref(), Some("Date"));
    }
}
