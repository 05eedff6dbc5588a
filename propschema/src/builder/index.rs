use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use super::{Compiler, cached, store};
use crate::errors::SchemaError;
use crate::types::{ClassId, IndexDirection, IndexSpec, ObjectOptions, TypeOptions};

/// Single-key index as passed to `createIndexes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDescription {
    /// `<path>_<direction>`
    pub name: String,
    pub key: Map<String, Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unique: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sparse: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_after_seconds: Option<u64>,
}

impl IndexDescription {
    pub fn new(path: &str, direction: IndexDirection) -> Self {
        let mut key = Map::new();
        key.insert(path.to_string(), direction.to_json());
        Self {
            name: format!("{path}_{direction}"),
            key,
            unique: false,
            sparse: false,
            expire_after_seconds: None,
        }
    }

    /// Validate the declared direction (ascending when absent) and copy the options.
    pub fn from_spec(path: &str, spec: &IndexSpec) -> Result<Self, SchemaError> {
        let direction = match &spec.direction {
            Some(direction) => IndexDirection::try_from(direction)?,
            None => IndexDirection::Ascending,
        };
        Ok(Self {
            unique: spec.unique,
            sparse: spec.sparse,
            expire_after_seconds: spec.expire_after_seconds,
            ..Self::new(path, direction)
        })
    }

    /// Dotted path of the indexed field.
    pub fn path(&self) -> Option<&str> {
        self.key.keys().next().map(String::as_str)
    }
}

impl Compiler {
    /// Index descriptions for `class` and its ancestors, most-derived level first.
    ///
    /// With a `prefix`, paths are nested under it and fields marked `exclude` are skipped;
    /// such calls are not cached. Duplicates across levels are kept.
    pub fn build_indexes(&self, class: ClassId, prefix: Option<&str>) -> Result<Arc<[IndexDescription]>, SchemaError> {
        self.build_indexes_in(class, prefix, &mut Vec::new())
    }

    fn build_indexes_in(
        &self,
        class: ClassId,
        prefix: Option<&str>,
        building: &mut Vec<ClassId>,
    ) -> Result<Arc<[IndexDescription]>, SchemaError> {
        if prefix.is_none()
            && let Some(indexes) = cached(&self.indexes, class)
        {
            log::debug!("index cache hit for {}", self.display_name(class));
            return Ok(indexes);
        }
        self.ensure_known(class)?;
        if building.contains(&class) {
            let mut chain: Vec<String> = building.iter().map(|id| self.display_name(*id)).collect();
            chain.push(self.display_name(class));
            return Err(SchemaError::CircularReference {
                path: chain.join(" -> "),
            });
        }

        building.push(class);
        let mut indexes = Vec::new();
        let result = self
            .registry
            .lineage(class)
            .and_then(|lineage| {
                lineage
                    .into_iter()
                    .try_for_each(|level| self.own_indexes(level, prefix, building, &mut indexes))
            });
        building.pop();
        result?;

        log::debug!(
            "built {} index(es) for {}{}",
            indexes.len(),
            self.display_name(class),
            prefix.map(|prefix| format!(" under {prefix}")).unwrap_or_default()
        );
        let indexes: Arc<[IndexDescription]> = indexes.into();
        Ok(match prefix {
            None => store(&self.indexes, class, indexes),
            Some(_) => indexes,
        })
    }

    fn own_indexes(
        &self,
        class: ClassId,
        prefix: Option<&str>,
        building: &mut Vec<ClassId>,
        out: &mut Vec<IndexDescription>,
    ) -> Result<(), SchemaError> {
        for declaration in self.registry.field_declarations(class).unwrap_or_default() {
            let Some(index) = &declaration.index else {
                continue;
            };
            if prefix.is_some() && index.exclude {
                continue;
            }
            let path = match prefix {
                Some(prefix) => format!("{prefix}.{}", declaration.name),
                None => declaration.name.clone(),
            };
            out.push(IndexDescription::from_spec(&path, index)?);

            if !index.passthrough {
                continue;
            }
            if let TypeOptions::Object(ObjectOptions { class: Some(target) }) = declaration.type_options {
                if target == class {
                    return Err(SchemaError::CircularReference {
                        path: format!("{}.{}", self.display_name(class), declaration.name),
                    });
                }
                out.extend(self.build_indexes_in(target, Some(&path), building)?.iter().cloned());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::registry::Registry;
    use crate::types::{DirectionSpec, TypeTag};

    fn setup() -> (Arc<Registry>, Compiler) {
        let registry = Arc::new(Registry::new());
        let compiler = Compiler::new(Arc::clone(&registry));
        (registry, compiler)
    }

    fn names(indexes: &[IndexDescription]) -> Vec<&str> {
        indexes.iter().map(|index| index.name.as_str()).collect()
    }

    #[test]
    fn description_serializes_only_set_options() {
        let plain = IndexDescription::new("email", IndexDirection::Ascending);
        assert_eq!(
            serde_json::to_value(&plain).expect("serializable"),
            json!({ "name": "email_1", "key": { "email": 1 } })
        );

        let spec = IndexSpec::new().direction("2dsphere").sparse().expire_after(60);
        let geo = IndexDescription::from_spec("home.location", &spec).expect("valid direction");
        assert_eq!(
            serde_json::to_value(&geo).expect("serializable"),
            json!({
                "name": "home.location_2dsphere",
                "key": { "home.location": "2dsphere" },
                "sparse": true,
                "expireAfterSeconds": 60,
            })
        );
        assert_eq!(geo.path(), Some("home.location"));
    }

    #[test]
    fn invalid_direction_fails_the_build() {
        let (registry, compiler) = setup();
        let class = registry.define_class("Sorted", None).expect("define");
        registry.set_field_index(class, "rank", IndexSpec::new().direction(DirectionSpec::Number(2)));

        let err = compiler.build_indexes(class, None).expect_err("bad direction");
        assert!(matches!(err, SchemaError::InvalidDirection { ref direction } if direction == "2"));
    }

    #[test]
    fn passthrough_nests_paths_and_honours_exclude() {
        let (registry, compiler) = setup();
        let address = registry.define_class("Address", None).expect("define");
        registry.set_field_index(address, "city", IndexSpec::new());
        registry.set_field_index(address, "street", IndexSpec::new().exclude());

        let user = registry.define_class("User", None).expect("define");
        registry.set_field_type(user, "home", TypeTag::Object, TypeOptions::Object(ObjectOptions {
            class: Some(address),
        }));
        registry.set_field_index(user, "home", IndexSpec::new().direction(-1).passthrough());

        let indexes = compiler.build_indexes(user, None).expect("indexes");
        assert_eq!(names(&indexes), vec!["home_-1", "home.city_1"]);

        let direct = compiler.build_indexes(address, None).expect("indexes");
        assert_eq!(names(&direct), vec!["city_1", "street_1"]);
    }

    #[test]
    fn only_unprefixed_builds_are_cached() {
        let (registry, compiler) = setup();
        let class = registry.define_class("Tagged", None).expect("define");
        registry.set_field_index(class, "tag", IndexSpec::new().unique());

        let first = compiler.build_indexes(class, None).expect("indexes");
        let second = compiler.build_indexes(class, None).expect("indexes");
        assert!(Arc::ptr_eq(&first, &second));

        let nested = compiler.build_indexes(class, Some("outer")).expect("indexes");
        assert_eq!(names(&nested), vec!["outer.tag_1"]);
        assert!(Arc::ptr_eq(&first, &compiler.build_indexes(class, None).expect("indexes")));
    }

    #[test]
    fn lineage_levels_accumulate_without_dedup() {
        let (registry, compiler) = setup();
        let base = registry.define_class("Base", None).expect("define");
        registry.set_field_index(base, "createdAt", IndexSpec::new());
        let child = registry.define_class("Child", Some(base)).expect("define");
        registry.set_field_index(child, "createdAt", IndexSpec::new());
        registry.set_field_index(child, "slug", IndexSpec::new().unique());

        let indexes = compiler.build_indexes(child, None).expect("indexes");
        assert_eq!(names(&indexes), vec!["createdAt_1", "slug_1", "createdAt_1"]);
        assert!(indexes[1].unique);
    }

    #[test]
    fn passthrough_into_self_is_circular() {
        let (registry, compiler) = setup();
        let class = registry.define_class("Tree", None).expect("define");
        registry.set_field_type(class, "parent", TypeTag::Object, TypeOptions::Object(ObjectOptions {
            class: Some(class),
        }));
        registry.set_field_index(class, "parent", IndexSpec::new().passthrough());

        let err = compiler.build_indexes(class, None).expect_err("self pass-through");
        assert!(matches!(err, SchemaError::CircularReference { ref path } if path == "Tree.parent"));
    }

    #[test]
    fn passthrough_without_object_reference_stops() {
        let (registry, compiler) = setup();
        let element = registry.define_class("Element", None).expect("define");
        registry.set_field_index(element, "code", IndexSpec::new());
        let holder = registry.define_class("Holder", None).expect("define");
        registry.set_field_type(
            holder,
            "items",
            TypeTag::Array,
            TypeOptions::Array(crate::types::ArrayOptions {
                items: Some(element),
                ..Default::default()
            }),
        );
        registry.set_field_index(holder, "items", IndexSpec::new().passthrough());

        let indexes = compiler.build_indexes(holder, None).expect("indexes");
        assert_eq!(names(&indexes), vec!["items_1"]);
    }
}
