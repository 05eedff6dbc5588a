use std::sync::Arc;

use super::{Compiler, cached, store};
use crate::errors::SchemaError;
use crate::hint;
use crate::json_schema::BsonType;
use crate::schema::{ArraySchema, NumberSchema, ObjectSchema, SchemaNode, SetSchema, Shape, StringSchema};
use crate::types::{
    ClassId, FieldDeclaration, FieldDetails, NumberOptions, NumericType, StringFormat, StringOptions, TypeOptions,
    TypeTag,
};

/// Value stored with `bson_type`; only ObjectIds have a value check of their own.
fn hinted_any(bson_type: BsonType) -> SchemaNode {
    let node = match bson_type {
        BsonType::ObjectId => SchemaNode::object_id(),
        _ => SchemaNode::any(),
    };
    node.describe(hint::marker(bson_type))
}

/// Fixed schemas of the built-in classes.
fn builtin_schema(class: ClassId) -> Option<SchemaNode> {
    let hinted = |node: SchemaNode, bson_type: BsonType| node.describe(hint::marker(bson_type));
    let node = match class {
        ClassId::BOOLEAN => SchemaNode::boolean(),
        ClassId::STRING => SchemaNode::string(),
        ClassId::NUMBER => SchemaNode::number(),
        ClassId::DATE => SchemaNode::date(),
        ClassId::OBJECT => SchemaNode::passthrough_object(),
        ClassId::ARRAY => SchemaNode::array(SchemaNode::any()),
        ClassId::SET => SchemaNode::set(SchemaNode::any()),
        ClassId::MAP => SchemaNode::map(SchemaNode::any(), SchemaNode::any()),
        ClassId::OBJECT_ID => hinted_any(BsonType::ObjectId),
        ClassId::BIN_DATA => hinted_any(BsonType::BinData),
        ClassId::DOUBLE => hinted(SchemaNode::number(), BsonType::Double),
        ClassId::DECIMAL => hinted(SchemaNode::number(), BsonType::Decimal),
        ClassId::LONG => hinted(SchemaNode::number(), BsonType::Long),
        _ => return None,
    };
    Some(node)
}

impl Compiler {
    /// Validation schema of `class`: an object node holding the fields of the class and all
    /// of its ancestors.
    ///
    /// Ancestor properties come first; a field redeclared by a descendant keeps its position
    /// but takes the descendant's definition.
    pub fn build_validation_schema(&self, class: ClassId) -> Result<Arc<SchemaNode>, SchemaError> {
        self.build_schema_in(class, &mut Vec::new())
    }

    fn build_schema_in(&self, class: ClassId, building: &mut Vec<ClassId>) -> Result<Arc<SchemaNode>, SchemaError> {
        if let Some(node) = cached(&self.merged, class) {
            log::debug!("schema cache hit for {}", self.display_name(class));
            return Ok(node);
        }
        if let Some(node) = builtin_schema(class) {
            return Ok(store(&self.merged, class, Arc::new(node)));
        }
        self.ensure_known(class)?;

        // Classes reached again through an intermediate class would recurse forever.
        if building.contains(&class) {
            let mut chain: Vec<String> = building.iter().map(|id| self.display_name(*id)).collect();
            chain.push(self.display_name(class));
            return Err(SchemaError::CircularReference {
                path: chain.join(" -> "),
            });
        }

        log::debug!("building schema for {}", self.display_name(class));
        building.push(class);
        let levels = self.own_levels(class, building);
        building.pop();
        let levels = levels?;

        let mut shape = Shape::new();
        for (level, node) in levels.iter().rev() {
            let object = node.as_object().ok_or_else(|| SchemaError::UnexpectedNodeShape {
                class: self.display_name(*level),
                kind: node.kind.name().to_string(),
            })?;
            shape.extend(&object.shape);
        }

        for (level, node) in levels {
            if !level.is_builtin() {
                store(&self.own, level, node);
            }
        }
        let merged = Arc::new(SchemaNode::object(ObjectSchema::with_shape(shape)));
        Ok(store(&self.merged, class, merged))
    }

    /// Own-fields node for each class in the lineage, most-derived first.
    fn own_levels(
        &self,
        class: ClassId,
        building: &mut Vec<ClassId>,
    ) -> Result<Vec<(ClassId, Arc<SchemaNode>)>, SchemaError> {
        let lineage = self.registry.lineage(class)?;
        let mut levels = Vec::with_capacity(lineage.len());
        for level in lineage {
            let node = match builtin_schema(level) {
                Some(node) => Arc::new(node),
                None => match cached(&self.own, level) {
                    Some(node) => node,
                    None => Arc::new(self.own_schema(level, building)?),
                },
            };
            levels.push((level, node));
        }
        Ok(levels)
    }

    fn own_schema(&self, class: ClassId, building: &mut Vec<ClassId>) -> Result<SchemaNode, SchemaError> {
        let name = self.display_name(class);
        let mut shape = Shape::new();
        for declaration in self.registry.field_declarations(class).unwrap_or_default() {
            let path = format!("{name}.{}", declaration.name);
            let node = self.field_node(class, &path, &declaration, building)?;
            shape.insert(declaration.name, apply_details(node, declaration.details.as_ref()));
        }
        Ok(SchemaNode::object(ObjectSchema::with_shape(shape)))
    }

    fn field_node(
        &self,
        class: ClassId,
        path: &str,
        declaration: &FieldDeclaration,
        building: &mut Vec<ClassId>,
    ) -> Result<SchemaNode, SchemaError> {
        let tag = declaration.type_tag.ok_or_else(|| SchemaError::TypeMissing { path: path.to_string() })?;
        let options = &declaration.type_options;
        if tag.is_container() && options.referenced_classes().contains(&class) {
            return Err(SchemaError::CircularReference { path: path.to_string() });
        }

        let mut class_node = |class: Option<ClassId>| -> Result<SchemaNode, SchemaError> {
            match class {
                Some(class) => Ok(self.build_schema_in(class, building)?.as_ref().clone()),
                None => Ok(SchemaNode::any()),
            }
        };

        let node = match (tag, options) {
            (TypeTag::Any, TypeOptions::None) => SchemaNode::any(),
            (TypeTag::Any, TypeOptions::Any(any)) => any.bson_type.map_or_else(SchemaNode::any, hinted_any),
            (TypeTag::Raw, TypeOptions::Raw(raw)) => raw.schema.clone(),
            (TypeTag::Bool, TypeOptions::None) => SchemaNode::boolean(),
            (TypeTag::Date, TypeOptions::None) => SchemaNode::date(),
            (TypeTag::BigInt, TypeOptions::None) => SchemaNode::big_int(),
            (TypeTag::String, TypeOptions::None) => SchemaNode::string(),
            (TypeTag::String, TypeOptions::String(string)) => string_node(string),
            (TypeTag::Number, TypeOptions::None) => SchemaNode::number(),
            (TypeTag::Number, TypeOptions::Number(number)) => number_node(number),
            (TypeTag::Enum, TypeOptions::Enum(enumeration)) => SchemaNode::enumeration(enumeration.values.clone()),
            (TypeTag::NativeEnum, TypeOptions::NativeEnum(native)) => SchemaNode::native_enum(native.members.clone()),
            (TypeTag::Object, TypeOptions::None) => SchemaNode::passthrough_object(),
            (TypeTag::Object, TypeOptions::Object(object)) => match object.class {
                Some(class) => class_node(Some(class))?,
                None => SchemaNode::passthrough_object(),
            },
            (TypeTag::Array, TypeOptions::None) => SchemaNode::array(SchemaNode::any()),
            (TypeTag::Array, TypeOptions::Array(array)) => SchemaNode::from(ArraySchema {
                element: Box::new(class_node(array.items)?),
                min_items: array.min_items,
                max_items: array.max_items,
            }),
            (TypeTag::Set, TypeOptions::None) => SchemaNode::set(SchemaNode::any()),
            (TypeTag::Set, TypeOptions::Set(set)) => SchemaNode::from(SetSchema {
                element: Box::new(class_node(set.items)?),
                min_size: set.min_size,
                max_size: set.max_size,
            }),
            (TypeTag::Map, TypeOptions::None) => SchemaNode::map(SchemaNode::any(), SchemaNode::any()),
            (TypeTag::Map, TypeOptions::Map(map)) => {
                let key = class_node(map.keys)?;
                SchemaNode::map(key, class_node(map.values)?)
            }
            (tag, options) => {
                return Err(SchemaError::BuilderMissing {
                    path: path.to_string(),
                    tag: tag.to_string(),
                    options: options.name().to_string(),
                });
            }
        };
        Ok(node)
    }
}

fn string_node(options: &StringOptions) -> SchemaNode {
    let mut schema = StringSchema::new();
    if let Some(min) = options.min_length {
        schema = schema.min(min);
    }
    if let Some(max) = options.max_length {
        schema = schema.max(max);
    }
    if let Some(pattern) = &options.pattern {
        schema = schema.regex(pattern.clone());
    }
    let bson_type = match options.format {
        Some(StringFormat::Email) => {
            schema = schema.email();
            None
        }
        Some(StringFormat::Url) => {
            schema = schema.url();
            None
        }
        Some(StringFormat::Uuid) => {
            schema = schema.uuid();
            None
        }
        Some(StringFormat::Cuid) => {
            schema = schema.cuid();
            None
        }
        Some(StringFormat::ObjectId) => Some(BsonType::ObjectId),
        Some(StringFormat::BinData) => Some(BsonType::BinData),
        Some(StringFormat::Timestamp) => Some(BsonType::Timestamp),
        None => None,
    };
    let node = SchemaNode::from(schema);
    match bson_type {
        Some(bson_type) => node.describe(hint::marker(bson_type)),
        None => node,
    }
}

fn number_node(options: &NumberOptions) -> SchemaNode {
    let mut schema = NumberSchema::new();
    let mut bson_type = None;
    match options.numeric_type {
        Some(NumericType::Int) => schema = schema.int(),
        Some(other) => bson_type = Some(other.bson_type()),
        None => {}
    }
    if let Some(minimum) = options.minimum {
        schema = if options.exclusive_minimum {
            schema.gt(minimum)
        } else {
            schema.gte(minimum)
        };
    }
    if let Some(maximum) = options.maximum {
        schema = if options.exclusive_maximum {
            schema.lt(maximum)
        } else {
            schema.lte(maximum)
        };
    }
    if let Some(step) = options.multiple_of {
        schema = schema.multiple_of(step);
    }
    let node = SchemaNode::from(schema);
    match bson_type {
        Some(bson_type) => node.describe(hint::marker(bson_type)),
        None => node,
    }
}

/// Wrap in order optional, nullable, default, then describe.
fn apply_details(node: SchemaNode, details: Option<&FieldDetails>) -> SchemaNode {
    let Some(details) = details else {
        return node;
    };
    let mut node = node;
    if details.optional {
        node = node.optional();
    }
    if details.nullable {
        node = node.nullable();
    }
    if let Some(default) = &details.default_value {
        node = node.with_default(default.clone());
    }
    if let Some(description) = &details.description {
        let description = match hint::of(node.description.as_deref()) {
            Some(bson_type) => hint::compose(description, bson_type),
            None => description.clone(),
        };
        node = node.describe(description);
    }
    node
}
