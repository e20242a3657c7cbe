//! JSON rendering of instance trees
//!
//! Two renderers are offered. [`InstanceRef::to_json`] reproduces the bound
//! payload, dropping whatever the authorization predicate rejects.
//! [`InstanceRef::map_to_json`] rebuilds the same nesting but lets a caller
//! supplied mapper produce the JSON of every leaf, leaf-list and, on
//! request, every list entry.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

use super::tree::{InstanceRef, InstanceType};

type Predicate<'f> = &'f dyn Fn(InstanceRef<'_>) -> bool;
type Mapper<'f> = &'f dyn Fn(InstanceRef<'_>) -> Value;

// ============================================================================
// Options
// ============================================================================

/// Options of [`InstanceRef::to_json`]
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    camel_case: bool,
    convert: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            camel_case: false,
            convert: true,
        }
    }
}

impl SerializeOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether member names are camelCased
    pub fn camel_case(&self) -> bool {
        self.camel_case
    }

    /// Whether leaf values go through their type
    pub fn convert(&self) -> bool {
        self.convert
    }

    /// Set camelCased member names
    pub fn with_camel_case(mut self, camel_case: bool) -> Self {
        self.camel_case = camel_case;
        self
    }

    /// Set type conversion of leaf values
    pub fn with_convert(mut self, convert: bool) -> Self {
        self.convert = convert;
        self
    }
}

/// Options of [`InstanceRef::map_to_json`]
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    override_on_key_map: bool,
}

impl MapOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a mapped key leaf hands the whole list entry to the mapper
    pub fn override_on_key_map(&self) -> bool {
        self.override_on_key_map
    }

    /// Set key map override
    pub fn with_override_on_key_map(mut self, override_on_key_map: bool) -> Self {
        self.override_on_key_map = override_on_key_map;
        self
    }
}

/// Mapper reproducing [`InstanceRef::to_json`] output
///
/// Leaves and leaf-lists render themselves, a list entry renders as a one
/// row array and everything else maps to `null`.
pub fn default_mapper<A>(instance: InstanceRef<'_>, authorized: A) -> Value
where
    A: Fn(InstanceRef<'_>) -> bool,
{
    let options = SerializeOptions::default();
    match instance.instance_type() {
        InstanceType::Leaf | InstanceType::LeafList => instance.to_json(authorized, &options, None),
        InstanceType::ListChild => Value::Array(vec![instance.to_json(authorized, &options, None)]),
        _ => Value::Null,
    }
}

/// Number of members, items or characters of a JSON value
pub fn json_size(value: &Value) -> usize {
    match value {
        Value::Null => 0,
        Value::Object(map) => map.len(),
        Value::Array(items) => items.len(),
        Value::String(s) => s.len(),
        Value::Bool(_) | Value::Number(_) => 1,
    }
}

fn single(name: String, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(name, value);
    Value::Object(map)
}

fn merge_into(target: &mut Map<String, Value>, value: Value) {
    if let Value::Object(members) = value {
        target.extend(members);
    }
}

// ============================================================================
// Rendering
// ============================================================================

impl<'t> InstanceRef<'t> {
    /// Render the instance as JSON
    ///
    /// Containers, leaves and leaf-lists render as a one member object named
    /// after the instance; a rejected instance renders as `{}`. Lists drop
    /// the entries rejected by `authorized` or matched by `skip`, and vanish
    /// when no entry remains. A list entry renders as the merged object of
    /// its children. A leaf-list item renders as its value.
    pub fn to_json<A>(
        &self,
        authorized: A,
        options: &SerializeOptions,
        skip: Option<&dyn Fn(InstanceRef<'_>) -> bool>,
    ) -> Value
    where
        A: Fn(InstanceRef<'_>) -> bool,
    {
        self.render(&authorized, options, skip)
    }

    fn render(&self, authorized: Predicate<'_>, options: &SerializeOptions, skip: Option<Predicate<'_>>) -> Value {
        let skipped = |instance: InstanceRef<'_>| skip.map_or(false, |s| s(instance));
        let name = self.get_name(options.camel_case());

        match self.instance_type() {
            InstanceType::Container => {
                if !authorized(*self) || skipped(*self) {
                    return Value::Object(Map::new());
                }
                single(name, self.render_children(authorized, options, skip))
            }
            InstanceType::ListChild => self.render_children(authorized, options, skip),
            InstanceType::List => {
                if skipped(*self) {
                    return Value::Object(Map::new());
                }

                let rows: Vec<Value> = self
                    .children(|entry| authorized(entry) && !skipped(entry))
                    .into_iter()
                    .map(|entry| entry.render(authorized, options, skip))
                    .filter(|row| json_size(row) > 0)
                    .collect();

                if rows.is_empty() {
                    Value::Object(Map::new())
                } else {
                    single(name, Value::Array(rows))
                }
            }
            InstanceType::Leaf => {
                if !authorized(*self) {
                    return Value::Object(Map::new());
                }

                let raw = self.value(authorized).map(|v| Value::String(v.to_string()));
                let value = if options.convert() {
                    self.converted_value(authorized).or(raw)
                } else {
                    raw
                };
                single(name, value.unwrap_or(Value::Null))
            }
            InstanceType::LeafList => {
                if !authorized(*self) {
                    return Value::Object(Map::new());
                }

                let values = if options.convert() {
                    self.values(authorized)
                } else {
                    self.raw_values(authorized)
                        .into_iter()
                        .map(|v| v.map_or(Value::Null, |v| Value::String(v.to_string())))
                        .collect()
                };
                single(name, Value::Array(values))
            }
            InstanceType::LeafListChild => match self.raw_value(authorized) {
                Some(_) if options.convert() => self.item_value(),
                Some(raw) => Value::String(raw.to_string()),
                None => Value::Null,
            },
        }
    }

    fn render_children(&self, authorized: Predicate<'_>, options: &SerializeOptions, skip: Option<Predicate<'_>>) -> Value {
        let mut members = Map::new();
        for child in self.children(authorized) {
            merge_into(&mut members, child.render(authorized, options, skip));
        }
        Value::Object(members)
    }

    /// Render the instance through `mapper`
    ///
    /// Leaves, leaf-lists and leaf-list items are handed to the mapper.
    /// Containers and lists keep their nesting under canonical names and
    /// vanish when nothing below them maps to a value. A list entry maps to
    /// a one row array led by its keys, or to `null` when nothing maps.
    ///
    /// With [`MapOptions::override_on_key_map`], a list entry whose key leaf
    /// maps to a value is handed to the mapper instead, which must return an
    /// array of rows.
    pub fn map_to_json<A, M>(&self, authorized: A, mapper: M, options: &MapOptions) -> Result<Value>
    where
        A: Fn(InstanceRef<'_>) -> bool,
        M: Fn(InstanceRef<'_>) -> Value,
    {
        self.map_with(&authorized, &mapper, options)
    }

    fn map_with(&self, authorized: Predicate<'_>, mapper: Mapper<'_>, options: &MapOptions) -> Result<Value> {
        match self.instance_type() {
            InstanceType::Leaf | InstanceType::LeafList | InstanceType::LeafListChild => Ok(mapper(*self)),
            InstanceType::Container => {
                let mut inner = Map::new();
                for child in self.children(authorized) {
                    merge_into(&mut inner, child.map_with(authorized, mapper, options)?);
                }

                if inner.is_empty() {
                    Ok(Value::Object(Map::new()))
                } else {
                    Ok(single(self.name().to_string(), Value::Object(inner)))
                }
            }
            InstanceType::ListChild => self.map_entry(authorized, mapper, options),
            InstanceType::List => {
                let mut rows = Vec::new();
                for entry in self.children(authorized) {
                    match entry.map_with(authorized, mapper, options)? {
                        Value::Array(mapped) => rows.extend(mapped.into_iter().filter(|row| !row.is_null())),
                        Value::Null => {}
                        other => rows.push(other),
                    }
                }

                if rows.is_empty() {
                    Ok(Value::Object(Map::new()))
                } else {
                    Ok(single(self.name().to_string(), Value::Array(rows)))
                }
            }
        }
    }

    fn map_entry(&self, authorized: Predicate<'_>, mapper: Mapper<'_>, options: &MapOptions) -> Result<Value> {
        let mut inner = Map::new();

        for child in self.children(authorized) {
            let mapped = child.map_with(authorized, mapper, options)?;

            if options.override_on_key_map() && child.is_key() && json_size(&mapped) > 0 {
                return match mapper(*self) {
                    rows @ Value::Array(_) => Ok(rows),
                    _ => Err(Error::Instance(
                        "Must map a list child to an array of list children.".to_string(),
                    )),
                };
            }

            merge_into(&mut inner, mapped);
        }

        if inner.is_empty() {
            return Ok(Value::Null);
        }

        let mut row: Map<String, Value> = self
            .keys(authorized)
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.map_or(Value::Null, |v| Value::String(v.to_string()))))
            .collect();
        row.extend(inner);

        Ok(Value::Array(vec![Value::Object(row)]))
    }
}
