//! Ordered column schemas.
//!
//! A [`Schema`] is an immutable, ordered collection of `name -> DataType`
//! pairs with unique names. Every constructor validates uniqueness, including
//! the serde path, so a value of this type always satisfies the invariant.
//! Position lookups are O(1) through an internal name index that is rebuilt
//! rather than serialized.
//!
//! There is no mutation. `delete` and `append` return new schemas and run the
//! same validation as construction.
//!
//! Equality is order-sensitive: two schemas with the same pairs in different
//! order are not equal. The subset/superset family ignores order and compares
//! the schemas as sets of pairs, which is the useful notion when checking
//! whether one table's columns can stand in for another's.

use arrow_schema::{Field, Schema as ArrowSchema, SchemaRef};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::{Read, Write};
use std::sync::Arc;

use crate::errors::SchemaError;
use crate::models::datatypes::wire_format::{read_name, write_name};
use crate::models::datatypes::{
    ArrowConversionError, DataType, FromArrowType, ToArrowType, WireFormat, WireFormatError,
};

/// An ordered mapping of column names to logical types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SchemaParts", into = "SchemaParts")]
pub struct Schema {
    names: Vec<String>,
    types: Vec<DataType>,
    /// Name -> position index. Derived from `names`, never serialized.
    name_locs: HashMap<String, usize>,
}

/// Serialized shape of a [`Schema`]. Deserialization goes back through
/// [`Schema::new`] so integrity checks also run on decoded data.
#[derive(Serialize, Deserialize)]
struct SchemaParts {
    names: Vec<String>,
    types: Vec<DataType>,
}

impl TryFrom<SchemaParts> for Schema {
    type Error = SchemaError;

    fn try_from(parts: SchemaParts) -> Result<Self, Self::Error> {
        Schema::new(parts.names, parts.types)
    }
}

impl From<Schema> for SchemaParts {
    fn from(schema: Schema) -> Self {
        SchemaParts {
            names: schema.names,
            types: schema.types,
        }
    }
}

impl Schema {
    /// Creates a schema from parallel name and type vectors.
    ///
    /// Fails when the vectors disagree in length or any name repeats. The
    /// error lists each duplicated name once, in first-seen order.
    pub fn new<N: Into<String>>(names: Vec<N>, types: Vec<DataType>) -> Result<Self, SchemaError> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() != types.len() {
            return Err(SchemaError::NameTypeLengthMismatch {
                names: names.len(),
                types: types.len(),
            });
        }

        let mut name_locs = HashMap::with_capacity(names.len());
        let mut duplicates: Vec<String> = Vec::new();
        for (position, name) in names.iter().enumerate() {
            if name_locs.contains_key(name) {
                if !duplicates.contains(name) {
                    duplicates.push(name.clone());
                }
            } else {
                name_locs.insert(name.clone(), position);
            }
        }
        if !duplicates.is_empty() {
            return Err(SchemaError::duplicate_column_names(duplicates));
        }

        Ok(Schema {
            names,
            types,
            name_locs,
        })
    }

    /// Creates a schema from `(name, type)` pairs in iteration order.
    pub fn from_pairs<I, N>(pairs: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (N, DataType)>,
        N: Into<String>,
    {
        let (names, types): (Vec<String>, Vec<DataType>) =
            pairs.into_iter().map(|(n, t)| (n.into(), t)).unzip();
        Schema::new(names, types)
    }

    /// Creates a schema from an ordered mapping. Key uniqueness is already
    /// guaranteed by the map, but the shared validation still runs.
    pub fn from_mapping(mapping: IndexMap<String, DataType>) -> Result<Self, SchemaError> {
        Schema::from_pairs(mapping)
    }

    /// The empty schema.
    pub fn empty() -> Self {
        Schema {
            names: Vec::new(),
            types: Vec::new(),
            name_locs: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn types(&self) -> &[DataType] {
        &self.types
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_locs.contains_key(name)
    }

    /// Position of a column by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.name_locs.get(name).copied()
    }

    /// Type of the named column, or `None` when absent.
    pub fn get(&self, name: &str) -> Option<&DataType> {
        self.position(name).map(|i| &self.types[i])
    }

    /// Type of the named column. Unknown names are an error.
    pub fn field_type(&self, name: &str) -> Result<&DataType, SchemaError> {
        self.get(name)
            .ok_or_else(|| SchemaError::unknown_column(name))
    }

    /// Name of the column at `index`.
    pub fn name_at(&self, index: usize) -> Result<&str, SchemaError> {
        self.names
            .get(index)
            .map(String::as_str)
            .ok_or(SchemaError::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    /// Iterates `(name, type)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataType)> {
        self.names.iter().map(String::as_str).zip(self.types.iter())
    }

    /// Returns a new schema without the given columns, preserving the order
    /// of the remaining ones. Every name must exist.
    pub fn delete(&self, names_to_delete: &[&str]) -> Result<Schema, SchemaError> {
        for name in names_to_delete {
            if !self.contains(name) {
                return Err(SchemaError::unknown_column(*name));
            }
        }
        let (names, types): (Vec<String>, Vec<DataType>) = self
            .iter()
            .filter(|(name, _)| !names_to_delete.contains(name))
            .map(|(name, dtype)| (name.to_string(), dtype.clone()))
            .unzip();
        Schema::new(names, types)
    }

    /// Returns a new schema with `other`'s columns appended after this one's.
    /// Name collisions across the two inputs fail like any other duplicate.
    pub fn append(&self, other: &Schema) -> Result<Schema, SchemaError> {
        let names: Vec<String> = self
            .names
            .iter()
            .chain(other.names.iter())
            .cloned()
            .collect();
        let types: Vec<DataType> = self
            .types
            .iter()
            .chain(other.types.iter())
            .cloned()
            .collect();
        Schema::new(names, types)
    }

    fn pair_set(&self) -> HashSet<(&str, &DataType)> {
        self.iter().collect()
    }

    /// True when every pair of `other` appears in `self`, in any order.
    /// Equal schemas are supersets of each other.
    pub fn is_superset(&self, other: &Schema) -> bool {
        self.pair_set().is_superset(&other.pair_set())
    }

    /// True when `self` is a superset of `other` and has at least one extra
    /// column.
    pub fn is_strict_superset(&self, other: &Schema) -> bool {
        self.is_superset(other) && self.len() > other.len()
    }

    /// True when every pair of `self` appears in `other`, in any order.
    pub fn is_subset(&self, other: &Schema) -> bool {
        other.is_superset(self)
    }

    /// True when `self` is a subset of `other` and `other` has at least one
    /// extra column.
    pub fn is_strict_subset(&self, other: &Schema) -> bool {
        other.is_strict_superset(self)
    }

    /// Renders this schema as an Arrow schema with one field per column.
    pub fn to_arrow(&self) -> Result<SchemaRef, ArrowConversionError> {
        let fields = self
            .iter()
            .map(|(name, dtype)| {
                Ok(Field::new(name, dtype.to_arrow_type()?, dtype.nullable()))
            })
            .collect::<Result<Vec<Field>, ArrowConversionError>>()?;
        Ok(Arc::new(ArrowSchema::new(fields)))
    }

    /// Recovers a schema from an Arrow schema, taking nullability from each
    /// field.
    pub fn from_arrow(arrow_schema: &ArrowSchema) -> Result<Schema, SchemaError> {
        let mut names = Vec::with_capacity(arrow_schema.fields().len());
        let mut types = Vec::with_capacity(arrow_schema.fields().len());
        for field in arrow_schema.fields() {
            names.push(field.name().clone());
            types.push(
                DataType::from_arrow_type(field.data_type())?
                    .with_nullable(field.is_nullable()),
            );
        }
        Schema::new(names, types)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names && self.types == other.types
    }
}

impl Eq for Schema {}

impl Hash for Schema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.names.hash(state);
        self.types.hash(state);
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Schema {{")?;
        let width = 2 + self.names.iter().map(String::len).max().unwrap_or(0);
        for (name, dtype) in self.iter() {
            writeln!(f, "  {name:<width$}{dtype}")?;
        }
        write!(f, "}}")
    }
}

impl WireFormat for Schema {
    fn encode<W: Write>(&self, writer: &mut W) -> Result<(), WireFormatError> {
        let count =
            u16::try_from(self.len()).map_err(|_| WireFormatError::InvalidLength(self.len()))?;
        writer.write_all(&count.to_le_bytes())?;
        for (name, dtype) in self.iter() {
            write_name(writer, name)?;
            dtype.encode(writer)?;
        }
        Ok(())
    }

    fn decode<R: Read>(reader: &mut R) -> Result<Self, WireFormatError> {
        let mut count_buf = [0u8; 2];
        reader
            .read_exact(&mut count_buf)
            .map_err(|_| WireFormatError::UnexpectedEof)?;
        let count = u16::from_le_bytes(count_buf);
        let mut names = Vec::with_capacity(count as usize);
        let mut types = Vec::with_capacity(count as usize);
        for _ in 0..count {
            names.push(read_name(reader)?);
            types.push(DataType::decode(reader)?);
        }
        Schema::new(names, types).map_err(|e| WireFormatError::InvalidValue(e.to_string()))
    }

    fn encoded_size(&self) -> usize {
        2 + self
            .iter()
            .map(|(name, dtype)| 2 + name.len() + dtype.encoded_size())
            .sum::<usize>()
    }
}

/// Implemented by anything that carries a schema: table nodes, query results,
/// relation-like values.
pub trait HasSchema {
    fn schema(&self) -> &Schema;

    /// Type of the named column on the carried schema.
    fn field_type(&self, name: &str) -> Result<&DataType, SchemaError> {
        self.schema().field_type(name)
    }

    fn has_column(&self, name: &str) -> bool {
        self.schema().contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Schema {
        Schema::from_pairs(vec![
            ("a", DataType::int64()),
            ("b", DataType::string()),
            ("c", DataType::float64()),
        ])
        .unwrap()
    }

    #[test]
    fn test_construction_preserves_order() {
        let schema = abc();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.names(), &["a", "b", "c"]);
        assert_eq!(schema.position("c"), Some(2));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = Schema::from_pairs(vec![
            ("a", DataType::int64()),
            ("b", DataType::string()),
            ("a", DataType::float64()),
            ("b", DataType::boolean()),
        ])
        .unwrap_err();
        match err {
            SchemaError::DuplicateColumnNames { names } => {
                assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = Schema::new(vec!["a", "b"], vec![DataType::int64()]).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::NameTypeLengthMismatch { names: 2, types: 1 }
        ));
    }

    #[test]
    fn test_lookup() {
        let schema = abc();
        assert_eq!(schema.get("b"), Some(&DataType::string()));
        assert_eq!(schema.get("z"), None);
        assert_eq!(schema.field_type("a").unwrap(), &DataType::int64());
        assert!(matches!(
            schema.field_type("z"),
            Err(SchemaError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_name_at() {
        let schema = abc();
        assert_eq!(schema.name_at(0).unwrap(), "a");
        assert_eq!(schema.name_at(2).unwrap(), "c");
        assert!(matches!(
            schema.name_at(3),
            Err(SchemaError::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_delete_preserves_order() {
        let schema = abc();
        let out = schema.delete(&["b"]).unwrap();
        assert_eq!(out.names(), &["a", "c"]);
        assert_eq!(out.position("c"), Some(1));

        assert!(matches!(
            schema.delete(&["a", "nope"]),
            Err(SchemaError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_append() {
        let left = abc();
        let right = Schema::from_pairs(vec![("d", DataType::boolean())]).unwrap();
        let out = left.append(&right).unwrap();
        assert_eq!(out.names(), &["a", "b", "c", "d"]);

        assert!(matches!(
            left.append(&left),
            Err(SchemaError::DuplicateColumnNames { .. })
        ));
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let forward = abc();
        let reversed = Schema::from_pairs(vec![
            ("c", DataType::float64()),
            ("b", DataType::string()),
            ("a", DataType::int64()),
        ])
        .unwrap();
        assert_ne!(forward, reversed);
        assert_eq!(forward, abc());
    }

    #[test]
    fn test_subset_superset_ignore_order() {
        let forward = abc();
        let reversed = Schema::from_pairs(vec![
            ("c", DataType::float64()),
            ("b", DataType::string()),
            ("a", DataType::int64()),
        ])
        .unwrap();
        let smaller = Schema::from_pairs(vec![
            ("c", DataType::float64()),
            ("a", DataType::int64()),
        ])
        .unwrap();

        assert!(forward.is_superset(&reversed));
        assert!(!forward.is_strict_superset(&reversed));
        assert!(forward.is_strict_superset(&smaller));
        assert!(smaller.is_strict_subset(&forward));
        assert!(smaller.is_subset(&smaller));
        assert!(!smaller.is_strict_subset(&smaller));
    }

    #[test]
    fn test_subset_requires_matching_types() {
        let ints = Schema::from_pairs(vec![("a", DataType::int64())]).unwrap();
        let strings = Schema::from_pairs(vec![("a", DataType::string())]).unwrap();
        assert!(!ints.is_subset(&strings));
        assert!(!strings.is_superset(&ints));
    }

    #[test]
    fn test_display_empty() {
        assert_eq!(Schema::empty().to_string(), "Schema {\n}");
    }

    #[test]
    fn test_display_alignment_and_nullability() {
        let schema = Schema::from_pairs(vec![
            ("foo", DataType::int64()),
            ("bar", DataType::int64().non_nullable()),
        ])
        .unwrap();
        assert_eq!(
            schema.to_string(),
            "Schema {\n  foo  int64\n  bar  int64[non-nullable]\n}"
        );
    }

    #[test]
    fn test_serde_round_trip_revalidates() {
        let schema = abc();
        let json = serde_json::to_string(&schema).unwrap();
        let back: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(schema, back);
        assert_eq!(back.position("c"), Some(2));

        let forged = r#"{"names":["a","a"],"types":[
            {"kind":"Int64","nullable":true},
            {"kind":"Int64","nullable":true}
        ]}"#;
        let err = serde_json::from_str::<Schema>(forged).unwrap_err();
        assert!(err.to_string().contains("duplicate column name(s): a"));
    }

    #[test]
    fn test_wire_round_trip() {
        let schema = Schema::from_pairs(vec![
            ("id", DataType::int64().non_nullable()),
            ("tags", DataType::array(DataType::string())),
        ])
        .unwrap();
        let mut buffer = Vec::new();
        schema.encode(&mut buffer).unwrap();
        assert_eq!(buffer.len(), schema.encoded_size());

        let mut cursor = std::io::Cursor::new(buffer);
        assert_eq!(Schema::decode(&mut cursor).unwrap(), schema);
    }

    #[test]
    fn test_to_arrow() {
        use arrow_schema::DataType as ArrowDataType;

        let schema = Schema::from_pairs(vec![
            ("id", DataType::int64().non_nullable()),
            ("name", DataType::string()),
        ])
        .unwrap();
        let arrow = schema.to_arrow().unwrap();
        assert_eq!(arrow.field(0).name(), "id");
        assert_eq!(arrow.field(0).data_type(), &ArrowDataType::Int64);
        assert!(!arrow.field(0).is_nullable());
        assert!(arrow.field(1).is_nullable());

        let back = Schema::from_arrow(&arrow).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn test_from_mapping() {
        let mut mapping = IndexMap::new();
        mapping.insert("x".to_string(), DataType::int32());
        mapping.insert("y".to_string(), DataType::int32());
        let schema = Schema::from_mapping(mapping).unwrap();
        assert_eq!(schema.names(), &["x", "y"]);
    }
}
