//! Query resolution
//!
//! [`QueryResolver`] is the boundary to the inventory query engine. The
//! in-memory implementation evaluates requests over typed inventory records
//! and is used for fixtures, tests and database-less deployments.

use crate::{
    AssetdeskError, AssetdeskResult, EntityId, FilterCatalog, SearchRequest, SortDirection,
    TypedValue, ValidationError,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// One result row: the requested columns of one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ResultRow {
    pub id: EntityId,
    /// Column name to value; `None` when the entity has no value
    #[cfg_attr(feature = "openapi", schema(value_type = BTreeMap<String, TypedValue>))]
    pub values: BTreeMap<String, Option<TypedValue>>,
}

/// Resolves a validated search request into result rows.
#[async_trait]
pub trait QueryResolver: Send + Sync {
    async fn resolve(&self, request: &SearchRequest) -> AssetdeskResult<Vec<ResultRow>>;

    /// Called with a rebuilt catalog before it replaces the current one.
    /// An error rejects the rebuild.
    async fn catalog_changed(&self, _catalog: &FilterCatalog) -> AssetdeskResult<()> {
        Ok(())
    }
}

// ============================================================================
// IN-MEMORY RESOLVER
// ============================================================================

/// Raw inventory record as stored in a fixture file.
///
/// Field values are JSON scalars, or arrays of scalars for one-to-many
/// attributes such as `Software.Name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: EntityId,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
struct TypedRecord {
    id: EntityId,
    fields: BTreeMap<String, Vec<TypedValue>>,
}

impl TypedRecord {
    fn values(&self, key: &str) -> &[TypedValue] {
        self.fields.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    fn first(&self, key: &str) -> Option<&TypedValue> {
        self.values(key).first()
    }
}

/// How fields missing from the catalog are treated while typing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnknownFields {
    Reject,
    Skip,
}

/// Evaluates search requests over records held in memory.
///
/// The raw records are kept so that a catalog rebuild can re-type them.
#[derive(Debug, Default)]
pub struct InMemoryQueryResolver {
    raw: Vec<InventoryRecord>,
    typed: RwLock<Arc<Vec<TypedRecord>>>,
}

impl InMemoryQueryResolver {
    /// Type all record fields through the catalog.
    ///
    /// Fails on a field that is not a catalog key or a value that does not
    /// parse as the key's value type.
    pub fn from_records(
        catalog: &FilterCatalog,
        records: Vec<InventoryRecord>,
    ) -> Result<Self, ValidationError> {
        let typed = type_records(catalog, &records, UnknownFields::Reject)?;
        Ok(Self {
            raw: records,
            typed: RwLock::new(Arc::new(typed)),
        })
    }

    /// Re-type the records against a rebuilt catalog.
    ///
    /// Fields the catalog no longer knows are left out of the typed view;
    /// their raw values are kept in case the field is registered again. A
    /// value that does not parse as its new type fails and leaves the
    /// current view untouched.
    pub fn retype(&self, catalog: &FilterCatalog) -> AssetdeskResult<()> {
        let typed = type_records(catalog, &self.raw, UnknownFields::Skip)?;
        let mut current = self.typed.write().map_err(|_| AssetdeskError::LockPoisoned)?;
        *current = Arc::new(typed);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    fn snapshot(&self) -> AssetdeskResult<Arc<Vec<TypedRecord>>> {
        self.typed
            .read()
            .map(|records| Arc::clone(&records))
            .map_err(|_| AssetdeskError::LockPoisoned)
    }

    /// Evaluate a request synchronously.
    pub fn evaluate(&self, request: &SearchRequest) -> AssetdeskResult<Vec<ResultRow>> {
        let records = self.snapshot()?;
        let mut rows: Vec<(Option<TypedValue>, ResultRow)> = records
            .iter()
            .flat_map(|record| rows_for_record(record, request))
            .collect();

        rows.sort_by(|(a_key, a_row), (b_key, b_row)| {
            let by_value = compare_sort_values(a_key.as_ref(), b_key.as_ref());
            let by_value = match request.direction {
                SortDirection::Asc => by_value,
                SortDirection::Desc => by_value.reverse(),
            };
            by_value.then(a_row.id.cmp(&b_row.id))
        });

        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }
}

#[async_trait]
impl QueryResolver for InMemoryQueryResolver {
    async fn resolve(&self, request: &SearchRequest) -> AssetdeskResult<Vec<ResultRow>> {
        self.evaluate(request)
    }

    async fn catalog_changed(&self, catalog: &FilterCatalog) -> AssetdeskResult<()> {
        self.retype(catalog)
    }
}

fn type_records(
    catalog: &FilterCatalog,
    records: &[InventoryRecord],
    unknown: UnknownFields,
) -> Result<Vec<TypedRecord>, ValidationError> {
    let mut typed = Vec::with_capacity(records.len());
    for record in records {
        let mut fields = BTreeMap::new();
        for (key, raw) in &record.fields {
            let value_type = match (catalog.value_type_of(key), unknown) {
                (Ok(value_type), _) => value_type,
                (Err(_), UnknownFields::Skip) => continue,
                (Err(_), UnknownFields::Reject) => {
                    return Err(ValidationError::UnknownColumn {
                        field: format!("record {}", record.id),
                        column: key.clone(),
                    })
                }
            };
            let raw_values = match raw {
                serde_json::Value::Array(items) => items.as_slice(),
                scalar => std::slice::from_ref(scalar),
            };
            let mut values = Vec::with_capacity(raw_values.len());
            for raw_value in raw_values {
                if let Some(value) = TypedValue::from_json(value_type, raw_value, key)? {
                    values.push(value);
                }
            }
            fields.insert(key.clone(), values);
        }
        typed.push(TypedRecord {
            id: record.id,
            fields,
        });
    }
    Ok(typed)
}

/// Rows produced by one record, each paired with its sort value.
///
/// Non-inverted criteria on multi-valued keys behave like a join and yield
/// one row per matching value. Inverted criteria require that no value
/// satisfies the operator and never multiply rows.
fn rows_for_record(
    record: &TypedRecord,
    request: &SearchRequest,
) -> Vec<(Option<TypedValue>, ResultRow)> {
    let mut joined: Vec<(&str, Vec<&TypedValue>)> = Vec::new();

    for criterion in &request.criteria {
        let values = record.values(&criterion.filter_key);
        if criterion.invert {
            if values.iter().any(|v| criterion.operator_matches(v)) {
                return Vec::new();
            }
            continue;
        }

        let matching: Vec<&TypedValue> = values
            .iter()
            .filter(|v| criterion.operator_matches(v))
            .collect();
        if matching.is_empty() {
            return Vec::new();
        }

        // The same key filtered twice must satisfy both criteria on one value.
        match joined
            .iter()
            .position(|(key, _)| *key == criterion.filter_key)
        {
            Some(index) => {
                let existing = &mut joined[index].1;
                existing.retain(|v| matching.contains(v));
                if existing.is_empty() {
                    return Vec::new();
                }
            }
            None => joined.push((criterion.filter_key.as_str(), matching)),
        }
    }

    // One row per entity: the first combination is the first value of
    // every joined key.
    if request.distinct {
        for (_, values) in &mut joined {
            values.truncate(1);
        }
    }

    let mut combinations: Vec<Vec<(&str, &TypedValue)>> = vec![Vec::new()];
    for (key, values) in &joined {
        combinations = combinations
            .into_iter()
            .flat_map(|combo| {
                values.iter().map(move |value| {
                    let mut next = combo.clone();
                    next.push((*key, *value));
                    next
                })
            })
            .collect();
    }
    combinations
        .into_iter()
        .map(|combo| {
            let pick = |column: &str| -> Option<TypedValue> {
                combo
                    .iter()
                    .find(|(key, _)| *key == column)
                    .map(|(_, value)| *value)
                    .or_else(|| record.first(column))
                    .cloned()
            };
            let values = request
                .columns
                .iter()
                .map(|column| (column.clone(), pick(column)))
                .collect();
            (
                pick(&request.order),
                ResultRow {
                    id: record.id,
                    values,
                },
            )
        })
        .collect()
}

fn compare_sort_values(a: Option<&TypedValue>, b: Option<&TypedValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.compare(b).unwrap_or(Ordering::Equal),
    }
}
