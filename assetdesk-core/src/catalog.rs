//! Filter catalog
//!
//! Maps every searchable filter key to its label and value type. The catalog
//! is built once at startup (builtin computer filters plus user-defined
//! fields and registry values) and shared read-only afterwards through a
//! [`CatalogHandle`].

use crate::{AssetdeskError, AssetdeskResult, DeclaredFieldType, SearchError, ValueType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Key prefix for user-defined inventory fields.
pub const USER_DEFINED_PREFIX: &str = "UserDefinedInfo.";
/// Key prefix for inventoried registry values.
pub const REGISTRY_PREFIX: &str = "Registry.";

/// Keys whose values are always integers.
pub const INTEGER_FILTERS: [&str; 6] = [
    "CpuClock",
    "CpuCores",
    "PhysicalMemory",
    "SwapMemory",
    "Volume.Size",
    "Volume.FreeSpace",
];

/// Keys whose values are always dates.
pub const DATE_FILTERS: [&str; 2] = ["InventoryDate", "LastContactDate"];

/// Builtin computer filters: (key, label).
const BUILTIN_FILTERS: [(&str, &str); 24] = [
    ("Name", "Computer name"),
    ("UserName", "User logged in at last inventory"),
    ("Windows.UserDomain", "Domain of the logged in user"),
    ("Windows.Workgroup", "Workgroup"),
    ("Windows.ProductKey", "Windows product key"),
    ("OsName", "OS name"),
    ("OsVersionNumber", "OS version number"),
    ("OsVersionString", "OS version string"),
    ("CpuType", "CPU type"),
    ("CpuClock", "CPU clock (MHz)"),
    ("CpuCores", "CPU cores"),
    ("PhysicalMemory", "RAM detected by agent (MB)"),
    ("SwapMemory", "Swap memory (MB)"),
    ("InventoryDate", "Last inventory"),
    ("LastContactDate", "Last contact"),
    ("Software.Name", "Software: Name"),
    ("Software.Version", "Software: Version"),
    ("Software.Publisher", "Software: Publisher"),
    ("NetworkInterface.IpAddress", "Network: IP address"),
    ("NetworkInterface.MacAddress", "Network: MAC address"),
    ("Volume.Size", "Filesystem: Size (MB)"),
    ("Volume.FreeSpace", "Filesystem: Free space (MB)"),
    ("Printer.Name", "Printer: Name"),
    ("MsOfficeProduct.ProductKey", "MS Office: Product key"),
];

/// Immutable definition of one filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FilterDefinition {
    pub key: String,
    pub label: String,
    pub value_type: ValueType,
}

/// A user-defined inventory field and its declared storage type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserDefinedField {
    pub name: String,
    pub declared_type: DeclaredFieldType,
}

/// Dynamically discovered filters merged into the builtin catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CatalogExtensions {
    #[serde(default)]
    pub user_defined_fields: Vec<UserDefinedField>,
    #[serde(default)]
    pub registry_values: Vec<String>,
}

/// Mapping from filter key to definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCatalog {
    definitions: BTreeMap<String, FilterDefinition>,
}

impl FilterCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog containing the builtin computer filters.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for (key, label) in BUILTIN_FILTERS {
            catalog.register(key, label, builtin_value_type(key));
        }
        catalog
    }

    /// Builtin filters plus all dynamically discovered ones.
    pub fn with_extensions(extensions: &CatalogExtensions) -> Self {
        let mut catalog = Self::builtin();
        for field in &extensions.user_defined_fields {
            catalog.register_user_defined(&field.name, field.declared_type);
        }
        for name in &extensions.registry_values {
            catalog.register_registry_value(name);
        }
        catalog
    }

    /// Add or overwrite a definition.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        label: impl Into<String>,
        value_type: ValueType,
    ) {
        let key = key.into();
        self.definitions.insert(
            key.clone(),
            FilterDefinition {
                key,
                label: label.into(),
                value_type,
            },
        );
    }

    /// Register `UserDefinedInfo.<name>` with the type implied by its
    /// declared storage type.
    pub fn register_user_defined(&mut self, name: &str, declared_type: DeclaredFieldType) {
        self.register(
            format!("{}{}", USER_DEFINED_PREFIX, name),
            format!("User defined: {}", name),
            declared_type.value_type(),
        );
    }

    /// Register `Registry.<name>`. Registry values are always text.
    pub fn register_registry_value(&mut self, name: &str) {
        self.register(
            format!("{}{}", REGISTRY_PREFIX, name),
            format!("Registry: {}", name),
            ValueType::Text,
        );
    }

    pub fn lookup(&self, key: &str) -> Result<&FilterDefinition, SearchError> {
        self.definitions
            .get(key)
            .ok_or_else(|| SearchError::UnknownFilter {
                field: "filter".to_string(),
                key: key.to_string(),
            })
    }

    pub fn value_type_of(&self, key: &str) -> Result<ValueType, SearchError> {
        self.lookup(key).map(|definition| definition.value_type)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.definitions.contains_key(key)
    }

    /// All definitions in key order.
    pub fn definitions(&self) -> impl Iterator<Item = &FilterDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn builtin_value_type(key: &str) -> ValueType {
    if INTEGER_FILTERS.contains(&key) {
        ValueType::Integer
    } else if DATE_FILTERS.contains(&key) {
        ValueType::Date
    } else {
        ValueType::Text
    }
}

// ============================================================================
// SHARED HANDLE
// ============================================================================

/// Process-wide catalog shared between request handlers.
///
/// Readers take an `Arc` snapshot and drop the lock immediately. A rebuild
/// swaps the whole catalog under the write lock.
#[derive(Debug, Clone)]
pub struct CatalogHandle {
    inner: Arc<RwLock<Arc<FilterCatalog>>>,
}

impl CatalogHandle {
    pub fn new(catalog: FilterCatalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// Current catalog, valid for the lifetime of one request.
    pub fn snapshot(&self) -> AssetdeskResult<Arc<FilterCatalog>> {
        self.inner
            .read()
            .map(|guard| Arc::clone(&*guard))
            .map_err(|_| AssetdeskError::LockPoisoned)
    }

    /// Replace the catalog wholesale.
    pub fn replace(&self, catalog: FilterCatalog) -> AssetdeskResult<()> {
        let mut guard = self.inner.write().map_err(|_| AssetdeskError::LockPoisoned)?;
        *guard = Arc::new(catalog);
        Ok(())
    }

    /// Rebuild from the builtin filters and new extensions.
    pub fn rebuild(&self, extensions: &CatalogExtensions) -> AssetdeskResult<()> {
        self.replace(FilterCatalog::with_extensions(extensions))
    }
}

impl Default for CatalogHandle {
    fn default() -> Self {
        Self::new(FilterCatalog::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_special_cased_types() {
        let catalog = FilterCatalog::builtin();
        for key in INTEGER_FILTERS {
            assert_eq!(catalog.value_type_of(key), Ok(ValueType::Integer), "{key}");
        }
        for key in DATE_FILTERS {
            assert_eq!(catalog.value_type_of(key), Ok(ValueType::Date), "{key}");
        }
        assert_eq!(catalog.value_type_of("CpuType"), Ok(ValueType::Text));
        assert_eq!(catalog.value_type_of("Software.Name"), Ok(ValueType::Text));
        assert_eq!(catalog.len(), BUILTIN_FILTERS.len());
    }

    #[test]
    fn test_lookup_unknown_key() {
        let catalog = FilterCatalog::builtin();
        let err = catalog.lookup("DoesNotExist").unwrap_err();
        assert!(matches!(err, SearchError::UnknownFilter { ref key, .. } if key == "DoesNotExist"));
    }

    #[test]
    fn test_register_overwrites() {
        let mut catalog = FilterCatalog::new();
        catalog.register("Name", "Name", ValueType::Text);
        catalog.register("Name", "Computer", ValueType::Integer);
        assert_eq!(catalog.len(), 1);
        let definition = catalog.lookup("Name").unwrap();
        assert_eq!(definition.label, "Computer");
        assert_eq!(definition.value_type, ValueType::Integer);
    }

    #[test]
    fn test_user_defined_fields_use_declared_type() {
        let extensions = CatalogExtensions {
            user_defined_fields: vec![
                UserDefinedField {
                    name: "AssetTag".to_string(),
                    declared_type: DeclaredFieldType::Text,
                },
                UserDefinedField {
                    name: "Notes".to_string(),
                    declared_type: DeclaredFieldType::Clob,
                },
                UserDefinedField {
                    name: "Rack".to_string(),
                    declared_type: DeclaredFieldType::Integer,
                },
                UserDefinedField {
                    name: "Price".to_string(),
                    declared_type: DeclaredFieldType::Float,
                },
                UserDefinedField {
                    name: "Purchased".to_string(),
                    declared_type: DeclaredFieldType::Date,
                },
            ],
            registry_values: vec!["ProxyServer".to_string()],
        };
        let catalog = FilterCatalog::with_extensions(&extensions);

        assert_eq!(catalog.value_type_of("UserDefinedInfo.AssetTag"), Ok(ValueType::Text));
        assert_eq!(catalog.value_type_of("UserDefinedInfo.Notes"), Ok(ValueType::Text));
        assert_eq!(catalog.value_type_of("UserDefinedInfo.Rack"), Ok(ValueType::Integer));
        assert_eq!(catalog.value_type_of("UserDefinedInfo.Price"), Ok(ValueType::Float));
        assert_eq!(catalog.value_type_of("UserDefinedInfo.Purchased"), Ok(ValueType::Date));
        assert_eq!(catalog.value_type_of("Registry.ProxyServer"), Ok(ValueType::Text));
        assert_eq!(catalog.len(), BUILTIN_FILTERS.len() + 6);
    }

    #[test]
    fn test_definitions_are_key_ordered() {
        let catalog = FilterCatalog::builtin();
        let keys: Vec<&str> = catalog.definitions().map(|d| d.key.as_str()).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_handle_snapshot_survives_rebuild() -> AssetdeskResult<()> {
        let handle = CatalogHandle::default();
        let before = handle.snapshot()?;
        assert!(!before.contains("Registry.ProxyServer"));

        handle.rebuild(&CatalogExtensions {
            user_defined_fields: vec![],
            registry_values: vec!["ProxyServer".to_string()],
        })?;

        let after = handle.snapshot()?;
        assert!(after.contains("Registry.ProxyServer"));
        // The earlier snapshot is unaffected
        assert!(!before.contains("Registry.ProxyServer"));
        Ok(())
    }

    #[test]
    fn test_extensions_deserialize_with_defaults() -> Result<(), serde_json::Error> {
        let extensions: CatalogExtensions =
            serde_json::from_str(r#"{"registry_values": ["Proxy"]}"#)?;
        assert!(extensions.user_defined_fields.is_empty());
        assert_eq!(extensions.registry_values, vec!["Proxy".to_string()]);
        Ok(())
    }
}
