//! Enum types for filters, sorting and group membership

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// FILTER ENUMS
// ============================================================================

/// Value type of a searchable attribute.
///
/// `Integer`, `Float` and `Date` are ordinal and support the full comparison
/// operator set; `Text` only supports equality and substring matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Text,
    Integer,
    Float,
    Date,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Text => "text",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Date => "date",
        }
    }

    pub fn is_ordinal(&self) -> bool {
        !matches!(self, ValueType::Text)
    }

    /// Operators accepted for this value type, in display order.
    pub fn allowed_operators(&self) -> &'static [Operator] {
        if self.is_ordinal() {
            &ORDINAL_OPERATORS
        } else {
            &TEXT_OPERATORS
        }
    }
}

const TEXT_OPERATORS: [Operator; 3] = [Operator::Eq, Operator::Ne, Operator::Like];
const ORDINAL_OPERATORS: [Operator; 6] = [
    Operator::Eq,
    Operator::Ne,
    Operator::Lt,
    Operator::Le,
    Operator::Ge,
    Operator::Gt,
];

/// Comparison operator, transmitted as its literal code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Equal to
    #[default]
    Eq,
    /// Not equal to
    Ne,
    /// Less than
    Lt,
    /// Less than or equal
    Le,
    /// Greater than or equal
    Ge,
    /// Greater than
    Gt,
    /// Substring match with `*`/`?` wildcards (text only)
    Like,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::Ge => "ge",
            Operator::Gt => "gt",
            Operator::Like => "like",
        }
    }

    pub fn is_allowed_for(&self, value_type: ValueType) -> bool {
        value_type.allowed_operators().contains(self)
    }
}

/// Sort direction for result lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Declared type of a user-defined inventory field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum DeclaredFieldType {
    Text,
    Clob,
    Integer,
    Float,
    Date,
}

impl DeclaredFieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclaredFieldType::Text => "text",
            DeclaredFieldType::Clob => "clob",
            DeclaredFieldType::Integer => "integer",
            DeclaredFieldType::Float => "float",
            DeclaredFieldType::Date => "date",
        }
    }

    /// Filter value type used when searching on a field of this type.
    pub fn value_type(&self) -> ValueType {
        match self {
            DeclaredFieldType::Text | DeclaredFieldType::Clob => ValueType::Text,
            DeclaredFieldType::Integer => ValueType::Integer,
            DeclaredFieldType::Float => ValueType::Float,
            DeclaredFieldType::Date => ValueType::Date,
        }
    }
}

// ============================================================================
// PRESENTATION ENUMS
// ============================================================================

/// Detail tab opened when a computer is selected from a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum JumpTarget {
    #[default]
    General,
    Windows,
    Network,
    Storage,
    Display,
    Bios,
    System,
    Printers,
    Software,
    MsOffice,
    Registry,
    VirtualMachines,
    Misc,
    UserDefined,
    Packages,
    Groups,
}

impl JumpTarget {
    pub const ALL: [JumpTarget; 16] = [
        JumpTarget::General,
        JumpTarget::Windows,
        JumpTarget::Network,
        JumpTarget::Storage,
        JumpTarget::Display,
        JumpTarget::Bios,
        JumpTarget::System,
        JumpTarget::Printers,
        JumpTarget::Software,
        JumpTarget::MsOffice,
        JumpTarget::Registry,
        JumpTarget::VirtualMachines,
        JumpTarget::Misc,
        JumpTarget::UserDefined,
        JumpTarget::Packages,
        JumpTarget::Groups,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JumpTarget::General => "general",
            JumpTarget::Windows => "windows",
            JumpTarget::Network => "network",
            JumpTarget::Storage => "storage",
            JumpTarget::Display => "display",
            JumpTarget::Bios => "bios",
            JumpTarget::System => "system",
            JumpTarget::Printers => "printers",
            JumpTarget::Software => "software",
            JumpTarget::MsOffice => "msoffice",
            JumpTarget::Registry => "registry",
            JumpTarget::VirtualMachines => "virtualmachines",
            JumpTarget::Misc => "misc",
            JumpTarget::UserDefined => "userdefined",
            JumpTarget::Packages => "packages",
            JumpTarget::Groups => "groups",
        }
    }
}

// ============================================================================
// GROUP MEMBERSHIP
// ============================================================================

/// Per-entity override of dynamic group membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum MembershipOverride {
    /// Membership follows the group's predicate
    #[default]
    Automatic,
    /// Always a member, regardless of the predicate
    Always,
    /// Never a member, regardless of the predicate
    Never,
}

impl MembershipOverride {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipOverride::Automatic => "automatic",
            MembershipOverride::Always => "always",
            MembershipOverride::Never => "never",
        }
    }
}

// ============================================================================
// STRING CONVERSIONS
// ============================================================================

/// Error when parsing an invalid enum code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumParseError {
    pub kind: &'static str,
    pub value: String,
}

impl EnumParseError {
    fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl fmt::Display for EnumParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for EnumParseError {}

macro_rules! impl_code_conversions {
    ($type:ty, $kind:literal, [$($variant:expr),+ $(,)?]) => {
        impl fmt::Display for $type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $type {
            type Err = EnumParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_lowercase();
                [$($variant),+]
                    .into_iter()
                    .find(|candidate: &$type| candidate.as_str() == normalized)
                    .ok_or_else(|| EnumParseError::new($kind, s))
            }
        }
    };
}

impl_code_conversions!(ValueType, "value type", [
    ValueType::Text,
    ValueType::Integer,
    ValueType::Float,
    ValueType::Date,
]);

impl_code_conversions!(Operator, "operator", [
    Operator::Eq,
    Operator::Ne,
    Operator::Lt,
    Operator::Le,
    Operator::Ge,
    Operator::Gt,
    Operator::Like,
]);

impl_code_conversions!(SortDirection, "sort direction", [
    SortDirection::Asc,
    SortDirection::Desc,
]);

impl_code_conversions!(DeclaredFieldType, "field type", [
    DeclaredFieldType::Text,
    DeclaredFieldType::Clob,
    DeclaredFieldType::Integer,
    DeclaredFieldType::Float,
    DeclaredFieldType::Date,
]);

impl_code_conversions!(JumpTarget, "jump target", [
    JumpTarget::General,
    JumpTarget::Windows,
    JumpTarget::Network,
    JumpTarget::Storage,
    JumpTarget::Display,
    JumpTarget::Bios,
    JumpTarget::System,
    JumpTarget::Printers,
    JumpTarget::Software,
    JumpTarget::MsOffice,
    JumpTarget::Registry,
    JumpTarget::VirtualMachines,
    JumpTarget::Misc,
    JumpTarget::UserDefined,
    JumpTarget::Packages,
    JumpTarget::Groups,
]);

impl_code_conversions!(MembershipOverride, "membership", [
    MembershipOverride::Automatic,
    MembershipOverride::Always,
    MembershipOverride::Never,
]);
