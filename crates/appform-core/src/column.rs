//! Column definitions

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Column type tag (AppSheet column types)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnType {
    Address,
    App,
    ChangeCounter,
    ChangeLocation,
    ChangeTimestamp,
    Color,
    Date,
    DateTime,
    Decimal,
    Drawing,
    Duration,
    Email,
    Enum,
    EnumList,
    File,
    Image,
    LatLong,
    LongText,
    Name,
    Number,
    Percent,
    Phone,
    Price,
    Progress,
    Ref,
    Show,
    Signature,
    #[default]
    Text,
    Thumbnail,
    Time,
    Url,
    Video,
    #[cfg_attr(feature = "serde", serde(rename = "XY"))]
    Xy,
    #[cfg_attr(feature = "serde", serde(rename = "Yes/No"))]
    YesNo,
    /// Legacy type kept for older projects
    #[cfg_attr(feature = "serde", serde(rename = "UniqueID"))]
    UniqueId,
}

impl ColumnType {
    /// Every column type, in editor order
    pub const ALL: [ColumnType; 35] = [
        ColumnType::Address,
        ColumnType::App,
        ColumnType::ChangeCounter,
        ColumnType::ChangeLocation,
        ColumnType::ChangeTimestamp,
        ColumnType::Color,
        ColumnType::Date,
        ColumnType::DateTime,
        ColumnType::Decimal,
        ColumnType::Drawing,
        ColumnType::Duration,
        ColumnType::Email,
        ColumnType::Enum,
        ColumnType::EnumList,
        ColumnType::File,
        ColumnType::Image,
        ColumnType::LatLong,
        ColumnType::LongText,
        ColumnType::Name,
        ColumnType::Number,
        ColumnType::Percent,
        ColumnType::Phone,
        ColumnType::Price,
        ColumnType::Progress,
        ColumnType::Ref,
        ColumnType::Show,
        ColumnType::Signature,
        ColumnType::Text,
        ColumnType::Thumbnail,
        ColumnType::Time,
        ColumnType::Url,
        ColumnType::Video,
        ColumnType::Xy,
        ColumnType::YesNo,
        ColumnType::UniqueId,
    ];

    /// The type name as it appears in project files
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Address => "Address",
            ColumnType::App => "App",
            ColumnType::ChangeCounter => "ChangeCounter",
            ColumnType::ChangeLocation => "ChangeLocation",
            ColumnType::ChangeTimestamp => "ChangeTimestamp",
            ColumnType::Color => "Color",
            ColumnType::Date => "Date",
            ColumnType::DateTime => "DateTime",
            ColumnType::Decimal => "Decimal",
            ColumnType::Drawing => "Drawing",
            ColumnType::Duration => "Duration",
            ColumnType::Email => "Email",
            ColumnType::Enum => "Enum",
            ColumnType::EnumList => "EnumList",
            ColumnType::File => "File",
            ColumnType::Image => "Image",
            ColumnType::LatLong => "LatLong",
            ColumnType::LongText => "LongText",
            ColumnType::Name => "Name",
            ColumnType::Number => "Number",
            ColumnType::Percent => "Percent",
            ColumnType::Phone => "Phone",
            ColumnType::Price => "Price",
            ColumnType::Progress => "Progress",
            ColumnType::Ref => "Ref",
            ColumnType::Show => "Show",
            ColumnType::Signature => "Signature",
            ColumnType::Text => "Text",
            ColumnType::Thumbnail => "Thumbnail",
            ColumnType::Time => "Time",
            ColumnType::Url => "Url",
            ColumnType::Video => "Video",
            ColumnType::Xy => "XY",
            ColumnType::YesNo => "Yes/No",
            ColumnType::UniqueId => "UniqueID",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColumnType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::other(format!("Unknown column type: {}", s)))
    }
}

/// Column constraints
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct ColumnConstraints {
    pub required: Option<bool>,
    pub unique: Option<bool>,
    pub default_value: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub pattern: Option<String>,
    pub enum_values: Option<Vec<String>>,
    /// Target table of a Ref column
    pub ref_table_id: Option<String>,
    /// Column of the target table that holds the referenced key
    pub ref_column_id: Option<String>,
}

/// AppSheet column settings carried alongside the column definition
///
/// Only `AppFormula` is interpreted; every other key is kept as-is so that
/// saving a project writes back what the editor stored.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AppSheetSettings {
    /// Formula computing the column's value (a non-string value reads as none)
    #[cfg_attr(
        feature = "serde",
        serde(
            rename = "AppFormula",
            skip_serializing_if = "Option::is_none",
            deserialize_with = "formula_text"
        )
    )]
    pub app_formula: Option<String>,
    /// Settings this crate does not interpret (`Show_If`, `Editable_If`, ...)
    #[cfg(feature = "serde")]
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(feature = "serde")]
fn formula_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => Some(text),
        _ => None,
    })
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct Column {
    /// Column id (row values are keyed by this)
    pub id: String,
    /// Display name (formulas refer to columns by name)
    pub name: String,
    /// Declared type
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub column_type: ColumnType,
    /// Column is the table key
    pub is_key: bool,
    /// Column contributes to the row label
    pub is_label: bool,
    /// Column exists only as a computed value
    pub is_virtual: bool,
    pub description: Option<String>,
    pub app_sheet: AppSheetSettings,
    pub constraints: ColumnConstraints,
}

impl Column {
    /// Create a new column
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N, column_type: ColumnType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            column_type,
            ..Default::default()
        }
    }

    /// Mark the column as the table key
    pub fn with_key(mut self) -> Self {
        self.is_key = true;
        self
    }

    /// Mark the column as a label column
    pub fn with_label(mut self) -> Self {
        self.is_label = true;
        self
    }

    /// Mark the column as virtual
    pub fn with_virtual(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    /// Attach an AppFormula
    pub fn with_formula<S: Into<String>>(mut self, formula: S) -> Self {
        self.app_sheet.app_formula = Some(formula.into());
        self
    }

    /// Point this column at another table (the column type becomes `Ref`)
    pub fn with_ref<S: Into<String>>(mut self, table_id: S) -> Self {
        self.column_type = ColumnType::Ref;
        self.constraints.ref_table_id = Some(table_id.into());
        self
    }

    /// Match referenced rows on a specific column instead of the target key
    pub fn with_ref_column<S: Into<String>>(mut self, column_id: S) -> Self {
        self.constraints.ref_column_id = Some(column_id.into());
        self
    }

    /// The trimmed AppFormula, if the column has a non-empty one
    pub fn app_formula(&self) -> Option<&str> {
        self.app_sheet
            .app_formula
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
    }

    /// Check if this is a Ref column
    pub fn is_ref(&self) -> bool {
        self.column_type == ColumnType::Ref
    }

    /// Target table id of a Ref column
    pub fn ref_table_id(&self) -> Option<&str> {
        if !self.is_ref() {
            return None;
        }
        self.constraints
            .ref_table_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }
}
