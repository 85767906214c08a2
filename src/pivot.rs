//! Pivot of sparse form answers into one record per respondent.
//!
//! The backing store keeps respondent attributes as `(user_id, field_name_id,
//! value)` rows. A [`PivotQuery`] names the fields worth tracking and renders
//! the conditional-aggregate SQL that turns those rows into columns.
//! [`pivot_rows`] performs the same reduction in memory.

use crate::config::QuerySettings;
use chrono::NaiveDateTime;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// A tracked attribute: the `field_names.name` to look for and the output key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotField {
    pub source: String,
    pub label: String,
}

impl PivotField {
    pub fn new(source: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            label: label.into(),
        }
    }

    /// A field whose output key is its source name.
    pub fn same(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source: name.clone(),
            label: name,
        }
    }
}

/// The fixed aggregation run by both binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotQuery {
    pub schema: String,
    pub form_id: i64,
    pub fields: Vec<PivotField>,
}

impl PivotQuery {
    pub fn new(settings: &QuerySettings, fields: Vec<PivotField>) -> Self {
        Self {
            schema: settings.schema.clone(),
            form_id: settings.form_id,
            fields,
        }
    }

    /// Fields published by the snapshot script.
    pub fn snapshot(settings: &QuerySettings) -> Self {
        Self::new(
            settings,
            vec![
                PivotField::same("Title"),
                PivotField::same("Institution / Organization"),
            ],
        )
    }

    /// Fields served by `GET /signatures`.
    pub fn service(settings: &QuerySettings) -> Self {
        Self::new(
            settings,
            vec![
                PivotField::new("EPA_Supporter_Type", "Supporter Type"),
                PivotField::new("EPA_Professional_Position", "Professional Position"),
                PivotField::new("EPA_Professional_Category", "Professional Category"),
                PivotField::same("Title"),
                PivotField::same("Institution / Organization"),
                PivotField::new("EPA_Notable", "Notable"),
            ],
        )
    }

    /// Output keys in column order, excluding the name columns.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.label.as_str())
    }

    /// Renders the pivot as a single `GROUP BY` query.
    ///
    /// Columns: `first_name`, `last_name`, then one per field, in order.
    /// `MAX` keeps at most one value per respondent and field.
    pub fn to_sql(&self) -> String {
        let schema = quote_ident(&self.schema);

        let mut columns = vec![
            "    a.first_name".to_string(),
            "    a.last_name".to_string(),
        ];
        columns.extend(self.fields.iter().map(|field| {
            format!(
                "    MAX(CASE WHEN fn.name = {} THEN fv.value END) AS {}",
                quote_literal(&field.source),
                quote_ident(&field.label)
            )
        }));

        format!(
            "SELECT\n{columns}\n\
             FROM {schema}.answers a\n\
             LEFT JOIN {schema}.field_values fv ON a.user_id = fv.user_id\n\
             LEFT JOIN {schema}.field_names fn ON fv.field_name_id = fn.id\n\
             WHERE a.form_id = {form_id}\n\
             GROUP BY a.id, a.first_name, a.last_name, a.created_at\n\
             ORDER BY a.created_at DESC",
            columns = columns.join(",\n"),
            form_id = self.form_id,
        )
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// One respondent, with every tracked attribute present (possibly null).
///
/// Serializes as a JSON object keyed `first_name`, `last_name`, then each
/// attribute label, in that order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureRecord {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub attributes: Vec<(String, Option<String>)>,
}

impl SignatureRecord {
    /// Returns the value for `label`, or `None` if absent or null.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == label)
            .and_then(|(_, value)| value.as_deref())
    }
}

impl Serialize for SignatureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.attributes.len()))?;
        map.serialize_entry("first_name", &self.first_name)?;
        map.serialize_entry("last_name", &self.last_name)?;
        for (label, value) in &self.attributes {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// A row of the `answers` table.
#[derive(Debug, Clone)]
pub struct AnswerRow {
    pub id: i64,
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: NaiveDateTime,
    pub form_id: i64,
}

/// A row of the `field_values` table.
#[derive(Debug, Clone)]
pub struct FieldValueRow {
    pub user_id: i64,
    pub field_name_id: i64,
    pub value: Option<String>,
}

/// A row of the `field_names` table.
#[derive(Debug, Clone)]
pub struct FieldNameRow {
    pub id: i64,
    pub name: String,
}

/// In-memory equivalent of [`PivotQuery::to_sql`].
///
/// Pass one groups attribute values by user, keeping the maximum value per
/// field name. Pass two folds each matching answer into a dense record.
/// Ties in `created_at` keep input order.
pub fn pivot_rows(
    answers: &[AnswerRow],
    values: &[FieldValueRow],
    names: &[FieldNameRow],
    query: &PivotQuery,
) -> Vec<SignatureRecord> {
    let name_by_id: HashMap<i64, &str> = names.iter().map(|n| (n.id, n.name.as_str())).collect();

    let mut by_user: HashMap<i64, HashMap<&str, &str>> = HashMap::new();
    for row in values {
        let (Some(name), Some(value)) = (name_by_id.get(&row.field_name_id), &row.value) else {
            continue;
        };
        let value = value.as_str();
        let slot = by_user
            .entry(row.user_id)
            .or_default()
            .entry(*name)
            .or_insert(value);
        if value > *slot {
            *slot = value;
        }
    }

    let mut matching: Vec<&AnswerRow> = answers
        .iter()
        .filter(|a| a.form_id == query.form_id)
        .collect();
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    matching
        .into_iter()
        .map(|answer| {
            let found = by_user.get(&answer.user_id);
            let attributes = query
                .fields
                .iter()
                .map(|field| {
                    let value = found
                        .and_then(|m| m.get(field.source.as_str()))
                        .map(|v| v.to_string());
                    (field.label.clone(), value)
                })
                .collect();

            SignatureRecord {
                first_name: answer.first_name.clone(),
                last_name: answer.last_name.clone(),
                attributes,
            }
        })
        .collect()
}
