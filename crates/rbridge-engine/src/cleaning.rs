//! Clinical visit data cleaning helpers

use rbridge_core::{Column, Table, TableError};
use std::collections::{HashMap, HashSet};

/// Name of the column added by [`set_plot_indication`]
pub const PLOT_INDICATION_COLUMN: &str = "Plot_Indication";

#[derive(Debug, thiserror::Error)]
pub enum CleaningError {
    #[error("Column not found: {0}")]
    MissingColumn(String),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Columns used by [`correct_time_points`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimePointColumns {
    pub patient_id: String,
    pub visit_name: String,
    pub treatment_category: String,
}

impl Default for TimePointColumns {
    fn default() -> Self {
        Self {
            patient_id: "Patient_ID".to_string(),
            visit_name: "Visit_name".to_string(),
            treatment_category: "Treatment_Category".to_string(),
        }
    }
}

/// Treatment phase inferred from a visit name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Phase {
    Pre,
    On,
    End,
}

impl Phase {
    fn from_visit(visit: &str) -> Option<Self> {
        match visit {
            "C1D1" | "SCREENING" => Some(Self::Pre),
            "C2D1" | "C3D1" => Some(Self::On),
            "EOT" => Some(Self::End),
            _ => None,
        }
    }

    fn from_category(category: &str) -> Option<Self> {
        match category {
            "Pre" => Some(Self::Pre),
            "On" => Some(Self::On),
            "End" => Some(Self::End),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pre => "Pre",
            Self::On => "On",
            Self::End => "End",
        }
    }
}

/// Fill missing treatment categories from visit names, per patient
///
/// A `"NA"` category counts as missing. A missing category is set to
/// `Pre` for `C1D1`/`SCREENING`, `On` for `C2D1`/`C3D1` and `End` for `EOT`,
/// but only when no row of the same patient already carries that category.
/// Existing categories are kept, row order is preserved, and rows without a
/// patient id are left as they are.
pub fn correct_time_points(
    table: &Table,
    columns: &TimePointColumns,
) -> Result<Table, CleaningError> {
    let patients = text_values(table, &columns.patient_id)?;
    let visits = text_values(table, &columns.visit_name)?;
    let mut categories: Vec<Option<String>> = text_values(table, &columns.treatment_category)?
        .into_iter()
        .map(|c| c.filter(|c| c != "NA"))
        .collect();

    let mut assigned: HashMap<&str, HashSet<Phase>> = HashMap::new();
    for (patient, category) in patients.iter().zip(&categories) {
        if let (Some(patient), Some(phase)) = (
            patient.as_deref(),
            category.as_deref().and_then(Phase::from_category),
        ) {
            assigned.entry(patient).or_default().insert(phase);
        }
    }

    for (row, category) in categories.iter_mut().enumerate() {
        if category.is_some() || patients[row].is_none() {
            continue;
        }
        let phase = visits[row].as_deref().and_then(Phase::from_visit);
        let taken = patients[row]
            .as_deref()
            .and_then(|p| assigned.get(p))
            .is_some_and(|phases| phase.is_some_and(|ph| phases.contains(&ph)));

        if let (Some(phase), false) = (phase, taken) {
            *category = Some(phase.label().to_string());
        }
    }

    Ok(table.with_column(Column::string(
        columns.treatment_category.clone(),
        categories,
    ))?)
}

/// Add or replace the `Plot_Indication` column by mapping `column` through `mapping`
///
/// Missing or unmapped values get `default`.
pub fn set_plot_indication(
    table: &Table,
    mapping: &HashMap<String, String>,
    column: &str,
    default: &str,
) -> Result<Table, CleaningError> {
    let values = text_values(table, column)?
        .into_iter()
        .map(|v| {
            let mapped = v.and_then(|v| mapping.get(&v).cloned());
            Some(mapped.unwrap_or_else(|| default.to_string()))
        })
        .collect::<Vec<_>>();

    Ok(table.with_column(Column::string(PLOT_INDICATION_COLUMN, values))?)
}

fn text_values(table: &Table, name: &str) -> Result<Vec<Option<String>>, CleaningError> {
    let column = table
        .column(name)
        .ok_or_else(|| CleaningError::MissingColumn(name.to_string()))?;
    Ok(column.values().iter().map(|v| v.render()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rbridge_core::Value;

    fn visits() -> Table {
        Table::from_columns(vec![
            Column::string(
                "Patient_ID",
                vec![Some("P1"), Some("P1"), Some("P2"), Some("P1"), Some("P2"), None],
            ),
            Column::string(
                "Visit_name",
                vec![
                    Some("SCREENING"),
                    Some("C2D1"),
                    Some("C1D1"),
                    Some("EOT"),
                    Some("C3D1"),
                    Some("C1D1"),
                ],
            ),
            Column::string(
                "Treatment_Category",
                vec![Some("NA"), None, Some("Pre"), None, Some("NA"), None],
            ),
        ])
        .unwrap()
    }

    fn categories(table: &Table) -> Vec<Value> {
        table.column("Treatment_Category").unwrap().values()
    }

    #[test]
    fn fills_categories_per_patient() {
        let corrected = correct_time_points(&visits(), &TimePointColumns::default()).unwrap();

        assert_eq!(
            categories(&corrected),
            vec![
                Value::Str("Pre".into()),
                Value::Str("On".into()),
                Value::Str("Pre".into()),
                Value::Str("End".into()),
                Value::Str("On".into()),
                Value::Missing,
            ]
        );
    }

    #[test]
    fn existing_category_blocks_reassignment() {
        let table = Table::from_columns(vec![
            Column::string("Patient_ID", vec![Some("P1"), Some("P1")]),
            Column::string("Visit_name", vec![Some("SCREENING"), Some("C1D1")]),
            Column::string("Treatment_Category", vec![None, Some("Pre")]),
        ])
        .unwrap();

        let corrected = correct_time_points(&table, &TimePointColumns::default()).unwrap();
        assert_eq!(
            categories(&corrected),
            vec![Value::Missing, Value::Str("Pre".into())]
        );
    }

    #[test]
    fn missing_column_is_reported() {
        let columns = TimePointColumns {
            visit_name: "Visit".to_string(),
            ..TimePointColumns::default()
        };

        let err = correct_time_points(&visits(), &columns).unwrap_err();
        assert!(matches!(err, CleaningError::MissingColumn(name) if name == "Visit"));
    }

    #[test]
    fn plot_indication_uses_mapping_and_default() {
        let table = Table::from_columns(vec![Column::string(
            "Indication",
            vec![Some("LUNG"), Some("SKIN"), None],
        )])
        .unwrap();
        let mapping = HashMap::from([("LUNG".to_string(), "NSCLC".to_string())]);

        let result = set_plot_indication(&table, &mapping, "Indication", "OTHER").unwrap();

        assert_eq!(result.n_cols(), 2);
        assert_eq!(
            result.column(PLOT_INDICATION_COLUMN).unwrap().values(),
            vec![
                Value::Str("NSCLC".into()),
                Value::Str("OTHER".into()),
                Value::Str("OTHER".into()),
            ]
        );
    }
}
