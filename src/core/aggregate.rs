use crate::domain::model::{AggregateRow, AggregationSpec, KpiSpec, Record, Reducer, ValueSource};
use crate::utils::error::{PipelineError, Result};
use std::collections::HashMap;

/// Partition `records` by `spec.group_key` and reduce each partition.
///
/// Result rows come out in first-appearance order of the key, one per
/// distinct value present. An empty input yields an empty result. A missing
/// column or a non-numeric value under sum/mean is a fault, propagated
/// immediately rather than partially aggregated.
pub fn aggregate(records: &[Record], spec: &AggregationSpec) -> Result<Vec<AggregateRow>> {
    let mut order: Vec<String> = Vec::new();
    let mut partitions: HashMap<String, (f64, usize)> = HashMap::new();

    for record in records {
        let key = group_key(record, &spec.group_key)?;
        let value = match spec.reducer {
            // Count ignores the value source entirely.
            Reducer::Count => 0.0,
            Reducer::Sum | Reducer::Mean => extract_value(record, &spec.value)?,
        };

        let entry = partitions.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            (0.0, 0)
        });
        entry.0 += value;
        entry.1 += 1;
    }

    Ok(order
        .into_iter()
        .map(|key| {
            let (sum, count) = partitions[&key];
            let value = match spec.reducer {
                Reducer::Sum => sum,
                // Partitions only exist for at least one record, so the
                // divisor is never zero here.
                Reducer::Mean => sum / count as f64,
                Reducer::Count => count as f64,
            };
            AggregateRow { key, value }
        })
        .collect())
}

/// Scalar reduction over one column, used for the KPI widgets.
///
/// `Sum` of an empty set is 0, `Count` is 0, `Mean` is `None`.
pub fn reduce_kpi(records: &[Record], spec: &KpiSpec) -> Result<Option<f64>> {
    if spec.reducer == Reducer::Count {
        return Ok(Some(records.len() as f64));
    }

    let mut sum = 0.0;
    for record in records {
        sum += numeric_field(record, &spec.field)?;
    }

    Ok(match spec.reducer {
        Reducer::Sum => Some(sum),
        Reducer::Mean => {
            if records.is_empty() {
                None
            } else {
                Some(sum / records.len() as f64)
            }
        }
        Reducer::Count => unreachable!(),
    })
}

fn group_key(record: &Record, column: &str) -> Result<String> {
    match record.get(column) {
        Some(value) if !value.is_null() => Ok(value.to_string()),
        _ => Err(PipelineError::MissingColumn {
            column: column.to_string(),
        }),
    }
}

fn extract_value(record: &Record, source: &ValueSource) -> Result<f64> {
    match source {
        ValueSource::Field(field) => numeric_field(record, field),
        ValueSource::Ratio {
            numerator,
            denominator,
        } => {
            let num = numeric_field(record, numerator)?;
            let den = numeric_field(record, denominator)?;
            // Zero-divisor guard, applied per record: divide by 1 instead.
            Ok(if den == 0.0 { num } else { num / den })
        }
    }
}

fn numeric_field(record: &Record, field: &str) -> Result<f64> {
    let value = record.get(field).ok_or_else(|| PipelineError::MissingColumn {
        column: field.to_string(),
    })?;
    value.as_f64().ok_or_else(|| PipelineError::NonNumericValue {
        field: field.to_string(),
        sample: value.to_string(),
    })
}
