//! Writing engine output back into the relation.

use std::collections::BTreeSet;

use crate::engine::AnonymizationResult;
use crate::error::{FlashError, Result};
use crate::relation::{Attribute, Relation, Value};

/// Rewrite the generalized quasi-identifiers of `original`.
///
/// Every quasi-identifier with a selected level above zero becomes a nominal
/// attribute whose domain is the sorted set of distinct output values, and
/// its cells take the engine's values. Level-zero quasi-identifiers and all
/// other attributes are copied unchanged. The result is built on a copy, so
/// `original` is untouched when an error is returned.
pub fn reconcile(
    original: &Relation,
    result: &AnonymizationResult,
    qi_names: &[String],
) -> Result<Relation> {
    let output = &result.output;
    if output.row_count() != original.row_count() {
        return Err(FlashError::EngineOutputShape(format!(
            "expected {} rows, engine returned {}",
            original.row_count(),
            output.row_count()
        )));
    }

    let mut reconciled = original.clone();

    for name in qi_names {
        if result.level(name) == 0 {
            continue;
        }

        let index = original
            .attribute_index(name)
            .ok_or_else(|| FlashError::UnknownAttribute(name.clone()))?;
        let values: Vec<&str> = output
            .column(name)
            .ok_or_else(|| {
                FlashError::EngineOutputShape(format!("missing column \"{}\"", name))
            })?
            .collect();

        let domain: BTreeSet<&str> = values.iter().copied().collect();
        reconciled.replace_attribute(index, Attribute::nominal(name.clone(), domain));

        for (row, value) in values.into_iter().enumerate() {
            reconciled.set_value(row, index, Value::text(value));
        }
    }

    Ok(reconciled)
}
