//! Group reconciliation for the clean pass.
//!
//! A reviewer marks rows that belong together by typing the same key in the
//! `group` column. Reconciliation merges each group into one row whose
//! `disclosure` is the members' text concatenated with no separator, keeps
//! every ungrouped row, and clears `group` everywhere.
//!
//! Each surviving row sits at the position of its earliest contributor, so a
//! single pass over the combined sequence produces the output in order.

use crate::types::{GroupKey, SheetRow};
use std::collections::HashMap;

/// Row counts of one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ReconcileSummary {
    /// Rows read from the workbook
    pub input_rows: usize,
    /// Rows without a group key
    pub ungrouped: usize,
    /// Distinct group keys
    pub groups: usize,
    /// Rows after merging (`ungrouped + groups`)
    pub output_rows: usize,
}

/// Output of [`reconcile`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    pub rows: Vec<SheetRow>,
    pub summary: ReconcileSummary,
}

/// Merge grouped rows of the combined sheet sequence.
///
/// For each distinct key, the first row encountered keeps its `source`,
/// `year`, `page` and `table_data`; the `disclosure` of every member, in
/// sequence order, is appended to it. A member without `disclosure`
/// contributes nothing.
#[must_use = "returns the reconciled rows"]
pub fn reconcile(rows: Vec<SheetRow>) -> Reconciled {
    let input_rows = rows.len();
    let mut output: Vec<SheetRow> = Vec::with_capacity(input_rows);
    let mut slots: HashMap<GroupKey, usize> = HashMap::new();
    let mut ungrouped = 0;

    for mut row in rows {
        let Some(key) = row.group.take() else {
            ungrouped += 1;
            output.push(row);
            continue;
        };

        if let Some(&slot) = slots.get(&key) {
            if let Some(text) = row.disclosure {
                output[slot]
                    .disclosure
                    .get_or_insert_with(String::new)
                    .push_str(&text);
            }
        } else {
            slots.insert(key, output.len());
            output.push(row);
        }
    }

    let summary = ReconcileSummary {
        input_rows,
        ungrouped,
        groups: slots.len(),
        output_rows: output.len(),
    };
    log::info!(
        "Reconciled {} rows: {} ungrouped, {} groups, {} rows out",
        summary.input_rows,
        summary.ungrouped,
        summary.groups,
        summary.output_rows
    );

    Reconciled {
        rows: output,
        summary,
    }
}
