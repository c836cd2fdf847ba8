use tracing::debug;

use super::predicate::Predicate;
use crate::{
    DatabaseError,
    binding::{Entity, materialize},
    db::table::{Table, record::Record},
};

/// Checks that `predicate` can be applied to `column` of `table`.
///
/// The column must exist and its declared type must equal the predicate's
/// input type.
pub(crate) fn validate(
    table: &Table,
    column: &str,
    predicate: &Predicate<'_>,
) -> Result<(), DatabaseError> {
    let expected = table
        .schema()
        .data_type(column)
        .ok_or_else(|| DatabaseError::ColumnNotFound {
            table: table.name().to_owned(),
            column: column.to_owned(),
        })?;

    if expected != predicate.input_type() {
        return Err(DatabaseError::TypeMismatch {
            table: table.name().to_owned(),
            column: column.to_owned(),
            expected,
            found: predicate.input_type(),
        });
    }

    debug!(table = table.name(), column, ?predicate, "predicate is valid");
    Ok(())
}

/// Yields the records whose `column` satisfies `predicate`, in table order.
pub(crate) fn scan<'t>(
    table: &'t Table,
    column: &str,
    predicate: &Predicate<'_>,
) -> impl Iterator<Item = &'t Record> {
    table
        .records()
        .iter()
        .filter(move |record| record.get(column).is_some_and(|value| predicate.test(value)))
}

/// Validates, scans, and appends every match to `dst` as a `T`.
///
/// Existing contents of `dst` are kept ahead of the matches. Returns the
/// number of records appended.
pub(crate) fn filter_into<T: Entity>(
    table: &Table,
    column: &str,
    predicate: &Predicate<'_>,
    dst: &mut Vec<T>,
) -> Result<usize, DatabaseError> {
    validate(table, column, predicate)?;

    let bindings = T::bindings();
    bindings.check(table.name(), table.schema())?;

    let before = dst.len();
    dst.extend(scan(table, column, predicate).map(|record| materialize(&bindings, record)));

    let matched = dst.len() - before;
    debug!(table = table.name(), column, matched, scanned = table.len(), "filter done");
    Ok(matched)
}
