use std::io::Write;

use indexmap::IndexSet;

use fixtura_core::FieldMap;

use crate::errors::FactoryError;
use crate::output::CountingWriter;

/// Writes records as CSV.
///
/// Columns are the union of top-level field names in first-seen order.
/// Nested lists and maps are JSON-encoded; missing and null cells are empty.
pub fn write_csv<W: Write>(writer: W, records: &[FieldMap]) -> Result<u64, FactoryError> {
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    let columns: IndexSet<&str> = records
        .iter()
        .flat_map(|record| record.keys().map(String::as_str))
        .collect();
    writer.write_record(&columns)?;

    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|column| {
                record
                    .get(*column)
                    .map(|value| value.to_display_string())
                    .unwrap_or_default()
            })
            .collect();
        writer.write_record(&row)?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}
