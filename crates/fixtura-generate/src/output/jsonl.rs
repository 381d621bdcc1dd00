use std::io::Write;

use fixtura_core::{FieldMap, fields_to_jsonable};

use crate::errors::FactoryError;
use crate::output::CountingWriter;

/// Writes one JSON object per line.
pub fn write_jsonl<W: Write>(writer: W, records: &[FieldMap]) -> Result<u64, FactoryError> {
    let mut writer = CountingWriter::new(writer);
    for record in records {
        serde_json::to_writer(&mut writer, &fields_to_jsonable(record))?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(writer.bytes_written())
}

/// Writes all records as one pretty-printed JSON array.
pub fn write_json_array<W: Write>(writer: W, records: &[FieldMap]) -> Result<u64, FactoryError> {
    let mut writer = CountingWriter::new(writer);
    let items: Vec<serde_json::Value> = records.iter().map(fields_to_jsonable).collect();
    serde_json::to_writer_pretty(&mut writer, &items)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(writer.bytes_written())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixtura_core::Value;

    #[test]
    fn one_line_per_record() {
        let records: Vec<FieldMap> = (1..=3)
            .map(|id| {
                let mut record = FieldMap::new();
                record.insert("id".to_string(), Value::Int(id));
                record
            })
            .collect();
        let mut buf = Vec::new();
        write_jsonl(&mut buf, &records).expect("write jsonl");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text, "{\"id\":1}\n{\"id\":2}\n{\"id\":3}\n");
    }
}
