//! Tabular Records
//!
//! A dataset is an ordered list of records; each record is an ordered map of
//! named columns to JSON values. Column order follows first insertion.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FrameError, FrameResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(column.into(), value.into());
    }

    /// Read a column as message text.
    ///
    /// Strings are returned verbatim, numbers and booleans in their JSON form.
    /// Missing, null, array and object values cannot be rendered.
    pub fn text(&self, column: &str) -> FrameResult<String> {
        match self.0.get(column) {
            None => Err(FrameError::invalid_input(column, "column is missing")),
            Some(Value::Null) => Err(FrameError::invalid_input(column, "value is null")),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            Some(Value::Array(_)) | Some(Value::Object(_)) => Err(FrameError::invalid_input(
                column,
                "value is not a scalar",
            )),
        }
    }

}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Ordered collection of records; iteration order is the dataset order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Column values as text, in record order.
    pub fn column_text(&self, column: &str) -> FrameResult<Vec<String>> {
        self.records.iter().map(|r| r.text(column)).collect()
    }

    /// Parse newline-delimited JSON objects. Blank lines are skipped.
    ///
    /// Malformed lines report their 1-based line number.
    pub fn from_json_lines<R: BufRead>(reader: R) -> FrameResult<Self> {
        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let invalid = |reason: String| FrameError::InvalidDataset { line: idx + 1, reason };
            match serde_json::from_str::<Value>(&line).map_err(|e| invalid(e.to_string()))? {
                Value::Object(map) => records.push(Record(map)),
                _ => return Err(invalid("expected a JSON object".to_string())),
            }
        }
        Ok(Self { records })
    }

    /// Parse a JSON array of objects.
    pub fn from_json_array(text: &str) -> FrameResult<Self> {
        let records: Vec<Record> = serde_json::from_str(text)?;
        Ok(Self { records })
    }

    pub fn write_json_lines<W: Write>(&self, mut writer: W) -> FrameResult<()> {
        for record in &self.records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_conversion() {
        let record = Record::new()
            .with("s", "hello")
            .with("n", 42)
            .with("b", true)
            .with("null", Value::Null)
            .with("arr", json!([1, 2]));

        assert_eq!(record.text("s").unwrap(), "hello");
        assert_eq!(record.text("n").unwrap(), "42");
        assert_eq!(record.text("b").unwrap(), "true");
        assert!(matches!(record.text("null"), Err(FrameError::InvalidInput { .. })));
        assert!(matches!(record.text("arr"), Err(FrameError::InvalidInput { .. })));
        assert!(matches!(record.text("missing"), Err(FrameError::InvalidInput { .. })));
    }

    #[test]
    fn test_json_lines_round_trip_keeps_order() {
        let input = "{\"review\":\"bad\",\"id\":\"a\"}\n\n{\"review\":\"great\",\"id\":\"b\"}\n";
        let dataset = Dataset::from_json_lines(input.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.column_text("id").unwrap(), vec!["a", "b"]);

        let mut out = Vec::new();
        dataset.write_json_lines(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"review\":\"bad\",\"id\":\"a\"}\n{\"review\":\"great\",\"id\":\"b\"}\n"
        );
    }

    #[test]
    fn test_json_lines_rejects_non_object() {
        let err = Dataset::from_json_lines("{\"a\": 1}\n\n[1,2]\n".as_bytes()).unwrap_err();
        assert!(matches!(err, FrameError::InvalidDataset { line: 3, ref reason } if reason.contains("object")));

        let err = Dataset::from_json_lines("{\"a\": 1}\n{\"a\":\n".as_bytes()).unwrap_err();
        assert!(matches!(err, FrameError::InvalidDataset { line: 2, .. }));
    }

    #[test]
    fn test_from_json_array() {
        let dataset = Dataset::from_json_array(r#"[{"a": 1}, {"a": 2}]"#).unwrap();
        assert_eq!(dataset.column_text("a").unwrap(), vec!["1", "2"]);
    }
}
