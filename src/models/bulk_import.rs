use serde::ser::{Serialize, SerializeMap, Serializer};

/// One spreadsheet record: `(header, cell)` pairs in column order.
///
/// Cells are kept as text exactly as the parser produced them; blank cells are
/// empty strings. Serializes as a JSON object so failed rows can be echoed
/// back to the admin unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn push(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.cells.push((header.into(), value.into()));
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(h, _)| h.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every cell is blank after trimming (or there are no cells).
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.trim().is_empty())
    }
}

impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (header, value) in &self.cells {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ImportSuccess {
    pub name: String,
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ImportFailure {
    pub row: RawRow,
    pub error: String,
}

/// Outcome of one bulk import run. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub success_list: Vec<ImportSuccess>,
    pub failed_list: Vec<ImportFailure>,
}

impl ImportResult {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record_success(&mut self, name: String, id: i64) {
        self.success_list.push(ImportSuccess { name, id });
        self.successful = self.success_list.len();
    }

    pub fn record_failure(&mut self, row: RawRow, error: impl Into<String>) {
        self.failed_list.push(ImportFailure {
            row,
            error: error.into(),
        });
        self.failed = self.failed_list.len();
    }
}

#[derive(Debug, serde::Serialize)]
pub struct BulkUploadResponse {
    pub message: String,
    pub results: ImportResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_row_serializes_in_column_order() {
        let row = RawRow::from_pairs([("Products", "Widget"), ("Price", "₹1,999.00")]);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"Products":"Widget","Price":"₹1,999.00"}"#);
    }

    #[test]
    fn test_blank_row_detection() {
        assert!(RawRow::from_pairs([("Name", "  "), ("Price", "")]).is_blank());
        assert!(!RawRow::from_pairs([("Name", ""), ("Price", "10")]).is_blank());
    }

    #[test]
    fn test_import_result_wire_shape() {
        let mut result = ImportResult::new(2);
        result.record_success("Widget".to_string(), 1);
        result.record_failure(RawRow::from_pairs([("Price", "0")]), "Missing price");

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "total": 2,
                "successful": 1,
                "failed": 1,
                "successList": [{"name": "Widget", "id": 1}],
                "failedList": [{"row": {"Price": "0"}, "error": "Missing price"}],
            })
        );
    }
}
