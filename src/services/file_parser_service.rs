/// Spreadsheet parser for product bulk uploads
/// Supports: CSV and Excel (XLSX/XLS); only the first sheet of a workbook is read

use std::io::Cursor;
use csv::ReaderBuilder;
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xls, Xlsx};
use sha2::{Digest, Sha256};
use crate::middleware::error_handling::{AppError, Result};
use crate::models::bulk_import::RawRow;

/// MIME types accepted for the `file` multipart field
pub const ACCEPTED_MIME_TYPES: [&str; 5] = [
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "text/csv",
    "application/csv",
    "text/x-csv",
];

// ============================================================================
// Public API Models
// ============================================================================

#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub file_type: FileType,
    pub file_hash: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub metadata: FileMetadata,
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub original_filename: String,
    pub file_size_bytes: usize,
    pub sheet_name: Option<String>,
    /// All-blank records; kept in `rows` so they still count toward the total
    pub blank_rows: usize,
    pub parsing_warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileType {
    Csv,
    Excel,
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileType::Csv => write!(f, "csv"),
            FileType::Excel => write!(f, "excel"),
        }
    }
}

impl ParsedFile {
    /// Pair every data row with the header row. Short rows are padded with
    /// blank cells; columns without a header are dropped.
    pub fn to_raw_rows(&self) -> Vec<RawRow> {
        self.rows
            .iter()
            .map(|cells| {
                let mut row = RawRow::new();
                for (idx, header) in self.headers.iter().enumerate() {
                    if header.is_empty() {
                        continue;
                    }
                    let value = cells.get(idx).map(String::as_str).unwrap_or("");
                    row.push(header.clone(), value);
                }
                row
            })
            .collect()
    }
}

// ============================================================================
// File Parser Service
// ============================================================================

pub struct FileParserService;

impl FileParserService {
    /// Whether an upload may be handed to `parse`: a spreadsheet/CSV MIME type,
    /// or a file name with a spreadsheet extension.
    pub fn is_accepted_upload(content_type: Option<&str>, filename: &str) -> bool {
        let mime_ok = content_type
            .map(|ct| {
                let essence = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
                ACCEPTED_MIME_TYPES.contains(&essence.as_str())
            })
            .unwrap_or(false);

        let filename_lower = filename.to_lowercase();
        mime_ok
            || filename_lower.ends_with(".csv")
            || filename_lower.ends_with(".xlsx")
            || filename_lower.ends_with(".xls")
    }

    /// Parse an uploaded spreadsheet
    pub fn parse(file_data: &[u8], filename: &str) -> Result<ParsedFile> {
        if file_data.is_empty() {
            return Err(AppError::InvalidInput("Uploaded file is empty.".to_string()));
        }

        let file_hash = Self::calculate_hash(file_data);
        let file_type = Self::detect_file_type(file_data, filename)?;

        tracing::info!(
            "Parsing file: {} ({} bytes, type: {}, sha256: {})",
            crate::utils::sanitize_for_log(filename),
            file_data.len(),
            file_type,
            &file_hash[..12]
        );

        let mut parsed = match file_type {
            FileType::Csv => Self::parse_csv(file_data, filename)?,
            FileType::Excel => Self::parse_excel(file_data, filename)?,
        };

        parsed.file_hash = file_hash;

        Ok(parsed)
    }

    /// Detect file type from magic bytes first, then the extension
    fn detect_file_type(data: &[u8], filename: &str) -> Result<FileType> {
        // XLSX is a ZIP container
        if data.starts_with(b"PK\x03\x04") {
            return Ok(FileType::Excel);
        }

        // XLS is an OLE compound document
        if data.starts_with(b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1") {
            return Ok(FileType::Excel);
        }

        let filename_lower = filename.to_lowercase();

        if filename_lower.ends_with(".xlsx") || filename_lower.ends_with(".xls") {
            return Ok(FileType::Excel);
        }

        if filename_lower.ends_with(".csv") || Self::is_likely_csv(data) {
            return Ok(FileType::Csv);
        }

        Err(AppError::InvalidInput(
            "Unsupported file format. Please upload CSV or Excel (XLSX/XLS) files.".to_string()
        ))
    }

    /// Consistent delimiter counts across the first lines
    fn is_likely_csv(data: &[u8]) -> bool {
        let Ok(text) = std::str::from_utf8(data) else {
            return false;
        };

        let first_lines: Vec<&str> = text.lines().take(5).collect();
        if first_lines.len() < 2 {
            return false;
        }

        [',', '\t', ';', '|'].iter().any(|delimiter| {
            let first_count = first_lines[0].matches(*delimiter).count();
            first_count > 0 && first_lines.iter().all(|line| line.matches(*delimiter).count() == first_count)
        })
    }

    fn parse_csv(data: &[u8], filename: &str) -> Result<ParsedFile> {
        let text = std::str::from_utf8(data)
            .map_err(|e| AppError::InvalidInput(format!("Invalid UTF-8 encoding: {}", e)))?;
        let text = text.trim_start_matches('\u{feff}');

        let delimiter = Self::detect_csv_delimiter(text);

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter as u8)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = match reader.headers() {
            Ok(h) => h.iter().map(|s| s.trim().to_string()).collect(),
            Err(e) => {
                return Err(AppError::InvalidInput(format!("Failed to read CSV headers: {}", e)));
            }
        };

        if headers.iter().all(|h| h.is_empty()) {
            return Err(AppError::InvalidInput(
                "CSV file has no headers. Please ensure first row contains column names.".to_string()
            ));
        }

        let mut rows = Vec::new();
        let mut blank_rows = 0;
        let mut warnings = Vec::new();

        for (idx, result) in reader.records().enumerate() {
            match result {
                Ok(record) => {
                    let row: Vec<String> = record.iter().map(|s| s.trim().to_string()).collect();

                    if row.iter().all(|s| s.is_empty()) {
                        blank_rows += 1;
                    } else if row.len() != headers.len() {
                        warnings.push(format!(
                            "Row {} has {} columns, expected {}",
                            idx + 2, // header row + 1-based
                            row.len(),
                            headers.len()
                        ));
                    }

                    rows.push(row);
                }
                Err(e) => {
                    warnings.push(format!("Row {} parsing error: {}", idx + 2, e));
                }
            }
        }

        if rows.is_empty() {
            return Err(AppError::InvalidInput("CSV file contains no data rows.".to_string()));
        }

        tracing::info!(
            "Parsed CSV: {} rows ({} blank), {} columns",
            rows.len(),
            blank_rows,
            headers.len()
        );

        Ok(ParsedFile {
            file_type: FileType::Csv,
            file_hash: String::new(),
            headers: Self::dedupe_headers(headers),
            rows,
            metadata: FileMetadata {
                original_filename: filename.to_string(),
                file_size_bytes: data.len(),
                sheet_name: None,
                blank_rows,
                parsing_warnings: warnings,
            },
        })
    }

    /// Pick the delimiter that occurs most often in the header line
    fn detect_csv_delimiter(text: &str) -> char {
        let first_line = text.lines().next().unwrap_or("");

        [',', '\t', ';', '|']
            .into_iter()
            .map(|delimiter| (delimiter, first_line.matches(delimiter).count()))
            .fold((',', 0), |best, candidate| if candidate.1 > best.1 { candidate } else { best })
            .0
    }

    fn parse_excel(data: &[u8], filename: &str) -> Result<ParsedFile> {
        let prefer_xls = filename.to_lowercase().ends_with(".xls");

        let (sheet_name, range) = if prefer_xls {
            Self::first_sheet_xls(data).or_else(|_| Self::first_sheet_xlsx(data))?
        } else {
            Self::first_sheet_xlsx(data).or_else(|_| Self::first_sheet_xls(data))?
        };

        let mut rows_iter = range.rows();

        let headers: Vec<String> = match rows_iter.next() {
            Some(header_row) => header_row.iter().map(Self::cell_to_string).collect(),
            None => {
                return Err(AppError::InvalidInput("Excel sheet is empty.".to_string()));
            }
        };

        if headers.iter().all(|h| h.is_empty()) {
            return Err(AppError::InvalidInput("Excel file has no headers in first row.".to_string()));
        }

        let mut rows = Vec::new();
        let mut blank_rows = 0;

        for row in rows_iter {
            let row_data: Vec<String> = row.iter().map(Self::cell_to_string).collect();

            if row_data.iter().all(|s| s.is_empty()) {
                blank_rows += 1;
            }

            rows.push(row_data);
        }

        if rows.is_empty() {
            return Err(AppError::InvalidInput("Excel file contains no data rows.".to_string()));
        }

        tracing::info!(
            "Parsed Excel sheet '{}': {} rows ({} blank), {} columns",
            crate::utils::sanitize_for_log(&sheet_name),
            rows.len(),
            blank_rows,
            headers.len()
        );

        Ok(ParsedFile {
            file_type: FileType::Excel,
            file_hash: String::new(),
            headers: Self::dedupe_headers(headers),
            rows,
            metadata: FileMetadata {
                original_filename: filename.to_string(),
                file_size_bytes: data.len(),
                sheet_name: Some(sheet_name),
                blank_rows,
                parsing_warnings: Vec::new(),
            },
        })
    }

    fn first_sheet_xlsx(data: &[u8]) -> Result<(String, Range<Data>)> {
        let mut workbook = open_workbook_from_rs::<Xlsx<_>, _>(Cursor::new(data))
            .map_err(|e| AppError::InvalidInput(format!("Failed to open Excel file: {}", e)))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| AppError::InvalidInput("Excel file contains no sheets.".to_string()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| AppError::InvalidInput(format!("Failed to parse sheet {}: {}", sheet_name, e)))?;

        Ok((sheet_name, range))
    }

    fn first_sheet_xls(data: &[u8]) -> Result<(String, Range<Data>)> {
        let mut workbook = open_workbook_from_rs::<Xls<_>, _>(Cursor::new(data))
            .map_err(|e| AppError::InvalidInput(format!("Failed to open Excel file: {}", e)))?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| AppError::InvalidInput("Excel file contains no sheets.".to_string()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| AppError::InvalidInput(format!("Failed to parse sheet {}: {}", sheet_name, e)))?;

        Ok((sheet_name, range))
    }

    /// Convert an Excel cell to text; whole floats lose their ".0"
    fn cell_to_string(cell: &Data) -> String {
        match cell {
            Data::Int(i) => i.to_string(),
            Data::Float(f) => {
                let s = format!("{}", f);
                if s.contains('.') {
                    s.trim_end_matches('0').trim_end_matches('.').to_string()
                } else {
                    s
                }
            }
            Data::String(s) => s.trim().to_string(),
            Data::Bool(b) => b.to_string(),
            Data::DateTime(dt) => format!("{}", dt),
            Data::DateTimeIso(s) => s.clone(),
            Data::DurationIso(s) => s.clone(),
            Data::Error(e) => format!("ERROR: {:?}", e),
            Data::Empty => String::new(),
        }
    }

    /// Repeated header names get `_1`, `_2`, ... so no column is lost
    fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
        let mut seen: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

        headers
            .into_iter()
            .map(|header| {
                if header.is_empty() {
                    return header;
                }
                let count = seen.entry(header.clone()).or_insert(0);
                let unique = if *count == 0 {
                    header
                } else {
                    format!("{}_{}", header, count)
                };
                *count += 1;
                unique
            })
            .collect()
    }

    fn calculate_hash(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }
}
