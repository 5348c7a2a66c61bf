use crate::error::ChartError;
use crate::index::PositionIndex;

/// Stand-in value for an empty cell.
///
/// Marks a missing required field or an indicator that isn't calculated yet for the
/// leading rows. Anything strictly greater is real data, see [`is_valid`].
pub const SENTINEL: f64 = -1e6;

/// Returns `true` if `value` holds real data rather than the sentinel.
///
/// Plain ordering comparison: the sentinel itself and NaN are both rejected.
#[inline]
pub fn is_valid(value: f64) -> bool {
    value > SENTINEL
}

/// A named, ordered sequence of samples, one per data row.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    samples: Vec<f64>,
}

impl Column {
    fn new(name: &str) -> Self {
        Column {
            name: name.to_string(),
            samples: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Raw sample at `row`, sentinel included.
    pub fn get(&self, row: usize) -> Option<f64> {
        self.samples.get(row).copied()
    }

    /// Sample at `row` if it holds real data.
    pub fn valid(&self, row: usize) -> Option<f64> {
        self.get(row).filter(|v| is_valid(*v))
    }
}

/// In-memory columnar table parsed from a header-first, comma-separated text file.
///
/// Every column holds exactly one sample per processed data row. The store is rebuilt
/// from scratch on each load; nothing from a previous file survives.
#[derive(Debug, Default)]
pub struct ColumnStore {
    columns: std::collections::HashMap<String, Column>,
    index: PositionIndex,
    rows: usize,
}

impl ColumnStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `raw_text` into the store, replacing whatever was loaded before.
    ///
    /// The first line is the header; if it is empty the table has no columns. Each later
    /// non-blank line contributes one sample to every header column: the parsed number,
    /// or [`SENTINEL`] when the token is empty or absent (short row). Tokens beyond the
    /// header width are ignored.
    ///
    /// # Errors
    /// * `ChartError::DuplicateColumn` if the header repeats a name.
    /// * `ChartError::InvalidNumericToken` on the first non-empty token that is not a number.
    /// * `ChartError::Csv` if the underlying reader fails.
    ///
    /// On error the store is left empty.
    pub fn load(&mut self, raw_text: &str) -> Result<(), ChartError> {
        self.clear();

        let (index, columns, rows) = parse_table(raw_text)?;
        self.columns = columns
            .into_iter()
            .map(|column| (column.name.clone(), column))
            .collect();
        self.index = index;
        self.rows = rows;

        tracing::debug!(rows, columns = self.index.len(), "csv table loaded");
        Ok(())
    }

    /// Reads the file at `path` and loads it, see [`ColumnStore::load`].
    ///
    /// # Errors
    /// * `ChartError::FileUnreadable` if the file can't be opened or isn't UTF-8.
    pub fn load_file<P: AsRef<std::path::Path>>(&mut self, path: P) -> Result<(), ChartError> {
        self.clear();
        let raw = read_table_text(path)?;
        self.load(&raw)
    }

    /// Exact-name column lookup against the most recent header.
    pub fn get(&self, name: &str) -> Result<&Column, ChartError> {
        self.columns
            .get(name)
            .ok_or_else(|| ChartError::UnknownColumn(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Number of data rows processed by the last load.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Column names in header order.
    pub fn column_names(&self) -> Vec<&str> {
        self.index.iter().map(|(_, name)| name).collect()
    }

    pub fn positions(&self) -> &PositionIndex {
        &self.index
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn clear(&mut self) {
        self.columns.clear();
        self.index.clear();
        self.rows = 0;
    }
}

/// Reads a whole table file into memory.
pub fn read_table_text<P: AsRef<std::path::Path>>(path: P) -> Result<String, ChartError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| ChartError::FileUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Reader for the data rows: `\n`-terminated, comma-separated, no quoting, rows of
/// any width. Only `\n` ends a line; CRLF input is not supported and a `\r` stays
/// part of the last token of its line.
fn table_reader(rows_text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_reader(rows_text.as_bytes())
}

fn parse_table(raw_text: &str) -> Result<(PositionIndex, Vec<Column>, usize), ChartError> {
    // the first physical line is the header, even when it is empty
    let (header, rows_text) = raw_text.split_once('\n').unwrap_or((raw_text, ""));
    let index = PositionIndex::from_header(header.split(','))?;
    if index.is_empty() {
        return Ok((index, Vec::new(), 0));
    }

    let mut columns: Vec<Column> = index.iter().map(|(_, name)| Column::new(name)).collect();
    let mut rows = 0usize;
    let mut reader = table_reader(rows_text);

    for result in reader.records() {
        let record = result?;
        let offset = record.position().map_or(0, |p| p.byte() as usize);

        for (column, (position, _)) in columns.iter_mut().zip(index.iter()) {
            let token = record.get(position).unwrap_or("");
            let value = parse_token(token).ok_or_else(|| {
                let line = file_line(rows_text, offset);
                tracing::warn!(line, column = %column.name, token, "rejecting non-numeric cell");
                ChartError::InvalidNumericToken {
                    line,
                    column: column.name.clone(),
                    token: token.to_string(),
                }
            })?;
            column.samples.push(value);
        }
        rows += 1;
    }

    Ok((index, columns, rows))
}

/// 1-based file line of the record the reader reported at byte `offset` of the data
/// section. The reader skips blank lines without counting them, so any `\n`s right at
/// `offset` belong to skipped lines and are added too.
fn file_line(rows_text: &str, offset: usize) -> u64 {
    let bytes = rows_text.as_bytes();
    let offset = offset.min(bytes.len());
    let before = bytes[..offset].iter().filter(|b| **b == b'\n').count();
    let blank = bytes[offset..].iter().take_while(|b| **b == b'\n').count();
    // +2: 1-based, and the header occupies line 1
    (before + blank + 2) as u64
}

/// Empty token ⇒ sentinel; otherwise the token, trimmed of surrounding ASCII
/// whitespace, must parse as `f64`. `None` means the token is not a number.
fn parse_token(token: &str) -> Option<f64> {
    if token.is_empty() {
        return Some(SENTINEL);
    }
    token.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HEADER: &str = "timestamp,price_open,price_high,price_low,price_close,volume,sma9\n";

    fn loaded(raw: &str) -> ColumnStore {
        let mut store = ColumnStore::new();
        store.load(raw).unwrap();
        store
    }

    #[test]
    fn loads_single_row() {
        let store = loaded(&format!("{HEADER}1700000000,10,12,9,11,1000,10.5\n"));
        assert_eq!(store.row_count(), 1);
        assert_eq!(store.get("timestamp").unwrap().samples(), &[1_700_000_000.0]);
        assert_eq!(store.get("price_high").unwrap().samples(), &[12.0]);
        assert_eq!(store.get("sma9").unwrap().samples(), &[10.5]);
        assert_eq!(
            store.column_names(),
            vec!["timestamp", "price_open", "price_high", "price_low", "price_close", "volume", "sma9"]
        );
    }

    #[test]
    fn header_trailing_comma_keeps_last_name() {
        let store = loaded("timestamp,volume,sma9,\n1,2,3,\n");
        assert_eq!(store.column_names(), vec!["timestamp", "volume", "sma9"]);
        assert!(!store.contains(""));
        assert_eq!(store.get("sma9").unwrap().samples(), &[3.0]);
    }

    #[test]
    fn empty_cell_yields_sentinel() {
        let store = loaded(&format!("{HEADER}1700000000,10,12,9,11,1000,\n"));
        let sma = store.get("sma9").unwrap();
        assert_eq!(sma.get(0), Some(SENTINEL));
        assert_eq!(sma.valid(0), None);
        assert!(!is_valid(SENTINEL));
        assert!(is_valid(SENTINEL + 1e-3));
        assert!(!is_valid(f64::NAN));
    }

    #[test]
    fn empty_cell_in_middle_column() {
        let store = loaded("a,b,c\n1,,3\n");
        assert_eq!(store.get("a").unwrap().samples(), &[1.0]);
        assert_eq!(store.get("b").unwrap().samples(), &[SENTINEL]);
        assert_eq!(store.get("c").unwrap().samples(), &[3.0]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let store = loaded("a,b\n1,2\n\n3,4\n\n");
        assert_eq!(store.row_count(), 2);
        assert_eq!(store.get("b").unwrap().samples(), &[2.0, 4.0]);
    }

    #[test]
    fn short_rows_are_padded_with_sentinel() {
        let store = loaded("a,b,c\n1\n4,5,6\n");
        assert_eq!(store.get("a").unwrap().samples(), &[1.0, 4.0]);
        assert_eq!(store.get("b").unwrap().samples(), &[SENTINEL, 5.0]);
        assert_eq!(store.get("c").unwrap().samples(), &[SENTINEL, 6.0]);
    }

    #[test]
    fn extra_tokens_are_ignored() {
        let store = loaded("a,b,\n1,2,3,4\n");
        assert_eq!(store.column_names(), vec!["a", "b"]);
        assert_eq!(store.get("b").unwrap().samples(), &[2.0]);
    }

    #[test]
    fn tokens_are_literal_without_quoting() {
        let mut store = ColumnStore::new();
        let err = store.load("a,b\n\"1\",2\n").unwrap_err();
        assert!(matches!(err, ChartError::InvalidNumericToken { ref token, .. } if token == "\"1\""));
    }

    #[test]
    fn invalid_token_reports_cell_and_empties_store() {
        let mut store = ColumnStore::new();
        store.load("a,b\n1,2\n").unwrap();

        let err = store.load("x,y\n1,2\n3,abc\n").unwrap_err();
        match err {
            ChartError::InvalidNumericToken { line, column, token } => {
                assert_eq!(line, 3);
                assert_eq!(column, "y");
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.is_empty());
        assert_eq!(store.row_count(), 0);
        assert!(store.column_names().is_empty());
    }

    #[test]
    fn invalid_token_line_counts_skipped_blank_lines() {
        let mut store = ColumnStore::new();
        let err = store.load("a,b\n1,2\n\n\n3,x\n").unwrap_err();
        assert!(matches!(
            err,
            ChartError::InvalidNumericToken { line: 5, ref column, ref token } if column == "b" && token == "x"
        ));
    }

    #[test]
    fn invalid_token_on_first_data_line_after_blank() {
        let mut store = ColumnStore::new();
        let err = store.load("a\n\nx\n").unwrap_err();
        assert!(matches!(err, ChartError::InvalidNumericToken { line: 3, .. }));
    }

    #[test]
    fn leading_blank_line_is_an_empty_header() {
        let store = loaded("\ntimestamp,v\n1,2\n");
        assert!(store.is_empty());
        assert!(store.positions().is_empty());
        assert!(store.column_names().is_empty());
        assert_eq!(store.row_count(), 0);
        assert!(matches!(store.get("timestamp"), Err(ChartError::UnknownColumn(_))));
    }

    #[test]
    fn header_without_newline_has_no_rows() {
        let store = loaded("timestamp,volume");
        assert_eq!(store.column_names(), vec!["timestamp", "volume"]);
        assert_eq!(store.row_count(), 0);
    }

    #[test]
    fn crlf_input_is_not_supported() {
        let store = loaded("a,b\r\n1,2\r\n");
        assert_eq!(store.column_names(), vec!["a", "b\r"]);

        let mut store = ColumnStore::new();
        let err = store.load("a\r\n1\r\n\r\n").unwrap_err();
        assert!(matches!(err, ChartError::InvalidNumericToken { line: 3, ref token, .. } if token == "\r"));
    }

    #[test]
    fn whitespace_around_number_is_tolerated() {
        let store = loaded("a,b\n 1 ,2\r\n");
        assert_eq!(store.get("a").unwrap().samples(), &[1.0]);
        assert_eq!(store.get("b").unwrap().samples(), &[2.0]);
    }

    #[test]
    fn whitespace_only_token_is_invalid() {
        let mut store = ColumnStore::new();
        assert!(matches!(
            store.load("a,b\n1, \n"),
            Err(ChartError::InvalidNumericToken { .. })
        ));
    }

    #[test]
    fn duplicate_header_is_rejected() {
        let mut store = ColumnStore::new();
        assert!(matches!(
            store.load("a,b,a\n1,2,3\n"),
            Err(ChartError::DuplicateColumn(ref n)) if n == "a"
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn reload_leaves_no_residue() {
        let mut store = loaded(&format!("{HEADER}1,2,3,4,5,6,7\n8,9,10,11,12,13,14\n"));
        store.load("timestamp,volume\n100,200\n").unwrap();

        assert_eq!(store.row_count(), 1);
        assert_eq!(store.column_names(), vec!["timestamp", "volume"]);
        assert_eq!(store.get("timestamp").unwrap().samples(), &[100.0]);
        assert!(matches!(store.get("sma9"), Err(ChartError::UnknownColumn(_))));
        assert!(matches!(store.get("price_high"), Err(ChartError::UnknownColumn(_))));
    }

    #[test]
    fn unknown_column_is_reported_by_name() {
        let store = loaded("timestamp\n1\n");
        match store.get("sma9") {
            Err(ChartError::UnknownColumn(name)) => assert_eq!(name, "sma9"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn empty_input_gives_empty_store() {
        let store = loaded("");
        assert!(store.is_empty());
        assert_eq!(store.row_count(), 0);
    }

    #[test]
    fn header_only_gives_empty_columns() {
        let store = loaded("timestamp,volume\n");
        assert_eq!(store.row_count(), 0);
        assert!(store.get("volume").unwrap().is_empty());
    }

    #[test]
    fn load_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        std::fs::write(&path, format!("{HEADER}1700000000,10,12,9,11,1000,10.5\n")).unwrap();

        let mut store = ColumnStore::new();
        store.load_file(&path).unwrap();
        assert_eq!(store.get("volume").unwrap().samples(), &[1000.0]);
    }

    #[test]
    fn missing_file_is_unreadable_and_clears_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = loaded("a\n1\n");

        let err = store.load_file(dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, ChartError::FileUnreadable { .. }));
        assert!(store.is_empty());
    }

    fn cell() -> impl Strategy<Value = Option<f64>> {
        prop_oneof![
            1 => Just(None),
            4 => (-1e5..1e9_f64).prop_map(Some),
        ]
    }

    proptest! {
        /// Every column has one sample per row and holds the token from its own position.
        #[test]
        fn columns_stay_aligned(
            width in 1usize..8,
            rows in proptest::collection::vec(proptest::collection::vec(cell(), 8), 0..20),
        ) {
            let names: Vec<String> = (0..width).map(|i| format!("c{i}")).collect();
            let mut raw = names.join(",");
            raw.push('\n');
            for row in &rows {
                let tokens: Vec<String> = row[..width]
                    .iter()
                    .map(|c| c.map(|v| v.to_string()).unwrap_or_default())
                    .collect();
                raw.push_str(&tokens.join(","));
                raw.push('\n');
            }

            let mut store = ColumnStore::new();
            store.load(&raw).unwrap();

            // a row made of a single empty token is a blank line and gets skipped
            let expected: Vec<&Vec<Option<f64>>> = rows
                .iter()
                .filter(|row| !(width == 1 && row[0].is_none()))
                .collect();
            prop_assert_eq!(store.row_count(), expected.len());

            for (p, name) in names.iter().enumerate() {
                let column = store.get(name).unwrap();
                prop_assert_eq!(column.len(), expected.len());
                for (i, row) in expected.iter().enumerate() {
                    prop_assert_eq!(column.get(i), Some(row[p].unwrap_or(SENTINEL)));
                }
            }
        }
    }
}
