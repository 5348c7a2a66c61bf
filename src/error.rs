/// Errors raised while loading a CSV table or projecting it into chart series.
///
/// None of these are fatal to the process: `pipeline::Pipeline::open_file` catches
/// every variant and reports it to the log sink.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("cannot read {path}: {source}")]
    FileUnreadable {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid numeric token {token:?} at line {line}, column '{column}'")]
    InvalidNumericToken {
        line: u64,
        column: String,
        token: String,
    },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("duplicate column '{0}' in header")]
    DuplicateColumn(String),

    #[error("malformed csv input: {0}")]
    Csv(#[from] csv::Error),
}
