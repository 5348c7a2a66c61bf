use crate::projector;

/// Structure representing command-line arguments.
#[derive(Debug, Clone)]
pub struct Args {
    pub input: std::path::PathBuf,
    pub output: Option<std::path::PathBuf>,
    /// `None` when `--no-indicator` is given.
    pub indicator: Option<String>,
    pub threads: Option<usize>,
    pub preview: usize,
    pub check: bool,
}

impl Args {
    /// Parses command-line arguments using `clap`.
    ///
    /// # Returns
    /// * `Args` - Struct containing parsed arguments.
    ///
    /// # Errors
    /// * Exits with a usage message if arguments are missing or invalid.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    fn from_matches(matches: &clap::ArgMatches) -> Self {
        let indicator = if matches.get_flag("no-indicator") {
            None
        } else {
            matches.get_one::<String>("indicator").cloned()
        };

        Args {
            input: matches
                .get_one::<std::path::PathBuf>("input")
                .cloned()
                .unwrap_or_default(),
            output: matches.get_one::<std::path::PathBuf>("output").cloned(),
            indicator,
            threads: matches.get_one::<usize>("threads").cloned(),
            preview: matches.get_one::<usize>("preview").cloned().unwrap_or(5),
            check: matches.get_flag("check"),
        }
    }

    /// Projector matching the indicator options.
    pub fn projector(&self) -> projector::SeriesProjector {
        match &self.indicator {
            Some(name) => projector::SeriesProjector::new(name.clone()),
            None => projector::SeriesProjector::without_indicator(),
        }
    }
}

/// Command-line definition.
///
/// Accepts one CSV file or a directory of them, with an optional snapshot export and
/// a read-back check.
fn command() -> clap::Command {
    clap::Command::new("csv_chart_loader")
        .version("0.1.0")
        .about("Load OHLCV + indicator CSV files into chart series")
        .arg(
            clap::Arg::new("input")
                .short('i')
                .long("input")
                .help("Path to a CSV/TXT file or a directory of them")
                .required(true)
                .num_args(1)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("Directory to write .chart.bin snapshots to")
                .num_args(1)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::Arg::new("indicator")
                .long("indicator")
                .help("Indicator column drawn as an overlay")
                .num_args(1)
                .default_value(projector::DEFAULT_INDICATOR),
        )
        .arg(
            clap::Arg::new("no-indicator")
                .long("no-indicator")
                .help("Draw candles and volume only")
                .action(clap::ArgAction::SetTrue)
                .conflicts_with("indicator"),
        )
        .arg(
            clap::Arg::new("threads")
                .short('t')
                .long("threads")
                .help("Number of threads to use (default: all available)")
                .num_args(1)
                .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
        )
        .arg(
            clap::Arg::new("preview")
                .short('p')
                .long("preview")
                .help("Number of candle tooltips printed per file, 0 disables the preview")
                .num_args(1)
                .default_value("5")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            clap::Arg::new("check")
                .short('c')
                .long("check")
                .help("After loading, read the .chart.bin snapshots back and print their first rows")
                .action(clap::ArgAction::SetTrue)
                .requires("output"),
        )
}

/// Validates that the number of threads is a positive integer.
///
/// # Arguments
/// * `s` - String representation of the number of threads.
///
/// # Returns
/// * `Result<usize>` - Validated number of threads.
fn parse_usize_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("Must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("Not a valid number: {}", e)),
    }
}
