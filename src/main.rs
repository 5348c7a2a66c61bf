use csv_chart_loader::{cli, file_processing, progress, snapshot, utils};
use tracing_subscriber::EnvFilter;

/// Main entry point of the application.
///
/// This function orchestrates the entire workflow:
/// 1. Parses command-line arguments.
/// 2. Validates input/output paths.
/// 3. Determines the number of threads to use.
/// 4. Loads every input file into chart series (preview and/or snapshot export).
/// 5. Optionally reads the exported snapshots back and prints their first bars.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Success or an error if any step fails.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let total_start = std::time::Instant::now();
    let args = cli::Args::parse();
    println!("Start loading...");

    file_processing::check_path(&args.input)?;
    if let Some(output) = &args.output {
        file_processing::ensure_output_dir(output)?;
    }

    let effective_threads = match args.threads {
        Some(n) => {
            let max_threads = num_cpus::get();
            if n > max_threads {
                println!("⚠️ Warning: Limiting thread count to {} (max available)", max_threads);
                max_threads
            } else { n }
        }
        None => rayon::current_num_threads(),
    };
    println!("🚀 Using {} thread(s)", effective_threads);

    let summary = if args.threads.is_some() {
        let local_pool = utils::configure_thread_pool(effective_threads)?;
        local_pool.install(|| progress::process_files(&args))?
    } else {
        progress::process_files(&args)?
    };

    println!(
        "✅ Loaded {} file(s), {} row(s), {} failed in {:?} seconds",
        summary.rendered,
        summary.rows,
        summary.failed,
        total_start.elapsed().as_secs_f64()
    );

    if args.check {
        if let Some(output) = &args.output {
            println!("Start reading...");
            let start = std::time::Instant::now();

            if args.threads.is_some() {
                let local_pool = utils::configure_thread_pool(effective_threads)?;
                local_pool.install(|| snapshot::read_snapshots(output, args.preview.max(1)))?;
            } else {
                snapshot::read_snapshots(output, args.preview.max(1))?;
            }
            println!(
                "✅ Reading snapshots complete in {:?} seconds",
                start.elapsed().as_secs_f64()
            );
        }
    }
    Ok(())
}
