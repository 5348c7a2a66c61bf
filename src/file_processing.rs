/// Extensions accepted when the input is a directory.
const INPUT_EXTENSIONS: [&str; 2] = ["csv", "txt"];

/// Checks that the input path exists.
///
/// # Errors
/// * If `path` is neither a file nor a directory.
pub fn check_path<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(anyhow::anyhow!("Input path does not exist: {}", path.display()));
    }
    if !path.is_file() && !path.is_dir() {
        return Err(anyhow::anyhow!("Input path is neither a file nor a directory: {}", path.display()));
    }
    anyhow::Ok(())
}

/// Creates the output directory (and its parents) if missing.
pub fn ensure_output_dir<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    if path.is_file() {
        return Err(anyhow::anyhow!("Output path is a file, expected a directory: {}", path.display()));
    }
    std::fs::create_dir_all(path)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", path.display(), e))?;
    anyhow::Ok(())
}

/// Lists the files to load: the input itself, or every `.csv`/`.txt` directly inside
/// an input directory, sorted by name.
pub fn collect_input_files<P: AsRef<std::path::Path>>(input: P) -> anyhow::Result<Vec<std::path::PathBuf>> {
    let input = input.as_ref();
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = std::fs::read_dir(input)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| INPUT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        })
        .collect::<Vec<_>>();
    files.sort();

    anyhow::Ok(files)
}
