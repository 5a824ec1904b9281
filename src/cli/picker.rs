//! Interactive CSV picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `dash` and choose a CSV" UX when no file was configured
//!
//! The picker searches for `*.csv` files under the current working directory.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Prompt the user to select a CSV file from the current directory tree.
///
/// Behavior:
/// - list discovered `*.csv` files
/// - accept either a number (from the list) or an explicit path
/// - `q` cancels
pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let files = discover_csv_files();
    if files.is_empty() {
        return Err(AppError::input(
            "No .csv files found. Provide one with `dash -f <file.csv>` or set DASH_CSV.",
        ));
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    choose_from(&files, &mut stdin.lock(), &mut stdout)
}

/// Run the selection prompt over an arbitrary input/output pair.
pub fn choose_from<R: BufRead, W: Write>(files: &[PathBuf], input: &mut R, out: &mut W) -> Result<PathBuf, AppError> {
    let write_err = |e: io::Error| AppError::input(format!("Failed to write prompt: {e}"));

    writeln!(out, "Found {} CSV file(s):", files.len()).map_err(write_err)?;
    for (idx, path) in files.iter().enumerate() {
        writeln!(out, "{:>3}) {}", idx + 1, pretty_path(path)).map_err(write_err)?;
    }

    loop {
        write!(out, "Select a file by number (1-{}) or type a path (q to quit): ", files.len()).map_err(write_err)?;
        out.flush().map_err(write_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::input(format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::input(
                "No input received. Provide a CSV path with `dash -f <file.csv>`.",
            ));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::input("Canceled."));
        }

        if let Ok(choice) = line.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_csv_path(&files[choice - 1]);
            }
            writeln!(out, "Invalid choice: {choice}. Enter a number between 1 and {}.", files.len())
                .map_err(write_err)?;
            continue;
        }

        match validate_csv_path(Path::new(line)) {
            Ok(path) => return Ok(path),
            Err(err) => {
                writeln!(out, "{err}").map_err(write_err)?;
                continue;
            }
        }
    }
}

/// Validate the provided path points to a `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::input(format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::input(format!(
            "Expected a file, got a directory: {}",
            path.display()
        )));
    }
    if !has_csv_extension(path) {
        return Err(AppError::input(format!(
            "Expected a .csv file (got: {}). Use -f to pass a CSV path.",
            path.display()
        )));
    }

    Ok(path.to_path_buf())
}

/// Discover `*.csv` files under the current directory (deterministic order).
pub fn discover_csv_files() -> Vec<PathBuf> {
    find_csv_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

/// Recursively collect `*.csv` files below `root`, sorted by display path.
pub fn find_csv_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_csv_files_inner(root, 0, max_depth, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_csv_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if should_skip_dir(&path) {
                continue;
            }
            find_csv_files_inner(&path, depth + 1, max_depth, out);
            continue;
        }

        if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::write(path, "Category,Sub_Category,Order_Date,Sales,Profit\n").unwrap();
    }

    #[test]
    fn finds_csv_files_and_skips_build_dirs() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("b.csv"));
        touch(&dir.path().join("A.CSV"));
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("target")).unwrap();
        touch(&dir.path().join("target").join("ignored.csv"));

        let found = find_csv_files(dir.path(), 2);
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["A.CSV", "b.csv"]);
    }

    #[test]
    fn prompt_accepts_number_after_bad_choice() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        touch(&a);
        touch(&b);

        let mut input = Cursor::new("7\n2\n");
        let mut out = Vec::new();
        let picked = choose_from(&[a, b.clone()], &mut input, &mut out).unwrap();
        assert_eq!(picked, b);
        assert!(String::from_utf8(out).unwrap().contains("Invalid choice: 7"));
    }

    #[test]
    fn prompt_quit_and_eof_are_errors() {
        let files = vec![PathBuf::from("x.csv")];
        let err = choose_from(&files, &mut Cursor::new("q\n"), &mut Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "Canceled.");
        assert!(choose_from(&files, &mut Cursor::new(""), &mut Vec::new()).is_err());
    }

    #[test]
    fn validate_rejects_non_csv() {
        let dir = TempDir::new().unwrap();
        let txt = dir.path().join("data.txt");
        fs::write(&txt, "x").unwrap();
        assert!(validate_csv_path(&txt).is_err());
        assert!(validate_csv_path(dir.path()).is_err());
        assert!(validate_csv_path(&dir.path().join("missing.csv")).is_err());
    }
}
