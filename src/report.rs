//! Output artifacts of a comparison run.
//!
//! - `<name>.avg_p.txt` per ranker: one AP per line, in query order
//! - `significance.txt`: the paired-test p-value, no trailing newline
//!
//! Files are overwritten on every run.

use crate::compare::Comparison;
use crate::eval::ApSamples;
use crate::Error;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// File name of the p-value artifact.
pub const SIGNIFICANCE_FILE: &str = "significance.txt";

/// File name of the AP artifact for ranker `name`.
pub fn samples_file_name(name: &str) -> String {
    format!("{name}.avg_p.txt")
}

fn render_samples(samples: &ApSamples) -> String {
    let mut out = String::new();
    for ap in samples.values() {
        // Infallible for String.
        let _ = writeln!(out, "{ap}");
    }
    out
}

fn write_file(path: &Path, contents: &str) -> Result<(), Error> {
    std::fs::write(path, contents).map_err(|e| Error::io(path, e))
}

/// Write all artifacts for `cmp` into `dir`, returning the written paths.
pub fn write_artifacts(
    dir: &Path,
    name_a: &str,
    name_b: &str,
    cmp: &Comparison,
) -> Result<Vec<PathBuf>, Error> {
    std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    let files = [
        (dir.join(samples_file_name(name_a)), render_samples(&cmp.samples_a)),
        (dir.join(samples_file_name(name_b)), render_samples(&cmp.samples_b)),
        (dir.join(SIGNIFICANCE_FILE), cmp.p_value.to_string()),
    ];
    let mut written = Vec::with_capacity(files.len());
    for (path, contents) in files {
        write_file(&path, &contents)?;
        tracing::debug!(path = %path.display(), "wrote artifact");
        written.push(path);
    }
    Ok(written)
}
