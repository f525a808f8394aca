/*
    This module writes DOT files and hands them to Graphviz
*/

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use log::debug;

// File name (without extension) used for both the DOT file and the image.
pub fn output_stem(grammar_name: &str, start: &str) -> String {
    let start: String = start
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    format!("{}_{}", grammar_name, start)
}

// Writes `<dir>/<stem>.dot`, creating `dir` if needed.
pub fn write_dot(dir: &Path, stem: &str, text: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let path = dir.join(format!("{}.dot", stem));
    fs::write(&path, text)
        .with_context(|| format!("Failed to write DOT file: {}", path.display()))?;
    Ok(path)
}

// Runs a Graphviz layout program on `dot_path` and returns the image path.
pub fn render_image(dot_path: &Path, image_dir: &Path, program: &str, format: &str) -> Result<PathBuf> {
    fs::create_dir_all(image_dir)
        .with_context(|| format!("Failed to create image directory: {}", image_dir.display()))?;

    let stem = dot_path
        .file_stem()
        .with_context(|| format!("DOT path has no file name: {}", dot_path.display()))?;
    let image = image_dir.join(stem).with_extension(format);

    debug!("running {} on {}", program, dot_path.display());
    let status = Command::new(program)
        .arg(dot_path)
        .arg("-T")
        .arg(format)
        .arg("-o")
        .arg(&image)
        .status()
        .with_context(|| format!("Failed to run `{}`; is Graphviz installed?", program))?;

    if !status.success() {
        bail!("`{}` exited with {} while rendering {}", program, status, dot_path.display());
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn name_outputs() {
        assert_eq!(output_stem("Expr", "prog"), "Expr_prog");
        assert_eq!(output_stem("Expr", "'x'"), "Expr__x_");
    }

    #[test]
    fn write_into_new_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("dot");

        let path = write_dot(&dir, "Expr_prog", "digraph Expr {}\n").unwrap();
        assert_eq!(path, dir.join("Expr_prog.dot"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "digraph Expr {}\n");
    }

    #[test]
    fn render_with_missing_program() {
        let temp_dir = TempDir::new().unwrap();
        let dot = write_dot(temp_dir.path(), "T_a", "digraph T {}\n").unwrap();

        let error = render_image(&dot, temp_dir.path(), "rulegraph-no-such-layout-program", "png").unwrap_err();
        assert!(error.to_string().contains("rulegraph-no-such-layout-program"));
    }
}
