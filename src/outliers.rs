use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct OutlierReport {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    image_path: PathBuf,
}

impl OutlierReport {
    pub fn load(table_path: &Path, image_path: &Path) -> Result<Self> {
        let file = File::open(table_path)
            .with_context(|| format!("open outlier table {}", table_path.display()))?;
        let report = Self::from_reader(file, image_path)
            .with_context(|| format!("parse outlier table {}", table_path.display()))?;
        if !image_path.exists() {
            warn!(path = %image_path.display(), "outlier image missing");
        }
        info!(rows = report.rows.len(), "outlier table loaded");
        Ok(report)
    }

    pub fn from_reader<R: Read>(rdr: R, image_path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
        let columns: Vec<String> = reader
            .headers()
            .context("read outlier header")?
            .iter()
            .map(str::to_string)
            .collect();
        let mut rows = Vec::new();
        for (line, row) in reader.records().enumerate() {
            let row = row.with_context(|| format!("read outlier row {}", line + 1))?;
            let mut cells: Vec<String> = row.iter().map(str::to_string).collect();
            cells.resize(columns.len(), String::new());
            rows.push(cells);
        }
        Ok(Self {
            columns,
            rows,
            image_path: image_path.to_path_buf(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn top_outliers(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn outlier_visual(&self) -> &Path {
        &self.image_path
    }

    /// Right-aligned plain-text table, header first, no index column.
    pub fn render_table(&self) -> String {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let render_line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, &w)| format!("{cell:>w$}"))
                .collect::<Vec<_>>()
                .join(" ")
        };

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(render_line(&self.columns));
        for row in &self.rows {
            lines.push(render_line(row));
        }
        lines.join("\n")
    }
}
