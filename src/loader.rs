use crate::error::{SolverError, SolverResult};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Dense square matrix read from a delimited text file, row-major.
#[derive(Debug, Clone)]
pub struct RawMatrix<T> {
    pub size: usize,
    pub values: Vec<T>,
}

pub fn load_matrix<P: AsRef<Path>>(path: P, delimiter: u8) -> SolverResult<RawMatrix<f64>> {
    let path = path.as_ref();
    debug!("Loading matrix from: {}", path.display());
    let file = File::open(path)?;
    read_matrix(file, delimiter)
}

pub fn load_adjacency<P: AsRef<Path>>(path: P, delimiter: u8) -> SolverResult<RawMatrix<u8>> {
    let path = path.as_ref();
    debug!("Loading adjacency from: {}", path.display());
    let file = File::open(path)?;
    read_adjacency(file, delimiter)
}

pub fn read_matrix<R: Read>(reader: R, delimiter: u8) -> SolverResult<RawMatrix<f64>> {
    let rows = read_rows(reader, delimiter)?;
    let size = check_square(&rows)?;

    let mut values = Vec::with_capacity(size * size);
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, field) in row.iter().enumerate() {
            let v: f64 = field.parse().map_err(|_| {
                SolverError::Validation(format!(
                    "Invalid number '{}' at row {}, column {}",
                    field, row_idx, col_idx
                ))
            })?;
            values.push(v);
        }
    }

    Ok(RawMatrix { size, values })
}

pub fn read_adjacency<R: Read>(reader: R, delimiter: u8) -> SolverResult<RawMatrix<u8>> {
    let rows = read_rows(reader, delimiter)?;
    let size = check_square(&rows)?;

    let mut values = Vec::with_capacity(size * size);
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, field) in row.iter().enumerate() {
            match field.as_str() {
                "0" => values.push(0),
                "1" => values.push(1),
                other => {
                    return Err(SolverError::Validation(format!(
                        "Adjacency entry '{}' at row {}, column {} is not 0 or 1",
                        other, row_idx, col_idx
                    )))
                }
            }
        }
    }

    Ok(RawMatrix { size, values })
}

// A space delimiter tolerates runs of whitespace, matching hand-written matrix files.
fn read_rows<R: Read>(reader: R, delimiter: u8) -> SolverResult<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let rec = result?;
        let fields: Vec<String> = rec
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        if !fields.is_empty() {
            rows.push(fields);
        }
    }
    Ok(rows)
}

fn check_square(rows: &[Vec<String>]) -> SolverResult<usize> {
    let size = rows.len();
    if size == 0 {
        return Err(SolverError::Validation("Matrix file is empty".to_string()));
    }
    if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
        return Err(SolverError::Validation(format!(
            "Matrix is not square: row {} has {} entries, expected {}",
            idx,
            row.len(),
            size
        )));
    }
    Ok(size)
}
