use anyhow::{anyhow, Context};
use csv::{ReaderBuilder, Trim};
use ndarray::{Array2, ArrayView1};
use std::fs::File;
use std::path::Path;

use crate::error::{ClusterError, Result};

/// Field separator of a numeric text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    /// Any run of spaces or tabs.
    #[default]
    Whitespace,
    Tab,
    Comma,
}

impl Delimiter {
    fn byte(self) -> u8 {
        match self {
            Delimiter::Whitespace => b' ',
            Delimiter::Tab => b'\t',
            Delimiter::Comma => b',',
        }
    }
}

fn check_finite(data: &Array2<f64>) -> Result<()> {
    match data.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, col), _)) => Err(ClusterError::NonFinite { row, col }),
        None => Ok(()),
    }
}

/// An ordered set of points of equal dimension, one point per row.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    data: Array2<f64>,
}

impl DataSet {
    /// Build a dataset from already parsed rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let first = rows.first().ok_or(ClusterError::EmptyDataset)?;
        let dim = first.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != dim) {
            return Err(ClusterError::DimensionMismatch {
                left: dim,
                right: bad.len(),
            });
        }
        let data = Array2::from_shape_fn((rows.len(), dim), |(i, j)| rows[i][j]);
        Self::from_array(data)
    }

    /// Wrap an existing matrix. Rows are points; every value must be finite.
    pub fn from_array(data: Array2<f64>) -> Result<Self> {
        if data.nrows() == 0 {
            return Err(ClusterError::EmptyDataset);
        }
        check_finite(&data)?;
        Ok(Self { data })
    }

    /// Read a headerless file of delimited numbers, one point per line.
    pub fn from_delimited<P: AsRef<Path>>(path: P, delimiter: Delimiter) -> anyhow::Result<Self> {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open {:?}", path.as_ref()))?;

        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter.byte())
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file);

        let mut records: Vec<Vec<f64>> = Vec::new();

        for (i, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| anyhow!("Error reading record {}: {}", i, e))?;
            let line = record.position().map(|p| p.line()).unwrap_or(i as u64 + 1);
            let row = record
                .iter()
                .flat_map(|field| match delimiter {
                    Delimiter::Whitespace => field.split(char::is_whitespace).collect::<Vec<_>>(),
                    _ => vec![field],
                })
                .filter(|field| !field.is_empty())
                .map(|field| {
                    field
                        .parse::<f64>()
                        .with_context(|| format!("line {}: cannot parse {:?} as a number", line, field))
                })
                .collect::<anyhow::Result<Vec<f64>>>()?;
            if !row.is_empty() {
                records.push(row);
            }
        }

        if records.is_empty() {
            return Err(anyhow!("No data lines found in {:?}", path.as_ref()));
        }

        Self::from_rows(records).with_context(|| format!("Malformed dataset {:?}", path.as_ref()))
    }

    pub fn n_points(&self) -> usize {
        self.data.nrows()
    }

    pub fn dim(&self) -> usize {
        self.data.ncols()
    }

    pub fn point(&self, index: usize) -> ArrayView1<'_, f64> {
        self.data.row(index)
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }
}
