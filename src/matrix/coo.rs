use itertools::Itertools;
use tracing::warn;

use super::edge_id_at;
use crate::{
    array::{DeviceContext, IdArray},
    edge::{Edge, NumEdges},
    error::{GraphError, Result},
    node::NumNodes,
};

/// Coordinate list encoding of a relation.
///
/// - `row[i]`/`col[i]`: endpoints of the `i`-th stored entry
/// - `data[i]`: edge id of the `i`-th stored entry (`i` if absent)
/// - `row_sorted`/`col_sorted`: the respective array is known to be non-decreasing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooMatrix {
    pub num_rows: NumNodes,
    pub num_cols: NumNodes,
    pub row: IdArray,
    pub col: IdArray,
    pub data: Option<IdArray>,
    pub row_sorted: bool,
    pub col_sorted: bool,
}

impl CooMatrix {
    /// Creates a new matrix without `data`.
    /// Sortedness flags are derived from the arrays.
    ///
    /// # Examples
    /// ```
    /// use relgraph::matrix::CooMatrix;
    ///
    /// let coo = CooMatrix::new(2, 3, vec![0u32, 0, 1].into(), vec![0u32, 1, 1].into());
    /// assert!(coo.row_sorted && coo.col_sorted);
    /// assert_eq!(coo.nnz(), 3);
    /// ```
    pub fn new(num_rows: NumNodes, num_cols: NumNodes, row: IdArray, col: IdArray) -> Self {
        let row_sorted = row.is_non_decreasing();
        let col_sorted = col.is_non_decreasing();
        Self {
            num_rows,
            num_cols,
            row,
            col,
            data: None,
            row_sorted,
            col_sorted,
        }
    }

    /// Attaches an edge id array
    pub fn with_data(mut self, data: IdArray) -> Self {
        self.data = Some(data);
        self
    }

    /// Returns the number of stored entries
    pub fn nnz(&self) -> usize {
        self.row.len()
    }

    /// Returns the context of the coordinate arrays
    pub fn context(&self) -> DeviceContext {
        self.row.context()
    }

    /// Returns the edge id of the `pos`-th stored entry
    pub fn edge_id(&self, pos: usize) -> NumEdges {
        edge_id_at(self.data.as_ref(), pos)
    }

    /// Iterates over `(edge id, edge)` in storage order
    pub fn iter(&self) -> impl Iterator<Item = (NumEdges, Edge)> + '_ {
        self.row
            .iter()
            .zip_eq(self.col.iter())
            .enumerate()
            .map(|(pos, (&u, &v))| (self.edge_id(pos), Edge(u, v)))
    }

    /// Returns the transposed matrix. Rows and columns swap roles; the arrays are shared.
    ///
    /// # Examples
    /// ```
    /// use relgraph::matrix::CooMatrix;
    ///
    /// let coo = CooMatrix::new(2, 3, vec![0u32, 1].into(), vec![2u32, 0].into());
    /// let t = coo.transpose();
    ///
    /// assert_eq!((t.num_rows, t.num_cols), (3, 2));
    /// assert!(t.row.same_buffer(&coo.col));
    /// assert!(t.transpose().row.same_buffer(&coo.row));
    /// ```
    pub fn transpose(&self) -> Self {
        Self {
            num_rows: self.num_cols,
            num_cols: self.num_rows,
            row: self.col.clone(),
            col: self.row.clone(),
            data: self.data.clone(),
            row_sorted: self.col_sorted,
            col_sorted: self.row_sorted,
        }
    }

    /// Checks all structural invariants of the encoding.
    ///
    /// # Errors
    /// - [`GraphError::LengthMismatch`] if `row`, `col` and `data` differ in length
    /// - [`GraphError::DimensionMismatch`] if a coordinate or edge id is out of bounds
    /// - [`GraphError::InvalidFormat`] if a sortedness flag is set on an unsorted array
    pub fn validate(&self) -> Result<()> {
        let result = self.check();
        if let Err(err) = &result {
            warn!(%err, "rejected COO input");
        }
        result
    }

    fn check(&self) -> Result<()> {
        if self.col.len() != self.row.len() {
            return Err(GraphError::LengthMismatch {
                what: "col",
                expected: self.row.len(),
                actual: self.col.len(),
            });
        }

        if let Some((position, value)) = self.row.first_out_of_bounds(self.num_rows as u64) {
            return Err(GraphError::DimensionMismatch {
                what: "row",
                position,
                value,
                bound: self.num_rows as u64,
            });
        }

        if let Some((position, value)) = self.col.first_out_of_bounds(self.num_cols as u64) {
            return Err(GraphError::DimensionMismatch {
                what: "col",
                position,
                value,
                bound: self.num_cols as u64,
            });
        }

        if let Some(data) = &self.data {
            check_edge_ids(data, self.nnz())?;
        }

        if (self.row_sorted && !self.row.is_non_decreasing())
            || (self.col_sorted && !self.col.is_non_decreasing())
        {
            return Err(GraphError::InvalidFormat(
                "COO sortedness flag set on an unsorted coordinate array".into(),
            ));
        }

        Ok(())
    }
}

/// Checks that an edge id array has one entry per stored edge and only ids `< nnz`
pub(crate) fn check_edge_ids(data: &IdArray, nnz: usize) -> Result<()> {
    if data.len() != nnz {
        return Err(GraphError::LengthMismatch {
            what: "data",
            expected: nnz,
            actual: data.len(),
        });
    }

    if let Some((position, value)) = data.first_out_of_bounds(nnz as u64) {
        return Err(GraphError::DimensionMismatch {
            what: "data",
            position,
            value,
            bound: nnz as u64,
        });
    }

    Ok(())
}
