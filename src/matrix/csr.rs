use std::ops::{Index, Range};

use tracing::warn;

use super::{coo::check_edge_ids, edge_id_at};
use crate::{
    array::{DeviceContext, IdArray},
    edge::NumEdges,
    error::{GraphError, Result},
    node::{Node, NumNodes},
};

/// Compressed sparse row matrix.
///
/// - `indices`: all column indices contiguously
/// - `indptr`: row boundaries, row `r` is `indices[indptr[r]..indptr[r+1]]`
/// - `data`: edge id per stored entry (position if absent)
/// - `sorted`: indices within every row are known to be non-decreasing
///
/// Used for both CSR (rows are sources) and CSC (rows are destinations) encodings.
///
/// ### Invariants
/// [`CsrMatrix::validate`] checks
/// 1. `indptr.len() == num_rows + 1` and `indptr[0] == 0`
/// 2. `indptr` is non-decreasing
/// 3. `indptr[num_rows] == indices.len()`
/// 4. every index is `< num_cols`
///
/// Matrices handed out by a [`RelationGraph`](crate::graph::RelationGraph) always satisfy them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrMatrix {
    pub num_rows: NumNodes,
    pub num_cols: NumNodes,
    pub indptr: IdArray,
    pub indices: IdArray,
    pub data: Option<IdArray>,
    pub sorted: bool,
}

impl CsrMatrix {
    /// Creates a new matrix without `data`.
    /// The `sorted` flag is derived from the row segments.
    ///
    /// # Examples
    /// ```
    /// use relgraph::matrix::CsrMatrix;
    ///
    /// let csr = CsrMatrix::new(4, 3, vec![0u32, 1, 3, 4, 6].into(), vec![2u32, 0, 2, 1, 0, 2].into());
    /// assert!(csr.sorted);
    /// assert_eq!(csr.nnz(), 6);
    /// assert_eq!(&csr[1u32], &[0, 2]);
    /// ```
    pub fn new(num_rows: NumNodes, num_cols: NumNodes, indptr: IdArray, indices: IdArray) -> Self {
        let mut csr = Self {
            num_rows,
            num_cols,
            indptr,
            indices,
            data: None,
            sorted: false,
        };
        csr.sorted = csr.is_well_formed() && csr.segments_sorted();
        csr
    }

    /// Attaches an edge id array
    pub fn with_data(mut self, data: IdArray) -> Self {
        self.data = Some(data);
        self
    }

    /// Returns the number of stored entries
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Returns the context of the index arrays
    pub fn context(&self) -> DeviceContext {
        self.indices.context()
    }

    /// Returns the positions of row `r` within `indices`
    ///
    /// # Panics
    /// Panics if `r >= num_rows`.
    #[inline]
    pub fn row_range(&self, r: Node) -> Range<usize> {
        let r = r as usize;
        self.indptr[r] as usize..self.indptr[r + 1] as usize
    }

    /// Returns the number of entries in row `r`
    ///
    /// # Examples
    /// ```
    /// use relgraph::matrix::CsrMatrix;
    ///
    /// let csr = CsrMatrix::new(3, 4, vec![0u32, 2, 2, 3].into(), vec![1u32, 3, 0].into());
    /// assert_eq!(csr.row_len(0), 2);
    /// assert_eq!(csr.row_len(1), 0);
    /// ```
    #[inline]
    pub fn row_len(&self, r: Node) -> NumEdges {
        self.indptr[r as usize + 1] - self.indptr[r as usize]
    }

    /// Returns the edge ids of row `r`, aligned with `self[r]`
    pub fn row_edge_ids(&self, r: Node) -> impl Iterator<Item = NumEdges> + '_ {
        self.row_range(r)
            .map(move |pos| edge_id_at(self.data.as_ref(), pos))
    }

    /// Returns the edge id of the `pos`-th stored entry
    pub fn edge_id(&self, pos: usize) -> NumEdges {
        edge_id_at(self.data.as_ref(), pos)
    }

    /// Returns *true* if row `r` contains index `c`.
    /// Uses binary search on sorted matrices.
    pub fn row_contains(&self, r: Node, c: Node) -> bool {
        let row = &self[r];
        if self.sorted {
            row.binary_search(&c).is_ok()
        } else {
            row.contains(&c)
        }
    }

    /// Checks all structural invariants of the encoding.
    ///
    /// # Errors
    /// - [`GraphError::MalformedIndptr`] if `indptr` is not a valid prefix sum over `indices`
    /// - [`GraphError::LengthMismatch`] if `data` does not have one entry per index
    /// - [`GraphError::DimensionMismatch`] if an index or edge id is out of bounds
    /// - [`GraphError::InvalidFormat`] if `sorted` is set on unsorted segments
    pub fn validate(&self) -> Result<()> {
        let result = self.check();
        if let Err(err) = &result {
            warn!(%err, "rejected compressed input");
        }
        result
    }

    fn check(&self) -> Result<()> {
        if self.indptr.len() != self.num_rows as usize + 1 {
            return Err(GraphError::MalformedIndptr(format!(
                "expected {} offsets for {} rows, got {}",
                self.num_rows as usize + 1,
                self.num_rows,
                self.indptr.len()
            )));
        }

        if self.indptr[0] != 0 {
            return Err(GraphError::MalformedIndptr(format!(
                "first offset is {}, expected 0",
                self.indptr[0]
            )));
        }

        if let Some(r) = self.indptr.windows(2).position(|w| w[0] > w[1]) {
            return Err(GraphError::MalformedIndptr(format!(
                "offsets decrease at row {r}"
            )));
        }

        let last = self.indptr[self.num_rows as usize] as usize;
        if last != self.indices.len() {
            return Err(GraphError::MalformedIndptr(format!(
                "last offset is {last} but there are {} indices",
                self.indices.len()
            )));
        }

        if let Some((position, value)) = self.indices.first_out_of_bounds(self.num_cols as u64) {
            return Err(GraphError::DimensionMismatch {
                what: "indices",
                position,
                value,
                bound: self.num_cols as u64,
            });
        }

        if let Some(data) = &self.data {
            check_edge_ids(data, self.nnz())?;
        }

        if self.sorted && !self.segments_sorted() {
            return Err(GraphError::InvalidFormat(
                "sorted flag set on unsorted row segments".into(),
            ));
        }

        Ok(())
    }

    fn is_well_formed(&self) -> bool {
        self.indptr.len() == self.num_rows as usize + 1
            && self.indptr.is_non_decreasing()
            && self.indptr.last().is_some_and(|&l| l as usize == self.indices.len())
    }

    /// Requires a well-formed `indptr`
    pub(crate) fn segments_sorted(&self) -> bool {
        (0..self.num_rows).all(|r| self[r].is_sorted())
    }
}

impl Index<Node> for CsrMatrix {
    type Output = [Node];

    #[inline]
    fn index(&self, r: Node) -> &Self::Output {
        &self.indices[self.row_range(r)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csr1() -> CsrMatrix {
        CsrMatrix::new(
            4,
            3,
            vec![0, 1, 3, 4, 6].into(),
            vec![2, 0, 2, 1, 0, 2].into(),
        )
    }

    #[test]
    fn row_access() {
        let csr = csr1();
        assert_eq!(csr.validate(), Ok(()));

        assert_eq!(&csr[0], &[2]);
        assert_eq!(&csr[3], &[0, 2]);
        assert_eq!(csr.row_len(2), 1);
        assert_eq!(csr.row_edge_ids(1).collect::<Vec<_>>(), vec![1, 2]);

        assert!(csr.row_contains(3, 2));
        assert!(!csr.row_contains(3, 1));
    }

    #[test]
    fn edge_ids_follow_data() {
        let csr = csr1().with_data(vec![5, 4, 3, 2, 1, 0].into());
        assert_eq!(csr.validate(), Ok(()));
        assert_eq!(csr.row_edge_ids(3).collect::<Vec<_>>(), vec![1, 0]);
        assert_eq!(csr.edge_id(0), 5);
    }

    #[test]
    fn sorted_flag_is_derived() {
        let csr = CsrMatrix::new(2, 3, vec![0, 2, 3].into(), vec![2, 0, 1].into());
        assert!(!csr.sorted);
        assert_eq!(csr.validate(), Ok(()));

        let mut lying = csr.clone();
        lying.sorted = true;
        assert!(matches!(lying.validate(), Err(GraphError::InvalidFormat(_))));
    }

    #[test]
    fn malformed_indptr() {
        let broken = [
            CsrMatrix::new(2, 3, vec![0, 2].into(), vec![0, 1].into()),
            CsrMatrix::new(2, 3, vec![1, 2, 2].into(), vec![0, 1].into()),
            CsrMatrix::new(2, 3, vec![0, 2, 1].into(), vec![0, 1].into()),
            CsrMatrix::new(2, 3, vec![0, 1, 3].into(), vec![0, 1].into()),
        ];

        for csr in broken {
            assert!(matches!(csr.validate(), Err(GraphError::MalformedIndptr(_))));
        }

        let out_of_bounds = CsrMatrix::new(2, 3, vec![0, 1, 2].into(), vec![0, 3].into());
        assert_eq!(
            out_of_bounds.validate(),
            Err(GraphError::DimensionMismatch {
                what: "indices",
                position: 1,
                value: 3,
                bound: 3
            })
        );
    }
}
