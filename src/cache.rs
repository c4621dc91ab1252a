/*!
# Format Cache

A [`FormatCache`] owns up to three materialized encodings of the same relation: a COO, a CSR
(out-edges) and a CSC (in-edges). Each encoding lives in its own write-once slot.

### State machine
The set of filled slots is exposed as a [`FormatSet`] bitmask. A cache is created with exactly one
filled slot; requesting a missing encoding derives it once and fills its slot. Slots are never
cleared, so the bitmask only ever grows and reaches `COO|CSR|CSC` after at most two conversions.

### Sharing
Slots are reference-counted on their own. A cache built by [`FormatCache::reversed`] uses the CSC
slot of the original as its CSR slot and vice versa: filling one of them through either cache fills
it for both, and the buffers are never copied.

The COO of the reversed relation is a different (transposed) matrix, so a cache carries a fourth
slot for the transposed view of its COO. Reversal swaps the COO slot with that view slot, which makes
reversing twice return the very same COO slot even if the COO is filled only afterwards. The view
slot is not an encoding of the relation and never shows up in the bitmask.

### Derivation order
- CSR: from the COO if present, otherwise by transposing the CSC
- CSC: from the COO if present, otherwise by transposing the CSR
- COO: by transposing the view slot if filled, else expanding the CSR if present, otherwise by
  expanding the CSC
*/

use std::sync::{Arc, OnceLock};

use tracing::{debug, trace};

use crate::{
    convert,
    edge::NumEdges,
    error::{GraphError, Result},
    format::{FormatSet, SparseFormat},
    matrix::{CooMatrix, CsrMatrix},
};

type Slot<M> = Arc<OnceLock<M>>;

fn filled<M>(matrix: M) -> Slot<M> {
    Arc::new(OnceLock::from(matrix))
}

fn empty<M>() -> Slot<M> {
    Arc::new(OnceLock::new())
}

/// Lazily filled store of the three encodings of one relation.
#[derive(Debug)]
pub struct FormatCache {
    coo: Slot<CooMatrix>,
    coo_t: Slot<CooMatrix>,
    csr: Slot<CsrMatrix>,
    csc: Slot<CsrMatrix>,
}

impl FormatCache {
    /// Creates a cache holding only a COO
    pub fn with_coo(coo: CooMatrix) -> Self {
        Self {
            coo: filled(coo),
            coo_t: empty(),
            csr: empty(),
            csc: empty(),
        }
    }

    /// Creates a cache holding only a CSR (rows are sources)
    pub fn with_csr(csr: CsrMatrix) -> Self {
        Self {
            coo: empty(),
            coo_t: empty(),
            csr: filled(csr),
            csc: empty(),
        }
    }

    /// Creates a cache holding only a CSC (rows are destinations)
    pub fn with_csc(csc: CsrMatrix) -> Self {
        Self {
            coo: empty(),
            coo_t: empty(),
            csr: empty(),
            csc: filled(csc),
        }
    }

    /// Returns the bitmask of materialized encodings. Never converts.
    ///
    /// # Examples
    /// ```
    /// use relgraph::{cache::FormatCache, format::FormatSet, matrix::CooMatrix};
    ///
    /// let cache = FormatCache::with_coo(CooMatrix::new(2, 3, vec![0u32].into(), vec![2u32].into()));
    /// assert_eq!(cache.formats_in_use(), FormatSet::COO);
    ///
    /// cache.csc();
    /// assert_eq!(cache.formats_in_use(), FormatSet::COO | FormatSet::CSC);
    /// ```
    pub fn formats_in_use(&self) -> FormatSet {
        let mut set = FormatSet::EMPTY;
        if self.coo.get().is_some() {
            set |= SparseFormat::Coo;
        }
        if self.csr.get().is_some() {
            set |= SparseFormat::Csr;
        }
        if self.csc.get().is_some() {
            set |= SparseFormat::Csc;
        }
        set
    }

    /// Materializes `format` if it is missing. Redundant calls are no-ops.
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidFormat`] for `Any`/`Auto`, which do not name an encoding.
    pub fn ensure(&self, format: SparseFormat) -> Result<()> {
        match format {
            SparseFormat::Coo => {
                self.coo();
            }
            SparseFormat::Csr => {
                self.csr();
            }
            SparseFormat::Csc => {
                self.csc();
            }
            SparseFormat::Any | SparseFormat::Auto => {
                return Err(GraphError::InvalidFormat(format!(
                    "cannot materialize {format}"
                )));
            }
        }
        Ok(())
    }

    /// Returns the COO, deriving it first if necessary
    pub fn coo(&self) -> &CooMatrix {
        self.coo.get_or_init(|| {
            if let Some(coo_t) = self.coo_t.get() {
                debug!(nnz = coo_t.nnz(), "deriving COO from the transposed view");
                coo_t.transpose()
            } else if let Some(csr) = self.csr.get() {
                debug!(nnz = csr.nnz(), "deriving COO from CSR");
                convert::csr_to_coo(csr)
            } else if let Some(csc) = self.csc.get() {
                debug!(nnz = csc.nnz(), "deriving COO from CSC");
                convert::csc_to_coo(csc)
            } else {
                panic!("{}", GraphError::EmptyCache)
            }
        })
    }

    /// Returns the CSR, deriving it first if necessary
    pub fn csr(&self) -> &CsrMatrix {
        self.csr.get_or_init(|| {
            if let Some(coo) = self.coo.get() {
                debug!(nnz = coo.nnz(), "deriving CSR from COO");
                convert::coo_to_csr(coo)
            } else if let Some(csc) = self.csc.get() {
                debug!(nnz = csc.nnz(), "deriving CSR by transposing CSC");
                convert::transpose(csc)
            } else {
                panic!("{}", GraphError::EmptyCache)
            }
        })
    }

    /// Returns the CSC, deriving it first if necessary
    pub fn csc(&self) -> &CsrMatrix {
        self.csc.get_or_init(|| {
            if let Some(coo) = self.coo.get() {
                debug!(nnz = coo.nnz(), "deriving CSC from COO");
                convert::coo_to_csc(coo)
            } else if let Some(csr) = self.csr.get() {
                debug!(nnz = csr.nnz(), "deriving CSC by transposing CSR");
                convert::transpose(csr)
            } else {
                panic!("{}", GraphError::EmptyCache)
            }
        })
    }

    /// Returns the COO only if it is materialized
    pub fn peek_coo(&self) -> Option<&CooMatrix> {
        self.coo.get()
    }

    /// Returns the CSR only if it is materialized
    pub fn peek_csr(&self) -> Option<&CsrMatrix> {
        self.csr.get()
    }

    /// Returns the CSC only if it is materialized
    pub fn peek_csc(&self) -> Option<&CsrMatrix> {
        self.csc.get()
    }

    /// Returns the number of edges, read from any materialized encoding
    pub fn num_edges(&self) -> NumEdges {
        let nnz = self
            .peek_csr()
            .or_else(|| self.peek_csc())
            .map(|m| m.nnz())
            .or_else(|| self.peek_coo().map(|m| m.nnz()));

        match nnz {
            Some(nnz) => nnz as NumEdges,
            None => panic!("{}", GraphError::EmptyCache),
        }
    }

    /// Returns the cache of the reversed relation.
    ///
    /// The CSR and CSC slots are shared crosswise with `self`, as are the COO slot and the slot of
    /// its transposed view. If `self` has a COO, the reversed cache has one as well.
    pub fn reversed(&self) -> Self {
        if let Some(coo) = self.coo.get() {
            self.coo_t.get_or_init(|| coo.transpose());
        }
        trace!(formats = %self.formats_in_use(), "reversing format cache");

        Self {
            coo: self.coo_t.clone(),
            coo_t: self.coo.clone(),
            csr: self.csc.clone(),
            csc: self.csr.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[test]
    fn ensure_is_idempotent_and_monotone() {
        let cache = FormatCache::with_csr(csr1());
        assert_eq!(cache.formats_in_use(), 2);

        cache.ensure(SparseFormat::Csc).unwrap();
        assert_eq!(cache.formats_in_use(), 6);

        let csc = cache.csc().clone();
        cache.ensure(SparseFormat::Csc).unwrap();
        assert!(cache.csc().indices.same_buffer(&csc.indices));

        cache.ensure(SparseFormat::Coo).unwrap();
        assert_eq!(cache.formats_in_use(), FormatSet::ALL);
    }

    #[test]
    fn ensure_rejects_preferences() {
        let cache = FormatCache::with_coo(coo1());
        for format in [SparseFormat::Any, SparseFormat::Auto] {
            assert!(matches!(
                cache.ensure(format),
                Err(GraphError::InvalidFormat(_))
            ));
        }
        assert_eq!(cache.formats_in_use(), FormatSet::COO);
    }

    #[test]
    fn derivation_prefers_coo() {
        let cache = FormatCache::with_coo(coo1());
        let csc = cache.csc().clone();
        let csr = cache.csr();

        // derived from the row-sorted COO, not by transposing the CSC
        assert!(csr.indices.same_buffer(&cache.coo().col));
        assert_eq!(csc.num_rows, 3);
    }

    #[test]
    fn reversed_shares_compressed_slots() {
        let cache = FormatCache::with_csc(csr1());
        let rev = cache.reversed();
        assert_eq!(rev.formats_in_use(), FormatSet::CSR);
        assert!(rev.csr().indptr.same_buffer(&cache.csc().indptr));

        cache.csr();
        assert_eq!(cache.formats_in_use(), 6);
        assert_eq!(rev.formats_in_use(), 6);

        cache.coo();
        assert_eq!(cache.formats_in_use(), 7);
        assert_eq!(rev.formats_in_use(), 6);
    }

    #[test]
    fn reversed_transposes_coo() {
        let cache = FormatCache::with_coo(coo1());
        let rev = cache.reversed();
        assert_eq!(rev.formats_in_use(), FormatSet::COO);

        let (coo, rcoo) = (cache.coo(), rev.coo());
        assert!(coo.row.same_buffer(&rcoo.col));
        assert!(coo.col.same_buffer(&rcoo.row));
        assert_eq!((rcoo.num_rows, rcoo.num_cols), (coo.num_cols, coo.num_rows));
    }

    #[test]
    fn coo_filled_after_reversal_is_shared() {
        let cache = FormatCache::with_csr(csr1());
        let rev = cache.reversed();
        let twice = rev.reversed();

        let coo = twice.coo();
        assert_eq!(twice.formats_in_use(), FormatSet::COO | FormatSet::CSR);
        assert_eq!(cache.formats_in_use(), FormatSet::COO | FormatSet::CSR);
        assert!(cache.coo().row.same_buffer(&coo.row));

        // the reversed COO is the transposed view of the same buffers
        assert_eq!(rev.formats_in_use(), FormatSet::CSC);
        let rcoo = rev.coo();
        assert!(rcoo.col.same_buffer(&coo.row));
        assert!(rcoo.row.same_buffer(&coo.col));
    }

    #[test]
    fn num_edges_does_not_convert() {
        let cache = FormatCache::with_csc(csr1());
        assert_eq!(cache.num_edges(), 6);
        assert_eq!(cache.formats_in_use(), FormatSet::CSC);
    }
}
