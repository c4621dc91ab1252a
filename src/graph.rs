/*!
# Relation Graphs

A [`RelationGraph`] is the handle through which a relation is used: the two vertex counts plus a
shared [`FormatCache`] holding the materialized encodings.

- Handles are created from exactly one encoding (see [`GraphBuilder`] and the `build_from_*`
  shortcuts) and are immutable in their edge set afterwards.
- Requesting an encoding through [`Relation::get_coo`], [`Relation::get_csr`] or
  [`Relation::get_csc`] fills the cache lazily.
- [`Relation::restrict_to`] and `clone` alias the cache: conversions through one handle are seen
  by all of them.
- [`Relation::reverse`] shares the CSR/CSC storage crosswise, so the out-edges of a relation are
  the in-edges of its reverse without any copy.

# Example
```
use relgraph::prelude::*;

let g = RelationGraph::build_from_csr(
    4,
    3,
    vec![0u32, 1, 3, 4, 6],
    vec![2u32, 0, 2, 1, 0, 2],
)
.unwrap();
assert_eq!(g.get_format_in_use(), FormatSet::CSR);

let csc = g.get_csc(0);
assert_eq!((csc.num_rows, csc.num_cols), (3, 4));
assert_eq!(g.get_format_in_use(), FormatSet::CSR | FormatSet::CSC);

// out-edges of the reverse are the in-edges of `g`, sharing storage
let r = g.reverse();
assert!(r.get_csr(0).indices.same_buffer(&g.get_csc(0).indices));
```
*/

use std::sync::Arc;

use tracing::debug;

use crate::{
    array::{DeviceContext, IdArray},
    cache::FormatCache,
    convert,
    edge::NumEdges,
    error::{GraphError, Result},
    format::{FormatSet, SparseFormat},
    matrix::{CooMatrix, CsrMatrix},
    node::NumNodes,
    ops::Relation,
};

/// Handle of a single relation between `num_src` source and `num_dst` destination vertices.
///
/// Cloning a handle aliases its format cache, like [`Relation::restrict_to`] with
/// [`SparseFormat::Any`].
#[derive(Debug, Clone)]
pub struct RelationGraph {
    num_src: NumNodes,
    num_dst: NumNodes,
    cache: Arc<FormatCache>,
}

impl RelationGraph {
    /// Builds a relation from parallel source/destination arrays.
    ///
    /// # Errors
    /// Fails with [`GraphError::DimensionMismatch`] if a vertex id exceeds its count and with
    /// [`GraphError::LengthMismatch`] if the arrays differ in length.
    pub fn build_from_coo(
        num_src: NumNodes,
        num_dst: NumNodes,
        row: impl Into<IdArray>,
        col: impl Into<IdArray>,
    ) -> Result<Self> {
        GraphBuilder::new().coo(num_src, num_dst, row, col)
    }

    /// Builds a relation from out-edge offsets (one per source plus one) and destinations.
    ///
    /// # Errors
    /// Fails with [`GraphError::MalformedIndptr`] or [`GraphError::DimensionMismatch`] on
    /// invalid input.
    pub fn build_from_csr(
        num_src: NumNodes,
        num_dst: NumNodes,
        indptr: impl Into<IdArray>,
        indices: impl Into<IdArray>,
    ) -> Result<Self> {
        GraphBuilder::new().csr(num_src, num_dst, indptr, indices)
    }

    /// Builds a relation from in-edge offsets (one per destination plus one) and sources.
    ///
    /// # Errors
    /// Fails with [`GraphError::MalformedIndptr`] or [`GraphError::DimensionMismatch`] on
    /// invalid input.
    pub fn build_from_csc(
        num_src: NumNodes,
        num_dst: NumNodes,
        indptr: impl Into<IdArray>,
        indices: impl Into<IdArray>,
    ) -> Result<Self> {
        GraphBuilder::new().csc(num_src, num_dst, indptr, indices)
    }

    /// Builds a relation of a single vertex set onto itself
    pub fn build_unipartite_from_coo(
        num_vertices: NumNodes,
        row: impl Into<IdArray>,
        col: impl Into<IdArray>,
    ) -> Result<Self> {
        Self::build_from_coo(num_vertices, num_vertices, row, col)
    }

    /// Returns *true* if the relation is square, i.e. both endpoints can come from the same vertex
    /// set. Bipartite relations between two equally sized sets are reported as unipartite as well.
    pub fn is_unipartite(&self) -> bool {
        self.num_src == self.num_dst
    }

    /// Returns the format cache of this handle
    pub fn cache(&self) -> &FormatCache {
        &self.cache
    }

    /// Returns *true* if both handles use the very same format cache
    pub fn shares_cache_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cache, &other.cache)
    }

    /// Returns the context the arrays of this relation are tagged with
    pub fn context(&self) -> DeviceContext {
        let cache = &self.cache;
        cache
            .peek_csr()
            .or_else(|| cache.peek_csc())
            .map(|m| m.context())
            .or_else(|| cache.peek_coo().map(|m| m.context()))
            .unwrap_or_default()
    }

    fn check_relation(relation_index: usize) {
        assert_eq!(
            relation_index, 0,
            "a relation graph holds exactly one relation, got index {relation_index}"
        );
    }
}

impl Relation for RelationGraph {
    fn num_src_vertices(&self) -> NumNodes {
        self.num_src
    }

    fn num_dst_vertices(&self) -> NumNodes {
        self.num_dst
    }

    fn number_of_edges(&self) -> NumEdges {
        self.cache.num_edges()
    }

    fn get_coo(&self, relation_index: usize) -> &CooMatrix {
        Self::check_relation(relation_index);
        self.cache.coo()
    }

    fn get_csr(&self, relation_index: usize) -> &CsrMatrix {
        Self::check_relation(relation_index);
        self.cache.csr()
    }

    fn get_csc(&self, relation_index: usize) -> &CsrMatrix {
        Self::check_relation(relation_index);
        self.cache.csc()
    }

    fn get_format_in_use(&self) -> FormatSet {
        self.cache.formats_in_use()
    }

    fn restrict_to(&self, format: SparseFormat) -> Result<Self> {
        if format.is_concrete() {
            self.cache.ensure(format)?;
        }
        Ok(self.clone())
    }

    fn reverse(&self) -> Self {
        Self {
            num_src: self.num_dst,
            num_dst: self.num_src,
            cache: Arc::new(self.cache.reversed()),
        }
    }
}

/// An encoding handed to the builder
enum Input {
    Coo(CooMatrix),
    Csr(CsrMatrix),
    Csc(CsrMatrix),
}

/// Configurable constructor for [`RelationGraph`]s.
///
/// - `format`: encoding the new handle should hold. A concrete format converts the input once and
///   keeps only the result; `Any`/`Auto` (default) keep the input as-is.
/// - `context`: retags all input arrays with this context (storage is not copied).
/// - `sort_indices`: sorts the segments of a compressed initial encoding (also one produced by
///   `format`). A COO initial encoding is kept as-is.
///
/// # Examples
/// ```
/// use relgraph::prelude::*;
///
/// let g = GraphBuilder::new()
///     .format(SparseFormat::Csr)
///     .coo(2, 9, vec![1u32, 0, 1], vec![6u32, 2, 2])
///     .unwrap();
///
/// assert_eq!(g.get_format_in_use(), FormatSet::CSR);
/// assert_eq!(g.successors(1), &[6, 2]);
/// ```
#[derive(Debug, Copy, Clone, Default)]
pub struct GraphBuilder {
    format: SparseFormat,
    context: Option<DeviceContext>,
    sort_indices: bool,
}

impl GraphBuilder {
    /// Creates a builder that keeps the input encoding
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the encoding the handle starts with
    pub fn format(mut self, format: SparseFormat) -> Self {
        self.format = format;
        self
    }

    /// Updates the context input arrays are tagged with
    pub fn context(mut self, ctx: DeviceContext) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Updates whether compressed initial encodings get sorted segments
    pub fn sort_indices(mut self, sort: bool) -> Self {
        self.sort_indices = sort;
        self
    }

    /// Builds a relation from parallel source/destination arrays
    pub fn coo(
        &self,
        num_src: NumNodes,
        num_dst: NumNodes,
        row: impl Into<IdArray>,
        col: impl Into<IdArray>,
    ) -> Result<RelationGraph> {
        self.coo_matrix(
            num_src,
            num_dst,
            CooMatrix::new(num_src, num_dst, row.into(), col.into()),
        )
    }

    /// Builds a relation from out-edge offsets and destinations
    pub fn csr(
        &self,
        num_src: NumNodes,
        num_dst: NumNodes,
        indptr: impl Into<IdArray>,
        indices: impl Into<IdArray>,
    ) -> Result<RelationGraph> {
        self.csr_matrix(
            num_src,
            num_dst,
            CsrMatrix::new(num_src, num_dst, indptr.into(), indices.into()),
        )
    }

    /// Builds a relation from in-edge offsets and sources
    pub fn csc(
        &self,
        num_src: NumNodes,
        num_dst: NumNodes,
        indptr: impl Into<IdArray>,
        indices: impl Into<IdArray>,
    ) -> Result<RelationGraph> {
        self.csc_matrix(
            num_src,
            num_dst,
            CsrMatrix::new(num_dst, num_src, indptr.into(), indices.into()),
        )
    }

    /// Builds a relation from a complete COO with rows as sources
    pub fn coo_matrix(
        &self,
        num_src: NumNodes,
        num_dst: NumNodes,
        coo: CooMatrix,
    ) -> Result<RelationGraph> {
        check_shape("COO", (num_src, num_dst), (coo.num_rows, coo.num_cols))?;
        coo.validate()?;
        Ok(self.finish(num_src, num_dst, Input::Coo(coo)))
    }

    /// Builds a relation from a complete CSR with rows as sources
    pub fn csr_matrix(
        &self,
        num_src: NumNodes,
        num_dst: NumNodes,
        csr: CsrMatrix,
    ) -> Result<RelationGraph> {
        check_shape("CSR", (num_src, num_dst), (csr.num_rows, csr.num_cols))?;
        csr.validate()?;
        Ok(self.finish(num_src, num_dst, Input::Csr(csr)))
    }

    /// Builds a relation from a complete CSC with rows as destinations
    pub fn csc_matrix(
        &self,
        num_src: NumNodes,
        num_dst: NumNodes,
        csc: CsrMatrix,
    ) -> Result<RelationGraph> {
        check_shape("CSC", (num_dst, num_src), (csc.num_rows, csc.num_cols))?;
        csc.validate()?;
        Ok(self.finish(num_src, num_dst, Input::Csc(csc)))
    }

    fn finish(&self, num_src: NumNodes, num_dst: NumNodes, input: Input) -> RelationGraph {
        let input = match self.context {
            Some(ctx) => retag(input, ctx),
            None => input,
        };

        let input = match (self.format, input) {
            (SparseFormat::Coo, Input::Csr(csr)) => Input::Coo(convert::csr_to_coo(&csr)),
            (SparseFormat::Coo, Input::Csc(csc)) => Input::Coo(convert::csc_to_coo(&csc)),
            (SparseFormat::Csr, Input::Coo(coo)) => Input::Csr(convert::coo_to_csr(&coo)),
            (SparseFormat::Csr, Input::Csc(csc)) => Input::Csr(convert::transpose(&csc)),
            (SparseFormat::Csc, Input::Coo(coo)) => Input::Csc(convert::coo_to_csc(&coo)),
            (SparseFormat::Csc, Input::Csr(csr)) => Input::Csc(convert::transpose(&csr)),
            (_, input) => input,
        };

        let cache = match input {
            Input::Coo(coo) => {
                if self.sort_indices {
                    debug!("sort_indices has no effect on a COO initial encoding");
                }
                FormatCache::with_coo(coo)
            }
            Input::Csr(csr) if self.sort_indices => {
                FormatCache::with_csr(convert::sort_indices(&csr))
            }
            Input::Csr(csr) => FormatCache::with_csr(csr),
            Input::Csc(csc) if self.sort_indices => {
                FormatCache::with_csc(convert::sort_indices(&csc))
            }
            Input::Csc(csc) => FormatCache::with_csc(csc),
        };

        debug!(
            num_src,
            num_dst,
            num_edges = cache.num_edges(),
            formats = %cache.formats_in_use(),
            "built relation graph"
        );

        RelationGraph {
            num_src,
            num_dst,
            cache: Arc::new(cache),
        }
    }
}

fn check_shape(
    what: &'static str,
    expected: (NumNodes, NumNodes),
    actual: (NumNodes, NumNodes),
) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(GraphError::ShapeMismatch {
            what,
            expected,
            actual,
        })
    }
}

fn retag(input: Input, ctx: DeviceContext) -> Input {
    let retag_csr = |csr: CsrMatrix| CsrMatrix {
        indptr: csr.indptr.retagged(ctx),
        indices: csr.indices.retagged(ctx),
        data: csr.data.map(|d| d.retagged(ctx)),
        ..csr
    };

    match input {
        Input::Coo(coo) => Input::Coo(CooMatrix {
            row: coo.row.retagged(ctx),
            col: coo.col.retagged(ctx),
            data: coo.data.map(|d| d.retagged(ctx)),
            ..coo
        }),
        Input::Csr(csr) => Input::Csr(retag_csr(csr)),
        Input::Csc(csc) => Input::Csc(retag_csr(csc)),
    }
}
