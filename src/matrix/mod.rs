/*!
# Sparse Matrices

The two matrix types every encoding of a relation is expressed in:

- [`CooMatrix`]: coordinate list with parallel `row`/`col` arrays,
- [`CsrMatrix`]: compressed rows with an `indptr` offset array and a flat `indices` array.

CSC needs no type of its own: the in-edges of a relation `(src, dst)` are exactly the CSR of the
reversed relation `(dst, src)`. A CSC is therefore a [`CsrMatrix`] whose rows are destinations.

All arrays are [`IdArray`]s, so matrices are cheap to clone and may share storage with each other.
An optional `data` array maps every stored entry to the id of its logical edge; without it, the
edge id of an entry is its position.
*/

use crate::{array::IdArray, edge::NumEdges};

mod coo;
mod csr;

pub use coo::*;
pub use csr::*;

/// Returns the edge id stored at `pos`
#[inline]
pub(crate) fn edge_id_at(data: Option<&IdArray>, pos: usize) -> NumEdges {
    data.map_or(pos as NumEdges, |d| d[pos])
}
