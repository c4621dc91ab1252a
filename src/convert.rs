/*!
# Conversion Engine

Pure, deterministic derivations of one encoding from another. All routines run in `O(V + E)`
and preserve edge ids: the entry of a logical edge carries the same id in every encoding.

| from  | to    | routine          | notes                                                    |
|-------|-------|------------------|----------------------------------------------------------|
| COO   | CSR   | [`coo_to_csr`]   | counting pass over rows, stable scatter                  |
| COO   | CSC   | [`coo_to_csc`]   | counting pass over columns, stable scatter               |
| CSR   | COO   | [`csr_to_coo`]   | expands `indptr`; `indices` becomes `col` (shared)       |
| CSC   | COO   | [`csc_to_coo`]   | expands `indptr`; `indices` becomes `row` (shared)       |
| CSR   | CSC   | [`transpose`]    | histogram rebuild; the reverse direction is the same call|

When the compressed axis of a COO is already non-decreasing, the scatter is the identity and the
complementary coordinate array is shared instead of copied.

Converting between CSR and CSC of the *same* relation needs a real transposition. The zero-copy
variant, reading the CSR of a relation as the CSC of its reverse, is not a conversion at all and is
handled by [`RelationGraph::reverse`](crate::graph::RelationGraph).
*/

use itertools::Itertools;

use crate::{
    array::{DeviceContext, IdArray},
    edge::NumEdges,
    matrix::{CooMatrix, CsrMatrix, edge_id_at},
    node::{Node, NumNodes},
};

/// Compresses a COO by its rows (sources).
///
/// The result is `sorted` iff the COO's `col` is known to be non-decreasing.
///
/// # Examples
/// ```
/// use relgraph::{convert::coo_to_csr, matrix::CooMatrix};
///
/// let coo = CooMatrix::new(2, 3, vec![0u32, 0, 1].into(), vec![0u32, 1, 1].into());
/// let csr = coo_to_csr(&coo);
///
/// assert_eq!(&csr.indptr[..], &[0, 2, 3]);
/// assert_eq!(&csr.indices[..], &[0, 1, 1]);
/// ```
pub fn coo_to_csr(coo: &CooMatrix) -> CsrMatrix {
    compress(
        coo.num_rows,
        coo.num_cols,
        &coo.row,
        &coo.col,
        coo.data.as_ref(),
        coo.col_sorted,
    )
}

/// Compresses a COO by its columns (destinations).
/// The resulting matrix has `num_rows = coo.num_cols`.
///
/// The result is `sorted` iff the COO's `row` is known to be non-decreasing.
pub fn coo_to_csc(coo: &CooMatrix) -> CsrMatrix {
    compress(
        coo.num_cols,
        coo.num_rows,
        &coo.col,
        &coo.row,
        coo.data.as_ref(),
        coo.row_sorted,
    )
}

/// Buckets entries by `keys` into `num_rows` segments holding the matching `values`
fn compress(
    num_rows: NumNodes,
    num_cols: NumNodes,
    keys: &IdArray,
    values: &IdArray,
    data: Option<&IdArray>,
    values_sorted: bool,
) -> CsrMatrix {
    let ctx = values.context();
    let indptr = prefix_sum(num_rows, keys);

    // A non-decreasing key array means the stable scatter is the identity permutation
    if keys.is_non_decreasing() {
        return CsrMatrix {
            num_rows,
            num_cols,
            indptr: IdArray::with_context(indptr, ctx),
            indices: values.clone(),
            data: data.cloned(),
            sorted: values_sorted,
        };
    }

    let mut cursor = indptr[..num_rows as usize].to_vec();
    let mut indices = vec![0 as Node; values.len()];
    let mut edge_ids = vec![0 as NumEdges; values.len()];

    for (pos, (&k, &v)) in keys.iter().zip_eq(values.iter()).enumerate() {
        let slot = &mut cursor[k as usize];
        indices[*slot as usize] = v;
        edge_ids[*slot as usize] = edge_id_at(data, pos);
        *slot += 1;
    }

    CsrMatrix {
        num_rows,
        num_cols,
        indptr: IdArray::with_context(indptr, ctx),
        indices: IdArray::with_context(indices, ctx),
        data: edge_id_array(edge_ids, ctx),
        sorted: values_sorted,
    }
}

/// Expands a CSR into a COO. `col` shares the storage of `csr.indices`.
///
/// # Examples
/// ```
/// use relgraph::{convert::csr_to_coo, matrix::CsrMatrix};
///
/// let csr = CsrMatrix::new(3, 2, vec![0u32, 2, 2, 3].into(), vec![1u32, 0, 1].into());
/// let coo = csr_to_coo(&csr);
///
/// assert_eq!(&coo.row[..], &[0, 0, 2]);
/// assert!(coo.col.same_buffer(&csr.indices));
/// assert!(coo.row_sorted);
/// ```
pub fn csr_to_coo(csr: &CsrMatrix) -> CooMatrix {
    let row = IdArray::with_context(expand(&csr.indptr), csr.context());
    let col = csr.indices.clone();

    CooMatrix {
        num_rows: csr.num_rows,
        num_cols: csr.num_cols,
        row_sorted: true,
        col_sorted: col.is_non_decreasing(),
        row,
        col,
        data: csr.data.clone(),
    }
}

/// Expands a CSC (rows are destinations) into a COO of the relation.
/// `row` shares the storage of `csc.indices`.
pub fn csc_to_coo(csc: &CsrMatrix) -> CooMatrix {
    let col = IdArray::with_context(expand(&csc.indptr), csc.context());
    let row = csc.indices.clone();

    CooMatrix {
        num_rows: csc.num_cols,
        num_cols: csc.num_rows,
        row_sorted: row.is_non_decreasing(),
        col_sorted: true,
        row,
        col,
        data: csc.data.clone(),
    }
}

/// Transposes a compressed matrix, turning a CSR into the CSC of the same relation and vice versa.
///
/// Rows are visited in ascending order, so every segment of the result is sorted.
///
/// # Examples
/// ```
/// use relgraph::{convert::transpose, matrix::CsrMatrix};
///
/// let csr = CsrMatrix::new(4, 3, vec![0u32, 1, 3, 4, 6].into(), vec![2u32, 0, 2, 1, 0, 2].into());
/// let csc = transpose(&csr);
///
/// assert_eq!((csc.num_rows, csc.num_cols), (3, 4));
/// assert_eq!(&csc.indptr[..], &[0, 2, 3, 6]);
/// assert_eq!(&csc.indices[..], &[1, 3, 2, 0, 1, 3]);
/// assert!(csc.sorted);
/// ```
pub fn transpose(csr: &CsrMatrix) -> CsrMatrix {
    let ctx = csr.context();
    let indptr = prefix_sum(csr.num_cols, &csr.indices);

    let mut cursor = indptr[..csr.num_cols as usize].to_vec();
    let mut indices = vec![0 as Node; csr.nnz()];
    let mut edge_ids = vec![0 as NumEdges; csr.nnz()];

    for r in 0..csr.num_rows {
        for pos in csr.row_range(r) {
            let slot = &mut cursor[csr.indices[pos] as usize];
            indices[*slot as usize] = r;
            edge_ids[*slot as usize] = csr.edge_id(pos);
            *slot += 1;
        }
    }

    CsrMatrix {
        num_rows: csr.num_cols,
        num_cols: csr.num_rows,
        indptr: IdArray::with_context(indptr, ctx),
        indices: IdArray::with_context(indices, ctx),
        data: edge_id_array(edge_ids, ctx),
        sorted: true,
    }
}

/// Sorts the indices of every segment, permuting the edge ids alongside.
///
/// Equal indices keep their relative order. Sorted inputs are returned as-is (sharing all arrays);
/// otherwise `indptr` is shared and `indices`/`data` are rebuilt.
pub fn sort_indices(csr: &CsrMatrix) -> CsrMatrix {
    if csr.sorted || csr.segments_sorted() {
        return CsrMatrix {
            sorted: true,
            ..csr.clone()
        };
    }

    let ctx = csr.context();
    let mut indices = Vec::with_capacity(csr.nnz());
    let mut edge_ids = Vec::with_capacity(csr.nnz());

    for r in 0..csr.num_rows {
        let segment = csr
            .row_range(r)
            .map(|pos| (csr.indices[pos], csr.edge_id(pos)))
            .sorted_by_key(|&(c, _)| c);

        for (c, eid) in segment {
            indices.push(c);
            edge_ids.push(eid);
        }
    }

    CsrMatrix {
        num_rows: csr.num_rows,
        num_cols: csr.num_cols,
        indptr: csr.indptr.clone(),
        indices: IdArray::with_context(indices, ctx),
        data: edge_id_array(edge_ids, ctx),
        sorted: true,
    }
}

/// Counts the occurrences of every key in `0..num_slots` and returns their exclusive prefix sum
fn prefix_sum(num_slots: NumNodes, keys: &[Node]) -> Vec<Node> {
    let mut indptr = vec![0 as Node; num_slots as usize + 1];
    for &k in keys {
        indptr[k as usize + 1] += 1;
    }
    for r in 0..num_slots as usize {
        indptr[r + 1] += indptr[r];
    }
    indptr
}

/// Repeats every row id `r` exactly `indptr[r+1] - indptr[r]` times
fn expand(indptr: &[Node]) -> Vec<Node> {
    let nnz = indptr.last().copied().unwrap_or(0) as usize;
    let mut out = Vec::with_capacity(nnz);
    for (r, w) in indptr.windows(2).enumerate() {
        out.extend(itertools::repeat_n(r as Node, (w[1] - w[0]) as usize));
    }
    out
}

/// Drops an edge id array that is the identity, as absent `data` means exactly that
fn edge_id_array(edge_ids: Vec<NumEdges>, ctx: DeviceContext) -> Option<IdArray> {
    let identity = edge_ids
        .iter()
        .enumerate()
        .all(|(pos, &eid)| eid as usize == pos);

    (!identity).then(|| IdArray::with_context(edge_ids, ctx))
}
