/*!
# Relation Operations

[`Relation`] is the stable interface through which multi-relation containers and traversal code
talk to a single relation graph. Containers store handles behind it (generically or as
`dyn Relation`) and never need to recover the concrete type.

[`RelationAdjacency`] builds neighborhood queries on top of it and is implemented for every
[`Relation`].
*/

use itertools::Itertools;

use crate::{
    edge::{Edge, NumEdges},
    error::Result,
    format::{FormatSet, SparseFormat},
    matrix::{CooMatrix, CsrMatrix},
    node::{Node, NumNodes},
};

/// A single relation between a source and a destination vertex set.
pub trait Relation {
    /// Returns the number of source vertices
    fn num_src_vertices(&self) -> NumNodes;

    /// Returns the number of destination vertices
    fn num_dst_vertices(&self) -> NumNodes;

    /// Returns the number of edges without materializing any encoding
    fn number_of_edges(&self) -> NumEdges;

    /// Returns the COO (rows are sources), materializing it if necessary.
    /// ** Panics if `relation_index != 0` **
    fn get_coo(&self, relation_index: usize) -> &CooMatrix;

    /// Returns the CSR (rows are sources), materializing it if necessary.
    /// ** Panics if `relation_index != 0` **
    fn get_csr(&self, relation_index: usize) -> &CsrMatrix;

    /// Returns the CSC (rows are destinations), materializing it if necessary.
    /// ** Panics if `relation_index != 0` **
    fn get_csc(&self, relation_index: usize) -> &CsrMatrix;

    /// Returns the bitmask of currently materialized encodings
    fn get_format_in_use(&self) -> FormatSet;

    /// Returns a handle over the same format cache after materializing `format`.
    /// Conversions through either handle are visible through both.
    /// `Any`/`Auto` alias the cache without converting.
    fn restrict_to(&self, format: SparseFormat) -> Result<Self>
    where
        Self: Sized;

    /// Returns the relation with all edges reversed.
    /// CSR and CSC storage is shared crosswise with `self`.
    fn reverse(&self) -> Self
    where
        Self: Sized;
}

/// Neighborhood queries on a [`Relation`].
///
/// Queries on source vertices go through the CSR, queries on destination vertices through the
/// CSC; both are materialized on first use.
pub trait RelationAdjacency: Relation {
    /// Returns the number of out-edges of source `u`.
    /// ** Panics if `u >= num_src_vertices` **
    fn out_degree(&self, u: Node) -> NumEdges {
        self.get_csr(0).row_len(u)
    }

    /// Returns the number of in-edges of destination `v`.
    /// ** Panics if `v >= num_dst_vertices` **
    fn in_degree(&self, v: Node) -> NumEdges {
        self.get_csc(0).row_len(v)
    }

    /// Returns the destinations of the out-edges of `u` (with multiplicity)
    /// ** Panics if `u >= num_src_vertices` **
    fn successors(&self, u: Node) -> &[Node] {
        &self.get_csr(0)[u]
    }

    /// Returns the sources of the in-edges of `v` (with multiplicity)
    /// ** Panics if `v >= num_dst_vertices` **
    fn predecessors(&self, v: Node) -> &[Node] {
        &self.get_csc(0)[v]
    }

    /// Returns the edge ids of the out-edges of `u`, aligned with [`RelationAdjacency::successors`]
    fn out_edge_ids(&self, u: Node) -> impl Iterator<Item = NumEdges> + '_ {
        self.get_csr(0).row_edge_ids(u)
    }

    /// Returns the edge ids of the in-edges of `v`, aligned with [`RelationAdjacency::predecessors`]
    fn in_edge_ids(&self, v: Node) -> impl Iterator<Item = NumEdges> + '_ {
        self.get_csc(0).row_edge_ids(v)
    }

    /// Returns *true* if there is at least one edge `u -> v`.
    ///
    /// Uses the CSC if it is the only compressed encoding materialized, otherwise the CSR.
    fn has_edge_between(&self, u: Node, v: Node) -> bool {
        let in_use = self.get_format_in_use();
        if in_use.contains(SparseFormat::Csc) && !in_use.contains(SparseFormat::Csr) {
            self.get_csc(0).row_contains(v, u)
        } else {
            self.get_csr(0).row_contains(u, v)
        }
    }

    /// Iterates over all edges in COO storage order
    fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.get_coo(0).iter().map(|(_, e)| e)
    }

    /// Returns the edge with id `eid` or `None` if there is no such edge.
    ///
    /// This is `O(1)` if the COO stores edges in id order and `O(E)` otherwise.
    fn find_edge(&self, eid: NumEdges) -> Option<Edge> {
        let coo = self.get_coo(0);
        let pos = match &coo.data {
            None => Some(eid as usize).filter(|&p| p < coo.nnz()),
            Some(data) => data.iter().position(|&x| x == eid),
        };
        pos.map(|p| Edge(coo.row[p], coo.col[p]))
    }

    /// Returns all edges sorted lexicographically (with multiplicity).
    /// Two relations with equal results hold the same edge multiset.
    fn sorted_edges(&self) -> Vec<Edge> {
        self.edges().sorted_unstable().collect()
    }
}

impl<R: Relation + ?Sized> RelationAdjacency for R {}
