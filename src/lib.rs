/*!
`relgraph` stores a single directed relation between a **source** and a **destination** vertex set
as a sparse adjacency matrix that can be held in up to three encodings at once:
- **COO**: parallel arrays of source and destination ids, one entry per edge,
- **CSR**: per-source offsets into an array of destinations (out-edges),
- **CSC**: per-destination offsets into an array of sources (in-edges).

# Representation

Vertices are `u32` in the range `0..n` of their vertex set. Source and destination sets are
counted separately; for unipartite relations both counts are equal.
For **edges**, we use a simple tuple-struct `Edge(Node, Node)` pointing from source to destination.
Parallel edges are allowed and kept with multiplicity.

Every edge has an **edge id**. Ids are the positions of the edges in the encoding the relation
was built from and are preserved by every conversion.

# Design

A relation is created from exactly one encoding. The other encodings are only derived when they
are first requested and then cached for the lifetime of the relation, so the set of materialized
encodings (see [`format::FormatSet`]) grows monotonically.

Handles are cheap: [`graph::RelationGraph`] is a pair of vertex counts and a reference-counted
[`cache::FormatCache`]. Aliasing handles share all conversions; the reverse of a relation shares
its CSR and CSC storage crosswise.

Containers holding many relations should talk to them through the [`ops::Relation`] trait.

# Usage

In most use-cases, `use relgraph::prelude::*;` suffices.

```
use relgraph::prelude::*;

let g = RelationGraph::build_from_coo(3, 2, vec![0u32, 2, 2], vec![1u32, 0, 1]).unwrap();
assert_eq!(g.out_degree(2), 2);
assert_eq!(g.predecessors(1), &[0, 2]);
assert_eq!(g.get_format_in_use(), FormatSet::ALL);
```
*/

pub mod array;
pub mod cache;
pub mod convert;
pub mod digest;
pub mod edge;
pub mod error;
pub mod format;
pub mod graph;
pub mod matrix;
pub mod node;
pub mod ops;
#[cfg(test)]
pub(crate) mod testing;

pub use edge::*;
pub use node::*;

/// `relgraph::prelude` includes definitions for nodes and edges, the relation traits, the
/// encodings and the graph handle.
pub mod prelude {
    pub use super::{
        array::*, digest::RelationDigest, edge::*, error::GraphError, format::*, graph::*,
        matrix::*, node::*, ops::*,
    };
}
