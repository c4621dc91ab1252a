/*!
# Vertex Representation

We choose `Node = u32` as almost all relations involve less than `2^32` vertices per endpoint type.
This saves space compared to `usize`/`u64` and lets index buffers store vertex ids, row offsets and
edge ids in the same element type.
*/

/// Vertices can be any unsigned integer from `0` to `Node::MAX - 1`
pub type Node = u32;

/// There can be at most `2^32 - 1` vertices per endpoint type!
pub type NumNodes = Node;
