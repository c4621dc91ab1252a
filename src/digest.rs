/*!
# Relation Hash Digests

This module provides the [`RelationDigest`] trait, which computes **hash-based digests** of a
relation that do not depend on the encoding it happens to be stored in.

The digest encodes
- the number of source and destination vertices, and
- the sorted edge list (with multiplicity),

before feeding them into a cryptographic hash function.

## Example
```
use relgraph::prelude::*;

let coo = RelationGraph::build_from_coo(2, 3, vec![1u32, 0], vec![2u32, 0]).unwrap();
let csc = coo.reverse().reverse();
csc.get_csc(0);

assert_eq!(coo.digest_sha256(), csc.digest_sha256());
assert_eq!(coo.digest_sha256().len(), 64);
```
*/

use std::fmt::LowerHex;

use ::digest::{Digest, Output};

use crate::{edge::Edge, node::Node, ops::*};

/// Computes a **canonical hash digest** of a relation.
///
/// Relations holding the same edge multiset over the same vertex counts yield the same digest,
/// regardless of which encodings are materialized or in which order edges are stored.
/// Edge ids are not part of the digest.
pub trait RelationDigest {
    /// Computes a digest using the hash function `D`, returned as a hexadecimal string.
    fn digest<D>(&self) -> String
    where
        Output<D>: LowerHex,
        D: Digest;

    /// Computes a **SHA-256 digest** (64 hex characters).
    fn digest_sha256(&self) -> String {
        self.digest::<sha2::Sha256>()
    }
}

impl<R> RelationDigest for R
where
    R: Relation + ?Sized,
{
    fn digest<D>(&self) -> String
    where
        Output<D>: LowerHex,
        D: Digest,
    {
        let mut hasher = D::new();
        let mut buffer = [0u8; 8];

        let encode = |buf: &mut [u8], u: Node| buf[..4].copy_from_slice(&u.to_le_bytes());

        encode(&mut buffer[0..], self.num_src_vertices());
        encode(&mut buffer[4..], self.num_dst_vertices());
        hasher.update(buffer);

        for Edge(u, v) in self.sorted_edges() {
            encode(&mut buffer[0..], u);
            encode(&mut buffer[4..], v);
            hasher.update(buffer);
        }

        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::{format::SparseFormat, graph::GraphBuilder, testing::*};

    #[test]
    fn encoding_independent() {
        let rng = &mut Pcg64Mcg::seed_from_u64(1);

        for (num_src, num_dst) in SHAPES {
            let coo = random_coo(rng, num_src, num_dst, 50);
            let digests: Vec<String> = SparseFormat::CONCRETE
                .into_iter()
                .map(|format| {
                    GraphBuilder::new()
                        .format(format)
                        .coo_matrix(num_src, num_dst, coo.clone())
                        .unwrap()
                        .digest_sha256()
                })
                .collect();

            assert!(digests.iter().all(|d| *d == digests[0]));
        }
    }

    #[test]
    fn shape_and_direction_matter() {
        let g = GraphBuilder::new().coo(3, 3, vec![0, 1], vec![1, 2]).unwrap();
        let wider = GraphBuilder::new().coo(3, 4, vec![0, 1], vec![1, 2]).unwrap();

        assert_ne!(g.digest_sha256(), wider.digest_sha256());
        assert_ne!(g.digest_sha256(), g.reverse().digest_sha256());
        assert_eq!(g.digest_sha256(), g.reverse().reverse().digest_sha256());
    }

    #[test]
    fn multiplicity_matters() {
        let single = GraphBuilder::new().coo(2, 2, vec![0], vec![1]).unwrap();
        let double = GraphBuilder::new().coo(2, 2, vec![0, 0], vec![1, 1]).unwrap();
        assert_ne!(single.digest_sha256(), double.digest_sha256());
    }
}
