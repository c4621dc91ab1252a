use itertools::Itertools;
use rand::Rng;
use tracing_subscriber::EnvFilter;

use crate::{
    array::IdArray,
    edge::Edge,
    format::SparseFormat,
    graph::{GraphBuilder, RelationGraph},
    matrix::{CooMatrix, CsrMatrix},
    node::{Node, NumNodes},
    ops::RelationAdjacency,
};

/// Shapes `(num_src, num_dst)` used by randomized tests
pub(crate) const SHAPES: [(NumNodes, NumNodes); 4] = [(1, 1), (5, 17), (17, 5), (40, 40)];

/// Installs a test subscriber honoring `RUST_LOG`; later calls are no-ops
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// ```text
/// G = [[0, 0, 1],
///      [1, 0, 1],
///      [0, 1, 0],
///      [1, 0, 1]]
/// ```
pub(crate) fn csr1() -> CsrMatrix {
    CsrMatrix::new(
        4,
        3,
        vec![0, 1, 3, 4, 6].into(),
        vec![2, 0, 2, 1, 0, 2].into(),
    )
}

/// ```text
/// G = [[1, 1, 0],
///      [0, 1, 0]]
/// ```
pub(crate) fn coo1() -> CooMatrix {
    CooMatrix::new(2, 3, vec![0, 0, 1].into(), vec![0, 1, 1].into())
}

/// Creates a COO of `m` random edges (duplicates allowed).
/// Half of the time the edges are sorted by source.
pub(crate) fn random_coo<R: Rng>(
    rng: &mut R,
    num_src: NumNodes,
    num_dst: NumNodes,
    m: usize,
) -> CooMatrix {
    let mut edges = (0..m)
        .map(|_| (rng.random_range(0..num_src), rng.random_range(0..num_dst)))
        .collect_vec();

    if rng.random_bool(0.5) {
        edges.sort_unstable();
    }

    let (row, col): (Vec<Node>, Vec<Node>) = edges.into_iter().unzip();
    CooMatrix::new(num_src, num_dst, IdArray::from(row), IdArray::from(col))
}

/// Creates a relation holding `m` random edges, initially only in `format`
pub(crate) fn random_relation<R: Rng>(
    rng: &mut R,
    format: SparseFormat,
    num_src: NumNodes,
    num_dst: NumNodes,
    m: usize,
) -> RelationGraph {
    GraphBuilder::new()
        .format(format)
        .coo_matrix(num_src, num_dst, random_coo(rng, num_src, num_dst, m))
        .unwrap()
}

/// Returns the sorted edge multiset of the reversed relation
pub(crate) fn reversed_edges<R: RelationAdjacency>(graph: &R) -> Vec<Edge> {
    graph.edges().map(|e| e.reverse()).sorted_unstable().collect()
}

/// Every relation graph, regardless of its initial format, should satisfy these properties
macro_rules! test_relation_props {
    ($env:ident, $format:ident, ($($prop:ident),*)) => {
        mod $env {
            use crate::{
                convert,
                edge::{Edge, NumEdges},
                format::*,
                graph::GraphBuilder,
                ops::*,
                testing::*,
            };
            use itertools::Itertools;
            use rand::{Rng, SeedableRng};
            use rand_pcg::Pcg64Mcg;

            const FORMAT: SparseFormat = SparseFormat::$format;

            $(
                test_relation_props!(@prop $prop);
            )*
        }
    };
    (@prop Monotonicity) => {
        #[test]
        fn bitmask_monotonicity() {
            let rng = &mut Pcg64Mcg::seed_from_u64(3);

            for (num_src, num_dst) in SHAPES {
                for m in [0, 10, 100] {
                    let graph = random_relation(rng, FORMAT, num_src, num_dst, m);
                    assert_eq!(graph.get_format_in_use(), FormatSet::from(FORMAT));

                    let mut prev = graph.get_format_in_use();
                    for _ in 0..6 {
                        let format = SparseFormat::CONCRETE[rng.random_range(0..3)];

                        if format != SparseFormat::Coo && rng.random_bool(0.3) {
                            graph.reverse().restrict_to(format.reversed()).unwrap();
                        } else {
                            graph.restrict_to(format).unwrap();
                        }

                        let now = graph.get_format_in_use();
                        assert!(now.is_superset_of(prev), "{prev} -> {now}");
                        assert!(now.contains(format));
                        prev = now;
                    }

                    for format in SparseFormat::CONCRETE {
                        graph.restrict_to(format).unwrap();
                    }
                    assert_eq!(graph.get_format_in_use(), FormatSet::ALL);
                }
            }
        }
    };
    (@prop RoundTrip) => {
        #[test]
        fn round_trip() {
            let rng = &mut Pcg64Mcg::seed_from_u64(4);

            for (num_src, num_dst) in SHAPES {
                for m in [0, 10, 100] {
                    let coo = random_coo(rng, num_src, num_dst, m);
                    let expected: Vec<(NumEdges, Edge)> = coo.iter().sorted().collect();

                    let graph = GraphBuilder::new()
                        .format(FORMAT)
                        .coo_matrix(num_src, num_dst, coo)
                        .unwrap();

                    // every encoding holds the same edges under the same ids
                    let coo: Vec<_> = graph.get_coo(0).iter().sorted().collect();
                    let csr: Vec<_> = convert::csr_to_coo(graph.get_csr(0)).iter().sorted().collect();
                    let csc: Vec<_> = convert::csc_to_coo(graph.get_csc(0)).iter().sorted().collect();
                    assert_eq!(coo, expected);
                    assert_eq!(csr, expected);
                    assert_eq!(csc, expected);

                    // rebuilding from any other encoding and converting back is lossless
                    let rebuilt = [
                        GraphBuilder::new().coo_matrix(num_src, num_dst, graph.get_coo(0).clone()),
                        GraphBuilder::new().csr_matrix(num_src, num_dst, graph.get_csr(0).clone()),
                        GraphBuilder::new().csc_matrix(num_src, num_dst, graph.get_csc(0).clone()),
                    ];
                    for other in rebuilt {
                        let other = other.unwrap().restrict_to(FORMAT).unwrap();
                        assert_eq!(other.sorted_edges(), graph.sorted_edges());
                        assert_eq!(other.number_of_edges() as usize, m);
                    }
                }
            }
        }
    };
    (@prop Involution) => {
        #[test]
        fn reverse_involution() {
            let rng = &mut Pcg64Mcg::seed_from_u64(5);

            for (num_src, num_dst) in SHAPES {
                for m in [0, 10, 100] {
                    let graph = random_relation(rng, FORMAT, num_src, num_dst, m);
                    if rng.random_bool(0.5) {
                        let format = SparseFormat::CONCRETE[rng.random_range(0..3)];
                        graph.restrict_to(format).unwrap();
                    }

                    let rev = graph.reverse();
                    assert_eq!(rev.num_src_vertices(), graph.num_dst_vertices());
                    assert_eq!(rev.num_dst_vertices(), graph.num_src_vertices());
                    assert_eq!(rev.get_format_in_use(), graph.get_format_in_use().reversed());

                    let twice = rev.reverse();
                    assert_eq!(twice.get_format_in_use(), graph.get_format_in_use());

                    let (a, b) = (graph.cache(), twice.cache());
                    if let (Some(x), Some(y)) = (a.peek_coo(), b.peek_coo()) {
                        assert!(x.row.same_buffer(&y.row));
                        assert!(x.col.same_buffer(&y.col));
                    }
                    for (x, y) in [(a.peek_csr(), b.peek_csr()), (a.peek_csc(), b.peek_csc())] {
                        if let (Some(x), Some(y)) = (x, y) {
                            assert!(x.indptr.same_buffer(&y.indptr));
                            assert!(x.indices.same_buffer(&y.indices));
                        }
                    }

                    assert_eq!(rev.sorted_edges(), reversed_edges(&graph));
                    assert_eq!(twice.sorted_edges(), graph.sorted_edges());
                }
            }
        }
    };
}

pub(crate) use test_relation_props;
