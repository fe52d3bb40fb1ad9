//! Property-based tests for graph containers, sampling and augmentation.
//!
//! These tests verify invariants that should hold for any input graph:
//! - Batch bookkeeping (offsets, owner vector, un-batching)
//! - Induced subgraphs map back onto original edges
//! - Sampled graphs respect size bounds and keep their seeds
//! - Node dropping removes exactly floor(N * r) nodes or nothing

use ndarray::Array2;
use proptest::prelude::*;
use promptix_core::algo::subgraph::{induced_edges, NeighborIndex};
use promptix_core::{
    drop_nodes, EdgeList, Graph, GraphBatch, InducedGraphSampler, LabeledGraph, RngState,
    SamplerConfig,
};
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

prop_compose! {
    fn arb_graph(max_nodes: usize, max_edges: usize)(n in 1..max_nodes)(
        n in Just(n),
        edges in prop::collection::vec((0..n, 0..n), 0..max_edges),
        dim in 1usize..4,
    ) -> Graph {
        let x = Array2::from_shape_fn((n, dim), |(i, j)| (i * dim + j) as f32);
        Graph::new(x, EdgeList::from(edges), None).unwrap()
    }
}

prop_compose! {
    fn arb_labeled(max_nodes: usize, classes: usize)(n in 2..max_nodes)(
        n in Just(n),
        edges in prop::collection::vec((0..n, 0..n), 0..3 * n),
        labels in prop::collection::vec(0..classes, n),
    ) -> LabeledGraph {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| (i + j) as f32);
        LabeledGraph::new(x, EdgeList::from(edges).to_undirected(), labels).unwrap()
    }
}

mod batch_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn batch_vector_matches_nodes(
            dim in 1usize..4,
            sizes in prop::collection::vec(0usize..6, 0..8),
        ) {
            let graphs: Vec<Graph> = sizes
                .iter()
                .map(|&n| {
                    let edges: EdgeList = (1..n).map(|i| (i - 1, i)).collect();
                    Graph::new(Array2::zeros((n, dim)), edges, None).unwrap()
                })
                .collect();

            let batch = GraphBatch::from_graphs(&graphs).unwrap();
            let total: usize = sizes.iter().sum();

            prop_assert_eq!(batch.batch().len(), total);
            prop_assert_eq!(batch.num_nodes(), total);
            prop_assert!(batch.batch().windows(2).all(|w| w[0] <= w[1]));
            let owner = batch.batch();
            let same_graph = batch.edge_index().iter().all(|&(s, d)| owner[s] == owner[d]);
            prop_assert!(same_graph);
            prop_assert_eq!(batch.to_graphs(), graphs);
        }
    }
}

mod subgraph_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn induced_edges_map_back_to_original(
            g in arb_graph(30, 80),
            picks in prop::collection::vec(any::<prop::sample::Index>(), 1..15),
        ) {
            let n = g.num_nodes();
            let mut nodes: Vec<usize> = picks.iter().map(|p| p.index(n)).collect();
            nodes.sort_unstable();
            nodes.dedup();

            let sub = induced_edges(&nodes, &g.edge_index, n);
            let original: std::collections::HashSet<_> = g.edge_index.iter().copied().collect();

            for &(s, d) in &sub {
                prop_assert!(s < nodes.len() && d < nodes.len());
                prop_assert!(original.contains(&(nodes[s], nodes[d])));
            }

            // every original edge inside the node set is recovered
            let inside = g
                .edge_index
                .iter()
                .filter(|(s, d)| nodes.binary_search(s).is_ok() && nodes.binary_search(d).is_ok())
                .count();
            prop_assert_eq!(sub.len(), inside);
        }

        #[test]
        fn k_hop_contains_seeds_and_is_sorted(
            g in arb_graph(30, 80),
            seed in any::<prop::sample::Index>(),
            hops in 0usize..4,
        ) {
            let seed = seed.index(g.num_nodes());
            let index = NeighborIndex::new(g.num_nodes(), &g.edge_index);
            let nodes = index.k_hop(&[seed], hops);

            prop_assert!(nodes.contains(&seed));
            prop_assert!(nodes.windows(2).all(|w| w[0] < w[1]));
            if hops > 0 {
                let wider = index.k_hop(&[seed], hops + 1);
                prop_assert!(nodes.iter().all(|v| wider.contains(v)));
            }
        }
    }
}

mod sampling_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        #[test]
        fn sampled_graphs_respect_bounds(
            g in arb_labeled(80, 2),
            smallest in 1usize..4,
            extra in 0usize..4,
            seed in any::<u64>(),
        ) {
            let config = SamplerConfig {
                smallest_size: smallest,
                largest_size: smallest + extra + 5,
                ..Default::default()
            };
            let sampler = InducedGraphSampler::new(&g, config.clone()).unwrap();
            let mut rng = RngState::seed_everything(seed);

            for class in 0..2 {
                let pool = g.nodes_with_label(class);
                if pool.len() < config.smallest_size {
                    continue;
                }
                let tasks = sampler.sample_class(class, &mut rng).unwrap();
                for graph in tasks.splits.iter().flatten() {
                    prop_assert!(graph.num_nodes() >= config.smallest_size);
                    prop_assert!(graph.num_nodes() <= config.largest_size);
                    prop_assert!(graph.validate().is_ok());
                }
            }
        }

        #[test]
        fn node_set_keeps_every_seed(
            g in arb_labeled(60, 1),
            seed in any::<u64>(),
        ) {
            let config = SamplerConfig {
                smallest_size: 2,
                largest_size: 6,
                ..Default::default()
            };
            let sampler = InducedGraphSampler::new(&g, config).unwrap();
            let index = NeighborIndex::new(g.num_nodes(), &g.edge_index);
            let pool: Vec<usize> = (0..g.num_nodes()).collect();
            let mut rng = RngState::seed_everything(seed);

            let seeds: Vec<usize> = pool.iter().copied().step_by(7).take(5).collect();
            let nodes = sampler.node_set(0, &seeds, &index, &pool, &mut rng).unwrap();

            for s in &seeds {
                prop_assert!(nodes.contains(s));
            }
            prop_assert!(nodes.len() <= 6);
            prop_assert!(nodes.len() >= 2);
        }
    }
}

mod augment_props {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn drop_nodes_exact_or_untouched(
            g in arb_graph(40, 120),
            ratio in 0.0f64..1.0,
            seed in any::<u64>(),
        ) {
            let n = g.num_nodes();
            let mut rng = XorShiftRng::seed_from_u64(seed);
            let out = drop_nodes(g.clone(), ratio, &mut rng);

            let expected = n - (n as f64 * ratio).floor() as usize;
            prop_assert!(out.num_nodes() == expected || out == g);
            prop_assert!(out.validate().is_ok());
        }
    }
}
