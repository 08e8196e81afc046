//! Segment splitting and minimizer seed-and-chain mapping on
//! pangenome sequence graphs.
//!
//! [`gfa::Graph`] holds segments and arcs and can be augmented with
//! new sequence through [`gfa::Graph::augment`]. Queries are mapped
//! with [`map::map_frag`], which sketches them, looks minimizers up in
//! a [`index::MinimizerIndex`], expands and filters anchors and hands
//! them to a [`chain::Chainer`].

pub mod anchor;
pub mod augment;
pub mod batch;
pub mod chain;
pub mod error;
pub mod expand;
pub mod filter;
pub mod gfa;
pub mod hash;
pub mod index;
pub mod kmerge;
pub mod map;
pub mod options;
pub mod scratch;
pub mod seed;
pub mod sketch;

pub use batch::{map_batch, map_batch_with_threads, Query};
pub use map::{map, map_frag};
pub use options::MapOpt;
