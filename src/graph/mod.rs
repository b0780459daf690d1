//! Representation of graphs as nauty
//! understands them (packed adjacency
//! matrices) and coloured graphs built on top.
use std::os::raw::c_int;

mod packed_graph;
pub use packed_graph::{machine_word_bit_width, PackedGraph};
pub(crate) use packed_graph::{check_dimensions, is_permutation};

mod coloured_graph;
pub use coloured_graph::ColouredGraph;

pub type Colour = c_int;
pub type VertexIndex = c_int;

pub const DEFAULT_COLOR: Colour = c_int::MAX;

/// A vertex that is not part of the graph.
#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone, Copy)]
#[error("vertex {0} is not part of the graph")]
pub struct GraphError(pub usize);
