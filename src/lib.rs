#![warn(rust_2018_idioms)]
//#![deny(warnings, missing_docs)]

//! Minimal binding to nauty's dense canonical labelling.
//!
//! Graphs are packed adjacency matrices in nauty's layout
//! ([`PackedGraph`]), all output buffers are owned by the caller.
//! Each call checks the buffer sizes before nauty sees them and
//! returns nauty's [`RunStatistics`]. The [`ffi`] module exposes the
//! same operations with a flat C signature, e.g. for `ccall` from Julia.
//!
//! ```no_run
//! use minnauty::PackedGraph;
//!
//! // Two labellings of the directed path with two arcs.
//! let g1 = PackedGraph::from_arcs(3, vec![(0, 1), (1, 2)]).unwrap();
//! let g2 = PackedGraph::from_arcs(3, vec![(2, 0), (0, 1)]).unwrap();
//!
//! let c1 = g1.canonical_form().unwrap();
//! let c2 = g2.canonical_form().unwrap();
//! assert_eq!(c1.graph, c2.graph);
//! ```

mod automorphisms;
mod canon;
mod debug;
pub mod ffi;
mod graph;
mod options;
mod parser;
mod partition;
mod stats;

pub use automorphisms::{
    automorphism_generators, identity_orbits, orbits_from_generators, Generator, Orbits,
};
pub use canon::{
    canonical_form, canonical_form_fixed_coloring, densenauty_defaults, densenauty_with_options,
    self_test, Canonical, OutputBuffers,
};
pub use debug::{Error, InvalidArgument};
pub use graph::{
    machine_word_bit_width, Colour, ColouredGraph, GraphError, PackedGraph, VertexIndex,
    DEFAULT_COLOR,
};
pub use nauty_Traces_sys::setword;
pub use options::{default_digraph_options, default_options, AlgorithmOptions, Invariant};
pub use parser::parse_dreadnaut_input;
pub use partition::Partition;
pub use stats::RunStatistics;
