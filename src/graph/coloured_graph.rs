use custom_debug_derive::Debug;

use super::{Colour, GraphError, PackedGraph, DEFAULT_COLOR};
use crate::partition::Partition;

/// Packed graph where every vertex carries a colour.
/// Colours only matter relative to each other.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ColouredGraph {
    pub graph: PackedGraph,
    pub colours: Vec<Colour>,
}

impl ColouredGraph {
    pub fn new(num_vertices: usize) -> Self {
        ColouredGraph {
            graph: PackedGraph::new(num_vertices),
            colours: vec![DEFAULT_COLOR; num_vertices],
        }
    }

    pub fn size(&self) -> usize {
        self.graph.num_vertices()
    }

    pub fn add_arc(&mut self, start: usize, end: usize) -> Result<(), GraphError> {
        self.graph.add_arc(start, end)
    }

    pub fn add_edge(&mut self, start: usize, end: usize) -> Result<(), GraphError> {
        self.graph.add_edge(start, end)
    }

    pub fn set_colour(&mut self, vertex: usize, colour: Colour) -> Result<(), GraphError> {
        *self.colours.get_mut(vertex).ok_or(GraphError(vertex))? = colour;
        Ok(())
    }

    pub fn set_colours(&mut self, colours: &[Colour]) -> Result<(), GraphError> {
        for (vertex, colour) in colours.iter().enumerate() {
            self.set_colour(vertex, *colour)?;
        }

        Ok(())
    }

    pub fn is_uncoloured(&self) -> bool {
        self.colours.windows(2).all(|pair| pair[0] == pair[1])
    }

    /// The colouring as nauty partition, cells sorted by colour.
    pub fn partition(&self) -> Partition {
        Partition::from_colours(&self.colours)
    }
}
