//! Vertex colourings in nauty's `lab`/`ptn` encoding.
//!
//! `lab` lists the vertices cell by cell and `ptn[i] == 0`
//! marks the last vertex of a cell.
use custom_debug_derive::Debug;
use itertools::Itertools;
use std::{convert::TryFrom, os::raw::c_int};

use crate::{
    debug::InvalidArgument,
    graph::{is_permutation, Colour, VertexIndex},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// lab
    labelling: Vec<VertexIndex>,
    /// ptn aka the colouring
    ptn: Vec<c_int>,
}

// Turns colours that are grouped in lab order into ptn values.
fn encode_colours(partition: &mut [Colour]) {
    let mut last_colour = None;
    for colour in partition.iter_mut().rev() {
        if Some(*colour) != last_colour {
            last_colour = Some(*colour);
            *colour = 0;
        } else {
            *colour = 1;
        }
    }
}

impl Partition {
    /// All vertices in a single cell.
    pub fn unit(num_vertices: usize) -> Self {
        let mut ptn = vec![1; num_vertices];
        if let Some(last) = ptn.last_mut() {
            *last = 0;
        }

        Partition {
            labelling: (0..num_vertices as VertexIndex).collect(),
            ptn,
        }
    }

    /// Every vertex in a cell of its own.
    pub fn discrete(num_vertices: usize) -> Self {
        Partition {
            labelling: (0..num_vertices as VertexIndex).collect(),
            ptn: vec![0; num_vertices],
        }
    }

    /// Cells in the given order. Each vertex has to appear exactly once.
    pub fn from_cells(cells: &[Vec<usize>]) -> Result<Self, InvalidArgument> {
        let count = cells.iter().map(Vec::len).sum();
        let (mut labelling, mut ptn) = (Vec::with_capacity(count), Vec::with_capacity(count));

        for cell in cells.iter().filter(|cell| !cell.is_empty()) {
            for vertex in cell {
                let vertex = VertexIndex::try_from(*vertex)
                    .map_err(|_| InvalidArgument::OutOfRange(*vertex))?;
                labelling.push(vertex);
                ptn.push(1);
            }

            if let Some(last) = ptn.last_mut() {
                *last = 0;
            }
        }

        let partition = Partition { labelling, ptn };
        if !partition.is_valid() {
            return Err(InvalidArgument::NotAPermutation);
        }
        Ok(partition)
    }

    /// Groups the vertices by colour. Cells are ordered by
    /// ascending colour, vertices keep their order inside a cell.
    pub fn from_colours(colours: &[Colour]) -> Self {
        let labelling = (0..colours.len() as VertexIndex)
            .sorted_by_key(|vertex| colours[*vertex as usize])
            .collect::<Vec<_>>();

        let mut ptn = labelling
            .iter()
            .map(|vertex| colours[*vertex as usize])
            .collect::<Vec<_>>();
        encode_colours(&mut ptn);

        Partition { labelling, ptn }
    }

    pub fn len(&self) -> usize {
        self.labelling.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labelling.is_empty()
    }

    pub fn labelling(&self) -> &[VertexIndex] {
        &self.labelling
    }

    pub fn ptn(&self) -> &[c_int] {
        &self.ptn
    }

    /// Copies of lab and ptn that nauty may overwrite.
    pub fn to_buffers(&self) -> (Vec<VertexIndex>, Vec<c_int>) {
        (self.labelling.clone(), self.ptn.clone())
    }

    pub fn cells(&self) -> Vec<Vec<VertexIndex>> {
        let mut cells = Vec::new();
        let mut current = Vec::new();

        for (vertex, marker) in self.labelling.iter().zip(self.ptn.iter()) {
            current.push(*vertex);
            if *marker == 0 {
                cells.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            cells.push(current);
        }

        cells
    }

    /// Cell number for each vertex.
    pub fn cell_of_vertices(&self) -> Vec<usize> {
        let mut cell_of = vec![0; self.len()];
        for (cell_index, cell) in self.cells().iter().enumerate() {
            for vertex in cell {
                cell_of[*vertex as usize] = cell_index;
            }
        }
        cell_of
    }

    /// A valid partition for nauty: lab is a permutation
    /// and the last cell is terminated.
    pub fn is_valid(&self) -> bool {
        check_lab_ptn(&self.labelling, &self.ptn).is_ok()
    }
}

/// Checks lab and ptn before nauty reads them as a fixed colouring.
pub(crate) fn check_lab_ptn(labelling: &[VertexIndex], ptn: &[c_int]) -> Result<(), InvalidArgument> {
    if !is_permutation(labelling.iter().map(|vertex| *vertex as usize)) {
        return Err(InvalidArgument::NotAPermutation);
    }
    if ptn.last().map_or(false, |marker| *marker != 0) {
        return Err(InvalidArgument::UnterminatedPartition);
    }
    Ok(())
}
