use custom_debug_derive::Debug;
use nauty_Traces_sys::{empty_graph, setword, ADDONEARC, SETWORDSNEEDED, WORDSIZE};

use super::GraphError;
use crate::{
    debug::{bin_fmt, InvalidArgument},
    Error,
};

const WORD_BITS: usize = WORDSIZE as usize;

/// Number of bits in one setword of the linked nauty.
/// Callers need it to size their graph buffers.
pub fn machine_word_bit_width() -> usize {
    WORD_BITS
}

/// Dense graph in nauty's layout: one row of `num_setwords`
/// setwords per vertex, vertex `w` is bit `WORDSIZE-1-w%WORDSIZE`
/// of word `w/WORDSIZE` in a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackedGraph {
    #[debug(with = "bin_fmt")]
    words: Vec<setword>,
    num_vertices: usize,
    num_setwords: usize,
}

impl PackedGraph {
    /// Graph without arcs and the least number of setwords per row.
    pub fn new(num_vertices: usize) -> Self {
        let num_setwords = SETWORDSNEEDED(num_vertices);
        PackedGraph {
            words: empty_graph(num_setwords, num_vertices),
            num_vertices,
            num_setwords,
        }
    }

    pub fn with_setwords(num_vertices: usize, num_setwords: usize) -> Result<Self, Error> {
        check_dimensions(num_vertices, num_setwords)?;
        Ok(PackedGraph {
            words: empty_graph(num_setwords, num_vertices),
            num_vertices,
            num_setwords,
        })
    }

    pub fn from_words(
        words: Vec<setword>,
        num_vertices: usize,
        num_setwords: usize,
    ) -> Result<Self, Error> {
        check_dimensions(num_vertices, num_setwords)?;
        if words.len() != num_vertices * num_setwords {
            return Err(InvalidArgument::BufferLength {
                name: "graph",
                expected: num_vertices * num_setwords,
                actual: words.len(),
            }
            .into());
        }

        Ok(PackedGraph {
            words,
            num_vertices,
            num_setwords,
        })
    }

    pub fn from_arcs<I>(num_vertices: usize, arcs: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut graph = Self::new(num_vertices);
        for (from, to) in arcs {
            graph.add_arc(from, to)?;
        }
        Ok(graph)
    }

    pub fn from_edges<I>(num_vertices: usize, edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut graph = Self::new(num_vertices);
        for (start, end) in edges {
            graph.add_edge(start, end)?;
        }
        Ok(graph)
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn num_setwords(&self) -> usize {
        self.num_setwords
    }

    pub fn words(&self) -> &[setword] {
        &self.words
    }

    pub fn into_words(self) -> Vec<setword> {
        self.words
    }

    fn check_vertex(&self, vertex: usize) -> Result<(), GraphError> {
        if vertex < self.num_vertices {
            Ok(())
        } else {
            Err(GraphError(vertex))
        }
    }

    pub fn add_arc(&mut self, from: usize, to: usize) -> Result<(), GraphError> {
        self.check_vertex(from)?;
        self.check_vertex(to)?;
        ADDONEARC(&mut self.words, from, to, self.num_setwords);
        Ok(())
    }

    pub fn add_edge(&mut self, start: usize, end: usize) -> Result<(), GraphError> {
        self.add_arc(start, end)?;
        self.add_arc(end, start)
    }

    pub fn has_arc(&self, from: usize, to: usize) -> bool {
        if from >= self.num_vertices || to >= self.num_vertices {
            return false;
        }

        let word = self.words[from * self.num_setwords + to / WORD_BITS];
        let bit = (1 as setword) << (WORD_BITS - 1 - to % WORD_BITS);
        word & bit != 0
    }

    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.num_vertices;
        (0..n).flat_map(move |from| {
            (0..n)
                .filter(move |to| self.has_arc(from, *to))
                .map(move |to| (from, to))
        })
    }

    pub fn number_arcs(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Isomorphic copy where vertex `v` becomes `permutation[v]`.
    pub fn relabel(&self, permutation: &[usize]) -> Result<Self, Error> {
        if permutation.len() != self.num_vertices {
            return Err(InvalidArgument::BufferLength {
                name: "permutation",
                expected: self.num_vertices,
                actual: permutation.len(),
            }
            .into());
        }
        if !is_permutation(permutation.iter().copied()) {
            return Err(InvalidArgument::NotAPermutation.into());
        }

        let mut relabelled = PackedGraph {
            words: empty_graph(self.num_setwords, self.num_vertices),
            num_vertices: self.num_vertices,
            num_setwords: self.num_setwords,
        };
        for (from, to) in self.arcs() {
            relabelled.add_arc(permutation[from], permutation[to])?;
        }

        Ok(relabelled)
    }
}

pub(crate) fn check_dimensions(
    num_vertices: usize,
    num_setwords: usize,
) -> Result<(), InvalidArgument> {
    if num_vertices == 0 {
        return Ok(());
    }
    if num_setwords == 0 {
        return Err(InvalidArgument::ZeroSetwords { num_vertices });
    }
    if num_vertices > num_setwords.saturating_mul(WORD_BITS) {
        return Err(InvalidArgument::TooFewSetwords {
            num_vertices,
            num_setwords,
            word_bits: WORD_BITS,
        });
    }
    Ok(())
}

/// Every value in `0..len` appears exactly once.
pub(crate) fn is_permutation<I>(values: I) -> bool
where
    I: ExactSizeIterator<Item = usize>,
{
    let mut seen = vec![false; values.len()];
    for value in values {
        match seen.get_mut(value) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}
