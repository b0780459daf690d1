//! Canonical forms through nauty's `densenauty`.
//!
//! All output buffers belong to the caller. They are checked against the
//! graph dimensions before nauty is called, nauty then fills them in place.

use custom_debug_derive::Debug;
use nauty_Traces_sys::{
    densenauty, nauty_check, optionblk, setword, statsblk, FALSE, NAUTYVERSIONID, WORDSIZE,
};
use std::{
    convert::TryFrom,
    os::raw::c_int,
    ptr,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{
    debug::InvalidArgument,
    graph::{check_dimensions, ColouredGraph, PackedGraph, VertexIndex},
    options::{default_options, AlgorithmOptions},
    partition::{check_lab_ptn, Partition},
    stats::RunStatistics,
    Error,
};

// nauty keeps its workspace in static storage unless built with TLS.
static ENGINE: Mutex<()> = Mutex::new(());

/// Serialises calls into nauty. The lock guards no data,
/// so a panic while holding it leaves nothing inconsistent.
pub(crate) fn lock_engine() -> MutexGuard<'static, ()> {
    ENGINE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Buffers nauty writes into. Each has to be exactly as long
/// as the graph dimensions require.
#[derive(Debug)]
pub struct OutputBuffers<'a> {
    /// lab, `num_vertices` entries
    pub labelling: &'a mut [VertexIndex],
    /// ptn, `num_vertices` entries
    pub partition: &'a mut [c_int],
    pub orbits: &'a mut [VertexIndex],
    /// `num_vertices * num_setwords` words, may be empty without canonical form
    #[debug(skip)]
    pub canonical_graph: &'a mut [setword],
}

/// Result of an owned canonicalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct Canonical {
    /// Vertex `labelling[i]` of the input is vertex `i` of `graph`.
    pub labelling: Vec<VertexIndex>,
    pub orbits: Vec<VertexIndex>,
    pub graph: PackedGraph,
    pub statistics: RunStatistics,
}

fn check_length(name: &'static str, expected: usize, actual: usize) -> Result<(), InvalidArgument> {
    if expected == actual {
        Ok(())
    } else {
        Err(InvalidArgument::BufferLength {
            name,
            expected,
            actual,
        })
    }
}

fn to_c_int(value: usize) -> Result<c_int, InvalidArgument> {
    c_int::try_from(value).map_err(|_| InvalidArgument::OutOfRange(value))
}

/// Returns n and m as nauty wants them.
fn check_buffers(
    graph: &[setword],
    num_setwords: usize,
    num_vertices: usize,
    buffers: &OutputBuffers<'_>,
    options: &optionblk,
) -> Result<(c_int, c_int), InvalidArgument> {
    check_dimensions(num_vertices, num_setwords)?;
    let n = to_c_int(num_vertices)?;
    let m = to_c_int(num_setwords)?;

    let words = num_vertices
        .checked_mul(num_setwords)
        .ok_or(InvalidArgument::OutOfRange(num_vertices))?;

    check_length("graph", words, graph.len())?;
    check_length("labelling", num_vertices, buffers.labelling.len())?;
    check_length("partition", num_vertices, buffers.partition.len())?;
    check_length("orbits", num_vertices, buffers.orbits.len())?;
    if options.getcanon != FALSE {
        check_length("canonical_graph", words, buffers.canonical_graph.len())?;
    }

    if options.defaultptn == FALSE {
        check_lab_ptn(&*buffers.labelling, &*buffers.partition)?;
    }

    Ok((n, m))
}

/// Call dense nauty with the given options. The graph is
/// `num_vertices` rows of `num_setwords` setwords each.
pub fn densenauty_with_options(
    graph: &[setword],
    num_setwords: usize,
    num_vertices: usize,
    buffers: OutputBuffers<'_>,
    options: &AlgorithmOptions,
) -> Result<RunStatistics, Error> {
    densenauty_with_optionblk(
        graph,
        num_setwords,
        num_vertices,
        buffers,
        options.to_optionblk(),
    )
}

/// Same as `densenauty_with_options` for a complete `optionblk`,
/// which has to use the dense dispatch vector.
pub(crate) fn densenauty_with_optionblk(
    graph: &[setword],
    num_setwords: usize,
    num_vertices: usize,
    buffers: OutputBuffers<'_>,
    mut nauty_options: optionblk,
) -> Result<RunStatistics, Error> {
    let (n, m) = check_buffers(graph, num_setwords, num_vertices, &buffers, &nauty_options)?;

    // nauty has nothing to do for the empty graph.
    if num_vertices == 0 {
        return Ok(RunStatistics::trivial());
    }

    let span = tracing::debug_span!(
        "densenauty",
        n = num_vertices,
        m = num_setwords,
        canonical_form = nauty_options.getcanon != FALSE,
        digraph = nauty_options.digraph != FALSE,
        fixed_partition = nauty_options.defaultptn == FALSE,
        invariant = nauty_options.invarproc.is_some(),
    );
    let _entered = span.enter();

    let mut stats = statsblk::default();
    let canonical_graph = if nauty_options.getcanon != FALSE {
        buffers.canonical_graph.as_mut_ptr()
    } else {
        ptr::null_mut()
    };

    crate::time!(engine_time, _done, {
        let _engine = lock_engine();

        // Safety: All buffers have been checked against n and m above.
        // densenauty only reads from g, hence the cast.
        unsafe {
            densenauty(
                graph.as_ptr() as *mut setword,
                buffers.labelling.as_mut_ptr(),
                buffers.partition.as_mut_ptr(),
                buffers.orbits.as_mut_ptr(),
                &mut nauty_options,
                &mut stats,
                m,
                n,
                canonical_graph,
            );
        }
    });

    let statistics = RunStatistics::from(&stats);
    tracing::debug!(
        ?engine_time,
        orbits = statistics.number_orbits,
        group_size = statistics.group_size(),
        "densenauty done"
    );

    if statistics.error_status != 0 {
        return Err(Error::Engine(statistics.error_status));
    }
    Ok(statistics)
}

/// Canonical labelling, orbits and canonical graph of a digraph.
/// The partition buffer is only scratch space for nauty.
pub fn canonical_form(
    graph: &[setword],
    num_setwords: usize,
    num_vertices: usize,
    buffers: OutputBuffers<'_>,
) -> Result<RunStatistics, Error> {
    densenauty_with_options(
        graph,
        num_setwords,
        num_vertices,
        buffers,
        &AlgorithmOptions::canonical_directed(),
    )
}

/// Like `canonical_form`, but the labelling and partition buffers
/// hold a colouring that nauty has to respect.
pub fn canonical_form_fixed_coloring(
    graph: &[setword],
    num_setwords: usize,
    num_vertices: usize,
    buffers: OutputBuffers<'_>,
) -> Result<RunStatistics, Error> {
    densenauty_with_options(
        graph,
        num_setwords,
        num_vertices,
        buffers,
        &AlgorithmOptions::canonical_directed_fixed_colouring(),
    )
}

/// Dense nauty with its unchanged defaults (orbits only).
pub fn densenauty_defaults(
    graph: &[setword],
    num_setwords: usize,
    num_vertices: usize,
    buffers: OutputBuffers<'_>,
) -> Result<RunStatistics, Error> {
    densenauty_with_options(
        graph,
        num_setwords,
        num_vertices,
        buffers,
        &default_options(),
    )
}

/// Checks that the linked nauty matches the word size this crate
/// was built for and canonicalises a small graph.
/// nauty itself aborts the process if the check fails.
pub fn self_test() -> Result<RunStatistics, Error> {
    // Safety: Plain value arguments.
    unsafe {
        nauty_check(WORDSIZE as c_int, 1, 4, NAUTYVERSIONID as c_int);
    }

    let graph = [0 as setword; 4];
    let mut canonical_graph = [0 as setword; 4];
    let (mut labelling, mut partition, mut orbits) = ([0; 4], [0; 4], [0; 4]);

    canonical_form(
        &graph,
        1,
        4,
        OutputBuffers {
            labelling: &mut labelling,
            partition: &mut partition,
            orbits: &mut orbits,
            canonical_graph: &mut canonical_graph,
        },
    )
}

impl PackedGraph {
    /// Canonical form with every vertex in the same colour.
    pub fn canonical_form(&self) -> Result<Canonical, Error> {
        self.canonicalise(None)
    }

    /// Canonical form that respects the given colouring.
    pub fn canonical_form_coloured(&self, partition: &Partition) -> Result<Canonical, Error> {
        self.canonicalise(Some(partition))
    }

    fn canonicalise(&self, partition: Option<&Partition>) -> Result<Canonical, Error> {
        let (n, m) = (self.num_vertices(), self.num_setwords());

        let (mut labelling, mut ptn) = match partition {
            Some(partition) => {
                check_length("partition", n, partition.len())?;
                partition.to_buffers()
            }
            None => (vec![0; n], vec![0; n]),
        };
        let mut orbits = vec![0; n];
        let mut canonical_graph = vec![0 as setword; n * m];

        let buffers = OutputBuffers {
            labelling: &mut labelling,
            partition: &mut ptn,
            orbits: &mut orbits,
            canonical_graph: &mut canonical_graph,
        };
        let statistics = if partition.is_some() {
            canonical_form_fixed_coloring(self.words(), m, n, buffers)?
        } else {
            canonical_form(self.words(), m, n, buffers)?
        };

        Ok(Canonical {
            labelling,
            orbits,
            graph: PackedGraph::from_words(canonical_graph, n, m)?,
            statistics,
        })
    }
}

impl ColouredGraph {
    /// Canonical form of the graph under its colouring.
    pub fn canonical_form(&self) -> Result<Canonical, Error> {
        if self.is_uncoloured() {
            self.graph.canonical_form()
        } else {
            self.graph.canonical_form_coloured(&self.partition())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        graph::{is_permutation, GraphError},
        options::{default_digraph_options, Invariant},
    };
    use proptest::prelude::*;

    fn cube() -> Result<PackedGraph, GraphError> {
        PackedGraph::from_edges(
            8,
            vec![
                (0, 1),
                (0, 3),
                (0, 4),
                (1, 2),
                (1, 5),
                (2, 3),
                (2, 6),
                (3, 7),
                (4, 5),
                (4, 7),
                (5, 6),
                (6, 7),
            ],
        )
    }

    fn assert_permutation(labelling: &[VertexIndex]) {
        assert!(is_permutation(labelling.iter().map(|v| *v as usize)));
    }

    #[test]
    fn four_vertices_give_permutation_and_orbits() -> Result<(), Error> {
        let graphs = vec![
            PackedGraph::new(4),
            PackedGraph::from_arcs(4, vec![(0, 1), (1, 2), (2, 3)])?,
            PackedGraph::from_arcs(4, vec![(0, 1), (1, 2), (2, 3), (3, 0)])?,
            PackedGraph::from_edges(4, vec![(0, 2), (1, 2)])?,
        ];

        for graph in graphs {
            let mut labelling = [-1; 4];
            let mut partition = [0; 4];
            let mut orbits = [-1; 4];
            let mut canonical_graph = [0; 4];

            canonical_form(
                graph.words(),
                1,
                4,
                OutputBuffers {
                    labelling: &mut labelling,
                    partition: &mut partition,
                    orbits: &mut orbits,
                    canonical_graph: &mut canonical_graph,
                },
            )?;

            assert_permutation(&labelling);
            assert!(orbits.iter().all(|orbit| (0..4).contains(orbit)));
        }
        Ok(())
    }

    #[test]
    fn orbits_of_small_digraphs() -> Result<(), Error> {
        let empty = PackedGraph::new(4).canonical_form()?;
        assert_eq!(vec![0, 0, 0, 0], empty.orbits);
        assert_eq!(24.0, empty.statistics.group_size());

        let path = PackedGraph::from_arcs(4, vec![(0, 1), (1, 2), (2, 3)])?.canonical_form()?;
        assert_eq!(vec![0, 1, 2, 3], path.orbits);
        assert_eq!(1.0, path.statistics.group_size());

        let cycle =
            PackedGraph::from_arcs(4, vec![(0, 1), (1, 2), (2, 3), (3, 0)])?.canonical_form()?;
        assert_eq!(vec![0, 0, 0, 0], cycle.orbits);
        assert_eq!(4.0, cycle.statistics.group_size());
        Ok(())
    }

    #[test]
    fn canonical_form_is_deterministic() -> Result<(), Error> {
        let graph = cube()?;
        let first = graph.canonical_form()?;
        let second = graph.canonical_form()?;

        assert_eq!(first.graph, second.graph);
        assert_eq!(first.labelling, second.labelling);
        assert_eq!(48.0, first.statistics.group_size());
        assert_eq!(1, first.statistics.number_orbits);
        Ok(())
    }

    #[test]
    fn isomorphic_graphs_share_canonical_form() -> Result<(), Error> {
        let graph = cube()?;
        let relabelled = graph.relabel(&[3, 6, 0, 5, 7, 1, 4, 2])?;
        assert_ne!(graph, relabelled);

        assert_eq!(
            graph.canonical_form()?.graph,
            relabelled.canonical_form()?.graph
        );

        let path = PackedGraph::from_arcs(3, vec![(0, 1), (1, 2)])?;
        let star = PackedGraph::from_arcs(3, vec![(0, 1), (0, 2)])?;
        assert_ne!(path.canonical_form()?.graph, star.canonical_form()?.graph);
        Ok(())
    }

    #[test]
    fn labelling_maps_input_to_canonical_graph() -> Result<(), Error> {
        let graph = PackedGraph::from_arcs(5, vec![(0, 3), (3, 1), (1, 0), (4, 2), (2, 2)])?;
        let canonical = graph.canonical_form()?;

        let mut inverse = vec![0; 5];
        for (position, vertex) in canonical.labelling.iter().enumerate() {
            inverse[*vertex as usize] = position;
        }
        assert_eq!(canonical.graph, graph.relabel(&inverse)?);
        Ok(())
    }

    #[test]
    fn fixed_colouring_keeps_colours_apart() -> Result<(), Error> {
        let graph = PackedGraph::new(4);
        let mut labelling = [0, 1, 2, 3];
        let mut partition = [1, 0, 1, 0];
        let mut orbits = [0; 4];
        let mut canonical_graph = [0; 4];

        let stats = canonical_form_fixed_coloring(
            graph.words(),
            1,
            4,
            OutputBuffers {
                labelling: &mut labelling,
                partition: &mut partition,
                orbits: &mut orbits,
                canonical_graph: &mut canonical_graph,
            },
        )?;

        assert_eq!([0, 0, 2, 2], orbits);
        assert_eq!(4.0, stats.group_size());
        assert_permutation(&labelling);
        Ok(())
    }

    #[test]
    fn fixed_colouring_of_cube() -> Result<(), Error> {
        let graph = cube()?;
        let partition = Partition::from_colours(&[2, 2, 1, 2, 2, 2, 2, 2]);
        let canonical = graph.canonical_form_coloured(&partition)?;

        assert_eq!(vec![0, 1, 2, 1, 4, 0, 1, 0], canonical.orbits);
        assert_eq!(6.0, canonical.statistics.group_size());

        let cell_of = partition.cell_of_vertices();
        for (vertex, orbit) in canonical.orbits.iter().enumerate() {
            assert_eq!(cell_of[vertex], cell_of[*orbit as usize]);
        }
        Ok(())
    }

    #[test]
    fn coloured_graph_uses_its_colouring() -> Result<(), Error> {
        let mut coloured = ColouredGraph::new(8);
        coloured.graph = cube()?;
        assert_eq!(1, coloured.canonical_form()?.statistics.number_orbits);

        coloured.set_colour(2, 0)?;
        let canonical = coloured.canonical_form()?;
        assert_eq!(vec![0, 1, 2, 1, 4, 0, 1, 0], canonical.orbits);
        Ok(())
    }

    fn orbits_with_options(
        graph: &PackedGraph,
        options: &AlgorithmOptions,
    ) -> Result<RunStatistics, Error> {
        let n = graph.num_vertices();
        let (mut labelling, mut partition, mut orbits) = (vec![0; n], vec![0; n], vec![0; n]);
        densenauty_with_options(
            graph.words(),
            graph.num_setwords(),
            n,
            OutputBuffers {
                labelling: &mut labelling,
                partition: &mut partition,
                orbits: &mut orbits,
                canonical_graph: &mut [],
            },
            options,
        )
    }

    #[test]
    fn invariant_is_applied() -> Result<(), Error> {
        // Refinement can't split the vertex transitive cube.
        let graph = cube()?;

        let without = orbits_with_options(&graph, &default_options())?;
        assert_eq!(0, without.invariant_applications);

        let with = orbits_with_options(&graph, &default_digraph_options())?;
        assert!(with.invariant_applications > 0);
        assert_eq!(48.0, with.group_size());

        let undirected = default_options()
            .with_invariant(Invariant::Adjacencies)
            .with_invariant_levels(0, 999, 0);
        assert!(orbits_with_options(&graph, &undirected)?.invariant_applications > 0);
        Ok(())
    }

    #[test]
    fn defaults_skip_canonical_graph() -> Result<(), Error> {
        let graph = cube()?;
        let mut labelling = [0; 8];
        let mut partition = [0; 8];
        let mut orbits = [-1; 8];

        let stats = densenauty_defaults(
            graph.words(),
            1,
            8,
            OutputBuffers {
                labelling: &mut labelling,
                partition: &mut partition,
                orbits: &mut orbits,
                canonical_graph: &mut [],
            },
        )?;

        assert_eq!([0; 8], orbits);
        assert_eq!(48.0, stats.group_size());
        Ok(())
    }

    #[test]
    fn zero_vertices_is_a_no_op() -> Result<(), Error> {
        let stats = canonical_form(
            &[],
            0,
            0,
            OutputBuffers {
                labelling: &mut [],
                partition: &mut [],
                orbits: &mut [],
                canonical_graph: &mut [],
            },
        )?;
        assert_eq!(RunStatistics::trivial(), stats);

        let canonical = PackedGraph::new(0).canonical_form()?;
        assert!(canonical.labelling.is_empty());
        assert!(canonical.orbits.is_empty());
        assert_eq!(0, canonical.graph.num_vertices());

        let rejected = canonical_form(
            &[],
            0,
            0,
            OutputBuffers {
                labelling: &mut [0],
                partition: &mut [],
                orbits: &mut [],
                canonical_graph: &mut [],
            },
        );
        assert!(matches!(
            rejected,
            Err(Error::InvalidArgument(InvalidArgument::BufferLength {
                name: "labelling",
                ..
            }))
        ));
        Ok(())
    }

    #[test]
    fn invalid_buffers_are_rejected() {
        let graph = [0 as setword; 4];
        let (mut labelling, mut partition, mut orbits) = ([0; 4], [0; 4], [0; 4]);
        let mut canonical_graph = [0 as setword; 3];

        let short_canonical = canonical_form(
            &graph,
            1,
            4,
            OutputBuffers {
                labelling: &mut labelling,
                partition: &mut partition,
                orbits: &mut orbits,
                canonical_graph: &mut canonical_graph,
            },
        );
        assert!(matches!(
            short_canonical,
            Err(Error::InvalidArgument(InvalidArgument::BufferLength {
                name: "canonical_graph",
                expected: 4,
                actual: 3
            }))
        ));

        let no_setwords = canonical_form(
            &graph,
            0,
            4,
            OutputBuffers {
                labelling: &mut labelling,
                partition: &mut partition,
                orbits: &mut orbits,
                canonical_graph: &mut [],
            },
        );
        assert!(matches!(
            no_setwords,
            Err(Error::InvalidArgument(InvalidArgument::ZeroSetwords { .. }))
        ));

        let big_graph = vec![0 as setword; 100];
        let (mut lab, mut ptn, mut orb) = (vec![0; 100], vec![0; 100], vec![0; 100]);
        let mut canon = vec![0 as setword; 100];
        let too_few_setwords = canonical_form(
            &big_graph,
            1,
            100,
            OutputBuffers {
                labelling: &mut lab,
                partition: &mut ptn,
                orbits: &mut orb,
                canonical_graph: &mut canon,
            },
        );
        assert!(matches!(
            too_few_setwords,
            Err(Error::InvalidArgument(InvalidArgument::TooFewSetwords { .. }))
        ));
    }

    #[test]
    fn fixed_colouring_needs_valid_partition() {
        let graph = [0 as setword; 3];
        let mut canonical_graph = [0 as setword; 3];
        let mut orbits = [0; 3];

        let mut labelling = [0, 0, 1];
        let mut partition = [1, 1, 0];
        let duplicate = canonical_form_fixed_coloring(
            &graph,
            1,
            3,
            OutputBuffers {
                labelling: &mut labelling,
                partition: &mut partition,
                orbits: &mut orbits,
                canonical_graph: &mut canonical_graph,
            },
        );
        assert!(matches!(
            duplicate,
            Err(Error::InvalidArgument(InvalidArgument::NotAPermutation))
        ));

        let mut labelling = [0, 1, 2];
        let mut partition = [1, 1, 1];
        let unterminated = canonical_form_fixed_coloring(
            &graph,
            1,
            3,
            OutputBuffers {
                labelling: &mut labelling,
                partition: &mut partition,
                orbits: &mut orbits,
                canonical_graph: &mut canonical_graph,
            },
        );
        assert!(matches!(
            unterminated,
            Err(Error::InvalidArgument(InvalidArgument::UnterminatedPartition))
        ));
    }

    #[test]
    fn coloured_partition_must_match_graph() -> Result<(), Error> {
        let graph = cube()?;
        let result = graph.canonical_form_coloured(&Partition::unit(5));
        assert!(matches!(
            result,
            Err(Error::InvalidArgument(InvalidArgument::BufferLength {
                name: "partition",
                ..
            }))
        ));
        Ok(())
    }

    #[test]
    fn calls_from_several_threads() -> Result<(), Error> {
        let expected = cube()?.canonical_form()?;

        let handles = (0..4)
            .map(|shift| {
                std::thread::spawn(move || -> Result<Canonical, Error> {
                    let permutation = (0..8).map(|v| (v + shift) % 8).collect::<Vec<_>>();
                    cube()?.relabel(&permutation)?.canonical_form()
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            let canonical = handle.join().expect("worker thread panicked")?;
            assert_eq!(expected.graph, canonical.graph);
        }
        Ok(())
    }

    #[test]
    fn test_self_test() -> Result<(), Error> {
        let stats = self_test()?;
        assert_eq!(24.0, stats.group_size());
        Ok(())
    }

    proptest! {
        #[test]
        fn relabelled_digraphs_share_canonical_form(
            arcs in proptest::collection::vec((0..7usize, 0..7usize), 0..20),
            permutation in Just((0..7usize).collect::<Vec<_>>()).prop_shuffle(),
        ) {
            let graph = PackedGraph::from_arcs(7, arcs).unwrap();
            let relabelled = graph.relabel(&permutation).unwrap();

            let first = graph.canonical_form().unwrap();
            let second = relabelled.canonical_form().unwrap();

            prop_assert_eq!(first.graph, second.graph);
            prop_assert_eq!(first.statistics.group_size(), second.statistics.group_size());
        }
    }
}
