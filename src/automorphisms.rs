//! Generators of the automorphism group and
//! the orbits they induce.

use libffi::high::ClosureMut6;
use nauty_Traces_sys::{densenauty, orbjoin, statsblk};
use std::{convert::TryFrom, os::raw::c_int, slice::from_raw_parts};

use crate::{
    canon::lock_engine,
    debug::InvalidArgument,
    graph::{PackedGraph, VertexIndex},
    options::AlgorithmOptions,
    partition::Partition,
    stats::RunStatistics,
    Error,
};

/// Permutation of the vertices, vertex `v` is mapped to `generator[v]`.
pub type Generator = Vec<VertexIndex>;
pub type Orbits = Vec<VertexIndex>;

/// Call nauty on the digraph (optionally coloured) and
/// collect the generators of its automorphism group.
pub fn automorphism_generators(
    graph: &PackedGraph,
    colouring: Option<&Partition>,
) -> Result<(Vec<Generator>, RunStatistics), Error> {
    let (n, m) = (graph.num_vertices(), graph.num_setwords());
    let mut generators = Vec::new();

    if n == 0 {
        return Ok((generators, RunStatistics::trivial()));
    }

    let n_c = c_int::try_from(n).map_err(|_| InvalidArgument::OutOfRange(n))?;
    let m_c = c_int::try_from(m).map_err(|_| InvalidArgument::OutOfRange(m))?;

    let (mut vertex_order, mut partition) = match colouring {
        Some(colouring) => {
            if colouring.len() != n {
                return Err(InvalidArgument::BufferLength {
                    name: "partition",
                    expected: n,
                    actual: colouring.len(),
                }
                .into());
            }
            colouring.to_buffers()
        }
        None => (vec![0; n], vec![0; n]),
    };

    let mut options = AlgorithmOptions::canonical_directed()
        .with_canonical_form(false)
        .with_fixed_partition(colouring.is_some())
        .with_schreier(true)
        .to_optionblk();
    let mut stats = statsblk::default();
    let mut orbits = vec![0; n];

    // Limit how long the closure can reference generators so that we can return it afterwards.
    {
        // Callback that copies the current generator.
        let mut userautomproc = |_count: c_int,
                                 generator_ptr: *mut c_int,
                                 _orbits: *mut c_int,
                                 _numorbits: c_int,
                                 _stabvertex: c_int,
                                 n: c_int| {
            // Safety: nauty hands over a permutation of n vertices.
            let generator_raw = unsafe { from_raw_parts(generator_ptr, n as usize) };
            tracing::trace!(generator = ?generator_raw, "automorphism generator");
            generators.push(generator_raw.to_vec());
        };
        let userautomproc = ClosureMut6::new(&mut userautomproc);

        options.userautomproc = Some(*userautomproc.code_ptr());

        let _engine = lock_engine();

        // Safety: Call to nauty library function that computes the automorphism
        // group generators through userautomproc. All buffers hold n (or n*m) entries.
        unsafe {
            densenauty(
                graph.words().as_ptr() as *mut _,
                vertex_order.as_mut_ptr(),
                partition.as_mut_ptr(),
                orbits.as_mut_ptr(),
                &mut options,
                &mut stats,
                m_c,
                n_c,
                std::ptr::null_mut(),
            );
        }
    }

    let statistics = RunStatistics::from(&stats);
    if statistics.error_status != 0 {
        return Err(Error::Engine(statistics.error_status));
    }

    tracing::debug!(
        generators = generators.len(),
        orbits = statistics.number_orbits,
        "collected automorphism generators"
    );
    Ok((generators, statistics))
}

// Apply a generator to the current orbits and combine those,
// the generator connects. Does not change the generator
// (the &mut is for FFI reasons only, will not write into it).
fn apply_generator(generator: &mut [VertexIndex], orbits: &mut Orbits) {
    debug_assert_eq!(generator.len(), orbits.len());

    // Safety: Call to nauty library function that reads from the generator
    // and combines orbits accordingly.
    unsafe {
        orbjoin(
            orbits.as_mut_ptr(),
            generator.as_mut_ptr(),
            generator.len() as c_int,
        );
    }
}

/// Every vertex in an orbit of its own.
pub fn identity_orbits(number_vertices: usize) -> Orbits {
    (0..number_vertices as VertexIndex).collect()
}

/// Orbits of the group generated by the given permutations of
/// `number_vertices` vertices. Each orbit is named by its smallest vertex.
pub fn orbits_from_generators(
    number_vertices: usize,
    generators: &mut [Generator],
) -> Result<Orbits, Error> {
    let mut orbits = identity_orbits(number_vertices);

    for generator in generators.iter() {
        if generator.len() != number_vertices {
            return Err(InvalidArgument::BufferLength {
                name: "generator",
                expected: number_vertices,
                actual: generator.len(),
            }
            .into());
        }
        if !crate::graph::is_permutation(generator.iter().map(|vertex| *vertex as usize)) {
            return Err(InvalidArgument::NotAPermutation.into());
        }
    }

    for generator in generators {
        apply_generator(generator, &mut orbits);
    }

    Ok(orbits)
}
