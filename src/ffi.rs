//! C calling convention for hosts such as Julia.
//!
//! Every buffer is allocated and freed by the caller. The functions
//! check counts and lengths and return a status code instead of
//! handing garbage to nauty:
//! `0` success, `-1` invalid argument, `-2` nauty reported an error.
//! Options cross the boundary as nauty's own `optionblk`, laid out as
//! `DEFAULTOPTIONS_GRAPH` in `nauty.h`.

use nauty_Traces_sys::{optionblk, setword, FALSE};
use std::{convert::TryFrom, os::raw::c_int, slice};

use crate::{
    canon::{self, OutputBuffers},
    debug::InvalidArgument,
    graph::{machine_word_bit_width as word_bits, VertexIndex},
    options::{default_digraph_options, default_options, AlgorithmOptions},
    stats::RunStatistics,
    Error,
};

pub const STATUS_OK: c_int = 0;
pub const STATUS_INVALID_ARGUMENT: c_int = -1;
pub const STATUS_ENGINE_ERROR: c_int = -2;

fn status(result: Result<RunStatistics, Error>, stats_out: *mut RunStatistics) -> c_int {
    match result {
        Ok(stats) => {
            if !stats_out.is_null() {
                // Safety: Non-null pointers to statistics are
                // owned by the caller and writable.
                unsafe { stats_out.write(stats) };
            }
            STATUS_OK
        }
        Err(Error::Engine(error_status)) => {
            tracing::warn!(error_status, "nauty reported an error");
            STATUS_ENGINE_ERROR
        }
        Err(error) => {
            tracing::warn!(%error, "rejected call");
            STATUS_INVALID_ARGUMENT
        }
    }
}

fn count(value: c_int) -> Result<usize, InvalidArgument> {
    usize::try_from(value).map_err(|_| InvalidArgument::Negative(value))
}

/// Safety: `ptr` has to be null or point to `len` writable elements.
unsafe fn buffer<'a, T>(
    ptr: *mut T,
    len: usize,
    name: &'static str,
) -> Result<&'a mut [T], InvalidArgument> {
    if len == 0 {
        return Ok(&mut []);
    }
    if ptr.is_null() {
        return Err(InvalidArgument::NullPointer(name));
    }
    Ok(slice::from_raw_parts_mut(ptr, len))
}

/// Raw arguments of one call, turned into checked slices by `run`.
struct RawCall {
    graph: *mut setword,
    num_setwords: c_int,
    num_vertices: c_int,
    labelling: *mut c_int,
    partition: *mut c_int,
    orbits: *mut c_int,
    canonical_graph: *mut setword,
}

impl RawCall {
    /// Safety: Each pointer has to be null or point to as
    /// many elements as `num_setwords` and `num_vertices` demand.
    unsafe fn run(self, options: optionblk) -> Result<RunStatistics, Error> {
        let n = count(self.num_vertices)?;
        let m = count(self.num_setwords)?;
        let words = n
            .checked_mul(m)
            .ok_or(InvalidArgument::OutOfRange(n))?;

        let graph = buffer(self.graph, words, "graph")?;
        let wants_canonical = options.getcanon != FALSE;
        let canonical_graph = if wants_canonical || !self.canonical_graph.is_null() {
            buffer(self.canonical_graph, words, "canonical_graph")?
        } else {
            &mut []
        };

        let buffers = OutputBuffers {
            labelling: buffer::<VertexIndex>(self.labelling, n, "labelling")?,
            partition: buffer(self.partition, n, "partition")?,
            orbits: buffer::<VertexIndex>(self.orbits, n, "orbits")?,
            canonical_graph,
        };

        canon::densenauty_with_optionblk(graph, m, n, buffers, options)
    }
}

/// Canonical labelling, orbits and canonical graph of the digraph `g`.
///
/// # Safety
/// `g` and `canonical_graph` point to `num_vertices * num_setwords` setwords,
/// the other buffers to `num_vertices` ints each.
#[no_mangle]
pub unsafe extern "C" fn canonical_form(
    g: *mut setword,
    num_setwords: c_int,
    num_vertices: c_int,
    canonical_labelling: *mut c_int,
    partition: *mut c_int,
    orbits: *mut c_int,
    canonical_graph: *mut setword,
) -> c_int {
    canonical_form_with_statistics(
        g,
        num_setwords,
        num_vertices,
        canonical_labelling,
        partition,
        orbits,
        canonical_graph,
        std::ptr::null_mut(),
    )
}

/// `canonical_form` that also writes nauty's statistics into `stats`
/// unless it is null.
///
/// # Safety
/// As for `canonical_form`, `stats` is null or writable.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn canonical_form_with_statistics(
    g: *mut setword,
    num_setwords: c_int,
    num_vertices: c_int,
    canonical_labelling: *mut c_int,
    partition: *mut c_int,
    orbits: *mut c_int,
    canonical_graph: *mut setword,
    stats: *mut RunStatistics,
) -> c_int {
    let call = RawCall {
        graph: g,
        num_setwords,
        num_vertices,
        labelling: canonical_labelling,
        partition,
        orbits,
        canonical_graph,
    };
    status(
        call.run(AlgorithmOptions::canonical_directed().to_optionblk()),
        stats,
    )
}

/// Like `canonical_form`, but `canonical_labelling` and `partition`
/// hold a colouring (nauty's lab and ptn) that is kept fixed.
///
/// # Safety
/// As for `canonical_form`.
#[no_mangle]
pub unsafe extern "C" fn canonical_form_fixed_coloring(
    g: *mut setword,
    num_setwords: c_int,
    num_vertices: c_int,
    canonical_labelling: *mut c_int,
    partition: *mut c_int,
    orbits: *mut c_int,
    canonical_graph: *mut setword,
) -> c_int {
    let call = RawCall {
        graph: g,
        num_setwords,
        num_vertices,
        labelling: canonical_labelling,
        partition,
        orbits,
        canonical_graph,
    };
    status(
        call.run(AlgorithmOptions::canonical_directed_fixed_colouring().to_optionblk()),
        std::ptr::null_mut(),
    )
}

/// Dense nauty with its default options. Note the order of
/// `num_vertices` and `num_setwords`.
///
/// # Safety
/// As for `canonical_form`, `canonical_graph` may be null.
#[no_mangle]
pub unsafe extern "C" fn densenauty_defaults_wrap(
    g: *mut setword,
    labelling: *mut c_int,
    partition: *mut c_int,
    orbits: *mut c_int,
    num_vertices: c_int,
    num_setwords: c_int,
    canonical_graph: *mut setword,
) -> c_int {
    let call = RawCall {
        graph: g,
        num_setwords,
        num_vertices,
        labelling,
        partition,
        orbits,
        canonical_graph,
    };
    status(call.run(default_options().to_optionblk()), std::ptr::null_mut())
}

/// Dense nauty with a caller supplied `optionblk`, e.g. one from
/// `defaultoptions_graph`. Its dispatch vector is always the dense one.
///
/// # Safety
/// As for `canonical_form`, `options` points to a valid `optionblk`
/// whose callbacks and `outfile` are null or valid.
/// `canonical_graph` may be null when the options don't ask for it.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn densenauty_wrap(
    g: *mut setword,
    labelling: *mut c_int,
    partition: *mut c_int,
    orbits: *mut c_int,
    options: *const optionblk,
    num_vertices: c_int,
    num_setwords: c_int,
    canonical_graph: *mut setword,
) -> c_int {
    let mut options = match options.as_ref() {
        Some(options) => *options,
        None => {
            return status(
                Err(InvalidArgument::NullPointer("options").into()),
                std::ptr::null_mut(),
            )
        }
    };
    options.dispatch = optionblk::default().dispatch;

    let call = RawCall {
        graph: g,
        num_setwords,
        num_vertices,
        labelling,
        partition,
        orbits,
        canonical_graph,
    };
    status(call.run(&options), std::ptr::null_mut())
}

/// nauty's `DEFAULTOPTIONS_GRAPH`.
#[no_mangle]
pub extern "C" fn defaultoptions_graph() -> optionblk {
    default_options().to_optionblk()
}

/// nauty's `DEFAULTOPTIONS_DIGRAPH`.
#[no_mangle]
pub extern "C" fn defaultoptions_digraph() -> optionblk {
    default_digraph_options().to_optionblk()
}

#[no_mangle]
pub extern "C" fn machine_word_bit_width() -> c_int {
    word_bits() as c_int
}

#[no_mangle]
pub extern "C" fn selftest() -> c_int {
    status(canon::self_test(), std::ptr::null_mut())
}
