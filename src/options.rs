//! Configuration handed to nauty for one call.
use nauty_Traces_sys::{adjacencies, optionblk, FALSE, TRUE};
use std::os::raw::c_int;

/// Vertex invariant nauty applies to split cells that
/// refinement alone leaves intact (`invarproc`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invariant {
    Off,
    /// nauty's `adjacencies`, the usual choice for digraphs.
    Adjacencies,
}

/// Subset of nauty's `optionblk` this crate lets callers set.
/// The remaining fields keep nauty's defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmOptions {
    /// Compute the canonical labelling and graph (`getcanon`).
    pub canonical_form: bool,
    /// Treat the graph as directed (`digraph`).
    pub digraph: bool,
    /// Use the caller's lab/ptn as colouring (`!defaultptn`).
    pub fixed_partition: bool,
    /// Use random Schreier-Sims (`schreier`).
    pub schreier: bool,
    pub tc_level: c_int,
    pub invariant: Invariant,
    /// Levels of the search tree the invariant is applied at.
    pub min_invar_level: c_int,
    pub max_invar_level: c_int,
    pub invar_arg: c_int,
}

/// nauty's defaults for dense undirected graphs.
/// The directed wrappers start from these and
/// switch the canonical form and digraph mode on.
pub const fn default_options() -> AlgorithmOptions {
    AlgorithmOptions {
        canonical_form: false,
        digraph: false,
        fixed_partition: false,
        schreier: false,
        tc_level: 100,
        invariant: Invariant::Off,
        min_invar_level: 0,
        max_invar_level: 1,
        invar_arg: 0,
    }
}

/// nauty's defaults for dense digraphs: the `adjacencies`
/// invariant on every level of the search.
pub const fn default_digraph_options() -> AlgorithmOptions {
    default_options()
        .with_digraph(true)
        .with_invariant(Invariant::Adjacencies)
        .with_invariant_levels(0, 999, 0)
}

impl Default for AlgorithmOptions {
    fn default() -> Self {
        default_options()
    }
}

impl AlgorithmOptions {
    /// Options used by `canonical_form`.
    pub const fn canonical_directed() -> Self {
        default_options().with_canonical_form(true).with_digraph(true)
    }

    /// Options used by `canonical_form_fixed_coloring`.
    pub const fn canonical_directed_fixed_colouring() -> Self {
        Self::canonical_directed().with_fixed_partition(true)
    }

    pub const fn with_canonical_form(mut self, on: bool) -> Self {
        self.canonical_form = on;
        self
    }

    pub const fn with_digraph(mut self, on: bool) -> Self {
        self.digraph = on;
        self
    }

    pub const fn with_fixed_partition(mut self, on: bool) -> Self {
        self.fixed_partition = on;
        self
    }

    pub const fn with_schreier(mut self, on: bool) -> Self {
        self.schreier = on;
        self
    }

    pub const fn with_invariant(mut self, invariant: Invariant) -> Self {
        self.invariant = invariant;
        self
    }

    pub const fn with_invariant_levels(mut self, min: c_int, max: c_int, arg: c_int) -> Self {
        self.min_invar_level = min;
        self.max_invar_level = max;
        self.invar_arg = arg;
        self
    }

    /// Fresh `optionblk` for a single engine call.
    pub(crate) fn to_optionblk(&self) -> optionblk {
        let mut options = optionblk::default();

        options.getcanon = if self.canonical_form { TRUE } else { FALSE };
        options.digraph = if self.digraph { TRUE } else { FALSE };
        options.defaultptn = if self.fixed_partition { FALSE } else { TRUE };
        options.schreier = if self.schreier { TRUE } else { FALSE };
        options.writeautoms = FALSE;
        options.tc_level = self.tc_level;
        options.invarproc = match self.invariant {
            Invariant::Off => None,
            Invariant::Adjacencies => Some(adjacencies),
        };
        options.mininvarlevel = self.min_invar_level;
        options.maxinvarlevel = self.max_invar_level;
        options.invararg = self.invar_arg;

        options
    }
}
