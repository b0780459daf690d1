//! Statistics nauty reports about a single run.

use nauty_Traces_sys::statsblk;
use std::os::raw::c_int;

/// Copy of nauty's `statsblk`. The order of the
/// automorphism group is `group_size_mantissa * 10^group_size_exponent`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStatistics {
    pub group_size_mantissa: f64,
    pub group_size_exponent: c_int,
    pub number_orbits: c_int,
    pub number_generators: c_int,
    pub error_status: c_int,
    pub search_nodes: u64,
    pub bad_leaves: u64,
    pub max_level: c_int,
    pub target_cell_tries: u64,
    pub canonical_updates: u64,
    pub invariant_applications: u64,
    pub invariant_successes: u64,
    pub invariant_success_level: c_int,
}

impl RunStatistics {
    /// Statistics of the graph without vertices,
    /// which has only the trivial automorphism.
    pub fn trivial() -> Self {
        RunStatistics {
            group_size_mantissa: 1.0,
            group_size_exponent: 0,
            number_orbits: 0,
            number_generators: 0,
            error_status: 0,
            search_nodes: 0,
            bad_leaves: 0,
            max_level: 0,
            target_cell_tries: 0,
            canonical_updates: 0,
            invariant_applications: 0,
            invariant_successes: 0,
            invariant_success_level: 0,
        }
    }

    /// Order of the automorphism group. Large groups lose precision.
    pub fn group_size(&self) -> f64 {
        self.group_size_mantissa * 10f64.powi(self.group_size_exponent)
    }
}

impl Default for RunStatistics {
    fn default() -> Self {
        Self::trivial()
    }
}

impl From<&statsblk> for RunStatistics {
    fn from(stats: &statsblk) -> Self {
        RunStatistics {
            group_size_mantissa: stats.grpsize1,
            group_size_exponent: stats.grpsize2,
            number_orbits: stats.numorbits,
            number_generators: stats.numgenerators,
            error_status: stats.errstatus,
            search_nodes: stats.numnodes as u64,
            bad_leaves: stats.numbadleaves as u64,
            max_level: stats.maxlevel,
            target_cell_tries: stats.tctotal as u64,
            canonical_updates: stats.canupdates as u64,
            invariant_applications: stats.invapplics as u64,
            invariant_successes: stats.invsuccesses as u64,
            invariant_success_level: stats.invarsuclevel,
        }
    }
}
