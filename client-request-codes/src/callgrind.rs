//! The client requests from the `callgrind.h` header file
//!
//! See also [Callgrind specific client
//! requests](https://valgrind.org/docs/manual/cl-manual.html#cl-manual.clientrequests)

use std::fmt::Display;

use strum::{EnumIter, IntoStaticStr};

use crate::request::{ClientRequest, Sealed, Tool};
use crate::resolved;

/// The callgrind requests
///
/// The discriminant of each variant is its placeholder. The placeholders share their numbers with
/// the ones of [`crate::ValgrindClientRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CallgrindClientRequest {
    /// Dump current state of cost centers, and zero them afterward (`CALLGRIND_DUMP_STATS`)
    DumpStats = 0,
    /// Like [`CallgrindClientRequest::DumpStats`] with a description string
    /// (`CALLGRIND_DUMP_STATS_AT`)
    DumpStatsAt = 1,
    /// Zero cost centers (`CALLGRIND_ZERO_STATS`)
    ZeroStats = 2,
    /// Toggle the collection state (`CALLGRIND_TOGGLE_COLLECT`)
    ToggleCollect = 3,
    /// Start full callgrind instrumentation if not already switched on
    /// (`CALLGRIND_START_INSTRUMENTATION`)
    StartInstrumentation = 4,
    /// Stop full callgrind instrumentation if not already switched off
    /// (`CALLGRIND_STOP_INSTRUMENTATION`)
    StopInstrumentation = 5,
}

impl Sealed for CallgrindClientRequest {}

impl ClientRequest for CallgrindClientRequest {
    const TOOL: Tool = Tool::Callgrind;

    fn name(self) -> &'static str {
        self.into()
    }

    fn placeholder(self) -> cty::c_uint {
        self as cty::c_uint
    }

    fn framework_value(self) -> Option<cty::c_uint> {
        match self {
            Self::DumpStats => resolved::DUMP_STATS,
            Self::DumpStatsAt => resolved::DUMP_STATS_AT,
            Self::ZeroStats => resolved::ZERO_STATS,
            Self::ToggleCollect => resolved::TOGGLE_COLLECT,
            Self::StartInstrumentation => resolved::START_INSTRUMENTATION,
            Self::StopInstrumentation => resolved::STOP_INSTRUMENTATION,
        }
    }
}

impl Display for CallgrindClientRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", Self::TOOL, self.name())
    }
}
