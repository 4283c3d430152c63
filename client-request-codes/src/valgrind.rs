//! The client requests from the `valgrind.h` header file
//!
//! See also [The client request
//! mechanism](https://valgrind.org/docs/manual/manual-core-adv.html#manual-core-adv.clientreq)

use std::fmt::Display;

use strum::{EnumIter, IntoStaticStr};

use crate::request::{ClientRequest, Sealed, Tool};
use crate::resolved;

/// The valgrind core requests
///
/// The discriminant of each variant is its placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ValgrindClientRequest {
    /// Query if the program runs under valgrind (`RUNNING_ON_VALGRIND`)
    RunningOnValgrind = 0,
    /// Discard cached translations of a code range (`VALGRIND_DISCARD_TRANSLATIONS`)
    ///
    /// Needed by JIT compilers which overwrite code valgrind has already translated.
    DiscardTranslations = 1,
}

impl Sealed for ValgrindClientRequest {}

impl ClientRequest for ValgrindClientRequest {
    const TOOL: Tool = Tool::Valgrind;

    fn name(self) -> &'static str {
        self.into()
    }

    fn placeholder(self) -> cty::c_uint {
        self as cty::c_uint
    }

    fn framework_value(self) -> Option<cty::c_uint> {
        match self {
            Self::RunningOnValgrind => resolved::RUNNING_ON_VALGRIND,
            Self::DiscardTranslations => resolved::DISCARD_TRANSLATIONS,
        }
    }
}

impl Display for ValgrindClientRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", Self::TOOL, self.name())
    }
}
