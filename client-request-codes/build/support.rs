//! The platform classification shared by the build script and the library

use strum::{EnumIter, IntoStaticStr};

/// How client requests could be issued on the target platform
///
/// The classification only tells the request-issuing layer which code generation it would need.
/// It is [`Support::No`] if and only if the platform-support flag is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum Support {
    /// x86_64 on linux, freebsd, darwin, windows-gnu or solaris
    #[strum(serialize = "x86_64")]
    X86_64,
    /// x86 on linux, freebsd, darwin, windows-gnu or solaris
    #[strum(serialize = "x86")]
    X86,
    /// arm on linux-gnu
    #[strum(serialize = "arm")]
    Arm,
    /// aarch64 on linux-gnu
    #[strum(serialize = "aarch64")]
    Aarch64,
    /// Any other platform the valgrind headers can generate client requests for
    #[strum(serialize = "native")]
    Native,
    /// Client requests are not supported
    #[strum(serialize = "no")]
    No,
}

impl Support {
    /// The lower-case name of this classification, for example `x86_64`
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Return true if client requests can be issued on this platform
    pub fn is_supported(self) -> bool {
        self != Self::No
    }
}

impl std::fmt::Display for Support {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
