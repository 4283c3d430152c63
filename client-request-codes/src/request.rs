//! The opaque [`RequestCode`] token and the [`ClientRequest`] trait of the two request enumerations

use std::fmt::{Debug, Display};

#[cfg(feature = "serde")]
use serde::Serialize;
use strum::{IntoEnumIterator, IntoStaticStr};

mod sealed {
    pub trait Sealed {}
}

pub(crate) use sealed::Sealed;

/// The valgrind tool a client request enumeration belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase")]
pub enum Tool {
    /// Requests of the valgrind core from `valgrind.h`
    Valgrind,
    /// Requests of callgrind from `callgrind.h`
    Callgrind,
}

impl Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name: &'static str = self.into();
        f.write_str(name)
    }
}

/// Where the value of a [`RequestCode`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase")]
pub enum Resolution {
    /// The value assigned by the valgrind headers the crate was built with
    Framework,
    /// The local placeholder. The headers were missing or don't define the request.
    Placeholder,
}

impl Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name: &'static str = self.into();
        f.write_str(name)
    }
}

/// The opaque code of a client request
///
/// A `RequestCode` is bound to the enumeration of its request, so codes of the valgrind and the
/// callgrind requests can't be compared with each other. It doesn't support any arithmetic. The
/// only way to the raw integer is [`RequestCode::into_raw`] which is meant to be used by the
/// mechanism issuing the client request.
///
/// # Examples
///
/// ```rust
/// use client_request_codes::{CallgrindClientRequest, ClientRequest};
///
/// let code = CallgrindClientRequest::DumpStats.code();
/// assert_eq!(code.request(), CallgrindClientRequest::DumpStats);
/// if code.is_placeholder() {
///     assert_eq!(code.into_raw(), 0);
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestCode<R> {
    raw: cty::c_uint,
    request: R,
    resolution: Resolution,
}

impl<R> RequestCode<R>
where
    R: ClientRequest,
{
    pub(crate) fn new(request: R, raw: cty::c_uint, resolution: Resolution) -> Self {
        Self {
            raw,
            request,
            resolution,
        }
    }

    /// The client request this code belongs to
    pub fn request(&self) -> R {
        self.request
    }

    /// Where the value of this code came from
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Return true if this code is a placeholder and not a real valgrind opcode
    pub fn is_placeholder(&self) -> bool {
        self.resolution == Resolution::Placeholder
    }

    /// Hand out the raw opcode to the mechanism issuing the client request
    ///
    /// Issuing a placeholder is a contract violation. Check [`RequestCode::is_placeholder`] and
    /// [`crate::IS_PLATFORM_SUPPORTED_BY_VALGRIND`] first.
    pub fn into_raw(self) -> cty::c_uint {
        self.raw
    }
}

impl<R> Display for RequestCode<R>
where
    R: ClientRequest,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.resolution {
            Resolution::Framework => write!(f, "{:#x}", self.raw),
            Resolution::Placeholder => write!(f, "{}", self.raw),
        }
    }
}

/// A client request of one of the request enumerations
///
/// This trait is sealed and implemented by [`crate::ValgrindClientRequest`] and
/// [`crate::CallgrindClientRequest`].
pub trait ClientRequest:
    Debug + Copy + Eq + std::hash::Hash + IntoEnumIterator + Sealed + 'static
{
    /// The tool this request enumeration belongs to
    const TOOL: Tool;

    /// The upper-case name of the request like `DUMP_STATS_AT`
    fn name(self) -> &'static str;

    /// The placeholder which is the position of this request within its enumeration
    fn placeholder(self) -> cty::c_uint;

    /// The value assigned by the valgrind headers if the request was available at build time
    fn framework_value(self) -> Option<cty::c_uint>;

    /// The resolved code of this request
    fn code(self) -> RequestCode<Self> {
        match self.framework_value() {
            Some(raw) => RequestCode::new(self, raw, Resolution::Framework),
            None => RequestCode::new(self, self.placeholder(), Resolution::Placeholder),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::{CallgrindClientRequest, ValgrindClientRequest};

    fn assert_placeholders_are_unique<R: ClientRequest>() {
        let placeholders = R::iter().map(|request| request.placeholder()).collect::<Vec<_>>();
        let unique = placeholders.iter().collect::<HashSet<_>>();
        assert_eq!(unique.len(), placeholders.len());
    }

    fn assert_codes_consistent<R: ClientRequest>() {
        for request in R::iter() {
            let code = request.code();
            assert_eq!(code.request(), request);
            match request.framework_value() {
                Some(value) => {
                    assert_eq!(code.resolution(), Resolution::Framework);
                    assert_eq!(code.into_raw(), value);
                }
                None => {
                    assert!(code.is_placeholder());
                    assert_eq!(code.into_raw(), request.placeholder());
                }
            }
        }
    }

    #[test]
    fn test_placeholders_are_unique_within_enumeration() {
        assert_placeholders_are_unique::<ValgrindClientRequest>();
        assert_placeholders_are_unique::<CallgrindClientRequest>();
    }

    #[test]
    fn test_code_matches_resolution() {
        assert_codes_consistent::<ValgrindClientRequest>();
        assert_codes_consistent::<CallgrindClientRequest>();
    }

    #[rstest]
    #[case::framework(Resolution::Framework, 0x1001, "0x1001")]
    #[case::placeholder(Resolution::Placeholder, 1, "1")]
    fn test_request_code_display(
        #[case] resolution: Resolution,
        #[case] raw: cty::c_uint,
        #[case] expected: &str,
    ) {
        let code = RequestCode::new(ValgrindClientRequest::RunningOnValgrind, raw, resolution);
        assert_eq!(code.to_string(), expected);
    }

    #[rstest]
    #[case::valgrind(Tool::Valgrind, "valgrind")]
    #[case::callgrind(Tool::Callgrind, "callgrind")]
    fn test_tool_display(#[case] tool: Tool, #[case] expected: &str) {
        assert_eq!(tool.to_string(), expected);
    }
}
