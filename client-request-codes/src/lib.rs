//! The valgrind client request codes, resolved at build time
//!
//! A program running under valgrind talks to valgrind with [client
//! requests](https://valgrind.org/docs/manual/manual-core-adv.html#manual-core-adv.clientreq). This
//! crate doesn't issue any client requests. It provides the table of request codes the
//! request-issuing layer needs:
//!
//! * [`ValgrindClientRequest`]: `RUNNING_ON_VALGRIND` and `DISCARD_TRANSLATIONS`
//! * [`CallgrindClientRequest`]: `DUMP_STATS`, `DUMP_STATS_AT`, `ZERO_STATS`, `TOGGLE_COLLECT`,
//!   `START_INSTRUMENTATION` and `STOP_INSTRUMENTATION`
//! * [`IS_PLATFORM_SUPPORTED_BY_VALGRIND`]: Whether client requests can be issued at all
//!
//! The build script looks for the `valgrind/valgrind.h` and `valgrind/callgrind.h` headers. Each
//! request whose macro is defined by the headers resolves to the value valgrind assigns to it. All
//! other requests resolve to a placeholder, the position of the request within its enumeration.
//! The crate compiles unconditionally, with or without valgrind installed.
//!
//! The headers are searched in `$CLIENT_REQUEST_CODES_VALGRIND_INCLUDE`,
//! `/valgrind/target/valgrind/$CLIENT_REQUEST_CODES_CROSS_TARGET/include`, `/usr/local/include` and
//! `/usr/include`. Probing needs a C compiler and libclang and is switched off without the `probe`
//! feature.
//!
//! # Examples
//!
//! ```rust
//! use client_request_codes::{
//!     ClientRequest, ValgrindClientRequest, IS_PLATFORM_SUPPORTED_BY_VALGRIND,
//! };
//!
//! let code = ValgrindClientRequest::RunningOnValgrind.code();
//! if IS_PLATFORM_SUPPORTED_BY_VALGRIND && !code.is_placeholder() {
//!     let _raw = code.into_raw();
//!     // hand the raw code to the mechanism issuing the client request
//! }
//! ```

mod callgrind;
#[cfg(test)]
#[allow(dead_code)]
#[path = "../build/probe.rs"]
mod probe;
mod request;
#[path = "../build/support.rs"]
mod support;
mod table;
mod valgrind;

#[cfg(valgrind_bindings)]
#[allow(dead_code, non_upper_case_globals)]
mod bindings {
    include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
}

mod resolved {
    include!(concat!(env!("OUT_DIR"), "/resolved.rs"));
}

pub use callgrind::CallgrindClientRequest;
pub use request::{ClientRequest, RequestCode, Resolution, Tool};
pub use support::Support;
pub use table::{table, TableEntry};
pub use valgrind::ValgrindClientRequest;

/// True if client requests can be issued on this platform
///
/// This is the case if the valgrind headers were found at build time and their
/// `VALGRIND_DO_CLIENT_REQUEST_EXPR` generates real client requests for the target. The flag is
/// independent of the single request codes. The headers of an unsupported platform still define
/// the requests, so the codes resolve to the real values while this flag is false.
pub const IS_PLATFORM_SUPPORTED_BY_VALGRIND: bool = resolved::IS_PLATFORM_SUPPORTED_BY_VALGRIND;

/// The platform classification, [`Support::No`] if [`IS_PLATFORM_SUPPORTED_BY_VALGRIND`] is false
pub const SUPPORT: Support = resolved::SUPPORT;

/// The `(major, minor)` version of the valgrind headers used at build time
pub const VALGRIND_HEADER_VERSION: Option<(u32, u32)> = resolved::VALGRIND_HEADER_VERSION;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_support_is_consistent_with_platform_flag() {
        assert_eq!(SUPPORT.is_supported(), IS_PLATFORM_SUPPORTED_BY_VALGRIND);
    }

    #[test]
    fn test_platform_flag_requires_headers() {
        if VALGRIND_HEADER_VERSION.is_none() {
            assert!(!IS_PLATFORM_SUPPORTED_BY_VALGRIND);
            assert_eq!(SUPPORT, Support::No);
        }
    }

    #[test]
    fn test_build_probe_uses_the_same_requests() {
        let valgrind = probe::VALGRIND_REQUESTS
            .iter()
            .map(|def| def.name)
            .collect::<Vec<_>>();
        let callgrind = probe::CALLGRIND_REQUESTS
            .iter()
            .map(|def| def.name)
            .collect::<Vec<_>>();

        assert_eq!(
            ValgrindClientRequest::iter()
                .map(ClientRequest::name)
                .collect::<Vec<_>>(),
            valgrind
        );
        assert_eq!(
            CallgrindClientRequest::iter()
                .map(ClientRequest::name)
                .collect::<Vec<_>>(),
            callgrind
        );
    }

    #[test]
    fn test_support_names_are_unique() {
        let names = Support::iter().map(Support::as_str).collect::<Vec<_>>();
        assert_eq!(names, vec!["x86_64", "x86", "arm", "aarch64", "native", "no"]);
    }
}
