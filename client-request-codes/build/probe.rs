//! Resolve the client request code table from the output of the valgrind header probes
//!
//! The build script runs the C preprocessor over `valgrind/probe.c` and bindgen over
//! `valgrind/wrapper.h`. This module only works on the textual output of these two tools, so the
//! resolution itself doesn't need a valgrind installation and is tested with synthetic output.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::path::PathBuf;

use regex::Regex;

use super::support::Support;

/// A client request of the code table and the header macro which signals its availability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDef {
    /// The local name, the constant in `wrapper.h` is this name prefixed with `IC_`
    pub name: &'static str,
    /// The macro defined by the valgrind headers if the request exists
    pub macro_name: &'static str,
}

impl RequestDef {
    const fn new(name: &'static str, macro_name: &'static str) -> Self {
        Self { name, macro_name }
    }

    /// The name of the constant in `valgrind/wrapper.h`
    pub fn wrapper_name(&self) -> String {
        format!("IC_{}", self.name)
    }
}

/// The requests from `valgrind.h` in placeholder order
pub const VALGRIND_REQUESTS: &[RequestDef] = &[
    RequestDef::new("RUNNING_ON_VALGRIND", "RUNNING_ON_VALGRIND"),
    RequestDef::new("DISCARD_TRANSLATIONS", "VALGRIND_DISCARD_TRANSLATIONS"),
];

/// The requests from `callgrind.h` in placeholder order
pub const CALLGRIND_REQUESTS: &[RequestDef] = &[
    RequestDef::new("DUMP_STATS", "CALLGRIND_DUMP_STATS"),
    RequestDef::new("DUMP_STATS_AT", "CALLGRIND_DUMP_STATS_AT"),
    RequestDef::new("ZERO_STATS", "CALLGRIND_ZERO_STATS"),
    RequestDef::new("TOGGLE_COLLECT", "CALLGRIND_TOGGLE_COLLECT"),
    RequestDef::new("START_INSTRUMENTATION", "CALLGRIND_START_INSTRUMENTATION"),
    RequestDef::new("STOP_INSTRUMENTATION", "CALLGRIND_STOP_INSTRUMENTATION"),
];

/// The errors which can occur while probing the valgrind headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// Running the C preprocessor over the probe file failed
    ///
    /// `Preprocessor(message)`
    Preprocessor(String),
    /// Generating the bindings of the wrapper header failed
    ///
    /// `Bindgen(message)`
    Bindgen(String),
    /// The version macros expanded to something which isn't a number
    ///
    /// `Version(major, minor)`
    Version(String, String),
}

impl std::error::Error for ProbeError {}

impl Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preprocessor(message) => {
                write!(f, "Failed to preprocess the valgrind headers: {message}")
            }
            Self::Bindgen(message) => {
                write!(f, "Failed to generate bindings for the valgrind headers: {message}")
            }
            Self::Version(major, minor) => {
                write!(f, "Invalid valgrind header version: '{major}.{minor}'")
            }
        }
    }
}

/// The part of the target triple the support classification depends on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    pub arch: String,
    pub env: String,
    pub os: String,
    pub vendor: String,
}

impl Target {
    /// Read the target from the environment variables cargo sets for build scripts
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).unwrap_or_default();
        Self {
            arch: var("CARGO_CFG_TARGET_ARCH"),
            env: var("CARGO_CFG_TARGET_ENV"),
            os: var("CARGO_CFG_TARGET_OS"),
            vendor: var("CARGO_CFG_TARGET_VENDOR"),
        }
    }

    fn is_x86_family_os(&self) -> bool {
        self.os == "linux"
            || self.os == "freebsd"
            || (self.vendor == "apple" && self.os == "darwin")
            || (self.os == "windows" && self.env == "gnu")
            || ((self.vendor == "sun" || self.vendor == "pc") && self.os == "solaris")
    }

    /// Classify this target given the platform-support flag of the headers
    pub fn support(&self, is_platform_supported: bool) -> Support {
        if !is_platform_supported {
            return Support::No;
        }

        if self.arch == "x86_64" && self.is_x86_family_os() {
            Support::X86_64
        } else if self.arch == "x86" && self.is_x86_family_os() {
            Support::X86
        } else if self.arch == "arm" && self.os == "linux" && self.env == "gnu" {
            Support::Arm
        } else if self.arch == "aarch64" && self.os == "linux" && self.env == "gnu" {
            Support::Aarch64
        } else {
            Support::Native
        }
    }
}

/// The paths the build script watches for changes of the valgrind headers in the include
/// `candidates`
///
/// An existing header is watched directly. For a missing header the closest existing directory is
/// watched instead, so installing valgrind after the first build still reruns the build script.
pub fn rerun_paths(candidates: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = vec![];
    for dir in candidates {
        for header in ["valgrind/valgrind.h", "valgrind/callgrind.h"] {
            let watched = [dir.join(header), dir.join("valgrind"), dir.clone()]
                .into_iter()
                .find(|path| path.exists());
            if let Some(path) = watched {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
    }
    paths
}

/// What the preprocessor run over `valgrind/probe.c` revealed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Availability {
    /// The request macros which are defined
    pub defined: BTreeSet<String>,
    /// True if `VALGRIND_DO_CLIENT_REQUEST_EXPR` generates real client requests
    pub is_platform_supported: bool,
    /// The `__VALGRIND_MAJOR__` and `__VALGRIND_MINOR__` of the headers
    pub version: Option<(u32, u32)>,
}

impl Availability {
    /// Parse the preprocessed `valgrind/probe.c`
    ///
    /// Everything except the `ic_probe_*` marker lines is ignored.
    pub fn from_expanded(expanded: &str) -> Result<Self, ProbeError> {
        let defined_re = Regex::new(r#"^\s*ic_probe_defined\s+"(?<name>\w+)""#)
            .expect("Regex should compile");
        let version_re = Regex::new(r"^\s*ic_probe_version\s+(?<major>\S+)\s+(?<minor>\S+)")
            .expect("Regex should compile");
        let platform_re =
            Regex::new(r"^\s*ic_probe_platform_supported\b").expect("Regex should compile");

        let mut availability = Self::default();
        for line in expanded.lines() {
            if let Some(caps) = defined_re.captures(line) {
                availability.defined.insert(caps["name"].to_owned());
            } else if let Some(caps) = version_re.captures(line) {
                let (major, minor) = (&caps["major"], &caps["minor"]);
                match (major.parse::<u32>(), minor.parse::<u32>()) {
                    (Ok(major), Ok(minor)) => availability.version = Some((major, minor)),
                    _ => return Err(ProbeError::Version(major.to_owned(), minor.to_owned())),
                }
            } else if platform_re.is_match(line) {
                availability.is_platform_supported = true;
            } else {
                // do nothing
            }
        }

        Ok(availability)
    }
}

/// Extract the `IC_*` integer constants from the bindings generated for `valgrind/wrapper.h`
pub fn parse_bindings(bindings: &str) -> BTreeMap<String, u32> {
    let re = Regex::new(r"pub const (?<name>IC_\w+)\s*:\s*[\w:]+\s*=\s*(?<value>\d+)\s*;")
        .expect("Regex should compile");

    re.captures_iter(bindings)
        .filter_map(|caps| {
            caps["value"]
                .parse::<u32>()
                .ok()
                .map(|value| (caps["name"].to_owned(), value))
        })
        .collect()
}

/// The path of the [`Support`] variant as it is written into `resolved.rs`
fn support_path(support: Support) -> &'static str {
    match support {
        Support::X86_64 => "crate::Support::X86_64",
        Support::X86 => "crate::Support::X86",
        Support::Arm => "crate::Support::Arm",
        Support::Aarch64 => "crate::Support::Aarch64",
        Support::Native => "crate::Support::Native",
        Support::No => "crate::Support::No",
    }
}

/// The fully resolved code table ready to be rendered into `resolved.rs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub is_platform_supported: bool,
    pub support: Support,
    pub version: Option<(u32, u32)>,
    /// The framework values of the valgrind requests, `None` if a placeholder is used
    pub valgrind: Vec<(RequestDef, Option<u32>)>,
    /// The framework values of the callgrind requests, `None` if a placeholder is used
    pub callgrind: Vec<(RequestDef, Option<u32>)>,
    /// If true, the values were taken from `bindings.rs` which is included in the library
    pub has_bindings: bool,
    /// Inconsistencies which didn't prevent the resolution
    pub warnings: Vec<String>,
}

impl Resolved {
    /// The table if the valgrind headers couldn't be found or probed
    pub fn placeholders() -> Self {
        Self {
            is_platform_supported: false,
            support: Support::No,
            version: None,
            valgrind: VALGRIND_REQUESTS.iter().map(|def| (*def, None)).collect(),
            callgrind: CALLGRIND_REQUESTS.iter().map(|def| (*def, None)).collect(),
            has_bindings: false,
            warnings: vec![],
        }
    }

    /// Resolve each request from the macro probe and the bindgen values
    ///
    /// A request resolves to its framework value only if its macro is defined and bindgen
    /// reported a value for it. Without bindgen values every code is a placeholder, so the
    /// platform-support flag is false in this case, too.
    pub fn new(
        availability: &Availability,
        values: Option<&BTreeMap<String, u32>>,
        target: &Target,
    ) -> Self {
        let mut warnings = vec![];
        let mut resolve = |defs: &[RequestDef]| -> Vec<(RequestDef, Option<u32>)> {
            defs.iter()
                .map(|def| {
                    if !availability.defined.contains(def.macro_name) {
                        return (*def, None);
                    }
                    let value = values.and_then(|v| v.get(&def.wrapper_name()).copied());
                    if value.is_none() {
                        warnings.push(format!(
                            "{} is defined but its value is unknown. Using the placeholder.",
                            def.macro_name
                        ));
                    }
                    (*def, value)
                })
                .collect()
        };

        let valgrind = resolve(VALGRIND_REQUESTS);
        let callgrind = resolve(CALLGRIND_REQUESTS);

        let is_platform_supported = availability.is_platform_supported && values.is_some();
        if availability.is_platform_supported && !is_platform_supported {
            warnings.push(
                "The platform is supported by the valgrind headers but the request values are \
                 unknown. Marking the platform as unsupported."
                    .to_owned(),
            );
        }

        Self {
            is_platform_supported,
            support: target.support(is_platform_supported),
            version: availability.version,
            valgrind,
            callgrind,
            has_bindings: values.is_some(),
            warnings,
        }
    }

    /// The content of the generated `resolved.rs`
    pub fn render(&self) -> String {
        let mut out = String::from("// @generated by the build script of client-request-codes\n\n");

        out.push_str(&format!(
            "pub const IS_PLATFORM_SUPPORTED_BY_VALGRIND: bool = {};\n",
            self.is_platform_supported
        ));
        out.push_str(&format!(
            "pub const SUPPORT: crate::Support = {};\n",
            support_path(self.support)
        ));
        match self.version {
            Some((major, minor)) => out.push_str(&format!(
                "pub const VALGRIND_HEADER_VERSION: Option<(u32, u32)> = Some(({major}, \
                 {minor}));\n"
            )),
            None => {
                out.push_str("pub const VALGRIND_HEADER_VERSION: Option<(u32, u32)> = None;\n");
            }
        }

        for (def, value) in self.valgrind.iter().chain(self.callgrind.iter()) {
            out.push('\n');
            match value {
                Some(value) => {
                    out.push_str(&format!(
                        "pub const {}: Option<cty::c_uint> = Some({value});\n",
                        def.name
                    ));
                    if self.has_bindings {
                        out.push_str(&format!(
                            "const _: () = assert!(crate::bindings::{} == {value});\n",
                            def.wrapper_name()
                        ));
                    }
                }
                None => out.push_str(&format!(
                    "pub const {}: Option<cty::c_uint> = None;\n",
                    def.name
                )),
            }
        }

        out
    }
}
