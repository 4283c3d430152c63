// spell-checker: ignore NVALGRIND

#[allow(dead_code)]
#[path = "build/probe.rs"]
mod probe;
#[allow(dead_code)]
#[path = "build/support.rs"]
mod support;

use std::path::{Path, PathBuf};

use probe::{rerun_paths, Resolved, Target};

const ENV_VALGRIND_INCLUDE: &str = "CLIENT_REQUEST_CODES_VALGRIND_INCLUDE";
const ENV_CROSS_TARGET: &str = "CLIENT_REQUEST_CODES_CROSS_TARGET";

fn print_warning(message: &str) {
    println!("cargo:warning=client-request-codes: {message}");
}

/// The include directories which may contain the `valgrind` header directory in search order
fn include_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![];
    if let Ok(env) = std::env::var(ENV_VALGRIND_INCLUDE) {
        candidates.push(PathBuf::from(env));
    }
    if let Ok(env) = std::env::var(ENV_CROSS_TARGET) {
        candidates.push(
            PathBuf::from("/valgrind/target/valgrind")
                .join(env)
                .join("include"),
        );
    }
    candidates.push(PathBuf::from("/usr/local/include"));
    candidates.push(PathBuf::from("/usr/include"));
    candidates
}

fn find_include_dir() -> Option<PathBuf> {
    include_candidates().into_iter().find(|dir| {
        dir.join("valgrind/valgrind.h").is_file() && dir.join("valgrind/callgrind.h").is_file()
    })
}

#[cfg(feature = "probe")]
mod imp {
    use std::collections::BTreeMap;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::path::Path;

    use super::probe::{parse_bindings, Availability, ProbeError};

    pub fn expand(include: &Path) -> Result<Availability, ProbeError> {
        let expanded = cc::Build::new()
            .include(include)
            .file("valgrind/probe.c")
            .cargo_metadata(false)
            .warnings(false)
            .try_expand()
            .map_err(|error| ProbeError::Preprocessor(error.to_string()))?;

        Availability::from_expanded(&String::from_utf8_lossy(&expanded))
    }

    pub fn generate_bindings(
        include: &Path,
        out_dir: &Path,
    ) -> Result<BTreeMap<String, u32>, ProbeError> {
        let builder = bindgen::builder()
            .clang_arg(format!("-I{}", include.display()))
            .header("valgrind/wrapper.h")
            .allowlist_var("IC_.*")
            .layout_tests(false)
            .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()));

        // bindgen panics instead of returning an error if libclang can't be loaded
        let bindings = catch_unwind(AssertUnwindSafe(|| builder.generate()))
            .map_err(|_| ProbeError::Bindgen("Unable to load libclang".to_owned()))?
            .map_err(|error| ProbeError::Bindgen(error.to_string()))?;

        bindings
            .write_to_file(out_dir.join("bindings.rs"))
            .map_err(|error| ProbeError::Bindgen(error.to_string()))?;

        Ok(parse_bindings(&bindings.to_string()))
    }
}

#[cfg(feature = "probe")]
fn resolve(target: &Target, out_dir: &Path) -> Resolved {
    if std::env::var("DOCS_RS").is_ok() {
        return Resolved::placeholders();
    }

    let Some(include) = find_include_dir() else {
        return Resolved::placeholders();
    };

    let availability = match imp::expand(&include) {
        Ok(availability) => availability,
        Err(error) => {
            print_warning(&format!("{error}. Using placeholders."));
            return Resolved::placeholders();
        }
    };

    let values = match imp::generate_bindings(&include, out_dir) {
        Ok(values) => Some(values),
        Err(error) => {
            print_warning(&error.to_string());
            None
        }
    };

    Resolved::new(&availability, values.as_ref(), target)
}

#[cfg(not(feature = "probe"))]
fn resolve(_target: &Target, _out_dir: &Path) -> Resolved {
    Resolved::placeholders()
}

fn main() {
    println!("cargo:rerun-if-changed=valgrind/wrapper.h");
    println!("cargo:rerun-if-changed=valgrind/probe.c");
    println!("cargo:rerun-if-changed=build/probe.rs");
    println!("cargo:rerun-if-changed=build/support.rs");
    println!("cargo:rerun-if-env-changed={ENV_VALGRIND_INCLUDE}");
    println!("cargo:rerun-if-env-changed={ENV_CROSS_TARGET}");
    for path in rerun_paths(&include_candidates()) {
        println!("cargo:rerun-if-changed={}", path.display());
    }

    // The unit tests preprocess the header fixtures for the same target
    for key in ["TARGET", "HOST"] {
        if let Ok(value) = std::env::var(key) {
            println!("cargo:rustc-env=CLIENT_REQUEST_CODES_{key}={value}");
        }
    }

    let out_dir = std::env::var("OUT_DIR")
        .map(PathBuf::from)
        .expect("Cargo should set OUT_DIR for build scripts");

    let resolved = resolve(&Target::from_env(), &out_dir);
    for warning in &resolved.warnings {
        print_warning(warning);
    }
    if resolved.has_bindings {
        println!("cargo:rustc-cfg=valgrind_bindings");
    }

    std::fs::write(out_dir.join("resolved.rs"), resolved.render())
        .expect("Writing resolved.rs to OUT_DIR should succeed");
}
