mod common;

use client_request_codes::{
    table, CallgrindClientRequest, ClientRequest, ValgrindClientRequest,
    IS_PLATFORM_SUPPORTED_BY_VALGRIND, SUPPORT, VALGRIND_HEADER_VERSION,
};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::Value;
use strum::IntoEnumIterator;

fn expected_lines<R>() -> Vec<String>
where
    R: ClientRequest + std::fmt::Display,
{
    R::iter()
        .map(|request| {
            let code = request.code();
            format!("{request} {code} ({})", code.resolution())
        })
        .collect()
}

fn expected_header() -> String {
    let version = VALGRIND_HEADER_VERSION.map_or_else(
        || "none".to_owned(),
        |(major, minor)| format!("{major}.{minor}"),
    );
    format!(
        "platform supported: {IS_PLATFORM_SUPPORTED_BY_VALGRIND} ({SUPPORT}), valgrind headers: \
         {version}"
    )
}

#[test]
fn test_text_output_lists_all_requests() {
    let mut expected = vec![expected_header()];
    expected.extend(expected_lines::<ValgrindClientRequest>());
    expected.extend(expected_lines::<CallgrindClientRequest>());
    let expected = expected.join("\n") + "\n";

    common::get_binary_command()
        .assert()
        .success()
        .stdout(expected);
}

#[rstest]
#[case::valgrind("valgrind", expected_lines::<ValgrindClientRequest>())]
#[case::callgrind("callgrind", expected_lines::<CallgrindClientRequest>())]
fn test_text_output_when_tool(#[case] tool: &str, #[case] lines: Vec<String>) {
    let expected = format!("{}\n{}\n", expected_header(), lines.join("\n"));

    common::get_binary_command()
        .args(["--tool", tool])
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn test_json_output() {
    let output = common::get_binary_command()
        .args(["--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let actual: Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(
        actual["platform_supported"],
        Value::Bool(IS_PLATFORM_SUPPORTED_BY_VALGRIND)
    );
    assert_eq!(actual["support"], Value::from(SUPPORT.as_str()));
    match VALGRIND_HEADER_VERSION {
        Some((major, minor)) => {
            assert_eq!(actual["valgrind_version"], Value::from(format!("{major}.{minor}")));
        }
        None => assert_eq!(actual["valgrind_version"], Value::Null),
    }

    let requests = actual["requests"].as_array().unwrap();
    let table = table();
    assert_eq!(requests.len(), table.len());
    for (request, entry) in requests.iter().zip(table.iter()) {
        assert_eq!(request["tool"], Value::from(entry.tool.to_string()));
        assert_eq!(request["name"], Value::from(entry.name));
        assert_eq!(request["code"], Value::from(entry.code));
        assert_eq!(request["resolution"], Value::from(entry.resolution.to_string()));
    }
}

#[test]
fn test_json_output_when_tool_callgrind() {
    let output = common::get_binary_command()
        .args(["--format", "json", "--tool", "callgrind"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let actual: Value = serde_json::from_slice(&output).unwrap();

    let names = actual["requests"]
        .as_array()
        .unwrap()
        .iter()
        .map(|request| request["name"].as_str().unwrap().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        CallgrindClientRequest::iter()
            .map(|request| request.name().to_owned())
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_invalid_format_is_rejected() {
    common::get_binary_command()
        .args(["--format", "xml"])
        .assert()
        .failure()
        .code(2)
        .stdout(predicates::str::is_empty());
}

#[test]
fn test_version() {
    common::get_binary_command()
        .arg("--version")
        .assert()
        .success()
        .stdout(format!(
            "client-request-codes {}\n",
            env!("CARGO_PKG_VERSION")
        ));
}

#[test]
fn test_log_level_is_colored_when_cargo_term_color_always() {
    common::get_binary_command()
        .env("RUST_LOG", "debug")
        .env("CARGO_TERM_COLOR", "always")
        .assert()
        .success()
        .stderr(predicates::str::contains(
            "client_request_codes: \u{1b}[1;34mDebug\u{1b}[0m: Arguments",
        ));
}

#[test]
fn test_log_level_is_plain_when_cargo_term_color_never() {
    common::get_binary_command()
        .env("RUST_LOG", "debug")
        .env("CARGO_TERM_COLOR", "never")
        .assert()
        .success()
        .stderr(
            predicates::str::contains("client_request_codes: Debug: Arguments")
                .and(predicates::str::contains("\u{1b}[").not()),
        );
}

#[test]
fn test_missing_headers_warning_when_cargo_term_color_always() {
    let assert = common::get_binary_command()
        .env("RUST_LOG", "warn")
        .env("CARGO_TERM_COLOR", "always")
        .assert()
        .success();

    if VALGRIND_HEADER_VERSION.is_none() {
        assert.stderr(
            predicates::str::contains("client_request_codes: \u{1b}[1;33mWarn")
                .and(predicates::str::contains("No valgrind headers were found")),
        );
    } else {
        assert.stderr(predicates::str::is_empty());
    }
}
