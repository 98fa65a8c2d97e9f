//! Tests for resolve, verify, list, platform, checksum, completions.

use super::parse;
use crate::cli::CliCommand;

#[test]
fn cli_parse_resolve() {
    match parse(&["opperup", "resolve", "0.12.1", "--json"]) {
        CliCommand::Resolve {
            version,
            platform,
            json,
        } => {
            assert_eq!(version, "0.12.1");
            assert!(platform.is_none());
            assert!(json);
        }
        _ => panic!("expected Resolve"),
    }
}

#[test]
fn cli_parse_resolve_requires_version() {
    use super::Cli;
    use clap::Parser;
    assert!(Cli::try_parse_from(["opperup", "resolve"]).is_err());
}

#[test]
fn cli_parse_verify() {
    match parse(&[
        "opperup",
        "verify",
        "./opper-darwin-arm64",
        "0.12.1",
        "--platform",
        "darwin-arm64",
    ]) {
        CliCommand::Verify {
            path,
            version,
            platform,
        } => {
            assert_eq!(path, std::path::PathBuf::from("./opper-darwin-arm64"));
            assert_eq!(version, "0.12.1");
            assert_eq!(platform.as_deref(), Some("darwin-arm64"));
        }
        _ => panic!("expected Verify"),
    }
}

#[test]
fn cli_parse_list() {
    match parse(&["opperup", "list"]) {
        CliCommand::List { json } => assert!(!json),
        _ => panic!("expected List"),
    }
}

#[test]
fn cli_parse_platform() {
    match parse(&["opperup", "platform"]) {
        CliCommand::Platform => {}
        _ => panic!("expected Platform"),
    }
}

#[test]
fn cli_parse_checksum() {
    match parse(&["opperup", "checksum", "/path/to/opper"]) {
        CliCommand::Checksum { path } => assert_eq!(path, "/path/to/opper"),
        _ => panic!("expected Checksum"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["opperup", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, clap_complete::Shell::Bash),
        _ => panic!("expected Completions"),
    }
}
