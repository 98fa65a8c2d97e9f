//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

mod rest;

#[test]
fn cli_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}

#[test]
fn version_flag_is_handled_by_clap() {
    let err = Cli::try_parse_from(["opperup", "--version"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
}

#[test]
fn global_catalog_flag() {
    let cli = Cli::try_parse_from(["opperup", "list", "--catalog", "/tmp/c.toml"]).unwrap();
    assert_eq!(
        cli.catalog.as_deref(),
        Some(std::path::Path::new("/tmp/c.toml"))
    );
}
