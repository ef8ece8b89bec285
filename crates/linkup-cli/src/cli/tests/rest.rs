//! Tests for fetch, balance and completions.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use clap_complete::Shell;

#[test]
fn cli_parse_fetch() {
    match parse(&["linkup", "fetch", "--url", "https://example.com", "--render"]) {
        CliCommand::Fetch(a) => {
            assert_eq!(a.url, "https://example.com");
            assert!(a.render);
            assert!(!a.raw_html);
            assert!(!a.images);
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_all_flags() {
    match parse(&[
        "linkup",
        "fetch",
        "--url",
        "https://example.com",
        "--rawhtml",
        "--images",
        "--timeout",
        "10",
    ]) {
        CliCommand::Fetch(a) => {
            assert!(a.raw_html);
            assert!(a.images);
            assert_eq!(a.conn.timeout, Some(10.0));
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_fetch_requires_url() {
    assert!(Cli::try_parse_from(["linkup", "fetch"]).is_err());
}

#[test]
fn cli_parse_balance() {
    match parse(&["linkup", "balance", "--base", "http://127.0.0.1:1/v1"]) {
        CliCommand::Balance { conn } => {
            assert_eq!(conn.base_url.as_deref(), Some("http://127.0.0.1:1/v1"));
            assert!(conn.timeout.is_none());
        }
        _ => panic!("expected Balance"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["linkup", "completions", "zsh"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, Shell::Zsh),
        _ => panic!("expected Completions"),
    }
    assert!(Cli::try_parse_from(["linkup", "completions", "tcsh"]).is_err());
}

#[test]
fn cli_unknown_command_fails() {
    assert!(Cli::try_parse_from(["linkup", "status"]).is_err());
}

#[test]
fn cli_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
