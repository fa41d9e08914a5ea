use clap::{CommandFactory, FromArgMatches, Parser};
use keymeta::config::FirmwareLimits;
use keymeta::consts::{DEFAULT_MAX_KEYS, DEFAULT_MAX_PROFILES};
use keymeta::KeymetaError;
use rstest::rstest;
use std::io::Write;
use tempfile::NamedTempFile;

#[derive(Parser, Debug)]
struct TestCli {
    #[command(flatten)]
    limits: FirmwareLimits,
}

fn parse(args: &[&str]) -> (FirmwareLimits, clap::ArgMatches) {
    let matches = TestCli::command()
        .try_get_matches_from(std::iter::once("test").chain(args.iter().copied()))
        .unwrap();
    let cli = TestCli::from_arg_matches(&matches).unwrap();
    (cli.limits, matches)
}

fn limits_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
fn test_cli_defaults_match_default_impl() {
    let (limits, _) = parse(&[]);
    assert_eq!(limits, FirmwareLimits::default());
}

#[test]
fn test_load_partial_file() {
    let file = limits_file(r#"{ "maxLayers": 4, "maxKeys": 100 }"#);
    let limits = FirmwareLimits::load_from_file(file.path()).unwrap();
    assert_eq!(limits.max_layers, 4);
    assert_eq!(limits.max_keys, 100);
    assert_eq!(limits.max_profiles, DEFAULT_MAX_PROFILES);
}

#[test]
fn test_explicit_flags_override_file() {
    let file = limits_file(r#"{ "maxLayers": 4, "maxKeys": 100 }"#);
    let mut limits = FirmwareLimits::load_from_file(file.path()).unwrap();

    let (cli_limits, matches) = parse(&["--max-keys", "50"]);
    limits.merge_from_cli(&cli_limits, &matches);

    assert_eq!(limits.max_keys, 50);
    // not typed on the command line, so the file value stays
    assert_eq!(limits.max_layers, 4);
}

#[rstest]
#[case(r#"{ "maxProfiles": 0 }"#)]
#[case(r#"{ "maxLayers": 9 }"#)]
#[case(r#"{ "maxKeys": 257 }"#)]
#[case(r#"{ "maxAdvancedKeys": 0 }"#)]
fn test_out_of_range_limits_are_rejected(#[case] content: &str) {
    let file = limits_file(content);
    let err = FirmwareLimits::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, KeymetaError::Config(_)), "{}", err);
}

#[test]
fn test_malformed_limits_file() {
    let file = limits_file("{ maxKeys: ");
    let err = FirmwareLimits::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, KeymetaError::Json(_)));
}

#[test]
fn test_key_ceiling() {
    let limits = FirmwareLimits {
        max_keys: DEFAULT_MAX_KEYS,
        ..Default::default()
    };
    assert!(limits.validate().is_ok());
}
