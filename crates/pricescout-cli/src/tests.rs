use super::*;

#[test]
fn parses_search_with_multiword_query() {
    let cli = Cli::try_parse_from(["pricescout", "search", "55", "inch", "tv"])
        .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Search {
            query,
            json,
            dump_raw,
        }) => {
            assert_eq!(query.join(" "), "55 inch tv");
            assert!(!json);
            assert!(dump_raw.is_none());
        }
        other => panic!("expected search command, got: {other:?}"),
    }
}

#[test]
fn parses_search_flags() {
    let cli = Cli::try_parse_from([
        "pricescout",
        "search",
        "laptop",
        "--json",
        "--dump-raw",
        "/tmp/raw.html",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Search { json, dump_raw, .. }) => {
            assert!(json);
            assert_eq!(dump_raw, Some(PathBuf::from("/tmp/raw.html")));
        }
        other => panic!("expected search command, got: {other:?}"),
    }
}

#[test]
fn search_requires_a_query() {
    assert!(Cli::try_parse_from(["pricescout", "search"]).is_err());
}

#[test]
fn parses_watch_command() {
    let cli = Cli::try_parse_from(["pricescout", "watch", "--json"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Watch { json: true })));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["pricescout"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}
