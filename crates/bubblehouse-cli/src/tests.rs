use super::*;

#[test]
fn parses_sync_command() {
    let cli = Cli::try_parse_from(["bubblehouse-cli", "sync"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Sync { catalog_file: None }
    ));
}

#[test]
fn parses_sync_with_catalog_file() {
    let cli = Cli::try_parse_from(["bubblehouse-cli", "sync", "--catalog-file", "catalog.json"])
        .expect("expected valid cli args");

    match cli.command {
        Commands::Sync { catalog_file } => {
            assert_eq!(catalog_file, Some(PathBuf::from("catalog.json")));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn settings_flag_is_global() {
    let cli = Cli::try_parse_from([
        "bubblehouse-cli",
        "preview",
        "--compact",
        "--settings",
        "bubblehouse.yaml",
    ])
    .expect("expected valid cli args");

    assert_eq!(cli.settings, Some(PathBuf::from("bubblehouse.yaml")));
    assert!(matches!(
        cli.command,
        Commands::Preview {
            catalog_file: None,
            compact: true
        }
    ));
}

#[test]
fn token_defaults_to_one_hour() {
    let cli = Cli::try_parse_from(["bubblehouse-cli", "token"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Token {
            subject: None,
            validity_secs: 3600
        }
    ));
}

#[test]
fn embed_defaults_to_rewards_page() {
    let cli = Cli::try_parse_from(["bubblehouse-cli", "embed", "--customer-id", "42"])
        .expect("expected valid cli args");
    match cli.command {
        Commands::Embed { page, customer_id } => {
            assert_eq!(page, "Rewards7");
            assert_eq!(customer_id.as_deref(), Some("42"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["bubblehouse-cli"]).is_err());
}

#[test]
fn compact_preview_is_single_line() {
    let payload = bubblehouse_core::SyncPayload::incremental(vec![], vec![]);
    let rendered = commands::render_payload(&payload, true).expect("render");
    assert_eq!(
        rendered,
        r#"{"products":[],"collections":[],"replaceProducts":false,"replaceCollections":false,"debug":false}"#
    );
    assert!(commands::render_payload(&payload, false)
        .expect("render")
        .contains('\n'));
}
