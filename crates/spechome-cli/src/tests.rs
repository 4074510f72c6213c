use super::*;

#[test]
fn parses_teardowns_with_defaults() {
    let cli = Cli::try_parse_from(["spechome-cli", "teardowns"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Teardowns {
            max_price: None,
            city: None,
            page: 1
        }
    ));
}

#[test]
fn parses_teardowns_with_filters() {
    let cli = Cli::try_parse_from([
        "spechome-cli",
        "teardowns",
        "--max-price",
        "850000",
        "--city",
        "Clarendon Hills",
        "--page",
        "2",
    ])
    .expect("expected valid cli args");
    match cli.command {
        Commands::Teardowns {
            max_price,
            city,
            page,
        } => {
            assert_eq!(max_price, Some(850_000));
            assert_eq!(city.as_deref(), Some("Clarendon Hills"));
            assert_eq!(page, 2);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_nearby_with_negative_longitude() {
    let cli = Cli::try_parse_from([
        "spechome-cli",
        "nearby",
        "--lat",
        "41.79",
        "--lng",
        "-87.97",
    ])
    .expect("expected valid cli args");
    match cli.command {
        Commands::Nearby {
            lat,
            lng,
            city,
            radius,
        } => {
            assert!((lat - 41.79).abs() < f64::EPSILON);
            assert!((lng + 87.97).abs() < f64::EPSILON);
            assert!(city.is_none());
            assert!((radius - 1.0).abs() < f64::EPSILON);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn nearby_requires_coordinates() {
    assert!(Cli::try_parse_from(["spechome-cli", "nearby", "--lat", "41.79"]).is_err());
}

#[test]
fn parses_schools() {
    let cli = Cli::try_parse_from(["spechome-cli", "schools", "--zpid", "3456"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Schools { ref zpid } if zpid == "3456"));
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["spechome-cli"]).is_err());
}
