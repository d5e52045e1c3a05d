use rover_core::utils::{
    connection::protocol::{Command, CommandParser, Reply, MAX_LINE_LEN},
    math::geometry::WheelGeometry,
    sensors::ultrasonic::Distance,
    RobotConfig,
};

fn feed(
    parser: &mut CommandParser,
    bytes: &[u8],
) -> Vec<Command> {
    bytes.iter().filter_map(|&b| parser.push(b)).collect()
}

#[test]
fn vocabulary_is_exact_and_case_sensitive() {
    let cases = [
        ("forward", Command::Forward),
        ("backward", Command::Backward),
        ("left", Command::Left),
        ("right", Command::Right),
        ("stop", Command::Stop),
        ("get_speed", Command::GetSpeed),
        ("get_distance", Command::GetDistance),
        ("STOP", Command::Unrecognized),
        ("get speed", Command::Unrecognized),
        ("forwards", Command::Unrecognized),
        ("frobnicate", Command::Unrecognized),
        ("", Command::Unrecognized),
    ];
    for (line, want) in cases {
        assert_eq!(Command::parse(line), want, "{line:?}");
    }
}

#[test]
fn parser_frames_lines_and_trims() {
    let mut parser = CommandParser::new();
    let commands = feed(&mut parser, b"forward\r\n  stop \nget_speed\n");
    assert_eq!(
        commands,
        vec![Command::Forward, Command::Stop, Command::GetSpeed]
    );
}

#[test]
fn parser_waits_for_newline_across_reads() {
    let mut parser = CommandParser::new();
    assert!(feed(&mut parser, b"get_dis").is_empty());
    assert_eq!(feed(&mut parser, b"tance\n"), vec![Command::GetDistance]);
}

#[test]
fn blank_line_is_unrecognized() {
    let mut parser = CommandParser::new();
    assert_eq!(feed(&mut parser, b"\r\n"), vec![Command::Unrecognized]);
}

#[test]
fn overlong_line_is_unrecognized_and_parser_recovers() {
    let mut parser = CommandParser::new();
    let mut bytes = vec![b' '; MAX_LINE_LEN + 10];
    bytes.extend_from_slice(b"stop\n");
    assert_eq!(feed(&mut parser, &bytes), vec![Command::Unrecognized]);
    assert_eq!(feed(&mut parser, b"stop\n"), vec![Command::Stop]);
}

#[test]
fn invalid_utf8_is_unrecognized() {
    let mut parser = CommandParser::new();
    assert_eq!(feed(&mut parser, b"st\xffop\n"), vec![Command::Unrecognized]);
}

#[test]
fn reset_discards_partial_line() {
    let mut parser = CommandParser::new();
    feed(&mut parser, b"forw");
    parser.reset();
    assert_eq!(feed(&mut parser, b"left\n"), vec![Command::Left]);
}

#[test]
fn replies_render_two_decimals() {
    assert_eq!(Reply::Speed(4.2726).to_string(), "4.27");
    assert_eq!(Reply::Speed(0.0).to_string(), "0.00");
    assert_eq!(Reply::Distance(Distance::from_cm(23.456)).to_string(), "23.46");
    assert_eq!(Reply::Distance(Distance::NO_READING).to_string(), "1000.00");
    assert_eq!(Reply::UnknownCommand.to_string(), "Unknown command.");
}

#[test]
fn config_defaults_match_firmware() {
    let config = RobotConfig::default();
    assert_eq!(config.port, 8080);
    assert_eq!(config.stop_distance_cm, 10.0);
    assert_eq!(config.turn_dwell_ms, 500);
    assert_eq!(config.sample_interval_ms, 1000);
    assert_eq!(config.echo_timeout_us, 300_000);
    assert_eq!(config.wheel, WheelGeometry::new(0.68, 20));
}

#[test]
fn partial_json_config_keeps_defaults() {
    let config = RobotConfig::from_json(
        r#"{ "port": 9000, "wheel": { "diameter_cm": 6.5, "pulses_per_revolution": 40 } }"#,
    )
    .unwrap();
    assert_eq!(config.port, 9000);
    assert_eq!(config.wheel.pulses_per_revolution, 40);
    assert_eq!(config.stop_distance_cm, 10.0);
}

#[test]
fn malformed_json_config_is_an_error() {
    assert!(RobotConfig::from_json("{ \"port\": \"eighty\" }").is_err());
}
