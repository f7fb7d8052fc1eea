#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use cordgate_client::config;
use cordgate_core::protocol::Intents;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
gateway:
  token: "t0k"
  intents: 1
backof: { initial_ms: 500 } # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "INVALID_CONFIGURATION");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
gateway:
  token: "t0k"
  intents: 513
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.gateway.url, "wss://gateway.discord.gg/?v=9&encoding=json");
    assert!(cfg.gateway.reconnect);
    assert_eq!(cfg.backoff.initial_ms, 1000);
    assert_eq!(cfg.identify().unwrap().intents, Intents::GUILDS | Intents::GUILD_MESSAGES);
}

#[test]
fn intents_by_name() {
    let ok = r#"
version: 1
gateway:
  token: "t0k"
  intents: [guilds, guild_messages, direct_messages]
  properties: { os: linux }
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    let identify = cfg.identify().unwrap();
    assert_eq!(
        identify.intents,
        Intents::GUILDS | Intents::GUILD_MESSAGES | Intents::DIRECT_MESSAGES
    );
    assert_eq!(identify.properties.os, "linux");
    assert_eq!(identify.properties.browser, "cordgate");
}

#[test]
fn invalid_intents_are_rejected() {
    for intents in ["-1", "32768", "[guilds, not_an_intent]", "\"guilds\"", "1.5"] {
        let bad = format!("version: 1\ngateway:\n  token: t0k\n  intents: {intents}\n");
        let err = config::load_from_str(&bad).expect_err(&bad);
        assert_eq!(err.code().as_str(), "INVALID_CONFIGURATION", "intents={intents}");
    }
}

#[test]
fn ranges_are_validated() {
    let cases = [
        "version: 2\ngateway: { token: t, intents: 1 }\n",
        "version: 1\ngateway: { token: \"  \", intents: 1 }\n",
        "version: 1\ngateway: { token: t, intents: 1, url: \"https://x\" }\n",
        "version: 1\ngateway: { token: t, intents: 1, large_threshold: 10 }\n",
        "version: 1\ngateway: { token: t, intents: 1 }\nbackoff: { initial_ms: 5000, max_ms: 1000 }\n",
        "version: 1\ngateway: { token: t, intents: 1 }\nbackoff: { multiplier: 0 }\n",
    ];
    for bad in cases {
        assert!(config::load_from_str(bad).is_err(), "case={bad}");
    }
}
