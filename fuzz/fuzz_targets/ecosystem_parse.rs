//! Fuzz harness for ecosystem file parsing and argument splitting.
//!
//! Arbitrary bytes are converted to UTF-8 and fed to the TOML and JSON
//! parsers and to `split_args`. None of them may panic, and any config that
//! parses must survive a serialize/parse round trip unchanged.

#![no_main]
use ecolaunch_core::config::EcosystemConfig;
use ecolaunch_core::process::split_args;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    let _ = split_args(&text);

    if let Ok(config) = EcosystemConfig::from_toml(&text) {
        let _ = config.validate();
        if let Ok(rendered) = config.to_toml() {
            let reparsed = EcosystemConfig::from_toml(&rendered).expect("rendered TOML must parse");
            assert_eq!(config, reparsed);
        }
    }

    if let Ok(config) = EcosystemConfig::from_json(&text) {
        let rendered = config.to_json().expect("JSON rendering is infallible for parsed configs");
        let reparsed = EcosystemConfig::from_json(&rendered).expect("rendered JSON must parse");
        assert_eq!(config, reparsed);
    }
});
