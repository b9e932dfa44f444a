#![no_main]

// Rule parsing must never panic, and accepted rules must print back to a
// string that parses to the same rule.

use alphakit::GenerationRule;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|text: &str| {
    if let Ok(rule) = text.parse::<GenerationRule>() {
        assert_eq!(rule.to_string().parse::<GenerationRule>(), Ok(rule));
    }
});
