#![no_main]

use libfuzzer_sys::fuzz_target;
use xml_multimap::{MultimapParser, ParseReport};

fn check<K, V>(report: &ParseReport<K, V>) {
    if report.aborted {
        assert!(report.map.is_empty());
        assert!(report.fatal().is_some());
    }
    for (_, group) in &report.map {
        assert!(!group.is_empty());
    }
}

// Arbitrary bytes as a whole document, in both error modes.
fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }
    let xml = String::from_utf8_lossy(data);

    let strict = MultimapParser::new();
    let report = strict.parse_with_report(&xml);
    check(&report);

    let lenient = strict.continue_on_error(true);
    let lenient_report = lenient.parse_with_report(&xml);
    check(&lenient_report);

    // Anything the strict parse accepted cleanly, the lenient one accepts identically.
    if report.is_clean() {
        assert_eq!(report.map, lenient_report.map);
    }
});
