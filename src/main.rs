#![forbid(unsafe_code)]

use std::process::exit;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xml_multimap::MultimapParser;

const USAGE: &str = "Loads a <map>/<entry> XML document and prints the resulting multimap, \
    can also be used as a validator. Usage: xml-multimap <path> [--continue]";

/// Read an XML map file, print each key with its values, and render every violation
/// with a source snippet. `--continue` skips bad entries instead of aborting.
fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xml_multimap=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut path = None;
    let mut continue_on_error = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--continue" => continue_on_error = true,
            _ if path.is_none() => path = Some(arg),
            _ => {
                eprintln!("{USAGE}");
                exit(1);
            }
        }
    }
    let Some(path) = path else {
        eprintln!("{USAGE}");
        exit(1);
    };

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Failed to read {path}: {err}");
            exit(2);
        }
    };

    let report = MultimapParser::new()
        .continue_on_error(continue_on_error)
        .parse_with_report(&content);

    for violation in &report.violations {
        eprintln!("{}", violation.render(&content, &path));
    }

    if report.aborted {
        eprintln!("{path} invalid: parse aborted");
        exit(3);
    }

    println!("{} ({} keys)", report.map.kind(), report.map.len());
    for (key, group) in &report.map {
        let values: Vec<&str> = group.iter().map(String::as_str).collect();
        println!("{key} [{}]: {}", group.kind(), values.join(", "));
    }
}
