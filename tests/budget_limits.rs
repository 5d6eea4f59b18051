use xml_multimap::{Budget, BudgetBreach, Error, MultimapParser, budget, check_xml_budget};

fn wide_map(entries: usize) -> String {
    let mut xml = String::from("<map>\n");
    for idx in 0..entries {
        xml.push_str(&format!("  <entry key=\"k{idx}\" value=\"v{idx}\"/>\n"));
    }
    xml.push_str("</map>\n");
    xml
}

fn deep_entry(depth: usize) -> String {
    let mut xml = String::from("<map><entry><key>k</key><value>v</value><junk>");
    for _ in 0..depth {
        xml.push_str("<n>");
    }
    for _ in 0..depth {
        xml.push_str("</n>");
    }
    xml.push_str("</junk></entry></map>");
    xml
}

#[test]
fn default_budget_accepts_ordinary_maps() {
    let report = check_xml_budget(&wide_map(1_000), &Budget::default()).unwrap();
    assert!(report.breached.is_none());
    assert_eq!(report.elements, 1_001);
    assert_eq!(report.attributes, 2_000);
    assert_eq!(report.max_depth, 2);
}

#[test]
fn element_breach_aborts_even_in_continue_mode() {
    let parser = MultimapParser::new()
        .continue_on_error(true)
        .with_budget(Some(budget! { max_elements: 10 }));
    let report = parser.parse_with_report(&wide_map(50));
    assert!(report.aborted);
    assert!(report.map.is_empty());
    assert!(
        matches!(
            report.fatal(),
            Some(Error::Budget {
                breach: BudgetBreach::Elements { elements: 11 },
                ..
            })
        ),
        "{:?}",
        report.violations
    );
}

#[test]
fn deep_nesting_inside_skipped_subtree_is_still_counted() {
    let xml = deep_entry(64);
    let parser = MultimapParser::new()
        .continue_on_error(true)
        .with_budget(Some(budget! { max_depth: 16 }));
    let report = parser.parse_with_report(&xml);
    assert!(report.aborted);
    assert!(matches!(
        report.fatal(),
        Some(Error::Budget {
            breach: BudgetBreach::Depth { depth: 17 },
            ..
        })
    ));

    let report = MultimapParser::new()
        .continue_on_error(true)
        .parse_with_report(&xml);
    assert!(!report.aborted);
    assert_eq!(report.map.get("k").unwrap().to_vec(), ["v"]);
}

#[test]
fn input_size_is_checked_before_reading() {
    let parser = MultimapParser::new().with_budget(Some(budget! { max_input_bytes: 16 }));
    let report = parser.parse_with_report(&wide_map(2));
    assert!(matches!(
        report.fatal(),
        Some(Error::Budget {
            breach: BudgetBreach::InputBytes { .. },
            ..
        })
    ));
}

#[test]
fn text_budget_covers_attribute_values_and_bodies() {
    let body = "x".repeat(1_000);
    let xml = format!("<map><entry key=\"k\">{body}</entry></map>");
    let parser = MultimapParser::new().with_budget(Some(budget! { max_total_text_bytes: 512 }));
    assert!(parser.parse_with_report(&xml).aborted);

    let parser = parser.with_budget(None);
    assert_eq!(parser.parse(&xml).get("k").unwrap().to_vec(), [body]);
}

#[test]
fn breach_renders_with_its_limit() {
    let report = MultimapParser::new()
        .with_budget(Some(budget! { max_events: 3 }))
        .parse_with_report("<map><entry key=\"k\" value=\"v\"/></map>");
    let err = report.fatal().unwrap();
    assert!(err.is_fatal());
    assert!(
        err.to_string()
            .starts_with("XML budget breached: Events { events: 4 }"),
        "{err}"
    );
}
