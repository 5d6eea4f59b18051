//! Streaming XML budget checker.
//!
//! This inspects the document's event stream and enforces simple budgets to
//! avoid pathological inputs. The walker itself has no cancellation, so the
//! budget is the only bound on the work a single parse performs.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::events::{Ev, Events, LiveEvents};

/// Budgets for a streaming XML scan.
///
/// The defaults are intentionally permissive for typical resource maps while
/// stopping obvious resource-amplifying inputs.
///
/// ```rust
/// use xml_multimap::{from_str_with_options, Budget, Options};
///
/// let options = xml_multimap::options! {
///     budget: Some(Budget {
///         max_elements: 10,
///         ..Budget::default()
///     }),
/// };
///
/// let map = from_str_with_options(r#"<map><entry key="k" value="v"/></map>"#, options);
/// assert_eq!(map.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Maximum size of the input document in bytes.
    ///
    /// Default: 67,108,864 (64 MiB)
    pub max_input_bytes: usize,
    /// Maximum total events (start tags, end tags and text runs).
    ///
    /// Default: 1,000,000
    pub max_events: usize,
    /// Maximum element nesting depth.
    ///
    /// Default: 256
    pub max_depth: usize,
    /// Maximum number of elements.
    ///
    /// Default: 250,000
    pub max_elements: usize,
    /// Maximum number of attributes across all elements.
    ///
    /// Default: 500,000
    pub max_attributes: usize,
    /// Maximum total bytes of text content and attribute values.
    ///
    /// Default: 67,108,864 (64 MiB)
    pub max_total_text_bytes: usize,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_input_bytes: 64 * 1024 * 1024,
            max_events: 1_000_000,
            max_depth: 256,
            max_elements: 250_000,
            max_attributes: 500_000,
            max_total_text_bytes: 64 * 1024 * 1024,
        }
    }
}

/// What tripped the budget (if anything).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetBreach {
    /// The input exceeded [`Budget::max_input_bytes`].
    InputBytes { input_bytes: usize },
    /// The total number of events exceeded [`Budget::max_events`].
    Events { events: usize },
    /// Element nesting exceeded [`Budget::max_depth`].
    Depth { depth: usize },
    /// The number of elements exceeded [`Budget::max_elements`].
    Elements { elements: usize },
    /// The number of attributes exceeded [`Budget::max_attributes`].
    Attributes { attributes: usize },
    /// Text and attribute bytes exceeded [`Budget::max_total_text_bytes`].
    TextBytes { total_text_bytes: usize },
    /// An end tag without a matching start tag.
    Unbalanced,
}

/// Summary of the scan (even if no breach).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetReport {
    /// `Some(..)` if a limit was exceeded; `None` if all budgets were respected.
    pub breached: Option<BudgetBreach>,
    pub input_bytes: usize,
    pub events: usize,
    pub elements: usize,
    pub attributes: usize,
    /// Deepest nesting reached at any point.
    pub max_depth: usize,
    pub total_text_bytes: usize,
}

/// Stateful helper that enforces a [`Budget`] while consuming a stream of [`Ev`]s.
#[derive(Debug)]
pub struct BudgetEnforcer {
    budget: Budget,
    report: BudgetReport,
    depth: usize,
}

impl BudgetEnforcer {
    pub fn new(budget: Budget) -> Self {
        Self {
            budget,
            report: BudgetReport::default(),
            depth: 0,
        }
    }

    /// Check the raw input size before any event is read.
    pub fn observe_input(&mut self, input_bytes: usize) -> Result<(), BudgetBreach> {
        self.report.input_bytes = input_bytes;
        if input_bytes > self.budget.max_input_bytes {
            return self.breach(BudgetBreach::InputBytes { input_bytes });
        }
        Ok(())
    }

    /// Observe one event, updating the counters.
    ///
    /// Returns `Err(BudgetBreach)` as soon as a limit is exceeded.
    pub fn observe(&mut self, ev: &Ev) -> Result<(), BudgetBreach> {
        self.report.events += 1;
        if self.report.events > self.budget.max_events {
            return self.breach(BudgetBreach::Events {
                events: self.report.events,
            });
        }

        match ev {
            Ev::Start { attributes, .. } => {
                self.report.elements += 1;
                if self.report.elements > self.budget.max_elements {
                    return self.breach(BudgetBreach::Elements {
                        elements: self.report.elements,
                    });
                }

                self.depth = self.depth.saturating_add(1);
                self.report.max_depth = self.report.max_depth.max(self.depth);
                if self.depth > self.budget.max_depth {
                    return self.breach(BudgetBreach::Depth { depth: self.depth });
                }

                self.report.attributes = self.report.attributes.saturating_add(attributes.len());
                if self.report.attributes > self.budget.max_attributes {
                    return self.breach(BudgetBreach::Attributes {
                        attributes: self.report.attributes,
                    });
                }

                let attribute_bytes = attributes.iter().map(|a| a.value.len()).sum();
                self.add_text_bytes(attribute_bytes)?;
            }
            Ev::End { .. } => match self.depth.checked_sub(1) {
                Some(depth) => self.depth = depth,
                None => return self.breach(BudgetBreach::Unbalanced),
            },
            Ev::Text { value, .. } => self.add_text_bytes(value.len())?,
        }
        Ok(())
    }

    fn add_text_bytes(&mut self, bytes: usize) -> Result<(), BudgetBreach> {
        self.report.total_text_bytes = self.report.total_text_bytes.saturating_add(bytes);
        if self.report.total_text_bytes > self.budget.max_total_text_bytes {
            return self.breach(BudgetBreach::TextBytes {
                total_text_bytes: self.report.total_text_bytes,
            });
        }
        Ok(())
    }

    fn breach(&mut self, breach: BudgetBreach) -> Result<(), BudgetBreach> {
        self.report.breached = Some(breach.clone());
        Err(breach)
    }

    /// Finish and return the report.
    pub fn finalize(self) -> BudgetReport {
        self.report
    }
}

/// Scan `input` against `budget` without building a multimap.
///
/// Returns the report, with `breached` set when a limit tripped. XML syntax errors are
/// returned as `Err`.
pub fn check_xml_budget(input: &str, budget: &Budget) -> Result<BudgetReport, Error> {
    let mut enforcer = BudgetEnforcer::new(budget.clone());
    if enforcer.observe_input(input.len()).is_err() {
        return Ok(enforcer.finalize());
    }

    let mut src = LiveEvents::new(input, None, false);
    while let Some(ev) = src.next()? {
        if enforcer.observe(&ev).is_err() {
            break;
        }
    }
    Ok(enforcer.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_xml_ok() {
        let report = check_xml_budget(
            r#"<map><entry key="a" value="1"/></map>"#,
            &Budget::default(),
        )
        .unwrap();
        assert!(report.breached.is_none());
        assert_eq!(report.elements, 2);
        assert_eq!(report.attributes, 2);
        assert_eq!(report.max_depth, 2);
    }

    #[test]
    fn deep_nesting_trips_depth() {
        let mut xml = String::new();
        for _ in 0..20 {
            xml.push_str("<a>");
        }
        for _ in 0..20 {
            xml.push_str("</a>");
        }
        let budget = Budget {
            max_depth: 10,
            ..Budget::default()
        };
        let report = check_xml_budget(&xml, &budget).unwrap();
        assert_eq!(report.breached, Some(BudgetBreach::Depth { depth: 11 }));
    }

    #[test]
    fn element_count_is_limited() {
        let mut xml = String::from("<map>");
        for i in 0..50 {
            xml.push_str(&format!("<entry key=\"{i}\" value=\"{i}\"/>"));
        }
        xml.push_str("</map>");
        let budget = Budget {
            max_elements: 10,
            ..Budget::default()
        };
        let report = check_xml_budget(&xml, &budget).unwrap();
        assert_eq!(report.breached, Some(BudgetBreach::Elements { elements: 11 }));
    }

    #[test]
    fn input_size_is_checked_first() {
        let budget = Budget {
            max_input_bytes: 4,
            ..Budget::default()
        };
        let report = check_xml_budget("<map></map>", &budget).unwrap();
        assert_eq!(
            report.breached,
            Some(BudgetBreach::InputBytes { input_bytes: 11 })
        );
        assert_eq!(report.events, 0);
    }

    #[test]
    fn text_bytes_include_attribute_values() {
        let budget = Budget {
            max_total_text_bytes: 5,
            ..Budget::default()
        };
        let report = check_xml_budget(r#"<map><entry key="abc" value="def"/></map>"#, &budget)
            .unwrap();
        assert!(matches!(report.breached, Some(BudgetBreach::TextBytes { .. })));
    }

    #[test]
    fn syntax_errors_are_errors() {
        assert!(check_xml_budget("<map><entry></map>", &Budget::default()).is_err());
    }
}
