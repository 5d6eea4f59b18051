//! The single check every fallible step funnels through.

use crate::error::Error;

/// Decides whether a violation aborts the parse or is recorded and skipped.
#[derive(Debug)]
pub(crate) struct ErrorPolicy {
    continue_on_error: bool,
    violations: Vec<Error>,
}

impl ErrorPolicy {
    pub(crate) fn new(continue_on_error: bool) -> Self {
        Self {
            continue_on_error,
            violations: Vec::new(),
        }
    }

    /// `Ok(())` means the caller drops the offending unit and carries on;
    /// `Err` means the parse aborts with this violation.
    pub(crate) fn recover(&mut self, err: Error) -> Result<(), Error> {
        if err.is_fatal() || !self.continue_on_error {
            return Err(err);
        }
        tracing::warn!(violation = %err, "skipping");
        self.violations.push(err);
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.violations.len()
    }

    pub(crate) fn into_violations(self) -> Vec<Error> {
        self.violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;

    fn unknown_tag() -> Error {
        Error::UnknownTag {
            parent: "map".into(),
            name: "foo".into(),
            location: Location::UNKNOWN,
        }
    }

    #[test]
    fn fail_fast_aborts_on_first_violation() {
        let mut policy = ErrorPolicy::new(false);
        assert_eq!(policy.recover(unknown_tag()), Err(unknown_tag()));
        assert!(policy.into_violations().is_empty());
    }

    #[test]
    fn continue_mode_records_and_proceeds() {
        let mut policy = ErrorPolicy::new(true);
        assert_eq!(policy.recover(unknown_tag()), Ok(()));
        assert_eq!(policy.into_violations(), vec![unknown_tag()]);
    }

    #[test]
    fn fatal_violations_abort_in_continue_mode() {
        let mut policy = ErrorPolicy::new(true);
        let fatal = Error::MissingRoot {
            location: Location::UNKNOWN,
        };
        assert_eq!(policy.recover(fatal.clone()), Err(fatal));
    }
}
