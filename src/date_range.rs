//! Optional inclusive date bounds for list and report queries.

use time::Date;

use crate::Error;

/// An inclusive date range where either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

impl DateRange {
    /// Create a date range.
    ///
    /// # Errors
    /// Returns [Error::InvalidDateRange] if both ends are given and `start` is after `end`.
    pub fn new(start: Option<Date>, end: Option<Date>) -> Result<Self, Error> {
        if let (Some(start), Some(end)) = (start, end)
            && start > end
        {
            return Err(Error::InvalidDateRange(start, end));
        }

        Ok(Self { start, end })
    }

    /// An SQL condition on `column` that binds the start and end to the
    /// parameters `?{first_param}` and `?{first_param + 1}`.
    ///
    /// A missing end binds as NULL and leaves that side unbounded.
    pub fn sql_condition(column: &str, first_param: usize) -> String {
        let end_param = first_param + 1;

        format!(
            "(?{first_param} IS NULL OR {column} >= ?{first_param}) \
            AND (?{end_param} IS NULL OR {column} <= ?{end_param})"
        )
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::Error;

    use super::DateRange;

    #[test]
    fn start_after_end_is_rejected() {
        assert_eq!(
            DateRange::new(Some(date!(2025 - 02 - 01)), Some(date!(2025 - 01 - 01))),
            Err(Error::InvalidDateRange(
                date!(2025 - 02 - 01),
                date!(2025 - 01 - 01)
            ))
        );
    }

    #[test]
    fn open_ends_are_allowed() {
        assert!(DateRange::new(None, Some(date!(2025 - 01 - 31))).is_ok());
        assert!(DateRange::new(Some(date!(2025 - 01 - 31)), None).is_ok());
        assert!(DateRange::new(Some(date!(2025 - 01 - 31)), Some(date!(2025 - 01 - 31))).is_ok());
    }

    #[test]
    fn builds_numbered_condition() {
        assert_eq!(
            DateRange::sql_condition("date", 2),
            "(?2 IS NULL OR date >= ?2) AND (?3 IS NULL OR date <= ?3)"
        );
    }
}
