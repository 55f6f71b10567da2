//! Effective timestamp resolution
//!
//! Creation and modification times disagree after files are copied around
//! (a copy often resets the creation time). The earlier of the two is taken
//! as the capture time and used both for folder placement and for duplicate
//! comparison.

use crate::os::FileStat;
use chrono::{DateTime, Datelike, Local};

/// Return the earlier of two timestamps
pub fn resolve(a: DateTime<Local>, b: DateTime<Local>) -> DateTime<Local> {
    a.min(b)
}

/// Effective timestamp from best-effort file times
///
/// Without a creation time the modification time is the floor.
pub fn effective_timestamp(created: Option<DateTime<Local>>, modified: DateTime<Local>) -> DateTime<Local> {
    match created {
        Some(created) => resolve(created, modified),
        None => modified,
    }
}

impl FileStat {
    /// Effective timestamp of this file
    pub fn effective_timestamp(&self) -> DateTime<Local> {
        effective_timestamp(self.created, self.modified)
    }
}

/// `YYYYMMDD` form used for name prefixes
pub fn date_stamp(ts: &DateTime<Local>) -> String {
    ts.format("%Y%m%d").to_string()
}

/// `YYYYMMDD_<name>`
pub fn prefixed_name(ts: &DateTime<Local>, name: &str) -> String {
    format!("{}_{}", date_stamp(ts), name)
}

/// Whether `name` already starts with the year of `ts`
///
/// This is what marks a file as renamed by an earlier run.
pub fn has_year_prefix(name: &str, ts: &DateTime<Local>) -> bool {
    name.get(..4) == Some(ts.year().to_string().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_resolve_takes_minimum() {
        let early = at(2019, 3, 1);
        let late = at(2021, 6, 15);
        assert_eq!(resolve(early, late), early);
        assert_eq!(resolve(late, early), early);
        assert_eq!(resolve(late, late), late);
    }

    #[test]
    fn test_effective_timestamp_without_creation_time() {
        let modified = at(2020, 1, 2);
        assert_eq!(effective_timestamp(None, modified), modified);
        assert_eq!(effective_timestamp(Some(at(2024, 1, 1)), modified), modified);
        assert_eq!(effective_timestamp(Some(at(2018, 1, 1)), modified), at(2018, 1, 1));
    }

    #[test]
    fn test_stat_effective_timestamp() {
        let stat = FileStat {
            size: 10,
            created: Some(at(2022, 5, 5)),
            modified: at(2021, 6, 15),
            accessed: None,
        };
        assert_eq!(stat.effective_timestamp(), at(2021, 6, 15));
    }

    #[test]
    fn test_prefixed_name() {
        assert_eq!(date_stamp(&at(2021, 6, 15)), "20210615");
        assert_eq!(prefixed_name(&at(2021, 6, 5), "photo.jpg"), "20210605_photo.jpg");
    }

    #[test]
    fn test_has_year_prefix() {
        let ts = at(2019, 7, 4);
        assert!(has_year_prefix("20190704_vacation.jpg", &ts));
        assert!(has_year_prefix("2019 beach.jpg", &ts));
        assert!(!has_year_prefix("vacation.jpg", &ts));
        assert!(!has_year_prefix("20180704_vacation.jpg", &ts));
        assert!(!has_year_prefix("201", &ts));
        assert!(!has_year_prefix("é201.jpg", &ts));
    }
}
