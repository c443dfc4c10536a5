//! Small ordered reducers over the table's creation dates.

use crate::record::Record;
use std::collections::BTreeMap;
use time::Date;

/// Documents per publication year, ordered by year.
pub fn yearly_counts(records: &[Record]) -> BTreeMap<i32, u64> {
    let mut counts = BTreeMap::new();
    for r in records {
        if let Some(year) = r.year() {
            *counts.entry(year).or_insert(0) += 1;
        }
    }
    counts
}

/// Documents per calendar day, ordered by date.
pub fn daily_counts(records: &[Record]) -> BTreeMap<Date, u64> {
    let mut counts = BTreeMap::new();
    for r in records {
        if let Some(d) = r.created {
            *counts.entry(d.date()).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn counts_group_and_order() {
        let mut a = Record::default();
        a.created = Some(datetime!(2021-05-01 10:00 UTC));
        let mut b = Record::default();
        b.created = Some(datetime!(2021-05-01 22:00 UTC));
        let mut c = Record::default();
        c.created = Some(datetime!(2019-02-03 0:00 UTC));
        let d = Record::default(); // no date

        let records = vec![a, b, c, d];
        let years = yearly_counts(&records);
        assert_eq!(years.get(&2021), Some(&2));
        assert_eq!(years.get(&2019), Some(&1));
        assert_eq!(years.keys().next(), Some(&2019));

        let days = daily_counts(&records);
        assert_eq!(days.len(), 2);
        assert_eq!(days.values().sum::<u64>(), 3);
    }
}
