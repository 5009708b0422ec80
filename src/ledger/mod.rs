//! The rent ledger holds one [`RentRecord`] per property per calendar
//! month. Writes are upserts on `(property_id, year, month)`; there is no
//! separate "create" path.
//!
//! A record's payment status is derived from its `received` flag:
//!
//! - `Pending`: rent not (yet) received
//! - `Received`: rent received, usually with a `received_date`
//!
//! Toggling back to pending is allowed and not checked.

pub mod db_ops;
pub mod models;

use crate::models::RentRecord;
use std::collections::BTreeMap;

/// Key used by the JSON API to address a month: `"{year}-{month}"` with
/// the 0-based month of the frontend.
pub fn month_key(record: &RentRecord) -> String {
    format!("{}-{}", record.year, record.month.zero_based())
}

/// Group records by month key, then by property id (as a string).
pub fn group_by_month<'a, I>(
    records: I,
) -> BTreeMap<String, BTreeMap<String, &'a RentRecord>>
where
    I: IntoIterator<Item = &'a RentRecord>,
{
    let mut grouped: BTreeMap<String, BTreeMap<String, &RentRecord>> =
        BTreeMap::new();
    for record in records {
        grouped
            .entry(month_key(record))
            .or_default()
            .insert(record.property_id.to_string(), record);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Month;
    use chrono::Utc;

    fn record(property_id: i32, year: i32, month: u8) -> RentRecord {
        RentRecord {
            id: property_id * 100 + i32::from(month),
            property_id,
            year,
            month: Month::new(month).unwrap(),
            received: false,
            expected_date: None,
            received_date: None,
            payment_mode: None,
            rent_amount: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_month_key_is_zero_based() {
        assert_eq!(month_key(&record(1, 2024, 4)), "2024-3");
        assert_eq!(month_key(&record(1, 2024, 1)), "2024-0");
        assert_eq!(month_key(&record(1, 2023, 12)), "2023-11");
    }

    #[test]
    fn test_group_by_month() {
        let records = vec![
            record(1, 2024, 4),
            record(2, 2024, 4),
            record(1, 2024, 5),
        ];
        let grouped = group_by_month(&records);

        assert_eq!(grouped.len(), 2);
        let april = &grouped["2024-3"];
        assert_eq!(april.len(), 2);
        assert_eq!(april["1"].property_id, 1);
        assert_eq!(april["2"].property_id, 2);
        assert_eq!(grouped["2024-4"]["1"].month.number(), 5);
    }
}
