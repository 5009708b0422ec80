use crate::models::{Month, RentRecord};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A validated write to the ledger. `(property_id, year, month)` is the
/// natural key; everything else replaces whatever was stored before.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordUpsert {
    pub property_id: i32,
    pub year: i32,
    pub month: Month,
    pub received: bool,
    pub expected_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    pub payment_mode: Option<String>,
    pub rent_amount: Option<Decimal>,
}

#[derive(Clone, Debug)]
pub struct RecordWithProperty {
    pub record: RentRecord,
    pub property_name: String,
    pub renter_name: String,
    pub current_rent: Decimal,
}

impl RecordWithProperty {
    /// The month-specific amount if one was recorded, otherwise whatever the
    /// property currently charges.
    pub fn effective_rent(&self) -> Decimal {
        self.record.rent_amount.unwrap_or(self.current_rent)
    }
}
