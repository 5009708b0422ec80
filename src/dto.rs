//! JSON shapes of the HTTP API. Outgoing DTOs mirror the field names the
//! frontend already uses; incoming payloads are deserialized leniently and
//! then validated into domain types, so a missing field becomes a
//! `LedgerError::Validation` rather than an extractor rejection.

use super::{
    errors::LedgerError,
    ledger::models::RecordUpsert,
    models::{EscalationRule, Month, Property, PropertyFields, RentRecord},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Serialize};

const ISO_DATE: &str = "%Y-%m-%d";

fn to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or_default()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDto {
    pub id: String,
    pub name: String,
    pub address: String,
    pub renter_name: String,
    pub renter_contact: String,
    pub initial_rent: f64,
    pub current_rent: f64,
    pub lease_start_date: NaiveDate,
    pub expected_rent_date: i32,
    pub yearly_increase_percent: Option<f64>,
    pub yearly_increase_amount: Option<f64>,
    pub created_at: DateTime<Utc>,
    /// Same as `current_rent`; older clients read this name.
    pub monthly_rent: f64,
}

impl From<&Property> for PropertyDto {
    fn from(p: &Property) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            address: p.address.clone(),
            renter_name: p.renter_name.clone(),
            renter_contact: p.renter_contact.clone().unwrap_or_default(),
            initial_rent: to_f64(p.initial_rent),
            current_rent: to_f64(p.current_rent),
            lease_start_date: p.lease_start_date,
            expected_rent_date: p.expected_rent_day,
            yearly_increase_percent: p.escalation.percent().map(to_f64),
            yearly_increase_amount: p.escalation.amount().map(to_f64),
            created_at: p.created_at,
            monthly_rent: to_f64(p.current_rent),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentRecordDto {
    pub received: bool,
    /// ISO date, or `""` when unset
    pub expected_date: String,
    pub received_date: String,
    pub payment_mode: String,
    pub rent_amount: f64,
}

fn date_or_empty(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(ISO_DATE).to_string())
        .unwrap_or_default()
}

impl From<&RentRecord> for RentRecordDto {
    fn from(r: &RentRecord) -> Self {
        Self {
            received: r.received,
            expected_date: date_or_empty(r.expected_date),
            received_date: date_or_empty(r.received_date),
            payment_mode: r.payment_mode.clone().unwrap_or_default(),
            rent_amount: r.rent_amount.map(to_f64).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPayload {
    pub name: Option<String>,
    pub address: Option<String>,
    pub renter_name: Option<String>,
    pub renter_contact: Option<String>,
    pub initial_rent: Option<Decimal>,
    pub lease_start_date: Option<String>,
    pub expected_rent_date: Option<i32>,
    pub yearly_increase_percent: Option<Decimal>,
    pub yearly_increase_amount: Option<Decimal>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, LedgerError> {
    value.ok_or_else(|| LedgerError::Validation(format!("{field} is required")))
}

fn required_text(value: Option<String>, field: &str) -> Result<String, LedgerError> {
    let value = required(value, field)?;
    if value.trim().is_empty() {
        return Err(LedgerError::Validation(format!("{field} must not be blank")));
    }
    Ok(value)
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, LedgerError> {
    NaiveDate::parse_from_str(value, ISO_DATE).map_err(|_| {
        LedgerError::Validation(format!("{field} must be a YYYY-MM-DD date"))
    })
}

/// Absent and empty strings both mean "no date".
fn optional_date(
    value: Option<String>,
    field: &str,
) -> Result<Option<NaiveDate>, LedgerError> {
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => parse_date(s, field).map(Some),
    }
}

fn non_negative(value: Decimal, field: &str) -> Result<Decimal, LedgerError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(LedgerError::Validation(format!("{field} must not be negative")));
    }
    Ok(value)
}

impl PropertyPayload {
    pub fn validate(self) -> Result<PropertyFields, LedgerError> {
        let lease_start_date =
            parse_date(&required(self.lease_start_date, "leaseStartDate")?, "leaseStartDate")?;
        let expected_rent_day = required(self.expected_rent_date, "expectedRentDate")?;
        if !(1..=31).contains(&expected_rent_day) {
            return Err(LedgerError::Validation(
                "expectedRentDate must be a day of month (1-31)".into(),
            ));
        }
        let initial_rent =
            non_negative(required(self.initial_rent, "initialRent")?, "initialRent")?;
        if self.yearly_increase_percent.is_some_and(|p| !p.is_zero())
            && self.yearly_increase_amount.is_some_and(|a| !a.is_zero())
        {
            tracing::warn!(
                "both yearly increase percent and amount given; using the percent"
            );
        }
        let escalation = EscalationRule::from_parts(
            self.yearly_increase_percent
                .map(|p| non_negative(p, "yearlyIncreasePercent"))
                .transpose()?,
            self.yearly_increase_amount
                .map(|a| non_negative(a, "yearlyIncreaseAmount"))
                .transpose()?,
        );

        Ok(PropertyFields {
            name: required_text(self.name, "name")?,
            address: required_text(self.address, "address")?,
            renter_name: required_text(self.renter_name, "renterName")?,
            renter_contact: self.renter_contact.filter(|c| !c.is_empty()),
            initial_rent,
            lease_start_date,
            expected_rent_day,
            escalation,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentRecordPayload {
    pub property_id: Option<i32>,
    pub year: Option<i32>,
    /// 0-based, as sent by the frontend
    pub month: Option<i64>,
    pub received: Option<bool>,
    pub expected_date: Option<String>,
    pub received_date: Option<String>,
    pub payment_mode: Option<String>,
    pub rent_amount: Option<Decimal>,
}

impl RentRecordPayload {
    pub fn validate(self) -> Result<RecordUpsert, LedgerError> {
        let month_index = required(self.month, "month")?;
        let month = Month::from_zero_based(month_index).ok_or_else(|| {
            LedgerError::Validation(format!(
                "month must be between 0 and 11, got {month_index}"
            ))
        })?;

        Ok(RecordUpsert {
            property_id: required(self.property_id, "propertyId")?,
            year: required(self.year, "year")?,
            month,
            received: self.received.unwrap_or(false),
            expected_date: optional_date(self.expected_date, "expectedDate")?,
            received_date: optional_date(self.received_date, "receivedDate")?,
            payment_mode: self.payment_mode.filter(|m| !m.is_empty()),
            rent_amount: self
                .rent_amount
                .filter(|a| !a.is_zero())
                .map(|a| non_negative(a, "rentAmount"))
                .transpose()?,
        })
    }
}
