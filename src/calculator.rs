//! Rent escalation. Rent goes up once per completed lease year, counted
//! from the lease start date, according to the property's
//! [`EscalationRule`].
//!
//! Everything here is pure except [`persist_derived_rent`], which is the
//! one place that writes a derived rent back to the database.

use super::models::{EscalationRule, Property};
use anyhow::{anyhow, Result};
use chrono::{Datelike, Local, Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::{query, PgConnection};

/// Rent is stored as NUMERIC(10, 2)
const RENT_SCALE: u32 = 2;

/// The server's calendar date; lease years are counted against this.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Number of lease anniversaries that have passed by `as_of`. An
/// anniversary of a Feb 29 start falls on Feb 28 in common years.
pub fn whole_years_between(start: NaiveDate, as_of: NaiveDate) -> u32 {
    if as_of <= start {
        return 0;
    }
    let mut years = u32::try_from(as_of.year() - start.year()).unwrap_or(0);
    while years > 0 {
        match start.checked_add_months(Months::new(years * 12)) {
            Some(anniversary) if anniversary <= as_of => break,
            _ => years -= 1,
        }
    }
    years
}

/// `None` when the escalated rent no longer fits in a `Decimal`, i.e, a
/// steep percentage compounded over decades.
pub fn derive_current_rent(
    initial_rent: Decimal,
    lease_start: NaiveDate,
    rule: &EscalationRule,
    as_of: NaiveDate,
) -> Option<Decimal> {
    let years = whole_years_between(lease_start, as_of);
    let hundred = Decimal::ONE_HUNDRED;
    let rent = (0..years).try_fold(initial_rent, |rent, _| match rule {
        EscalationRule::Percent(p) => rent
            .checked_mul(*p)
            .and_then(|increase| increase.checked_div(hundred))
            .and_then(|increase| rent.checked_add(increase)),
        EscalationRule::Fixed(amount) => rent.checked_add(*amount),
        EscalationRule::None => Some(rent),
    })?;

    Some(rent.round_dp_with_strategy(
        RENT_SCALE,
        RoundingStrategy::MidpointAwayFromZero,
    ))
}

impl Property {
    pub fn derived_rent(&self, as_of: NaiveDate) -> Option<Decimal> {
        derive_current_rent(
            self.initial_rent,
            self.lease_start_date,
            &self.escalation,
            as_of,
        )
    }
}

/// Re-derive the property's rent as of `as_of` and write it back, so the
/// cached `current_rent` column always reflects the last mutation.
pub async fn persist_derived_rent(
    db: &mut PgConnection,
    property: &mut Property,
    as_of: NaiveDate,
) -> Result<()> {
    let rent = property.derived_rent(as_of).ok_or_else(|| {
        anyhow!("derived rent overflows for property {}", property.id)
    })?;
    query("update property set current_rent = $1 where id = $2")
        .bind(rent)
        .bind(property.id)
        .execute(&mut *db)
        .await?;
    tracing::debug!(
        property_id = property.id,
        %rent,
        "persisted derived rent"
    );
    property.current_rent = rent;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
    }

    fn dec(s: &str) -> Decimal {
        s.parse().expect("valid decimal literal")
    }

    #[test]
    fn test_anniversary_boundary() {
        assert_eq!(whole_years_between(date("2023-02-01"), date("2024-01-31")), 0);
        assert_eq!(whole_years_between(date("2023-02-01"), date("2024-02-01")), 1);
        assert_eq!(whole_years_between(date("2020-06-15"), date("2024-06-14")), 3);
        assert_eq!(whole_years_between(date("2020-06-15"), date("2024-06-15")), 4);
    }

    #[test]
    fn test_lease_in_future_or_today() {
        assert_eq!(whole_years_between(date("2025-01-01"), date("2024-01-01")), 0);
        assert_eq!(whole_years_between(date("2024-01-01"), date("2024-01-01")), 0);
    }

    #[test]
    fn test_leap_day_lease() {
        let start = date("2024-02-29");
        assert_eq!(whole_years_between(start, date("2025-02-27")), 0);
        assert_eq!(whole_years_between(start, date("2025-02-28")), 1);
        assert_eq!(whole_years_between(start, date("2028-02-28")), 3);
        assert_eq!(whole_years_between(start, date("2028-02-29")), 4);
    }

    #[test]
    fn test_no_rule_keeps_initial_rent() {
        let rent = derive_current_rent(
            dec("1000"),
            date("2001-03-01"),
            &EscalationRule::None,
            date("2024-03-01"),
        );
        assert_eq!(rent, Some(dec("1000.00")));
    }

    #[test]
    fn test_percent_compounds() {
        let rent = derive_current_rent(
            dec("1000"),
            date("2022-05-10"),
            &EscalationRule::Percent(dec("10")),
            date("2024-05-10"),
        );
        assert_eq!(rent, Some(dec("1210.00")));

        let rent = derive_current_rent(
            dec("1500"),
            date("2021-01-01"),
            &EscalationRule::Percent(dec("3.5")),
            date("2024-06-01"),
        );
        // 1500 * 1.035^3 = 1663.0768125
        assert_eq!(rent, Some(dec("1663.08")));
    }

    #[test]
    fn test_fixed_amount_is_linear() {
        let rent = derive_current_rent(
            dec("800"),
            date("2019-07-01"),
            &EscalationRule::Fixed(dec("25.50")),
            date("2024-07-01"),
        );
        assert_eq!(rent, Some(dec("927.50")));
    }

    #[test]
    fn test_no_increase_before_first_anniversary() {
        let as_of = date("2024-05-09");
        let rent = derive_current_rent(
            dec("1000"),
            date("2023-05-10"),
            &EscalationRule::Percent(dec("10")),
            as_of,
        );
        assert_eq!(rent, Some(dec("1000")));
    }

    #[test]
    fn test_runaway_percent_is_none() {
        // 999.99% a year for 35 years does not fit in a Decimal
        let rent = derive_current_rent(
            dec("1000"),
            date("1989-01-01"),
            &EscalationRule::Percent(dec("999.99")),
            date("2024-01-01"),
        );
        assert_eq!(rent, None);

        // same rule, but young enough lease still derives normally
        let rent = derive_current_rent(
            dec("1000"),
            date("2022-01-01"),
            &EscalationRule::Percent(dec("999.99")),
            date("2024-01-01"),
        );
        assert_eq!(rent, Some(dec("120997.80")));
    }
}
