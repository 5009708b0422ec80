use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
}

/// A calendar month, always 1-12 internally. The JSON API speaks the
/// 0-based convention of the frontend (`Date.getMonth()`), so conversion
/// only happens at that boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(u8);

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

impl Month {
    pub fn new(number: u8) -> Option<Self> {
        (1..=12).contains(&number).then_some(Self(number))
    }
    pub fn from_zero_based(index: i64) -> Option<Self> {
        u8::try_from(index)
            .ok()
            .and_then(|i| i.checked_add(1))
            .and_then(Self::new)
    }
    pub fn number(&self) -> u8 {
        self.0
    }
    pub fn zero_based(&self) -> u8 {
        self.0 - 1
    }
    pub fn name(&self) -> &'static str {
        MONTH_NAMES[usize::from(self.0 - 1)]
    }
}

/// How the rent grows on each lease anniversary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EscalationRule {
    #[default]
    None,
    /// Compounding percentage, i.e, `10` means +10% per lease year.
    Percent(Decimal),
    /// Flat amount added per lease year.
    Fixed(Decimal),
}

impl EscalationRule {
    /// Build a rule from the two nullable columns / payload fields. Zero
    /// counts as unset, and a percentage wins over a fixed amount.
    pub fn from_parts(
        percent: Option<Decimal>,
        amount: Option<Decimal>,
    ) -> Self {
        match (
            percent.filter(|p| !p.is_zero()),
            amount.filter(|a| !a.is_zero()),
        ) {
            (Some(p), _) => Self::Percent(p),
            (None, Some(a)) => Self::Fixed(a),
            (None, None) => Self::None,
        }
    }
    pub fn percent(&self) -> Option<Decimal> {
        match self {
            Self::Percent(p) => Some(*p),
            _ => None,
        }
    }
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            Self::Fixed(a) => Some(*a),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Property {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub renter_name: String,
    pub renter_contact: Option<String>,
    pub initial_rent: Decimal,
    pub current_rent: Decimal,
    pub lease_start_date: NaiveDate,
    /// Day of month (1-31) the rent is expected.
    pub expected_rent_day: i32,
    pub escalation: EscalationRule,
    pub created_at: DateTime<Utc>,
}

/// The mutable fields of a property, validated and ready to be written.
/// Used for both create and full-replace update.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyFields {
    pub name: String,
    pub address: String,
    pub renter_name: String,
    pub renter_contact: Option<String>,
    pub initial_rent: Decimal,
    pub lease_start_date: NaiveDate,
    pub expected_rent_day: i32,
    pub escalation: EscalationRule,
}

impl Property {
    /// Overwrite every mutable field with `fields`, leaving identity,
    /// creation time and the cached rent alone.
    pub fn replace_fields(&mut self, fields: PropertyFields) {
        self.name = fields.name;
        self.address = fields.address;
        self.renter_name = fields.renter_name;
        self.renter_contact = fields.renter_contact;
        self.initial_rent = fields.initial_rent;
        self.lease_start_date = fields.lease_start_date;
        self.expected_rent_day = fields.expected_rent_day;
        self.escalation = fields.escalation;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Received,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Received => "Received",
        }
    }
}

#[derive(Clone, Debug)]
pub struct RentRecord {
    pub id: i32,
    pub property_id: i32,
    pub year: i32,
    pub month: Month,
    pub received: bool,
    pub expected_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    pub payment_mode: Option<String>,
    /// Overrides the property's current rent for this month when present.
    pub rent_amount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RentRecord {
    pub fn status(&self) -> PaymentStatus {
        if self.received {
            PaymentStatus::Received
        } else {
            PaymentStatus::Pending
        }
    }

    /// Only reported for received payments with both dates, and only when
    /// the payment actually came in after the expected date.
    pub fn days_late(&self) -> Option<i64> {
        if !self.received {
            return None;
        }
        let (expected, received) = (self.expected_date?, self.received_date?);
        let days = (received - expected).num_days();
        (days > 0).then_some(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("valid decimal literal")
    }

    fn record(
        received: bool,
        expected: Option<&str>,
        received_on: Option<&str>,
    ) -> RentRecord {
        let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        RentRecord {
            id: 1,
            property_id: 1,
            year: 2024,
            month: Month::from_zero_based(3).unwrap(),
            received,
            expected_date: expected.map(parse),
            received_date: received_on.map(parse),
            payment_mode: None,
            rent_amount: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_month_conversions() {
        let april = Month::from_zero_based(3).unwrap();
        assert_eq!(april.number(), 4);
        assert_eq!(april.zero_based(), 3);
        assert_eq!(april.name(), "April");
        assert_eq!(Month::new(12).unwrap().name(), "December");
        assert_eq!(Month::from_zero_based(0).unwrap().name(), "January");
    }

    #[test]
    fn test_month_rejects_out_of_range() {
        assert!(Month::new(0).is_none());
        assert!(Month::new(13).is_none());
        assert!(Month::from_zero_based(12).is_none());
        assert!(Month::from_zero_based(-1).is_none());
    }

    #[test]
    fn test_percent_wins_over_amount() {
        let rule = EscalationRule::from_parts(Some(dec("5")), Some(dec("50")));
        assert_eq!(rule, EscalationRule::Percent(dec("5")));
        assert_eq!(rule.percent(), Some(dec("5")));
        assert_eq!(rule.amount(), None);
    }

    #[test]
    fn test_zero_rule_is_no_rule() {
        assert_eq!(
            EscalationRule::from_parts(Some(dec("0")), None),
            EscalationRule::None
        );
        assert_eq!(
            EscalationRule::from_parts(Some(dec("0")), Some(dec("25"))),
            EscalationRule::Fixed(dec("25"))
        );
        assert_eq!(EscalationRule::from_parts(None, None), EscalationRule::None);
    }

    #[test]
    fn test_days_late() {
        let r = record(true, Some("2024-04-01"), Some("2024-04-05"));
        assert_eq!(r.days_late(), Some(4));
        assert_eq!(r.status(), PaymentStatus::Received);
    }

    #[test]
    fn test_days_late_blank_cases() {
        // early and on-time payments are not late
        assert_eq!(
            record(true, Some("2024-04-05"), Some("2024-04-01")).days_late(),
            None
        );
        assert_eq!(
            record(true, Some("2024-04-01"), Some("2024-04-01")).days_late(),
            None
        );
        // pending records never report lateness, even with dates set
        let pending = record(false, Some("2024-04-01"), Some("2024-04-05"));
        assert_eq!(pending.days_late(), None);
        assert_eq!(pending.status(), PaymentStatus::Pending);
        assert_eq!(record(true, None, Some("2024-04-05")).days_late(), None);
        assert_eq!(record(true, Some("2024-04-01"), None).days_late(), None);
    }
}
