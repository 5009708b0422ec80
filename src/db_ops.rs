use super::models::{self, EscalationRule, PropertyFields};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{query, query_as, FromRow, PgConnection};

/// Generic persistence for the models. Every method takes a bare
/// connection, so callers decide whether the work happens inside a
/// transaction (`&mut tx`) or on a pooled connection (`&mut conn`).
#[async_trait]
pub trait DbModel<GetQuery, ListQuery>: Sized {
    /// `Ok(None)` means the row does not exist; `Err` is reserved for
    /// actual database failures.
    async fn get(db: &mut PgConnection, query: &GetQuery)
        -> Result<Option<Self>>;
    async fn list(db: &mut PgConnection, query: &ListQuery)
        -> Result<Vec<Self>>;
    /// Write the model and return it as stored, with any database-assigned
    /// values (ids, timestamps) filled in.
    async fn save(self, db: &mut PgConnection) -> Result<Self>;
    async fn delete(self, db: &mut PgConnection) -> Result<()>;
}

pub struct GetPropertyQuery {
    pub id: i32,
}

pub struct ListPropertyQuery;

#[derive(FromRow)]
pub(crate) struct PropertyRow {
    id: i32,
    name: String,
    address: String,
    renter_name: String,
    renter_contact: Option<String>,
    initial_rent: Decimal,
    current_rent: Decimal,
    lease_start_date: NaiveDate,
    expected_rent_day: i32,
    yearly_increase_percent: Option<Decimal>,
    yearly_increase_amount: Option<Decimal>,
    created_at: DateTime<Utc>,
}

impl From<PropertyRow> for models::Property {
    fn from(row: PropertyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            renter_name: row.renter_name,
            renter_contact: row.renter_contact,
            initial_rent: row.initial_rent,
            current_rent: row.current_rent,
            lease_start_date: row.lease_start_date,
            expected_rent_day: row.expected_rent_day,
            escalation: EscalationRule::from_parts(
                row.yearly_increase_percent,
                row.yearly_increase_amount,
            ),
            created_at: row.created_at,
        }
    }
}

const PROPERTY_COLUMNS: &str = "id, name, address, renter_name, \
    renter_contact, initial_rent, current_rent, lease_start_date, \
    expected_rent_day, yearly_increase_percent, yearly_increase_amount, \
    created_at";

#[async_trait]
impl DbModel<GetPropertyQuery, ListPropertyQuery> for models::Property {
    async fn get(
        db: &mut PgConnection,
        query: &GetPropertyQuery,
    ) -> Result<Option<Self>> {
        let row = query_as::<_, PropertyRow>(&format!(
            "select {PROPERTY_COLUMNS} from property where id = $1"
        ))
        .bind(query.id)
        .fetch_optional(&mut *db)
        .await?;

        Ok(row.map(Self::from))
    }
    async fn list(
        db: &mut PgConnection,
        _query: &ListPropertyQuery,
    ) -> Result<Vec<Self>> {
        let rows = query_as::<_, PropertyRow>(&format!(
            "select {PROPERTY_COLUMNS} from property order by id"
        ))
        .fetch_all(&mut *db)
        .await?;

        Ok(rows.into_iter().map(Self::from).collect())
    }
    /// Full replace of the mutable fields. `current_rent` is written as-is;
    /// callers re-derive it with `calculator::persist_derived_rent`.
    async fn save(self, db: &mut PgConnection) -> Result<Self> {
        let row = query_as::<_, PropertyRow>(&format!(
            "update property
            set
                name = $1,
                address = $2,
                renter_name = $3,
                renter_contact = $4,
                initial_rent = $5,
                current_rent = $6,
                lease_start_date = $7,
                expected_rent_day = $8,
                yearly_increase_percent = $9,
                yearly_increase_amount = $10
            where id = $11
            returning {PROPERTY_COLUMNS}"
        ))
        .bind(&self.name)
        .bind(&self.address)
        .bind(&self.renter_name)
        .bind(&self.renter_contact)
        .bind(self.initial_rent)
        .bind(self.current_rent)
        .bind(self.lease_start_date)
        .bind(self.expected_rent_day)
        .bind(self.escalation.percent())
        .bind(self.escalation.amount())
        .bind(self.id)
        .fetch_one(&mut *db)
        .await?;

        Ok(row.into())
    }
    async fn delete(self, db: &mut PgConnection) -> Result<()> {
        // rent_record rows go with it via `on delete cascade`
        query("delete from property where id = $1")
            .bind(self.id)
            .execute(&mut *db)
            .await?;

        Ok(())
    }
}

/// Insert a new property. Its current rent starts out equal to the
/// initial rent.
pub async fn create_property(
    db: &mut PgConnection,
    fields: PropertyFields,
) -> Result<models::Property> {
    let row = query_as::<_, PropertyRow>(&format!(
        "insert into property (
            name,
            address,
            renter_name,
            renter_contact,
            initial_rent,
            current_rent,
            lease_start_date,
            expected_rent_day,
            yearly_increase_percent,
            yearly_increase_amount
        ) values ($1, $2, $3, $4, $5, $5, $6, $7, $8, $9)
        returning {PROPERTY_COLUMNS}"
    ))
    .bind(&fields.name)
    .bind(&fields.address)
    .bind(&fields.renter_name)
    .bind(&fields.renter_contact)
    .bind(fields.initial_rent)
    .bind(fields.lease_start_date)
    .bind(fields.expected_rent_day)
    .bind(fields.escalation.percent())
    .bind(fields.escalation.amount())
    .fetch_one(&mut *db)
    .await?;

    Ok(row.into())
}
