use super::models::{RecordUpsert, RecordWithProperty};
use crate::models::{Month, RentRecord};
use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{query_as, FromRow, PgConnection};

#[derive(FromRow)]
struct RecordRow {
    id: i32,
    property_id: i32,
    year: i32,
    month: i16,
    received: bool,
    expected_date: Option<NaiveDate>,
    received_date: Option<NaiveDate>,
    payment_mode: Option<String>,
    rent_amount: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RecordRow> for RentRecord {
    type Error = anyhow::Error;

    fn try_from(row: RecordRow) -> Result<Self> {
        let month = u8::try_from(row.month)
            .ok()
            .and_then(Month::new)
            .ok_or_else(|| {
                anyhow!("rent_record {} has invalid month {}", row.id, row.month)
            })?;
        Ok(Self {
            id: row.id,
            property_id: row.property_id,
            year: row.year,
            month,
            received: row.received,
            expected_date: row.expected_date,
            received_date: row.received_date,
            payment_mode: row.payment_mode,
            rent_amount: row.rent_amount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const RECORD_COLUMNS: &str = "r.id, r.property_id, r.year, r.month, \
    r.received, r.expected_date, r.received_date, r.payment_mode, \
    r.rent_amount, r.created_at, r.updated_at";

pub async fn list_records(db: &mut PgConnection) -> Result<Vec<RentRecord>> {
    let rows = query_as::<_, RecordRow>(&format!(
        "select {RECORD_COLUMNS} from rent_record r
        order by r.year, r.month, r.property_id"
    ))
    .fetch_all(&mut *db)
    .await?;

    rows.into_iter().map(RentRecord::try_from).collect()
}

/// Insert the record for `(property_id, year, month)`, or overwrite the
/// existing one. This is a single statement, so two concurrent upserts of
/// the same month cannot both insert.
pub async fn upsert_record(
    db: &mut PgConnection,
    upsert: &RecordUpsert,
) -> Result<RentRecord> {
    let row = query_as::<_, RecordRow>(&format!(
        "insert into rent_record as r (
            property_id,
            year,
            month,
            received,
            expected_date,
            received_date,
            payment_mode,
            rent_amount
        ) values ($1, $2, $3, $4, $5, $6, $7, $8)
        on conflict (property_id, year, month)
        do update set
            received = excluded.received,
            expected_date = excluded.expected_date,
            received_date = excluded.received_date,
            payment_mode = excluded.payment_mode,
            rent_amount = excluded.rent_amount,
            updated_at = now()
        returning {RECORD_COLUMNS}"
    ))
    .bind(upsert.property_id)
    .bind(upsert.year)
    .bind(i16::from(upsert.month.number()))
    .bind(upsert.received)
    .bind(upsert.expected_date)
    .bind(upsert.received_date)
    .bind(&upsert.payment_mode)
    .bind(upsert.rent_amount)
    .fetch_one(&mut *db)
    .await?;

    row.try_into()
}

#[derive(FromRow)]
struct JoinedRow {
    id: i32,
    property_id: i32,
    year: i32,
    month: i16,
    received: bool,
    expected_date: Option<NaiveDate>,
    received_date: Option<NaiveDate>,
    payment_mode: Option<String>,
    rent_amount: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    property_name: String,
    renter_name: String,
    current_rent: Decimal,
}

impl TryFrom<JoinedRow> for RecordWithProperty {
    type Error = anyhow::Error;

    fn try_from(row: JoinedRow) -> Result<Self> {
        let record = RecordRow {
            id: row.id,
            property_id: row.property_id,
            year: row.year,
            month: row.month,
            received: row.received,
            expected_date: row.expected_date,
            received_date: row.received_date,
            payment_mode: row.payment_mode,
            rent_amount: row.rent_amount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        Ok(Self {
            record: record.try_into()?,
            property_name: row.property_name,
            renter_name: row.renter_name,
            current_rent: row.current_rent,
        })
    }
}

/// Every record together with the property fields the export needs.
pub async fn list_records_with_property(
    db: &mut PgConnection,
) -> Result<Vec<RecordWithProperty>> {
    let rows = query_as::<_, JoinedRow>(&format!(
        "select
            {RECORD_COLUMNS},
            p.name as property_name,
            p.renter_name,
            p.current_rent
        from rent_record r
        join property p on p.id = r.property_id
        order by r.year, r.month, p.id"
    ))
    .fetch_all(&mut *db)
    .await?;

    rows.into_iter().map(RecordWithProperty::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db_ops::{create_property, tests::fields},
        models::EscalationRule,
    };
    use sqlx::{query_scalar, PgPool};

    fn upsert(property_id: i32) -> RecordUpsert {
        RecordUpsert {
            property_id,
            year: 2024,
            month: Month::new(4).unwrap(),
            received: false,
            expected_date: NaiveDate::from_ymd_opt(2024, 4, 1),
            received_date: None,
            payment_mode: None,
            rent_amount: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_upsert_twice_keeps_one_record(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let property = create_property(&mut conn, fields(EscalationRule::None))
            .await
            .unwrap();

        let first = upsert_record(&mut conn, &upsert(property.id)).await.unwrap();
        let second = RecordUpsert {
            received: true,
            received_date: NaiveDate::from_ymd_opt(2024, 4, 5),
            payment_mode: Some("Cash".into()),
            rent_amount: Some("1100".parse().unwrap()),
            ..upsert(property.id)
        };
        let saved = upsert_record(&mut conn, &second).await.unwrap();
        assert_eq!(saved.id, first.id);

        let count: i64 = query_scalar(
            "select count(*) from rent_record
            where property_id = $1 and year = 2024 and month = 4",
        )
        .bind(property.id)
        .fetch_one(&mut *conn)
        .await
        .unwrap();
        assert_eq!(count, 1);

        let records = list_records(&mut conn).await.unwrap();
        assert_eq!(records.len(), 1);
        let stored = &records[0];
        assert!(stored.received);
        assert_eq!(stored.received_date, NaiveDate::from_ymd_opt(2024, 4, 5));
        assert_eq!(stored.payment_mode.as_deref(), Some("Cash"));
        assert_eq!(stored.rent_amount, Some("1100".parse().unwrap()));
        assert_eq!(stored.days_late(), Some(4));
        assert!(stored.updated_at >= first.updated_at);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_upsert_clears_omitted_fields(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let property = create_property(&mut conn, fields(EscalationRule::None))
            .await
            .unwrap();
        let full = RecordUpsert {
            payment_mode: Some("Cheque".into()),
            ..upsert(property.id)
        };
        upsert_record(&mut conn, &full).await.unwrap();
        let bare = RecordUpsert {
            expected_date: None,
            ..upsert(property.id)
        };
        let saved = upsert_record(&mut conn, &bare).await.unwrap();

        assert_eq!(saved.expected_date, None);
        assert_eq!(saved.payment_mode, None);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_upsert_unknown_property_fails(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        assert!(upsert_record(&mut conn, &upsert(4242)).await.is_err());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_records_joined_with_property(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let property = create_property(&mut conn, fields(EscalationRule::None))
            .await
            .unwrap();
        upsert_record(&mut conn, &upsert(property.id)).await.unwrap();

        let joined = list_records_with_property(&mut conn).await.unwrap();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].property_name, "Flat 2B");
        assert_eq!(joined[0].effective_rent(), property.current_rent);
        assert_eq!(joined[0].record.month.name(), "April");
    }
}
