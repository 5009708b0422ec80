use crate::{ledger::models::RecordWithProperty, models::Property};
use rust_decimal::{prelude::ToPrimitive, Decimal};

/// Columns never get wider than this, however long the content.
pub const MAX_COLUMN_WIDTH: usize = 50;
/// Breathing room added to the longest cell in a column.
const WIDTH_PADDING: usize = 2;

#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Int(i64),
    Blank,
}

impl Cell {
    fn money(d: Decimal) -> Self {
        Self::Number(d.to_f64().unwrap_or_default())
    }
    fn text_or_blank(s: Option<&str>) -> Self {
        match s {
            Some(s) if !s.is_empty() => Self::Text(s.to_string()),
            _ => Self::Blank,
        }
    }
    /// Length of the cell as it reads in the sheet, used for column sizing.
    /// Money always counts a decimal part, so `1210.0` is six wide.
    pub fn display_len(&self) -> usize {
        match self {
            Self::Text(s) => s.chars().count(),
            Self::Number(n) => format!("{n:?}").len(),
            Self::Int(i) => i.to_string().len(),
            Self::Blank => 0,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

#[derive(Clone, Debug)]
pub struct Sheet {
    pub name: &'static str,
    pub headers: &'static [&'static str],
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// One width per column: the longest cell (header included) plus
    /// padding, capped at [`MAX_COLUMN_WIDTH`].
    pub fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                let longest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(Cell::display_len)
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0);
                (longest + WIDTH_PADDING).min(MAX_COLUMN_WIDTH)
            })
            .collect()
    }
}

const PROPERTY_HEADERS: &[&str] = &[
    "Property ID",
    "Property Name",
    "Address",
    "Renter Name",
    "Renter Contact",
    "Initial Rent",
    "Current Rent",
    "Lease Start Date",
    "Expected Rent Day",
    "Yearly Increase %",
    "Yearly Increase Amount",
    "Created Date",
];

const RECORD_HEADERS: &[&str] = &[
    "Property Name",
    "Renter Name",
    "Year",
    "Month",
    "Month Name",
    "Rent Amount",
    "Expected Date",
    "Received Date",
    "Payment Mode",
    "Status",
    "Days Late",
    "Created Date",
];

pub fn properties_sheet(properties: &[Property]) -> Sheet {
    let rows = properties
        .iter()
        .map(|p| {
            vec![
                Cell::Int(p.id.into()),
                p.name.as_str().into(),
                p.address.as_str().into(),
                p.renter_name.as_str().into(),
                Cell::text_or_blank(p.renter_contact.as_deref()),
                Cell::money(p.initial_rent),
                Cell::money(p.current_rent),
                Cell::Text(p.lease_start_date.to_string()),
                Cell::Int(p.expected_rent_day.into()),
                p.escalation.percent().map_or(Cell::Blank, Cell::money),
                p.escalation.amount().map_or(Cell::Blank, Cell::money),
                Cell::Text(p.created_at.to_rfc3339()),
            ]
        })
        .collect();

    Sheet {
        name: "Properties",
        headers: PROPERTY_HEADERS,
        rows,
    }
}

pub fn records_sheet(records: &[RecordWithProperty]) -> Sheet {
    let rows = records
        .iter()
        .map(|joined| {
            let r = &joined.record;
            vec![
                joined.property_name.as_str().into(),
                joined.renter_name.as_str().into(),
                Cell::Int(r.year.into()),
                Cell::Int(r.month.number().into()),
                r.month.name().into(),
                Cell::money(joined.effective_rent()),
                r.expected_date.map_or(Cell::Blank, |d| Cell::Text(d.to_string())),
                r.received_date.map_or(Cell::Blank, |d| Cell::Text(d.to_string())),
                Cell::text_or_blank(r.payment_mode.as_deref()),
                r.status().label().into(),
                r.days_late().map_or(Cell::Blank, Cell::Int),
                Cell::Text(r.created_at.to_rfc3339()),
            ]
        })
        .collect();

    Sheet {
        name: "Rent Records",
        headers: RECORD_HEADERS,
        rows,
    }
}
