//! Spreadsheet export of the whole store. [`sheet`] projects properties
//! and rent records into plain rows; [`xlsx`] turns those rows into the
//! downloadable workbook.

pub mod sheet;
pub mod xlsx;

use chrono::NaiveDateTime;

pub const XLSX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub fn filename(at: NaiveDateTime) -> String {
    format!("property_rent_data_{}.xlsx", at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_filename() {
        let at = NaiveDate::from_ymd_opt(2024, 4, 5)
            .unwrap()
            .and_hms_opt(9, 3, 7)
            .unwrap();
        assert_eq!(filename(at), "property_rent_data_20240405_090307.xlsx");
    }
}
