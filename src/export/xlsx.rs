use super::sheet::{Cell, Sheet};
use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, ColNum, Format, RowNum, Workbook, Worksheet};

const HEADER_FILL: u32 = 0xCCE5FF;

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<()> {
    let header = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_FILL));

    worksheet.set_name(sheet.name)?;
    for (col, title) in sheet.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as ColNum, *title, &header)?;
    }
    for (i, row) in sheet.rows.iter().enumerate() {
        let row_num = (i + 1) as RowNum;
        for (col, cell) in row.iter().enumerate() {
            let col = col as ColNum;
            match cell {
                Cell::Text(s) => {
                    worksheet.write_string(row_num, col, s.as_str())?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(row_num, col, *n)?;
                }
                Cell::Int(n) => {
                    worksheet.write_number(row_num, col, *n as f64)?;
                }
                Cell::Blank => {}
            }
        }
    }
    for (col, width) in sheet.column_widths().into_iter().enumerate() {
        worksheet.set_column_width(col as ColNum, width as f64)?;
    }

    Ok(())
}

/// Render the sheets, in order, into an xlsx document.
pub fn render(sheets: &[Sheet]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    for sheet in sheets {
        write_sheet(workbook.add_worksheet(), sheet)
            .with_context(|| format!("writing sheet {:?}", sheet.name))?;
    }

    Ok(workbook.save_to_buffer()?)
}
