/*
 * Stringification of fetched MySQL values.
 *
 * The downstream loader consumes text, so every column is rendered to a
 * string right at the cursor. NULLs stay None here; the encoder applies the
 * sentinel.
 */

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo};

use extract_common::{ExtractError, Result};

/// Renders every column of a fetched row to its text form.
pub fn decode_row(row: &MySqlRow) -> Result<Vec<Option<String>>> {
    (0..row.columns().len())
        .map(|index| decode_column(row, index))
        .collect()
}

/// Renders one column, dispatching on the reported MySQL type.
pub fn decode_column(row: &MySqlRow, index: usize) -> Result<Option<String>> {
    let column = &row.columns()[index];
    let type_name = column.type_info().name();

    let value = match type_name {
        "NULL" => None,
        // TINYINT(1) columns surface as BOOLEAN; keep the storage form
        "BOOLEAN" => get(row, index, type_name)?.map(|v: bool| if v { "1" } else { "0" }.into()),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            get(row, index, type_name)?.map(|v: i64| v.to_string())
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" | "YEAR" | "BIT" => {
            get(row, index, type_name)?.map(|v: u64| v.to_string())
        }
        "FLOAT" => get(row, index, type_name)?.map(|v: f32| v.to_string()),
        "DOUBLE" => get(row, index, type_name)?.map(|v: f64| v.to_string()),
        "DECIMAL" => get(row, index, type_name)?.map(|v: Decimal| v.to_string()),
        "DATE" => get(row, index, type_name)?.map(|v: NaiveDate| v.to_string()),
        "TIME" => get(row, index, type_name)?.map(|v: NaiveTime| v.to_string()),
        "DATETIME" => get(row, index, type_name)?
            .map(|v: NaiveDateTime| v.format("%Y-%m-%d %H:%M:%S").to_string()),
        "TIMESTAMP" => get(row, index, type_name)?
            .map(|v: DateTime<Utc>| v.format("%Y-%m-%d %H:%M:%S").to_string()),
        "JSON" => get(row, index, type_name)?.map(|v: serde_json::Value| v.to_string()),
        "CHAR" | "VARCHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET" => {
            get(row, index, type_name)?
        }
        // BINARY/BLOB/GEOMETRY and anything unrecognized: take the raw bytes
        _ => get(row, index, type_name)?.map(|v: Vec<u8>| String::from_utf8_lossy(&v).into_owned()),
    };
    Ok(value)
}

fn get<'r, T>(row: &'r MySqlRow, index: usize, type_name: &str) -> Result<Option<T>>
where
    T: sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>,
{
    row.try_get::<Option<T>, _>(index).map_err(|e| {
        ExtractError::Encoding(format!(
            "column `{}` ({}): {}",
            row.columns()[index].name(),
            type_name,
            e
        ))
    })
}
