/*
 * SELECT construction for split scans.
 *
 * Every statement projects a synthetic composite key first (the primary key
 * values concatenated with '_'), then the raw primary key columns, then the
 * requested fields. Keyed splits filter on a half-open key range; unkeyed
 * splits page with LIMIT/OFFSET. Both shapes carry an ORDER BY so repeated
 * scans see rows in the same order.
 */

use extract_common::{ExtractError, Result, Split};

/// Alias under which the composite key is projected.
pub const COMPOSITE_KEY_ALIAS: &str = "table_pk";

/// Builds the SELECT statement for one split.
pub fn select_for_split(split: &Split) -> Result<String> {
    if split.primary_keys.is_empty() {
        return Err(ExtractError::Scan(format!(
            "split over `{}` carries no primary keys",
            split.table
        )));
    }

    let mut sql = String::from("SELECT ");
    push_composite_key(&mut sql, &split.primary_keys);
    for key in &split.primary_keys {
        sql.push_str(", ");
        push_identifier(&mut sql, key);
    }
    for field in &split.fields {
        sql.push_str(", ");
        push_identifier(&mut sql, field);
    }

    sql.push_str(" FROM ");
    push_identifier(&mut sql, &split.table);

    match &split.split_key {
        Some(key) => {
            sql.push_str(" WHERE ");
            push_identifier(&mut sql, key);
            sql.push_str(&format!(" >= {} AND ", split.start));
            push_identifier(&mut sql, key);
            sql.push_str(&format!(" < {} ORDER BY ", split.end));
            push_identifier(&mut sql, key);
        }
        None => {
            sql.push_str(" ORDER BY ");
            for (i, key) in split.primary_keys.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                push_identifier(&mut sql, key);
            }
            sql.push_str(&format!(" LIMIT {} OFFSET {}", split.len(), split.start));
        }
    }

    Ok(sql)
}

/// `CONCAT(a, '_', b) AS table_pk`; a single key still goes through CONCAT
/// so the projected value is uniformly textual.
fn push_composite_key(sql: &mut String, keys: &[String]) {
    sql.push_str("CONCAT(");
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            sql.push_str(", '_', ");
        }
        push_identifier(sql, key);
    }
    sql.push_str(") AS ");
    sql.push_str(COMPOSITE_KEY_ALIAS);
}

fn push_identifier(sql: &mut String, name: &str) {
    sql.push('`');
    // A backtick inside a quoted identifier is escaped by doubling it
    for ch in name.chars() {
        sql.push(ch);
        if ch == '`' {
            sql.push('`');
        }
    }
    sql.push('`');
}
