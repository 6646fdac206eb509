// Query helpers for the `user` and `spare` tables
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::models::{SpareFields, SparePart, User};

const SPARE_COLUMNS: &str = "id, name, manufacturer, category, unit, description, user_id";

fn spare_from_row(row: &Row<'_>) -> rusqlite::Result<SparePart> {
    Ok(SparePart {
        id: row.get(0)?,
        name: row.get(1)?,
        manufacturer: row.get(2)?,
        category: row.get(3)?,
        unit: row.get(4)?,
        description: row.get(5)?,
        user_id: row.get(6)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        image: row.get(3)?,
        provider: row.get(4)?,
    })
}

// --- Users ---

pub fn find_user_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT id, name, email, image, provider FROM user WHERE email = ?1 ORDER BY id LIMIT 1",
        params![email],
        user_from_row,
    )
    .optional()
}

pub fn create_user(
    conn: &Connection,
    name: &str,
    email: &str,
    image: Option<&str>,
    provider: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO user (name, email, image, provider) VALUES (?1, ?2, ?3, ?4)",
        params![name, email, image, provider],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Id of the user registered under `email`, creating the row on first login.
pub fn find_or_create_user(
    conn: &Connection,
    name: &str,
    email: &str,
    image: Option<&str>,
    provider: &str,
) -> rusqlite::Result<i64> {
    if let Some(user) = find_user_by_email(conn, email)? {
        return Ok(user.id);
    }
    let id = create_user(conn, name, email, image, provider)?;
    tracing::info!("Created user #{} for {}", id, email);
    Ok(id)
}

// --- Spares ---

pub fn list_spares(conn: &Connection) -> rusqlite::Result<Vec<SparePart>> {
    let mut stmt = conn.prepare(&format!("SELECT {SPARE_COLUMNS} FROM spare ORDER BY id"))?;
    let spares = stmt
        .query_map([], spare_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(spares)
}

pub fn list_spares_in_category(
    conn: &Connection,
    category: &str,
) -> rusqlite::Result<Vec<SparePart>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SPARE_COLUMNS} FROM spare WHERE category = ?1 ORDER BY id"
    ))?;
    let spares = stmt
        .query_map(params![category], spare_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(spares)
}

/// Records are addressed by id and category together.
pub fn find_spare(
    conn: &Connection,
    category: &str,
    id: i64,
) -> rusqlite::Result<Option<SparePart>> {
    conn.query_row(
        &format!("SELECT {SPARE_COLUMNS} FROM spare WHERE id = ?1 AND category = ?2"),
        params![id, category],
        spare_from_row,
    )
    .optional()
}

pub fn list_categories(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT category FROM spare ORDER BY category")?;
    let categories = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(categories)
}

pub fn count_spares(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM spare", [], |row| row.get(0))
}

pub fn insert_spare(conn: &Connection, fields: &SpareFields, owner_id: i64) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO spare (name, manufacturer, category, unit, description, user_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            fields.name,
            fields.manufacturer,
            fields.category,
            fields.unit,
            fields.description,
            owner_id
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Overwrite every editable field. The owner never changes.
pub fn update_spare(conn: &Connection, id: i64, fields: &SpareFields) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE spare SET name = ?1, manufacturer = ?2, category = ?3, unit = ?4, description = ?5
         WHERE id = ?6",
        params![
            fields.name,
            fields.manufacturer,
            fields.category,
            fields.unit,
            fields.description,
            id
        ],
    )
}

pub fn delete_spare(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM spare WHERE id = ?1", params![id])
}
