//! Model record query functions.

use pocket_types::Model;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::Result;

const COLUMNS: &str = "id, name, description, size, version, active, downloaded";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Model> {
    Ok(Model {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        size: row.get(3)?,
        version: row.get(4)?,
        active: row.get(5)?,
        downloaded: row.get(6)?,
    })
}

/// Insert or overwrite a model record by id.
pub fn upsert(conn: &Connection, model: &Model) -> Result<()> {
    conn.execute(
        &format!("INSERT OR REPLACE INTO models ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
        rusqlite::params![
            model.id,
            model.name,
            model.description,
            model.size,
            model.version,
            model.active,
            model.downloaded,
        ],
    )?;
    Ok(())
}

/// Every model record, ordered by id.
pub fn list(conn: &Connection) -> Result<Vec<Model>> {
    let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM models ORDER BY id"))?;
    let rows = stmt
        .query_map([], from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// The first model flagged active, if any.
pub fn get_active(conn: &Connection) -> Result<Option<Model>> {
    let model = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM models WHERE active = 1 ORDER BY id LIMIT 1"),
            [],
            from_row,
        )
        .optional()?;
    Ok(model)
}

/// Clear the active flag on every model except `id`.
pub fn deactivate_others(conn: &Connection, id: &str) -> Result<()> {
    conn.execute("UPDATE models SET active = 0 WHERE id <> ?1 AND active = 1", [id])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    fn model(id: &str, active: bool) -> Model {
        Model {
            id: id.into(),
            name: format!("Model {id}"),
            description: String::new(),
            size: "560 MB".into(),
            version: "1.0".into(),
            active,
            downloaded: true,
        }
    }

    #[test]
    fn test_upsert_and_list() {
        let conn = test_db();
        upsert(&conn, &model("b", false)).expect("upsert");
        upsert(&conn, &model("a", false)).expect("upsert");

        let models = list(&conn).expect("list");
        assert_eq!(models.len(), 2);
        assert_eq!(models[0], model("a", false));
    }

    #[test]
    fn test_active_model() {
        let conn = test_db();
        assert_eq!(get_active(&conn).expect("none"), None);

        upsert(&conn, &model("a", true)).expect("upsert");
        upsert(&conn, &model("b", true)).expect("upsert");
        deactivate_others(&conn, "b").expect("deactivate");

        assert_eq!(get_active(&conn).expect("get").map(|m| m.id), Some("b".into()));
    }
}
