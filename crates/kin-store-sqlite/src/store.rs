//! [`SqliteLedger`] — the SQLite implementation of [`Ledger`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use kin_core::{
  ledger::{Ledger, Upsert},
  person::Person,
  relation::{Edge, RelationKind, Relations},
};

use crate::{
  Error, Result,
  encode::{
    RawEdgeRow, RawPersonRow, boxed, encode_date, encode_dt,
    encode_occupations,
  },
  schema::SCHEMA,
};

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// A relation ledger backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteLedger {
  conn: tokio_rusqlite::Connection,
}

impl SqliteLedger {
  /// Open (or create) a ledger at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let ledger = Self { conn };
    ledger.init_schema().await?;
    Ok(ledger)
  }

  /// Open an in-memory ledger — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let ledger = Self { conn };
    ledger.init_schema().await?;
    Ok(ledger)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Query a list of people with `id` bound as `?1` (plus optional extra
  /// params), in edge insertion order.
  async fn people_query(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Vec<Person>> {
    let raws: Vec<RawPersonRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(params.iter()),
            RawPersonRow::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPersonRow::into_person).collect()
  }
}

// ─── Ledger impl ─────────────────────────────────────────────────────────────

impl Ledger for SqliteLedger {
  type Error = Error;

  async fn upsert_person(&self, mut person: Person) -> Result<Upsert> {
    person.last_updated = Utc::now();

    // Read-merge-write runs inside one serialized connection call, so the
    // existence check cannot race another upsert of the same id.
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing: Option<RawPersonRow> = tx
          .query_row(
            &format!(
              "SELECT {} FROM people p WHERE p.person_id = ?1",
              RawPersonRow::COLUMNS
            ),
            rusqlite::params![person.id],
            RawPersonRow::from_row,
          )
          .optional()?;

        let (merged, outcome) = match existing {
          Some(raw) => {
            let mut current = raw.into_person().map_err(boxed)?;
            current.merge_from(person);
            (current, Upsert::Updated)
          }
          None => (person, Upsert::Created),
        };

        let occupations =
          encode_occupations(&merged.occupations).map_err(boxed)?;

        tx.execute(
          "INSERT OR REPLACE INTO people (
             person_id, name, birth_date, death_date, bio,
             gender, image_url, birth_place, occupations, last_updated
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            merged.id,
            merged.name,
            merged.birth_date.map(encode_date),
            merged.death_date.map(encode_date),
            merged.bio,
            merged.gender.as_str(),
            merged.image_url,
            merged.birth_place,
            occupations,
            encode_dt(merged.last_updated),
          ],
        )?;

        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    Ok(outcome)
  }

  async fn add_edge(
    &self,
    source: &str,
    target: &str,
    kind: RelationKind,
  ) -> Result<bool> {
    let source = source.to_owned();
    let target = target.to_owned();

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Symmetric kinds deduplicate across both orientations.
        let dup_sql = if kind.is_symmetric() {
          "SELECT 1 FROM edges
           WHERE kind = ?3
             AND ((source_id = ?1 AND target_id = ?2)
               OR (source_id = ?2 AND target_id = ?1))"
        } else {
          "SELECT 1 FROM edges
           WHERE kind = ?3 AND source_id = ?1 AND target_id = ?2"
        };

        let exists: bool = tx
          .query_row(
            dup_sql,
            rusqlite::params![source, target, kind.as_str()],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if exists {
          return Ok(false);
        }

        // Stub endpoints so the foreign keys hold and the edge is never
        // dropped for a not-yet-fetched person.
        for id in [&source, &target] {
          let stub = Person::stub(id.as_str());
          tx.execute(
            "INSERT INTO people (person_id, name, gender, occupations, last_updated)
             VALUES (?1, ?2, ?3, '[]', ?4)
             ON CONFLICT(person_id) DO NOTHING",
            rusqlite::params![
              stub.id,
              stub.name,
              stub.gender.as_str(),
              encode_dt(stub.last_updated),
            ],
          )?;
        }

        tx.execute(
          "INSERT INTO edges (source_id, target_id, kind) VALUES (?1, ?2, ?3)",
          rusqlite::params![source, target, kind.as_str()],
        )?;

        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(inserted)
  }

  async fn get_person(&self, id: &str) -> Result<Option<Person>> {
    let id = id.to_owned();

    let raw: Option<RawPersonRow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM people p WHERE p.person_id = ?1",
                RawPersonRow::COLUMNS
              ),
              rusqlite::params![id],
              RawPersonRow::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPersonRow::into_person).transpose()
  }

  async fn relations_for(&self, id: &str) -> Result<Relations> {
    let parents = self
      .people_query(
        format!(
          "SELECT {} FROM edges e
           JOIN people p ON p.person_id = e.source_id
           WHERE e.kind = 'parent' AND e.target_id = ?1
           ORDER BY e.edge_id",
          RawPersonRow::COLUMNS
        ),
        vec![id.to_owned()],
      )
      .await?;

    let children = self
      .people_query(
        format!(
          "SELECT {} FROM edges e
           JOIN people p ON p.person_id = e.target_id
           WHERE e.kind = 'parent' AND e.source_id = ?1
           ORDER BY e.edge_id",
          RawPersonRow::COLUMNS
        ),
        vec![id.to_owned()],
      )
      .await?;

    // One stored row per symmetric relation; join against whichever
    // endpoint is not `id`.
    let symmetric_sql = format!(
      "SELECT {} FROM edges e
       JOIN people p ON p.person_id =
         CASE WHEN e.source_id = ?1 THEN e.target_id ELSE e.source_id END
       WHERE e.kind = ?2 AND (e.source_id = ?1 OR e.target_id = ?1)
       ORDER BY e.edge_id",
      RawPersonRow::COLUMNS
    );

    let spouses = self
      .people_query(
        symmetric_sql.clone(),
        vec![id.to_owned(), RelationKind::Spouse.as_str().to_owned()],
      )
      .await?;
    let siblings = self
      .people_query(
        symmetric_sql,
        vec![id.to_owned(), RelationKind::Sibling.as_str().to_owned()],
      )
      .await?;

    Ok(Relations { parents, children, spouses, siblings })
  }

  async fn edges_touching(&self, id: &str) -> Result<Vec<Edge>> {
    let id = id.to_owned();

    let raws: Vec<RawEdgeRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT source_id, target_id, kind FROM edges
           WHERE source_id = ?1 OR target_id = ?1
           ORDER BY edge_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id], |row| {
            Ok(RawEdgeRow {
              source_id: row.get(0)?,
              target_id: row.get(1)?,
              kind:      row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEdgeRow::into_edge).collect()
  }
}
