//! End-to-end statement construction scenarios over a small music-catalog
//! schema (artists, albums, tracks, genres, playlists).

use crate::dialect::PlaceholderStyle;
use crate::expr::Expr;
use crate::insert::InsertBuilder;
use crate::relation::{Join, JoinCondition, Table};
use crate::select::{Nulls, QueryBuilder};
use crate::value::Literal;

fn artist() -> Table {
    Table::new("artist", ["ArtistId", "Name"]).unwrap()
}

fn album() -> Table {
    Table::new("album", ["AlbumId", "Title", "ArtistId"]).unwrap()
}

fn track() -> Table {
    Table::new(
        "track",
        ["TrackId", "Name", "AlbumId", "GenreId", "Composer", "Milliseconds"],
    )
    .unwrap()
}

fn genre() -> Table {
    Table::new("genre", ["GenreId", "Name"]).unwrap()
}

fn playlist() -> Table {
    Table::new("playlist", ["PlaylistId", "Name"]).unwrap()
}

#[test]
fn tracks_by_genre_with_named_param() {
    let tbl = track();
    let mut stmt = QueryBuilder::new(PlaceholderStyle::Qmark)
        .select(tbl.column("Name").unwrap())
        .where_(
            tbl.column("GenreId")
                .unwrap()
                .eq(Expr::param("genre_id", 1i64)),
        )
        .get()
        .unwrap();

    assert_eq!(
        stmt.sql(),
        "SELECT\n\ttrack.Name AS Name\nFROM\n\ttrack\nWHERE (track.GenreId) = (?)"
    );
    assert_eq!(stmt.values(), vec![Literal::Integer(1)]);

    stmt.set_param("genre_id", 4i64).unwrap();
    assert_eq!(stmt.values(), vec![Literal::Integer(4)]);
    assert_eq!(
        stmt.sql(),
        "SELECT\n\ttrack.Name AS Name\nFROM\n\ttrack\nWHERE (track.GenreId) = (?)"
    );
}

#[test]
fn join_using_selects_shared_column_once() {
    let join = Join::inner(album(), track(), JoinCondition::using(["AlbumId"])).unwrap();

    let stmt = QueryBuilder::new(PlaceholderStyle::Qmark)
        .select_many(join.left().columns())
        .select(join.right().column("Name").unwrap().alias("TrackName"))
        .get()
        .unwrap();

    assert_eq!(
        stmt.sql(),
        "SELECT\n\talbum.AlbumId AS AlbumId,\n\talbum.Title AS Title,\n\talbum.ArtistId AS ArtistId,\n\ttrack.Name AS TrackName\nFROM\n\talbum INNER JOIN track USING (AlbumId)"
    );
    assert_eq!(
        stmt.shape().names(),
        ["AlbumId", "Title", "ArtistId", "TrackName"]
    );
}

#[test]
fn join_on_predicate_in_from_clause() {
    let a = album();
    let t = track();
    let on = a
        .column("AlbumId")
        .unwrap()
        .eq(t.column("AlbumId").unwrap());
    let join = Join::inner(a, t, JoinCondition::on(on)).unwrap();

    let stmt = QueryBuilder::new(PlaceholderStyle::Qmark)
        .select(join.left().column("Title").unwrap())
        .select(
            join.right()
                .column("AlbumId")
                .unwrap()
                .alias("TrackAlbumId"),
        )
        .get()
        .unwrap();

    assert_eq!(
        stmt.sql(),
        "SELECT\n\talbum.Title AS Title,\n\ttrack.AlbumId AS TrackAlbumId\nFROM\n\talbum INNER JOIN track ON ((album.AlbumId) = (track.AlbumId))"
    );
}

#[test]
fn nested_joins_addressed_by_relation_name() {
    let inner = Join::inner(album(), track(), JoinCondition::using(["AlbumId"])).unwrap();
    let outer = Join::inner(artist(), inner, JoinCondition::using(["ArtistId"])).unwrap();

    let stmt = QueryBuilder::new(PlaceholderStyle::Qmark)
        .select(
            outer
                .relation("artist")
                .unwrap()
                .column("ArtistId")
                .unwrap(),
        )
        .select(
            outer
                .relation("album")
                .unwrap()
                .column("ArtistId")
                .unwrap()
                .alias("AlbumArtistId"),
        )
        .select(
            outer
                .relation("track")
                .unwrap()
                .column("Name")
                .unwrap()
                .alias("TrackName"),
        )
        .get()
        .unwrap();

    assert_eq!(
        stmt.sql(),
        "SELECT\n\tartist.ArtistId AS ArtistId,\n\talbum.ArtistId AS AlbumArtistId,\n\ttrack.Name AS TrackName\nFROM\n\tartist INNER JOIN (album INNER JOIN track USING (AlbumId)) USING (ArtistId)"
    );
}

#[test]
fn self_join_through_aliases() {
    let t = track();
    let left = t.alias("t1");
    let right = t.alias("t2");
    let on = left
        .column("AlbumId")
        .unwrap()
        .eq(right.column("AlbumId").unwrap());
    let join = Join::inner(left.clone(), right.clone(), JoinCondition::on(on)).unwrap();

    let stmt = QueryBuilder::new(PlaceholderStyle::Qmark)
        .select(join.relation("t1").unwrap().column("Name").unwrap().alias("A"))
        .select(join.relation("t2").unwrap().column("Name").unwrap().alias("B"))
        .where_(
            join.relation("t1")
                .unwrap()
                .column("TrackId")
                .unwrap()
                .ne(join.relation("t2").unwrap().column("TrackId").unwrap()),
        )
        .get()
        .unwrap();

    assert_eq!(
        stmt.sql(),
        "SELECT\n\tt1.Name AS A,\n\tt2.Name AS B\nFROM\n\ttrack AS t1 INNER JOIN track AS t2 ON ((t1.AlbumId) = (t2.AlbumId))\nWHERE (t1.TrackId) <> (t2.TrackId)"
    );
}

#[test]
fn aggregate_style_group_and_order() {
    let t = track();
    let stmt = QueryBuilder::new(PlaceholderStyle::Qmark)
        .select(t.column("AlbumId").unwrap())
        .select(
            (t.column("Milliseconds").unwrap() / 1000i64).alias("Seconds"),
        )
        .group_by(t.column("AlbumId").unwrap())
        .having(t.column("AlbumId").unwrap().gt(10i64))
        .order_by(t.column("AlbumId").unwrap(), false, None)
        .get()
        .unwrap();

    assert_eq!(
        stmt.sql(),
        "SELECT\n\ttrack.AlbumId AS AlbumId,\n\t(track.Milliseconds) / (?) AS Seconds\nFROM\n\ttrack\nGROUP BY\n\ttrack.AlbumId\nHAVING (track.AlbumId) > (?)\nORDER BY track.AlbumId DESC"
    );
    assert_eq!(
        stmt.values(),
        vec![Literal::Integer(1000), Literal::Integer(10)]
    );
}

#[test]
fn count_per_album_with_having() {
    let t = track();
    let stmt = QueryBuilder::new(PlaceholderStyle::Qmark)
        .select(t.column("AlbumId").unwrap())
        .select(Expr::count(t.column("TrackId").unwrap()).alias("n"))
        .group_by(t.column("AlbumId").unwrap())
        .having(Expr::count(t.column("TrackId").unwrap()).gt(5i64))
        .get()
        .unwrap();

    assert_eq!(
        stmt.sql(),
        "SELECT\n\ttrack.AlbumId AS AlbumId,\n\tCOUNT(track.TrackId) AS n\nFROM\n\ttrack\nGROUP BY\n\ttrack.AlbumId\nHAVING (COUNT(track.TrackId)) > (?)"
    );
    assert_eq!(stmt.values(), vec![Literal::Integer(5)]);
    assert_eq!(stmt.shape().names(), ["AlbumId", "n"]);
}

#[test]
fn order_by_composer_nulls_last() {
    let t = track();
    let stmt = QueryBuilder::new(PlaceholderStyle::Qmark)
        .select(t.column("Name").unwrap())
        .order_by(
            t.column("Composer").unwrap(),
            true,
            Some(Nulls::parse("last").unwrap()),
        )
        .get()
        .unwrap();
    assert!(
        stmt.sql()
            .ends_with("\nORDER BY track.Composer ASC NULLS LAST")
    );
}

#[test]
fn in_subquery_carries_inner_params() {
    let g = genre();
    let t = track();

    let rock_ids = QueryBuilder::new(PlaceholderStyle::Qmark)
        .select(g.column("GenreId").unwrap())
        .where_(g.column("Name").unwrap().like("Rock%"))
        .get()
        .unwrap();

    let stmt = QueryBuilder::new(PlaceholderStyle::Qmark)
        .select(t.column("Name").unwrap())
        .where_(t.column("GenreId").unwrap().in_query(rock_ids))
        .where_(t.column("Milliseconds").unwrap().lt(400_000i64))
        .get()
        .unwrap();

    // Subquery marker comes before the outer condition's marker.
    assert_eq!(
        stmt.values(),
        vec![
            Literal::Text("Rock%".into()),
            Literal::Integer(400_000),
        ]
    );
    assert_eq!(stmt.sql().matches('?').count(), 2);
    assert!(stmt.sql().contains("(track.GenreId) IN (SELECT"));
}

#[test]
fn insert_from_select_pipeline() {
    let g = genre();
    let query = QueryBuilder::new(PlaceholderStyle::Qmark)
        .select(g.column("Name").unwrap())
        .where_(g.column("GenreId").unwrap().gt(2i64))
        .get()
        .unwrap();

    let stmt = InsertBuilder::new(PlaceholderStyle::Qmark, playlist())
        .add_columns(["Name"])
        .unwrap()
        .get()
        .unwrap()
        .from_select(&query)
        .unwrap();

    assert_eq!(
        stmt.sql(),
        "INSERT INTO playlist (Name)\nSELECT\n\tgenre.Name AS Name\nFROM\n\tgenre\nWHERE (genre.GenreId) > (?)"
    );
    assert_eq!(stmt.values(), vec![Literal::Integer(2)]);
}

#[test]
fn select_from_a_finished_query() {
    let t = track();
    let inner = QueryBuilder::new(PlaceholderStyle::Qmark)
        .select(t.column("Name").unwrap())
        .select(t.column("AlbumId").unwrap())
        .where_(t.column("Milliseconds").unwrap().lt(Expr::param("cutoff", 250_000i64)))
        .get()
        .unwrap();
    let q = inner.subquery("q");

    let stmt = QueryBuilder::new(PlaceholderStyle::Qmark)
        .select_all(q.clone())
        .get()
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "SELECT\n\tq.Name AS Name,\n\tq.AlbumId AS AlbumId\nFROM\n\t(SELECT\n\ttrack.Name AS Name,\n\ttrack.AlbumId AS AlbumId\nFROM\n\ttrack\nWHERE (track.Milliseconds) < (?)) AS q"
    );
    assert_eq!(stmt.shape().names(), ["Name", "AlbumId"]);

    // The inner statement's named parameter survives into the outer one.
    let mut stmt = QueryBuilder::new(PlaceholderStyle::Qmark)
        .select(q.column("Name").unwrap())
        .get()
        .unwrap();
    stmt.set_param("cutoff", 100_000i64).unwrap();
    assert_eq!(stmt.values(), vec![Literal::Integer(100_000)]);
}

#[test]
fn named_params_rebind_on_dml_statements() {
    let t = track();
    let mut upd = crate::update(PlaceholderStyle::Qmark, t.clone())
        .set("Composer", Expr::param("composer", "Unknown"))
        .unwrap()
        .where_(t.column("TrackId").unwrap().eq(Expr::param("track_id", 1i64)))
        .get()
        .unwrap();
    upd.set_param("composer", "Traditional").unwrap();
    upd.set_param("track_id", 9i64).unwrap();
    assert_eq!(
        upd.values(),
        vec![Literal::Text("Traditional".into()), Literal::Integer(9)]
    );

    let mut del = crate::delete(PlaceholderStyle::Qmark, t.clone())
        .where_(t.column("GenreId").unwrap().eq(Expr::param("genre_id", 1i64)))
        .get()
        .unwrap();
    del.set_param("genre_id", 3i64).unwrap();
    assert_eq!(del.values(), vec![Literal::Integer(3)]);
}

#[test]
fn statement_clones_rebind_independently() {
    let t = track();
    let base = QueryBuilder::new(PlaceholderStyle::Qmark)
        .select(t.column("Name").unwrap())
        .where_(
            t.column("GenreId")
                .unwrap()
                .eq(Expr::param("genre_id", 1i64)),
        )
        .get()
        .unwrap();

    let mut for_jazz = base.clone();
    for_jazz.set_param("genre_id", 2i64).unwrap();

    assert_eq!(base.values(), vec![Literal::Integer(1)]);
    assert_eq!(for_jazz.values(), vec![Literal::Integer(2)]);
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use crate::delete::DeleteBuilder;
    use crate::update::UpdateBuilder;
    use rusqlite::Connection;

    fn catalog() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE genre (GenreId INTEGER PRIMARY KEY, Name TEXT);
             CREATE TABLE track (
                 TrackId INTEGER PRIMARY KEY,
                 Name TEXT,
                 AlbumId INTEGER,
                 GenreId INTEGER,
                 Composer TEXT,
                 Milliseconds INTEGER
             );
             INSERT INTO genre VALUES (1, 'Rock'), (2, 'Jazz'), (3, 'Metal');
             INSERT INTO track VALUES
                 (1, 'First', 1, 1, 'A', 100000),
                 (2, 'Second', 1, 2, NULL, 200000),
                 (3, 'Third', 2, 1, 'B', 300000);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn select_executes_and_rebinds() {
        let conn = catalog();
        let t = track();
        let mut stmt = QueryBuilder::new(PlaceholderStyle::Qmark)
            .select(t.column("Name").unwrap())
            .where_(
                t.column("GenreId")
                    .unwrap()
                    .eq(Expr::param("genre_id", 1i64)),
            )
            .order_by(t.column("TrackId").unwrap(), true, None)
            .get()
            .unwrap();

        let names = |stmt: &crate::Statement, conn: &Connection| -> Vec<String> {
            let mut prepared = conn.prepare(stmt.sql()).unwrap();
            prepared
                .query_map(rusqlite::params_from_iter(stmt.values()), |row| row.get(0))
                .unwrap()
                .collect::<Result<_, _>>()
                .unwrap()
        };

        assert_eq!(names(&stmt, &conn), ["First", "Third"]);

        stmt.set_param("genre_id", 2i64).unwrap();
        assert_eq!(names(&stmt, &conn), ["Second"]);
    }

    #[test]
    fn dml_round_trip() {
        let conn = catalog();
        let g = genre();

        let ins = InsertBuilder::new(PlaceholderStyle::Qmark, g.clone())
            .add_columns(["GenreId", "Name"])
            .unwrap()
            .get()
            .unwrap();
        let row = ins
            .row_statement(vec![Literal::Integer(4), Literal::Text("Blues".into())])
            .unwrap();
        conn.execute(row.sql(), rusqlite::params_from_iter(row.values()))
            .unwrap();

        let upd = UpdateBuilder::new(PlaceholderStyle::Qmark, g.clone())
            .set("Name", "Delta Blues")
            .unwrap()
            .where_(g.column("GenreId").unwrap().eq(4i64))
            .get()
            .unwrap();
        conn.execute(upd.sql(), rusqlite::params_from_iter(upd.values()))
            .unwrap();

        let name: String = conn
            .query_row("SELECT Name FROM genre WHERE GenreId = 4", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(name, "Delta Blues");

        let del = DeleteBuilder::new(PlaceholderStyle::Qmark, g.clone())
            .where_(g.column("GenreId").unwrap().eq(4i64))
            .get()
            .unwrap();
        let deleted = conn
            .execute(del.sql(), rusqlite::params_from_iter(del.values()))
            .unwrap();
        assert_eq!(deleted, 1);
    }

    #[test]
    fn subquery_source_executes() {
        let conn = catalog();
        let t = track();
        let inner = QueryBuilder::new(PlaceholderStyle::Qmark)
            .select(t.column("Name").unwrap())
            .where_(t.column("Milliseconds").unwrap().lt(250_000i64))
            .get()
            .unwrap();
        let q = inner.subquery("q");

        let stmt = QueryBuilder::new(PlaceholderStyle::Qmark)
            .select(Expr::count_all().alias("n"))
            .from_(q)
            .get()
            .unwrap();

        let count: i64 = conn
            .query_row(stmt.sql(), rusqlite::params_from_iter(stmt.values()), |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn join_using_executes() {
        let conn = catalog();
        let join = Join::inner(genre(), track(), JoinCondition::using(["GenreId"])).unwrap();
        let stmt = QueryBuilder::new(PlaceholderStyle::Qmark)
            .select(join.left().column("Name").unwrap().alias("Genre"))
            .select(join.right().column("Name").unwrap().alias("Track"))
            .where_(join.left().column("Name").unwrap().eq("Jazz"))
            .get()
            .unwrap();

        let pair: (String, String) = conn
            .query_row(stmt.sql(), rusqlite::params_from_iter(stmt.values()), |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(pair, ("Jazz".to_string(), "Second".to_string()));
    }
}
