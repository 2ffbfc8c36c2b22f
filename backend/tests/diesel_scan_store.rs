//! Integration tests for `DieselScanStore` against embedded PostgreSQL.
//!
//! These exercise what the unit tests cannot: the daily-limit breach rolling
//! back every write in the transaction, the partial unique index resolving
//! concurrent discovery attempts to exactly one first scan, and the guest
//! comment path re-checking discovery at write time.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use coaster_backend::domain::ports::{
    GuestCommentDraft, MemberScanDraft, ScanStore, ScanStoreError,
};
use coaster_backend::domain::{
    CommentText, UserId, DAILY_SCAN_LIMIT, FIRST_SCAN_POINTS, REPEAT_SCAN_POINTS,
};
use coaster_backend::outbound::persistence::{DbPool, DieselScanStore, PoolConfig};
use postgres::{Client, NoTls};
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use uuid::Uuid;

#[path = "support/pg_embed.rs"]
mod pg_embed;

mod support;

use pg_embed::shared_cluster;
use support::{format_postgres_error, handle_cluster_setup_failure, reset_database};

struct TestContext {
    runtime: Runtime,
    store: DieselScanStore,
    database_url: String,
    user_id: UserId,
    artwork_id: Uuid,
    coaster_id: Uuid,
    venue_id: Uuid,
}

impl TestContext {
    fn client(&self) -> Client {
        Client::connect(&self.database_url, NoTls).expect("connect to test database")
    }
}

fn seed_catalogue(
    url: &str,
    user_id: &UserId,
    artwork_id: Uuid,
    coaster_id: Uuid,
    venue_id: Uuid,
) -> Result<(), String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let user_uuid = *user_id.as_uuid();

    client
        .execute(
            "INSERT INTO users (id, email, password_hash, name) VALUES ($1, $2, $3, $4)",
            &[&user_uuid, &"member@zd.md", &"digest", &"Scan Test Member"],
        )
        .map_err(|err| format_postgres_error(&err))?;
    client
        .execute(
            "INSERT INTO venues (id, name) VALUES ($1, $2)",
            &[&venue_id, &"Scan Test Venue"],
        )
        .map_err(|err| format_postgres_error(&err))?;
    client
        .execute(
            "INSERT INTO artworks (id, title, artist_id) VALUES ($1, $2, $3)",
            &[&artwork_id, &"Scan Test Artwork", &user_uuid],
        )
        .map_err(|err| format_postgres_error(&err))?;
    client
        .execute(
            "INSERT INTO coasters (id, code, artwork_id, venue_id) VALUES ($1, $2, $3, $4)",
            &[&coaster_id, &"A2B3", &artwork_id, &venue_id],
        )
        .map_err(|err| format_postgres_error(&err))?;

    Ok(())
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let db_name = format!("scan_store_{}", Uuid::new_v4().simple());
    let database_url = reset_database(cluster, &db_name)?;

    let user_id = UserId::from_uuid(Uuid::new_v4());
    let artwork_id = Uuid::new_v4();
    let coaster_id = Uuid::new_v4();
    let venue_id = Uuid::new_v4();
    seed_catalogue(&database_url, &user_id, artwork_id, coaster_id, venue_id)?;

    let config = PoolConfig::new(&database_url)
        .with_max_size(4)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        store: DieselScanStore::new(pool),
        database_url,
        user_id,
        artwork_id,
        coaster_id,
        venue_id,
    })
}

#[fixture]
fn store_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn member_draft(context: &TestContext, comment: Option<&str>) -> MemberScanDraft {
    MemberScanDraft {
        user_id: context.user_id,
        coaster_id: context.coaster_id,
        artwork_id: context.artwork_id,
        venue_id: Some(context.venue_id),
        location: None,
        comment: comment.map(|text| CommentText::new(text).expect("valid comment")),
    }
}

fn count(client: &mut Client, sql: &str) -> i64 {
    client.query_one(sql, &[]).expect("count query").get(0)
}

fn member_points(client: &mut Client, user_id: &UserId) -> i32 {
    client
        .query_one("SELECT points FROM users WHERE id = $1", &[user_id.as_uuid()])
        .expect("points query")
        .get(0)
}

#[rstest]
fn first_scan_publishes_the_artwork_and_stores_the_comment(store_context: Option<TestContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: first_scan_publishes_the_artwork_and_stores_the_comment skipped");
        return;
    };

    let store = context.store.clone();
    let draft = member_draft(&context, Some("found it behind the bar"));
    let recorded = context
        .runtime
        .block_on(async { store.record_member_scan(draft).await })
        .expect("record first scan");

    assert!(recorded.is_first_scan);
    assert_eq!(recorded.points_earned, FIRST_SCAN_POINTS);
    assert_eq!(recorded.scan.user_id, Some(context.user_id));

    let mut client = context.client();
    let status: String = client
        .query_one("SELECT status FROM artworks WHERE id = $1", &[&context.artwork_id])
        .expect("artwork status")
        .get(0);
    assert_eq!(status, "APPROVED");

    let comment_row = client
        .query_one("SELECT content, user_id FROM comments", &[])
        .expect("stored comment");
    assert_eq!(comment_row.get::<_, String>(0), "found it behind the bar");
    assert_eq!(comment_row.get::<_, Option<Uuid>>(1), Some(*context.user_id.as_uuid()));

    assert_eq!(member_points(&mut client, &context.user_id), FIRST_SCAN_POINTS);

    let venue_total: i32 = client
        .query_one("SELECT total_scans FROM venues WHERE id = $1", &[&context.venue_id])
        .expect("venue counter")
        .get(0);
    assert_eq!(venue_total, 1);
}

#[rstest]
fn repeat_scan_earns_a_single_point_and_skips_the_comment(store_context: Option<TestContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: repeat_scan_earns_a_single_point_and_skips_the_comment skipped");
        return;
    };

    let store = context.store.clone();
    let first = member_draft(&context, None);
    context
        .runtime
        .block_on(async { store.record_member_scan(first).await })
        .expect("record first scan");

    let repeat = member_draft(&context, Some("me too"));
    let recorded = context
        .runtime
        .block_on(async { store.record_member_scan(repeat).await })
        .expect("record repeat scan");

    assert!(!recorded.is_first_scan);
    assert_eq!(recorded.points_earned, REPEAT_SCAN_POINTS);

    // Comments anchor to first scans only; the repeat's text is dropped.
    let mut client = context.client();
    assert_eq!(count(&mut client, "SELECT count(*) FROM comments"), 0);
    assert_eq!(
        member_points(&mut client, &context.user_id),
        FIRST_SCAN_POINTS + REPEAT_SCAN_POINTS
    );
}

#[rstest]
fn sixth_daily_scan_rolls_back_every_write(store_context: Option<TestContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: sixth_daily_scan_rolls_back_every_write skipped");
        return;
    };

    let store = context.store.clone();
    for _ in 0..DAILY_SCAN_LIMIT {
        let draft = member_draft(&context, None);
        context
            .runtime
            .block_on(async { store.record_member_scan(draft).await })
            .expect("scan within the daily quota");
    }

    let rejected = context
        .runtime
        .block_on(async { store.record_member_scan(member_draft(&context, None)).await })
        .expect_err("sixth scan of the day");
    assert_eq!(
        rejected,
        ScanStoreError::daily_limit_exceeded(DAILY_SCAN_LIMIT)
    );

    // The rollback must leave no trace: no scan row, no counter increment,
    // no points, no venue bump.
    let mut client = context.client();
    assert_eq!(
        count(&mut client, "SELECT count(*) FROM scans"),
        i64::from(DAILY_SCAN_LIMIT)
    );
    let counter: i32 = client
        .query_one("SELECT count FROM daily_scan_counts WHERE user_id = $1", &[context.user_id.as_uuid()])
        .expect("daily counter")
        .get(0);
    assert_eq!(counter, DAILY_SCAN_LIMIT);
    assert_eq!(
        member_points(&mut client, &context.user_id),
        FIRST_SCAN_POINTS + (DAILY_SCAN_LIMIT - 1) * REPEAT_SCAN_POINTS
    );
    let venue_total: i32 = client
        .query_one("SELECT total_scans FROM venues WHERE id = $1", &[&context.venue_id])
        .expect("venue counter")
        .get(0);
    assert_eq!(venue_total, DAILY_SCAN_LIMIT);
}

#[rstest]
fn losing_the_discovery_race_records_a_repeat_scan(store_context: Option<TestContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: losing_the_discovery_race_records_a_repeat_scan skipped");
        return;
    };

    // A competing transaction inserts the winning first scan but holds its
    // commit open. The store's insert then waits on the partial unique
    // index, loses once the competitor commits, and must retry as a repeat.
    let (ready_tx, ready_rx) = mpsc::channel();
    let url = context.database_url.clone();
    let coaster_id = context.coaster_id;
    let competitor = thread::spawn(move || {
        let mut client = Client::connect(&url, NoTls).expect("connect competitor");
        let mut txn = client.transaction().expect("begin competitor transaction");
        txn.execute(
            "INSERT INTO scans (id, user_id, coaster_id, is_first_scan, points_earned) \
             VALUES ($1, NULL, $2, TRUE, 0)",
            &[&Uuid::new_v4(), &coaster_id],
        )
        .expect("insert winning first scan");
        ready_tx.send(()).expect("signal insert in flight");
        thread::sleep(Duration::from_millis(300));
        txn.commit().expect("commit winning first scan");
    });

    ready_rx.recv().expect("competing insert in flight");
    let store = context.store.clone();
    let recorded = context
        .runtime
        .block_on(async { store.record_member_scan(member_draft(&context, None)).await })
        .expect("losing scan lands as a repeat");
    competitor.join().expect("competitor thread");

    assert!(!recorded.is_first_scan);
    assert_eq!(recorded.points_earned, REPEAT_SCAN_POINTS);

    let mut client = context.client();
    assert_eq!(
        count(&mut client, "SELECT count(*) FROM scans WHERE is_first_scan"),
        1
    );
    assert_eq!(count(&mut client, "SELECT count(*) FROM scans"), 2);
    assert_eq!(
        member_points(&mut client, &context.user_id),
        REPEAT_SCAN_POINTS
    );
    // The failed attempt's counter bump rolled back with it.
    let counter: i32 = client
        .query_one("SELECT count FROM daily_scan_counts WHERE user_id = $1", &[context.user_id.as_uuid()])
        .expect("daily counter")
        .get(0);
    assert_eq!(counter, 1);
}

#[rstest]
fn guest_comment_discovers_the_coaster_exactly_once(store_context: Option<TestContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: guest_comment_discovers_the_coaster_exactly_once skipped");
        return;
    };

    let store = context.store.clone();
    let draft = GuestCommentDraft {
        coaster_id: context.coaster_id,
        artwork_id: context.artwork_id,
        venue_id: Some(context.venue_id),
        comment: CommentText::new("what a find").expect("valid comment"),
    };
    let recorded = context
        .runtime
        .block_on(async { store.record_guest_comment(draft.clone()).await })
        .expect("record guest comment");

    assert!(recorded.is_first_scan);
    assert_eq!(recorded.points_earned, 0);
    assert_eq!(recorded.scan.user_id, None);

    let mut client = context.client();
    let comment_row = client
        .query_one("SELECT content, user_id FROM comments", &[])
        .expect("stored guest comment");
    assert_eq!(comment_row.get::<_, String>(0), "what a find");
    assert_eq!(comment_row.get::<_, Option<Uuid>>(1), None);
    let status: String = client
        .query_one("SELECT status FROM artworks WHERE id = $1", &[&context.artwork_id])
        .expect("artwork status")
        .get(0);
    assert_eq!(status, "APPROVED");

    let rejected = context
        .runtime
        .block_on(async { store.record_guest_comment(draft).await })
        .expect_err("second guest comment");
    assert_eq!(rejected, ScanStoreError::already_discovered());

    assert_eq!(count(&mut client, "SELECT count(*) FROM scans"), 1);
    assert_eq!(count(&mut client, "SELECT count(*) FROM comments"), 1);
}
