use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Notify;

use treehole_core::cache::{load_cached, save_cached, CacheManager};
use treehole_core::store::{DivisionSource, HoleSource, DIVISIONS_SNAPSHOT};
use treehole_core::{Division, DivisionId, Hole, StoreEvent, Tag, TagFilter, TreeHole};

/// Simulates the forum backend: holes strictly older than the offset,
/// newest first, `size` at most. Division listing waits for `release`.
struct FakeForum {
    divisions: Vec<Division>,
    holes: Mutex<Vec<Hole>>,
    release: Notify,
    gated: bool,
}

impl FakeForum {
    fn new(divisions: Vec<Division>, holes: Vec<Hole>) -> Self {
        Self {
            divisions,
            holes: Mutex::new(holes),
            release: Notify::new(),
            gated: false,
        }
    }

    fn gated(mut self) -> Self {
        self.gated = true;
        self
    }

    fn bump(&self, id: i64, time_updated: DateTime<Utc>) {
        let mut holes = self.holes.lock().unwrap();
        if let Some(hole) = holes.iter_mut().find(|h| h.id == id) {
            hole.time_updated = time_updated;
        }
    }
}

#[async_trait]
impl DivisionSource for FakeForum {
    async fn list_divisions(&self) -> Result<Vec<Division>> {
        if self.gated {
            self.release.notified().await;
        }
        Ok(self.divisions.clone())
    }
}

#[async_trait]
impl HoleSource for FakeForum {
    async fn list_holes(
        &self,
        division_id: DivisionId,
        before: DateTime<Utc>,
        size: usize,
        tag: Option<&TagFilter>,
    ) -> Result<Vec<Hole>> {
        let holes = self.holes.lock().unwrap();
        let mut page: Vec<Hole> = holes
            .iter()
            .filter(|h| h.division_id == division_id && h.time_updated < before)
            .filter(|h| tag.map_or(true, |t| h.has_tag(t.query_value())))
            .cloned()
            .collect();
        page.sort_by(|a, b| b.time_updated.cmp(&a.time_updated));
        page.truncate(size);
        // The backend makes no ordering promise
        page.reverse();
        Ok(page)
    }
}

fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap() + Duration::minutes(minutes)
}

fn hole(id: i64, division_id: DivisionId, minutes: i64) -> Hole {
    Hole::new(id, division_id, at(minutes))
}

fn tagged(id: i64, minutes: i64, name: &str) -> Hole {
    let mut h = hole(id, 1, minutes);
    h.tags.push(Tag { id: id * 10, name: name.to_string(), temperature: 0 });
    h
}

fn assert_timeline_invariants(holes: &[Hole]) {
    let ids: HashSet<i64> = holes.iter().map(|h| h.id).collect();
    assert_eq!(ids.len(), holes.len(), "duplicate hole ids");
    assert!(
        holes.windows(2).all(|w| w[0].time_updated >= w[1].time_updated),
        "holes not newest first"
    );
}

#[tokio::test]
async fn pages_through_a_division_until_exhausted() {
    let holes = (1..=23).map(|i| hole(i, 1, i * 3)).collect();
    let forum = Arc::new(FakeForum::new(vec![Division::new(1, "树洞")], holes));
    let app = TreeHole::new(forum, Arc::new(treehole_core::MemorySnapshots::new()));

    let mut pages = 0;
    while app.holes.sync_page(1, 10, None).await.unwrap() {
        pages += 1;
        assert_timeline_invariants(&app.holes.holes(1).await.unwrap());
    }

    assert_eq!(pages, 3);
    assert_eq!(app.holes.len(1).await, 23);

    // Exhaustion is stable
    assert!(!app.holes.sync_page(1, 10, None).await.unwrap());
    assert_eq!(app.holes.len(1).await, 23);
}

#[tokio::test]
async fn bumped_hole_is_not_duplicated() {
    let holes = (1..=6).map(|i| hole(i, 1, i * 10)).collect();
    let forum = Arc::new(FakeForum::new(Vec::new(), holes));
    let app = TreeHole::new(forum.clone(), Arc::new(treehole_core::MemorySnapshots::new()));

    // First page: 6, 5, 4
    assert!(app.holes.sync_page(1, 3, None).await.unwrap());

    // Hole 5 receives a reply but the server still reports it below the cursor
    forum.bump(5, at(35));
    assert!(app.holes.sync_page(1, 3, None).await.unwrap());

    let holes = app.holes.holes(1).await.unwrap();
    assert_timeline_invariants(&holes);
    assert_eq!(holes.iter().filter(|h| h.id == 5).count(), 1);
    assert_eq!(holes.iter().find(|h| h.id == 5).unwrap().time_updated, at(35));
}

#[tokio::test]
async fn tag_filter_limits_the_timeline() {
    let holes = vec![
        tagged(1, 10, "Study"),
        tagged(2, 20, "Life"),
        tagged(3, 30, "Study"),
    ];
    let forum = Arc::new(FakeForum::new(Vec::new(), holes));
    let app = TreeHole::new(forum, Arc::new(treehole_core::MemorySnapshots::new()));

    let study = TagFilter::from("Study");
    assert!(app.holes.sync_page(1, 10, Some(&study)).await.unwrap());
    assert!(!app.holes.sync_page(1, 10, Some(&study)).await.unwrap());

    let ids: Vec<i64> = app.holes.holes(1).await.unwrap().iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![3, 1]);
}

#[tokio::test]
async fn current_holes_tracks_selected_division() {
    let holes = vec![hole(1, 1, 10), hole(2, 2, 20), hole(3, 2, 30)];
    let forum = Arc::new(FakeForum::new(
        vec![Division::new(1, "A"), Division::new(2, "B"), Division::new(3, "C")],
        holes,
    ));
    let app = TreeHole::new(forum, Arc::new(treehole_core::MemorySnapshots::new()));
    app.divisions.refresh().await.unwrap();

    assert!(app.current_holes().await.is_empty());

    app.select_division(Some(2));
    assert!(app.current_holes().await.is_empty());
    app.holes.sync_page(2, 10, None).await.unwrap();

    let ids: Vec<i64> = app.current_holes().await.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![3, 2]);
    assert_eq!(app.current_division().await.map(|d| d.name), Some("B".to_string()));

    app.select_division(Some(3));
    assert!(app.current_holes().await.is_empty());

    app.select_division(None);
    assert!(app.current_holes().await.is_empty());
    assert_eq!(app.current_division().await, None);
}

#[tokio::test]
async fn refresh_shows_snapshot_then_server_list() {
    let dir = tempfile::tempdir().unwrap();
    let snapshots = Arc::new(CacheManager::new(dir.path().to_path_buf()).unwrap());
    let stale = vec![Division::new(1, "Old name")];
    save_cached(snapshots.as_ref(), DIVISIONS_SNAPSHOT, &stale).unwrap();

    let fresh = vec![Division::new(1, "New name"), Division::new(2, "Added")];
    let forum = Arc::new(FakeForum::new(fresh.clone(), Vec::new()).gated());
    let app = Arc::new(TreeHole::new(forum.clone(), snapshots.clone()));
    let mut events = app.subscribe();

    let refreshing = {
        let app = Arc::clone(&app);
        tokio::spawn(async move { app.divisions.refresh().await })
    };

    // Phase one: the snapshot is visible while the fetch is pending
    assert_eq!(events.recv().await.unwrap(), StoreEvent::DivisionsChanged);
    assert_eq!(app.divisions.divisions().await, stale);

    forum.release.notify_one();
    refreshing.await.unwrap().unwrap();

    // Phase two: the server list replaces it and is persisted
    assert_eq!(events.recv().await.unwrap(), StoreEvent::DivisionsChanged);
    assert_eq!(app.divisions.divisions().await, fresh);
    let persisted = load_cached::<Vec<Division>>(snapshots.as_ref(), DIVISIONS_SNAPSHOT)
        .unwrap()
        .unwrap();
    assert_eq!(persisted.data, fresh);
}

#[tokio::test]
async fn hole_events_follow_completed_merges() {
    let forum = Arc::new(FakeForum::new(Vec::new(), vec![hole(1, 4, 10)]));
    let app = TreeHole::new(forum, Arc::new(treehole_core::MemorySnapshots::new()));
    let mut events = app.subscribe();

    assert!(app.holes.sync_page(4, 10, None).await.unwrap());
    assert!(!app.holes.sync_page(4, 10, None).await.unwrap());

    assert_eq!(events.try_recv().unwrap(), StoreEvent::HolesChanged(4));
    assert!(events.try_recv().is_err());
}
