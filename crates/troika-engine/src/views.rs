use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use troika_core::ids::{TaskId, UserId};
use troika_core::page::{paginate, Page};
use troika_core::settings::DEFAULT_PAGE_SIZE;
use troika_core::task::{Category, Task};
use troika_store::{CategoryCounts, Database, TaskRepo};

use crate::display::DisplayTracker;
use crate::error::EngineError;
use crate::select::{select, SelectionConfig};

/// The NOW view: a bounded selection plus tier counts for the header.
#[derive(Clone, Debug, Serialize)]
pub struct NowView {
    pub tasks: Vec<Task>,
    pub counts: CategoryCounts,
}

/// A paginated tier view (soon, someday).
#[derive(Clone, Debug, Serialize)]
pub struct TierView {
    pub category: Category,
    pub page: Page<Task>,
    pub counts: CategoryCounts,
}

/// Per-request orchestration: fetch the pool, consult the display tracker,
/// run selection, persist shown-stats, record the new display.
pub struct ViewEngine {
    tasks: TaskRepo,
    display: Arc<DisplayTracker>,
    config: SelectionConfig,
    page_size: usize,
}

impl ViewEngine {
    pub fn new(db: Database, display: Arc<DisplayTracker>) -> Self {
        Self {
            tasks: TaskRepo::new(db),
            display,
            config: SelectionConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_config(mut self, config: SelectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the NOW view for one user.
    ///
    /// With `reshuffle`, the previous display is excluded so the user sees
    /// different tasks (when alternatives exist). Without it — the initial
    /// view — a pool within the limit is shown in creation order, and a
    /// larger pool goes through selection against an empty previous set.
    ///
    /// Each returned task has its shown-stats bumped exactly once, and the
    /// whole selection replaces the user's display record.
    pub fn now_view(
        &self,
        user: &UserId,
        limit: usize,
        reshuffle: bool,
    ) -> Result<NowView, EngineError> {
        let pool = self
            .tasks
            .active_by_category(user, Category::Now, None, None)?;
        let counts = self.tasks.counts(user)?;

        let chosen = if reshuffle || pool.len() > limit {
            let previous: HashSet<TaskId> = if reshuffle {
                self.display.get(user).into_iter().collect()
            } else {
                HashSet::new()
            };
            // Fresh source per invocation keeps concurrent selections
            // uncorrelated.
            let mut rng = rand::thread_rng();
            select(&pool, limit, &previous, Utc::now(), &self.config, &mut rng)
        } else {
            pool
        };

        debug!(user_id = %user, selected = chosen.len(), reshuffle, "now view built");

        for task in &chosen {
            let _ = self.tasks.record_shown(&task.id)?;
        }
        self.display
            .set(user, chosen.iter().map(|t| t.id.clone()).collect());

        Ok(NowView {
            tasks: chosen,
            counts,
        })
    }

    /// A windowed view of one non-urgent tier, creation order ascending.
    pub fn tier_view(
        &self,
        user: &UserId,
        category: Category,
        page: usize,
    ) -> Result<TierView, EngineError> {
        let items = self.tasks.active_by_category(user, category, None, None)?;
        let counts = self.tasks.counts(user)?;
        Ok(TierView {
            category,
            page: paginate(&items, page, self.page_size),
            counts,
        })
    }

    /// A windowed view of the completed list, newest completion first.
    ///
    /// A page index past the end yields an empty window; the offset math is
    /// done in u64 so an oversized index can never wrap into the list.
    pub fn completed_view(&self, user: &UserId, page: usize) -> Result<Page<Task>, EngineError> {
        let total = self.tasks.count_completed(user)?;
        let start = (page as u64).saturating_mul(self.page_size as u64);
        let window = if start >= u64::from(total) {
            Vec::new()
        } else {
            // start < total <= u32::MAX, so the cast is exact.
            self.tasks
                .completed(user, self.page_size as u32, start as u32)?
        };
        Ok(Page::from_window(window, page, self.page_size, total as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use troika_store::UserRepo;

    struct Fixture {
        views: ViewEngine,
        tasks: TaskRepo,
        display: Arc<DisplayTracker>,
        user: UserId,
    }

    fn fixture() -> Fixture {
        let db = Database::in_memory().unwrap();
        let user = UserRepo::new(db.clone()).get_or_create("tester").unwrap();
        let display = Arc::new(DisplayTracker::new());
        Fixture {
            views: ViewEngine::new(db.clone(), Arc::clone(&display)),
            tasks: TaskRepo::new(db),
            display,
            user: user.id,
        }
    }

    fn seed_now_tasks(fx: &Fixture, n: usize) -> Vec<TaskId> {
        (0..n)
            .map(|i| {
                fx.tasks
                    .create(&fx.user, &format!("task {i}"), Category::Now)
                    .unwrap()
                    .id
            })
            .collect()
    }

    #[test]
    fn small_pool_initial_view_keeps_creation_order() {
        let fx = fixture();
        let ids = seed_now_tasks(&fx, 2);

        let view = fx.views.now_view(&fx.user, 3, false).unwrap();
        assert_eq!(
            view.tasks.iter().map(|t| t.id.clone()).collect::<Vec<_>>(),
            ids
        );
        assert_eq!(view.counts.now, 2);
    }

    #[test]
    fn now_view_respects_limit() {
        let fx = fixture();
        seed_now_tasks(&fx, 6);

        let view = fx.views.now_view(&fx.user, 3, false).unwrap();
        assert_eq!(view.tasks.len(), 3);
    }

    #[test]
    fn now_view_records_shown_stats_once_each() {
        let fx = fixture();
        seed_now_tasks(&fx, 2);

        let view = fx.views.now_view(&fx.user, 3, false).unwrap();
        for task in &view.tasks {
            let stored = fx.tasks.get(&task.id).unwrap();
            assert_eq!(stored.shown_count, 1);
            assert!(stored.last_shown_at.is_some());
        }
    }

    #[test]
    fn now_view_overwrites_display_record() {
        let fx = fixture();
        seed_now_tasks(&fx, 4);

        let view = fx.views.now_view(&fx.user, 2, false).unwrap();
        let recorded = fx.display.get(&fx.user);
        assert_eq!(
            recorded,
            view.tasks.iter().map(|t| t.id.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn reshuffle_avoids_previous_display_when_possible() {
        let fx = fixture();
        seed_now_tasks(&fx, 6);

        let first = fx.views.now_view(&fx.user, 3, false).unwrap();
        let first_ids: HashSet<TaskId> = first.tasks.iter().map(|t| t.id.clone()).collect();

        let second = fx.views.now_view(&fx.user, 3, true).unwrap();
        for task in &second.tasks {
            assert!(
                !first_ids.contains(&task.id),
                "repeat shown while alternatives existed"
            );
        }
    }

    #[test]
    fn reshuffle_with_pool_equal_to_quota_still_returns_all() {
        let fx = fixture();
        let ids = seed_now_tasks(&fx, 3);

        fx.views.now_view(&fx.user, 3, false).unwrap();
        let view = fx.views.now_view(&fx.user, 3, true).unwrap();
        assert_eq!(
            view.tasks.iter().map(|t| t.id.clone()).collect::<HashSet<_>>(),
            ids.into_iter().collect::<HashSet<_>>()
        );
    }

    #[test]
    fn completed_tasks_never_enter_the_pool() {
        let fx = fixture();
        let ids = seed_now_tasks(&fx, 3);
        let _ = fx.tasks.mark_completed(&ids[0]).unwrap();

        let view = fx.views.now_view(&fx.user, 5, false).unwrap();
        assert_eq!(view.tasks.len(), 2);
        assert!(view.tasks.iter().all(|t| t.id != ids[0]));
    }

    #[test]
    fn tier_view_pages_in_creation_order() {
        let fx = fixture();
        for i in 0..7 {
            fx.tasks
                .create(&fx.user, &format!("someday {i}"), Category::Someday)
                .unwrap();
        }

        let view = fx.views.tier_view(&fx.user, Category::Someday, 1).unwrap();
        assert_eq!(view.page.items.len(), 2);
        assert_eq!(view.page.items[0].content, "someday 5");
        assert_eq!(view.page.total_pages, 2);
        assert!(view.page.has_prev);
        assert!(!view.page.has_next);
        assert_eq!(view.counts.someday, 7);
    }

    #[test]
    fn tier_view_does_not_touch_shown_stats() {
        let fx = fixture();
        let task = fx
            .tasks
            .create(&fx.user, "someday", Category::Someday)
            .unwrap();

        let _ = fx.views.tier_view(&fx.user, Category::Someday, 0).unwrap();
        assert_eq!(fx.tasks.get(&task.id).unwrap().shown_count, 0);
    }

    #[test]
    fn completed_view_pages_newest_first() {
        let fx = fixture();
        let ids = seed_now_tasks(&fx, 3);
        for id in &ids {
            let _ = fx.tasks.mark_completed(id).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }

        let page = fx.views.completed_view(&fx.user, 0).unwrap();
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.items[0].id, ids[2]);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn completed_view_page_past_end_is_empty() {
        let fx = fixture();
        let ids = seed_now_tasks(&fx, 6);
        for id in &ids {
            let _ = fx.tasks.mark_completed(id).unwrap();
        }

        // An index whose raw offset would wrap a 32-bit multiply must not
        // land back inside the list.
        let page = fx.views.completed_view(&fx.user, 858_993_460).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 2);
        assert!(page.has_prev);
        assert!(!page.has_next);

        let page = fx.views.completed_view(&fx.user, usize::MAX).unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_next);
    }

    #[test]
    fn users_have_independent_display_records() {
        let db = Database::in_memory().unwrap();
        let users = UserRepo::new(db.clone());
        let alice = users.get_or_create("alice").unwrap().id;
        let bob = users.get_or_create("bob").unwrap().id;
        let display = Arc::new(DisplayTracker::new());
        let views = ViewEngine::new(db.clone(), Arc::clone(&display));
        let tasks = TaskRepo::new(db);

        for i in 0..3 {
            tasks
                .create(&alice, &format!("alice {i}"), Category::Now)
                .unwrap();
        }
        let _ = views.now_view(&alice, 2, false).unwrap();

        assert!(!display.get(&alice).is_empty());
        assert!(display.get(&bob).is_empty());
    }
}
