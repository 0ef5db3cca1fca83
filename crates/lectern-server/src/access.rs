//! Content access evaluation.
//!
//! Decides whether a user may stream a given lecture. Free-preview lectures
//! are short-circuited by the caller before this evaluator runs; everything
//! else resolves the owning course and checks for a free course or a
//! qualifying purchase.
//!
//! The evaluator fails closed: any lookup failure resolves to "no access"
//! rather than surfacing an error to the request path.

use std::sync::Arc;
use std::time::Duration;

use lectern_core::{Result, UserId};
use lectern_db::models::Lecture;
use lectern_db::pool::{self, DbPool};
use lectern_db::queries::{courses, orders};

use crate::kv::KvStore;

/// Entitlement evaluator with a read-through enrollment cache.
///
/// The cache memoizes the (user, course) entitlement verdict for a short
/// TTL so repeated stream requests during one session do not re-run the
/// purchase lookup every time. It is a cache, not a source of truth: each
/// expiry re-runs the query, so a revoked entitlement is reflected within
/// one TTL.
#[derive(Clone)]
pub struct ContentAccess {
    db: DbPool,
    cache: Arc<dyn KvStore>,
    cache_ttl: Duration,
}

impl ContentAccess {
    pub fn new(db: DbPool, cache: Arc<dyn KvStore>, cache_ttl: Duration) -> Self {
        Self {
            db,
            cache,
            cache_ttl,
        }
    }

    /// Is `user_id` entitled to stream `lecture`?
    ///
    /// Never errors: lookup failures are logged and denied.
    pub fn can_access_lecture(&self, user_id: UserId, lecture: &Lecture) -> bool {
        match self.check_entitlement(user_id, lecture) {
            Ok(allowed) => allowed,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    lecture_id = %lecture.id,
                    error = %e,
                    "Entitlement lookup failed; denying access"
                );
                false
            }
        }
    }

    fn check_entitlement(&self, user_id: UserId, lecture: &Lecture) -> Result<bool> {
        let conn = pool::get_conn(&self.db)?;

        // A lecture whose ownership chain is broken is not accessible.
        let Some(course) = courses::course_for_chapter(&conn, lecture.chapter_id)? else {
            return Ok(false);
        };

        if course.is_free() {
            return Ok(true);
        }

        let key = format!("enrollment:{user_id}:{}", course.id);
        match self.cache.get(&key).as_deref() {
            Some("1") => return Ok(true),
            Some("0") => return Ok(false),
            _ => {}
        }

        let entitled = orders::has_valid_entitlement(&conn, user_id, course.id)?;
        self.cache.put(
            &key,
            if entitled { "1" } else { "0" }.to_string(),
            self.cache_ttl,
        );
        Ok(entitled)
    }
}
