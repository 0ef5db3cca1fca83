//! Order and refund operations backing the entitlement check.

use chrono::Utc;
use rusqlite::Connection;

use lectern_core::{CourseId, Error, OrderId, RefundId, Result, UserId};

use crate::models::{Order, Refund};

/// Create an order in the given status (`pending`, `completed`, ...).
pub fn create_order(
    conn: &Connection,
    user_id: UserId,
    course_id: CourseId,
    status: &str,
) -> Result<Order> {
    create_order_at(conn, user_id, course_id, status, &Utc::now().to_rfc3339())
}

/// Create an order with an explicit creation timestamp.
///
/// The timestamp participates in the refund-supersession rule, so tests and
/// import tooling need control over it.
pub fn create_order_at(
    conn: &Connection,
    user_id: UserId,
    course_id: CourseId,
    status: &str,
    created_at: &str,
) -> Result<Order> {
    let id = OrderId::new();

    conn.execute(
        "INSERT INTO orders (id, user_id, course_id, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            id.to_string(),
            user_id.to_string(),
            course_id.to_string(),
            status,
            created_at,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Order {
        id,
        user_id,
        course_id,
        status: status.to_string(),
        created_at: created_at.to_string(),
    })
}

/// Record a refund against an order.
pub fn create_refund(
    conn: &Connection,
    order_id: OrderId,
    status: &str,
    approved_at: Option<&str>,
) -> Result<Refund> {
    let id = RefundId::new();

    conn.execute(
        "INSERT INTO refunds (id, order_id, status, approved_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![id.to_string(), order_id.to_string(), status, approved_at],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Refund {
        id,
        order_id,
        status: status.to_string(),
        approved_at: approved_at.map(|s| s.to_string()),
    })
}

/// Does `user_id` hold a qualifying entitlement for `course_id`?
///
/// Qualifying means a completed order that has not been superseded by an
/// approved refund postdating the purchase. Refunds that were merely
/// requested, or whose approval predates the order (re-purchase after an
/// earlier refund), do not invalidate it.
pub fn has_valid_entitlement(
    conn: &Connection,
    user_id: UserId,
    course_id: CourseId,
) -> Result<bool> {
    let q = "SELECT COUNT(*) > 0 FROM orders o
             WHERE o.user_id = ?1
               AND o.course_id = ?2
               AND o.status = 'completed'
               AND NOT EXISTS (
                   SELECT 1 FROM refunds r
                   WHERE r.order_id = o.id
                     AND r.status = 'approved'
                     AND r.approved_at > o.created_at
               )";
    conn.query_row(
        q,
        rusqlite::params![user_id.to_string(), course_id.to_string()],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}
