//! Order lifecycle
//!
//! Loads the order, asks [`decide`] what the action does, then writes the
//! result in one transaction guarded by the row version:
//!
//! 1. `UPDATE ... WHERE version = ?` (first statement, takes the write lock)
//! 2. stock restore when the order is cancelled
//! 3. audit row when the status moved
//!
//! A lost race surfaces as a version conflict, never as a silent overwrite.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{OrderDetail, Role};
use shared::order::{Actor, OrderAction, OrderError, OrderState, decide};
use shared::util::now_millis;
use sqlx::SqlitePool;

use crate::db::repository::order::{self, StatusChange};
use crate::db::repository::{RepoError, profile};

/// Apply `action` by `actor` to an order.
///
/// The actor's role is re-read from its profile, so a token issued before a
/// role change cannot act with the old role. With `expected_version` the
/// call fails unless the order is still at that version. Returns the order
/// as it is after the change.
pub async fn apply(
    pool: &SqlitePool,
    order_id: i64,
    actor: Actor,
    action: OrderAction,
    expected_version: Option<i64>,
    note: Option<&str>,
) -> AppResult<OrderDetail> {
    let actor = stored_actor(pool, actor).await?;
    let current = order::find_by_id(pool, order_id)
        .await?
        .ok_or(OrderError::NotFound(order_id))?;

    if let Some(expected) = expected_version
        && expected != current.version
    {
        return Err(OrderError::VersionConflict {
            expected,
            actual: current.version,
        }
        .into());
    }

    if let OrderAction::AssignRider(Some(rider_id)) = action {
        let rider = profile::find_by_id(pool, rider_id).await?.ok_or_else(|| {
            AppError::new(ErrorCode::RiderNotFound).with_detail("rider_id", rider_id)
        })?;
        if rider.role != Role::Rider {
            return Err(AppError::new(ErrorCode::NotARider).with_detail("profile_id", rider_id));
        }
    }

    let state = OrderState {
        status: current.status,
        rider_id: current.rider_id,
        payment_method: current.payment_method,
        payment_status: current.payment_status,
    };
    let transition = decide(&state, &actor, action).inspect_err(|e| {
        tracing::info!(order_id, actor_id = actor.id, action = action.name(), error = %e, "Order action rejected");
    })?;

    let note = note.map(str::trim).filter(|n| !n.is_empty());
    let now = now_millis();
    let mut tx = pool.begin().await.map_err(RepoError::from)?;

    let Some(updated) =
        order::apply_transition(&mut tx, order_id, current.version, &transition, now).await?
    else {
        tx.rollback().await.map_err(RepoError::from)?;
        let actual = order::current_version(pool, order_id).await?;
        return Err(OrderError::VersionConflict {
            expected: current.version,
            actual,
        }
        .into());
    };

    if transition.restore_stock {
        order::restore_stock(&mut tx, order_id, now).await?;
    }

    if transition.status_changed() {
        order::insert_history(
            &mut tx,
            order_id,
            StatusChange {
                from: Some(transition.from),
                to: transition.to,
                actor_id: Some(actor.id),
                actor_role: Some(actor.role),
                note,
            },
            now,
        )
        .await?;
    }

    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(
        order_id,
        action = action.name(),
        from = %transition.from,
        to = %transition.to,
        rider_id = ?updated.rider_id,
        actor_id = actor.id,
        actor_role = %actor.role,
        version = updated.version,
        "Order updated"
    );

    order::find_detail(pool, order_id)
        .await?
        .ok_or_else(|| AppError::order_not_found(order_id))
}

async fn stored_actor(pool: &SqlitePool, actor: Actor) -> AppResult<Actor> {
    let stored = profile::find_by_id(pool, actor.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PermissionDenied).with_detail("actor_id", actor.id))?;
    Ok(Actor {
        id: stored.id,
        role: stored.role,
    })
}
