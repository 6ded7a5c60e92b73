//! `SQLite` implementation of [`UnitOfWork`].
//!
//! A change set runs inside one transaction. An update that matches no row
//! aborts the transaction with [`TerminalError::NotFound`], so a concurrent
//! deletion never leaves half of a cascade behind. A freight whose status
//! moved since it was read aborts it with
//! [`StateConflictError::StaleFreight`].

use std::future::Future;

use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnection};
use sqlx::{Sqlite, SqlitePool};

use freight_terminal_app::ports::UnitOfWork;
use freight_terminal_domain::changeset::{Change, ChangeSet};
use freight_terminal_domain::error::{NotFoundError, StateConflictError, TerminalError};
use freight_terminal_domain::freight::{Freight, FreightStatus};

use crate::error::StorageError;
use crate::{freight_repo, robot_repo, rule_repo, service_repo, state_repo, transfer_repo};

/// Applies change sets atomically.
#[derive(Clone)]
pub struct SqliteUnitOfWork {
    pool: SqlitePool,
}

impl SqliteUnitOfWork {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl UnitOfWork for SqliteUnitOfWork {
    fn commit(&self, changes: ChangeSet) -> impl Future<Output = Result<(), TerminalError>> + Send {
        let pool = self.pool.clone();
        async move {
            let count = changes.len();
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            for change in changes {
                apply(&mut tx, change).await?;
            }
            tx.commit().await.map_err(StorageError::from)?;
            tracing::debug!(changes = count, "change set committed");
            Ok(())
        }
    }
}

async fn apply(conn: &mut SqliteConnection, change: Change) -> Result<(), TerminalError> {
    match change {
        Change::CreateService(service) => insert(conn, service_repo::insert(&service)).await,
        Change::SetServiceStatus { id, status } => {
            expect_row(conn, service_repo::set_status(id, status), "Service", id).await
        }
        Change::SetRobotStatus { id, status } => {
            expect_row(conn, robot_repo::set_status(id, status), "Robot", id).await
        }
        Change::CreateTransfer(transfer) => insert(conn, transfer_repo::insert(&transfer)).await,
        Change::CreateFreight(freight) => insert(conn, freight_repo::insert(&freight)).await,
        Change::UpdateFreight { freight, from } => update_freight(conn, &freight, from).await,
        Change::RecordState { state, observation } => {
            expect_row(
                conn,
                rule_repo::fold_observation(state.rule_id, observation),
                "Rule",
                state.rule_id,
            )
            .await?;
            insert(conn, state_repo::insert(&state)).await
        }
        Change::DeleteState(id) => expect_row(conn, state_repo::delete(id), "State", id).await,
        Change::ReplaceRuleStats { rule_id, stats } => {
            expect_row(conn, rule_repo::replace_stats(rule_id, stats), "Rule", rule_id).await
        }
    }
}

async fn update_freight(
    conn: &mut SqliteConnection,
    freight: &Freight,
    from: FreightStatus,
) -> Result<(), TerminalError> {
    let result = freight_repo::update(freight, from)
        .execute(&mut *conn)
        .await
        .map_err(StorageError::from)?;
    if result.rows_affected() > 0 {
        return Ok(());
    }
    if freight_repo::exists(conn, freight.id).await? {
        tracing::debug!(freight_id = %freight.id, expected = %from, "freight changed since it was read");
        return Err(StateConflictError::StaleFreight { expected: from }.into());
    }
    Err(NotFoundError {
        entity: "Freight",
        id: freight.id.to_string(),
    }
    .into())
}

type Statement = Query<'static, Sqlite, SqliteArguments<'static>>;

async fn insert(conn: &mut SqliteConnection, statement: Statement) -> Result<(), TerminalError> {
    statement.execute(conn).await.map_err(StorageError::from)?;
    Ok(())
}

async fn expect_row(
    conn: &mut SqliteConnection,
    statement: Statement,
    entity: &'static str,
    id: impl ToString,
) -> Result<(), TerminalError> {
    let result = statement.execute(conn).await.map_err(StorageError::from)?;
    if result.rows_affected() == 0 {
        return Err(NotFoundError {
            entity,
            id: id.to_string(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{database, seed_freight, seed_rule, seed_transfer};
    use crate::{SqliteFreightRepository, SqliteRuleRepository, SqliteServiceRepository, SqliteStateRepository};
    use freight_terminal_app::ports::{
        FreightRepository, RuleRepository, ServiceRepository, StateRepository,
    };
    use freight_terminal_domain::damage::observe;
    use freight_terminal_domain::id::FreightId;
    use freight_terminal_domain::service::ServiceStatus;
    use freight_terminal_domain::state::State;

    #[tokio::test]
    async fn should_apply_every_change_in_order() {
        let pool = database().await;
        let transfer = seed_transfer(&pool).await;
        let mut freight = seed_freight(&pool, Some(transfer.id)).await;
        freight.status = FreightStatus::Returning;
        let uow = SqliteUnitOfWork::new(pool.clone());

        uow.commit(
            ChangeSet::new()
                .with(Change::UpdateFreight {
                    freight: freight.clone(),
                    from: FreightStatus::Waiting,
                })
                .with(Change::SetServiceStatus {
                    id: transfer.delivery_service_id,
                    status: ServiceStatus::ReturningFreight,
                })
                .with(Change::SetServiceStatus {
                    id: transfer.reception_service_id,
                    status: ServiceStatus::ReturningFreight,
                }),
        )
        .await
        .unwrap();

        let freights = SqliteFreightRepository::new(pool.clone());
        assert_eq!(freights.get_by_id(freight.id).await.unwrap(), Some(freight));
        let services = SqliteServiceRepository::new(pool);
        let delivery = services
            .get_by_id(transfer.delivery_service_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(delivery.status, ServiceStatus::ReturningFreight);
    }

    #[tokio::test]
    async fn should_roll_back_when_a_row_is_missing() {
        let pool = database().await;
        let transfer = seed_transfer(&pool).await;
        let mut ghost = seed_freight(&pool, None).await;
        ghost.id = FreightId::new();
        let uow = SqliteUnitOfWork::new(pool.clone());

        let result = uow
            .commit(
                ChangeSet::new()
                    .with(Change::SetServiceStatus {
                        id: transfer.delivery_service_id,
                        status: ServiceStatus::ReturningFreight,
                    })
                    .with(Change::UpdateFreight {
                        freight: ghost,
                        from: FreightStatus::NotAssigned,
                    }),
            )
            .await;

        assert!(matches!(result, Err(TerminalError::NotFound(_))));
        let delivery = SqliteServiceRepository::new(pool)
            .get_by_id(transfer.delivery_service_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(delivery.status, ServiceStatus::NotStarted);
    }

    #[tokio::test]
    async fn should_keep_damage_flag_when_stale_copy_is_written() {
        let pool = database().await;
        let freight = seed_freight(&pool, None).await;
        let uow = SqliteUnitOfWork::new(pool.clone());
        let mut damaged = freight.clone();
        damaged.mark_damaged();
        uow.commit(ChangeSet::new().with(Change::UpdateFreight {
            freight: damaged,
            from: FreightStatus::NotAssigned,
        }))
        .await
        .unwrap();

        let mut renamed = freight.clone();
        renamed.name = "Insulin".into();
        uow.commit(ChangeSet::new().with(Change::UpdateFreight {
            freight: renamed,
            from: FreightStatus::NotAssigned,
        }))
        .await
        .unwrap();

        let stored = SqliteFreightRepository::new(pool)
            .get_by_id(freight.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, "Insulin");
        assert!(stored.is_damaged);
    }

    #[tokio::test]
    async fn should_roll_back_when_freight_status_moved_since_read() {
        let pool = database().await;
        let transfer = seed_transfer(&pool).await;
        let freight = seed_freight(&pool, Some(transfer.id)).await;
        let uow = SqliteUnitOfWork::new(pool.clone());
        let mut in_transit = freight.clone();
        in_transit.status = FreightStatus::InDeliveryTransit;
        uow.commit(ChangeSet::new().with(Change::UpdateFreight {
            freight: in_transit,
            from: FreightStatus::Waiting,
        }))
        .await
        .unwrap();

        let mut returning = freight.clone();
        returning.status = FreightStatus::Returning;
        let result = uow
            .commit(
                ChangeSet::new()
                    .with(Change::SetServiceStatus {
                        id: transfer.delivery_service_id,
                        status: ServiceStatus::ReturningFreight,
                    })
                    .with(Change::UpdateFreight {
                        freight: returning,
                        from: FreightStatus::Waiting,
                    }),
            )
            .await;

        assert!(matches!(
            result,
            Err(TerminalError::StateConflict(StateConflictError::StaleFreight {
                expected: FreightStatus::Waiting
            }))
        ));
        let stored = SqliteFreightRepository::new(pool.clone())
            .get_by_id(freight.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, FreightStatus::InDeliveryTransit);
        let delivery = SqliteServiceRepository::new(pool)
            .get_by_id(transfer.delivery_service_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(delivery.status, ServiceStatus::NotStarted);
    }

    #[tokio::test]
    async fn should_record_state_with_rule_counters() {
        let pool = database().await;
        let rule = seed_rule(&pool).await;
        let uow = SqliteUnitOfWork::new(pool.clone());
        let state = State::new(rule.id, 9.5);

        uow.commit(ChangeSet::new().with(Change::RecordState {
            state: state.clone(),
            observation: observe(rule.min_value, rule.max_value, state.value),
        }))
        .await
        .unwrap();

        let stored = SqliteRuleRepository::new(pool.clone())
            .get_by_id(rule.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.stats.state_count, 1);
        assert_eq!(stored.stats.out_of_limit_count, 1);
        assert!((stored.stats.max_deviation - 1.5).abs() < 1e-9);
        let states = SqliteStateRepository::new(pool).find_by_rule(rule.id).await.unwrap();
        assert_eq!(states, [state]);
    }

    #[tokio::test]
    async fn should_report_missing_state_on_delete() {
        let pool = database().await;
        let uow = SqliteUnitOfWork::new(pool);

        let result = uow
            .commit(ChangeSet::new().with(Change::DeleteState(
                freight_terminal_domain::id::StateId::new(),
            )))
            .await;

        assert!(matches!(result, Err(TerminalError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_cascade_deletion_from_service_to_freight() {
        let pool = database().await;
        let transfer = seed_transfer(&pool).await;
        let freight = seed_freight(&pool, Some(transfer.id)).await;

        SqliteServiceRepository::new(pool.clone())
            .delete(transfer.reception_service_id)
            .await
            .unwrap();

        let freights = SqliteFreightRepository::new(pool);
        assert!(freights.get_by_id(freight.id).await.unwrap().is_none());
    }
}
