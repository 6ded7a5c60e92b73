//! Fixtures shared by the repository tests.

use sqlx::SqlitePool;

use freight_terminal_domain::changeset::{Change, ChangeSet};
use freight_terminal_domain::company::Company;
use freight_terminal_domain::device::Device;
use freight_terminal_domain::freight::Freight;
use freight_terminal_domain::id::{RobotId, TransferId};
use freight_terminal_domain::robot::Robot;
use freight_terminal_domain::rule::Rule;
use freight_terminal_domain::service::{Service, ServiceType};
use freight_terminal_domain::transfer::Transfer;

use freight_terminal_app::ports::{
    CompanyRepository, DeviceRepository, RobotRepository, RuleRepository, UnitOfWork,
};

use crate::pool::Config;
use crate::{
    SqliteCompanyRepository, SqliteDeviceRepository, SqliteRobotRepository, SqliteRuleRepository,
    SqliteUnitOfWork,
};

pub(crate) async fn database() -> SqlitePool {
    Config::new("sqlite::memory:")
        .build()
        .await
        .unwrap()
        .pool()
        .clone()
}

pub(crate) async fn seed_company(pool: &SqlitePool) -> Company {
    let company = Company::builder().name("Acme").build().unwrap();
    SqliteCompanyRepository::new(pool.clone())
        .create(company)
        .await
        .unwrap()
}

pub(crate) async fn seed_robot(pool: &SqlitePool) -> Robot {
    let company = seed_company(pool).await;
    let robot = Robot::builder()
        .company_id(company.id)
        .model("R2")
        .build()
        .unwrap();
    SqliteRobotRepository::new(pool.clone())
        .create(robot)
        .await
        .unwrap()
}

pub(crate) async fn seed_service(pool: &SqlitePool, robot_id: RobotId, kind: ServiceType) -> Service {
    let service = Service::builder().robot_id(robot_id).kind(kind).build();
    commit(pool, Change::CreateService(service.clone())).await;
    service
}

pub(crate) async fn seed_transfer(pool: &SqlitePool) -> Transfer {
    let robot = seed_robot(pool).await;
    let delivery = seed_service(pool, robot.id, ServiceType::Delivery).await;
    let reception = seed_service(pool, robot.id, ServiceType::Reception).await;
    let transfer = Transfer::pair(&delivery, &reception).unwrap();
    commit(pool, Change::CreateTransfer(transfer)).await;
    transfer
}

pub(crate) async fn seed_freight(pool: &SqlitePool, transfer_id: Option<TransferId>) -> Freight {
    let mut builder = Freight::builder().name("Vaccines");
    if let Some(transfer_id) = transfer_id {
        builder = builder.transfer_id(transfer_id);
    }
    let freight = builder.build().unwrap();
    commit(pool, Change::CreateFreight(freight.clone())).await;
    freight
}

/// A cold-chain rule (2..8) on a fresh freight and thermometer.
pub(crate) async fn seed_rule(pool: &SqlitePool) -> Rule {
    let freight = seed_freight(pool, None).await;
    let device = SqliteDeviceRepository::new(pool.clone())
        .create(
            Device::builder()
                .name(format!("thermometer-{}", freight.id))
                .bounds(-40.0, 60.0)
                .build()
                .unwrap(),
        )
        .await
        .unwrap();
    let rule = Rule::builder()
        .freight_id(freight.id)
        .device_id(device.id)
        .coefficient(0.5)
        .bounds(2.0, 8.0)
        .possible_deviation(1.0)
        .build()
        .unwrap();
    SqliteRuleRepository::new(pool.clone())
        .create(rule)
        .await
        .unwrap()
}

async fn commit(pool: &SqlitePool, change: Change) {
    SqliteUnitOfWork::new(pool.clone())
        .commit(ChangeSet::new().with(change))
        .await
        .unwrap();
}
