use std::sync::Arc;

use aftersales_planner_sdk::{Category, EmployeeCapacity};
use time::{Date, Duration};
use tracing::debug;

use crate::config::PlannerConfig;
use crate::domain::capacity::{self, PerCategory};
use crate::domain::error::DomainError;
use crate::domain::repo::EmployeeRepository;

/// Capacity of every category on one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCapacity {
    pub date: Date,
    pub categories: PerCategory<EmployeeCapacity>,
}

/// Capacity calculator reading the live roster
pub struct CapacityService {
    employees: Arc<dyn EmployeeRepository>,
    config: PlannerConfig,
}

impl CapacityService {
    pub fn new(employees: Arc<dyn EmployeeRepository>, config: PlannerConfig) -> Self {
        Self { employees, config }
    }

    pub async fn capacity_for_category(&self, category: Category) -> Result<i64, DomainError> {
        let roster = self.employees.list().await?;
        Ok(capacity::capacity_for_category(&roster, category))
    }

    pub async fn capacity_per_category(
        &self,
    ) -> Result<PerCategory<EmployeeCapacity>, DomainError> {
        let roster = self.employees.list().await?;
        Ok(capacity::capacity_per_category(&roster))
    }

    /// Capacity for `days` consecutive dates from `start`.
    pub async fn capacity_days(
        &self,
        start: Date,
        days: Option<u32>,
    ) -> Result<Vec<DayCapacity>, DomainError> {
        let days = days.unwrap_or(self.config.default_capacity_days);
        if days == 0 || days > self.config.max_capacity_days {
            return Err(DomainError::validation(
                "days",
                format!("must be between 1 and {}", self.config.max_capacity_days),
            ));
        }

        let categories = self.capacity_per_category().await?;
        let out: Vec<DayCapacity> = (0..days)
            .map_while(|offset| start.checked_add(Duration::days(i64::from(offset))))
            .map(|date| DayCapacity {
                date,
                categories: categories.clone(),
            })
            .collect();
        debug!(%start, days = out.len(), "computed capacity window");
        Ok(out)
    }
}
