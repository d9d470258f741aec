use std::sync::Arc;

use aftersales_planner_sdk::{Employee, EmployeePatch, NewEmployee};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::error::{DomainError, Issues};
use crate::domain::fields::{EmployeeFields, char_len};
use crate::domain::repo::EmployeeRepository;

/// Employee directory
pub struct EmployeeService {
    repo: Arc<dyn EmployeeRepository>,
}

impl EmployeeService {
    pub fn new(repo: Arc<dyn EmployeeRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Employee>, DomainError> {
        let employees = self.repo.list().await?;
        debug!(count = employees.len(), "listed employees");
        Ok(employees)
    }

    pub async fn create(&self, new: NewEmployee) -> Result<Employee, DomainError> {
        let mut issues = Issues::new();
        let name = validate_name(&new.name, &mut issues);
        validate_performance(new.performance, &mut issues);
        issues.finish()?;

        let employee = self
            .repo
            .insert(NewEmployee {
                name: name.unwrap_or_default(),
                ..new
            })
            .await?;
        info!(
            employee_id = %employee.id,
            category = %employee.category,
            performance = employee.performance,
            "employee created"
        );
        Ok(employee)
    }

    pub async fn update(&self, id: Uuid, patch: EmployeePatch) -> Result<Employee, DomainError> {
        let mut issues = Issues::new();
        let name = patch
            .name
            .as_deref()
            .and_then(|n| validate_name(n, &mut issues));
        if let Some(p) = patch.performance {
            validate_performance(p, &mut issues);
        }
        issues.finish()?;

        let patch = EmployeePatch { name, ..patch };
        let employee = self
            .repo
            .update(id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found("employee", id))?;
        info!(employee_id = %id, "employee updated");
        Ok(employee)
    }

    /// `false` when nothing was deleted.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let removed = self.repo.delete(id).await?;
        if removed {
            info!(employee_id = %id, "employee deleted");
        } else {
            debug!(employee_id = %id, "employee to delete not found");
        }
        Ok(removed)
    }
}

fn validate_name(name: &str, issues: &mut Issues) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        issues.push(EmployeeFields::NAME, "must not be empty");
        return None;
    }
    if char_len(name) > EmployeeFields::NAME_MAX_CHARS {
        issues.push(
            EmployeeFields::NAME,
            format!("must be at most {} characters", EmployeeFields::NAME_MAX_CHARS),
        );
        return None;
    }
    Some(name.to_owned())
}

fn validate_performance(performance: i32, issues: &mut Issues) {
    if !(0..=EmployeeFields::PERFORMANCE_MAX).contains(&performance) {
        issues.push(
            EmployeeFields::PERFORMANCE,
            format!("must be between 0 and {}", EmployeeFields::PERFORMANCE_MAX),
        );
    }
}
