use std::sync::Arc;

use crate::models::{Employee, EmployeeDraft};
use crate::store::{Store, StoreError};
use crate::utils::validation::{self, FieldErrors};

use super::{require_key, ServiceError, ServiceResult};

const ENTITY: &str = "Employee";
const KEY_FIELD: &str = "service_number";
const KEY_LABEL: &str = "Service number";

const MAX_NAME_CHARS: usize = 50;
const MAX_PHONE_CHARS: usize = 20;

/// Rules that need no storage access.
fn check_fields(draft: &EmployeeDraft, errors: &mut FieldErrors) {
    validation::required_text(errors, "name", "Name", draft.name.as_deref(), MAX_NAME_CHARS);
    validation::required_text(
        errors,
        "surname",
        "Surname",
        draft.surname.as_deref(),
        MAX_NAME_CHARS,
    );
    validation::required_text(errors, "post", "Post", draft.post.as_deref(), MAX_NAME_CHARS);
    validation::required_text(
        errors,
        "phone_number",
        "Phone number",
        draft.phone_number.as_deref(),
        MAX_PHONE_CHARS,
    );
}

fn dependency_conflict(service_number: i32) -> ServiceError {
    ServiceError::DependencyConflict {
        entity: ENTITY,
        key: service_number,
        message: "Cannot delete an employee who has tickets".to_string(),
    }
}

#[derive(Clone)]
pub struct EmployeeService {
    store: Arc<dyn Store>,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Employee>> {
        Ok(self.store.list_employees().await?)
    }

    pub async fn get(&self, service_number: Option<i32>) -> ServiceResult<Employee> {
        let key = require_key(service_number, KEY_LABEL)?;
        self.store
            .find_employee(key)
            .await?
            .ok_or(ServiceError::NotFound { entity: ENTITY, key })
    }

    pub async fn create(&self, draft: EmployeeDraft) -> ServiceResult<Employee> {
        let mut errors = FieldErrors::new();
        let key = draft.service_number.as_ref();
        if let Some(key) = validation::positive_key(&mut errors, KEY_FIELD, KEY_LABEL, key) {
            if self.store.employee_exists(key).await? {
                errors.add(KEY_FIELD, "An employee with this service number already exists");
            }
        }
        check_fields(&draft, &mut errors);

        let employee = match draft.to_employee() {
            Some(employee) if errors.is_empty() => employee,
            _ => return Err(ServiceError::validation(errors, &draft)),
        };

        match self.store.insert_employee(&employee).await {
            Ok(()) => {
                tracing::info!(service_number = employee.service_number, "Employee created");
                Ok(employee)
            }
            Err(StoreError::Conflict(reason)) => {
                tracing::warn!(service_number = employee.service_number, %reason, "Employee insert conflicted");
                Err(ServiceError::ConcurrencyConflict {
                    entity: ENTITY,
                    key: employee.service_number,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Replaces an employee in place. The key in the body must match the
    /// route key; the key itself never changes.
    pub async fn update(&self, route_key: i32, draft: EmployeeDraft) -> ServiceResult<Employee> {
        if draft.key() != Some(route_key) {
            return Err(ServiceError::NotFound {
                entity: ENTITY,
                key: route_key,
            });
        }

        let mut errors = FieldErrors::new();
        let key = draft.service_number.as_ref();
        validation::positive_key(&mut errors, KEY_FIELD, KEY_LABEL, key);
        check_fields(&draft, &mut errors);

        let employee = match draft.to_employee() {
            Some(employee) if errors.is_empty() => employee,
            _ => return Err(ServiceError::validation(errors, &draft)),
        };

        match self.store.update_employee(&employee).await {
            Ok(()) => {
                tracing::info!(service_number = route_key, "Employee updated");
                Ok(employee)
            }
            Err(StoreError::Conflict(reason)) => {
                if self.store.employee_exists(route_key).await? {
                    tracing::error!(service_number = route_key, %reason, "Employee update conflicted");
                    Err(ServiceError::ConcurrencyConflict {
                        entity: ENTITY,
                        key: route_key,
                    })
                } else {
                    Err(ServiceError::NotFound {
                        entity: ENTITY,
                        key: route_key,
                    })
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Deletes an employee who holds no tickets. Returns `false` if there was
    /// no such employee.
    pub async fn delete(&self, service_number: i32) -> ServiceResult<bool> {
        if !self.store.employee_exists(service_number).await? {
            tracing::debug!(service_number, "Employee already absent");
            return Ok(false);
        }
        if self.store.employee_has_tickets(service_number).await? {
            return Err(dependency_conflict(service_number));
        }

        match self.store.delete_employee(service_number).await {
            Ok(deleted) => {
                tracing::info!(service_number, "Employee deleted");
                Ok(deleted)
            }
            // a ticket was issued between the check and the delete
            Err(StoreError::Conflict(_)) => Err(dependency_conflict(service_number)),
            Err(err) => Err(err.into()),
        }
    }
}
