use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Submitted;

/// A row from the `employees` table, keyed by the user-assigned service number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Employee {
    pub service_number: i32,
    pub name: String,
    pub surname: String,
    pub post: String,
    pub phone_number: String,
}

impl Employee {
    /// Display name, surname first. Not persisted.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.surname, self.name)
    }
}

/// Employee as returned to API callers, with the derived full name.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeView {
    #[serde(flatten)]
    pub employee: Employee,
    pub full_name: String,
}

impl From<Employee> for EmployeeView {
    fn from(employee: Employee) -> Self {
        let full_name = employee.full_name();
        Self {
            employee,
            full_name,
        }
    }
}

/// Candidate employee record as submitted for create or edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeDraft {
    #[serde(default)]
    pub service_number: Option<Submitted<i32>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub post: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl EmployeeDraft {
    /// The submitted service number, if it is an integer.
    pub fn key(&self) -> Option<i32> {
        self.service_number.as_ref().and_then(Submitted::value)
    }

    /// Builds the record once every field is present. Text is trimmed.
    pub fn to_employee(&self) -> Option<Employee> {
        Some(Employee {
            service_number: self.key()?,
            name: self.name.as_deref()?.trim().to_string(),
            surname: self.surname.as_deref()?.trim().to_string(),
            post: self.post.as_deref()?.trim().to_string(),
            phone_number: self.phone_number.as_deref()?.trim().to_string(),
        })
    }
}
