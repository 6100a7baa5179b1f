//! Employees table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub employee_id: i32,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position_id: i32,
    pub department_id: i32,
    pub hire_date: Date,
    pub is_active: bool,
    pub photo: Option<Vec<u8>>,
}

impl Model {
    /// "Фамилия Имя [Отчество]" display form.
    pub fn full_name(&self) -> String {
        match self.middle_name.as_deref() {
            Some(middle) if !middle.is_empty() => {
                format!("{} {} {}", self.last_name, self.first_name, middle)
            }
            _ => format!("{} {}", self.last_name, self.first_name),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::users::Entity")]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
