use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cars")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub license_plate: String,
    #[sea_orm(unique)]
    pub chassis_number: String,
    pub manufacturer: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub category: String,
    pub transmission: String,
    pub fuel_type: String,
    pub seats: i32,
    pub doors: i32,
    pub mileage: i32,
    pub engine_power: i32,
    pub price_per_day: i64,
    pub image_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::contracts::Entity")]
    Contracts,
}

impl Related<super::contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contracts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
