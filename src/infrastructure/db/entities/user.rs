use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,

    pub display_name: String,

    pub key_salt: String,

    #[sea_orm(default_value = false)]
    pub is_moderator: bool,

    #[sea_orm(default_value = false)]
    pub is_banned: bool,

    #[sea_orm(default_value = 0)]
    pub pixels_completed: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
