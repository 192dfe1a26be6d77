use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    entity::{
        categories::{Column as CategoryCol, Entity as Categories, Model as Category},
        products::{Column as ProdCol, Entity as Products, Model as Product},
        subcategories::{Column as SubcategoryCol, Entity as Subcategories, Model as Subcategory},
    },
    error::{AppError, AppResult},
};

pub async fn categories<C>(db: &C) -> AppResult<Vec<Category>>
where
    C: ConnectionTrait,
{
    Ok(Categories::find()
        .order_by_asc(CategoryCol::Position)
        .order_by_asc(CategoryCol::Name)
        .all(db)
        .await?)
}

pub async fn subcategories<C>(db: &C, category_id: Uuid) -> AppResult<Vec<Subcategory>>
where
    C: ConnectionTrait,
{
    Ok(Subcategories::find()
        .filter(SubcategoryCol::CategoryId.eq(category_id))
        .order_by_asc(SubcategoryCol::Position)
        .order_by_asc(SubcategoryCol::Name)
        .all(db)
        .await?)
}

pub async fn subcategory<C>(db: &C, id: Uuid) -> AppResult<Subcategory>
where
    C: ConnectionTrait,
{
    Subcategories::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn products<C>(db: &C, subcategory_id: Uuid) -> AppResult<Vec<Product>>
where
    C: ConnectionTrait,
{
    Ok(Products::find()
        .filter(ProdCol::SubcategoryId.eq(subcategory_id))
        .order_by_asc(ProdCol::Name)
        .all(db)
        .await?)
}

/// Product together with its subcategory, for "back" navigation.
pub async fn product<C>(db: &C, id: Uuid) -> AppResult<(Product, Subcategory)>
where
    C: ConnectionTrait,
{
    let (product, subcategory) = Products::find_by_id(id)
        .find_also_related(Subcategories)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;
    let subcategory = subcategory.ok_or(AppError::NotFound)?;
    Ok((product, subcategory))
}
