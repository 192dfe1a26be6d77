use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use storefront_bot::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        categories::{self, ActiveModel as CategoryActive, Entity as Categories},
        faqs::{self, ActiveModel as FaqActive, Entity as Faqs},
        products::{self, ActiveModel as ProductActive, Entity as Products},
        subcategories::{self, ActiveModel as SubcategoryActive, Entity as Subcategories},
    },
};
use uuid::Uuid;

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: i64,
}

const CATALOG: &[(&str, &[(&str, &[SeedProduct])])] = &[
    (
        "Merch",
        &[
            (
                "Apparel",
                &[
                    SeedProduct { name: "Ferris Hoodie", description: "Warm hoodie for Rustaceans", price: 5500 },
                    SeedProduct { name: "Crab T-Shirt", description: "Cotton, unisex", price: 1900 },
                ],
            ),
            (
                "Accessories",
                &[
                    SeedProduct { name: "Ferris Mug", description: "Coffee tastes better with Ferris", price: 1200 },
                    SeedProduct { name: "Sticker Pack", description: "Decorate your laptop", price: 500 },
                ],
            ),
        ],
    ),
    (
        "Books",
        &[(
            "Programming",
            &[SeedProduct { name: "Async Patterns", description: "Printed edition", price: 2500 }],
        )],
    ),
];

const FAQS: &[(&str, &str, &str)] = &[
    ("How do I pay for an order?", "After confirming the order you get a payment link. Card payments go through YooKassa.", "payment,card,pay"),
    ("How long does delivery take?", "Usually 2 to 5 business days after payment.", "delivery,shipping"),
    ("Can I cancel an order?", "An unpaid order simply expires. For paid orders contact support.", "cancel,refund"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    seed_catalog(&orm).await?;
    seed_faqs(&orm).await?;

    println!("Seed completed");
    Ok(())
}

async fn seed_catalog(db: &DatabaseConnection) -> anyhow::Result<()> {
    for (category_position, (category_name, subcategories)) in CATALOG.iter().enumerate() {
        let category = match Categories::find()
            .filter(categories::Column::Name.eq(*category_name))
            .one(db)
            .await?
        {
            Some(existing) => existing,
            None => {
                CategoryActive {
                    id: Set(Uuid::new_v4()),
                    name: Set(category_name.to_string()),
                    position: Set(category_position as i16),
                }
                .insert(db)
                .await?
            }
        };

        for (sub_position, (sub_name, products)) in subcategories.iter().enumerate() {
            let subcategory = match Subcategories::find()
                .filter(subcategories::Column::CategoryId.eq(category.id))
                .filter(subcategories::Column::Name.eq(*sub_name))
                .one(db)
                .await?
            {
                Some(existing) => existing,
                None => {
                    SubcategoryActive {
                        id: Set(Uuid::new_v4()),
                        category_id: Set(category.id),
                        name: Set(sub_name.to_string()),
                        position: Set(sub_position as i16),
                    }
                    .insert(db)
                    .await?
                }
            };

            for product in products.iter() {
                let exists = Products::find()
                    .filter(products::Column::SubcategoryId.eq(subcategory.id))
                    .filter(products::Column::Name.eq(product.name))
                    .one(db)
                    .await?
                    .is_some();
                if exists {
                    continue;
                }
                ProductActive {
                    id: Set(Uuid::new_v4()),
                    subcategory_id: Set(subcategory.id),
                    name: Set(product.name.to_string()),
                    description: Set(Some(product.description.to_string())),
                    price: Set(Decimal::from(product.price)),
                    image_url: Set(None),
                    created_at: Set(Utc::now().into()),
                    updated_at: Set(Utc::now().into()),
                }
                .insert(db)
                .await?;
            }
        }
        println!("Ensured category {category_name}");
    }
    Ok(())
}

async fn seed_faqs(db: &DatabaseConnection) -> anyhow::Result<()> {
    for (position, (question, answer, keywords)) in FAQS.iter().enumerate() {
        let exists = Faqs::find()
            .filter(faqs::Column::Question.eq(*question))
            .one(db)
            .await?
            .is_some();
        if exists {
            continue;
        }
        FaqActive {
            id: Set(Uuid::new_v4()),
            question: Set(question.to_string()),
            answer: Set(answer.to_string()),
            keywords: Set(Some(keywords.to_string())),
            position: Set(position as i16),
            is_active: Set(true),
        }
        .insert(db)
        .await?;
    }
    println!("Seeded FAQs");
    Ok(())
}
