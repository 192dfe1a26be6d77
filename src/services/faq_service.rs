use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, Func},
};

use crate::{
    entity::faqs::{Column as FaqCol, Entity as Faqs, Model as Faq},
    error::AppResult,
};

/// Upper bound on inline query answers.
pub const MAX_RESULTS: u64 = 50;

/// Case-insensitive substring search over active question/keyword entries.
pub async fn search<C>(db: &C, query: &str) -> AppResult<Vec<Faq>>
where
    C: ConnectionTrait,
{
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Ok(Vec::new());
    }
    let pattern = format!("%{}%", escape_like(&needle));

    let faqs = Faqs::find()
        .filter(FaqCol::IsActive.eq(true))
        .filter(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col(FaqCol::Question)))
                        .like(pattern.as_str()),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col(FaqCol::Keywords)))
                        .like(pattern.as_str()),
                ),
        )
        .order_by_asc(FaqCol::Position)
        .limit(MAX_RESULTS)
        .all(db)
        .await?;
    Ok(faqs)
}

fn escape_like(raw: &str) -> String {
    raw.replace('%', "").replace('_', "")
}

/// Short answer preview shown under the inline result title.
pub fn preview(answer: &str) -> String {
    const LIMIT: usize = 100;
    if answer.chars().count() <= LIMIT {
        return answer.to_string();
    }
    let cut: String = answer.chars().take(LIMIT).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previews_are_truncated_on_char_boundaries() {
        let long = "ж".repeat(150);
        let short = preview(&long);
        assert_eq!(short.chars().count(), 103);
        assert!(short.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn wildcards_are_stripped_from_queries() {
        assert_eq!(escape_like("100%_off"), "100off");
    }
}
