use crate::{
    bot::{keyboards, reply::Reply, texts},
    error::AppResult,
    services::faq_service,
    state::AppState,
    telegram::{InlineQuery, InlineQueryResult},
};

pub async fn entry(reply: Reply<'_>) -> AppResult<()> {
    reply
        .show(texts::FAQ_SEARCH_PROMPT, Some(&keyboards::faq_entry()))
        .await?;
    Ok(())
}

pub async fn inline_search(state: &AppState, query: &InlineQuery) -> AppResult<()> {
    let results = if query.query.trim().is_empty() {
        vec![InlineQueryResult::article(
            "empty_query",
            texts::FAQ_INLINE_QUERY_PROMPT,
            texts::FAQ_INLINE_QUERY_PROMPT,
        )]
    } else {
        let faqs = faq_service::search(&state.orm, &query.query).await?;
        if faqs.is_empty() {
            vec![InlineQueryResult::article(
                "no_results",
                texts::FAQ_NO_RESULTS,
                texts::FAQ_NO_RESULTS,
            )]
        } else {
            faqs.iter()
                .map(|faq| {
                    let mut article = InlineQueryResult::article(
                        format!("faq_{}", faq.id),
                        faq.question.clone(),
                        texts::faq_answer(faq),
                    );
                    article.description = Some(faq_service::preview(&faq.answer));
                    article
                })
                .collect()
        }
    };

    state
        .transport
        .answer_inline_query(&query.id, &results)
        .await?;
    Ok(())
}
