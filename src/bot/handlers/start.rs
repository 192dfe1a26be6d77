use crate::{
    bot::{keyboards, reply::Reply, texts},
    error::AppResult,
    state::AppState,
    telegram::User,
};

/// `/start` and every "back to main menu" button. Abandons any dialog in progress.
pub async fn main_menu(state: &AppState, reply: Reply<'_>, user: &User) -> AppResult<()> {
    state.conversations.clear(user.id);
    reply
        .show(
            &texts::welcome(Some(&user.first_name)),
            Some(&keyboards::main_menu()),
        )
        .await?;
    Ok(())
}
