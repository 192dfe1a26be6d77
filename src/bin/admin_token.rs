use chrono::Duration;
use storefront_bot::middleware::auth::issue_token;

/// Prints a bearer token for the admin API.
///
/// Usage: `admin-token [subject] [ttl-hours]`; needs `JWT_SECRET`.
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let secret = std::env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;

    let mut args = std::env::args().skip(1);
    let subject = args.next().unwrap_or_else(|| "operator".to_string());
    let ttl_hours = match args.next() {
        Some(raw) => raw.parse::<i64>()?,
        None => 24,
    };

    let token = issue_token(&secret, &subject, Duration::hours(ttl_hours))?;
    println!("{token}");
    Ok(())
}
