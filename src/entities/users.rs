#[derive(Debug, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
    pub headline: Option<String>,
}
