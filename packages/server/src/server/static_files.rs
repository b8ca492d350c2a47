use axum::response::Html;

/// Phone entry page: pushes a login request, then polls `check` every 3 seconds
const LOGIN_PAGE: &str = include_str!("../../static/index.html");

/// Serve the demo login page
pub async fn serve_login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}
