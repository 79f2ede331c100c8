use ai_adventure::preview::{router, PreviewState};
use ai_adventure::{Config, ImageBoard};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

mod common;

#[ctor::ctor]
fn _init() { common::init(); }

async fn get(board: &ImageBoard, uri: &str) -> (StatusCode, Option<String>, String) {
    let app = router(PreviewState::new(board.clone(), &Config::new()));
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

fn body_section(page: &str) -> &str {
    let start = page.find("<body>").expect("body open");
    let end = page.find("</body>").expect("body close");
    &page[start..end]
}

#[tokio::test]
async fn empty_board_renders_page_with_reload_script() {
    let board = ImageBoard::new();
    let (status, content_type, page) = get(&board, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(page.contains("<head>"));
    assert!(page.contains("<script>setInterval(() => location.reload(), 500)</script>"));
    assert!(!page.contains("<img"));
}

#[tokio::test]
async fn board_image_is_rendered_at_fixed_width() {
    let board = ImageBoard::new();
    board.replace("forge-image");
    let (_, _, page) = get(&board, "/").await;

    assert_eq!(page.matches("<img").count(), 1);
    assert!(page.contains(r#"<img src="forge-image" style="width:800px;"/>"#));
}

#[tokio::test]
async fn page_reflects_latest_replacement() {
    let board = ImageBoard::new();
    board.replace("old-image");
    board.replace("new-image");
    let (_, _, page) = get(&board, "/").await;

    assert_eq!(page.matches("<img").count(), 1);
    assert!(page.contains("new-image"));
    assert!(!page.contains("old-image"));
}

#[tokio::test]
async fn repeated_requests_render_identical_body() {
    let board = ImageBoard::new();
    board.replace("steady-image");
    let (_, _, first) = get(&board, "/").await;
    let (_, _, second) = get(&board, "/").await;
    assert_eq!(body_section(&first), body_section(&second));
}

#[tokio::test]
async fn other_routes_are_not_found() {
    let board = ImageBoard::new();
    let (status, _, _) = get(&board, "/images").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
