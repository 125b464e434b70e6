//! Local HTTP server standing in for the catalog and its image CDN

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;

/// Pages and files served by the fixture server
#[derive(Clone, Default)]
pub struct CatalogFixture {
    /// Listing HTML by page number; page 0 is the catalog root
    pub pages: HashMap<u32, String>,
    /// File bodies by name under `/img/`, with the status to answer with
    pub images: HashMap<String, (StatusCode, Vec<u8>)>,
}

async fn root(State(fixture): State<Arc<CatalogFixture>>) -> Response {
    page_response(&fixture, 0)
}

async fn page(State(fixture): State<Arc<CatalogFixture>>, Path(n): Path<u32>) -> Response {
    page_response(&fixture, n)
}

fn page_response(fixture: &CatalogFixture, n: u32) -> Response {
    match fixture.pages.get(&n) {
        Some(html) => ([(header::CONTENT_TYPE, "text/html")], html.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "no such page").into_response(),
    }
}

async fn image(State(fixture): State<Arc<CatalogFixture>>, Path(name): Path<String>) -> Response {
    match fixture.images.get(&name) {
        Some((status, body)) => {
            (*status, [(header::CONTENT_TYPE, "image/png")], body.clone()).into_response()
        }
        None => (StatusCode::NOT_FOUND, "no such image").into_response(),
    }
}

/// Serve the fixture on an ephemeral port; returns its address
pub async fn serve(fixture: CatalogFixture) -> SocketAddr {
    let app = Router::new()
        .route("/c/figurative/", get(root))
        .route("/c/figurative/page/:n/", get(page))
        .route("/img/:name", get(image))
        .with_state(Arc::new(fixture));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Listing page markup for (image link, title, optional artist) cards
pub fn listing_html(cards: &[(&str, &str, Option<&str>)], last_page: u32) -> String {
    let mut html = String::from("<html><body><div class=\"products\">");
    for (link, title, artist) in cards {
        let brands = match artist {
            Some(name) => format!(
                r#"<div class="woodmart-product-brands-links"><a href="/artist/">{}</a></div>"#,
                name
            ),
            None => String::new(),
        };
        html.push_str(&format!(
            r#"<div class="product-grid-item product">
                 <a class="product-image-link" href="/dl/"><img src="{}" alt=""></a>
                 <h3 class="product-title"><a href="/dl/">{}</a></h3>
                 {}
               </div>"#,
            link, title, brands
        ));
    }
    html.push_str("</div><nav><ul class=\"page-numbers\">");
    html.push_str(&format!(
        r#"<li><a class="page-numbers" href="/c/figurative/page/{0}/">{0}</a></li>
           <li><a class="next page-numbers" href="/c/figurative/page/2/">→</a></li>"#,
        last_page
    ));
    html.push_str("</ul></nav></body></html>");
    html
}

/// PNG of a single colour
pub fn png_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([rgb[0], rgb[1], rgb[2], 255]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
