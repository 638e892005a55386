//! End-to-end scrapes against a mock storefront
//!
//! These tests use wiremock to serve WooCommerce and Shopify listing pages
//! and run the full path from configuration to the CSV on disk.

use singles_scout::config::{parse_config, Config};
use singles_scout::output::merge_catalogs;
use singles_scout::paginator::run_store;
use singles_scout::shutdown::Shutdown;
use singles_scout::StopReason;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a configuration pointing one store at the mock server
fn create_test_config(listing_url: &str, platform: &str, output_dir: &Path, mode: &str) -> Config {
    let toml = format!(
        r#"
[paginator]
window-size = 3
pages-per-save = 2
max-consecutive-empty = 2
max-page = 50
prompt-timeout-secs = 1

[retry]
attempts-per-cycle = 2
max-cycles = 2
retry-wait-secs = 0
cycle-cooldown-secs = 0

[http]
user-agent = "SinglesScout-Test/1.0"
timeout-secs = 5

[output]
directory = "{dir}"
mode = "{mode}"
merge-prefix = "List_"

[[store]]
name = "mock"
platform = "{platform}"
listing-url = "{listing_url}"
file-prefix = "List_Mock"
"#,
        dir = output_dir.display().to_string().replace('\\', "/"),
        mode = mode,
        platform = platform,
        listing_url = listing_url,
    );
    parse_config(&toml).expect("test config should be valid")
}

fn woo_page(cards: &[(&str, &str, &str)]) -> String {
    let mut html = String::from("<html><body><ul class=\"products\">");
    for (slug, title, price) in cards {
        html.push_str(&format!(
            r#"<li class="product">
                 <a href="/producto/{}/" class="woocommerce-LoopProduct-link">
                   <h2 class="woocommerce-loop-product__title">{}</h2>
                   <span class="price"><span class="woocommerce-Price-amount">{}</span></span>
                 </a>
               </li>"#,
            slug, title, price
        ));
    }
    html.push_str("</ul></body></html>");
    html
}

const NO_PRODUCTS: &str =
    r#"<html><body><p class="woocommerce-info">No se encontraron productos.</p></body></html>"#;

async fn mount_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/singles/"))
        .and(query_param("product-page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_fallback(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(NO_PRODUCTS))
        .mount(server)
        .await;
}

fn csv_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().map(|ext| ext == "csv").unwrap_or(false))
        .collect();
    files.sort();
    files
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader
        .records()
        .map(|record| record.unwrap().iter().map(String::from).collect())
        .collect()
}

#[tokio::test]
async fn test_woocommerce_scrape_end_to_end() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        1,
        woo_page(&[
            ("sol-ring", "Sol Ring (Commander Masters)", "$4.000"),
            ("opt", "Opt (Foil) - Dominaria", "$1.500"),
        ]),
    )
    .await;
    mount_page(&server, 2, woo_page(&[("ponder", "Ponder", "$900")])).await;
    mount_page(&server, 3, woo_page(&[("brainstorm", "Brainstorm", "$1.200")])).await;
    mount_fallback(&server).await;

    let listing = format!("{}/singles/?product-page={{page}}", server.uri());
    let config = create_test_config(&listing, "woocommerce", out.path(), "append");
    let store = config.store("mock").unwrap();

    let summary = run_store(&config, store, 1, &Shutdown::never()).await.unwrap();
    assert_eq!(summary.stop_reason, StopReason::EndOfListing);
    assert_eq!(summary.last_released, Some(5));
    assert_eq!(summary.items_written, 4);

    let files = csv_files(out.path());
    assert_eq!(files.len(), 1);
    assert_eq!(summary.output.as_deref(), Some(files[0].as_path()));

    let rows = read_rows(&files[0]);
    let names: Vec<&str> = rows.iter().map(|row| row[1].as_str()).collect();
    assert_eq!(names, ["Sol Ring", "Opt", "Ponder", "Brainstorm"]);

    assert_eq!(rows[0][0], "Sol Ring (Commander Masters)");
    assert_eq!(rows[0][2], "No");
    assert_eq!(rows[0][3], "4000");
    assert_eq!(rows[0][4], format!("{}/producto/sol-ring/", server.uri()));
    assert_eq!(rows[1][2], "Sí");
}

#[tokio::test]
async fn test_transient_error_is_retried() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/singles/"))
        .and(query_param("product-page", "1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, 1, woo_page(&[("ponder", "Ponder", "$900")])).await;
    mount_fallback(&server).await;

    let listing = format!("{}/singles/?product-page={{page}}", server.uri());
    let config = create_test_config(&listing, "woocommerce", out.path(), "append");
    let store = config.store("mock").unwrap();

    let summary = run_store(&config, store, 1, &Shutdown::never()).await.unwrap();
    assert_eq!(summary.omitted_pages, 0);
    assert_eq!(summary.items_written, 1);
}

#[tokio::test]
async fn test_not_found_page_is_retried_then_omitted() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(&server, 1, woo_page(&[("ponder", "Ponder", "$900")])).await;
    Mock::given(method("GET"))
        .and(path("/singles/"))
        .and(query_param("product-page", "2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(4)
        .mount(&server)
        .await;
    mount_page(&server, 3, woo_page(&[("opt", "Opt", "$300")])).await;
    mount_fallback(&server).await;

    let listing = format!("{}/singles/?product-page={{page}}", server.uri());
    let config = create_test_config(&listing, "woocommerce", out.path(), "append");
    let store = config.store("mock").unwrap();

    let summary = run_store(&config, store, 1, &Shutdown::never()).await.unwrap();
    assert_eq!(summary.omitted_pages, 1);
    server.verify().await;

    let rows = read_rows(&csv_files(out.path())[0]);
    let names: Vec<&str> = rows.iter().map(|row| row[1].as_str()).collect();
    assert_eq!(names, ["Ponder", "Opt"]);
}

#[tokio::test]
async fn test_shopify_overwrite_scrape_and_merge() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    let page = r#"<html><body>
      <div class="grid-view-item">
        <a class="grid-view-item__link" href="/products/lightning-bolt"></a>
        <div class="grid-view-item__title">Lightning Bolt (Foil)</div>
        <div class="product-price" variants='{"1":{"price":150000},"2":{"price":"99000"}}'>$990</div>
      </div>
    </body></html>"#;

    Mock::given(method("GET"))
        .and(path("/collections/singles"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&server)
        .await;

    let listing = format!("{}/collections/singles?page={{page}}", server.uri());
    let config = create_test_config(&listing, "shopify", out.path(), "overwrite");
    let store = config.store("mock").unwrap();

    let summary = run_store(&config, store, 1, &Shutdown::never()).await.unwrap();
    let output = summary.output.unwrap();
    assert!(!out.path().join("List_Mock_current.csv").exists());

    let rows = read_rows(&output);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][1], "Lightning Bolt");
    assert_eq!(rows[0][2], "Sí");
    assert_eq!(rows[0][3], "990");
    assert_eq!(rows[0][4], format!("{}/products/lightning-bolt", server.uri()));

    let merged = merge_catalogs(out.path(), "List_").unwrap();
    assert_eq!(merged.records, 1);
    assert_eq!(merged.sources.len(), 1);

    let unified = read_rows(&merged.output);
    assert_eq!(unified[0][0], merged.sources[0]);
    assert_eq!(unified[0][2], "Lightning Bolt");
}
