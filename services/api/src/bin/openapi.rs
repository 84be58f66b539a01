//! services/api/src/bin/openapi.rs
//!
//! Dumps the tracker's OpenAPI document to `openapi.json` so frontend
//! clients can be generated without a running server.

use api_lib::web::ApiDoc;
use utoipa::OpenApi;

fn dump_openapi(
    doc: utoipa::openapi::OpenApi,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, doc.to_pretty_json()?)?;
    println!("wrote OpenAPI document to {}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dump_openapi(ApiDoc::openapi(), "openapi.json")
}
