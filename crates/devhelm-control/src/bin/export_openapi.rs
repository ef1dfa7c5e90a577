// Export OpenAPI specification as JSON
//
// Usage: cargo run --bin export-openapi > docs/api/openapi.json
//
// Generates the spec without starting the server.

use devhelm_control::openapi::ApiDoc;

fn main() {
    println!("{}", ApiDoc::to_json());
}
