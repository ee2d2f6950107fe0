#[macro_use]
extern crate rocket;

use std::sync::Arc;

use qr_architect::cache::SymbolCache;
use qr_architect::routes;
use rocket_cors::{AllowedOrigins, CorsOptions};

#[launch]
fn rocket() -> _ {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Encoded symbols kept in memory: default 256, configurable via SYMBOL_CACHE_CAPACITY
    let capacity: usize = std::env::var("SYMBOL_CACHE_CAPACITY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(256);
    log::info!("symbol cache capacity: {}", capacity);

    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .to_cors()
        .expect("CORS configuration failed");

    rocket::build()
        .attach(cors)
        .manage(Arc::new(SymbolCache::new(capacity)))
        .mount(
            "/api/v1",
            routes![
                routes::health,
                routes::styles,
                routes::render_qr,
                routes::contrast_check,
                routes::decode_qr,
            ],
        )
}
