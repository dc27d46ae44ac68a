// src/utils/env.rs
use log::debug;

/// Loads environment variables from a .env file when one is present.
pub fn load_env() {
    match dotenv::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(_) => debug!("No .env file found; using process environment"),
    }
}
