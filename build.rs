// Exposes the Gemini key from the environment or a local `.env` file to the
// crate as a compile-time constant (read back with `option_env!`).
use std::path::Path;

fn main() {
    // Watching a missing path would rerun the script on every build.
    if Path::new(".env").exists() {
        println!("cargo:rerun-if-changed=.env");
    }
    println!("cargo:rerun-if-env-changed=API_KEY");

    dotenv::dotenv().ok();

    if let Ok(key) = std::env::var("API_KEY") {
        if !key.trim().is_empty() {
            println!("cargo:rustc-env=COLONY_ATLAS_API_KEY={}", key.trim());
        }
    }
}
