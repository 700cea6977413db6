fn main() {
    #[cfg(target_arch = "wasm32")]
    colony_atlas::web::start();
}
