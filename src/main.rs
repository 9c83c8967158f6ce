mod app;
mod attention;
mod butterfly;
mod config;
mod debug;
mod ecs;
mod error;
mod flower;
mod render;
mod sim;
mod util;

fn main() {
    env_logger::init();
    log::info!("Bloomfield starting up");

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
