//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    log::info!("Starting Topolink");

    let config_path = std::env::args().nth(1).map(std::path::PathBuf::from);
    match pollster::block_on(topolink_app::App::run(config_path.as_deref())) {
        Ok(report) => {
            print!("{report}");
            println!("{}", report.snapshot_json);
        }
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
