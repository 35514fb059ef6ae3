use keymaster_serve::{app, config::Args};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Args = argh::from_env();
    let password = std::env::var(&args.auth_password_env).ok();
    let state = args.app_state(password);
    let address = args.bind_address();

    log::info!("🚀 Starting the server");
    log::info!("🔥 Listening on: http://{address}");
    log::info!("🔧 Default fit mode: {}", args.mode);
    log::info!("🔧 RANSAC iteration limit: {}", args.max_ransac_iterations);
    log::info!("🔧 Press Ctrl+C to stop the server");

    let listener = tokio::net::TcpListener::bind(&address).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
