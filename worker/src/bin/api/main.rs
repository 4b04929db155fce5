use push_dispatcher::environment::Environment;
use push_dispatcher::shutdown::Shutdown;
use push_dispatcher_worker::routes::Routes;
use push_dispatcher_worker::state::AppState;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use wg::WaitGroup;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (non_blocking, _guard) = tracing_appender::non_blocking(std::io::stdout());

    let rust_log = Environment::string("RUST_LOG", "INFO");
    env::set_var("RUST_LOG", rust_log);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(Box::new(tracing_subscriber::fmt::layer().with_writer(non_blocking)))
        .init();

    info!("Starting...");

    let wait_group = WaitGroup::new();

    let app_state = AppState::new().await?;

    tokio::spawn(init_http_server(app_state, wait_group.add(1)));

    wait_group.wait();

    info!("Stopped!");

    Ok(())
}

async fn init_http_server(
    app_state: AppState,
    wait_group: WaitGroup,
) {
    info!("Starting http server...");
    let routes = Routes::routes(&app_state).await;

    let addr = SocketAddr::from(([0, 0, 0, 0], Environment::u16("HTTP_PORT", 9095)));

    match TcpListener::bind(addr).await {
        Ok(listener) => {
            info!("Running http server on {}...", addr);
            if let Err(error) = axum::serve(listener, routes).with_graceful_shutdown(Shutdown::signal("Stopping http server...")).await {
                error!("Http server failed with error: {}", error);
            }
        },
        Err(error) => error!("Failed to bind http server to {} cause {}", addr, error),
    }

    wait_group.done();

    info!("Http server stopped!");
}
