use grocery_server::{Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. .env, config, logger
    let config = setup_environment();

    print_banner();

    tracing::info!(environment = %config.environment, "Grocery server starting...");

    // 2. Database, JWT, demo accounts
    let state = match ServerState::initialize(&config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            return Err(e.into());
        }
    };

    // 3. Serve until Ctrl-C
    let server = Server::with_state(state.config.clone(), state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
