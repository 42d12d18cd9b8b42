use anyhow::Context;
use std::path::Path;
use survey_core::config::Config;
use survey_server::AppState;

pub fn run(root: &Path, port: Option<u16>, open: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let port = port.unwrap_or(config.server.port);

    // The HTTP sheet store owns a blocking client, which must be built
    // outside the async runtime.
    let state = AppState::load(root).context("failed to load survey state")?;
    if let Some(message) = &state.catalog.error {
        eprintln!("warning: {message}");
    }

    // Held until the runtime is gone so the client is never dropped inside it.
    let store = state.store.clone();

    let rt = tokio::runtime::Runtime::new()?;
    let result: anyhow::Result<()> = rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();
        println!(
            "{} ({}) → http://localhost:{actual_port}/api/form",
            state.title, state.variant
        );

        tokio::select! {
            res = survey_server::serve_on(state, listener, open) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    });
    drop(rt);
    drop(store);
    result
}
