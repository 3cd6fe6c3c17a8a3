use crate::api::{serve, ApiState};
use crate::app::command_support::{open_engine, ParsedArgs};

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

/// Serves the HTTP API until interrupted.
pub fn cmd_serve(args: &ParsedArgs) -> Result<String, String> {
    args.expect_positional(0, "serve [--listen <addr>]")?;
    let addr = args.value("--listen").unwrap_or(DEFAULT_LISTEN_ADDR).to_string();
    let state = ApiState::new(open_engine(args)?);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("failed to start runtime: {err}"))?;
    runtime
        .block_on(serve(state, &addr))
        .map_err(|err| format!("api server on {addr} failed: {err}"))?;
    Ok(format!("stopped\nlisten={addr}"))
}
