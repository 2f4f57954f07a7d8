// src/common/logging.rs

use tracing_subscriber::EnvFilter;

/// Inicializa o logger. Usa `RUST_LOG` se existir, senão `info`.
///
/// Pode ser chamado mais de uma vez (testes, apps que já têm subscriber): só o primeiro vale.
pub fn init_tracing() {
    let filtro = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filtro)
        .with_target(false)
        .compact()
        .try_init();
}
