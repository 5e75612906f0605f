use lumar_core::ConfigError;
use lumar_persist::PersistError;

#[derive(Debug, thiserror::Error)]
pub enum HeadlessError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config: {}", join(.0))]
    Config(Vec<ConfigError>),

    #[error("cannot load save: {0}")]
    Persist(#[from] PersistError),

    #[error("invalid scheduled command '{0}' (expected '@<step> <command>' or '<command>')")]
    Schedule(String),
}

fn join(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
