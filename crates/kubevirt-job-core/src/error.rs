use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure while resolving the updater configuration from the environment.
///
/// The display text is stable and user facing; the underlying parser error, if
/// any, is only reachable through `source()`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no machine type was specified")]
    MissingMachineType,

    #[error("no namespace was specified")]
    MissingNamespace,

    #[error("syntax error in pattern of {name} environment variable, value \"{value}\"")]
    InvalidPattern {
        name: &'static str,
        value: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("syntax error in {name} environment variable, value \"{value}\"")]
    InvalidSyntax { name: &'static str, value: String },

    #[error("error parsing {name} environment variable, value \"{value}\"")]
    Unparsable {
        name: &'static str,
        value: String,
        #[source]
        source: BoxError,
    },
}

#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Listing virtual machines in namespace {namespace} failed -- {source}")]
    List {
        namespace: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Patching virtual machine {vm} failed -- {source}")]
    Patch {
        vm: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Restarting virtual machine {vm} failed -- {source}")]
    Restart {
        vm: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type JobResult<T> = Result<T, JobError>;
