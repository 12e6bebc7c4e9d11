use clap::Subcommand;

pub mod run;
pub mod validate;

#[derive(Subcommand)]
pub enum Commands {
    /// Update machine types once, as configured by the environment (default)
    Run(run::RunArgs),
    /// Resolve the environment configuration without contacting the cluster
    Validate,
}
