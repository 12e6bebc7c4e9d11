use kubevirt_job_core::config::UpdaterConfig;
use kubevirt_job_core::env::ProcessEnv;

pub fn execute() -> anyhow::Result<()> {
    println!("Validating environment...");

    match UpdaterConfig::from_env(&ProcessEnv) {
        Ok(config) => {
            println!("{config}");
            println!();
            println!("Validation PASSED");
            Ok(())
        }
        Err(e) => {
            println!();
            println!("Validation FAILED: {e}");
            std::process::exit(1);
        }
    }
}
