use frame_probe_runner::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ProbeResult<()> {
    let cli = init();
    let config = RunConfig::from(cli);

    let report = run(&config).await?;

    if report.summary.pass {
        log::info!("Smoke test passed");
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "Smoke test failed, see the report in {}",
            config.reports_dir.display()
        ))
    }
}
