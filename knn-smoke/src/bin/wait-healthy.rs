use anyhow::{bail, Result};
use knn_smoke::commands::Step;
use knn_smoke::elastic::Elasticsearch;
use log::info;
use structopt::StructOpt;

/// Blocks until the cluster reports at least yellow, the precondition of
/// `knn-smoke`
#[derive(StructOpt, Debug)]
#[structopt(name = "wait-healthy")]
struct Args {
    #[structopt(
        long,
        env = "KS_ES_URL",
        default_value = "http://localhost:9200",
        help = "Elasticsearch instance url"
    )]
    url: String,

    #[structopt(long, default_value = "60s")]
    health_timeout: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::from_args();
    let es = Elasticsearch::new(&args.url)?;

    let response = es.wait_for_health(&args.health_timeout).await?;
    if !Step::Health.check().accepts(response.status) {
        bail!(
            "Cluster at {} did not become healthy within {}: {}",
            args.url,
            args.health_timeout,
            response.status
        );
    }

    let status = response
        .body
        .as_ref()
        .and_then(|body| body.get("status"))
        .and_then(|status| status.as_str())
        .unwrap_or("unknown");
    info!("Cluster at {} is {}", args.url, status);
    println!("{}", status);

    Ok(())
}
