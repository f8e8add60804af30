use anyhow::{ensure, Result};
use knn_smoke::commands::{run_repeatedly, StepOutcome};
use knn_smoke::data::{Distance, Fixture, VectorArg};
use knn_smoke::elastic::Elasticsearch;
use log::{error, info, warn};
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "knn-smoke",
    about = "Smoke tests an Elasticsearch cluster running the elastiknn plugin"
)]
struct Args {
    #[structopt(flatten)]
    elastic: ElasticOpts,

    #[structopt(flatten)]
    fixture: FixtureOpts,

    #[structopt(
        long,
        default_value = "1",
        help = "Number of times the whole sequence is run back to back"
    )]
    runs: usize,

    #[structopt(
        long,
        help = "Check the searches found exactly the indexed document after each run"
    )]
    verify: bool,

    #[structopt(long, help = "Print the step reports as JSON instead of the response bodies")]
    json: bool,
}

#[derive(StructOpt, Debug)]
struct ElasticOpts {
    #[structopt(
        long,
        env = "KS_ES_URL",
        default_value = "http://localhost:9200",
        help = "Elasticsearch instance url"
    )]
    url: String,

    #[structopt(
        long,
        default_value = "60s",
        help = "How long the cluster may take to become at least yellow"
    )]
    health_timeout: String,
}

#[derive(StructOpt, Debug)]
struct FixtureOpts {
    #[structopt(
        long,
        env = "KS_ES_INDEX",
        default_value = "elastiknn-index-01",
        help = "Index to recreate and search"
    )]
    index: String,

    #[structopt(
        long,
        env = "KS_ES_PIPELINE",
        default_value = "elastiknn-pipeline-01",
        help = "Ingest pipeline to create or replace"
    )]
    pipeline: String,

    #[structopt(
        long,
        env = "KS_ES_PROCESSOR",
        default_value = "elastiknn",
        help = "Processor id of the plugin"
    )]
    processor: String,

    #[structopt(long, default_value = "elastiknn pipeline 1")]
    pipeline_description: String,

    #[structopt(long, default_value = "vec_raw", help = "Field holding the raw vector")]
    field_raw: String,

    #[structopt(
        long,
        default_value = "vec_proc",
        help = "Field the processor writes the processed vector to"
    )]
    field_processed: String,

    #[structopt(long, default_value = "2")]
    dimension: usize,

    #[structopt(
        long,
        default_value = "0.0,0.11",
        help = "Comma separated components of the indexed vector"
    )]
    doc_vector: VectorArg,

    #[structopt(
        long,
        default_value = "0.11,0.22",
        help = "Comma separated components of the query vector"
    )]
    query_vector: VectorArg,

    #[structopt(short, long, default_value = "2", help = "Number of neighbors to search")]
    k: usize,

    #[structopt(
        long,
        help = "Distance used by the exact query",
        possible_values = &Distance::variants(),
        case_insensitive = true,
        default_value = "angular"
    )]
    distance: Distance,
}

impl FixtureOpts {
    fn into_fixture(self, health_timeout: String) -> Fixture {
        Fixture {
            index: self.index,
            pipeline: self.pipeline,
            processor: self.processor,
            pipeline_description: self.pipeline_description,
            field_raw: self.field_raw,
            field_processed: self.field_processed,
            dimension: self.dimension,
            doc_vector: self.doc_vector.0,
            query_vector: self.query_vector.0,
            k: self.k,
            distance: self.distance,
            health_timeout,
        }
    }
}

fn print_outcome(outcome: &StepOutcome) {
    if !outcome.step.is_inspected() {
        return;
    }

    println!("{}", outcome.status.as_u16());
    if let Some(body) = &outcome.body {
        match serde_json::to_string_pretty(body) {
            Ok(pretty) => println!("{}", pretty),
            Err(e) => warn!("Could not print {} response: {}", outcome.step, e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::from_args();
    ensure!(args.runs > 0, "--runs must be at least 1");

    let fixture = args.fixture.into_fixture(args.elastic.health_timeout);
    let es = Elasticsearch::new(&args.elastic.url)?;

    info!("Running against {}", args.elastic.url);
    let (reports, result) = if args.json {
        run_repeatedly(&es, &fixture, args.runs, args.verify, |_| ()).await
    } else {
        run_repeatedly(&es, &fixture, args.runs, args.verify, print_outcome).await
    };

    // a failed run is reported up to its failing step
    if args.json {
        println!("{}", serde_json::to_string(&reports)?);
    }

    if let Err(e) = result {
        error!("{}", e);
        return Err(e.into());
    }

    if !args.json {
        println!("done");
    }
    Ok(())
}
