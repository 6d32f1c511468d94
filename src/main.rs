use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};

use student_risk_predictor::config::{
    ClientConfig, ServerConfig, DEFAULT_API_URL, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS,
};
use student_risk_predictor::presentation::{render_result, render_state};
use student_risk_predictor::scoring::round2;
use student_risk_predictor::{server, FormAdapter, PredictionClient, StudentInput, SubmitError};

#[derive(Parser)]
#[command(name = "student-risk-predictor")]
#[command(about = "Student performance prediction form and risk service", long_about = None)]
struct Cli {
    /// Base URL of the prediction service
    #[arg(long, global = true, env = "PREDICT_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
    /// Give up on a request after this many seconds
    #[arg(long, global = true, env = "PREDICT_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the prediction service
    Serve {
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
        #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Fill in the form for one student and ask for a prediction
    Predict {
        #[command(flatten)]
        student: StudentArgs,
        /// Print the raw prediction as JSON
        #[arg(long)]
        json: bool,
    },
    /// Submit every row of a CSV file (headers use the form field names)
    Batch {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Check that the prediction service is up
    Health,
    /// List stored predictions, or the one for a roll number
    Records {
        #[arg(long)]
        roll: Option<String>,
    },
    /// Show the risk distribution across stored predictions
    Stats,
}

#[derive(Args)]
struct StudentArgs {
    #[arg(long)]
    student_name: String,
    #[arg(long)]
    roll_number: String,
    #[arg(long)]
    attendance: String,
    #[arg(long)]
    mid_sem1: String,
    #[arg(long)]
    mid_sem2: String,
    #[arg(long)]
    assignments: String,
    #[arg(long)]
    quizzes: String,
    #[arg(long)]
    lab_work: String,
    #[arg(long)]
    extracurricular: String,
}

impl From<StudentArgs> for StudentInput {
    fn from(args: StudentArgs) -> Self {
        StudentInput {
            student_name: args.student_name,
            roll_number: args.roll_number,
            attendance: args.attendance,
            mid_sem1: args.mid_sem1,
            mid_sem2: args.mid_sem2,
            assignments: args.assignments,
            quizzes: args.quizzes,
            lab_work: args.lab_work,
            extracurricular: args.extracurricular,
        }
    }
}

fn describe(err: &SubmitError) -> String {
    match err {
        SubmitError::Request(request) => request.user_message().to_string(),
        other => other.to_string(),
    }
}

async fn predict_one(config: ClientConfig, input: StudentInput, json: bool) -> anyhow::Result<()> {
    let mut adapter = FormAdapter::new(PredictionClient::new(config));
    adapter.fill(&input);

    match adapter.submit().await {
        Ok(result) if json => println!("{}", serde_json::to_string_pretty(&result)?),
        Ok(result) => print!("{}", render_result(&result)),
        Err(SubmitError::Request(_)) => {
            eprint!("{}", render_state(adapter.state()));
            bail!("prediction request failed");
        }
        Err(err) => return Err(err).context("form input rejected"),
    }
    Ok(())
}

async fn predict_batch(config: ClientConfig, csv: PathBuf) -> anyhow::Result<()> {
    let mut reader = csv::Reader::from_path(&csv)
        .with_context(|| format!("failed to open {}", csv.display()))?;
    let mut adapter = FormAdapter::new(PredictionClient::new(config));

    let mut distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_score = 0.0;
    let mut succeeded = 0usize;
    let mut failed = 0usize;

    for (index, row) in reader.deserialize::<StudentInput>().enumerate() {
        let input = row.with_context(|| format!("invalid CSV row {}", index + 1))?;
        adapter.reset();
        adapter.fill(&input);

        match adapter.submit().await {
            Ok(result) => {
                println!(
                    "- {} ({}) {} score {}",
                    input.student_name, input.roll_number, result.risk_level, result.score
                );
                *distribution.entry(result.risk_level.to_string()).or_insert(0) += 1;
                total_score += result.score;
                succeeded += 1;
            }
            Err(err) => {
                println!(
                    "- {} ({}) failed: {}",
                    input.student_name,
                    input.roll_number,
                    describe(&err)
                );
                failed += 1;
            }
        }
    }

    println!();
    println!("Processed {} students: {succeeded} predicted, {failed} failed.", succeeded + failed);
    if succeeded > 0 {
        println!("Average score: {}", round2(total_score / succeeded as f64));
        for (level, count) in &distribution {
            println!("  {level}: {count}");
        }
    }
    Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let client_config = ClientConfig::new(cli.api_url, Duration::from_secs(cli.timeout_secs));

    match cli.command {
        Commands::Serve {
            host,
            port,
            workers,
        } => {
            server::run(ServerConfig {
                host,
                port,
                workers,
            })
            .await
            .context("prediction service stopped with an error")?;
        }
        Commands::Predict { student, json } => {
            predict_one(client_config, student.into(), json).await?;
        }
        Commands::Batch { csv } => {
            predict_batch(client_config, csv).await?;
        }
        Commands::Health => {
            let health = PredictionClient::new(client_config)
                .health()
                .await
                .context("health check failed")?;
            println!("{}: {} ({})", health.status, health.message, health.timestamp);
        }
        Commands::Records { roll } => {
            let client = PredictionClient::new(client_config);
            match roll {
                Some(roll) => {
                    let record = client
                        .record(&roll)
                        .await
                        .with_context(|| format!("no prediction found for {roll}"))?;
                    println!("{} ({}) at {}", record.student_name, record.roll_number, record.timestamp);
                    print!("{}", render_result(&record.prediction));
                }
                None => {
                    let records = client.records().await.context("failed to list predictions")?;
                    if records.total == 0 {
                        println!("No predictions recorded yet.");
                        return Ok(());
                    }
                    println!("{} predictions:", records.total);
                    for record in &records.records {
                        println!(
                            "- {} ({}) {} score {} at {}",
                            record.student_name,
                            record.roll_number,
                            record.prediction.risk_level,
                            record.prediction.score,
                            record.timestamp
                        );
                    }
                }
            }
        }
        Commands::Stats => {
            let stats = PredictionClient::new(client_config)
                .statistics()
                .await
                .context("failed to load statistics")?;
            println!("Total predictions: {}", stats.total_predictions);
            println!("Average score: {}", stats.average_score);
            for (level, count) in &stats.risk_distribution {
                println!("  {level}: {count}");
            }
        }
    }

    Ok(())
}
