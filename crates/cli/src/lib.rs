pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;
use synthai_core::domain::DescriptorRequest;

#[derive(Debug, Parser)]
#[command(
    name = "synthai",
    about = "SynthAI operator CLI",
    long_about = "Price project descriptors, exercise the conversation dispatcher, retrain the pricing model and inspect configuration.",
    after_help = "Examples:\n  synthai estimate --project-type web --complexity simple --timeline flexible --team-size solo --description \"Landing page\"\n  synthai chat --sender +27820000001 \"how much does a website cost?\"\n  synthai train-model\n  synthai config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Price a project descriptor and print the estimate with recommendations")]
    Estimate(EstimateArgs),
    #[command(about = "Send one message through the intent dispatcher")]
    Chat {
        #[arg(long, help = "Sender identifier, e.g. a phone number")]
        sender: String,
        #[arg(help = "Message text")]
        message: String,
    },
    #[command(about = "Train the pricing model from the rule tables and store the artifact")]
    TrainModel,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

#[derive(Debug, Args)]
struct EstimateArgs {
    #[arg(long)]
    project_type: String,
    #[arg(long)]
    complexity: String,
    #[arg(long)]
    timeline: String,
    #[arg(long)]
    team_size: String,
    #[arg(long)]
    description: String,
    #[arg(long, help = "Also request advisory notes from the configured text generator")]
    advise: bool,
}

impl EstimateArgs {
    fn into_request(self) -> (DescriptorRequest, bool) {
        let request = DescriptorRequest {
            description: Some(self.description),
            project_type: Some(self.project_type),
            complexity: Some(self.complexity),
            timeline: Some(self.timeline),
            team_size: Some(self.team_size),
        };
        (request, self.advise)
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Estimate(args) => {
            let (request, advise) = args.into_request();
            commands::estimate::run(request, advise)
        }
        Command::Chat { sender, message } => commands::chat::run(&sender, &message),
        Command::TrainModel => commands::train_model::run(),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
