use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use interview_quiz::configuration::Settings;
use interview_quiz::inference::{BackendClient, ModelProfile};
use interview_quiz::quiz::{score, Difficulty, Quiz, QuizQuestion, QuizRequest, UserAnswerSet};
use interview_quiz::telemetry::init_tracing;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a quiz and print it as JSON
    Generate(QuizArgs),
    /// Generate a quiz and take it in the terminal
    Take(QuizArgs),
    /// List the models served by the inference backend
    Status,
}

#[derive(Args)]
struct QuizArgs {
    /// Quiz topic
    #[clap(long)]
    topic: String,
    /// One of easy, medium, hard
    #[clap(long, default_value = "easy")]
    difficulty: Difficulty,
    /// Use the lighter model with a smaller output budget
    #[clap(long)]
    fast: bool,
}

impl QuizArgs {
    fn request(&self) -> anyhow::Result<(QuizRequest, ModelProfile)> {
        let request = QuizRequest::new(&self.topic, self.difficulty).map_err(anyhow::Error::msg)?;
        let profile = if self.fast {
            ModelProfile::Fast
        } else {
            ModelProfile::Full
        };
        Ok((request, profile))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load configuration")?;
    let backend =
        BackendClient::new(&settings.backend).context("Failed to build backend HTTP client")?;

    match cli.command {
        Commands::Generate(args) => {
            let (request, profile) = args.request()?;
            let quiz = backend.generate_quiz(&request, profile).await?;
            println!("{}", serde_json::to_string_pretty(&quiz)?);
        }
        Commands::Take(args) => {
            let (request, profile) = args.request()?;
            println!("Generating your quiz on {}...", request.topic());
            let quiz = backend.generate_quiz(&request, profile).await?;
            take_quiz(&quiz).await?;
        }
        Commands::Status => {
            let models = backend.list_models().await?;
            println!("{}", serde_json::to_string_pretty(&models)?);
        }
    }
    Ok(())
}

async fn take_quiz(quiz: &Quiz) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut answers = UserAnswerSet::new();

    for (index, question) in quiz.questions().iter().enumerate() {
        println!("\n{}. {}", index + 1, question.question);
        for (n, option) in question.options.iter().enumerate() {
            println!("   {}) {option}", n + 1);
        }
        if let Some(choice) = read_choice(&mut lines, question).await? {
            answers.select(index, choice);
        }
    }

    println!();
    for (index, question) in quiz.questions().iter().enumerate() {
        let correct = answers
            .get(index)
            .is_some_and(|given| question.is_correct(given));
        if correct {
            println!("{}. Correct", index + 1);
        } else {
            println!("{}. Correct Answer: {}", index + 1, question.answer);
        }
        if let Some(explanation) = &question.explanation {
            println!("   Explanation: {explanation}");
        }
    }
    println!(
        "\nYou scored {} / {}!",
        score(quiz.questions(), &answers),
        quiz.len()
    );
    Ok(())
}

// accepts the option number or its text; an empty line skips the question
async fn read_choice(
    lines: &mut Lines<BufReader<Stdin>>,
    question: &QuizQuestion,
) -> anyhow::Result<Option<String>> {
    loop {
        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        match resolve_choice(line, question) {
            Some(choice) => return Ok(Some(choice)),
            None => println!("Pick a number between 1 and {}", question.options.len()),
        }
    }
}

// option text wins over numbering, so an option like "1945" can be typed as-is
fn resolve_choice(input: &str, question: &QuizQuestion) -> Option<String> {
    if let Some(option) = question
        .options
        .iter()
        .find(|option| option.trim().eq_ignore_ascii_case(input))
    {
        return Some(option.clone());
    }
    match input.parse::<usize>() {
        Ok(n) => question.options.get(n.wrapping_sub(1)).cloned(),
        Err(_) => Some(input.to_owned()),
    }
}
