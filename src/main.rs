use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use clap::{Parser, Subcommand};
use promptcall::app::{failure_report, run_questions, run_title};
use promptcall::config::KEY_MODE;
use promptcall::{ClientConfig, PromptCompletionClient, RequestMode
  , ResourceDir, Result};

const SAMPLE_TEXT: &str = "The Great Gatsby is a 1925 novel by American \
writer F. Scott Fitzgerald. Set in the Jazz Age on Long Island, near New \
York City, the novel depicts first-person narrator Nick Carraway's \
interactions with mysterious millionaire Jay Gatsby and Gatsby's obsession \
to reunite with his former lover, Daisy Buchanan.";

#[derive(Parser, Debug)]
#[command(name = "promptcall", version, about = "Send one prompt to a completion API and print the answer")]
struct Cli
{   /// Env file holding API_KEY and optional settings
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf
  , /// Override the request mode (chat or completion)
    #[arg(long, global = true)]
    mode: Option<RequestMode>
  , #[command(subcommand)]
    command: Command
}

#[derive(Subcommand, Debug)]
enum Command
{   /// Extract the title of a text
    Title
    {   /// Text to title; defaults to a built-in sample
        #[arg(long, conflicts_with = "file")]
        text: Option<String>
      , /// Read the text from a file instead
        #[arg(long)]
        file: Option<PathBuf>
    }
  , /// Give each question in questions.txt a title
    Questions
    {   /// Directory with goal.txt, constraints.txt, steps.txt,
        /// questions.txt
        #[arg(long, default_value = "resources")]
        resources: PathBuf
    }
}

impl Command
{   fn default_mode(&self) -> RequestMode
    {   match self
        {   Command::Title { .. } => RequestMode::Completion
          , Command::Questions { .. } => RequestMode::Chat
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("warn")
    ).init();

    let cli = Cli::parse();
    match run(cli).await
    {   Ok(lines) => {
          for line in lines
          {   println!("{}", line);
          }
          ExitCode::SUCCESS
        }
      , Err(e) => {
          let report = failure_report(&e);
          eprintln!("{}", report.stderr);
          println!("{}", report.stdout);
          ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<Vec<String>>
{   // --mode beats every source; the subcommand default comes last
    let mut overrides = HashMap::new();
    if let Some(mode) = cli.mode
    {   overrides.insert(KEY_MODE.to_string(), mode.to_string());
    }
    let mut fallbacks = HashMap::new();
    fallbacks.insert(
      KEY_MODE.to_string(),
      cli.command.default_mode().to_string()
    );

    let config = ClientConfig::from_layers(
      Some(cli.env_file.as_path()),
      &overrides,
      &fallbacks
    )?;
    let client = PromptCompletionClient::new(config)?;

    match cli.command
    {   Command::Title { text, file } => {
          let text = match (text, file)
          {   (Some(t), _) => t
            , (None, Some(path)) => read_text_file(&path)?
            , (None, None) => SAMPLE_TEXT.to_string()
          };
          Ok(run_title(&client, &text).await?.stdout_lines())
        }
      , Command::Questions { resources } => {
          let dir = ResourceDir::new(resources);
          Ok(run_questions(&client, &dir).await?.stdout_lines())
        }
    }
}

fn read_text_file(path: &Path) -> Result<String>
{   std::fs::read_to_string(path).map_err(|e| {
      promptcall::Error::ResourceNotFound(
        format!("{}: {}", path.display(), e)
      )
    })
}
