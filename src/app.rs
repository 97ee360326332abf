//! The two command flows and the text they print

use log::{debug, warn};
use crate::client::{pair_answers, AnswerPairing, PromptCompletionClient};
use crate::error::{Error, Result, FAILURE_SENTINEL};
use crate::prompt::{title_extraction_prompt, PromptTemplate};
use crate::resources::ResourceDir;

pub const GOAL_FILE: &str = "goal.txt";
pub const CONSTRAINTS_FILE: &str = "constraints.txt";
pub const STEPS_FILE: &str = "steps.txt";
pub const QUESTIONS_FILE: &str = "questions.txt";

/// `N. answer`, 1-indexed
pub fn format_answers(answers: &[String]) -> Vec<String>
{   answers.iter()
      .enumerate()
      .map(|(i, a)| format!("{}. {}", i + 1, a))
      .collect()
}

/// What a failed run prints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport
{   pub stderr: String
  , pub stdout: String
}

pub fn failure_report(err: &Error) -> FailureReport
{   FailureReport
    {   stderr: format!("Error: {}", err)
      , stdout: FAILURE_SENTINEL.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleOutcome
{   pub prompt: String
  , pub title: String
}

impl TitleOutcome
{   pub fn stdout_lines(&self) -> Vec<String>
    {   vec![self.prompt.clone(), String::new(), self.title.clone()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionsOutcome
{   pub prompt: String
  , pub answers: Vec<String>
  , pub pairing: AnswerPairing
}

impl QuestionsOutcome
{   pub fn stdout_lines(&self) -> Vec<String>
    {   let mut lines = vec![self.prompt.clone()];
        lines.extend(format_answers(&self.answers));
        lines
    }
}

pub async fn run_title(client: &PromptCompletionClient, text: &str)
  -> Result<TitleOutcome>
{   debug!("Extracting title with model {}", client.config().model);
    let prompt = title_extraction_prompt(text);
    let title = client.complete_text(&prompt).await?;
    Ok(TitleOutcome { prompt, title })
}

/// Template from the goal/constraints/steps fragments plus the
/// questions, and the questions themselves
pub fn questions_template(dir: &ResourceDir)
  -> Result<(PromptTemplate, Vec<String>)>
{   let questions = dir.load_lines(QUESTIONS_FILE)?;
    let template = PromptTemplate::new()
      .section("goal", dir.load(GOAL_FILE)?)
      .section("constraints", dir.load(CONSTRAINTS_FILE)?)
      .section("steps", dir.load(STEPS_FILE)?)
      .variables(questions.iter().cloned());
    Ok((template, questions))
}

pub async fn run_questions(
  client: &PromptCompletionClient
, dir: &ResourceDir
) -> Result<QuestionsOutcome>
{   let (template, questions) = questions_template(dir)?;
    let prompt = template.build();
    debug!(
      "Titling {} questions with model {}",
      questions.len(),
      client.config().model
    );

    let answers = client.send_completion(&prompt).await?;
    let pairing = pair_answers(&questions, &answers);
    if !pairing.is_complete()
    {   warn!(
          "Got {} answers for {} questions ({} missing, {} extra)",
          answers.len(),
          questions.len(),
          pairing.missing_count(),
          pairing.unmatched_answers.len()
        );
    }

    Ok(QuestionsOutcome
    {   prompt
      , answers
      , pairing
    })
}
