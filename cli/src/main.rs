use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use eduverse::api::{HttpQuizService, QuizService, decode_submission};
use eduverse::editor::{EditorError, QuizEditor};
use eduverse::error::{AppError, AppResult, run_with_error_handler};
use eduverse::quiz::{Question, QuizDraft, Scope, canonicalize, validate_quiz};
use eduverse::review::SubmissionReview;
use eduverse::{Config, setup_trace};

#[derive(Parser, Debug)]
#[command(about = "Author, check and review Eduverse quizzes", long_about = None)]
pub struct Cli {
    /// Read ./config.toml instead of the user config
    #[arg(long, global = true)]
    pub local: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a quiz file and print the answers that would be saved
    Validate { file: PathBuf },

    /// Create a quiz from a file, or replace an existing one
    Push {
        file: PathBuf,
        /// Quiz to overwrite
        #[arg(long)]
        quiz_id: Option<String>,
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// List the quizzes of a course, module or lesson
    List {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Print a quiz as an editable file
    Show {
        quiz_id: String,
        #[arg(long, default_value_t = false)]
        answers: bool,
    },

    /// Delete a quiz
    Delete {
        quiz_id: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Print a graded submission
    Review { file: PathBuf },
}

/// The most specific id given wins.
#[derive(Args, Debug)]
pub struct ScopeArgs {
    #[arg(long)]
    course: Option<String>,
    #[arg(long)]
    module: Option<String>,
    #[arg(long)]
    lesson: Option<String>,
}

impl ScopeArgs {
    fn scope(&self) -> AppResult<Scope> {
        Scope::most_specific(
            self.course.as_deref(),
            self.module.as_deref(),
            self.lesson.as_deref(),
        )
        .ok_or(AppError::MissingScope)
    }
}

fn read_draft(file: &Path) -> AppResult<QuizDraft> {
    let bytes = std::fs::read(file)?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn service(local: bool) -> AppResult<HttpQuizService> {
    let config = Config::get_or_init(local || cfg!(debug_assertions)).await;
    Ok(HttpQuizService::from_config(config)?)
}

#[tracing::instrument]
async fn run() -> AppResult<()> {
    setup_trace();
    let args = Cli::parse();

    match args.command {
        Commands::Validate { file } => {
            let draft = read_draft(&file)?;
            let errors = validate_quiz(&draft.info, draft.questions());
            if !errors.is_empty() {
                for (field, message) in errors.iter() {
                    println!("{}: {message}", field.as_str());
                }
                return Err(EditorError::Validation(errors).into());
            }

            for (index, question) in draft.questions().iter().enumerate() {
                let answers = canonicalize(question).map(|c| c.into_answers()).unwrap_or_default();
                println!("{}. {} -> {:?}", index + 1, question.text(), answers);
            }
            println!("ok");
        }

        Commands::Push { file, quiz_id, scope } => {
            let draft = read_draft(&file)?;
            let mut editor = QuizEditor::new(service(args.local).await?, scope.scope()?);

            match &quiz_id {
                Some(quiz_id) => editor.select_quiz(quiz_id).await?,
                None => editor.new_quiz()?,
            }

            let loaded: Vec<_> = editor.draft().questions().iter().map(Question::id).collect();
            for id in loaded {
                editor.delete_question(id)?;
            }
            *editor.info_mut()? = draft.info.clone();
            for question in draft.questions() {
                editor.add_question(question.clone())?;
            }

            let outcome = editor.save().await?;
            let verb = if outcome.created { "created" } else { "updated" };
            println!("Quiz {verb}: {}", outcome.quiz_id.as_deref().unwrap_or("<no id returned>"));
            if !outcome.list_reloaded {
                tracing::warn!("quiz list could not be reloaded");
            }
        }

        Commands::List { scope } => {
            let mut editor = QuizEditor::new(service(args.local).await?, scope.scope()?);
            for quiz in editor.load_list().await? {
                let published = if quiz.is_published { "published" } else { "draft" };
                println!("{}  {}  ({published}, {} questions)", quiz.id, quiz.title, quiz.question_count);
            }
        }

        Commands::Show { quiz_id, answers } => {
            let quiz = service(args.local).await?.get_quiz(&quiz_id, answers).await?;
            let draft = QuizDraft::from(quiz);
            println!("{}", serde_json::to_string_pretty(&draft)?);
        }

        Commands::Delete { quiz_id, scope } => {
            let mut editor = QuizEditor::new(service(args.local).await?, scope.scope()?);
            let outcome = editor.delete_quiz(&quiz_id).await?;
            println!("Quiz deleted: {quiz_id}");
            if !outcome.list_reloaded {
                tracing::warn!("quiz list could not be reloaded");
            }
        }

        Commands::Review { file } => {
            let bytes = std::fs::read(&file)?;
            let submission = decode_submission(serde_json::from_slice(&bytes)?)?;
            print!("{}", SubmissionReview::from_submission(&submission));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    run_with_error_handler(run).await;
}
