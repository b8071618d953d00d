//! Interactive diagnosis in the terminal
//!
//! Runs a refinement session in-process: the initial symptoms come from the
//! command line and each follow-up question is a yes/no prompt.

use anyhow::{Result, bail};
use clap::Args;
use dialoguer::{Confirm, theme::ColorfulTheme};
use lifeline_core::{Answer, RefinementEngine, RefinementResult, Symptom, SymptomVocabulary};
use tracing::debug;

use crate::components::build_engine;
use crate::config::ConfigLoader;

#[derive(Debug, Args)]
pub struct DiagnoseArgs {
    /// Symptoms to start from (e.g. high_fever cough)
    #[arg(required_unless_present = "list")]
    pub symptoms: Vec<String>,

    /// User the diagnosis is recorded for
    #[arg(short, long, default_value = "local")]
    pub user: String,

    /// List the symptoms the classifier understands and exit
    #[arg(long)]
    pub list: bool,
}

pub async fn run(args: DiagnoseArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let engine = build_engine(&config)?;
    let vocabulary = SymptomVocabulary::new(engine.classifier().vocabulary().await?);

    if args.list {
        for symptom in vocabulary.symptoms() {
            println!("{:<32} {}", symptom.as_str(), symptom.label());
        }
        return Ok(());
    }

    let result = run_session(&engine, &vocabulary, &args.user, &args.symptoms, |question| {
        let prompt = format!("Do you have {}?", question.label());
        let confirmed = tokio::task::block_in_place(|| {
            Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .default(false)
                .interact()
        })?;
        Ok(confirmed)
    })
    .await?;

    println!();
    println!("{}", render_result(&result));
    Ok(())
}

/// Drive one session to a terminal result, asking each question through `ask`
pub async fn run_session<F>(
    engine: &RefinementEngine,
    vocabulary: &SymptomVocabulary,
    user_id: &str,
    submitted: &[String],
    mut ask: F,
) -> Result<RefinementResult>
where
    F: FnMut(&Symptom) -> Result<bool>,
{
    let symptoms = vocabulary.filter(submitted.iter().map(String::as_str));
    if symptoms.is_empty() {
        bail!("none of the given symptoms are recognized; see `lifeline diagnose --list`");
    }

    let mut reply = engine.start_session(user_id, symptoms).await?;
    loop {
        let RefinementResult::NeedsMoreInfo { question, .. } = &reply.result else {
            return Ok(reply.result);
        };

        println!("{}", render_result(&reply.result));
        let answer = Answer::from(ask(question)?);
        debug!(session_id = %reply.session_id, question = %question, ?answer, "Answering");
        reply = engine.answer_question(&reply.session_id, answer).await?;
    }
}

/// Human-readable rendering of a result
pub fn render_result(result: &RefinementResult) -> String {
    match result {
        RefinementResult::NeedsMoreInfo {
            candidates,
            round,
            max_rounds,
            ..
        } => {
            let names: Vec<_> = candidates.iter().map(|c| c.name.as_str()).collect();
            format!(
                "Question {} of {} (possible: {})",
                round,
                max_rounds,
                names.join(", ")
            )
        }
        RefinementResult::Concluded { diagnosis } => format!("Diagnosis: {}", diagnosis),
        RefinementResult::Escalated { best_guess, notice } => match best_guess {
            Some(guess) => format!("{}\nClosest match: {}", notice, guess),
            None => notice.clone(),
        },
    }
}
