//! Interview session rules and the two LLM calls (question generation, answer feedback).

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::interview::prompts::{COACH_PERSONA, FEEDBACK_PROMPT, QUESTIONS_PROMPT};
use crate::llm_client::prompts::json_system;
use crate::llm_client::{render_prompt, LlmClient};

pub const DEFAULT_QUESTION_COUNT: u32 = 5;
pub const MAX_QUESTION_COUNT: u32 = 10;
pub const MAX_ANSWER_LEN: usize = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewType {
    Behavioral,
    Technical,
    CaseStudy,
    General,
}

impl InterviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewType::Behavioral => "behavioral",
            InterviewType::Technical => "technical",
            InterviewType::CaseStudy => "case_study",
            InterviewType::General => "general",
        }
    }

    fn prompt_label(&self) -> &'static str {
        match self {
            InterviewType::CaseStudy => "case study",
            other => other.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub question: String,
    pub focus: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub answer: String,
    pub feedback: String,
    pub score: u8,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GeneratedQuestions {
    questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
    #[serde(default)]
    pub focus: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerFeedback {
    pub feedback: String,
    pub score: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
}

pub fn validate_question_count(requested: Option<u32>) -> Result<u32, AppError> {
    let count = requested.unwrap_or(DEFAULT_QUESTION_COUNT);
    if !(1..=MAX_QUESTION_COUNT).contains(&count) {
        return Err(AppError::Validation(format!(
            "question_count must be between 1 and {MAX_QUESTION_COUNT}"
        )));
    }
    Ok(count)
}

/// Assigns ids `q1..qN`, drops blank questions and truncates to `count`.
pub fn number_questions(generated: Vec<GeneratedQuestion>, count: u32) -> Vec<Question> {
    generated
        .into_iter()
        .filter(|q| !q.question.trim().is_empty())
        .take(count as usize)
        .enumerate()
        .map(|(i, q)| Question {
            id: format!("q{}", i + 1),
            question: q.question.trim().to_string(),
            focus: q.focus.trim().to_string(),
        })
        .collect()
}

pub fn validate_answer_text(answer: &str) -> Result<&str, AppError> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(AppError::Validation("answer cannot be empty".to_string()));
    }
    if answer.chars().count() > MAX_ANSWER_LEN {
        return Err(AppError::Validation(format!(
            "answer must be at most {MAX_ANSWER_LEN} characters"
        )));
    }
    Ok(answer)
}

pub fn find_question<'a>(questions: &'a [Question], question_id: &str) -> Result<&'a Question, AppError> {
    questions
        .iter()
        .find(|q| q.id == question_id)
        .ok_or_else(|| AppError::Validation(format!("Unknown question_id '{question_id}'")))
}

pub fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 1;
    }
    raw.round().clamp(1.0, 10.0) as u8
}

/// A re-answer replaces the earlier answer to the same question.
pub fn upsert_answer(mut answers: Vec<Answer>, answer: Answer) -> Vec<Answer> {
    answers.retain(|a| a.question_id != answer.question_id);
    answers.push(answer);
    answers
}

/// Mean answer score on a 0–100 scale; `None` when nothing was answered.
pub fn overall_score(answers: &[Answer]) -> Option<i32> {
    if answers.is_empty() {
        return None;
    }
    let sum: u32 = answers.iter().map(|a| u32::from(a.score)).sum();
    Some(((sum as f64 / answers.len() as f64) * 10.0).round() as i32)
}

pub async fn generate_questions(
    llm: &LlmClient,
    interview_type: InterviewType,
    role: &str,
    company: Option<&str>,
    job_description: Option<&str>,
    count: u32,
) -> Result<Vec<Question>, AppError> {
    let count_str = count.to_string();
    let prompt = render_prompt(
        QUESTIONS_PROMPT,
        &[
            ("count", &count_str),
            ("interview_type", interview_type.prompt_label()),
            ("role", role),
            ("company", company.unwrap_or("not specified")),
            ("job_description", job_description.unwrap_or("")),
        ],
    );

    let generated: GeneratedQuestions = llm
        .call_json(&prompt, &json_system(COACH_PERSONA))
        .await
        .map_err(|e| AppError::Llm(format!("Question generation failed: {e}")))?;

    let questions = number_questions(generated.questions, count);
    if questions.is_empty() {
        return Err(AppError::Llm("Question generation returned no questions".to_string()));
    }
    Ok(questions)
}

pub async fn evaluate_answer(
    llm: &LlmClient,
    interview_type: InterviewType,
    role: &str,
    question: &Question,
    answer: &str,
) -> Result<Answer, AppError> {
    let prompt = render_prompt(
        FEEDBACK_PROMPT,
        &[
            ("interview_type", interview_type.prompt_label()),
            ("role", role),
            ("question", &question.question),
            ("focus", &question.focus),
            ("answer", answer),
        ],
    );

    let feedback: AnswerFeedback = llm
        .call_json(&prompt, &json_system(COACH_PERSONA))
        .await
        .map_err(|e| AppError::Llm(format!("Answer evaluation failed: {e}")))?;

    Ok(Answer {
        question_id: question.id.clone(),
        answer: answer.to_string(),
        feedback: feedback.feedback,
        score: clamp_score(feedback.score),
        strengths: feedback.strengths,
        improvements: feedback.improvements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(question_id: &str, score: u8) -> Answer {
        Answer {
            question_id: question_id.into(),
            answer: "I did X".into(),
            feedback: "ok".into(),
            score,
            strengths: vec![],
            improvements: vec![],
        }
    }

    #[test]
    fn test_question_count_bounds() {
        assert_eq!(validate_question_count(None).unwrap(), DEFAULT_QUESTION_COUNT);
        assert_eq!(validate_question_count(Some(10)).unwrap(), 10);
        assert!(validate_question_count(Some(0)).is_err());
        assert!(validate_question_count(Some(11)).is_err());
    }

    #[test]
    fn test_number_questions_assigns_ids_and_truncates() {
        let generated = vec![
            GeneratedQuestion { question: "First?".into(), focus: "a".into() },
            GeneratedQuestion { question: "   ".into(), focus: "blank".into() },
            GeneratedQuestion { question: "Second?".into(), focus: "b".into() },
            GeneratedQuestion { question: "Third?".into(), focus: "c".into() },
        ];
        let questions = number_questions(generated, 2);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, "q1");
        assert_eq!(questions[1].id, "q2");
        assert_eq!(questions[1].question, "Second?");
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(7.4), 7);
        assert_eq!(clamp_score(0.0), 1);
        assert_eq!(clamp_score(42.0), 10);
        assert_eq!(clamp_score(f64::NAN), 1);
    }

    #[test]
    fn test_upsert_replaces_previous_answer() {
        let answers = vec![answer("q1", 4), answer("q2", 6)];
        let answers = upsert_answer(answers, answer("q1", 9));
        assert_eq!(answers.len(), 2);
        assert_eq!(answers.iter().find(|a| a.question_id == "q1").unwrap().score, 9);
    }

    #[test]
    fn test_overall_score_is_mean_times_ten() {
        assert_eq!(overall_score(&[]), None);
        assert_eq!(overall_score(&[answer("q1", 7), answer("q2", 8)]), Some(75));
        assert_eq!(overall_score(&[answer("q1", 10)]), Some(100));
    }

    #[test]
    fn test_answer_text_validation() {
        assert!(validate_answer_text("  ").is_err());
        assert!(validate_answer_text(&"a".repeat(MAX_ANSWER_LEN + 1)).is_err());
        assert_eq!(validate_answer_text("  My answer ").unwrap(), "My answer");
    }

    #[test]
    fn test_find_question_unknown_id() {
        let questions = vec![Question {
            id: "q1".into(),
            question: "Why us?".into(),
            focus: "motivation".into(),
        }];
        assert!(find_question(&questions, "q1").is_ok());
        assert!(matches!(find_question(&questions, "q9"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_interview_type_serde() {
        let t: InterviewType = serde_json::from_str("\"case_study\"").unwrap();
        assert_eq!(t, InterviewType::CaseStudy);
        assert_eq!(t.prompt_label(), "case study");
    }
}
