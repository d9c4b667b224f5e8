//! Review transcript of a session, rebuilt from persisted data only.

use std::collections::{BTreeMap, HashMap};

use crate::{
    engine::score::resolve_latest,
    error::AppError,
    models::{
        exam::{AnswerRecord, ExamSession, ReviewItem},
        question::{Explanation, ExplanationMap, ExplanationText, Question},
    },
    store::QuestionBank,
};

/// One review row per question ref, in presentation order.
///
/// Questions that are no longer in the bank are skipped.
pub async fn build_review<B>(
    session: &ExamSession,
    log: &[AnswerRecord],
    bank: &B,
) -> Result<Vec<ReviewItem>, AppError>
where
    B: QuestionBank + ?Sized,
{
    let ids: Vec<String> = session.questions.iter().map(|r| r.question_id.clone()).collect();
    let questions: HashMap<String, Question> = bank
        .find_questions(&ids)
        .await?
        .into_iter()
        .map(|q| (q.id.clone(), q))
        .collect();
    let latest = resolve_latest(log);

    let mut items = Vec::with_capacity(session.questions.len());
    for question_ref in &session.questions {
        let Some(question) = questions.get(&question_ref.question_id) else {
            tracing::warn!(
                "Skipping question {} of exam {} in review: not in bank",
                question_ref.question_id,
                session.id
            );
            continue;
        };

        let explanations = bank.find_explanations(&question.id).await?;
        let answer = latest.get(question.id.as_str());

        items.push(ReviewItem {
            question_id: question.id.clone(),
            question_text: question.text.clone(),
            multi_select: question.multi_select,
            selected_keys: answer.map(|a| a.selected.clone()).unwrap_or_default(),
            correct_keys: question.correct_keys().into_iter().collect(),
            explanations_by_language: group_by_language(&explanations),
            was_correct: answer.is_some_and(|a| a.is_correct),
        });
    }
    Ok(items)
}

fn group_by_language(explanations: &[Explanation]) -> BTreeMap<String, ExplanationMap> {
    let mut grouped: BTreeMap<String, ExplanationMap> = BTreeMap::new();
    for e in explanations {
        grouped
            .entry(e.lang.clone())
            .or_default()
            .insert(e.option_key.clone(), ExplanationText::from(e));
    }
    grouped
}
