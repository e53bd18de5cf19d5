//! Prompt text for answer validation.

/// System prompt for a plain question.
pub const VALIDATION_SYSTEM_PROMPT: &str = "Every prompt will begin with the text \"Question:\" \
followed by the question enclosed in triple backticks. The text \"Output Format:\" explains how \
the Question must be answered. You are an AI that reads the Question enclosed in triple backticks \
and provides the answer in the mentioned Output Format.";

/// System prompt when annotator steps accompany the question.
pub const ANNOTATED_SYSTEM_PROMPT: &str = "Every prompt will begin with the text \"Question:\" \
followed by the question enclosed in triple backticks. The \"Annotator Steps:\" mentions the \
steps that you should take for answering the question. The text \"Output Format:\" explains how \
the Question output must be formatted. You are an AI that reads the Question enclosed in triple \
backticks and follows the Annotator Steps and provides the answer in the mentioned Output Format.";

pub const OUTPUT_FORMAT: &str = "Provide a clear and conclusive answer to the Question being \
asked. Do not provide any reasoning or references for your answer.";

/// System prompt matching whether `steps` will be sent.
pub fn system_prompt(steps: &[String]) -> &'static str {
    if steps.is_empty() {
        VALIDATION_SYSTEM_PROMPT
    } else {
        ANNOTATED_SYSTEM_PROMPT
    }
}

pub fn format_user_content(question: &str, steps: &[String]) -> String {
    if steps.is_empty() {
        format!("Question: ```{question}```\nOutput Format: {OUTPUT_FORMAT}\n")
    } else {
        format!(
            "Question: ```{question}```\nAnnotator Steps: {}\nOutput Format: {OUTPUT_FORMAT}\n",
            steps.join("\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_question_layout() {
        let content = format_user_content("What is 6 x 7?", &[]);
        assert_eq!(
            content,
            format!("Question: ```What is 6 x 7?```\nOutput Format: {OUTPUT_FORMAT}\n")
        );
        assert_eq!(system_prompt(&[]), VALIDATION_SYSTEM_PROMPT);
    }

    #[test]
    fn steps_are_joined_by_newline() {
        let steps = vec!["1. Multiply".to_string(), "2. Report".to_string()];
        let content = format_user_content("What is 6 x 7?", &steps);
        assert!(content.contains("Annotator Steps: 1. Multiply\n2. Report\nOutput Format:"));
        assert_eq!(system_prompt(&steps), ANNOTATED_SYSTEM_PROMPT);
    }
}
