//! Prompt templates for the three LLM-calling steps.

/// Reply used whenever no answer can be produced.
pub const APOLOGY: &str = "I'm sorry, I couldn't find an answer for that.";

/// Prefix the retrieval agents put in front of a caught failure.
pub const ERROR_PREFIX: &str = "Error:";

/// Raw data handed to the synthesizer when neither agent produced any.
pub const NO_DATA: &str = "No data found.";

/// Prompt templates
pub struct Prompts;

impl Prompts {
    /// Classification prompt: answer with `document_search` or `web_search`.
    pub fn router(question: &str) -> String {
        format!(
            r#"
You are an expert router. Your job is to classify a user's question to determine the best source of information.

Your first priority is to check if the question can be answered by the private documents.
The private documents contain information about:
- Project Management principles
- Project stakeholders
- Project management methodologies
- Leadership and team management in projects

Classify the question into one of two categories:
1.  'document_search': If the question is clearly about project management, stakeholders, or related topics covered in the private documents.
2.  'web_search': For all other questions (e.g., real-time information, weather, news, public figures, general knowledge not related to the documents).

Output *only* the single word 'document_search' or 'web_search'.

Question: {question}
"#
        )
    }

    /// Retrieval-augmented answer over the retrieved chunks.
    pub fn rag(context: &str, question: &str) -> String {
        format!(
            r#"
You are a helpful assistant. Use the following context to answer the user's question.
Context: {context}
User's Question: {question}
Answer:
"#
        )
    }

    /// Turn raw agent output into the final answer.
    pub fn synthesizer(question: &str, agent_data: &str) -> String {
        format!(
            r#"
You are an expert answer synthesizer. Your job is to take a user's question
and the raw data gathered by an agent, and write a clean, helpful, final answer.

The user asked:
{question}

The agent found this raw data:
{agent_data}

Based on the raw data, provide a clear and concise answer.
If the agent data is an error message, just say "{APOLOGY}"

Also, if possible, try to extract any key relationships from the text in the format (Subject)-[Relationship]->(Object). For example: (Stakeholders)-[influence]->(Projects). List these at the end under a 'Relationships:' heading.
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_prompt_embeds_question_and_labels() {
        let prompt = Prompts::router("What is a project stakeholder?");
        assert!(prompt.contains("Question: What is a project stakeholder?"));
        assert!(prompt.contains("'document_search'"));
        assert!(prompt.contains("'web_search'"));
        assert!(prompt.contains("Project stakeholders"));
    }

    #[test]
    fn test_rag_prompt_layout() {
        let prompt = Prompts::rag("chunk one\n\nchunk two", "Who leads?");
        assert!(prompt.contains("Context: chunk one\n\nchunk two"));
        assert!(prompt.contains("User's Question: Who leads?"));
        assert!(prompt.trim_end().ends_with("Answer:"));
    }

    #[test]
    fn test_synthesizer_prompt_contract() {
        let prompt = Prompts::synthesizer("q", "raw");
        assert!(prompt.contains(APOLOGY));
        assert!(prompt.contains("(Subject)-[Relationship]->(Object)"));
        assert!(prompt.contains("'Relationships:'"));
        assert!(prompt.contains("The agent found this raw data:\nraw"));
    }
}
