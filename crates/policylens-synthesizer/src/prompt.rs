//! Answer prompt

/// Build the answer prompt for a question and its fused context
pub fn build_answer_prompt(question: &str, context: &str) -> String {
    format!(
        "You are a question-answering assistant for government policy and regulations. \
         Answer the user's question accurately using the context below.\n\n\
         Context:\n{context}\n\n\
         Question: {question}\n\n\
         Requirements:\n\
         1. Answer only from the context; never invent information that is not there\n\
         2. Be accurate and specific\n\
         3. If the information is insufficient or the question is outside the policy domain, say so plainly\n\
         4. Quote policy names and agency names exactly as they appear\n\
         5. Keep the answer to roughly 200-400 characters, in the language of the question\n\n\
         Answer:"
    )
}
