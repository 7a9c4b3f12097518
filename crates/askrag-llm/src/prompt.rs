//! Prompt assembly for grounded question answering.

/// Fill the answering prompt. The model is constrained to the retrieved
/// context and told to admit when the context does not hold the answer,
/// rather than improvise one.
pub fn build_answer_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful assistant answering questions based on the user's personal documents.\n\
         \n\
         Answer ONLY based on the context provided. If the answer is not in the context, say \"I couldn't find this information in your documents.\"\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {question}\n\
         \n\
         Answer:"
    )
}
