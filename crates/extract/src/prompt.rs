pub fn build_extraction_prompt(document: &str) -> String {
    format!(
        r#"Extract person and organisation entities from the following document:

{}

Output the result as a JSON object with two keys: "persons" and "organisations".
Each key maps to a list of names as strings. Output ONLY the JSON object, no markdown, no explanations.

Example output:
{{"persons": ["John Doe"], "organisations": ["Acme Corp"]}}"#,
        document
    )
}
