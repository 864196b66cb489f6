// Cross-cutting prompt fragments. Feature modules keep their own prompts.rs
// and pull shared output rules from here.

/// Output rules appended to any system prompt that expects a bare JSON object.
pub const JSON_OBJECT_RULES: &str = "\
Output requirements:
- Respond **only** with a valid JSON object that strictly follows the format above.
- Do **not** include markdown, code fences (like ```json), or any additional text before or after the JSON.
- Do **not** write explanations outside of the JSON object.
- If a field cannot be filled, use a placeholder such as 0 or \"N/A\".
- The response must begin with '{' and end with '}', forming one complete JSON object.

If your response contains anything other than valid JSON, it will be rejected.";
