use minijinja::{Environment, context};

/// Prompt sent to the model. The instruction is embedded verbatim.
pub const EXTRACTION_TEMPLATE: &str =
    r#"Extract the file modification needed from this text: "{{ instruction }}""#;

/// Render the extraction prompt for a free-text instruction
pub fn render_prompt(instruction: &str) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();

    // Templates without a file extension are never auto-escaped
    env.add_template("extraction", EXTRACTION_TEMPLATE)?;
    let tmpl = env.get_template("extraction")?;

    tmpl.render(context! { instruction => instruction })
}
