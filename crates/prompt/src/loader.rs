//! Prompt loader for the built-in grounding prompt and YAML overrides.

use crate::types::PromptDefinition;
use docchat_core::{AppError, AppResult};
use std::path::Path;

/// Identifier of the built-in grounding prompt.
pub const GROUNDING_PROMPT_ID: &str = "docchat.grounding.default";

const GROUNDING_TEMPLATE: &str = "Answer based only on the context below. Provide the answer in a structured format such as a list or table if applicable.\n\n{{context}}\n\nQuestion: {{question}}\nAnswer:";

/// The default grounding prompt used to answer questions from retrieved chunks.
pub fn grounding_prompt() -> PromptDefinition {
    PromptDefinition {
        id: GROUNDING_PROMPT_ID.to_string(),
        title: "Grounded document answer".to_string(),
        api_version: "1.0".to_string(),
        system: None,
        template: GROUNDING_TEMPLATE.to_string(),
    }
}

/// Load a prompt definition from a YAML file.
///
/// # Example
/// ```no_run
/// use docchat_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("prompts/terse.yml"))?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(path: &Path) -> AppResult<PromptDefinition> {
    tracing::debug!("Loading prompt from: {:?}", path);

    if !path.exists() {
        return Err(AppError::Prompt(format!("Prompt file not found: {:?}", path)));
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Prompt(format!("Failed to read prompt file {:?}: {}", path, e))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML {:?}: {}", path, e))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_grounding_prompt_is_valid() {
        let def = grounding_prompt();
        assert!(validate_prompt(&def).is_ok());
        assert!(def.template.contains("{{context}}"));
        assert!(def.template.ends_with("Question: {{question}}\nAnswer:"));
    }

    #[test]
    fn test_load_valid_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("terse.yml");
        fs::write(
            &path,
            "id: terse\ntitle: Terse\napiVersion: \"1.0\"\ntemplate: \"{{context}}\\n{{question}}\"\n",
        )
        .unwrap();

        let prompt = load_prompt(&path).unwrap();
        assert_eq!(prompt.id, "terse");
        assert_eq!(prompt.template, "{{context}}\n{{question}}");
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_prompt(&temp_dir.path().join("missing.yml"));
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("invalid.yml");
        fs::write(&path, "invalid: yaml: content:").unwrap();

        assert!(matches!(load_prompt(&path), Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_bad_api_version_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("v.yml");
        fs::write(&path, "id: v\ntitle: V\napiVersion: \"1\"\ntemplate: x\n").unwrap();

        assert!(load_prompt(&path).is_err());
    }
}
