use crate::error::RequestError;
use crate::framework::Framework;

/// One submission: what to build and which stack to build it with.
///
/// Built fresh for every submit and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    description: String,
    framework: Framework,
}

impl GenerationRequest {
    pub fn new(description: &str, framework: Framework) -> Result<Self, RequestError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(RequestError::EmptyDescription);
        }

        Ok(Self {
            description: description.to_string(),
            framework,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn framework(&self) -> Framework {
        self.framework
    }

    /// The single instruction payload sent to the model
    pub fn prompt(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(
            "You are an experienced programmer with expertise in web development and UI/UX design. \
             You create modern, animated, and fully responsive UI components. You are highly skilled \
             in HTML, CSS, Tailwind CSS, Bootstrap, and JavaScript.\n\n",
        );
        prompt.push_str(&format!("Now, generate a UI component for: {}\n", self.description));
        prompt.push_str(&format!("Framework to use: {}\n\n", self.framework.as_str()));
        prompt.push_str("Requirements:\n");
        prompt.push_str("- The code must be clean, well-structured, and easy to understand.\n");
        prompt.push_str("- Optimize for SEO where applicable.\n");
        prompt.push_str("- Focus on creating a modern, animated, and responsive UI design.\n");
        prompt.push_str(
            "- Include high-quality hover effects, shadows, animations, colors, and typography.\n",
        );
        prompt.push_str("- Return ONLY the code, in a single Markdown fenced code block.\n");
        prompt.push_str("- Do NOT include explanations, text, or anything else besides the code.\n");
        prompt.push_str("- Put the whole component in one self-contained HTML file.");

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank_description() {
        assert_eq!(
            GenerationRequest::new("   \n", Framework::HtmlCss),
            Err(RequestError::EmptyDescription)
        );
    }

    #[test]
    fn test_trims_description() {
        let request = GenerationRequest::new("  a pricing card ", Framework::HtmlTailwind).unwrap();
        assert_eq!(request.description(), "a pricing card");
        assert_eq!(request.framework(), Framework::HtmlTailwind);
    }

    #[test]
    fn test_prompt_embeds_description_and_framework() {
        let request = GenerationRequest::new("a login form", Framework::HtmlBootstrap).unwrap();
        let prompt = request.prompt();
        assert!(prompt.contains("generate a UI component for: a login form"));
        assert!(prompt.contains("Framework to use: html-bootstrap"));
        assert!(prompt.contains("fenced code block"));
    }
}
