use serde::{Deserialize, Serialize};

/// Target stack the generated document is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framework {
    #[default]
    HtmlCss,
    HtmlTailwind,
    HtmlBootstrap,
    HtmlCssJs,
    HtmlTailwindBootstrap,
}

impl Framework {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::HtmlCss => "html-css",
            Framework::HtmlTailwind => "html-tailwind",
            Framework::HtmlBootstrap => "html-bootstrap",
            Framework::HtmlCssJs => "html-css-js",
            Framework::HtmlTailwindBootstrap => "html-tailwind-bootstrap",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "html-css" => Some(Framework::HtmlCss),
            "html-tailwind" => Some(Framework::HtmlTailwind),
            // Older configs carry the misspelt ids
            "html-bootstrap" | "html-bootstarp" => Some(Framework::HtmlBootstrap),
            "html-css-js" => Some(Framework::HtmlCssJs),
            "html-tailwind-bootstrap" | "html-tailwind-bootstarp" => {
                Some(Framework::HtmlTailwindBootstrap)
            }
            _ => None,
        }
    }

    pub fn all() -> Vec<Framework> {
        vec![
            Framework::HtmlCss,
            Framework::HtmlTailwind,
            Framework::HtmlBootstrap,
            Framework::HtmlCssJs,
            Framework::HtmlTailwindBootstrap,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Framework::HtmlCss => "HTML + CSS",
            Framework::HtmlTailwind => "HTML + Tailwind CSS",
            Framework::HtmlBootstrap => "HTML + Bootstrap",
            Framework::HtmlCssJs => "HTML + CSS + JS",
            Framework::HtmlTailwindBootstrap => "HTML + Tailwind + Bootstrap",
        }
    }

    /// Cycle forward through [`Framework::all`], wrapping at the end
    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_ids_round_trip() {
        for framework in Framework::all() {
            assert_eq!(Framework::from_str(framework.as_str()), Some(framework));
        }
    }

    #[test]
    fn test_legacy_ids_accepted() {
        assert_eq!(Framework::from_str("html-bootstarp"), Some(Framework::HtmlBootstrap));
        assert_eq!(
            Framework::from_str("HTML-Tailwind-Bootstarp"),
            Some(Framework::HtmlTailwindBootstrap)
        );
        assert_eq!(Framework::from_str("react"), None);
    }

    #[test]
    fn test_cycling_wraps() {
        assert_eq!(Framework::HtmlTailwindBootstrap.next(), Framework::HtmlCss);
        assert_eq!(Framework::HtmlCss.prev(), Framework::HtmlTailwindBootstrap);
    }

    #[test]
    fn test_serde_uses_wire_ids() {
        let json = serde_json::to_string(&Framework::HtmlCssJs).unwrap();
        assert_eq!(json, "\"html-css-js\"");
    }
}
