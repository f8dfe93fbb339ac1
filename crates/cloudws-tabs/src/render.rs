//! Tab rendering
//!
//! Tabs stay plain data; whatever draws them implements [`TabRenderer`].

use crate::tab::WorkspaceTab;

pub trait TabRenderer {
    type Output;

    fn render(&self, tab: &WorkspaceTab) -> Self::Output;
}

/// Renders the tab title shown in the tab bar
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleRenderer;

impl TabRenderer for TitleRenderer {
    type Output = String;

    fn render(&self, tab: &WorkspaceTab) -> String {
        match tab {
            WorkspaceTab::Editor(path) => {
                let path = path.as_str();
                path.rsplit('/').next().unwrap_or(path).to_string()
            }
            WorkspaceTab::Shell => "Shell".to_string(),
            WorkspaceTab::Console => "Console".to_string(),
            WorkspaceTab::Evaluation => "Evaluation".to_string(),
            WorkspaceTab::Instructions => "Instructions".to_string(),
            WorkspaceTab::Empty => "No files open".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titles() {
        let renderer = TitleRenderer;
        assert_eq!(
            renderer.render(&WorkspaceTab::editor("/src/main.py").unwrap()),
            "main.py"
        );
        assert_eq!(renderer.render(&WorkspaceTab::editor("main.py").unwrap()), "main.py");
        assert_eq!(renderer.render(&WorkspaceTab::Instructions), "Instructions");
        assert_eq!(renderer.render(&WorkspaceTab::Empty), "No files open");
    }

    #[test]
    fn test_custom_renderer() {
        struct KindRenderer;
        impl TabRenderer for KindRenderer {
            type Output = &'static str;
            fn render(&self, tab: &WorkspaceTab) -> &'static str {
                tab.kind().as_str()
            }
        }

        assert_eq!(KindRenderer.render(&WorkspaceTab::Console), "console");
    }
}
