//! Prompt composition for edit and review requests.
//!
//! Every request is self-contained: the directive and the full document are
//! included each time and nothing is carried over between calls.

/// Instruction used when the caller supplies an empty or blank one.
pub const DEFAULT_INSTRUCTION: &str = "Improve structure and styling.";

/// Fixed directive framing every edit request.
pub const EDIT_DIRECTIVE: &str = "\
You are an AI Code Assistant. Your job is to generate and edit HTML, CSS, and JS code for a website according to the user's instructions.

IMPORTANT: Each request is INDEPENDENT. Generate complete, self-contained code for the current request only. Do not assume previous requests or try to build upon them.

Follow these rules strictly:
You will be provided a full html file as context below which will include all 3 ie HTML CSS and JS. You will also be provided a user request below; modify the code accordingly and give the full code output.
Don't make it unnecessarily complex. Keep it simple and functional. Anything previously there should not be removed unless specifically asked so.

Code constraints:
   - Return exactly what is needed, nothing extra.
   - Ensure the dynamic JS runs correctly for requested interactions (like \"fall everything down\" or \"rotate box\").
   - Single well-formed tags only. No duplicates or partial tags.

End of instructions.";

/// Fixed directive framing every review request.
pub const REVIEW_DIRECTIVE: &str = "\
You are an expert code reviewer. Your job is to review HTML, CSS, and JS code for a website and respond accordingly in 4-10 words.";

const SEPARATOR: &str = "\n\n";

/// A single mutating edit request. Built once per edit and consumed by
/// [`EditRequest::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    instruction: String,
    directive: &'static str,
    content: String,
}

impl EditRequest {
    /// Blank instructions fall back to [`DEFAULT_INSTRUCTION`].
    pub fn new(instruction: &str, content: &str) -> Self {
        let instruction = match instruction.trim() {
            "" => DEFAULT_INSTRUCTION.to_string(),
            trimmed => trimmed.to_string(),
        };
        Self {
            instruction,
            directive: EDIT_DIRECTIVE,
            content: content.to_string(),
        }
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn directive(&self) -> &str {
        self.directive
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Instruction, then directive, then document.
    pub fn render(self) -> String {
        [self.instruction.as_str(), self.directive, self.content.as_str()].join(SEPARATOR)
    }
}

/// A read-only review request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest<'a> {
    content: &'a str,
}

impl<'a> ReviewRequest<'a> {
    pub fn new(content: &'a str) -> Self {
        Self { content }
    }

    /// Directive, then document.
    pub fn render(&self) -> String {
        [REVIEW_DIRECTIVE, self.content].join(SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_instruction_uses_default() {
        assert_eq!(EditRequest::new("", "x").instruction(), DEFAULT_INSTRUCTION);
        assert_eq!(EditRequest::new("   ", "x").instruction(), DEFAULT_INSTRUCTION);
        assert_eq!(EditRequest::new("\n\t", "x").instruction(), DEFAULT_INSTRUCTION);
    }

    #[test]
    fn instruction_is_trimmed() {
        let req = EditRequest::new("  add a title tag \n", "x");
        assert_eq!(req.instruction(), "add a title tag");
    }

    #[test]
    fn render_orders_instruction_directive_content() {
        let rendered = EditRequest::new("add a footer", "<html></html>").render();

        let i = rendered.find("add a footer").unwrap();
        let d = rendered.find(EDIT_DIRECTIVE).unwrap();
        let c = rendered.find("<html></html>").unwrap();
        assert!(i < d && d < c);
        assert_eq!(
            rendered,
            format!("add a footer\n\n{EDIT_DIRECTIVE}\n\n<html></html>")
        );
    }

    #[test]
    fn render_is_independent_of_previous_requests() {
        let first = EditRequest::new("one", "<p>a</p>").render();
        let second = EditRequest::new("one", "<p>a</p>").render();
        assert_eq!(first, second);
    }

    #[test]
    fn review_render_frames_content() {
        let rendered = ReviewRequest::new("<p>x</p>").render();
        assert_eq!(rendered, format!("{REVIEW_DIRECTIVE}\n\n<p>x</p>"));
    }
}
